/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use thiserror::Error;

pub type Result<T> = std::result::Result<T,OdinFlightArtError>;

#[derive(Error,Debug)]
pub enum OdinFlightArtError {

    /// transport failure or malformed body - skip this tick
    #[error("feed unavailable {0}")]
    FeedUnavailable(String),

    /// a single record that cannot be tracked - drop it, keep the rest of the batch
    #[error("malformed record {0}")]
    MalformedRecord(String),

    /// zero span bounding box - skip the whole render cycle
    #[error("degenerate projection {0}")]
    DegenerateProjection(String),

    /// hardware commit failed - terminates the session
    #[error("device write failure {0}")]
    DeviceWriteFailure(String),

    #[error("config error {0}")]
    ConfigError(String),

    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("image error {0}")]
    ImageError( #[from] image::ImageError),

    #[error("invalid font {0}")]
    InvalidFont( #[from] ab_glyph::InvalidFont),

    #[error("config RON error {0}")]
    RonError( #[from] ron::error::SpannedError),

    #[error("operation failed {0}")]
    OpFailedError(String)
}

impl OdinFlightArtError {
    /// the only error kind that terminates a session
    pub fn is_fatal (&self)->bool {
        matches!( self, OdinFlightArtError::DeviceWriteFailure(_))
    }
}

macro_rules! feed_unavailable {
    ($fmt:literal $(, $arg:expr )* ) => {
        crate::errors::OdinFlightArtError::FeedUnavailable( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use feed_unavailable;

macro_rules! malformed_record {
    ($fmt:literal $(, $arg:expr )* ) => {
        crate::errors::OdinFlightArtError::MalformedRecord( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use malformed_record;

macro_rules! degenerate {
    ($fmt:literal $(, $arg:expr )* ) => {
        crate::errors::OdinFlightArtError::DegenerateProjection( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use degenerate;

macro_rules! device_failure {
    ($fmt:literal $(, $arg:expr )* ) => {
        crate::errors::OdinFlightArtError::DeviceWriteFailure( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use device_failure;

macro_rules! config_error {
    ($fmt:literal $(, $arg:expr )* ) => {
        crate::errors::OdinFlightArtError::ConfigError( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use config_error;

macro_rules! op_failed {
    ($fmt:literal $(, $arg:expr )* ) => {
        crate::errors::OdinFlightArtError::OpFailedError( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use op_failed;
