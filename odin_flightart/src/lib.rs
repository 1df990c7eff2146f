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
#![allow(unused)]

//! aircraft track art from a local ADS-B receiver feed.
//! The crate polls a dump1090 `data.json` endpoint, keeps per-aircraft tracks, projects them onto a
//! canvas region and emits the result to an e-paper panel or an RGB pixel matrix (both emulated by files)

pub mod errors;
pub use errors::{Result,OdinFlightArtError};

mod config;
pub use config::*;

pub mod projection;
pub mod feed;
pub mod style;
pub mod stats;
pub mod store;

pub mod fonts;
pub mod label;
pub mod summary;
pub mod render;
pub mod matrix;

pub mod display;
pub mod archive;
pub mod session;
