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

use std::process::ExitCode;
use tokio;
use anyhow::Result;
use clap::Parser;
use tracing::{error,info};
use tracing_subscriber::EnvFilter;
use odin_flightart::{load_config, FlightArtConfig, session::FlightArtSession};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "render aircraft tracks from a local dump1090 feed to a panel or pixel matrix")]
pub struct Args {
    /// run a single batch cycle (or a single continuous tick) and exit
    #[arg(long)]
    pub once: bool,

    /// RON config file (path or name within the configs/ dir)
    pub config: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main()->Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::try_from_default_env().unwrap_or_else( |_| EnvFilter::new("info")))  // use RUST_LOG to override
        .init();

    let args = Args::parse();

    let config: FlightArtConfig = load_config( &args.config)?;
    let mut session = FlightArtSession::from_config( config)?;
    info!("starting flight art session with {}", args.config);

    if let Err(e) = session.run( args.once).await {
        if e.is_fatal() {
            error!("terminating session: {e}");
            return Ok(ExitCode::FAILURE)
        }
        return Err(e.into())
    }

    Ok(ExitCode::SUCCESS)
}
