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

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;
use odin_common::ron::to_pretty_ron;
use odin_ptz::device::LoggingPtz;
use odin_spotter::{Spotter, config::SpotterConfig};

/// point a PTZ camera at aircraft reported by an ADS-B receiver
#[derive(Parser,Debug)]
#[command(about="ADS-B assisted aircraft spotting")]
struct CliOpts {
    /// host:port of the SBS source (overrides the config file)
    #[arg(long)]
    adsb: Option<String>,

    /// do not run the video loop even if it is configured
    #[arg(long)]
    no_video: bool,

    /// print the effective configuration and exit
    #[arg(long)]
    show_config: bool,

    /// path of the RON config file
    config: String,
}

#[tokio::main]
async fn main()->Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::from_default_env())  // use RUST_LOG to set max level
        .init();

    let args = CliOpts::parse();
    let mut config = SpotterConfig::load( &args.config)?;
    if let Some(url) = args.adsb { config.feed.url = url }
    if args.no_video { config.video = None }
    config.check()?;

    if args.show_config {
        println!("{}", to_pretty_ron( &config)?);
        return Ok(())
    }

    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn( async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutting down");
            ctrl_c.cancel()
        }
    });

    // camera transports are provided by integrations, the built-in device only logs moves
    let spotter = Spotter::new( &config, LoggingPtz::new());
    spotter.run( &config, shutdown).await?;
    Ok(())
}
