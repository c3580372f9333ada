/*
 * Copyright © 2024, United States Government, as represented by the Administrator of
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
use async_trait::async_trait;
use chrono_tz::Tz;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use odin_adsb::feed::{FeedConfig, FeedReader, FeedSink, FeedUpdate};

/// SBS socket monitoring tool
#[derive(Parser,Debug)]
#[command(about="SBS socket monitoring tool")]
struct CliOpts {
    /// host:port from where to read SBS messages
    #[arg(default_value="localhost:30003")]
    url: String,

    /// timezone of message source
    #[arg(long, default_value="UTC")]
    tz: String,
}

struct PrintSink;

#[async_trait]
impl FeedSink for PrintSink {
    async fn publish (&mut self, update: FeedUpdate) {
        match update {
            FeedUpdate::Position(report) => println!("{report}"),
            FeedUpdate::Identification{icao24,callsign,..} => println!("Identification( icao24: {icao24}, callsign: \"{callsign}\")")
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliOpts::parse();
    let timezone: Tz = args.tz.parse().map_err( |e| anyhow::anyhow!("invalid timezone {}: {}", args.tz, e))?;
    let config = FeedConfig { url: args.url, timezone, ..FeedConfig::default() };

    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn( async move {
        if tokio::signal::ctrl_c().await.is_ok() { ctrl_c.cancel() }
    });

    let mut reader = FeedReader::connect( config).await?;
    reader.run( shutdown, &mut PrintSink).await?;
    println!("{}", reader.stats());
    Ok(())
}
