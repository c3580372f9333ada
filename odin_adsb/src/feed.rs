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

//! the TCP line stream reader for SBS-1 (dump1090 port 30003) sources.
//! Lines are parsed and published to a [`FeedSink`] one at a time, i.e. a report is fully processed
//! before the next line is read. Malformed lines are logged and skipped, dropped connections are
//! re-established with exponential backoff until shutdown is requested

use std::{fmt, sync::Arc, time::Duration};
use async_trait::async_trait;
use chrono::{DateTime,Utc};
use chrono_tz::Tz;
use serde::{Serialize,Deserialize};
use tokio::{self, net::TcpStream, io::{AsyncBufRead, AsyncBufReadExt, BufReader}, time::{sleep,timeout}};
use tokio_util::sync::CancellationToken;
use tracing::{debug,info,warn};
use odin_common::{MinMaxAvg, datetime::{self, ser_duration_as_fractional_secs, de_duration_from_fractional_secs}};

use crate::{PositionReport, VerticalDatum, sbs::{parse_sbs_line, SbsMessage}, errors::{OdinAdsbError,Result}};

/// SBS lines are about 120 bytes, anything longer than this is consumed but not parsed
pub const MAX_LINE_LEN: usize = 1024;

#[derive(Serialize,Deserialize,Debug,Clone)]
pub struct FeedConfig {
    pub url: String, // host:port of the socket from which to read SBS messages
    pub timezone: Tz, // timezone of the receiver station (used to convert local SBS times)

    #[serde(default)]
    pub datum: VerticalDatum, // what reported altitudes refer to

    #[serde(default="default_connect_timeout", serialize_with="ser_duration_as_fractional_secs", deserialize_with="de_duration_from_fractional_secs")]
    pub connect_timeout: Duration,

    #[serde(default="default_reconnect_delay", serialize_with="ser_duration_as_fractional_secs", deserialize_with="de_duration_from_fractional_secs")]
    pub reconnect_delay: Duration, // initial delay, doubled after each failed attempt

    #[serde(default="default_max_reconnect_delay", serialize_with="ser_duration_as_fractional_secs", deserialize_with="de_duration_from_fractional_secs")]
    pub max_reconnect_delay: Duration,
}

fn default_connect_timeout()->Duration { datetime::secs(5) }
fn default_reconnect_delay()->Duration { datetime::secs(1) }
fn default_max_reconnect_delay()->Duration { datetime::secs(30) }

impl Default for FeedConfig {
    fn default()->Self {
        FeedConfig {
            url: "localhost:30003".into(),
            timezone: Tz::UTC,
            datum: VerticalDatum::MeanSeaLevel,
            connect_timeout: default_connect_timeout(),
            reconnect_delay: default_reconnect_delay(),
            max_reconnect_delay: default_max_reconnect_delay(),
        }
    }
}

impl FeedConfig {
    pub fn check (&self)->Result<()> {
        if self.url.is_empty() {
            Err( OdinAdsbError::ConfigError("empty feed url".into()))
        } else if self.reconnect_delay.is_zero() || self.max_reconnect_delay < self.reconnect_delay {
            Err( OdinAdsbError::ConfigError("reconnect delays have to be positive and max >= initial".into()))
        } else {
            Ok(())
        }
    }
}

/// what the reader publishes
#[derive(Debug,Clone,PartialEq)]
pub enum FeedUpdate {
    Position(PositionReport),
    Identification { icao24: String, callsign: String, received: DateTime<Utc> }
}

/// the consumer of feed updates. Publishing is awaited before the next line is read
#[async_trait]
pub trait FeedSink: Send {
    async fn publish (&mut self, update: FeedUpdate);
}

/// a sink that just collects updates, useful for tools and tests
#[async_trait]
impl FeedSink for Vec<FeedUpdate> {
    async fn publish (&mut self, update: FeedUpdate) { self.push(update) }
}

#[derive(Debug,Clone,Default)]
pub struct FeedStats {
    pub lines: u64,
    pub positions: u64,
    pub partial: u64,
    pub identifications: u64,
    pub ignored: u64,
    pub malformed: u64,
    pub reconnects: u64,
    pub report_age: MinMaxAvg // seconds between report timestamp and reception
}

impl fmt::Display for FeedStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "lines: {}, positions: {}, partial: {}, ids: {}, ignored: {}, malformed: {}, reconnects: {}",
            self.lines, self.positions, self.partial, self.identifications, self.ignored, self.malformed, self.reconnects)?;
        if self.report_age.n > 0 {
            write!( f, ", report age: {:.1}s avg, {:.1}s max", self.report_age.avg, self.report_age.max)?;
        }
        Ok(())
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum StreamEnd {
    Eof,
    Shutdown
}

/// read the next line into `buf`, storing at most `max_len` bytes. Longer lines are consumed up to and
/// including their newline but leave `buf` empty. Returns the number of consumed bytes (0 at EOF) and
/// whether the line was too long
async fn read_line_limited<R> (reader: &mut R, buf: &mut Vec<u8>, max_len: usize)->std::io::Result<(usize,bool)>
    where R: AsyncBufRead + Unpin
{
    let mut n_read = 0;
    let mut too_long = false;

    loop {
        let (done, used) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() { return Ok( (n_read, too_long) ) }

            let (done, used) = match available.iter().position( |b| *b == b'\n') {
                Some(i) => (true, i+1),
                None => (false, available.len())
            };
            if !too_long {
                if buf.len() + used <= max_len {
                    buf.extend_from_slice( &available[..used]);
                } else {
                    too_long = true;
                    buf.clear();
                }
            }
            (done, used)
        };
        reader.consume( used);
        n_read += used;

        if done { return Ok( (n_read, too_long) ) }
    }
}

/// read and publish lines from `reader` until it is exhausted, fails, or shutdown is requested.
/// Only I/O errors of the underlying reader are returned - bad input is logged and skipped
pub async fn process_lines<R,S> (reader: &mut R, source_tz: &Tz, shutdown: &CancellationToken, sink: &mut S, stats: &mut FeedStats)->Result<StreamEnd>
    where R: AsyncBufRead + Unpin, S: FeedSink + ?Sized
{
    let mut buf: Vec<u8> = Vec::with_capacity(256);

    loop {
        buf.clear();
        let (n, too_long) = tokio::select! {
            _ = shutdown.cancelled() => return Ok(StreamEnd::Shutdown),
            res = read_line_limited( reader, &mut buf, MAX_LINE_LEN) => res?
        };
        if n == 0 { return Ok(StreamEnd::Eof) }
        stats.lines += 1;

        if too_long {
            stats.malformed += 1;
            warn!("skipping SBS line of {} bytes", n);
            continue
        }

        let line = match std::str::from_utf8( &buf) {
            Ok(line) => line,
            Err(e) => {
                stats.malformed += 1;
                warn!("skipping non UTF-8 SBS line: {}", e);
                continue
            }
        };

        match parse_sbs_line( line, source_tz) {
            Ok(SbsMessage::Position(report)) => {
                stats.positions += 1;
                let age = (datetime::utc_now() - report.timestamp()).num_milliseconds() as f64 / 1000.0;
                stats.report_age.add( age);
                sink.publish( FeedUpdate::Position(report)).await
            }
            Ok(SbsMessage::Identification{icao24,callsign}) => {
                stats.identifications += 1;
                sink.publish( FeedUpdate::Identification{ icao24, callsign, received: datetime::utc_now() }).await
            }
            Ok(SbsMessage::PartialPosition{icao24}) => {
                stats.partial += 1;
                debug!("discarding partial position for {}", icao24)
            }
            Ok(SbsMessage::Ignored) => stats.ignored += 1,
            Err(e) => {
                stats.malformed += 1;
                warn!("skipping malformed SBS line {:?}: {}", line.trim_end(), e)
            }
        }
    }
}

async fn connect_stream (config: &FeedConfig)->Result<BufReader<TcpStream>> {
    let stream = timeout( config.connect_timeout, TcpStream::connect( &config.url)).await
        .map_err( |_| OdinAdsbError::OpFailedError( format!("connect to {} timed out", config.url)))??;
    Ok( BufReader::with_capacity( 8192, stream) )
}

/// the feed reader owns the connection to the SBS source. It is created with an established connection
/// so that unreachable sources can be detected at startup
pub struct FeedReader {
    config: FeedConfig,
    reader: Option<BufReader<TcpStream>>,
    stats: FeedStats
}

impl FeedReader {
    pub async fn connect (config: FeedConfig)->Result<Self> {
        let reader = connect_stream( &config).await?;
        info!("connected to SBS source {}", config.url);
        Ok( FeedReader { config, reader: Some(reader), stats: FeedStats::default() } )
    }

    pub fn config (&self)->&FeedConfig { &self.config }
    pub fn stats (&self)->&FeedStats { &self.stats }

    /// process input until shutdown is requested. Lost connections are re-established with exponential
    /// backoff. This only returns once `shutdown` is cancelled, at which point the socket is closed
    pub async fn run<S> (&mut self, shutdown: CancellationToken, sink: &mut S)->Result<()> where S: FeedSink + ?Sized {
        let mut delay = self.config.reconnect_delay;

        loop {
            if let Some(mut reader) = self.reader.take() {
                match process_lines( &mut reader, &self.config.timezone, &shutdown, &mut *sink, &mut self.stats).await {
                    Ok(StreamEnd::Shutdown) => {
                        info!("feed {} terminated ({})", self.config.url, self.stats);
                        return Ok(())
                    }
                    Ok(StreamEnd::Eof) => warn!("feed {} closed by source ({})", self.config.url, self.stats),
                    Err(e) => warn!("feed {} read error: {} ({})", self.config.url, e, self.stats)
                }
            } // dropping the reader closes the socket

            info!("reconnecting to {} in {:?}", self.config.url, delay);
            tokio::select! {
                _ = shutdown.cancelled() => return Ok(()),
                _ = sleep(delay) => {}
            }

            match connect_stream( &self.config).await {
                Ok(reader) => {
                    self.stats.reconnects += 1;
                    info!("reconnected to SBS source {}", self.config.url);
                    self.reader = Some(reader);
                    delay = self.config.reconnect_delay;
                }
                Err(e) => {
                    warn!("failed to reconnect to {}: {}", self.config.url, e);
                    delay = (delay * 2).min( self.config.max_reconnect_delay);
                }
            }
        }
    }
}
