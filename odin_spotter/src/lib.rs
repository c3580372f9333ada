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

//! the spotter ties the ADS-B feed, the track registry, the slew controller and the motion highlighter
//! together. It runs three loops that share a single cancellation token:
//!  - the feed loop reads SBS lines and processes each report inline (registry update, target selection,
//!    slew decision including the bounded device call)
//!  - the expiry loop sweeps stale tracks on a fixed interval so that targets get dropped even if the
//!    feed goes quiet
//!  - the video loop runs on a blocking thread and highlights motion in frames. The only tracking state it
//!    sees is the [`TargetInfo`] published through a watch channel after each slew decision, which is
//!    used to label frames

use std::{sync::{Arc,Mutex,MutexGuard,atomic::{AtomicU64,Ordering}}, time::{Duration,Instant}};
use async_trait::async_trait;
use chrono::{DateTime,TimeDelta,Utc};
use image::Rgb;
use tokio::{self, sync::watch, time::{interval,MissedTickBehavior}};
use tokio_util::sync::CancellationToken;
use tracing::{debug,info,warn};
use odin_common::datetime::{to_time_delta, utc_now};
use odin_adsb::{
    PositionReport,
    feed::{FeedReader, FeedSink, FeedStats, FeedUpdate},
    tracks::{TrackRegistry, TrackUpdate}
};
use odin_ptz::{device::PtzDevice, slew::{SlewController, SlewOutcome, SlewTarget}};
use odin_image::{
    get_hex_rgb,
    frames::{FrameSink, FrameSource, ImageDirSink, ImageDirSource},
    motion::MotionHighlighter,
    overlay::load_font
};

pub mod config;
use config::{SpotterConfig, VideoConfig};

pub mod errors;
use errors::{SpotterError,Result};

pub mod overlay;
use overlay::{TargetInfo, VideoOverlay};

/// the shared state of the tracking loops. Clones refer to the same registry and controller
pub struct Spotter<D> where D: PtzDevice {
    registry: Arc<Mutex<TrackRegistry>>,
    slew: Arc<tokio::sync::Mutex<SlewController<D>>>,
    target_info: Arc<watch::Sender<Option<TargetInfo>>>,
    stale_after: TimeDelta,
    stale_reports: Arc<AtomicU64> // reports that were already stale when they arrived
}

impl<D> Clone for Spotter<D> where D: PtzDevice {
    fn clone (&self)->Self {
        Spotter {
            registry: self.registry.clone(),
            slew: self.slew.clone(),
            target_info: self.target_info.clone(),
            stale_after: self.stale_after,
            stale_reports: self.stale_reports.clone()
        }
    }
}

impl<D> Spotter<D> where D: PtzDevice + 'static {
    pub fn new (config: &SpotterConfig, device: D)->Self {
        let registry = TrackRegistry::new( &config.camera, config.tracking.stale_after, config.tracking.selection.to_policy())
            .with_filter( config.tracking.filter.clone());
        let slew = SlewController::new( config.slew.clone(), device);
        let (target_info, _) = watch::channel( None);

        Spotter {
            registry: Arc::new( Mutex::new( registry)),
            slew: Arc::new( tokio::sync::Mutex::new( slew)),
            target_info: Arc::new( target_info),
            stale_after: to_time_delta( config.tracking.stale_after),
            stale_reports: Arc::new( AtomicU64::new(0))
        }
    }

    /// the registry lock is never held across await points. A panic while holding it leaves
    /// the registry consistent (all updates are single map operations) so we just continue
    pub fn registry (&self)->MutexGuard<'_,TrackRegistry> {
        self.registry.lock().unwrap_or_else( |e| e.into_inner())
    }

    pub fn slew (&self)->&Arc<tokio::sync::Mutex<SlewController<D>>> { &self.slew }

    /// the selected target as of the last slew decision
    pub fn target_info (&self)->watch::Receiver<Option<TargetInfo>> { self.target_info.subscribe() }

    pub fn stale_reports (&self)->u64 { self.stale_reports.load( Ordering::Relaxed) }

    pub async fn on_report (&self, report: PositionReport)->SlewOutcome {
        self.check_report_age( &report);
        let update = self.registry().update( report);
        if update == TrackUpdate::Outdated {
            debug!("ignoring outdated report");
        }
        self.steer().await
    }

    pub fn on_identification (&self, icao24: &str, callsign: String, received: DateTime<Utc>) {
        self.registry().set_callsign( icao24, callsign, received);
    }

    pub async fn on_expire (&self, now: DateTime<Utc>)->SlewOutcome {
        let expiry = self.registry().expire( now);
        if let Some(id) = &expiry.lost_target {
            info!("selected target {} expired", id);
        }
        self.steer().await
    }

    /// reports that are already stale on arrival get dropped by the next expiry sweep. This usually means
    /// the feed timezone is wrong or the decoder clock is off
    fn check_report_age (&self, report: &PositionReport) {
        let age = utc_now() - report.timestamp();
        if age.abs() > self.stale_after {
            let n = self.stale_reports.fetch_add( 1, Ordering::Relaxed) + 1;
            if n == 1 || n % 1000 == 0 {
                warn!("{} reports with capture times off by more than the track timeout (last: {} by {}s), check feed timezone",
                      n, report.icao24(), age.num_seconds());
            }
        }
    }

    /// select the current target and let the slew controller act on it. Decisions are serialized
    /// through the controller lock, the target snapshot is taken while holding it
    async fn steer (&self)->SlewOutcome {
        let mut slew = self.slew.lock().await;
        let target = self.registry().select_target().map( SlewTarget::from);
        let outcome = slew.steer( target, Instant::now()).await;

        let info = {
            let mut registry = self.registry();
            if let SlewOutcome::Moved{target,pointing} = &outcome {
                if !registry.record_command( target, *pointing) {
                    debug!("commanded target {} expired in the meantime", target);
                }
            }
            registry.selected().map( |track| TargetInfo::new( track, slew.last_pointing().copied()))
        };
        self.target_info.send_replace( info);

        outcome
    }

    /// the feed loop, which returns when `shutdown` is cancelled
    pub async fn run_feed (&self, mut reader: FeedReader, shutdown: CancellationToken)->Result<FeedStats> {
        let mut sink = self.clone();
        reader.run( shutdown, &mut sink).await?;
        Ok( reader.stats().clone() )
    }

    /// the periodic expiry loop, which returns when `shutdown` is cancelled
    pub async fn run_expiry (&self, expire_interval: Duration, shutdown: CancellationToken) {
        let mut ticker = interval( expire_interval);
        ticker.set_missed_tick_behavior( MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => { self.on_expire( utc_now()).await; }
            }
        }
        debug!("expiry loop terminated");
    }

    /// run all loops until `shutdown` is cancelled. Feed connection and video source are opened
    /// before any loop is started, failure to do so is fatal
    pub async fn run (&self, config: &SpotterConfig, shutdown: CancellationToken)->Result<()> {
        let reader = FeedReader::connect( config.feed.clone()).await?;

        let video_task = if let Some(video) = &config.video {
            let source = ImageDirSource::open( &video.source_dir, video.looping)?;
            let sink = ImageDirSink::create( &video.output_dir, video.save_every)?;
            let highlighter = MotionHighlighter::new( video.motion.clone())?;
            let overlay = match &video.label_font {
                Some(path) => {
                    let color = Rgb( get_hex_rgb( &video.label_color)?);
                    Some( VideoOverlay::new( load_font( path)?, color, video.label_size, self.target_info()))
                }
                None => None
            };
            let frame_interval = video.frame_interval;
            let token = shutdown.clone();
            Some( tokio::task::spawn_blocking( move || run_video( source, sink, highlighter, overlay, frame_interval, token)))
        } else {
            None
        };

        let expiry_task = {
            let spotter = self.clone();
            let expire_interval = config.tracking.expire_interval;
            let token = shutdown.clone();
            tokio::spawn( async move { spotter.run_expiry( expire_interval, token).await })
        };

        let res = self.run_feed( reader, shutdown.clone()).await;
        shutdown.cancel(); // in case the feed loop failed

        expiry_task.await?;
        if let Some(task) = video_task {
            let n_frames = task.await?;
            info!("video loop processed {} frames", n_frames);
        }

        let stats = res?;
        info!("feed stats: {}", stats);
        info!("slew stats: {}", self.slew.lock().await.stats());
        Ok(())
    }
}

#[async_trait]
impl<D> FeedSink for Spotter<D> where D: PtzDevice + 'static {
    async fn publish (&mut self, update: FeedUpdate) {
        match update {
            FeedUpdate::Position(report) => { self.on_report( report).await; }
            FeedUpdate::Identification{icao24,callsign,received} => self.on_identification( &icao24, callsign, received)
        }
    }
}

/// the blocking video loop. Frames that cannot be read or processed are logged and skipped, processed
/// frames are labeled with the current target if there is an `overlay`.
/// Returns the number of processed frames once the source is exhausted or `shutdown` is cancelled
pub fn run_video<S,K> (mut source: S, mut sink: K, mut highlighter: MotionHighlighter, overlay: Option<VideoOverlay>,
                       frame_interval: Duration, shutdown: CancellationToken)->u64
    where S: FrameSource, K: FrameSink
{
    let mut n_frames: u64 = 0;

    while !shutdown.is_cancelled() {
        match source.next_frame() {
            Ok(Some(frame)) => {
                match highlighter.process( &frame) {
                    Ok(mut hf) => {
                        n_frames += 1;
                        if let Some(overlay) = &overlay {
                            overlay.draw( &mut hf.image);
                        }
                        if let Some(r) = hf.largest_region() {
                            debug!("frame {}: {} motion regions, largest {}", n_frames, hf.regions.len(), r);
                        }
                        if let Err(e) = sink.deliver( &hf.image, &hf.regions) {
                            warn!("failed to deliver frame: {}", e);
                        }
                    }
                    Err(e) => warn!("skipping frame: {}", e)
                }
            }
            Ok(None) => {
                info!("frame source exhausted");
                break
            }
            Err(e) => warn!("failed to read frame: {}", e)
        }

        if !frame_interval.is_zero() {
            std::thread::sleep( frame_interval);
        }
    }
    n_frames
}
