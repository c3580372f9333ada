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

//! the spotter configuration, which is read from a single RON file such as
//! ```ron
//! SpotterConfig(
//!     camera: ( latitude: 37.4, longitude: -122.05, elevation: 30.0, datum: MeanSeaLevel ),
//!     feed: ( url: "localhost:30003", timezone: "America/Los_Angeles" ),
//!     tracking: ( stale_after: 60.0, selection: NearestRange( hysteresis: 500.0 ) ),
//!     slew: ( deadband: 0.5 ),
//!     video: None,
//! )
//! ```

use std::{path::{Path,PathBuf}, time::Duration};
use serde::{Serialize,Deserialize};
use odin_common::{datetime::{self, ser_duration_as_fractional_secs, de_duration_from_fractional_secs}, ron::load_ron_file};
use odin_adsb::{CameraPose, feed::FeedConfig, selection::{CandidateFilter, PolicyKind}};
use odin_ptz::slew::SlewConfig;
use odin_image::{get_hex_rgb, motion::MotionConfig};

use crate::errors::{SpotterError,Result};

#[derive(Serialize,Deserialize,Debug,Clone)]
pub struct TrackingConfig {
    #[serde(default="default_stale_after", serialize_with="ser_duration_as_fractional_secs", deserialize_with="de_duration_from_fractional_secs")]
    pub stale_after: Duration,

    #[serde(default="default_expire_interval", serialize_with="ser_duration_as_fractional_secs", deserialize_with="de_duration_from_fractional_secs")]
    pub expire_interval: Duration,

    #[serde(default)]
    pub selection: PolicyKind,

    #[serde(default)]
    pub filter: CandidateFilter
}

fn default_stale_after()->Duration { datetime::secs(60) }
fn default_expire_interval()->Duration { datetime::secs(5) }

impl Default for TrackingConfig {
    fn default()->Self {
        TrackingConfig {
            stale_after: default_stale_after(),
            expire_interval: default_expire_interval(),
            selection: PolicyKind::default(),
            filter: CandidateFilter::default()
        }
    }
}

#[derive(Serialize,Deserialize,Debug,Clone)]
pub struct VideoConfig {
    pub source_dir: PathBuf,

    #[serde(default)]
    pub looping: bool,

    pub output_dir: PathBuf,

    #[serde(default="default_save_every")]
    pub save_every: u64, // store every n-th annotated frame

    #[serde(default, serialize_with="ser_duration_as_fractional_secs", deserialize_with="de_duration_from_fractional_secs")]
    pub frame_interval: Duration, // pacing for replayed frames, zero means as fast as possible

    #[serde(default)]
    pub motion: MotionConfig,

    #[serde(default)]
    pub label_font: Option<PathBuf>, // TTF/OTF font file, frames are only labeled with the target if set

    #[serde(default="default_label_color")]
    pub label_color: String, // "rrggbb"

    #[serde(default="default_label_size")]
    pub label_size: f32 // pixel height of label detail lines
}

fn default_save_every()->u64 { 1 }
fn default_label_color()->String { "ffffff".into() }
fn default_label_size()->f32 { 16.0 }

#[derive(Serialize,Deserialize,Debug,Clone)]
pub struct SpotterConfig {
    pub camera: CameraPose,
    pub feed: FeedConfig,

    #[serde(default)]
    pub tracking: TrackingConfig,

    #[serde(default)]
    pub slew: SlewConfig,

    #[serde(default)]
    pub video: Option<VideoConfig>
}

impl SpotterConfig {
    pub fn load<P> (path: P)->Result<Self> where P: AsRef<Path> {
        Ok( load_ron_file( path)? )
    }

    /// everything we can check before connecting to anything. Any error here is fatal
    pub fn check (&self)->Result<()> {
        self.camera.check()?;
        self.feed.check()?;

        if self.camera.datum != self.feed.datum {
            return Err( SpotterError::ConfigError(
                format!("vertical datum mismatch: camera elevation is {} but feed altitudes are {}", self.camera.datum, self.feed.datum)))
        }

        if self.tracking.stale_after.is_zero() || self.tracking.expire_interval.is_zero() {
            return Err( SpotterError::ConfigError("stale_after and expire_interval have to be positive".into()))
        }

        self.slew.check()?;

        if let Some(video) = &self.video {
            if video.save_every == 0 {
                return Err( SpotterError::ConfigError("save_every has to be > 0".into()))
            }
            video.motion.check()?;
            get_hex_rgb( &video.label_color)?;
            if !(video.label_size > 0.0) {
                return Err( SpotterError::ConfigError( format!("label_size has to be positive: {}", video.label_size)))
            }
        }

        Ok(())
    }
}
