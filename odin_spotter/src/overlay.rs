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

//! annotation of video frames with the currently tracked aircraft

use std::sync::Arc;
use image::{Rgb, RgbImage};
use tokio::sync::watch;
use odin_common::enu::Pointing;
use odin_adsb::tracks::Track;
use odin_image::overlay::{draw_label, FontVec, FrameLabel};

/// what the tracking side publishes about the selected target after each slew decision
#[derive(Debug,Clone,PartialEq)]
pub struct TargetInfo {
    pub icao24: Arc<String>,
    pub callsign: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_m: f64,
    pub distance_m: f64,
    pub camera: Option<Pointing> // where the camera was last sent
}

impl TargetInfo {
    pub fn new (track: &Track, camera: Option<Pointing>)->Self {
        TargetInfo {
            icao24: track.icao24.clone(),
            callsign: track.callsign.clone(),
            latitude: track.report.latitude(),
            longitude: track.report.longitude(),
            altitude_m: track.report.altitude_m(),
            distance_m: track.look.range_m(),
            camera
        }
    }

    pub fn to_frame_label (&self)->FrameLabel {
        let title = self.callsign.as_deref().unwrap_or( self.icao24.as_str());
        let camera = match &self.camera {
            Some(p) => format!("camera az: {:.1}, el: {:.1}", p.azimuth, p.elevation),
            None => "camera: not commanded".to_string()
        };

        FrameLabel::new( title)
            .with_line( format!("{:.3}, {:.3} @ {:.0}m (dist: {:.0}m)", self.latitude, self.longitude, self.altitude_m, self.distance_m))
            .with_line( camera)
    }
}

/// draws the latest published [`TargetInfo`] into frames. This is used from the blocking video loop,
/// reading the watch channel does not block
pub struct VideoOverlay {
    font: FontVec,
    color: Rgb<u8>,
    line_height: f32,
    target: watch::Receiver<Option<TargetInfo>>
}

impl VideoOverlay {
    pub fn new (font: FontVec, color: Rgb<u8>, line_height: f32, target: watch::Receiver<Option<TargetInfo>>)->Self {
        VideoOverlay { font, color, line_height, target }
    }

    /// returns true if there was a target to draw
    pub fn draw (&self, img: &mut RgbImage)->bool {
        let label = self.target.borrow().as_ref().map( |t| t.to_frame_label());
        match label {
            Some(label) => draw_label( img, &self.font, &label, self.color, self.line_height).is_some(),
            None => false
        }
    }
}
