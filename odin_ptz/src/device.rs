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

//! the camera actuator capability. Concrete cameras (ONVIF, vendor HTTP APIs, serial mounts) implement
//! [`PtzDevice`], everything above only sees absolute azimuth/elevation moves in degrees

use async_trait::async_trait;
use tracing::info;
use odin_common::{angle::normalize_360, enu::Pointing};
use crate::errors::{OdinPtzError,Result};

#[async_trait]
pub trait PtzDevice: Send {
    /// move to absolute `azimuth` [0,360) and `elevation` in degrees. Returning `Ok` means the
    /// command was accepted by the device, not that the move is completed
    async fn move_to (&mut self, azimuth: f64, elevation: f64)->Result<()>;
}

#[async_trait]
impl<T> PtzDevice for Box<T> where T: PtzDevice + ?Sized {
    async fn move_to (&mut self, azimuth: f64, elevation: f64)->Result<()> {
        (**self).move_to( azimuth, elevation).await
    }
}

/// a device that does not move anything but logs and remembers the commands it gets.
/// This is the dry-run device of the spotter and a convenient test double
#[derive(Debug,Default)]
pub struct LoggingPtz {
    history: Vec<Pointing>
}

impl LoggingPtz {
    pub fn new ()->Self { LoggingPtz::default() }

    pub fn history (&self)->&[Pointing] { &self.history }
    pub fn current (&self)->Option<&Pointing> { self.history.last() }
}

#[async_trait]
impl PtzDevice for LoggingPtz {
    async fn move_to (&mut self, azimuth: f64, elevation: f64)->Result<()> {
        let pointing = Pointing::new( azimuth, elevation);
        info!("PTZ move to {}", pointing);
        self.history.push( pointing);
        Ok(())
    }
}

/// convert a pointing into ONVIF generic pan/tilt space coordinates (both in [-1,1]).
/// Pan 0 is north, +1/-1 are both south (east is +0.5), tilt +1 is horizontal and -1 is zenith
pub fn onvif_pan_tilt (pointing: &Pointing)->(f64,f64) {
    let az = normalize_360( pointing.azimuth);
    let x = if az <= 180.0 { az / 180.0 } else { (az - 360.0) / 180.0 };
    let y = (45.0 - pointing.elevation.clamp( 0.0, 90.0)) / 45.0;
    (x, y)
}
