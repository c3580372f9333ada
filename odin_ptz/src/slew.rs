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

//! the slew controller decides if and where the camera has to move for the selected track.
//!
//! It is a two state machine (`Idle` / `Tracking`) that is stepped with a snapshot of the selected
//! track after each registry change. A move is only dispatched if the requested pointing differs from
//! what the camera was last successfully told (for whatever track) by more than the deadband, and if the
//! previous command is at least `min_command_interval` old. Device calls are bounded by `command_timeout`. Failed commands are
//! not recorded so that the next update retries them.

use std::{fmt, sync::Arc, time::{Duration,Instant}};
use serde::{Serialize,Deserialize};
use tokio::time::timeout;
use tracing::{debug,info,warn};
use odin_common::{
    angle::{clamp_azimuth, normalize_360},
    datetime::{self, ser_duration_as_fractional_secs, de_duration_from_fractional_secs},
    enu::{LookAngles,Pointing}
};
use odin_adsb::tracks::Track;
use crate::{device::PtzDevice, errors::{OdinPtzError,Result}};

/// the physical range of the camera mount. Azimuth is the clockwise sector `[azimuth_from,azimuth_to]`
/// (identical values mean unrestricted)
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct PointingLimits {
    #[serde(default)]
    pub azimuth_from: f64,
    #[serde(default)]
    pub azimuth_to: f64,
    #[serde(default)]
    pub min_elevation: f64,
    #[serde(default="default_max_elevation")]
    pub max_elevation: f64,
}

fn default_max_elevation()->f64 { 90.0 }

impl Default for PointingLimits {
    fn default()->Self {
        PointingLimits { azimuth_from: 0.0, azimuth_to: 0.0, min_elevation: 0.0, max_elevation: default_max_elevation() }
    }
}

impl PointingLimits {
    pub fn check (&self)->Result<()> {
        if !(self.azimuth_from.is_finite() && self.azimuth_to.is_finite()) {
            Err( OdinPtzError::ConfigError("non-finite azimuth limits".into()))
        } else if !(-90.0 <= self.min_elevation && self.min_elevation <= self.max_elevation && self.max_elevation <= 90.0) {
            Err( OdinPtzError::ConfigError( format!("invalid elevation limits [{},{}]", self.min_elevation, self.max_elevation)))
        } else {
            Ok(())
        }
    }

    /// clamp (never reject) a pointing into the physical range
    pub fn clamp (&self, azimuth: f64, elevation: f64)->Pointing {
        let az = clamp_azimuth( azimuth, self.azimuth_from, self.azimuth_to);
        let el = elevation.clamp( self.min_elevation, self.max_elevation);
        Pointing::new( az, el)
    }
}

/// corrections for a mount whose zero azimuth is not true north or whose zero elevation is not level.
/// Offsets are added to the computed angles before clamping
#[derive(Serialize,Deserialize,Debug,Clone,Default,PartialEq)]
pub struct MountOffsets {
    #[serde(default)]
    pub azimuth: f64,
    #[serde(default)]
    pub elevation: f64
}

#[derive(Serialize,Deserialize,Debug,Clone)]
pub struct SlewConfig {
    #[serde(default="default_deadband")]
    pub deadband: f64, // degrees, max per-axis change that does not cause a move

    #[serde(default="default_min_command_interval", serialize_with="ser_duration_as_fractional_secs", deserialize_with="de_duration_from_fractional_secs")]
    pub min_command_interval: Duration,

    #[serde(default="default_command_timeout", serialize_with="ser_duration_as_fractional_secs", deserialize_with="de_duration_from_fractional_secs")]
    pub command_timeout: Duration,

    #[serde(default)]
    pub limits: PointingLimits,

    #[serde(default)]
    pub offsets: MountOffsets
}

fn default_deadband()->f64 { 0.5 }
fn default_min_command_interval()->Duration { datetime::millis(500) }
fn default_command_timeout()->Duration { datetime::secs(2) }

impl Default for SlewConfig {
    fn default()->Self {
        SlewConfig {
            deadband: default_deadband(),
            min_command_interval: default_min_command_interval(),
            command_timeout: default_command_timeout(),
            limits: PointingLimits::default(),
            offsets: MountOffsets::default()
        }
    }
}

impl SlewConfig {
    pub fn check (&self)->Result<()> {
        if !self.deadband.is_finite() || self.deadband < 0.0 {
            return Err( OdinPtzError::ConfigError( format!("invalid deadband: {}", self.deadband)))
        }
        if self.command_timeout.is_zero() {
            return Err( OdinPtzError::ConfigError("command timeout has to be positive".into()))
        }
        if !(self.offsets.azimuth.is_finite() && self.offsets.elevation.is_finite()) {
            return Err( OdinPtzError::ConfigError("non-finite mount offsets".into()))
        }
        self.limits.check()
    }

    /// what we ask the device for a given look direction
    pub fn requested_pointing (&self, look: &LookAngles)->Pointing {
        let az = normalize_360( look.azimuth + self.offsets.azimuth);
        let el = look.elevation + self.offsets.elevation;
        self.limits.clamp( az, el)
    }
}

/// the part of a track the controller needs. This is a snapshot so that the registry does not have
/// to be locked while the device call is pending
#[derive(Debug,Clone,PartialEq)]
pub struct SlewTarget {
    pub icao24: Arc<String>,
    pub look: LookAngles,
    /// only consulted if the controller has not commanded anything yet
    pub last_commanded: Option<Pointing>
}

impl From<&Track> for SlewTarget {
    fn from (track: &Track)->Self {
        SlewTarget { icao24: track.icao24.clone(), look: track.look, last_commanded: track.last_commanded }
    }
}

#[derive(Debug,Clone,PartialEq)]
pub enum SlewState {
    Idle,
    Tracking { target: Arc<String> }
}

impl SlewState {
    pub fn is_idle (&self)->bool { matches!( self, SlewState::Idle) }

    pub fn target (&self)->Option<&Arc<String>> {
        match self {
            SlewState::Tracking{target} => Some(target),
            SlewState::Idle => None
        }
    }
}

/// what a single `steer` step did
#[derive(Debug,Clone,PartialEq)]
pub enum SlewOutcome {
    Idle,
    TargetLost(Arc<String>),
    WithinDeadband,
    RateLimited,
    /// the caller has to record `pointing` as last commanded for `target`
    Moved { target: Arc<String>, pointing: Pointing },
    Failed { target: Arc<String>, pointing: Pointing, error: String }
}

impl SlewOutcome {
    pub fn is_moved (&self)->bool { matches!( self, SlewOutcome::Moved{..}) }
}

impl fmt::Display for SlewOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlewOutcome::Idle => write!(f, "idle"),
            SlewOutcome::TargetLost(id) => write!(f, "target {id} lost"),
            SlewOutcome::WithinDeadband => write!(f, "within deadband"),
            SlewOutcome::RateLimited => write!(f, "rate limited"),
            SlewOutcome::Moved{target,pointing} => write!(f, "moved to {pointing} for {target}"),
            SlewOutcome::Failed{target,pointing,error} => write!(f, "move to {pointing} for {target} failed: {error}")
        }
    }
}

#[derive(Debug,Clone,Default)]
pub struct SlewStats {
    pub moves: u64,
    pub failures: u64,
    pub within_deadband: u64,
    pub rate_limited: u64
}

impl fmt::Display for SlewStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "moves: {}, failures: {}, within deadband: {}, rate limited: {}",
                self.moves, self.failures, self.within_deadband, self.rate_limited)
    }
}

pub struct SlewController<D> where D: PtzDevice {
    config: SlewConfig,
    device: D,
    state: SlewState,
    last_command: Option<Instant>, // last successful dispatch
    last_pointing: Option<Pointing>, // where that dispatch sent the camera
    stats: SlewStats
}

impl<D> SlewController<D> where D: PtzDevice {
    pub fn new (config: SlewConfig, device: D)->Self {
        SlewController { config, device, state: SlewState::Idle, last_command: None, last_pointing: None, stats: SlewStats::default() }
    }

    pub fn config (&self)->&SlewConfig { &self.config }
    pub fn state (&self)->&SlewState { &self.state }
    pub fn stats (&self)->&SlewStats { &self.stats }
    pub fn last_pointing (&self)->Option<&Pointing> { self.last_pointing.as_ref() }
    pub fn device (&self)->&D { &self.device }
    pub fn device_mut (&mut self)->&mut D { &mut self.device }

    /// step the state machine with the currently selected target (if any)
    pub async fn steer (&mut self, target: Option<SlewTarget>, now: Instant)->SlewOutcome {
        let Some(target) = target else {
            return match std::mem::replace( &mut self.state, SlewState::Idle) {
                SlewState::Tracking{target} => {
                    info!("lost target {}, camera idle", target);
                    SlewOutcome::TargetLost(target)
                }
                SlewState::Idle => SlewOutcome::Idle
            }
        };

        if self.state.target() != Some(&target.icao24) {
            info!("tracking {}", target.icao24);
            self.state = SlewState::Tracking{ target: target.icao24.clone() };
        }

        let pointing = self.config.requested_pointing( &target.look);

        // the camera may have been sent to another target since this one was last commanded
        if let Some(last) = self.last_pointing.as_ref().or( target.last_commanded.as_ref()) {
            if pointing.max_axis_delta( last) <= self.config.deadband {
                self.stats.within_deadband += 1;
                return SlewOutcome::WithinDeadband
            }
        }

        if let Some(t) = self.last_command {
            if now.saturating_duration_since(t) < self.config.min_command_interval {
                self.stats.rate_limited += 1;
                debug!("move to {} for {} rate limited", pointing, target.icao24);
                return SlewOutcome::RateLimited
            }
        }

        let res = match timeout( self.config.command_timeout, self.device.move_to( pointing.azimuth, pointing.elevation)).await {
            Ok(res) => res,
            Err(elapsed) => Err( elapsed.into())
        };

        match res {
            Ok(()) => {
                self.last_command = Some(now);
                self.last_pointing = Some(pointing);
                self.stats.moves += 1;
                debug!("moved to {} for {}", pointing, target.icao24);
                SlewOutcome::Moved { target: target.icao24, pointing }
            }
            Err(e) => {
                self.stats.failures += 1;
                warn!("move to {} for {} failed: {}", pointing, target.icao24, e);
                SlewOutcome::Failed { target: target.icao24, pointing, error: e.to_string() }
            }
        }
    }
}
