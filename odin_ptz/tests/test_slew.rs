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

use std::{sync::Arc, time::{Duration,Instant}};
use async_trait::async_trait;
use chrono::{TimeZone,Utc};
use tokio::time::sleep;
use odin_common::{enu::{LookAngles,Pointing}, uom::meters};
use odin_adsb::{CameraPose, PositionReport, selection::NearestRange, tracks::TrackRegistry};
use odin_ptz::{
    OdinPtzError, Result,
    device::{onvif_pan_tilt, LoggingPtz, PtzDevice},
    slew::{MountOffsets, PointingLimits, SlewConfig, SlewController, SlewOutcome, SlewState, SlewTarget}
};

// run with  cargo test --test test_slew -- --nocapture

#[derive(Default)]
struct MockPtz {
    moves: Vec<(f64,f64)>,
    fail: bool,
    delay: Option<Duration>
}

#[async_trait]
impl PtzDevice for MockPtz {
    async fn move_to (&mut self, azimuth: f64, elevation: f64)->Result<()> {
        if let Some(delay) = self.delay { sleep(delay).await }
        if self.fail { return Err( OdinPtzError::DeviceError("camera unreachable".into())) }
        self.moves.push( (azimuth,elevation));
        Ok(())
    }
}

fn target (id: &str, azimuth: f64, elevation: f64, last_commanded: Option<Pointing>)->SlewTarget {
    SlewTarget {
        icao24: Arc::new( id.to_string()),
        look: LookAngles { azimuth, elevation, range: meters(5000.0) },
        last_commanded
    }
}

fn config ()->SlewConfig {
    SlewConfig { deadband: 0.5, min_command_interval: Duration::from_secs(1), ..SlewConfig::default() }
}

#[tokio::test]
async fn test_single_move_for_jitter () {
    println!("\n--- test_single_move_for_jitter");
    let t0 = Utc.with_ymd_and_hms( 2025, 6, 1, 12, 0, 0).unwrap();
    let mut reg = TrackRegistry::new( &CameraPose::new( 0.0, 0.0, 0.0), Duration::from_secs(60), Box::new( NearestRange::default()));
    let mut slew = SlewController::new( config(), MockPtz::default());
    let now = Instant::now();

    let report = PositionReport::new( Arc::new("A00001".into()), 0.01, 0.0, meters(10000.0), t0).unwrap();
    reg.update( report);
    let tgt = reg.select_target().map( SlewTarget::from);
    let outcome = slew.steer( tgt, now).await;
    println!("  {outcome}");

    let SlewOutcome::Moved{target,pointing} = outcome else { panic!("expected move") };
    assert!( pointing.azimuth < 1e-3 || pointing.azimuth > 360.0 - 1e-3);
    assert!( pointing.elevation > 0.0);
    assert!( reg.record_command( &target, pointing));

    // 0.0001° jitter, well past the rate limit
    let report = PositionReport::new( Arc::new("A00001".into()), 0.0101, 0.0, meters(10000.0), t0 + chrono::TimeDelta::seconds(1)).unwrap();
    reg.update( report);
    let tgt = reg.select_target().map( SlewTarget::from);
    let outcome = slew.steer( tgt, now + Duration::from_secs(5)).await;
    println!("  {outcome}");

    assert_eq!( outcome, SlewOutcome::WithinDeadband);
    assert_eq!( slew.device().moves.len(), 1);
    assert_eq!( slew.stats().moves, 1);
    println!("✅");
}

#[tokio::test]
async fn test_return_to_previous_target () {
    println!("\n--- test_return_to_previous_target");
    let t0 = Utc.with_ymd_and_hms( 2025, 6, 1, 12, 0, 0).unwrap();
    let secs = |s| t0 + chrono::TimeDelta::seconds(s);
    let report = |id: &str, lat, lon, ts| PositionReport::new( Arc::new(id.to_string()), lat, lon, meters(3000.0), ts).unwrap();

    let mut reg = TrackRegistry::new( &CameraPose::new( 0.0, 0.0, 0.0), Duration::from_secs(60), Box::new( NearestRange::default()));
    let mut slew = SlewController::new( config(), MockPtz::default());
    let now = Instant::now();

    // A in the north
    reg.update( report( "A00001", 0.01, 0.0, t0));
    let outcome = slew.steer( reg.select_target().map( SlewTarget::from), now).await;
    println!("  1: {outcome}");
    let SlewOutcome::Moved{target,pointing} = outcome else { panic!("expected move to A") };
    reg.record_command( &target, pointing);

    // B in the east is closer and takes over
    reg.update( report( "B00002", 0.0, 0.005, t0));
    let outcome = slew.steer( reg.select_target().map( SlewTarget::from), now + Duration::from_secs(2)).await;
    println!("  2: {outcome}");
    let SlewOutcome::Moved{target,pointing} = outcome else { panic!("expected move to B") };
    assert_eq!( target.as_str(), "B00002");
    reg.record_command( &target, pointing);

    // B expires, A is selected again at the position it was last commanded for
    reg.update( report( "A00001", 0.01, 0.0, secs(50)));
    let expiry = reg.expire( secs(61));
    assert_eq!( expiry.lost_target.as_ref().map( |id| id.as_str()), Some("B00002"));

    let tgt = reg.select_target().map( SlewTarget::from).unwrap();
    assert_eq!( tgt.icao24.as_str(), "A00001");
    assert!( tgt.last_commanded.is_some());

    let outcome = slew.steer( Some(tgt), now + Duration::from_secs(4)).await;
    println!("  3: {outcome}");
    assert!( outcome.is_moved());

    let (az,el) = *slew.device().moves.last().unwrap();
    println!("  camera at az {az:.3} el {el:.3}");
    assert!( az < 1e-3 || az > 360.0 - 1e-3);
    assert_eq!( slew.device().moves.len(), 3);
    assert_eq!( slew.last_pointing(), Some( &Pointing::new( az, el)));
    println!("✅");
}

#[tokio::test]
async fn test_deadband () {
    println!("\n--- test_deadband");
    let mut slew = SlewController::new( config(), MockPtz::default());
    let now = Instant::now();
    let last = Some( Pointing::new( 10.0, 20.0));

    assert_eq!( slew.steer( Some( target( "A00001", 10.3, 20.2, last)), now).await, SlewOutcome::WithinDeadband);
    assert_eq!( slew.steer( Some( target( "A00001", 10.0, 20.5, last)), now).await, SlewOutcome::WithinDeadband); // not exceeding

    // deadband is per axis and wraps through north
    let last = Some( Pointing::new( 359.8, 20.0));
    assert_eq!( slew.steer( Some( target( "A00001", 0.1, 20.0, last)), now).await, SlewOutcome::WithinDeadband);

    assert!( slew.steer( Some( target( "A00001", 11.0, 20.0, Some( Pointing::new( 10.0, 20.0)))), now).await.is_moved());
    assert_eq!( slew.device().moves, vec![(11.0,20.0)]);
    assert_eq!( slew.state(), &SlewState::Tracking{ target: Arc::new("A00001".into()) });
    println!("✅");
}

#[tokio::test]
async fn test_rate_limit () {
    println!("\n--- test_rate_limit");
    let mut slew = SlewController::new( config(), MockPtz::default());
    let now = Instant::now();

    assert!( slew.steer( Some( target( "A00001", 10.0, 20.0, None)), now).await.is_moved());

    let last = Some( Pointing::new( 10.0, 20.0));
    let outcome = slew.steer( Some( target( "A00001", 20.0, 20.0, last)), now + Duration::from_millis(500)).await;
    assert_eq!( outcome, SlewOutcome::RateLimited);

    // the next update re-evaluates
    let outcome = slew.steer( Some( target( "A00001", 21.0, 20.0, last)), now + Duration::from_millis(1000)).await;
    println!("  {outcome}");
    assert!( outcome.is_moved());
    assert_eq!( slew.device().moves.len(), 2);
    assert_eq!( slew.stats().rate_limited, 1);
    println!("✅");
}

#[tokio::test]
async fn test_failed_move_is_retried () {
    println!("\n--- test_failed_move_is_retried");
    let mut slew = SlewController::new( config(), MockPtz{ fail: true, ..MockPtz::default() });
    let now = Instant::now();

    let outcome = slew.steer( Some( target( "A00001", 10.0, 20.0, None)), now).await;
    println!("  {outcome}");
    assert!( matches!( outcome, SlewOutcome::Failed{..}));
    assert!( slew.device().moves.is_empty());

    // nothing was recorded, so the next update tries again and is not rate limited
    slew.device_mut().fail = false;
    let outcome = slew.steer( Some( target( "A00001", 10.1, 20.0, None)), now + Duration::from_millis(100)).await;
    assert!( outcome.is_moved());
    assert_eq!( slew.stats().failures, 1);
    assert_eq!( slew.stats().moves, 1);
    println!("✅");
}

#[tokio::test]
async fn test_command_timeout () {
    println!("\n--- test_command_timeout");
    let config = SlewConfig { command_timeout: Duration::from_millis(50), ..config() };
    let mut slew = SlewController::new( config, MockPtz{ delay: Some( Duration::from_secs(2)), ..MockPtz::default() });

    let outcome = slew.steer( Some( target( "A00001", 10.0, 20.0, None)), Instant::now()).await;
    println!("  {outcome}");
    match outcome {
        SlewOutcome::Failed{error,..} => assert!( error.contains("timed out")),
        other => panic!("expected failure, got {other}")
    }
    assert!( slew.device().moves.is_empty());
    println!("✅");
}

#[tokio::test]
async fn test_target_lost () {
    println!("\n--- test_target_lost");
    let mut slew = SlewController::new( config(), MockPtz::default());
    let now = Instant::now();

    assert_eq!( slew.steer( None, now).await, SlewOutcome::Idle);
    assert!( slew.steer( Some( target( "A00001", 10.0, 20.0, None)), now).await.is_moved());

    assert_eq!( slew.steer( None, now + Duration::from_secs(2)).await, SlewOutcome::TargetLost( Arc::new("A00001".into())));
    assert!( slew.state().is_idle());
    assert_eq!( slew.steer( None, now + Duration::from_secs(4)).await, SlewOutcome::Idle);
    assert_eq!( slew.device().moves.len(), 1);

    // a new target gets a move right away
    assert!( slew.steer( Some( target( "B00002", 200.0, 10.0, None)), now + Duration::from_secs(6)).await.is_moved());
    assert_eq!( slew.state().target().map( |id| id.as_str()), Some("B00002"));
    println!("✅");
}

#[test]
fn test_offsets_and_limits () {
    println!("\n--- test_offsets_and_limits");
    let look = |azimuth, elevation| LookAngles { azimuth, elevation, range: meters(1000.0) };

    let mut config = SlewConfig { offsets: MountOffsets{ azimuth: 10.0, elevation: 10.0 }, ..SlewConfig::default() };
    assert_eq!( config.requested_pointing( &look( 0.0, 81.0)), Pointing::new( 10.0, 90.0));

    config.offsets = MountOffsets{ azimuth: -10.0, elevation: -10.0 };
    assert_eq!( config.requested_pointing( &look( 5.0, 45.0)), Pointing::new( 355.0, 35.0));
    assert_eq!( config.requested_pointing( &look( 90.0, 5.0)), Pointing::new( 80.0, 0.0));

    // southern sector mount
    config.offsets = MountOffsets::default();
    config.limits = PointingLimits{ azimuth_from: 90.0, azimuth_to: 270.0, min_elevation: 0.0, max_elevation: 80.0 };
    assert!( config.check().is_ok());
    assert_eq!( config.requested_pointing( &look( 10.0, -5.0)), Pointing::new( 90.0, 0.0));
    assert_eq!( config.requested_pointing( &look( 350.0, 85.0)), Pointing::new( 270.0, 80.0));
    assert_eq!( config.requested_pointing( &look( 180.0, 45.0)), Pointing::new( 180.0, 45.0));

    config.limits.min_elevation = 85.0;
    assert!( config.check().is_err());
    println!("✅");
}

#[test]
fn test_onvif_pan_tilt () {
    println!("\n--- test_onvif_pan_tilt");
    assert_eq!( onvif_pan_tilt( &Pointing::new( 0.0, 45.0)), (0.0, 0.0));
    assert_eq!( onvif_pan_tilt( &Pointing::new( 90.0, 0.0)), (0.5, 1.0));
    assert_eq!( onvif_pan_tilt( &Pointing::new( 180.0, 90.0)), (1.0, -1.0));
    assert_eq!( onvif_pan_tilt( &Pointing::new( 270.0, 67.5)), (-0.5, -0.5));
    println!("✅");
}

#[tokio::test]
async fn test_logging_ptz () {
    println!("\n--- test_logging_ptz");
    let mut slew = SlewController::new( config(), LoggingPtz::new());
    slew.steer( Some( target( "A00001", 123.0, 45.0, None)), Instant::now()).await;
    assert_eq!( slew.device().current(), Some( &Pointing::new( 123.0, 45.0)));
    println!("✅");
}

#[test]
fn test_slew_config () {
    println!("\n--- test_slew_config");
    let config: SlewConfig = ron::from_str( r#"(
        deadband: 0.25,
        min_command_interval: 1.5,
        limits: ( min_elevation: 5.0 ),
        offsets: ( azimuth: -2.5 ),
    )"#).unwrap();

    assert_eq!( config.deadband, 0.25);
    assert_eq!( config.min_command_interval, Duration::from_millis(1500));
    assert_eq!( config.command_timeout, Duration::from_secs(2));
    assert_eq!( config.limits.max_elevation, 90.0);
    assert_eq!( config.offsets, MountOffsets{ azimuth: -2.5, elevation: 0.0 });
    assert!( config.check().is_ok());
    println!("✅");
}
