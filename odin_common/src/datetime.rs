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

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize,Serializer,Deserializer};
use std::time::Duration;

// for simple use cases that do not require to handle leap seconds and the like we provide our own wrappers
#[inline] pub fn millis (n: u64)->Duration { Duration::from_millis(n) }
#[inline] pub fn secs (n: u64)->Duration { Duration::from_secs(n) }

/// this should be used wherever we might have to use sim clock instead of wall clock
#[inline]
pub fn utc_now()->DateTime<Utc> {
    Utc::now()
}

/// saturating conversion of a std Duration into a chrono TimeDelta
pub fn to_time_delta (dur: Duration)->TimeDelta {
    TimeDelta::from_std(dur).unwrap_or(TimeDelta::MAX)
}

//--- serde support for config durations given as fractional seconds (e.g. `stale_after: 60.0`)

pub fn ser_duration_as_fractional_secs<S: Serializer> (dur: &Duration, s: S) -> Result<S::Ok, S::Error>  {
    let secs = dur.as_secs_f64();
    s.serialize_f64( secs)
}

pub fn de_duration_from_fractional_secs <'a,D>(deserializer: D) -> Result<Duration,D::Error> where D: Deserializer<'a> {
    let secs: f64 = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err( |e| serde::de::Error::custom( format!("invalid duration {secs}: {e}")))
}
