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

//! plain f64 degree helpers for pointing computations. All functions operate on degrees

/// map to [0,360). Note that `-0.0 % 360.0` and tiny negative values can round to 360.0 which we fold back to 0
#[inline]
pub fn normalize_360 (d: f64) -> f64 {
    let x = d % 360.0;
    let x = if x < 0.0 { 360.0 + x } else { x };
    if x >= 360.0 { 0.0 } else { x }
}

/// signed shortest rotation from `from` to `to` in (-180,180]
#[inline]
pub fn azimuth_delta (from: f64, to: f64) -> f64 {
    let d = normalize_360(to - from);
    if d > 180.0 { d - 360.0 } else { d }
}

/// absolute shortest angular distance between two azimuths in [0,180]
#[inline]
pub fn azimuth_distance (a: f64, b: f64) -> f64 {
    azimuth_delta(a,b).abs()
}

/// check if azimuth `az` is within the clockwise sector `[from,to]`. A sector with `from > to` wraps
/// through north, `from == to` is interpreted as full circle
pub fn is_in_azimuth_sector (az: f64, from: f64, to: f64) -> bool {
    let az = normalize_360(az);
    let from = normalize_360(from);
    let to = normalize_360(to);

    if from == to { true }
    else if from < to { az >= from && az <= to }
    else { az >= from || az <= to }
}

/// clamp azimuth into clockwise sector `[from,to]`, choosing the closer sector boundary if outside
pub fn clamp_azimuth (az: f64, from: f64, to: f64) -> f64 {
    let az = normalize_360(az);
    if is_in_azimuth_sector(az, from, to) {
        az
    } else if azimuth_distance(az, from) <= azimuth_distance(az, to) {
        normalize_360(from)
    } else {
        normalize_360(to)
    }
}

#[inline]
pub fn is_valid_latitude (lat: f64) -> bool { lat.is_finite() && (-90.0..=90.0).contains(&lat) }

#[inline]
pub fn is_valid_longitude (lon: f64) -> bool { lon.is_finite() && (-180.0..=180.0).contains(&lon) }
