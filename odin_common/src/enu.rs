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

//! local tangent plane (East-North-Up) coordinates and look angles for a fixed observer.
//!
//! Both observer and target are converted to ECEF on the WGS84 ellipsoid, the difference vector is
//! rotated into the ENU frame of the observer, and azimuth/elevation are derived from that:
//! ```text
//!   azimuth   = atan2( east, north)            -> [0,360), 0 = north, clockwise
//!   elevation = atan2( up, sqrt(east²+north²)) -> [-90,90]
//!   range     = |enu|
//! ```
//! Heights of observer and target have to refer to the same vertical datum.

use std::fmt;
use nalgebra::{Matrix3,Vector3};
use serde::{Serialize,Deserialize};
use uom::si::{f64::Length, length::meter};

use crate::{atan2, deg, cartesian3::Cartesian3, cartographic::Cartographic, angle::{normalize_360,azimuth_distance}};

/// horizontal distance in meters below which we consider a target to be directly above or below
/// the observer (azimuth is undefined)
pub const OVERHEAD_EPSILON: f64 = 0.01;

#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct Enu {
    pub east: f64,  // meters
    pub north: f64, // meters
    pub up: f64     // meters
}

impl Enu {
    pub fn horizontal_distance (&self)->f64 { (self.east*self.east + self.north*self.north).sqrt() }
    pub fn range (&self)->f64 { (self.east*self.east + self.north*self.north + self.up*self.up).sqrt() }
}

/// observer relative direction and distance of a target
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct LookAngles {
    pub azimuth: f64,   // degrees [0,360)
    pub elevation: f64, // degrees [-90,90]
    pub range: Length
}

impl LookAngles {
    pub fn range_m (&self)->f64 { self.range.get::<meter>() }

    pub fn pointing (&self)->Pointing { Pointing::new( self.azimuth, self.elevation) }
}

impl fmt::Display for LookAngles {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(az: {:.3}°, el: {:.3}°, range: {:.0}m)", self.azimuth, self.elevation, self.range_m())
    }
}

/// a camera direction. Azimuth is always normalized to [0,360), elevation is limited to [-90,90]
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct Pointing {
    pub azimuth: f64,
    pub elevation: f64
}

impl Pointing {
    pub fn new (azimuth: f64, elevation: f64)->Self {
        Pointing { azimuth: normalize_360(azimuth), elevation: elevation.clamp(-90.0, 90.0) }
    }

    /// the larger of the two per-axis angular differences (azimuth taking the shorter way around)
    pub fn max_axis_delta (&self, other: &Pointing)->f64 {
        let d_az = azimuth_distance( self.azimuth, other.azimuth);
        let d_el = (self.elevation - other.elevation).abs();
        d_az.max(d_el)
    }
}

impl fmt::Display for Pointing {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(az: {:.3}°, el: {:.3}°)", self.azimuth, self.elevation)
    }
}

/// the ENU frame of a fixed observer. Since the observer does not move we pre-compute its
/// ECEF position and the rotation matrix
#[derive(Debug,Clone)]
pub struct EnuFrame {
    origin: Cartographic,
    origin_ecef: Vector3<f64>,
    rotation: Matrix3<f64>
}

impl EnuFrame {
    pub fn new (origin: &Cartographic)->Self {
        let φ = origin.latitude;
        let λ = origin.longitude;
        let (sin_φ, cos_φ) = φ.sin_cos();
        let (sin_λ, cos_λ) = λ.sin_cos();

        let rotation = Matrix3::new(
            -sin_λ,          cos_λ,          0.0,
            -sin_φ * cos_λ, -sin_φ * sin_λ,  cos_φ,
             cos_φ * cos_λ,  cos_φ * sin_λ,  sin_φ
        );
        let origin_ecef = Cartesian3::from(origin).to_vector3();

        EnuFrame { origin: *origin, origin_ecef, rotation }
    }

    pub fn origin (&self)->&Cartographic { &self.origin }

    pub fn to_enu (&self, p: &Cartographic)->Enu {
        let d = Cartesian3::from(p).to_vector3() - self.origin_ecef;
        let v = self.rotation * d;
        Enu { east: v.x, north: v.y, up: v.z }
    }

    /// compute look angles for target `p`. The `fallback_azimuth` is returned as azimuth if the target
    /// is (within [`OVERHEAD_EPSILON`]) directly above or below the observer, which is usually the last
    /// valid azimuth for this target or 0 if there is none
    pub fn look_angles (&self, p: &Cartographic, fallback_azimuth: f64)->LookAngles {
        look_angles_from_enu( &self.to_enu(p), fallback_azimuth)
    }
}

pub fn look_angles_from_enu (enu: &Enu, fallback_azimuth: f64)->LookAngles {
    let horizontal = enu.horizontal_distance();
    let range = enu.range();

    let (azimuth, elevation) = if range < OVERHEAD_EPSILON {
        (normalize_360(fallback_azimuth), 0.0) // coincident
    } else if horizontal < OVERHEAD_EPSILON {
        (normalize_360(fallback_azimuth), if enu.up >= 0.0 { 90.0 } else { -90.0 })
    } else {
        ( normalize_360( deg( atan2( enu.east, enu.north))), deg( atan2( enu.up, horizontal)) )
    };

    LookAngles { azimuth, elevation, range: Length::new::<meter>(range) }
}
