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

use nalgebra::Vector3;
use serde::{Serialize,Deserialize};
use crate::geo_constants::{EARTH_RADIUS_RATIO_SQUARED, EQATORIAL_EARTH_RADIUS, E_EARTH_SQUARED};
use crate::cartographic::Cartographic;

/// earth centered earth fixed (ECEF) coordinates in meters.
/// note that we do not use uom here since this is only used in internal computations

#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct Cartesian3 {
    pub x: f64,
    pub y: f64,
    pub z: f64
}

impl Cartesian3 {
    pub fn new (x: f64, y: f64, z: f64)->Cartesian3 {
        Cartesian3{x,y,z}
    }

    pub fn length(&self) -> f64 {
        ((self.x * self.x) + (self.y * self.y) + (self.z * self.z)).sqrt()
    }

    pub fn distance_to (&self, p: &Cartesian3) -> f64 {
        (p.to_vector3() - self.to_vector3()).norm()
    }

    pub fn to_vector3 (&self) -> Vector3<f64> {
        Vector3::new( self.x, self.y, self.z)
    }
}

impl std::fmt::Display for Cartesian3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[ {}, {}, {} ]", self.x, self.y, self.z)
    }
}

/// convert WGS84 into ECEF coordinates
impl From<Cartographic> for Cartesian3 {
    fn from(p: Cartographic) -> Self {
        Cartesian3::from(&p)
    }
}

impl From<&Cartographic> for Cartesian3 {
    fn from(p: &Cartographic) -> Self {
        let φ = p.latitude;
        let λ = p.longitude;
        let h = p.height;

        let sin_φ = φ.sin();
        let cos_φ = φ.cos();

        let b = EQATORIAL_EARTH_RADIUS / ( 1.0 - E_EARTH_SQUARED* (sin_φ * sin_φ)).sqrt();
        let c = (b + h)*cos_φ;

        let x = c *  λ.cos();
        let y = c *  λ.sin();
        let z = (EARTH_RADIUS_RATIO_SQUARED * b + h) * sin_φ;

        Cartesian3::new( x, y, z)
    }
}
