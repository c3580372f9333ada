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

use std::{fmt, sync::Arc};
use uom::si::{length::{meter,foot},f64::Length};
use chrono::{DateTime,Utc};
use serde::{Serialize,Deserialize};
use odin_common::{
    angle::{is_valid_latitude, is_valid_longitude},
    cartographic::Cartographic, enu::EnuFrame, uom::feet
};

pub mod sbs;
pub mod feed;
pub mod selection;
pub mod tracks;

pub mod errors;
use errors::{OdinAdsbError,Result};

/// the vertical reference of heights. Camera elevation and aircraft altitudes have to use the same
/// datum, otherwise elevation angles are systematically biased (at 10km range a 50m datum mismatch is ~0.3°)
#[derive(Debug,Clone,Copy,PartialEq,Eq,Default,Serialize,Deserialize)]
pub enum VerticalDatum {
    /// (approximately) mean sea level, which is what barometric ADS-B altitudes refer to
    #[default]
    MeanSeaLevel,
    /// WGS84 ellipsoid heights (e.g. raw GNSS altitudes)
    Ellipsoid
}

impl fmt::Display for VerticalDatum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerticalDatum::MeanSeaLevel => write!(f, "MSL"),
            VerticalDatum::Ellipsoid => write!(f, "WGS84 ellipsoid")
        }
    }
}

/// a single validated aircraft position observation.
/// Reports are immutable once constructed - a later report for the same aircraft supersedes it
#[derive(Debug,Clone,PartialEq)]
pub struct PositionReport {
    icao24: Arc<String>, // we keep that in an Arc so that we can clone without heap allocation
    latitude: f64,       // degrees
    longitude: f64,      // degrees
    altitude: Length,
    timestamp: DateTime<Utc>
}

impl PositionReport {
    pub fn new (icao24: Arc<String>, latitude: f64, longitude: f64, altitude: Length, timestamp: DateTime<Utc>)->Result<Self> {
        if icao24.is_empty() {
            return Err( OdinAdsbError::InvalidReport("empty icao24".into()))
        }
        if !is_valid_latitude(latitude) {
            return Err( OdinAdsbError::InvalidReport( format!("latitude out of range: {latitude}")))
        }
        if !is_valid_longitude(longitude) {
            return Err( OdinAdsbError::InvalidReport( format!("longitude out of range: {longitude}")))
        }
        if !altitude.get::<meter>().is_finite() {
            return Err( OdinAdsbError::InvalidReport( "non-finite altitude".into()))
        }

        Ok( PositionReport{ icao24, latitude, longitude, altitude, timestamp } )
    }

    /// ADS-B altitudes are reported in feet
    pub fn from_feet (icao24: Arc<String>, latitude: f64, longitude: f64, altitude_ft: f64, timestamp: DateTime<Utc>)->Result<Self> {
        PositionReport::new( icao24, latitude, longitude, feet(altitude_ft), timestamp)
    }

    pub fn icao24 (&self)->&Arc<String> { &self.icao24 }
    pub fn latitude (&self)->f64 { self.latitude }
    pub fn longitude (&self)->f64 { self.longitude }
    pub fn altitude (&self)->Length { self.altitude }
    pub fn altitude_m (&self)->f64 { self.altitude.get::<meter>() }
    pub fn timestamp (&self)->DateTime<Utc> { self.timestamp }

    pub fn position (&self)->Cartographic {
        Cartographic::from_degrees( self.longitude, self.latitude, self.altitude_m())
    }
}

impl fmt::Display for PositionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "PositionReport( icao24: {}, lat: {:.5}, lon: {:.5}, alt: {:.0}ft, time: {})",
            self.icao24, self.latitude, self.longitude, self.altitude.get::<foot>(), self.timestamp)
    }
}

/// the fixed position of the camera mount. Zero azimuth of the mount has to point to geographic north
/// and zero elevation has to be horizontal
#[derive(Debug,Clone,Serialize,Deserialize)]
pub struct CameraPose {
    pub latitude: f64,  // degrees
    pub longitude: f64, // degrees
    pub elevation: f64, // meters above `datum`
    #[serde(default)]
    pub datum: VerticalDatum
}

impl CameraPose {
    pub fn new (latitude: f64, longitude: f64, elevation: f64)->Self {
        CameraPose { latitude, longitude, elevation, datum: VerticalDatum::default() }
    }

    pub fn check (&self)->Result<()> {
        if !is_valid_latitude(self.latitude) {
            Err( OdinAdsbError::ConfigError( format!("invalid camera latitude: {}", self.latitude)))
        } else if !is_valid_longitude(self.longitude) {
            Err( OdinAdsbError::ConfigError( format!("invalid camera longitude: {}", self.longitude)))
        } else if !self.elevation.is_finite() {
            Err( OdinAdsbError::ConfigError( format!("invalid camera elevation: {}", self.elevation)))
        } else {
            Ok(())
        }
    }

    pub fn position (&self)->Cartographic {
        Cartographic::from_degrees( self.longitude, self.latitude, self.elevation)
    }

    pub fn enu_frame (&self)->EnuFrame {
        EnuFrame::new( &self.position())
    }
}
