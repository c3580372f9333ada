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

//! target selection policies. A policy picks at most one of the live (and observable) tracks,
//! given the currently selected one

use std::fmt::Debug;
use serde::{Serialize,Deserialize};
use crate::tracks::Track;

pub trait SelectionPolicy: Debug + Send + Sync {
    fn name (&self)->&'static str;

    /// pick a target from `candidates` (sorted by icao24). `current` is the selected track if it is
    /// still a candidate
    fn select<'a> (&self, candidates: &[&'a Track], current: Option<&'a Track>)->Option<&'a Track>;
}

/// track the closest aircraft. A different aircraft has to be at least `hysteresis` meters closer
/// than the current target to take over
#[derive(Debug,Clone,Default)]
pub struct NearestRange {
    pub hysteresis: f64
}

impl SelectionPolicy for NearestRange {
    fn name (&self)->&'static str { "nearest-range" }

    fn select<'a> (&self, candidates: &[&'a Track], current: Option<&'a Track>)->Option<&'a Track> {
        let nearest = candidates.iter()
            .min_by( |a,b| a.look.range_m().total_cmp( &b.look.range_m()))
            .copied()?;

        match current {
            Some(cur) if cur.look.range_m() <= nearest.look.range_m() + self.hysteresis => Some(cur),
            _ => Some(nearest)
        }
    }
}

/// keep the current target for as long as it is live, otherwise pick the one we have known longest
#[derive(Debug,Clone,Default)]
pub struct FirstSeen;

impl SelectionPolicy for FirstSeen {
    fn name (&self)->&'static str { "first-seen" }

    fn select<'a> (&self, candidates: &[&'a Track], current: Option<&'a Track>)->Option<&'a Track> {
        current.or_else( || candidates.iter().min_by_key( |t| t.first_seen).copied())
    }
}

/// restricts which tracks can be selected at all
#[derive(Debug,Clone,Default,Serialize,Deserialize)]
pub struct CandidateFilter {
    #[serde(default)]
    pub min_elevation: Option<f64>, // degrees
    #[serde(default)]
    pub max_range: Option<f64>      // meters
}

impl CandidateFilter {
    pub fn accepts (&self, track: &Track)->bool {
        self.min_elevation.is_none_or( |min_el| track.look.elevation >= min_el)
            && self.max_range.is_none_or( |max_range| track.look.range_m() <= max_range)
    }
}

/// serializable policy spec as used in config files
#[derive(Debug,Clone,Serialize,Deserialize)]
pub enum PolicyKind {
    NearestRange { #[serde(default)] hysteresis: f64 },
    FirstSeen
}

impl Default for PolicyKind {
    fn default()->Self { PolicyKind::NearestRange{ hysteresis: 0.0 } }
}

impl PolicyKind {
    pub fn to_policy (&self)->Box<dyn SelectionPolicy> {
        match self {
            PolicyKind::NearestRange{hysteresis} => Box::new( NearestRange{ hysteresis: *hysteresis }),
            PolicyKind::FirstSeen => Box::new( FirstSeen )
        }
    }
}
