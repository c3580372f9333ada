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

use std::{collections::HashMap, fmt, sync::Arc, time::Duration};
use chrono::{DateTime,Utc};
use tracing::{debug,info};
use odin_common::{datetime::to_time_delta, enu::{EnuFrame,LookAngles,Pointing}};
use crate::{CameraPose, PositionReport, selection::{CandidateFilter,SelectionPolicy}};

/// the live state of an aircraft we have received at least one full position report for
#[derive(Debug,Clone)]
pub struct Track {
    pub icao24: Arc<String>,
    pub callsign: Option<String>,
    pub report: PositionReport,
    pub look: LookAngles,
    pub last_commanded: Option<Pointing>, // what the camera was last told for this track
    pub first_seen: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
    pub n_updates: usize
}

impl Track {
    pub fn label (&self)->String {
        if let Some(cs) = &self.callsign { format!("{} ({})", self.icao24, cs) } else { self.icao24.to_string() }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "Track( {}, look: {}, updates: {}", self.label(), self.look, self.n_updates)?;
        if let Some(p) = &self.last_commanded { write!( f, ", commanded: {p}")?; }
        write!( f, ", last_update: {})", self.last_update)
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum TrackUpdate {
    Created,
    Updated,
    /// report is older than what we already have for this aircraft - ignored
    Outdated
}

/// result of an expiry sweep
#[derive(Debug,Clone,Default,PartialEq)]
pub struct Expiry {
    pub removed: Vec<Arc<String>>,
    /// set if the selected target was among the removed tracks
    pub lost_target: Option<Arc<String>>
}

impl Expiry {
    pub fn is_empty (&self)->bool { self.removed.is_empty() }
}

/// the owner of all live tracks. The registry is not synchronized itself, callers that share it between
/// tasks have to wrap it (e.g. into a `Mutex`)
#[derive(Debug)]
pub struct TrackRegistry {
    frame: EnuFrame,
    stale_after: Duration,
    policy: Box<dyn SelectionPolicy>,
    filter: CandidateFilter,

    tracks: HashMap<String,Track>,
    selected: Option<Arc<String>>,
    callsigns: HashMap<String,(String,DateTime<Utc>)>, // identifications we got before the first position
}

impl TrackRegistry {
    pub fn new (camera: &CameraPose, stale_after: Duration, policy: Box<dyn SelectionPolicy>)->Self {
        TrackRegistry {
            frame: camera.enu_frame(),
            stale_after,
            policy,
            filter: CandidateFilter::default(),
            tracks: HashMap::new(),
            selected: None,
            callsigns: HashMap::new()
        }
    }

    pub fn with_filter (mut self, filter: CandidateFilter)->Self {
        self.filter = filter;
        self
    }

    pub fn stale_after (&self)->Duration { self.stale_after }
    pub fn policy_name (&self)->&'static str { self.policy.name() }

    pub fn len (&self)->usize { self.tracks.len() }
    pub fn is_empty (&self)->bool { self.tracks.is_empty() }

    pub fn get (&self, icao24: &str)->Option<&Track> { self.tracks.get(icao24) }
    pub fn tracks (&self)->impl Iterator<Item=&Track> { self.tracks.values() }

    pub fn selected_id (&self)->Option<&Arc<String>> { self.selected.as_ref() }
    pub fn selected (&self)->Option<&Track> {
        self.selected.as_ref().and_then( |id| self.tracks.get( id.as_str()))
    }

    /// create or overwrite the track for the reported aircraft and recompute its look angles
    pub fn update (&mut self, report: PositionReport)->TrackUpdate {
        let timestamp = report.timestamp();

        if let Some(track) = self.tracks.get_mut( report.icao24().as_str()) {
            if timestamp < track.last_update {
                return TrackUpdate::Outdated
            }
            track.look = self.frame.look_angles( &report.position(), track.look.azimuth);
            track.report = report;
            track.last_update = timestamp;
            track.n_updates += 1;
            TrackUpdate::Updated

        } else {
            let icao24 = report.icao24().clone();
            let look = self.frame.look_angles( &report.position(), 0.0);
            let callsign = self.callsigns.remove( icao24.as_str()).map( |(cs,_)| cs);
            debug!("new track {} at {}", icao24, look);

            let track = Track {
                icao24: icao24.clone(),
                callsign,
                report,
                look,
                last_commanded: None,
                first_seen: timestamp,
                last_update: timestamp,
                n_updates: 1
            };
            self.tracks.insert( icao24.to_string(), track);
            TrackUpdate::Created
        }
    }

    /// identifications do not create tracks but are remembered until the first position arrives
    pub fn set_callsign (&mut self, icao24: &str, callsign: String, timestamp: DateTime<Utc>) {
        if let Some(track) = self.tracks.get_mut(icao24) {
            track.callsign = Some(callsign);
        } else {
            self.callsigns.insert( icao24.to_string(), (callsign,timestamp));
        }
    }

    /// remove all tracks that have not been updated within `stale_after` of `now`
    pub fn expire (&mut self, now: DateTime<Utc>)->Expiry {
        let cutoff = now.checked_sub_signed( to_time_delta( self.stale_after)).unwrap_or( DateTime::<Utc>::MIN_UTC);
        let mut expiry = Expiry::default();

        self.tracks.retain( |_,t| {
            if t.last_update < cutoff {
                expiry.removed.push( t.icao24.clone());
                false
            } else {
                true
            }
        });
        self.callsigns.retain( |_,(_,ts)| *ts >= cutoff);

        if let Some(sel) = &self.selected {
            if !self.tracks.contains_key( sel.as_str()) {
                expiry.lost_target = self.selected.take();
            }
        }

        if !expiry.removed.is_empty() {
            debug!("expired {} tracks, {} remaining", expiry.removed.len(), self.tracks.len());
        }
        expiry
    }

    /// apply the selection policy to the current tracks, remember and return the result
    pub fn select_target (&mut self)->Option<&Track> {
        let mut candidates: Vec<&Track> = self.tracks.values().filter( |t| self.filter.accepts(t)).collect();
        candidates.sort_by( |a,b| a.icao24.cmp( &b.icao24));

        let current = self.selected.as_ref()
            .and_then( |id| candidates.iter().find( |t| t.icao24 == *id))
            .copied();

        let new_selection = self.policy.select( &candidates, current).map( |t| t.icao24.clone());

        if new_selection != self.selected {
            match &new_selection {
                Some(id) => info!("selected target {}", id),
                None => info!("no target selected")
            }
            self.selected = new_selection;
        }

        self.selected()
    }

    /// remember the pointing the camera was successfully commanded to for this track.
    /// Returns false if the track does not exist (anymore)
    pub fn record_command (&mut self, icao24: &str, pointing: Pointing)->bool {
        if let Some(track) = self.tracks.get_mut(icao24) {
            track.last_commanded = Some(pointing);
            true
        } else {
            false
        }
    }
}
