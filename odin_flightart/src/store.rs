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

use std::{collections::{HashMap,VecDeque}, fmt, time::Duration};
use chrono::{DateTime,TimeDelta,Utc};
use tracing::{debug,info};

use crate::{
    feed::AircraftSnapshot, projection::{BoundingBox,GeoPos}, stats::SessionStats,
    style::{StyleAssigner,TrackStyle}
};

/// how much of a track we keep
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum HistoryPolicy {
    /// keep every accepted position (batch windows bound the memory)
    Unbounded,
    /// keep the last N distinct positions (continuous mode)
    Bounded(usize),
}

/// the track of one aircraft
#[derive(Debug)]
pub struct TrackEntry {
    pub identity: String,
    pub callsign: Option<String>,
    pub points: VecDeque<GeoPos>,  // arrival order, oldest first
    pub last_seen: DateTime<Utc>,
    style: TrackStyle,
}

impl TrackEntry {
    fn new (snapshot: &AircraftSnapshot, identity: String, style: TrackStyle, now: DateTime<Utc>)->Self {
        let mut points = VecDeque::new();
        points.push_back( snapshot.pos);

        TrackEntry { identity, callsign: snapshot.callsign.clone(), points, last_seen: now, style }
    }

    /// style is immutable for the life of the track
    pub fn style (&self)->&TrackStyle { &self.style }

    pub fn first_point (&self)->Option<&GeoPos> { self.points.front() }
    pub fn last_point (&self)->Option<&GeoPos> { self.points.back() }
    pub fn len (&self)->usize { self.points.len() }
}

impl fmt::Display for TrackEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "TrackEntry( id: {}", self.identity)?;
        if let Some(cs) = &self.callsign { write!( f, ", cs: \"{cs}\"")?; }
        if let Some(p) = self.last_point() { write!( f, ", pos: {p}")?; }
        write!( f, ", n_pos: {}, last_seen: {})", self.points.len(), self.last_seen.format("%H:%M:%S"))
    }
}

/// drop the oldest points until the track fits into `cap`
pub fn trim_to_cap (entry: &mut TrackEntry, cap: usize) {
    while entry.points.len() > cap {
        entry.points.pop_front();
    }
}

/// result of an upsert, mostly for logging and tests
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum UpsertOutcome {
    Created,
    Appended,
    /// known track, position did not change (bounded mode)
    Unchanged,
    /// above altitude ceiling
    Rejected,
}

/// the set of tracks we currently know about.
/// There is exactly one owner (the session) so we don't need synchronized maps here
pub struct TrackStore {
    policy: HistoryPolicy,
    altitude_ceiling: f64,
    styles: Box<dyn StyleAssigner>,

    tracks: HashMap<String,TrackEntry>,
    order: Vec<String>, // creation order, which is our iteration order

    bounds: BoundingBox, // running min/max over accepted positions
    stats: SessionStats,
}

impl TrackStore {
    pub fn new (policy: HistoryPolicy, altitude_ceiling: f64, styles: Box<dyn StyleAssigner>, now: DateTime<Utc>)->Self {
        TrackStore {
            policy,
            altitude_ceiling,
            styles,
            tracks: HashMap::new(),
            order: Vec::new(),
            bounds: BoundingBox::empty(),
            stats: SessionStats::new( now),
        }
    }

    pub fn policy (&self)->HistoryPolicy { self.policy }
    pub fn altitude_ceiling (&self)->f64 { self.altitude_ceiling }
    pub fn len (&self)->usize { self.tracks.len() }
    pub fn is_empty (&self)->bool { self.tracks.is_empty() }
    pub fn get (&self, identity: &str)->Option<&TrackEntry> { self.tracks.get( identity) }
    pub fn observed_bounds (&self)->&BoundingBox { &self.bounds }
    pub fn stats (&self)->&SessionStats { &self.stats }

    /// entries in creation order. The borrow guarantees nobody mutates the store while we render
    pub fn iter (&self)->impl Iterator<Item=&TrackEntry> {
        self.order.iter().filter_map( |id| self.tracks.get(id))
    }

    pub fn upsert (&mut self, snapshot: &AircraftSnapshot, now: DateTime<Utc>)->UpsertOutcome {
        if snapshot.altitude > self.altitude_ceiling {
            debug!("skipping {}, altitude too high: {:.0}", snapshot.identity, snapshot.altitude);
            return UpsertOutcome::Rejected
        }

        self.bounds.expand( &snapshot.pos);
        self.stats.record( snapshot);

        if let Some(entry) = self.tracks.get_mut( snapshot.identity.as_str()) {
            entry.last_seen = now;
            if entry.callsign.is_none() && snapshot.callsign.is_some() {
                entry.callsign = snapshot.callsign.clone();
            }

            match self.policy {
                HistoryPolicy::Unbounded => {
                    entry.points.push_back( snapshot.pos);
                    UpsertOutcome::Appended
                }
                HistoryPolicy::Bounded(cap) => {
                    if entry.last_point() == Some(&snapshot.pos) {
                        UpsertOutcome::Unchanged
                    } else {
                        entry.points.push_back( snapshot.pos);
                        trim_to_cap( entry, cap);
                        UpsertOutcome::Appended
                    }
                }
            }

        } else {
            let identity = snapshot.identity.clone();
            let style = self.styles.assign();
            let entry = TrackEntry::new( snapshot, identity.clone(), style, now);
            debug!("new {entry}");

            self.tracks.insert( identity.clone(), entry);
            self.order.push( identity);
            self.stats.record_new_aircraft();
            UpsertOutcome::Created
        }
    }

    /// remove all entries that have not been updated for more than `ttl`. Returns number of removed entries
    pub fn evict_stale (&mut self, now: DateTime<Utc>, ttl: Duration)->usize {
        let max_age = TimeDelta::from_std( ttl).unwrap_or( TimeDelta::MAX);
        let n_before = self.tracks.len();

        self.tracks.retain( |id,entry| {
            let keep = now - entry.last_seen <= max_age;
            if !keep { info!("removed: {id}") }
            keep
        });

        let n_removed = n_before - self.tracks.len();
        if n_removed > 0 {
            let tracks = &self.tracks;
            self.order.retain( |id| tracks.contains_key(id));
        }
        n_removed
    }

    /// discard all tracks, bounds and counters to start a new collection window.
    /// The style source keeps its state so that consecutive windows do not repeat the same styles
    pub fn reset (&mut self, now: DateTime<Utc>) {
        self.tracks.clear();
        self.order.clear();
        self.bounds = BoundingBox::empty();
        self.stats = SessionStats::new( now);
    }

    pub fn close_window (&mut self, now: DateTime<Utc>) {
        self.stats.close( now);
    }
}
