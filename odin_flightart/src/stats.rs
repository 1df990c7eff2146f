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

use std::fmt;
use chrono::{DateTime,Utc};
use crate::feed::AircraftSnapshot;

/// aggregate counters over one collection window
#[derive(Debug,Clone,PartialEq)]
pub struct SessionStats {
    pub distinct_aircraft_count: usize,
    pub max_speed: f64,     // kn
    pub max_altitude: f64,  // ft
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
}

impl SessionStats {
    pub fn new (window_start: DateTime<Utc>)->Self {
        SessionStats {
            distinct_aircraft_count: 0,
            max_speed: 0.0,
            max_altitude: 0.0,
            window_start,
            window_end: window_start
        }
    }

    /// record an accepted snapshot
    pub fn record (&mut self, snapshot: &AircraftSnapshot) {
        if let Some(spd) = snapshot.speed {
            if spd > self.max_speed { self.max_speed = spd }
        }
        if snapshot.altitude > self.max_altitude { self.max_altitude = snapshot.altitude }
        if snapshot.observed_at > self.window_end { self.window_end = snapshot.observed_at }
    }

    pub fn record_new_aircraft (&mut self) {
        self.distinct_aircraft_count += 1;
    }

    pub fn close (&mut self, window_end: DateTime<Utc>) {
        self.window_end = window_end;
    }
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "SessionStats( aircraft: {}, max_spd: {:.0}, max_alt: {:.0}, window: {} - {})",
                self.distinct_aircraft_count, self.max_speed, self.max_altitude,
                self.window_start.format("%Y-%m-%d %H:%M:%S"), self.window_end.format("%H:%M:%S"))
    }
}
