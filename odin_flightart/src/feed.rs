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
use serde::{Serialize,Deserialize};
use serde_json::Value;
use reqwest::{Client,StatusCode};
use async_trait::async_trait;
use tracing::{debug,warn};

use crate::{FeedConfig, projection::GeoPos, errors::{Result,feed_unavailable,malformed_record}};

/// one element of the dump1090 `data.json` array, as it comes over the wire.
/// Everything is optional here - validation happens in [`RawRecord::to_snapshot`]
#[derive(Debug,Clone,Default,Serialize,Deserialize)]
pub struct RawRecord {
    pub hex: Option<String>,      // ICAO 24 bit transponder id
    pub flight: Option<String>,   // callsign, space padded
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub altitude: Option<f64>,    // ft
    pub speed: Option<f64>,       // kn
    pub track: Option<f64>,       // deg
}

impl RawRecord {
    /// the identity check is done here so that records without a stable id never reach the store.
    /// Altitude filtering is *not* done here (that is a store policy)
    pub fn to_snapshot (&self, observed_at: DateTime<Utc>)->Result<AircraftSnapshot> {
        let identity = match self.hex.as_deref().map(str::trim) {
            Some(hex) if !hex.is_empty() => hex.to_string(),
            _ => return Err( malformed_record!("no identity"))
        };

        let lat = self.lat.ok_or_else( || malformed_record!("{identity} has no lat"))?;
        let lon = self.lon.ok_or_else( || malformed_record!("{identity} has no lon"))?;
        let altitude = self.altitude.ok_or_else( || malformed_record!("{identity} has no altitude"))?;

        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err( malformed_record!("{identity} position out of range: {lat},{lon}"))
        }
        if !altitude.is_finite() {
            return Err( malformed_record!("{identity} invalid altitude"))
        }

        let callsign = self.flight.as_deref().map(str::trim).filter( |cs| !cs.is_empty()).map(str::to_string);

        Ok( AircraftSnapshot {
            identity,
            callsign,
            pos: GeoPos::new( lat, lon),
            altitude,
            speed: self.speed,
            heading: self.track,
            observed_at
        })
    }
}

/// a validated position report. Produced fresh per tick, not retained
#[derive(Debug,Clone,PartialEq)]
pub struct AircraftSnapshot {
    pub identity: String,
    pub callsign: Option<String>,
    pub pos: GeoPos,
    pub altitude: f64,
    pub speed: Option<f64>,
    pub heading: Option<f64>,
    pub observed_at: DateTime<Utc>,
}

impl AircraftSnapshot {
    pub fn new (identity: impl Into<String>, lat: f64, lon: f64, altitude: f64, observed_at: DateTime<Utc>)->Self {
        AircraftSnapshot {
            identity: identity.into(),
            callsign: None,
            pos: GeoPos::new( lat, lon),
            altitude,
            speed: None,
            heading: None,
            observed_at
        }
    }

    pub fn with_callsign (mut self, callsign: impl Into<String>)->Self {
        self.callsign = Some(callsign.into());
        self
    }

    pub fn with_speed (mut self, speed: f64)->Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_heading (mut self, heading: f64)->Self {
        self.heading = Some(heading);
        self
    }
}

impl fmt::Display for AircraftSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "{} {}", self.observed_at.format("%Y-%m-%d %H:%M:%S"), self.identity)?;
        if let Some(cs) = &self.callsign { write!( f, " {cs}")?; }
        write!( f, " {} alt: {:.0}", self.pos, self.altitude)?;
        if let Some(spd) = self.speed { write!( f, " spd: {spd:.0}")?; }
        if let Some(hdg) = self.heading { write!( f, " hdg: {hdg:.0}")?; }
        Ok(())
    }
}

/// parse a feed body. Only a body that is not a JSON array is a feed failure, elements that do
/// not deserialize into a [`RawRecord`] are dropped individually
pub fn parse_feed (body: &[u8])->Result<Vec<RawRecord>> {
    let values: Vec<Value> = serde_json::from_slice( body).map_err( |e| feed_unavailable!("malformed body: {e}"))?;

    let mut records = Vec::with_capacity( values.len());
    for v in values.into_iter() {
        match serde_json::from_value::<RawRecord>(v) {
            Ok(rec) => records.push(rec),
            Err(e) => warn!("dropping record: {}", malformed_record!("{e}"))
        }
    }
    Ok(records)
}

/// validate a batch of raw records, dropping (and logging) the ones that can't be tracked
pub fn to_snapshots (records: &[RawRecord], observed_at: DateTime<Utc>)->(Vec<AircraftSnapshot>,usize) {
    let mut snapshots = Vec::with_capacity( records.len());
    let mut n_dropped = 0;

    for rec in records {
        match rec.to_snapshot( observed_at) {
            Ok(snapshot) => {
                debug!("{snapshot}");
                snapshots.push( snapshot)
            }
            Err(e) => {
                debug!("skipping record: {e}");
                n_dropped += 1;
            }
        }
    }

    (snapshots, n_dropped)
}

/// the seam to the feed transport. Implementations have to return within a bounded time and
/// report transport problems as `FeedUnavailable` instead of panicking
#[async_trait]
pub trait FeedPoller {
    async fn poll (&mut self)->Result<Vec<RawRecord>>;
}

/// polls a local dump1090 `data.json` endpoint
pub struct HttpFeedPoller {
    client: Client,
    url: String,
}

impl HttpFeedPoller {
    pub fn new (config: &FeedConfig)->Result<Self> {
        let client = Client::builder()
            .timeout( config.timeout)
            .build()
            .map_err( |e| feed_unavailable!("cannot create http client: {e}"))?;

        Ok( HttpFeedPoller{ client, url: config.url.clone() } )
    }
}

#[async_trait]
impl FeedPoller for HttpFeedPoller {
    async fn poll (&mut self)->Result<Vec<RawRecord>> {
        let response = self.client.get( &self.url).send().await.map_err( |e| feed_unavailable!("{}: {e}", self.url))?;
        if response.status() != StatusCode::OK {
            return Err( feed_unavailable!("{}: status {}", self.url, response.status()))
        }

        let body = response.bytes().await.map_err( |e| feed_unavailable!("{}: {e}", self.url))?;
        parse_feed( &body)
    }
}
