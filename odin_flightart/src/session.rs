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

use std::path::PathBuf;
use chrono::{DateTime,Utc};
use tokio::time::{sleep,Instant};
use tracing::{debug,error,info,warn};

use crate::{
    FlightArtConfig, RunMode,
    archive::Archive,
    display::OutputSink,
    feed::{FeedPoller,HttpFeedPoller,RawRecord,to_snapshots},
    fonts::FontLibrary,
    label::create_label_strategy,
    matrix::{mirror_writes,pixel_writes},
    projection::Projector,
    render::{Canvas,TrackRenderer},
    store::{TrackStore,UpsertOutcome},
    style::{create_rng,create_style_assigner},
    summary::SummaryOverlay,
    errors::{Result,config_error}
};

/// rng streams derived from the configured seed
const STYLE_RNG_STREAM: u64 = 0;
const LABEL_RNG_STREAM: u64 = 1;

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum SessionState {
    Idle,
    Collecting, // batch mode
    Rendering,  // batch mode
    Running,    // continuous mode
}

#[derive(Debug,Clone,PartialEq)]
pub enum RenderOutcome {
    /// frame composed and committed to the output
    Emitted { n_tracks: usize, archived: Option<PathBuf> },
    /// nothing drawn, emitted or persisted this cycle
    Skipped,
}

/// the poll -> update -> (evict) -> render -> emit loop for one output device.
/// The session is the single owner of the track store, rendering only happens between updates
pub struct FlightArtSession<P> where P: FeedPoller {
    config: FlightArtConfig,
    poller: P,
    output: OutputSink,

    store: TrackStore,
    canvas: Canvas,
    renderer: TrackRenderer,
    summary: Option<SummaryOverlay>,
    archive: Option<Archive>,

    state: SessionState,
}

impl FlightArtSession<HttpFeedPoller> {
    /// a session with the http feed and the file backed output devices of the config
    pub fn from_config (config: FlightArtConfig)->Result<Self> {
        let fonts = FontLibrary::load( &config.fonts)?;
        let poller = HttpFeedPoller::new( &config.feed)?;
        let output = OutputSink::from_config( &config.output, config.canvas.width, config.canvas.height);

        FlightArtSession::new( config, poller, output, &fonts, Utc::now())
    }
}

impl<P> FlightArtSession<P> where P: FeedPoller {

    pub fn new (config: FlightArtConfig, poller: P, output: OutputSink, fonts: &FontLibrary, now: DateTime<Utc>)->Result<Self> {
        config.validate()?;

        let canvas_size = (config.canvas.width, config.canvas.height);
        if output.size() != canvas_size {
            return Err( config_error!("output size {:?} does not match canvas size {:?}", output.size(), canvas_size))
        }

        let styles = create_style_assigner( &config.style, create_rng( config.seed, STYLE_RNG_STREAM));
        let labels = create_label_strategy( &config.labels, fonts, create_rng( config.seed, LABEL_RNG_STREAM))?;

        let store = TrackStore::new( config.mode.history_policy(), config.altitude_ceiling, styles, now);
        let canvas = Canvas::from_config( &config.canvas)?;
        let renderer = TrackRenderer::new( labels);
        let summary = match &config.summary {
            Some(sc) => Some( SummaryOverlay::new( sc, fonts)?),
            None => None
        };
        let archive = config.archive.as_ref().map( Archive::from_config);

        Ok( FlightArtSession { config, poller, output, store, canvas, renderer, summary, archive, state: SessionState::Idle } )
    }

    pub fn config (&self)->&FlightArtConfig { &self.config }
    pub fn state (&self)->SessionState { self.state }
    pub fn store (&self)->&TrackStore { &self.store }
    pub fn canvas (&self)->&Canvas { &self.canvas }
    pub fn output (&self)->&OutputSink { &self.output }

    /// fetch the next batch of raw records. Feed failures are logged and turned into `None` so that the
    /// caller just skips this tick
    pub async fn poll_once (&mut self)->Option<Vec<RawRecord>> {
        match self.poller.poll().await {
            Ok(records) => Some(records),
            Err(e) => {
                warn!("skipping tick: {e}");
                None
            }
        }
    }

    /// validate and upsert a batch of raw records. Returns the number of snapshots the store accepted
    pub fn ingest (&mut self, records: &[RawRecord], now: DateTime<Utc>)->usize {
        let (snapshots, n_dropped) = to_snapshots( records, now);
        let mut n_accepted = 0;

        for snapshot in &snapshots {
            if self.store.upsert( snapshot, now) != UpsertOutcome::Rejected {
                n_accepted += 1;
            }
        }

        debug!("ingested {} records: {} accepted, {} malformed, {} tracks", records.len(), n_accepted, n_dropped, self.store.len());
        n_accepted
    }

    //--- batch mode

    /// start a new collection window with an empty store. The store instance is reused through
    /// [`TrackStore::reset`], which drops all tracks, bounds and counters of the previous window but keeps the
    /// style generator state, so that each window behaves like a fresh store apart from its styles
    pub fn start_window (&mut self, now: DateTime<Utc>) {
        self.store.reset( now);
        self.state = SessionState::Collecting;
        info!("collecting...");
    }

    pub async fn collect_tick (&mut self, now: DateTime<Utc>)->usize {
        match self.poll_once().await {
            Some(records) => self.ingest( &records, now),
            None => 0
        }
    }

    /// end of collection window: render once, emit and persist
    pub fn finish_window (&mut self, now: DateTime<Utc>)->Result<RenderOutcome> {
        self.state = SessionState::Rendering;
        self.store.close_window( now);
        info!("window closed: {}", self.store.stats());

        let res = self.render_and_emit( now);
        self.state = SessionState::Idle;
        res
    }

    pub async fn run_batch_cycle (&mut self, window: std::time::Duration)->Result<RenderOutcome> {
        let t0 = Instant::now();
        self.start_window( Utc::now());

        while t0.elapsed() < window {
            self.collect_tick( Utc::now()).await;
            sleep( self.config.feed.poll_interval).await;
        }

        self.finish_window( Utc::now())
    }

    //--- continuous mode

    /// poll, update, evict, render and emit
    pub async fn continuous_tick (&mut self, now: DateTime<Utc>)->Result<RenderOutcome> {
        self.state = SessionState::Running;

        if let Some(records) = self.poll_once().await {
            self.ingest( &records, now);
        }
        if let RunMode::Continuous{ttl,..} = &self.config.mode {
            self.store.evict_stale( now, *ttl);
        }

        self.render_and_emit( now)
    }

    //--- rendering

    /// compose a frame from the current store and commit it to the output. The cycle is skipped if we can't
    /// project (e.g. a computed bounding box from a single position). Commit failures are fatal
    pub fn render_and_emit (&mut self, now: DateTime<Utc>)->Result<RenderOutcome> {
        let pc = &self.config.projection;
        let bbox = pc.bounding_box( self.store.observed_bounds());
        let projector = match Projector::new( bbox, pc.region, pc.orientation(), pc.clip) {
            Ok(projector) => projector,
            Err(e) => {
                warn!("skipping render cycle: {e}");
                return Ok(RenderOutcome::Skipped)
            }
        };

        let n_tracks = match &mut self.output {
            OutputSink::Panel(panel) => {
                self.canvas.reset();
                let n_tracks = self.renderer.render( &mut self.canvas, &self.store, &projector);
                self.canvas.apply_frame();
                if let Some(summary) = &self.summary {
                    summary.draw( self.canvas.image_mut(), self.store.stats(), now);
                }

                if let Err(e) = panel.commit( &self.canvas.to_rgb()) {
                    error!("panel commit failed ({} tracks, {}): {e}", n_tracks, self.store.stats());
                    return Err(e)
                }
                n_tracks
            }
            OutputSink::Matrix(matrix) => {
                let writes = pixel_writes( &self.store, &projector);
                matrix.clear();
                for w in &writes {
                    matrix.set_pixel( w.x, w.y, w.color[0], w.color[1], w.color[2]);
                }
                if let Err(e) = matrix.flush() {
                    error!("matrix write failed ({} pixels): {e}", writes.len());
                    return Err(e)
                }

                self.canvas.reset();
                mirror_writes( self.canvas.image_mut(), &writes);
                self.store.len()
            }
        };

        let archived = self.archive.as_ref().and_then( |archive| {
            archive.save( self.canvas.image(), now).map_err( |e| warn!("archive failed: {e}")).ok()
        });

        Ok( RenderOutcome::Emitted{ n_tracks, archived } )
    }

    //--- the main loop

    /// run the configured mode until a fatal error occurs, or for a single batch cycle / tick if `once` is set
    pub async fn run (&mut self, once: bool)->Result<()> {
        match self.config.mode.clone() {
            RunMode::Batch{window} => loop {
                self.run_batch_cycle( window).await?;
                if once { return Ok(()) }
            }
            RunMode::Continuous{..} => loop {
                self.continuous_tick( Utc::now()).await?;
                if once { return Ok(()) }
                sleep( self.config.feed.poll_interval).await;
            }
        }
    }
}
