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

use std::{collections::{HashMap,HashSet}, fs, path::{Path,PathBuf}, time::Duration};
use serde::{Deserialize,Deserializer,Serialize,de::DeserializeOwned};
use parse_duration::parse;

use crate::{
    projection::{BoundingBox,CanvasRegion,ClipPolicy,GeoPos,Orientation},
    store::HistoryPolicy, summary::TextAnchor,
    errors::{Result,config_error}
};

pub const CONFIGS: &'static str = "configs";

pub const WHITE: [u8;4] = [255, 255, 255, 255];
pub const BLACK: [u8;4] = [0, 0, 0, 255];
pub const RED: [u8;4] = [255, 0, 0, 255];
pub const CLEAR: [u8;4] = [0, 0, 0, 0];

fn white ()->[u8;4] { WHITE }
fn black ()->[u8;4] { BLACK }

/// durations are specified as strings such as "1s", "500ms" or "60min"
pub fn deserialize_duration <'a,D>(deserializer: D) -> std::result::Result<Duration,D::Error>
    where D: Deserializer<'a>
{
    String::deserialize(deserializer).and_then( |string| {
        parse(string.as_str())
            .map_err( |e| serde::de::Error::custom(format!("{:?}",e)))
    })
}

/// locate a config file: the path itself, or the file name within our `configs/` dir
pub fn find_config_file (filename: &str)->Option<PathBuf> {
    let path = Path::new(filename);
    if path.is_file() { return Some(path.to_path_buf()) }

    let path = Path::new( env!("CARGO_MANIFEST_DIR")).join( CONFIGS).join( filename);
    if path.is_file() { Some(path) } else { None }
}

pub fn load_config<C> (filename: &str)->Result<C> where C: DeserializeOwned {
    if let Some(path) = find_config_file( filename) {
        let data = fs::read( &path)?;
        Ok( ron::de::from_bytes( data.as_slice())? )
    } else {
        Err( config_error!("config not found: {filename}"))
    }
}

//--- the config structures

/// the aggregate config for a flight art session
#[derive(Deserialize,Serialize,Debug,Clone)]
pub struct FlightArtConfig {
    pub feed: FeedConfig,
    pub mode: RunMode,
    pub altitude_ceiling: f64, // ft, records above are not tracked
    pub projection: ProjectionConfig,
    pub canvas: CanvasConfig,
    pub style: StyleSpec,

    #[serde(default)]
    pub seed: Option<u64>, // to get reproducible styles and labels

    #[serde(default)]
    pub fonts: HashMap<String,String>, // font name -> font file path

    #[serde(default)]
    pub labels: LabelConfig,

    #[serde(default)]
    pub summary: Option<SummaryConfig>,

    pub output: OutputConfig,

    #[serde(default)]
    pub archive: Option<ArchiveConfig>,
}

#[derive(Deserialize,Serialize,Debug,Clone)]
pub struct FeedConfig {
    pub url: String, // of the dump1090 data.json endpoint

    #[serde(deserialize_with="deserialize_duration")]
    pub poll_interval: Duration,

    #[serde(deserialize_with="deserialize_duration")]
    pub timeout: Duration, // upper bound for each fetch
}

#[derive(Deserialize,Serialize,Debug,Clone)]
pub enum RunMode {
    /// collect for a fixed window, then render once
    Batch {
        #[serde(deserialize_with="deserialize_duration")]
        window: Duration
    },
    /// render every tick, evict tracks not seen for `ttl`, keep at most `max_points` per track
    Continuous {
        #[serde(deserialize_with="deserialize_duration")]
        ttl: Duration,
        max_points: usize
    },
}

impl RunMode {
    pub fn history_policy (&self)->HistoryPolicy {
        match self {
            RunMode::Batch{..} => HistoryPolicy::Unbounded,
            RunMode::Continuous{max_points,..} => HistoryPolicy::Bounded(*max_points)
        }
    }
}

#[derive(Deserialize,Serialize,Debug,Clone)]
pub enum BoundsSpec {
    /// e.g. the NW and SE corners of a background map
    Fixed { corner_a: GeoPos, corner_b: GeoPos },
    /// running min/max over all accepted positions of the window
    Computed,
}

#[derive(Deserialize,Serialize,Debug,Clone)]
pub struct ProjectionConfig {
    pub bounds: BoundsSpec,
    pub region: CanvasRegion,

    #[serde(default)]
    pub invert_x: bool,

    #[serde(default)]
    pub invert_y: bool,

    #[serde(default)]
    pub clip: ClipPolicy,
}

impl ProjectionConfig {
    pub fn orientation (&self)->Orientation {
        Orientation { invert_x: self.invert_x, invert_y: self.invert_y }
    }

    /// the bounding box for this render cycle
    pub fn bounding_box (&self, observed: &BoundingBox)->BoundingBox {
        match &self.bounds {
            BoundsSpec::Fixed{corner_a,corner_b} => BoundingBox::from_corners( *corner_a, *corner_b),
            BoundsSpec::Computed => *observed
        }
    }
}

#[derive(Deserialize,Serialize,Debug,Clone)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,

    #[serde(default="white")]
    pub fill: [u8;4],

    #[serde(default)]
    pub background_image: Option<String>, // pasted below the tracks

    #[serde(default)]
    pub frame_image: Option<String>, // alpha-pasted on top of the tracks
}

#[derive(Deserialize,Serialize,Debug,Clone)]
pub enum StyleSpec {
    Random { palette: Vec<[u8;4]>, min_width: u32, max_width: u32 },
    Fixed { color: [u8;4], width: u32 },
    HeadTail,
}

#[derive(Deserialize,Serialize,Debug,Clone)]
pub struct LabelFont {
    pub font: String, // name in FlightArtConfig::fonts
    pub size: f32,    // px
}

/// callsign labels drawn at random positions and angles
#[derive(Deserialize,Serialize,Debug,Clone)]
pub struct LabelConfig {
    pub enabled: bool,

    #[serde(default)]
    pub fonts: Vec<LabelFont>,

    #[serde(default)]
    pub palette: Vec<[u8;4]>, // needs at least two different colors since stroke != fill

    #[serde(default="default_stroke_width")]
    pub stroke_width: (u32,u32), // [min,max)
}

fn default_stroke_width ()->(u32,u32) { (2,8) }

impl Default for LabelConfig {
    fn default()->Self {
        LabelConfig { enabled: false, fonts: Vec::new(), palette: Vec::new(), stroke_width: default_stroke_width() }
    }
}

#[derive(Deserialize,Serialize,Debug,Clone)]
pub struct SummaryBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,

    #[serde(default)]
    pub fill: Option<[u8;4]>,

    #[serde(default)]
    pub outline: Option<[u8;4]>,

    #[serde(default="one")]
    pub outline_width: u32,
}

fn one ()->u32 { 1 }

/// a text template at a fixed anchor, see [`crate::summary::expand_template`] for placeholders
#[derive(Deserialize,Serialize,Debug,Clone)]
pub struct SummaryItem {
    pub text: String,
    pub font: String,
    pub size: f32,
    pub x: i32,
    pub y: i32,

    #[serde(default)]
    pub anchor: TextAnchor,

    #[serde(default="black")]
    pub color: [u8;4],
}

#[derive(Deserialize,Serialize,Debug,Clone,Default)]
pub struct SummaryConfig {
    #[serde(default)]
    pub boxes: Vec<SummaryBox>,

    #[serde(default)]
    pub items: Vec<SummaryItem>,
}

#[derive(Deserialize,Serialize,Debug,Clone)]
pub enum OutputConfig {
    /// slow refresh e-paper panel, emulated by writing each committed frame to `path`
    Panel {
        path: String,
        #[serde(default)]
        rotation: u8,
        #[serde(default)]
        tri_color: bool
    },
    /// discrete RGB pixel matrix of canvas size, emulated by a framebuffer written to `path`
    Matrix { path: String },
}

#[derive(Deserialize,Serialize,Debug,Clone)]
pub struct ArchiveConfig {
    pub dir: String,
    pub suffix: String, // archive files are named <YYYYmmdd_HHMMSS>_<suffix>.png
}

impl FlightArtConfig {

    /// check everything we can't recover from at runtime
    pub fn validate (&self)->Result<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err( config_error!("empty canvas"))
        }

        let region = &self.projection.region;
        if region.width == 0 || region.height == 0 {
            return Err( config_error!("empty projection region"))
        }

        if self.projection.clip == ClipPolicy::Drop {
            // kept points have to be addressable canvas pixels
            if region.x_offset < 0 || region.y_offset < 0
                || region.x_max() >= self.canvas.width as i32 || region.y_max() >= self.canvas.height as i32 {
                return Err( config_error!("projection region exceeds {}x{} canvas", self.canvas.width, self.canvas.height))
            }
        }

        if let RunMode::Continuous{max_points,..} = &self.mode {
            if *max_points == 0 { return Err( config_error!("max_points has to be > 0")) }
        }

        match &self.style {
            StyleSpec::Random{palette,min_width,max_width} => {
                if palette.is_empty() { return Err( config_error!("empty style palette")) }
                if min_width >= max_width { return Err( config_error!("style min_width has to be < max_width")) }
            }
            StyleSpec::Fixed{width,..} => {
                if *width == 0 { return Err( config_error!("style width has to be > 0")) }
            }
            StyleSpec::HeadTail => {}
        }

        if self.labels.enabled {
            let distinct: HashSet<&[u8;4]> = self.labels.palette.iter().collect();
            if distinct.len() < 2 { return Err( config_error!("label palette needs at least two different colors")) }
            if self.labels.fonts.is_empty() { return Err( config_error!("no label fonts")) }
            for lf in &self.labels.fonts {
                self.check_font( &lf.font)?;
            }
            let (min,max) = self.labels.stroke_width;
            if min >= max { return Err( config_error!("invalid label stroke width range")) }
        }

        if let Some(summary) = &self.summary {
            for item in &summary.items {
                self.check_font( &item.font)?;
            }
        }

        Ok(())
    }

    fn check_font (&self, name: &str)->Result<()> {
        if self.fonts.contains_key(name) { Ok(()) } else { Err( config_error!("unknown font {name}")) }
    }
}
