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
use serde::{Serialize,Deserialize};
use crate::errors::{Result,degenerate};

/// geographic position in degrees
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct GeoPos {
    pub lat: f64,
    pub lon: f64
}

impl GeoPos {
    pub fn new (lat: f64, lon: f64)->Self { GeoPos{lat,lon} }
}

impl fmt::Display for GeoPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "({:.5},{:.5})", self.lat, self.lon)
    }
}

/// the geographic rectangle that is mapped onto a canvas region.
/// Can be fixed (map backgrounds) or accumulated over all accepted positions of a window.
/// An empty box (no positions yet) counts as degenerate
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    /// the two corners can be given in any order
    pub fn from_corners (a: GeoPos, b: GeoPos)->Self {
        BoundingBox {
            lat_min: a.lat.min(b.lat),
            lat_max: a.lat.max(b.lat),
            lon_min: a.lon.min(b.lon),
            lon_max: a.lon.max(b.lon),
        }
    }

    pub fn empty ()->Self {
        BoundingBox {
            lat_min: f64::INFINITY,
            lat_max: f64::NEG_INFINITY,
            lon_min: f64::INFINITY,
            lon_max: f64::NEG_INFINITY,
        }
    }

    pub fn is_empty (&self)->bool {
        self.lat_min > self.lat_max || self.lon_min > self.lon_max
    }

    /// also true for empty boxes and NaN bounds
    pub fn is_degenerate (&self)->bool {
        !(self.lat_max > self.lat_min) || !(self.lon_max > self.lon_min)
    }

    pub fn expand (&mut self, p: &GeoPos) {
        if p.lat < self.lat_min { self.lat_min = p.lat }
        if p.lat > self.lat_max { self.lat_max = p.lat }
        if p.lon < self.lon_min { self.lon_min = p.lon }
        if p.lon > self.lon_max { self.lon_max = p.lon }
    }

    pub fn lat_span (&self)->f64 { self.lat_max - self.lat_min }
    pub fn lon_span (&self)->f64 { self.lon_max - self.lon_min }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "BoundingBox( lat: {:.5}..{:.5}, lon: {:.5}..{:.5})", self.lat_min, self.lat_max, self.lon_min, self.lon_max)
    }
}

/// the target sub-region of the canvas, in pixels.
/// Note that both `x_offset` and `x_offset + width` are valid targets (the two bbox corners map onto them)
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub struct CanvasRegion {
    pub x_offset: i32,
    pub y_offset: i32,
    pub width: u32,
    pub height: u32,
}

impl CanvasRegion {
    pub fn new (x_offset: i32, y_offset: i32, width: u32, height: u32)->Self {
        CanvasRegion{ x_offset, y_offset, width, height }
    }

    pub fn x_max (&self)->i32 { self.x_offset + self.width as i32 }
    pub fn y_max (&self)->i32 { self.y_offset + self.height as i32 }

    pub fn contains (&self, p: &PixelPoint)->bool {
        p.x >= self.x_offset && p.x <= self.x_max() && p.y >= self.y_offset && p.y <= self.y_max()
    }
}

/// corner correspondence. Without inversion `lon_min` maps to `x_offset` and `lat_min` to `y_offset`,
/// i.e. a north-up map needs `invert_y`
#[derive(Debug,Clone,Copy,PartialEq,Eq,Default,Serialize,Deserialize)]
pub struct Orientation {
    pub invert_x: bool,
    pub invert_y: bool,
}

/// what to do with positions that project outside of the canvas region
#[derive(Debug,Clone,Copy,PartialEq,Eq,Default,Serialize,Deserialize)]
pub enum ClipPolicy {
    /// drop points outside the inclusive region `[x_offset, x_offset+width] x [y_offset, y_offset+height]`.
    /// For discrete pixel targets the region therefore has to end at the last device pixel (e.g. 0,0,31,63 for
    /// a 32x64 matrix), which is checked by config validation
    Drop,
    /// pass it on and let the drawing primitives clip (art can bleed past the frame)
    #[default]
    Keep,
}

#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new (x: i32, y: i32)->Self { PixelPoint{x,y} }
}

/// projected coordinates are clamped to this range so that far off-canvas positions (e.g. with a tiny fixed
/// bounding box) can't overflow pixel arithmetic. Differences of two coordinates still fit into an i32
pub const MAX_PIXEL_COORD: i32 = i32::MAX / 4;

fn interpolate (v: f64, v_min: f64, span: f64, offset: i32, len: u32, invert: bool)->i32 {
    let lim = MAX_PIXEL_COORD as i64;
    let d = (len as f64 * (v - v_min) / span).round().clamp( -lim as f64, lim as f64) as i64;
    let p = if invert { offset as i64 + len as i64 - d } else { offset as i64 + d };
    p.clamp( -lim, lim) as i32
}

/// single point projection. Fails with `DegenerateProjection` if `bbox` has a zero span
pub fn project (p: &GeoPos, bbox: &BoundingBox, region: &CanvasRegion, orientation: &Orientation)->Result<PixelPoint> {
    if bbox.is_degenerate() {
        return Err( degenerate!("{bbox}"))
    }

    let x = interpolate( p.lon, bbox.lon_min, bbox.lon_span(), region.x_offset, region.width, orientation.invert_x);
    let y = interpolate( p.lat, bbox.lat_min, bbox.lat_span(), region.y_offset, region.height, orientation.invert_y);
    Ok( PixelPoint{x,y} )
}

/// a validated projection for one render cycle. Construction is the only place that can fail, which lets
/// callers skip the whole cycle before anything is drawn
#[derive(Debug,Clone)]
pub struct Projector {
    bbox: BoundingBox,
    region: CanvasRegion,
    orientation: Orientation,
    clip: ClipPolicy,
}

impl Projector {
    pub fn new (bbox: BoundingBox, region: CanvasRegion, orientation: Orientation, clip: ClipPolicy)->Result<Self> {
        if bbox.is_degenerate() {
            Err( degenerate!("{bbox}"))
        } else {
            Ok( Projector{ bbox, region, orientation, clip } )
        }
    }

    pub fn bbox (&self)->&BoundingBox { &self.bbox }
    pub fn region (&self)->&CanvasRegion { &self.region }
    pub fn clip_policy (&self)->ClipPolicy { self.clip }

    pub fn project (&self, p: &GeoPos)->PixelPoint {
        let x = interpolate( p.lon, self.bbox.lon_min, self.bbox.lon_span(), self.region.x_offset, self.region.width, self.orientation.invert_x);
        let y = interpolate( p.lat, self.bbox.lat_min, self.bbox.lat_span(), self.region.y_offset, self.region.height, self.orientation.invert_y);
        PixelPoint{x,y}
    }

    /// project and apply the clip policy. `Drop` clips against the (inclusive) canvas region, not the device
    pub fn project_clipped (&self, p: &GeoPos)->Option<PixelPoint> {
        let pp = self.project(p);
        match self.clip {
            ClipPolicy::Keep => Some(pp),
            ClipPolicy::Drop => if self.region.contains(&pp) { Some(pp) } else { None }
        }
    }

    /// the projected track in the order of the input positions
    pub fn project_track<'a,I> (&self, points: I)->Vec<PixelPoint> where I: IntoIterator<Item=&'a GeoPos> {
        points.into_iter().filter_map( |p| self.project_clipped(p)).collect()
    }
}
