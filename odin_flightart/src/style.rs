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

use image::Rgba;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use crate::{StyleSpec, BLACK};

pub fn rgba (c: [u8;4])->Rgba<u8> { Rgba(c) }

/// create our randomness source. Use a fixed seed for reproducible art (and tests).
/// `stream` separates the generators that are derived from the same seed
pub fn create_rng (seed: Option<u64>, stream: u64)->StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64( seed.wrapping_add( stream)),
        None => StdRng::from_os_rng()
    }
}

/// how a track is drawn. Assigned once when the track is created
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct TrackStyle {
    pub primary: Rgba<u8>,   // line color (panel) or head color (matrix)
    pub secondary: Rgba<u8>, // tail color (matrix)
    pub width: u32,
}

/// strategy to pick styles for new tracks
pub trait StyleAssigner: Send {
    fn assign (&mut self)->TrackStyle;
}

/// random width in `[min_width,max_width)` and random palette color
pub struct RandomStyle {
    rng: StdRng,
    palette: Vec<Rgba<u8>>,
    min_width: u32,
    max_width: u32,
}

impl RandomStyle {
    pub fn new (rng: StdRng, palette: Vec<Rgba<u8>>, min_width: u32, max_width: u32)->Self {
        RandomStyle { rng, palette, min_width, max_width: max_width.max(min_width+1) }
    }
}

impl StyleAssigner for RandomStyle {
    fn assign (&mut self)->TrackStyle {
        let width = self.rng.random_range( self.min_width..self.max_width);
        let primary = self.palette.choose( &mut self.rng).copied().unwrap_or( rgba(BLACK));
        TrackStyle { primary, secondary: primary, width }
    }
}

/// every track looks the same
pub struct FixedStyle(pub TrackStyle);

impl StyleAssigner for FixedStyle {
    fn assign (&mut self)->TrackStyle { self.0 }
}

/// saturated head color with at least one full channel, tail at 30% of the head
pub struct HeadTailStyle {
    rng: StdRng,
}

impl HeadTailStyle {
    pub fn new (rng: StdRng)->Self { HeadTailStyle{rng} }
}

impl StyleAssigner for HeadTailStyle {
    fn assign (&mut self)->TrackStyle {
        let mut c = [0u8;3];
        while !c.contains(&255) {
            for v in c.iter_mut() {
                *v = if self.rng.random_bool(0.5) { 255 } else { 0 };
            }
        }

        let primary = Rgba([c[0], c[1], c[2], 255]);
        let secondary = Rgba([ dim(c[0]), dim(c[1]), dim(c[2]), 255]);
        TrackStyle { primary, secondary, width: 1 }
    }
}

fn dim (v: u8)->u8 { (0.3 * v as f64) as u8 }

pub fn create_style_assigner (spec: &StyleSpec, rng: StdRng)->Box<dyn StyleAssigner> {
    match spec {
        StyleSpec::Random { palette, min_width, max_width } => {
            Box::new( RandomStyle::new( rng, palette.iter().map(|c| rgba(*c)).collect(), *min_width, *max_width))
        }
        StyleSpec::Fixed { color, width } => {
            let c = rgba(*color);
            Box::new( FixedStyle( TrackStyle{ primary: c, secondary: c, width: *width }))
        }
        StyleSpec::HeadTail => Box::new( HeadTailStyle::new( rng))
    }
}
