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

use std::sync::Arc;
use image::{Rgba,RgbaImage,imageops::overlay};
use imageproc::{drawing::{draw_text_mut,text_size},geometric_transformations::{rotate_about_center,Interpolation}};
use ab_glyph::{FontVec,PxScale};
use rand::{Rng, rngs::StdRng, seq::IndexedRandom};
use tracing::debug;

use crate::{
    LabelConfig, CLEAR, fonts::FontLibrary, projection::{CanvasRegion,PixelPoint}, store::TrackEntry,
    errors::Result
};

/// optional decoration of a rendered track. Called once per track, right after the track is drawn
pub trait LabelStrategy: Send {
    fn draw_label (&mut self, img: &mut RgbaImage, entry: &TrackEntry, region: &CanvasRegion);
}

pub struct NoLabels;

impl LabelStrategy for NoLabels {
    fn draw_label (&mut self, _img: &mut RgbaImage, _entry: &TrackEntry, _region: &CanvasRegion) {}
}

/// all random choices for one label
#[derive(Debug,Clone,PartialEq)]
pub struct LabelPlan {
    pub text: String,
    pub font_idx: usize,
    pub fill: Rgba<u8>,
    pub stroke: Rgba<u8>,   // always != fill
    pub stroke_width: u32,
    pub rotation_deg: u32,  // [0,360)
    pub center: PixelPoint, // uniform within the canvas region
}

struct ScaledFont {
    font: Arc<FontVec>,
    scale: PxScale,
}

/// makes the random choices for labels. Separate from the font handling so that it can be used (and tested)
/// without loading font files
pub struct LabelPlanner {
    rng: StdRng,
    n_fonts: usize,
    palette: Vec<Rgba<u8>>,
    stroke_width: (u32,u32), // [min,max)
}

impl LabelPlanner {
    pub fn new (rng: StdRng, n_fonts: usize, palette: Vec<Rgba<u8>>, stroke_width: (u32,u32))->Self {
        LabelPlanner { rng, n_fonts, palette, stroke_width }
    }

    /// pick the label parameters. Returns `None` if we don't have a font or two distinct colors
    pub fn plan (&mut self, text: &str, region: &CanvasRegion)->Option<LabelPlan> {
        if self.n_fonts == 0 { return None }

        let font_idx = self.rng.random_range( 0..self.n_fonts);
        let fill = *self.palette.choose( &mut self.rng)?;
        let strokes: Vec<Rgba<u8>> = self.palette.iter().filter( |c| **c != fill).copied().collect();
        let stroke = *strokes.choose( &mut self.rng)?;

        let (w_min,w_max) = self.stroke_width;
        let stroke_width = if w_max > w_min { self.rng.random_range( w_min..w_max) } else { w_min };
        let rotation_deg = self.rng.random_range( 0..360);
        let center = PixelPoint::new(
            self.rng.random_range( region.x_offset..=region.x_max()),
            self.rng.random_range( region.y_offset..=region.y_max())
        );

        Some( LabelPlan { text: text.to_string(), font_idx, fill, stroke, stroke_width, rotation_deg, center } )
    }
}

/// the callsign in a random font, colors and stroke width, rotated by a random angle and placed at a
/// random position within the canvas region (not at the track)
pub struct RotatedCallsignLabels {
    planner: LabelPlanner,
    fonts: Vec<ScaledFont>,
}

impl RotatedCallsignLabels {
    pub fn new (config: &LabelConfig, font_lib: &FontLibrary, rng: StdRng)->Result<Self> {
        let mut fonts = Vec::with_capacity( config.fonts.len());
        for lf in &config.fonts {
            fonts.push( ScaledFont{ font: font_lib.get( &lf.font)?, scale: PxScale::from( lf.size) });
        }
        let palette = config.palette.iter().map( |c| Rgba(*c)).collect();
        let planner = LabelPlanner::new( rng, fonts.len(), palette, config.stroke_width);

        Ok( RotatedCallsignLabels { planner, fonts } )
    }

    /// render the label into its own transparent image, rotate it and paste it centered at `plan.center`
    pub fn render (&self, img: &mut RgbaImage, plan: &LabelPlan) {
        let Some(lf) = self.fonts.get( plan.font_idx) else { return };
        let font = lf.font.as_ref();

        let (w,h) = text_size( lf.scale, font, &plan.text);
        if w == 0 || h == 0 { return }

        let sw = plan.stroke_width as i32;
        let bw = (w + 2*plan.stroke_width) as f64;
        let bh = (h + 2*plan.stroke_width) as f64;
        let side = (bw*bw + bh*bh).sqrt().ceil() as u32 + 2; // large enough for any rotation
        let x0 = (side - w) as i32 / 2;
        let y0 = (side - h) as i32 / 2;

        let mut label_img = RgbaImage::from_pixel( side, side, Rgba(CLEAR));
        for dy in -sw..=sw {
            for dx in -sw..=sw {
                if (dx != 0 || dy != 0) && dx*dx + dy*dy <= sw*sw {
                    draw_text_mut( &mut label_img, plan.stroke, x0 + dx, y0 + dy, lf.scale, font, &plan.text);
                }
            }
        }
        draw_text_mut( &mut label_img, plan.fill, x0, y0, lf.scale, font, &plan.text);

        let theta = (plan.rotation_deg as f32).to_radians();
        let rotated = rotate_about_center( &label_img, theta, Interpolation::Bilinear, Rgba(CLEAR));

        let half = (side / 2) as i64;
        overlay( img, &rotated, plan.center.x as i64 - half, plan.center.y as i64 - half);
    }
}

impl LabelStrategy for RotatedCallsignLabels {
    fn draw_label (&mut self, img: &mut RgbaImage, entry: &TrackEntry, region: &CanvasRegion) {
        if let Some(cs) = &entry.callsign {
            if let Some(plan) = self.planner.plan( cs, region) {
                debug!("label {} at {},{} rot {}", plan.text, plan.center.x, plan.center.y, plan.rotation_deg);
                self.render( img, &plan);
            }
        }
    }
}

pub fn create_label_strategy (config: &LabelConfig, font_lib: &FontLibrary, rng: StdRng)->Result<Box<dyn LabelStrategy>> {
    if config.enabled {
        Ok( Box::new( RotatedCallsignLabels::new( config, font_lib, rng)?) )
    } else {
        Ok( Box::new( NoLabels) )
    }
}
