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

use image::{DynamicImage,Rgba,RgbImage,RgbaImage,imageops::overlay};
use imageproc::{drawing::{draw_filled_circle_mut,draw_line_segment_mut,draw_polygon_mut},point::Point};
use tracing::debug;

use crate::{
    CanvasConfig, config::find_config_file, label::LabelStrategy, projection::{PixelPoint,Projector},
    store::{TrackEntry,TrackStore}, errors::{Result,config_error}
};

/// the session's single render target. A background is pasted below the tracks on each reset,
/// a frame is alpha-pasted on top once the tracks are drawn
pub struct Canvas {
    image: RgbaImage,
    fill: Rgba<u8>,
    background: Option<RgbaImage>,
    frame: Option<RgbaImage>,
}

impl Canvas {
    pub fn new (width: u32, height: u32, fill: [u8;4])->Self {
        Canvas {
            image: RgbaImage::from_pixel( width, height, Rgba(fill)),
            fill: Rgba(fill),
            background: None,
            frame: None
        }
    }

    pub fn from_config (config: &CanvasConfig)->Result<Self> {
        let mut canvas = Canvas::new( config.width, config.height, config.fill);
        if let Some(path) = &config.background_image {
            canvas.background = Some( load_rgba( path)?);
        }
        if let Some(path) = &config.frame_image {
            canvas.frame = Some( load_rgba( path)?);
        }
        canvas.reset();
        Ok(canvas)
    }

    pub fn with_background (mut self, img: RgbaImage)->Self {
        self.background = Some(img);
        self.reset();
        self
    }

    pub fn with_frame (mut self, img: RgbaImage)->Self {
        self.frame = Some(img);
        self
    }

    pub fn width (&self)->u32 { self.image.width() }
    pub fn height (&self)->u32 { self.image.height() }

    pub fn image (&self)->&RgbaImage { &self.image }
    pub fn image_mut (&mut self)->&mut RgbaImage { &mut self.image }

    /// clear to the fill color and paste the background (if any)
    pub fn reset (&mut self) {
        for px in self.image.pixels_mut() {
            *px = self.fill;
        }
        if let Some(bg) = &self.background {
            overlay( &mut self.image, bg, 0, 0);
        }
    }

    pub fn apply_frame (&mut self) {
        if let Some(frame) = &self.frame {
            overlay( &mut self.image, frame, 0, 0);
        }
    }

    /// what we hand to panel displays (which don't know about alpha)
    pub fn to_rgb (&self)->RgbImage {
        DynamicImage::ImageRgba8( self.image.clone()).to_rgb8()
    }
}

fn load_rgba (path: &str)->Result<RgbaImage> {
    let path = find_config_file( path).ok_or_else( || config_error!("image not found: {path}"))?;
    Ok( image::open( &path)?.to_rgba8() )
}

/// draw a connected line of the given width through `points`, with round joints and round caps of
/// radius `width/2` at both ends. Points can be outside of the image, the primitives clip
pub fn draw_polyline (img: &mut RgbaImage, points: &[PixelPoint], color: Rgba<u8>, width: u32) {
    let Some(first) = points.first() else { return };
    let last = points[points.len()-1];
    let r = (width / 2) as i32;

    if width <= 1 {
        for w in points.windows(2) {
            draw_line_segment_mut( img, (w[0].x as f32, w[0].y as f32), (w[1].x as f32, w[1].y as f32), color);
        }
    } else {
        for w in points.windows(2) {
            draw_thick_segment( img, &w[0], &w[1], color, width);
        }
        // round joints
        if points.len() > 2 {
            for p in &points[1..points.len()-1] {
                draw_filled_circle_mut( img, (p.x, p.y), r, color);
            }
        }
    }

    // caps
    draw_filled_circle_mut( img, (first.x, first.y), r, color);
    draw_filled_circle_mut( img, (last.x, last.y), r, color);
}

fn draw_thick_segment (img: &mut RgbaImage, a: &PixelPoint, b: &PixelPoint, color: Rgba<u8>, width: u32) {
    let dx = (b.x - a.x) as f32;
    let dy = (b.y - a.y) as f32;
    let len = (dx*dx + dy*dy).sqrt();
    if len == 0.0 { return } // stationary sample, the caps/joints cover it

    let hw = width as f32 / 2.0;
    let nx = (-dy / len * hw).round() as i32;
    let ny = (dx / len * hw).round() as i32;

    let poly = [
        Point::new( a.x + nx, a.y + ny),
        Point::new( b.x + nx, b.y + ny),
        Point::new( b.x - nx, b.y - ny),
        Point::new( a.x - nx, a.y - ny),
    ];
    if poly[0] != poly[3] {
        draw_polygon_mut( img, &poly, color);
    }
}

/// draws all tracks of a store onto a canvas. Never mutates the store
pub struct TrackRenderer {
    labels: Box<dyn LabelStrategy>,
}

impl TrackRenderer {
    pub fn new (labels: Box<dyn LabelStrategy>)->Self {
        TrackRenderer { labels }
    }

    /// draw tracks in store iteration order, each one followed by its label. Returns the number of drawn tracks
    pub fn render (&mut self, canvas: &mut Canvas, store: &TrackStore, projector: &Projector)->usize {
        let mut n_drawn = 0;
        for entry in store.iter() {
            if self.render_track( canvas.image_mut(), entry, projector) {
                n_drawn += 1;
            }
        }
        debug!("rendered {n_drawn} of {} tracks", store.len());
        n_drawn
    }

    fn render_track (&mut self, img: &mut RgbaImage, entry: &TrackEntry, projector: &Projector)->bool {
        let points = projector.project_track( entry.points.iter());
        if points.is_empty() { return false }

        let style = entry.style();
        draw_polyline( img, &points, style.primary, style.width);
        self.labels.draw_label( img, entry, projector.region());
        true
    }
}
