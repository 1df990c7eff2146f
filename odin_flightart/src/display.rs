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

use std::path::{Path,PathBuf};
use image::{Rgb,RgbImage};
use tracing::{debug,info};

use crate::{OutputConfig, errors::{Result,device_failure}};

/// a full frame display such as an e-paper panel. `width` and `height` are the logical (rotated) dimensions
/// that committed images have to match. A commit can take several seconds
pub trait PanelDisplay: Send {
    fn width (&self)->u32;
    fn height (&self)->u32;
    fn rotation (&self)->u8; // in 90 deg steps
    fn commit (&mut self, img: &RgbImage)->Result<()>;
}

/// discrete pixel writes without a commit step, such as an RGB LED matrix
pub trait PixelMatrix: Send {
    fn width (&self)->u32;
    fn height (&self)->u32;
    fn clear (&mut self);
    fn set_pixel (&mut self, x: i32, y: i32, r: u8, g: u8, b: u8);

    /// end of frame. Devices with direct writes don't need to do anything here
    fn flush (&mut self)->Result<()> { Ok(()) }
}

pub const TRI_COLOR_PALETTE: [Rgb<u8>;3] = [ Rgb([255,255,255]), Rgb([0,0,0]), Rgb([255,0,0]) ];

/// map a pixel to the closest white/black/red panel color
pub fn quantize_tri_color (px: &Rgb<u8>)->Rgb<u8> {
    let dist = |c: &Rgb<u8>| -> i32 {
        (0..3).map( |i| { let d = px[i] as i32 - c[i] as i32; d*d }).sum()
    };

    let mut best = TRI_COLOR_PALETTE[0];
    let mut best_dist = dist( &best);
    for c in &TRI_COLOR_PALETTE[1..] {
        let d = dist(c);
        if d < best_dist { best = *c; best_dist = d; }
    }
    best
}

/// a panel that writes each committed frame to an image file
pub struct FilePanel {
    path: PathBuf,
    width: u32,
    height: u32,
    rotation: u8,
    tri_color: bool,
    n_commits: usize,
}

impl FilePanel {
    pub fn new (path: impl AsRef<Path>, width: u32, height: u32, rotation: u8, tri_color: bool)->Self {
        FilePanel { path: path.as_ref().to_path_buf(), width, height, rotation: rotation % 4, tri_color, n_commits: 0 }
    }

    pub fn path (&self)->&Path { &self.path }
    pub fn n_commits (&self)->usize { self.n_commits }
}

impl PanelDisplay for FilePanel {
    fn width (&self)->u32 { self.width }
    fn height (&self)->u32 { self.height }
    fn rotation (&self)->u8 { self.rotation }

    fn commit (&mut self, img: &RgbImage)->Result<()> {
        if img.width() != self.width || img.height() != self.height {
            return Err( device_failure!("frame size {}x{} does not match panel {}x{}", img.width(), img.height(), self.width, self.height))
        }

        let res = if self.tri_color {
            let mut quantized = img.clone();
            for px in quantized.pixels_mut() {
                *px = quantize_tri_color( px);
            }
            quantized.save( &self.path)
        } else {
            img.save( &self.path)
        };
        res.map_err( |e| device_failure!("panel commit to {:?} failed: {e}", self.path))?;

        self.n_commits += 1;
        info!("panel refreshed: {:?}", self.path);
        Ok(())
    }
}

/// a pixel matrix that keeps a framebuffer and writes it to an image file on each flush
pub struct FileMatrix {
    path: PathBuf,
    framebuffer: RgbImage,
}

impl FileMatrix {
    pub fn new (path: impl AsRef<Path>, width: u32, height: u32)->Self {
        FileMatrix { path: path.as_ref().to_path_buf(), framebuffer: RgbImage::new( width, height) }
    }

    pub fn framebuffer (&self)->&RgbImage { &self.framebuffer }
}

impl PixelMatrix for FileMatrix {
    fn width (&self)->u32 { self.framebuffer.width() }
    fn height (&self)->u32 { self.framebuffer.height() }

    fn clear (&mut self) {
        for px in self.framebuffer.pixels_mut() {
            *px = Rgb([0,0,0]);
        }
    }

    fn set_pixel (&mut self, x: i32, y: i32, r: u8, g: u8, b: u8) {
        if x >= 0 && y >= 0 && (x as u32) < self.framebuffer.width() && (y as u32) < self.framebuffer.height() {
            self.framebuffer.put_pixel( x as u32, y as u32, Rgb([r,g,b]));
        }
    }

    fn flush (&mut self)->Result<()> {
        self.framebuffer.save( &self.path).map_err( |e| device_failure!("matrix write to {:?} failed: {e}", self.path))?;
        debug!("matrix frame written to {:?}", self.path);
        Ok(())
    }
}

/// where rendered frames go
pub enum OutputSink {
    Panel( Box<dyn PanelDisplay>),
    Matrix( Box<dyn PixelMatrix>),
}

impl OutputSink {
    /// the file backed devices for an output config, sized to the canvas
    pub fn from_config (config: &OutputConfig, width: u32, height: u32)->Self {
        match config {
            OutputConfig::Panel{path,rotation,tri_color} => {
                OutputSink::Panel( Box::new( FilePanel::new( path, width, height, *rotation, *tri_color)))
            }
            OutputConfig::Matrix{path} => {
                OutputSink::Matrix( Box::new( FileMatrix::new( path, width, height)))
            }
        }
    }

    pub fn size (&self)->(u32,u32) {
        match self {
            OutputSink::Panel(panel) => (panel.width(), panel.height()),
            OutputSink::Matrix(matrix) => (matrix.width(), matrix.height())
        }
    }
}
