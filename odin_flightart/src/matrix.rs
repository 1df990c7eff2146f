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

use image::{Rgba,RgbaImage};
use crate::{projection::Projector, store::TrackStore};

/// one discrete pixel-matrix write
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct PixelWrite {
    pub x: i32,
    pub y: i32,
    pub color: Rgba<u8>,
}

/// the writes for one matrix frame: for each track its tail points in the secondary color, then the head
/// (last point) in the primary color. Points outside the region are dropped by the projector clip policy,
/// so a track whose head is off-matrix still shows its visible tail
pub fn pixel_writes (store: &TrackStore, projector: &Projector)->Vec<PixelWrite> {
    let mut writes = Vec::new();

    for entry in store.iter() {
        let style = entry.style();
        let n = entry.points.len();

        for (i,p) in entry.points.iter().enumerate() {
            if let Some(pp) = projector.project_clipped( p) {
                let color = if i+1 == n { style.primary } else { style.secondary };
                writes.push( PixelWrite{ x: pp.x, y: pp.y, color });
            }
        }
    }
    writes
}

/// mirror matrix writes onto a canvas image so that the frame can be archived
pub fn mirror_writes (img: &mut RgbaImage, writes: &[PixelWrite]) {
    for w in writes {
        if w.x >= 0 && w.y >= 0 && (w.x as u32) < img.width() && (w.y as u32) < img.height() {
            img.put_pixel( w.x as u32, w.y as u32, w.color);
        }
    }
}
