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

use std::{fmt::Write, sync::Arc};
use chrono::{DateTime,Local,Utc};
use serde::{Serialize,Deserialize};
use image::{Rgba,RgbaImage};
use imageproc::{drawing::{draw_filled_rect_mut,draw_hollow_rect_mut,draw_text_mut,text_size},rect::Rect};
use ab_glyph::{FontVec,PxScale};
use tracing::warn;

use crate::{
    SummaryBox, SummaryConfig, SummaryItem, fonts::FontLibrary, stats::SessionStats,
    errors::Result
};

pub const DEFAULT_TIME_FORMAT: &str = "%H:%M";

/// which point of the rendered text is placed at the configured position
#[derive(Debug,Clone,Copy,PartialEq,Eq,Default,Serialize,Deserialize)]
pub enum TextAnchor {
    #[default]
    LeftTop,
    LeftMiddle,
    MiddleMiddle,
}

impl TextAnchor {
    /// the top left position of a text with the given size
    pub fn top_left (&self, x: i32, y: i32, width: u32, height: u32)->(i32,i32) {
        let w2 = (width / 2) as i32;
        let h2 = (height / 2) as i32;
        match self {
            TextAnchor::LeftTop => (x, y),
            TextAnchor::LeftMiddle => (x, y - h2),
            TextAnchor::MiddleMiddle => (x - w2, y - h2),
        }
    }
}

/// expand the placeholders of a summary text template:
///
/// - `{count}` - number of distinct aircraft
/// - `{max_speed}` - in knots
/// - `{max_altitude}` - in feet
/// - `{start:<fmt>}`, `{end:<fmt>}`, `{now:<fmt>}` - local times, `fmt` is a chrono format string (default "%H:%M")
///
/// Unknown placeholders and invalid time formats are copied verbatim
pub fn expand_template (template: &str, stats: &SessionStats, now: DateTime<Utc>)->String {
    let mut out = String::with_capacity( template.len() + 16);
    let mut rest = template;

    while let Some(i0) = rest.find('{') {
        out.push_str( &rest[..i0]);
        let tail = &rest[i0..];

        match tail.find('}') {
            Some(i1) => {
                let placeholder = &tail[..=i1];
                if !expand_placeholder( &mut out, &tail[1..i1], stats, now) {
                    out.push_str( placeholder);
                }
                rest = &tail[i1+1..];
            }
            None => {
                out.push_str( tail);
                rest = "";
            }
        }
    }
    out.push_str( rest);
    out
}

fn expand_placeholder (out: &mut String, key: &str, stats: &SessionStats, now: DateTime<Utc>)->bool {
    let (name, fmt) = match key.split_once(':') {
        Some((name,fmt)) => (name, fmt),
        None => (key, DEFAULT_TIME_FORMAT)
    };

    match name {
        "count" => write!( out, "{}", stats.distinct_aircraft_count).is_ok(),
        "max_speed" => write!( out, "{:.0}", stats.max_speed).is_ok(),
        "max_altitude" => write!( out, "{:.0}", stats.max_altitude).is_ok(),
        "start" => write_local_time( out, stats.window_start, fmt),
        "end" => write_local_time( out, stats.window_end, fmt),
        "now" => write_local_time( out, now, fmt),
        _ => false
    }
}

fn write_local_time (out: &mut String, dt: DateTime<Utc>, fmt: &str)->bool {
    let mut s = String::new();
    if write!( s, "{}", dt.with_timezone(&Local).format(fmt)).is_ok() {
        out.push_str( &s);
        true
    } else {
        false
    }
}

struct SummaryText {
    item: SummaryItem,
    font: Arc<FontVec>,
}

/// static boxes and templated text items drawn on top of a finished batch rendering
pub struct SummaryOverlay {
    boxes: Vec<SummaryBox>,
    texts: Vec<SummaryText>,
}

impl SummaryOverlay {
    pub fn new (config: &SummaryConfig, fonts: &FontLibrary)->Result<Self> {
        let mut texts = Vec::with_capacity( config.items.len());
        for item in &config.items {
            let font = fonts.get( &item.font)?;
            texts.push( SummaryText{ item: item.clone(), font });
        }

        Ok( SummaryOverlay{ boxes: config.boxes.clone(), texts } )
    }

    pub fn draw (&self, img: &mut RgbaImage, stats: &SessionStats, now: DateTime<Utc>) {
        for b in &self.boxes {
            draw_box( img, b);
        }

        for t in &self.texts {
            let text = expand_template( &t.item.text, stats, now);
            if text.is_empty() { continue }

            let scale = PxScale::from( t.item.size);
            let font = t.font.as_ref();
            let (w,h) = text_size( scale, font, &text);
            let (x,y) = t.item.anchor.top_left( t.item.x, t.item.y, w, h);

            draw_text_mut( img, Rgba(t.item.color), x, y, scale, font, &text);
        }
    }
}

fn draw_box (img: &mut RgbaImage, b: &SummaryBox) {
    if b.width == 0 || b.height == 0 {
        warn!("ignoring empty summary box at {},{}", b.x, b.y);
        return
    }

    if let Some(fill) = b.fill {
        draw_filled_rect_mut( img, Rect::at( b.x, b.y).of_size( b.width, b.height), Rgba(fill));
    }

    if let Some(outline) = b.outline {
        for i in 0..b.outline_width {
            let d = 2*i;
            if d >= b.width || d >= b.height { break }
            let rect = Rect::at( b.x + i as i32, b.y + i as i32).of_size( b.width - d, b.height - d);
            draw_hollow_rect_mut( img, rect, Rgba(outline));
        }
    }
}
