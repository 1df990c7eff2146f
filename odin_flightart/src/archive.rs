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

use std::{fs, path::{Path,PathBuf}};
use chrono::{DateTime,Local,Utc};
use image::RgbaImage;
use tracing::info;

use crate::{ArchiveConfig, errors::Result};

pub fn archive_filename (now: DateTime<Local>, suffix: &str)->String {
    format!("{}_{}.png", now.format("%Y%m%d_%H%M%S"), suffix)
}

/// the first unused archive path for `now` within `dir`. Cycles that fall into the same second get a
/// sequence number: `<ts>_<suffix>.png`, `<ts>_<suffix>_1.png`, `<ts>_<suffix>_2.png` ..
pub fn unique_archive_path (dir: &Path, now: DateTime<Local>, suffix: &str)->PathBuf {
    let path = dir.join( archive_filename( now, suffix));
    if !path.exists() { return path }

    let ts = now.format("%Y%m%d_%H%M%S");
    let mut n = 1;
    loop {
        let path = dir.join( format!("{ts}_{suffix}_{n}.png"));
        if !path.exists() { return path }
        n += 1;
    }
}

/// writes one timestamped image per render cycle. Nothing reads these files back
#[derive(Debug,Clone)]
pub struct Archive {
    dir: PathBuf,
    suffix: String,
}

impl Archive {
    pub fn new (dir: impl AsRef<Path>, suffix: impl Into<String>)->Self {
        Archive { dir: dir.as_ref().to_path_buf(), suffix: suffix.into() }
    }

    pub fn from_config (config: &ArchiveConfig)->Self {
        Archive::new( &config.dir, config.suffix.as_str())
    }

    pub fn dir (&self)->&Path { &self.dir }

    pub fn save (&self, img: &RgbaImage, now: DateTime<Utc>)->Result<PathBuf> {
        fs::create_dir_all( &self.dir)?;
        let path = unique_archive_path( &self.dir, now.with_timezone(&Local), &self.suffix);
        img.save( &path)?;
        info!("archived {path:?}");
        Ok(path)
    }
}
