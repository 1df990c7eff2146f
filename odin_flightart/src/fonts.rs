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

use std::{collections::HashMap, fs, sync::Arc};
use ab_glyph::FontVec;
use tracing::debug;

use crate::{config::find_config_file, errors::{Result,config_error}};

/// the fonts a session draws with, loaded once at startup and looked up by config name
#[derive(Default,Clone)]
pub struct FontLibrary {
    fonts: HashMap<String,Arc<FontVec>>,
}

impl FontLibrary {
    pub fn new ()->Self { FontLibrary::default() }

    /// load all `name -> path` entries. Relative paths that don't exist are looked up in our `configs/` dir
    pub fn load (font_paths: &HashMap<String,String>)->Result<Self> {
        let mut lib = FontLibrary::new();
        for (name,path) in font_paths {
            lib.load_font( name, path)?;
        }
        Ok(lib)
    }

    pub fn load_font (&mut self, name: &str, path: &str)->Result<()> {
        let path = find_config_file( path).ok_or_else( || config_error!("font file not found: {path}"))?;
        let data = fs::read( &path)?;
        let font = FontVec::try_from_vec( data)?;
        debug!("loaded font {name} from {path:?}");

        self.fonts.insert( name.to_string(), Arc::new(font));
        Ok(())
    }

    pub fn insert (&mut self, name: impl Into<String>, font: FontVec) {
        self.fonts.insert( name.into(), Arc::new(font));
    }

    pub fn get (&self, name: &str)->Result<Arc<FontVec>> {
        self.fonts.get( name).cloned().ok_or_else( || config_error!("unknown font {name}"))
    }

    pub fn len (&self)->usize { self.fonts.len() }
    pub fn is_empty (&self)->bool { self.fonts.is_empty() }
}
