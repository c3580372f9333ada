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
#![allow(unused)]

//! text annotation of frames, e.g. with information about the tracked object

use std::{fs, path::Path};
use ab_glyph::PxScale;
use image::{Rgb, RgbImage};
use imageproc::{drawing::{draw_text_mut, text_size}, rect::Rect};

use crate::errors::{OdinImageError,Result};

pub use ab_glyph::FontVec;

const MARGIN: i32 = 10;

pub fn load_font<P> (path: P)->Result<FontVec> where P: AsRef<Path> {
    let path = path.as_ref();
    if !path.is_file() {
        Err( OdinImageError::NotFoundError( format!("font {}", path.display())) )
    } else {
        let data = fs::read( path)?;
        Ok( FontVec::try_from_vec( data)? )
    }
}

/// a text block that is drawn into the upper left corner of a frame: a title in double size followed
/// by detail lines
#[derive(Debug,Clone,Default,PartialEq)]
pub struct FrameLabel {
    pub title: String,
    pub lines: Vec<String>
}

impl FrameLabel {
    pub fn new (title: impl ToString)->Self {
        FrameLabel { title: title.to_string(), lines: Vec::new() }
    }

    pub fn with_line (mut self, line: impl ToString)->Self {
        self.lines.push( line.to_string());
        self
    }

    pub fn is_empty (&self)->bool { self.title.is_empty() && self.lines.is_empty() }
}

/// draw `label` with detail lines of `line_height` pixels. Returns the bounding box of what was drawn
/// (None if there was nothing to draw)
pub fn draw_label (img: &mut RgbImage, font: &FontVec, label: &FrameLabel, color: Rgb<u8>, line_height: f32)->Option<Rect> {
    if label.is_empty() { return None }

    let title_scale = PxScale::from( line_height * 2.0);
    let line_scale = PxScale::from( line_height);

    let mut y = MARGIN;
    let mut width: u32 = 0;

    if !label.title.is_empty() {
        draw_text_mut( img, color, MARGIN, y, title_scale, font, &label.title);
        width = width.max( text_size( title_scale, font, &label.title).0);
        y += title_scale.y.ceil() as i32 + 2;
    }

    for line in &label.lines {
        draw_text_mut( img, color, MARGIN, y, line_scale, font, line);
        width = width.max( text_size( line_scale, font, line).0);
        y += line_scale.y.ceil() as i32 + 2;
    }

    Some( Rect::at( MARGIN, MARGIN).of_size( width.max(1), (y - MARGIN) as u32) )
}
