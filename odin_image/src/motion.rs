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

//! frame differencing based motion highlighting.
//!
//! Each frame is converted to intensity and compared against a reference frame. Pixels whose absolute
//! difference exceeds `diff_threshold` form a binary mask, 8-connected mask regions of at least
//! `min_region_area` pixels are reported as motion. The reference is refreshed every `refresh_interval`
//! frames, but only with a quiet frame (no qualifying regions and a changed pixel fraction of at most
//! `max_refresh_change`). Once `max_deferred_refreshes` consecutive refresh attempts were rejected the
//! current frame is adopted anyway, which is what we need after the camera slewed to a new scene.
//! Frames that do not match the reference size are rejected, unless `max_size_mismatches` of them arrive
//! in a row (the source changed its resolution), in which case the last one becomes the new reference.
//!
//! Since the camera is pointed at the tracked aircraft, detection can be restricted to a centered
//! `search_region` of each frame.

use std::fmt;
use image::{DynamicImage, Luma, Rgb, RgbImage};
use imageproc::{
    drawing::{draw_hollow_rect_mut, draw_line_segment_mut},
    rect::Rect,
    region_labelling::{connected_components, Connectivity}
};
use serde::{Serialize,Deserialize};
use tracing::{debug,info,warn};

use crate::{GrayImage8, check_equal_gray_dimensions, get_hex_rgb, to_luma8, errors::{OdinImageError,Result}};

#[derive(Serialize,Deserialize,Debug,Clone)]
pub struct MotionConfig {
    #[serde(default="default_diff_threshold")]
    pub diff_threshold: u8, // min absolute luma difference of a changed pixel

    #[serde(default="default_min_region_area")]
    pub min_region_area: u32, // in pixels

    #[serde(default="default_refresh_interval")]
    pub refresh_interval: u32, // in frames

    #[serde(default="default_max_refresh_change")]
    pub max_refresh_change: f32, // max changed pixel fraction of a frame that can become the reference

    #[serde(default="default_max_deferred_refreshes")]
    pub max_deferred_refreshes: u32, // 0 means a refresh is never forced

    #[serde(default="default_max_size_mismatches")]
    pub max_size_mismatches: u32, // consecutive frames of a new size before it replaces the reference

    #[serde(default)]
    pub blur_sigma: Option<f32>,

    #[serde(default)]
    pub search_region: Option<f32>, // fraction of the half frame extents around the center, 1.0 is the whole frame

    #[serde(default="default_marker_color")]
    pub marker_color: String, // "rrggbb"
}

fn default_diff_threshold()->u8 { 25 }
fn default_min_region_area()->u32 { 4 }
fn default_refresh_interval()->u32 { 30 }
fn default_max_refresh_change()->f32 { 0.002 }
fn default_max_deferred_refreshes()->u32 { 10 }
fn default_max_size_mismatches()->u32 { 3 }
fn default_marker_color()->String { "ff2020".into() }

impl Default for MotionConfig {
    fn default()->Self {
        MotionConfig {
            diff_threshold: default_diff_threshold(),
            min_region_area: default_min_region_area(),
            refresh_interval: default_refresh_interval(),
            max_refresh_change: default_max_refresh_change(),
            max_deferred_refreshes: default_max_deferred_refreshes(),
            max_size_mismatches: default_max_size_mismatches(),
            blur_sigma: None,
            search_region: None,
            marker_color: default_marker_color()
        }
    }
}

impl MotionConfig {
    pub fn check (&self)->Result<()> {
        if self.refresh_interval == 0 {
            return Err( OdinImageError::ConfigError("refresh_interval has to be > 0".into()))
        }
        if !(0.0..=1.0).contains( &self.max_refresh_change) {
            return Err( OdinImageError::ConfigError( format!("max_refresh_change not in [0,1]: {}", self.max_refresh_change)))
        }
        if self.max_size_mismatches == 0 {
            return Err( OdinImageError::ConfigError("max_size_mismatches has to be > 0".into()))
        }
        if let Some(size) = self.search_region {
            if !(size > 0.0 && size <= 1.0) {
                return Err( OdinImageError::ConfigError( format!("search_region not in (0,1]: {size}")))
            }
        }
        if let Some(sigma) = self.blur_sigma {
            if !(sigma > 0.0) {
                return Err( OdinImageError::ConfigError( format!("blur_sigma has to be positive: {sigma}")))
            }
        }
        get_hex_rgb( &self.marker_color)?;
        Ok(())
    }
}

/// a connected area of changed pixels
#[derive(Debug,Clone,PartialEq)]
pub struct MotionRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub area: u32, // number of changed pixels, not the bounding box area
    pub centroid: (f32,f32)
}

impl MotionRegion {
    pub fn contains (&self, x: u32, y: u32)->bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn rect (&self)->Rect {
        Rect::at( self.x as i32, self.y as i32).of_size( self.width, self.height)
    }
}

impl fmt::Display for MotionRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "MotionRegion( {},{} {}x{}, area: {}, centroid: ({:.1},{:.1}))",
                self.x, self.y, self.width, self.height, self.area, self.centroid.0, self.centroid.1)
    }
}

/// binary (0/255) mask of pixels that differ by more than `threshold`, plus the number of set pixels
pub fn diff_mask (reference: &GrayImage8, current: &GrayImage8, threshold: u8)->Result<(GrayImage8,u32)> {
    check_equal_gray_dimensions( reference, current)?;

    let (w,h) = current.dimensions();
    let mut mask = GrayImage8::new( w, h);
    let mut changed: u32 = 0;

    for (m, (r, c)) in mask.pixels_mut().zip( reference.pixels().zip( current.pixels())) {
        if r.0[0].abs_diff( c.0[0]) > threshold {
            m.0[0] = 255;
            changed += 1;
        }
    }

    Ok( (mask, changed) )
}

/// the centered search area of a `width` x `height` frame. `size` is the fraction of the half width and
/// height on each side of the center
pub fn search_rect (width: u32, height: u32, size: f32)->Rect {
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;

    let x0 = (cx - cx * size) as i32;
    let y0 = (cy - cy * size) as i32;
    let x1 = (cx + cx * size) as i32;
    let y1 = (cy + cy * size) as i32;

    Rect::at( x0, y0).of_size( (x1 - x0).max(1) as u32, (y1 - y0).max(1) as u32)
}

/// clear all mask pixels outside of `rect`
pub fn clear_outside (mask: &mut GrayImage8, rect: &Rect) {
    for (x, y, p) in mask.enumerate_pixels_mut() {
        let (x,y) = (x as i32, y as i32);
        if x < rect.left() || x > rect.right() || y < rect.top() || y > rect.bottom() {
            p.0[0] = 0;
        }
    }
}

#[derive(Clone,Copy)]
struct RegionAcc {
    min_x: u32, min_y: u32, max_x: u32, max_y: u32,
    n: u32,
    sum_x: u64, sum_y: u64
}

impl RegionAcc {
    fn new (x: u32, y: u32)->Self {
        RegionAcc { min_x: x, min_y: y, max_x: x, max_y: y, n: 0, sum_x: 0, sum_y: 0 }
    }

    fn add (&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.n += 1;
        self.sum_x += x as u64;
        self.sum_y += y as u64;
    }

    fn to_region (&self)->MotionRegion {
        let n = self.n as f64;
        MotionRegion {
            x: self.min_x,
            y: self.min_y,
            width: self.max_x - self.min_x + 1,
            height: self.max_y - self.min_y + 1,
            area: self.n,
            centroid: ((self.sum_x as f64 / n) as f32, (self.sum_y as f64 / n) as f32)
        }
    }
}

/// 8-connected regions of a binary mask with at least `min_area` pixels, largest first
pub fn find_regions (mask: &GrayImage8, min_area: u32)->Vec<MotionRegion> {
    let labels = connected_components( mask, Connectivity::Eight, Luma([0u8]));
    let mut accs: Vec<Option<RegionAcc>> = Vec::new();

    for (x, y, label) in labels.enumerate_pixels() {
        let l = label.0[0] as usize;
        if l > 0 {
            if l >= accs.len() { accs.resize( l+1, None) }
            accs[l].get_or_insert_with( || RegionAcc::new(x,y)).add( x, y);
        }
    }

    let mut regions: Vec<MotionRegion> = accs.iter().flatten()
        .filter( |acc| acc.n >= min_area)
        .map( |acc| acc.to_region())
        .collect();
    regions.sort_by( |a,b| b.area.cmp( &a.area).then( a.y.cmp( &b.y)).then( a.x.cmp( &b.x)));
    regions
}

/// the stateless detector: regions of `current` that changed with respect to `reference`
pub fn detect_motion (reference: &DynamicImage, current: &DynamicImage, config: &MotionConfig)->Result<Vec<MotionRegion>> {
    let ref_luma = to_luma8( reference, config.blur_sigma);
    let cur_luma = to_luma8( current, config.blur_sigma);
    let (mut mask, _) = diff_mask( &ref_luma, &cur_luma, config.diff_threshold)?;
    if let Some(size) = config.search_region {
        let (w,h) = mask.dimensions();
        clear_outside( &mut mask, &search_rect( w, h, size));
    }
    Ok( find_regions( &mask, config.min_region_area) )
}

/// draw a box around each region and a crosshair on the centroid of the first (largest) one
pub fn draw_regions (img: &mut RgbImage, regions: &[MotionRegion], color: Rgb<u8>) {
    for r in regions {
        draw_hollow_rect_mut( img, r.rect(), color);
    }

    if let Some(r) = regions.first() {
        let (cx,cy) = r.centroid;
        let arm = (r.width.max( r.height) as f32) + 6.0;
        draw_line_segment_mut( img, (cx - arm, cy), (cx + arm, cy), color);
        draw_line_segment_mut( img, (cx, cy - arm), (cx, cy + arm), color);
    }
}

pub struct HighlightedFrame {
    pub image: RgbImage,
    pub regions: Vec<MotionRegion>,
    pub reference_refreshed: bool
}

impl HighlightedFrame {
    pub fn largest_region (&self)->Option<&MotionRegion> { self.regions.first() }
}

/// the stateful highlighter that owns the reference frame
pub struct MotionHighlighter {
    config: MotionConfig,
    marker: Rgb<u8>,
    reference: Option<GrayImage8>,
    frames_since_refresh: u32,
    deferred_refreshes: u32,
    size_mismatches: u32,
    n_frames: u64
}

impl MotionHighlighter {
    pub fn new (config: MotionConfig)->Result<Self> {
        config.check()?;
        let marker = Rgb( get_hex_rgb( &config.marker_color)?);

        Ok( MotionHighlighter { config, marker, reference: None, frames_since_refresh: 0, deferred_refreshes: 0, size_mismatches: 0, n_frames: 0 } )
    }

    pub fn config (&self)->&MotionConfig { &self.config }
    pub fn has_reference (&self)->bool { self.reference.is_some() }
    pub fn n_frames (&self)->u64 { self.n_frames }

    /// drop the reference so that the next frame becomes the new one
    pub fn reset_reference (&mut self) {
        self.reference = None;
        self.frames_since_refresh = 0;
        self.deferred_refreshes = 0;
        self.size_mismatches = 0;
    }

    /// detect and mark motion in `frame`. A frame that does not match the reference dimensions is
    /// rejected with `InvalidDimensions`, unless it is the `max_size_mismatches`th such frame in a row,
    /// which then replaces the reference
    pub fn process (&mut self, frame: &DynamicImage)->Result<HighlightedFrame> {
        let luma = to_luma8( frame, self.config.blur_sigma);
        let mut image = frame.to_rgb8();

        if let Some(ref_dims) = self.reference.as_ref().map( |r| r.dimensions()) {
            if ref_dims != luma.dimensions() {
                self.size_mismatches += 1;
                if self.size_mismatches < self.config.max_size_mismatches {
                    return Err( OdinImageError::InvalidDimensions( format!("frame {:?} vs reference {:?}", luma.dimensions(), ref_dims)))
                }
                warn!("frame size changed from {:?} to {:?}, replacing motion reference", ref_dims, luma.dimensions());
                self.reset_reference();
            } else {
                self.size_mismatches = 0;
            }
        }

        let Some(reference) = &self.reference else {
            debug!("initialized motion reference frame {:?}", luma.dimensions());
            self.reference = Some(luma);
            self.n_frames += 1;
            return Ok( HighlightedFrame { image, regions: Vec::new(), reference_refreshed: true } )
        };

        let (mut mask, changed) = diff_mask( reference, &luma, self.config.diff_threshold)?;
        let search = self.config.search_region.map( |size| {
            let (w,h) = mask.dimensions();
            search_rect( w, h, size)
        });
        if let Some(rect) = &search {
            clear_outside( &mut mask, rect);
        }
        let regions = find_regions( &mask, self.config.min_region_area);
        self.n_frames += 1;

        self.frames_since_refresh += 1;
        let reference_refreshed = if self.frames_since_refresh >= self.config.refresh_interval {
            let (w,h) = luma.dimensions();
            let changed_fraction = changed as f32 / (w as f32 * h as f32).max(1.0);
            self.try_refresh( luma, changed_fraction, regions.is_empty())
        } else {
            false
        };

        if let Some(rect) = search {
            draw_hollow_rect_mut( &mut image, rect, self.marker);
        }
        draw_regions( &mut image, &regions, self.marker);
        Ok( HighlightedFrame { image, regions, reference_refreshed } )
    }

    fn try_refresh (&mut self, luma: GrayImage8, changed_fraction: f32, is_quiet: bool)->bool {
        self.frames_since_refresh = 0;

        if is_quiet && changed_fraction <= self.config.max_refresh_change {
            self.reference = Some(luma);
            self.deferred_refreshes = 0;
            true

        } else if self.config.max_deferred_refreshes > 0 && self.deferred_refreshes >= self.config.max_deferred_refreshes {
            info!("forced motion reference refresh after {} deferred attempts (changed: {:.3})", self.deferred_refreshes, changed_fraction);
            self.reference = Some(luma);
            self.deferred_refreshes = 0;
            true

        } else {
            self.deferred_refreshes += 1;
            debug!("deferred motion reference refresh (changed: {:.3})", changed_fraction);
            false
        }
    }
}
