/*
 * Copyright © 2024, United States Government, as represented by the Administrator of
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

/// classic image processing module of ODIN
/// this mostly wraps and extends the external 'image' and 'imageproc' crates for frame based
/// motion highlighting of video streams

use image::{self, DynamicImage, GenericImageView, ImageBuffer, Luma, Rgb};
use imageproc::filter::gaussian_blur_f32;

mod errors;
pub use errors::{Result,OdinImageError};

pub mod motion;
pub mod frames;
pub mod overlay;

pub type GrayImage8 = ImageBuffer<Luma<u8>, Vec<u8>>;

pub fn check_equal_dimensions (img1: &DynamicImage, img2: &DynamicImage)->Result<()> {
    if img1.dimensions() != img2.dimensions() {
        Err( OdinImageError::InvalidDimensions("image dimensions differ".into()) )
    } else {
        Ok(())
    }
}

pub fn check_equal_gray_dimensions (img1: &GrayImage8, img2: &GrayImage8)->Result<()> {
    if img1.dimensions() != img2.dimensions() {
        Err( OdinImageError::InvalidDimensions( format!("{:?} vs {:?}", img1.dimensions(), img2.dimensions())) )
    } else {
        Ok(())
    }
}

/// parse a "rrggbb" hex color spec (optionally prefixed with '#')
pub fn get_hex_rgb (hex_color: &str)->Result<[u8;3]> {
    let s = hex_color.strip_prefix('#').unwrap_or(hex_color);
    if s.len() != 6 {
        return Err( OdinImageError::IllegalArgument( format!("invalid hex color spec: {hex_color}")))
    }
    let v = u32::from_str_radix( s, 16).map_err( |_| OdinImageError::IllegalArgument( format!("invalid hex color spec: {hex_color}")))?;

    let r = (v >> 16) as u8;
    let g = (v >> 8 & 0xff) as u8;
    let b = (v & 0xff) as u8;

    Ok( [r, g, b] )
}

/// single channel intensity image, optionally smoothed to suppress sensor noise
pub fn to_luma8 (img: &DynamicImage, blur_sigma: Option<f32>)->GrayImage8 {
    let luma = img.to_luma8();
    match blur_sigma {
        Some(sigma) if sigma > 0.0 => gaussian_blur_f32( &luma, sigma),
        _ => luma
    }
}
