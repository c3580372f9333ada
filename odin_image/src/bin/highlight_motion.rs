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

use anyhow::Result;
use clap::Parser;
use odin_image::{
    frames::{FrameSink, FrameSource, ImageDirSink, ImageDirSource},
    motion::{MotionConfig, MotionHighlighter}
};

/// offline motion highlighting of an image sequence
#[derive(Parser,Debug)]
#[command(about="highlight moving objects in a directory of frames")]
struct CliOpts {
    /// min absolute luma difference of changed pixels
    #[arg(long, default_value_t=25)]
    threshold: u8,

    /// min number of pixels of a motion region
    #[arg(long, default_value_t=4)]
    min_area: u32,

    /// optional gaussian blur sigma applied before differencing
    #[arg(long)]
    blur: Option<f32>,

    /// only detect motion in the centered fraction of the frame (e.g. 0.33)
    #[arg(long)]
    search: Option<f32>,

    /// directory with input frames (processed in lexical order)
    input_dir: String,

    /// directory to store annotated frames
    output_dir: String,
}

fn main()->Result<()> {
    let args = CliOpts::parse();
    let config = MotionConfig { diff_threshold: args.threshold, min_region_area: args.min_area, blur_sigma: args.blur, search_region: args.search, ..MotionConfig::default() };

    let mut source = ImageDirSource::open( &args.input_dir, false)?;
    let mut sink = ImageDirSink::create( &args.output_dir, 1)?;
    let mut highlighter = MotionHighlighter::new( config)?;

    while let Some(frame) = source.next_frame()? {
        let hf = highlighter.process( &frame)?;
        match hf.largest_region() {
            Some(r) => println!("{:5}: {} regions, largest {}", highlighter.n_frames(), hf.regions.len(), r),
            None => println!("{:5}: no motion", highlighter.n_frames())
        }
        sink.deliver( &hf.image, &hf.regions)?;
    }
    Ok(())
}
