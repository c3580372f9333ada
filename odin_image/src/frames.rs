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

//! frame acquisition and delivery capabilities of the video loop, with simple image directory based
//! implementations. Both are blocking and are supposed to run on a blocking thread

use std::{fs, path::{Path,PathBuf}};
use image::{DynamicImage, RgbImage};
use tracing::{debug,info};

use crate::{motion::MotionRegion, errors::{OdinImageError,Result}};

pub const IMAGE_EXTENSIONS: [&str;5] = ["png", "jpg", "jpeg", "bmp", "tif"];

pub trait FrameSource: Send {
    /// the next frame, or `None` if the source is exhausted
    fn next_frame (&mut self)->Result<Option<DynamicImage>>;
}

pub trait FrameSink: Send {
    fn deliver (&mut self, frame: &RgbImage, regions: &[MotionRegion])->Result<()>;
}

impl<T> FrameSink for &mut T where T: FrameSink + ?Sized {
    fn deliver (&mut self, frame: &RgbImage, regions: &[MotionRegion])->Result<()> {
        (**self).deliver( frame, regions)
    }
}

fn is_image_file (path: &Path)->bool {
    path.is_file() && path.extension()
        .and_then( |e| e.to_str())
        .map( |e| IMAGE_EXTENSIONS.contains( &e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// replays the (lexically sorted) image files of a directory
pub struct ImageDirSource {
    files: Vec<PathBuf>,
    next: usize,
    looping: bool
}

impl ImageDirSource {
    pub fn open<P> (dir: P, looping: bool)->Result<Self> where P: AsRef<Path> {
        let dir = dir.as_ref();
        let mut files: Vec<PathBuf> = fs::read_dir( dir)?
            .filter_map( |e| e.ok().map( |e| e.path()))
            .filter( |p| is_image_file(p))
            .collect();

        if files.is_empty() {
            return Err( OdinImageError::NotFoundError( format!("no image files in {:?}", dir)))
        }
        files.sort();
        info!("opened frame source {:?} with {} images", dir, files.len());

        Ok( ImageDirSource { files, next: 0, looping } )
    }

    pub fn len (&self)->usize { self.files.len() }
}

impl FrameSource for ImageDirSource {
    fn next_frame (&mut self)->Result<Option<DynamicImage>> {
        if self.next >= self.files.len() {
            if self.looping { self.next = 0 } else { return Ok(None) }
        }

        let path = &self.files[self.next];
        self.next += 1;
        Ok( Some( image::open( path)?) )
    }
}

/// writes every n-th delivered frame as PNG into a directory
pub struct ImageDirSink {
    dir: PathBuf,
    every_nth: u64,
    n_delivered: u64,
    n_written: u64
}

impl ImageDirSink {
    pub fn create<P> (dir: P, every_nth: u64)->Result<Self> where P: AsRef<Path> {
        if every_nth == 0 {
            return Err( OdinImageError::IllegalArgument("every_nth has to be > 0".into()))
        }
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all( &dir)?;
        Ok( ImageDirSink { dir, every_nth, n_delivered: 0, n_written: 0 } )
    }

    pub fn n_written (&self)->u64 { self.n_written }
}

impl FrameSink for ImageDirSink {
    fn deliver (&mut self, frame: &RgbImage, regions: &[MotionRegion])->Result<()> {
        let i = self.n_delivered;
        self.n_delivered += 1;

        if i % self.every_nth == 0 {
            let path = self.dir.join( format!("frame_{i:06}.png"));
            frame.save( &path)?;
            self.n_written += 1;
            debug!("saved {:?} with {} motion regions", path, regions.len());
        }
        Ok(())
    }
}
