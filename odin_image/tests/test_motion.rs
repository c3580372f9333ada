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

use std::{fs, path::PathBuf};
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use odin_image::{
    OdinImageError,
    frames::{FrameSink, FrameSource, ImageDirSink, ImageDirSource},
    motion::{detect_motion, diff_mask, find_regions, search_rect, MotionConfig, MotionHighlighter, MotionRegion},
    overlay::{draw_label, load_font, FrameLabel}
};

// run with  cargo test --test test_motion -- --nocapture

const W: u32 = 64;
const H: u32 = 48;

fn background (luma: u8)->DynamicImage {
    DynamicImage::ImageLuma8( GrayImage::from_pixel( W, H, Luma([luma])))
}

fn with_patch (bg: u8, x0: u32, y0: u32, size: u32, luma: u8)->DynamicImage {
    let mut img = GrayImage::from_pixel( W, H, Luma([bg]));
    for y in y0..y0+size {
        for x in x0..x0+size {
            img.put_pixel( x, y, Luma([luma]));
        }
    }
    DynamicImage::ImageLuma8(img)
}

#[test]
fn test_identical_frames () {
    println!("\n--- test_identical_frames");
    let regions = detect_motion( &background(50), &background(50), &MotionConfig::default()).unwrap();
    assert!( regions.is_empty());
    println!("✅");
}

#[test]
fn test_single_patch () {
    println!("\n--- test_single_patch");
    let regions = detect_motion( &background(50), &with_patch( 50, 20, 30, 5, 200), &MotionConfig::default()).unwrap();
    for r in &regions { println!("  {r}") }

    assert_eq!( regions.len(), 1);
    let r = &regions[0];
    assert_eq!( (r.x, r.y, r.width, r.height, r.area), (20, 30, 5, 5, 25));
    assert_eq!( r.centroid, (22.0, 32.0));
    assert!( r.contains( 22, 32));
    assert!( !r.contains( 25, 32));
    println!("✅");
}

#[test]
fn test_region_filter_and_order () {
    println!("\n--- test_region_filter_and_order");
    let mut cur = GrayImage::from_pixel( W, H, Luma([50u8]));
    cur.put_pixel( 5, 5, Luma([255]));  // single pixel noise
    for y in 10..12 { for x in 40..42 { cur.put_pixel( x, y, Luma([10])) } } // 2x2 darker
    for y in 30..34 { for x in 10..14 { cur.put_pixel( x, y, Luma([200])) } } // 4x4 brighter
    cur.put_pixel( 14, 34, Luma([200])); // diagonal neighbor is still connected

    let (mask, changed) = diff_mask( &GrayImage::from_pixel( W, H, Luma([50u8])), &cur, 25).unwrap();
    assert_eq!( changed, 1 + 4 + 17);

    let regions = find_regions( &mask, 4);
    for r in &regions { println!("  {r}") }
    assert_eq!( regions.len(), 2);
    assert_eq!( regions[0].area, 17);
    assert_eq!( (regions[0].width, regions[0].height), (5, 5));
    assert_eq!( regions[1].area, 4);
    assert_eq!( (regions[1].x, regions[1].y), (40, 10));
    println!("✅");
}

#[test]
fn test_dimension_mismatch () {
    println!("\n--- test_dimension_mismatch");
    let small = DynamicImage::ImageLuma8( GrayImage::from_pixel( W/2, H/2, Luma([50u8])));
    let res = detect_motion( &background(50), &small, &MotionConfig::default());
    assert!( matches!( res, Err(OdinImageError::InvalidDimensions(_))));

    let mut hl = MotionHighlighter::new( MotionConfig::default()).unwrap();
    hl.process( &background(50)).unwrap();
    assert!( hl.process( &small).is_err());

    // reference is unchanged
    let hf = hl.process( &with_patch( 50, 20, 30, 5, 200)).unwrap();
    assert_eq!( hf.regions.len(), 1);
    println!("✅");
}

#[test]
fn test_resolution_change () {
    println!("\n--- test_resolution_change");
    let large = |patch: bool| {
        let mut img = GrayImage::from_pixel( W*2, H*2, Luma([50u8]));
        if patch { for y in 60..64 { for x in 100..104 { img.put_pixel( x, y, Luma([200])) } } }
        DynamicImage::ImageLuma8(img)
    };

    let mut hl = MotionHighlighter::new( MotionConfig::default()).unwrap(); // max_size_mismatches: 3
    hl.process( &background(50)).unwrap();

    let mut n_errors = 0;
    for _ in 0..100 {
        if hl.process( &large(false)).is_err() { n_errors += 1 }
    }
    println!("  errors after resolution change: {n_errors}/100");
    assert_eq!( n_errors, 2);

    // motion is detected again at the new resolution
    let hf = hl.process( &large(true)).unwrap();
    assert_eq!( hf.regions.len(), 1);
    assert_eq!( (hf.regions[0].x, hf.regions[0].y), (100, 60));

    // isolated odd frames do not add up
    let mut hl = MotionHighlighter::new( MotionConfig::default()).unwrap();
    hl.process( &background(50)).unwrap();
    for _ in 0..5 {
        assert!( hl.process( &large(false)).is_err());
        assert!( hl.process( &background(50)).is_ok());
    }
    println!("✅");
}

#[test]
fn test_search_region () {
    println!("\n--- test_search_region");
    let rect = search_rect( W, H, 0.33);
    println!("  search rect: {:?}", rect);
    assert_eq!( (rect.left(), rect.top(), rect.width(), rect.height()), (21, 16, 21, 15));
    let full = search_rect( W, H, 1.0);
    assert_eq!( (full.left(), full.top(), full.width(), full.height()), (0, 0, W, H));

    let config = MotionConfig { search_region: Some(0.33), ..MotionConfig::default() };
    let outside = with_patch( 50, 2, 2, 4, 200);
    let inside = with_patch( 50, 30, 22, 4, 200);

    assert_eq!( detect_motion( &background(50), &outside, &MotionConfig::default()).unwrap().len(), 1);
    assert!( detect_motion( &background(50), &outside, &config).unwrap().is_empty());
    assert_eq!( detect_motion( &background(50), &inside, &config).unwrap().len(), 1);

    let mut hl = MotionHighlighter::new( MotionConfig { marker_color: "00ff00".into(), ..config }).unwrap();
    hl.process( &background(50)).unwrap();
    let hf = hl.process( &outside).unwrap();
    assert!( hf.regions.is_empty());
    assert_eq!( hf.image.get_pixel( 21, 16), &Rgb([0,255,0])); // search area outline
    assert_eq!( hf.image.get_pixel( 3, 3), &Rgb([200,200,200])); // unmarked motion outside
    println!("✅");
}

#[test]
fn test_frame_label () {
    println!("\n--- test_frame_label");
    assert!( load_font( "/no/such/font.ttf").is_err());

    let font_path = "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf";
    let Ok(font) = load_font( font_path) else {
        println!("  no font {font_path}, skipping");
        return
    };

    let mut img = RgbImage::from_pixel( 320, 120, Rgb([0,0,0]));
    assert!( draw_label( &mut img, &font, &FrameLabel::default(), Rgb([255,255,255]), 12.0).is_none());

    let label = FrameLabel::new("UAL814").with_line("37.500, -122.000 @ 3000m (dist: 12345m)");
    let bbox = draw_label( &mut img, &font, &label, Rgb([255,255,255]), 12.0).unwrap();
    println!("  label box: {:?}", bbox);
    assert_eq!( (bbox.left(), bbox.top()), (10, 10));
    assert!( bbox.height() >= 36); // double size title plus one line

    let lit: Vec<(u32,u32)> = img.enumerate_pixels().filter( |(_,_,p)| p.0 != [0,0,0]).map( |(x,y,_)| (x,y)).collect();
    assert!( !lit.is_empty());
    assert!( lit.iter().all( |(x,y)| *x < 320 && *y < bbox.bottom() as u32 + 4));
    println!("✅");
}

#[test]
fn test_highlighter_marks_region () {
    println!("\n--- test_highlighter_marks_region");
    let config = MotionConfig { marker_color: "00ff00".into(), ..MotionConfig::default() };
    let mut hl = MotionHighlighter::new( config).unwrap();

    let hf = hl.process( &background(50)).unwrap();
    assert!( hf.reference_refreshed);
    assert!( hf.regions.is_empty());

    let hf = hl.process( &with_patch( 50, 20, 30, 5, 200)).unwrap();
    assert!( !hf.reference_refreshed);
    let r = hf.largest_region().unwrap();
    println!("  {r}");

    assert_eq!( (hf.image.width(), hf.image.height()), (W, H));
    assert_eq!( hf.image.get_pixel( 20, 30), &Rgb([0,255,0])); // box corner
    assert_eq!( hf.image.get_pixel( 22, 32), &Rgb([0,255,0])); // crosshair center
    assert_eq!( hf.image.get_pixel( 60, 5), &Rgb([50,50,50]));  // untouched background
    println!("✅");
}

#[test]
fn test_reference_refresh () {
    println!("\n--- test_reference_refresh");
    let config = MotionConfig { refresh_interval: 2, max_deferred_refreshes: 3, ..MotionConfig::default() };
    let mut hl = MotionHighlighter::new( config).unwrap();
    hl.process( &background(50)).unwrap();

    // slow lighting change below threshold is adopted at the next refresh
    assert!( !hl.process( &background(60)).unwrap().reference_refreshed);
    assert!( hl.process( &background(60)).unwrap().reference_refreshed);

    // an abrupt scene change is not adopted right away..
    let mut refreshed_at = None;
    for i in 1..=8 {
        let hf = hl.process( &background(160)).unwrap();
        if i < 8 { assert_eq!( hf.regions.len(), 1, "frame {i}") }
        if hf.reference_refreshed { refreshed_at = Some(i); break }
    }
    // ..but after 3 deferred attempts (every 2nd frame) it is forced
    assert_eq!( refreshed_at, Some(8));
    assert!( hl.process( &background(160)).unwrap().regions.is_empty());
    println!("✅");
}

#[test]
fn test_reset_reference () {
    println!("\n--- test_reset_reference");
    let mut hl = MotionHighlighter::new( MotionConfig::default()).unwrap();
    hl.process( &background(50)).unwrap();
    assert_eq!( hl.process( &background(150)).unwrap().regions.len(), 1);

    hl.reset_reference();
    assert!( !hl.has_reference());
    let hf = hl.process( &background(150)).unwrap();
    assert!( hf.reference_refreshed && hf.regions.is_empty());
    assert!( hl.process( &background(150)).unwrap().regions.is_empty());
    println!("✅");
}

#[test]
fn test_blur_suppresses_noise () {
    println!("\n--- test_blur_suppresses_noise");
    let mut cur = GrayImage::from_pixel( W, H, Luma([50u8]));
    for (x,y) in [(5,5),(6,5),(5,6),(6,6)] { cur.put_pixel( x, y, Luma([90])) } // weak 2x2 speckle
    let cur = DynamicImage::ImageLuma8(cur);

    let config = MotionConfig::default();
    assert_eq!( detect_motion( &background(50), &cur, &config).unwrap().len(), 1);

    let config = MotionConfig { blur_sigma: Some(2.0), ..MotionConfig::default() };
    assert!( detect_motion( &background(50), &cur, &config).unwrap().is_empty());
    println!("✅");
}

#[test]
fn test_motion_config () {
    println!("\n--- test_motion_config");
    let config: MotionConfig = ron::from_str( r##"(
        diff_threshold: 40,
        blur_sigma: Some(1.5),
        marker_color: "#ffcc00",
    )"##).unwrap();
    assert_eq!( config.diff_threshold, 40);
    assert_eq!( config.min_region_area, 4);
    assert!( config.check().is_ok());

    assert!( MotionConfig { marker_color: "red".into(), ..MotionConfig::default() }.check().is_err());
    assert!( MotionConfig { refresh_interval: 0, ..MotionConfig::default() }.check().is_err());
    assert!( MotionConfig { max_size_mismatches: 0, ..MotionConfig::default() }.check().is_err());
    assert!( MotionConfig { search_region: Some(1.5), ..MotionConfig::default() }.check().is_err());
    assert!( MotionConfig { search_region: Some(0.33), ..MotionConfig::default() }.check().is_ok());
    assert!( MotionHighlighter::new( MotionConfig { blur_sigma: Some(0.0), ..MotionConfig::default() }).is_err());
    println!("✅");
}

#[test]
fn test_image_dir_source_and_sink () {
    println!("\n--- test_image_dir_source_and_sink");
    let base = std::env::temp_dir().join( format!("odin_image_frames_{}", std::process::id()));
    let in_dir = base.join("in");
    let out_dir = base.join("out");
    fs::create_dir_all( &in_dir).unwrap();

    for (i,luma) in [50u8, 60, 70].iter().enumerate() {
        background(*luma).save( in_dir.join( format!("f{i}.png"))).unwrap();
    }
    fs::write( in_dir.join("notes.txt"), "not a frame").unwrap();

    let mut source = ImageDirSource::open( &in_dir, false).unwrap();
    assert_eq!( source.len(), 3);
    let mut sink = ImageDirSink::create( &out_dir, 2).unwrap();

    let mut lumas = Vec::new();
    while let Some(frame) = source.next_frame().unwrap() {
        let rgb = frame.to_rgb8();
        lumas.push( rgb.get_pixel(0,0).0[0]);
        sink.deliver( &rgb, &[]).unwrap();
    }
    assert_eq!( lumas, vec![50, 60, 70]);
    assert_eq!( sink.n_written(), 2);
    assert!( out_dir.join("frame_000000.png").is_file());
    assert!( out_dir.join("frame_000002.png").is_file());

    let mut looping = ImageDirSource::open( &in_dir, true).unwrap();
    for _ in 0..4 { assert!( looping.next_frame().unwrap().is_some()) }

    assert!( ImageDirSource::open( &out_dir.join("missing"), false).is_err());
    fs::remove_dir_all( &base).unwrap();
    println!("✅");
}
