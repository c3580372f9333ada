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

use chrono::{TimeZone,Utc};
use chrono_tz::Tz;
use odin_adsb::{sbs::{parse_sbs_line, SbsMessage}, errors::OdinAdsbError};

const MSG_1: &'static str = "MSG,1,111,11111,AA2BC2,111111,2016/03/11,13:07:16.663,2016/03/11,13:07:16.626,UAL814  ,,,,,,,,,,,0";
const MSG_3: &'static str = "MSG,3,111,11111,a04424,111111,2016/03/11,13:07:05.343,2016/03/11,13:07:05.288,,11025,,,37.17274,-122.03935,,,,,,0\r\n";
const MSG_3_NO_ALT: &'static str = "MSG,3,111,11111,A04424,111111,2016/03/11,13:07:05.343,2016/03/11,13:07:05.288,,,,,37.17274,-122.03935,,,,,,0";
const MSG_3_NO_POS: &'static str = "MSG,3,111,11111,A04424,111111,2016/03/11,13:07:05.343,2016/03/11,13:07:05.288,,11025,,,,,,,,,,0";
const MSG_4: &'static str = "MSG,4,111,11111,AC1FCC,111111,2016/03/11,13:07:07.777,2016/03/11,13:07:07.713,,,316,106,,,1536,,,,,0";
const STA: &'static str = "STA,,5,179,400AE7,10103,2008/11/28,14:58:51.153,2008/11/28,14:58:51.153,RM";

// run with  cargo test --test test_sbs -- --nocapture

fn tz ()->Tz { "America/Los_Angeles".parse().unwrap() }

#[test]
fn test_position () {
    println!("\n--- test_position");
    let msg = parse_sbs_line( MSG_3, &tz()).unwrap();
    println!("{msg}");

    if let SbsMessage::Position(report) = msg {
        assert_eq!( report.icao24().as_str(), "A04424");
        assert_eq!( report.latitude(), 37.17274);
        assert_eq!( report.longitude(), -122.03935);
        assert!( (report.altitude_m() - 3360.42).abs() < 0.01); // 11025ft
        // PST is UTC-8 on that date
        assert_eq!( report.timestamp(), Utc.with_ymd_and_hms( 2016, 3, 11, 21, 7, 5).unwrap() + chrono::TimeDelta::milliseconds(343));
        println!("✅");
    } else {
        panic!("expected position report");
    }
}

#[test]
fn test_partial () {
    println!("\n--- test_partial");
    for line in [MSG_3_NO_ALT, MSG_3_NO_POS] {
        let msg = parse_sbs_line( line, &tz()).unwrap();
        println!("{msg}");
        assert_eq!( msg, SbsMessage::PartialPosition{ icao24: "A04424".into() });
    }
    println!("✅");
}

#[test]
fn test_identification_and_ignored () {
    println!("\n--- test_identification_and_ignored");
    let msg = parse_sbs_line( MSG_1, &tz()).unwrap();
    println!("{msg}");
    assert_eq!( msg, SbsMessage::Identification{ icao24: "AA2BC2".into(), callsign: "UAL814".into() });

    assert_eq!( parse_sbs_line( MSG_4, &tz()).unwrap(), SbsMessage::Ignored);
    assert_eq!( parse_sbs_line( STA, &tz()).unwrap(), SbsMessage::Ignored);
    assert_eq!( parse_sbs_line( "\r\n", &tz()).unwrap(), SbsMessage::Ignored);
    println!("✅");
}

#[test]
fn test_malformed () {
    println!("\n--- test_malformed");
    let lines = [
        "this is not SBS",
        "MSG,3,111,11111,A04424,111111,2016/03/11,13:07:05.343", // truncated
        "MSG,x,111,11111,A04424,111111,2016/03/11,13:07:05.343,2016/03/11,13:07:05.288,,11025,,,37.17274,-122.03935,,,,,,0",
        "MSG,3,111,11111,XYZ,111111,2016/03/11,13:07:05.343,2016/03/11,13:07:05.288,,11025,,,37.17274,-122.03935,,,,,,0",
        "MSG,3,111,11111,A04424,111111,2016/03/11,13:07:05.343,2016/03/11,13:07:05.288,,11025,,,abc,-122.03935,,,,,,0",
        "MSG,3,111,11111,A04424,111111,2016/03/11,13:07:05.343,2016/03/11,13:07:05.288,,11025,,,97.5,-122.03935,,,,,,0",
        "MSG,3,111,11111,A04424,111111,2016-03-11,13:07:05.343,2016/03/11,13:07:05.288,,11025,,,37.17274,-122.03935,,,,,,0",
        "MSG,9,111,11111,A04424,111111,2016/03/11,13:07:05.343,2016/03/11,13:07:05.288,,11025,,,37.17274,-122.03935,,,,,,0",
    ];

    for line in lines {
        let res = parse_sbs_line( line, &tz());
        match &res {
            Err(e) => println!("  {e}"),
            Ok(msg) => println!("  unexpected: {msg}")
        }
        assert!( res.is_err());
    }

    let res = parse_sbs_line( lines[5], &tz());
    assert!( matches!( res, Err(OdinAdsbError::InvalidReport(_))));
    println!("✅");
}
