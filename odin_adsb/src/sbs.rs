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

use std::{fmt, sync::Arc};
use chrono::{DateTime, Utc, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use odin_common::csv_fields::CsvLine;
use crate::{PositionReport, errors::{Result, OdinAdsbError, parse_error}};

/// number of fields in a (dump1090 generated) SBS MSG record
pub const SBS_MSG_FIELDS: usize = 22;

/// the classification of a single SBS input line
#[derive(Debug,Clone,PartialEq)]
pub enum SbsMessage {
    /// airborne position with lat, lon and altitude (MSG,3)
    Position(PositionReport),
    /// airborne position message lacking position or altitude. These are discarded
    PartialPosition { icao24: String },
    /// callsign (MSG,1)
    Identification { icao24: String, callsign: String },
    /// valid record we don't process (other MSG types, SEL/ID/AIR/STA/CLK records, empty lines)
    Ignored
}

impl fmt::Display for SbsMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SbsMessage::Position(report) => write!(f, "{report}"),
            SbsMessage::PartialPosition{icao24} => write!(f, "PartialPosition( icao24: {icao24})"),
            SbsMessage::Identification{icao24,callsign} => write!(f, "Identification( icao24: {icao24}, callsign: \"{callsign}\")"),
            SbsMessage::Ignored => write!(f, "Ignored")
        }
    }
}

/// SBS as documented on http://woodair.net/SBS/Article/Barebones42_Socket_Data.htm
///
/// Message examples:
///  MSG,1,111,11111,AA2BC2,111111,2016/03/11,13:07:16.663,2016/03/11,13:07:16.626,UAL814  ,,,,,,,,,,,0
///  MSG,3,111,11111,A04424,111111,2016/03/11,13:07:05.343,2016/03/11,13:07:05.288,,11025,,,37.17274,-122.03935,,,,,,0
///  MSG,4,111,11111,AC1FCC,111111,2016/03/11,13:07:07.777,2016/03/11,13:07:07.713,,,316,106,,,1536,,,,,0
///
/// fields:
///   0: message type (MSG, SEL, ID, AIR, STA, CLK)
///   1: transmission type (MSG only: 1-8, 3: ES Airborne Position Message)
///   2: DB session id   - '111' for dump1090 generated SBS
///   3: DB aircraft id  - '11111' for dump1090 generated SBS
///   4: ICAO 24 bit id (mode S transponder code)
///   5: DB flight id - '111111' for dump1090 generated SBS
///   6: date generated
///   7: time generated
///   8: date logged
///   9: time logged
///  10: callsign
///  11: mode-C altitude in ft (relative to 1013.2mb (Flight Level), *not* AMSL)
///  12: ground speed
///  13: track (from vx,vy, *not* heading)
///  14: latitude
///  15: longitude
///  16: vertical rate (ft/min - 64ft resolution)
///  17: squawk (mode-A squawk code)
///  18: alert (flag indicating squawk has changed)
///  19: emergency (flag)
///  20: spi (flag, transponder ident activated)
///  21: on ground (flag)
///
/// lines that are not valid SBS records are returned as `OdinAdsbError::ParseError` (or a more specific
/// conversion error), which callers are supposed to log and skip
pub fn parse_sbs_line (line: &str, source_tz: &Tz)->Result<SbsMessage> {
    let csv = CsvLine::new(line);
    if csv.is_empty() { return Ok( SbsMessage::Ignored ) }

    match csv.str_field(0) {
        Some("MSG") => parse_msg( &csv, source_tz),
        Some("SEL" | "ID" | "AIR" | "STA" | "CLK") => Ok( SbsMessage::Ignored ),
        _ => Err( parse_error!( "not a SBS record: {}", csv.line()) )
    }
}

fn parse_msg (csv: &CsvLine, source_tz: &Tz)->Result<SbsMessage> {
    if csv.len() < SBS_MSG_FIELDS {
        return Err( parse_error!( "truncated SBS message ({} fields): {}", csv.len(), csv.line()))
    }

    let msg_type: u32 = csv.field(1).ok_or_else( || parse_error!( "invalid transmission type: {}", csv.line()))?;
    let icao24 = csv.str_field(4).ok_or_else( || parse_error!( "missing icao24: {}", csv.line()))?;
    if icao24.len() != 6 || !icao24.bytes().all( |b| b.is_ascii_hexdigit()) {
        return Err( parse_error!( "invalid icao24 '{}'", icao24))
    }
    let icao24 = icao24.to_ascii_uppercase();

    match msg_type {
        1 => parse_aircraft_identification( csv, icao24),
        3 => parse_airborne_position( csv, icao24, source_tz),
        2 | 4..=8 => Ok( SbsMessage::Ignored ),
        _ => Err( parse_error!( "unknown transmission type {}: {}", msg_type, csv.line()))
    }
}

fn parse_aircraft_identification (csv: &CsvLine, icao24: String)->Result<SbsMessage> {
    if let Some(callsign) = csv.str_field(10) {
        Ok( SbsMessage::Identification{ icao24, callsign: callsign.to_string() } )
    } else {
        Ok( SbsMessage::Ignored )
    }
}

fn parse_airborne_position (csv: &CsvLine, icao24: String, source_tz: &Tz)->Result<SbsMessage> {
    // set-but-garbled fields are errors, empty ones just make this a partial position
    let altitude = csv.try_field::<f64>(11)?;
    let latitude = csv.try_field::<f64>(14)?;
    let longitude = csv.try_field::<f64>(15)?;

    if let (Some(altitude), Some(latitude), Some(longitude)) = (altitude,latitude,longitude) {
        let date = csv.str_field(6).ok_or_else( || parse_error!( "missing date: {}", csv.line()))?;
        let time = csv.str_field(7).ok_or_else( || parse_error!( "missing time: {}", csv.line()))?;
        let timestamp = get_utc_datetime( date, time, source_tz)?;

        let report = PositionReport::from_feet( Arc::new(icao24), latitude, longitude, altitude, timestamp)?;
        Ok( SbsMessage::Position(report) )

    } else {
        Ok( SbsMessage::PartialPosition{ icao24 } )
    }
}

// note that dump1090 does report time in local timezone, i.e. we have to convert to UTC
pub fn get_utc_datetime (date: &str, time: &str, tz: &Tz)->Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str( date, "%Y/%m/%d")?;
    let time = NaiveTime::parse_from_str( time, "%H:%M:%S%.3f")?;

    let dt = match tz.from_local_datetime( &date.and_time(time)) {
        chrono::offset::LocalResult::Single(dt) => dt,
        chrono::offset::LocalResult::Ambiguous(dt1, dt2) => dt2, // we don't care about that precision
        chrono::offset::LocalResult::None => return Err( OdinAdsbError::OpFailedError("forward time jump cannot be mapped to UTC".into())),
    };
    Ok( dt.with_timezone( &Utc) )
}
