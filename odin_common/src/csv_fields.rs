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

//! zero-copy field access for single line comma separated records such as SBS-1 messages.
//! Fields are not quoted or escaped in these formats, empty fields are common and mean "not set"

use std::str::FromStr;
use crate::define_error;

define_error!{ pub CsvFieldError =
    Unparsable(usize,String) : "unparsable field {0}: '{1}'"
}

#[derive(Debug,Clone)]
pub struct CsvLine<'a> {
    line: &'a str,
    fields: Vec<&'a str>
}

impl<'a> CsvLine<'a> {
    pub fn new (line: &'a str)->Self {
        let line = line.trim_end_matches( ['\r','\n']);
        let fields = line.split(',').map( |f| f.trim()).collect();
        CsvLine { line, fields }
    }

    pub fn line (&self)->&'a str { self.line }

    pub fn len (&self)->usize { self.fields.len() }

    pub fn is_empty (&self)->bool { self.line.trim().is_empty() }

    /// the (trimmed) field text or None if it does not exist or is empty
    pub fn str_field (&self, idx: usize)->Option<&'a str> {
        self.fields.get(idx).copied().filter( |f| !f.is_empty())
    }

    /// the parsed field value or None if the field is missing, empty or not parsable
    pub fn field<T: FromStr> (&self, idx: usize)->Option<T> {
        self.str_field(idx).and_then( |f| f.parse::<T>().ok())
    }

    /// distinguishes between missing/empty fields (`Ok(None)`) and fields that are set but cannot be parsed
    pub fn try_field<T: FromStr> (&self, idx: usize)->Result<Option<T>,CsvFieldError> {
        match self.str_field(idx) {
            Some(f) => f.parse::<T>().map( Some).map_err( |_| CsvFieldError::Unparsable( idx, f.to_string())),
            None => Ok(None)
        }
    }
}
