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

/// module with utility functions for RON based config files

use std::{fs, path::Path};
use ron::ser::PrettyConfig;
use serde::{Serialize,de::DeserializeOwned};
use crate::define_error;

define_error!{ pub RonFileError =
    IOError(#[from] std::io::Error) : "IO error: {0}",
    ParseError(#[from] ron::error::SpannedError) : "RON parse error: {0}",
    SerializeError(#[from] ron::Error) : "RON serialization error: {0}"
}

/// read and deserialize a RON file
pub fn load_ron_file<T,P> (path: P)->Result<T,RonFileError> where T: DeserializeOwned, P: AsRef<Path> {
    let input = fs::read_to_string( path.as_ref())?;
    Ok( ron::from_str( &input)? )
}

pub fn to_pretty_ron<T> (v: &T)->Result<String,RonFileError> where T: Serialize {
    Ok( ron::ser::to_string_pretty( v, PrettyConfig::new().struct_names(true))? )
}
