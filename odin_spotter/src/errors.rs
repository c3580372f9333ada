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

use thiserror::Error;
use odin_common::ron::RonFileError;
use odin_adsb::errors::OdinAdsbError;
use odin_ptz::OdinPtzError;
use odin_image::OdinImageError;

pub type Result<T> = std::result::Result<T,SpotterError>;

#[derive(Error,Debug)]
pub enum SpotterError {

    #[error("config file error {0}")]
    ConfigFileError( #[from] RonFileError),

    #[error("config error {0}")]
    ConfigError(String),

    #[error("ADS-B error {0}")]
    AdsbError( #[from] OdinAdsbError),

    #[error("PTZ error {0}")]
    PtzError( #[from] OdinPtzError),

    #[error("image error {0}")]
    ImageError( #[from] OdinImageError),

    #[error("task join error {0}")]
    JoinError( #[from] tokio::task::JoinError),
}
