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

/// syntactic sugar for thiserror based error enums. Variants are listed with their (optional)
/// field attributes and the display literal:
/// ```ignore
/// define_error!{ pub OdinPtzError =
///   IOError( #[from] std::io::Error ) : "IO error: {0}",
///   Timeout(String) : "command timed out: {0}"
/// }
/// ```
/// will get expanded into
/// ```ignore
/// use thiserror;
/// #[derive(thiserror::Error,Debug)]
/// pub enum OdinPtzError {
///     #[error("IO error: {0}")]
///     IOError(#[from] std::io::Error),
///
///     #[error("command timed out: {0}")]
///     Timeout(String),
/// }
/// ```
/// Note that the expansion imports `thiserror`, i.e. the using crate has to depend on it
#[macro_export]
macro_rules! define_error {
    ($vis:vis $name:ident = $( $err_variant:ident ( $( $( #[$meta:meta] )? $field_type:ty),* ) : $msg_lit:literal ),* $(,)?) => {
        use thiserror;
        #[derive(thiserror::Error,Debug)]
        $vis enum $name {
            $(
                #[error($msg_lit)]
                $err_variant ( $( $(#[$meta])? $field_type ),*  )
            ),*
        }
    }
}

/// map a foreign error type to a String carrying variant of our own error enums. Use this
/// for errors we only report and never have to match on
#[macro_export]
macro_rules! map_to_opaque_error {
    ($from_error:ty => $to_error:ident :: $variant:ident) => {
        impl From<$from_error> for $to_error {
            fn from (e: $from_error)->Self { $to_error :: $variant ( e.to_string()) }
        }
    };
}
