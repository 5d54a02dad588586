// Kinescope
// Copyright (c) 2025 The Project Kinescope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the common error type.

use std::error::Error as StdError;
use std::fmt;
use std::result;

/// `Error` provides an enumeration of all possible errors reported by Kinescope.
#[derive(Debug)]
pub enum Error {
    /// The end of the stream was reached. The source has no more frames to produce.
    EndOfStream,
    /// An error occurred while requesting a frame from the upstream source.
    Upstream(Box<dyn StdError + Send + Sync>),
    /// An unsupported pixel format or filter feature was encountered.
    Unsupported(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::EndOfStream => {
                write!(f, "end of stream")
            }
            Error::Upstream(ref err) => {
                write!(f, "upstream error: {}", err)
            }
            Error::Unsupported(feature) => {
                write!(f, "unsupported feature: {}", feature)
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            Error::Upstream(ref err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Convenience function to create an end-of-stream error.
pub fn end_of_stream_error<T>() -> Result<T> {
    Err(Error::EndOfStream)
}

/// Convenience function to create an unsupported feature error.
pub fn unsupported_error<T>(feature: &'static str) -> Result<T> {
    Err(Error::Unsupported(feature))
}

/// Convenience function to wrap an error raised by an upstream source.
pub fn upstream_error<T, E: StdError + Send + Sync + 'static>(err: E) -> Result<T> {
    Err(Error::Upstream(Box::new(err)))
}
