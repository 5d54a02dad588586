// Kinescope
// Copyright (c) 2025 The Project Kinescope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `filter` module provides the traits and support structures necessary to implement
//! video filters.

use crate::errors::Result;
use crate::frame::FrameRef;

/// Basic information about a filter.
#[derive(Copy, Clone)]
pub struct FilterInfo {
    /// A short ASCII-only string identifying the filter.
    pub short_name: &'static str,
    /// A longer, more descriptive, string identifying the filter.
    pub long_name: &'static str,
}

/// A `FrameSource` produces a sequence of video frames in presentation order.
///
/// Sources are pull-based: the consumer requests one frame at a time, and the only point a
/// source may block is while satisfying that request against its own upstream. A filter
/// wraps an upstream `FrameSource` and implements `FrameSource` itself, so that filter
/// instances chain into a pipeline.
pub trait FrameSource {
    /// Get the next frame in presentation order.
    ///
    /// Returns [`Error::EndOfStream`](crate::errors::Error::EndOfStream) once the source is
    /// exhausted. Every subsequent call returns the same error.
    fn next_frame(&mut self) -> Result<FrameRef>;

    /// Get the number of frames that can be produced without blocking on an upstream
    /// request.
    ///
    /// `flush` indicates the caller has reached end-of-stream and any internally buffered
    /// frames should be counted as producible even if no further input will arrive.
    fn poll_frame(&mut self, flush: bool) -> Result<usize>;
}
