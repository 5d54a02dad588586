// Kinescope
// Copyright (c) 2025 The Project Kinescope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]
// The following lints are allowed in all Kinescope crates. Please see the workspace
// manifest for their justification.
#![allow(clippy::comparison_chain)]
#![allow(clippy::identity_op)]
#![allow(clippy::manual_range_contains)]

//! YADIF ("yet another deinterlacing filter"), a motion-adaptive video deinterlacer.
//!
//! An interlaced frame carries two temporally distinct fields on its even and odd lines.
//! For every input frame the filter rebuilds the lines of one field from spatial neighbors
//! in the same frame and temporal neighbors in the adjacent frames, producing one
//! progressive frame per frame, or one per field when field-rate output is selected.

use std::collections::VecDeque;
use std::sync::Arc;

use log::{debug, info};

use kinescope_core::errors::{end_of_stream_error, unsupported_error, Error, Result};
use kinescope_core::filter::{FilterInfo, FrameSource};
use kinescope_core::frame::{FrameFlags, FrameRef, VideoFrame, VideoSpec};
use kinescope_core::pixel::PixelFormat;

mod deint;
mod line;

use line::FilterLine;

fn is_supported_pixel_format(format: PixelFormat) -> bool {
    matches!(
        format,
        PixelFormat::Yuv420p
            | PixelFormat::Yuv422p
            | PixelFormat::Yuv444p
            | PixelFormat::Yuv410p
            | PixelFormat::Yuv411p
            | PixelFormat::Yuv440p
            | PixelFormat::Yuvj420p
            | PixelFormat::Yuvj422p
            | PixelFormat::Yuvj444p
            | PixelFormat::Yuvj440p
            | PixelFormat::Gray8
            | PixelFormat::Gray16
            | PixelFormat::Yuv420p16
            | PixelFormat::Yuv422p16
            | PixelFormat::Yuv444p16
    )
}

/// Options for the yadif filter.
///
/// The option string form is `mode:parity:auto_enable`, with fields optional from the
/// right. Out-of-range values are passed through unvalidated.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct YadifOptions {
    /// 0: output one frame for each frame; 1: output one frame for each field; 2: like 0
    /// but skip the spatial interlacing check; 3: like 1 but skip the spatial interlacing
    /// check.
    pub mode: i32,
    /// 0: assume bottom field first; 1: assume top field first; -1: detect the field
    /// order from the frame flags.
    pub parity: i32,
    /// 0: deinterlace all frames; 1: only deinterlace frames flagged as interlaced and
    /// pass the rest through untouched.
    pub auto_enable: i32,
}

impl Default for YadifOptions {
    fn default() -> Self {
        YadifOptions { mode: 0, parity: -1, auto_enable: 0 }
    }
}

impl YadifOptions {
    /// Parse a `mode:parity:auto_enable` option string.
    ///
    /// A field that does not parse as an integer ends the scan; it and all later fields
    /// keep their defaults.
    pub fn parse(args: &str) -> YadifOptions {
        let mut opts = YadifOptions::default();

        let mut fields = args.split(':').map(|field| field.trim().parse::<i32>());

        match fields.next() {
            Some(Ok(mode)) => opts.mode = mode,
            _ => return opts,
        }
        match fields.next() {
            Some(Ok(parity)) => opts.parity = parity,
            _ => return opts,
        }
        if let Some(Ok(auto_enable)) = fields.next() {
            opts.auto_enable = auto_enable;
        }

        opts
    }
}

/// Motion-adaptive deinterlacing filter.
///
/// The filter keeps a three-frame sliding window over its upstream source and therefore
/// has one frame of latency: the first pull after construction consumes two input frames.
/// At end-of-stream the trailing window frame is drained before
/// [`EndOfStream`](Error::EndOfStream) is reported. In field-rate modes the two outputs of
/// a window are always emitted back to back, before any frame of the following window.
pub struct YadifFilter<S: FrameSource> {
    source: S,
    opts: YadifOptions,
    spec: VideoSpec,
    filter_line: FilterLine,

    prev: Option<FrameRef>,
    cur: Option<FrameRef>,
    next: Option<FrameRef>,

    frame_pending: bool,
    flush: bool,
    queued: VecDeque<FrameRef>,
}

impl<S: FrameSource> YadifFilter<S> {
    /// Basic information about this filter.
    pub fn info() -> FilterInfo {
        FilterInfo { short_name: "yadif", long_name: "Deinterlace the input image" }
    }

    /// Create a yadif filter over `source`, whose frames must match `spec`.
    ///
    /// The sample width of the line filter is fixed here from the pixel format. Returns
    /// [`Unsupported`](Error::Unsupported) for pixel formats the filter cannot process.
    pub fn try_new(source: S, spec: VideoSpec, opts: &YadifOptions) -> Result<Self> {
        if !is_supported_pixel_format(spec.format()) {
            return unsupported_error("yadif: unsupported pixel format");
        }

        let filter_line = line::select_filter_line(spec.format().sample_format());
        debug!("selected {:?} line filter for {}", spec.format().sample_format(), spec.format());

        info!("mode:{} parity:{} auto_enable:{}", opts.mode, opts.parity, opts.auto_enable);

        Ok(YadifFilter {
            source,
            opts: *opts,
            spec,
            filter_line,
            prev: None,
            cur: None,
            next: None,
            frame_pending: false,
            flush: false,
            queued: VecDeque::new(),
        })
    }

    /// Get the options the filter was created with.
    pub fn options(&self) -> &YadifOptions {
        &self.opts
    }

    /// Resolve the field order of the current window.
    fn tff(&self) -> i32 {
        let cur = self.cur.as_ref().unwrap();

        if self.opts.parity == -1 {
            if cur.is_interlaced() {
                i32::from(cur.is_top_field_first())
            }
            else {
                1
            }
        }
        else {
            self.opts.parity ^ 1
        }
    }

    /// Produce one output frame from the current window and queue it for emission.
    ///
    /// `is_second` marks the second output of a field-rate pair, which reconstructs the
    /// opposite field and carries an interpolated timestamp.
    fn produce(&mut self, is_second: bool) {
        let cur = self.cur.clone().unwrap();
        let tff = self.tff();

        let mut out = VideoFrame::new(self.spec);
        if !is_second {
            out.copy_props_from(&cur);
            out.flags.remove(FrameFlags::INTERLACED);
        }

        {
            let prev = self.prev.as_deref().unwrap_or(&cur);
            let next = self.next.as_deref().unwrap_or(&cur);
            deint::filter_frame(
                &mut out,
                prev,
                &cur,
                next,
                tff ^ i32::from(!is_second),
                tff,
                self.opts.mode,
                self.filter_line,
            );
        }

        if is_second {
            // The second field sits halfway between this frame and the next. The bitwise
            // average keeps the midpoint exact without overflowing.
            out.pts = None;
            if let Some(cur_pts) = cur.pts {
                if let Some(next_pts) = self.next.as_ref().and_then(|frame| frame.pts) {
                    out.pts = Some((next_pts & cur_pts) + ((next_pts ^ cur_pts) >> 1));
                }
                else if let Some(prev_pts) = self.prev.as_ref().and_then(|frame| frame.pts) {
                    out.pts = Some(
                        cur_pts - prev_pts + (cur_pts & prev_pts) + ((cur_pts ^ prev_pts) >> 1),
                    );
                }
            }
        }

        self.queued.push_back(Arc::new(out));
        self.frame_pending = (self.opts.mode & 1) != 0 && !is_second;
    }

    /// Shift the window by one input frame, or by nothing at end-of-stream, and produce
    /// whatever output the new window owes.
    fn advance(&mut self, frame: Option<FrameRef>) {
        debug_assert!(!self.frame_pending, "advanced with a second field output pending");

        self.prev = self.cur.take();
        self.cur = self.next.take();
        self.next = frame;

        let Some(cur) = self.cur.clone() else {
            // Startup: the window is not primed yet, so this input produces nothing.
            return;
        };

        if self.opts.auto_enable != 0 && !cur.is_interlaced() {
            // Progressive input passes through as a shared reference to the input frame.
            self.queued.push_back(cur);
            self.prev = None;
            return;
        }

        self.produce(false);
    }
}

impl<S: FrameSource> FrameSource for YadifFilter<S> {
    fn next_frame(&mut self) -> Result<FrameRef> {
        loop {
            if let Some(frame) = self.queued.pop_front() {
                return Ok(frame);
            }

            if self.frame_pending {
                self.produce(true);
                continue;
            }

            if self.flush {
                if self.next.is_none() {
                    return end_of_stream_error();
                }
                self.advance(None);
                continue;
            }

            match self.source.next_frame() {
                Ok(frame) => self.advance(Some(frame)),
                Err(Error::EndOfStream) => {
                    debug!("upstream exhausted, draining the window");
                    self.flush = true;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn poll_frame(&mut self, flush: bool) -> Result<usize> {
        if self.frame_pending {
            return Ok(1);
        }
        if !self.queued.is_empty() {
            return Ok(self.queued.len());
        }

        let mut val = self.source.poll_frame(flush)?;

        if val == 1 && self.next.is_none() {
            // Upstream has exactly one frame ready but the window head is empty; take the
            // frame now so the answer accounts for the primed window.
            let frame = self.source.next_frame()?;
            self.advance(Some(frame));

            val = self.source.poll_frame(flush)?;
            debug_assert!(self.next.is_some());
        }

        if val == 0 && flush && self.next.is_some() {
            self.flush = true;
            return Ok(1);
        }

        debug_assert!(self.next.is_some() || val == 0);

        if self.opts.auto_enable != 0 {
            if let Some(next) = &self.next {
                if !next.is_interlaced() {
                    return Ok(self.queued.len() + val);
                }
            }
        }

        Ok(self.queued.len() + val * (1 + (self.opts.mode & 1) as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::YadifOptions;

    #[test]
    fn verify_option_parsing() {
        assert_eq!(YadifOptions::parse(""), YadifOptions::default());
        assert_eq!(YadifOptions::parse("1"), YadifOptions { mode: 1, ..Default::default() });
        assert_eq!(YadifOptions::parse("1:0"), YadifOptions { mode: 1, parity: 0, auto_enable: 0 });
        assert_eq!(
            YadifOptions::parse("3:-1:1"),
            YadifOptions { mode: 3, parity: -1, auto_enable: 1 }
        );

        // A malformed field ends the scan; later fields keep their defaults.
        assert_eq!(YadifOptions::parse("junk"), YadifOptions::default());
        assert_eq!(
            YadifOptions::parse("2:x:1"),
            YadifOptions { mode: 2, ..Default::default() }
        );

        // Out-of-range values are not validated.
        assert_eq!(YadifOptions::parse("7:5:9"), YadifOptions { mode: 7, parity: 5, auto_enable: 9 });
    }
}
