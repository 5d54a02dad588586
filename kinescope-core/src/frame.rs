// Kinescope
// Copyright (c) 2025 The Project Kinescope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `frame` module provides primitives for working with planar video frames.

use std::sync::Arc;

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::pixel::PixelFormat;

/// A `TimeStamp` is the presentation time of a frame in stream timebase units.
pub type TimeStamp = i64;

/// The horizontal alignment of allocated plane rows, in samples.
pub const ROW_ALIGN: u32 = 32;

/// A shared, reference-counted, immutable video frame.
pub type FrameRef = Arc<VideoFrame>;

bitflags! {
    /// Flags indicating certain attributes of a video frame.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct FrameFlags: u32 {
        /// The frame is interlaced: its two fields were sampled at different instants.
        const INTERLACED      = 1 << 0;
        /// The top (even-line) field of an interlaced frame is temporally first.
        const TOP_FIELD_FIRST = 1 << 1;
    }
}

/// A specification defining the core characteristics of a video stream.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VideoSpec {
    /// The pixel format.
    format: PixelFormat,
    /// The visible width in luma samples.
    width: u32,
    /// The visible height in luma samples.
    height: u32,
}

impl VideoSpec {
    /// Create a video specification from a pixel format and visible dimensions.
    pub fn new(format: PixelFormat, width: u32, height: u32) -> Self {
        VideoSpec { format, width, height }
    }

    /// Get the pixel format.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Get the visible width in luma samples.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the visible height in luma samples.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the visible dimensions of plane `idx` in samples.
    ///
    /// Chroma subsampling applies to planes 1 and 2; the luma plane and an alpha plane, if
    /// present, are full size.
    pub fn plane_dimensions(&self, idx: usize) -> (u32, u32) {
        match idx {
            1 | 2 => {
                let (hs, vs) = self.format.chroma_shift();
                (self.width >> hs, self.height >> vs)
            }
            _ => (self.width, self.height),
        }
    }
}

/// One plane of a planar video frame.
///
/// Plane storage is over-allocated: rows are [`ROW_ALIGN`] samples wide at minimum, and the
/// first addressable row starts one stride into the allocation, leaving valid padding rows
/// above row 0 and below the last visible row. Line filters rely on this to read their
/// vertical neighbors at the image edges without branching.
pub struct Plane {
    data: Box<[u8]>,
    stride: usize,
    offset: usize,
}

impl Plane {
    fn new(width: u32, rows: u32, bytes_per_sample: usize) -> Plane {
        let stride = width as usize * bytes_per_sample;
        let data = vec![0u8; stride * rows as usize].into_boxed_slice();

        // Point row 0 one row into the allocation so that row -1 is addressable.
        Plane { data, stride, offset: stride }
    }

    /// Get the row stride in bytes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Get the byte offset of row 0 within the plane storage.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Get the full backing storage of the plane, including the padding rows.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the full mutable backing storage of the plane, including the padding rows.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Get the bytes of row `y`.
    pub fn row(&self, y: u32) -> &[u8] {
        &self.data[self.offset + y as usize * self.stride..][..self.stride]
    }

    /// Get the mutable bytes of row `y`.
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        &mut self.data[self.offset + y as usize * self.stride..][..self.stride]
    }
}

/// A `VideoFrame` is a planar image with presentation metadata.
///
/// Frames are shared between pipeline stages as [`FrameRef`]s. A frame's sample data is
/// written once, while the frame is still uniquely owned, and is immutable thereafter.
pub struct VideoFrame {
    spec: VideoSpec,
    planes: SmallVec<[Plane; 4]>,
    /// The presentation timestamp, or `None` when unknown.
    pub pts: Option<TimeStamp>,
    /// Frame attribute flags.
    pub flags: FrameFlags,
}

impl VideoFrame {
    /// Allocate a new zeroed frame for `spec`.
    ///
    /// Plane rows are allocated [`ROW_ALIGN`]-sample aligned with two rows of vertical
    /// overhang, and row 0 starts one stride into the allocation, so row -1 and the row
    /// just past the visible height are valid padding. The alignment also satisfies
    /// vectorized line filters.
    pub fn new(spec: VideoSpec) -> VideoFrame {
        let format = spec.format();
        let (hs, vs) = format.chroma_shift();
        let bytes_per_sample = format.bytes_per_sample();

        let aligned_w = align(spec.width(), ROW_ALIGN);
        let aligned_h = align(spec.height() + 2, ROW_ALIGN);

        let planes = (0..format.plane_count())
            .map(|idx| {
                let (w, rows) = match idx {
                    1 | 2 => (aligned_w >> hs, aligned_h >> vs),
                    _ => (aligned_w, aligned_h),
                };
                Plane::new(w, rows, bytes_per_sample)
            })
            .collect();

        VideoFrame { spec, planes, pts: None, flags: FrameFlags::empty() }
    }

    /// Get the video specification.
    pub fn spec(&self) -> &VideoSpec {
        &self.spec
    }

    /// Get the visible width in luma samples.
    pub fn width(&self) -> u32 {
        self.spec.width()
    }

    /// Get the visible height in luma samples.
    pub fn height(&self) -> u32 {
        self.spec.height()
    }

    /// Get the plane at index `idx`.
    pub fn plane(&self, idx: usize) -> &Plane {
        &self.planes[idx]
    }

    /// Get the mutable plane at index `idx`.
    pub fn plane_mut(&mut self, idx: usize) -> &mut Plane {
        &mut self.planes[idx]
    }

    /// Returns `true` if the frame is flagged as interlaced.
    pub fn is_interlaced(&self) -> bool {
        self.flags.contains(FrameFlags::INTERLACED)
    }

    /// Returns `true` if the top field of the frame is temporally first.
    pub fn is_top_field_first(&self) -> bool {
        self.flags.contains(FrameFlags::TOP_FIELD_FIRST)
    }

    /// Copy the presentation properties (timestamp and flags) of another frame.
    pub fn copy_props_from(&mut self, other: &VideoFrame) {
        self.pts = other.pts;
        self.flags = other.flags;
    }
}

/// Round `value` up to the next multiple of `to`. `to` must be a power of two.
fn align(value: u32, to: u32) -> u32 {
    debug_assert!(to.is_power_of_two());
    (value + to - 1) & !(to - 1)
}

#[cfg(test)]
mod tests {
    use super::{align, FrameFlags, VideoFrame, VideoSpec, ROW_ALIGN};
    use crate::pixel::PixelFormat;

    #[test]
    fn verify_align() {
        assert_eq!(align(0, 32), 0);
        assert_eq!(align(1, 32), 32);
        assert_eq!(align(32, 32), 32);
        assert_eq!(align(33, 32), 64);
        assert_eq!(align(720, 32), 736);
    }

    #[test]
    fn verify_plane_geometry() {
        let frame = VideoFrame::new(VideoSpec::new(PixelFormat::Yuv420p, 10, 10));

        // Luma rows are aligned to 32 samples, chroma rows to the subsampled width.
        assert_eq!(frame.plane(0).stride(), 32);
        assert_eq!(frame.plane(1).stride(), 16);
        assert_eq!(frame.plane(2).stride(), 16);

        // Row 0 starts one row into the allocation, and every plane has room for at least
        // the visible rows plus the one-row overhang on each side.
        for idx in 0..3 {
            let plane = frame.plane(idx);
            let (_, h) = frame.spec().plane_dimensions(idx);
            assert_eq!(plane.offset(), plane.stride());
            assert!(plane.data().len() >= plane.offset() + (h as usize + 1) * plane.stride());
        }

        assert_eq!(frame.spec().plane_dimensions(0), (10, 10));
        assert_eq!(frame.spec().plane_dimensions(1), (5, 5));
        assert_eq!(frame.spec().plane_dimensions(2), (5, 5));
    }

    #[test]
    fn verify_16bit_plane_geometry() {
        let frame = VideoFrame::new(VideoSpec::new(PixelFormat::Gray16, 48, 30));

        let plane = frame.plane(0);
        assert_eq!(plane.stride(), 2 * align(48, ROW_ALIGN) as usize);
        assert_eq!(plane.offset(), plane.stride());
        assert!(plane.data().len() >= plane.offset() + 31 * plane.stride());
    }

    #[test]
    fn verify_new_frames_are_zeroed() {
        let frame = VideoFrame::new(VideoSpec::new(PixelFormat::Gray8, 8, 8));
        assert!(frame.plane(0).data().iter().all(|&b| b == 0));
        assert_eq!(frame.pts, None);
        assert_eq!(frame.flags, FrameFlags::empty());
    }

    #[test]
    fn verify_copy_props() {
        let spec = VideoSpec::new(PixelFormat::Gray8, 8, 8);

        let mut src = VideoFrame::new(spec);
        src.pts = Some(42);
        src.flags = FrameFlags::INTERLACED | FrameFlags::TOP_FIELD_FIRST;

        let mut dst = VideoFrame::new(spec);
        dst.copy_props_from(&src);

        assert_eq!(dst.pts, Some(42));
        assert!(dst.is_interlaced());
        assert!(dst.is_top_field_first());
    }
}
