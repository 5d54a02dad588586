// Kinescope
// Copyright (c) 2025 The Project Kinescope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `pixel` module defines pixel formats and their plane layout descriptors.

use std::fmt;

use crate::sample::SampleFormat;

/// `PixelFormat` identifies the in-memory layout of a planar video frame.
///
/// All formats are planar: each component is stored in its own plane with no interleaving.
/// 16-bit formats store samples in native endian. The `j` variants are full-range (JPEG)
/// versions of the corresponding studio-range YUV formats; their plane layout is identical.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Planar YUV 4:2:0, 8 bits per sample.
    Yuv420p,
    /// Planar YUV 4:2:2, 8 bits per sample.
    Yuv422p,
    /// Planar YUV 4:4:4, 8 bits per sample.
    Yuv444p,
    /// Planar YUV 4:1:0, 8 bits per sample.
    Yuv410p,
    /// Planar YUV 4:1:1, 8 bits per sample.
    Yuv411p,
    /// Planar YUV 4:4:0, 8 bits per sample.
    Yuv440p,
    /// Planar YUV 4:2:0, 8 bits per sample, full range.
    Yuvj420p,
    /// Planar YUV 4:2:2, 8 bits per sample, full range.
    Yuvj422p,
    /// Planar YUV 4:4:4, 8 bits per sample, full range.
    Yuvj444p,
    /// Planar YUV 4:4:0, 8 bits per sample, full range.
    Yuvj440p,
    /// Planar YUV 4:2:0 with an alpha plane, 8 bits per sample.
    Yuva420p,
    /// Greyscale, 8 bits per sample.
    Gray8,
    /// Greyscale, 16 bits per sample.
    Gray16,
    /// Planar YUV 4:2:0, 10 significant bits in 16-bit samples.
    Yuv420p10,
    /// Planar YUV 4:2:0, 16 bits per sample.
    Yuv420p16,
    /// Planar YUV 4:2:2, 16 bits per sample.
    Yuv422p16,
    /// Planar YUV 4:4:4, 16 bits per sample.
    Yuv444p16,
}

impl PixelFormat {
    /// Get the number of planes.
    pub fn plane_count(&self) -> usize {
        match self {
            PixelFormat::Gray8 | PixelFormat::Gray16 => 1,
            PixelFormat::Yuva420p => 4,
            _ => 3,
        }
    }

    /// Get the base-2 logarithms of the horizontal and vertical chroma subsampling factors.
    ///
    /// The shifts apply to the chroma planes (plane indicies 1 and 2) only. Greyscale
    /// formats have no chroma planes and report no subsampling.
    pub fn chroma_shift(&self) -> (u32, u32) {
        match self {
            PixelFormat::Yuv420p
            | PixelFormat::Yuvj420p
            | PixelFormat::Yuva420p
            | PixelFormat::Yuv420p10
            | PixelFormat::Yuv420p16 => (1, 1),
            PixelFormat::Yuv422p | PixelFormat::Yuvj422p | PixelFormat::Yuv422p16 => (1, 0),
            PixelFormat::Yuv410p => (2, 2),
            PixelFormat::Yuv411p => (2, 0),
            PixelFormat::Yuv440p | PixelFormat::Yuvj440p => (0, 1),
            _ => (0, 0),
        }
    }

    /// Get the sample format shared by all planes.
    pub fn sample_format(&self) -> SampleFormat {
        match self {
            PixelFormat::Gray16
            | PixelFormat::Yuv420p10
            | PixelFormat::Yuv420p16
            | PixelFormat::Yuv422p16
            | PixelFormat::Yuv444p16 => SampleFormat::U16,
            _ => SampleFormat::U8,
        }
    }

    /// Get the width of one sample in bytes.
    pub fn bytes_per_sample(&self) -> usize {
        self.sample_format().bytes()
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelFormat::Yuv420p => "yuv420p",
            PixelFormat::Yuv422p => "yuv422p",
            PixelFormat::Yuv444p => "yuv444p",
            PixelFormat::Yuv410p => "yuv410p",
            PixelFormat::Yuv411p => "yuv411p",
            PixelFormat::Yuv440p => "yuv440p",
            PixelFormat::Yuvj420p => "yuvj420p",
            PixelFormat::Yuvj422p => "yuvj422p",
            PixelFormat::Yuvj444p => "yuvj444p",
            PixelFormat::Yuvj440p => "yuvj440p",
            PixelFormat::Yuva420p => "yuva420p",
            PixelFormat::Gray8 => "gray8",
            PixelFormat::Gray16 => "gray16",
            PixelFormat::Yuv420p10 => "yuv420p10",
            PixelFormat::Yuv420p16 => "yuv420p16",
            PixelFormat::Yuv422p16 => "yuv422p16",
            PixelFormat::Yuv444p16 => "yuv444p16",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::PixelFormat;
    use crate::sample::SampleFormat;

    #[test]
    fn verify_plane_layout() {
        assert_eq!(PixelFormat::Yuv420p.plane_count(), 3);
        assert_eq!(PixelFormat::Yuv420p.chroma_shift(), (1, 1));
        assert_eq!(PixelFormat::Yuv422p.chroma_shift(), (1, 0));
        assert_eq!(PixelFormat::Yuv410p.chroma_shift(), (2, 2));
        assert_eq!(PixelFormat::Yuv411p.chroma_shift(), (2, 0));
        assert_eq!(PixelFormat::Yuv440p.chroma_shift(), (0, 1));
        assert_eq!(PixelFormat::Yuv444p.chroma_shift(), (0, 0));

        assert_eq!(PixelFormat::Gray8.plane_count(), 1);
        assert_eq!(PixelFormat::Gray16.plane_count(), 1);
        assert_eq!(PixelFormat::Yuva420p.plane_count(), 4);
    }

    #[test]
    fn verify_sample_widths() {
        assert_eq!(PixelFormat::Yuv420p.sample_format(), SampleFormat::U8);
        assert_eq!(PixelFormat::Gray16.sample_format(), SampleFormat::U16);
        assert_eq!(PixelFormat::Yuv444p16.bytes_per_sample(), 2);
        assert_eq!(PixelFormat::Yuvj444p.bytes_per_sample(), 1);
    }
}
