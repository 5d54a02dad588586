// Kinescope
// Copyright (c) 2025 The Project Kinescope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The scalar line predictor.
//!
//! A line predictor reconstructs one missing line of a field from its spatial neighbors in
//! the current frame and its temporal neighbors in the previous and next frames. The same
//! generic kernel serves 8-bit and 16-bit samples; the sample width is chosen once at
//! negotiation and dispatched through a plain function pointer.

use kinescope_core::sample::{Sample, SampleFormat};

/// Inputs for one invocation of a line filter kernel.
///
/// `prev`, `cur` and `next` are entire plane allocations, and `pos` is the byte offset of
/// the line being reconstructed within each of them. `prefs` and `mrefs` are byte offsets
/// from that line to the next and previous lines of the current frame; the caller negates
/// one of them at the top or bottom image edge so the kernel reflects into the image
/// instead of reading past it.
pub(crate) struct LineArgs<'a> {
    /// Destination plane allocation.
    pub dst: &'a mut [u8],
    /// Byte offset of the destination line within `dst`.
    pub dst_pos: usize,
    /// Previous frame's plane.
    pub prev: &'a [u8],
    /// Current frame's plane.
    pub cur: &'a [u8],
    /// Next frame's plane.
    pub next: &'a [u8],
    /// Byte offset of the reconstructed line within the source planes.
    pub pos: usize,
    /// Width of the line in samples.
    pub w: usize,
    /// Byte offset to the next line.
    pub prefs: isize,
    /// Byte offset to the previous line.
    pub mrefs: isize,
    /// Selects which flanking field of `prev`/`next` is temporally aligned with this line.
    pub parity: bool,
    /// Filter mode; values >= 2 skip the spatial interlacing check.
    pub mode: i32,
}

/// A line filter kernel, selected once per stream at format negotiation.
pub(crate) type FilterLine = fn(&mut LineArgs<'_>);

/// Select the reference kernel matching a sample format.
pub(crate) fn select_filter_line(format: SampleFormat) -> FilterLine {
    match format {
        SampleFormat::U8 => filter_line::<u8>,
        SampleFormat::U16 => filter_line::<u16>,
    }
}

#[inline(always)]
fn at<S: Sample>(data: &[u8], idx: isize) -> i32 {
    S::load(data, idx as usize)
}

/// Reconstruct one line.
///
/// The output is an edge-directed spatial interpolation of the lines above and below,
/// clipped against the temporal midpoint of the two neighboring frames by the local motion
/// magnitude. The kernel is pure: it reads only its arguments and writes only `dst`.
pub(crate) fn filter_line<S: Sample>(args: &mut LineArgs<'_>) {
    // Positions and strides arrive in bytes. All indexing below is in samples.
    let prefs = args.prefs / S::BYTES as isize;
    let mrefs = args.mrefs / S::BYTES as isize;
    let pos = args.pos / S::BYTES;
    let dst_pos = args.dst_pos / S::BYTES;
    let w = args.w;
    let mode = args.mode;

    let (prev, cur, next) = (args.prev, args.cur, args.next);
    let dst = &mut *args.dst;

    // prev2 and next2 name the frames whose lines at `pos` are temporally aligned with the
    // line being rebuilt.
    let (prev2, next2) = if args.parity { (prev, cur) } else { (cur, next) };

    for x in 0..w {
        let i = (pos + x) as isize;

        let c = at::<S>(cur, i + mrefs);
        let d = (at::<S>(prev2, i) + at::<S>(next2, i)) >> 1;
        let e = at::<S>(cur, i + prefs);

        let temporal_diff0 = (at::<S>(prev2, i) - at::<S>(next2, i)).abs();
        let temporal_diff1 = ((at::<S>(prev, i + mrefs) - c).abs()
            + (at::<S>(prev, i + prefs) - e).abs())
            >> 1;
        let temporal_diff2 = ((at::<S>(next, i + mrefs) - c).abs()
            + (at::<S>(next, i + prefs) - e).abs())
            >> 1;
        let mut diff = (temporal_diff0 >> 1).max(temporal_diff1).max(temporal_diff2);

        let mut spatial_pred = (c + e) >> 1;
        let mut spatial_score = (at::<S>(cur, i + mrefs - 1) - at::<S>(cur, i + prefs - 1)).abs()
            + (c - e).abs()
            + (at::<S>(cur, i + mrefs + 1) - at::<S>(cur, i + prefs + 1)).abs()
            - 1;

        // Probe the diagonal at offset j; keep it when it scores strictly better than the
        // best so far.
        let mut check = |j: isize, score: &mut i32, pred: &mut i32| -> bool {
            let candidate = (at::<S>(cur, i + mrefs - 1 + j) - at::<S>(cur, i + prefs - 1 - j))
                .abs()
                + (at::<S>(cur, i + mrefs + j) - at::<S>(cur, i + prefs - j)).abs()
                + (at::<S>(cur, i + mrefs + 1 + j) - at::<S>(cur, i + prefs + 1 - j)).abs();

            if candidate < *score {
                *score = candidate;
                *pred = (at::<S>(cur, i + mrefs + j) + at::<S>(cur, i + prefs - j)) >> 1;
                true
            }
            else {
                false
            }
        };

        // The +-2 probes only run when the +-1 probe on the same side lowered the score.
        // This gating is part of the algorithm's definition, not an optimization.
        if check(-1, &mut spatial_score, &mut spatial_pred) {
            check(-2, &mut spatial_score, &mut spatial_pred);
        }
        if check(1, &mut spatial_score, &mut spatial_pred) {
            check(2, &mut spatial_score, &mut spatial_pred);
        }

        if mode < 2 {
            // Widen the clip range when the lines two further out agree that the local
            // motion is not an artifact of interlacing.
            let b = (at::<S>(prev2, i + 2 * mrefs) + at::<S>(next2, i + 2 * mrefs)) >> 1;
            let f = (at::<S>(prev2, i + 2 * prefs) + at::<S>(next2, i + 2 * prefs)) >> 1;

            let hi = (d - e).max(d - c).max((b - c).min(f - e));
            let lo = (d - e).min(d - c).min((b - c).max(f - e));

            diff = diff.max(lo).max(-hi);
        }

        if spatial_pred > d + diff {
            spatial_pred = d + diff;
        }
        else if spatial_pred < d - diff {
            spatial_pred = d - diff;
        }

        S::store(dst, dst_pos + x, spatial_pred);
    }
}
