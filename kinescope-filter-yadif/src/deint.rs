// Kinescope
// Copyright (c) 2025 The Project Kinescope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Frame-level deinterlacing: walks a destination frame plane by plane, copying the rows
//! of the kept field and reconstructing the rows of the missing field with a line filter.

use kinescope_core::frame::VideoFrame;

use crate::line::{FilterLine, LineArgs};

/// Produce one progressive frame from the three-frame window.
///
/// `parity` selects which field is reconstructed (rows with `(y ^ parity) & 1 != 0` are
/// holes), and `tff` names the temporally-first field of the window. The window frames are
/// never written; `dst` must be allocated with the same specification as `cur`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn filter_frame(
    dst: &mut VideoFrame,
    prev: &VideoFrame,
    cur: &VideoFrame,
    next: &VideoFrame,
    parity: i32,
    tff: i32,
    mode: i32,
    filter_line: FilterLine,
) {
    let format = dst.spec().format();
    let df = format.bytes_per_sample();

    for i in 0..format.plane_count() {
        let (w, h) = dst.spec().plane_dimensions(i);
        let (w, h) = (w as usize, h as usize);

        // All three window frames come from the same allocator and share one geometry;
        // rows of the previous and next frames are addressed with the current frame's
        // stride.
        let refs = cur.plane(i).stride();
        debug_assert_eq!(prev.plane(i).stride(), refs);
        debug_assert_eq!(next.plane(i).stride(), refs);
        debug_assert_eq!(prev.plane(i).offset(), cur.plane(i).offset());
        debug_assert_eq!(next.plane(i).offset(), cur.plane(i).offset());

        for y in 0..h {
            if (y as i32 ^ parity) & 1 != 0 {
                // The spatial interlacing check reads two lines beyond the hole's
                // neighbors; on the outermost hole lines those reads have no second line
                // to land on, so the check is disabled there.
                let mode = if y == 1 || y + 2 == h { 2 } else { mode };

                let dst_pos = dst.plane(i).offset() + y * dst.plane(i).stride();
                let pos = cur.plane(i).offset() + y * refs;
                let refs = refs as isize;

                let mut args = LineArgs {
                    dst: dst.plane_mut(i).data_mut(),
                    dst_pos,
                    prev: prev.plane(i).data(),
                    cur: cur.plane(i).data(),
                    next: next.plane(i).data(),
                    pos,
                    w,
                    // Reflect at the image edges by negating the line offset.
                    prefs: if y + 1 < h { refs } else { -refs },
                    mrefs: if y > 0 { -refs } else { refs },
                    parity: (parity ^ tff) != 0,
                    mode,
                };
                filter_line(&mut args);
            }
            else {
                let src = cur.plane(i).row(y as u32);
                dst.plane_mut(i).row_mut(y as u32)[..w * df].copy_from_slice(&src[..w * df]);
            }
        }
    }
}
