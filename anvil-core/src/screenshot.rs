//! Read start and target progress from a screenshot of the anvil screen.
//!
//! # Layout (GUI units, multiplied by the GUI scale in pixels)
//!
//! ```text
//!   reference.left
//!   |
//!   |<---- target * scale ---->[TARGET]      row: start.top - 10 * scale
//!   |
//!   [REF]<-- start * scale -->[START]        row: start.top
//!         markers are 5 units wide
//! ```
//!
//! Buffers are tightly packed RGBA8, row-major. Colours are matched
//! exactly on RGB; alpha is ignored.

use serde::Serialize;
use tracing::debug;

use crate::clamp_progress;

/// Colour of the marker showing current progress.
pub const START_MARKER: [u8; 3] = [0x00, 0xFF, 0x00];

/// Colour of the marker showing target progress.
pub const TARGET_MARKER: [u8; 3] = [0xFF, 0x00, 0x00];

/// Colour of the marker at progress zero.
pub const REFERENCE_MARKER: [u8; 3] = [0xFF, 0xFF, 0xFF];

/// Marker width in GUI units.
pub const MARKER_WIDTH_UNITS: usize = 5;

/// Vertical distance from the target marker's top to the start marker's top.
pub const TARGET_ROW_OFFSET_UNITS: usize = 10;

/// Positions read from a screenshot.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct Extracted {
    pub start: i32,
    pub target: i32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Rect {
    left: usize,
    top: usize,
    width: usize,
    height: usize,
}

struct Image<'a> {
    pixels: &'a [u8],
    width: usize,
    height: usize,
}

impl Image<'_> {
    #[inline]
    fn is(&self, x: usize, y: usize, color: [u8; 3]) -> bool {
        let i = (y * self.width + x) * 4;
        self.pixels[i..i + 3] == color
    }

    /// Rectangle grown right and down from the first pixel of `color`.
    fn find(&self, color: [u8; 3]) -> Option<Rect> {
        let first = (0..self.width * self.height)
            .find(|&i| self.is(i % self.width, i / self.width, color))?;
        let (left, top) = (first % self.width, first / self.width);
        let width = (left..self.width)
            .take_while(|&x| self.is(x, top, color))
            .count();
        let height = (top..self.height)
            .take_while(|&y| self.is(left, y, color))
            .count();
        Some(Rect { left, top, width, height })
    }
}

/// Locate the three markers and convert their offsets to progress.
///
/// Returns `None` when the buffer size does not match, a marker is
/// missing, marker sizes disagree, the width is not a whole GUI scale, or
/// the target marker is not exactly one row offset above the start marker.
pub fn extract(pixels: &[u8], width: usize, height: usize) -> Option<Extracted> {
    let expected = width.checked_mul(height)?.checked_mul(4)?;
    if pixels.len() != expected || expected == 0 {
        debug!(len = pixels.len(), expected, "screenshot buffer size mismatch");
        return None;
    }
    let image = Image { pixels, width, height };

    let start = image.find(START_MARKER)?;
    let target = image.find(TARGET_MARKER)?;
    let reference = image.find(REFERENCE_MARKER)?;

    if start.width != target.width || start.height != target.height {
        debug!(?start, ?target, "marker sizes differ");
        return None;
    }
    if reference.height != start.height {
        debug!(?reference, ?start, "reference marker height differs");
        return None;
    }
    if start.width % MARKER_WIDTH_UNITS != 0 {
        return None;
    }
    let scale = start.width / MARKER_WIDTH_UNITS;
    if target.top + TARGET_ROW_OFFSET_UNITS * scale != start.top {
        debug!(?start, ?target, scale, "unexpected vertical offset");
        return None;
    }

    let progress = |marker: Rect| {
        let offset = marker.left as i64 - reference.left as i64;
        clamp_progress((offset / scale as i64) as i32)
    };
    Some(Extracted {
        start: progress(start),
        target: progress(target),
    })
}
