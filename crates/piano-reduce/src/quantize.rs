use piece_model::Range;

use crate::rhythm::RhythmType;
use crate::{Error, Result};

/// The canonical grid resolution in ticks per quarter note. Every range is
/// rescaled to it before classification, so the [`RhythmType`] durations
/// hold regardless of the source document's resolution.
pub const RESOLUTION: u16 = 480;

/// Minimum forward reach, in ticks, an input must have into a grid window
/// for the note to land there rather than in the next window.
const GRID_TOLERANCE: i64 = 4;

/// Snap one tick range onto the rhythmic grid.
///
/// The range's length picks a [`RhythmType`]; windows the size of that
/// value's undotted base slide from tick zero until the input reaches at
/// least [`GRID_TOLERANCE`] ticks into one; the result starts at that
/// window and runs for the classified duration. A range already on the
/// grid at the canonical resolution quantizes to itself.
///
/// `resolution` is the source ticks-per-quarter; the rescale factor is the
/// integer quotient `480 / resolution`, matching documents whose resolution
/// divides the canonical one.
pub fn quantize(range: Range, resolution: u16) -> Result<Range> {
    if resolution == 0 || resolution > RESOLUTION {
        return Err(Error::InvalidResolution(resolution));
    }
    let scale = u32::from(RESOLUTION / resolution);

    let scaled = Range::new(
        scale_tick(range.low(), scale)?,
        scale_tick(range.high(), scale)?,
    )?;

    let rhythm = RhythmType::classify(f64::from(scaled.length()))?;

    let window_size = rhythm.base() / rhythm.divisor();
    let mut window = Range::new(0, (window_size - 1.0) as u32)?;
    while window.overlapping_region_length(scaled) < GRID_TOLERANCE {
        window = window.shifted(window.duration());
    }

    let low = window.low();
    let high = (f64::from(low) + rhythm.duration() - 1.0) as u32;
    Ok(Range::new(low, high)?)
}

/// Rescale a source tick onto the canonical timeline, rejecting ticks too
/// large to represent there.
pub(crate) fn scale_tick(tick: u32, scale: u32) -> Result<u32> {
    tick.checked_mul(scale)
        .ok_or(Error::TickOverflow { tick, scale })
}

/// Quantize a slice of ranges; fails on the first range that cannot be
/// placed.
pub fn quantize_all(ranges: &[Range], resolution: u16) -> Result<Vec<Range>> {
    ranges
        .iter()
        .map(|range| quantize(*range, resolution))
        .collect()
}
