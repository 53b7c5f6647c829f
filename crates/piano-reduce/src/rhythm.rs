use piece_model::Range;

use crate::{Error, Result};

const WHOLE: f64 = 1920.0;
const HALF: f64 = 960.0;
const QUARTER: f64 = 480.0;
const EIGHTH: f64 = 240.0;
const SIXTEENTH: f64 = 120.0;
const THIRTY_SECOND: f64 = 60.0;
const SIXTY_FOURTH: f64 = 30.0;
const ONE_TWENTY_EIGHTH: f64 = 15.0;

/// Longer than anything the catalogue can name.
const OVERFLOW: f64 = 3000.0;

/// The rhythmic value catalogue at the canonical 480-tick resolution.
///
/// Deliberately sparse: quintuplets, septuplets, and nonuplets exist only
/// for the half and quarter bases, and the shortest bases drop tuplet and
/// dotted forms entirely. A denser grid would let near-miss durations
/// reclassify onto exotic tuplets and destabilize quantization, so the
/// catalogue stays exactly this set.
///
/// Declaration order matters: classification ties resolve to the earlier
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RhythmType {
    Overflow,

    Whole,

    Half,
    HalfDotted,
    HalfIn3,
    HalfIn5,
    HalfIn7,
    HalfIn9,

    Quarter,
    QuarterDotted,
    QuarterIn3,
    QuarterIn5,
    QuarterIn7,
    QuarterIn9,

    Eighth,
    EighthDotted,
    EighthIn3,

    Sixteenth,
    SixteenthDotted,
    SixteenthIn3,

    ThirtySecond,
    ThirtySecondDotted,
    ThirtySecondIn3,

    SixtyFourth,
    SixtyFourthDotted,

    OneTwentyEighth,
    OneTwentyEighthDotted,
    OneTwentyEighthIn3,
}

impl RhythmType {
    /// Every variant, in declaration order.
    pub const CATALOGUE: [RhythmType; 28] = [
        RhythmType::Overflow,
        RhythmType::Whole,
        RhythmType::Half,
        RhythmType::HalfDotted,
        RhythmType::HalfIn3,
        RhythmType::HalfIn5,
        RhythmType::HalfIn7,
        RhythmType::HalfIn9,
        RhythmType::Quarter,
        RhythmType::QuarterDotted,
        RhythmType::QuarterIn3,
        RhythmType::QuarterIn5,
        RhythmType::QuarterIn7,
        RhythmType::QuarterIn9,
        RhythmType::Eighth,
        RhythmType::EighthDotted,
        RhythmType::EighthIn3,
        RhythmType::Sixteenth,
        RhythmType::SixteenthDotted,
        RhythmType::SixteenthIn3,
        RhythmType::ThirtySecond,
        RhythmType::ThirtySecondDotted,
        RhythmType::ThirtySecondIn3,
        RhythmType::SixtyFourth,
        RhythmType::SixtyFourthDotted,
        RhythmType::OneTwentyEighth,
        RhythmType::OneTwentyEighthDotted,
        RhythmType::OneTwentyEighthIn3,
    ];

    /// `(base, multiplier, divisor)` in ticks; duration is their product
    /// over the divisor.
    pub fn parts(self) -> (f64, f64, f64) {
        match self {
            RhythmType::Overflow => (OVERFLOW, 1.0, 1.0),
            RhythmType::Whole => (WHOLE, 1.0, 1.0),
            RhythmType::Half => (HALF, 1.0, 1.0),
            RhythmType::HalfDotted => (HALF, 1.5, 1.0),
            RhythmType::HalfIn3 => (HALF, 2.0, 3.0),
            RhythmType::HalfIn5 => (HALF, 2.0, 5.0),
            RhythmType::HalfIn7 => (HALF, 2.0, 7.0),
            RhythmType::HalfIn9 => (HALF, 2.0, 9.0),
            RhythmType::Quarter => (QUARTER, 1.0, 1.0),
            RhythmType::QuarterDotted => (QUARTER, 1.5, 1.0),
            RhythmType::QuarterIn3 => (QUARTER, 2.0, 3.0),
            RhythmType::QuarterIn5 => (QUARTER, 2.0, 5.0),
            RhythmType::QuarterIn7 => (QUARTER, 2.0, 7.0),
            RhythmType::QuarterIn9 => (QUARTER, 2.0, 9.0),
            RhythmType::Eighth => (EIGHTH, 1.0, 1.0),
            RhythmType::EighthDotted => (EIGHTH, 1.5, 1.0),
            RhythmType::EighthIn3 => (EIGHTH, 2.0, 3.0),
            RhythmType::Sixteenth => (SIXTEENTH, 1.0, 1.0),
            RhythmType::SixteenthDotted => (SIXTEENTH, 1.5, 1.0),
            RhythmType::SixteenthIn3 => (SIXTEENTH, 2.0, 3.0),
            RhythmType::ThirtySecond => (THIRTY_SECOND, 1.0, 1.0),
            RhythmType::ThirtySecondDotted => (THIRTY_SECOND, 1.5, 1.0),
            RhythmType::ThirtySecondIn3 => (THIRTY_SECOND, 2.0, 3.0),
            RhythmType::SixtyFourth => (SIXTY_FOURTH, 1.0, 1.0),
            RhythmType::SixtyFourthDotted => (SIXTY_FOURTH, 1.5, 1.0),
            RhythmType::OneTwentyEighth => (ONE_TWENTY_EIGHTH, 1.0, 1.0),
            RhythmType::OneTwentyEighthDotted => (ONE_TWENTY_EIGHTH, 1.5, 1.0),
            RhythmType::OneTwentyEighthIn3 => (ONE_TWENTY_EIGHTH, 2.0, 3.0),
        }
    }

    pub fn base(self) -> f64 {
        self.parts().0
    }

    pub fn multiplier(self) -> f64 {
        self.parts().1
    }

    pub fn divisor(self) -> f64 {
        self.parts().2
    }

    /// Nominal duration in ticks. Fractional for most tuplets.
    pub fn duration(self) -> f64 {
        let (base, multiplier, divisor) = self.parts();
        base * multiplier / divisor
    }

    pub fn is_dotted(self) -> bool {
        self.multiplier() == 1.5
    }

    pub fn is_tuplet(self) -> bool {
        self.divisor() != 1.0
    }

    /// The canonical tick range of this value anchored at zero.
    pub fn equivalent_range(self) -> Result<Range> {
        Ok(Range::new(0, self.duration() as u32 - 1)?)
    }

    /// Name the rhythmic value of a duration in ticks.
    ///
    /// Anything longer than a whole is `Overflow`. Otherwise an exact
    /// duration match wins; failing that, the catalogue entry with the
    /// smallest absolute distance, ties going to the earlier variant.
    pub fn classify(duration: f64) -> Result<Self> {
        if WHOLE < duration {
            return Ok(RhythmType::Overflow);
        }

        for rhythm in RhythmType::CATALOGUE {
            if rhythm.duration() == duration {
                return Ok(rhythm);
            }
        }

        RhythmType::CATALOGUE
            .iter()
            .copied()
            .min_by(|a, b| {
                let a_diff = (a.duration() - duration).abs();
                let b_diff = (b.duration() - duration).abs();
                a_diff.total_cmp(&b_diff)
            })
            .ok_or(Error::UnclassifiableDuration(duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn durations() {
        assert_eq!(RhythmType::Whole.duration(), 1920.0);
        assert_eq!(RhythmType::Quarter.duration(), 480.0);
        assert_eq!(RhythmType::QuarterDotted.duration(), 720.0);
        assert_eq!(RhythmType::HalfIn3.duration(), 640.0);
        assert_eq!(RhythmType::HalfIn5.duration(), 384.0);
        assert_eq!(RhythmType::OneTwentyEighthDotted.duration(), 22.5);
    }

    #[test]
    fn exact_durations_classify_exactly() {
        assert_eq!(RhythmType::classify(1920.0).unwrap(), RhythmType::Whole);
        assert_eq!(RhythmType::classify(480.0).unwrap(), RhythmType::Quarter);
        assert_eq!(RhythmType::classify(640.0).unwrap(), RhythmType::HalfIn3);
        assert_eq!(RhythmType::classify(15.0).unwrap(), RhythmType::OneTwentyEighth);
    }

    #[test]
    fn longer_than_a_whole_overflows() {
        assert_eq!(RhythmType::classify(1921.0).unwrap(), RhythmType::Overflow);
        assert_eq!(RhythmType::classify(10_000.0).unwrap(), RhythmType::Overflow);
    }

    #[test]
    fn near_misses_take_the_closest_value() {
        // a quarter played one tick short
        assert_eq!(RhythmType::classify(479.0).unwrap(), RhythmType::Quarter);
        // sixteen ticks sits closest to the 15-tick 128th
        assert_eq!(
            RhythmType::classify(16.0).unwrap(),
            RhythmType::OneTwentyEighth
        );
    }

    #[test]
    fn ties_resolve_to_the_earlier_variant() {
        // 26.25 is equidistant from the 64th (30) and the dotted 128th
        // (22.5); the 64th is declared first
        assert_eq!(
            RhythmType::classify(26.25).unwrap(),
            RhythmType::SixtyFourth
        );
    }

    #[test]
    fn predicates() {
        assert!(RhythmType::QuarterDotted.is_dotted());
        assert!(!RhythmType::Quarter.is_dotted());
        assert!(RhythmType::QuarterIn5.is_tuplet());
        assert!(!RhythmType::QuarterDotted.is_tuplet());
        assert!(!RhythmType::Overflow.is_tuplet());
    }

    #[test]
    fn equivalent_ranges_anchor_at_zero() {
        assert_eq!(
            RhythmType::Quarter.equivalent_range().unwrap(),
            Range::new(0, 479).unwrap()
        );
        assert_eq!(
            RhythmType::OneTwentyEighth.equivalent_range().unwrap(),
            Range::new(0, 14).unwrap()
        );
    }
}
