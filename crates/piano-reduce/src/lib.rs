//! Piano-reduction analysis over the timeline model.
//!
//! Takes a [`piece_model::EventSet`], pairs it into notes, snaps the note
//! ranges onto a canonical rhythmic grid, indexes them in an interval tree,
//! and slices the result into per-window [`Column`]s with a deterministic
//! two-hand split. The output is the level-one chord reduction a pianist
//! would read off: what sounds together, and which hand can reach it.

pub mod column;
pub mod piece;
pub mod quantize;
pub mod rhythm;

pub use column::{Column, SplitProfile};
pub use piece::{Piece, ReduceOptions, TimelineContext};
pub use quantize::{quantize, quantize_all, RESOLUTION};
pub use rhythm::RhythmType;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no rhythm type classifies a duration of {0} ticks")]
    UnclassifiableDuration(f64),

    #[error("resolution {0} ticks per quarter is not usable as a grid source")]
    InvalidResolution(u16),

    #[error("tick {tick} at rescale factor {scale} overflows the canonical timeline")]
    TickOverflow { tick: u32, scale: u32 },

    #[error(transparent)]
    Model(#[from] piece_model::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
