//! Traffic allocation for experiment variants.
//!
//! Keeps the traffic fractions of an experiment's variants summing to 1.0,
//! converts them to the cumulative percentages shown on a multi-handle
//! slider, and converts handle positions back into fractions.
//!
//! Every function here is a pure transformation of a variant list. The
//! [`VariantEditor`] is the only stateful piece: it holds the list being
//! edited and applies one edit at a time.

pub mod allocator;
pub mod editor;
pub mod rounding;
pub mod stack;

pub use allocator::{
    add_variant, next_letter, next_traffic, reaffect_traffic, traffic_stack, update_traffic,
};
pub use editor::{VariantEditor, SUM_TOLERANCE};
pub use rounding::{locale_cmp, round2};
pub use stack::TrafficStack;

use thiserror::Error;

/// Errors raised by allocation operations on malformed input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AllocatorError {
    #[error("experiment has no variants")]
    NoVariants,

    #[error("no letter follows variant id '{0}'")]
    UnknownLetter(String),

    #[error("expected {expected} slider positions, got {actual}")]
    PositionCount { expected: usize, actual: usize },

    #[error("slider position {index} is lower than the previous one")]
    DecreasingPositions { index: usize },

    #[error("no variant with id '{0}'")]
    UnknownVariant(String),
}
