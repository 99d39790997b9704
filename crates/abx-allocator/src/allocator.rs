//! Pure traffic-allocation operations over an ordered variant list.
//!
//! Two remainder conventions coexist:
//! - [`reaffect_traffic`] gives the rounding remainder to the *first* variant
//! - [`add_variant`] gives it to the *new* (last) variant
//!
//! Both keep the total at exactly 1.0 after rounding.

use abx_protocol::{TrafficStackPoint, Variant, VARIANT_LETTERS};

use crate::rounding::{locale_cmp, round2};
use crate::AllocatorError;

/// Redistribute traffic evenly across `variants`.
///
/// - no variant: empty list
/// - one variant: it receives the whole traffic (1.0)
/// - `n` variants: all but the first receive `round2(1 / n)`; the first
///   receives `round2(1 - (n - 1) * share)` so the total is exactly 1.0
pub fn reaffect_traffic(variants: &[Variant]) -> Vec<Variant> {
    match variants {
        [] => Vec::new(),
        [only] => vec![only.with_traffic(1.0)],
        [first, rest @ ..] => {
            let share = round2(1.0 / variants.len() as f64);
            let remainder = round2(1.0 - rest.len() as f64 * share);
            tracing::debug!(
                variants = variants.len(),
                share,
                remainder,
                "reallocating variant traffic"
            );
            std::iter::once(first.with_traffic(remainder))
                .chain(rest.iter().map(|v| v.with_traffic(share)))
                .collect()
        }
    }
}

/// Cumulative traffic percentages for a multi-handle slider.
///
/// When `ordered_by_id` is set the variants are first sorted by id
/// ([`locale_cmp`]); otherwise the supplied order is kept. The result starts
/// with the zero sentinel and has one more point than there are variants.
pub fn traffic_stack(variants: &[Variant], ordered_by_id: bool) -> Vec<TrafficStackPoint> {
    let ordered = ordered_variants(variants, ordered_by_id);
    stack_points(&ordered)
}

pub(crate) fn ordered_variants(variants: &[Variant], ordered_by_id: bool) -> Vec<Variant> {
    let mut ordered = variants.to_vec();
    if ordered_by_id {
        ordered.sort_by(|a, b| locale_cmp(&a.id, &b.id));
    }
    ordered
}

pub(crate) fn stack_points(ordered: &[Variant]) -> Vec<TrafficStackPoint> {
    let mut points = Vec::with_capacity(ordered.len() + 1);
    points.push(TrafficStackPoint::sentinel());
    let mut cumulative = 0.0;
    for variant in ordered {
        cumulative += variant.traffic * 100.0;
        points.push(TrafficStackPoint {
            id: variant.id.clone(),
            traffic: cumulative,
        });
    }
    points
}

/// Convert slider handle positions back into per-variant fractions.
///
/// `positions` holds one cumulative percentage per handle, sentinel first,
/// so it must be one longer than `variants`. The sentinel's value is ignored
/// and the first share is measured from 0. Position `i + 1` belongs to
/// `variants[i]`: the mapping is positional and the caller must pass the
/// variants in the order used to build the stack (see
/// [`TrafficStack`](crate::TrafficStack), which does this for you).
///
/// No renormalization happens here. If the positions do not span 0..=100
/// the fractions will not sum to 1.0.
pub fn update_traffic(variants: &[Variant], positions: &[f64]) -> Result<Vec<Variant>, AllocatorError> {
    if positions.len() != variants.len() + 1 {
        return Err(AllocatorError::PositionCount {
            expected: variants.len() + 1,
            actual: positions.len(),
        });
    }
    let handles = &positions[1..];
    let mut previous = 0.0;
    for (i, &position) in handles.iter().enumerate() {
        if position < previous {
            return Err(AllocatorError::DecreasingPositions { index: i + 1 });
        }
        previous = position;
    }

    Ok(variants
        .iter()
        .zip(handles)
        .scan(0.0, |previous, (variant, &position)| {
            let share = position - *previous;
            *previous = position;
            Some(variant.with_traffic(round2(share / 100.0)))
        })
        .collect())
}

/// Letter following the id of the last variant in `variants`.
pub fn next_letter(variants: &[Variant]) -> Result<&'static str, AllocatorError> {
    let last = variants.last().ok_or(AllocatorError::NoVariants)?;
    VARIANT_LETTERS
        .iter()
        .position(|l| *l == last.id)
        .and_then(|i| VARIANT_LETTERS.get(i + 1))
        .copied()
        .ok_or_else(|| AllocatorError::UnknownLetter(last.id.clone()))
}

/// Equal share a new variant would receive next to `variant_count` others.
pub fn next_traffic(variant_count: usize) -> f64 {
    round2(1.0 / (variant_count + 1) as f64)
}

/// Append a variant named `Variant <new_id>`.
///
/// Every existing variant is shrunk to `new_traffic`; the new variant takes
/// what is left, `round2(1 - consumed)`.
pub fn add_variant(variants: &[Variant], new_id: &str, new_traffic: f64) -> Vec<Variant> {
    let mut updated: Vec<Variant> = variants.iter().map(|v| v.with_traffic(new_traffic)).collect();
    let consumed: f64 = updated.iter().map(|v| v.traffic).sum();
    let remaining = round2(1.0 - consumed);
    updated.push(Variant::new(new_id, format!("Variant {new_id}"), remaining));
    updated
}
