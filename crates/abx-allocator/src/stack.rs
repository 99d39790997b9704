use abx_protocol::{TrafficStackPoint, Variant};

use crate::allocator::{ordered_variants, stack_points, update_traffic};
use crate::AllocatorError;

/// Slider view of a variant list.
///
/// Holds the variants in the exact order used to build the cumulative
/// points, so handle positions coming back from the slider are always
/// mapped onto the same variants that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficStack {
    order: Vec<Variant>,
    points: Vec<TrafficStackPoint>,
}

impl TrafficStack {
    pub fn build(variants: &[Variant], ordered_by_id: bool) -> Self {
        let order = ordered_variants(variants, ordered_by_id);
        let points = stack_points(&order);
        Self { order, points }
    }

    /// Handle positions in percent, as fed to the slider.
    pub fn positions(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.traffic).collect()
    }

    /// Variants in slider order.
    pub fn order(&self) -> &[Variant] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Map new handle positions back onto the variants, in slider order.
    pub fn apply(&self, positions: &[f64]) -> Result<Vec<Variant>, AllocatorError> {
        update_traffic(&self.order, positions)
    }
}
