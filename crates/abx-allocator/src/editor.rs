//! Form state of an experiment's variant list.
//!
//! Every edit goes through the editor, which re-checks the traffic total
//! afterwards. When the sum drops below 1.0 (a variant was removed or a
//! handle was released short of 100%) the traffic is redistributed with
//! [`reaffect_traffic`]. Floating noise within [`SUM_TOLERANCE`] of 1.0 does
//! not count as missing traffic.

use std::collections::HashMap;

use abx_protocol::{Variant, VARIANT_LETTERS};

use crate::allocator::{add_variant, next_letter, next_traffic, reaffect_traffic};
use crate::stack::TrafficStack;
use crate::AllocatorError;

/// Shortfall below which a traffic sum still counts as 1.0.
pub const SUM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantEditor {
    variants: Vec<Variant>,
}

impl VariantEditor {
    pub fn new(variants: Vec<Variant>) -> Self {
        let mut editor = Self::default();
        editor.set_variants(variants);
        editor
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn into_variants(self) -> Vec<Variant> {
        self.variants
    }

    /// Raw traffic total of the current variants.
    pub fn sum(&self) -> f64 {
        self.variants.iter().map(|v| v.traffic).sum()
    }

    /// Replace the whole list, then rebalance if traffic went missing.
    pub fn set_variants(&mut self, variants: Vec<Variant>) {
        self.variants = variants;
        self.rebalance();
    }

    /// Remove the variant with `id`.
    pub fn remove(&mut self, id: &str) -> Result<(), AllocatorError> {
        let before = self.variants.len();
        self.variants.retain(|v| v.id != id);
        if self.variants.len() == before {
            return Err(AllocatorError::UnknownVariant(id.to_string()));
        }
        tracing::debug!(variant = id, remaining = self.variants.len(), "variant removed");
        self.rebalance();
        Ok(())
    }

    /// Replace the variant carrying the same id, keeping its position.
    pub fn update(&mut self, variant: Variant) -> Result<(), AllocatorError> {
        let slot = self
            .variants
            .iter_mut()
            .find(|v| v.id == variant.id)
            .ok_or_else(|| AllocatorError::UnknownVariant(variant.id.clone()))?;
        *slot = variant;
        self.rebalance();
        Ok(())
    }

    /// Append a new variant labelled with the next free letter and shrink
    /// the others to make room. Returns the id of the new variant.
    ///
    /// An empty editor starts over at `A` with the whole traffic.
    pub fn add(&mut self) -> Result<String, AllocatorError> {
        if self.variants.is_empty() {
            self.variants = add_variant(&[], VARIANT_LETTERS[0], 1.0);
            return Ok(VARIANT_LETTERS[0].to_string());
        }
        let id = self.free_letter()?;
        let traffic = next_traffic(self.variants.len());
        self.variants = add_variant(&self.variants, id, traffic);
        tracing::debug!(variant = id, traffic, "variant added");
        Ok(id.to_string())
    }

    /// Slider view of the current variants, ordered by id.
    pub fn stack(&self) -> TrafficStack {
        TrafficStack::build(&self.variants, true)
    }

    /// Apply released slider handle positions.
    ///
    /// The positions are resolved against [`Self::stack`], then written
    /// back by variant id so the editor's own order is untouched.
    pub fn drag(&mut self, positions: &[f64]) -> Result<(), AllocatorError> {
        let updated = self.stack().apply(positions)?;
        let by_id: HashMap<&str, f64> = updated.iter().map(|v| (v.id.as_str(), v.traffic)).collect();
        for variant in &mut self.variants {
            if let Some(traffic) = by_id.get(variant.id.as_str()) {
                variant.traffic = *traffic;
            }
        }
        self.rebalance();
        Ok(())
    }

    /// First letter after the last variant's id that no variant uses yet.
    fn free_letter(&self) -> Result<&'static str, AllocatorError> {
        let candidate = next_letter(&self.variants)?;
        VARIANT_LETTERS
            .iter()
            .skip_while(|l| **l != candidate)
            .find(|l| !self.variants.iter().any(|v| v.id == **l))
            .copied()
            .ok_or_else(|| AllocatorError::UnknownLetter(candidate.to_string()))
    }

    fn rebalance(&mut self) {
        if 1.0 - self.sum() > SUM_TOLERANCE {
            tracing::debug!(sum = self.sum(), "traffic below 100%, redistributing");
            self.variants = reaffect_traffic(&self.variants);
        }
    }
}
