//! Facet registry bookkeeping
//!
//! Keeps the selector table, the per-facet selector lists and the facet
//! address list consistent with each other. Removal swaps the last element
//! into the vacated position, so enumeration order is not stable across
//! removals.

use alloy_primitives::Address;

use crate::{
    state::{DiamondStorage, FacetAddressAndPosition, FacetFunctionSelectors},
    types::Selector,
    utils::error::{CutError, DiamondError, DiamondResult},
};

fn out_of_sync(facet: Address) -> DiamondError {
    DiamondError::Custom(format!(
        "facet registry is out of sync with the selector table for {}",
        facet
    ))
}

impl DiamondStorage {
    /// Routes an unrouted `selector` to `facet`
    pub(in crate::diamond) fn add_function(&mut self, facet: Address, selector: Selector) -> DiamondResult<()> {
        if let Some(existing) = self.selector_to_facet_and_position.get(&selector) {
            return Err(CutError::SelectorAlreadyRegistered {
                selector,
                facet: existing.facet_address,
            }
            .into());
        }

        let facet_addresses = &mut self.facet_addresses;
        let entry = self
            .facet_function_selectors
            .entry(facet)
            .or_insert_with(|| {
                let facet_address_position = facet_addresses.len();
                facet_addresses.push(facet);
                FacetFunctionSelectors {
                    function_selectors: Vec::new(),
                    facet_address_position,
                }
            });

        let function_selector_position = entry.function_selectors.len();
        entry.function_selectors.push(selector);
        self.selector_to_facet_and_position.insert(
            selector,
            FacetAddressAndPosition {
                facet_address: facet,
                function_selector_position,
            },
        );
        Ok(())
    }

    /// Re-routes a routed `selector` to a different `facet`
    pub(in crate::diamond) fn replace_function(
        &mut self,
        facet: Address,
        selector: Selector,
    ) -> DiamondResult<()> {
        let current = self
            .selector_to_facet_and_position
            .get(&selector)
            .ok_or(CutError::SelectorNotRegistered(selector))?;
        if current.facet_address == facet {
            return Err(CutError::ReplaceWithSameFacet { selector, facet }.into());
        }

        self.remove_function(selector)?;
        self.add_function(facet, selector)
    }

    /// Unroutes `selector`. A facet that loses its last selector leaves the registry.
    pub(in crate::diamond) fn remove_function(&mut self, selector: Selector) -> DiamondResult<Address> {
        let removed = self
            .selector_to_facet_and_position
            .remove(&selector)
            .ok_or(CutError::SelectorNotRegistered(selector))?;
        let facet = removed.facet_address;
        let position = removed.function_selector_position;

        let entry = self
            .facet_function_selectors
            .get_mut(&facet)
            .ok_or_else(|| out_of_sync(facet))?;
        if position >= entry.function_selectors.len() {
            return Err(out_of_sync(facet));
        }
        entry.function_selectors.swap_remove(position);
        if let Some(moved) = entry.function_selectors.get(position) {
            if let Some(slot) = self.selector_to_facet_and_position.get_mut(moved) {
                slot.function_selector_position = position;
            }
        }

        let facet_is_empty = entry.function_selectors.is_empty();
        let facet_address_position = entry.facet_address_position;
        if facet_is_empty {
            self.facet_function_selectors.remove(&facet);
            if facet_address_position >= self.facet_addresses.len() {
                return Err(out_of_sync(facet));
            }
            self.facet_addresses.swap_remove(facet_address_position);
            if let Some(moved) = self.facet_addresses.get(facet_address_position) {
                if let Some(moved_entry) = self.facet_function_selectors.get_mut(moved) {
                    moved_entry.facet_address_position = facet_address_position;
                }
            }
        }

        Ok(facet)
    }

    /// Checks the cross-index invariants. Only used by tests.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        for (position, facet) in self.facet_addresses.iter().enumerate() {
            let entry = &self.facet_function_selectors[facet];
            assert_eq!(entry.facet_address_position, position);
            assert!(!entry.function_selectors.is_empty());
            for (selector_position, selector) in entry.function_selectors.iter().enumerate() {
                let slot = self.selector_to_facet_and_position[selector];
                assert_eq!(slot.facet_address, *facet);
                assert_eq!(slot.function_selector_position, selector_position);
            }
        }
        assert_eq!(self.facet_addresses.len(), self.facet_function_selectors.len());
        let routed: usize = self
            .facet_function_selectors
            .values()
            .map(|entry| entry.function_selectors.len())
            .sum();
        assert_eq!(routed, self.selector_to_facet_and_position.len());
    }
}
