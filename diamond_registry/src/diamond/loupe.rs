//! Read-only introspection over the facet registry

use alloy_primitives::{Address, FixedBytes};

use crate::{
    state::DiamondStorage,
    types::{FacetEntry, Selector},
};

impl DiamondStorage {
    /// Every facet with at least one routed selector, in registry order
    pub fn facet_addresses(&self) -> Vec<Address> {
        self.facet_addresses.clone()
    }

    /// Selectors routed to `facet`. Empty for an unknown facet.
    pub fn facet_function_selectors(&self, facet: Address) -> Vec<Selector> {
        self.facet_function_selectors
            .get(&facet)
            .map(|entry| entry.function_selectors.clone())
            .unwrap_or_default()
    }

    /// Facet routed for `selector`, `None` if unrouted
    pub fn facet_address(&self, selector: Selector) -> Option<Address> {
        self.selector_to_facet_and_position
            .get(&selector)
            .map(|slot| slot.facet_address)
    }

    /// The whole routing table, grouped by facet
    pub fn facets(&self) -> Vec<FacetEntry> {
        self.facet_addresses
            .iter()
            .map(|facet| FacetEntry {
                facet_address: *facet,
                function_selectors: self.facet_function_selectors(*facet),
            })
            .collect()
    }

    /// ERC-165
    pub fn supports_interface(&self, interface_id: FixedBytes<4>) -> bool {
        self.supported_interfaces
            .get(&interface_id)
            .copied()
            .unwrap_or(false)
    }
}
