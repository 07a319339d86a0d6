//! Persistent storage namespace shared by a diamond and all of its facets

use std::collections::{BTreeMap, HashMap};

use alloy_primitives::{keccak256, Address, FixedBytes, U256};

use crate::types::Selector;

/// Position of a selector: the facet it routes to, and its index in that facet's selector list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FacetAddressAndPosition {
    pub facet_address: Address,
    pub function_selector_position: usize,
}

/// Selectors of a facet, and the facet's index in `facet_addresses`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FacetFunctionSelectors {
    pub function_selectors: Vec<Selector>,
    pub facet_address_position: usize,
}

/// Word storage shared by facets, addressed through `StorageRegion`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WordStorage {
    slots: BTreeMap<U256, U256>,
}

impl WordStorage {
    /// Reads a storage word. Unwritten slots read as zero.
    pub fn sload(&self, slot: U256) -> U256 {
        self.slots.get(&slot).copied().unwrap_or_default()
    }

    /// Writes a storage word. Writing zero clears the slot.
    pub fn sstore(&mut self, slot: U256, value: U256) {
        if value.is_zero() {
            self.slots.remove(&slot);
        } else {
            self.slots.insert(slot, value);
        }
    }
}

/// The single storage namespace of a diamond.
///
/// The selector table is the source of truth for dispatch; the facet registry
/// (`facet_function_selectors`, `facet_addresses`) is derived from it and is
/// maintained by `diamond::registry` only. Cloning produces the shadow copy an
/// atomic unit runs against.
///
/// Facets never hold it mutably: they get a `CallContext`, which hands out
/// the word storage and gated entry points for the owner and the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiamondStorage {
    /// selector => facet address and selector position
    pub(crate) selector_to_facet_and_position: HashMap<Selector, FacetAddressAndPosition>,
    /// facet address => selectors and facet position
    pub(crate) facet_function_selectors: HashMap<Address, FacetFunctionSelectors>,
    /// Facets holding at least one selector
    pub(crate) facet_addresses: Vec<Address>,
    /// ERC-165 flags
    pub(crate) supported_interfaces: HashMap<FixedBytes<4>, bool>,
    /// Contract owner
    pub(crate) contract_owner: Address,
    pub(crate) words: WordStorage,
}

impl DiamondStorage {
    pub(crate) fn new(owner: Address) -> Self {
        Self {
            selector_to_facet_and_position: HashMap::new(),
            facet_function_selectors: HashMap::new(),
            facet_addresses: Vec::new(),
            supported_interfaces: HashMap::new(),
            contract_owner: owner,
            words: WordStorage::default(),
        }
    }

    /// Read-only view of the facet word storage
    pub fn words(&self) -> &WordStorage {
        &self.words
    }

    /// Sets an ERC-165 flag
    pub(crate) fn set_supported_interface(&mut self, interface_id: FixedBytes<4>, supported: bool) {
        self.supported_interfaces.insert(interface_id, supported);
    }
}

/// A facet's region of the shared word storage.
///
/// The base slot is `keccak256(namespace)`; the facet addresses its fields as
/// `base + offset`. Two facets must use distinct namespaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StorageRegion {
    base: U256,
}

impl StorageRegion {
    pub fn new(namespace: &str) -> Self {
        Self {
            base: U256::from_be_bytes(keccak256(namespace.as_bytes()).0),
        }
    }

    pub fn base(&self) -> U256 {
        self.base
    }

    pub fn slot(&self, offset: u64) -> U256 {
        self.base.wrapping_add(U256::from(offset))
    }

    pub fn load(&self, words: &WordStorage, offset: u64) -> U256 {
        words.sload(self.slot(offset))
    }

    pub fn store(&self, words: &mut WordStorage, offset: u64, value: U256) {
        words.sstore(self.slot(offset), value);
    }

    pub fn load_address(&self, words: &WordStorage, offset: u64) -> Address {
        let word = self.load(words, offset).to_be_bytes::<32>();
        Address::from_slice(&word[12..])
    }

    pub fn store_address(&self, words: &mut WordStorage, offset: u64, address: Address) {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(address.as_slice());
        self.store(words, offset, U256::from_be_bytes(word));
    }

    pub fn load_bool(&self, words: &WordStorage, offset: u64) -> bool {
        !self.load(words, offset).is_zero()
    }

    pub fn store_bool(&self, words: &mut WordStorage, offset: u64, value: bool) {
        self.store(words, offset, U256::from(value as u8));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwritten_slot_reads_zero() {
        let words = WordStorage::default();
        assert_eq!(words.sload(U256::from(7)), U256::ZERO);
    }

    #[test]
    fn test_zero_write_clears_slot() {
        let mut words = WordStorage::default();
        words.sstore(U256::from(1), U256::from(5));
        words.sstore(U256::from(1), U256::ZERO);
        assert_eq!(words, WordStorage::default());
    }

    #[test]
    fn test_regions_do_not_alias() {
        let vault = StorageRegion::new("diamond.standard.vault.storage");
        let token = StorageRegion::new("diamond.standard.erc20.storage");
        assert_ne!(vault.base(), token.base());

        let mut words = WordStorage::default();
        vault.store(&mut words, 0, U256::from(11));
        token.store(&mut words, 0, U256::from(22));
        assert_eq!(vault.load(&words, 0), U256::from(11));
        assert_eq!(token.load(&words, 0), U256::from(22));
    }

    #[test]
    fn test_region_address_and_bool_fields() {
        let region = StorageRegion::new("test.region");
        let mut words = WordStorage::default();
        let keeper = Address::repeat_byte(0xab);

        region.store_address(&mut words, 3, keeper);
        region.store_bool(&mut words, 4, true);

        assert_eq!(region.load_address(&words, 3), keeper);
        assert!(region.load_bool(&words, 4));
        assert!(!region.load_bool(&words, 5));
    }

    #[test]
    fn test_new_storage_is_empty_with_owner() {
        let owner = Address::repeat_byte(0x01);
        let storage = DiamondStorage::new(owner);
        assert_eq!(storage.contract_owner, owner);
        assert!(storage.facet_addresses.is_empty());
        assert!(storage.selector_to_facet_and_position.is_empty());
        assert_eq!(storage.words(), &WordStorage::default());
    }
}
