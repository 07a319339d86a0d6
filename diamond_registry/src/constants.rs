//! Diamond Registry Constants

use alloy_primitives::FixedBytes;
use alloy_sol_types::SolCall;

use crate::abi::{
    diamondCutCall, facetAddressCall, facetAddressesCall, facetFunctionSelectorsCall, facetsCall,
    ownerCall, supportsInterfaceCall, transferOwnershipCall,
};

/// Storage namespace owned by `DiamondInit`
pub const DIAMOND_INIT_STORAGE_NAMESPACE: &str = "diamond.standard.init.storage";

/// Prefix of the deterministic address derivation used by the local chain
pub const DEPLOYMENT_DOMAIN: &[u8] = b"diamond-registry/deploy";

/// Interface id: the XOR of all selectors of an interface
fn interface_id(selectors: &[[u8; 4]]) -> FixedBytes<4> {
    let mut id = [0u8; 4];
    for selector in selectors {
        for (byte, other) in id.iter_mut().zip(selector) {
            *byte ^= other;
        }
    }
    FixedBytes::new(id)
}

/// ERC-165 interface id of `IERC165`
pub fn erc165_interface_id() -> FixedBytes<4> {
    interface_id(&[supportsInterfaceCall::SELECTOR])
}

/// ERC-165 interface id of `IDiamondCut`
pub fn diamond_cut_interface_id() -> FixedBytes<4> {
    interface_id(&[diamondCutCall::SELECTOR])
}

/// ERC-165 interface id of `IDiamondLoupe`
pub fn diamond_loupe_interface_id() -> FixedBytes<4> {
    interface_id(&[
        facetsCall::SELECTOR,
        facetFunctionSelectorsCall::SELECTOR,
        facetAddressesCall::SELECTOR,
        facetAddressCall::SELECTOR,
    ])
}

/// ERC-165 interface id of `IERC173`
pub fn erc173_interface_id() -> FixedBytes<4> {
    interface_id(&[ownerCall::SELECTOR, transferOwnershipCall::SELECTOR])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erc165_id_is_standard() {
        assert_eq!(erc165_interface_id(), FixedBytes::new([0x01, 0xff, 0xc9, 0xa7]));
    }

    #[test]
    fn diamond_cut_id_is_standard() {
        assert_eq!(
            diamond_cut_interface_id(),
            FixedBytes::new([0x1f, 0x93, 0x1c, 0x1c])
        );
    }

    #[test]
    fn diamond_loupe_id_is_standard() {
        assert_eq!(
            diamond_loupe_interface_id(),
            FixedBytes::new([0x48, 0xe2, 0xb0, 0x93])
        );
    }

    #[test]
    fn erc173_id_is_standard() {
        assert_eq!(erc173_interface_id(), FixedBytes::new([0x7f, 0x58, 0x28, 0xd0]));
    }
}
