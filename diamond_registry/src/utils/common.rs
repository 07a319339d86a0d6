//! Common utility and helper functions that are used across the project

use alloy_sol_types::SolCall;

use crate::types::Selector;

use super::error::*;

/// Returns the selector carried by the first four bytes of `calldata`
pub fn function_selector(calldata: &[u8]) -> DiamondResult<Selector> {
    if calldata.len() < 4 {
        return Err(DiamondError::CalldataTooShort(calldata.len()));
    }
    Ok(Selector::from_slice(&calldata[..4]))
}

/// Decodes selector-prefixed calldata into the call struct `C`
pub fn decode_call<C: SolCall>(calldata: &[u8]) -> DiamondResult<C> {
    C::abi_decode(calldata, true).map_err(decoding_err)
}

/// Returns `C::Return` from ABI-encoded return data
pub fn decode_returns<C: SolCall>(data: &[u8]) -> DiamondResult<C::Return> {
    C::abi_decode_returns(data, true).map_err(decoding_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{facetAddressCall, ownerCall};
    use alloy_primitives::Address;

    #[test]
    fn test_function_selector_short_calldata() {
        assert_eq!(
            function_selector(&[0x01, 0x02]),
            Err(DiamondError::CalldataTooShort(2))
        );
    }

    #[test]
    fn test_function_selector_ignores_arguments() {
        let calldata = facetAddressCall {
            _functionSelector: Selector::new([9; 4]),
        }
        .abi_encode();
        assert_eq!(
            function_selector(&calldata).unwrap(),
            Selector::new(facetAddressCall::SELECTOR)
        );
    }

    #[test]
    fn test_decode_call_rejects_foreign_selector() {
        let calldata = ownerCall {}.abi_encode();
        let result = decode_call::<facetAddressCall>(&calldata);
        assert!(matches!(result, Err(DiamondError::DecodingError(_))));
    }

    #[test]
    fn test_decode_returns() {
        let owner = Address::repeat_byte(0x77);
        let data = ownerCall::abi_encode_returns(&(owner,));
        assert_eq!(decode_returns::<ownerCall>(&data).unwrap().owner_, owner);
    }
}
