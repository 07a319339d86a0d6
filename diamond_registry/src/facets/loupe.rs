//! `IDiamondLoupe` + `IERC165` facet

use alloy_primitives::Bytes;
use alloy_sol_types::SolCall;

use crate::{
    abi::{
        self, facetAddressCall, facetAddressesCall, facetFunctionSelectorsCall, facetsCall,
        supportsInterfaceCall,
    },
    types::Selector,
    utils::{
        common::{decode_call, function_selector},
        error::{DiamondError, DiamondResult},
    },
};

use super::{CallContext, FacetCode};

/// Read-only introspection over the diamond's selector table
#[derive(Clone, Copy, Debug, Default)]
pub struct DiamondLoupeFacet;

impl FacetCode for DiamondLoupeFacet {
    fn name(&self) -> String {
        "DiamondLoupeFacet".to_string()
    }

    fn selectors(&self) -> Vec<Selector> {
        [
            facetsCall::SELECTOR,
            facetFunctionSelectorsCall::SELECTOR,
            facetAddressesCall::SELECTOR,
            facetAddressCall::SELECTOR,
            supportsInterfaceCall::SELECTOR,
        ]
        .into_iter()
        .map(Selector::new)
        .collect()
    }

    fn call(&self, ctx: &mut CallContext<'_>, calldata: &[u8]) -> DiamondResult<Bytes> {
        let storage = ctx.storage();
        let selector = function_selector(calldata)?;

        let output = if selector.0 == facetsCall::SELECTOR {
            let facets: Vec<abi::Facet> = storage.facets().into_iter().map(Into::into).collect();
            facetsCall::abi_encode_returns(&(facets,))
        } else if selector.0 == facetFunctionSelectorsCall::SELECTOR {
            let call = decode_call::<facetFunctionSelectorsCall>(calldata)?;
            facetFunctionSelectorsCall::abi_encode_returns(&(
                storage.facet_function_selectors(call._facet),
            ))
        } else if selector.0 == facetAddressesCall::SELECTOR {
            facetAddressesCall::abi_encode_returns(&(storage.facet_addresses(),))
        } else if selector.0 == facetAddressCall::SELECTOR {
            let call = decode_call::<facetAddressCall>(calldata)?;
            let facet = storage
                .facet_address(call._functionSelector)
                .unwrap_or_default();
            facetAddressCall::abi_encode_returns(&(facet,))
        } else if selector.0 == supportsInterfaceCall::SELECTOR {
            let call = decode_call::<supportsInterfaceCall>(calldata)?;
            supportsInterfaceCall::abi_encode_returns(&(
                storage.supports_interface(call._interfaceId),
            ))
        } else {
            return Err(DiamondError::UnknownFunction(selector));
        };

        Ok(output.into())
    }
}
