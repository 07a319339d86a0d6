//! `IDiamondCut` facet

use alloy_primitives::Bytes;
use alloy_sol_types::SolCall;

use crate::{
    abi::diamondCutCall,
    types::{FacetCut, InitCall, Selector},
    utils::{
        common::{decode_call, function_selector},
        error::{DiamondError, DiamondResult},
    },
};

use super::{CallContext, FacetCode};

/// Exposes the cut processor as `diamondCut(FacetCut[],address,bytes)`
#[derive(Clone, Copy, Debug, Default)]
pub struct DiamondCutFacet;

impl FacetCode for DiamondCutFacet {
    fn name(&self) -> String {
        "DiamondCutFacet".to_string()
    }

    fn selectors(&self) -> Vec<Selector> {
        vec![Selector::new(diamondCutCall::SELECTOR)]
    }

    fn call(&self, ctx: &mut CallContext<'_>, calldata: &[u8]) -> DiamondResult<Bytes> {
        let selector = function_selector(calldata)?;
        if selector.0 != diamondCutCall::SELECTOR {
            return Err(DiamondError::UnknownFunction(selector));
        }

        // authorization is reported before any decoding issue
        ctx.enforce_is_contract_owner()?;

        let call = decode_call::<diamondCutCall>(calldata)?;
        let cuts = call
            ._diamondCut
            .into_iter()
            .map(FacetCut::try_from)
            .collect::<DiamondResult<Vec<_>>>()?;
        let init = InitCall::from_abi(call._init, call._calldata)?;

        ctx.diamond_cut(&cuts, init)?;
        Ok(diamondCutCall::abi_encode_returns(&()).into())
    }
}
