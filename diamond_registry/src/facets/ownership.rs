//! `IERC173` facet

use alloy_primitives::Bytes;
use alloy_sol_types::SolCall;

use crate::{
    abi::{ownerCall, transferOwnershipCall},
    types::Selector,
    utils::{
        common::{decode_call, function_selector},
        error::{DiamondError, DiamondResult},
    },
};

use super::{CallContext, FacetCode};

#[derive(Clone, Copy, Debug, Default)]
pub struct OwnershipFacet;

impl FacetCode for OwnershipFacet {
    fn name(&self) -> String {
        "OwnershipFacet".to_string()
    }

    fn selectors(&self) -> Vec<Selector> {
        vec![
            Selector::new(ownerCall::SELECTOR),
            Selector::new(transferOwnershipCall::SELECTOR),
        ]
    }

    fn call(&self, ctx: &mut CallContext<'_>, calldata: &[u8]) -> DiamondResult<Bytes> {
        let selector = function_selector(calldata)?;

        if selector.0 == ownerCall::SELECTOR {
            Ok(ownerCall::abi_encode_returns(&(ctx.storage().owner(),)).into())
        } else if selector.0 == transferOwnershipCall::SELECTOR {
            let call = decode_call::<transferOwnershipCall>(calldata)?;
            ctx.transfer_ownership(call._newOwner)?;
            Ok(transferOwnershipCall::abi_encode_returns(&()).into())
        } else {
            Err(DiamondError::UnknownFunction(selector))
        }
    }
}
