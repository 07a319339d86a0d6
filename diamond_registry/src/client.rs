//! Typed client for the registry-management functions of a diamond.
//!
//! Every method encodes an ABI call, sends it through the chain to the
//! diamond's dispatcher and decodes the returned data. Nothing bypasses the
//! selector table.

use alloy_primitives::{Address, Bytes, FixedBytes};
use alloy_sol_types::SolCall;

use crate::{
    abi::{
        self, diamondCutCall, facetAddressCall, facetAddressesCall, facetFunctionSelectorsCall,
        facetsCall, ownerCall, supportsInterfaceCall, transferOwnershipCall,
    },
    chain::LocalChain,
    types::{FacetCut, FacetEntry, InitCall, Selector},
    utils::{common::decode_returns, error::DiamondResult},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiamondClient {
    diamond: Address,
}

impl DiamondClient {
    pub fn new(diamond: Address) -> Self {
        Self { diamond }
    }

    pub fn address(&self) -> Address {
        self.diamond
    }

    /// Sends `diamondCut(cuts, init, calldata)` as `sender`
    pub fn diamond_cut(
        &self,
        chain: &mut LocalChain,
        sender: Address,
        cuts: &[FacetCut],
        init: Option<&InitCall>,
    ) -> DiamondResult<()> {
        let (target, calldata) = match init {
            Some(init) => (init.target, init.calldata.clone()),
            None => (Address::ZERO, Bytes::new()),
        };
        let call = diamondCutCall {
            _diamondCut: cuts.iter().map(abi::FacetCut::from).collect(),
            _init: target,
            _calldata: calldata,
        };
        let data = chain.call(sender, self.diamond, &call.abi_encode())?;
        decode_returns::<diamondCutCall>(&data)?;
        Ok(())
    }

    pub fn facets(&self, chain: &LocalChain) -> DiamondResult<Vec<FacetEntry>> {
        let data = self.view(chain, facetsCall {})?;
        let facets = decode_returns::<facetsCall>(&data)?.facets_;
        Ok(facets.into_iter().map(FacetEntry::from).collect())
    }

    pub fn facet_addresses(&self, chain: &LocalChain) -> DiamondResult<Vec<Address>> {
        let data = self.view(chain, facetAddressesCall {})?;
        Ok(decode_returns::<facetAddressesCall>(&data)?.facetAddresses_)
    }

    pub fn facet_function_selectors(
        &self,
        chain: &LocalChain,
        facet: Address,
    ) -> DiamondResult<Vec<Selector>> {
        let data = self.view(chain, facetFunctionSelectorsCall { _facet: facet })?;
        Ok(decode_returns::<facetFunctionSelectorsCall>(&data)?.facetFunctionSelectors_)
    }

    /// Facet routed for `selector`. The ABI returns the zero address for an
    /// unrouted selector, which maps to `None`.
    pub fn facet_address(
        &self,
        chain: &LocalChain,
        selector: Selector,
    ) -> DiamondResult<Option<Address>> {
        let data = self.view(
            chain,
            facetAddressCall {
                _functionSelector: selector,
            },
        )?;
        let facet = decode_returns::<facetAddressCall>(&data)?.facetAddress_;
        Ok((!facet.is_zero()).then_some(facet))
    }

    pub fn supports_interface(
        &self,
        chain: &LocalChain,
        interface_id: FixedBytes<4>,
    ) -> DiamondResult<bool> {
        let data = self.view(
            chain,
            supportsInterfaceCall {
                _interfaceId: interface_id,
            },
        )?;
        Ok(decode_returns::<supportsInterfaceCall>(&data)?._0)
    }

    pub fn owner(&self, chain: &LocalChain) -> DiamondResult<Address> {
        let data = self.view(chain, ownerCall {})?;
        Ok(decode_returns::<ownerCall>(&data)?.owner_)
    }

    pub fn transfer_ownership(
        &self,
        chain: &mut LocalChain,
        sender: Address,
        new_owner: Address,
    ) -> DiamondResult<()> {
        let call = transferOwnershipCall {
            _newOwner: new_owner,
        };
        let data = chain.call(sender, self.diamond, &call.abi_encode())?;
        decode_returns::<transferOwnershipCall>(&data)?;
        Ok(())
    }

    fn view<C: SolCall>(&self, chain: &LocalChain, call: C) -> DiamondResult<Bytes> {
        chain.static_call(Address::ZERO, self.diamond, &call.abi_encode())
    }
}
