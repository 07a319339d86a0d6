use std::fmt;

use alloy_primitives::{Address, Bytes, FixedBytes};
use serde::{Deserialize, Serialize};

use crate::{
    abi,
    utils::error::{CutError, DiamondError},
};

/// 4-byte function selector
pub type Selector = FixedBytes<4>;

/// Action of a single cut instruction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FacetCutAction {
    Add = 0,
    Replace = 1,
    Remove = 2,
}

impl TryFrom<u8> for FacetCutAction {
    type Error = DiamondError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Add),
            1 => Ok(Self::Replace),
            2 => Ok(Self::Remove),
            other => Err(CutError::InvalidAction(other).into()),
        }
    }
}

impl fmt::Display for FacetCutAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Add => "add",
            Self::Replace => "replace",
            Self::Remove => "remove",
        };
        f.write_str(name)
    }
}

/// One instruction of a cut batch
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCut {
    pub facet_address: Address,
    pub action: FacetCutAction,
    pub function_selectors: Vec<Selector>,
}

impl FacetCut {
    /// Routes `selectors` to `facet`
    pub fn add(facet: Address, selectors: impl IntoIterator<Item = Selector>) -> Self {
        Self {
            facet_address: facet,
            action: FacetCutAction::Add,
            function_selectors: selectors.into_iter().collect(),
        }
    }

    /// Re-routes already routed `selectors` to `facet`
    pub fn replace(facet: Address, selectors: impl IntoIterator<Item = Selector>) -> Self {
        Self {
            facet_address: facet,
            action: FacetCutAction::Replace,
            function_selectors: selectors.into_iter().collect(),
        }
    }

    /// Unroutes `selectors`. The facet address of a removal is always zero.
    pub fn remove(selectors: impl IntoIterator<Item = Selector>) -> Self {
        Self {
            facet_address: Address::ZERO,
            action: FacetCutAction::Remove,
            function_selectors: selectors.into_iter().collect(),
        }
    }
}

impl TryFrom<abi::FacetCut> for FacetCut {
    type Error = DiamondError;

    fn try_from(value: abi::FacetCut) -> Result<Self, Self::Error> {
        Ok(Self {
            facet_address: value.facetAddress,
            action: FacetCutAction::try_from(value.action)?,
            function_selectors: value.functionSelectors,
        })
    }
}

impl From<&FacetCut> for abi::FacetCut {
    fn from(value: &FacetCut) -> Self {
        Self {
            facetAddress: value.facet_address,
            action: value.action as u8,
            functionSelectors: value.function_selectors.clone(),
        }
    }
}

/// Optional initializer of a cut batch, executed in the diamond's storage context
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitCall {
    pub target: Address,
    pub calldata: Bytes,
}

impl InitCall {
    pub fn new(target: Address, calldata: impl Into<Bytes>) -> Self {
        Self {
            target,
            calldata: calldata.into(),
        }
    }

    /// Maps the ABI `(_init, _calldata)` pair to an optional initializer.
    /// A zero target with empty calldata means "no initializer".
    pub fn from_abi(target: Address, calldata: Bytes) -> Result<Option<Self>, DiamondError> {
        match (target.is_zero(), calldata.is_empty()) {
            (true, true) => Ok(None),
            (true, false) => Err(CutError::InitAddressZero.into()),
            (false, true) => Err(CutError::InitCalldataEmpty(target).into()),
            (false, false) => Ok(Some(Self { target, calldata })),
        }
    }
}

/// A facet together with every selector currently routed to it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetEntry {
    pub facet_address: Address,
    pub function_selectors: Vec<Selector>,
}

impl From<FacetEntry> for abi::Facet {
    fn from(value: FacetEntry) -> Self {
        Self {
            facetAddress: value.facet_address,
            functionSelectors: value.function_selectors,
        }
    }
}

impl From<abi::Facet> for FacetEntry {
    fn from(value: abi::Facet) -> Self {
        Self {
            facet_address: value.facetAddress,
            function_selectors: value.functionSelectors,
        }
    }
}

/// Constructor arguments of a diamond
#[derive(Clone, Copy, Debug)]
pub struct DiamondArgs {
    /// Initial contract owner, the only address allowed to cut
    pub owner: Address,
    /// Deployed `DiamondCutFacet`, routed by the constructor
    pub diamond_cut_facet: Address,
}
