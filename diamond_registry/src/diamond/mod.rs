//! The diamond: one address, one storage namespace, many facets

pub mod cut;
pub(crate) mod dispatch;
pub(crate) mod loupe;
pub(crate) mod ownership;
// As a safety measure, registry mutations stay inside `crate::diamond`, where only the cut processor calls them.
pub(in crate::diamond) mod registry;

use alloy_primitives::Address;
use alloy_sol_types::SolCall;

use crate::{
    abi::diamondCutCall,
    chain::CodeRegistry,
    facets::CallContext,
    journal::JournalEntry,
    state::DiamondStorage,
    types::{DiamondArgs, FacetCut, Selector},
    utils::error::{DiamondError, DiamondResult},
};

/// A deployed diamond
#[derive(Clone, Debug)]
pub struct Diamond {
    address: Address,
    storage: DiamondStorage,
    journal: Vec<JournalEntry>,
}

impl Diamond {
    /// Constructor: sets the owner and routes `diamondCut` to the given cut facet
    pub(crate) fn new(
        address: Address,
        args: DiamondArgs,
        code: &CodeRegistry,
    ) -> DiamondResult<Self> {
        if args.owner.is_zero() {
            return Err(DiamondError::ZeroOwner);
        }

        let mut storage = DiamondStorage::new(args.owner);
        let mut journal = Vec::new();
        let mut ctx = CallContext {
            this: address,
            sender: args.owner,
            storage: &mut storage,
            journal: &mut journal,
            code,
        };
        cut::diamond_cut(
            &mut ctx,
            &[FacetCut::add(
                args.diamond_cut_facet,
                [Selector::new(diamondCutCall::SELECTOR)],
            )],
            None,
        )?;

        Ok(Self {
            address,
            storage,
            journal,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Read-only view of the storage namespace
    pub fn storage(&self) -> &DiamondStorage {
        &self.storage
    }

    /// Committed change records, oldest first
    pub fn journal(&self) -> &[JournalEntry] {
        &self.journal
    }
}
