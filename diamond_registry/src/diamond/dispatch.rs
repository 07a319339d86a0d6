//! Dispatcher: routes every call through the selector table

use alloy_primitives::{Address, Bytes};

use crate::{
    chain::CodeRegistry,
    facets::CallContext,
    journal::JournalEntry,
    state::DiamondStorage,
    utils::{
        common::function_selector,
        error::{DiamondError, DiamondResult},
    },
};

use super::Diamond;

impl Diamond {
    /// Executes `calldata` as one atomic unit.
    ///
    /// The routed facet runs against a shadow copy of the storage. The copy and
    /// the journal records of the call are committed only if the facet succeeds.
    pub fn call(
        &mut self,
        code: &CodeRegistry,
        sender: Address,
        calldata: &[u8],
    ) -> DiamondResult<Bytes> {
        let mut staged = self.storage.clone();
        let mut staged_journal = Vec::new();

        let output = dispatch(
            self.address,
            &mut staged,
            &mut staged_journal,
            code,
            sender,
            calldata,
        )?;

        self.storage = staged;
        self.journal.append(&mut staged_journal);
        Ok(output)
    }

    /// Executes `calldata` and discards every mutation it makes
    pub fn static_call(
        &self,
        code: &CodeRegistry,
        sender: Address,
        calldata: &[u8],
    ) -> DiamondResult<Bytes> {
        let mut scratch = self.storage.clone();
        let mut scratch_journal = Vec::new();
        dispatch(
            self.address,
            &mut scratch,
            &mut scratch_journal,
            code,
            sender,
            calldata,
        )
    }
}

fn dispatch(
    this: Address,
    storage: &mut DiamondStorage,
    journal: &mut Vec<JournalEntry>,
    code: &CodeRegistry,
    sender: Address,
    calldata: &[u8],
) -> DiamondResult<Bytes> {
    let selector = function_selector(calldata)?;
    let facet = storage
        .facet_address(selector)
        .ok_or(DiamondError::UnroutedSelector(selector))?;
    // Facet code is checked at cut time and never destroyed.
    let facet_code = code.get(facet).ok_or_else(|| DiamondError::FacetExecution {
        facet,
        reason: "facet has no code".to_string(),
    })?;

    tracing::debug!(diamond = %this, %sender, %selector, %facet, "dispatching call");

    let mut ctx = CallContext {
        this,
        sender,
        storage,
        journal,
        code,
    };
    facet_code.call(&mut ctx, calldata)
}
