//! Ownership gate: a single controller, transferable in one step

use alloy_primitives::Address;

use crate::{
    journal::{JournalEntry, LogType},
    state::DiamondStorage,
    utils::error::{DiamondError, DiamondResult},
};

impl DiamondStorage {
    /// Current controller
    pub fn owner(&self) -> Address {
        self.contract_owner
    }

    /// Returns Err if `caller` is not the contract owner
    pub fn enforce_is_contract_owner(&self, caller: Address) -> DiamondResult<()> {
        if caller != self.contract_owner {
            return Err(DiamondError::Unauthorized {
                caller,
                owner: self.contract_owner,
            });
        }
        Ok(())
    }

    /// Hands control to `new_owner`, effective immediately
    pub(crate) fn transfer_ownership(
        &mut self,
        journal: &mut Vec<JournalEntry>,
        caller: Address,
        new_owner: Address,
    ) -> DiamondResult<()> {
        self.enforce_is_contract_owner(caller)?;
        if new_owner.is_zero() {
            return Err(DiamondError::ZeroOwner);
        }

        let previous_owner = self.contract_owner;
        self.contract_owner = new_owner;

        JournalEntry::new(LogType::OwnershipTransferred)
            .note(format!("{} -> {}", previous_owner, new_owner))
            .commit(journal);
        Ok(())
    }
}
