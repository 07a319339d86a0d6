//! Deployable facet code
//!
//! A facet is immutable code living at an address. When the diamond routes a
//! call to it, the facet executes in delegated context: it sees the diamond's
//! address and storage, and the original caller as `sender`.

pub mod cut;
pub mod init;
pub mod loupe;
pub mod ownership;

use alloy_primitives::{Address, Bytes, FixedBytes};

use crate::{
    chain::CodeRegistry,
    diamond::cut::diamond_cut,
    journal::JournalEntry,
    state::{DiamondStorage, WordStorage},
    types::{FacetCut, InitCall, Selector},
    utils::error::DiamondResult,
};

pub use cut::DiamondCutFacet;
pub use init::{DiamondInit, InitConfig};
pub use loupe::DiamondLoupeFacet;
pub use ownership::OwnershipFacet;

/// Execution context handed to a facet for one routed call.
///
/// A facet reads the whole namespace but writes only the word storage and the
/// ERC-165 flags. The owner and the selector table change solely through the
/// owner-gated `transfer_ownership` and `diamond_cut`.
///
/// ```compile_fail
/// # use diamond_registry::CallContext;
/// fn wipe(ctx: &mut CallContext<'_>) {
///     *ctx.storage = ctx.storage().clone();
/// }
/// ```
pub struct CallContext<'a> {
    /// The diamond the call runs in
    pub(crate) this: Address,
    /// The original caller
    pub(crate) sender: Address,
    /// The diamond's storage namespace, shared by every facet
    pub(crate) storage: &'a mut DiamondStorage,
    /// Journal of the current atomic unit. Discarded if the unit fails.
    pub(crate) journal: &'a mut Vec<JournalEntry>,
    /// Deployed code, for code-existence checks and delegated calls
    pub(crate) code: &'a CodeRegistry,
}

impl<'a> CallContext<'a> {
    /// The diamond the call runs in
    pub fn this(&self) -> Address {
        self.this
    }

    /// The original caller
    pub fn sender(&self) -> Address {
        self.sender
    }

    pub fn code(&self) -> &CodeRegistry {
        self.code
    }

    /// Read-only view of the namespace: loupe, owner and word storage
    pub fn storage(&self) -> &DiamondStorage {
        self.storage
    }

    pub fn words(&self) -> &WordStorage {
        &self.storage.words
    }

    pub fn words_mut(&mut self) -> &mut WordStorage {
        &mut self.storage.words
    }

    pub fn set_supported_interface(&mut self, interface_id: FixedBytes<4>, supported: bool) {
        self.storage.set_supported_interface(interface_id, supported);
    }

    /// Returns Err unless the caller is the contract owner
    pub fn enforce_is_contract_owner(&self) -> DiamondResult<()> {
        self.storage.enforce_is_contract_owner(self.sender)
    }

    /// Hands control to `new_owner`. Only the current owner may call it.
    pub fn transfer_ownership(&mut self, new_owner: Address) -> DiamondResult<()> {
        self.storage
            .transfer_ownership(self.journal, self.sender, new_owner)
    }

    /// Runs the cut processor on behalf of the caller
    pub fn diamond_cut(&mut self, cuts: &[FacetCut], init: Option<InitCall>) -> DiamondResult<()> {
        diamond_cut(self, cuts, init)
    }
}

/// Code of a deployed facet
pub trait FacetCode {
    /// Human readable name, used in deployment reports
    fn name(&self) -> String;

    /// Every selector the facet implements
    fn selectors(&self) -> Vec<Selector>;

    /// Executes `calldata` (selector included) against the context.
    /// Return data and errors are passed to the caller unchanged.
    fn call(&self, ctx: &mut CallContext<'_>, calldata: &[u8]) -> DiamondResult<Bytes>;
}
