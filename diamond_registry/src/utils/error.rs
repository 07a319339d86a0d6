use alloy_primitives::Address;

use crate::types::{FacetCutAction, Selector};

/// Diamond Registry Result
pub type DiamondResult<T> = Result<T, DiamondError>;

/// Diamond Registry Errors
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DiamondError {
    /// The caller is not the contract owner
    #[error("caller {caller} is not the contract owner {owner}")]
    Unauthorized { caller: Address, owner: Address },
    /// The cut batch is malformed or conflicts with the selector table
    #[error("invalid diamond cut: {0}")]
    InvalidCut(#[from] CutError),
    /// The initializer of a cut batch failed. The batch was discarded.
    #[error("initializer {init} failed: {reason}")]
    InitializerFailed {
        init: Address,
        reason: Box<DiamondError>,
    },
    /// No facet is routed for the selector
    #[error("function does not exist: no facet is routed for selector {0}")]
    UnroutedSelector(Selector),
    /// Calldata must carry at least a 4-byte selector
    #[error("calldata of {0} bytes is too short to carry a selector")]
    CalldataTooShort(usize),
    /// A facet reverted while executing a routed call
    #[error("facet {facet} reverted: {reason}")]
    FacetExecution { facet: Address, reason: String },
    /// The facet was reached with a selector it does not implement
    #[error("facet does not implement selector {0}")]
    UnknownFunction(Selector),
    /// The new owner is the zero address
    #[error("new owner is the zero address")]
    ZeroOwner,
    /// A one-shot initializer already ran against this storage
    #[error("already initialized")]
    AlreadyInitialized,
    /// The call target is not a diamond hosted by the chain
    #[error("{0} is not a diamond")]
    NotADiamond(Address),
    /// ABI encoding or decoding issue
    #[error("decoding error: {0}")]
    DecodingError(String),
    /// Unknown/Custom error
    #[error("{0}")]
    Custom(String),
}

/// Reasons a cut batch is rejected before (or while) it is applied.
/// Every variant names the offending selector or facet.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CutError {
    #[error("no facets to cut")]
    EmptyCut,
    #[error("no selectors in facet cut for {facet}")]
    NoSelectorsInFacetCut { facet: Address },
    #[error("selector {0} appears more than once in the batch")]
    DuplicateSelector(Selector),
    #[error("action {action:?} requires a non-zero facet address")]
    ZeroFacetAddress { action: FacetCutAction },
    #[error("facet {0} has no code")]
    FacetHasNoCode(Address),
    #[error("can't add selector {selector}, it is already routed to {facet}")]
    SelectorAlreadyRegistered { selector: Selector, facet: Address },
    #[error("selector {0} is not routed to any facet")]
    SelectorNotRegistered(Selector),
    #[error("can't replace selector {selector} with the facet it already routes to ({facet})")]
    ReplaceWithSameFacet { selector: Selector, facet: Address },
    #[error("remove facet address must be the zero address, got {0}")]
    RemoveFacetAddressMustBeZero(Address),
    #[error("unknown facet cut action {0}")]
    InvalidAction(u8),
    #[error("initializer {0} has no code")]
    InitializerHasNoCode(Address),
    #[error("initializer {0} was given without calldata")]
    InitCalldataEmpty(Address),
    #[error("initializer calldata was given with the zero address as target")]
    InitAddressZero,
}

/// Wraps an ABI error into `DiamondError::DecodingError`
pub fn decoding_err<E: std::fmt::Display>(err: E) -> DiamondError {
    DiamondError::DecodingError(err.to_string())
}
