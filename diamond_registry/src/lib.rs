pub mod abi;
pub mod chain;
pub mod client;
pub mod constants;
pub mod diamond;
pub mod facets;
pub mod journal;
pub mod orchestrator;
pub mod selectors;
pub mod state;
pub mod types;
pub mod utils;

pub use chain::{CodeRegistry, LocalChain};
pub use client::DiamondClient;
pub use diamond::Diamond;
pub use facets::{
    CallContext, DiamondCutFacet, DiamondInit, DiamondLoupeFacet, FacetCode, InitConfig,
    OwnershipFacet,
};
pub use journal::{JournalEntry, LogType};
pub use orchestrator::{DeploymentManifest, DeploymentReport, Orchestrator};
pub use selectors::{selector, SelectorList};
pub use types::{DiamondArgs, FacetCut, FacetCutAction, FacetEntry, InitCall, Selector};
pub use utils::error::{CutError, DiamondError, DiamondResult};
