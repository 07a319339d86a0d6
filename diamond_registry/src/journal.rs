use alloy_primitives::Address;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::types::{FacetCutAction, Selector};

/// Kind of change recorded by a journal entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogType {
    /// One instruction of a committed cut batch
    DiamondCut,
    /// The initializer of a committed cut batch
    Initializer,
    /// Ownership moved to a new controller
    OwnershipTransferred,
}

/// Journal entry
///
/// Entries are an audit trail for off-chain observers. Nothing in the crate
/// reads them back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub log_type: LogType,
    pub facet: Option<Address>,
    pub action: Option<FacetCutAction>,
    pub selectors: Vec<Selector>,
    pub note: Option<String>,
}

/// Builder for journal entries
impl JournalEntry {
    /// Create a new instance of a journal entry
    /// Fills the `timestamp` and `log_type` fields
    pub fn new(log_type: LogType) -> Self {
        Self {
            timestamp: Utc::now().timestamp_millis(),
            log_type,
            facet: None,
            action: None,
            selectors: vec![],
            note: None,
        }
    }

    /// Fills the `facet` field of the entry
    pub fn facet(&mut self, facet: Address) -> &mut Self {
        self.facet = Some(facet);
        self
    }

    /// Fills the `action` field of the entry
    pub fn action(&mut self, action: FacetCutAction) -> &mut Self {
        self.action = Some(action);
        self
    }

    /// Fills the `selectors` field of the entry
    pub fn selectors(&mut self, selectors: &[Selector]) -> &mut Self {
        self.selectors = selectors.to_vec();
        self
    }

    /// Fills the `note` field of the entry
    pub fn note<S: AsRef<str>>(&mut self, text: S) -> &mut Self {
        self.note = Some(text.as_ref().to_string());
        self
    }

    /// Appends the entry to `journal` and emits it as a tracing event
    pub fn commit(&mut self, journal: &mut Vec<JournalEntry>) {
        tracing::info!(
            log_type = ?self.log_type,
            facet = ?self.facet,
            action = ?self.action,
            selectors = self.selectors.len(),
            note = self.note.as_deref().unwrap_or_default(),
            "journal entry"
        );
        journal.push(self.clone());
    }
}
