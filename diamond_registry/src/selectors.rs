//! Selector derivation for facet deployments
//!
//! A selector is the first four bytes of the keccak-256 hash of a function's
//! canonical signature, e.g. `transfer(address,uint256)`.

use std::collections::HashSet;

use alloy_primitives::keccak256;
use serde::{Deserialize, Serialize};

use crate::{
    types::Selector,
    utils::error::{DiamondError, DiamondResult},
};

/// Returns the selector of a canonical function signature
pub fn selector(signature: &str) -> DiamondResult<Selector> {
    validate_signature(signature)?;
    let hash = keccak256(signature.as_bytes());
    Ok(Selector::from_slice(&hash[..4]))
}

/// Shape check only: `name(args)` with no whitespace and balanced parentheses.
/// Argument types are not validated.
fn validate_signature(signature: &str) -> DiamondResult<()> {
    let invalid = |reason: &str| {
        Err(DiamondError::DecodingError(format!(
            "invalid function signature `{}`: {}",
            signature, reason
        )))
    };

    let Some(open) = signature.find('(') else {
        return invalid("missing argument list");
    };
    if open == 0 {
        return invalid("missing function name");
    }
    if !signature.ends_with(')') {
        return invalid("argument list is not closed");
    }
    if signature.chars().any(char::is_whitespace) {
        return invalid("canonical signatures contain no whitespace");
    }

    let mut depth = 0i32;
    for c in signature[open..].chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return invalid("unbalanced parentheses");
        }
    }
    if depth != 0 {
        return invalid("unbalanced parentheses");
    }

    Ok(())
}

/// Ordered, duplicate-free list of selectors
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectorList(Vec<Selector>);

impl SelectorList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hashes every signature. Duplicated signatures are kept once.
    pub fn from_signatures<I, S>(signatures: I) -> DiamondResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        for signature in signatures {
            list.push(selector(signature.as_ref())?);
        }
        Ok(list)
    }

    /// Appends a selector unless it is already listed.
    /// Returns `true` if it was appended.
    pub fn push(&mut self, selector: Selector) -> bool {
        if self.contains(&selector) {
            return false;
        }
        self.0.push(selector);
        true
    }

    /// Builder-style append
    pub fn with(mut self, selectors: impl IntoIterator<Item = Selector>) -> Self {
        for selector in selectors {
            self.push(selector);
        }
        self
    }

    /// Builder-style removal, keeps the order of the remaining selectors
    pub fn without(mut self, selectors: impl IntoIterator<Item = Selector>) -> Self {
        let excluded: HashSet<Selector> = selectors.into_iter().collect();
        self.0.retain(|selector| !excluded.contains(selector));
        self
    }

    pub fn contains(&self, selector: &Selector) -> bool {
        self.0.contains(selector)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Selector> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Selector] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Selector> {
        self.0
    }
}

impl FromIterator<Selector> for SelectorList {
    fn from_iter<T: IntoIterator<Item = Selector>>(iter: T) -> Self {
        Self::new().with(iter)
    }
}

impl IntoIterator for SelectorList {
    type Item = Selector;
    type IntoIter = std::vec::IntoIter<Selector>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<SelectorList> for Vec<Selector> {
    fn from(value: SelectorList) -> Self {
        value.0
    }
}
