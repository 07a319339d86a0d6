//! Utility and helper functions needed for:
//! - ABI decoding of calldata and return data
//! - Error handling

pub(crate) mod common;
pub mod error;
