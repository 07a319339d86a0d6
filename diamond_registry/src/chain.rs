//! Local execution host
//!
//! Stands in for the chain: it holds deployed facet code by address, hosts
//! diamonds and executes calls one at a time. Every call is an atomic unit.

use std::{collections::HashMap, fmt, sync::Arc};

use alloy_primitives::{keccak256, Address, Bytes};

use crate::{
    constants::DEPLOYMENT_DOMAIN,
    diamond::Diamond,
    facets::FacetCode,
    journal::JournalEntry,
    types::DiamondArgs,
    utils::error::{DiamondError, DiamondResult},
};

/// Deployed facet code, immutable once inserted
#[derive(Clone, Default)]
pub struct CodeRegistry {
    code: HashMap<Address, Arc<dyn FacetCode>>,
}

impl CodeRegistry {
    pub fn get(&self, address: Address) -> Option<&dyn FacetCode> {
        self.code.get(&address).map(|code| code.as_ref())
    }

    pub fn has_code(&self, address: Address) -> bool {
        self.code.contains_key(&address)
    }

    pub(crate) fn insert(&mut self, address: Address, code: Arc<dyn FacetCode>) {
        self.code.insert(address, code);
    }
}

impl fmt::Debug for CodeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.code.iter().map(|(address, code)| (address, code.name())))
            .finish()
    }
}

/// Single-threaded chain hosting facets and diamonds
#[derive(Debug, Default)]
pub struct LocalChain {
    code: CodeRegistry,
    diamonds: HashMap<Address, Diamond>,
    nonces: HashMap<Address, u64>,
}

impl LocalChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deterministic address of the next deployment by `deployer`
    fn next_address(&mut self, deployer: Address) -> Address {
        let nonce = self.nonces.entry(deployer).or_insert(0);
        let mut preimage = Vec::with_capacity(DEPLOYMENT_DOMAIN.len() + 28);
        preimage.extend_from_slice(DEPLOYMENT_DOMAIN);
        preimage.extend_from_slice(deployer.as_slice());
        preimage.extend_from_slice(&nonce.to_be_bytes());
        *nonce += 1;
        Address::from_slice(&keccak256(preimage)[12..])
    }

    /// Deploys facet code and returns its address
    pub fn deploy<F: FacetCode + 'static>(&mut self, deployer: Address, code: F) -> Address {
        self.deploy_code(deployer, Arc::new(code))
    }

    /// Deploys already shared facet code and returns its address
    pub fn deploy_code(&mut self, deployer: Address, code: Arc<dyn FacetCode>) -> Address {
        let address = self.next_address(deployer);
        tracing::debug!(%deployer, %address, name = %code.name(), "deployed facet code");
        self.code.insert(address, code);
        address
    }

    /// Deploys a diamond; the constructor routes the given cut facet
    pub fn deploy_diamond(&mut self, deployer: Address, args: DiamondArgs) -> DiamondResult<Address> {
        let address = self.next_address(deployer);
        let diamond = Diamond::new(address, args, &self.code)?;
        tracing::info!(%deployer, %address, owner = %args.owner, "deployed diamond");
        self.diamonds.insert(address, diamond);
        Ok(address)
    }

    /// Sends a call to a diamond. Mutations are committed only on success.
    pub fn call(&mut self, sender: Address, to: Address, calldata: &[u8]) -> DiamondResult<Bytes> {
        let diamond = self
            .diamonds
            .get_mut(&to)
            .ok_or(DiamondError::NotADiamond(to))?;
        diamond.call(&self.code, sender, calldata)
    }

    /// Runs a call to a diamond without committing anything
    pub fn static_call(&self, sender: Address, to: Address, calldata: &[u8]) -> DiamondResult<Bytes> {
        let diamond = self
            .diamonds
            .get(&to)
            .ok_or(DiamondError::NotADiamond(to))?;
        diamond.static_call(&self.code, sender, calldata)
    }

    /// `true` for facet code and diamonds
    pub fn has_code(&self, address: Address) -> bool {
        self.code.has_code(address) || self.diamonds.contains_key(&address)
    }

    pub fn code(&self) -> &CodeRegistry {
        &self.code
    }

    pub fn diamond(&self, address: Address) -> Option<&Diamond> {
        self.diamonds.get(&address)
    }

    /// Committed change records of a diamond
    pub fn journal(&self, diamond: Address) -> DiamondResult<&[JournalEntry]> {
        self.diamond(diamond)
            .map(Diamond::journal)
            .ok_or(DiamondError::NotADiamond(diamond))
    }
}
