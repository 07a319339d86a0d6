//! Deployment initializer
//!
//! Runs once, in the diamond's storage context, as the initializer of the
//! bootstrap cut. It records the vault configuration tuple in its own storage
//! region and registers the ERC-165 interfaces the registry facets implement.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use serde::{Deserialize, Serialize};

use crate::{
    abi::initCall,
    constants::{
        diamond_cut_interface_id, diamond_loupe_interface_id, erc165_interface_id,
        erc173_interface_id, DIAMOND_INIT_STORAGE_NAMESPACE,
    },
    state::{DiamondStorage, StorageRegion, WordStorage},
    types::Selector,
    utils::{
        common::{decode_call, function_selector},
        error::{DiamondError, DiamondResult},
    },
};

use super::{CallContext, FacetCode};

// Field offsets inside the init region
const INITIALIZED: u64 = 0;
const POOL: u64 = 1;
const PROTOCOL_FEE: u64 = 2;
const MAX_TOTAL_SUPPLY: u64 = 3;
const BASE_THRESHOLD: u64 = 4;
const LIMIT_THRESHOLD: u64 = 5;
const PERIOD: u64 = 6;
const MIN_TICK_MOVE: u64 = 7;
const MAX_TWAP_DEVIATION: u64 = 8;
const TWAP_DURATION: u64 = 9;
const KEEPER: u64 = 10;

/// Facet-specific configuration passed to `init(...)`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitConfig {
    pub pool: Address,
    pub protocol_fee: U256,
    pub max_total_supply: U256,
    pub base_threshold: i32,
    pub limit_threshold: i32,
    pub period: U256,
    pub min_tick_move: i32,
    pub max_twap_deviation: i32,
    pub twap_duration: u32,
    pub keeper: Address,
}

impl InitConfig {
    /// ABI-encoded `init(...)` call
    pub fn calldata(&self) -> Bytes {
        initCall {
            pool: self.pool,
            protocolFee: self.protocol_fee,
            maxTotalSupply: self.max_total_supply,
            baseThreshold: self.base_threshold,
            limitThreshold: self.limit_threshold,
            period: self.period,
            minTickMove: self.min_tick_move,
            maxTwapDeviation: self.max_twap_deviation,
            twapDuration: self.twap_duration,
            keeper: self.keeper,
        }
        .abi_encode()
        .into()
    }

    /// Reads the configuration recorded by `DiamondInit`, `None` before initialization
    pub fn load(storage: &DiamondStorage) -> Option<Self> {
        let region = init_region();
        let words = storage.words();
        if !region.load_bool(words, INITIALIZED) {
            return None;
        }

        let load_i32 = |offset| region.load(words, offset).saturating_to::<u32>() as i32;
        Some(Self {
            pool: region.load_address(words, POOL),
            protocol_fee: region.load(words, PROTOCOL_FEE),
            max_total_supply: region.load(words, MAX_TOTAL_SUPPLY),
            base_threshold: load_i32(BASE_THRESHOLD),
            limit_threshold: load_i32(LIMIT_THRESHOLD),
            period: region.load(words, PERIOD),
            min_tick_move: load_i32(MIN_TICK_MOVE),
            max_twap_deviation: load_i32(MAX_TWAP_DEVIATION),
            twap_duration: region.load(words, TWAP_DURATION).saturating_to::<u32>(),
            keeper: region.load_address(words, KEEPER),
        })
    }

    fn store(&self, words: &mut WordStorage) {
        let region = init_region();
        let store_i32 = |words: &mut WordStorage, offset, value: i32| {
            region.store(words, offset, U256::from(value as u32))
        };

        region.store_address(words, POOL, self.pool);
        region.store(words, PROTOCOL_FEE, self.protocol_fee);
        region.store(words, MAX_TOTAL_SUPPLY, self.max_total_supply);
        store_i32(words, BASE_THRESHOLD, self.base_threshold);
        store_i32(words, LIMIT_THRESHOLD, self.limit_threshold);
        region.store(words, PERIOD, self.period);
        store_i32(words, MIN_TICK_MOVE, self.min_tick_move);
        store_i32(words, MAX_TWAP_DEVIATION, self.max_twap_deviation);
        region.store(words, TWAP_DURATION, U256::from(self.twap_duration));
        region.store_address(words, KEEPER, self.keeper);
        region.store_bool(words, INITIALIZED, true);
    }
}

impl From<initCall> for InitConfig {
    fn from(value: initCall) -> Self {
        Self {
            pool: value.pool,
            protocol_fee: value.protocolFee,
            max_total_supply: value.maxTotalSupply,
            base_threshold: value.baseThreshold,
            limit_threshold: value.limitThreshold,
            period: value.period,
            min_tick_move: value.minTickMove,
            max_twap_deviation: value.maxTwapDeviation,
            twap_duration: value.twapDuration,
            keeper: value.keeper,
        }
    }
}

fn init_region() -> StorageRegion {
    StorageRegion::new(DIAMOND_INIT_STORAGE_NAMESPACE)
}

/// One-shot initializer module. Never routed: it is only reached as the
/// initializer of a cut.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiamondInit;

impl FacetCode for DiamondInit {
    fn name(&self) -> String {
        "DiamondInit".to_string()
    }

    fn selectors(&self) -> Vec<Selector> {
        vec![Selector::new(initCall::SELECTOR)]
    }

    fn call(&self, ctx: &mut CallContext<'_>, calldata: &[u8]) -> DiamondResult<Bytes> {
        let selector = function_selector(calldata)?;
        if selector.0 != initCall::SELECTOR {
            return Err(DiamondError::UnknownFunction(selector));
        }
        if init_region().load_bool(ctx.words(), INITIALIZED) {
            return Err(DiamondError::AlreadyInitialized);
        }

        let config = InitConfig::from(decode_call::<initCall>(calldata)?);
        config.store(ctx.words_mut());

        for interface_id in [
            erc165_interface_id(),
            diamond_cut_interface_id(),
            diamond_loupe_interface_id(),
            erc173_interface_id(),
        ] {
            ctx.set_supported_interface(interface_id, true);
        }

        tracing::info!(diamond = %ctx.this(), pool = %config.pool, keeper = %config.keeper, "diamond initialized");
        Ok(initCall::abi_encode_returns(&()).into())
    }
}
