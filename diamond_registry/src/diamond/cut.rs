//! Cut processor
//!
//! Applies a batch of facet cuts and the optional initializer as one atomic
//! unit. The batch runs against a shadow copy of the storage; the copy replaces
//! the live storage only once every instruction and the initializer succeeded.
//!
//! ```plain
//!  live storage ──clone──► staged ──instruction 1..n──► staged' ──init──► staged''
//!       ▲                                                                  │
//!       └────────────────────────── commit on Ok ──────────────────────────┘
//! ```

use std::collections::{HashMap, HashSet};

use alloy_primitives::Address;

use crate::{
    chain::CodeRegistry,
    facets::CallContext,
    journal::{JournalEntry, LogType},
    state::DiamondStorage,
    types::{FacetCut, FacetCutAction, InitCall, Selector},
    utils::error::{CutError, DiamondError, DiamondResult},
};

/// Applies `cuts`, then runs `init` in the diamond's storage context.
///
/// Only the contract owner may cut. On any error the storage and journal of
/// `ctx` are left untouched.
pub fn diamond_cut(
    ctx: &mut CallContext<'_>,
    cuts: &[FacetCut],
    init: Option<InitCall>,
) -> DiamondResult<()> {
    let result = try_diamond_cut(ctx, cuts, init);
    if let Err(err) = &result {
        tracing::warn!(diamond = %ctx.this, caller = %ctx.sender, %err, "diamond cut rejected");
    }
    result
}

fn try_diamond_cut(
    ctx: &mut CallContext<'_>,
    cuts: &[FacetCut],
    init: Option<InitCall>,
) -> DiamondResult<()> {
    ctx.storage.enforce_is_contract_owner(ctx.sender)?;
    validate_batch(cuts)?;

    let mut staged = ctx.storage.clone();
    let mut staged_journal = Vec::new();

    for cut in cuts {
        apply_instruction(&mut staged, ctx.code, cut)?;
        JournalEntry::new(LogType::DiamondCut)
            .facet(cut.facet_address)
            .action(cut.action)
            .selectors(&cut.function_selectors)
            .commit(&mut staged_journal);
    }

    if let Some(init) = init {
        initialize_diamond_cut(ctx, &mut staged, &mut staged_journal, init)?;
    }

    *ctx.storage = staged;
    ctx.journal.append(&mut staged_journal);
    Ok(())
}

/// Batch-level checks that do not depend on the selector table.
///
/// A selector may appear in several instructions only when every earlier
/// appearance is a removal, which keeps Remove-then-Add within one batch legal.
fn validate_batch(cuts: &[FacetCut]) -> DiamondResult<()> {
    if cuts.is_empty() {
        return Err(CutError::EmptyCut.into());
    }

    let mut last_action: HashMap<Selector, FacetCutAction> = HashMap::new();
    for cut in cuts {
        if cut.function_selectors.is_empty() {
            return Err(CutError::NoSelectorsInFacetCut {
                facet: cut.facet_address,
            }
            .into());
        }

        let mut in_instruction = HashSet::with_capacity(cut.function_selectors.len());
        for selector in &cut.function_selectors {
            if !in_instruction.insert(*selector) {
                return Err(CutError::DuplicateSelector(*selector).into());
            }
            if let Some(previous) = last_action.insert(*selector, cut.action) {
                if previous != FacetCutAction::Remove {
                    return Err(CutError::DuplicateSelector(*selector).into());
                }
            }
        }
    }

    Ok(())
}

/// Applies one instruction against the table as mutated by the previous ones
fn apply_instruction(
    storage: &mut DiamondStorage,
    code: &CodeRegistry,
    cut: &FacetCut,
) -> DiamondResult<()> {
    let facet = cut.facet_address;
    match cut.action {
        FacetCutAction::Add => {
            enforce_has_facet_code(code, facet, cut.action)?;
            for selector in &cut.function_selectors {
                storage.add_function(facet, *selector)?;
            }
        }
        FacetCutAction::Replace => {
            enforce_has_facet_code(code, facet, cut.action)?;
            for selector in &cut.function_selectors {
                storage.replace_function(facet, *selector)?;
            }
        }
        FacetCutAction::Remove => {
            if !facet.is_zero() {
                return Err(CutError::RemoveFacetAddressMustBeZero(facet).into());
            }
            for selector in &cut.function_selectors {
                storage.remove_function(*selector)?;
            }
        }
    }
    Ok(())
}

fn enforce_has_facet_code(
    code: &CodeRegistry,
    facet: Address,
    action: FacetCutAction,
) -> DiamondResult<()> {
    if facet.is_zero() {
        return Err(CutError::ZeroFacetAddress { action }.into());
    }
    if !code.has_code(facet) {
        return Err(CutError::FacetHasNoCode(facet).into());
    }
    Ok(())
}

/// Runs the initializer with the staged storage as its storage (delegated context)
fn initialize_diamond_cut(
    ctx: &CallContext<'_>,
    staged: &mut DiamondStorage,
    staged_journal: &mut Vec<JournalEntry>,
    init: InitCall,
) -> DiamondResult<()> {
    let InitCall { target, calldata } = init;
    if target.is_zero() {
        return Err(CutError::InitAddressZero.into());
    }
    if calldata.is_empty() {
        return Err(CutError::InitCalldataEmpty(target).into());
    }
    let init_code = ctx
        .code
        .get(target)
        .ok_or(CutError::InitializerHasNoCode(target))?;

    let mut init_ctx = CallContext {
        this: ctx.this,
        sender: ctx.sender,
        storage: staged,
        journal: staged_journal,
        code: ctx.code,
    };
    init_code
        .call(&mut init_ctx, &calldata)
        .map_err(|reason| DiamondError::InitializerFailed {
            init: target,
            reason: Box::new(reason),
        })?;

    JournalEntry::new(LogType::Initializer)
        .facet(target)
        .note(init_code.name())
        .commit(staged_journal);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use alloy_primitives::{Bytes, U256};
    use proptest::prelude::*;

    use crate::{facets::FacetCode, state::StorageRegion};

    const OWNER: Address = Address::new([0x01; 20]);

    fn sel(byte: u8) -> Selector {
        Selector::new([byte; 4])
    }

    /// Test facet with no routed behavior
    struct Inert;

    impl FacetCode for Inert {
        fn name(&self) -> String {
            "Inert".to_string()
        }

        fn selectors(&self) -> Vec<Selector> {
            vec![]
        }

        fn call(&self, _ctx: &mut CallContext<'_>, _calldata: &[u8]) -> DiamondResult<Bytes> {
            Ok(Bytes::new())
        }
    }

    /// Initializer that writes a word, then fails if the calldata says so
    struct FlagInit;

    impl FacetCode for FlagInit {
        fn name(&self) -> String {
            "FlagInit".to_string()
        }

        fn selectors(&self) -> Vec<Selector> {
            vec![]
        }

        fn call(&self, ctx: &mut CallContext<'_>, calldata: &[u8]) -> DiamondResult<Bytes> {
            StorageRegion::new("test.flag").store(ctx.words_mut(), 0, U256::from(1));
            if calldata.first() == Some(&0xff) {
                return Err(DiamondError::Custom("init reverted".to_string()));
            }
            Ok(Bytes::new())
        }
    }

    fn facet_addr(byte: u8) -> Address {
        Address::repeat_byte(0x10 + byte)
    }

    fn code_registry() -> CodeRegistry {
        let mut code = CodeRegistry::default();
        for byte in 0..4 {
            code.insert(facet_addr(byte), Arc::new(Inert));
        }
        code.insert(Address::repeat_byte(0xee), Arc::new(FlagInit));
        code
    }

    fn run(
        storage: &mut DiamondStorage,
        journal: &mut Vec<JournalEntry>,
        code: &CodeRegistry,
        sender: Address,
        cuts: &[FacetCut],
        init: Option<InitCall>,
    ) -> DiamondResult<()> {
        let mut ctx = CallContext {
            this: Address::repeat_byte(0xd1),
            sender,
            storage,
            journal,
            code,
        };
        diamond_cut(&mut ctx, cuts, init)
    }

    #[test]
    fn test_add_replace_remove() {
        let code = code_registry();
        let mut storage = DiamondStorage::new(OWNER);
        let mut journal = vec![];

        run(
            &mut storage,
            &mut journal,
            &code,
            OWNER,
            &[FacetCut::add(facet_addr(0), [sel(1), sel(2), sel(3)])],
            None,
        )
        .unwrap();
        run(
            &mut storage,
            &mut journal,
            &code,
            OWNER,
            &[
                FacetCut::replace(facet_addr(1), [sel(2)]),
                FacetCut::remove([sel(3)]),
            ],
            None,
        )
        .unwrap();

        assert_eq!(storage.facet_address(sel(1)), Some(facet_addr(0)));
        assert_eq!(storage.facet_address(sel(2)), Some(facet_addr(1)));
        assert_eq!(storage.facet_address(sel(3)), None);
        assert_eq!(journal.len(), 3);
        storage.assert_consistent();
    }

    #[test]
    fn test_non_owner_is_rejected() {
        let code = code_registry();
        let mut storage = DiamondStorage::new(OWNER);
        let mut journal = vec![];
        let stranger = Address::repeat_byte(0x99);

        let result = run(
            &mut storage,
            &mut journal,
            &code,
            stranger,
            &[FacetCut::add(facet_addr(0), [sel(1)])],
            None,
        );

        assert_eq!(
            result,
            Err(DiamondError::Unauthorized {
                caller: stranger,
                owner: OWNER
            })
        );
        assert_eq!(storage, DiamondStorage::new(OWNER));
        assert!(journal.is_empty());
    }

    #[test]
    fn test_malformed_batches() {
        let code = code_registry();
        let cases: Vec<(Vec<FacetCut>, CutError)> = vec![
            (vec![], CutError::EmptyCut),
            (
                vec![FacetCut::add(facet_addr(0), [])],
                CutError::NoSelectorsInFacetCut {
                    facet: facet_addr(0),
                },
            ),
            (
                vec![FacetCut::add(facet_addr(0), [sel(1), sel(1)])],
                CutError::DuplicateSelector(sel(1)),
            ),
            (
                vec![
                    FacetCut::add(facet_addr(0), [sel(1)]),
                    FacetCut::add(facet_addr(1), [sel(1)]),
                ],
                CutError::DuplicateSelector(sel(1)),
            ),
            (
                vec![FacetCut::add(Address::ZERO, [sel(1)])],
                CutError::ZeroFacetAddress {
                    action: FacetCutAction::Add,
                },
            ),
            (
                vec![FacetCut::add(Address::repeat_byte(0x77), [sel(1)])],
                CutError::FacetHasNoCode(Address::repeat_byte(0x77)),
            ),
            (
                vec![FacetCut::replace(facet_addr(0), [sel(1)])],
                CutError::SelectorNotRegistered(sel(1)),
            ),
            (
                vec![FacetCut::remove([sel(1)])],
                CutError::SelectorNotRegistered(sel(1)),
            ),
            (
                vec![FacetCut {
                    facet_address: facet_addr(0),
                    action: FacetCutAction::Remove,
                    function_selectors: vec![sel(1)],
                }],
                CutError::RemoveFacetAddressMustBeZero(facet_addr(0)),
            ),
        ];

        for (cuts, expected) in cases {
            let mut storage = DiamondStorage::new(OWNER);
            let mut journal = vec![];
            let result = run(&mut storage, &mut journal, &code, OWNER, &cuts, None);
            assert_eq!(result, Err(DiamondError::InvalidCut(expected)));
            assert_eq!(storage, DiamondStorage::new(OWNER));
            assert!(journal.is_empty());
        }
    }

    #[test]
    fn test_failed_instruction_rolls_back_whole_batch() {
        let code = code_registry();
        let mut storage = DiamondStorage::new(OWNER);
        let mut journal = vec![];
        run(
            &mut storage,
            &mut journal,
            &code,
            OWNER,
            &[FacetCut::add(facet_addr(0), [sel(1)])],
            None,
        )
        .unwrap();
        let before = storage.clone();
        let journal_before = journal.clone();

        let result = run(
            &mut storage,
            &mut journal,
            &code,
            OWNER,
            &[
                FacetCut::add(facet_addr(1), [sel(2), sel(3)]),
                FacetCut::add(facet_addr(2), [sel(1)]),
            ],
            None,
        );

        assert_eq!(
            result,
            Err(DiamondError::InvalidCut(CutError::SelectorAlreadyRegistered {
                selector: sel(1),
                facet: facet_addr(0),
            }))
        );
        assert_eq!(storage, before);
        assert_eq!(journal, journal_before);
    }

    #[test]
    fn test_remove_then_add_in_one_batch() {
        let code = code_registry();
        let mut storage = DiamondStorage::new(OWNER);
        let mut journal = vec![];
        run(
            &mut storage,
            &mut journal,
            &code,
            OWNER,
            &[FacetCut::add(facet_addr(0), [sel(1)])],
            None,
        )
        .unwrap();

        run(
            &mut storage,
            &mut journal,
            &code,
            OWNER,
            &[
                FacetCut::remove([sel(1)]),
                FacetCut::add(facet_addr(1), [sel(1)]),
            ],
            None,
        )
        .unwrap();

        assert_eq!(storage.facet_address(sel(1)), Some(facet_addr(1)));
        assert_eq!(storage.facet_addresses(), vec![facet_addr(1)]);
    }

    #[test]
    fn test_initializer_runs_in_same_storage() {
        let code = code_registry();
        let mut storage = DiamondStorage::new(OWNER);
        let mut journal = vec![];

        run(
            &mut storage,
            &mut journal,
            &code,
            OWNER,
            &[FacetCut::add(facet_addr(0), [sel(1)])],
            Some(InitCall::new(Address::repeat_byte(0xee), vec![0x01])),
        )
        .unwrap();

        assert_eq!(StorageRegion::new("test.flag").load(storage.words(), 0), U256::from(1));
        assert_eq!(journal.last().map(|entry| entry.log_type), Some(LogType::Initializer));
    }

    #[test]
    fn test_initializer_failure_discards_table_mutations() {
        let code = code_registry();
        let mut storage = DiamondStorage::new(OWNER);
        let mut journal = vec![];
        let init = Address::repeat_byte(0xee);

        let result = run(
            &mut storage,
            &mut journal,
            &code,
            OWNER,
            &[FacetCut::add(facet_addr(0), [sel(1)])],
            Some(InitCall::new(init, vec![0xff])),
        );

        assert_eq!(
            result,
            Err(DiamondError::InitializerFailed {
                init,
                reason: Box::new(DiamondError::Custom("init reverted".to_string())),
            })
        );
        assert_eq!(storage, DiamondStorage::new(OWNER));
        assert!(journal.is_empty());
    }

    #[test]
    fn test_initializer_without_code_is_rejected() {
        let code = code_registry();
        let mut storage = DiamondStorage::new(OWNER);
        let mut journal = vec![];
        let init = Address::repeat_byte(0x55);

        let result = run(
            &mut storage,
            &mut journal,
            &code,
            OWNER,
            &[FacetCut::add(facet_addr(0), [sel(1)])],
            Some(InitCall::new(init, vec![0x01])),
        );

        assert_eq!(
            result,
            Err(DiamondError::InvalidCut(CutError::InitializerHasNoCode(init)))
        );
        assert_eq!(storage, DiamondStorage::new(OWNER));
    }

    #[test]
    fn test_initializer_alone_is_rejected() {
        let code = code_registry();
        let mut storage = DiamondStorage::new(OWNER);
        let mut journal = vec![];

        let result = run(
            &mut storage,
            &mut journal,
            &code,
            OWNER,
            &[],
            Some(InitCall::new(Address::repeat_byte(0xee), vec![0x01])),
        );

        assert_eq!(result, Err(DiamondError::InvalidCut(CutError::EmptyCut)));
        assert_eq!(StorageRegion::new("test.flag").load(storage.words(), 0), U256::ZERO);
    }

    /// Reference model of the table: selector => facet
    fn model_apply(model: &mut HashMap<Selector, Address>, cuts: &[FacetCut]) -> bool {
        let mut staged = model.clone();
        for cut in cuts {
            for selector in &cut.function_selectors {
                let ok = match cut.action {
                    FacetCutAction::Add => staged.insert(*selector, cut.facet_address).is_none(),
                    FacetCutAction::Replace => match staged.get(selector) {
                        Some(current) if *current != cut.facet_address => {
                            staged.insert(*selector, cut.facet_address);
                            true
                        }
                        _ => false,
                    },
                    FacetCutAction::Remove => staged.remove(selector).is_some(),
                };
                if !ok {
                    return false;
                }
            }
        }
        *model = staged;
        true
    }

    fn cut_strategy() -> impl Strategy<Value = FacetCut> {
        (0u8..3, 0u8..4, proptest::collection::vec(0u8..8, 1..4)).prop_map(
            |(action, facet, selectors)| {
                let mut unique: Vec<Selector> = Vec::new();
                for byte in selectors {
                    if !unique.contains(&sel(byte)) {
                        unique.push(sel(byte));
                    }
                }
                match action {
                    0 => FacetCut::add(facet_addr(facet), unique),
                    1 => FacetCut::replace(facet_addr(facet), unique),
                    _ => FacetCut::remove(unique),
                }
            },
        )
    }

    proptest! {
        // Multi-instruction batches: a batch commits iff it passes
        // `validate_batch` and every instruction applies in order against the
        // table as mutated by the earlier ones.
        #[test]
        fn test_table_matches_model(
            batches in proptest::collection::vec(proptest::collection::vec(cut_strategy(), 1..5), 1..16)
        ) {
            let code = code_registry();
            let mut storage = DiamondStorage::new(OWNER);
            let mut journal = vec![];
            let mut model: HashMap<Selector, Address> = HashMap::new();

            for cuts in batches {
                let before = storage.clone();
                let journal_before = journal.len();
                let result = run(&mut storage, &mut journal, &code, OWNER, &cuts, None);
                let accepted = validate_batch(&cuts).is_ok() && model_apply(&mut model, &cuts);

                prop_assert_eq!(result.is_ok(), accepted);
                if accepted {
                    prop_assert_eq!(journal.len(), journal_before + cuts.len());
                } else {
                    prop_assert_eq!(&storage, &before);
                    prop_assert_eq!(journal.len(), journal_before);
                }
                storage.assert_consistent();

                let routed: HashMap<Selector, Address> = storage
                    .facets()
                    .into_iter()
                    .flat_map(|entry| {
                        let facet = entry.facet_address;
                        entry.function_selectors.into_iter().map(move |s| (s, facet))
                    })
                    .collect();
                prop_assert_eq!(&routed, &model);

                // loupe queries are idempotent
                prop_assert_eq!(storage.facets(), storage.facets());
                prop_assert_eq!(storage.facet_addresses(), storage.facet_addresses());
            }
        }

        #[test]
        fn test_add_then_remove_restores_routing(
            existing in proptest::collection::vec(0u8..4, 1..4),
            added in proptest::collection::vec(4u8..8, 1..4),
        ) {
            let code = code_registry();
            let mut storage = DiamondStorage::new(OWNER);
            let mut journal = vec![];
            let existing: Vec<Selector> = existing.into_iter().map(sel).collect::<HashSet<_>>().into_iter().collect();
            let added: Vec<Selector> = added.into_iter().map(sel).collect::<HashSet<_>>().into_iter().collect();

            run(&mut storage, &mut journal, &code, OWNER, &[FacetCut::add(facet_addr(0), existing.clone())], None).unwrap();
            let routed_before: HashMap<Selector, Option<Address>> =
                existing.iter().map(|s| (*s, storage.facet_address(*s))).collect();

            run(&mut storage, &mut journal, &code, OWNER, &[FacetCut::add(facet_addr(1), added.clone())], None).unwrap();
            run(&mut storage, &mut journal, &code, OWNER, &[FacetCut::remove(added.clone())], None).unwrap();

            let routed_after: HashMap<Selector, Option<Address>> =
                existing.iter().map(|s| (*s, storage.facet_address(*s))).collect();
            prop_assert_eq!(routed_before, routed_after);
            prop_assert_eq!(storage.facet_addresses(), vec![facet_addr(0)]);
            prop_assert!(storage.facet_function_selectors(facet_addr(1)).is_empty());
            for selector in added {
                prop_assert_eq!(storage.facet_address(selector), None);
            }
        }
    }
}
