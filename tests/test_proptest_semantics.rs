//! Property-based checks over the semantics tables and the element tree.
//!
//! Scripts are generated from the surface names each block's table knows,
//! so binding, folding and removal run against realistic statements.
#![cfg(feature = "proptest")]

use gradle_dsl::{Arity, BlockKind, BuildFileModel, Dialect, DslValue, EffectKind, properties};
use proptest::prelude::*;

// ============================================================================
// PROPTEST STRATEGIES
// ============================================================================

fn arb_dialect() -> impl Strategy<Value = Dialect> {
    prop_oneof![Just(Dialect::Groovy), Just(Dialect::Kotlin)]
}

fn arb_block() -> impl Strategy<Value = BlockKind> {
    prop_oneof![
        Just(BlockKind::Android),
        Just(BlockKind::DefaultConfig),
        Just(BlockKind::Abi),
        Just(BlockKind::AdbOptions),
        Just(BlockKind::KotlinOptions),
    ]
}

/// Surface names, including some no table knows.
fn arb_surface_name() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => prop::sample::select(vec![
            "compileSdkVersion", "compileSdk", "minSdk", "minSdkVersion", "include", "exclude",
            "installOptions", "setInstallOptions", "timeOutInMs", "jvmTarget", "reset", "enable",
        ])
        .prop_map(str::to_owned),
        1 => "[a-z][a-zA-Z]{0,10}",
    ]
}

fn arb_arity() -> impl Strategy<Value = Arity> {
    prop_oneof![Just(Arity::Property), (0u8..4).prop_map(Arity::Exactly)]
}

/// `installOptions` statements for one adbOptions block.
fn arb_install_options(dialect: Dialect) -> impl Strategy<Value = String> {
    prop::collection::vec(prop::collection::vec("[a-z]{1,4}", 1..3), 0..4).prop_map(move |statements| {
        let body: Vec<String> = statements
            .iter()
            .map(|args| {
                let quoted: Vec<String> = args.iter().map(|arg| format!("\"-{arg}\"")).collect();
                match dialect {
                    Dialect::Groovy => format!("        installOptions {}", quoted.join(", ")),
                    Dialect::Kotlin => format!("        installOptions({})", quoted.join(", ")),
                }
            })
            .collect();
        format!(
            "android {{\n    adbOptions {{\n        timeOutInMs = 5\n{}\n    }}\n}}\n",
            body.join("\n")
        )
    })
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn lookup_is_deterministic(
        block in arb_block(),
        dialect in arb_dialect(),
        name in arb_surface_name(),
        arity in arb_arity(),
    ) {
        let table = block.external_to_model_map(dialect);
        prop_assert_eq!(table.lookup(&name, arity), table.lookup(&name, arity));
        if let Some(effect) = table.lookup(&name, arity) {
            prop_assert!(block.properties().contains(&effect.property));
        }
    }

    #[test]
    fn install_options_fold_to_every_argument(
        (dialect, text) in arb_dialect().prop_flat_map(|dialect| (Just(dialect), arb_install_options(dialect)))
    ) {
        let expected: Vec<String> = text
            .lines()
            .filter(|line| line.contains("installOptions"))
            .flat_map(|line| line.split('"').skip(1).step_by(2).map(str::to_owned).collect::<Vec<_>>())
            .collect();

        let mut file = BuildFileModel::parse(&text, dialect);
        prop_assert!(file.diagnostics().is_empty());
        let mut adb = file.block_at(&[BlockKind::Android, BlockKind::AdbOptions]).unwrap();
        let model = adb.property(properties::INSTALL_OPTIONS);
        let effects: Vec<_> = model
            .elements()
            .iter()
            .filter_map(|&id| model_effect(&model, id))
            .collect();
        prop_assert!(effects.iter().all(|&effect| effect == EffectKind::AugmentList));

        let folded = model.value::<Vec<String>>();
        if expected.is_empty() {
            prop_assert_eq!(folded, None);
        } else {
            prop_assert_eq!(folded, Some(expected));
        }
    }

    #[test]
    fn remove_is_idempotent(
        (dialect, text) in arb_dialect().prop_flat_map(|dialect| (Just(dialect), arb_install_options(dialect)))
    ) {
        let mut file = BuildFileModel::parse(&text, dialect);
        file.block_at(&[BlockKind::Android, BlockKind::AdbOptions])
            .unwrap()
            .remove_property(properties::INSTALL_OPTIONS.name)
            .unwrap();
        let once = file.apply_changes();

        let removed_again = file
            .block_at(&[BlockKind::Android, BlockKind::AdbOptions])
            .unwrap()
            .remove_property(properties::INSTALL_OPTIONS.name)
            .unwrap();
        prop_assert_eq!(removed_again, 0);
        prop_assert_eq!(file.apply_changes(), once.clone());

        let mut reparsed = BuildFileModel::parse(&once, dialect);
        let mut adb = reparsed.block_at(&[BlockKind::Android, BlockKind::AdbOptions]).unwrap();
        prop_assert!(!adb.property(properties::INSTALL_OPTIONS).is_present());
        prop_assert_eq!(
            adb.property(properties::TIME_OUT_IN_MS).dsl_value(),
            Some(DslValue::Integer(5))
        );
    }
}

fn model_effect(model: &gradle_dsl::ResolvedPropertyModel<'_>, id: gradle_dsl::ElementId) -> Option<EffectKind> {
    model.tree().get(id)?.effect().map(|effect| effect.effect)
}
