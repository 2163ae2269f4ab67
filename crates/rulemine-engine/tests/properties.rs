//! Property tests for the miners, the rule generator, and the validator.

use proptest::prelude::*;
use rulemine_core::prelude::*;
use rulemine_engine::prelude::*;
use std::collections::HashSet;

const COLUMNS: [&str; 6] = ["inf_a", "inf_b", "inf_c", "usr_x", "usr_y", "usr_z"];

fn table_strategy() -> impl Strategy<Value = FeatureTable> {
    prop::collection::vec(prop::collection::vec(any::<bool>(), COLUMNS.len()), 1..30).prop_map(
        |rows| {
            let schema = Schema::from_columns(&COLUMNS, &NamespacePrefixes::default()).unwrap();
            FeatureTable::from_rows(schema, &rows).unwrap()
        },
    )
}

fn support_strategy() -> impl Strategy<Value = f64> {
    prop::sample::select(vec![0.05, 0.1, 0.2, 0.34, 0.5, 0.75])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn frequent_itemsets_are_downward_closed(table in table_strategy(), s in support_strategy()) {
        let out = AprioriMiner::new().mine(&table, s).unwrap();
        let found: HashSet<&Itemset> = out.itemsets.iter().map(|f| &f.items).collect();
        for f in &out.itemsets {
            for subset in f.items.drop_one_subsets() {
                prop_assert!(found.contains(&subset), "{:?} frequent but {:?} is not", f.items, subset);
            }
        }
    }

    #[test]
    fn support_never_grows_with_the_itemset(table in table_strategy(), s in support_strategy()) {
        let out = AprioriMiner::new().mine(&table, s).unwrap();
        for f in &out.itemsets {
            prop_assert_eq!(f.count, table.support_count(f.items.ids()));
            for subset in f.items.drop_one_subsets() {
                prop_assert!(table.support_count(subset.ids()) >= f.count);
            }
        }
    }

    #[test]
    fn maximal_itemsets_are_frequent_and_incomparable(table in table_strategy(), s in support_strategy()) {
        let out = FpMaxMiner::new().mine(&table, s).unwrap();
        let threshold = rulemine_core::miner::min_count(s, table.num_rows());
        for (i, f) in out.itemsets.iter().enumerate() {
            prop_assert!(f.count >= threshold);
            for (j, g) in out.itemsets.iter().enumerate() {
                if i != j {
                    prop_assert!(!f.items.is_subset_of(&g.items));
                }
            }
        }
    }

    #[test]
    fn both_miners_agree_on_maximal_sets(table in table_strategy(), s in support_strategy()) {
        let frequent = AprioriMiner::new().mine(&table, s).unwrap();
        let mut expected: Vec<Itemset> = frequent
            .itemsets
            .iter()
            .filter(|f| !frequent.itemsets.iter().any(|g| f.items.is_proper_subset_of(&g.items)))
            .map(|f| f.items.clone())
            .collect();
        expected.sort();
        let maximal: Vec<Itemset> = FpMaxMiner::new()
            .mine(&table, s)
            .unwrap()
            .itemsets
            .into_iter()
            .map(|f| f.items)
            .collect();
        prop_assert_eq!(maximal, expected);
    }

    #[test]
    fn every_split_is_a_candidate(table in table_strategy(), s in support_strategy()) {
        let out = AprioriMiner::new().mine(&table, s).unwrap();
        let generated = RuleGenerator::new(0.0).unwrap().generate(&out).unwrap();
        let expected: usize = out
            .itemsets
            .iter()
            .filter(|f| f.items.len() >= 2)
            .map(|f| (1usize << f.items.len()) - 2)
            .sum();
        prop_assert_eq!(generated.candidates_considered, expected);
        prop_assert_eq!(generated.rules.len(), expected);
    }

    #[test]
    fn confidence_is_exact_and_bounded(
        table in table_strategy(),
        s in support_strategy(),
        c in 0.0f64..=1.0,
    ) {
        let out = AprioriMiner::new().mine(&table, s).unwrap();
        let generated = RuleGenerator::new(c).unwrap().generate(&out).unwrap();
        for rule in &generated.rules {
            let confidence = rule.confidence.unwrap();
            prop_assert!(confidence > 0.0 && confidence <= 1.0);
            prop_assert!(confidence >= c);
            let mut union: Vec<FeatureId> = rule.antecedent.ids().to_vec();
            union.extend_from_slice(rule.consequent.ids());
            let exact = table.support_count(&union) as f64
                / table.support_count(rule.antecedent.ids()) as f64;
            prop_assert!((confidence - exact).abs() < 1e-12);
        }
    }

    #[test]
    fn persisted_rules_point_from_influencer_to_user(
        table in table_strategy(),
        s in support_strategy(),
        maximal in any::<bool>(),
    ) {
        let mode = if maximal { MiningMode::MaximalOnly } else { MiningMode::Exhaustive };
        let config = MiningConfig { min_support: s, min_confidence: 0.0, mode, max_len: None };
        let run = MiningPipeline::new(config).run(&table).unwrap();
        for record in &run.document.rules {
            prop_assert!(record.antecedent.iter().all(|n| n.starts_with("inf_")));
            prop_assert!(record.consequent.iter().all(|n| n.starts_with("usr_")));
        }
    }

    #[test]
    fn validation_is_deterministic(
        training in table_strategy(),
        held_out in table_strategy(),
        s in support_strategy(),
    ) {
        let config = MiningConfig { min_support: s, min_confidence: 0.0, ..MiningConfig::default() };
        let rules = MiningPipeline::new(config).run(&training).unwrap().document.rules;
        let first = RuleValidator::new().validate(&rules, &held_out);
        let second = RuleValidator::new().validate(&rules, &held_out);
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        for r in &first.rules {
            prop_assert!((0.0..=1.0).contains(&r.accuracy));
            prop_assert!(r.hits <= r.covered);
        }
    }
}
