//! Property-based tests for the mining pipeline.
//!
//! Transactions are generated over a small alphabet so that every subset of
//! the item universe can be checked exhaustively against a brute-force count.

use basketforge::{encode, generate_rules, mine, MinerConfig, Transaction};
use proptest::prelude::*;
use std::collections::BTreeSet;

const ALPHABET: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

fn transactions_strategy() -> impl Strategy<Value = Vec<Transaction>> {
    prop::collection::vec(
        prop::collection::btree_set(0..ALPHABET.len(), 1..=ALPHABET.len()),
        1..20,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(row, items)| {
                Transaction::new(format!("client_{}", row), items.into_iter().map(|i| ALPHABET[i]))
            })
            .collect()
    })
}

/// Fraction of transactions containing every item in `items`
fn brute_force_support(transactions: &[Transaction], items: &[&str]) -> f64 {
    let hits = transactions
        .iter()
        .filter(|t| items.iter().all(|item| t.items.contains(*item)))
        .count();
    hits as f64 / transactions.len() as f64
}

/// Every non-empty subset of `items`
fn all_subsets<'a>(items: &[&'a str]) -> Vec<Vec<&'a str>> {
    (1..(1u32 << items.len()))
        .map(|mask| {
            items
                .iter()
                .enumerate()
                .filter(|(pos, _)| mask & (1 << pos) != 0)
                .map(|(_, item)| *item)
                .collect()
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_item_universe_matches_distinct_items(transactions in transactions_strategy()) {
        let table = encode(&transactions).unwrap();

        let distinct: BTreeSet<&str> = transactions
            .iter()
            .flat_map(|t| t.items.iter().map(String::as_str))
            .collect();
        prop_assert_eq!(table.n_items(), distinct.len());
        prop_assert_eq!(table.n_transactions(), transactions.len());

        // label <-> column is a bijection and rows decode to their input
        for (col, item) in table.items().iter().enumerate() {
            prop_assert_eq!(table.column_of(item), Some(col));
        }
        for (row, transaction) in transactions.iter().enumerate() {
            let expected: BTreeSet<&str> = transaction.items.iter().map(String::as_str).collect();
            prop_assert_eq!(table.row_items(row), expected);
        }
    }

    #[test]
    fn prop_mined_itemsets_match_brute_force(
        transactions in transactions_strategy(),
        min_support in 0.05f64..=1.0,
    ) {
        let table = encode(&transactions).unwrap();
        let frequent = mine(&table, &MinerConfig::new(min_support)).unwrap();

        let universe: Vec<&str> = table.items().iter().map(String::as_str).collect();
        for subset in all_subsets(&universe) {
            let support = brute_force_support(&transactions, &subset);
            match frequent.find(&subset) {
                Some(itemset) => {
                    prop_assert!(support >= min_support);
                    prop_assert!((itemset.support - support).abs() < 1e-12);
                }
                None => prop_assert!(support < min_support),
            }
        }
    }

    #[test]
    fn prop_anti_monotonicity(
        transactions in transactions_strategy(),
        min_support in 0.05f64..=1.0,
    ) {
        let table = encode(&transactions).unwrap();
        let frequent = mine(&table, &MinerConfig::new(min_support)).unwrap();

        for itemset in frequent.iter() {
            let items: Vec<&str> = itemset.items.iter().map(String::as_str).collect();
            for subset in all_subsets(&items) {
                let sub = frequent.find(&subset);
                prop_assert!(sub.is_some(), "subset {:?} of {:?} missing", subset, items);
                prop_assert!(sub.unwrap().support >= itemset.support);
            }
        }
    }

    #[test]
    fn prop_rules_respect_thresholds(
        transactions in transactions_strategy(),
        min_support in 0.1f64..=1.0,
        min_confidence in 0.1f64..=1.0,
    ) {
        let table = encode(&transactions).unwrap();
        let frequent = mine(&table, &MinerConfig::new(min_support)).unwrap();
        let rules = generate_rules(&frequent, min_confidence).unwrap();

        for rule in &rules {
            prop_assert!(rule.confidence >= min_confidence);

            let antecedent: BTreeSet<&String> = rule.antecedent.iter().collect();
            let consequent: BTreeSet<&String> = rule.consequent.iter().collect();
            prop_assert!(antecedent.is_disjoint(&consequent));

            let union: Vec<&str> = rule
                .antecedent
                .iter()
                .chain(rule.consequent.iter())
                .map(String::as_str)
                .collect();
            let itemset = frequent.find(&union).unwrap();
            prop_assert!((rule.support - itemset.support).abs() < 1e-12);
            prop_assert!((rule.support - brute_force_support(&transactions, &union)).abs() < 1e-12);

            let expected_lift = rule.confidence / rule.consequent_support;
            prop_assert!((rule.lift - expected_lift).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_mining_is_idempotent(
        transactions in transactions_strategy(),
        min_support in 0.05f64..=1.0,
    ) {
        let table = encode(&transactions).unwrap();
        let config = MinerConfig::new(min_support);

        let first = mine(&table, &config).unwrap();
        let second = mine(&table, &config).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(
            generate_rules(&first, 0.5).unwrap(),
            generate_rules(&second, 0.5).unwrap()
        );
    }
}
