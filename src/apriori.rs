//! Level-wise frequent itemset search (Apriori)

use crate::config::check_fraction;
use crate::encoder::EncodedTable;
use crate::error::{BasketError, Result};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Search parameters for the miner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinerConfig {
    pub min_support: f64,
    pub max_len: Option<usize>,
}

impl MinerConfig {
    pub fn new(min_support: f64) -> Self {
        Self {
            min_support,
            max_len: None,
        }
    }

    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }
}

/// A frequent itemset with its support
#[derive(Debug, Clone, PartialEq)]
pub struct Itemset {
    /// Column indices into the encoded table, ascending
    pub columns: Vec<usize>,
    /// Item labels in the same order as `columns`
    pub items: Vec<String>,
    /// Transactions containing every item
    pub count: usize,
    pub support: f64,
}

impl Itemset {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// All frequent itemsets of one table, ordered by size then column order
#[derive(Debug, Clone, PartialEq)]
pub struct FrequentItemsets {
    item_order: Vec<String>,
    n_transactions: usize,
    min_support: f64,
    itemsets: Vec<Itemset>,
    index: HashMap<Vec<usize>, usize>,
}

impl FrequentItemsets {
    pub(crate) fn new(
        item_order: Vec<String>,
        n_transactions: usize,
        min_support: f64,
        itemsets: Vec<Itemset>,
    ) -> Self {
        let index = itemsets
            .iter()
            .enumerate()
            .map(|(pos, itemset)| (itemset.columns.clone(), pos))
            .collect();
        Self {
            item_order,
            n_transactions,
            min_support,
            itemsets,
            index,
        }
    }

    /// Collection for a run over zero transactions
    pub fn empty(min_support: f64) -> Self {
        Self::new(Vec::new(), 0, min_support, Vec::new())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Itemset> {
        self.itemsets.iter()
    }

    pub fn len(&self) -> usize {
        self.itemsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.itemsets.is_empty()
    }

    pub fn item_order(&self) -> &[String] {
        &self.item_order
    }

    pub fn n_transactions(&self) -> usize {
        self.n_transactions
    }

    pub fn min_support(&self) -> f64 {
        self.min_support
    }

    /// Exact lookup by ascending column indices
    pub fn get(&self, columns: &[usize]) -> Option<&Itemset> {
        self.index.get(columns).map(|&pos| &self.itemsets[pos])
    }

    /// Lookup by item labels in any order
    pub fn find<S: AsRef<str>>(&self, items: &[S]) -> Option<&Itemset> {
        let mut columns = items
            .iter()
            .map(|item| self.item_order.iter().position(|known| known == item.as_ref()))
            .collect::<Option<Vec<usize>>>()?;
        columns.sort_unstable();
        columns.dedup();
        self.get(&columns)
    }

    /// Frequent itemsets of exactly `size` items
    pub fn of_size(&self, size: usize) -> impl Iterator<Item = &Itemset> {
        self.itemsets.iter().filter(move |itemset| itemset.len() == size)
    }

    /// Largest itemset size found, 0 when empty
    pub fn max_size(&self) -> usize {
        self.itemsets.last().map_or(0, Itemset::len)
    }
}

/// Find every itemset whose support is at least `config.min_support`.
///
/// Level k candidates are built only from frequent (k-1)-itemsets and are
/// dropped before counting when any of their (k-1)-subsets is infrequent.
pub fn mine(table: &EncodedTable, config: &MinerConfig) -> Result<FrequentItemsets> {
    check_fraction("min_support", config.min_support)?;
    if config.max_len == Some(0) {
        return Err(BasketError::invalid_input("max_len must be at least 1"));
    }

    let n_transactions = table.n_transactions();
    if n_transactions == 0 {
        info!("no transactions, frequent itemset collection is empty");
        return Ok(FrequentItemsets::empty(config.min_support));
    }

    let max_len = config
        .max_len
        .map_or(table.n_items(), |len| len.min(table.n_items()));
    let support_of = |count: usize| count as f64 / n_transactions as f64;
    let mut found: Vec<(Vec<usize>, usize)> = Vec::new();

    let mut level: Vec<(Vec<usize>, usize)> = (0..table.n_items())
        .map(|col| (vec![col], table.column_count(col)))
        .filter(|(_, count)| support_of(*count) >= config.min_support)
        .collect();
    debug!(size = 1, frequent = level.len(), "apriori level complete");

    let mut size = 1;
    while !level.is_empty() {
        found.extend(level.iter().cloned());
        size += 1;
        if size > max_len {
            break;
        }

        let candidates = generate_candidates(&level);
        let evaluated = candidates.len();
        level = candidates
            .into_iter()
            .map(|columns| {
                let count = table.count_rows_containing(&columns);
                (columns, count)
            })
            .filter(|(_, count)| support_of(*count) >= config.min_support)
            .collect();

        debug!(
            size,
            candidates = evaluated,
            frequent = level.len(),
            "apriori level complete"
        );
    }

    let items = table.items();
    let itemsets = found
        .into_iter()
        .map(|(columns, count)| Itemset {
            items: columns.iter().map(|&col| items[col].clone()).collect(),
            columns,
            count,
            support: support_of(count),
        })
        .collect::<Vec<_>>();

    info!(
        transactions = n_transactions,
        items = table.n_items(),
        frequent_itemsets = itemsets.len(),
        min_support = config.min_support,
        "frequent itemsets mined"
    );

    Ok(FrequentItemsets::new(
        items.to_vec(),
        n_transactions,
        config.min_support,
        itemsets,
    ))
}

/// Join frequent (k-1)-itemsets sharing their first k-2 columns, then prune
/// any candidate with an infrequent (k-1)-subset.
///
/// `level` must be sorted lexicographically, which holds for every level the
/// miner produces; the output keeps that order.
fn generate_candidates(level: &[(Vec<usize>, usize)]) -> Vec<Vec<usize>> {
    let frequent: HashSet<&[usize]> = level.iter().map(|(cols, _)| cols.as_slice()).collect();
    let mut candidates = Vec::new();

    for (i, (left, _)) in level.iter().enumerate() {
        let prefix = &left[..left.len() - 1];
        for (right, _) in &level[i + 1..] {
            if &right[..right.len() - 1] != prefix {
                // sorted input: once the prefix changes no later set shares it
                break;
            }

            let mut candidate = left.clone();
            candidate.push(right[right.len() - 1]);

            if all_subsets_frequent(&candidate, &frequent) {
                candidates.push(candidate);
            }
        }
    }

    candidates
}

fn all_subsets_frequent(candidate: &[usize], frequent: &HashSet<&[usize]>) -> bool {
    // dropping either of the last two columns gives one of the joined parents
    (0..candidate.len().saturating_sub(2)).all(|skip| {
        let subset: Vec<usize> = candidate
            .iter()
            .enumerate()
            .filter(|(pos, _)| *pos != skip)
            .map(|(_, &col)| col)
            .collect();
        frequent.contains(subset.as_slice())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{encode, Transaction};
    use ndarray::Array2;

    fn create_test_table() -> EncodedTable {
        encode(&[
            Transaction::new("c1", ["bread", "milk"]),
            Transaction::new("c2", ["bread", "milk", "sugar"]),
            Transaction::new("c3", ["bread", "coffee"]),
        ])
        .unwrap()
    }

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_bread_milk_scenario() {
        let table = create_test_table();
        let frequent = mine(&table, &MinerConfig::new(0.5)).unwrap();

        let bread = frequent.find(&["bread"]).unwrap();
        assert!(approx_eq(bread.support, 1.0));
        assert_eq!(bread.count, 3);

        let milk = frequent.find(&["milk"]).unwrap();
        assert!(approx_eq(milk.support, 2.0 / 3.0));

        let pair = frequent.find(&["milk", "bread"]).unwrap();
        assert!(approx_eq(pair.support, 2.0 / 3.0));
        assert_eq!(pair.items, vec!["bread", "milk"]);

        assert!(frequent.find(&["coffee"]).is_none());
        assert!(frequent.find(&["sugar"]).is_none());
        assert_eq!(frequent.len(), 3);
    }

    #[test]
    fn test_deterministic_order() {
        let table = create_test_table();
        let frequent = mine(&table, &MinerConfig::new(0.3)).unwrap();

        let rendered: Vec<Vec<usize>> = frequent.iter().map(|i| i.columns.clone()).collect();
        // bread=0 coffee=1 milk=2 sugar=3
        assert_eq!(
            rendered,
            vec![
                vec![0],
                vec![1],
                vec![2],
                vec![3],
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![2, 3],
                vec![0, 2, 3],
            ]
        );
        assert_eq!(frequent.max_size(), 3);
        assert_eq!(frequent.of_size(2).count(), 4);
    }

    #[test]
    fn test_support_boundary_inclusive() {
        let table = create_test_table();

        let at = mine(&table, &MinerConfig::new(2.0 / 3.0)).unwrap();
        assert!(at.find(&["milk"]).is_some());

        let above = mine(&table, &MinerConfig::new(2.0 / 3.0 + 1e-9)).unwrap();
        assert!(above.find(&["milk"]).is_none());
        assert!(above.find(&["bread"]).is_some());
    }

    #[test]
    fn test_max_len_limits_search() {
        let table = create_test_table();
        let frequent = mine(&table, &MinerConfig::new(0.3).with_max_len(2)).unwrap();

        assert_eq!(frequent.max_size(), 2);
        assert!(frequent.find(&["bread", "milk", "sugar"]).is_none());
    }

    #[test]
    fn test_invalid_support() {
        let table = create_test_table();
        assert!(mine(&table, &MinerConfig::new(0.0)).is_err());
        assert!(mine(&table, &MinerConfig::new(1.01)).is_err());
        assert!(mine(&table, &MinerConfig::new(0.5).with_max_len(0)).is_err());
    }

    #[test]
    fn test_empty_table() {
        let empty = Array2::from_elem((0, 0), false);
        let table = EncodedTable::from_parts(vec![], vec![], empty).unwrap();
        let frequent = mine(&table, &MinerConfig::new(0.5)).unwrap();
        assert!(frequent.is_empty());
        assert_eq!(frequent.n_transactions(), 0);
    }

    #[test]
    fn test_pruning_skips_infrequent_subsets() {
        // {a,b} {a,c} frequent but {b,c} never co-occur: {a,b,c} must not be a candidate
        let level = vec![(vec![0, 1], 2), (vec![0, 2], 2)];
        assert!(generate_candidates(&level).is_empty());

        let level = vec![(vec![0, 1], 2), (vec![0, 2], 2), (vec![1, 2], 2)];
        assert_eq!(generate_candidates(&level), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_mine_is_idempotent() {
        let table = create_test_table();
        let config = MinerConfig::new(0.3);
        assert_eq!(mine(&table, &config).unwrap(), mine(&table, &config).unwrap());
    }
}
