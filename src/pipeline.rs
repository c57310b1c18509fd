//! End-to-end mining: transactions -> encoded table -> frequent itemsets -> rules

use crate::apriori::{mine, FrequentItemsets, MinerConfig};
use crate::config::MiningConfig;
use crate::data::InputWorkbook;
use crate::encoder::{encode, Transaction};
use crate::error::Result;
use crate::rules::{generate_rules, AssociationRule};
use tracing::info;

/// Everything one run produces
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub n_transactions: usize,
    /// Column order of the encoded table
    pub item_order: Vec<String>,
    pub frequent_itemsets: FrequentItemsets,
    pub rules: Vec<AssociationRule>,
}

impl Analysis {
    fn empty(config: &MiningConfig) -> Self {
        Self {
            n_transactions: 0,
            item_order: Vec::new(),
            frequent_itemsets: FrequentItemsets::empty(config.min_support),
            rules: Vec::new(),
        }
    }
}

/// Run every stage over the given transactions.
///
/// Zero transactions is not an error: the result is empty.
pub fn analyze(transactions: &[Transaction], config: &MiningConfig) -> Result<Analysis> {
    config.validate()?;

    if transactions.is_empty() {
        info!("no transactions to mine");
        return Ok(Analysis::empty(config));
    }

    let table = encode(transactions)?;

    let miner = MinerConfig {
        min_support: config.min_support,
        max_len: config.max_len,
    };
    let frequent_itemsets = mine(&table, &miner)?;
    let rules = generate_rules(&frequent_itemsets, config.min_confidence)?;

    Ok(Analysis {
        n_transactions: table.n_transactions(),
        item_order: table.items().to_vec(),
        frequent_itemsets,
        rules,
    })
}

/// Build transactions from the input sheets, then run [`analyze`]
pub fn analyze_workbook(workbook: &InputWorkbook, config: &MiningConfig) -> Result<Analysis> {
    config.validate()?;
    let transactions = workbook.transactions(config.active_state)?;
    analyze(&transactions, config)
}
