//! BasketForge: market-basket association rules over client purchase history
//!
//! Client purchases are joined to product lines, encoded into a boolean
//! occurrence table, mined for frequent itemsets with Apriori, and turned
//! into association rules with support, confidence and lift.

pub mod apriori;
pub mod cli;
pub mod config;
pub mod data;
pub mod encoder;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod rules;

// Re-export public items for easier access
pub use apriori::{mine, FrequentItemsets, Itemset, MinerConfig};
pub use cli::Args;
pub use config::MiningConfig;
pub use data::{load_workbook, InputWorkbook};
pub use encoder::{encode, EncodedTable, Transaction};
pub use error::{BasketError, Result};
pub use pipeline::{analyze, analyze_workbook, Analysis};
pub use report::{assemble_report, template_workbook, write_template, Report};
pub use rules::{generate_rules, AssociationRule};
