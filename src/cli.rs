//! Command-line interface definitions and argument parsing

use crate::config::{
    MiningConfig, DEFAULT_ACTIVE_STATE, DEFAULT_MIN_CONFIDENCE, DEFAULT_MIN_SUPPORT,
};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Market-basket association rules over client purchase history
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Mine frequent itemsets and association rules from an input workbook
    Run(RunArgs),

    /// Write a sample input workbook (record.csv, product.csv)
    Template {
        /// Directory to write the template sheets into
        #[arg(short, long, default_value = "template")]
        output: PathBuf,
    },
}

#[derive(ClapArgs, Debug)]
pub struct RunArgs {
    /// Directory holding record.csv and product.csv
    #[arg(short, long, default_value = "data")]
    pub input: PathBuf,

    /// Directory for the report sheets
    #[arg(short, long, default_value = "report")]
    pub output: PathBuf,

    /// Minimum support for a frequent itemset, in (0, 1]
    #[arg(long, default_value_t = DEFAULT_MIN_SUPPORT)]
    pub min_support: f64,

    /// Minimum confidence for a rule, in (0, 1]
    #[arg(long, default_value_t = DEFAULT_MIN_CONFIDENCE)]
    pub min_confidence: f64,

    /// state_product value marking an active product
    #[arg(long, default_value_t = DEFAULT_ACTIVE_STATE)]
    pub active_state: i64,

    /// Largest itemset size to search
    #[arg(long)]
    pub max_len: Option<usize>,

    /// Number of rules to print
    #[arg(long, default_value = "10")]
    pub top: usize,
}

impl RunArgs {
    /// Thresholds for the pipeline, validated
    pub fn mining_config(&self) -> crate::Result<MiningConfig> {
        let config = MiningConfig {
            min_support: self.min_support,
            min_confidence: self.min_confidence,
            active_state: self.active_state,
            max_len: self.max_len,
        };
        config.validate()?;
        Ok(config)
    }
}
