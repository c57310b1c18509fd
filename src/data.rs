//! Workbook loading and transaction construction using Polars
//!
//! A workbook is a directory holding one CSV file per sheet (`record.csv`,
//! `product.csv`, ...).

use crate::encoder::Transaction;
use crate::error::{BasketError, Result};
use polars::prelude::*;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const RECORD_SHEET: &str = "record";
pub const PRODUCT_SHEET: &str = "product";

pub const RECORD_COLUMNS: [&str; 2] = ["client", "product"];
pub const PRODUCT_COLUMNS: [&str; 3] = ["product", "product_line", "state_product"];

/// The two input sheets, kept as loaded so they can be passed through to the report
#[derive(Debug, Clone)]
pub struct InputWorkbook {
    pub record: DataFrame,
    pub product: DataFrame,
}

impl InputWorkbook {
    /// Client transactions over active product lines
    pub fn transactions(&self, active_state: i64) -> Result<Vec<Transaction>> {
        build_transactions(&self.record, &self.product, active_state)
    }
}

/// Load the `record` and `product` sheets from a workbook directory
///
/// # Arguments
/// * `dir` - Directory containing `record.csv` and `product.csv`
///
/// # Returns
/// * `InputWorkbook` with both sheets, after checking their required columns
pub fn load_workbook(dir: impl AsRef<Path>) -> Result<InputWorkbook> {
    let dir = dir.as_ref();
    let record = read_sheet(dir, RECORD_SHEET, &RECORD_COLUMNS)?;
    let product = read_sheet(dir, PRODUCT_SHEET, &PRODUCT_COLUMNS)?;

    info!(
        workbook = %dir.display(),
        records = record.height(),
        products = product.height(),
        "workbook loaded"
    );

    Ok(InputWorkbook { record, product })
}

pub fn sheet_path(dir: &Path, sheet: &str) -> PathBuf {
    dir.join(format!("{}.csv", sheet))
}

/// Read one sheet and check that every required column is present.
///
/// Every column is read as a string so ids such as `001` keep their exact text.
pub fn read_sheet(dir: &Path, sheet: &str, required: &[&str]) -> Result<DataFrame> {
    let path = sheet_path(dir, sheet);
    if !path.is_file() {
        return Err(BasketError::MissingSheet {
            sheet: sheet.to_string(),
        });
    }

    let df = LazyCsvReader::new(&path)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .finish()?
        .collect()?;

    require_columns(&df, sheet, required)?;

    debug!(sheet, rows = df.height(), "sheet read");
    Ok(df)
}

fn require_columns(df: &DataFrame, sheet: &str, required: &[&str]) -> Result<()> {
    let present: BTreeSet<&str> = df.get_column_names().into_iter().collect();
    match required.iter().find(|column| !present.contains(**column)) {
        Some(missing) => Err(BasketError::schema(sheet, missing)),
        None => Ok(()),
    }
}

/// Write one sheet as `<dir>/<sheet>.csv`, creating the directory if needed
pub fn write_sheet(dir: &Path, sheet: &str, df: &mut DataFrame) -> Result<()> {
    fs::create_dir_all(dir)?;
    let path = sheet_path(dir, sheet);
    let mut file = File::create(&path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;

    debug!(sheet, path = %path.display(), rows = df.height(), "sheet written");
    Ok(())
}

/// Join purchases to active products and collect each client's product lines.
///
/// Only products whose `state_product` parses to `active_state` take part in
/// the join. A product listed under several active lines contributes all of
/// them. Rows with a missing client, product or product line are dropped, and
/// so are clients left without any product line. The result is ordered by
/// client id.
pub fn build_transactions(
    record: &DataFrame,
    product: &DataFrame,
    active_state: i64,
) -> Result<Vec<Transaction>> {
    require_columns(record, RECORD_SHEET, &RECORD_COLUMNS)?;
    require_columns(product, PRODUCT_SHEET, &PRODUCT_COLUMNS)?;

    let skipped = record.column("client")?.null_count() + record.column("product")?.null_count();
    if skipped > 0 {
        warn!(sheet = RECORD_SHEET, skipped, "empty client or product cells skipped");
    }

    let active = product
        .clone()
        .lazy()
        .select([
            col("product").cast(DataType::String),
            col("product_line").cast(DataType::String),
            col("state_product").cast(DataType::Int64),
        ])
        .filter(
            col("state_product")
                .eq(lit(active_state))
                .and(col("product").is_not_null())
                .and(col("product_line").is_not_null()),
        );

    let grouped = record
        .clone()
        .lazy()
        .select([
            col("client").cast(DataType::String),
            col("product").cast(DataType::String),
        ])
        .filter(col("client").is_not_null())
        .join(
            active,
            [col("product")],
            [col("product")],
            JoinArgs::new(JoinType::Inner),
        )
        .group_by([col("client")])
        .agg([col("product_line").unique()])
        .collect()?;

    let clients = grouped.column("client")?.str()?;
    let line_lists = grouped.column("product_line")?.list()?;

    let mut transactions = Vec::with_capacity(grouped.height());
    for (client, lines) in clients.into_iter().zip(line_lists.into_iter()) {
        let (Some(client), Some(lines)) = (client, lines) else {
            continue;
        };
        let items: BTreeSet<String> = lines
            .str()?
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();
        if !items.is_empty() {
            transactions.push(Transaction::new(client, items));
        }
    }
    transactions.sort_by(|a, b| a.client.cmp(&b.client));

    debug!(
        records = record.height(),
        products = product.height(),
        transactions = transactions.len(),
        "transactions built"
    );

    Ok(transactions)
}
