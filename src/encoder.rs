//! Transaction encoding into a boolean occurrence table

use crate::error::{BasketError, Result};
use ndarray::Array2;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// The distinct items one client purchased
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub client: String,
    pub items: BTreeSet<String>,
}

impl Transaction {
    /// Build a transaction; repeated labels collapse to a single presence
    pub fn new<I, S>(client: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            client: client.into(),
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One row per transaction, one column per item of the universe.
///
/// Columns follow `items`, which is sorted lexicographically.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedTable {
    items: Vec<String>,
    clients: Vec<String>,
    matrix: Array2<bool>,
    index: HashMap<String, usize>,
}

impl EncodedTable {
    /// Assemble a table from already encoded parts.
    ///
    /// `items` must be distinct and the matrix shape must be
    /// `(clients.len(), items.len())`. A table with zero rows is allowed.
    pub fn from_parts(
        items: Vec<String>,
        clients: Vec<String>,
        matrix: Array2<bool>,
    ) -> Result<Self> {
        if matrix.dim() != (clients.len(), items.len()) {
            return Err(BasketError::invalid_input(format!(
                "matrix shape {:?} does not match {} clients x {} items",
                matrix.dim(),
                clients.len(),
                items.len()
            )));
        }

        let index: HashMap<String, usize> = items
            .iter()
            .enumerate()
            .map(|(col, item)| (item.clone(), col))
            .collect();
        if index.len() != items.len() {
            return Err(BasketError::invalid_input("item labels must be distinct"));
        }

        Ok(Self {
            items,
            clients,
            matrix,
            index,
        })
    }

    /// Item labels in column order
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Client ids in row order
    pub fn clients(&self) -> &[String] {
        &self.clients
    }

    pub fn matrix(&self) -> &Array2<bool> {
        &self.matrix
    }

    pub fn n_transactions(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn n_items(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn column_of(&self, item: &str) -> Option<usize> {
        self.index.get(item).copied()
    }

    /// Number of rows in which the item at `col` is present
    pub fn column_count(&self, col: usize) -> usize {
        self.matrix.column(col).iter().filter(|&&present| present).count()
    }

    /// Number of rows containing every column in `cols`
    pub fn count_rows_containing(&self, cols: &[usize]) -> usize {
        self.matrix
            .outer_iter()
            .filter(|row| cols.iter().all(|&col| row[col]))
            .count()
    }

    /// Decode a row back into its item labels
    pub fn row_items(&self, row: usize) -> BTreeSet<&str> {
        self.matrix
            .row(row)
            .iter()
            .zip(self.items.iter())
            .filter(|(&present, _)| present)
            .map(|(_, item)| item.as_str())
            .collect()
    }
}

/// Encode transactions into an occurrence table.
///
/// Fails when there are no transactions or when any transaction has no items.
pub fn encode(transactions: &[Transaction]) -> Result<EncodedTable> {
    if transactions.is_empty() {
        return Err(BasketError::invalid_input("no transactions to encode"));
    }
    if let Some(empty) = transactions.iter().find(|t| t.is_empty()) {
        return Err(BasketError::invalid_input(format!(
            "transaction for client '{}' has no items",
            empty.client
        )));
    }

    let universe: BTreeSet<&str> = transactions
        .iter()
        .flat_map(|t| t.items.iter().map(String::as_str))
        .collect();
    let items: Vec<String> = universe.into_iter().map(str::to_string).collect();
    let columns: HashMap<&str, usize> = items
        .iter()
        .enumerate()
        .map(|(col, item)| (item.as_str(), col))
        .collect();

    let mut matrix = Array2::from_elem((transactions.len(), items.len()), false);
    for (row, transaction) in transactions.iter().enumerate() {
        for item in &transaction.items {
            matrix[[row, columns[item.as_str()]]] = true;
        }
    }

    let clients = transactions.iter().map(|t| t.client.clone()).collect();

    debug!(
        transactions = transactions.len(),
        items = items.len(),
        "encoded transactions"
    );

    EncodedTable::from_parts(items, clients, matrix)
}
