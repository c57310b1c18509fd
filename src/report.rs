//! Report and template workbooks

use crate::apriori::FrequentItemsets;
use crate::data::{sheet_path, write_sheet, InputWorkbook, PRODUCT_SHEET, RECORD_SHEET};
use crate::error::Result;
use crate::pipeline::Analysis;
use crate::rules::AssociationRule;
use polars::prelude::*;
use std::fs;
use std::path::Path;
use tracing::info;

pub const RULE_SHEET: &str = "rule";
pub const FREQUENT_ITEMSET_SHEET: &str = "frequent_itemset";

/// Separator used when an itemset is rendered into a single cell
pub const ITEM_SEPARATOR: &str = ", ";

/// The four output sheets
#[derive(Debug, Clone)]
pub struct Report {
    pub rule: DataFrame,
    pub frequent_itemset: DataFrame,
    pub product: DataFrame,
    pub record: DataFrame,
}

impl Report {
    fn sheets(&self) -> [(&'static str, &DataFrame); 4] {
        [
            (RULE_SHEET, &self.rule),
            (FREQUENT_ITEMSET_SHEET, &self.frequent_itemset),
            (PRODUCT_SHEET, &self.product),
            (RECORD_SHEET, &self.record),
        ]
    }

    /// Write every sheet into `dir` as `<sheet>.csv`.
    ///
    /// Sheets are staged in a temporary directory next to `dir` and only
    /// moved into place once all four exported, so a failed export leaves
    /// no new sheet behind.
    pub fn write(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        let parent = match dir.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let staging = tempfile::Builder::new()
            .prefix(".report-")
            .tempdir_in(parent)?;
        for (sheet, df) in self.sheets() {
            write_sheet(staging.path(), sheet, &mut df.clone())?;
        }

        fs::create_dir_all(dir)?;
        for (sheet, _) in self.sheets() {
            fs::rename(sheet_path(staging.path(), sheet), sheet_path(dir, sheet))?;
        }

        info!(report = %dir.display(), "report written");
        Ok(())
    }
}

/// Combine the input sheets with the mined itemsets and rules
pub fn assemble_report(workbook: &InputWorkbook, analysis: &Analysis) -> Result<Report> {
    Ok(Report {
        rule: rules_frame(&analysis.rules)?,
        frequent_itemset: itemsets_frame(&analysis.frequent_itemsets)?,
        product: workbook.product.clone(),
        record: workbook.record.clone(),
    })
}

pub fn render_items<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| item.as_ref())
        .collect::<Vec<&str>>()
        .join(ITEM_SEPARATOR)
}

/// One row per rule
pub fn rules_frame(rules: &[AssociationRule]) -> Result<DataFrame> {
    let column = |f: fn(&AssociationRule) -> f64| rules.iter().map(f).collect::<Vec<f64>>();

    let df = DataFrame::new(vec![
        Series::new(
            "antecedent",
            rules
                .iter()
                .map(|rule| render_items(&rule.antecedent))
                .collect::<Vec<String>>(),
        ),
        Series::new(
            "consequent",
            rules
                .iter()
                .map(|rule| render_items(&rule.consequent))
                .collect::<Vec<String>>(),
        ),
        Series::new("antecedent_support", column(|rule| rule.antecedent_support)),
        Series::new("consequent_support", column(|rule| rule.consequent_support)),
        Series::new("support", column(|rule| rule.support)),
        Series::new("confidence", column(|rule| rule.confidence)),
        Series::new("lift", column(|rule| rule.lift)),
        Series::new("leverage", column(|rule| rule.leverage)),
        Series::new("conviction", column(|rule| rule.conviction)),
    ])?;
    Ok(df)
}

/// One row per frequent itemset
pub fn itemsets_frame(frequent: &FrequentItemsets) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Series::new(
            "support",
            frequent.iter().map(|itemset| itemset.support).collect::<Vec<f64>>(),
        ),
        Series::new(
            "itemset",
            frequent
                .iter()
                .map(|itemset| render_items(&itemset.items))
                .collect::<Vec<String>>(),
        ),
        Series::new(
            "length",
            frequent.iter().map(|itemset| itemset.len() as u32).collect::<Vec<u32>>(),
        ),
    ])?;
    Ok(df)
}

/// Sample workbook showing the expected input shape: five clients, six
/// products, all of them active.
pub fn template_workbook() -> Result<InputWorkbook> {
    let purchases: [(&str, &str); 21] = [
        ("client_1", "pan"),
        ("client_1", "leche"),
        ("client_1", "azucar"),
        ("client_2", "pan"),
        ("client_2", "cafe"),
        ("client_2", "cereal"),
        ("client_3", "leche"),
        ("client_3", "azucar"),
        ("client_3", "cafe"),
        ("client_4", "pan"),
        ("client_4", "leche"),
        ("client_4", "azucar"),
        ("client_4", "cafe"),
        ("client_5", "pan"),
        ("client_5", "leche"),
        ("client_5", "cafe"),
        ("client_1", "carne"),
        ("client_2", "carne"),
        ("client_3", "carne"),
        ("client_4", "carne"),
        ("client_5", "carne"),
    ];
    let catalog: [(&str, &str); 6] = [
        ("pan", "panaderia"),
        ("leche", "lacteo"),
        ("azucar", "endulsante"),
        ("cafe", "cafe"),
        ("cereal", "cereal"),
        ("carne", "carnico"),
    ];

    let record = DataFrame::new(vec![
        Series::new(
            "client",
            purchases.iter().map(|(client, _)| *client).collect::<Vec<&str>>(),
        ),
        Series::new(
            "product",
            purchases.iter().map(|(_, product)| *product).collect::<Vec<&str>>(),
        ),
    ])?;
    let product = DataFrame::new(vec![
        Series::new(
            "product",
            catalog.iter().map(|(product, _)| *product).collect::<Vec<&str>>(),
        ),
        Series::new(
            "product_line",
            catalog.iter().map(|(_, line)| *line).collect::<Vec<&str>>(),
        ),
        Series::new("state_product", vec![1i64; catalog.len()]),
    ])?;

    Ok(InputWorkbook { record, product })
}

/// Write the template workbook (`record.csv`, `product.csv`) into `dir`
pub fn write_template(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    let mut template = template_workbook()?;
    write_sheet(dir, RECORD_SHEET, &mut template.record)?;
    write_sheet(dir, PRODUCT_SHEET, &mut template.product)?;

    info!(template = %dir.display(), "template written");
    Ok(())
}
