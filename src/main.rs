//! BasketForge: market-basket association rules CLI
//!
//! This is the main entrypoint that orchestrates workbook loading, itemset
//! mining, rule generation and report export.

use anyhow::{Context, Result};
use basketforge::cli::{Args, Command, RunArgs};
use basketforge::logging::init_logging;
use basketforge::report::render_items;
use basketforge::rules::rank_rules;
use basketforge::{analyze_workbook, assemble_report, load_workbook, write_template, Analysis};
use clap::Parser;
use std::time::Instant;
use tracing::info;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();
    init_logging(args.verbose);

    match &args.command {
        Command::Run(run) => run_full_pipeline(run, args.verbose)?,
        Command::Template { output } => {
            write_template(output)
                .with_context(|| format!("failed to write template to {}", output.display()))?;
            println!("✓ Template written to: {}", output.display());
        }
    }

    Ok(())
}

/// Run the full mining pipeline and export the report
fn run_full_pipeline(args: &RunArgs, verbose: bool) -> Result<()> {
    println!("=== Association Rule Pipeline ===\n");

    let config = args.mining_config()?;
    let start_time = Instant::now();

    // Step 1: Load input workbook
    if verbose {
        println!("Step 1: Loading workbook");
        println!("  Input directory: {}", args.input.display());
    }
    let workbook = load_workbook(&args.input)
        .with_context(|| format!("failed to load workbook from {}", args.input.display()))?;
    println!(
        "✓ Workbook loaded: {} records, {} products",
        workbook.record.height(),
        workbook.product.height()
    );

    // Step 2: Mine itemsets and rules
    if verbose {
        println!("\nStep 2: Mining");
        println!("  Min support: {}", config.min_support);
        println!("  Min confidence: {}", config.min_confidence);
        println!("  Active state: {}", config.active_state);
        if let Some(max_len) = config.max_len {
            println!("  Max itemset size: {}", max_len);
        }
    }
    let mining_start = Instant::now();
    let analysis = analyze_workbook(&workbook, &config)?;
    info!(elapsed_ms = mining_start.elapsed().as_millis() as u64, "mining finished");

    println!(
        "✓ {} transactions, {} product lines",
        analysis.n_transactions,
        analysis.item_order.len()
    );
    println!(
        "✓ {} frequent itemsets (min support {})",
        analysis.frequent_itemsets.len(),
        analysis.frequent_itemsets.min_support()
    );
    println!("✓ {} association rules", analysis.rules.len());

    print_top_rules(&analysis, args.top);

    // Step 3: Export report
    let report = assemble_report(&workbook, &analysis)?;
    report
        .write(&args.output)
        .with_context(|| format!("failed to write report to {}", args.output.display()))?;

    println!("\n=== Pipeline Complete ===");
    println!("Total processing time: {:.2}s", start_time.elapsed().as_secs_f64());
    println!("Report saved to: {}", args.output.display());

    Ok(())
}

/// Print the strongest rules by confidence, then lift
fn print_top_rules(analysis: &Analysis, top: usize) {
    if analysis.rules.is_empty() || top == 0 {
        return;
    }

    println!("\n=== Top Rules ===");
    println!("  Support | Confidence |   Lift | Rule");
    println!("  --------|------------|--------|-----");
    for rule in rank_rules(&analysis.rules).into_iter().take(top) {
        println!(
            "  {:7.3} | {:10.3} | {:6.3} | {{{}}} -> {{{}}}",
            rule.support,
            rule.confidence,
            rule.lift,
            render_items(&rule.antecedent),
            render_items(&rule.consequent)
        );
    }
}
