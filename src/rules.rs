//! Association rule derivation from frequent itemsets

use crate::apriori::{FrequentItemsets, Itemset};
use crate::config::check_fraction;
use crate::error::{BasketError, Result};
use itertools::Itertools;
use tracing::info;

/// "if antecedent then consequent", with its interest metrics
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationRule {
    pub antecedent: Vec<String>,
    pub consequent: Vec<String>,
    pub antecedent_support: f64,
    pub consequent_support: f64,
    /// Support of antecedent and consequent together
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
    pub leverage: f64,
    /// Infinite when confidence is 1
    pub conviction: f64,
}

/// Split every frequent itemset of two or more items into antecedent and
/// consequent and keep the rules whose confidence reaches `min_confidence`.
pub fn generate_rules(
    frequent: &FrequentItemsets,
    min_confidence: f64,
) -> Result<Vec<AssociationRule>> {
    check_fraction("min_confidence", min_confidence)?;

    let mut rules = Vec::new();
    let mut evaluated = 0usize;

    for itemset in frequent.iter().filter(|itemset| itemset.len() >= 2) {
        for antecedent_len in 1..itemset.len() {
            for antecedent in itemset.columns.iter().copied().combinations(antecedent_len) {
                let consequent: Vec<usize> = itemset
                    .columns
                    .iter()
                    .copied()
                    .filter(|col| !antecedent.contains(col))
                    .collect();

                let antecedent_set = lookup(frequent, &antecedent, itemset)?;
                let consequent_set = lookup(frequent, &consequent, itemset)?;
                evaluated += 1;

                // counts rather than rounded supports keep confidence exact
                let confidence = itemset.count as f64 / antecedent_set.count as f64;
                if confidence < min_confidence {
                    continue;
                }

                rules.push(build_rule(itemset, antecedent_set, consequent_set, confidence));
            }
        }
    }

    info!(
        candidates = evaluated,
        rules = rules.len(),
        min_confidence,
        "association rules generated"
    );

    Ok(rules)
}

fn lookup<'a>(
    frequent: &'a FrequentItemsets,
    columns: &[usize],
    parent: &Itemset,
) -> Result<&'a Itemset> {
    frequent.get(columns).ok_or_else(|| {
        BasketError::InvariantViolation(format!(
            "subset {:?} of frequent itemset {:?} has no recorded support",
            columns, parent.items
        ))
    })
}

fn build_rule(
    itemset: &Itemset,
    antecedent: &Itemset,
    consequent: &Itemset,
    confidence: f64,
) -> AssociationRule {
    let support = itemset.support;
    let lift = confidence / consequent.support;
    let leverage = support - antecedent.support * consequent.support;
    let conviction = if confidence >= 1.0 {
        f64::INFINITY
    } else {
        (1.0 - consequent.support) / (1.0 - confidence)
    };

    AssociationRule {
        antecedent: antecedent.items.clone(),
        consequent: consequent.items.clone(),
        antecedent_support: antecedent.support,
        consequent_support: consequent.support,
        support,
        confidence,
        lift,
        leverage,
        conviction,
    }
}

/// Rules ordered by confidence, then lift, both descending.
/// Ties keep generation order.
pub fn rank_rules(rules: &[AssociationRule]) -> Vec<&AssociationRule> {
    let mut ranked: Vec<&AssociationRule> = rules.iter().collect();
    ranked.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| b.lift.total_cmp(&a.lift))
    });
    ranked
}
