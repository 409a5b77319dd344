//! # Order Aggregation
//!
//! Prices every line of an order and builds the totals breakdown.
//!
//! ## Order Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      resolve_order                                      │
//! │                                                                         │
//! │  lines ──► resolve_product (each line alone) ──┬──► items[]            │
//! │                                                 └──► errors[] (per line)│
//! │                                                                         │
//! │  items ──► raw sums (unrounded) ──► round ONCE ──► total_cost          │
//! │                                                └──► by_variant         │
//! │                                                └──► by_method          │
//! │                                                                         │
//! │                    resolve_order_with_combos                            │
//! │                                                                         │
//! │  lines ──► allocate_combos ──┬──► combos    ──► resolve_combo          │
//! │                              └──► remaining ──► resolve_product        │
//! │           (a failing combo hands its units back to `remaining`)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One bad line never blanks out the rest: it lands in `errors` and the
//! other lines still total.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::detection::allocate_combos;
use crate::error::CostError;
use crate::money::Money;
use crate::resolve::{resolve_combo, resolve_product};
use crate::types::{
    CostConfig, CostKind, CostMethod, CostResult, LineItem, PricingContext, SubjectId, VariantId,
};

// =============================================================================
// Order Result Types
// =============================================================================

/// A line that could not be priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineError {
    /// Position in the input lines; for a merged line, the first input line
    /// of that variant. `None` for an allocated combo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub index: Option<usize>,

    pub subject_id: SubjectId,

    pub message: String,
}

/// Order totals split by variant, by resolution method and by combo.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CostBreakdown {
    pub by_variant: BTreeMap<VariantId, Money>,

    pub by_method: BTreeMap<CostMethod, Money>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub by_combo: BTreeMap<String, Money>,
}

/// A fully resolved order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderCost {
    /// Sum of every priced line, rounded to cents once.
    pub total_cost: Money,

    pub items: Vec<CostResult>,

    pub breakdown: CostBreakdown,

    #[serde(default)]
    pub errors: Vec<LineError>,

    /// Variants priced at zero because the snapshot has no entry for them.
    #[serde(default)]
    pub missing_variants: Vec<VariantId>,
}

impl OrderCost {
    /// `true` when every line was priced.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

// =============================================================================
// Accumulator
// =============================================================================

/// Collects results with unrounded running sums; rounds in `finish`.
#[derive(Debug, Default)]
struct OrderAccumulator {
    total: Money,
    items: Vec<CostResult>,
    by_variant: BTreeMap<VariantId, Money>,
    by_method: BTreeMap<CostMethod, Money>,
    by_combo: BTreeMap<String, Money>,
    errors: Vec<LineError>,
    missing_variants: Vec<VariantId>,
}

impl OrderAccumulator {
    fn push(&mut self, config: &CostConfig, index: Option<usize>, result: CostResult) {
        let Some(total) = self.total.checked_add(result.total_cost) else {
            let err = CostError::Overflow {
                subject: "order total".to_string(),
            };
            self.fail(index, result.subject_id, &err);
            return;
        };
        self.total = total;

        // Every amount is non-negative, so no bucket exceeds `total`.
        *self.by_method.entry(result.method).or_default() += result.total_cost;

        match (&result.kind, &result.subject_id) {
            (CostKind::Product, SubjectId::Variant(variant_id)) => {
                *self.by_variant.entry(*variant_id).or_default() += result.total_cost;
                if config.product(*variant_id).is_none() && !self.missing_variants.contains(variant_id) {
                    self.missing_variants.push(*variant_id);
                }
            }
            (_, SubjectId::Combo(combo_id)) => {
                *self.by_combo.entry(combo_id.clone()).or_default() += result.total_cost;
            }
            _ => {}
        }

        self.items.push(result);
    }

    fn fail(&mut self, index: Option<usize>, subject_id: SubjectId, err: &CostError) {
        warn!(subject = %subject_id, error = %err, "Line could not be priced");
        self.errors.push(LineError {
            index,
            subject_id,
            message: err.to_string(),
        });
    }

    fn finish(self) -> OrderCost {
        let order = OrderCost {
            total_cost: self.total.round_to_cents(),
            items: self.items,
            breakdown: CostBreakdown {
                by_variant: round_all(self.by_variant),
                by_method: round_all(self.by_method),
                by_combo: round_all(self.by_combo),
            },
            errors: self.errors,
            missing_variants: self.missing_variants,
        };
        debug!(
            total_cost = %order.total_cost,
            lines = order.items.len(),
            errors = order.errors.len(),
            "Resolved order"
        );
        order
    }
}

fn round_all<K: Ord>(map: BTreeMap<K, Money>) -> BTreeMap<K, Money> {
    map.into_iter()
        .map(|(key, amount)| (key, amount.round_to_cents()))
        .collect()
}

// =============================================================================
// Aggregation
// =============================================================================

/// Resolves every line independently as a single product.
///
/// No line affects another. Sums are rounded to cents only at the end, so
/// many sub-cent unit costs do not drift.
///
/// ## Example
/// ```rust
/// use cogs_core::money::Money;
/// use cogs_core::order::resolve_order;
/// use cogs_core::types::{CostConfig, LineItem, PricingContext};
///
/// let config = CostConfig::from_json(
///     r#"{ "version": "1", "currency": "USD",
///          "products": [{ "variantId": 1, "baseCost": 8.43 }] }"#,
/// ).unwrap();
///
/// let order = resolve_order(&config, &[LineItem::new(1, 2)], &PricingContext::new("US", "YunTu"));
/// assert_eq!(order.total_cost, Money::from_cents(1686));
/// ```
pub fn resolve_order(config: &CostConfig, line_items: &[LineItem], ctx: &PricingContext) -> OrderCost {
    let mut acc = OrderAccumulator::default();

    for (index, line) in line_items.iter().enumerate() {
        match resolve_product(config, line.variant_id, ctx, line.quantity) {
            Ok(result) => acc.push(config, Some(index), result),
            Err(err) => acc.fail(Some(index), SubjectId::Variant(line.variant_id), &err),
        }
    }

    acc.finish()
}

/// Resolves an order with combo pricing.
///
/// Combos are allocated with [`allocate_combos`]; each allocated combo is
/// priced with [`resolve_combo`], and whatever units no combo consumed are
/// priced as single products. A combo that fails to price is reported in
/// `errors` and its units go back to the single-product remainder, so the
/// order total never silently loses them.
pub fn resolve_order_with_combos(
    config: &CostConfig,
    line_items: &[LineItem],
    ctx: &PricingContext,
) -> OrderCost {
    let mut acc = OrderAccumulator::default();

    // Negative lines cannot take part in allocation; report them up front.
    let mut valid = Vec::with_capacity(line_items.len());
    let mut first_index: HashMap<VariantId, usize> = HashMap::new();
    for (index, line) in line_items.iter().enumerate() {
        if line.quantity < 0 {
            let err = CostError::InvalidQuantity {
                subject: SubjectId::Variant(line.variant_id).to_string(),
                quantity: line.quantity,
            };
            acc.fail(Some(index), SubjectId::Variant(line.variant_id), &err);
        } else {
            first_index.entry(line.variant_id).or_insert(index);
            valid.push(line.clone());
        }
    }

    let allocation = allocate_combos(config, &valid);
    let mut remaining = allocation.remaining;

    for combo in allocation.combos {
        match resolve_combo(config, &combo.combo_id, ctx, combo.quantity) {
            Ok(result) => acc.push(config, None, result),
            Err(err) => {
                acc.fail(None, SubjectId::Combo(combo.combo_id.clone()), &err);
                for unit in combo.consumed {
                    restore(&mut remaining, unit);
                }
            }
        }
    }

    for line in &remaining {
        let index = first_index.get(&line.variant_id).copied();
        match resolve_product(config, line.variant_id, ctx, line.quantity) {
            Ok(result) => acc.push(config, index, result),
            Err(err) => acc.fail(index, SubjectId::Variant(line.variant_id), &err),
        }
    }

    acc.finish()
}

/// Adds units back to the remainder, merging with an existing line.
fn restore(remaining: &mut Vec<LineItem>, unit: LineItem) {
    match remaining.iter_mut().find(|l| l.variant_id == unit.variant_id) {
        Some(line) => line.quantity = line.quantity.saturating_add(unit.quantity),
        None => remaining.push(unit),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
