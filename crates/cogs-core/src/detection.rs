//! # Combo Detection
//!
//! Which combos an order triggers, and which order units those combos use.
//!
//! ## Counting Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  For each combo, independently:                                         │
//! │                                                                         │
//! │    cap(v)    = Σ item.qty over combo.items listing variant v           │
//! │    matched   = Σ over distinct v of min(order qty of v, cap(v))        │
//! │    instances = matched / trigger_quantity   (floor, 0 below trigger)   │
//! │                                                                         │
//! │  Example: items [variant 5 × 6], trigger 2, order has variant 5 × 5    │
//! │           matched = min(5, 6) = 5  →  instances = 5 / 2 = 2            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`detect_combos`] evaluates combos independently: two combos may both
//! count the same order units. [`allocate_combos`] is the reconciliation
//! step that hands each unit to at most one combo.
//!
//! ## Allocation Policy (greedy)
//! 1. Duplicate order lines are merged (first-seen order kept).
//! 2. Combos are visited in config order. Earlier combos win ties.
//! 3. A combo's instance count is recomputed against the units still free.
//! 4. Each instance consumes `trigger_quantity` units, drawn from the combo's
//!    variants in first-listed order, at most `cap(v)` units per variant.
//! 5. Whatever is left is returned as `remaining` for single-product pricing.
//!
//! All unit sums saturate at `i64::MAX`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::types::{ComboCost, CostConfig, DetectedCombo, LineItem, VariantId};

/// A combo an order was allocated, and the units it consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AllocatedCombo {
    pub combo_id: String,

    /// Number of combo instances.
    pub quantity: i64,

    /// Order units taken by those instances.
    pub consumed: Vec<LineItem>,
}

/// Result of [`allocate_combos`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ComboAllocation {
    pub combos: Vec<AllocatedCombo>,

    /// Order units not consumed by any combo; zero-quantity lines dropped.
    pub remaining: Vec<LineItem>,
}

impl ComboAllocation {
    /// The allocated combos in detection form.
    pub fn detected(&self) -> Vec<DetectedCombo> {
        self.combos
            .iter()
            .map(|c| DetectedCombo {
                combo_id: c.combo_id.clone(),
                quantity: c.quantity,
            })
            .collect()
    }
}

// =============================================================================
// Detection
// =============================================================================

/// Units per variant; negative lines are ignored.
fn unit_pool(line_items: &[LineItem]) -> HashMap<VariantId, i64> {
    let mut pool = HashMap::new();
    for line in line_items.iter().filter(|l| l.quantity > 0) {
        let units = pool.entry(line.variant_id).or_insert(0i64);
        *units = units.saturating_add(line.quantity);
    }
    pool
}

/// Per-variant unit caps, in first-listed order. A variant listed twice
/// gets one cap covering both entries.
fn variant_caps(combo: &ComboCost) -> Vec<(VariantId, i64)> {
    let mut caps: Vec<(VariantId, i64)> = Vec::with_capacity(combo.items.len());
    for item in combo.items.iter().filter(|i| i.qty > 0) {
        match caps.iter_mut().find(|(variant_id, _)| *variant_id == item.variant_id) {
            Some((_, cap)) => *cap = cap.saturating_add(item.qty),
            None => caps.push((item.variant_id, item.qty)),
        }
    }
    caps
}

fn matched_count(combo: &ComboCost, pool: &HashMap<VariantId, i64>) -> i64 {
    variant_caps(combo)
        .into_iter()
        .map(|(variant_id, cap)| pool.get(&variant_id).copied().unwrap_or(0).min(cap))
        .fold(0, i64::saturating_add)
}

fn instance_count(combo: &ComboCost, pool: &HashMap<VariantId, i64>) -> i64 {
    let trigger = combo.trigger_quantity.unwrap_or(0);
    if trigger <= 0 {
        warn!(combo_id = %combo.combo_id, trigger_quantity = ?combo.trigger_quantity, "Combo has no usable trigger quantity, skipping");
        return 0;
    }

    let matched = matched_count(combo, pool);
    if matched >= trigger {
        matched / trigger
    } else {
        0
    }
}

/// Detects how many instances of each combo an order triggers.
///
/// Returns one entry per combo that reaches its trigger, in config order.
///
/// ## Example
/// ```rust
/// use cogs_core::detection::detect_combos;
/// use cogs_core::types::{CostConfig, LineItem};
///
/// let config = CostConfig::from_json(r#"{
///     "version": "1", "currency": "USD",
///     "products": [{ "variantId": 5, "baseCost": 3 }],
///     "combos": [{
///         "comboId": "FIVE-PACK", "name": "Five pack",
///         "items": [{ "variantId": 5, "qty": 6 }],
///         "triggerQuantity": 2,
///         "cogsRule": { "mode": "sum" }
///     }]
/// }"#).unwrap();
///
/// let detected = detect_combos(&config, &[LineItem::new(5, 5)]);
/// assert_eq!(detected[0].quantity, 2);
/// ```
pub fn detect_combos(config: &CostConfig, line_items: &[LineItem]) -> Vec<DetectedCombo> {
    let pool = unit_pool(line_items);

    config
        .combos
        .iter()
        .filter_map(|combo| {
            let quantity = instance_count(combo, &pool);
            (quantity > 0).then(|| DetectedCombo {
                combo_id: combo.combo_id.clone(),
                quantity,
            })
        })
        .collect()
}

// =============================================================================
// Allocation
// =============================================================================

/// Merges lines for the same variant, keeping first-seen order.
///
/// Negative lines are dropped with a warning; callers that need to report
/// them do so before merging.
pub fn merge_line_items(line_items: &[LineItem]) -> Vec<LineItem> {
    let mut merged: Vec<LineItem> = Vec::with_capacity(line_items.len());
    for line in line_items {
        if line.quantity < 0 {
            warn!(variant_id = line.variant_id, quantity = line.quantity, "Dropping negative order line");
            continue;
        }
        match merged.iter_mut().find(|m| m.variant_id == line.variant_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => merged.push(line.clone()),
        }
    }
    merged
}

/// Hands order units to triggered combos, each unit to at most one combo.
///
/// See the module docs for the tie-break policy.
pub fn allocate_combos(config: &CostConfig, line_items: &[LineItem]) -> ComboAllocation {
    let merged = merge_line_items(line_items);
    let mut pool = unit_pool(&merged);
    let mut combos = Vec::new();

    for combo in &config.combos {
        let quantity = instance_count(combo, &pool);
        if quantity == 0 {
            continue;
        }

        // instances × trigger never exceeds matched
        let mut needed = quantity.saturating_mul(combo.trigger_quantity.unwrap_or(0));
        let mut consumed: Vec<LineItem> = Vec::new();
        for (variant_id, cap) in variant_caps(combo) {
            if needed == 0 {
                break;
            }
            let free = pool.get(&variant_id).copied().unwrap_or(0);
            let take = free.min(cap).min(needed);
            if take <= 0 {
                continue;
            }

            pool.insert(variant_id, free - take);
            needed -= take;
            consumed.push(LineItem::new(variant_id, take));
        }

        debug!(combo_id = %combo.combo_id, quantity, "Allocated combo");
        combos.push(AllocatedCombo {
            combo_id: combo.combo_id.clone(),
            quantity,
            consumed,
        });
    }

    let remaining = merged
        .into_iter()
        .filter_map(|line| {
            let left = pool.get(&line.variant_id).copied().unwrap_or(0);
            (left > 0).then(|| LineItem::new(line.variant_id, left))
        })
        .collect();

    ComboAllocation { combos, remaining }
}

// =============================================================================
// Unit Tests
// =============================================================================
