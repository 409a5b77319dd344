//! # Resolver
//!
//! Unit and line costs for single products and combos under one
//! [`PricingContext`].
//!
//! ## Lookup Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PRODUCT (variant_id, country, carrier)                                │
//! │                                                                         │
//! │    product in config? ──no──► 0.00, warn!  (orders must still total)   │
//! │          │ yes                                                          │
//! │          ▼                                                              │
//! │    first override with country == ctx && carrier == ctx?               │
//! │          ├── yes, has cost ──► override.cost    method = override      │
//! │          └── otherwise     ──► base_cost        method = base          │
//! │                                (missing baseCost: 0.00, warn!)         │
//! │                                                                         │
//! │  COMBO (combo_id, country, carrier)                                    │
//! │                                                                         │
//! │    combo in config? ──no──► ComboNotFound                              │
//! │    cogsRule present? ──no──► ComboRuleMissing                          │
//! │          │ yes                                                          │
//! │          ▼                                                              │
//! │    mode = override ──► matching ComboOverride or ComboOverrideMissing  │
//! │    mode = sum      ──► Σ item.qty × product unit cost                  │
//! │                        ──► discount ──► round to cents                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every function here is pure: no state survives a call, so any number of
//! threads may resolve against the same snapshot at once.

use tracing::{debug, warn};

use crate::error::{CoreResult, CostError};
use crate::money::Money;
use crate::types::{
    AppliedDiscount, CogsRule, ComboCost, CostConfig, CostKind, CostMethod, CostResult,
    PricingContext, SubjectId, VariantId,
};

// =============================================================================
// Single Product
// =============================================================================

/// A resolved product unit cost and the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct UnitCost {
    pub cost: Money,
    pub method: CostMethod,
}

pub(crate) fn lookup_product(
    config: &CostConfig,
    variant_id: VariantId,
    ctx: &PricingContext,
) -> UnitCost {
    let Some(product) = config.product(variant_id) else {
        warn!(variant_id, context = %ctx, "No cost entry for variant, costing at zero");
        return UnitCost {
            cost: Money::zero(),
            method: CostMethod::Base,
        };
    };

    if let Some(cost) = product.find_override(ctx).and_then(|entry| entry.cost) {
        return UnitCost {
            cost,
            method: CostMethod::Override,
        };
    }

    let cost = product.base_cost.unwrap_or_else(|| {
        warn!(variant_id, "Cost entry has no baseCost, costing at zero");
        Money::zero()
    });
    UnitCost {
        cost,
        method: CostMethod::Base,
    }
}

/// Unit cost of one variant in one context.
///
/// An unknown variant costs zero (and logs a warning) rather than failing,
/// so an order still totals against an incomplete config.
///
/// ## Example
/// ```rust
/// use cogs_core::money::Money;
/// use cogs_core::resolve::product_unit_cost;
/// use cogs_core::types::{CostConfig, PricingContext};
///
/// let config = CostConfig::default();
/// let ctx = PricingContext::new("US", "YunTu");
/// assert_eq!(product_unit_cost(&config, 99, &ctx), Money::zero());
/// ```
pub fn product_unit_cost(config: &CostConfig, variant_id: VariantId, ctx: &PricingContext) -> Money {
    lookup_product(config, variant_id, ctx).cost
}

/// Prices `quantity` units of one variant.
///
/// ## Errors
/// - [`CostError::InvalidQuantity`] for a negative quantity
/// - [`CostError::NegativeCost`] when the configured cost is below zero
/// - [`CostError::Overflow`] when the line total is out of range
///
/// Zero quantity is fine and yields a zero total.
pub fn resolve_product(
    config: &CostConfig,
    variant_id: VariantId,
    ctx: &PricingContext,
    quantity: i64,
) -> CoreResult<CostResult> {
    let subject = SubjectId::Variant(variant_id);
    ensure_quantity(&subject, quantity)?;

    let unit = lookup_product(config, variant_id, ctx);
    ensure_non_negative(&subject, unit.cost)?;
    let total_cost = line_total(&subject, unit.cost, quantity)?;

    let result = CostResult {
        subject_id: subject,
        kind: CostKind::Product,
        quantity,
        unit_cost: unit.cost,
        total_cost,
        method: unit.method,
        applied_discount: None,
    };
    debug!(variant_id, quantity, method = %result.method, unit_cost = %result.unit_cost, "Resolved product");
    Ok(result)
}

// =============================================================================
// Combo
// =============================================================================

/// Price of one combo instance.
#[derive(Debug, Clone, PartialEq)]
struct ComboPrice {
    unit_cost: Money,
    method: CostMethod,
    applied_discount: Option<AppliedDiscount>,
}

fn price_combo(config: &CostConfig, combo: &ComboCost, ctx: &PricingContext) -> CoreResult<ComboPrice> {
    let Some(rule) = &combo.cogs_rule else {
        return Err(CostError::ComboRuleMissing {
            combo_id: combo.combo_id.clone(),
        });
    };

    match rule {
        CogsRule::Override => {
            let unit_cost = combo
                .find_override(ctx)
                .and_then(|entry| entry.override_cost)
                .ok_or_else(|| CostError::ComboOverrideMissing {
                    combo_id: combo.combo_id.clone(),
                    country: ctx.country.clone(),
                    shipping_company: ctx.shipping_company.clone(),
                })?;

            Ok(ComboPrice {
                unit_cost,
                method: CostMethod::ComboOverride,
                applied_discount: None,
            })
        }
        CogsRule::Sum { discount } => {
            let overflow = || CostError::Overflow {
                subject: SubjectId::Combo(combo.combo_id.clone()).to_string(),
            };

            // Unrounded until the very end
            let sum = combo
                .items
                .iter()
                .try_fold(Money::zero(), |acc, item| {
                    let line = lookup_product(config, item.variant_id, ctx)
                        .cost
                        .checked_mul_quantity(item.qty)?;
                    acc.checked_add(line)
                })
                .ok_or_else(overflow)?;

            let price = match discount.filter(|d| !d.value().is_zero()) {
                None => ComboPrice {
                    unit_cost: sum.round_to_cents(),
                    method: CostMethod::ComboSum,
                    applied_discount: None,
                },
                Some(discount) => {
                    let unit_cost = discount.apply(sum).ok_or_else(overflow)?.round_to_cents();
                    let amount = sum
                        .round_to_cents()
                        .checked_sub(unit_cost)
                        .ok_or_else(overflow)?;
                    ComboPrice {
                        unit_cost,
                        method: CostMethod::ComboSum,
                        applied_discount: Some(AppliedDiscount {
                            discount_type: discount.discount_type(),
                            value: discount.value(),
                            amount,
                        }),
                    }
                }
            };
            Ok(price)
        }
    }
}

fn find_combo<'a>(config: &'a CostConfig, combo_id: &str) -> CoreResult<&'a ComboCost> {
    config.combo(combo_id).ok_or_else(|| CostError::ComboNotFound {
        combo_id: combo_id.to_string(),
    })
}

/// Cost of one instance of a combo, rounded to cents.
///
/// ## Errors
/// - [`CostError::ComboNotFound`] if the id is not configured
/// - [`CostError::ComboOverrideMissing`] for an override-mode combo with no
///   override cost for `ctx`
/// - [`CostError::ComboRuleMissing`] if the combo has no `cogsRule`
/// - [`CostError::Overflow`] if the constituent sum is out of range
pub fn combo_unit_cost(config: &CostConfig, combo_id: &str, ctx: &PricingContext) -> CoreResult<Money> {
    let combo = find_combo(config, combo_id)?;
    Ok(price_combo(config, combo, ctx)?.unit_cost)
}

/// Prices `quantity` instances of a combo.
///
/// `applied_discount` is set only for a Sum-mode combo with a non-zero
/// discount; its `amount` is the currency removed from one instance.
pub fn resolve_combo(
    config: &CostConfig,
    combo_id: &str,
    ctx: &PricingContext,
    quantity: i64,
) -> CoreResult<CostResult> {
    let subject = SubjectId::Combo(combo_id.to_string());
    ensure_quantity(&subject, quantity)?;

    let combo = find_combo(config, combo_id)?;
    let price = price_combo(config, combo, ctx)?;
    ensure_non_negative(&subject, price.unit_cost)?;
    let total_cost = line_total(&subject, price.unit_cost, quantity)?;

    debug!(combo_id, quantity, method = %price.method, unit_cost = %price.unit_cost, "Resolved combo");
    Ok(CostResult {
        subject_id: subject,
        kind: CostKind::Combo,
        quantity,
        unit_cost: price.unit_cost,
        total_cost,
        method: price.method,
        applied_discount: price.applied_discount,
    })
}

// =============================================================================
// Boundary Checks
// =============================================================================

fn ensure_quantity(subject: &SubjectId, quantity: i64) -> CoreResult<()> {
    if quantity < 0 {
        return Err(CostError::InvalidQuantity {
            subject: subject.to_string(),
            quantity,
        });
    }
    Ok(())
}

fn line_total(subject: &SubjectId, unit_cost: Money, quantity: i64) -> CoreResult<Money> {
    unit_cost
        .checked_mul_quantity(quantity)
        .ok_or_else(|| CostError::Overflow {
            subject: subject.to_string(),
        })
}

fn ensure_non_negative(subject: &SubjectId, cost: Money) -> CoreResult<()> {
    if cost.is_negative() {
        return Err(CostError::NegativeCost {
            subject: subject.to_string(),
            cost,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
