//! # Validation Module
//!
//! Structural checks over a [`CostConfig`] snapshot.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  ├── Types and shapes (numbers are numbers)                            │
//! │  ├── Missing fields parse as None / empty, never fail                  │
//! │  └── cogsRule must be a representable Sum / Override rule              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields, non-negative costs, positive quantities          │
//! │  ├── Discount ranges                                                   │
//! │  ├── Duplicate ids and combo items (errors)                            │
//! │  └── Duplicate overrides (warnings)                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Resolver                                                     │
//! │  └── Best-effort: runs even against an invalid snapshot                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `validate` never fails fast: it walks the whole snapshot and returns every
//! finding, so a UI can show all problems at once.
//!
//! ## Usage
//! ```rust
//! use cogs_core::types::CostConfig;
//! use cogs_core::validation::validate;
//!
//! let config = CostConfig::default();
//! let report = validate(&config);
//!
//! assert!(!report.valid);
//! assert!(report.errors.contains(&"version is required".to_string()));
//! ```

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{CogsRule, ComboCost, ComboDiscount, CostConfig, ProductCost};

/// Outcome of [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ValidationReport {
    /// `true` when `errors` is empty. Warnings do not invalidate.
    pub valid: bool,

    /// Configuration defects.
    pub errors: Vec<String>,

    /// Legal but suspicious entries (duplicate override keys).
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Accumulates findings while walking a snapshot.
#[derive(Debug, Default)]
struct Findings {
    errors: Vec<ValidationError>,
    warnings: Vec<String>,
}

impl Findings {
    fn error(&mut self, err: ValidationError) {
        self.errors.push(err);
    }

    fn required(&mut self, field: String, value: &str) {
        if value.trim().is_empty() {
            self.error(ValidationError::Required { field });
        }
    }

    /// Reports `field` as required when absent; passes the value through.
    fn present<T>(&mut self, field: String, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.error(ValidationError::Required { field });
        }
        value
    }

    fn positive(&mut self, field: String, value: i64) {
        if value <= 0 {
            self.error(ValidationError::MustBePositive { field });
        }
    }

    fn non_negative(&mut self, field: String, value: Money) {
        if value.is_negative() {
            self.error(ValidationError::Negative { field });
        }
    }

    fn into_report(self) -> ValidationReport {
        ValidationReport {
            valid: self.errors.is_empty(),
            errors: self.errors.iter().map(ToString::to_string).collect(),
            warnings: self.warnings,
        }
    }
}

// =============================================================================
// Snapshot Validation
// =============================================================================

/// Validates a cost config snapshot.
///
/// ## Checks
/// - `version` and `currency` present
/// - `products` non-empty; each with a positive, unique `variantId` and a
///   `baseCost >= 0`
/// - every override has `country`, `shippingCompany` and a non-negative cost
/// - every combo has `comboId` (unique), `name`, a `cogsRule`, a positive
///   `triggerQuantity` and non-empty `items`, each with a positive
///   `variantId` (unique within the combo) and `qty`
/// - Sum-mode discounts: percent in `0..=100`, fixed `>= 0`
///
/// Duplicate `(country, shippingCompany)` overrides are reported as
/// warnings: resolution uses the first one.
pub fn validate(config: &CostConfig) -> ValidationReport {
    let mut findings = Findings::default();

    findings.required("version".to_string(), &config.version);
    findings.required("currency".to_string(), &config.currency);

    if config.products.is_empty() {
        findings.error(ValidationError::Empty {
            field: "products".to_string(),
        });
    }

    let mut seen_variants = HashSet::new();
    for (index, product) in config.products.iter().enumerate() {
        let field = format!("products[{index}].variantId");
        if let Some(variant_id) = findings.present(field.clone(), product.variant_id) {
            findings.positive(field.clone(), variant_id);
            if !seen_variants.insert(variant_id) {
                findings.error(ValidationError::Duplicate {
                    field,
                    value: variant_id.to_string(),
                });
            }
        }
        validate_product(&mut findings, index, product);
    }

    let mut seen_combos = HashSet::new();
    for (index, combo) in config.combos.iter().enumerate() {
        if !combo.combo_id.is_empty() && !seen_combos.insert(combo.combo_id.as_str()) {
            findings.error(ValidationError::Duplicate {
                field: format!("combos[{index}].comboId"),
                value: combo.combo_id.clone(),
            });
        }
        validate_combo(&mut findings, index, combo);
    }

    findings.into_report()
}

fn validate_product(findings: &mut Findings, index: usize, product: &ProductCost) {
    let path = format!("products[{index}]");

    let field = format!("{path}.baseCost");
    if let Some(base_cost) = findings.present(field.clone(), product.base_cost) {
        findings.non_negative(field, base_cost);
    }

    let mut seen = HashSet::new();
    for (o, entry) in product.overrides.iter().enumerate() {
        let field = format!("{path}.overrides[{o}]");
        findings.required(format!("{field}.country"), &entry.country);
        findings.required(format!("{field}.shippingCompany"), &entry.shipping_company);
        if let Some(cost) = findings.present(format!("{field}.cost"), entry.cost) {
            findings.non_negative(format!("{field}.cost"), cost);
        }

        if !seen.insert((entry.country.as_str(), entry.shipping_company.as_str())) {
            findings.warnings.push(format!(
                "{field} duplicates {}/{}; the first match is used",
                entry.country, entry.shipping_company
            ));
        }
    }
}

fn validate_combo(findings: &mut Findings, index: usize, combo: &ComboCost) {
    let path = format!("combos[{index}]");

    findings.required(format!("{path}.comboId"), &combo.combo_id);
    findings.required(format!("{path}.name"), &combo.name);

    if combo.items.is_empty() {
        findings.error(ValidationError::Empty {
            field: format!("{path}.items"),
        });
    }
    let mut seen_items = HashSet::new();
    for (i, item) in combo.items.iter().enumerate() {
        let field = format!("{path}.items[{i}].variantId");
        findings.positive(field.clone(), item.variant_id);
        if !seen_items.insert(item.variant_id) {
            findings.error(ValidationError::Duplicate {
                field,
                value: item.variant_id.to_string(),
            });
        }
        findings.positive(format!("{path}.items[{i}].qty"), item.qty);
    }

    let field = format!("{path}.triggerQuantity");
    if let Some(trigger) = findings.present(field.clone(), combo.trigger_quantity) {
        findings.positive(field, trigger);
    }

    let rule = findings.present(format!("{path}.cogsRule"), combo.cogs_rule.as_ref());
    if let Some(CogsRule::Sum {
        discount: Some(discount),
    }) = rule
    {
        let field = format!("{path}.cogsRule.discountValue");
        match discount {
            ComboDiscount::Percent(pct) => {
                if *pct < Decimal::ZERO || *pct > Decimal::ONE_HUNDRED {
                    findings.error(ValidationError::OutOfRange {
                        field,
                        min: 0,
                        max: 100,
                    });
                }
            }
            ComboDiscount::Fixed(amount) => findings.non_negative(field, *amount),
        }
    }

    let mut seen = HashSet::new();
    for (o, entry) in combo.overrides.iter().enumerate() {
        let field = format!("{path}.overrides[{o}]");
        findings.required(format!("{field}.country"), &entry.country);
        findings.required(format!("{field}.shippingCompany"), &entry.shipping_company);
        let cost_field = format!("{field}.overrideCost");
        if let Some(cost) = findings.present(cost_field.clone(), entry.override_cost) {
            findings.non_negative(cost_field, cost);
        }

        if !seen.insert((entry.country.as_str(), entry.shipping_company.as_str())) {
            findings.warnings.push(format!(
                "{field} duplicates {}/{}; the first match is used",
                entry.country, entry.shipping_company
            ));
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_config;
    use crate::types::{ComboItem, ComboOverride, CostOverride};
    use rust_decimal_macros::dec;

    #[test]
    fn test_sample_config_is_valid() {
        let report = validate(&sample_config());
        assert!(report.valid, "unexpected errors: {:?}", report.errors);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_empty_config_reports_everything() {
        let report = validate(&CostConfig::default());
        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec![
                "version is required".to_string(),
                "currency is required".to_string(),
                "products must not be empty".to_string(),
            ]
        );
    }

    #[test]
    fn test_product_findings() {
        let mut config = sample_config();
        config.products[0].base_cost = Some(Money::new(dec!(-1)));
        config.products[0].overrides.push(CostOverride {
            country: String::new(),
            shipping_company: "YunTu".into(),
            cost: Some(Money::new(dec!(-0.5))),
        });
        config.products[1].variant_id = config.products[0].variant_id;

        let report = validate(&config);
        assert!(!report.valid);
        assert!(report.errors.contains(&"products[0].baseCost must not be negative".to_string()));
        assert!(report.errors.contains(&"products[0].overrides[1].country is required".to_string()));
        assert!(report.errors.contains(&"products[0].overrides[1].cost must not be negative".to_string()));
        assert!(report.errors.contains(&"products[1].variantId '1' already exists".to_string()));
    }

    #[test]
    fn test_combo_findings() {
        let mut config = sample_config();
        let combo = &mut config.combos[0];
        combo.name = String::new();
        combo.items.push(ComboItem {
            variant_id: 2,
            qty: 0,
        });
        combo.trigger_quantity = Some(0);
        combo.cogs_rule = Some(CogsRule::Sum {
            discount: Some(ComboDiscount::Percent(dec!(150))),
        });

        let report = validate(&config);
        assert!(!report.valid);
        assert!(report.errors.contains(&"combos[0].name is required".to_string()));
        assert!(report.errors.contains(&"combos[0].items[1].qty must be positive".to_string()));
        assert!(report.errors.contains(&"combos[0].triggerQuantity must be positive".to_string()));
        assert!(report
            .errors
            .contains(&"combos[0].cogsRule.discountValue must be between 0 and 100".to_string()));
    }

    #[test]
    fn test_discount_ranges() {
        let mut config = sample_config();

        config.combos[0].cogs_rule = Some(CogsRule::Sum {
            discount: Some(ComboDiscount::Percent(dec!(100))),
        });
        assert!(validate(&config).valid);

        config.combos[0].cogs_rule = Some(CogsRule::Sum {
            discount: Some(ComboDiscount::Percent(dec!(-1))),
        });
        assert!(!validate(&config).valid);

        config.combos[0].cogs_rule = Some(CogsRule::Sum {
            discount: Some(ComboDiscount::Fixed(Money::zero())),
        });
        assert!(validate(&config).valid);

        config.combos[0].cogs_rule = Some(CogsRule::Sum {
            discount: Some(ComboDiscount::Fixed(Money::new(dec!(-2)))),
        });
        let report = validate(&config);
        assert_eq!(
            report.errors,
            vec!["combos[0].cogsRule.discountValue must not be negative".to_string()]
        );
    }

    #[test]
    fn test_empty_combo_items() {
        let mut config = sample_config();
        config.combos[1].items.clear();

        let report = validate(&config);
        assert_eq!(report.errors, vec!["combos[1].items must not be empty".to_string()]);
    }

    #[test]
    fn test_duplicate_combo_id() {
        let mut config = sample_config();
        let copy = config.combos[0].clone();
        config.combos.push(copy);

        let report = validate(&config);
        assert!(!report.valid);
        assert!(report.errors[0].ends_with("comboId 'MUG-PAIR' already exists"));
    }

    #[test]
    fn test_duplicate_overrides_are_warnings() {
        let mut config = sample_config();
        let first = config.products[0].overrides[0].clone();
        config.products[0].overrides.push(first);
        config.combos[1].overrides.push(ComboOverride {
            country: "US".into(),
            shipping_company: "YunTu".into(),
            override_cost: Some(Money::from_cents(1)),
        });

        let report = validate(&config);
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings[0].starts_with("products[0].overrides[1] duplicates CA/YunTu"));
    }

    #[test]
    fn test_missing_product_fields_all_reported() {
        let config = CostConfig::from_json(
            r#"{"products":[{"variantId":1},{"variantId":2,"baseCost":-1}]}"#,
        )
        .unwrap();

        let report = validate(&config);
        assert!(!report.valid);
        assert!(report.errors.contains(&"products[0].baseCost is required".to_string()));
        assert!(report.errors.contains(&"products[1].baseCost must not be negative".to_string()));
    }

    #[test]
    fn test_missing_nested_fields_reported() {
        let config = CostConfig::from_json(
            r#"{
                "version": "1",
                "currency": "USD",
                "products": [{
                    "baseCost": 1,
                    "overrides": [{ "country": "CA", "shippingCompany": "YunTu" }]
                }],
                "combos": [{
                    "comboId": "PAIR",
                    "name": "Pair",
                    "items": [{ "variantId": 1, "qty": 2 }],
                    "overrides": [{ "country": "US", "shippingCompany": "YunTu" }]
                }]
            }"#,
        )
        .unwrap();

        let report = validate(&config);
        assert_eq!(
            report.errors,
            vec![
                "products[0].variantId is required".to_string(),
                "products[0].overrides[0].cost is required".to_string(),
                "combos[0].triggerQuantity is required".to_string(),
                "combos[0].cogsRule is required".to_string(),
                "combos[0].overrides[0].overrideCost is required".to_string(),
            ]
        );
    }

    #[test]
    fn test_duplicate_combo_item_variant() {
        let mut config = sample_config();
        config.combos[0].items.push(ComboItem {
            variant_id: 1,
            qty: 2,
        });

        let report = validate(&config);
        assert_eq!(
            report.errors,
            vec!["combos[0].items[1].variantId '1' already exists".to_string()]
        );
    }

    #[test]
    fn test_non_positive_item_variant() {
        let mut config = sample_config();
        config.combos[1].items[0].variant_id = 0;

        let report = validate(&config);
        assert_eq!(
            report.errors,
            vec!["combos[1].items[0].variantId must be positive".to_string()]
        );
    }
}
