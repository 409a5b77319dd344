//! # Domain Types
//!
//! The cost configuration snapshot and the records the resolver produces.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  CostConfig (snapshot)   version, currency                      │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────────────┐          ┌──────────────────────────────┐ │   │
//! │  │  │  ProductCost    │          │  ComboCost                   │ │   │
//! │  │  │  variant_id     │◄─items───│  combo_id, items             │ │   │
//! │  │  │  base_cost      │          │  trigger_quantity            │ │   │
//! │  │  │  overrides[]    │          │  cogs_rule: Sum | Override   │ │   │
//! │  │  │   (country,     │          │  overrides[]                 │ │   │
//! │  │  │    carrier,     │          │   (country, carrier,         │ │   │
//! │  │  │    cost)        │          │    override_cost)            │ │   │
//! │  │  └─────────────────┘          └──────────────────────────────┘ │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  PricingContext (per call) ──► Resolver ──► CostResult (per line)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Discipline
//! A `CostConfig` is never edited while it is being resolved against. To
//! change costs, build a new snapshot and swap the whole thing.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

/// Shopify-style numeric variant identifier.
pub type VariantId = i64;

// =============================================================================
// Pricing Context
// =============================================================================

/// Destination country and carrier for one resolution call.
///
/// Matching is exact: `"CA"` does not match `"ca"`. Callers canonicalize
/// (ISO-2 country codes, carrier names as configured).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PricingContext {
    pub country: String,
    pub shipping_company: String,
}

impl PricingContext {
    /// Creates a context from a country code and carrier name.
    pub fn new(country: impl Into<String>, shipping_company: impl Into<String>) -> Self {
        PricingContext {
            country: country.into(),
            shipping_company: shipping_company.into(),
        }
    }

    /// Exact, case-sensitive match against an override's key.
    #[inline]
    pub fn matches(&self, country: &str, shipping_company: &str) -> bool {
        self.country == country && self.shipping_company == shipping_company
    }
}

impl fmt::Display for PricingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.country, self.shipping_company)
    }
}

// =============================================================================
// Cost Config Snapshot
// =============================================================================

/// The whole cost model: base costs, geo/carrier overrides and combo rules.
///
/// Every field a snapshot author can forget is optional or defaulted on the
/// wire, so a snapshot with missing fields still parses and
/// [`crate::validation::validate`] reports every missing field at once
/// instead of failing on the first one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CostConfig {
    /// Snapshot version label.
    #[serde(default)]
    pub version: String,

    /// ISO 4217 code every amount in the snapshot is expressed in.
    #[serde(default)]
    pub currency: String,

    #[serde(default)]
    pub products: Vec<ProductCost>,

    #[serde(default)]
    pub combos: Vec<ComboCost>,
}

impl CostConfig {
    /// Parses a snapshot from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Finds a product by variant id (first entry wins on duplicates).
    pub fn product(&self, variant_id: VariantId) -> Option<&ProductCost> {
        self.products
            .iter()
            .find(|p| p.variant_id == Some(variant_id))
    }

    /// Finds a combo by id (first entry wins on duplicates).
    pub fn combo(&self, combo_id: &str) -> Option<&ComboCost> {
        self.combos.iter().find(|c| c.combo_id == combo_id)
    }
}

// =============================================================================
// Product Cost
// =============================================================================

/// Cost entry for one sellable variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductCost {
    /// Required; `None` only in a snapshot that fails validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,

    /// Informational only; never used for lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    /// Required; a missing base cost resolves as zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_cost: Option<Money>,

    #[serde(default)]
    pub overrides: Vec<CostOverride>,
}

impl ProductCost {
    /// Returns the first override matching the context.
    ///
    /// Only the first match is considered, even if it has no cost.
    pub fn find_override(&self, ctx: &PricingContext) -> Option<&CostOverride> {
        self.overrides
            .iter()
            .find(|o| ctx.matches(&o.country, &o.shipping_company))
    }
}

/// Full cost replacement (not a delta) for one country/carrier pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CostOverride {
    #[serde(default)]
    pub country: String,

    #[serde(default)]
    pub shipping_company: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Money>,
}

// =============================================================================
// Combo Cost
// =============================================================================

/// A multi-item bundle rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ComboCost {
    #[serde(default)]
    pub combo_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub items: Vec<ComboItem>,

    /// Total unit count across `items` that activates one combo instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_quantity: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<CogsRuleSpec>")]
    pub cogs_rule: Option<CogsRule>,

    #[serde(default)]
    pub overrides: Vec<ComboOverride>,
}

impl ComboCost {
    /// Returns the first override matching the context.
    pub fn find_override(&self, ctx: &PricingContext) -> Option<&ComboOverride> {
        self.overrides
            .iter()
            .find(|o| ctx.matches(&o.country, &o.shipping_company))
    }
}

/// One constituent of a combo.
///
/// Missing fields read as 0, which validation rejects as non-positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ComboItem {
    #[serde(default)]
    pub variant_id: VariantId,
    #[serde(default)]
    pub qty: i64,
}

/// Combo cost for one country/carrier pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ComboOverride {
    #[serde(default)]
    pub country: String,

    #[serde(default)]
    pub shipping_company: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_cost: Option<Money>,
}

// =============================================================================
// COGS Rule
// =============================================================================

/// How one instance of a combo is priced.
///
/// ## Modes
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  SUM                                                                    │
/// │    Σ item.qty × product unit cost  ──►  optional discount  ──►  round  │
/// │                                                                         │
/// │  OVERRIDE                                                               │
/// │    ComboOverride for (country, carrier)  ──►  required, no fallback    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// On the wire this is the flat `{ mode, discountType?, discountValue? }`
/// object; see [`CogsRuleSpec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CogsRuleSpec", into = "CogsRuleSpec")]
pub enum CogsRule {
    /// Sum the constituents, then apply the discount if there is one.
    Sum { discount: Option<ComboDiscount> },
    /// Take the cost from `ComboCost::overrides` only.
    Override,
}

/// Discount applied to a Sum-mode combo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComboDiscount {
    /// Percentage off the sum (10 = 10%).
    Percent(Decimal),
    /// Fixed amount off the sum.
    Fixed(Money),
}

impl ComboDiscount {
    pub fn discount_type(&self) -> DiscountType {
        match self {
            ComboDiscount::Percent(_) => DiscountType::Percent,
            ComboDiscount::Fixed(_) => DiscountType::Fixed,
        }
    }

    /// The configured value: a percentage or a currency amount.
    pub fn value(&self) -> Decimal {
        match self {
            ComboDiscount::Percent(pct) => *pct,
            ComboDiscount::Fixed(amount) => amount.amount(),
        }
    }

    /// Applies the discount to `sum`, without rounding. Never below zero;
    /// `None` on overflow.
    pub fn apply(&self, sum: Money) -> Option<Money> {
        let discounted = match self {
            ComboDiscount::Percent(pct) => sum.checked_percentage_discount(*pct)?,
            ComboDiscount::Fixed(amount) => sum.checked_sub(*amount)?,
        };
        Some(discounted.floor_at_zero())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum DiscountType {
    Percent,
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum RuleMode {
    Sum,
    Override,
}

/// Wire form of [`CogsRule`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CogsRuleSpec {
    pub mode: RuleMode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_type: Option<DiscountType>,

    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(type = "number | null")]
    pub discount_value: Option<Decimal>,
}

impl TryFrom<CogsRuleSpec> for CogsRule {
    type Error = String;

    fn try_from(spec: CogsRuleSpec) -> Result<Self, Self::Error> {
        match spec.mode {
            RuleMode::Override => Ok(CogsRule::Override),
            RuleMode::Sum => {
                let discount = match (spec.discount_type, spec.discount_value) {
                    (None, None) => None,
                    (Some(DiscountType::Percent), Some(value)) => {
                        Some(ComboDiscount::Percent(value))
                    }
                    (Some(DiscountType::Fixed), Some(value)) => {
                        Some(ComboDiscount::Fixed(Money::new(value)))
                    }
                    (Some(_), None) => {
                        return Err("discountValue is required when discountType is set".into())
                    }
                    (None, Some(_)) => {
                        return Err("discountType is required when discountValue is set".into())
                    }
                };
                Ok(CogsRule::Sum { discount })
            }
        }
    }
}

impl From<CogsRule> for CogsRuleSpec {
    fn from(rule: CogsRule) -> Self {
        match rule {
            CogsRule::Override => CogsRuleSpec {
                mode: RuleMode::Override,
                discount_type: None,
                discount_value: None,
            },
            CogsRule::Sum { discount } => CogsRuleSpec {
                mode: RuleMode::Sum,
                discount_type: discount.map(|d| d.discount_type()),
                discount_value: discount.map(|d| d.value()),
            },
        }
    }
}

// =============================================================================
// Order Input
// =============================================================================

/// One order line as delivered by the order-data provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    pub variant_id: VariantId,
    pub quantity: i64,
}

impl LineItem {
    pub fn new(variant_id: VariantId, quantity: i64) -> Self {
        LineItem {
            variant_id,
            quantity,
        }
    }
}

// =============================================================================
// Cost Result
// =============================================================================

/// What a [`CostResult`] prices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum SubjectId {
    Variant(VariantId),
    Combo(String),
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectId::Variant(id) => write!(f, "variant {id}"),
            SubjectId::Combo(id) => write!(f, "combo {id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum CostKind {
    Product,
    Combo,
}

/// Which rule produced a unit cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum CostMethod {
    /// `ProductCost::base_cost` (also used for unconfigured variants at 0).
    Base,
    /// A product `CostOverride` matched the context.
    Override,
    /// Sum-mode combo.
    ComboSum,
    /// Override-mode combo.
    ComboOverride,
}

impl fmt::Display for CostMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CostMethod::Base => "base",
            CostMethod::Override => "override",
            CostMethod::ComboSum => "comboSum",
            CostMethod::ComboOverride => "comboOverride",
        };
        f.write_str(name)
    }
}

/// The discount that was taken off a Sum-mode combo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AppliedDiscount {
    #[serde(rename = "type")]
    pub discount_type: DiscountType,

    /// The configured percentage or fixed amount.
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub value: Decimal,

    /// Currency amount removed from one combo instance.
    pub amount: Money,
}

/// One priced line. Built fresh per call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CostResult {
    pub subject_id: SubjectId,
    pub kind: CostKind,
    pub quantity: i64,
    pub unit_cost: Money,
    pub total_cost: Money,
    pub method: CostMethod,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub applied_discount: Option<AppliedDiscount>,
}

/// A combo and how many instances of it an order triggers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DetectedCombo {
    pub combo_id: String,
    pub quantity: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_config_from_json() {
        let config = CostConfig::from_json(
            r#"{
                "version": "2024-06",
                "currency": "USD",
                "products": [
                    {
                        "variantId": 1,
                        "sku": "MUG-BLK",
                        "baseCost": 8.43,
                        "overrides": [
                            { "country": "CA", "shippingCompany": "YunTu", "cost": 9.50 }
                        ]
                    }
                ],
                "combos": [
                    {
                        "comboId": "MUG-PAIR",
                        "name": "Two mugs",
                        "items": [{ "variantId": 1, "qty": 2 }],
                        "triggerQuantity": 2,
                        "cogsRule": { "mode": "sum", "discountType": "percent", "discountValue": 10 }
                    }
                ]
            }"#,
        )
        .unwrap();

        let product = config.product(1).unwrap();
        assert_eq!(product.base_cost, Some(Money::new(dec!(8.43))));
        assert_eq!(product.overrides[0].cost, Some(Money::new(dec!(9.5))));
        assert_eq!(product.sku.as_deref(), Some("MUG-BLK"));

        let combo = config.combo("MUG-PAIR").unwrap();
        assert_eq!(combo.trigger_quantity, Some(2));
        assert_eq!(
            combo.cogs_rule,
            Some(CogsRule::Sum {
                discount: Some(ComboDiscount::Percent(dec!(10)))
            })
        );
        assert!(combo.overrides.is_empty());
    }

    #[test]
    fn test_missing_required_fields_still_parse() {
        let config = CostConfig::from_json(
            r#"{
                "products": [
                    { "overrides": [{ "country": "CA", "shippingCompany": "YunTu" }] },
                    { "variantId": 2, "baseCost": -1 }
                ],
                "combos": [{ "comboId": "X", "items": [{ "qty": 1 }] }]
            }"#,
        )
        .unwrap();

        assert_eq!(config.products[0].variant_id, None);
        assert_eq!(config.products[0].base_cost, None);
        assert_eq!(config.products[0].overrides[0].cost, None);
        assert_eq!(config.products[1].base_cost, Some(Money::new(dec!(-1))));
        assert_eq!(config.combos[0].trigger_quantity, None);
        assert_eq!(config.combos[0].cogs_rule, None);
        assert_eq!(config.combos[0].items[0].variant_id, 0);
        assert!(config.product(2).is_some());
    }

    #[test]
    fn test_missing_strings_default_to_empty() {
        let config = CostConfig::from_json(r#"{ "products": [] }"#).unwrap();
        assert!(config.version.is_empty());
        assert!(config.currency.is_empty());
        assert!(config.combos.is_empty());
    }

    #[test]
    fn test_cogs_rule_modes() {
        let rule: CogsRule = serde_json::from_str(r#"{ "mode": "override" }"#).unwrap();
        assert_eq!(rule, CogsRule::Override);

        let rule: CogsRule = serde_json::from_str(r#"{ "mode": "sum" }"#).unwrap();
        assert_eq!(rule, CogsRule::Sum { discount: None });

        let rule: CogsRule =
            serde_json::from_str(r#"{ "mode": "sum", "discountType": "fixed", "discountValue": 2.5 }"#)
                .unwrap();
        assert_eq!(
            rule,
            CogsRule::Sum {
                discount: Some(ComboDiscount::Fixed(Money::new(dec!(2.5))))
            }
        );
    }

    #[test]
    fn test_cogs_rule_rejects_half_specified_discount() {
        let err = serde_json::from_str::<CogsRule>(r#"{ "mode": "sum", "discountType": "percent" }"#)
            .unwrap_err();
        assert!(err.to_string().contains("discountValue is required"));

        assert!(serde_json::from_str::<CogsRule>(r#"{ "mode": "sum", "discountValue": 5 }"#).is_err());
        assert!(serde_json::from_str::<CogsRule>(r#"{ "mode": "bogus" }"#).is_err());
    }

    #[test]
    fn test_cogs_rule_serializes_flat() {
        let rule = CogsRule::Sum {
            discount: Some(ComboDiscount::Percent(dec!(10))),
        };
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["mode"], "sum");
        assert_eq!(json["discountType"], "percent");
        assert_eq!(json["discountValue"], 10.0);

        let json = serde_json::to_value(CogsRule::Override).unwrap();
        assert_eq!(json, serde_json::json!({ "mode": "override" }));
    }

    #[test]
    fn test_override_match_is_exact_and_first_wins() {
        let product = ProductCost {
            variant_id: Some(1),
            sku: None,
            base_cost: Some(Money::from_cents(843)),
            overrides: vec![
                CostOverride {
                    country: "CA".into(),
                    shipping_company: "YunTu".into(),
                    cost: Some(Money::from_cents(950)),
                },
                CostOverride {
                    country: "CA".into(),
                    shipping_company: "YunTu".into(),
                    cost: Some(Money::from_cents(1200)),
                },
            ],
        };

        let hit = product.find_override(&PricingContext::new("CA", "YunTu")).unwrap();
        assert_eq!(hit.cost, Some(Money::from_cents(950)));

        assert!(product.find_override(&PricingContext::new("ca", "YunTu")).is_none());
        assert!(product.find_override(&PricingContext::new("CA", "yuntu")).is_none());
    }

    #[test]
    fn test_cost_result_wire_shape() {
        let result = CostResult {
            subject_id: SubjectId::Combo("MUG-PAIR".into()),
            kind: CostKind::Combo,
            quantity: 1,
            unit_cost: Money::from_cents(900),
            total_cost: Money::from_cents(900),
            method: CostMethod::ComboSum,
            applied_discount: Some(AppliedDiscount {
                discount_type: DiscountType::Percent,
                value: dec!(10),
                amount: Money::from_cents(100),
            }),
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["subjectId"], "MUG-PAIR");
        assert_eq!(json["kind"], "combo");
        assert_eq!(json["method"], "comboSum");
        assert_eq!(json["appliedDiscount"]["type"], "percent");
        assert_eq!(json["appliedDiscount"]["amount"], 1.0);

        let product = CostResult {
            subject_id: SubjectId::Variant(7),
            applied_discount: None,
            method: CostMethod::Base,
            kind: CostKind::Product,
            ..result
        };
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["subjectId"], 7);
        assert!(json.get("appliedDiscount").is_none());
    }
}
