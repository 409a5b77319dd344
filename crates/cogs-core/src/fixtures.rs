//! Shared test snapshot.

use rust_decimal_macros::dec;

use crate::money::Money;
use crate::types::{
    CogsRule, ComboCost, ComboDiscount, ComboItem, ComboOverride, CostConfig, CostOverride,
    ProductCost,
};

/// A small but complete snapshot.
///
/// ```text
/// variant 1  base 8.43   CA/YunTu → 9.50
/// variant 2  base 5.00   US/YunTu → 4.00
/// variant 5  base 3.00
///
/// MUG-PAIR     sum, 10% off      [1 × 2]          trigger 2
/// STARTER-KIT  override          [2 × 1, 5 × 1]   trigger 2   US/YunTu → 6.00
/// ```
pub(crate) fn sample_config() -> CostConfig {
    CostConfig {
        version: "2024-06".to_string(),
        currency: "USD".to_string(),
        products: vec![
            ProductCost {
                variant_id: Some(1),
                sku: Some("MUG-BLK".to_string()),
                base_cost: Some(Money::new(dec!(8.43))),
                overrides: vec![CostOverride {
                    country: "CA".to_string(),
                    shipping_company: "YunTu".to_string(),
                    cost: Some(Money::new(dec!(9.50))),
                }],
            },
            ProductCost {
                variant_id: Some(2),
                sku: None,
                base_cost: Some(Money::new(dec!(5.00))),
                overrides: vec![CostOverride {
                    country: "US".to_string(),
                    shipping_company: "YunTu".to_string(),
                    cost: Some(Money::new(dec!(4.00))),
                }],
            },
            ProductCost {
                variant_id: Some(5),
                sku: None,
                base_cost: Some(Money::new(dec!(3.00))),
                overrides: Vec::new(),
            },
        ],
        combos: vec![
            ComboCost {
                combo_id: "MUG-PAIR".to_string(),
                name: "Two mugs".to_string(),
                items: vec![ComboItem {
                    variant_id: 1,
                    qty: 2,
                }],
                trigger_quantity: Some(2),
                cogs_rule: Some(CogsRule::Sum {
                    discount: Some(ComboDiscount::Percent(dec!(10))),
                }),
                overrides: Vec::new(),
            },
            ComboCost {
                combo_id: "STARTER-KIT".to_string(),
                name: "Starter kit".to_string(),
                items: vec![
                    ComboItem {
                        variant_id: 2,
                        qty: 1,
                    },
                    ComboItem {
                        variant_id: 5,
                        qty: 1,
                    },
                ],
                trigger_quantity: Some(2),
                cogs_rule: Some(CogsRule::Override),
                overrides: vec![ComboOverride {
                    country: "US".to_string(),
                    shipping_company: "YunTu".to_string(),
                    override_cost: Some(Money::new(dec!(6.00))),
                }],
            },
        ],
    }
}
