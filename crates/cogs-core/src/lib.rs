//! # cogs-core: Pure Cost-of-Goods-Sold Resolution
//!
//! This crate is the **heart** of the COGS engine. It holds the cost
//! configuration model and every resolution algorithm as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        COGS Engine Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Callers (cogs CLI, reporting, order importers)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Arc<Snapshot>                          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               cogs-store (snapshot + settings)                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ &CostConfig                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cogs-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ validation│  │  resolve  │  │   order   │  │   │
//! │  │   │ CostConfig│  │  report   │  │  product  │  │ breakdown │  │   │
//! │  │   │ CostResult│  │  findings │  │  combo    │  │ detection │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO GLOBAL STATE • PURE FUNCTIONS                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Config snapshot, pricing context, result records
//! - [`money`] - Decimal money with explicit cent rounding
//! - [`error`] - Resolution and validation errors
//! - [`validation`] - Collect-all snapshot validation
//! - [`resolve`] - Single product and combo resolution
//! - [`order`] - Order aggregation and breakdowns
//! - [`detection`] - Combo detection and unit allocation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same snapshot + same input = same output
//! 2. **Snapshots, not edits**: callers replace a whole `CostConfig`
//! 3. **Round once**: combo unit costs and order totals only
//! 4. **Per-line isolation**: one bad line never blanks out an order
//!
//! ## Example Usage
//!
//! ```rust
//! use cogs_core::{resolve_product, CostConfig, CostMethod, Money, PricingContext};
//!
//! let config = CostConfig::from_json(r#"{
//!     "version": "1", "currency": "USD",
//!     "products": [{
//!         "variantId": 1, "baseCost": 8.43,
//!         "overrides": [{ "country": "CA", "shippingCompany": "YunTu", "cost": 9.50 }]
//!     }]
//! }"#).unwrap();
//!
//! let result = resolve_product(&config, 1, &PricingContext::new("CA", "YunTu"), 3).unwrap();
//! assert_eq!(result.total_cost, Money::from_cents(2850));
//! assert_eq!(result.method, CostMethod::Override);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod detection;
pub mod error;
pub mod money;
pub mod order;
pub mod resolve;
pub mod types;
pub mod validation;

#[cfg(test)]
pub(crate) mod fixtures;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use cogs_core::Money` instead of
// `use cogs_core::money::Money`

pub use detection::{allocate_combos, detect_combos, merge_line_items, AllocatedCombo, ComboAllocation};
pub use error::{CoreResult, CostError, ValidationError};
pub use money::Money;
pub use order::{resolve_order, resolve_order_with_combos, CostBreakdown, LineError, OrderCost};
pub use resolve::{combo_unit_cost, product_unit_cost, resolve_combo, resolve_product};
pub use types::*;
pub use validation::{validate, ValidationReport};
