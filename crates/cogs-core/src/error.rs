//! # Error Types
//!
//! Domain-specific error types for cogs-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cogs-core errors (this file)                                          │
//! │  ├── CostError        - A single resolution call failed                │
//! │  └── ValidationError  - One finding about a config snapshot            │
//! │                                                                         │
//! │  cogs-store errors (separate crate)                                    │
//! │  └── StoreError       - Loading / installing snapshots failed          │
//! │                                                                         │
//! │  Flow: ValidationError → report string → StoreError::InvalidConfig     │
//! │        CostError → LineError (per order line) → caller                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (combo id, country, carrier)
//! 3. Errors are enum variants, never String
//! 4. An unknown variant is NOT an error; it resolves to zero with a warning

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Cost Error
// =============================================================================

/// Errors that fail one resolution call.
///
/// These never poison an order: the aggregator records them against the
/// line they belong to and keeps pricing the rest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CostError {
    /// The combo id is not present in `config.combos`.
    #[error("Combo not found: {combo_id}")]
    ComboNotFound { combo_id: String },

    /// An override-mode combo has no override for the requested context.
    ///
    /// ## When This Occurs
    /// ```text
    /// combo "BUNDLE-2" { mode: override, overrides: [US/YunTu] }
    ///      │
    ///      ▼
    /// resolve for (CA, YunTu)
    ///      │
    ///      ▼
    /// ComboOverrideMissing { combo_id: "BUNDLE-2", country: "CA", ... }
    /// ```
    /// Override-mode combos have no base cost to fall back to.
    #[error("Combo {combo_id} has no override for {country}/{shipping_company}")]
    ComboOverrideMissing {
        combo_id: String,
        country: String,
        shipping_company: String,
    },

    /// A combo entry carries no `cogsRule`, so it cannot be priced.
    #[error("Combo {combo_id} has no cogsRule")]
    ComboRuleMissing { combo_id: String },

    /// Quantity is negative.
    #[error("Invalid quantity {quantity} for {subject}: must not be negative")]
    InvalidQuantity { subject: String, quantity: i64 },

    /// A resolved unit cost came out negative (config defect).
    #[error("Resolved cost {cost} for {subject} is negative")]
    NegativeCost { subject: String, cost: Money },

    /// A cost exceeded the representable range while being multiplied or
    /// summed.
    #[error("Cost of {subject} overflows")]
    Overflow { subject: String },
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single finding about a cost config snapshot.
///
/// `field` is a path into the snapshot, e.g. `products[2].overrides[0].cost`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A required collection is empty.
    #[error("{field} must not be empty")]
    Empty { field: String },

    /// Value must not be below zero.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Duplicate value (e.g., duplicate variantId).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CostError.
pub type CoreResult<T> = Result<T, CostError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CostError::ComboOverrideMissing {
            combo_id: "BUNDLE-2".to_string(),
            country: "CA".to_string(),
            shipping_company: "YunTu".to_string(),
        };
        assert_eq!(err.to_string(), "Combo BUNDLE-2 has no override for CA/YunTu");

        let err = CostError::InvalidQuantity {
            subject: "variant 7".to_string(),
            quantity: -2,
        };
        assert_eq!(
            err.to_string(),
            "Invalid quantity -2 for variant 7: must not be negative"
        );

        let err = CostError::Overflow {
            subject: "variant 7".to_string(),
        };
        assert_eq!(err.to_string(), "Cost of variant 7 overflows");

        let err = CostError::ComboRuleMissing {
            combo_id: "MUG-PAIR".to_string(),
        };
        assert_eq!(err.to_string(), "Combo MUG-PAIR has no cogsRule");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "currency".to_string(),
        };
        assert_eq!(err.to_string(), "currency is required");

        let err = ValidationError::OutOfRange {
            field: "combos[0].cogsRule.discountValue".to_string(),
            min: 0,
            max: 100,
        };
        assert_eq!(
            err.to_string(),
            "combos[0].cogsRule.discountValue must be between 0 and 100"
        );

        let err = ValidationError::Duplicate {
            field: "products[3].variantId".to_string(),
            value: "42".to_string(),
        };
        assert_eq!(err.to_string(), "products[3].variantId '42' already exists");
    }
}
