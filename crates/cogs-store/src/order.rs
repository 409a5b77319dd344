//! Order file loading.
//!
//! An order file is a JSON array of line items:
//!
//! ```json
//! [{ "variantId": 1, "quantity": 3 }, { "variantId": 5, "quantity": 1 }]
//! ```

use std::path::Path;

use cogs_core::LineItem;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Reads the line items of an order file.
///
/// Quantities are not checked here; the resolver reports bad lines per line.
pub fn load_line_items(path: impl AsRef<Path>) -> StoreResult<Vec<LineItem>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    let items: Vec<LineItem> =
        serde_json::from_str(&contents).map_err(|e| StoreError::json(path, e))?;
    debug!(?path, lines = items.len(), "Order file loaded");
    Ok(items)
}
