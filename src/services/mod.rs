pub mod menu;
pub mod orders;
pub mod shared_carts;

pub use menu::MenuCatalog;
pub use orders::OrderLedger;
pub use shared_carts::SharedCartRegistry;

use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    app_error::AppError,
    domain::{ItemLine, MAX_LINE_QUANTITY},
};

/// Rejects empty item lists and quantities outside `1..=MAX_LINE_QUANTITY`.
pub(crate) fn validate_lines(lines: &[ItemLine]) -> Result<(), AppError> {
    if lines.is_empty() {
        return Err(AppError::BadRequest("At least one item is required".into()));
    }

    if let Some(line) = lines
        .iter()
        .find(|line| !(1..=MAX_LINE_QUANTITY).contains(&line.quantity))
    {
        return Err(AppError::BadRequest(format!(
            "Quantity for menu item {} must be between 1 and {}, got {}",
            line.menu_item_id, MAX_LINE_QUANTITY, line.quantity
        )));
    }

    Ok(())
}

/// Distinct menu item ids in first-seen order.
pub(crate) fn distinct_menu_item_ids(lines: &[ItemLine]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    lines
        .iter()
        .map(|line| line.menu_item_id)
        .filter(|id| seen.insert(*id))
        .collect()
}
