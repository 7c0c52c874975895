use crate::domain::ReservedItem;

/// Inventory ledger operations performed on a single product.
///
/// Each action runs inside one message of the product actor, so the check and
/// the stock change can never interleave with another reservation.
#[derive(Debug, Clone)]
pub enum ProductAction {
    /// Reads the current stock level without modifying it.
    StockLevel,
    /// Decrements stock by `quantity` if at least that much is available and
    /// snapshots the base price.
    Reserve { quantity: u32 },
    /// Puts `quantity` units back on the shelf.
    Release(u32),
}

/// Results from ProductActions - variants match 1:1 with ProductAction
#[derive(Debug, Clone)]
pub enum ProductActionResult {
    StockLevel(u32),
    Reserved(ReservedItem),
    Released { stock: u32 },
}
