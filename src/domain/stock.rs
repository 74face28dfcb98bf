use uuid::Uuid;

/// On-hand quantity of one stock record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockSlot {
    pub record_id: Uuid,
    pub quantity: i32,
}

/// New quantity for a record after a withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockUpdate {
    pub record_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Insufficient stock: requested {requested}, available {available}")]
pub struct InsufficientStock {
    pub requested: i32,
    pub available: i64,
}

/// Summed as i64; many large records may exceed the range of one column.
pub fn available(slots: &[StockSlot]) -> i64 {
    slots.iter().map(|s| i64::from(s.quantity.max(0))).sum()
}

/// Withdraw `requested` units from the slots in the order given.
///
/// Returns an empty plan when the product has no stock records (untracked),
/// and an error, without touching anything, when the tracked quantity is
/// smaller than the request. Records never go below zero.
pub fn plan_withdrawal(
    slots: &[StockSlot],
    requested: i32,
) -> Result<Vec<StockUpdate>, InsufficientStock> {
    if slots.is_empty() {
        return Ok(Vec::new());
    }

    let total = available(slots);
    if i64::from(requested) > total {
        return Err(InsufficientStock {
            requested,
            available: total,
        });
    }

    let mut remaining = requested;
    let mut updates = Vec::new();
    for slot in slots {
        if remaining == 0 {
            break;
        }
        let take = remaining.min(slot.quantity.max(0));
        if take == 0 {
            continue;
        }
        remaining -= take;
        updates.push(StockUpdate {
            record_id: slot.record_id,
            quantity: slot.quantity - take,
        });
    }

    Ok(updates)
}
