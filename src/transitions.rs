// State Machine Validator - fixed transition tables for both entity
// kinds plus the role gates. Pure functions; the store is never touched
// from here, so a rejected transition cannot leave partial state.

use crate::entities::{EntityKind, ItemStatus, LaundryStatus};
use crate::errors::CoreError;
use crate::identity::Role;

/// Verdict for an accepted transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCheck {
    /// The edge is in the table; apply the write.
    Advance,
    /// Requested status equals the current one; accept without writing.
    Noop,
}

/// Legal next statuses for a laundry request. Linear and forward-only.
pub fn laundry_next(current: LaundryStatus) -> &'static [LaundryStatus] {
    match current {
        LaundryStatus::Pending => &[LaundryStatus::InProcess],
        LaundryStatus::InProcess => &[LaundryStatus::Ready],
        LaundryStatus::Ready => &[LaundryStatus::Delivered],
        LaundryStatus::Delivered => &[],
    }
}

/// Legal next statuses for a lost item. A rejected claim reopens the
/// item; `Returned` is terminal.
pub fn item_next(current: ItemStatus) -> &'static [ItemStatus] {
    match current {
        ItemStatus::Available => &[ItemStatus::Claimed],
        ItemStatus::Claimed => &[ItemStatus::Returned, ItemStatus::Available],
        ItemStatus::Returned => &[],
    }
}

/// Validate a laundry status advance for the given actor role.
pub fn validate_laundry_transition(
    current: LaundryStatus,
    requested: LaundryStatus,
    role: Role,
) -> Result<TransitionCheck, CoreError> {
    if !role.is_staff() {
        return Err(CoreError::PermissionDenied {
            role,
            action: "advance laundry status",
        });
    }
    if requested == current {
        return Ok(TransitionCheck::Noop);
    }
    if laundry_next(current).contains(&requested) {
        Ok(TransitionCheck::Advance)
    } else {
        Err(CoreError::InvalidTransition {
            kind: EntityKind::LaundryRequest,
            from: current.to_string(),
            to: requested.to_string(),
        })
    }
}

/// Validate a lost-item status change for the given actor role.
///
/// Claiming (`Available -> Claimed`) is a requester action; deciding a
/// claim (`Claimed -> Returned | Available`) is staff-only.
pub fn validate_item_transition(
    current: ItemStatus,
    requested: ItemStatus,
    role: Role,
) -> Result<TransitionCheck, CoreError> {
    match requested {
        ItemStatus::Claimed if current != ItemStatus::Claimed => {
            if role.is_staff() {
                return Err(CoreError::PermissionDenied {
                    role,
                    action: "claim a found item",
                });
            }
        }
        ItemStatus::Returned | ItemStatus::Available if current == ItemStatus::Claimed => {
            if !role.is_staff() {
                return Err(CoreError::PermissionDenied {
                    role,
                    action: "decide an item claim",
                });
            }
        }
        _ => {}
    }
    if requested == current {
        return Ok(TransitionCheck::Noop);
    }
    if item_next(current).contains(&requested) {
        Ok(TransitionCheck::Advance)
    } else {
        Err(CoreError::InvalidTransition {
            kind: EntityKind::LostItem,
            from: current.to_string(),
            to: requested.to_string(),
        })
    }
}
