//! Pure state-machine guards for ticket and teller mutations.
//!
//! Every persistence adapter loads the affected rows (under a lock where the
//! store supports one), calls into this module, then writes back whatever
//! changed. Each function checks all of its guards before mutating anything,
//! so a rejected transition leaves both records untouched.

use chrono::{DateTime, Utc};

use super::teller::Teller;
use super::ticket::Ticket;

/// Reasons a ticket transition is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// The ticket already has a teller.
    #[error("Ticket is already served")]
    AlreadyServed,
    /// The teller is occupied by another ticket.
    #[error("This teller is currently serving another ticket")]
    TellerBusy,
    /// The ticket was canceled.
    #[error("Ticket has been canceled")]
    Canceled,
    /// The ticket never reached a teller.
    #[error("Ticket is not assigned to any teller")]
    Unassigned,
    /// Service on the ticket is finished.
    #[error("Ticket service has already been completed")]
    Completed,
}

/// Reasons a ticket fails validation at the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidityError {
    /// Issued more than 24 hours ago.
    #[error("Ticket has expired")]
    Expired,
    #[error("Ticket has already been served")]
    AlreadyServed,
    #[error("Ticket has been canceled")]
    Canceled,
}

/// Result of a cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelEffect {
    /// The ticket was already canceled; nothing changed.
    AlreadyCanceled,
    /// The ticket is now canceled and, if it held a teller, the teller is free.
    Canceled { released_teller: bool },
}

/// Check whether a ticket may still be presented at `now`.
///
/// Expiry is reported before the served flag.
pub fn check_validity(ticket: &Ticket, now: DateTime<Utc>) -> Result<(), ValidityError> {
    if ticket.is_expired_at(now) {
        return Err(ValidityError::Expired);
    }
    if ticket.is_served {
        return Err(ValidityError::AlreadyServed);
    }
    if ticket.is_canceled {
        return Err(ValidityError::Canceled);
    }
    Ok(())
}

/// Hand `ticket` to `teller` at `served_at`.
pub fn serve(
    ticket: &mut Ticket,
    teller: &mut Teller,
    served_at: DateTime<Utc>,
) -> Result<(), TransitionError> {
    if ticket.is_served {
        return Err(TransitionError::AlreadyServed);
    }
    if ticket.is_canceled {
        return Err(TransitionError::Canceled);
    }
    if teller.is_active {
        return Err(TransitionError::TellerBusy);
    }

    ticket.is_served = true;
    ticket.served_at = Some(served_at);
    ticket.teller_id = Some(teller.id);
    teller.is_active = true;
    teller.last_assigned_at = Some(served_at);
    Ok(())
}

/// Finish service on `ticket`, freeing `teller`.
///
/// `teller` must be the teller recorded on the ticket. Completing a ticket a
/// second time is a no-op and returns `Ok(false)`. Canceled tickets released
/// their teller already and cannot be completed.
pub fn complete(ticket: &mut Ticket, teller: &mut Teller) -> Result<bool, TransitionError> {
    if ticket.teller_id.is_none() {
        return Err(TransitionError::Unassigned);
    }
    if ticket.is_canceled {
        return Err(TransitionError::Canceled);
    }
    if ticket.completed {
        return Ok(false);
    }

    ticket.completed = true;
    if ticket.teller_id == Some(teller.id) {
        teller.is_active = false;
    }
    Ok(true)
}

/// Cancel `ticket`, freeing the teller it occupies.
///
/// `teller` is the teller recorded on the ticket, when there is one.
/// Completed tickets cannot be canceled.
pub fn cancel(
    ticket: &mut Ticket,
    teller: Option<&mut Teller>,
) -> Result<CancelEffect, TransitionError> {
    if ticket.is_canceled {
        return Ok(CancelEffect::AlreadyCanceled);
    }
    if ticket.completed {
        return Err(TransitionError::Completed);
    }

    let released_teller = match teller {
        Some(teller) if ticket.teller_id == Some(teller.id) && teller.is_active => {
            teller.is_active = false;
            true
        }
        _ => false,
    };
    ticket.is_canceled = true;
    Ok(CancelEffect::Canceled { released_teller })
}
