use serde::{Deserialize, Serialize};
use std::fmt;

// ==============================================================================
// BOOKING STATUS LIFECYCLE
// ==============================================================================

/// Status shared by every booking domain. Wire strings are Title-Case with
/// a hyphen in `No-Show`, matching the persisted ledger values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    #[serde(rename = "No-Show")]
    NoShow,
    Admitted,
    Discharged,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "Pending"),
            BookingStatus::Confirmed => write!(f, "Confirmed"),
            BookingStatus::Completed => write!(f, "Completed"),
            BookingStatus::Cancelled => write!(f, "Cancelled"),
            BookingStatus::NoShow => write!(f, "No-Show"),
            BookingStatus::Admitted => write!(f, "Admitted"),
            BookingStatus::Discharged => write!(f, "Discharged"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BookingDomain {
    Consultation,
    Laboratory,
    Radiology,
    Admission,
}

impl fmt::Display for BookingDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingDomain::Consultation => write!(f, "Consultation"),
            BookingDomain::Laboratory => write!(f, "Laboratory"),
            BookingDomain::Radiology => write!(f, "Radiology"),
            BookingDomain::Admission => write!(f, "Admission"),
        }
    }
}

impl BookingStatus {
    /// Valid next statuses for a booking of the given domain.
    ///
    /// A reschedule forces `Confirmed` back to `Pending` through its own
    /// operation; that edge is deliberately absent here so a plain status
    /// update cannot un-confirm a booking.
    pub fn valid_transitions(self, domain: BookingDomain) -> &'static [BookingStatus] {
        use BookingStatus::*;
        match domain {
            BookingDomain::Consultation => match self {
                Pending => &[Confirmed, Cancelled, NoShow],
                Confirmed => &[Completed, Cancelled, NoShow],
                _ => &[],
            },
            BookingDomain::Laboratory | BookingDomain::Radiology => match self {
                Pending => &[Confirmed, Cancelled],
                Confirmed => &[Completed, Cancelled],
                _ => &[],
            },
            BookingDomain::Admission => match self {
                Admitted => &[Discharged],
                _ => &[],
            },
        }
    }

    /// Whether `self -> to` is an acceptable status update. Re-entering the
    /// current status is always allowed and carries no side effects.
    pub fn can_transition(self, domain: BookingDomain, to: BookingStatus) -> bool {
        self == to || self.valid_transitions(domain).contains(&to)
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BookingStatus::Completed
                | BookingStatus::Cancelled
                | BookingStatus::NoShow
                | BookingStatus::Discharged
        )
    }
}

// ==============================================================================
// NOTIFICATION GATING
// ==============================================================================

/// Lifecycle events that owners are notified about.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StatusEvent {
    Confirmed,
    Completed,
    Cancelled,
    #[serde(rename = "No-Show")]
    NoShow,
    Rescheduled,
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEvent::Confirmed => write!(f, "Confirmed"),
            StatusEvent::Completed => write!(f, "Completed"),
            StatusEvent::Cancelled => write!(f, "Cancelled"),
            StatusEvent::NoShow => write!(f, "No-Show"),
            StatusEvent::Rescheduled => write!(f, "Rescheduled"),
        }
    }
}

/// Decide which notification (if any) a persisted status change must emit.
///
/// A confirmation notice fires only on entry into `Confirmed` from another
/// status; terminal notices fire only when the value actually changed. An
/// update that leaves the status as-is emits nothing, so replaying the same
/// update cannot duplicate a notification.
pub fn status_event(old: BookingStatus, new: BookingStatus) -> Option<StatusEvent> {
    if old == new {
        return None;
    }
    match new {
        BookingStatus::Confirmed => Some(StatusEvent::Confirmed),
        BookingStatus::Completed => Some(StatusEvent::Completed),
        BookingStatus::Cancelled => Some(StatusEvent::Cancelled),
        BookingStatus::NoShow => Some(StatusEvent::NoShow),
        _ => None,
    }
}
