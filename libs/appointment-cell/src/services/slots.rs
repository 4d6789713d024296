// libs/appointment-cell/src/services/slots.rs
use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use shared_database::LedgerClient;
use shared_models::status::BookingStatus;

use crate::models::{Appointment, AppointmentError, Slot};

/// Computes a doctor's bookable slots for a date.
///
/// Only a `Confirmed` appointment takes a slot out of circulation; pending
/// requests, completed visits and cancellations leave it open so that
/// tentative holds cannot starve the calendar.
pub struct SlotAllocator {
    ledger: Arc<LedgerClient>,
}

impl SlotAllocator {
    pub fn new(ledger: Arc<LedgerClient>) -> Self {
        Self { ledger }
    }

    pub async fn available_slots(
        &self,
        doctor_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Slot>, AppointmentError> {
        debug!("Calculating slots for doctor {} on {}", doctor_id, date);

        let confirmed: Vec<Appointment> = self
            .ledger
            .fetch(
                "appointments",
                &format!(
                    "doctor_id=eq.{}&appointment_date=eq.{}&status=eq.{}",
                    doctor_id,
                    date,
                    BookingStatus::Confirmed
                ),
            )
            .await?;

        let taken: HashSet<NaiveTime> = confirmed
            .iter()
            .map(|appt| appt.appointment_time)
            .collect();

        Ok(mark_taken(&day_grid(), &taken))
    }
}

/// The fixed working-day grid: 30-minute slots from 09:00 through 17:00.
pub fn day_grid() -> Vec<NaiveTime> {
    let mut grid = Vec::new();
    for hour in 9..18 {
        for minute in [0, 30] {
            if hour == 17 && minute == 30 {
                break;
            }
            grid.push(NaiveTime::from_hms_opt(hour, minute, 0).unwrap());
        }
    }
    grid
}

pub fn mark_taken(grid: &[NaiveTime], taken: &HashSet<NaiveTime>) -> Vec<Slot> {
    grid.iter()
        .map(|&time| Slot {
            time,
            available: !taken.contains(&time),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn grid_runs_from_nine_to_five() {
        let grid = day_grid();
        assert_eq!(grid.len(), 17);
        assert_eq!(grid.first().copied(), Some(t(9, 0)));
        assert_eq!(grid.last().copied(), Some(t(17, 0)));
        // no slot past 17:00
        assert!(!grid.contains(&t(17, 30)));
    }

    #[test]
    fn grid_is_ordered() {
        let grid = day_grid();
        let mut sorted = grid.clone();
        sorted.sort();
        assert_eq!(grid, sorted);
    }

    #[test]
    fn only_taken_times_are_flagged() {
        let taken: HashSet<NaiveTime> = [t(10, 0)].into_iter().collect();
        let slots = mark_taken(&day_grid(), &taken);

        for slot in &slots {
            if slot.time == t(10, 0) {
                assert!(!slot.available);
            } else {
                assert!(slot.available, "slot {} should stay open", slot.time);
            }
        }
    }

    #[test]
    fn empty_day_is_fully_open() {
        let slots = mark_taken(&day_grid(), &HashSet::new());
        assert!(slots.iter().all(|s| s.available));
    }
}
