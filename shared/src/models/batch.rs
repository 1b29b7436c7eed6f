//! Batch Model
//!
//! A production batch carries the remaining-volume ledger. `remaining_liters`
//! is only ever mutated through [`Batch::debit`], invoked by the lifecycle
//! state machine when a barrel is filled.

use serde::{Deserialize, Serialize};

/// Batch lifecycle status. Wire values are the legacy Spanish strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum BatchStatus {
    #[default]
    #[serde(rename = "fermentando")]
    Fermenting,
    #[serde(rename = "madurando")]
    Maturing,
    #[serde(rename = "listo")]
    Ready,
    #[serde(rename = "terminado")]
    Finished,
}

/// Production batch entity.
///
/// Invariant: `0 <= remaining_liters <= total_liters`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub id: String,
    /// Fermenter tank label, e.g. "TANK-01".
    pub fermenter_name: String,
    pub beer_type: super::BeerType,
    pub total_liters: f64,
    pub remaining_liters: f64,
    pub filling_date: String,
    pub status: BatchStatus,
    pub created_at: String,
}

impl Batch {
    /// Whether this batch can source a fill of `capacity` liters.
    ///
    /// A finished batch is never a valid fill target, even if its fields
    /// were later edited to show volume again.
    pub fn can_fill(&self, capacity: f64) -> bool {
        self.status != BatchStatus::Finished && self.remaining_liters >= capacity
    }

    /// Debit `liters` from the ledger, clamping at zero.
    ///
    /// Reaching zero flips the batch to `Finished`. This never fails; the
    /// fill precondition is checked by the caller before any mutation.
    pub fn debit(&mut self, liters: f64) {
        self.remaining_liters = (self.remaining_liters - liters).max(0.0);
        if self.remaining_liters <= 0.0 {
            self.status = BatchStatus::Finished;
        }
    }
}

/// Create batch payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchCreate {
    pub fermenter_name: String,
    pub beer_type: super::BeerType,
    pub total_liters: f64,
    pub filling_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util;

    fn batch(total: f64) -> Batch {
        Batch {
            id: util::entity_id(),
            fermenter_name: "TANK-01".into(),
            beer_type: super::super::BeerType::GoldenAle,
            total_liters: total,
            remaining_liters: total,
            filling_date: util::today(),
            status: BatchStatus::Fermenting,
            created_at: util::now_iso(),
        }
    }

    #[test]
    fn debit_clamps_at_zero_and_finishes() {
        let mut b = batch(100.0);
        b.debit(60.0);
        assert_eq!(b.remaining_liters, 40.0);
        assert_eq!(b.status, BatchStatus::Fermenting);

        b.debit(60.0);
        assert_eq!(b.remaining_liters, 0.0);
        assert_eq!(b.status, BatchStatus::Finished);
    }

    #[test]
    fn finished_batch_rejects_fills_even_with_volume() {
        let mut b = batch(100.0);
        b.status = BatchStatus::Finished;
        assert!(!b.can_fill(10.0));
    }

    #[test]
    fn can_fill_requires_enough_volume() {
        let mut b = batch(100.0);
        b.debit(80.0);
        assert!(b.can_fill(20.0));
        assert!(!b.can_fill(20.1));
    }
}
