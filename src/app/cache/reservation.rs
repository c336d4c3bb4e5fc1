//! In-flight download reservations
//!
//! Concurrent fetches that resolve to the same final path share a single
//! probe/download/install attempt. The first caller reserves the path and
//! runs the attempt; everyone arriving while it runs awaits the same
//! [`FetchOutcome`]. The reservation is released as soon as the attempt
//! resolves, so the next fetch starts from a fresh probe. A caller dropped
//! mid-attempt releases it too, unless others are still waiting on it.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use super::entry::FetchOutcome;

/// Who ended up running the attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationRole {
    /// This caller performed the attempt
    Leader,
    /// This caller awaited another caller's attempt
    Follower,
}

/// Snapshot of one in-flight attempt
#[derive(Debug, Clone)]
pub struct ReservationInfo {
    /// Final path the attempt installs to
    pub final_path: PathBuf,
    /// When the reservation was created
    pub reserved_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct Reservation {
    outcome: Arc<OnceCell<FetchOutcome>>,
    reserved_at: DateTime<Utc>,
}

impl Reservation {
    fn new() -> Self {
        Self {
            outcome: Arc::new(OnceCell::new()),
            reserved_at: Utc::now(),
        }
    }
}

/// Single-flight table keyed by final path
#[derive(Debug, Default)]
pub struct ReservationTable {
    reservations: Mutex<HashMap<PathBuf, Reservation>>,
}

impl ReservationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `attempt` for `final_path` unless an attempt is already in flight
    ///
    /// If the leading caller is dropped mid-attempt, one of the waiting
    /// callers runs its own `attempt` instead.
    pub async fn run<F, Fut>(&self, final_path: &Path, attempt: F) -> (FetchOutcome, ReservationRole)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FetchOutcome>,
    {
        let cell = self
            .lock()
            .entry(final_path.to_path_buf())
            .or_insert_with(Reservation::new)
            .outcome
            .clone();
        let guard = ReleaseOnDrop {
            table: self,
            final_path,
            cell,
        };

        let mut role = ReservationRole::Follower;
        let outcome = guard
            .cell
            .get_or_init(|| {
                role = ReservationRole::Leader;
                attempt()
            })
            .await
            .clone();

        if role == ReservationRole::Follower {
            debug!("Joined in-flight download for {}", final_path.display());
        }

        drop(guard);
        (outcome, role)
    }

    /// Drop the reservation if it still belongs to `cell`
    ///
    /// An unresolved reservation is kept while other callers hold it, since
    /// one of them takes the attempt over.
    fn release(&self, final_path: &Path, cell: &Arc<OnceCell<FetchOutcome>>) {
        let mut reservations = self.lock();
        let Some(reservation) = reservations.get(final_path) else {
            return;
        };
        if !Arc::ptr_eq(&reservation.outcome, cell) {
            return;
        }

        // One count is the table's, one is the releasing caller's
        let abandoned = Arc::strong_count(cell) <= 2;
        if cell.initialized() || abandoned {
            if !cell.initialized() {
                debug!("Released abandoned download for {}", final_path.display());
            }
            reservations.remove(final_path);
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, Reservation>> {
        self.reservations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Check if an attempt for `final_path` is running
    pub fn is_reserved(&self, final_path: &Path) -> bool {
        self.lock().contains_key(final_path)
    }

    /// Number of attempts currently in flight
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get all in-flight attempts
    pub fn get_all_reservations(&self) -> Vec<ReservationInfo> {
        self.lock()
            .iter()
            .map(|(path, reservation)| ReservationInfo {
                final_path: path.clone(),
                reserved_at: reservation.reserved_at,
            })
            .collect()
    }
}

/// Releases a caller's hold on a reservation, including when its future is dropped
struct ReleaseOnDrop<'a> {
    table: &'a ReservationTable,
    final_path: &'a Path,
    cell: Arc<OnceCell<FetchOutcome>>,
}

impl Drop for ReleaseOnDrop<'_> {
    fn drop(&mut self) {
        self.table.release(self.final_path, &self.cell);
    }
}
