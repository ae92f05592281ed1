//! Versioned ledger cells with optimistic commit.
//!
//! Every ledger lives in a cell carrying a monotonically increasing
//! version. Writers snapshot the cell, mutate a copy, and commit with a
//! compare-and-swap on the version; anything that must become visible
//! atomically with the ledger write (the request upsert) runs inside
//! the commit critical section.

use dashmap::DashMap;
use kadro_core::ledger::{BalanceLedger, LedgerKey};
use kadro_core::policy::{PerLeaveType, PolicyRegistry};
use kadro_shared::{EmployeeId, LeaveDays};

struct LedgerCell {
    version: u64,
    ledger: BalanceLedger,
}

/// Thread-safe store of balance ledgers keyed by `(employee, year)`.
#[derive(Default)]
pub struct LedgerStore {
    cells: DashMap<LedgerKey, LedgerCell>,
}

impl LedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clones out `(version, ledger)` for a key, if present.
    #[must_use]
    pub fn snapshot(&self, key: &LedgerKey) -> Option<(u64, BalanceLedger)> {
        self.cells
            .get(key)
            .map(|cell| (cell.version, cell.ledger.clone()))
    }

    /// Returns the existing cell or inserts the ledger `init` builds,
    /// then clones out `(version, ledger)`.
    pub fn get_or_insert_with(
        &self,
        key: LedgerKey,
        init: impl FnOnce() -> BalanceLedger,
    ) -> (u64, BalanceLedger) {
        let cell = self.cells.entry(key).or_insert_with(|| LedgerCell {
            version: 0,
            ledger: init(),
        });
        (cell.version, cell.ledger.clone())
    }

    /// Inserts only when the key is vacant; returns whether it inserted.
    pub fn insert_if_absent(&self, key: LedgerKey, ledger: BalanceLedger) -> bool {
        let mut inserted = false;
        self.cells.entry(key).or_insert_with(|| {
            inserted = true;
            LedgerCell { version: 0, ledger }
        });
        inserted
    }

    /// Commits a mutated copy if nobody else committed since the
    /// snapshot was taken.
    ///
    /// `on_commit` runs inside the critical section while the cell is
    /// exclusively held, so its writes become visible atomically with
    /// the new ledger state. Returns `false` on a version mismatch; the
    /// caller retries from a fresh snapshot.
    pub fn try_commit(
        &self,
        key: &LedgerKey,
        expected_version: u64,
        ledger: BalanceLedger,
        on_commit: impl FnOnce(),
    ) -> bool {
        let Some(mut cell) = self.cells.get_mut(key) else {
            return false;
        };
        if cell.version != expected_version {
            return false;
        }
        cell.ledger = ledger;
        cell.version += 1;
        on_commit();
        true
    }

    /// Keys of every ledger in `year`.
    #[must_use]
    pub fn keys_for_year(&self, year: i32) -> Vec<LedgerKey> {
        self.cells
            .iter()
            .map(|entry| *entry.key())
            .filter(|key| key.year == year)
            .collect()
    }
}

/// Loads the ledger for `key`, creating it lazily on first access.
///
/// First-ever year: opening balances come from each active policy's
/// `default_balance`. Later years: when the prior year is already
/// locked, its post-rollover balances are the carry and seed `opening`;
/// when the prior year is still open, the ledger starts zeroed and the
/// rollover deposits the carry later.
pub fn ensure_ledger(
    store: &LedgerStore,
    registry: &PolicyRegistry,
    employee_id: EmployeeId,
    year: i32,
) -> (u64, BalanceLedger) {
    let key = LedgerKey::new(employee_id, year);
    if let Some(found) = store.snapshot(&key) {
        return found;
    }
    let prior = store.snapshot(&LedgerKey::new(employee_id, year - 1));
    let fresh = match prior {
        Some((_, prior_ledger)) if prior_ledger.is_locked() => {
            // A rolled-over year holds exactly its carried amounts.
            let carried = PerLeaveType::from_fn(|code| {
                prior_ledger.current(code).max(LeaveDays::ZERO)
            });
            BalanceLedger::opened_from_rollover(employee_id, year, &carried)
        }
        Some(_) => BalanceLedger::zeroed(employee_id, year),
        None => BalanceLedger::opened(employee_id, year, registry),
    };
    store.get_or_insert_with(key, || fresh)
}

/// Convenience wrapper for `ensure_ledger` over a known key.
pub fn ensure_ledger_for_key(
    store: &LedgerStore,
    registry: &PolicyRegistry,
    key: LedgerKey,
) -> (u64, BalanceLedger) {
    ensure_ledger(store, registry, key.employee_id, key.year)
}
