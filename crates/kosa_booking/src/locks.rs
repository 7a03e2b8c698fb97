//! Per-(barber, date) serialization of bookings.
//!
//! Booking re-reads the barber's day and inserts inside this lock, so two
//! concurrent requests for the same slot cannot both pass the overlap check.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type SlotKey = (i64, NaiveDate);

#[derive(Debug, Clone, Default)]
pub struct SlotLocks {
    inner: Arc<Mutex<HashMap<SlotKey, Arc<AsyncMutex<()>>>>>,
}

impl SlotLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to one barber's day.
    pub async fn acquire(&self, barber_id: i64, date: NaiveDate) -> OwnedMutexGuard<()> {
        let slot = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            // Entries only the map still references are idle.
            map.retain(|_, lock| Arc::strong_count(lock) > 1);
            map.entry((barber_id, date)).or_default().clone()
        };
        slot.lock_owned().await
    }

    /// Days currently locked or waited on.
    pub fn active(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|lock| Arc::strong_count(lock) > 1)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[tokio::test]
    async fn same_day_is_serialized() {
        let locks = SlotLocks::new();
        let inside = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let locks = locks.clone();
                let inside = inside.clone();
                let peak = peak.clone();
                tokio::spawn(async move {
                    let _guard = locks.acquire(1, day(10)).await;
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    inside.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_days_do_not_block() {
        let locks = SlotLocks::new();
        let _first = locks.acquire(1, day(10)).await;
        let second = tokio::time::timeout(Duration::from_millis(50), locks.acquire(1, day(11))).await;
        assert!(second.is_ok());
        let other_barber =
            tokio::time::timeout(Duration::from_millis(50), locks.acquire(2, day(10))).await;
        assert!(other_barber.is_ok());
    }

    #[tokio::test]
    async fn idle_entries_are_dropped() {
        let locks = SlotLocks::new();
        {
            let _guard = locks.acquire(1, day(10)).await;
            assert_eq!(locks.active(), 1);
        }
        let _guard = locks.acquire(1, day(11)).await;
        assert_eq!(locks.active(), 1);
        assert_eq!(locks.inner.lock().unwrap().len(), 1);
    }
}
