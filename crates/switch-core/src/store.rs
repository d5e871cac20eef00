//! The switch lifecycle state machine.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{Result, SwitchError};
use crate::repository::SwitchRepository;
use crate::time::expiry_for;
use crate::types::{NewSwitch, Switch};

/// In-memory switch collection backed by a [`SwitchRepository`].
///
/// Every mutation is staged on a copy of the collection, written through the
/// repository, and only then made visible. A failed write leaves the store
/// unchanged.
pub struct SwitchStore {
    switches: Vec<Switch>,
    repository: Arc<dyn SwitchRepository>,
    clock: Arc<dyn Clock>,
}

impl SwitchStore {
    /// Load the stored collection using the system clock.
    pub fn load(repository: Arc<dyn SwitchRepository>) -> Result<Self> {
        Self::load_with_clock(repository, Arc::new(SystemClock))
    }

    /// Load the stored collection with an explicit time source.
    pub fn load_with_clock(
        repository: Arc<dyn SwitchRepository>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let switches = repository.load_all()?;
        info!(count = switches.len(), "Loaded switch store");

        Ok(Self {
            switches,
            repository,
            clock,
        })
    }

    /// Create and persist a new switch.
    ///
    /// The message is trimmed and must not be empty; the interval must be
    /// positive. The first check-in is recorded at creation.
    pub fn create(&mut self, payload: NewSwitch) -> Result<Switch> {
        let message = payload.message.trim().to_string();
        if message.is_empty() {
            return Err(SwitchError::InvalidInput("message cannot be empty".to_string()));
        }
        if payload.check_in_interval == 0 {
            return Err(SwitchError::InvalidInput(
                "check-in interval must be positive".to_string(),
            ));
        }

        let now = self.clock.now();
        let switch = Switch {
            id: self.next_id(now.timestamp_millis()),
            message,
            check_in_interval: payload.check_in_interval,
            last_check_in: Some(now),
            is_active: true,
            expires_at: Some(expiry_for(now, payload.check_in_interval, payload.grace_period)),
            plan_name: payload.plan_name,
            grace_period: payload.grace_period,
            reminders: payload.reminders,
            notifications: payload.notifications,
            auto_renewal: payload.auto_renewal,
            emergency_contacts: payload.emergency_contacts,
            custom_actions: payload.custom_actions,
        };

        let mut next = self.switches.clone();
        next.push(switch.clone());
        self.commit(next)?;

        info!(switch_id = %switch.id, expires_at = ?switch.expires_at, "Switch created");
        Ok(switch)
    }

    /// Record a check-in and push the deadline out.
    ///
    /// Inactive switches are refused. A switch whose deadline has already
    /// passed is expired on the spot (as the sweep would) and refused too.
    pub fn check_in(&mut self, id: &str) -> Result<Switch> {
        let now = self.clock.now();
        let index = self.position(id)?;
        let current = &self.switches[index];

        if !current.is_active {
            warn!(switch_id = %id, "Check-in refused: switch inactive");
            return Err(SwitchError::Inactive { id: id.to_string() });
        }

        let mut next = self.switches.clone();

        if current.is_overdue(now) {
            next[index].is_active = false;
            self.commit(next)?;
            info!(switch_id = %id, "Switch expired before check-in");
            return Err(SwitchError::Inactive { id: id.to_string() });
        }

        let switch = &mut next[index];
        switch.last_check_in = Some(now);
        switch.expires_at = Some(expiry_for(now, switch.check_in_interval, switch.grace_period));
        let updated = switch.clone();

        self.commit(next)?;

        info!(switch_id = %id, expires_at = ?updated.expires_at, "Checked in");
        Ok(updated)
    }

    /// Disarm a switch without deleting it.
    pub fn deactivate(&mut self, id: &str) -> Result<Switch> {
        let index = self.position(id)?;
        if !self.switches[index].is_active {
            return Ok(self.switches[index].clone());
        }

        let mut next = self.switches.clone();
        next[index].is_active = false;
        let updated = next[index].clone();
        self.commit(next)?;

        info!(switch_id = %id, "Switch deactivated");
        Ok(updated)
    }

    /// Remove a switch. Deleting an unknown id is a no-op.
    ///
    /// Returns whether a switch was removed.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        if !self.switches.iter().any(|s| s.id == id) {
            return Ok(false);
        }

        let next: Vec<Switch> = self
            .switches
            .iter()
            .filter(|s| s.id != id)
            .cloned()
            .collect();
        self.commit(next)?;

        info!(switch_id = %id, "Switch deleted");
        Ok(true)
    }

    /// Deactivate every active switch whose deadline has passed.
    ///
    /// One-directional: nothing is ever reactivated here. Persists only when
    /// something changed, and returns the ids that were expired.
    pub fn sweep(&mut self) -> Result<Vec<String>> {
        let now = self.clock.now();
        let expired: Vec<String> = self
            .switches
            .iter()
            .filter(|s| s.is_active && s.is_overdue(now))
            .map(|s| s.id.clone())
            .collect();

        if expired.is_empty() {
            return Ok(expired);
        }

        let mut next = self.switches.clone();
        for switch in next.iter_mut().filter(|s| expired.contains(&s.id)) {
            switch.is_active = false;
        }
        self.commit(next)?;

        for id in &expired {
            info!(switch_id = %id, "Switch expired");
        }
        Ok(expired)
    }

    /// All switches in creation order.
    pub fn all(&self) -> &[Switch] {
        &self.switches
    }

    /// Look up a switch by id.
    pub fn get(&self, id: &str) -> Option<&Switch> {
        self.switches.iter().find(|s| s.id == id)
    }

    /// Switches that are still armed.
    pub fn active(&self) -> Vec<&Switch> {
        self.switches.iter().filter(|s| s.is_active).collect()
    }

    /// Switches that have expired or been deactivated.
    pub fn expired(&self) -> Vec<&Switch> {
        self.switches.iter().filter(|s| !s.is_active).collect()
    }

    /// The store's time source.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.switches
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| SwitchError::NotFound { id: id.to_string() })
    }

    fn next_id(&self, millis: i64) -> String {
        let mut candidate = millis;
        while self.switches.iter().any(|s| s.id == candidate.to_string()) {
            candidate += 1;
        }
        candidate.to_string()
    }

    fn commit(&mut self, next: Vec<Switch>) -> Result<()> {
        if let Err(e) = self.repository.save_all(&next) {
            error!("Failed to persist switches: {}", e);
            return Err(e);
        }
        self.switches = next;
        Ok(())
    }
}

impl std::fmt::Debug for SwitchStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwitchStore")
            .field("switches", &self.switches.len())
            .field("active", &self.active().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::repository::InMemoryRepository;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    struct Fixture {
        store: SwitchStore,
        repo: Arc<InMemoryRepository>,
        clock: ManualClock,
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(InMemoryRepository::new());
        let clock = ManualClock::new(t0());
        let store = SwitchStore::load_with_clock(repo.clone(), Arc::new(clock.clone())).unwrap();
        Fixture { store, repo, clock }
    }

    /// Repository whose writes always fail.
    struct BrokenRepository;

    impl SwitchRepository for BrokenRepository {
        fn load_all(&self) -> Result<Vec<Switch>> {
            Ok(Vec::new())
        }

        fn save_all(&self, _switches: &[Switch]) -> Result<()> {
            Err(SwitchError::Storage(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    fn assert_deadline_invariant(switch: &Switch) {
        let last = switch.last_check_in.unwrap();
        let expected = last
            + Duration::hours(i64::from(switch.check_in_interval))
            + Duration::hours(i64::from(switch.grace_period));
        assert_eq!(switch.expires_at, Some(expected));
    }

    #[test]
    fn test_create_sets_deadline() {
        let mut f = fixture();
        let switch = f
            .store
            .create(NewSwitch::new("  the keys are in the blue box  ", 24).with_grace_period(12))
            .unwrap();

        assert_eq!(switch.message, "the keys are in the blue box");
        assert_eq!(switch.last_check_in, Some(t0()));
        assert_eq!(switch.expires_at, Some(t0() + Duration::hours(36)));
        assert!(switch.is_active);
        assert_eq!(switch.id, t0().timestamp_millis().to_string());
        assert_deadline_invariant(&switch);
        assert_eq!(f.repo.stored(), vec![switch]);
    }

    #[test]
    fn test_create_rejects_invalid_payload() {
        let mut f = fixture();

        let err = f.store.create(NewSwitch::new("   ", 24)).unwrap_err();
        assert!(matches!(err, SwitchError::InvalidInput(_)));

        let err = f.store.create(NewSwitch::new("hello", 0)).unwrap_err();
        assert!(matches!(err, SwitchError::InvalidInput(_)));

        assert!(f.store.all().is_empty());
        assert_eq!(f.repo.save_count(), 0);
    }

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let mut f = fixture();
        let a = f.store.create(NewSwitch::new("a", 1)).unwrap();
        let b = f.store.create(NewSwitch::new("b", 1)).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_check_in_resets_deadline() {
        let mut f = fixture();
        let switch = f
            .store
            .create(NewSwitch::new("msg", 24).with_grace_period(12))
            .unwrap();

        f.clock.advance(Duration::hours(20));
        let updated = f.store.check_in(&switch.id).unwrap();

        assert_eq!(updated.last_check_in, Some(t0() + Duration::hours(20)));
        assert_eq!(updated.expires_at, Some(t0() + Duration::hours(56)));
        assert_deadline_invariant(&updated);
        assert_eq!(f.store.get(&switch.id), Some(&updated));
        assert_eq!(f.repo.save_count(), 2);
    }

    #[test]
    fn test_check_in_unknown_id() {
        let mut f = fixture();
        let err = f.store.check_in("missing").unwrap_err();
        assert!(matches!(err, SwitchError::NotFound { ref id } if id == "missing"));
        assert_eq!(f.repo.save_count(), 0);
    }

    #[test]
    fn test_expiry_scenario() {
        let mut f = fixture();
        let switch = f
            .store
            .create(NewSwitch::new("msg", 24).with_grace_period(12))
            .unwrap();
        assert_eq!(switch.expires_at, Some(t0() + Duration::hours(36)));

        f.clock.advance(Duration::hours(37));
        let expired = f.store.sweep().unwrap();
        assert_eq!(expired, vec![switch.id.clone()]);
        assert!(!f.store.get(&switch.id).unwrap().is_active);

        // Expiry is one-way: a late check-in does not revive the switch.
        let err = f.store.check_in(&switch.id).unwrap_err();
        assert!(matches!(err, SwitchError::Inactive { .. }));
        let after = f.store.get(&switch.id).unwrap();
        assert!(!after.is_active);
        assert_eq!(after.expires_at, Some(t0() + Duration::hours(36)));
    }

    #[test]
    fn test_check_in_after_deadline_before_sweep() {
        let mut f = fixture();
        let switch = f.store.create(NewSwitch::new("msg", 2)).unwrap();

        f.clock.advance(Duration::hours(3));
        let err = f.store.check_in(&switch.id).unwrap_err();
        assert!(matches!(err, SwitchError::Inactive { .. }));
        assert!(!f.store.get(&switch.id).unwrap().is_active);
        assert!(!f.repo.stored()[0].is_active);

        // The sweep has nothing left to do.
        assert!(f.store.sweep().unwrap().is_empty());
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let mut f = fixture();
        f.store.create(NewSwitch::new("short", 1)).unwrap();
        f.store.create(NewSwitch::new("long", 100)).unwrap();

        f.clock.advance(Duration::hours(2));
        assert_eq!(f.store.sweep().unwrap().len(), 1);
        let after_first = f.store.all().to_vec();
        let saves = f.repo.save_count();

        assert!(f.store.sweep().unwrap().is_empty());
        assert_eq!(f.store.all(), after_first.as_slice());
        assert_eq!(f.repo.save_count(), saves);
    }

    #[test]
    fn test_sweep_boundary_is_strict() {
        let mut f = fixture();
        let switch = f.store.create(NewSwitch::new("msg", 1)).unwrap();

        f.clock.advance(Duration::hours(1));
        assert!(f.store.sweep().unwrap().is_empty());
        assert!(f.store.get(&switch.id).unwrap().is_active);

        f.clock.advance(Duration::seconds(1));
        assert_eq!(f.store.sweep().unwrap(), vec![switch.id]);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut f = fixture();
        let keep = f.store.create(NewSwitch::new("keep", 5)).unwrap();
        let gone = f.store.create(NewSwitch::new("gone", 5)).unwrap();

        assert!(f.store.delete(&gone.id).unwrap());
        let after_first = f.store.all().to_vec();
        let saves = f.repo.save_count();

        assert!(!f.store.delete(&gone.id).unwrap());
        assert_eq!(f.store.all(), after_first.as_slice());
        assert_eq!(f.store.all(), &[keep]);
        assert_eq!(f.repo.save_count(), saves);
    }

    #[test]
    fn test_active_and_expired_partitions() {
        let mut f = fixture();
        let a = f.store.create(NewSwitch::new("a", 1)).unwrap();
        let b = f.store.create(NewSwitch::new("b", 10)).unwrap();
        f.store.deactivate(&b.id).unwrap();

        assert_eq!(f.store.active().len(), 1);
        assert_eq!(f.store.active()[0].id, a.id);
        assert_eq!(f.store.expired().len(), 1);
        assert_eq!(f.store.expired()[0].id, b.id);
    }

    #[test]
    fn test_failed_persist_leaves_store_unchanged() {
        let clock = ManualClock::new(t0());
        let mut store =
            SwitchStore::load_with_clock(Arc::new(BrokenRepository), Arc::new(clock)).unwrap();

        let err = store.create(NewSwitch::new("msg", 1)).unwrap_err();
        assert!(matches!(err, SwitchError::Storage(_)));
        assert!(store.all().is_empty());
    }

    #[test]
    fn test_reload_from_repository() {
        let mut f = fixture();
        let switch = f.store.create(NewSwitch::new("persist me", 48)).unwrap();

        let reloaded =
            SwitchStore::load_with_clock(f.repo.clone(), Arc::new(f.clock.clone())).unwrap();
        assert_eq!(reloaded.all(), &[switch]);
    }
}
