//! Session controller: the only component allowed to mutate a session. Holds
//! the in-memory record per domain, hydrated once at construction from the
//! persisted store (a persisted record is trusted until a 401 proves it
//! invalid), mirrors every change back to the store, and notifies subscribers
//! after state and store are both updated so no subscriber observes a state
//! between a mutation and its persistence write.

use super::{AdminSession, CompanySession, Domain, SessionStore};
use std::sync::{Mutex, PoisonError};
use tracing::info;

type Listener = Box<dyn Fn(Domain) + Send + Sync>;

#[derive(Default)]
struct State {
    company: Option<CompanySession>,
    admin: Option<AdminSession>,
}

pub struct SessionController {
    state: Mutex<State>,
    store: SessionStore,
    listeners: Mutex<Vec<Listener>>,
}

impl SessionController {
    /// Builds a controller hydrated from the persisted store. No network
    /// call is involved.
    #[must_use]
    pub fn new(store: SessionStore) -> Self {
        let state = State {
            company: store.load(Domain::Company),
            admin: store.load(Domain::Admin),
        };

        Self {
            state: Mutex::new(state),
            store,
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Current company session, if any. Always reflects the latest state.
    #[must_use]
    pub fn company(&self) -> Option<CompanySession> {
        self.lock_state().company.clone()
    }

    /// Current admin session, if any.
    #[must_use]
    pub fn admin(&self) -> Option<AdminSession> {
        self.lock_state().admin.clone()
    }

    /// Bearer token for `domain`, if a session is live.
    #[must_use]
    pub fn token(&self, domain: Domain) -> Option<String> {
        let state = self.lock_state();
        match domain {
            Domain::Company => state.company.as_ref().map(|s| s.token.clone()),
            Domain::Admin => state.admin.as_ref().map(|s| s.token.clone()),
        }
    }

    /// Replaces the company session and mirrors it to the store.
    pub fn set_company(&self, record: CompanySession) {
        {
            let mut state = self.lock_state();
            self.store.save(Domain::Company, &record);
            state.company = Some(record);
        }
        info!("Company session established");
        self.notify(Domain::Company);
    }

    /// Replaces the admin session and mirrors it to the store.
    pub fn set_admin(&self, record: AdminSession) {
        {
            let mut state = self.lock_state();
            self.store.save(Domain::Admin, &record);
            state.admin = Some(record);
        }
        info!("Admin session established");
        self.notify(Domain::Admin);
    }

    /// Clears the in-memory and persisted record for `domain`, then notifies
    /// subscribers. Invalidating an already-absent session is a no-op and
    /// notifies nobody. The other domain's record is never touched.
    pub fn invalidate(&self, domain: Domain) {
        let cleared = {
            let mut state = self.lock_state();
            let slot_was_live = match domain {
                Domain::Company => state.company.take().is_some(),
                Domain::Admin => state.admin.take().is_some(),
            };
            if slot_was_live {
                self.store.clear(domain);
            }
            slot_was_live
        };

        if cleared {
            info!("Session invalidated: {domain:?}");
            self.notify(domain);
        }
    }

    /// Registers a synchronous listener invoked after every effective
    /// mutation. Listeners run on the mutating caller with the state already
    /// updated and persisted.
    pub fn subscribe(&self, listener: impl Fn(Domain) + Send + Sync + 'static) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(listener));
    }

    fn notify(&self, domain: Domain) {
        let listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        for listener in listeners.iter() {
            listener(domain);
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn company_record() -> CompanySession {
        CompanySession {
            token: "tok-1".to_string(),
            company_id: "acme".to_string(),
            display_name: "Acme Corp".to_string(),
        }
    }

    fn admin_record() -> AdminSession {
        AdminSession {
            token: "tok-a".to_string(),
            username: "root".to_string(),
        }
    }

    #[test]
    fn hydrates_from_store() {
        let store = SessionStore::in_memory();
        store.save(Domain::Company, &company_record());

        let controller = SessionController::new(store);
        assert_eq!(controller.company(), Some(company_record()));
        assert!(controller.admin().is_none());
    }

    #[test]
    fn set_mirrors_to_store() {
        let store = SessionStore::in_memory();
        let controller = SessionController::new(store.clone());

        controller.set_company(company_record());
        assert_eq!(
            store.load::<CompanySession>(Domain::Company),
            Some(company_record())
        );
    }

    #[test]
    fn invalidate_is_durable_and_idempotent() {
        let store = SessionStore::in_memory();
        let controller = SessionController::new(store.clone());
        controller.set_company(company_record());

        let notifications = Arc::new(AtomicUsize::new(0));
        let seen = notifications.clone();
        controller.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        controller.invalidate(Domain::Company);
        assert!(controller.company().is_none());
        assert!(store.load::<CompanySession>(Domain::Company).is_none());
        assert_eq!(notifications.load(Ordering::SeqCst), 1);

        // Second invalidation is a no-op, not an error, and stays silent.
        controller.invalidate(Domain::Company);
        assert_eq!(notifications.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn domains_are_isolated() {
        let controller = SessionController::new(SessionStore::in_memory());
        controller.set_company(company_record());
        controller.set_admin(admin_record());

        controller.invalidate(Domain::Admin);
        assert!(controller.admin().is_none());
        assert_eq!(controller.company(), Some(company_record()));

        controller.invalidate(Domain::Company);
        assert!(controller.company().is_none());
    }

    #[test]
    fn listeners_observe_the_updated_state() {
        let store = SessionStore::in_memory();
        let controller = Arc::new(SessionController::new(store.clone()));

        let observed = Arc::new(Mutex::new(Vec::new()));
        let seen = observed.clone();
        let inner = controller.clone();
        let inner_store = store;
        controller.subscribe(move |domain| {
            // Both the in-memory value and the persisted record must already
            // reflect the mutation when a listener runs.
            let live = inner.company().is_some();
            let persisted = inner_store.load::<CompanySession>(Domain::Company).is_some();
            seen.lock().unwrap().push((domain, live, persisted));
        });

        controller.set_company(company_record());
        controller.invalidate(Domain::Company);

        let observed = observed.lock().unwrap();
        assert_eq!(
            *observed,
            vec![
                (Domain::Company, true, true),
                (Domain::Company, false, false)
            ]
        );
    }
}
