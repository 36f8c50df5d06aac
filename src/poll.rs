//! Background poll loops, lifecycle-bound to the company session. Each loop
//! fetches immediately on start, then on a fixed interval; individual fetch
//! failures are logged and swallowed so status/announcement staleness never
//! turns into error UI. Teardown is a synchronous handle abort performed
//! inside the session-change notification, so no further tick can be
//! scheduled once `invalidate` returns; a fetch already in flight is
//! discarded by the live-session guard at apply time.

use crate::{
    announcements::{self, Announcement},
    config::Config,
    errors::Error,
    gateway::Gateway,
    session::{Domain, SessionController},
    status::{self, TenantStatus},
};
use std::{
    future::Future,
    sync::{Arc, Mutex, PoisonError, Weak},
    time::Duration,
};
use tokio::{task::JoinHandle, time::sleep};
use tracing::debug;

/// Last successfully fetched value of one poll loop, and nothing else.
pub struct PollCache<T> {
    inner: Arc<Mutex<Option<T>>>,
}

impl<T> Clone for PollCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for PollCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PollCache<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
        }
    }

    /// Latest fetched value, `None` before the first successful fetch or
    /// after teardown.
    #[must_use]
    pub fn get(&self) -> Option<T>
    where
        T: Clone,
    {
        self.lock().clone()
    }

    pub(crate) fn set(&self, value: T) {
        *self.lock() = Some(value);
    }

    pub(crate) fn clear(&self) {
        *self.lock() = None;
    }

    pub(crate) fn update(&self, apply: impl FnOnce(&mut Option<T>)) {
        let mut value = self.lock();
        apply(&mut value);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cancellable handle of one running poll loop. Dropping the handle also
/// stops the loop.
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stops the loop. Synchronous: once this returns no further tick is
    /// scheduled.
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns a repeating fetch-and-cache loop: one immediate fetch, then one per
/// `interval` while `live` holds. `live` is consulted again before every
/// cache write, so a value fetched across a teardown is discarded instead of
/// resurrecting a torn-down cache.
pub fn spawn_poll_loop<T, F, Fut>(
    name: &'static str,
    interval: Duration,
    cache: PollCache<T>,
    live: impl Fn() -> bool + Send + Sync + 'static,
    fetch: F,
) -> PollHandle
where
    T: Clone + Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, Error>> + Send + 'static,
{
    let task = tokio::spawn(async move {
        loop {
            if !live() {
                break;
            }

            match fetch().await {
                Ok(value) => {
                    if live() {
                        cache.set(value);
                    } else {
                        debug!("Discarding {name} result fetched across teardown");
                        break;
                    }
                }
                Err(err) => debug!("{name} poll failed, keeping last value: {err}"),
            }

            sleep(interval).await;
        }
    });

    PollHandle { task }
}

struct Inner {
    gateway: Gateway,
    controller: Arc<SessionController>,
    runtime: tokio::runtime::Handle,
    status_interval: Duration,
    announcements_interval: Duration,
    status: PollCache<TenantStatus>,
    announcements: PollCache<Vec<Announcement>>,
    handles: Mutex<Vec<PollHandle>>,
}

impl Inner {
    fn start(self: &Arc<Self>) {
        let mut handles = self.lock_handles();
        if !handles.is_empty() {
            return;
        }

        debug!("Starting tenant-status and announcement poll loops");

        let live = {
            let controller = self.controller.clone();
            move || controller.company().is_some()
        };

        let status_inner = self.clone();
        handles.push(spawn_poll_loop(
            "tenant-status",
            self.status_interval,
            self.status.clone(),
            live.clone(),
            move || {
                let inner = status_inner.clone();
                async move { status::fetch_status(&inner.gateway).await }
            },
        ));

        let announcements_inner = self.clone();
        handles.push(spawn_poll_loop(
            "announcements",
            self.announcements_interval,
            self.announcements.clone(),
            live,
            move || {
                let inner = announcements_inner.clone();
                async move { announcements::fetch_announcements(&inner.gateway).await }
            },
        ));
    }

    fn stop(&self) {
        let mut handles = self.lock_handles();
        if handles.is_empty() {
            return;
        }

        debug!("Stopping poll loops");
        for handle in handles.drain(..) {
            handle.stop();
        }

        self.status.clear();
        self.announcements.clear();
    }

    fn lock_handles(&self) -> std::sync::MutexGuard<'_, Vec<PollHandle>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Owns both company poll caches and their loop handles, and binds them to
/// the session lifecycle: a company session appearing starts both loops,
/// the session ending stops them and discards the caches before the
/// controller's `invalidate` returns. Repeated login/logout cycles leak no
/// timers.
pub struct PollSupervisor {
    inner: Arc<Inner>,
}

impl PollSupervisor {
    /// Builds the supervisor and subscribes it to the controller. If a
    /// company session is already live (rehydrated from the store), the
    /// loops start right away.
    ///
    /// Must be called within a tokio runtime; loops are spawned onto the
    /// current one.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn attach(
        config: &Config,
        controller: &Arc<SessionController>,
        gateway: Gateway,
    ) -> Self {
        debug_assert_eq!(gateway.domain(), Domain::Company);

        let inner = Arc::new(Inner {
            gateway,
            controller: controller.clone(),
            runtime: tokio::runtime::Handle::current(),
            status_interval: config.status_poll_interval,
            announcements_interval: config.announcements_poll_interval,
            status: PollCache::new(),
            announcements: PollCache::new(),
            handles: Mutex::new(Vec::new()),
        });

        if controller.company().is_some() {
            let _guard = inner.runtime.enter();
            inner.start();
        }

        let hook = Arc::downgrade(&inner);
        controller.subscribe(move |domain| {
            if domain != Domain::Company {
                return;
            }
            supervise(&hook);
        });

        Self { inner }
    }

    /// Latest tenant status, `None` before the first fetch or without a
    /// session.
    #[must_use]
    pub fn status(&self) -> Option<TenantStatus> {
        self.inner.status.get()
    }

    /// Latest announcement set, in server order.
    #[must_use]
    pub fn announcements(&self) -> Option<Vec<Announcement>> {
        self.inner.announcements.get()
    }

    /// Whether the loops are currently running.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        !self.inner.lock_handles().is_empty()
    }

    /// Acknowledges one announcement; the local set drops it immediately.
    ///
    /// # Errors
    /// See [`announcements::acknowledge`].
    pub async fn acknowledge(&self, id: &str) -> Result<(), Error> {
        announcements::acknowledge(&self.inner.gateway, &self.inner.announcements, id).await
    }

    /// Acknowledges every announcement and empties the local set.
    ///
    /// # Errors
    /// See [`announcements::acknowledge_all`].
    pub async fn acknowledge_all(&self) -> Result<(), Error> {
        announcements::acknowledge_all(&self.inner.gateway, &self.inner.announcements).await
    }
}

/// Session-change hook: start loops when a company session appears, tear
/// everything down when it goes away. Runs synchronously under the
/// controller's notification.
fn supervise(inner: &Weak<Inner>) {
    let Some(inner) = inner.upgrade() else {
        return;
    };

    if inner.controller.company().is_some() {
        let _guard = inner.runtime.enter();
        inner.start();
    } else {
        inner.stop();
    }
}
