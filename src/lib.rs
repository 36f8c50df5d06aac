//! # Pordisto (Console Session & Auth Control Plane)
//!
//! `pordisto` is the client-side session and authentication control plane for
//! the tenant admin console. It owns everything between "the user typed a
//! password" and "the UI may render an authenticated surface":
//!
//! ## Identity Domains
//!
//! Two fully isolated domains share one process:
//!
//! - **Company:** a tenant operator. Single-step password login.
//! - **Admin:** a platform super-administrator. Password login followed by a
//!   mandatory TOTP second factor before the session is established.
//!
//! Each domain has at most one live [`session`] record at a time, mirrored to
//! the persisted session store so it survives reloads. The two domains never
//! touch each other's state; an admin 401 cannot clear a company session.
//!
//! ## Request Gateway & 401 Handling
//!
//! All authenticated calls go through a per-domain [`gateway::Gateway`] that
//! attaches the bearer token and, on HTTP 401, invalidates the session before
//! returning a typed [`errors::Error::SessionExpired`]. Invalidation is
//! idempotent, so concurrent in-flight 401s collapse into a single effective
//! de-authentication. The gateway never retries.
//!
//! ## Background Polling
//!
//! While a company session is live, two [`poll`] loops keep the tenant status
//! and the announcement set approximately fresh. They start with an immediate
//! fetch, swallow individual failures, and are torn down synchronously when
//! the session ends.

pub mod announcements;
pub mod auth;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod poll;
pub mod routes;
pub mod session;
pub mod status;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
