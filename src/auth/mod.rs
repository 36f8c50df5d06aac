//! Credential exchange for both identity domains: company login, admin login
//! with its TOTP second step, and the typed outcomes that keep the pending
//! 2FA state representable instead of mistakable for full authentication.

pub mod client;
pub mod types;

pub use client::{is_valid_totp_code, login_admin, login_company, verify_two_factor};
pub use types::{AdminLoginOutcome, CompanyLoginOutcome, TwoFactorOutcome};
