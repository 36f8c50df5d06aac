//! Typed outcomes of the credential exchange. Rejections are values, not
//! errors: the UI renders `Denied` messages inline and a `TwoFactorRequired`
//! keeps the login form in its challenge step. Separating the first and
//! second factor as distinct outcomes prevents a successful first factor from
//! being mistaken for full authentication.

use crate::session::{AdminSession, CompanySession, PendingTwoFactor};

/// Result of a company login attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompanyLoginOutcome {
    Authenticated(CompanySession),
    /// Bad credentials or no response; `message` renders inline on the form.
    Denied { message: String },
}

/// Result of an admin first-factor attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdminLoginOutcome {
    Authenticated(AdminSession),
    /// The backend demands a TOTP code before issuing a session. Returned
    /// regardless of whether a code was supplied with the first factor.
    TwoFactorRequired(PendingTwoFactor),
    Denied { message: String },
}

/// Result of a TOTP verification attempt. A denial leaves the pending
/// challenge usable for another code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TwoFactorOutcome {
    Authenticated(AdminSession),
    Denied { message: String },
}
