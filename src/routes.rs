//! Route gate: pure decision logic mapping the current sessions of both
//! domains plus a requested path onto the reachable UI surface. No UI and no
//! navigation live here; the router consumes the decision. This is a
//! UX-level gate, real access control lives on the API.

use crate::session::{AdminSession, CompanySession};

pub const ADMIN_PATH_PREFIX: &str = "/admin";
pub const ADMIN_LOGIN_PATH: &str = "/admin/login";
pub const ADMIN_HOME_PATH: &str = "/admin";
pub const COMPANY_LOGIN_PATH: &str = "/login";
pub const COMPANY_HOME_PATH: &str = "/";

/// Surface selected for a requested path, or where to send the user instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteDecision {
    /// Marketing pages and both credential-entry surfaces, including the
    /// mid-flight pending-2FA step of the admin login.
    Public,
    /// Tenant-operator console.
    Company,
    /// Platform-administration console.
    Admin,
    Redirect(&'static str),
}

/// Decides the reachable surface. Admin paths are checked first and only ever
/// resolve against the admin session; everything else resolves against the
/// company session. One tab may hold both sessions, but per path prefix only
/// one surface is reachable.
#[must_use]
pub fn evaluate(
    company: Option<&CompanySession>,
    admin: Option<&AdminSession>,
    path: &str,
) -> RouteDecision {
    if is_admin_path(path) {
        if path == ADMIN_LOGIN_PATH {
            // Signed-in admins get bounced off the login page.
            return if admin.is_some() {
                RouteDecision::Redirect(ADMIN_HOME_PATH)
            } else {
                RouteDecision::Public
            };
        }
        return if admin.is_some() {
            RouteDecision::Admin
        } else {
            RouteDecision::Redirect(ADMIN_LOGIN_PATH)
        };
    }

    if path == COMPANY_LOGIN_PATH {
        return if company.is_some() {
            RouteDecision::Redirect(COMPANY_HOME_PATH)
        } else {
            RouteDecision::Public
        };
    }

    if company.is_some() {
        RouteDecision::Company
    } else if path == COMPANY_HOME_PATH {
        RouteDecision::Public
    } else {
        RouteDecision::Redirect(COMPANY_LOGIN_PATH)
    }
}

fn is_admin_path(path: &str) -> bool {
    path == ADMIN_PATH_PREFIX || path.starts_with("/admin/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company() -> CompanySession {
        CompanySession {
            token: "tok-1".to_string(),
            company_id: "acme".to_string(),
            display_name: "Acme Corp".to_string(),
        }
    }

    fn admin() -> AdminSession {
        AdminSession {
            token: "tok-a".to_string(),
            username: "root".to_string(),
        }
    }

    #[test]
    fn unauthenticated_company_paths_gate_on_login() {
        assert_eq!(evaluate(None, None, "/"), RouteDecision::Public);
        assert_eq!(evaluate(None, None, "/login"), RouteDecision::Public);
        assert_eq!(
            evaluate(None, None, "/reports"),
            RouteDecision::Redirect(COMPANY_LOGIN_PATH)
        );
    }

    #[test]
    fn company_session_unlocks_the_company_surface_only() {
        let session = company();
        assert_eq!(
            evaluate(Some(&session), None, "/reports"),
            RouteDecision::Company
        );
        assert_eq!(evaluate(Some(&session), None, "/"), RouteDecision::Company);
        // A company session never opens the admin surface.
        assert_eq!(
            evaluate(Some(&session), None, "/admin/tenants"),
            RouteDecision::Redirect(ADMIN_LOGIN_PATH)
        );
    }

    #[test]
    fn admin_paths_resolve_against_the_admin_session_only() {
        let session = admin();
        assert_eq!(
            evaluate(None, Some(&session), "/admin/tenants"),
            RouteDecision::Admin
        );
        assert_eq!(
            evaluate(None, Some(&session), "/admin"),
            RouteDecision::Admin
        );
        // An admin session does not unlock the company surface.
        assert_eq!(
            evaluate(None, Some(&session), "/reports"),
            RouteDecision::Redirect(COMPANY_LOGIN_PATH)
        );
    }

    #[test]
    fn signed_in_users_are_bounced_off_login_pages() {
        assert_eq!(
            evaluate(Some(&company()), None, "/login"),
            RouteDecision::Redirect(COMPANY_HOME_PATH)
        );
        assert_eq!(
            evaluate(None, Some(&admin()), "/admin/login"),
            RouteDecision::Redirect(ADMIN_HOME_PATH)
        );
    }

    #[test]
    fn both_sessions_coexist_without_interference() {
        let c = company();
        let a = admin();
        assert_eq!(evaluate(Some(&c), Some(&a), "/reports"), RouteDecision::Company);
        assert_eq!(
            evaluate(Some(&c), Some(&a), "/admin/tenants"),
            RouteDecision::Admin
        );
    }

    #[test]
    fn admin_login_page_is_public_while_unauthenticated() {
        assert_eq!(evaluate(None, None, "/admin/login"), RouteDecision::Public);
        assert_eq!(
            evaluate(None, None, "/admin"),
            RouteDecision::Redirect(ADMIN_LOGIN_PATH)
        );
    }
}
