//! Credential exchange: one network round trip per operation, no internal
//! retry, typed outcomes instead of errors. Error payloads are decoded
//! defensively (`detail` field, generic fallback); transport failures never
//! leak their internals into a user-facing message. Credentials cross this
//! module as [`SecretString`] and are exposed only at the serialization
//! boundary; they are never logged.

use crate::{
    auth::types::{AdminLoginOutcome, CompanyLoginOutcome, TwoFactorOutcome},
    config::Config,
    errors::CONNECTIVITY_MESSAGE,
    session::{AdminSession, CompanySession, PendingTwoFactor},
    APP_USER_AGENT,
};
use regex::Regex;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::OnceLock;
use tracing::{debug, info_span, Instrument};

/// Validates the shape of a TOTP code: exactly six ASCII digits. Callers run
/// this before [`verify_two_factor`]; the exchange itself only forwards.
#[must_use]
pub fn is_valid_totp_code(code: &str) -> bool {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    let shape = SHAPE.get_or_init(|| Regex::new(r"^[0-9]{6}$").expect("valid literal pattern"));
    shape.is_match(code)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompanyLoginResponse {
    token: String,
    company_id: String,
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdminLoginResponse {
    token: String,
    #[serde(default)]
    requires_two_factor: bool,
    #[serde(default)]
    username: Option<String>,
}

/// Exchanges company credentials for a session record.
pub async fn login_company(
    config: &Config,
    company_id: &str,
    password: &SecretString,
) -> CompanyLoginOutcome {
    let url = config.endpoint("/auth/login");
    let payload = json!({
        "companyId": company_id,
        "password": password.expose_secret(),
    });

    let span = info_span!("auth.login_company", http.method = "POST", url = %url);
    let response = match post_json(config, &url, &payload).instrument(span).await {
        Ok(response) => response,
        Err(err) => {
            debug!("Company login transport failure: {err}");
            return CompanyLoginOutcome::Denied {
                message: CONNECTIVITY_MESSAGE.to_string(),
            };
        }
    };

    if !response.status().is_success() {
        return CompanyLoginOutcome::Denied {
            message: denial_message(response).await,
        };
    }

    match response.json::<CompanyLoginResponse>().await {
        Ok(body) => CompanyLoginOutcome::Authenticated(CompanySession {
            token: body.token,
            company_id: body.company_id,
            display_name: body.name,
        }),
        Err(err) => {
            debug!("Company login returned a malformed body: {err}");
            CompanyLoginOutcome::Denied {
                message: CONNECTIVITY_MESSAGE.to_string(),
            }
        }
    }
}

/// Exchanges admin credentials for either a session record or a pending
/// 2FA challenge. A server-side 2FA demand wins over any supplied code, so a
/// stale code never silently succeeds.
pub async fn login_admin(
    config: &Config,
    username: &str,
    password: &SecretString,
    totp_code: Option<&SecretString>,
) -> AdminLoginOutcome {
    let url = config.endpoint("/auth/admin/login");
    let mut payload = json!({
        "username": username,
        "password": password.expose_secret(),
    });
    if let (Some(code), Value::Object(body)) = (totp_code, &mut payload) {
        body.insert(
            "totpCode".to_string(),
            Value::String(code.expose_secret().to_string()),
        );
    }

    let span = info_span!("auth.login_admin", http.method = "POST", url = %url);
    let response = match post_json(config, &url, &payload).instrument(span).await {
        Ok(response) => response,
        Err(err) => {
            debug!("Admin login transport failure: {err}");
            return AdminLoginOutcome::Denied {
                message: CONNECTIVITY_MESSAGE.to_string(),
            };
        }
    };

    if !response.status().is_success() {
        return AdminLoginOutcome::Denied {
            message: denial_message(response).await,
        };
    }

    match response.json::<AdminLoginResponse>().await {
        Ok(body) if body.requires_two_factor => {
            AdminLoginOutcome::TwoFactorRequired(PendingTwoFactor {
                challenge_token: body.token,
            })
        }
        Ok(body) => match body.username {
            Some(username) => AdminLoginOutcome::Authenticated(AdminSession {
                token: body.token,
                username,
            }),
            None => {
                debug!("Admin login response carried no username");
                AdminLoginOutcome::Denied {
                    message: CONNECTIVITY_MESSAGE.to_string(),
                }
            }
        },
        Err(err) => {
            debug!("Admin login returned a malformed body: {err}");
            AdminLoginOutcome::Denied {
                message: CONNECTIVITY_MESSAGE.to_string(),
            }
        }
    }
}

/// Completes the admin second factor against a pending challenge. A denial
/// does not consume the challenge; the caller may retry with a fresh code
/// against the same token.
pub async fn verify_two_factor(
    config: &Config,
    challenge: &PendingTwoFactor,
    code: &SecretString,
) -> TwoFactorOutcome {
    let url = config.endpoint("/auth/admin/verify-2fa");
    let payload = json!({ "code": code.expose_secret() });

    let span = info_span!("auth.verify_two_factor", http.method = "POST", url = %url);
    let request = match http_client(config) {
        Ok(client) => client
            .post(&url)
            .bearer_auth(&challenge.challenge_token)
            .json(&payload)
            .send(),
        Err(err) => {
            debug!("Failed to build HTTP client: {err}");
            return TwoFactorOutcome::Denied {
                message: CONNECTIVITY_MESSAGE.to_string(),
            };
        }
    };

    let response = match request.instrument(span).await {
        Ok(response) => response,
        Err(err) => {
            debug!("2FA verification transport failure: {err}");
            return TwoFactorOutcome::Denied {
                message: CONNECTIVITY_MESSAGE.to_string(),
            };
        }
    };

    if !response.status().is_success() {
        return TwoFactorOutcome::Denied {
            message: denial_message(response).await,
        };
    }

    match response.json::<AdminLoginResponse>().await {
        Ok(AdminLoginResponse {
            token,
            username: Some(username),
            ..
        }) => TwoFactorOutcome::Authenticated(AdminSession { token, username }),
        Ok(_) | Err(_) => {
            debug!("2FA verification returned a malformed body");
            TwoFactorOutcome::Denied {
                message: CONNECTIVITY_MESSAGE.to_string(),
            }
        }
    }
}

fn http_client(config: &Config) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(APP_USER_AGENT)
        .timeout(config.request_timeout)
        .build()
}

async fn post_json(config: &Config, url: &str, payload: &Value) -> reqwest::Result<Response> {
    http_client(config)?.post(url).json(payload).send().await
}

/// Extracts the server's `detail` message from an error payload, falling
/// back to the generic connectivity message on any shape mismatch.
async fn denial_message(response: Response) -> String {
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    body.get("detail")
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .unwrap_or_else(|| CONNECTIVITY_MESSAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totp_shape_accepts_exactly_six_digits() {
        assert!(is_valid_totp_code("000000"));
        assert!(is_valid_totp_code("123456"));

        assert!(!is_valid_totp_code("12345"));
        assert!(!is_valid_totp_code("1234567"));
        assert!(!is_valid_totp_code("12345a"));
        assert!(!is_valid_totp_code(" 123456"));
        assert!(!is_valid_totp_code(""));
    }
}
