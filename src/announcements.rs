//! Announcement feature client. The poll loop keeps the local set fresh;
//! acknowledging an item removes it locally right away instead of waiting for
//! the next poll, so the UI count drops as soon as the backend accepts the
//! acknowledgement. Server order is preserved.

use crate::{
    errors::Error,
    gateway::{ensure_success, read_json, Gateway},
    poll::PollCache,
};
use serde::Deserialize;
use serde_json::json;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    /// Stable identity used for acknowledgement.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Deserialize)]
struct AnnouncementsResponse {
    announcements: Vec<Announcement>,
}

/// Fetches the announcement set through the company gateway, in server order.
///
/// # Errors
/// [`Error::SessionExpired`] / [`Error::Network`] from the gateway,
/// [`Error::Http`] on any other non-2xx status, [`Error::Parse`] on a
/// malformed body.
pub async fn fetch_announcements(gateway: &Gateway) -> Result<Vec<Announcement>, Error> {
    let response = gateway.get("/announcements").await?;
    let body: AnnouncementsResponse = read_json(response).await?;
    Ok(body.announcements)
}

/// Acknowledges one announcement and removes it from the local cache without
/// waiting for the next poll.
///
/// # Errors
/// See [`fetch_announcements`]; on error the local cache is left untouched.
pub async fn acknowledge(
    gateway: &Gateway,
    cache: &PollCache<Vec<Announcement>>,
    id: &str,
) -> Result<(), Error> {
    let response = gateway
        .post_json("/announcements/read", &json!({ "id": id }))
        .await?;
    ensure_success(response).await?;

    cache.update(|set| {
        if let Some(set) = set {
            set.retain(|announcement| announcement.id != id);
        }
    });
    Ok(())
}

/// Acknowledges every announcement and clears the local set.
///
/// # Errors
/// See [`fetch_announcements`]; on error the local cache is left untouched.
pub async fn acknowledge_all(
    gateway: &Gateway,
    cache: &PollCache<Vec<Announcement>>,
) -> Result<(), Error> {
    let response = gateway.post_empty("/announcements/read-all").await?;
    ensure_success(response).await?;

    cache.update(|set| {
        if let Some(set) = set {
            set.clear();
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_wire_shape_in_server_order() {
        let body: AnnouncementsResponse = serde_json::from_str(
            r#"{"announcements": [
                {"id": "a-2", "title": "Maintenance window"},
                {"id": "a-1", "title": "New export", "body": "CSV export is live."}
            ]}"#,
        )
        .expect("decode");

        let ids: Vec<&str> = body.announcements.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a-2", "a-1"]);
        assert_eq!(body.announcements[0].body, "");
    }
}
