//! Plumbing shared by the HTTP-backed provider clients

use reqwest::{Client, Response};
use serde_json::Value;
use tracing::debug;

const USER_AGENT: &str = concat!("Roadwatch/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client used by every provider.
///
/// No timeout is set; requests use the client defaults.
pub fn http_client() -> crate::Result<Client> {
    Ok(Client::builder().user_agent(USER_AGENT).build()?)
}

/// Pull a human-readable message out of a provider error body.
///
/// Understands `{"message": ".."}` (OpenWeatherMap, OSRM) and
/// `{"status": {"message": ".."}}` (OpenCage).
pub async fn error_message(response: Response) -> Option<String> {
    let status = response.status();
    let body = response.text().await.ok()?;
    debug!("Provider returned {}: {}", status, body);
    message_from_body(&body)
}

pub fn message_from_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("status").and_then(|status| status.get("message")))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(ToString::to_string)
}

/// Trim a configured base URL so paths can be appended with `/`
pub fn join(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}
