use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;

/// Build an HTTP client that sends `x-api-key` on every request when a key is given.
pub fn build_client(api_key: &Option<String>) -> anyhow::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(key) = api_key {
        let mut headers = HeaderMap::new();
        let mut value = HeaderValue::from_str(key)?;
        value.set_sensitive(true);
        headers.insert("x-api-key", value);
        builder = builder.default_headers(headers);
    }
    Ok(builder.build()?)
}

/// Normalize non-2xx responses into errors while returning the response on success.
pub async fn handle_error(resp: reqwest::Response) -> anyhow::Result<reqwest::Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let message = resp
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| "unknown error".to_string());
    tracing::debug!(%status, %message, "api returned an error");
    Err(anyhow::anyhow!("request failed {}: {}", status, message))
}
