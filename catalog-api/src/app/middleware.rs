use std::future::Future;
use std::pin::Pin;

use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use catalog_core::RequestOrigin;

use super::error::ApiError;
use super::state::AppState;

/// Remaining quota in the current rate-limit window.
pub const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
/// Header carrying the shared secret for writes.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Client identifier resolved by [`rate_limit_middleware`].
#[derive(Debug, Clone)]
pub struct ClientIp(pub String);

/// 写操作鉴权 Extractor：同站请求或携带正确 `x-api-key` 才放行
#[derive(Debug, Clone, Copy)]
pub struct RequireWriteAccess;

impl FromRequestParts<AppState> for RequireWriteAccess {
	type Rejection = ApiError;

	fn from_request_parts<'a, 'b, 'c>(
		parts: &'a mut Parts,
		state: &'b AppState,
	) -> Pin<Box<dyn Future<Output = Result<Self, Self::Rejection>> + Send + 'c>>
	where
		'a: 'c,
		'b: 'c,
	{
		Box::pin(async move {
			let headers = &parts.headers;
			let request = RequestOrigin {
				origin: header_str(headers, "origin"),
				referer: header_str(headers, "referer"),
				host: header_str(headers, "host"),
				api_key: header_str(headers, API_KEY_HEADER),
			};
			if state.guard.verify(&request) {
				return Ok(RequireWriteAccess);
			}

			let client_ip = parts
				.extensions
				.get::<ClientIp>()
				.map(|ip| ip.0.clone())
				.unwrap_or_else(|| extract_client_ip(headers));
			tracing::warn!(
				"write rejected: IP={}, method={}, path={}",
				client_ip,
				parts.method,
				parts.uri.path()
			);
			Err(ApiError::unauthorized())
		})
	}
}

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
	headers.get(name).and_then(|v| v.to_str().ok())
}

/// 从请求头中提取客户端 IP
/// 优先级：X-Forwarded-For（第一个） > X-Real-IP > "unknown"
pub fn extract_client_ip(headers: &HeaderMap) -> String {
	if let Some(forwarded) = header_str(headers, "x-forwarded-for") {
		if let Some(first_ip) = forwarded.split(',').next().map(|s| s.trim()) {
			if !first_ip.is_empty() {
				return first_ip.to_string();
			}
		}
	}

	if let Some(real_ip) = header_str(headers, "x-real-ip").map(str::trim) {
		if !real_ip.is_empty() {
			return real_ip.to_string();
		}
	}

	"unknown".to_string()
}

/// 按客户端 IP 做固定窗口限流，并在响应中附带剩余配额。
pub async fn rate_limit_middleware(
	State(state): State<AppState>,
	mut request: Request<Body>,
	next: Next,
) -> Response {
	let client_ip = extract_client_ip(request.headers());
	let decision = state.limiter.check(&client_ip).await;

	if !decision.allowed {
		tracing::warn!(
			"rate limit exceeded: IP={}, limit={}, path={}",
			client_ip,
			state.limiter.limit(),
			request.uri().path()
		);
		let mut response = ApiError::too_many_requests().into_response();
		response
			.headers_mut()
			.insert(RATE_LIMIT_REMAINING, HeaderValue::from(0u32));
		return response;
	}

	request.extensions_mut().insert(ClientIp(client_ip));
	let mut response = next.run(request).await;
	response
		.headers_mut()
		.insert(RATE_LIMIT_REMAINING, HeaderValue::from(decision.remaining));
	response
}

#[cfg(test)]
mod tests {
	use super::*;

	fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
		let mut map = HeaderMap::new();
		for (k, v) in pairs {
			map.insert(*k, HeaderValue::from_static(v));
		}
		map
	}

	#[test]
	fn forwarded_for_wins() {
		let h = headers(&[
			("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
			("x-real-ip", "198.51.100.2"),
		]);
		assert_eq!(extract_client_ip(&h), "203.0.113.7");
	}

	#[test]
	fn real_ip_is_fallback() {
		let h = headers(&[("x-forwarded-for", " "), ("x-real-ip", "198.51.100.2")]);
		assert_eq!(extract_client_ip(&h), "198.51.100.2");
	}

	#[test]
	fn unknown_without_headers() {
		assert_eq!(extract_client_ip(&HeaderMap::new()), "unknown");
	}
}
