use subtle::ConstantTimeEq;
use url::Url;

/// Error text returned to callers that fail the write check.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized: Invalid or missing API key";

/// How mutating requests are authorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardMode {
    /// Every request passes. Only reachable through an explicit opt-in.
    Disabled,
    /// Same-site browser requests pass; everything else must present the key.
    SharedSecret(String),
}

/// Header values that take part in the write check.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestOrigin<'a> {
    pub origin: Option<&'a str>,
    pub referer: Option<&'a str>,
    pub host: Option<&'a str>,
    pub api_key: Option<&'a str>,
}

/// Gate for POST/PUT/DELETE requests.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    mode: GuardMode,
}

impl AccessGuard {
    pub fn new(mode: GuardMode) -> Self {
        Self { mode }
    }

    pub fn disabled() -> Self {
        Self::new(GuardMode::Disabled)
    }

    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self::new(GuardMode::SharedSecret(secret.into()))
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self.mode, GuardMode::Disabled)
    }

    /// 判断请求是否允许执行写操作。
    ///
    /// 顺序：origin 同站 → referer 同站 → `x-api-key` 精确匹配。
    /// origin/referer 解析失败视为不匹配。
    pub fn verify(&self, request: &RequestOrigin<'_>) -> bool {
        let secret = match &self.mode {
            GuardMode::Disabled => return true,
            GuardMode::SharedSecret(secret) => secret,
        };

        if let Some(host) = request.host {
            let host_domain = host.split(':').next().unwrap_or(host);
            if [request.origin, request.referer]
                .into_iter()
                .flatten()
                .any(|candidate| is_same_site(candidate, host_domain))
            {
                return true;
            }
        }

        request
            .api_key
            .is_some_and(|key| bool::from(key.as_bytes().ct_eq(secret.as_bytes())))
    }
}

fn is_same_site(candidate: &str, host_domain: &str) -> bool {
    let Ok(url) = Url::parse(candidate) else {
        return false;
    };
    match url.host_str() {
        Some(hostname) => hostname == host_domain || hostname == "localhost",
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> AccessGuard {
        AccessGuard::with_secret("s3cret")
    }

    #[test]
    fn disabled_guard_allows_everything() {
        let guard = AccessGuard::disabled();
        assert!(!guard.is_enabled());
        assert!(guard.verify(&RequestOrigin::default()));
        assert!(guard.verify(&RequestOrigin {
            origin: Some("https://evil.example"),
            host: Some("shop.example"),
            api_key: Some("wrong"),
            ..Default::default()
        }));
    }

    #[test]
    fn same_origin_passes_without_key() {
        let request = RequestOrigin {
            origin: Some("https://shop.example"),
            host: Some("shop.example:443"),
            ..Default::default()
        };
        assert!(guard().verify(&request));
    }

    #[test]
    fn localhost_origin_passes() {
        let request = RequestOrigin {
            origin: Some("http://localhost:3000"),
            host: Some("api.internal:8080"),
            ..Default::default()
        };
        assert!(guard().verify(&request));
    }

    #[test]
    fn referer_is_checked_after_origin() {
        let request = RequestOrigin {
            origin: Some("https://evil.example"),
            referer: Some("https://shop.example/products/new"),
            host: Some("shop.example"),
            ..Default::default()
        };
        assert!(guard().verify(&request));
    }

    #[test]
    fn origin_ignored_without_host_header() {
        let request = RequestOrigin {
            origin: Some("http://localhost"),
            ..Default::default()
        };
        assert!(!guard().verify(&request));
    }

    #[test]
    fn unparsable_origin_is_not_a_match() {
        let request = RequestOrigin {
            origin: Some("not a url"),
            referer: Some("::::"),
            host: Some("shop.example"),
            ..Default::default()
        };
        assert!(!guard().verify(&request));
    }

    #[test]
    fn foreign_origin_needs_exact_key() {
        let base = RequestOrigin {
            origin: Some("https://evil.example"),
            host: Some("shop.example"),
            ..Default::default()
        };
        assert!(!guard().verify(&base));
        assert!(!guard().verify(&RequestOrigin {
            api_key: Some("s3cret "),
            ..base
        }));
        assert!(!guard().verify(&RequestOrigin {
            api_key: Some("S3CRET"),
            ..base
        }));
        assert!(guard().verify(&RequestOrigin {
            api_key: Some("s3cret"),
            ..base
        }));
    }
}
