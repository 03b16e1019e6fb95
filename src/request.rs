use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::Method;
use tracing::debug;
use url::{Origin, Url};

use crate::csrf::CredentialProvider;

pub const CSRF_HEADER: &str = "x-csrftoken";
pub const REQUESTED_WITH_HEADER: &str = "x-requested-with";

/// Builds the headers for every outgoing mutation.
///
/// The token is looked up on each call so a rotated cookie is honoured
/// without rebuilding the configurator.
#[derive(Clone)]
pub struct RequestConfigurator {
    origin: Origin,
    credentials: CredentialProvider,
    user_agent: String,
}

impl RequestConfigurator {
    pub fn new(page_url: &Url, credentials: CredentialProvider, user_agent: String) -> Self {
        Self {
            origin: page_url.origin(),
            credentials,
            user_agent,
        }
    }

    pub fn is_same_origin(&self, target: &Url) -> bool {
        target.origin() == self.origin
    }

    pub fn headers(&self, method: &Method, target: &Url) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(USER_AGENT, value);
        }

        if !self.is_same_origin(target) {
            debug!(url = %target, "cross-origin request, csrf header omitted");
            return headers;
        }

        headers.insert(
            HeaderName::from_static(REQUESTED_WITH_HEADER),
            HeaderValue::from_static("XMLHttpRequest"),
        );

        if is_csrf_safe_method(method) {
            return headers;
        }

        match self.credentials.csrf_token() {
            Some(token) => match HeaderValue::from_str(&token) {
                Ok(value) => {
                    headers.insert(HeaderName::from_static(CSRF_HEADER), value);
                }
                Err(_) => debug!("csrf token is not a valid header value, omitted"),
            },
            None => debug!("no csrf cookie present, sending without token"),
        }
        headers
    }
}

/// Methods that never change server state and so never need the token.
pub fn is_csrf_safe_method(method: &Method) -> bool {
    [Method::GET, Method::HEAD, Method::OPTIONS, Method::TRACE].contains(method)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::csrf::StaticCookies;

    fn configurator(cookie: Option<&str>) -> RequestConfigurator {
        let page = Url::parse("https://feed.example/feed/").unwrap();
        let creds = CredentialProvider::new(Arc::new(StaticCookies(cookie.map(str::to_string))));
        RequestConfigurator::new(&page, creds, "feed-actions-test".into())
    }

    #[test]
    fn same_origin_post_carries_token() {
        let cfg = configurator(Some("csrftoken=XYZ"));
        let target = Url::parse("https://feed.example/feed/like/").unwrap();
        let headers = cfg.headers(&Method::POST, &target);
        assert_eq!(headers.get(CSRF_HEADER).unwrap(), "XYZ");
        assert_eq!(headers.get(REQUESTED_WITH_HEADER).unwrap(), "XMLHttpRequest");
    }

    #[test]
    fn cross_origin_post_never_carries_token() {
        let cfg = configurator(Some("csrftoken=XYZ"));
        for raw in [
            "https://other.example/feed/like/",
            "http://feed.example/feed/like/",
            "https://feed.example:8443/feed/like/",
        ] {
            let target = Url::parse(raw).unwrap();
            let headers = cfg.headers(&Method::POST, &target);
            assert!(headers.get(CSRF_HEADER).is_none(), "leaked to {raw}");
            assert!(headers.get(REQUESTED_WITH_HEADER).is_none());
        }
    }

    #[test]
    fn missing_cookie_omits_header_without_error() {
        let cfg = configurator(None);
        let target = Url::parse("https://feed.example/feed/like/").unwrap();
        let headers = cfg.headers(&Method::POST, &target);
        assert!(headers.get(CSRF_HEADER).is_none());
        assert!(headers.get(USER_AGENT).is_some());
    }

    #[test]
    fn safe_methods_skip_token() {
        let cfg = configurator(Some("csrftoken=XYZ"));
        let target = Url::parse("https://feed.example/feed/").unwrap();
        assert!(cfg.headers(&Method::GET, &target).get(CSRF_HEADER).is_none());
        assert!(cfg.headers(&Method::HEAD, &target).get(CSRF_HEADER).is_none());
        assert!(cfg.headers(&Method::DELETE, &target).get(CSRF_HEADER).is_some());
    }
}
