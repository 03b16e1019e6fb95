use std::sync::Arc;

use percent_encoding::percent_decode_str;
use reqwest::cookie::{CookieStore, Jar};
use url::Url;

pub const CSRF_COOKIE_NAME: &str = "csrftoken";

/// Source of the raw `Cookie` string visible to the page.
pub trait CookieSource: Send + Sync {
    fn cookie_string(&self) -> Option<String>;
}

/// Fixed cookie string, mostly useful for tests and one-shot commands.
#[derive(Debug, Clone, Default)]
pub struct StaticCookies(pub Option<String>);

impl StaticCookies {
    pub fn new<S: Into<String>>(raw: S) -> Self {
        Self(Some(raw.into()))
    }

    pub fn empty() -> Self {
        Self(None)
    }
}

impl CookieSource for StaticCookies {
    fn cookie_string(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Reads the cookies the shared HTTP jar would send to `url`.
///
/// Because the jar is shared with the transport, a token rotated by a
/// response is picked up by the next lookup.
#[derive(Clone)]
pub struct JarCookies {
    jar: Arc<Jar>,
    url: Url,
}

impl JarCookies {
    pub fn new(jar: Arc<Jar>, url: Url) -> Self {
        Self { jar, url }
    }
}

impl CookieSource for JarCookies {
    fn cookie_string(&self) -> Option<String> {
        self.jar
            .cookies(&self.url)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }
}

#[derive(Clone)]
pub struct CredentialProvider {
    source: Arc<dyn CookieSource>,
}

impl CredentialProvider {
    pub fn new(source: Arc<dyn CookieSource>) -> Self {
        Self { source }
    }

    /// Value of the first cookie named exactly `name`, percent-decoded.
    pub fn get_token(&self, name: &str) -> Option<String> {
        let raw = self.source.cookie_string()?;
        cookie_value(&raw, name)
    }

    pub fn csrf_token(&self) -> Option<String> {
        self.get_token(CSRF_COOKIE_NAME)
    }
}

pub fn cookie_value(raw: &str, name: &str) -> Option<String> {
    if raw.is_empty() || name.is_empty() {
        return None;
    }
    let prefix = format!("{name}=");
    raw.split(';')
        .map(str::trim)
        .find_map(|segment| segment.strip_prefix(prefix.as_str()))
        .map(decode_component)
}

// Falls back to the raw text when the decoded bytes are not UTF-8.
fn decode_component(value: &str) -> String {
    match percent_decode_str(value).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(raw: Option<&str>) -> CredentialProvider {
        CredentialProvider::new(Arc::new(StaticCookies(raw.map(str::to_string))))
    }

    #[test]
    fn empty_store_has_no_token() {
        assert_eq!(provider(None).get_token("csrftoken"), None);
        assert_eq!(provider(Some("")).get_token("csrftoken"), None);
    }

    #[test]
    fn finds_token_between_other_cookies() {
        let creds = provider(Some("a=1; csrftoken=XYZ; b=2"));
        assert_eq!(creds.get_token("csrftoken").as_deref(), Some("XYZ"));
        assert_eq!(creds.csrf_token().as_deref(), Some("XYZ"));
    }

    #[test]
    fn key_must_match_exactly() {
        let creds = provider(Some("csrftoken_old=nope;xcsrftoken=nope"));
        assert_eq!(creds.get_token("csrftoken"), None);
    }

    #[test]
    fn first_match_wins_and_whitespace_is_trimmed() {
        let creds = provider(Some("  csrftoken=first ;csrftoken=second"));
        assert_eq!(creds.get_token("csrftoken").as_deref(), Some("first"));
    }

    #[test]
    fn values_are_percent_decoded() {
        let creds = provider(Some("csrftoken=a%20b%3Dc"));
        assert_eq!(creds.get_token("csrftoken").as_deref(), Some("a b=c"));
    }

    #[test]
    fn undecodable_value_is_returned_raw() {
        assert_eq!(cookie_value("t=%FF", "t").as_deref(), Some("%FF"));
    }

    #[test]
    fn reads_from_shared_jar() {
        let url = Url::parse("http://feed.test/").unwrap();
        let jar = Arc::new(Jar::default());
        jar.add_cookie_str("csrftoken=fromjar; Path=/", &url);
        let creds = CredentialProvider::new(Arc::new(JarCookies::new(jar.clone(), url.clone())));
        assert_eq!(creds.csrf_token().as_deref(), Some("fromjar"));

        jar.add_cookie_str("csrftoken=rotated; Path=/", &url);
        assert_eq!(creds.csrf_token().as_deref(), Some("rotated"));
    }
}
