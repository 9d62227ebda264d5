//! `Translator` trait and the `TranslateClient` implementation.
//!
//! `TranslateClient` talks to the web-widget translate endpoint:
//!
//! 1. **Bootstrap** — GET the element script, pull the secondary script URL
//!    out of `_loadJs('…')`, GET that, and pull the API key out of
//!    `"X-goog-api-key": "…"`.  The key is cached for the process lifetime.
//! 2. **Translate** — POST `[[segments, sl, tl], "wt_lib"]` with the key in
//!    `X-Goog-Api-Key`; the reply's first element lists the translated
//!    segments in input order.
//!
//! Segments already present in the [`TranslationCache`] are never sent.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::config::TranslateConfig;
use crate::translate::cache::TranslationCache;
use crate::translate::formatting::{decode_segment, encode_segment, escape_placeholders};

static LOAD_JS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_loadJs\('([^']*)'\)").expect("valid regex"));
static API_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""X-goog-api-key"\s*:\s*"([^"]+)""#).expect("valid regex"));
static HEX_ESCAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\x([0-9A-Fa-f]{2})").expect("valid regex"));

// ---------------------------------------------------------------------------
// TranslateError
// ---------------------------------------------------------------------------

/// Errors that can occur while fetching the API key or translating.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// The bootstrap or key script could not be downloaded.
    #[error("could not fetch API key: {0}")]
    TokenFetch(String),

    /// The bootstrap script did not reference a key script.
    #[error("bootstrap script has no _loadJs reference")]
    MissingScriptUrl,

    /// The key script did not contain an API key.
    #[error("key script has no X-goog-api-key entry")]
    MissingApiKey,

    /// The service rejected the API key (HTTP 401/403).
    #[error("API key was rejected")]
    Unauthorized,

    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("translation request timed out")]
    Timeout,

    /// Non-success HTTP status from the translate endpoint.
    #[error("translate service returned HTTP {0}")]
    Status(u16),

    /// The response body did not have the expected shape.
    #[error("failed to parse translate response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for TranslateError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TranslateError::Timeout
        } else {
            TranslateError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Translator trait
// ---------------------------------------------------------------------------

/// Async interface for translating newline-separated text.
///
/// Returns `Ok(None)` when there was nothing to translate.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<Option<String>, TranslateError>;
}

// ---------------------------------------------------------------------------
// TranslateClient
// ---------------------------------------------------------------------------

pub struct TranslateClient {
    http: reqwest::Client,
    config: TranslateConfig,
    cache: TranslationCache,
    /// Held across the bootstrap so concurrent callers wait for one fetch.
    token: tokio::sync::Mutex<Option<String>>,
}

impl TranslateClient {
    /// Build a client from config.  Falls back to a default HTTP client if
    /// the builder fails.
    pub fn from_config(config: &TranslateConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            config: config.clone(),
            cache: TranslationCache::new(),
            token: tokio::sync::Mutex::new(None),
        }
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    // -----------------------------------------------------------------------
    // Token bootstrap
    // -----------------------------------------------------------------------

    /// Return the cached API key, fetching it first if necessary.
    pub async fn ensure_token(&self) -> Result<String, TranslateError> {
        let mut slot = self.token.lock().await;
        if let Some(token) = slot.as_ref() {
            return Ok(token.clone());
        }

        let token = self.fetch_token().await?;
        log::info!("translate: API key acquired");
        *slot = Some(token.clone());
        Ok(token)
    }

    /// Forget `stale` unless another caller already replaced it.
    async fn invalidate_token(&self, stale: &str) {
        let mut slot = self.token.lock().await;
        if slot.as_deref() == Some(stale) {
            *slot = None;
        }
    }

    async fn fetch_token(&self) -> Result<String, TranslateError> {
        let bootstrap = self.get_script(&self.config.bootstrap_url).await?;
        let script_url = extract_script_url(&bootstrap).ok_or(TranslateError::MissingScriptUrl)?;
        log::debug!("translate: key script at {script_url}");

        let script = self.get_script(&script_url).await?;
        extract_api_key(&script).ok_or(TranslateError::MissingApiKey)
    }

    async fn get_script(&self, url: &str) -> Result<String, TranslateError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| TranslateError::TokenFetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslateError::TokenFetch(format!("HTTP {status} from {url}")));
        }

        response
            .text()
            .await
            .map_err(|e| TranslateError::TokenFetch(e.to_string()))
    }

    // -----------------------------------------------------------------------
    // Translation
    // -----------------------------------------------------------------------

    /// Translate `text` line by line, serving cached lines locally and
    /// sending the rest in a single batch.
    pub async fn translate_batch(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<Option<String>, TranslateError> {
        let escaped = escape_placeholders(text);
        let segments: Vec<String> = escaped.split('\n').map(encode_segment).collect();
        let cached = self.cache.get_many(target, &segments);

        let pending: Vec<&str> = segments
            .iter()
            .zip(&cached)
            .filter(|(_, hit)| hit.is_none())
            .map(|(segment, _)| segment.as_str())
            .collect();

        log::debug!(
            "translate: {} segment(s), {} cached, {} to fetch ({source} → {target})",
            segments.len(),
            segments.len() - pending.len(),
            pending.len()
        );

        let mut fetched = Vec::new();
        if !pending.is_empty() {
            fetched = self.request_with_retry(&pending, source, target).await?;

            if fetched.is_empty() && self.cache.len(target) == 0 {
                return Ok(None);
            }
            if fetched.len() != pending.len() {
                return Err(TranslateError::Parse(format!(
                    "expected {} segments, got {}",
                    pending.len(),
                    fetched.len()
                )));
            }
            for (segment, translation) in pending.iter().zip(&fetched) {
                self.cache
                    .insert(target, (*segment).to_string(), translation.clone());
            }
        }

        let mut fresh = fetched.into_iter();
        let lines: Vec<String> = cached
            .into_iter()
            .map(|hit| hit.or_else(|| fresh.next()).unwrap_or_default())
            .collect();

        Ok(Some(lines.join("\n")))
    }

    /// POST the batch; on a rejected key refresh it and retry once.
    async fn request_with_retry(
        &self,
        batch: &[&str],
        source: &str,
        target: &str,
    ) -> Result<Vec<String>, TranslateError> {
        let token = self.ensure_token().await?;

        match self.post_batch(&token, batch, source, target).await {
            Err(TranslateError::Unauthorized) => {
                log::warn!("translate: API key rejected, refreshing and retrying once");
                self.invalidate_token(&token).await;
                let token = self.ensure_token().await?;
                self.post_batch(&token, batch, source, target).await
            }
            other => other,
        }
    }

    async fn post_batch(
        &self,
        token: &str,
        batch: &[&str],
        source: &str,
        target: &str,
    ) -> Result<Vec<String>, TranslateError> {
        let body = serde_json::json!([[batch, source, target], self.config.client_tag]);

        let response = self
            .http
            .post(&self.config.translate_url)
            .header("X-Goog-Api-Key", token)
            .header(reqwest::header::CONTENT_TYPE, "application/json+protobuf")
            .body(body.to_string())
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(TranslateError::Unauthorized);
        }
        if !status.is_success() {
            return Err(TranslateError::Status(status.as_u16()));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TranslateError::Parse(e.to_string()))?;

        parse_segments(&json)
    }
}

#[async_trait]
impl Translator for TranslateClient {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<Option<String>, TranslateError> {
        self.translate_batch(text, source, target).await
    }
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Pull the key-script URL out of the bootstrap script, undoing `\xNN` and
/// `\/` escapes.
pub fn extract_script_url(bootstrap: &str) -> Option<String> {
    let raw = LOAD_JS_RE.captures(bootstrap)?.get(1)?.as_str();
    Some(decode_js_escapes(raw))
}

/// Pull the API key out of the key script.
pub fn extract_api_key(script: &str) -> Option<String> {
    API_KEY_RE
        .captures(script)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn decode_js_escapes(input: &str) -> String {
    HEX_ESCAPE_RE
        .replace_all(input, |caps: &regex::Captures<'_>| {
            u8::from_str_radix(&caps[1], 16)
                .map(|b| char::from(b).to_string())
                .unwrap_or_else(|_| caps[0].to_string())
        })
        .replace("\\/", "/")
}

fn parse_segments(json: &serde_json::Value) -> Result<Vec<String>, TranslateError> {
    let items = json
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or_else(|| TranslateError::Parse("missing segment array".into()))?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(decode_segment)
                .ok_or_else(|| TranslateError::Parse(format!("non-string segment: {item}")))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;

    fn client_for(server: &ServerGuard) -> TranslateClient {
        let config = TranslateConfig {
            bootstrap_url: format!("{}/element.js", server.url()),
            translate_url: format!("{}/translateHtml", server.url()),
            timeout_secs: 5,
            ..TranslateConfig::default()
        };
        TranslateClient::from_config(&config)
    }

    /// Bootstrap body referencing `<server>/key.js`, escaped the way the
    /// real script escapes it.
    fn bootstrap_body(server: &ServerGuard) -> String {
        let url = format!("{}/key.js", server.url())
            .replace(':', "\\x3a")
            .replace('/', "\\/");
        format!("(function(){{c._loadJs('{url}');gtElInit();}})();")
    }

    async fn mock_bootstrap(server: &mut ServerGuard, key: &str) -> (mockito::Mock, mockito::Mock) {
        let body = bootstrap_body(server);
        let element = server
            .mock("GET", "/element.js")
            .with_status(200)
            .with_body(body)
            .expect(1)
            .create_async()
            .await;
        let script = server
            .mock("GET", "/key.js")
            .with_status(200)
            .with_body(format!(r#"var h={{"X-goog-api-key": "{key}"}};"#))
            .expect(1)
            .create_async()
            .await;
        (element, script)
    }

    #[test]
    fn script_url_is_unescaped() {
        let body = r"x._loadJs('https\x3a\/\/translate.googleapis.com\/element\x2Fmain.js');";
        assert_eq!(
            extract_script_url(body).as_deref(),
            Some("https://translate.googleapis.com/element/main.js")
        );
        assert!(extract_script_url("no loader here").is_none());
    }

    #[test]
    fn api_key_is_extracted() {
        let script = r#"a={"Content-Type":"x","X-goog-api-key" : "AIza123"}"#;
        assert_eq!(extract_api_key(script).as_deref(), Some("AIza123"));
        assert!(extract_api_key("{}").is_none());
    }

    #[test]
    fn parse_segments_decodes_each_entry() {
        let json = json!([["<sp>Tom &amp; Jerry", "b"], ["en"]]);
        assert_eq!(
            parse_segments(&json).unwrap(),
            vec![" Tom & Jerry".to_string(), "b".to_string()]
        );
        assert!(parse_segments(&json!({"error": 1})).is_err());
        assert!(parse_segments(&json!([[1, 2]])).is_err());
    }

    #[tokio::test]
    async fn token_is_fetched_once_and_cached() {
        let mut server = Server::new_async().await;
        let (element, script) = mock_bootstrap(&mut server, "k1").await;
        let client = client_for(&server);

        assert_eq!(client.ensure_token().await.unwrap(), "k1");
        assert_eq!(client.ensure_token().await.unwrap(), "k1");

        element.assert_async().await;
        script.assert_async().await;
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_bootstrap() {
        let mut server = Server::new_async().await;
        let (element, script) = mock_bootstrap(&mut server, "k2").await;
        let client = client_for(&server);

        let (a, b, c) = tokio::join!(
            client.ensure_token(),
            client.ensure_token(),
            client.ensure_token()
        );

        assert_eq!(a.unwrap(), "k2");
        assert_eq!(b.unwrap(), "k2");
        assert_eq!(c.unwrap(), "k2");
        element.assert_async().await;
        script.assert_async().await;
    }

    #[tokio::test]
    async fn bootstrap_without_loader_fails() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/element.js")
            .with_status(200)
            .with_body("nothing useful")
            .create_async()
            .await;
        let client = client_for(&server);

        assert!(matches!(
            client.ensure_token().await,
            Err(TranslateError::MissingScriptUrl)
        ));
    }

    #[tokio::test]
    async fn key_script_without_key_fails() {
        let mut server = Server::new_async().await;
        let body = bootstrap_body(&server);
        let _mock = server
            .mock("GET", "/element.js")
            .with_body(body)
            .create_async()
            .await;
        let _mock = server
            .mock("GET", "/key.js")
            .with_body("var nothing = 1;")
            .create_async()
            .await;
        let client = client_for(&server);

        assert!(matches!(
            client.ensure_token().await,
            Err(TranslateError::MissingApiKey)
        ));
    }

    #[tokio::test]
    async fn repeated_translation_is_served_from_cache() {
        let mut server = Server::new_async().await;
        let _bootstrap = mock_bootstrap(&mut server, "k1").await;
        let translate = server
            .mock("POST", "/translateHtml")
            .match_header("x-goog-api-key", "k1")
            .match_body(Matcher::Json(json!([[["Hello", "World"], "auto", "bn"], "wt_lib"])))
            .with_status(200)
            .with_body(r#"[["হ্যালো","বিশ্ব"],["en","en"]]"#)
            .expect(1)
            .create_async()
            .await;
        let client = client_for(&server);

        let first = client.translate_batch("Hello\nWorld", "auto", "bn").await.unwrap();
        let second = client.translate_batch("Hello\nWorld", "auto", "bn").await.unwrap();

        assert_eq!(first.as_deref(), Some("হ্যালো\nবিশ্ব"));
        assert_eq!(second, first);
        assert_eq!(client.cache().len("bn"), 2);
        translate.assert_async().await;
    }

    #[tokio::test]
    async fn only_uncached_lines_are_sent() {
        let mut server = Server::new_async().await;
        let _bootstrap = mock_bootstrap(&mut server, "k1").await;
        let first = server
            .mock("POST", "/translateHtml")
            .match_body(Matcher::Json(json!([[["one"], "en", "fr"], "wt_lib"])))
            .with_body(r#"[["un"]]"#)
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("POST", "/translateHtml")
            .match_body(Matcher::Json(json!([[["two"], "en", "fr"], "wt_lib"])))
            .with_body(r#"[["deux"]]"#)
            .expect(1)
            .create_async()
            .await;
        let client = client_for(&server);

        client.translate_batch("one", "en", "fr").await.unwrap();
        let out = client.translate_batch("two\none", "en", "fr").await.unwrap();

        assert_eq!(out.as_deref(), Some("deux\nun"));
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn leading_whitespace_survives_the_round_trip() {
        let mut server = Server::new_async().await;
        let _bootstrap = mock_bootstrap(&mut server, "k1").await;
        let _mock = server
            .mock("POST", "/translateHtml")
            .match_body(Matcher::Json(json!([[["<sp><sp>x = 1<tr>"], "en", "de"], "wt_lib"])))
            .with_body(r#"[["<sp><sp>x = 1<tr>"]]"#)
            .create_async()
            .await;
        let client = client_for(&server);

        let out = client.translate_batch("  x = 1\t", "en", "de").await.unwrap();
        assert_eq!(out.as_deref(), Some("  x = 1\t"));
    }

    #[tokio::test]
    async fn rejected_key_is_refreshed_and_retried_once() {
        let mut server = Server::new_async().await;
        let (element, script) = mock_bootstrap(&mut server, "fresh").await;
        let rejected = server
            .mock("POST", "/translateHtml")
            .match_header("x-goog-api-key", "stale")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;
        let accepted = server
            .mock("POST", "/translateHtml")
            .match_header("x-goog-api-key", "fresh")
            .with_body(r#"[["Hallo"]]"#)
            .expect(2)
            .create_async()
            .await;
        let client = client_for(&server);
        *client.token.lock().await = Some("stale".into());

        let out = client.translate_batch("Hello", "en", "de").await.unwrap();
        assert_eq!(out.as_deref(), Some("Hallo"));

        // Fresh key stays cached: a new line needs no further bootstrap.
        client.translate_batch("Bye", "en", "de").await.unwrap();

        rejected.assert_async().await;
        accepted.assert_async().await;
        element.assert_async().await;
        script.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_surfaces_as_status() {
        let mut server = Server::new_async().await;
        let _bootstrap = mock_bootstrap(&mut server, "k1").await;
        let _mock = server
            .mock("POST", "/translateHtml")
            .with_status(500)
            .create_async()
            .await;
        let client = client_for(&server);

        let err = client.translate_batch("Hello", "en", "de").await.unwrap_err();
        assert!(matches!(err, TranslateError::Status(500)));
        assert_eq!(client.cache().len("de"), 0);
    }

    #[tokio::test]
    async fn empty_reply_with_empty_cache_means_nothing_to_translate() {
        let mut server = Server::new_async().await;
        let _bootstrap = mock_bootstrap(&mut server, "k1").await;
        let _mock = server
            .mock("POST", "/translateHtml")
            .with_body("[[]]")
            .create_async()
            .await;
        let client = client_for(&server);

        assert!(client.translate_batch("Hello", "en", "de").await.unwrap().is_none());
    }

    #[test]
    fn client_is_object_safe() {
        let client: Box<dyn Translator> =
            Box::new(TranslateClient::from_config(&TranslateConfig::default()));
        drop(client);
    }
}
