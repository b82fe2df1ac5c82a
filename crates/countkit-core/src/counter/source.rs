//! Numeric data sources for the counter.

use std::future::Future;

use chrono::Utc;
use reqwest::header::ACCEPT;
use serde_json::Value;
use url::Url;

use crate::error::FetchError;

/// Supplies the counter's confirmed value, one call per poll.
pub trait DataSource {
    /// Fetch the current reading of `property` from `endpoint`.
    fn fetch_value(
        &self,
        endpoint: &str,
        property: &str,
    ) -> impl Future<Output = Result<f64, FetchError>> + Send;
}

/// Query parameter carrying the cache-busting timestamp.
const CACHE_BUST_PARAM: &str = "_";

/// JSON-over-HTTP data source.
///
/// Every request gets a fresh timestamp query parameter so intermediaries
/// never serve a stale count. Relative endpoints are resolved against the
/// optional base URL.
#[derive(Debug, Clone, Default)]
pub struct HttpDataSource {
    client: reqwest::Client,
    base: Option<Url>,
}

impl HttpDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(base: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: Some(base),
        }
    }

    fn request_url(&self, endpoint: &str) -> Result<Url, FetchError> {
        let parsed = match &self.base {
            Some(base) => base.join(endpoint),
            None => Url::parse(endpoint),
        };
        let mut url = parsed.map_err(|e| FetchError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair(CACHE_BUST_PARAM, &Utc::now().timestamp_millis().to_string());
        Ok(url)
    }
}

impl DataSource for HttpDataSource {
    async fn fetch_value(&self, endpoint: &str, property: &str) -> Result<f64, FetchError> {
        let url = self.request_url(endpoint)?;
        let resp = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body: Value = resp.json().await?;
        extract_count(&body, property)
    }
}

/// Pick the count out of a response body.
///
/// Uses `body[property]` when that is present and truthy, otherwise the
/// whole body; either way the value must be a JSON number.
pub fn extract_count(body: &Value, property: &str) -> Result<f64, FetchError> {
    let candidate = body
        .get(property)
        .filter(|v| is_truthy(v))
        .unwrap_or(body);
    candidate.as_f64().ok_or_else(|| FetchError::NotNumeric {
        property: property.to_string(),
        found: summarize(candidate),
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn summarize(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() > 64 {
        let head: String = text.chars().take(64).collect();
        format!("{head}...")
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_named_property() {
        assert_eq!(extract_count(&json!({"total": 4821}), "total").unwrap(), 4821.0);
    }

    #[test]
    fn falls_back_to_whole_body() {
        assert_eq!(extract_count(&json!(77), "total").unwrap(), 77.0);
    }

    #[test]
    fn rejects_non_numeric_values() {
        let err = extract_count(&json!({"total": "4821"}), "total").unwrap_err();
        assert!(matches!(err, FetchError::NotNumeric { .. }));
        let err = extract_count(&json!({"other": 1}), "total").unwrap_err();
        assert!(matches!(err, FetchError::NotNumeric { .. }));
    }

    #[test]
    fn request_url_adds_cache_buster() {
        let source = HttpDataSource::new();
        let url = source.request_url("https://example.com/count.json?site=a").unwrap();
        let params: Vec<_> = url.query_pairs().map(|(k, _)| k.into_owned()).collect();
        assert_eq!(params, vec!["site".to_string(), CACHE_BUST_PARAM.to_string()]);
    }

    #[test]
    fn relative_endpoint_needs_base() {
        assert!(matches!(
            HttpDataSource::new().request_url("/rest/count"),
            Err(FetchError::InvalidEndpoint { .. })
        ));
        let base = Url::parse("https://shop.example.com/").unwrap();
        let url = HttpDataSource::with_base(base).request_url("/rest/count").unwrap();
        assert_eq!(url.path(), "/rest/count");
        assert_eq!(url.host_str(), Some("shop.example.com"));
    }
}
