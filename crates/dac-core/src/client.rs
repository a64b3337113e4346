//! Blocking client for the Kibana Security Detections API.
//!
//! The credential is injected via [`Settings`] at construction and attached
//! as a default header; it is never logged and never serialized. Transport
//! failures (connect, timeout) retry with bounded exponential backoff;
//! non-success HTTP statuses are definitive and never retried.

use crate::config::Settings;
use crate::error::{DacError, Result};
use crate::rule::RemoteRule;
use serde::Deserialize;
use std::time::Duration;

/// Max page size accepted by the find API.
pub const PER_PAGE: usize = 1000;

const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE: Duration = Duration::from_millis(500);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ElasticClient {
    api_url: String,
    http: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct FindResponse {
    #[serde(default)]
    data: Vec<RemoteRule>,
    #[serde(default)]
    total: usize,
}

impl ElasticClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        let mut auth = reqwest::header::HeaderValue::from_str(&format!(
            "ApiKey {}",
            settings.elastic_api_key
        ))
        .map_err(|_| DacError::InvalidApiKey)?;
        auth.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth);
        headers.insert(
            "kbn-xsrf",
            reqwest::header::HeaderValue::from_static("true"),
        );

        let http = reqwest::blocking::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            api_url: settings.api_url(),
            http,
        })
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Fetch the full rule catalog, paging until the cumulative count reaches
    /// the server-reported total.
    pub fn get_all_rules(&self) -> Result<Vec<RemoteRule>> {
        let mut all = Vec::new();
        let mut page = 1usize;
        loop {
            let result = self.find_rules(page)?;
            let fetched = result.data.len();
            let total = result.total;
            all.extend(result.data);
            tracing::debug!(page, fetched = all.len(), total, "fetched rule page");
            if all.len() >= total || fetched == 0 {
                break;
            }
            page += 1;
        }
        Ok(all)
    }

    fn find_rules(&self, page: usize) -> Result<FindResponse> {
        let url = format!("{}/detection_engine/rules/_find", self.api_url);
        let resp = self.send_with_retry(|| {
            self.http
                .get(&url)
                .query(&[("page", page.to_string()), ("per_page", PER_PAGE.to_string())])
        })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DacError::RemoteUnavailable {
                status: status.as_u16(),
                body: resp.text().unwrap_or_default(),
            });
        }
        Ok(resp.json()?)
    }

    /// Fetch a single rule by its stable identifier, as raw JSON.
    pub fn get_rule(&self, rule_id: &str) -> Result<serde_json::Value> {
        let url = format!("{}/detection_engine/rules", self.api_url);
        let resp = self.send_with_retry(|| self.http.get(&url).query(&[("rule_id", rule_id)]))?;
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DacError::RuleNotFound(rule_id.to_string()));
        }
        if !status.is_success() {
            return Err(DacError::RemoteUnavailable {
                status: status.as_u16(),
                body: resp.text().unwrap_or_default(),
            });
        }
        Ok(resp.json()?)
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Enable or disable a batch of rules in one bulk call. `ids` are the
    /// remote system's internal ids, not stable identifiers.
    pub fn bulk_set_enabled(&self, ids: &[String], enabled: bool) -> Result<()> {
        let action = if enabled { "enable" } else { "disable" };
        let url = format!("{}/detection_engine/rules/_bulk_action", self.api_url);
        let body = serde_json::json!({ "action": action, "ids": ids });

        tracing::info!(action, count = ids.len(), "applying bulk action");
        let resp = self.send_with_retry(|| self.http.post(&url).json(&body))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(DacError::RemoteAction {
                action: action.to_string(),
                status: status.as_u16(),
                ids: failed_ids_from_body(&body, ids),
                body,
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    fn send_with_retry(
        &self,
        build: impl Fn() -> reqwest::blocking::RequestBuilder,
    ) -> Result<reqwest::blocking::Response> {
        let mut attempt = 0u32;
        loop {
            match build().send() {
                Ok(resp) => return Ok(resp),
                Err(e) if is_transient(&e) && attempt + 1 < MAX_ATTEMPTS => {
                    let delay = BACKOFF_BASE * 2u32.pow(attempt);
                    tracing::warn!(attempt, error = %e, "transient transport failure, retrying");
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(DacError::RemoteTransport(e.to_string())),
            }
        }
    }
}

fn is_transient(e: &reqwest::Error) -> bool {
    e.is_connect() || e.is_timeout()
}

/// Extract the failing internal ids from a Kibana bulk-action error body
/// (`attributes.errors[].rules[].id`). Falls back to the whole batch when the
/// body carries no per-rule breakdown.
fn failed_ids_from_body(body: &str, sent: &[String]) -> Vec<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return sent.to_vec();
    };
    let failed: Vec<String> = value
        .pointer("/attributes/errors")
        .and_then(|e| e.as_array())
        .map(|errors| {
            errors
                .iter()
                .filter_map(|err| err.get("rules")?.as_array())
                .flatten()
                .filter_map(|rule| rule.get("id")?.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    if failed.is_empty() {
        sent.to_vec()
    } else {
        failed
    }
}
