//! Remote lookup client for the enrichment backend.
//!
//! Two operations, both **total** — they never return `Err` and never
//! panic. Every failure is folded into the return value:
//!
//! - [`LookupClient::search_by_code`] — `POST /api/search`, one shot, no
//!   retry. Transport failures and non-2xx statuses become
//!   [`SearchOutcome::TransportFailed`] with a generic connection-error
//!   message.
//! - [`LookupClient::check_enrichment`] — `GET /api/ingredients-status`,
//!   best effort. Any failure collapses to `ready = false`.
//!
//! The [`ProductSource`] trait is the seam the orchestrator and poller
//! depend on, so tests substitute scripted fakes for the real client.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::Config;
use crate::models::{Barcode, BrandHint, IngredientsData, Product};

/// Result of a search-by-code request.
///
/// Not-found is distinct from a transport failure: the former is a valid
/// response from the backend (possibly carrying a partial brand hint),
/// the latter means the backend could not be reached at all.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Found(Product),
    NotFound {
        reason: String,
        brand_hint: Option<BrandHint>,
    },
    TransportFailed {
        message: String,
    },
}

/// Result of a single enrichment status check.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentStatus {
    pub ready: bool,
    pub ingredients: Option<IngredientsData>,
    pub img_url: Option<String>,
}

/// The two network operations the lookup flow depends on.
#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn search_by_code(&self, code: &Barcode) -> SearchOutcome;
    async fn check_enrichment(&self, code: &Barcode) -> EnrichmentStatus;
}

/// Wire shape of the search endpoint response.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    found: bool,
    #[serde(default)]
    result: Option<Product>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    brand: Option<BrandHint>,
}

/// Wire shape of the enrichment status endpoint response.
#[derive(Debug, Deserialize)]
struct IngredientsStatusResponse {
    ready: bool,
    #[serde(default)]
    ingredients: Option<IngredientsData>,
    #[serde(default)]
    img_url: Option<String>,
}

const CONNECTION_ERROR: &str = "could not reach the lookup service";

/// HTTP client for the search and enrichment-status endpoints.
///
/// An explicit, constructed dependency — callers build one and pass it
/// down rather than reaching for a shared global.
pub struct LookupClient {
    http: reqwest::Client,
    base_url: String,
}

impl LookupClient {
    /// No explicit request timeout is set on the search call; the
    /// transport default applies. The only timeout in the lookup flow is
    /// the enrichment-poll ceiling (see [`crate::poll`]).
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ProductSource for LookupClient {
    async fn search_by_code(&self, code: &Barcode) -> SearchOutcome {
        let url = format!("{}/api/search", self.base_url);
        let body = serde_json::json!({ "barcode": code.as_str() });

        let response = match self.http.post(url.as_str()).json(&body).send().await {
            Ok(r) => r,
            Err(_) => {
                return SearchOutcome::TransportFailed {
                    message: CONNECTION_ERROR.to_string(),
                }
            }
        };

        if !response.status().is_success() {
            return SearchOutcome::TransportFailed {
                message: CONNECTION_ERROR.to_string(),
            };
        }

        let decoded: SearchResponse = match response.json().await {
            Ok(d) => d,
            Err(_) => {
                return SearchOutcome::TransportFailed {
                    message: CONNECTION_ERROR.to_string(),
                }
            }
        };

        match (decoded.found, decoded.result) {
            (true, Some(product)) => SearchOutcome::Found(product),
            _ => SearchOutcome::NotFound {
                reason: decoded.error.unwrap_or_else(|| "product not found".to_string()),
                brand_hint: decoded.brand,
            },
        }
    }

    async fn check_enrichment(&self, code: &Barcode) -> EnrichmentStatus {
        let url = format!("{}/api/ingredients-status", self.base_url);

        let response = match self
            .http
            .get(url.as_str())
            .query(&[("barcode", code.as_str())])
            .send()
            .await
        {
            Ok(r) => r,
            Err(_) => return EnrichmentStatus::default(),
        };

        if !response.status().is_success() {
            return EnrichmentStatus::default();
        }

        match response.json::<IngredientsStatusResponse>().await {
            Ok(decoded) => EnrichmentStatus {
                ready: decoded.ready,
                ingredients: decoded.ingredients,
                img_url: decoded.img_url,
            },
            Err(_) => EnrichmentStatus::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_response_decodes_not_found_with_brand_hint() {
        let json = r#"{
            "found": false,
            "error": "not found",
            "brand": {"name_en": "Round Lab", "name_ko": "라운드랩", "logo_url": null}
        }"#;
        let decoded: SearchResponse = serde_json::from_str(json).unwrap();
        assert!(!decoded.found);
        assert_eq!(decoded.brand.unwrap().name_en, "Round Lab");
    }

    #[test]
    fn search_response_decodes_found() {
        let json = r#"{
            "found": true,
            "result": {
                "name_en": "Dokdo Toner",
                "brand": "Round Lab",
                "source": "cosme",
                "ingredients": null
            }
        }"#;
        let decoded: SearchResponse = serde_json::from_str(json).unwrap();
        assert!(decoded.found);
        assert!(decoded.result.unwrap().ingredients.is_none());
    }

    #[test]
    fn status_response_decodes_pending_without_payload() {
        let decoded: IngredientsStatusResponse = serde_json::from_str(r#"{"ready": false}"#).unwrap();
        assert!(!decoded.ready);
        assert!(decoded.ingredients.is_none());
        assert!(decoded.img_url.is_none());
    }
}
