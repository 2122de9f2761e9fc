//! Core data models used throughout Scan Harness.
//!
//! These types mirror the backend's wire shapes one-to-one (field names
//! included), so the serde derives map directly onto the JSON responses
//! of the search and enrichment-status endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated EAN-13 barcode: exactly 13 ASCII digits.
///
/// Construction goes through [`FromStr`]; nothing downstream ever sees an
/// unvalidated code. No checksum validation is performed beyond length and
/// digit-class checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Barcode(String);

impl Barcode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Barcode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 13 {
            anyhow::bail!(
                "barcode must be exactly 13 digits, got {} characters",
                s.len()
            );
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            anyhow::bail!("barcode must contain only digits: '{}'", s);
        }
        Ok(Barcode(s.to_string()))
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single listed ingredient.
///
/// `position` is the rank in the listed composition — informational only,
/// and not unique across the parts of a set product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub position: i64,
    pub name_en: String,
    #[serde(default)]
    pub name_ru: Option<String>,
    /// Free-text risk score, `"N"` or `"N-M"`.
    #[serde(default)]
    pub risk_score: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One item of a multi-item product set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPart {
    #[serde(default)]
    pub name_en: Option<String>,
    #[serde(default)]
    pub name_ru: Option<String>,
    pub ingredients: Vec<Ingredient>,
}

/// Ingredient payload of a product, either a flat list or a set of parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IngredientsData {
    Regular {
        count: i64,
        ingredients: Vec<Ingredient>,
    },
    Set {
        count: i64,
        parts: Vec<SetPart>,
    },
}

impl IngredientsData {
    /// All ingredients in listing order, set parts flattened in part order.
    pub fn all_ingredients(&self) -> Vec<&Ingredient> {
        match self {
            IngredientsData::Regular { ingredients, .. } => ingredients.iter().collect(),
            IngredientsData::Set { parts, .. } => {
                parts.iter().flat_map(|p| p.ingredients.iter()).collect()
            }
        }
    }
}

/// A category path the product is registered under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    #[serde(default)]
    pub name_ru: Option<String>,
    pub path: String,
}

/// Parent-brand identity, when the brand belongs to a larger group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentBrand {
    pub name_en: String,
    #[serde(default)]
    pub name_ko: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Partial brand identity the backend can resolve even without a product
/// match; used to soften a not-found result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandHint {
    pub name_en: String,
    #[serde(default)]
    pub name_ko: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// A product as returned by the search endpoint.
///
/// `ingredients: None` is the "thin" state — identity is known but the
/// ingredient payload has not been produced yet. Enrichment fills it in
/// later; it is never retracted back to `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub product_id: Option<i64>,
    pub name_en: String,
    #[serde(default)]
    pub name_ru: Option<String>,
    #[serde(default)]
    pub name_ko: Option<String>,
    pub brand: String,
    #[serde(default)]
    pub brand_ko: Option<String>,
    #[serde(default)]
    pub brand_logo: Option<String>,
    #[serde(default)]
    pub parent_brand: Option<ParentBrand>,
    #[serde(default)]
    pub img_url: Option<String>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub ingredients: Option<IngredientsData>,
}

impl Product {
    /// Display title: localized name when present, English otherwise.
    pub fn display_name(&self) -> &str {
        self.name_ru.as_deref().unwrap_or(&self.name_en)
    }
}

/// One past lookup, as persisted in the local history blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub barcode: Barcode,
    pub product: Product,
    pub scanned_at: DateTime<Utc>,
}
