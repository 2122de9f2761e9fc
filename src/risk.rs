//! Derived risk classification for ingredients.
//!
//! Risk is never stored — it is computed from the free-text `risk_score`
//! field by taking the maximum integer found in the text, then bucketed:
//!
//! | Max score | Level |
//! |-----------|-------|
//! | ≤ 2 | [`RiskLevel::Safe`] |
//! | 3–6 | [`RiskLevel::Medium`] |
//! | ≥ 7 | [`RiskLevel::High`] |
//! | no parseable score | [`RiskLevel::Unknown`] |

use std::fmt;

use crate::models::{Ingredient, IngredientsData};

/// Effective risk bucket of an ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Safe,
    Medium,
    High,
    Unknown,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Maximum integer found anywhere in a risk-score text (`"3"` → 3,
/// `"4-6"` → 6). `None` when the text contains no digits.
pub fn max_risk(score: &str) -> Option<u32> {
    let mut best: Option<u32> = None;
    let mut current: Option<u32> = None;

    for b in score.bytes() {
        if b.is_ascii_digit() {
            let digit = (b - b'0') as u32;
            current = Some(current.map_or(digit, |n| n.saturating_mul(10).saturating_add(digit)));
        } else if let Some(n) = current.take() {
            best = Some(best.map_or(n, |b| b.max(n)));
        }
    }
    if let Some(n) = current {
        best = Some(best.map_or(n, |b| b.max(n)));
    }
    best
}

/// Classify an ingredient by its optional risk-score text.
pub fn classify(risk_score: Option<&str>) -> RiskLevel {
    match risk_score.and_then(max_risk) {
        None => RiskLevel::Unknown,
        Some(n) if n <= 2 => RiskLevel::Safe,
        Some(n) if n <= 6 => RiskLevel::Medium,
        Some(_) => RiskLevel::High,
    }
}

/// Aggregated risk counts over a product's ingredient payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiskSummary {
    pub safe: usize,
    pub medium: usize,
    pub high: usize,
    pub unknown: usize,
    pub total: usize,
}

impl RiskSummary {
    /// Summarize all ingredients, flattening set parts in order.
    pub fn of(data: &IngredientsData) -> Self {
        let mut summary = RiskSummary::default();
        for ing in data.all_ingredients() {
            summary.add(ing);
        }
        summary
    }

    fn add(&mut self, ingredient: &Ingredient) {
        match classify(ingredient.risk_score.as_deref()) {
            RiskLevel::Safe => self.safe += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::High => self.high += 1,
            RiskLevel::Unknown => self.unknown += 1,
        }
        self.total += 1;
    }

    /// Count of ingredients at medium risk or above.
    pub fn flagged(&self) -> usize {
        self.medium + self.high
    }
}
