use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// An integer percentage in `[0, 100]`.
///
/// Model replies sometimes carry fractional scores (`72.5`) or quote them
/// (`"80"`), so any JSON number or numeric string is accepted and rounded.
/// Values outside the range are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Percentage(u8);

impl Percentage {
    pub const MAX: u8 = 100;

    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    /// Clamps values above 100 down to 100.
    pub const fn saturating(value: u8) -> Self {
        if value > Self::MAX {
            Self(Self::MAX)
        } else {
            Self(value)
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPercentage {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Percentage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = match RawPercentage::deserialize(deserializer)? {
            RawPercentage::Number(n) => n,
            RawPercentage::Text(s) => s
                .trim()
                .trim_end_matches('%')
                .trim()
                .parse::<f64>()
                .map_err(|_| serde::de::Error::custom(format!("percentage is not a number: {s:?}")))?,
        };
        if !raw.is_finite() || !(0.0..=f64::from(Self::MAX)).contains(&raw.round()) {
            return Err(serde::de::Error::custom(format!(
                "percentage out of range [0, 100]: {raw}"
            )));
        }
        Ok(Self(raw.round() as u8))
    }
}

/// Feedback on a resume produced by the analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub score: Percentage,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub keyword_match: Percentage,
    pub ats_compatibility: Percentage,
    pub skill_recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_trends: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    Skill,
    Course,
    Job,
    Connection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RecommendationType,
    pub title: String,
    pub description: String,
    pub relevance_score: Percentage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_text: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Makes every recommendation id unique within the batch.
///
/// The first occurrence keeps its id; later duplicates get `-2`, `-3`, ...
/// suffixes (skipping any suffix already taken).
pub fn ensure_unique_ids(recommendations: &mut [Recommendation]) {
    let mut seen: HashSet<String> = HashSet::with_capacity(recommendations.len());
    for rec in recommendations.iter_mut() {
        if seen.insert(rec.id.clone()) {
            continue;
        }
        let mut n = 2;
        let mut candidate = format!("{}-{n}", rec.id);
        while seen.contains(&candidate) {
            n += 1;
            candidate = format!("{}-{n}", rec.id);
        }
        seen.insert(candidate.clone());
        rec.id = candidate;
    }
}
