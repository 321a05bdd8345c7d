use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A course in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Short identifier (e.g., "py101")
    pub id: String,
    /// Full display name
    pub name: String,
    pub duration_weeks: u32,
    /// Price in dollars
    pub price: f64,
    /// Discount applied for full upfront payment (0.10 = 10%)
    #[serde(default)]
    pub discount_rate: f64,
    pub instructor: String,
    pub description: String,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// Curriculum topics, in teaching order
    #[serde(default)]
    pub modules: Vec<String>,
    #[serde(default)]
    pub start_dates: Vec<NaiveDate>,
    /// Extra words or phrases students use for this course
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl Course {
    /// Price after the full-payment discount
    pub fn discounted_price(&self) -> f64 {
        self.price * (1.0 - self.discount_rate)
    }

    /// Whether the course can be taken with no prior experience
    pub fn is_beginner_friendly(&self) -> bool {
        self.prerequisites.is_empty()
    }

    pub fn duration_label(&self) -> String {
        format!("{} weeks", self.duration_weeks)
    }
}

/// Policy categories held by the knowledge base
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    Payment,
    Schedule,
    Support,
    Certification,
    Technical,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 5] = [
        PolicyKind::Payment,
        PolicyKind::Schedule,
        PolicyKind::Support,
        PolicyKind::Certification,
        PolicyKind::Technical,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            PolicyKind::Payment => "payment",
            PolicyKind::Schedule => "schedule",
            PolicyKind::Support => "support",
            PolicyKind::Certification => "certification",
            PolicyKind::Technical => "technical",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        PolicyKind::ALL
            .into_iter()
            .find(|kind| kind.key() == key)
            .ok_or_else(|| format!("unknown policy category: {}", s))
    }
}

/// Descriptive policy text for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub title: String,
    pub description: String,
    /// One line per policy point
    #[serde(default)]
    pub details: Vec<String>,
}

/// A frequently asked question with its answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

impl Faq {
    /// Case-insensitive substring match against question or answer.
    /// `needle` must already be lowercase.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.question.to_lowercase().contains(needle) || self.answer.to_lowercase().contains(needle)
    }
}
