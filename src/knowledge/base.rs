use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use super::types::{Course, Faq, Policy, PolicyKind};

/// Catalog compiled into the binary
const EMBEDDED_DEFINITION: &str = include_str!("../../data/knowledge_base.toml");

#[derive(Error, Debug)]
pub enum KnowledgeError {
    #[error("Failed to read knowledge base {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed knowledge base definition: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid knowledge base: {0}")]
    Invalid(String),
}

/// One entry per policy category, so a loaded base can never miss one
#[derive(Debug, Clone, Deserialize)]
struct Policies {
    payment: Policy,
    schedule: Policy,
    support: Policy,
    certification: Policy,
    technical: Policy,
}

#[derive(Debug, Deserialize)]
struct Definition {
    courses: Vec<Course>,
    policies: Policies,
    #[serde(default)]
    faqs: Vec<Faq>,
}

/// Read-only catalog of courses, policies and FAQs.
///
/// Built once at startup and shared behind an `Arc`; nothing mutates it
/// afterwards. Lookups are linear scans, the catalog is small.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    courses: Vec<Course>,
    policies: Policies,
    faqs: Vec<Faq>,
}

impl KnowledgeBase {
    /// Load the catalog compiled into the binary
    pub fn embedded() -> Result<Self, KnowledgeError> {
        Self::from_toml_str(EMBEDDED_DEFINITION)
    }

    /// Load from an external TOML file using the embedded schema
    pub fn from_file(path: &Path) -> Result<Self, KnowledgeError> {
        let content = std::fs::read_to_string(path).map_err(|source| KnowledgeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// External file if given, embedded catalog otherwise
    pub fn load(path: Option<&Path>) -> Result<Self, KnowledgeError> {
        match path {
            Some(path) => {
                debug!("Loading knowledge base from {}", path.display());
                Self::from_file(path)
            }
            None => Self::embedded(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, KnowledgeError> {
        let definition: Definition = toml::from_str(content)?;
        Self::validate(definition)
    }

    fn validate(definition: Definition) -> Result<Self, KnowledgeError> {
        if definition.courses.is_empty() {
            return Err(KnowledgeError::Invalid("catalog has no courses".to_string()));
        }

        let mut seen = HashSet::new();
        let mut courses = Vec::with_capacity(definition.courses.len());
        for mut course in definition.courses {
            course.id = course.id.trim().to_lowercase();
            if course.id.is_empty() {
                return Err(KnowledgeError::Invalid(format!(
                    "course '{}' has an empty id",
                    course.name
                )));
            }
            if !seen.insert(course.id.clone()) {
                return Err(KnowledgeError::Invalid(format!(
                    "duplicate course id '{}'",
                    course.id
                )));
            }
            if !course.price.is_finite() || course.price < 0.0 {
                return Err(KnowledgeError::Invalid(format!(
                    "course '{}' has an invalid price",
                    course.id
                )));
            }
            if !(0.0..1.0).contains(&course.discount_rate) {
                return Err(KnowledgeError::Invalid(format!(
                    "course '{}' has a discount rate outside [0, 1)",
                    course.id
                )));
            }
            course.aliases = course
                .aliases
                .iter()
                .map(|alias| normalize(alias))
                .filter(|alias| !alias.is_empty())
                .collect();
            course.start_dates.sort();
            courses.push(course);
        }

        debug!(
            courses = courses.len(),
            faqs = definition.faqs.len(),
            "Knowledge base loaded"
        );

        Ok(Self {
            courses,
            policies: definition.policies,
            faqs: definition.faqs,
        })
    }

    /// Exact, case-insensitive id lookup
    pub fn course_by_id(&self, id: &str) -> Option<&Course> {
        let id = id.trim().to_lowercase();
        self.courses.iter().find(|course| course.id == id)
    }

    /// First course whose name contains `fragment`, case-insensitive.
    /// A blank fragment matches no course.
    pub fn course_by_name(&self, fragment: &str) -> Option<&Course> {
        let fragment = fragment.trim().to_lowercase();
        if fragment.is_empty() {
            return None;
        }
        self.courses
            .iter()
            .find(|course| course.name.to_lowercase().contains(&fragment))
    }

    /// Id match first, then name match
    pub fn find_course(&self, query: &str) -> Option<&Course> {
        self.course_by_id(query).or_else(|| self.course_by_name(query))
    }

    /// Course referred to anywhere in free text, by id, alias or full name.
    ///
    /// Only whole words count, so "ai" matches "the AI course" but not
    /// "available". The longest matching phrase wins.
    pub fn course_mentioned_in(&self, text: &str) -> Option<&Course> {
        let padded = format!(" {} ", normalize(text));
        let mut best: Option<(&Course, usize)> = None;

        for course in &self.courses {
            let name = normalize(&course.name);
            let candidates = std::iter::once(course.id.as_str())
                .chain(course.aliases.iter().map(String::as_str))
                .chain(std::iter::once(name.as_str()));

            for phrase in candidates {
                if phrase.is_empty() || !padded.contains(&format!(" {} ", phrase)) {
                    continue;
                }
                if best.map_or(true, |(_, len)| phrase.len() > len) {
                    best = Some((course, phrase.len()));
                }
            }
        }

        best.map(|(course, _)| course)
    }

    pub fn all_courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn policy(&self, kind: PolicyKind) -> &Policy {
        match kind {
            PolicyKind::Payment => &self.policies.payment,
            PolicyKind::Schedule => &self.policies.schedule,
            PolicyKind::Support => &self.policies.support,
            PolicyKind::Certification => &self.policies.certification,
            PolicyKind::Technical => &self.policies.technical,
        }
    }

    pub fn policy_by_key(&self, key: &str) -> Option<&Policy> {
        key.parse::<PolicyKind>().ok().map(|kind| self.policy(kind))
    }

    pub fn all_policies(&self) -> Vec<(PolicyKind, &Policy)> {
        PolicyKind::ALL
            .into_iter()
            .map(|kind| (kind, self.policy(kind)))
            .collect()
    }

    pub fn faqs(&self) -> &[Faq] {
        &self.faqs
    }

    /// FAQs whose question or answer contains `query`, case-insensitive.
    /// A blank query matches no FAQ.
    pub fn search_faqs(&self, query: &str) -> Vec<&Faq> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.faqs.iter().filter(|faq| faq.matches(&needle)).collect()
    }

    /// (course name, start dates) for one course or for the whole catalog,
    /// in catalog order
    pub fn upcoming_start_dates(&self, course: Option<&str>) -> Vec<(String, Vec<NaiveDate>)> {
        match course {
            Some(query) => self
                .find_course(query)
                .map(|course| vec![(course.name.clone(), course.start_dates.clone())])
                .unwrap_or_default(),
            None => self
                .courses
                .iter()
                .map(|course| (course.name.clone(), course.start_dates.clone()))
                .collect(),
        }
    }

    /// First start date on or after `today` for the matching course
    pub fn next_start_date(&self, query: &str, today: NaiveDate) -> Option<NaiveDate> {
        self.find_course(query)?
            .start_dates
            .iter()
            .copied()
            .find(|date| *date >= today)
    }
}

/// Lowercase words separated by single spaces
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
