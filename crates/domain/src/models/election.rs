//! Election candidate models.
//!
//! Candidates and their recorded voters are readable; casting and tallying
//! votes is not part of this service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::models::attachment::StoredFile;
use crate::services::listing::{Listable, SortValue};

/// Office a candidate is standing for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    President,
    GeneralSecretary,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::President => "President",
            Position::GeneralSecretary => "GeneralSecretary",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A candidate in the organization election.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ElectionCandidate {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub position: Position,
    #[serde(default)]
    pub image: Option<StoredFile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listable for ElectionCandidate {
    const SORT_FIELDS: &'static [&'static str] = &["name", "symbol"];

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.symbol]
    }

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "name" => Some(SortValue::text(&self.name)),
            "symbol" => Some(SortValue::text(&self.symbol)),
            _ => None,
        }
    }
}

/// A voter recorded under a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Voter {
    pub id: String,
    pub voter_id: String,
    #[serde(default)]
    pub voter_name: String,
    pub voted_at: DateTime<Utc>,
}

/// A candidate together with the voters recorded for them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CandidateWithVoters {
    #[serde(flatten)]
    pub candidate: ElectionCandidate,
    pub voters: Vec<Voter>,
    pub vote_count: usize,
}

impl CandidateWithVoters {
    pub fn new(candidate: ElectionCandidate, voters: Vec<Voter>) -> Self {
        let vote_count = voters.len();
        Self {
            candidate,
            voters,
            vote_count,
        }
    }
}

impl Listable for CandidateWithVoters {
    const SORT_FIELDS: &'static [&'static str] = &["name", "symbol", "vote_count"];

    fn search_fields(&self) -> Vec<&str> {
        self.candidate.search_fields()
    }

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "vote_count" => Some(SortValue::Number(self.vote_count as f64)),
            _ => self.candidate.sort_value(field),
        }
    }
}

/// Request payload for registering a candidate.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateCandidateRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: String,

    #[validate(length(min = 1, max = 50, message = "Symbol must be between 1 and 50 characters"))]
    pub symbol: String,

    pub position: Position,
}

/// Partial update for a candidate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateCandidateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 50, message = "Symbol must be between 1 and 50 characters"))]
    pub symbol: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,

    /// Drops the current photo without uploading a new one.
    #[serde(default, skip_serializing)]
    pub remove_image: bool,
}

/// Query filters for listing candidates.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CandidateFilter {
    pub position: Option<Position>,
    #[serde(default)]
    pub include_voters: bool,
}
