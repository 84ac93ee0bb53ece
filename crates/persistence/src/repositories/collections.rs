//! Collection names used by the entity services.

pub const CAMPAIGNS: &str = "campaigns";
pub const PAYMENTS: &str = "payments";
pub const EXPENSES: &str = "expenses";
pub const NOTICES: &str = "notices";
pub const EVENTS: &str = "events";
pub const ADVISORY_BOARD: &str = "advisoryBoard";
pub const EXECUTIVE_COMMITTEE: &str = "executiveCommittee";
pub const ELECTION_CANDIDATES: &str = "electionCandidates";
/// Subcollection under each election candidate.
pub const VOTERS: &str = "voters";

/// Collection holding singleton content documents.
pub const CONTENT: &str = "content";
pub const MISSION_DOCUMENT: &str = "mission";
