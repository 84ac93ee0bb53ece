//! Domain models for BPJP.

pub mod attachment;
pub mod board;
pub mod campaign;
pub mod dashboard;
pub mod election;
pub mod event;
pub mod expense;
pub mod listing;
pub mod mission;
pub mod notice;
pub mod payment;
pub mod recommendation;
pub mod settings;
pub mod user;

pub use attachment::{Attached, StoredFile};
pub use board::{Board, BoardMember};
pub use campaign::{Campaign, CampaignStatus};
pub use election::{CandidateWithVoters, ElectionCandidate, Position, Voter};
pub use event::Event;
pub use expense::Expense;
pub use listing::{ListQuery, SortOrder};
pub use mission::MissionContent;
pub use notice::Notice;
pub use payment::{PaymentStatus, PaymentTransaction};
pub use settings::DisplaySettings;
pub use user::{AuthErrorCode, AuthFailure, AuthUser};
