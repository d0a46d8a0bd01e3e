// Core algorithm exports
pub mod capacity;
pub mod matcher;
pub mod reconciler;
pub mod roster;
pub mod run;

pub use capacity::CapacityLedger;
pub use matcher::Matcher;
pub use reconciler::Reconciler;
pub use roster::MentorDirectory;
pub use run::{MatchingRun, RunStage, RunSummary};
