pub mod builder;
pub mod challenge;
pub mod ledger;
pub mod round;
pub mod types;

pub use builder::build_schedule;
pub use challenge::{ChallengeCourt, MatchSnapshot};
pub use types::{
    CourtAssignment, FairnessStats, LedgerState, OpponentScope, PairCount, Round, Schedule,
    SessionConfig,
};
