use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// How opponent repeats are counted.
///
/// `SameCourt` (default) only counts players on opposite teams of the same
/// court. `SameRound` additionally counts every cross-court pair in the same
/// round, for groups that want to avoid two players even appearing in the
/// same round repeatedly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OpponentScope {
    #[default]
    SameCourt,
    SameRound,
}

/// Configuration for one schedule build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Party size per court, in court order. Courts are filled in this order;
    /// the last occupied court may shrink when the roster does not divide
    /// evenly.
    pub court_sizes: Vec<u8>,
    pub rounds: u32,
    #[serde(default)]
    pub opponent_scope: OpponentScope,
    /// Optional seed that shuffles the internal seating order before round 1.
    /// Without it the roster order is used and schedules are reproducible.
    #[serde(default)]
    pub shuffle_seed: Option<u64>,
}

impl SessionConfig {
    /// All courts share the same party size.
    pub fn uniform(courts: usize, party_size: u8, rounds: u32) -> Self {
        Self {
            court_sizes: vec![party_size; courts],
            rounds,
            opponent_scope: OpponentScope::default(),
            shuffle_seed: None,
        }
    }

    /// Per-court party sizes.
    pub fn with_court_sizes(court_sizes: Vec<u8>, rounds: u32) -> Self {
        Self {
            court_sizes,
            rounds,
            opponent_scope: OpponentScope::default(),
            shuffle_seed: None,
        }
    }

    /// Total seats available per round.
    pub fn capacity(&self) -> usize {
        self.court_sizes.iter().map(|&s| s as usize).sum()
    }
}

/// One court's assignment within a round, with the team split made explicit.
/// For singles each team holds one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourtAssignment {
    pub court: usize,
    pub team_a: Vec<String>,
    pub team_b: Vec<String>,
}

impl CourtAssignment {
    pub fn players(&self) -> impl Iterator<Item = &String> {
        self.team_a.iter().chain(self.team_b.iter())
    }
}

/// One complete assignment cycle: every court plus the sit-out set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub number: u32,
    pub courts: Vec<CourtAssignment>,
    pub sitting_out: Vec<String>,
}

/// Summary fairness statistics for a finished schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FairnessStats {
    pub max_partner_count: u32,
    pub max_opponent_count: u32,
    /// max(sit-out count) - min(sit-out count) across the roster.
    pub sit_out_spread: u32,
}

/// A single pair tally in serialized ledger state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairCount {
    pub a: String,
    pub b: String,
    pub count: u32,
}

/// Serializable ledger state, keyed by player name.
///
/// Returned with every schedule and accepted back as seed history, so a
/// caller can continue a session later and end up with exactly the state a
/// single longer run would have produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    #[serde(default)]
    pub partner_counts: Vec<PairCount>,
    #[serde(default)]
    pub opponent_counts: Vec<PairCount>,
    #[serde(default)]
    pub sit_out_counts: HashMap<String, u32>,
    /// Round index (0-based, counted from the very first recorded round) of
    /// each player's most recent bye. Needed for the least-recently-sat-out
    /// tie-break to survive continuation.
    #[serde(default)]
    pub last_sat_out: HashMap<String, u32>,
    #[serde(default)]
    pub rounds_recorded: u32,
}

/// A full generated schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub rounds: Vec<Round>,
    pub stats: FairnessStats,
    /// Final ledger state, for caller-side persistence.
    pub ledger: LedgerState,
}
