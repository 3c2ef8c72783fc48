use std::collections::HashMap;

use crate::error::RotationError;
use crate::rotation::round::RoundPlan;
use crate::rotation::types::{LedgerState, OpponentScope, PairCount};

/// Role a pair of players takes relative to each other within a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairRole {
    Partner,
    Opponent,
}

/// Cumulative record of partner/opponent pairings and byes.
///
/// Works on roster indices; conversion to and from the name-keyed
/// `LedgerState` happens at the edges. Counts only ever grow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingLedger {
    len: usize,
    scope: OpponentScope,
    partner: HashMap<(usize, usize), u32>,
    opponent: HashMap<(usize, usize), u32>,
    sit_outs: Vec<u32>,
    last_sat_out: Vec<Option<u32>>,
    rounds_recorded: u32,
}

fn pair_key(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

impl PairingLedger {
    pub fn new(len: usize, scope: OpponentScope) -> Self {
        Self {
            len,
            scope,
            partner: HashMap::new(),
            opponent: HashMap::new(),
            sit_outs: vec![0; len],
            last_sat_out: vec![None; len],
            rounds_recorded: 0,
        }
    }

    /// Rebuild a ledger from caller-supplied history. Every name in the state
    /// must exist in the roster.
    pub fn seeded(
        roster: &[String],
        scope: OpponentScope,
        state: &LedgerState,
    ) -> Result<Self, RotationError> {
        let index: HashMap<&str, usize> = roster
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();
        let lookup = |name: &str| -> Result<usize, RotationError> {
            index.get(name).copied().ok_or_else(|| {
                RotationError::Config(format!("history references unknown player '{}'", name))
            })
        };

        let mut ledger = Self::new(roster.len(), scope);
        for pc in &state.partner_counts {
            let key = pair_key(lookup(&pc.a)?, lookup(&pc.b)?);
            if key.0 == key.1 {
                return Err(RotationError::Config(format!(
                    "history pairs '{}' with themselves",
                    pc.a
                )));
            }
            *ledger.partner.entry(key).or_insert(0) += pc.count;
        }
        for pc in &state.opponent_counts {
            let key = pair_key(lookup(&pc.a)?, lookup(&pc.b)?);
            if key.0 == key.1 {
                return Err(RotationError::Config(format!(
                    "history pairs '{}' with themselves",
                    pc.a
                )));
            }
            *ledger.opponent.entry(key).or_insert(0) += pc.count;
        }
        for (name, count) in &state.sit_out_counts {
            ledger.sit_outs[lookup(name)?] = *count;
        }
        for (name, round) in &state.last_sat_out {
            ledger.last_sat_out[lookup(name)?] = Some(*round);
        }
        ledger.rounds_recorded = state.rounds_recorded;
        Ok(ledger)
    }

    pub fn scope(&self) -> OpponentScope {
        self.scope
    }

    pub fn rounds_recorded(&self) -> u32 {
        self.rounds_recorded
    }

    /// Current count for the pair under the given role. Pure lookup.
    pub fn pair_cost(&self, a: usize, b: usize, role: PairRole) -> u32 {
        let map = match role {
            PairRole::Partner => &self.partner,
            PairRole::Opponent => &self.opponent,
        };
        map.get(&pair_key(a, b)).copied().unwrap_or(0)
    }

    /// Total number of times the pair has shared a court in any role. Used
    /// by greedy construction, which picks court members before teams exist.
    pub fn seen_count(&self, a: usize, b: usize) -> u32 {
        self.pair_cost(a, b, PairRole::Partner) + self.pair_cost(a, b, PairRole::Opponent)
    }

    pub fn sit_out_count(&self, player: usize) -> u32 {
        self.sit_outs[player]
    }

    pub fn last_sat_out(&self, player: usize) -> Option<u32> {
        self.last_sat_out[player]
    }

    /// Apply one finished round: partner counts for same-team pairs, opponent
    /// counts for cross-team pairs on the same court (plus cross-court pairs
    /// under `SameRound` scope), and bye bookkeeping for the sit-out set.
    pub fn record_round(&mut self, plan: &RoundPlan) {
        for court in &plan.courts {
            for team in [&court.team_a, &court.team_b] {
                for i in 0..team.len() {
                    for j in i + 1..team.len() {
                        *self.partner.entry(pair_key(team[i], team[j])).or_insert(0) += 1;
                    }
                }
            }
            for &a in &court.team_a {
                for &b in &court.team_b {
                    *self.opponent.entry(pair_key(a, b)).or_insert(0) += 1;
                }
            }
        }
        if self.scope == OpponentScope::SameRound {
            for i in 0..plan.courts.len() {
                for j in i + 1..plan.courts.len() {
                    for a in plan.courts[i].players() {
                        for b in plan.courts[j].players() {
                            *self.opponent.entry(pair_key(a, b)).or_insert(0) += 1;
                        }
                    }
                }
            }
        }
        for &p in &plan.sitting_out {
            self.sit_outs[p] += 1;
            self.last_sat_out[p] = Some(self.rounds_recorded);
        }
        self.rounds_recorded += 1;
    }

    pub fn max_partner_count(&self) -> u32 {
        self.partner.values().copied().max().unwrap_or(0)
    }

    pub fn max_opponent_count(&self) -> u32 {
        self.opponent.values().copied().max().unwrap_or(0)
    }

    pub fn sit_out_spread(&self) -> u32 {
        let max = self.sit_outs.iter().copied().max().unwrap_or(0);
        let min = self.sit_outs.iter().copied().min().unwrap_or(0);
        max - min
    }

    /// Serialize to name-keyed state. Pair lists come out in roster-index
    /// order so equal ledgers serialize identically.
    pub fn to_state(&self, roster: &[String]) -> LedgerState {
        let collect = |map: &HashMap<(usize, usize), u32>| -> Vec<PairCount> {
            let mut entries: Vec<(&(usize, usize), &u32)> =
                map.iter().filter(|(_, &count)| count > 0).collect();
            entries.sort_by_key(|(key, _)| **key);
            entries
                .into_iter()
                .map(|(&(a, b), &count)| PairCount {
                    a: roster[a].clone(),
                    b: roster[b].clone(),
                    count,
                })
                .collect()
        };

        let sit_out_counts = self
            .sit_outs
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(i, &count)| (roster[i].clone(), count))
            .collect();
        let last_sat_out = self
            .last_sat_out
            .iter()
            .enumerate()
            .filter_map(|(i, round)| round.map(|r| (roster[i].clone(), r)))
            .collect();

        LedgerState {
            partner_counts: collect(&self.partner),
            opponent_counts: collect(&self.opponent),
            sit_out_counts,
            last_sat_out,
            rounds_recorded: self.rounds_recorded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotation::round::PlannedCourt;

    fn names(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("P{}", i)).collect()
    }

    fn doubles_round() -> RoundPlan {
        RoundPlan {
            courts: vec![PlannedCourt {
                court: 0,
                team_a: vec![0, 1],
                team_b: vec![2, 3],
            }],
            sitting_out: vec![4],
        }
    }

    #[test]
    fn doubles_court_creates_partner_and_opponent_pairs() {
        let mut ledger = PairingLedger::new(5, OpponentScope::SameCourt);
        ledger.record_round(&doubles_round());

        assert_eq!(ledger.pair_cost(0, 1, PairRole::Partner), 1);
        assert_eq!(ledger.pair_cost(2, 3, PairRole::Partner), 1);
        assert_eq!(ledger.pair_cost(0, 1, PairRole::Opponent), 0);
        for (a, b) in [(0, 2), (0, 3), (1, 2), (1, 3)] {
            assert_eq!(ledger.pair_cost(a, b, PairRole::Opponent), 1);
            assert_eq!(ledger.pair_cost(a, b, PairRole::Partner), 0);
        }
        assert_eq!(ledger.seen_count(1, 2), 1);
        assert_eq!(ledger.seen_count(0, 4), 0);
    }

    #[test]
    fn singles_court_counts_opponents_only() {
        let mut ledger = PairingLedger::new(2, OpponentScope::SameCourt);
        ledger.record_round(&RoundPlan {
            courts: vec![PlannedCourt {
                court: 0,
                team_a: vec![0],
                team_b: vec![1],
            }],
            sitting_out: vec![],
        });

        assert_eq!(ledger.pair_cost(0, 1, PairRole::Opponent), 1);
        assert_eq!(ledger.pair_cost(0, 1, PairRole::Partner), 0);
        assert_eq!(ledger.max_partner_count(), 0);
    }

    #[test]
    fn sit_outs_are_stamped_with_the_round() {
        let mut ledger = PairingLedger::new(5, OpponentScope::SameCourt);
        ledger.record_round(&doubles_round());

        assert_eq!(ledger.sit_out_count(4), 1);
        assert_eq!(ledger.last_sat_out(4), Some(0));
        assert_eq!(ledger.sit_out_count(0), 0);
        assert_eq!(ledger.last_sat_out(0), None);
        assert_eq!(ledger.rounds_recorded(), 1);
    }

    #[test]
    fn same_round_scope_counts_cross_court_opponents() {
        let plan = RoundPlan {
            courts: vec![
                PlannedCourt {
                    court: 0,
                    team_a: vec![0],
                    team_b: vec![1],
                },
                PlannedCourt {
                    court: 1,
                    team_a: vec![2],
                    team_b: vec![3],
                },
            ],
            sitting_out: vec![],
        };

        let mut same_court = PairingLedger::new(4, OpponentScope::SameCourt);
        same_court.record_round(&plan);
        assert_eq!(same_court.pair_cost(0, 2, PairRole::Opponent), 0);

        let mut same_round = PairingLedger::new(4, OpponentScope::SameRound);
        same_round.record_round(&plan);
        assert_eq!(same_round.pair_cost(0, 2, PairRole::Opponent), 1);
        assert_eq!(same_round.pair_cost(1, 3, PairRole::Opponent), 1);
        assert_eq!(same_round.pair_cost(0, 1, PairRole::Opponent), 1);
    }

    #[test]
    fn state_round_trips_through_serialization() {
        let roster = names(5);
        let mut ledger = PairingLedger::new(5, OpponentScope::SameCourt);
        ledger.record_round(&doubles_round());
        ledger.record_round(&RoundPlan {
            courts: vec![PlannedCourt {
                court: 0,
                team_a: vec![0, 4],
                team_b: vec![1, 2],
            }],
            sitting_out: vec![3],
        });

        let state = ledger.to_state(&roster);
        let reloaded =
            PairingLedger::seeded(&roster, OpponentScope::SameCourt, &state).unwrap();
        assert_eq!(reloaded, ledger);
        assert_eq!(reloaded.to_state(&roster), state);
    }

    #[test]
    fn seeding_rejects_unknown_players() {
        let state = LedgerState {
            partner_counts: vec![PairCount {
                a: "P1".into(),
                b: "Stranger".into(),
                count: 1,
            }],
            ..LedgerState::default()
        };
        let err = PairingLedger::seeded(&names(3), OpponentScope::SameCourt, &state)
            .unwrap_err();
        assert!(matches!(err, RotationError::Config(_)));
    }
}
