use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::RotationError;
use crate::rotation::ledger::PairingLedger;
use crate::rotation::round::generate_round;
use crate::rotation::types::{
    CourtAssignment, FairnessStats, LedgerState, Round, Schedule, SessionConfig,
};

/// Build a full schedule: validate, then run the round generator over one
/// ledger for the requested number of rounds.
///
/// `history` seeds the ledger for continuing an earlier session; `None`
/// starts fresh. Rejection is atomic: a configuration error is returned
/// before any round is generated or any ledger state is touched.
pub fn build_schedule(
    config: &SessionConfig,
    roster: &[String],
    history: Option<&LedgerState>,
) -> Result<Schedule, RotationError> {
    validate(config, roster)?;

    let mut ledger = match history {
        Some(state) => PairingLedger::seeded(roster, config.opponent_scope, state)?,
        None => PairingLedger::new(roster.len(), config.opponent_scope),
    };

    let mut seating: Vec<usize> = (0..roster.len()).collect();
    if let Some(seed) = config.shuffle_seed {
        let mut rng = StdRng::seed_from_u64(seed);
        seating.shuffle(&mut rng);
    }

    let mut rounds = Vec::with_capacity(config.rounds as usize);
    for _ in 0..config.rounds {
        let plan = generate_round(&mut ledger, &config.court_sizes, &seating)?;
        rounds.push(Round {
            // Absolute numbering, so a continued session picks up where the
            // previous schedule left off.
            number: ledger.rounds_recorded(),
            courts: plan
                .courts
                .iter()
                .map(|court| CourtAssignment {
                    court: court.court,
                    team_a: court.team_a.iter().map(|&p| roster[p].clone()).collect(),
                    team_b: court.team_b.iter().map(|&p| roster[p].clone()).collect(),
                })
                .collect(),
            sitting_out: plan.sitting_out.iter().map(|&p| roster[p].clone()).collect(),
        });
    }

    let stats = FairnessStats {
        max_partner_count: ledger.max_partner_count(),
        max_opponent_count: ledger.max_opponent_count(),
        sit_out_spread: ledger.sit_out_spread(),
    };

    Ok(Schedule {
        rounds,
        stats,
        ledger: ledger.to_state(roster),
    })
}

fn validate(config: &SessionConfig, roster: &[String]) -> Result<(), RotationError> {
    if roster.len() < 2 {
        return Err(RotationError::Config(format!(
            "at least two players are required, got {}",
            roster.len()
        )));
    }
    let mut seen = HashSet::new();
    for name in roster {
        if name.trim().is_empty() {
            return Err(RotationError::Config("player names must not be empty".into()));
        }
        if !seen.insert(name.as_str()) {
            return Err(RotationError::Config(format!(
                "duplicate player '{}' in roster",
                name
            )));
        }
    }
    if config.court_sizes.is_empty() {
        return Err(RotationError::Config("at least one court is required".into()));
    }
    if let Some(&size) = config.court_sizes.iter().find(|&&s| s < 2) {
        return Err(RotationError::Config(format!(
            "party size must be at least 2, got {}",
            size
        )));
    }
    if config.rounds < 1 {
        return Err(RotationError::Config("round count must be at least 1".into()));
    }
    // The shrink policy only redistributes the remainder once the first
    // court can be fielded at its configured size.
    let first = config.court_sizes[0] as usize;
    if roster.len() < first {
        return Err(RotationError::Config(format!(
            "{} players cannot fill a court of {}",
            roster.len(),
            first
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("P{}", i)).collect()
    }

    #[test]
    fn rejects_undersized_roster_for_first_court() {
        // Three players cannot field a doubles court at all.
        let err = build_schedule(&SessionConfig::uniform(1, 4, 3), &roster(3), None)
            .unwrap_err();
        assert!(matches!(err, RotationError::Config(_)));
    }

    #[test]
    fn rejects_bad_parameters() {
        let cases = [
            (SessionConfig::uniform(0, 4, 3), roster(8)),
            (SessionConfig::uniform(2, 1, 3), roster(8)),
            (SessionConfig::uniform(2, 4, 0), roster(8)),
            (SessionConfig::uniform(1, 2, 3), roster(1)),
        ];
        for (config, players) in cases {
            let err = build_schedule(&config, &players, None).unwrap_err();
            assert!(matches!(err, RotationError::Config(_)));
        }
    }

    #[test]
    fn rejects_duplicate_players() {
        let mut players = roster(4);
        players[3] = "P1".into();
        let err = build_schedule(&SessionConfig::uniform(1, 4, 2), &players, None)
            .unwrap_err();
        assert!(matches!(err, RotationError::Config(_)));
    }

    #[test]
    fn eight_player_doubles_has_no_repeats_in_three_rounds() {
        // 2 full courts, no byes; 24 opponent slots fit in 28 distinct pairs,
        // so the heuristic should avoid every repeat.
        let schedule =
            build_schedule(&SessionConfig::uniform(2, 4, 3), &roster(8), None).unwrap();

        for round in &schedule.rounds {
            assert_eq!(round.courts.len(), 2);
            assert!(round.sitting_out.is_empty());
            for court in &round.courts {
                assert_eq!(court.team_a.len(), 2);
                assert_eq!(court.team_b.len(), 2);
            }
        }
        assert_eq!(schedule.stats.max_opponent_count, 1);
        assert_eq!(schedule.stats.max_partner_count, 1);
        assert_eq!(schedule.stats.sit_out_spread, 0);
    }

    #[test]
    fn seven_player_byes_stay_within_one_of_each_other() {
        let schedule =
            build_schedule(&SessionConfig::uniform(1, 4, 5), &roster(7), None).unwrap();

        let mut total = 0;
        for round in &schedule.rounds {
            assert_eq!(round.sitting_out.len(), 3);
            total += round.sitting_out.len();
        }
        assert_eq!(total, 15);
        assert!(schedule.stats.sit_out_spread <= 1);
        let counts = &schedule.ledger.sit_out_counts;
        assert_eq!(counts.values().sum::<u32>(), 15);
        assert_eq!(counts.values().copied().max(), Some(3));
        assert_eq!(counts.values().copied().min(), Some(2));
    }

    #[test]
    fn partner_repeats_grow_monotonically_with_rounds() {
        let players = roster(8);
        let mut previous = 0;
        for rounds in [2, 4, 8, 12] {
            let schedule =
                build_schedule(&SessionConfig::uniform(2, 4, rounds), &players, None)
                    .unwrap();
            assert!(schedule.stats.max_partner_count >= previous);
            previous = schedule.stats.max_partner_count;
        }
    }

    #[test]
    fn seeded_continuation_matches_one_long_run() {
        let players = roster(9);
        let config = |rounds| SessionConfig::uniform(2, 4, rounds);

        let first = build_schedule(&config(3), &players, None).unwrap();
        let continued =
            build_schedule(&config(4), &players, Some(&first.ledger)).unwrap();
        let direct = build_schedule(&config(7), &players, None).unwrap();

        assert_eq!(continued.ledger, direct.ledger);
    }

    #[test]
    fn same_shuffle_seed_reproduces_the_schedule() {
        let players = roster(10);
        let mut config = SessionConfig::uniform(2, 4, 4);
        config.shuffle_seed = Some(42);

        let a = build_schedule(&config, &players, None).unwrap();
        let b = build_schedule(&config, &players, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn every_round_partitions_the_roster() {
        let players = roster(11);
        let schedule =
            build_schedule(&SessionConfig::uniform(2, 4, 6), &players, None).unwrap();

        for round in &schedule.rounds {
            let mut covered: Vec<&String> = round
                .courts
                .iter()
                .flat_map(|c| c.players())
                .chain(round.sitting_out.iter())
                .collect();
            covered.sort();
            covered.dedup();
            assert_eq!(covered.len(), players.len());
        }
    }
}
