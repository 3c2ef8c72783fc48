use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::ChallengeError;

/// Snapshot describing the court after a completed challenge match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub winner: String,
    pub loser: String,
    pub on_court_after: (String, String),
    pub bench_after: Vec<String>,
    /// True when the winner was sent to the bench by the streak cap.
    pub forced_bench: bool,
    pub streak_after: u32,
}

/// Winner-stays rotation for a single challenge court.
///
/// Two players are on court, everyone else waits on a bench queue. After
/// each match the loser joins the back of the bench and the front of the
/// bench comes on. A winner who reaches the streak cap is benched too, so
/// nobody monopolizes the court; because both rules apply in sequence this
/// can bring the most recent loser straight back.
#[derive(Debug, Clone)]
pub struct ChallengeCourt {
    on_court: (String, String),
    bench: VecDeque<String>,
    streaks: HashMap<String, u32>,
    max_streak: u32,
    history: Vec<MatchSnapshot>,
}

impl ChallengeCourt {
    /// Start a rotation with the first two players on court and the rest
    /// benched in roster order.
    pub fn new(players: &[String], max_streak: u32) -> Result<Self, ChallengeError> {
        if players.len() < 3 {
            return Err(ChallengeError::TooFewPlayers(players.len()));
        }
        if max_streak < 1 {
            return Err(ChallengeError::StreakCap);
        }
        Ok(Self {
            on_court: (players[0].clone(), players[1].clone()),
            bench: players[2..].iter().cloned().collect(),
            streaks: players.iter().map(|p| (p.clone(), 0)).collect(),
            max_streak,
            history: Vec::new(),
        })
    }

    pub fn on_court(&self) -> (&str, &str) {
        (&self.on_court.0, &self.on_court.1)
    }

    pub fn bench(&self) -> impl Iterator<Item = &String> {
        self.bench.iter()
    }

    pub fn history(&self) -> &[MatchSnapshot] {
        &self.history
    }

    /// Register the outcome of a match and rotate the court.
    pub fn record_match(&mut self, winner: &str) -> Result<MatchSnapshot, ChallengeError> {
        let loser = if self.on_court.0 == winner {
            self.on_court.1.clone()
        } else if self.on_court.1 == winner {
            self.on_court.0.clone()
        } else {
            return Err(ChallengeError::NotOnCourt(winner.to_string()));
        };
        let winner = winner.to_string();

        *self.streaks.get_mut(&winner).expect("winner is a known player") += 1;
        *self.streaks.get_mut(&loser).expect("loser is a known player") = 0;

        let incoming = self.bench.pop_front().expect("bench is never empty");
        self.on_court = (winner.clone(), incoming);
        self.bench.push_back(loser.clone());

        let mut forced_bench = false;
        if self.streaks[&winner] >= self.max_streak {
            forced_bench = true;
            *self.streaks.get_mut(&winner).expect("winner is a known player") = 0;
            let returning = self.bench.pop_front().expect("bench is never empty");
            self.on_court = (self.on_court.1.clone(), returning);
            self.bench.push_back(winner.clone());
        }

        let snapshot = MatchSnapshot {
            streak_after: self.streaks[&winner],
            winner,
            loser,
            on_court_after: self.on_court.clone(),
            bench_after: self.bench.iter().cloned().collect(),
            forced_bench,
        };
        self.history.push(snapshot.clone());
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three() -> Vec<String> {
        vec!["Ann".into(), "Ben".into(), "Cora".into()]
    }

    #[test]
    fn loser_swaps_with_the_bench() {
        let mut court = ChallengeCourt::new(&three(), 3).unwrap();
        let snapshot = court.record_match("Ann").unwrap();

        assert_eq!(snapshot.winner, "Ann");
        assert_eq!(snapshot.loser, "Ben");
        assert_eq!(court.on_court(), ("Ann", "Cora"));
        assert_eq!(court.bench().collect::<Vec<_>>(), vec!["Ben"]);
        assert!(!snapshot.forced_bench);
        assert_eq!(snapshot.streak_after, 1);
    }

    #[test]
    fn streak_cap_benches_the_winner() {
        let mut court = ChallengeCourt::new(&three(), 3).unwrap();
        court.record_match("Ann").unwrap(); // Ann/Cora, bench Ben
        court.record_match("Ann").unwrap(); // Ann/Ben, bench Cora
        let snapshot = court.record_match("Ann").unwrap();

        // Ann hits the cap: the most recent loser (Ben) comes straight back.
        assert!(snapshot.forced_bench);
        assert_eq!(snapshot.streak_after, 0);
        assert_eq!(court.on_court(), ("Cora", "Ben"));
        assert_eq!(court.bench().collect::<Vec<_>>(), vec!["Ann"]);
    }

    #[test]
    fn larger_groups_cycle_through_the_bench_queue() {
        let players: Vec<String> = ["Ann", "Ben", "Cora", "Dev"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut court = ChallengeCourt::new(&players, 3).unwrap();

        court.record_match("Ann").unwrap();
        assert_eq!(court.on_court(), ("Ann", "Cora"));
        assert_eq!(court.bench().collect::<Vec<_>>(), vec!["Dev", "Ben"]);

        court.record_match("Cora").unwrap();
        assert_eq!(court.on_court(), ("Cora", "Dev"));
        assert_eq!(court.bench().collect::<Vec<_>>(), vec!["Ben", "Ann"]);
    }

    #[test]
    fn rejects_winner_who_is_not_on_court() {
        let mut court = ChallengeCourt::new(&three(), 3).unwrap();
        assert_eq!(
            court.record_match("Cora"),
            Err(ChallengeError::NotOnCourt("Cora".into()))
        );
        assert_eq!(
            court.record_match("Zed"),
            Err(ChallengeError::NotOnCourt("Zed".into()))
        );
    }

    #[test]
    fn rejects_bad_setups() {
        let two: Vec<String> = vec!["Ann".into(), "Ben".into()];
        assert_eq!(
            ChallengeCourt::new(&two, 3).unwrap_err(),
            ChallengeError::TooFewPlayers(2)
        );
        assert_eq!(
            ChallengeCourt::new(&three(), 0).unwrap_err(),
            ChallengeError::StreakCap
        );
    }
}
