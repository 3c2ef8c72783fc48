use std::collections::HashSet;

use crate::error::RotationError;
use crate::rotation::ledger::{PairRole, PairingLedger};
use crate::rotation::types::OpponentScope;

/// Cap on best-improvement passes so worst-case latency stays polynomial
/// even for large rosters. Each pass applies at most one swap.
const MAX_IMPROVEMENT_PASSES: usize = 12;

/// One court of a generated round, as roster indices with the team split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCourt {
    pub court: usize,
    pub team_a: Vec<usize>,
    pub team_b: Vec<usize>,
}

impl PlannedCourt {
    pub fn players(&self) -> impl Iterator<Item = usize> + '_ {
        self.team_a.iter().chain(self.team_b.iter()).copied()
    }
}

/// A generated round before names are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundPlan {
    pub courts: Vec<PlannedCourt>,
    pub sitting_out: Vec<usize>,
}

/// Produce one round and record it into the ledger.
///
/// `seating` is the full roster as indices, in the order used for every
/// deterministic tie-break (roster order, or a seeded shuffle of it).
pub fn generate_round(
    ledger: &mut PairingLedger,
    court_sizes: &[u8],
    seating: &[usize],
) -> Result<RoundPlan, RotationError> {
    let (effective, byes) = plan_effective_sizes(seating.len(), court_sizes);
    if effective.is_empty() {
        return Err(RotationError::Invariant(format!(
            "no court can be opened for {} players",
            seating.len()
        )));
    }

    let sitting_out = select_sit_outs(ledger, seating, byes);
    let active: Vec<usize> = seating
        .iter()
        .copied()
        .filter(|p| !sitting_out.contains(p))
        .collect();

    let mut courts = greedy_fill(ledger, &effective, &active);
    improve_courts(ledger, &mut courts);

    let courts = courts
        .into_iter()
        .zip(&effective)
        .map(|(members, &(court, _))| {
            let split = best_split(ledger, &members);
            PlannedCourt {
                court,
                team_a: split.team_a,
                team_b: split.team_b,
            }
        })
        .collect();

    let plan = RoundPlan {
        courts,
        sitting_out,
    };
    verify_partition(&plan, seating)?;
    ledger.record_round(&plan);
    Ok(plan)
}

/// Effective (court index, size) pairs for this round plus the bye count.
///
/// Courts fill in order. A remainder of two or more players shrinks the last
/// occupied court instead of leaving anyone unplaced; a remainder of exactly
/// one player becomes a bye, since a court of one cannot play.
fn plan_effective_sizes(players: usize, court_sizes: &[u8]) -> (Vec<(usize, usize)>, usize) {
    let mut remaining = players;
    let mut effective = Vec::new();
    for (court, &size) in court_sizes.iter().enumerate() {
        if remaining < 2 {
            break;
        }
        let take = remaining.min(size as usize);
        effective.push((court, take));
        remaining -= take;
    }
    (effective, remaining)
}

/// Pick the bye set: lowest sit-out count first, then least-recently-sat-out,
/// then seating order. Guarantees nobody sits twice before everyone sat once
/// while the per-round excess is stable.
fn select_sit_outs(ledger: &PairingLedger, seating: &[usize], byes: usize) -> Vec<usize> {
    if byes == 0 {
        return Vec::new();
    }
    let mut ranked: Vec<(u32, u32, usize, usize)> = seating
        .iter()
        .enumerate()
        .map(|(pos, &p)| {
            (
                ledger.sit_out_count(p),
                ledger.last_sat_out(p).unwrap_or(0),
                pos,
                p,
            )
        })
        .collect();
    ranked.sort_by_key(|&(count, last, pos, _)| (count, last, pos));
    ranked.into_iter().take(byes).map(|(_, _, _, p)| p).collect()
}

/// Greedy construction: each court starts from the most constrained
/// unassigned player (fewest fresh pairings left), then repeatedly takes the
/// player with the lowest marginal seen-count against the court so far.
/// Ties resolve to the earliest player in seating order.
fn greedy_fill(
    ledger: &PairingLedger,
    effective: &[(usize, usize)],
    active: &[usize],
) -> Vec<Vec<usize>> {
    let mut unassigned: Vec<usize> = active.to_vec();
    let mut courts = Vec::with_capacity(effective.len());
    for &(_, size) in effective {
        let mut members: Vec<usize> = Vec::with_capacity(size);

        let anchor = (0..unassigned.len())
            .min_by_key(|&i| {
                let p = unassigned[i];
                unassigned
                    .iter()
                    .filter(|&&q| q != p && ledger.seen_count(p, q) == 0)
                    .count()
            })
            .expect("court sizes never exceed the active player count");
        members.push(unassigned.remove(anchor));

        while members.len() < size {
            let next = (0..unassigned.len())
                .min_by_key(|&i| {
                    members
                        .iter()
                        .map(|&m| ledger.seen_count(unassigned[i], m))
                        .sum::<u32>()
                })
                .expect("court sizes never exceed the active player count");
            members.push(unassigned.remove(next));
        }
        courts.push(members);
    }
    courts
}

/// Best-improvement local search over court memberships.
///
/// Considers single-player swaps and two-player (pair) swaps between courts.
/// Pair swaps matter: two players sometimes have to move together, and
/// single swaps alone stall on exactly those configurations.
fn improve_courts(ledger: &PairingLedger, courts: &mut Vec<Vec<usize>>) {
    if courts.len() < 2 {
        return;
    }
    for _ in 0..MAX_IMPROVEMENT_PASSES {
        let current = round_cost(ledger, courts);
        if current == 0 {
            break;
        }
        let mut best: Option<(u32, Vec<Vec<usize>>)> = None;
        for c1 in 0..courts.len() {
            for c2 in c1 + 1..courts.len() {
                for i in 0..courts[c1].len() {
                    for j in 0..courts[c2].len() {
                        let mut candidate = courts.clone();
                        let moved = candidate[c1][i];
                        candidate[c1][i] = candidate[c2][j];
                        candidate[c2][j] = moved;
                        consider(ledger, candidate, &mut best);
                    }
                }
                for i1 in 0..courts[c1].len() {
                    for i2 in i1 + 1..courts[c1].len() {
                        for j1 in 0..courts[c2].len() {
                            for j2 in j1 + 1..courts[c2].len() {
                                let mut candidate = courts.clone();
                                let moved = candidate[c1][i1];
                                candidate[c1][i1] = candidate[c2][j1];
                                candidate[c2][j1] = moved;
                                let moved = candidate[c1][i2];
                                candidate[c1][i2] = candidate[c2][j2];
                                candidate[c2][j2] = moved;
                                consider(ledger, candidate, &mut best);
                            }
                        }
                    }
                }
            }
        }
        match best {
            Some((cost, candidate)) if cost < current => *courts = candidate,
            _ => break,
        }
    }
}

fn consider(
    ledger: &PairingLedger,
    candidate: Vec<Vec<usize>>,
    best: &mut Option<(u32, Vec<Vec<usize>>)>,
) {
    let cost = round_cost(ledger, &candidate);
    if best.as_ref().map_or(true, |(b, _)| cost < *b) {
        *best = Some((cost, candidate));
    }
}

/// Total repeat cost of a candidate round: each court at its cheapest team
/// split, plus cross-court opponent costs under `SameRound` scope.
fn round_cost(ledger: &PairingLedger, courts: &[Vec<usize>]) -> u32 {
    let mut cost: u32 = courts
        .iter()
        .map(|members| best_split(ledger, members).cost)
        .sum();
    if ledger.scope() == OpponentScope::SameRound {
        for i in 0..courts.len() {
            for j in i + 1..courts.len() {
                for &a in &courts[i] {
                    for &b in &courts[j] {
                        cost += ledger.pair_cost(a, b, PairRole::Opponent);
                    }
                }
            }
        }
    }
    cost
}

struct Split {
    team_a: Vec<usize>,
    team_b: Vec<usize>,
    cost: u32,
}

/// Cheapest team split of a court: partner cost inside teams plus opponent
/// cost across. Enumerates every split (courts are small); for even courts
/// mirrored splits are skipped by pinning the first member to team A.
fn best_split(ledger: &PairingLedger, members: &[usize]) -> Split {
    let size = members.len();
    let team_a_size = size / 2;
    let mut best: Option<Split> = None;
    for combo in combinations(size, team_a_size) {
        if team_a_size * 2 == size && !combo.contains(&0) {
            continue;
        }
        let team_a: Vec<usize> = combo.iter().map(|&i| members[i]).collect();
        let team_b: Vec<usize> = (0..size)
            .filter(|i| !combo.contains(i))
            .map(|i| members[i])
            .collect();
        let cost = split_cost(ledger, &team_a, &team_b);
        if best.as_ref().map_or(true, |b| cost < b.cost) {
            best = Some(Split {
                team_a,
                team_b,
                cost,
            });
        }
    }
    best.expect("every court holds at least two players")
}

fn split_cost(ledger: &PairingLedger, team_a: &[usize], team_b: &[usize]) -> u32 {
    let mut cost = 0;
    for team in [team_a, team_b] {
        for i in 0..team.len() {
            for j in i + 1..team.len() {
                cost += ledger.pair_cost(team[i], team[j], PairRole::Partner);
            }
        }
    }
    for &a in team_a {
        for &b in team_b {
            cost += ledger.pair_cost(a, b, PairRole::Opponent);
        }
    }
    cost
}

/// All k-element index combinations of 0..n, in lexicographic order.
fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(k);
    push_combinations(0, n, k, &mut current, &mut out);
    out
}

fn push_combinations(
    start: usize,
    n: usize,
    k: usize,
    current: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    if current.len() == k {
        out.push(current.clone());
        return;
    }
    for i in start..n {
        current.push(i);
        push_combinations(i + 1, n, k, current, out);
        current.pop();
    }
}

/// Defensive check: every seated player lands in exactly one court or the
/// bye set. A violation is a generator bug, never a wrong-but-returned round.
fn verify_partition(plan: &RoundPlan, seating: &[usize]) -> Result<(), RotationError> {
    let mut seen = HashSet::new();
    let mut total = 0usize;
    for court in &plan.courts {
        for p in court.players() {
            total += 1;
            if !seen.insert(p) {
                return Err(RotationError::Invariant(format!(
                    "player index {} assigned more than once",
                    p
                )));
            }
        }
    }
    for &p in &plan.sitting_out {
        total += 1;
        if !seen.insert(p) {
            return Err(RotationError::Invariant(format!(
                "player index {} both plays and sits out",
                p
            )));
        }
    }
    if total != seating.len() {
        return Err(RotationError::Invariant(format!(
            "round covers {} of {} players",
            total,
            seating.len()
        )));
    }
    Ok(())
}
