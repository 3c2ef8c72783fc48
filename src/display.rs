use std::fs::File;
use std::io::Write;

use chrono::Local;

use crate::rotation::{Round, Schedule};

/// Formats a team for display, e.g. "Ann & Ben".
pub fn format_team(players: &[String]) -> String {
    players.join(" & ")
}

fn format_court(round: &Round, index: usize) -> String {
    let court = &round.courts[index];
    if court.team_a.len() == 1 && court.team_b.len() == 1 {
        format!("{} vs {}", court.team_a[0], court.team_b[0])
    } else {
        format!(
            "{} vs {}",
            format_team(&court.team_a),
            format_team(&court.team_b)
        )
    }
}

/// Prints a schedule in a readable format.
pub fn print_schedule(session_name: &str, schedule: &Schedule) {
    println!("\n=== {} ===", session_name);
    println!("Rounds: {}", schedule.rounds.len());

    for round in &schedule.rounds {
        println!("\nRound {}:", round.number);
        for index in 0..round.courts.len() {
            println!(
                "  Court {} -> {}",
                round.courts[index].court + 1,
                format_court(round, index)
            );
        }
        if !round.sitting_out.is_empty() {
            println!("  Sitting out: {}", round.sitting_out.join(", "));
        }
    }

    println!("\nFairness:");
    println!(
        "  Max partner repeats:  {}",
        schedule.stats.max_partner_count
    );
    println!(
        "  Max opponent repeats: {}",
        schedule.stats.max_opponent_count
    );
    println!("  Sit-out spread:       {}", schedule.stats.sit_out_spread);
}

/// Writes a schedule to a text file, one round per block.
pub fn write_schedule_to_file(
    session_name: &str,
    schedule: &Schedule,
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(filename)?;

    writeln!(file, "** {} **", session_name)?;
    writeln!(file, "Generated {}", Local::now().format("%Y-%m-%d %H:%M"))?;

    for round in &schedule.rounds {
        writeln!(file)?;
        writeln!(file, "Round {}", round.number)?;
        for index in 0..round.courts.len() {
            writeln!(
                file,
                "  Court {}: {}",
                round.courts[index].court + 1,
                format_court(round, index)
            )?;
        }
        if !round.sitting_out.is_empty() {
            writeln!(file, "  Sitting out: {}", round.sitting_out.join(", "))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotation::CourtAssignment;

    #[test]
    fn teams_are_joined_with_ampersands() {
        assert_eq!(format_team(&["Ann".into(), "Ben".into()]), "Ann & Ben");
        assert_eq!(format_team(&["Ann".into()]), "Ann");
    }

    #[test]
    fn singles_courts_read_as_a_versus_line() {
        let round = Round {
            number: 1,
            courts: vec![CourtAssignment {
                court: 0,
                team_a: vec!["Ann".into()],
                team_b: vec!["Ben".into()],
            }],
            sitting_out: vec![],
        };
        assert_eq!(format_court(&round, 0), "Ann vs Ben");
    }
}
