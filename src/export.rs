use std::path::Path;

use csv::WriterBuilder;

use crate::display::format_team;
use crate::rotation::Schedule;

/// Exports a schedule as CSV with one row per court and one trailing row per
/// round for the sit-out set. Columns: round, court, team_a, team_b.
pub fn export_schedule_to_csv(
    schedule: &Schedule,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record(["round", "court", "team_a", "team_b"])?;

    for round in &schedule.rounds {
        let round_no = round.number.to_string();
        for court in &round.courts {
            let court_no = (court.court + 1).to_string();
            let team_a = format_team(&court.team_a);
            let team_b = format_team(&court.team_b);
            wtr.write_record([
                round_no.as_str(),
                court_no.as_str(),
                team_a.as_str(),
                team_b.as_str(),
            ])?;
        }
        if !round.sitting_out.is_empty() {
            let byes = round.sitting_out.join(" & ");
            wtr.write_record([round_no.as_str(), "sit-out", byes.as_str(), ""])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
