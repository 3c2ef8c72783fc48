use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use csv::Reader;

/// Reads a roster from a CSV file with a header row.
///
/// The player name is taken from the first column whose header contains
/// "name" (case-insensitive), falling back to the first column. Other
/// columns are ignored, blank rows are skipped, duplicates are rejected.
pub fn load_roster<P: AsRef<Path>>(path: P) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let reader = Reader::from_path(path)?;
    roster_from_reader(reader)
}

/// Parses a roster from in-memory CSV data (web uploads).
pub fn parse_roster_csv(data: &[u8]) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let reader = Reader::from_reader(data);
    roster_from_reader(reader)
}

fn roster_from_reader<R: Read>(
    mut reader: Reader<R>,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let headers = reader.headers()?;
    let name_col = headers
        .iter()
        .position(|h| h.to_lowercase().contains("name"))
        .unwrap_or(0);

    let mut players = Vec::new();
    let mut seen = HashSet::new();
    for result in reader.records() {
        let record = result?;
        let name = record.get(name_col).unwrap_or("").trim();
        if name.is_empty() {
            continue;
        }
        if !seen.insert(name.to_string()) {
            return Err(format!("duplicate player '{}' in roster", name).into());
        }
        players.push(name.to_string());
    }

    if players.is_empty() {
        return Err("roster contains no players".into());
    }
    Ok(players)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_names_and_skips_blank_rows() {
        let data = b"Player name,Phone\nAnn,123\n,\nBen,456\nCora,\n";
        let roster = parse_roster_csv(data).unwrap();
        assert_eq!(roster, vec!["Ann", "Ben", "Cora"]);
    }

    #[test]
    fn falls_back_to_the_first_column() {
        let data = b"who,notes\nAnn,hi\nBen,\n";
        let roster = parse_roster_csv(data).unwrap();
        assert_eq!(roster, vec!["Ann", "Ben"]);
    }

    #[test]
    fn rejects_duplicates() {
        let data = b"name\nAnn\nBen\nAnn\n";
        assert!(parse_roster_csv(data).is_err());
    }

    #[test]
    fn rejects_empty_rosters() {
        assert!(parse_roster_csv(b"name\n").is_err());
    }
}
