use serde::Deserialize;

use crate::rotation::{LedgerState, OpponentScope};

/// Schedule request from the frontend.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleRequest {
    /// Session name; when present the service stores the resulting ledger
    /// under it so later requests can continue the session.
    pub session: Option<String>,
    /// Roster for this session. May be empty if an admin uploaded one.
    #[serde(default)]
    pub players: Vec<String>,
    pub courts: Option<usize>,
    pub party_size: Option<u8>,
    /// Per-court party sizes; takes precedence over courts + party_size.
    pub court_sizes: Option<Vec<u8>>,
    pub rounds: u32,
    #[serde(default)]
    pub opponent_scope: Option<OpponentScope>,
    #[serde(default)]
    pub shuffle_seed: Option<u64>,
    /// Explicit prior-session history; wins over any stored session ledger.
    #[serde(default)]
    pub history: Option<LedgerState>,
}

/// Validates a schedule request before the core is invoked.
pub fn validate_request(req: &ScheduleRequest) -> Result<(), String> {
    if req.rounds < 1 {
        return Err("round count must be at least 1".to_string());
    }

    resolve_court_sizes(req)?;

    if let Some(session) = &req.session {
        if session.trim().is_empty() {
            return Err("session name must not be empty".to_string());
        }
        if session.len() > 64 {
            return Err("session name must be at most 64 characters".to_string());
        }
    }

    if !req.players.is_empty() {
        let mut seen = std::collections::HashSet::new();
        for name in &req.players {
            if name.trim().is_empty() {
                return Err("player names must not be empty".to_string());
            }
            if !seen.insert(name.trim()) {
                return Err(format!("duplicate player '{}'", name.trim()));
            }
        }
    }

    Ok(())
}

/// Resolves the court configuration: explicit per-court sizes, or a uniform
/// court count plus party size.
pub fn resolve_court_sizes(req: &ScheduleRequest) -> Result<Vec<u8>, String> {
    if let Some(sizes) = &req.court_sizes {
        if sizes.is_empty() {
            return Err("court_sizes must not be empty".to_string());
        }
        if let Some(&bad) = sizes.iter().find(|&&s| s < 2) {
            return Err(format!("party size must be at least 2, got {}", bad));
        }
        return Ok(sizes.clone());
    }

    match (req.courts, req.party_size) {
        (Some(courts), Some(party_size)) => {
            if courts < 1 {
                return Err("at least one court is required".to_string());
            }
            if party_size < 2 {
                return Err(format!("party size must be at least 2, got {}", party_size));
            }
            Ok(vec![party_size; courts])
        }
        _ => Err("either court_sizes or courts plus party_size is required".to_string()),
    }
}
