use thiserror::Error;

/// Errors from schedule building.
///
/// `Config` means the caller supplied bad inputs and can retry with fixed
/// ones; nothing has been mutated when it is returned. `Invariant` means the
/// generator produced an inconsistent round, which is a bug and must not be
/// papered over with a wrong schedule.
#[derive(Debug, Error)]
pub enum RotationError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

/// Errors from the challenge-court (winner stays) rotation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChallengeError {
    #[error("at least three players are required, got {0}")]
    TooFewPlayers(usize),
    #[error("win streak cap must be at least 1")]
    StreakCap,
    #[error("{0} is not currently on court")]
    NotOnCourt(String),
}
