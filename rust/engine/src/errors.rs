use thiserror::Error;

/// Failures while appending to or verifying a ledger file. Corruption and
/// sequence errors are fatal for the affected log.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ledger encoding error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("ledger corrupted at seq {seq}: hash mismatch")]
    Corrupted { seq: u64 },
    #[error("ledger sequence gap: expected {expected}, found {found}")]
    SequenceGap { expected: u64, found: u64 },
    #[error("ledger line {line} is malformed")]
    Malformed { line: usize },
}

/// Failures while rebuilding state from a verified event sequence.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("unknown event type {kind:?} at seq {seq}")]
    UnknownEvent { kind: String, seq: u64 },
    #[error("bad payload for {kind} at seq {seq}: {reason}")]
    BadPayload {
        kind: String,
        seq: u64,
        reason: String,
    },
    #[error("seat index {seat} out of range at seq {seq}")]
    SeatOutOfRange { seat: usize, seq: u64 },
}

/// Rejections of a player action. All recoverable: reported to the acting
/// party, who may retry.
#[derive(Debug, Error)]
pub enum PlayError {
    #[error("the hand does not contain those cards")]
    NotInHand,
    #[error("not a legal card combination")]
    NotAPattern,
    #[error("combination does not beat the last play")]
    CannotBeat,
    #[error("the trick leader cannot pass")]
    LeaderCannotPass,
    #[error("game is not in progress")]
    NotPlaying,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Failures during deal and bidding.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("bidding controller returned {bid}, outside {min}..={max}")]
    BidOutOfRange { bid: i32, min: i32, max: i32 },
    #[error("setup already completed")]
    AlreadySetUp,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Failures while resuming a session from an existing ledger.
#[derive(Debug, Error)]
pub enum ResumeError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Replay(#[from] ReplayError),
}
