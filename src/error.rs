// ============================================
// src/error.rs
// エラー型
// ============================================

use thiserror::Error;

/// ラウンド開始時の入力エラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoundError {
    #[error("a round needs at least one pair")]
    EmptyRound,

    #[error("pair id {0} appears more than once")]
    DuplicatePair(u32),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Save data encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("Save data decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("Deck '{0}' contains no pairs")]
    EmptyDeck(String),

    #[error("Topic '{0}' not found")]
    TopicNotFound(String),

    #[error(transparent)]
    Round(#[from] RoundError),
}
