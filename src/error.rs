//! Error type for store and persistence operations
//!
//! The derivations (queue, schedule, layout) are total and never return
//! these; only mutations and file I/O can fail.

use thiserror::Error;

/// Errors from goal store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("goal {0} does not exist. Run 'ascension list' to see existing goals.")]
    GoalNotFound(String),

    #[error("sub-goal {sub_goal_id} does not exist on goal {goal_id}")]
    SubGoalNotFound { goal_id: String, sub_goal_id: String },

    #[error("log entry {0} does not exist. Run 'ascension log list' to see entries.")]
    LogNotFound(String),

    #[error("parent goal {0} does not exist")]
    ParentNotFound(String),

    #[error("id prefix '{prefix}' is ambiguous ({} matches)", matches.len())]
    AmbiguousId { prefix: String, matches: Vec<String> },

    #[error("goal {0} still has open sub-goals")]
    IncompleteSubGoals(String),

    #[error("invalid import data: {0}")]
    InvalidImport(String),

    #[error("state file version {0} is newer than this build supports")]
    UnsupportedVersion(u32),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_message_counts_matches() {
        let err = StoreError::AmbiguousId {
            prefix: "ab".to_string(),
            matches: vec!["abc".to_string(), "abd".to_string()],
        };
        assert_eq!(err.to_string(), "id prefix 'ab' is ambiguous (2 matches)");
    }
}
