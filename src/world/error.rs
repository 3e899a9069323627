use thiserror::Error;

use crate::world::types::{ProductId, QuestRef, WeedId};

/// Failure reported by a game collaborator while performing an action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("unknown product {0}")]
    UnknownProduct(ProductId),
    #[error("unknown weed {0:?}")]
    UnknownWeed(WeedId),
    #[error("no active quest matches {0}")]
    UnknownQuest(QuestRef),
    #[error("insufficient {what}: required={required}, available={available}")]
    Insufficient {
        what: &'static str,
        required: i64,
        available: i64,
    },
    #[error("{action} rejected by game: {reason}")]
    Rejected {
        action: &'static str,
        reason: String,
    },
}
