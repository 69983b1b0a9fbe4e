use std::fmt;

use thiserror::Error;

/// Kind of entity an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Trajectory,
    Segment,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Trajectory => "trajectory",
            Entity::Segment => "segment",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AnnotationError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: Entity, id: u64 },

    #[error("no unlabeled segment starts after frame {0}")]
    NoInterestAfter(u64),

    #[error("invalid selection: {0}")]
    InvalidSelection(String),
}

pub type AnnotationResult<T> = Result<T, AnnotationError>;
