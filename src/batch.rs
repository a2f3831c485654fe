//! Per-entity outcome collection for batch drivers.
//!
//! Batch operations process entities independently: a failure is recorded
//! with the entity id and label and the batch moves on.

use crate::error::Error;

/// A failed entity within a batch.
#[derive(Debug)]
pub struct EntityFailure {
    /// Entity identifier (group id, teacher id).
    pub entity: String,
    /// Method or step label, when one applies.
    pub label: Option<String>,
    pub error: Error,
}

/// Outcome of a batch run.
#[derive(Debug)]
pub struct BatchReport<T> {
    pub succeeded: Vec<T>,
    pub failed: Vec<EntityFailure>,
}

impl<T> Default for BatchReport<T> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<T> BatchReport<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome for one entity.
    pub fn record(
        &mut self,
        entity: impl Into<String>,
        label: Option<&str>,
        result: Result<T, Error>,
    ) {
        match result {
            Ok(value) => self.succeeded.push(value),
            Err(error) => {
                let entity = entity.into();
                tracing::warn!(entity = %entity, label = ?label, error = %error, "entity failed");
                self.failed.push(EntityFailure {
                    entity,
                    label: label.map(str::to_string),
                    error,
                });
            }
        }
    }

    /// Whether every entity succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Ids of failed entities, in processing order.
    pub fn failed_entities(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.entity.as_str()).collect()
    }
}
