use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// General interface for implementing simple, composable risk checks.
///
/// # Associated Types
/// * `Input` - The type of data being validated (e.g., `Decimal` for a notional check).
/// * `Error` - The error type returned when validation fails.
pub trait RiskCheck {
    type Input;
    type Error;

    fn name() -> &'static str;
    fn check(&self, input: &Self::Input) -> Result<(), Self::Error>;
}

/// Passes if `input <= limit`.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Deserialize, Serialize, Constructor)]
pub struct CheckHigherThan<T> {
    pub limit: T,
}

impl<T> RiskCheck for CheckHigherThan<T>
where
    T: Clone + PartialOrd,
{
    type Input = T;
    type Error = CheckHigherThanError<T>;

    fn name() -> &'static str {
        "CheckHigherThan"
    }

    fn check(&self, input: &Self::Input) -> Result<(), Self::Error> {
        if input > &self.limit {
            Err(CheckHigherThanError {
                input: input.clone(),
                limit: self.limit.clone(),
            })
        } else {
            Ok(())
        }
    }
}

#[derive(
    Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Error, Constructor,
)]
#[error("CheckHigherThan failed: input {input:?} > limit {limit:?}")]
pub struct CheckHigherThanError<T> {
    pub input: T,
    pub limit: T,
}
