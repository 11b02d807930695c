use std::error::Error as StdError;
use thiserror::Error;

/// Terminal outcome of an operation run under a [`crate::RetryPolicy`].
#[derive(Debug, Error)]
pub enum FetchError<E>
where
    E: StdError + 'static,
{
    #[error("{description} failed after {attempts} attempts")]
    Exhausted {
        description: String,
        attempts: u32,
        #[source]
        source: E,
    },

    #[error("{description} failed permanently on attempt {attempt}")]
    Permanent {
        description: String,
        attempt: u32,
        #[source]
        source: E,
    },
}

impl<E> FetchError<E>
where
    E: StdError + 'static,
{
    /// The cause of the last failed attempt.
    pub fn cause(&self) -> &E {
        match self {
            FetchError::Exhausted { source, .. } | FetchError::Permanent { source, .. } => source,
        }
    }

    pub fn into_cause(self) -> E {
        match self {
            FetchError::Exhausted { source, .. } | FetchError::Permanent { source, .. } => source,
        }
    }

    /// Number of attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            FetchError::Exhausted { attempts, .. } => *attempts,
            FetchError::Permanent { attempt, .. } => *attempt,
        }
    }
}
