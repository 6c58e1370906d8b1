//! Uniform deadline + cancellation wrapper for outbound calls.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use playground_shared::{PlaygroundError, Result};

/// Which outbound call is being guarded; decides how a timeout is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Fetch,
    Generation,
}

impl Stage {
    fn timeout_error(self, deadline: Duration) -> PlaygroundError {
        match self {
            Self::Fetch => PlaygroundError::fetch(format!("request timed out after {deadline:?}")),
            Self::Generation => {
                PlaygroundError::Generation(format!("generation timed out after {deadline:?}"))
            }
        }
    }
}

/// Run `fut` under an optional deadline, aborting early if `token` fires.
///
/// A token that is already cancelled wins before `fut` is first polled.
pub(crate) async fn guarded<T, F>(
    stage: Stage,
    deadline: Option<Duration>,
    token: &CancellationToken,
    fut: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let timed = async move {
        match deadline {
            Some(d) => match tokio::time::timeout(d, fut).await {
                Ok(result) => result,
                Err(_) => Err(stage.timeout_error(d)),
            },
            None => fut.await,
        }
    };

    tokio::select! {
        biased;
        _ = token.cancelled() => Err(PlaygroundError::Cancelled),
        result = timed => result,
    }
}
