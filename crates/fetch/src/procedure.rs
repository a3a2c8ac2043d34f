//! Remote-procedure handles and their callback-to-future bridge.
//!
//! A [`RemoteProcedure`] performs its own marshaling and signals completion by
//! calling a single callback with `(error, response)`. [`call_procedure`]
//! turns that contract into a future resolving to a tagged `Result`, so the
//! stub strategy shares the same lifecycle as the codec-based strategies.

use tokio::sync::oneshot;
use tracing::debug;

use crate::{FetchError, MethodName, ProcedureError, TransportError};

/// Completion callback: `(error, response)`. Called exactly once.
pub type Callback<R> = Box<dyn FnOnce(Option<ProcedureError>, Option<R>) + Send + 'static>;

/// A pre-bound remote-procedure handle.
///
/// Implementations may complete the callback synchronously inside
/// [`invoke`](RemoteProcedure::invoke) or later from another task.
pub trait RemoteProcedure: Send + Sync {
    /// Request message type.
    type Request: Send;
    /// Response message type.
    type Response: Send + 'static;

    /// Starts the call and arranges for `callback` to be invoked once.
    fn invoke(&self, method: &MethodName, request: Self::Request, callback: Callback<Self::Response>);
}

/// Invokes `method` on `handle` and waits for its single completion.
///
/// The error argument wins when the callback supplies both. A callback that
/// supplies neither, or a handle that drops the callback without calling it,
/// resolves to [`TransportError::Unknown`].
pub async fn call_procedure<P>(
    handle: &P,
    method: &MethodName,
    request: P::Request,
) -> Result<P::Response, FetchError>
where
    P: RemoteProcedure + ?Sized,
{
    let (tx, rx) = oneshot::channel();
    let callback: Callback<P::Response> = Box::new(move |error, response| {
        let outcome = match (error, response) {
            (Some(err), _) => Err(FetchError::from(err)),
            (None, Some(resp)) => Ok(resp),
            (None, None) => Err(TransportError::unknown(
                "remote procedure completed without an error or a response",
            )
            .into()),
        };
        // The receiver is only gone if the caller stopped waiting.
        if tx.send(outcome).is_err() {
            debug!("remote procedure completed after its caller went away");
        }
    });

    handle.invoke(method, request, callback);

    match rx.await {
        Ok(outcome) => outcome,
        Err(_) => Err(TransportError::unknown(format!(
            "remote procedure '{method}' dropped its completion callback"
        ))
        .into()),
    }
}
