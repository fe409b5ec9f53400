//! Operation Execution Controller.
//!
//! Wraps one remote call with request/loading/result/error state shared by
//! every operation form. The state is published on a watch channel so a
//! front end can render it while the call is in flight.
//!
//! Invariants:
//! - while `loading`, both `result` and `error` are `None`
//! - after settling, exactly one of them is set and `loading` is false
//! - `loading` is cleared on every exit path, including a dropped future

use std::future::Future;

use futures_util::future::BoxFuture;
use tokio::sync::watch;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionState<Res> {
    pub loading: bool,
    pub result: Option<Res>,
    pub error: Option<String>,
}

impl<Res> Default for ExecutionState<Res> {
    fn default() -> Self {
        Self {
            loading: false,
            result: None,
            error: None,
        }
    }
}

type RemoteCall<Req, Res> = Box<dyn Fn(Req) -> BoxFuture<'static, Result<Res>> + Send + Sync>;

pub struct OperationController<Req, Res> {
    call: RemoteCall<Req, Res>,
    state: watch::Sender<ExecutionState<Res>>,
}

impl<Req, Res> OperationController<Req, Res>
where
    Req: Send + 'static,
    Res: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(call: F) -> Self
    where
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Res>> + Send + 'static,
    {
        let (state, _) = watch::channel(ExecutionState::default());
        Self {
            call: Box::new(move |req| Box::pin(call(req))),
            state,
        }
    }

    pub fn watch(&self) -> watch::Receiver<ExecutionState<Res>> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ExecutionState<Res> {
        self.state.borrow().clone()
    }

    /// Run the bound call. Returns the response, or `None` on failure (the
    /// failure message is in the state).
    pub async fn execute(&self, params: Req) -> Option<Res> {
        self.state.send_replace(ExecutionState {
            loading: true,
            result: None,
            error: None,
        });
        let guard = SettleGuard {
            state: &self.state,
            settled: false,
        };

        match (self.call)(params).await {
            Ok(response) => {
                guard.settle(Some(response.clone()), None);
                Some(response)
            }
            Err(e) => {
                tracing::warn!("Operation failed: {}", e);
                guard.settle(None, Some(e.message()));
                None
            }
        }
    }

    /// Back to the pristine state, e.g. after a result banner is dismissed.
    pub fn reset(&self) {
        self.state.send_replace(ExecutionState::default());
    }
}

/// Clears `loading` if the call never settled (future dropped or panicked).
struct SettleGuard<'a, Res> {
    state: &'a watch::Sender<ExecutionState<Res>>,
    settled: bool,
}

impl<Res> SettleGuard<'_, Res> {
    fn settle(mut self, result: Option<Res>, error: Option<String>) {
        self.settled = true;
        self.state.send_replace(ExecutionState {
            loading: false,
            result,
            error,
        });
    }
}

impl<Res> Drop for SettleGuard<'_, Res> {
    fn drop(&mut self) {
        if !self.settled {
            self.state.send_modify(|s| s.loading = false);
        }
    }
}
