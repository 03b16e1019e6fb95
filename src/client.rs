use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use reqwest::Method;
use tracing::{debug, warn};
use url::Url;

use crate::data::{FormPayload, MutationOutcome};
use crate::request::RequestConfigurator;
use crate::transport::{MutationRequest, Transport, TransportError};

type SuccessFn = Box<dyn FnOnce(String)>;
type FailureFn = Box<dyn FnOnce()>;

struct Continuations {
    on_success: SuccessFn,
    on_failure: FailureFn,
}

struct Completion {
    request_id: u64,
    outcome: MutationOutcome,
}

/// Fire-and-forget POST client driven by the caller's event loop.
///
/// `send` returns immediately; the request runs on a worker thread and its
/// completion is queued. Continuations only ever run on the thread that calls
/// [`MutationClient::poll`] or [`MutationClient::wait_idle`], so they may
/// hold non-`Send` state such as `Rc<RefCell<_>>` handles to the document.
pub struct MutationClient {
    transport: Arc<dyn Transport>,
    configurator: RequestConfigurator,
    base_url: Url,
    response_tx: Sender<Completion>,
    response_rx: Receiver<Completion>,
    pending: HashMap<u64, Continuations>,
    next_request_id: u64,
}

impl MutationClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        configurator: RequestConfigurator,
        base_url: Url,
    ) -> Self {
        let (response_tx, response_rx) = unbounded();
        Self {
            transport,
            configurator,
            base_url,
            response_tx,
            response_rx,
            pending: HashMap::new(),
            next_request_id: 1,
        }
    }

    /// Number of requests whose continuation has not fired yet.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Issues a POST of `payload` to `url` (absolute, or relative to the base
    /// url). Exactly one of the two continuations fires, later, from `poll`.
    pub fn send<S, F>(&mut self, url: &str, payload: FormPayload, on_success: S, on_failure: F)
    where
        S: FnOnce(String) + 'static,
        F: FnOnce() + 'static,
    {
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.pending.insert(
            request_id,
            Continuations {
                on_success: Box::new(on_success),
                on_failure: Box::new(on_failure),
            },
        );

        let target = match self.base_url.join(url) {
            Ok(target) => target,
            Err(source) => {
                let err = TransportError::Url {
                    url: url.to_string(),
                    source,
                };
                warn!(request_id, error = %err, "mutation not sent");
                let _ = self.response_tx.send(Completion {
                    request_id,
                    outcome: MutationOutcome::Failure,
                });
                return;
            }
        };

        let request = MutationRequest {
            headers: self.configurator.headers(&Method::POST, &target),
            url: target,
            payload,
        };
        debug!(
            request_id,
            url = %request.url,
            fields = ?request.payload.names(),
            "sending mutation"
        );

        let transport = Arc::clone(&self.transport);
        let tx = self.response_tx.clone();
        thread::spawn(move || {
            // A panicking transport must still resolve the request.
            let result = panic::catch_unwind(AssertUnwindSafe(|| transport.post(&request)));
            let outcome = match result {
                Ok(Ok(body)) => MutationOutcome::Success(body),
                Ok(Err(err)) => {
                    warn!(request_id, url = %request.url, error = %err, "mutation failed");
                    MutationOutcome::Failure
                }
                Err(_) => {
                    warn!(request_id, url = %request.url, "transport panicked");
                    MutationOutcome::Failure
                }
            };
            let _ = tx.send(Completion {
                request_id,
                outcome,
            });
        });
    }

    /// Runs the continuations of every completion received so far without
    /// blocking. Returns how many fired.
    pub fn poll(&mut self) -> usize {
        let mut fired = 0;
        while let Ok(completion) = self.response_rx.try_recv() {
            if self.dispatch(completion) {
                fired += 1;
            }
        }
        fired
    }

    /// Blocks until every outstanding request has completed and its
    /// continuation has run.
    pub fn wait_idle(&mut self) -> usize {
        let mut fired = 0;
        while !self.pending.is_empty() {
            match self.response_rx.recv() {
                Ok(completion) => {
                    if self.dispatch(completion) {
                        fired += 1;
                    }
                }
                Err(_) => break,
            }
        }
        fired
    }

    fn dispatch(&mut self, completion: Completion) -> bool {
        let Some(continuations) = self.pending.remove(&completion.request_id) else {
            return false;
        };
        match completion.outcome {
            MutationOutcome::Success(body) => {
                debug!(request_id = completion.request_id, "mutation succeeded");
                (continuations.on_success)(body);
            }
            MutationOutcome::Failure => (continuations.on_failure)(),
        }
        true
    }
}
