//! Request and fulfillment types.

use alloy::primitives::{Bytes, B256};
use std::fmt;
use std::time::{Duration, SystemTime};
use thiserror::Error;

/// Identifier assigned to a request by the oracle at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(pub B256);

impl From<B256> for RequestId {
    fn from(id: B256) -> Self {
        Self(id)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a submitted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Pending,
    Fulfilled,
    Failed,
    TimedOut,
}

impl RequestStatus {
    /// Whether the status is final.
    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// A request acknowledged on-chain and awaiting fulfillment.
#[derive(Debug, Clone)]
pub struct Request {
    pub id: RequestId,
    pub submitted_at: SystemTime,
    status: RequestStatus,
}

impl Request {
    /// Start tracking a freshly submitted request.
    pub fn new(id: RequestId) -> Self {
        Self {
            id,
            submitted_at: SystemTime::now(),
            status: RequestStatus::Pending,
        }
    }

    /// Wall-clock time since the request was acknowledged on-chain.
    pub fn since_submitted(&self) -> Duration {
        self.submitted_at.elapsed().unwrap_or_default()
    }

    /// Current status.
    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub(crate) fn resolve(&mut self, status: RequestStatus) {
        self.status = status;
    }
}

/// What the oracle network reported for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FulfillmentOutcome {
    /// The consumer received a response.
    Response(Bytes),
    /// The consumer's fulfillment handler reverted with a reason string.
    UserCallbackError(String),
    /// The consumer's fulfillment handler reverted with undecodable data.
    UserCallbackRawError(Bytes),
    /// The request source itself failed and returned an error message.
    Error(String),
}

impl FulfillmentOutcome {
    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            FulfillmentOutcome::Response(_) => "response",
            FulfillmentOutcome::UserCallbackError(_) => "user_callback_error",
            FulfillmentOutcome::UserCallbackRawError(_) => "user_callback_raw_error",
            FulfillmentOutcome::Error(_) => "error",
        }
    }

    /// Terminal request status implied by this outcome.
    pub fn status(&self) -> RequestStatus {
        match self {
            FulfillmentOutcome::Response(_) => RequestStatus::Fulfilled,
            _ => RequestStatus::Failed,
        }
    }
}

/// Immutable result delivered for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FulfillmentResult {
    pub request_id: RequestId,
    pub outcome: FulfillmentOutcome,
}

impl FulfillmentResult {
    pub fn new(request_id: RequestId, outcome: FulfillmentOutcome) -> Self {
        Self {
            request_id,
            outcome,
        }
    }

    /// Build from the consumer's `(response, err)` callback pair.
    ///
    /// A non-empty `err` takes precedence over the response.
    pub fn from_consumer_response(request_id: RequestId, response: Bytes, err: Bytes) -> Self {
        let outcome = if err.is_empty() {
            FulfillmentOutcome::Response(response)
        } else {
            FulfillmentOutcome::Error(String::from_utf8_lossy(&err).into_owned())
        };
        Self::new(request_id, outcome)
    }
}

/// Errors produced by a rendezvous session.
#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// No fulfillment arrived before the deadline.
    #[error(
        "Request {request_id} was not fulfilled within {} seconds; it may still be fulfilled remotely",
        .waited.as_secs()
    )]
    TimedOut {
        request_id: RequestId,
        waited: Duration,
    },

    /// The session was already resolved.
    #[error("Request {request_id} already resolved as {status:?}")]
    AlreadyResolved {
        request_id: RequestId,
        status: RequestStatus,
    },
}
