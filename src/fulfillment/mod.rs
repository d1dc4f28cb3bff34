//! Request/fulfillment rendezvous subsystem.
//!
//! # Data Flow
//! ```text
//! EventListener (anchored before submission)
//!     → eth_getLogs: UserCallbackError / UserCallbackRawError / AIReviewResponse
//!     → PendingStore (first write wins, closed ids drop late events)
//!
//! Rendezvous::wait(request)
//!     → poll tick: take result for request id
//!     → deadline: final take, else TimedOut
//! ```

pub mod listener;
pub mod rendezvous;
pub mod store;
pub mod types;

pub use listener::EventListener;
pub use rendezvous::Rendezvous;
pub use store::{PendingStore, RecordOutcome};
pub use types::{
    FulfillmentError, FulfillmentOutcome, FulfillmentResult, Request, RequestId, RequestStatus,
};
