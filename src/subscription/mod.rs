//! Subscription funding subsystem.

pub mod funding;

pub use funding::{encode_subscription_id, parse_link_amount, SubscriptionManager};
