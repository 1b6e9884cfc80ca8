//! Reactive primitives for wayfinder.
//!
//! - [`Bus`]: a single-value publish/subscribe container
//! - [`Identity`]: the change-detection rule a bus applies before notifying
//! - [`Subscription`] / [`SubscriptionGuard`]: handles for removing a subscriber

mod bus;
mod identity;

pub use bus::{Bus, Subscription, SubscriptionGuard};
pub use identity::Identity;
