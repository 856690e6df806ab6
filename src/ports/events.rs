// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event manager port used to publish and receive configuration events.

use crate::domain::{ChangeEvent, RefreshSignal};
use std::sync::Arc;

/// Reacts to configuration events.
///
/// Providers implement this to cascade refreshes. Handlers run on the
/// publisher's thread and may publish further events.
pub trait ConfigChangeAware: Send + Sync {
    /// Called for every published change event.
    fn on_config_changed(&self, event: &ChangeEvent);

    /// Called for every published refresh signal.
    fn on_refresh(&self, signal: &RefreshSignal);
}

/// Publish/subscribe channel injected into every provider.
///
/// # Delivery contract
///
/// Every live subscriber receives every event published after it subscribed.
/// Delivery order across subscribers is unspecified. A subscriber is held
/// weakly, so dropping the last strong reference to it unsubscribes it.
pub trait ConfigEventManager: Send + Sync {
    /// Publishes a change event.
    fn fire_change(&self, event: ChangeEvent);

    /// Publishes a refresh signal.
    fn fire_refresh(&self, signal: RefreshSignal);

    /// Registers a subscriber.
    fn subscribe(&self, subscriber: Arc<dyn ConfigChangeAware>);
}
