//! Per-widget subscriptions to page-wide events.
//!
//! Resize, key, and scroll events belong to the whole page. Each widget owns
//! a [`Subscription`] naming the kinds it wants; the host consults the
//! [`ListenerRegistry`] before delivering an event, so a disposed widget
//! stops receiving events the moment its handle is released.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Weak};

/// A class of page-wide event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageEventKind {
    /// The viewport changed size.
    Resize,
    /// A navigation key was pressed.
    Key,
    /// The viewport scrolled.
    Scroll,
}

/// Identifier of one live subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

#[derive(Debug, Default)]
struct RegistryState {
    next_id: u64,
    listeners: BTreeMap<SubscriberId, Vec<PageEventKind>>,
}

/// Tracks which widgets listen for which page-wide events.
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers interest in `kinds` and returns the owning handle.
    #[must_use]
    pub fn subscribe(&self, kinds: &[PageEventKind]) -> Subscription {
        let id = self
            .state
            .lock()
            .map(|mut state| {
                let assigned = SubscriberId(state.next_id);
                state.next_id = state.next_id.saturating_add(1);
                state.listeners.insert(assigned, kinds.to_vec());
                assigned
            })
            .unwrap_or(SubscriberId(u64::MAX));

        Subscription {
            id,
            registry: Arc::downgrade(&self.state),
        }
    }

    /// Returns true when `id` is live and listens for `kind`.
    #[must_use]
    pub fn is_listening(&self, id: SubscriberId, kind: PageEventKind) -> bool {
        self.state.lock().is_ok_and(|state| {
            state
                .listeners
                .get(&id)
                .is_some_and(|kinds| kinds.contains(&kind))
        })
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.state
            .lock()
            .map_or(0, |state| state.listeners.len())
    }
}

/// Handle owning one registration in a [`ListenerRegistry`].
///
/// Releasing is idempotent and also happens on drop.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    registry: Weak<Mutex<RegistryState>>,
}

impl Subscription {
    /// Identifier to test against [`ListenerRegistry::is_listening`].
    #[must_use]
    pub const fn id(&self) -> SubscriberId {
        self.id
    }

    /// Returns true until the subscription is released.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.registry.strong_count() > 0
    }

    /// Removes the registration. Returns true only on the first call.
    pub fn release(&mut self) -> bool {
        let registry = std::mem::take(&mut self.registry);
        registry
            .upgrade()
            .and_then(|state| {
                state
                    .lock()
                    .ok()
                    .map(|mut guard| guard.listeners.remove(&self.id).is_some())
            })
            .unwrap_or(false)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscriptions_filter_by_kind() {
        let registry = ListenerRegistry::new();
        let resize_only = registry.subscribe(&[PageEventKind::Resize]);
        let keys = registry.subscribe(&[PageEventKind::Key, PageEventKind::Resize]);

        assert!(registry.is_listening(resize_only.id(), PageEventKind::Resize));
        assert!(!registry.is_listening(resize_only.id(), PageEventKind::Key));
        assert!(registry.is_listening(keys.id(), PageEventKind::Key));
        assert_ne!(resize_only.id(), keys.id());
        assert_eq!(registry.listener_count(), 2);
    }

    #[test]
    fn release_is_idempotent() {
        let registry = ListenerRegistry::new();
        let mut subscription = registry.subscribe(&[PageEventKind::Scroll]);

        assert!(subscription.is_active());
        assert!(subscription.release());
        assert!(!subscription.release());
        assert!(!subscription.is_active());
        assert!(!registry.is_listening(subscription.id(), PageEventKind::Scroll));
        assert_eq!(registry.listener_count(), 0);
    }

    #[test]
    fn dropping_a_handle_unsubscribes() {
        let registry = ListenerRegistry::new();
        let id = {
            let subscription = registry.subscribe(&[PageEventKind::Key]);
            subscription.id()
        };

        assert!(!registry.is_listening(id, PageEventKind::Key));
        assert_eq!(registry.listener_count(), 0);
    }

    #[test]
    fn handle_outliving_registry_releases_quietly() {
        let registry = ListenerRegistry::new();
        let mut subscription = registry.subscribe(&[PageEventKind::Resize]);
        drop(registry);

        assert!(!subscription.is_active());
        assert!(!subscription.release());
    }
}
