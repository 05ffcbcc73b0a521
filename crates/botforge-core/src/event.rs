//! Typed event bus.
//!
//! The runtime re-emits the client's lifecycle notifications, plus its own
//! `command-triggered` notification, as [`BotEvent`]s. Host code subscribes
//! per [`EventKind`] and gets a [`Subscription`] handle back that can later
//! be passed to [`EventBus::off`].
//!
//! ```rust,ignore
//! let bus = EventBus::new();
//! let sub = bus.on(EventKind::CommandTriggered, |event| {
//!     if let BotEvent::CommandTriggered { command, author } = event {
//!         info!(%command, %author, "Command triggered");
//!     }
//! });
//! bus.off(sub);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::trace;

use crate::config::BotConfig;
use crate::error::ClientError;
use crate::message::User;

/// The kinds of event a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The client session is ready.
    Ready,
    /// A command word matched a registered trigger.
    CommandTriggered,
    /// The client is reconnecting.
    Reconnecting,
    /// The client reconnected.
    Reconnected,
    /// The connection closed.
    Close,
    /// The client reported an error.
    Error,
}

impl EventKind {
    /// Returns the event name as used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::CommandTriggered => "command-triggered",
            Self::Reconnecting => "reconnecting",
            Self::Reconnected => "reconnected",
            Self::Close => "close",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event emitted on the bus. Each variant carries its full payload.
#[derive(Debug, Clone)]
pub enum BotEvent {
    /// The client is connected and the bot is accepting commands.
    Ready {
        /// The effective config at the time the session became ready.
        config: Arc<BotConfig>,
        /// The bot's own account.
        user: User,
    },
    /// A message invoked a registered command.
    CommandTriggered {
        /// The full command word, prefix included.
        command: String,
        /// Who sent it.
        author: User,
    },
    /// The client is reconnecting.
    Reconnecting,
    /// The client reconnected.
    Reconnected,
    /// The connection closed.
    Close {
        /// Close code reported by the platform.
        code: u16,
        /// Human-readable reason.
        reason: String,
    },
    /// The client reported an error.
    Error(ClientError),
}

impl BotEvent {
    /// Returns the kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Ready { .. } => EventKind::Ready,
            Self::CommandTriggered { .. } => EventKind::CommandTriggered,
            Self::Reconnecting => EventKind::Reconnecting,
            Self::Reconnected => EventKind::Reconnected,
            Self::Close { .. } => EventKind::Close,
            Self::Error(_) => EventKind::Error,
        }
    }
}

/// A type-erased event listener.
pub type Listener = Arc<dyn Fn(&BotEvent) + Send + Sync>;

/// Handle returned by [`EventBus::on`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    kind: EventKind,
    id: u64,
}

impl Subscription {
    /// The event kind this subscription listens to.
    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

#[derive(Default)]
struct BusInner {
    listeners: RwLock<HashMap<EventKind, Vec<(u64, Listener)>>>,
    next_id: AtomicU64,
}

/// A typed, cloneable event bus.
///
/// Clones share the same listener table.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `listener` to events of `kind`.
    ///
    /// Listeners of one kind run in subscription order.
    pub fn on<F>(&self, kind: EventKind, listener: F) -> Subscription
    where
        F: Fn(&BotEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .write()
            .entry(kind)
            .or_default()
            .push((id, Arc::new(listener)));
        trace!(event = %kind, subscription = id, "Listener subscribed");
        Subscription { kind, id }
    }

    /// Removes a subscription. Returns `false` if it was already removed.
    pub fn off(&self, subscription: Subscription) -> bool {
        let mut listeners = self.inner.listeners.write();
        let Some(list) = listeners.get_mut(&subscription.kind) else {
            return false;
        };

        let before = list.len();
        list.retain(|(id, _)| *id != subscription.id);
        before != list.len()
    }

    /// Delivers `event` to every listener of its kind.
    ///
    /// The listener list is snapshotted first, so listeners may subscribe or
    /// unsubscribe while being called; changes apply to the next emit.
    /// Returns the number of listeners invoked.
    pub fn emit(&self, event: &BotEvent) -> usize {
        let kind = event.kind();
        let snapshot: Vec<Listener> = match self.inner.listeners.read().get(&kind) {
            Some(list) => list.iter().map(|(_, l)| Arc::clone(l)).collect(),
            None => Vec::new(),
        };

        trace!(event = %kind, listeners = snapshot.len(), "Emitting event");
        for listener in &snapshot {
            listener(event);
        }
        snapshot.len()
    }

    /// Returns the number of listeners subscribed to `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.inner
            .listeners
            .read()
            .get(&kind)
            .map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.inner.listeners.read();
        f.debug_struct("EventBus")
            .field("listener_count", &listeners.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}
