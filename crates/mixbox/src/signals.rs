//! Named signals with weakly bound receivers
//!
//! A [`Dispatcher`] maps signal names to receivers. Receivers are either
//! plain closures, held until disconnected, or bound to an object with
//! [`Dispatcher::connect_weak`] and dropped automatically once that object
//! is gone. Payloads are passed as `&dyn Any` and downcast by receivers.

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Weak};

use dashmap::DashMap;

/// Emitted with the new [`Entity`](crate::entities::Entity) after it is
/// built from a binding object
pub const ENTITY_CREATED_FROM_OBJ: &str = "Entity.created.from_obj";

/// Handle identifying a connected receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReceiverId(u64);

/// Receiver callback; returns `false` once its target is gone.
type Handler = Arc<dyn Fn(&dyn Any) -> bool + Send + Sync>;

/// Signal name to receiver registry.
#[derive(Default)]
pub struct Dispatcher {
    receivers: DashMap<String, Vec<(ReceiverId, Handler)>>,
    next_id: AtomicU64,
}

impl Dispatcher {
    /// Create a dispatcher with no receivers.
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&self, signal: &str, handler: Handler) -> ReceiverId {
        let id = ReceiverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.receivers
            .entry(signal.to_string())
            .or_default()
            .push((id, handler));
        id
    }

    /// Connect a receiver that lives until it is disconnected.
    pub fn connect<F>(&self, signal: &str, receiver: F) -> ReceiverId
    where
        F: Fn(&dyn Any) + Send + Sync + 'static,
    {
        self.add(
            signal,
            Arc::new(move |payload| {
                receiver(payload);
                true
            }),
        )
    }

    /// Connect a method-like receiver bound to `target`.
    ///
    /// Only a weak reference to `target` is kept: once it is dropped the
    /// receiver stops firing and is removed on the next emit.
    pub fn connect_weak<T>(&self, signal: &str, target: &Arc<T>, receiver: fn(&T, &dyn Any)) -> ReceiverId
    where
        T: Send + Sync + 'static,
    {
        let weak: Weak<T> = Arc::downgrade(target);
        self.add(
            signal,
            Arc::new(move |payload| match weak.upgrade() {
                Some(target) => {
                    receiver(&target, payload);
                    true
                }
                None => false,
            }),
        )
    }

    /// Disconnect a receiver. Returns whether it was connected.
    pub fn disconnect(&self, signal: &str, id: ReceiverId) -> bool {
        let Some(mut handlers) = self.receivers.get_mut(signal) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(rid, _)| *rid != id);
        handlers.len() != before
    }

    /// Call every receiver of `signal` with `payload`.
    ///
    /// Receivers run outside the registry lock, so they may connect or
    /// disconnect receivers themselves.
    pub fn emit(&self, signal: &str, payload: &dyn Any) {
        let snapshot: Vec<(ReceiverId, Handler)> = match self.receivers.get(signal) {
            Some(handlers) => handlers.clone(),
            None => return,
        };

        let dead: Vec<ReceiverId> = snapshot
            .into_iter()
            .filter_map(|(id, handler)| (!handler(payload)).then_some(id))
            .collect();

        if dead.is_empty() {
            return;
        }
        tracing::debug!(signal, count = dead.len(), "removing dead signal receivers");
        if let Some(mut handlers) = self.receivers.get_mut(signal) {
            handlers.retain(|(id, _)| !dead.contains(id));
        }
    }

    /// Number of receivers connected to `signal`
    pub fn receiver_count(&self, signal: &str) -> usize {
        self.receivers.get(signal).map_or(0, |h| h.len())
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("signals", &self.receivers.len())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Process-wide Signals
// ═══════════════════════════════════════════════════════════════════════

static SIGNALS: LazyLock<Dispatcher> = LazyLock::new(Dispatcher::new);

/// Connect a receiver to a process-wide signal.
pub fn connect<F>(signal: &str, receiver: F) -> ReceiverId
where
    F: Fn(&dyn Any) + Send + Sync + 'static,
{
    SIGNALS.connect(signal, receiver)
}

/// Connect a receiver bound weakly to `target` to a process-wide signal.
pub fn connect_weak<T>(signal: &str, target: &Arc<T>, receiver: fn(&T, &dyn Any)) -> ReceiverId
where
    T: Send + Sync + 'static,
{
    SIGNALS.connect_weak(signal, target, receiver)
}

/// Disconnect a receiver from a process-wide signal.
pub fn disconnect(signal: &str, id: ReceiverId) -> bool {
    SIGNALS.disconnect(signal, id)
}

/// Emit a process-wide signal.
pub fn emit(signal: &str, payload: &dyn Any) {
    SIGNALS.emit(signal, payload);
}

/// Number of receivers connected to a process-wide signal
pub fn receiver_count(signal: &str) -> usize {
    SIGNALS.receiver_count(signal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Counter(Mutex<u32>);

    impl Counter {
        fn bump(&self, _payload: &dyn Any) {
            *self.0.lock().unwrap() += 1;
        }
    }

    #[test]
    fn test_weak_receiver_removed_after_drop() {
        let dispatcher = Dispatcher::new();
        let counter = Arc::new(Counter(Mutex::new(0)));
        dispatcher.connect_weak("sig", &counter, Counter::bump);

        dispatcher.emit("sig", &());
        assert_eq!(*counter.0.lock().unwrap(), 1);

        drop(counter);
        dispatcher.emit("sig", &());
        assert_eq!(dispatcher.receiver_count("sig"), 0);
    }

    #[test]
    fn test_payload_downcast() {
        let dispatcher = Dispatcher::new();
        let seen = Arc::new(Mutex::new(String::new()));
        let sink = seen.clone();
        dispatcher.connect("sig", move |payload| {
            if let Some(s) = payload.downcast_ref::<String>() {
                sink.lock().unwrap().push_str(s);
            }
        });

        dispatcher.emit("sig", &"hello".to_string());
        dispatcher.emit("sig", &42_u32);
        assert_eq!(*seen.lock().unwrap(), "hello");
    }

    #[test]
    fn test_disconnect() {
        let dispatcher = Dispatcher::new();
        let id = dispatcher.connect("sig", |_| {});
        assert!(dispatcher.disconnect("sig", id));
        assert!(!dispatcher.disconnect("sig", id));
        assert!(!dispatcher.disconnect("other", id));
    }
}
