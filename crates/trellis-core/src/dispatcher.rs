//! Code-keyed observer dispatch.
//!
//! A [`Dispatcher`] maps string notification codes to ordered handler
//! lists. Components register interest in a code and receive every payload
//! published under it, in registration order. This complements [`Signal`]:
//! a signal is one statically-known event owned by one object, while a
//! dispatcher routes an open-ended set of event codes through a single
//! shared registry.
//!
//! Dispatchers are plain values. Construct one where the participating
//! components meet and hand out references (typically via `Arc`); there is
//! no process-global instance.
//!
//! # Example
//!
//! ```
//! use trellis_core::Dispatcher;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let dispatcher = Dispatcher::<String>::new();
//! let hits = Arc::new(AtomicUsize::new(0));
//!
//! let hits_clone = hits.clone();
//! let id = dispatcher.register("document.saved", move |_path| {
//!     hits_clone.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! dispatcher.notify("document.saved", &"a.txt".to_string());
//! dispatcher.notify("document.opened", &"b.txt".to_string()); // no handler
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//!
//! assert!(dispatcher.remove(id));
//! ```
//!
//! [`Signal`]: crate::Signal

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// A unique token for a registered handler.
    ///
    /// Returned by [`Dispatcher::register`] and consumed by
    /// [`Dispatcher::remove`]. Tokens are never reused while the handler
    /// is registered, so a stale token is a harmless no-op.
    pub struct SubscriptionId;
}

struct HandlerEntry<T> {
    code: String,
    handler: Arc<dyn Fn(&T) + Send + Sync>,
}

struct DispatcherState<T> {
    handlers: SlotMap<SubscriptionId, HandlerEntry<T>>,
    /// Registration-ordered handler tokens per code. An entry exists only
    /// while at least one handler is registered for the code.
    by_code: HashMap<String, Vec<SubscriptionId>>,
}

/// Routes payloads to handlers registered under string codes.
///
/// # Dispatch Semantics
///
/// [`notify`](Self::notify) snapshots the code's handler list under the
/// lock and invokes the snapshot after releasing it, in registration
/// order. Handlers may re-enter the dispatcher (register, remove, notify)
/// freely. A dispatch in progress cannot be cancelled: every handler in
/// the snapshot runs exactly once, even if an earlier handler removes it.
///
/// # Thread Safety
///
/// `Dispatcher<T>` is `Send + Sync`. Handlers always run on the notifying
/// thread.
pub struct Dispatcher<T> {
    state: Mutex<DispatcherState<T>>,
}

impl<T> Default for Dispatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Dispatcher<T> {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DispatcherState {
                handlers: SlotMap::with_key(),
                by_code: HashMap::new(),
            }),
        }
    }

    /// Register a handler for a notification code.
    ///
    /// The code's handler list is created on first registration. Handlers
    /// for the same code run in registration order.
    pub fn register<F>(&self, code: impl Into<String>, handler: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let code = code.into();
        let mut state = self.state.lock();
        let id = state.handlers.insert(HandlerEntry {
            code: code.clone(),
            handler: Arc::new(handler),
        });
        state.by_code.entry(code).or_default().push(id);
        id
    }

    /// Remove a handler by its token.
    ///
    /// Returns `true` if the handler was registered. When the last handler
    /// for a code is removed, the code's map entry is deleted.
    pub fn remove(&self, id: SubscriptionId) -> bool {
        let mut state = self.state.lock();
        let Some(entry) = state.handlers.remove(id) else {
            return false;
        };
        if let Some(ids) = state.by_code.get_mut(&entry.code) {
            ids.retain(|h| *h != id);
            if ids.is_empty() {
                state.by_code.remove(&entry.code);
            }
        }
        true
    }

    /// Remove every handler registered for a code.
    ///
    /// Returns the number of handlers removed.
    pub fn remove_code(&self, code: &str) -> usize {
        let mut state = self.state.lock();
        let Some(ids) = state.by_code.remove(code) else {
            return 0;
        };
        let count = ids.len();
        for id in ids {
            state.handlers.remove(id);
        }
        count
    }

    /// Publish a payload to every handler registered for `code`.
    ///
    /// Handlers run in registration order, outside the dispatcher lock.
    /// A code with no handlers is a no-op.
    #[tracing::instrument(skip(self, payload), target = "trellis_core::dispatcher", level = "trace")]
    pub fn notify(&self, code: &str, payload: &T) {
        let snapshot: Vec<Arc<dyn Fn(&T) + Send + Sync>> = {
            let state = self.state.lock();
            let Some(ids) = state.by_code.get(code) else {
                return;
            };
            ids.iter()
                .filter_map(|id| state.handlers.get(*id))
                .map(|entry| entry.handler.clone())
                .collect()
        };

        tracing::trace!(
            target: "trellis_core::dispatcher",
            code,
            handler_count = snapshot.len(),
            "dispatching notification"
        );

        for handler in snapshot {
            handler(payload);
        }
    }

    /// Number of handlers registered for a code.
    pub fn handler_count(&self, code: &str) -> usize {
        self.state
            .lock()
            .by_code
            .get(code)
            .map_or(0, |ids| ids.len())
    }

    /// Codes that currently have at least one handler.
    pub fn codes(&self) -> Vec<String> {
        self.state.lock().by_code.keys().cloned().collect()
    }

    /// Register a handler that is removed when the returned guard drops.
    pub fn register_scoped<F>(&self, code: impl Into<String>, handler: F) -> DispatcherGuard<'_, T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.register(code, handler);
        DispatcherGuard {
            dispatcher: self,
            id,
        }
    }
}

/// RAII guard that removes a dispatcher registration on drop.
///
/// Created via [`Dispatcher::register_scoped`].
pub struct DispatcherGuard<'a, T> {
    dispatcher: &'a Dispatcher<T>,
    id: SubscriptionId,
}

impl<T> DispatcherGuard<'_, T> {
    /// The token of the guarded registration.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl<T> Drop for DispatcherGuard<'_, T> {
    fn drop(&mut self) {
        let _ = self.dispatcher.remove(self.id);
    }
}
