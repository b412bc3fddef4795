//! Single-threaded event streams with explicit subscription handles.
//!
//! [`EventStream<T>`] keeps its subscribers as weak references. The strong
//! side lives in the [`Subscription`] returned by `subscribe`, so dropping
//! the handle disconnects the callback before the next event is fired.
//!
//! Firing an event from inside one of its own callbacks is allowed; it
//! simply nests. Subscribing from inside a callback takes effect for the
//! next event.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

/// Publish/subscribe channel for values of type `T`.
///
/// Cloning yields another handle to the same subscriber list.
///
/// # Example
///
/// ```
/// use media_viewer_core::EventStream;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let stream = EventStream::<u32>::new();
/// let seen = Rc::new(Cell::new(0));
///
/// let sink = seen.clone();
/// let subscription = stream.subscribe(move |value| sink.set(sink.get() + value));
///
/// stream.fire(&2);
/// drop(subscription);
/// stream.fire(&5);
///
/// assert_eq!(seen.get(), 2);
/// ```
pub struct EventStream<T> {
    subscribers: Rc<RefCell<Vec<CallbackWeak<T>>>>,
}

impl<T> Clone for EventStream<T> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Rc::clone(&self.subscribers),
        }
    }
}

impl<T> fmt::Debug for EventStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("subscriber_count", &self.subscribers.borrow().len())
            .finish()
    }
}

impl<T: 'static> Default for EventStream<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> EventStream<T> {
    pub fn new() -> Self {
        Self {
            subscribers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Register `callback` for every future event.
    ///
    /// The callback stays connected for as long as the returned
    /// [`Subscription`] is alive.
    #[must_use = "dropping the subscription disconnects the callback"]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        self.subscribers.borrow_mut().push(Rc::downgrade(&strong));
        Subscription {
            guard: Some(Box::new(strong)),
        }
    }

    /// Deliver `value` to every live subscriber in registration order.
    pub fn fire(&self, value: &T) {
        let callbacks: Vec<CallbackRc<T>> = {
            let mut subscribers = self.subscribers.borrow_mut();
            subscribers.retain(|weak| weak.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };

        for callback in callbacks {
            callback(value);
        }
    }

    /// Number of registered subscribers, including dropped ones that have not
    /// been pruned by a `fire` yet.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Whether at least one subscription is still alive.
    pub fn has_subscribers(&self) -> bool {
        self.subscribers
            .borrow()
            .iter()
            .any(|weak| weak.strong_count() > 0)
    }
}

/// Keeps a callback connected to an [`EventStream`]. Drop it (or call
/// [`Subscription::cancel`]) to disconnect.
#[derive(Default)]
pub struct Subscription {
    guard: Option<Box<dyn Any>>,
}

impl Subscription {
    /// Subscription that is connected to nothing.
    pub fn empty() -> Self {
        Self { guard: None }
    }

    /// Disconnect now.
    pub fn cancel(&mut self) {
        self.guard = None;
    }

    pub fn is_active(&self) -> bool {
        self.guard.is_some()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
