//! State-changed notifications between the model and its collaborators
//!
//! The data sheet and charts never publish on their own. Whoever mutates
//! them publishes one of these events afterwards, and subscribers pull the
//! fresh state they need from the model.

use std::any::{Any, TypeId};
use std::marker::PhantomData;
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;

/// Event bus shared by the collaborators of one session
pub struct EventBus {
    handlers: Arc<Mutex<AHashMap<TypeId, Vec<Box<dyn EventHandler>>>>>,
}

/// Anything that can travel over the bus
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
}

/// Receiver of events of the type it was subscribed for
pub trait EventHandler: Send + Sync {
    fn handle(&mut self, event: &dyn Event);
}

/// Common model events
pub mod events {
    use super::Event;
    use crate::ChartId;

    /// What kind of mutation a data sheet went through
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum DataChange {
        Imported,
        Updated,
        DesignsRemoved,
        ParameterRemoved,
        ParameterMoved,
        SelectionChanged,
        ClustersChanged,
    }

    /// The data sheet changed
    #[derive(Debug, Clone)]
    pub struct DataSheetChanged {
        pub change: DataChange,
        pub parameter_count: usize,
        pub design_count: usize,
    }

    /// Axis or filter state of a chart changed
    #[derive(Debug, Clone)]
    pub struct ChartChanged {
        pub chart_id: ChartId,
        pub visible_count: usize,
    }

    /// A saved session replaced the current state
    #[derive(Debug, Clone)]
    pub struct SessionRestored {
        pub chart_count: usize,
        pub design_count: usize,
    }

    macro_rules! impl_event {
        ($($t:ty),*) => {
            $(
                impl Event for $t {
                    fn as_any(&self) -> &dyn std::any::Any {
                        self
                    }
                }
            )*
        }
    }

    impl_event!(
        DataSheetChanged,
        ChartChanged,
        SessionRestored
    );
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(AHashMap::new())),
        }
    }

    /// Register a handler for events of type `E`
    pub fn subscribe<E: Event>(&self, handler: Box<dyn EventHandler>) {
        self.handlers
            .lock()
            .entry(TypeId::of::<E>())
            .or_default()
            .push(handler);
    }

    /// Register a closure that receives `E` already downcast
    pub fn on<E, F>(&self, f: F)
    where
        E: Event,
        F: FnMut(&E) + Send + Sync + 'static,
    {
        self.subscribe::<E>(Box::new(TypedHandler {
            handler: f,
            _event: PhantomData,
        }));
    }

    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.handlers
            .lock()
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    /// Deliver `event` to every handler of its type, in subscription order.
    ///
    /// Handlers run on the publishing thread while the bus is locked, so a
    /// handler must not publish or subscribe itself.
    pub fn publish<E: Event>(&self, event: E) {
        let mut handlers = self.handlers.lock();
        let Some(subscribed) = handlers.get_mut(&TypeId::of::<E>()) else {
            return;
        };
        tracing::trace!("Publishing event to {} handler(s)", subscribed.len());
        for handler in subscribed.iter_mut() {
            handler.handle(&event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Clones share one set of subscriptions
impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            handlers: Arc::clone(&self.handlers),
        }
    }
}

struct TypedHandler<E, F> {
    handler: F,
    _event: PhantomData<fn(&E)>,
}

impl<E, F> EventHandler for TypedHandler<E, F>
where
    E: Event,
    F: FnMut(&E) + Send + Sync,
{
    fn handle(&mut self, event: &dyn Event) {
        if let Some(event) = event.as_any().downcast_ref::<E>() {
            (self.handler)(event);
        }
    }
}
