// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-instance handler storage.
//!
//! [`EventHandlers`] is the state half of the event capability: one ordered
//! subscriber list per event of the owning type, an optional default handler
//! per event, an optional catch-all pre-hook and a disabled flag. The owning
//! type exposes it through [`crate::Evented`].

use crate::error::{EventError, HandlerResult, Result};
use crate::event::EventId;
use indexmap::IndexMap;
use std::fmt;

/// A subscriber callback
pub type Handler<P> = Box<dyn FnMut(&P) -> HandlerResult>;

/// Catch-all hook run before any handler; returning `false` suppresses dispatch
pub type PreHook<P> = Box<dyn FnMut(EventId, &P) -> bool>;

/// Opaque handle to one subscription.
///
/// Handles are never reused by the table that issued them, so unbinding one
/// subscription never invalidates another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Get the raw handle value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handler table of one event-capable instance
pub struct EventHandlers<P> {
    /// Subscribers by event; `None` until initialized
    table: Option<IndexMap<EventId, Vec<(SubscriptionId, Handler<P>)>>>,
    /// Default handlers, run before subscribers
    defaults: IndexMap<EventId, Handler<P>>,
    pre_hook: Option<PreHook<P>>,
    disabled: bool,
    next_subscription: u64,
}

impl<P> EventHandlers<P> {
    /// Create an uninitialized table
    pub fn new() -> Self {
        Self {
            table: None,
            defaults: IndexMap::new(),
            pre_hook: None,
            disabled: false,
            next_subscription: 0,
        }
    }

    /// Set the default handler for an event (builder form)
    pub fn with_default<F>(mut self, event: EventId, handler: F) -> Self
    where
        F: FnMut(&P) -> HandlerResult + 'static,
    {
        self.set_default(event, handler);
        self
    }

    /// Set the catch-all pre-hook (builder form)
    pub fn with_pre_hook<F>(mut self, hook: F) -> Self
    where
        F: FnMut(EventId, &P) -> bool + 'static,
    {
        self.pre_hook = Some(Box::new(hook));
        self
    }

    /// Set the default handler for an event
    pub fn set_default<F>(&mut self, event: EventId, handler: F)
    where
        F: FnMut(&P) -> HandlerResult + 'static,
    {
        self.defaults.insert(event, Box::new(handler));
    }

    /// Allocate one empty subscriber list per event.
    ///
    /// Calling it again drops every existing subscription.
    pub fn init(&mut self, events: &[EventId]) {
        self.table = Some(events.iter().map(|e| (*e, Vec::new())).collect());
    }

    /// Whether [`Self::init`] was called
    pub fn is_initialized(&self) -> bool {
        self.table.is_some()
    }

    /// Disabled tables ignore every dispatch
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Is dispatch currently disabled
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Does the table accept this event
    pub fn contains(&self, owner: &'static str, event: EventId) -> Result<bool> {
        Ok(self.table(owner)?.contains_key(&event))
    }

    /// Number of subscribers for an event (0 when unsupported or uninitialized)
    pub fn subscriber_count(&self, event: EventId) -> usize {
        self.table
            .as_ref()
            .and_then(|t| t.get(&event))
            .map_or(0, Vec::len)
    }

    /// Append a subscriber
    pub fn subscribe(
        &mut self,
        owner: &'static str,
        event: EventId,
        handler: Option<Handler<P>>,
    ) -> Result<SubscriptionId> {
        let id = SubscriptionId(self.next_subscription);
        let list = self.list_mut(owner, event)?;
        let Some(handler) = handler else {
            return Err(EventError::InvalidHandler { event });
        };
        list.push((id, handler));
        self.next_subscription += 1;
        Ok(id)
    }

    /// Remove a subscriber by handle
    pub fn unsubscribe(
        &mut self,
        owner: &'static str,
        event: EventId,
        subscription: SubscriptionId,
    ) -> Result<()> {
        let list = self.list_mut(owner, event)?;
        match list.iter().position(|(id, _)| *id == subscription) {
            Some(index) => {
                drop(list.remove(index));
                Ok(())
            }
            None => Err(EventError::UnknownHandler {
                event,
                subscription: subscription.value(),
            }),
        }
    }

    /// Dispatch an event.
    ///
    /// Order: pre-hook, default handler, subscribers in subscription order.
    /// The first failing handler aborts the dispatch and its error is returned.
    pub fn dispatch(&mut self, owner: &'static str, event: EventId, payload: &P) -> Result<()> {
        // Checked before the disabled flag so misuse is reported even then.
        self.list_mut(owner, event)?;
        if self.disabled {
            return Ok(());
        }

        if let Some(hook) = self.pre_hook.as_mut() {
            if !hook(event, payload) {
                tracing::trace!(owner, %event, "dispatch suppressed by pre-hook");
                return Ok(());
            }
        }

        if let Some(default) = self.defaults.get_mut(&event) {
            default(payload).map_err(|source| EventError::Handler { event, source })?;
        }

        for (_, handler) in self.list_mut(owner, event)?.iter_mut() {
            handler(payload).map_err(|source| EventError::Handler { event, source })?;
        }

        Ok(())
    }

    /// Drop every subscriber, keeping the capability set
    pub fn clear(&mut self, owner: &'static str) -> Result<()> {
        let table = self
            .table
            .as_mut()
            .ok_or(EventError::NotInitialized { owner })?;
        for list in table.values_mut() {
            list.clear();
        }
        Ok(())
    }

    fn table(&self, owner: &'static str) -> Result<&IndexMap<EventId, Vec<(SubscriptionId, Handler<P>)>>> {
        self.table
            .as_ref()
            .ok_or(EventError::NotInitialized { owner })
    }

    fn list_mut(
        &mut self,
        owner: &'static str,
        event: EventId,
    ) -> Result<&mut Vec<(SubscriptionId, Handler<P>)>> {
        self.table
            .as_mut()
            .ok_or(EventError::NotInitialized { owner })?
            .get_mut(&event)
            .ok_or(EventError::UnsupportedEvent { event, owner })
    }
}

impl<P> Default for EventHandlers<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for EventHandlers<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Option<Vec<(EventId, usize)>> = self
            .table
            .as_ref()
            .map(|t| t.iter().map(|(e, l)| (*e, l.len())).collect());
        f.debug_struct("EventHandlers")
            .field("subscribers", &counts)
            .field("defaults", &self.defaults.keys().collect::<Vec<_>>())
            .field("pre_hook", &self.pre_hook.is_some())
            .field("disabled", &self.disabled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const OWNER: &str = "Test";

    fn table() -> EventHandlers<i32> {
        let mut handlers = EventHandlers::new();
        handlers.init(&[EventId::Error, EventId::Play]);
        handlers
    }

    #[test]
    fn test_uninitialized_table_rejects_everything() {
        let mut handlers = EventHandlers::<i32>::new();
        let err = handlers
            .subscribe(OWNER, EventId::Error, Some(Box::new(|_| Ok(()))))
            .unwrap_err();
        assert!(matches!(err, EventError::NotInitialized { .. }));
        assert!(matches!(
            handlers.dispatch(OWNER, EventId::Error, &1),
            Err(EventError::NotInitialized { .. })
        ));
        assert!(handlers.clear(OWNER).is_err());
    }

    #[test]
    fn test_missing_handler_is_invalid() {
        let mut handlers = table();
        let err = handlers.subscribe(OWNER, EventId::Play, None).unwrap_err();
        assert!(matches!(err, EventError::InvalidHandler { event: EventId::Play }));
    }

    #[test]
    fn test_subscription_ids_survive_unbinding() {
        let mut handlers = table();
        let a = handlers.subscribe(OWNER, EventId::Play, Some(Box::new(|_| Ok(())))).unwrap();
        let b = handlers.subscribe(OWNER, EventId::Play, Some(Box::new(|_| Ok(())))).unwrap();
        let c = handlers.subscribe(OWNER, EventId::Play, Some(Box::new(|_| Ok(())))).unwrap();

        handlers.unsubscribe(OWNER, EventId::Play, a).unwrap();
        // Later handles stay valid after an earlier removal
        handlers.unsubscribe(OWNER, EventId::Play, c).unwrap();
        assert_eq!(handlers.subscriber_count(EventId::Play), 1);

        let err = handlers.unsubscribe(OWNER, EventId::Play, a).unwrap_err();
        assert!(matches!(err, EventError::UnknownHandler { .. }));
        handlers.unsubscribe(OWNER, EventId::Play, b).unwrap();
    }

    #[test]
    fn test_pre_hook_suppresses_dispatch() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let mut handlers = EventHandlers::new().with_pre_hook(|_, value: &i32| *value > 0);
        handlers.init(&[EventId::Error]);
        handlers
            .subscribe(
                OWNER,
                EventId::Error,
                Some(Box::new(move |v| {
                    log.borrow_mut().push(*v);
                    Ok(())
                })),
            )
            .unwrap();

        handlers.dispatch(OWNER, EventId::Error, &-1).unwrap();
        handlers.dispatch(OWNER, EventId::Error, &2).unwrap();
        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn test_default_runs_before_subscribers() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let default_log = seen.clone();
        let mut handlers = EventHandlers::new().with_default(EventId::Play, move |_: &i32| {
            default_log.borrow_mut().push("default");
            Ok(())
        });
        handlers.init(&[EventId::Play]);
        let log = seen.clone();
        handlers
            .subscribe(
                OWNER,
                EventId::Play,
                Some(Box::new(move |_| {
                    log.borrow_mut().push("subscriber");
                    Ok(())
                })),
            )
            .unwrap();

        handlers.dispatch(OWNER, EventId::Play, &0).unwrap();
        assert_eq!(*seen.borrow(), vec!["default", "subscriber"]);
    }

    #[test]
    fn test_disabled_table_still_reports_misuse() {
        let mut handlers = table();
        handlers.set_disabled(true);
        assert!(handlers.dispatch(OWNER, EventId::Play, &0).is_ok());
        assert!(matches!(
            handlers.dispatch(OWNER, EventId::KeyUp, &0),
            Err(EventError::UnsupportedEvent { .. })
        ));
    }
}
