// SPDX-License-Identifier: MIT OR Apache-2.0
//! The event capability trait.

use crate::error::{HandlerResult, Result};
use crate::event::EventId;
use crate::handlers::{EventHandlers, Handler, SubscriptionId};

/// Grants a type a fixed set of events it may fire and be subscribed to.
///
/// Implementors name their capability set in [`Evented::EVENTS`] and own an
/// [`EventHandlers`] table; everything else comes from the provided methods.
/// Constructors must call [`Evented::init_handlers`]; every other method
/// reports [`crate::EventError::NotInitialized`] until they do.
///
/// Dispatch is synchronous. A handler error aborts the remaining handlers of
/// that dispatch and is returned to whoever fired the event; handlers are not
/// isolated from each other.
pub trait Evented {
    /// Value passed to every handler
    type Payload;

    /// Capability set, fixed for the type
    const EVENTS: &'static [EventId];

    /// Handler table of this instance
    fn event_handlers(&self) -> &EventHandlers<Self::Payload>;

    /// Mutable handler table of this instance
    fn event_handlers_mut(&mut self) -> &mut EventHandlers<Self::Payload>;

    /// Short type name used in error reports
    fn owner_name() -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Allocate the subscriber lists for [`Evented::EVENTS`]
    fn init_handlers(&mut self) {
        self.event_handlers_mut().init(Self::EVENTS);
    }

    /// Subscribe a handler, returning its handle
    fn on<F>(&mut self, event: EventId, handler: F) -> Result<SubscriptionId>
    where
        F: FnMut(&Self::Payload) -> HandlerResult + 'static,
        Self: Sized,
    {
        self.on_boxed(event, Some(Box::new(handler)))
    }

    /// Subscribe a handler that may be missing, e.g. one looked up by name
    fn on_boxed(
        &mut self,
        event: EventId,
        handler: Option<Handler<Self::Payload>>,
    ) -> Result<SubscriptionId> {
        self.event_handlers_mut()
            .subscribe(Self::owner_name(), event, handler)
    }

    /// Fire an event at this instance
    fn fire(&mut self, event: EventId, payload: &Self::Payload) -> Result<()> {
        self.event_handlers_mut()
            .dispatch(Self::owner_name(), event, payload)
    }

    /// The whole capability set
    fn provided_events(&self) -> Result<&'static [EventId]> {
        if !self.event_handlers().is_initialized() {
            return Err(crate::EventError::NotInitialized {
                owner: Self::owner_name(),
            });
        }
        Ok(Self::EVENTS)
    }

    /// Whether the event is in the capability set
    fn provides(&self, event: EventId) -> Result<bool> {
        self.event_handlers().contains(Self::owner_name(), event)
    }

    /// Remove one subscription
    fn unbind(&mut self, event: EventId, subscription: SubscriptionId) -> Result<()> {
        self.event_handlers_mut()
            .unsubscribe(Self::owner_name(), event, subscription)
    }

    /// Drop every subscription of this instance; idempotent
    fn dispose_handlers(&mut self) -> Result<()> {
        self.event_handlers_mut().clear(Self::owner_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventError;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Beacon {
        handlers: EventHandlers<(i32, i32)>,
    }

    impl Beacon {
        fn new() -> Self {
            let mut beacon = Self {
                handlers: EventHandlers::new(),
            };
            beacon.init_handlers();
            beacon
        }
    }

    impl Evented for Beacon {
        type Payload = (i32, i32);
        const EVENTS: &'static [EventId] = &[EventId::Error, EventId::KeyDown];

        fn event_handlers(&self) -> &EventHandlers<Self::Payload> {
            &self.handlers
        }

        fn event_handlers_mut(&mut self) -> &mut EventHandlers<Self::Payload> {
            &mut self.handlers
        }
    }

    #[test]
    fn test_handler_receives_arguments_once() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let log = calls.clone();
        let mut beacon = Beacon::new();
        beacon
            .on(EventId::KeyDown, move |(a, b)| {
                log.borrow_mut().push((*a, *b));
                Ok(())
            })
            .unwrap();

        beacon.fire(EventId::KeyDown, &(3, 4)).unwrap();
        assert_eq!(*calls.borrow(), vec![(3, 4)]);
    }

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut beacon = Beacon::new();
        for tag in ["h1", "h2"] {
            let log = calls.clone();
            beacon
                .on(EventId::Error, move |(x, _)| {
                    log.borrow_mut().push(format!("{tag}({x})"));
                    Ok(())
                })
                .unwrap();
        }

        beacon.fire(EventId::Error, &(7, 0)).unwrap();
        assert_eq!(*calls.borrow(), vec!["h1(7)", "h2(7)"]);
    }

    #[test]
    fn test_same_handler_twice_is_not_deduplicated() {
        let count = Rc::new(RefCell::new(0));
        let mut beacon = Beacon::new();
        for _ in 0..2 {
            let count = count.clone();
            beacon
                .on(EventId::Error, move |_| {
                    *count.borrow_mut() += 1;
                    Ok(())
                })
                .unwrap();
        }
        beacon.fire(EventId::Error, &(0, 0)).unwrap();
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn test_unsupported_event_always_fails() {
        let mut beacon = Beacon::new();
        assert!(matches!(
            beacon.fire(EventId::MouseClick, &(0, 0)),
            Err(EventError::UnsupportedEvent { owner: "Beacon", .. })
        ));
        assert!(beacon.on(EventId::MouseClick, |_| Ok(())).is_err());
        assert!(!beacon.provides(EventId::MouseClick).unwrap());
        assert!(beacon.provides(EventId::Error).unwrap());
        assert_eq!(beacon.provided_events().unwrap(), Beacon::EVENTS);
    }

    #[test]
    fn test_failing_handler_aborts_dispatch() {
        let reached = Rc::new(RefCell::new(false));
        let flag = reached.clone();
        let mut beacon = Beacon::new();
        beacon
            .on(EventId::Error, |_| Err("boom".into()))
            .unwrap();
        beacon
            .on(EventId::Error, move |_| {
                *flag.borrow_mut() = true;
                Ok(())
            })
            .unwrap();

        let err = beacon.fire(EventId::Error, &(0, 0)).unwrap_err();
        assert!(matches!(err, EventError::Handler { event: EventId::Error, .. }));
        assert!(!*reached.borrow());
    }

    #[test]
    fn test_dispose_handlers_is_idempotent() {
        let mut beacon = Beacon::new();
        let id = beacon.on(EventId::Error, |_| Ok(())).unwrap();
        beacon.dispose_handlers().unwrap();
        beacon.dispose_handlers().unwrap();
        assert!(beacon.unbind(EventId::Error, id).is_err());
        // Capability set survives disposal
        assert!(beacon.provides(EventId::Error).unwrap());
    }

    #[test]
    fn test_missing_init_is_reported() {
        let mut beacon = Beacon {
            handlers: EventHandlers::new(),
        };
        assert!(matches!(
            beacon.fire(EventId::Error, &(0, 0)),
            Err(EventError::NotInitialized { .. })
        ));
        assert!(beacon.provided_events().is_err());
    }
}
