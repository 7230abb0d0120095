// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed event capabilities for `OrdoPlay` animations.
//!
//! This crate provides the publish/subscribe contract shared by every
//! observable entity of the player:
//! - A closed registry of event identifiers
//! - Per-type capability sets fixed at compile time
//! - Ordered, per-instance handler tables
//! - Default handlers and a catch-all pre-hook
//!
//! ## Architecture
//!
//! A type becomes event-capable by owning an [`EventHandlers`] table and
//! implementing [`Evented`], which supplies `on`, `fire`, `provides`, `unbind`
//! and `dispose_handlers` on top of it.

pub mod error;
pub mod event;
pub mod evented;
pub mod handlers;

pub use error::{EventError, HandlerError, HandlerResult, Result};
pub use event::EventId;
pub use evented::Evented;
pub use handlers::{EventHandlers, Handler, PreHook, SubscriptionId};
