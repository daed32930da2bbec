//! Lifecycle event hooks
//!
//! Parsing and conversion entry points emit these events so that
//! applications can observe or instrument them. Handlers receive the object
//! being processed as `&dyn Any`.

use std::any::Any;
use std::sync::LazyLock;

use crate::signals::{Dispatcher, ReceiverId};

/// Before a parsed document's root element is turned into bindings
pub const EVENT_BINDINGS_PRE_BUILD: &str = "bindings:pre:build";
/// After a parsed document's bindings are built
pub const EVENT_BINDINGS_POST_BUILD: &str = "bindings:post:build";
/// Before an entity is built from a binding object
pub const EVENT_API_PRE_FROM_OBJ: &str = "api:pre:from_obj";
/// After an entity is built from a binding object
pub const EVENT_API_POST_FROM_OBJ: &str = "api:post:from_obj";
/// Before an entity is converted to a binding object
pub const EVENT_API_PRE_TO_OBJ: &str = "api:pre:to_obj";
/// After an entity is converted to a binding object
pub const EVENT_API_POST_TO_OBJ: &str = "api:post:to_obj";
/// Before an entity is built from a dictionary
pub const EVENT_API_PRE_FROM_DICT: &str = "api:pre:from_dict";
/// After an entity is built from a dictionary
pub const EVENT_API_POST_FROM_DICT: &str = "api:post:from_dict";
/// Before an entity is converted to a dictionary
pub const EVENT_API_PRE_TO_DICT: &str = "api:pre:to_dict";
/// After an entity is converted to a dictionary
pub const EVENT_API_POST_TO_DICT: &str = "api:post:to_dict";

static EVENTS: LazyLock<Dispatcher> = LazyLock::new(Dispatcher::new);

/// Register a handler for an event.
pub fn register_handler<F>(event: &str, handler: F) -> ReceiverId
where
    F: Fn(&dyn Any) + Send + Sync + 'static,
{
    EVENTS.connect(event, handler)
}

/// Remove a handler. Returns whether it was registered.
pub fn unregister_handler(event: &str, id: ReceiverId) -> bool {
    EVENTS.disconnect(event, id)
}

/// Call every handler of `event`.
pub fn emit(event: &str, payload: &dyn Any) {
    EVENTS.emit(event, payload);
}

/// Number of handlers registered for `event`
pub fn handler_count(event: &str) -> usize {
    EVENTS.receiver_count(event)
}
