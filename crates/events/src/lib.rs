//! Notification plumbing for the dashboard.
//!
//! Quantity edits and cache invalidations are announced on an explicit bus
//! instead of a process-wide toast queue. Callers own the bus and hand it to
//! whichever component needs to publish.

pub mod bus;
pub mod in_memory_bus;
pub mod notification;

pub use bus::{EventBus, Subscription};
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use notification::{Notification, NotificationKind, QuantityChange, Toast};
