//! # Sync scheduling
//!
//! The [`SyncScheduler`] drives the dashboard at a fixed rate. One tick:
//!
//! 1. For every widget in registration order, read its input slice and call
//!    `unpack_input`
//! 2. Call `pack_output` and write the result into the output buffer when its
//!    length matches the widget's declared output size
//! 3. Hand the full output buffer to the attached [`OutputSink`](crate::network::OutputSink)
//!
//! The tick is independent of network arrival; whatever the receive thread
//! wrote last is what the widgets see.

pub mod scheduler;

pub use scheduler::{StopHandle, SyncScheduler, TickReport};
