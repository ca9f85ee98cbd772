//! # dashlink core
//!
//! GUI-free core of a real-time telemetry/control dashboard. Widgets mirror and
//! drive the state of a remote control loop through a fixed-layout pair of
//! byte buffers that a UDP multicast transport keeps in sync with the peer.
//!
//! - **Datastore**: input/output buffers with offsets assigned in registration order
//! - **Widget contract**: sizes, `pack_output`, `unpack_input`
//! - **Network**: multicast receive thread plus one-datagram-per-tick sends
//! - **Scheduling**: fixed-rate sync tick tying the two together
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dashlink_core::{DashConfig, DashboardWidget, MulticastTransport, SyncScheduler};
//! use std::sync::Arc;
//!
//! struct Gauge {
//!     value: f32,
//! }
//!
//! impl DashboardWidget for Gauge {
//!     fn name(&self) -> &'static str { "Gauge" }
//!     fn required_sizes(&self) -> (u32, u32) { (4, 0) }
//!     fn pack_output(&self) -> Vec<u8> { Vec::new() }
//!     fn unpack_input(&mut self, data: &[u8]) {
//!         if let Ok(bytes) = <[u8; 4]>::try_from(data) {
//!             self.value = f32::from_le_bytes(bytes);
//!         }
//!     }
//! }
//!
//! let config = DashConfig::default();
//! let scheduler = SyncScheduler::new(vec![Box::new(Gauge { value: 0.0 })]).unwrap();
//! let transport = Arc::new(MulticastTransport::new(
//!     config.transport.clone(),
//!     scheduler.datastore(),
//! ));
//! transport.start();
//! let mut scheduler = scheduler
//!     .with_config(config.scheduler.clone())
//!     .with_sink(Arc::clone(&transport));
//! scheduler.run().unwrap();
//! transport.stop();
//! ```

pub mod config;
pub mod datastore;
pub mod error;
pub mod network;
pub mod scheduling;
pub mod widget;

// Re-export commonly used types for easy access
pub use config::{DashConfig, LayoutConfig, SchedulerConfig, TransportConfig};
pub use datastore::{Datastore, DatastoreBuilder, LayoutRecord, OutputBuffer, WidgetDescriptor};
pub use error::{DashError, DashResult};
pub use network::{InboundPacket, MulticastTransport, OutputSink, TransportState};
pub use scheduling::{StopHandle, SyncScheduler, TickReport};
pub use widget::DashboardWidget;
