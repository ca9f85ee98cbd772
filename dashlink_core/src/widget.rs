//! Widget contract consumed by the sync scheduler.
//!
//! Every dashboard widget reports how many bytes it needs in each buffer,
//! serializes its outgoing state and deserializes incoming state. Painting and
//! event handling stay with the GUI toolkit; the core only sees bytes.

use parking_lot::Mutex;
use std::sync::Arc;

/// Trait implemented by every dashboard widget.
///
/// # Example
///
/// ```
/// use dashlink_core::DashboardWidget;
///
/// struct Counter {
///     ticks: u8,
/// }
///
/// impl DashboardWidget for Counter {
///     fn name(&self) -> &'static str { "Counter" }
///
///     fn required_sizes(&self) -> (u32, u32) { (1, 1) }
///
///     fn pack_output(&self) -> Vec<u8> { vec![self.ticks] }
///
///     fn unpack_input(&mut self, data: &[u8]) {
///         if let [ticks] = data {
///             self.ticks = *ticks;
///         }
///     }
/// }
/// ```
pub trait DashboardWidget: Send {
    /// Widget type name, used in the exported layout
    fn name(&self) -> &'static str;

    /// `(input_size, output_size)` in bytes. Must not change after registration.
    fn required_sizes(&self) -> (u32, u32);

    /// Serialize the current output state.
    ///
    /// A result whose length differs from the declared output size is treated
    /// as "no output ready" and not written.
    fn pack_output(&self) -> Vec<u8>;

    /// Deserialize incoming state.
    ///
    /// Implementations ignore data whose length differs from the declared
    /// input size.
    fn unpack_input(&mut self, data: &[u8]);

    /// Called after each refresh so the owner can schedule a repaint
    fn on_refresh(&mut self) {}
}

impl<W: DashboardWidget + ?Sized> DashboardWidget for Box<W> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn required_sizes(&self) -> (u32, u32) {
        (**self).required_sizes()
    }

    fn pack_output(&self) -> Vec<u8> {
        (**self).pack_output()
    }

    fn unpack_input(&mut self, data: &[u8]) {
        (**self).unpack_input(data)
    }

    fn on_refresh(&mut self) {
        (**self).on_refresh()
    }
}

/// Widgets shared with a GUI thread are registered as `Arc<Mutex<W>>`; the
/// scheduler locks for the duration of one refresh call.
impl<W: DashboardWidget + ?Sized> DashboardWidget for Arc<Mutex<W>> {
    fn name(&self) -> &'static str {
        self.lock().name()
    }

    fn required_sizes(&self) -> (u32, u32) {
        self.lock().required_sizes()
    }

    fn pack_output(&self) -> Vec<u8> {
        self.lock().pack_output()
    }

    fn unpack_input(&mut self, data: &[u8]) {
        self.lock().unpack_input(data)
    }

    fn on_refresh(&mut self) {
        self.lock().on_refresh()
    }
}
