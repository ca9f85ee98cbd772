//! # dashlink widgets
//!
//! State models of the standard dashboard widgets. Each one implements
//! [`DashboardWidget`](dashlink_core::DashboardWidget) with a fixed byte layout
//! and keeps whatever a renderer needs to draw it: colours, clamped values,
//! display text.
//!
//! | Widget                    | Input | Output |
//! |---------------------------|-------|--------|
//! | [`PushButton`]            | 3     | 1      |
//! | [`VectorPlot`]            | 24    | 0      |
//! | [`RudderPlot`]            | 16    | 0      |
//! | [`NumericDisplayInt32`]   | 10    | 0      |
//! | [`NumericDisplayFloat32`] | 10    | 0      |
//!
//! All multi-byte numbers are little-endian.

mod codec;
pub mod color;
pub mod dashboard;
pub mod numeric_display;
pub mod push_button;
pub mod rudder_plot;
pub mod vector_plot;

pub use codec::encode_f32s;
pub use color::Rgb;
pub use dashboard::{default_dashboard, DashboardDefinition, WidgetSpec};
pub use numeric_display::{DisplayStyle, NumericDisplayFloat32, NumericDisplayInt32};
pub use push_button::PushButton;
pub use rudder_plot::{RudderPlot, MAX_RUDDER_ANGLE};
pub use vector_plot::{VectorPlot, VectorState};
