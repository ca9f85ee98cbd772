use crate::codec::f32_array;
use dashlink_core::DashboardWidget;

/// Largest rudder deflection drawn, in radians (35 degrees)
pub const MAX_RUDDER_ANGLE: f32 = 35.0 * std::f32::consts::PI / 180.0;

/// Sweep used to draw [`MAX_RUDDER_ANGLE`], in radians (45 degrees)
const VISIBLE_SWEEP: f32 = std::f32::consts::FRAC_PI_4;

/// Commanded versus actual rudder angle and throttle.
///
/// Input (16 bytes): four little-endian f32 values, command angle, command
/// throttle, actual angle, actual throttle. No output.
///
/// Throttles are clamped to [-1, 1] on receipt. Angles are stored as received
/// and only limited for display.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RudderPlot {
    command_angle: f32,
    command_throttle: f32,
    actual_angle: f32,
    actual_throttle: f32,
}

impl RudderPlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw (command, actual) angles in radians
    pub fn angles(&self) -> (f32, f32) {
        (self.command_angle, self.actual_angle)
    }

    /// (command, actual) throttles, each in [-1, 1]
    pub fn throttles(&self) -> (f32, f32) {
        (self.command_throttle, self.actual_throttle)
    }

    /// (command, actual) angles limited to ±[`MAX_RUDDER_ANGLE`]
    pub fn display_angles(&self) -> (f32, f32) {
        (clamp_angle(self.command_angle), clamp_angle(self.actual_angle))
    }

    /// (command, actual) needle directions on the dial.
    ///
    /// The full rudder range spans ±45° of the dial, mirrored so that a
    /// positive rudder angle points left.
    pub fn needle_angles(&self) -> (f32, f32) {
        let (command, actual) = self.display_angles();
        let scale = |a: f32| -a / MAX_RUDDER_ANGLE * VISIBLE_SWEEP;
        (scale(command), scale(actual))
    }
}

fn clamp_angle(angle: f32) -> f32 {
    angle.clamp(-MAX_RUDDER_ANGLE, MAX_RUDDER_ANGLE)
}

impl DashboardWidget for RudderPlot {
    fn name(&self) -> &'static str {
        "RudderPlot"
    }

    fn required_sizes(&self) -> (u32, u32) {
        (16, 0)
    }

    fn pack_output(&self) -> Vec<u8> {
        Vec::new()
    }

    fn unpack_input(&mut self, data: &[u8]) {
        let Some([cmd_angle, cmd_throttle, act_angle, act_throttle]) = f32_array::<4>(data) else {
            return;
        };
        self.command_angle = cmd_angle;
        self.command_throttle = cmd_throttle.clamp(-1.0, 1.0);
        self.actual_angle = act_angle;
        self.actual_throttle = act_throttle.clamp(-1.0, 1.0);
    }
}
