use crate::codec::f32_array;
use dashlink_core::DashboardWidget;

/// One polar vector plus a vertical component
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VectorState {
    /// Normalized length, 0.0 to 1.0
    pub radius: f32,
    /// Radians, clockwise from straight up
    pub angle: f32,
    /// Vertical component, -1.0 to 1.0
    pub z: f32,
}

impl VectorState {
    fn clamped(radius: f32, angle: f32, z: f32) -> Self {
        Self {
            radius: radius.clamp(0.0, 1.0),
            angle,
            z: z.clamp(-1.0, 1.0),
        }
    }

    /// Tip of the vector in unit-circle coordinates, y pointing up
    pub fn tip(&self) -> (f32, f32) {
        (self.angle.sin() * self.radius, self.angle.cos() * self.radius)
    }
}

/// Commanded versus actual thrust vector.
///
/// Input (24 bytes): six little-endian f32 values, command radius, angle
/// and z followed by actual radius, angle and z. No output.
#[derive(Debug, Clone, Default)]
pub struct VectorPlot {
    command: VectorState,
    actual: VectorState,
}

impl VectorPlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn command(&self) -> VectorState {
        self.command
    }

    pub fn actual(&self) -> VectorState {
        self.actual
    }
}

impl DashboardWidget for VectorPlot {
    fn name(&self) -> &'static str {
        "VectorPlot"
    }

    fn required_sizes(&self) -> (u32, u32) {
        (24, 0)
    }

    fn pack_output(&self) -> Vec<u8> {
        Vec::new()
    }

    fn unpack_input(&mut self, data: &[u8]) {
        let Some([cmd_r, cmd_a, cmd_z, act_r, act_a, act_z]) = f32_array::<6>(data) else {
            return;
        };
        self.command = VectorState::clamped(cmd_r, cmd_a, cmd_z);
        self.actual = VectorState::clamped(act_r, act_a, act_z);
    }
}
