use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Byte ranges assigned to one widget inside the shared buffers.
///
/// Produced once by [`DatastoreBuilder::register`](super::DatastoreBuilder::register)
/// and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WidgetDescriptor {
    pub input_offset: u32,
    pub input_size: u32,
    pub output_offset: u32,
    pub output_size: u32,
}

impl WidgetDescriptor {
    /// Input byte range `[offset, offset + size)`
    pub fn input_range(&self) -> Range<usize> {
        let start = self.input_offset as usize;
        start..start + self.input_size as usize
    }

    /// Output byte range `[offset, offset + size)`
    pub fn output_range(&self) -> Range<usize> {
        let start = self.output_offset as usize;
        start..start + self.output_size as usize
    }

    /// True when neither the input nor the output ranges intersect
    pub fn is_disjoint_from(&self, other: &WidgetDescriptor) -> bool {
        !ranges_overlap(&self.input_range(), &other.input_range())
            && !ranges_overlap(&self.output_range(), &other.output_range())
    }
}

// Empty ranges never overlap anything.
fn ranges_overlap(a: &Range<usize>, b: &Range<usize>) -> bool {
    !a.is_empty() && !b.is_empty() && a.start < b.end && b.start < a.end
}

/// One entry of the registration ledger: the widget's name and its descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub descriptor: WidgetDescriptor,
}
