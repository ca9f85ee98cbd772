//! # Datastore
//!
//! Fixed-layout byte buffers shared between the widgets and the network.
//!
//! - **Input buffer**: written by the network receive thread, read by the sync
//!   tick. Guarded by one lock over the whole buffer.
//! - **Output buffer**: written and read only by the sync tick. It is handed out
//!   as a separate [`OutputBuffer`] value so only its owner can write it.
//!
//! Offsets are assigned once, in registration order, as a running sum of the
//! requested sizes. Nothing resizes either buffer after [`DatastoreBuilder::build`].
//!
//! ```
//! use dashlink_core::datastore::DatastoreBuilder;
//!
//! let mut builder = DatastoreBuilder::new();
//! let button = builder.register("PushButton", 3, 1).unwrap();
//! let plot = builder.register("VectorPlot", 24, 0).unwrap();
//! assert_eq!(plot.input_offset, 3);
//!
//! let (datastore, mut output) = builder.build();
//! datastore.write_input(button.input_offset, &[255, 0, 0]);
//! assert_eq!(datastore.read_input(0, 3), vec![255, 0, 0]);
//! output.write_output(button.output_offset, &[7]);
//! assert_eq!(output.get_output(), vec![7]);
//! ```

pub mod descriptor;
pub mod layout;

pub use descriptor::{Registration, WidgetDescriptor};
pub use layout::LayoutRecord;

use crate::error::{DashError, DashResult};
use parking_lot::Mutex;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

/// Clip `[offset, offset + requested)` to a buffer of `len` bytes.
///
/// Returns `None` when the start itself lies outside the buffer.
fn clipped_range(len: usize, offset: u32, requested: usize) -> Option<Range<usize>> {
    let start = offset as usize;
    if start >= len {
        return None;
    }
    let end = start.saturating_add(requested).min(len);
    Some(start..end)
}

/// Registration phase of a datastore.
///
/// Single-threaded by construction: registering needs `&mut self`, and the
/// builder is consumed by [`build`](Self::build) before any worker starts.
#[derive(Debug, Default)]
pub struct DatastoreBuilder {
    registrations: Vec<Registration>,
    input_size: u32,
    output_size: u32,
}

impl DatastoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate ledger capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            registrations: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Append a widget and reserve `input_size`/`output_size` bytes for it.
    ///
    /// Fails only if the cumulative size would no longer be addressable by a
    /// 32-bit offset.
    pub fn register(
        &mut self,
        name: &str,
        input_size: u32,
        output_size: u32,
    ) -> DashResult<WidgetDescriptor> {
        let next_input = self.input_size.checked_add(input_size).ok_or_else(|| {
            DashError::registration(format!(
                "input buffer overflow registering '{}' ({} bytes at offset {})",
                name, input_size, self.input_size
            ))
        })?;
        let next_output = self.output_size.checked_add(output_size).ok_or_else(|| {
            DashError::registration(format!(
                "output buffer overflow registering '{}' ({} bytes at offset {})",
                name, output_size, self.output_size
            ))
        })?;

        let descriptor = WidgetDescriptor {
            input_offset: self.input_size,
            input_size,
            output_offset: self.output_size,
            output_size,
        };
        self.input_size = next_input;
        self.output_size = next_output;
        self.registrations.push(Registration {
            name: name.to_string(),
            descriptor,
        });

        log::debug!(
            "Registered '{}': input {}+{} output {}+{}",
            name,
            descriptor.input_offset,
            input_size,
            descriptor.output_offset,
            output_size
        );
        Ok(descriptor)
    }

    /// Number of widgets registered so far
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Finish registration and allocate both buffers, zero-filled.
    pub fn build(self) -> (Arc<Datastore>, OutputBuffer) {
        let input_len = self.input_size as usize;
        let output_len = self.output_size as usize;
        log::info!(
            "Datastore ready: {} widgets, {} input bytes, {} output bytes",
            self.registrations.len(),
            input_len,
            output_len
        );

        let datastore = Datastore {
            input: Mutex::new(vec![0u8; input_len]),
            input_len,
            output_len,
            registrations: self.registrations,
        };
        let output = OutputBuffer {
            data: vec![0u8; output_len],
        };
        (Arc::new(datastore), output)
    }
}

/// Input side of the shared buffers plus the registration ledger.
///
/// Shared as `Arc<Datastore>` between the network worker and the scheduler.
#[derive(Debug)]
pub struct Datastore {
    input: Mutex<Vec<u8>>,
    input_len: usize,
    output_len: usize,
    registrations: Vec<Registration>,
}

impl Datastore {
    /// Copy `data` into the input buffer at `offset`, clipped to the buffer end.
    ///
    /// An offset outside the buffer is a silent no-op.
    pub fn write_input(&self, offset: u32, data: &[u8]) {
        let Some(range) = clipped_range(self.input_len, offset, data.len()) else {
            return;
        };
        let count = range.len();
        let mut input = self.input.lock();
        input[range].copy_from_slice(&data[..count]);
    }

    /// Snapshot of up to `length` bytes starting at `offset`.
    ///
    /// Empty when `offset` is outside the buffer.
    pub fn read_input(&self, offset: u32, length: u32) -> Vec<u8> {
        let Some(range) = clipped_range(self.input_len, offset, length as usize) else {
            return Vec::new();
        };
        let input = self.input.lock();
        input[range].to_vec()
    }

    /// Snapshot of the whole input buffer
    pub fn input_snapshot(&self) -> Vec<u8> {
        self.input.lock().clone()
    }

    pub fn input_len(&self) -> usize {
        self.input_len
    }

    pub fn output_len(&self) -> usize {
        self.output_len
    }

    /// Registered widgets in registration order
    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    /// Descriptors in registration order
    pub fn descriptors(&self) -> impl Iterator<Item = &WidgetDescriptor> {
        self.registrations.iter().map(|r| &r.descriptor)
    }

    /// Layout records in registration order
    pub fn export_layout(&self) -> Vec<LayoutRecord> {
        self.registrations.iter().map(LayoutRecord::from).collect()
    }

    /// Write the layout as JSON to `path`
    pub fn write_layout_to_file(&self, path: impl AsRef<Path>) -> DashResult<()> {
        layout::write_layout(&self.export_layout(), path.as_ref())
    }
}

/// Output side of the shared buffers.
///
/// There is exactly one per datastore. Writing needs `&mut self`, so only the
/// owner (the sync scheduler) can write, and a send can only read it under a
/// borrow the owner hands out.
#[derive(Debug)]
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    /// Copy `data` at `offset`, clipped; no-op when `offset` is out of range.
    pub fn write_output(&mut self, offset: u32, data: &[u8]) {
        let Some(range) = clipped_range(self.data.len(), offset, data.len()) else {
            return;
        };
        let count = range.len();
        self.data[range].copy_from_slice(&data[..count]);
    }

    /// Snapshot copy of the entire buffer
    pub fn get_output(&self) -> Vec<u8> {
        self.data.clone()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_layout() -> (Arc<Datastore>, OutputBuffer, Vec<WidgetDescriptor>) {
        let mut builder = DatastoreBuilder::new();
        let sizes = [(3, 1), (24, 0), (16, 0), (10, 0)];
        let descriptors = sizes
            .iter()
            .enumerate()
            .map(|(i, &(input, output))| {
                builder.register(&format!("widget{}", i), input, output).unwrap()
            })
            .collect();
        let (datastore, output) = builder.build();
        (datastore, output, descriptors)
    }

    #[test]
    fn test_layout_determinism() {
        let (datastore, output, descriptors) = reference_layout();
        let inputs: Vec<u32> = descriptors.iter().map(|d| d.input_offset).collect();
        let outputs: Vec<u32> = descriptors.iter().map(|d| d.output_offset).collect();
        assert_eq!(inputs, vec![0, 3, 27, 43]);
        assert_eq!(outputs, vec![0, 1, 1, 1]);
        assert_eq!(datastore.input_len(), 53);
        assert_eq!(datastore.output_len(), 1);
        assert_eq!(output.len(), 1);
    }

    #[test]
    fn test_no_overlap_invariant() {
        let (_, _, descriptors) = reference_layout();
        for (i, a) in descriptors.iter().enumerate() {
            for b in descriptors.iter().skip(i + 1) {
                assert!(a.is_disjoint_from(b), "{:?} overlaps {:?}", a, b);
                assert!(a.input_offset + a.input_size <= b.input_offset);
                assert!(a.output_offset + a.output_size <= b.output_offset);
            }
        }
    }

    #[test]
    fn test_buffers_start_zeroed() {
        let (datastore, output, _) = reference_layout();
        assert!(datastore.input_snapshot().iter().all(|&b| b == 0));
        assert!(output.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_write_input_clips_at_end() {
        let (datastore, _, _) = reference_layout();
        let len = datastore.input_len() as u32;
        datastore.write_input(len - 2, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(datastore.input_len(), 53);
        assert_eq!(datastore.read_input(len - 2, 10), vec![1, 2]);
        assert_eq!(datastore.read_input(len - 3, 1), vec![0]);
    }

    #[test]
    fn test_write_input_at_length_is_noop() {
        let (datastore, _, _) = reference_layout();
        let before = datastore.input_snapshot();
        datastore.write_input(datastore.input_len() as u32, &[0xFF; 4]);
        datastore.write_input(u32::MAX, &[0xFF; 4]);
        assert_eq!(datastore.input_snapshot(), before);
    }

    #[test]
    fn test_read_input_out_of_range_is_empty() {
        let (datastore, _, _) = reference_layout();
        assert!(datastore.read_input(53, 1).is_empty());
        assert!(datastore.read_input(u32::MAX, 4).is_empty());
        assert_eq!(datastore.read_input(50, 100).len(), 3);
    }

    #[test]
    fn test_empty_write_leaves_buffer_unchanged() {
        let (datastore, _, _) = reference_layout();
        datastore.write_input(0, &[9, 9, 9]);
        datastore.write_input(0, &[]);
        assert_eq!(datastore.read_input(0, 3), vec![9, 9, 9]);
    }

    #[test]
    fn test_write_output_clipping() {
        let mut builder = DatastoreBuilder::new();
        builder.register("a", 0, 2).unwrap();
        builder.register("b", 0, 2).unwrap();
        let (_, mut output) = builder.build();

        output.write_output(3, &[1, 2, 3]);
        assert_eq!(output.get_output(), vec![0, 0, 0, 1]);

        output.write_output(4, &[5]);
        assert_eq!(output.get_output(), vec![0, 0, 0, 1]);
    }

    #[test]
    fn test_export_layout_follows_registration_order() {
        let (datastore, _, _) = reference_layout();
        let layout = datastore.export_layout();
        let names: Vec<&str> = layout.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["widget0", "widget1", "widget2", "widget3"]);
        assert_eq!(layout[3].input_offset, 43);
        assert_eq!(layout[3].input_size, 10);
    }

    #[test]
    fn test_register_overflow_rejected() {
        let mut builder = DatastoreBuilder::new();
        builder.register("huge", u32::MAX, 0).unwrap();
        let err = builder.register("one_more", 1, 0).unwrap_err();
        assert!(matches!(err, DashError::Registration(_)));
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_empty_datastore() {
        let (datastore, output) = DatastoreBuilder::new().build();
        assert_eq!(datastore.input_len(), 0);
        assert!(output.is_empty());
        assert!(datastore.read_input(0, 1).is_empty());
        datastore.write_input(0, &[1]);
        assert!(datastore.export_layout().is_empty());
    }
}
