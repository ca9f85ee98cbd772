use crate::config::SchedulerConfig;
use crate::datastore::{Datastore, DatastoreBuilder, OutputBuffer, WidgetDescriptor};
use crate::error::{DashError, DashResult};
use crate::network::OutputSink;
use crate::widget::DashboardWidget;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;

/// Widget plus the byte ranges it was assigned
struct RegisteredWidget {
    widget: Box<dyn DashboardWidget>,
    descriptor: WidgetDescriptor,
    skipped_outputs: u64,
}

/// Outcome of one sync tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Widgets refreshed
    pub widgets: usize,
    /// Outputs written into the output buffer
    pub outputs_written: usize,
    /// Outputs skipped because the packed length did not match
    pub outputs_skipped: usize,
    /// Whether the output buffer was handed to a sink
    pub sent: bool,
}

/// Cloneable handle that stops a running scheduler from another thread
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        !self.running.load(Ordering::Acquire)
    }
}

/// Fixed-rate driver of the dashboard synchronization cycle.
///
/// Owns the widgets in registration order and the datastore's output buffer.
/// Each [`tick`](Self::tick) refreshes every widget from the input buffer,
/// writes their packed output and hands the full output buffer to the sink.
pub struct SyncScheduler {
    widgets: Vec<RegisteredWidget>,
    datastore: Arc<Datastore>,
    output: OutputBuffer,
    sink: Option<Box<dyn OutputSink>>,
    running: Arc<AtomicBool>,
    config: SchedulerConfig,
    tick_count: u64,
    scheduler_name: String,
}

impl SyncScheduler {
    /// Register `widgets` in the given order and allocate the datastore.
    ///
    /// The order of this list is the memory layout shared with the remote peer.
    pub fn new(widgets: Vec<Box<dyn DashboardWidget>>) -> DashResult<Self> {
        let mut builder = DatastoreBuilder::with_capacity(widgets.len());
        let mut registered = Vec::with_capacity(widgets.len());

        for widget in widgets {
            let (input_size, output_size) = widget.required_sizes();
            let descriptor = builder.register(widget.name(), input_size, output_size)?;
            registered.push(RegisteredWidget {
                widget,
                descriptor,
                skipped_outputs: 0,
            });
        }

        let (datastore, output) = builder.build();
        Ok(Self {
            widgets: registered,
            datastore,
            output,
            sink: None,
            running: Arc::new(AtomicBool::new(true)),
            config: SchedulerConfig::default(),
            tick_count: 0,
            scheduler_name: "SyncScheduler".to_string(),
        })
    }

    /// Apply scheduler settings (builder pattern)
    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach the sink that receives the output buffer after each tick
    pub fn with_sink(mut self, sink: impl OutputSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Set scheduler name (for logging)
    pub fn with_name(mut self, name: &str) -> Self {
        self.scheduler_name = name.to_string();
        self
    }

    pub fn set_sink(&mut self, sink: Box<dyn OutputSink>) -> &mut Self {
        self.sink = Some(sink);
        self
    }

    /// Shared handle to the datastore, for the network transport
    pub fn datastore(&self) -> Arc<Datastore> {
        Arc::clone(&self.datastore)
    }

    /// Read-only view of the output buffer
    pub fn output(&self) -> &OutputBuffer {
        &self.output
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn widget_count(&self) -> usize {
        self.widgets.len()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Descriptors in registration order
    pub fn descriptors(&self) -> Vec<WidgetDescriptor> {
        self.widgets.iter().map(|w| w.descriptor).collect()
    }

    /// Times each widget's output was skipped, by widget name
    pub fn skipped_outputs(&self) -> Vec<(&'static str, u64)> {
        self.widgets
            .iter()
            .map(|w| (w.widget.name(), w.skipped_outputs))
            .collect()
    }

    /// Run one synchronization cycle.
    ///
    /// Widgets are processed in registration order; a widget whose packed
    /// output has the wrong length keeps its previous output bytes. Exactly
    /// one send happens at the end when a sink is attached.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport {
            widgets: self.widgets.len(),
            ..TickReport::default()
        };

        for entry in self.widgets.iter_mut() {
            let descriptor = entry.descriptor;
            let input = self
                .datastore
                .read_input(descriptor.input_offset, descriptor.input_size);
            entry.widget.unpack_input(&input);

            let packed = entry.widget.pack_output();
            if packed.len() == descriptor.output_size as usize {
                self.output.write_output(descriptor.output_offset, &packed);
                report.outputs_written += 1;
            } else {
                entry.skipped_outputs += 1;
                report.outputs_skipped += 1;
                log::debug!(
                    "'{}' packed {} bytes, expected {}; keeping previous output",
                    entry.widget.name(),
                    packed.len(),
                    descriptor.output_size
                );
            }
            entry.widget.on_refresh();
        }

        if let Some(sink) = &self.sink {
            sink.send_output(&self.output);
            report.sent = true;
        }

        self.tick_count += 1;
        report
    }

    /// Check if the scheduler is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop the current run. A later `run`/`run_for` starts ticking again.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            running: Arc::clone(&self.running),
        }
    }

    /// Tick at the configured rate until stopped or Ctrl+C
    pub fn run(&mut self) -> DashResult<()> {
        let handle = self.stop_handle();
        if let Err(e) = ctrlc::set_handler(move || {
            log::info!("Ctrl+C received, stopping sync scheduler");
            handle.stop();
        }) {
            log::warn!("Failed to set signal handler: {}", e);
        }
        self.run_loop(None)
    }

    /// Tick at the configured rate for `duration`, or until stopped
    pub fn run_for(&mut self, duration: Duration) -> DashResult<()> {
        self.run_loop(Some(duration))
    }

    fn run_loop(&mut self, duration: Option<Duration>) -> DashResult<()> {
        self.config.validate()?;
        self.running.store(true, Ordering::Release);
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| DashError::Internal(format!("Failed to create tokio runtime: {}", e)))?;

        let period = self.config.period();
        log::info!(
            "Scheduler '{}' running {} widgets every {:?}",
            self.scheduler_name,
            self.widgets.len(),
            period
        );

        rt.block_on(async {
            let start_time = Instant::now();
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            while self.is_running() {
                if let Some(max_duration) = duration {
                    if start_time.elapsed() >= max_duration {
                        log::debug!("Scheduler reached time limit of {:?}", max_duration);
                        break;
                    }
                }
                interval.tick().await;
                self.tick();
            }
        });

        log::info!(
            "Scheduler '{}' stopped after {} ticks",
            self.scheduler_name,
            self.tick_count
        );
        Ok(())
    }
}

impl std::fmt::Debug for SyncScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncScheduler")
            .field("name", &self.scheduler_name)
            .field("widgets", &self.widgets.len())
            .field("tick_count", &self.tick_count)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::RecordingSink;

    /// Widget with configurable sizes that echoes its first input byte
    struct EchoWidget {
        input_size: u32,
        output_size: u32,
        last_input: Vec<u8>,
        packed_len: Option<usize>,
    }

    impl EchoWidget {
        fn new(input_size: u32, output_size: u32) -> Self {
            Self {
                input_size,
                output_size,
                last_input: Vec::new(),
                packed_len: None,
            }
        }
    }

    impl DashboardWidget for EchoWidget {
        fn name(&self) -> &'static str {
            "Echo"
        }

        fn required_sizes(&self) -> (u32, u32) {
            (self.input_size, self.output_size)
        }

        fn pack_output(&self) -> Vec<u8> {
            let len = self.packed_len.unwrap_or(self.output_size as usize);
            let fill = self.last_input.first().copied().unwrap_or(0).wrapping_add(1);
            vec![fill; len]
        }

        fn unpack_input(&mut self, data: &[u8]) {
            if data.len() != self.input_size as usize {
                return;
            }
            self.last_input = data.to_vec();
        }
    }

    #[test]
    fn test_registration_order_defines_layout() {
        let scheduler = SyncScheduler::new(vec![
            Box::new(EchoWidget::new(3, 1)),
            Box::new(EchoWidget::new(24, 0)),
            Box::new(EchoWidget::new(16, 0)),
            Box::new(EchoWidget::new(10, 0)),
        ])
        .unwrap();

        let offsets: Vec<(u32, u32)> = scheduler
            .descriptors()
            .iter()
            .map(|d| (d.input_offset, d.output_offset))
            .collect();
        assert_eq!(offsets, vec![(0, 0), (3, 1), (27, 1), (43, 1)]);
        assert_eq!(scheduler.datastore().input_len(), 53);
        assert_eq!(scheduler.output().len(), 1);
    }

    #[test]
    fn test_tick_packs_outputs_and_sends_once() {
        let sink = RecordingSink::new();
        let mut scheduler = SyncScheduler::new(vec![
            Box::new(EchoWidget::new(1, 2)),
            Box::new(EchoWidget::new(1, 1)),
        ])
        .unwrap()
        .with_sink(sink.clone());

        scheduler.datastore().write_input(0, &[4, 9]);
        let report = scheduler.tick();

        assert_eq!(report.widgets, 2);
        assert_eq!(report.outputs_written, 2);
        assert!(report.sent);
        assert_eq!(sink.count(), 1);
        assert_eq!(sink.last().unwrap(), vec![5, 5, 10]);
    }

    #[test]
    fn test_wrong_length_output_keeps_stale_bytes() {
        let mut oversized = EchoWidget::new(1, 2);
        oversized.packed_len = Some(3);
        let sink = RecordingSink::new();
        let mut scheduler = SyncScheduler::new(vec![Box::new(EchoWidget::new(1, 1)), Box::new(oversized)])
            .unwrap()
            .with_sink(sink.clone());

        scheduler.datastore().write_input(0, &[1]);
        let report = scheduler.tick();

        assert_eq!(report.outputs_written, 1);
        assert_eq!(report.outputs_skipped, 1);
        assert_eq!(sink.last().unwrap(), vec![2, 0, 0]);
        assert_eq!(scheduler.skipped_outputs()[1].1, 1);
    }

    #[test]
    fn test_tick_without_sink() {
        let mut scheduler = SyncScheduler::new(vec![Box::new(EchoWidget::new(0, 1))]).unwrap();
        let report = scheduler.tick();
        assert!(!report.sent);
        assert_eq!(scheduler.output().as_bytes(), &[1]);
        assert_eq!(scheduler.tick_count(), 1);
    }

    #[test]
    fn test_run_for_ticks_repeatedly() {
        let sink = RecordingSink::new();
        let mut scheduler = SyncScheduler::new(vec![Box::new(EchoWidget::new(1, 1))])
            .unwrap()
            .with_config(SchedulerConfig::with_rate(200.0))
            .with_sink(sink.clone());

        scheduler.run_for(Duration::from_millis(100)).unwrap();
        assert!(scheduler.tick_count() >= 2);
        assert_eq!(sink.count() as u64, scheduler.tick_count());
    }

    #[test]
    fn test_stop_handle_ends_run() {
        let mut scheduler = SyncScheduler::new(vec![Box::new(EchoWidget::new(1, 1))])
            .unwrap()
            .with_config(SchedulerConfig::with_rate(100.0));
        let handle = scheduler.stop_handle();

        let stopper = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            handle.stop();
        });

        let started = Instant::now();
        scheduler.run_for(Duration::from_secs(10)).unwrap();
        stopper.join().unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_run_after_stop_ticks_again() {
        let sink = RecordingSink::new();
        let mut scheduler = SyncScheduler::new(vec![Box::new(EchoWidget::new(1, 1))])
            .unwrap()
            .with_config(SchedulerConfig::with_rate(200.0))
            .with_sink(sink.clone());

        scheduler.stop();
        assert!(!scheduler.is_running());

        scheduler.run_for(Duration::from_millis(50)).unwrap();
        assert!(scheduler.tick_count() >= 1);
        assert_eq!(sink.count() as u64, scheduler.tick_count());

        let handle = scheduler.stop_handle();
        handle.stop();
        let before = scheduler.tick_count();
        scheduler.run_for(Duration::from_millis(50)).unwrap();
        assert!(scheduler.tick_count() > before);
        assert!(!handle.is_stopped());
    }

    #[test]
    fn test_run_rejects_invalid_rate() {
        let mut scheduler = SyncScheduler::new(Vec::new())
            .unwrap()
            .with_config(SchedulerConfig::with_rate(0.0));
        assert!(scheduler.run_for(Duration::from_millis(10)).is_err());
        assert_eq!(scheduler.tick_count(), 0);
    }
}
