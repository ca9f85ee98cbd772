//! Declarative dashboard definitions
//!
//! A dashboard file is a regular dashlink config plus an ordered `widgets`
//! list. The list order is the memory layout, exactly as if the widgets had
//! been registered by hand.
//!
//! ```toml
//! [transport]
//! local_port = 11077
//!
//! [[widgets]]
//! type = "PushButton"
//! label = "Start"
//!
//! [[widgets]]
//! type = "NumericDisplayFloat32"
//! num_digits = 2
//! ```
use crate::numeric_display::DEFAULT_NUM_DIGITS;
use crate::{NumericDisplayFloat32, NumericDisplayInt32, PushButton, RudderPlot, VectorPlot};
use dashlink_core::config::{find_config_file, load_document};
use dashlink_core::{DashConfig, DashResult, DashboardWidget, SyncScheduler};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One widget entry of a dashboard definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WidgetSpec {
    PushButton {
        #[serde(default)]
        label: String,
    },
    VectorPlot,
    RudderPlot,
    NumericDisplayInt32,
    NumericDisplayFloat32 {
        #[serde(default = "default_num_digits")]
        num_digits: u32,
    },
}

fn default_num_digits() -> u32 {
    DEFAULT_NUM_DIGITS
}

impl WidgetSpec {
    pub fn build(&self) -> Box<dyn DashboardWidget> {
        match self {
            WidgetSpec::PushButton { label } => Box::new(PushButton::new(label.clone())),
            WidgetSpec::VectorPlot => Box::new(VectorPlot::new()),
            WidgetSpec::RudderPlot => Box::new(RudderPlot::new()),
            WidgetSpec::NumericDisplayInt32 => Box::new(NumericDisplayInt32::new()),
            WidgetSpec::NumericDisplayFloat32 { num_digits } => {
                Box::new(NumericDisplayFloat32::new(*num_digits))
            }
        }
    }
}

/// The reference dashboard: three buttons, both plots and both displays
pub fn default_dashboard() -> Vec<WidgetSpec> {
    let button = |n: u32| WidgetSpec::PushButton {
        label: format!("Button {}", n),
    };
    vec![
        button(1),
        button(2),
        button(3),
        WidgetSpec::VectorPlot,
        WidgetSpec::RudderPlot,
        WidgetSpec::NumericDisplayInt32,
        WidgetSpec::NumericDisplayFloat32 { num_digits: 2 },
    ]
}

/// Config and widget list loaded from one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardDefinition {
    #[serde(flatten)]
    pub config: DashConfig,

    #[serde(default = "default_dashboard")]
    pub widgets: Vec<WidgetSpec>,
}

impl Default for DashboardDefinition {
    fn default() -> Self {
        Self {
            config: DashConfig::default(),
            widgets: default_dashboard(),
        }
    }
}

impl DashboardDefinition {
    /// Load a dashboard from a TOML or YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> DashResult<Self> {
        let definition: Self = load_document(path)?;
        definition.config.validate()?;
        Ok(definition)
    }

    /// Load `dashlink.{toml,yaml,yml}` from `dir`, or the reference dashboard
    pub fn discover_in(dir: &Path) -> DashResult<Self> {
        match find_config_file(dir) {
            Some(path) => {
                log::info!("Loading dashboard from {}", path.display());
                Self::from_file(path)
            }
            None => {
                log::debug!("No dashboard file in {}, using defaults", dir.display());
                Ok(Self::default())
            }
        }
    }

    pub fn build_widgets(&self) -> Vec<Box<dyn DashboardWidget>> {
        self.widgets.iter().map(WidgetSpec::build).collect()
    }

    /// Register all widgets, in file order, with a scheduler using this config
    pub fn build_scheduler(&self) -> DashResult<SyncScheduler> {
        Ok(SyncScheduler::new(self.build_widgets())?.with_config(self.config.scheduler.clone()))
    }
}
