pub mod inject;
pub mod layout;
pub mod listen;
pub mod run;

use anyhow::Context;
use dashlink_core::DashConfig;
use dashlink_widgets::DashboardDefinition;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

/// Command line values that take precedence over the config file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub group: Option<Ipv4Addr>,
    pub local_port: Option<u16>,
    pub dest_port: Option<u16>,
    pub rate_hz: Option<f64>,
    pub layout_path: Option<PathBuf>,
    pub no_layout: bool,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut DashConfig) {
        if let Some(group) = self.group {
            config.transport.group = group;
        }
        if let Some(port) = self.local_port {
            config.transport.local_port = port;
        }
        if let Some(port) = self.dest_port {
            config.transport.dest_port = port;
        }
        if let Some(rate) = self.rate_hz {
            config.scheduler.rate_hz = rate;
        }
        if let Some(path) = &self.layout_path {
            config.layout.path = path.clone();
        }
        if self.no_layout {
            config.layout.enabled = false;
        }
    }
}

/// Load the dashboard from `path`, or discover it in the working directory,
/// then apply the overrides and validate the result.
pub fn load_definition(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> anyhow::Result<DashboardDefinition> {
    let mut definition = match path {
        Some(path) => DashboardDefinition::from_file(path)
            .with_context(|| format!("loading dashboard {}", path.display()))?,
        None => DashboardDefinition::discover_in(Path::new("."))
            .context("loading dashboard from the working directory")?,
    };
    overrides.apply(&mut definition.config);
    definition
        .config
        .validate()
        .context("invalid command line override")?;
    Ok(definition)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_only_given_values() {
        let mut config = DashConfig::default();
        let overrides = ConfigOverrides {
            dest_port: Some(12000),
            rate_hz: Some(30.0),
            no_layout: true,
            ..ConfigOverrides::default()
        };
        overrides.apply(&mut config);

        assert_eq!(config.transport.dest_port, 12000);
        assert_eq!(config.transport.local_port, 11077);
        assert_eq!(config.scheduler.rate_hz, 30.0);
        assert!(!config.layout.enabled);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dash.toml");
        std::fs::write(&path, "").unwrap();

        let overrides = ConfigOverrides {
            group: Some(Ipv4Addr::new(10, 0, 0, 1)),
            ..ConfigOverrides::default()
        };
        assert!(load_definition(Some(&path), &overrides).is_err());
    }
}
