use super::descriptor::Registration;
use crate::error::DashResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Exported description of one widget's place in the shared buffers.
///
/// This is what a remote peer needs to know out-of-band to build inbound
/// packets and to decode the headerless outbound datagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutRecord {
    pub name: String,
    pub input_offset: u32,
    pub input_size: u32,
    pub output_offset: u32,
    pub output_size: u32,
}

impl From<&Registration> for LayoutRecord {
    fn from(registration: &Registration) -> Self {
        let d = registration.descriptor;
        Self {
            name: registration.name.clone(),
            input_offset: d.input_offset,
            input_size: d.input_size,
            output_offset: d.output_offset,
            output_size: d.output_size,
        }
    }
}

/// Render layout records as JSON with 4-space indentation
pub fn layout_to_json(records: &[LayoutRecord]) -> DashResult<String> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    records.serialize(&mut serializer)?;
    String::from_utf8(out).map_err(|e| crate::error::DashError::Internal(e.to_string()))
}

/// Write layout records to `path`, creating parent directories as needed
pub fn write_layout(records: &[LayoutRecord], path: &Path) -> DashResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = layout_to_json(records)?;
    std::fs::write(path, json)?;
    log::info!("Wrote memory layout of {} widgets to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::WidgetDescriptor;

    #[test]
    fn test_record_from_registration() {
        let reg = Registration {
            name: "PushButton".to_string(),
            descriptor: WidgetDescriptor {
                input_offset: 0,
                input_size: 3,
                output_offset: 0,
                output_size: 1,
            },
        };
        let record = LayoutRecord::from(&reg);
        assert_eq!(record.name, "PushButton");
        assert_eq!(record.input_size, 3);
        assert_eq!(record.output_size, 1);
    }

    #[test]
    fn test_json_uses_four_space_indent() {
        let records = vec![LayoutRecord {
            name: "RudderPlot".to_string(),
            input_offset: 27,
            input_size: 16,
            output_offset: 1,
            output_size: 0,
        }];
        let json = layout_to_json(&records).unwrap();
        assert!(json.contains("\n    {"));
        assert!(json.contains("\"input_offset\": 27"));

        let parsed: Vec<LayoutRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, records);
    }
}
