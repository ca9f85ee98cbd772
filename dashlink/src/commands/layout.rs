use colored::*;
use dashlink_core::datastore::layout::layout_to_json;
use dashlink_core::LayoutRecord;
use dashlink_widgets::DashboardDefinition;
use std::path::Path;

/// Register the dashboard's widgets and export the resulting layout.
///
/// Writes to `output` when given, otherwise prints the JSON to stdout.
pub fn execute_layout(
    definition: &DashboardDefinition,
    output: Option<&Path>,
) -> anyhow::Result<Vec<LayoutRecord>> {
    let scheduler = definition.build_scheduler()?;
    let datastore = scheduler.datastore();
    let records = datastore.export_layout();

    match output {
        Some(path) => {
            datastore.write_layout_to_file(path)?;
            println!(
                "{} Wrote layout of {} widgets ({} input / {} output bytes) to {}",
                "✓".green(),
                records.len(),
                datastore.input_len(),
                datastore.output_len(),
                path.display().to_string().cyan()
            );
        }
        None => println!("{}", layout_to_json(&records)?),
    }
    Ok(records)
}
