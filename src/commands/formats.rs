//! `formats`: list routed source extensions and target formats.

use batchconv_core::{FormatRegistry, TargetFormat};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};

/// A recognised source extension.
#[derive(Debug, Serialize, Tabled)]
struct SourceRow {
    #[tabled(rename = "Extension")]
    extension: String,
    #[tabled(rename = "Importer")]
    importer: String,
}

/// A selectable target format.
#[derive(Debug, Serialize, Tabled)]
struct TargetRow {
    #[tabled(rename = "Format")]
    format: String,
    #[tabled(rename = "Extension")]
    extension: String,
    #[tabled(rename = "Exporter")]
    exporter: String,
    #[tabled(rename = "Layout")]
    layout: String,
}

#[derive(Debug, Serialize)]
struct FormatsListing {
    sources: Vec<SourceRow>,
    targets: Vec<TargetRow>,
}

fn listing(registry: &FormatRegistry) -> FormatsListing {
    let sources = registry
        .import_entries()
        .into_iter()
        .map(|(ext, capability)| SourceRow {
            extension: format!(".{}", ext),
            importer: capability.to_string(),
        })
        .collect();

    let targets = TargetFormat::ALL
        .iter()
        .map(|&format| {
            let embedded = registry.export_spec_for(format, false);
            let separate = registry.export_spec_for(format, true);
            let layout = match (embedded.gltf_mode, separate.gltf_mode) {
                (Some(a), Some(b)) if a != b => format!("{} (--separate-textures: {})", a, b),
                (Some(a), _) => a.to_string(),
                (None, _) => "-".to_string(),
            };
            TargetRow {
                format: format.to_string(),
                extension: embedded.extension.to_string(),
                exporter: embedded.capability.to_string(),
                layout,
            }
        })
        .collect();

    FormatsListing { sources, targets }
}

/// Execute the formats command.
pub fn execute(format: OutputFormat) {
    let listing = listing(&FormatRegistry::new());

    match format {
        OutputFormat::Json => output::print_json(&listing),
        OutputFormat::Table => {
            output::print_heading("Source formats");
            output::print_list(&listing.sources, format);
            output::print_heading("Target formats");
            output::print_list(&listing.targets, format);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_covers_registry() {
        let listing = listing(&FormatRegistry::new());

        let extensions: Vec<&str> = listing.sources.iter().map(|r| r.extension.as_str()).collect();
        assert_eq!(extensions, vec![".fbx", ".glb", ".gltf", ".obj", ".stl"]);

        assert_eq!(listing.targets.len(), 4);
        let gltf = listing
            .targets
            .iter()
            .find(|r| r.format == "GLTF")
            .expect("gltf row");
        assert_eq!(gltf.extension, ".gltf");
        assert!(gltf.layout.contains("separate"));

        let fbx = listing
            .targets
            .iter()
            .find(|r| r.format == "FBX")
            .expect("fbx row");
        assert_eq!(fbx.layout, "-");
    }
}
