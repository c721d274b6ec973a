//! CLI logic for the hfcanvas diagram tool.
//!
//! This module contains the core CLI logic: load a BPMN document, import it
//! into a [`Modeler`], fit the viewport and write the painted SVG.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{
    fmt::Write as _,
    fs,
    io::{self, Write as _},
};

use log::info;

use hfcanvas::{HfCanvasError, Modeler};

/// Run the hfcanvas CLI application
///
/// This function imports the input document, paints it and writes the
/// resulting SVG to the output file.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `HfCanvasError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Import errors
pub fn run(args: &Args) -> Result<(), HfCanvasError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing diagram"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let source = fs::read_to_string(&args.input)?;

    let mut modeler = Modeler::new(app_config)?;
    let warnings = modeler.import_xml(&source)?;
    info!(warnings = warnings.len(); "Document loaded");

    if !args.no_fit {
        let scale = modeler.fit_viewport();
        info!(scale; "Viewport fitted");
    }

    if args.list_palette {
        io::stdout()
            .lock()
            .write_all(format_palette(&modeler).as_bytes())?;
    }

    let svg = modeler.render_svg();
    fs::write(&args.output, svg)?;

    info!(output_file = args.output; "SVG exported successfully");

    Ok(())
}

/// One line per palette entry: id, group and title; separators as `---`.
pub fn format_palette(modeler: &Modeler) -> String {
    let mut out = String::new();
    for (id, entry) in modeler.palette_entries() {
        if entry.is_separator() {
            let _ = writeln!(out, "--- {}", entry.group());
            continue;
        }
        let title = entry.display_title().or(entry.title()).unwrap_or_default();
        let _ = writeln!(out, "{id:<28} {:<14} {title}", entry.group());
    }
    out
}

#[cfg(test)]
mod tests {
    use hfcanvas::config::AppConfig;

    use super::*;

    #[test]
    fn test_format_palette() {
        let modeler = Modeler::new(AppConfig::default()).unwrap();
        let listing = format_palette(&modeler);
        let lines: Vec<&str> = listing.lines().collect();

        assert_eq!(lines.len(), 28);
        assert!(lines[0].starts_with("messages-email"));
        assert!(lines[0].ends_with("Email"));
        assert_eq!(lines[5], "--- messages");
        assert!(lines[27].ends_with("Create Pool/Participant"));
    }
}
