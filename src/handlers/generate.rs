use crate::{
    analyzer::formatter::{OutputFormat, format_report},
    config::types::Config,
    generator::{ComponentCatalog, ComponentSpec, RenderedSet},
    pipeline::Pipeline,
};
use serde_yaml::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Options of the `generate` subcommand.
pub struct GenerateOptions {
    pub component_type: String,
    pub name: String,
    pub namespace: Option<String>,
    pub overrides: Vec<(String, Value)>,
    pub output: Option<PathBuf>,
    pub dry_run: bool,
    pub force: bool,
    pub format: OutputFormat,
}

pub fn handle_generate(options: GenerateOptions, config: &Config) -> crate::Result<()> {
    let namespace = options
        .namespace
        .as_deref()
        .unwrap_or(&config.render.default_namespace);
    let mut spec = ComponentSpec::new(&options.component_type, &options.name, namespace)?;
    for (key, value) in options.overrides {
        spec = spec.with_override(key, value);
    }

    let report = Pipeline::from_config(ComponentCatalog::builtin(), config).run(&spec)?;
    print!("{}", format_report(&report, options.format));

    if options.dry_run {
        if options.format == OutputFormat::Table {
            for document in &report.documents {
                println!("\n--- {} (dry run) ---", document.filename);
                print!("{}", document.content);
            }
        }
        return Ok(());
    }

    let directory = options
        .output
        .unwrap_or_else(|| PathBuf::from(&config.output.directory));
    let overwrite = options.force || config.output.overwrite_existing;
    let written = write_documents(&report.documents, &directory, overwrite)?;

    if options.format == OutputFormat::Table {
        println!(
            "\n✅ Wrote {} file(s) to {}",
            written.len(),
            directory.display()
        );
    } else {
        log::info!("Wrote {} file(s) to {}", written.len(), directory.display());
    }
    Ok(())
}

/// Write every document into `directory`.
///
/// Existing files are only replaced with `overwrite`; otherwise nothing is
/// written at all.
pub fn write_documents(
    documents: &RenderedSet,
    directory: &Path,
    overwrite: bool,
) -> crate::Result<Vec<PathBuf>> {
    let targets: Vec<_> = documents
        .iter()
        .map(|document| (directory.join(&document.filename), document))
        .collect();

    if !overwrite {
        let existing: Vec<_> = targets
            .iter()
            .filter(|(path, _)| path.exists())
            .map(|(path, _)| path.display().to_string())
            .collect();
        if !existing.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!(
                    "refusing to overwrite {} (use --force): {}",
                    if existing.len() == 1 { "an existing file" } else { "existing files" },
                    existing.join(", ")
                ),
            )
            .into());
        }
    }

    fs::create_dir_all(directory)?;
    let mut written = Vec::with_capacity(targets.len());
    for (path, document) in targets {
        fs::write(&path, &document.content)?;
        log::debug!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
