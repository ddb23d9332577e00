//! scaddoc: extract and cross-reference JSDoc-style documentation from
//! OpenSCAD sources.
//!
//! - **stdin mode**: `scaddoc < lib.scad`
//! - **file mode**: `scaddoc --show md --toc core.scad shapes/*.scad`
//!
//! Files are processed in argument order and share one registry, so a type
//! must be documented before anything uses it.

mod callchain;
mod diag;
mod lines;
mod model;
mod parser;
mod registry;
mod render;
mod toc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use diag::Diagnostics;
use parser::ParsedFile;
use registry::Registry;
use render::json;
use render::Show;
use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "scaddoc",
    about = "Extract and cross-reference documentation from OpenSCAD source files"
)]
struct Cli {
    /// Input files (glob patterns supported), in dependency order. If
    /// omitted, reads from stdin.
    files: Vec<String>,

    /// What to output
    #[arg(short = 's', long, value_enum, default_value_t = Show::SigDoc)]
    show: Show,

    /// Only show the symbol with this name
    #[arg(long)]
    id: Option<String>,

    /// Prefix source lines with their line number
    #[arg(short = 'n', long)]
    line_nums: bool,

    /// Write each file's output to `<file>.<EXT>`
    #[arg(long, value_name = "EXT")]
    write_to_files: Option<String>,

    /// Write all output to this file
    #[arg(long, value_name = "OUT")]
    write_to_file: Option<PathBuf>,

    /// Prepend a table of contents (markdown modes)
    #[arg(long)]
    toc: bool,
}

/// One input's text and modification time.
struct Input {
    name: String,
    content: String,
    mtime: SystemTime,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();
    validate(&cli)?;

    let inputs = read_inputs(&cli.files)?;
    let mut registry = Registry::default();
    let mut diags = Diagnostics::default();
    let mut parsed = Vec::with_capacity(inputs.len());
    for input in inputs {
        let file = parser::process_file(&input.name, input.content, &mut registry, &mut diags)?;
        parsed.push((file, input.mtime));
    }
    tracing::debug!(
        "{} files, {} types, {} warnings",
        parsed.len(),
        registry.types().count(),
        diags.warnings().len()
    );
    let unreferenced = registry.unreferenced_types();
    if !unreferenced.is_empty() {
        tracing::debug!("types never referenced: {}", unreferenced.join(", "));
    }

    if cli.show == Show::Json {
        json_output(&cli, &parsed)
    } else {
        text_output(&cli, &parsed, &registry)
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .without_time()
        .with_ansi(io::stderr().is_terminal())
        .init();
}

/// Reject flag combinations that can't work before reading anything.
fn validate(cli: &Cli) -> Result<()> {
    if cli.write_to_files.is_some() && cli.write_to_file.is_some() {
        bail!("--write-to-files and --write-to-file cannot be used together");
    }
    if let Some(ref ext) = cli.write_to_files {
        if ext.trim().is_empty() {
            bail!("--write-to-files needs a non-empty extension");
        }
        if cli.files.is_empty() {
            bail!("--write-to-files is invalid when reading from stdin");
        }
    }
    if cli.toc {
        if !cli.show.is_markdown() {
            bail!("--toc requires --show md or --show md-with-private");
        }
        if cli.write_to_files.is_some() {
            bail!("--toc cannot be used with --write-to-files");
        }
    }
    Ok(())
}

fn read_inputs(patterns: &[String]) -> Result<Vec<Input>> {
    if patterns.is_empty() {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("failed to read stdin")?;
        return Ok(vec![Input {
            name: "<stdin>".to_string(),
            content,
            mtime: SystemTime::now(),
        }]);
    }

    let mut inputs = Vec::new();
    for path in expand_globs(patterns)? {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mtime = fs::metadata(&path)
            .and_then(|m| m.modified())
            .with_context(|| format!("failed to stat {}", path.display()))?;
        inputs.push(Input {
            name: path.to_string_lossy().into_owned(),
            content,
            mtime,
        });
    }
    Ok(inputs)
}

/// Expand glob patterns into file paths.
///
/// Argument order is kept; only the matches of a single pattern are sorted.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        let mut matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            bail!("no files matched: {}", pattern);
        }
        matches.sort();
        files.extend(matches);
    }
    Ok(files)
}

fn text_output(cli: &Cli, parsed: &[(ParsedFile, SystemTime)], registry: &Registry) -> Result<()> {
    let renderer = render::create_renderer(cli.show, cli.id.as_deref(), cli.line_nums);

    if let Some(ref ext) = cli.write_to_files {
        for (file, _) in parsed {
            write_file(&format!("{}.{}", file.filename, ext), &renderer.render(file, registry))?;
        }
        return Ok(());
    }

    let mut text: String = parsed
        .iter()
        .map(|(file, _)| renderer.render(file, registry))
        .collect();
    if cli.toc {
        let toc = toc::generate(&text);
        if !toc.is_empty() {
            text = format!("## Table of Contents\n\n{}\n{}", toc, text);
        }
    }
    emit(cli.write_to_file.as_deref(), &text)
}

fn json_output(cli: &Cli, parsed: &[(ParsedFile, SystemTime)]) -> Result<()> {
    let tracks: Vec<json::Track> = parsed
        .iter()
        .enumerate()
        .map(|(order, (file, mtime))| json::track(file, order, *mtime))
        .collect();

    if let Some(ref ext) = cli.write_to_files {
        for (track, (file, _)) in tracks.iter().zip(parsed) {
            let text = serde_json::to_string_pretty(track).context("failed to serialize tracking data")?;
            write_file(&format!("{}.{}", file.filename, ext), &format!("{}\n", text))?;
        }
        return Ok(());
    }

    let full = json::merge(tracks)?;
    let text = serde_json::to_string_pretty(&full).context("failed to serialize tracking data")?;
    emit(cli.write_to_file.as_deref(), &format!("{}\n", text))
}

fn write_file(path: &str, text: &str) -> Result<()> {
    fs::write(path, text).with_context(|| format!("failed to write {}", path))
}

/// Write to `out` (truncating it) or to stdout.
fn emit(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        Some(path) => fs::write(path, text).with_context(|| format!("failed to write {}", path.display())),
        None => io::stdout()
            .lock()
            .write_all(text.as_bytes())
            .context("failed to write stdout"),
    }
}
