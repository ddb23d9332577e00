//! Renderers, dispatched on the `--show` mode.

pub mod json;
pub mod markdown;
pub mod text;

use crate::parser::ParsedFile;
use crate::registry::Registry;
use clap::ValueEnum;

/// What to print for each file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Show {
    /// Symbol names
    Id,
    /// Symbol signatures
    Sig,
    /// File docs, then each signature with its doc comment
    SigDoc,
    /// Symbol bodies
    Body,
    /// Whole declarations
    Code,
    /// Markdown reference
    Md,
    /// Markdown reference including `_private` symbols
    MdWithPrivate,
    /// Same as `sig`
    All,
    /// Signatures with the lines they span
    Summary,
    /// Change-tracking JSON
    Json,
}

impl Show {
    pub fn is_markdown(self) -> bool {
        matches!(self, Show::Md | Show::MdWithPrivate)
    }
}

/// Per-file text output.
pub trait Renderer {
    fn render(&self, file: &ParsedFile, registry: &Registry) -> String;
}

/// Create the renderer for a non-JSON mode.
pub fn create_renderer(show: Show, id: Option<&str>, line_nums: bool) -> Box<dyn Renderer> {
    match show {
        Show::Md | Show::MdWithPrivate => Box::new(markdown::MarkdownRenderer {
            show_private: show == Show::MdWithPrivate,
        }),
        _ => Box::new(text::TextRenderer {
            show,
            id: id.map(str::to_string),
            line_nums,
        }),
    }
}
