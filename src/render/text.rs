//! Plain text modes: ids, signatures, bodies, code, sig-doc and summary.

use super::{Renderer, Show};
use crate::model::{Item, ItemKind};
use crate::parser::ParsedFile;
use crate::registry::Registry;
use std::ops::Range;

pub struct TextRenderer {
    pub show: Show,
    /// Only show the symbol with this name
    pub id: Option<String>,
    pub line_nums: bool,
}

const NO_DOC: &str = "** NO DOCUMENT FOR SYMBOL **";

impl Renderer for TextRenderer {
    fn render(&self, file: &ParsedFile, _registry: &Registry) -> String {
        let width = (self.line_nums && self.show != Show::Summary)
            .then(|| file.lines.len().max(1).to_string().len());
        let mut out = Lines {
            file,
            width,
            lines: Vec::new(),
        };

        for item in file.items.iter().filter(|i| self.wanted(file, i)) {
            let symbol = item.symbol();
            match (self.show, symbol) {
                (Show::SigDoc, None) if item.kind == ItemKind::DocComment => out.slice(&item.span),
                (Show::SigDoc, Some(sym)) => {
                    out.text("");
                    out.slice(&sym.signature);
                    match sym.doc {
                        Some(ref doc) => out.slice(doc),
                        None => out.text(NO_DOC),
                    }
                }
                (Show::Summary, Some(sym)) => {
                    let lines = file.lines.lines(&item.span);
                    let sig = file.slice(&sym.signature);
                    if lines.start == lines.end {
                        out.text(&format!("{} (line {})", sig, lines.start));
                    } else {
                        out.text(&format!("{} (lines {}-{})", sig, lines.start, lines.end));
                    }
                }
                (Show::Id, Some(sym)) => out.slice(&sym.id),
                (Show::Sig | Show::All, Some(sym)) => out.slice(&sym.signature),
                (Show::Body, Some(sym)) => out.slice(&sym.body),
                (Show::Code, Some(_)) => out.slice(&item.span),
                _ => {}
            }
        }

        if out.lines.is_empty() {
            return String::new();
        }
        let mut text = out.lines.join("\n");
        text.push('\n');
        text
    }
}

impl TextRenderer {
    fn wanted(&self, file: &ParsedFile, item: &Item) -> bool {
        match self.id {
            None => true,
            Some(ref id) => item.symbol().is_some_and(|s| file.slice(&s.id) == id),
        }
    }
}

/// Output lines, optionally prefixed with right-aligned line numbers.
struct Lines<'a> {
    file: &'a ParsedFile,
    width: Option<usize>,
    lines: Vec<String>,
}

impl Lines<'_> {
    fn slice(&mut self, span: &Range<usize>) {
        let text = self.file.slice(span);
        let Some(width) = self.width else {
            self.lines.push(text.to_string());
            return;
        };
        let first = self.file.lines.line_of(span.start);
        for (i, line) in text.split('\n').enumerate() {
            self.lines.push(format!("{:>width$}: {}", first + i, line, width = width));
        }
    }

    fn text(&mut self, text: &str) {
        match self.width {
            Some(width) => self.lines.push(format!("{:>width$}  {}", "", text, width = width)),
            None => self.lines.push(text.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::Diagnostics;
    use crate::parser::process_file;

    const SRC: &str = "/** File notes */\n\
                       /** Adds.\n * @param a\n */\n\
                       function add(a) = a + 1;\n\
                       module box(s) {\n  cube(s);\n}\n";

    fn render(show: Show, id: Option<&str>, line_nums: bool) -> String {
        let mut registry = Registry::default();
        let file = process_file("a.scad", SRC.to_string(), &mut registry, &mut Diagnostics::default()).unwrap();
        TextRenderer {
            show,
            id: id.map(str::to_string),
            line_nums,
        }
        .render(&file, &registry)
    }

    #[test]
    fn ids_and_signatures() {
        assert_eq!(render(Show::Id, None, false), "add\nbox\n");
        assert_eq!(render(Show::Sig, None, false), "function add(a)\nmodule box(s)\n");
        assert_eq!(render(Show::All, None, false), render(Show::Sig, None, false));
    }

    #[test]
    fn bodies_and_code() {
        assert_eq!(render(Show::Body, Some("add"), false), "a + 1\n");
        assert_eq!(render(Show::Code, Some("box"), false), "module box(s) {\n  cube(s);\n}\n");
    }

    #[test]
    fn sig_doc() {
        let out = render(Show::SigDoc, None, false);
        assert_eq!(
            out,
            "/** File notes */\n\nfunction add(a)\n/** Adds.\n * @param a\n */\n\nmodule box(s)\n** NO DOCUMENT FOR SYMBOL **\n"
        );
    }

    #[test]
    fn summary_lines() {
        assert_eq!(
            render(Show::Summary, None, true),
            "function add(a) (line 5)\nmodule box(s) (lines 6-8)\n"
        );
    }

    #[test]
    fn line_numbers() {
        assert_eq!(render(Show::Code, Some("box"), true), "6: module box(s) {\n7:   cube(s);\n8: }\n");
        assert_eq!(
            render(Show::SigDoc, Some("box"), true),
            "   \n6: module box(s)\n   ** NO DOCUMENT FOR SYMBOL **\n"
        );
    }

    #[test]
    fn unknown_id_prints_nothing() {
        assert_eq!(render(Show::Id, Some("nope"), false), "");
    }
}
