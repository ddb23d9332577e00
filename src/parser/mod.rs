//! Per-file pipeline: scan, parse docs, register and link.

pub mod balanced;
pub mod doc;
pub mod scan;

use crate::callchain;
use crate::diag::{Diagnostics, DocError, Location, Warning};
use crate::lines::LineIndex;
use crate::model::{DocModel, Item, ItemKind, Symbol, SymbolInfo};
use crate::registry::Registry;
use doc::DocContext;
use std::rc::Rc;

/// Everything known about one file once its docs are registered.
#[derive(Debug)]
pub struct ParsedFile {
    pub filename: String,
    pub content: String,
    pub lines: LineIndex,
    pub items: Vec<Item>,
    /// Doc of every doc comment and symbol, in item order
    pub docs: Vec<Rc<DocModel>>,
    /// Types first referenced while linking this file
    pub first_referenced: Vec<String>,
}

impl ParsedFile {
    pub fn slice(&self, span: &std::ops::Range<usize>) -> &str {
        &self.content[span.clone()]
    }
}

/// Run the whole core over one file, growing `registry`.
pub fn process_file(
    filename: &str,
    content: String,
    registry: &mut Registry,
    diags: &mut Diagnostics,
) -> Result<ParsedFile, DocError> {
    tracing::debug!("processing {}", filename);
    let content = normalize_newlines(content);
    let lines = LineIndex::new(&content);
    let items = scan::scan(&content).map_err(|e| DocError::Lex {
        loc: Location::new(filename, None, lines.lines(&(e.offset..e.offset + 1))),
    })?;
    let referenced_before = registry.referenced().len();

    let mut docs = Vec::new();
    for item in &items {
        let doc = match item.kind {
            ItemKind::DocComment => {
                let ctx = DocContext {
                    filename,
                    lines: lines.lines(&item.span),
                    symbol: None,
                };
                doc::parse(&content[item.span.clone()], &ctx, diags)?
            }
            ItemKind::Symbol(ref sym) => {
                let info = symbol_info(&content, sym);
                match sym.doc {
                    Some(ref span) => {
                        let ctx = DocContext {
                            filename,
                            lines: lines.lines(span),
                            symbol: Some(&info),
                        };
                        doc::parse(&content[span.clone()], &ctx, diags)?
                    }
                    None => {
                        let loc = Location::new(filename, Some(&info.name), lines.lines(&item.span));
                        doc::undocumented(info, loc)
                    }
                }
            }
            _ => continue,
        };

        let doc = Rc::new(doc);
        registry.register(&doc)?;
        link_doc(registry, &doc)?;
        docs.push(doc);
    }

    for doc in &docs {
        let derived = callchain::derive(registry, doc, None);
        if derived.is_ambiguous() {
            diags.warn(Warning::AmbiguousCurry {
                loc: doc.location.clone(),
                count: derived.generated,
            });
        }
    }

    let first_referenced = registry
        .referenced()
        .iter()
        .skip(referenced_before)
        .cloned()
        .collect();
    Ok(ParsedFile {
        filename: filename.to_string(),
        content,
        lines,
        items,
        docs,
        first_referenced,
    })
}

/// CRLF and lone CR line endings become `\n`.
fn normalize_newlines(content: String) -> String {
    if content.contains('\r') {
        content.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        content
    }
}

fn symbol_info(content: &str, sym: &Symbol) -> SymbolInfo {
    SymbolInfo {
        kind: sym.kind,
        name: content[sym.id.clone()].to_string(),
        signature: content[sym.signature.clone()].to_string(),
        params: sym.params.clone(),
    }
}

/// Check every type a doc mentions against the registry.
fn link_doc(registry: &mut Registry, doc: &DocModel) -> Result<(), DocError> {
    let exprs = doc
        .header_type()
        .into_iter()
        .chain(doc.slots().iter().map(|f| f.type_expr.as_str()))
        .chain(doc.params().iter().map(|f| f.type_expr.as_str()))
        .chain(doc.return_type());
    for expr in exprs.filter(|e| !e.trim().is_empty()) {
        registry.link(expr, &doc.location)?;
    }
    Ok(())
}
