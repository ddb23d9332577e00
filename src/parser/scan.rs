//! OpenSCAD item scanner: splits a whole file into top-level items.
//!
//! Alternatives are tried in a fixed priority order at each position:
//! comment, `use`, `include`, doc comment, function, module, value and finally
//! a catch-all command that runs to the next top-level `;`. The catch-all
//! always consumes at least one byte, so every byte of the input ends up in an
//! item or in the whitespace between two items.

use super::balanced::{identifier, keyword_at, scan_until, skip_ws};
use crate::model::{Item, ItemKind, Param, Span, Symbol, SymbolKind};

/// A string literal that is never closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexError {
    /// Offset of the opening quote
    pub offset: usize,
}

impl From<usize> for LexError {
    fn from(offset: usize) -> Self {
        LexError { offset }
    }
}

/// Scan `content` into items, attaching each doc comment to the symbol that
/// immediately follows it.
pub fn scan(content: &str) -> Result<Vec<Item>, LexError> {
    Ok(attach_docs(scan_raw(content)?))
}

/// First pass: every item as found, doc comments standalone.
pub fn scan_raw(content: &str) -> Result<Vec<Item>, LexError> {
    let bytes = content.as_bytes();
    let mut items = Vec::new();
    let mut pos = skip_ws(bytes, 0);
    while pos < bytes.len() {
        let item = scan_item(content, pos)?;
        debug_assert!(item.span.end > pos, "scanner must make progress");
        pos = skip_ws(bytes, item.span.end);
        items.push(item);
    }
    Ok(items)
}

/// Second pass: fold a doc comment into the symbol directly after it.
fn attach_docs(raw: Vec<Item>) -> Vec<Item> {
    let mut items = Vec::with_capacity(raw.len());
    let mut pending: Option<Item> = None;

    for mut item in raw {
        match item.kind {
            ItemKind::Symbol(ref mut sym) => {
                if let Some(doc) = pending.take() {
                    sym.doc = Some(doc.span);
                }
            }
            _ => {
                if let Some(doc) = pending.take() {
                    items.push(doc);
                }
            }
        }
        if item.kind == ItemKind::DocComment {
            pending = Some(item);
        } else {
            items.push(item);
        }
    }

    items.extend(pending);
    items
}

fn scan_item(text: &str, pos: usize) -> Result<Item, LexError> {
    let bytes = text.as_bytes();
    let rest = &bytes[pos..];

    if rest.starts_with(b"/*") {
        return Ok(block_comment(bytes, pos));
    }
    if rest.starts_with(b"//") {
        return Ok(item(pos..line_comments(bytes, pos), ItemKind::Comment));
    }
    if let Some(end) = directive(bytes, pos, "use") {
        return Ok(item(pos..end, ItemKind::Use));
    }
    if let Some(end) = directive(bytes, pos, "include") {
        return Ok(item(pos..end, ItemKind::Include));
    }
    if let Some(found) = function(text, pos)? {
        return Ok(found);
    }
    if let Some(found) = module(text, pos)? {
        return Ok(found);
    }
    if let Some(found) = value(text, pos)? {
        return Ok(found);
    }
    command(text, pos)
}

fn item(span: Span, kind: ItemKind) -> Item {
    Item { span, kind }
}

/// `/**/` and `/* */` are comments, `/** */` is a doc comment.
fn block_comment(bytes: &[u8], pos: usize) -> Item {
    if bytes[pos..].starts_with(b"/**/") {
        return item(pos..pos + 4, ItemKind::Comment);
    }
    let is_doc = bytes.get(pos + 2) == Some(&b'*');
    let search_from = if is_doc { pos + 3 } else { pos + 2 };
    match bytes[search_from..].windows(2).position(|w| w == b"*/") {
        Some(n) => {
            let kind = if is_doc {
                ItemKind::DocComment
            } else {
                ItemKind::Comment
            };
            item(pos..search_from + n + 2, kind)
        }
        None => item(pos..bytes.len(), ItemKind::Comment),
    }
}

/// Consecutive `//` lines, including the newline ending the last one.
fn line_comments(bytes: &[u8], pos: usize) -> usize {
    let mut start = pos;
    loop {
        let end = bytes[start..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(bytes.len(), |n| start + n + 1);
        let next = skip_ws(bytes, end);
        if bytes[next..].starts_with(b"//") {
            start = next;
        } else {
            return end;
        }
    }
}

/// `use <path>` / `include <path>`.
fn directive(bytes: &[u8], pos: usize, word: &str) -> Option<usize> {
    if !bytes[pos..].starts_with(word.as_bytes()) {
        return None;
    }
    let open = skip_ws(bytes, pos + word.len());
    if bytes.get(open) != Some(&b'<') {
        return None;
    }
    let len = bytes[open + 1..].iter().position(|&b| b == b'>')?;
    if len == 0 {
        return None;
    }
    Some(open + 1 + len + 1)
}

/// `function name(params) = body;`
fn function(text: &str, pos: usize) -> Result<Option<Item>, LexError> {
    let bytes = text.as_bytes();
    let Some((id, params, sig_end)) = callable_signature(text, pos, "function")? else {
        return Ok(None);
    };
    let eq = skip_ws(bytes, sig_end);
    if bytes.get(eq) != Some(&b'=') {
        return Ok(None);
    }
    let body_start = skip_ws(bytes, eq + 1);
    let end = scan_until(text, body_start, b";", true)?;
    if bytes.get(end) != Some(&b';') {
        return Ok(None);
    }
    Ok(Some(symbol_item(
        pos..end + 1,
        SymbolKind::Function,
        id,
        pos..sig_end,
        Some(params),
        body_start..end,
    )))
}

/// `module name(params) { body }`
fn module(text: &str, pos: usize) -> Result<Option<Item>, LexError> {
    let bytes = text.as_bytes();
    let Some((id, params, sig_end)) = callable_signature(text, pos, "module")? else {
        return Ok(None);
    };
    let open = skip_ws(bytes, sig_end);
    if bytes.get(open) != Some(&b'{') {
        return Ok(None);
    }
    let close = scan_until(text, open + 1, &[], true)?;
    if bytes.get(close) != Some(&b'}') {
        return Ok(None);
    }
    Ok(Some(symbol_item(
        pos..close + 1,
        SymbolKind::Module,
        id,
        pos..sig_end,
        Some(params),
        open + 1..close,
    )))
}

/// `name = body;`, capturing parameters when the body is a lambda literal.
fn value(text: &str, pos: usize) -> Result<Option<Item>, LexError> {
    let bytes = text.as_bytes();
    let Some(id_end) = identifier(bytes, pos) else {
        return Ok(None);
    };
    let eq = skip_ws(bytes, id_end);
    if bytes.get(eq) != Some(&b'=') {
        return Ok(None);
    }
    let body_start = skip_ws(bytes, eq + 1);
    let params = lambda_params(text, body_start)?;
    let end = scan_until(text, body_start, b";", true)?;
    if bytes.get(end) != Some(&b';') {
        return Ok(None);
    }
    Ok(Some(symbol_item(
        pos..end + 1,
        SymbolKind::Value,
        pos..id_end,
        pos..id_end,
        params,
        body_start..end,
    )))
}

fn lambda_params(text: &str, pos: usize) -> Result<Option<Vec<Param>>, LexError> {
    let bytes = text.as_bytes();
    if !keyword_at(bytes, pos, "function") {
        return Ok(None);
    }
    let open = skip_ws(bytes, pos + "function".len());
    if bytes.get(open) != Some(&b'(') {
        return Ok(None);
    }
    Ok(param_list(text, open)?.map(|(params, _)| params))
}

/// `<keyword> name (params)`; yields the id span, the parameters and the end
/// of the signature.
fn callable_signature(
    text: &str,
    pos: usize,
    keyword: &str,
) -> Result<Option<(Span, Vec<Param>, usize)>, LexError> {
    let bytes = text.as_bytes();
    if !keyword_at(bytes, pos, keyword) {
        return Ok(None);
    }
    let id_start = skip_ws(bytes, pos + keyword.len());
    if id_start == pos + keyword.len() {
        return Ok(None);
    }
    let Some(id_end) = identifier(bytes, id_start) else {
        return Ok(None);
    };
    let open = skip_ws(bytes, id_end);
    if bytes.get(open) != Some(&b'(') {
        return Ok(None);
    }
    Ok(param_list(text, open)?.map(|(params, end)| (id_start..id_end, params, end)))
}

/// Parse `(a, b = 1, c = [1, 2])` starting at the `(`.
///
/// `None` when the list isn't made of plain names with optional defaults.
fn param_list(text: &str, open: usize) -> Result<Option<(Vec<Param>, usize)>, LexError> {
    let bytes = text.as_bytes();
    let mut params = Vec::new();
    let mut i = open + 1;
    loop {
        i = skip_ws(bytes, i);
        if bytes.get(i) == Some(&b')') {
            return Ok(Some((params, i + 1)));
        }
        let Some(name_end) = identifier(bytes, i) else {
            return Ok(None);
        };
        let name = text[i..name_end].to_string();
        i = skip_ws(bytes, name_end);

        let mut default = String::new();
        if bytes.get(i) == Some(&b'=') {
            let start = skip_ws(bytes, i + 1);
            let end = scan_until(text, start, b",", true)?;
            default = text[start..end].trim_end().to_string();
            i = end;
        }
        params.push(Param { name, default });

        match bytes.get(i) {
            Some(b',') => i += 1,
            Some(b')') => return Ok(Some((params, i + 1))),
            _ => return Ok(None),
        }
    }
}

fn symbol_item(
    span: Span,
    kind: SymbolKind,
    id: Span,
    signature: Span,
    params: Option<Vec<Param>>,
    body: Span,
) -> Item {
    Item {
        span,
        kind: ItemKind::Symbol(Symbol {
            kind,
            id,
            signature,
            params,
            body,
            doc: None,
        }),
    }
}

/// Catch-all: up to and including the next top-level `;`.
///
/// Unmatched closing brackets are swallowed; text that never reaches a `;`
/// becomes an [`ItemKind::Unknown`].
fn command(text: &str, pos: usize) -> Result<Item, LexError> {
    let bytes = text.as_bytes();
    let mut i = pos;
    loop {
        i = scan_until(text, i, b";", true)?;
        match bytes.get(i) {
            Some(b';') => return Ok(item(pos..i + 1, ItemKind::Command)),
            Some(_) => i += 1,
            None => return Ok(item(pos..bytes.len(), ItemKind::Unknown)),
        }
    }
}
