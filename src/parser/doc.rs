//! JSDoc-style doc comment grammar.
//!
//! The tags must appear in this order, each step optional unless noted:
//!
//! ```text
//! @type {T} | @typedef {T}? id | @callback id      header, first line only
//! @callchain text ...                             contiguous run
//! free text                                       up to the next tag
//! @slot ...                                       one or more, or
//! @param ... then @returns                        zero or more, then one
//! ```
//!
//! Each rule is a method on [`Grammar`] that consumes whole lines. A tag is
//! only recognized at the start of a line.

use super::balanced::{identifier, scan_until, skip_blanks};
use crate::diag::{Diagnostics, DocError, Location, Warning};
use crate::lines::LinePair;
use crate::model::*;
use regex::Regex;
use std::sync::LazyLock;

/// Leading `/**`, the ` * ` gutter of every line and the trailing ` */`.
static RE_DOC_BOX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^/\*\*[ \t]*\r?\n?|^[ \t]*\*(?:[ \t]*\r?$|[ \t])|[ \t]*\*/\r?\n?").unwrap()
});

const TAGS: &[&str] = &[
    "type",
    "typedef",
    "callback",
    "callchain",
    "slot",
    "param",
    "returns",
];

/// What a doc comment is attached to.
#[derive(Debug, Clone, Copy)]
pub struct DocContext<'a> {
    pub filename: &'a str,
    /// Lines of the doc comment itself
    pub lines: LinePair,
    pub symbol: Option<&'a SymbolInfo>,
}

impl DocContext<'_> {
    fn location(&self, symbol: Option<&str>) -> Location {
        Location::new(self.filename, symbol, self.lines)
    }
}

/// Remove the comment box around a `/** ... */` doc.
pub fn strip_box(raw: &str) -> String {
    RE_DOC_BOX.replace_all(raw, "").into_owned()
}

/// Parse a raw `/** ... */` comment into a [`DocModel`].
pub fn parse(raw: &str, ctx: &DocContext, diags: &mut Diagnostics) -> Result<DocModel, DocError> {
    let text = strip_box(raw);
    let symbol_name = ctx.symbol.map(|s| s.name.as_str());
    let mut loc = ctx.location(symbol_name);

    let mut grammar = Grammar::new(&text);
    let structural = |loc: &Location, detail: String| DocError::StructuralGrammar {
        loc: loc.clone(),
        detail,
    };

    let header = grammar.header().map_err(|d| structural(&loc, d))?;
    if let Some(ref h) = header {
        if !h.id.is_empty() {
            loc.symbol = Some(h.id.clone());
        }
    }
    let callchains = grammar
        .callchains(header.is_some())
        .map_err(|d| structural(&loc, d))?;
    let description = grammar.block();
    let body = grammar
        .body(!callchains.is_empty())
        .map_err(|d| structural(&loc, d))?;
    grammar.finish().map_err(|d| structural(&loc, d))?;

    let returns_typed = matches!(
        body,
        DocBody::Callable { returns: Some(ref r), .. } if !r.type_expr.is_empty()
    );
    if !callchains.is_empty() && !returns_typed {
        return Err(DocError::MissingTypedReturns { loc });
    }

    let kind = match (&header, ctx.symbol) {
        (Some(h), None) if h.tag == HeaderTag::Type => {
            return Err(structural(&loc, "@type must document a symbol".to_string()));
        }
        (Some(h), _) => h.tag.kind(),
        (None, Some(_)) => DocKind::Documented,
        (None, None) => {
            if !callchains.is_empty() || body != DocBody::default() {
                return Err(structural(
                    &loc,
                    "a doc without a header tag or a symbol can only hold a description"
                        .to_string(),
                ));
            }
            DocKind::File
        }
    };

    let id = match header {
        Some(ref h) if !h.id.is_empty() => Some(h.id.clone()),
        _ => symbol_name.map(str::to_string),
    };

    let doc = DocModel {
        id,
        kind,
        header,
        callchains,
        descriptions: if description.is_empty() {
            Vec::new()
        } else {
            vec![description]
        },
        body,
        symbol: ctx.symbol.cloned(),
        location: loc,
    };

    if let Some(symbol) = ctx.symbol {
        check_params(&doc, symbol, diags)?;
    }
    Ok(doc)
}

/// Model for a symbol declared without a doc comment.
pub fn undocumented(symbol: SymbolInfo, location: Location) -> DocModel {
    DocModel {
        id: Some(symbol.name.clone()),
        kind: DocKind::Undocumented,
        header: None,
        callchains: Vec::new(),
        descriptions: Vec::new(),
        body: DocBody::default(),
        symbol: Some(symbol),
        location,
    }
}

/// Compare documented parameter names against the declaration.
fn check_params(doc: &DocModel, symbol: &SymbolInfo, diags: &mut Diagnostics) -> Result<(), DocError> {
    let Some(ref declared) = symbol.params else {
        return Ok(());
    };
    let documented = doc.params();

    if documented.len() > declared.len() && !declared.is_empty() {
        return Err(DocError::OverDocumentedParams {
            loc: doc.location.clone(),
            documented: documented.len(),
            declared: declared.len(),
        });
    }

    for (position, (doc_param, decl_param)) in documented.iter().zip(declared).enumerate() {
        if doc_param.id != decl_param.name {
            return Err(DocError::ParamMismatch {
                loc: doc.location.clone(),
                position,
                declared: decl_param.name.clone(),
                documented: doc_param.id.clone(),
            });
        }
    }

    if documented.len() < declared.len() {
        diags.warn(Warning::UnderDocumentedParams {
            loc: doc.location.clone(),
            documented: documented.len(),
            declared: declared.len(),
        });
    }
    Ok(())
}

/// Tag name if `line` starts with a recognized tag.
fn tag_of(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('@')?;
    let end = rest.find([' ', '\t']).unwrap_or(rest.len());
    let tag = &rest[..end];
    TAGS.contains(&tag).then_some(tag)
}

/// Text after `@tag`, which must be followed by a blank or the end of line.
fn after_tag<'a>(line: &'a str, tag: &str) -> &'a str {
    &line[1 + tag.len()..]
}

/// Optional `{T}` at the start of `rest`; yields the type and what follows.
fn type_opt(rest: &str) -> Result<(String, &str), String> {
    if !rest.starts_with('{') {
        return Ok((String::new(), rest));
    }
    let end = scan_until(rest, 1, &[], false)
        .map_err(|_| format!("unterminated string in type `{}`", rest))?;
    if rest.as_bytes().get(end) != Some(&b'}') {
        return Err(format!("unbalanced type braces in `{}`", rest));
    }
    Ok((rest[1..end].trim().to_string(), &rest[end + 1..]))
}

fn require_blank(rest: &str, tag: &str) -> Result<(), String> {
    match rest.as_bytes().first() {
        Some(b' ' | b'\t') => Ok(()),
        None if tag == "returns" => Ok(()),
        _ => Err(format!("@{} must be followed by a blank", tag)),
    }
}

fn expect_eol(rest: &str, tag: &str) -> Result<(), String> {
    if rest.trim().is_empty() {
        Ok(())
    } else {
        Err(format!("unexpected text `{}` after @{}", rest.trim(), tag))
    }
}

/// Line-oriented cursor over the stripped doc text.
struct Grammar<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> Grammar<'a> {
    fn new(text: &'a str) -> Self {
        let mut lines: Vec<&str> = text.split('\n').map(|l| l.trim_end_matches('\r')).collect();
        if lines.last() == Some(&"") {
            lines.pop();
        }
        Grammar { lines, pos: 0 }
    }

    fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    fn peek_tag(&self) -> Option<&'a str> {
        self.peek().and_then(tag_of)
    }

    fn is_blank(&self, at: usize) -> bool {
        self.lines.get(at).is_some_and(|l| l.trim().is_empty())
    }

    /// `@type {T}`, `@typedef {T}? id` or `@callback id`, first line only.
    fn header(&mut self) -> Result<Option<Header>, String> {
        let Some(line) = self.peek() else {
            return Ok(None);
        };
        let tag = match tag_of(line) {
            Some(t @ ("type" | "typedef" | "callback")) => t,
            _ => return Ok(None),
        };
        let rest = after_tag(line, tag);
        require_blank(rest, tag)?;
        let rest = rest.trim_start();

        let header = match tag {
            "type" => {
                let (type_expr, rest) = type_opt(rest)?;
                if type_expr.is_empty() {
                    return Err("@type requires a {type}".to_string());
                }
                expect_eol(rest, tag)?;
                Header {
                    tag: HeaderTag::Type,
                    type_expr,
                    id: String::new(),
                }
            }
            "typedef" => {
                let (type_expr, rest) = type_opt(rest)?;
                let (id, rest) = header_id(rest.trim_start(), tag)?;
                expect_eol(rest, tag)?;
                Header {
                    tag: HeaderTag::Typedef,
                    type_expr,
                    id,
                }
            }
            _ => {
                if rest.starts_with('{') {
                    return Err("@callback does not take a {type}".to_string());
                }
                let (id, rest) = header_id(rest, tag)?;
                expect_eol(rest, tag)?;
                Header {
                    tag: HeaderTag::Callback,
                    type_expr: String::new(),
                    id,
                }
            }
        };
        self.pos += 1;
        Ok(Some(header))
    }

    /// Contiguous `@callchain` lines.
    ///
    /// After a header exactly one blank line must come before the run, and a
    /// blank line must always close it.
    fn callchains(&mut self, after_header: bool) -> Result<Vec<String>, String> {
        if after_header && self.peek_tag() == Some("callchain") {
            return Err("a blank line must separate the header from @callchain".to_string());
        }
        let start = if after_header && self.is_blank(self.pos) {
            self.pos + 1
        } else {
            self.pos
        };
        let first_is_chain = self
            .lines
            .get(start)
            .and_then(|l| tag_of(l))
            .is_some_and(|t| t == "callchain");
        if !first_is_chain {
            return Ok(Vec::new());
        }

        self.pos = start;
        let mut chains = Vec::new();
        while self.peek_tag() == Some("callchain") {
            let line = self.peek().unwrap_or_default();
            let rest = after_tag(line, "callchain");
            require_blank(rest, "callchain")?;
            let text = rest.trim();
            if text.starts_with('{') {
                return Err("@callchain does not take a {type}".to_string());
            }
            chains.push(text.to_string());
            self.pos += 1;
        }

        match self.peek() {
            None => {}
            Some(l) if l.trim().is_empty() => self.pos += 1,
            Some(l) => {
                return Err(format!(
                    "a blank line must follow the last @callchain, found `{}`",
                    l
                ))
            }
        }
        Ok(chains)
    }

    /// Lines up to the next tag, without leading or trailing blank lines.
    fn block(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some() && self.peek_tag().is_none() {
            self.pos += 1;
        }
        let mut lines = &self.lines[start..self.pos];
        while lines.first().is_some_and(|l| l.trim().is_empty()) {
            lines = &lines[1..];
        }
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines = &lines[..lines.len() - 1];
        }
        lines.join("\n")
    }

    /// One or more `@slot`, or `@param`s then an optional `@returns`.
    fn body(&mut self, has_callchains: bool) -> Result<DocBody, String> {
        if self.peek_tag() == Some("slot") {
            if has_callchains {
                return Err("@slot cannot be used with @callchain".to_string());
            }
            let mut slots = Vec::new();
            while self.peek_tag() == Some("slot") {
                slots.push(self.field("slot")?);
            }
            return Ok(DocBody::Slots(slots));
        }

        let mut params = Vec::new();
        while self.peek_tag() == Some("param") {
            params.push(self.field("param")?);
        }
        let returns = if self.peek_tag() == Some("returns") {
            Some(self.returns()?)
        } else {
            None
        };
        Ok(DocBody::Callable { params, returns })
    }

    /// `@slot {T}? id` / `@param {T}? id`, then its description.
    fn field(&mut self, tag: &str) -> Result<Field, String> {
        let line = self.peek().unwrap_or_default();
        let rest = after_tag(line, tag);
        require_blank(rest, tag)?;
        let (type_expr, rest) = type_opt(rest.trim_start())?;
        let rest = rest.trim_start();

        let (id, optional, default, rest) = field_id(rest, tag == "slot")?;
        self.pos += 1;
        let desc = join_desc(rest, self.block());
        Ok(Field {
            type_expr,
            id,
            optional,
            default,
            desc,
        })
    }

    /// `@returns {T}?` and its description.
    fn returns(&mut self) -> Result<Returns, String> {
        let line = self.peek().unwrap_or_default();
        let rest = after_tag(line, "returns");
        require_blank(rest, "returns")?;
        let (type_expr, rest) = type_opt(rest.trim_start())?;
        self.pos += 1;
        let desc = join_desc(rest, self.block());
        Ok(Returns { type_expr, desc })
    }

    /// Anything left over didn't fit the grammar.
    fn finish(&self) -> Result<(), String> {
        match self.peek() {
            None => Ok(()),
            Some(line) => Err(format!(
                "parsing stopped at doc line {}: `{}`",
                self.pos + 1,
                line
            )),
        }
    }
}

/// Header identifier followed by the rest of the line.
fn header_id<'a>(rest: &'a str, tag: &str) -> Result<(String, &'a str), String> {
    match identifier(rest.as_bytes(), 0) {
        Some(end) => Ok((rest[..end].to_string(), &rest[end..])),
        None => Err(format!("@{} requires an identifier", tag)),
    }
}

/// `name`, `[name]` or `[name = default]`; slots may also use an index.
fn field_id(rest: &str, allow_index: bool) -> Result<(String, bool, Option<String>, &str), String> {
    let bytes = rest.as_bytes();
    let name_end = |at: usize| {
        identifier(bytes, at).or_else(|| {
            let digits = bytes[at..].iter().take_while(|b| b.is_ascii_digit()).count();
            (allow_index && digits > 0).then_some(at + digits)
        })
    };

    if bytes.first() != Some(&b'[') {
        let end = name_end(0).ok_or_else(|| format!("expected an id, found `{}`", rest))?;
        return Ok((rest[..end].to_string(), false, None, trailing_text(&rest[end..])?));
    }

    let start = skip_blanks(bytes, 1);
    let end = name_end(start).ok_or_else(|| format!("expected an id, found `{}`", rest))?;
    let name = rest[start..end].to_string();
    let mut i = skip_blanks(bytes, end);
    let mut default = None;
    if bytes.get(i) == Some(&b'=') {
        let from = skip_blanks(bytes, i + 1);
        let to = scan_until(rest, from, b":,", false)
            .map_err(|_| format!("unterminated string in default of `{}`", name))?;
        default = Some(rest[from..to].trim().to_string());
        i = skip_blanks(bytes, to);
    }
    if bytes.get(i) != Some(&b']') {
        return Err(format!("expected `]` closing optional `{}`", name));
    }
    Ok((name, true, default, trailing_text(&rest[i + 1..])?))
}

/// Same-line description after an id; must be separated by a blank.
fn trailing_text(rest: &str) -> Result<&str, String> {
    match rest.as_bytes().first() {
        None => Ok(""),
        Some(b' ' | b'\t') => {
            let text = rest.trim();
            Ok(text.strip_prefix("- ").unwrap_or(text))
        }
        _ => Err(format!("unexpected text `{}` after id", rest)),
    }
}

fn join_desc(first_line: &str, block: String) -> String {
    let first_line = first_line.trim();
    match (first_line.is_empty(), block.is_empty()) {
        (true, _) => block,
        (false, true) => first_line.to_string(),
        (false, false) => format!("{}\n{}", first_line, block),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(symbol: Option<&'a SymbolInfo>) -> DocContext<'a> {
        DocContext {
            filename: "test.scad",
            lines: LinePair { start: 1, end: 1 },
            symbol,
        }
    }

    fn func(name: &str, params: &[&str]) -> SymbolInfo {
        SymbolInfo {
            kind: SymbolKind::Function,
            name: name.to_string(),
            signature: format!("function {}({})", name, params.join(", ")),
            params: Some(
                params
                    .iter()
                    .map(|p| Param {
                        name: p.to_string(),
                        default: String::new(),
                    })
                    .collect(),
            ),
        }
    }

    fn parse_text(text: &str, symbol: Option<&SymbolInfo>) -> Result<DocModel, DocError> {
        let mut diags = Diagnostics::default();
        parse(&format!("/**\n{}\n */", text), &ctx(symbol), &mut diags)
    }

    #[test]
    fn strips_comment_box() {
        let raw = "/**\n * Title\n *\n * @param {number} a\n *   first\n */";
        assert_eq!(strip_box(raw), "Title\n\n@param {number} a\n  first\n");
        assert_eq!(strip_box("/** #### Does bar */"), "#### Does bar");
    }

    #[test]
    fn crlf_gutter_lines_are_blank() {
        let raw = "/**\r\n * @callback Cb\r\n *\r\n * @callchain Cb(a) : number\r\n *\r\n * @param a\r\n * @returns {number}\r\n */";
        assert_eq!(strip_box(raw).lines().filter(|l| l.trim().is_empty()).count(), 2);

        let mut diags = Diagnostics::default();
        let doc = parse(raw, &ctx(None), &mut diags).unwrap();
        assert_eq!(doc.kind, DocKind::Callback);
        assert_eq!(doc.callchains, vec!["Cb(a) : number"]);
        assert_eq!(doc.return_type(), Some("number"));
    }

    #[test]
    fn single_param_with_description() {
        let f = func("f", &["a"]);
        let doc = parse_text("@param {number} a\nfirst", Some(&f)).unwrap();
        assert_eq!(doc.kind, DocKind::Documented);
        assert_eq!(doc.id.as_deref(), Some("f"));
        assert_eq!(doc.params().len(), 1);
        assert_eq!(doc.params()[0].type_expr, "number");
        assert_eq!(doc.params()[0].id, "a");
        assert_eq!(doc.params()[0].desc, "first");
        assert!(doc.returns().is_none());
    }

    #[test]
    fn matching_params_round_trip() {
        let f = func("f", &["a", "b", "c"]);
        let doc = parse_text(
            "Adds things.\n\n@param {number} a\n  one\n@param b\n@param {list} [c=[1,2]]\n  three\n\n@returns {number}\n  sum",
            Some(&f),
        )
        .unwrap();
        assert_eq!(doc.descriptions, vec!["Adds things.".to_string()]);
        let ids: Vec<_> = doc.params().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(doc.params()[2].optional);
        assert_eq!(doc.params()[2].default.as_deref(), Some("[1,2]"));
        assert_eq!(doc.return_type(), Some("number"));
        assert_eq!(doc.returns().unwrap().desc, "  sum");
    }

    #[test]
    fn zero_params_no_returns() {
        let f = func("f", &[]);
        let doc = parse_text("Just text.", Some(&f)).unwrap();
        assert!(doc.params().is_empty());
        assert!(doc.returns().is_none());
    }

    #[test]
    fn same_line_description() {
        let f = func("f", &["a"]);
        let doc = parse_text("@param {number} a - the value\n  more", Some(&f)).unwrap();
        assert_eq!(doc.params()[0].desc, "the value\n  more");
    }

    #[test]
    fn headers() {
        let doc = parse_text("@typedef {list} Point\n\nA point.\n\n@slot {number} 0\n@slot {number} [y]", None)
            .unwrap();
        assert_eq!(doc.kind, DocKind::Typedef);
        assert_eq!(doc.id.as_deref(), Some("Point"));
        assert_eq!(doc.header_type(), Some("list"));
        assert_eq!(doc.slots().len(), 2);
        assert_eq!(doc.slots()[0].id, "0");

        let doc = parse_text("@callback Cb\n\n@param {number} x\n@returns {number}", None).unwrap();
        assert_eq!(doc.kind, DocKind::Callback);
        assert_eq!(doc.id.as_deref(), Some("Cb"));

        let doc = parse_text("@typedef Plain", None).unwrap();
        assert_eq!(doc.header_type(), None);
    }

    #[test]
    fn type_header_needs_a_symbol() {
        let err = parse_text("@type {number}", None).unwrap_err();
        assert!(matches!(err, DocError::StructuralGrammar { .. }));

        let v = SymbolInfo {
            kind: SymbolKind::Value,
            name: "v".into(),
            signature: "v".into(),
            params: None,
        };
        let doc = parse_text("@type {number}\n\nA value.", Some(&v)).unwrap();
        assert_eq!(doc.kind, DocKind::Type);
        assert_eq!(doc.id.as_deref(), Some("v"));
    }

    #[test]
    fn callback_rejects_type() {
        assert!(parse_text("@callback {list} Cb", None).is_err());
    }

    #[test]
    fn header_must_come_first() {
        let err = parse_text("Some text\n@typedef {list} T", None).unwrap_err();
        assert!(err.to_string().contains("parsing stopped"));
    }

    #[test]
    fn callchains_after_header_need_blank_line() {
        let ok = parse_text(
            "@callback Cb\n\n@callchain Cb(a) (b) : number\n@callchain Cb(a, b) : number\n\n@param a\n@returns {number}",
            None,
        )
        .unwrap();
        assert_eq!(ok.callchains.len(), 2);

        let err = parse_text("@callback Cb\n@callchain Cb() : number\n\n@returns {number}", None)
            .unwrap_err();
        assert!(err.to_string().contains("blank line must separate"));
    }

    #[test]
    fn callchain_run_needs_closing_blank_line() {
        let f = func("f", &[]);
        let err = parse_text("@callchain f() : number\n@returns {number}", Some(&f)).unwrap_err();
        assert!(matches!(err, DocError::StructuralGrammar { .. }));
    }

    #[test]
    fn callchains_need_typed_returns() {
        let f = func("f", &[]);
        let err = parse_text("@callchain f() (x) : number\n\n@returns\n  untyped", Some(&f)).unwrap_err();
        assert!(matches!(err, DocError::MissingTypedReturns { .. }));
        let err = parse_text("@callchain f() : number\n\nText", Some(&f)).unwrap_err();
        assert!(matches!(err, DocError::MissingTypedReturns { .. }));
    }

    #[test]
    fn slots_and_params_exclusive() {
        let err = parse_text("@typedef {list} T\n@slot {number} a\n@param {number} b", None).unwrap_err();
        assert!(matches!(err, DocError::StructuralGrammar { .. }));
    }

    #[test]
    fn slots_forbidden_with_callchains() {
        let err = parse_text(
            "@typedef {list} T\n\n@callchain T() : number\n\n@slot {number} a\n@returns {number}",
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("@slot cannot be used"));
    }

    #[test]
    fn returns_is_last() {
        let f = func("f", &["a"]);
        assert!(parse_text("@returns {number}\n@param a", Some(&f)).is_err());
    }

    #[test]
    fn file_doc_only_description() {
        let doc = parse_text("### file.scad\n\n#### Purpose\n\nStuff.", None).unwrap();
        assert_eq!(doc.kind, DocKind::File);
        assert_eq!(doc.id, None);
        let err = parse_text("@param {number} a", None).unwrap_err();
        assert!(matches!(err, DocError::StructuralGrammar { .. }));
    }

    #[test]
    fn param_name_mismatch() {
        let f = func("f", &["a", "b"]);
        let err = parse_text("@param a\n@param c", Some(&f)).unwrap_err();
        match err {
            DocError::ParamMismatch {
                position,
                declared,
                documented,
                ..
            } => {
                assert_eq!(position, 1);
                assert_eq!(declared, "b");
                assert_eq!(documented, "c");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn over_and_under_documented() {
        let f = func("f", &["a", "b"]);
        let err = parse_text("@param a\n@param b\n@param c", Some(&f)).unwrap_err();
        assert!(matches!(err, DocError::OverDocumentedParams { documented: 3, declared: 2, .. }));

        let g = func("g", &["a", "b", "c"]);
        let mut diags = Diagnostics::default();
        let doc = parse("/** @param a */", &ctx(Some(&g)), &mut diags).unwrap();
        assert_eq!(doc.params().len(), 1);
        assert!(matches!(
            diags.warnings(),
            [Warning::UnderDocumentedParams { documented: 1, declared: 3, .. }]
        ));
    }

    #[test]
    fn empty_declared_list_allows_extra_params() {
        let f = func("f", &[]);
        let doc = parse_text("@param a\n@param b", Some(&f)).unwrap();
        assert_eq!(doc.params().len(), 2);
    }

    #[test]
    fn unknown_params_are_not_checked() {
        let v = SymbolInfo {
            kind: SymbolKind::Value,
            name: "v".into(),
            signature: "v".into(),
            params: None,
        };
        let doc = parse_text("@type {function}\n\n@param {number} x\n@returns {number}", Some(&v)).unwrap();
        assert_eq!(doc.params().len(), 1);
    }

    #[test]
    fn parsing_is_idempotent() {
        let f = func("f", &["a"]);
        let text = "Desc\n\n@param {(number|undef)} [a=1]\n  value\n@returns {list[number]}";
        assert_eq!(parse_text(text, Some(&f)).unwrap(), parse_text(text, Some(&f)).unwrap());
    }

    #[test]
    fn nested_braces_in_type() {
        let f = func("f", &["cb"]);
        let doc = parse_text("@param {function(a: {x}): list} cb", Some(&f)).unwrap();
        assert_eq!(doc.params()[0].type_expr, "function(a: {x}): list");
    }
}
