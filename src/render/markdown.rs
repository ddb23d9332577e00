//! GitHub-flavored markdown reference with HTML anchors.
//!
//! Each file renders its own docs in item order, then a `### <file> types`
//! chapter with the typedefs and callbacks it declared. Type names in
//! signatures link to `#t-<name>` anchors.

use super::Renderer;
use crate::callchain;
use crate::model::{DocKind, DocModel, Field, Returns, SymbolKind};
use crate::parser::ParsedFile;
use crate::registry::{union_alternatives, LinkedType, Registry};
use regex::{Captures, Regex};
use std::sync::LazyLock;

pub struct MarkdownRenderer {
    /// Include symbols whose name starts with `_`
    pub show_private: bool,
}

static RE_H2: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^## (.*)$").unwrap());

static RE_H3: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^### (.*)$").unwrap());

static RE_INDENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^  ").unwrap());

const NOTE_ICONS: &[(&str, &str)] = &[
    ("> WARNING:", "> ⚠️ WARNING:"),
    ("> NOTE:", "> ℹ️ NOTE:"),
    ("> TTA:", "> 🤔 TO THINK ABOUT:"),
    ("> TODO:", "> 📌 TO DO:"),
];

impl Renderer for MarkdownRenderer {
    fn render(&self, file: &ParsedFile, registry: &Registry) -> String {
        let mut out: Vec<String> = Vec::new();

        for doc in &file.docs {
            match doc.kind {
                DocKind::File => {
                    for desc in &doc.descriptions {
                        out.push(format!("{}\n", notes(desc.trim())));
                    }
                }
                DocKind::Documented | DocKind::Type => {
                    if doc.is_private() && !self.show_private {
                        continue;
                    }
                    symbol_doc(&mut out, registry, doc);
                }
                _ => {}
            }
        }

        let mut types = Vec::new();
        for doc in file.docs.iter().filter(|d| d.is_type()) {
            type_doc(&mut types, registry, doc);
        }
        let earlier: Vec<(&str, &str)> = file
            .first_referenced
            .iter()
            .filter_map(|name| {
                let entry = registry.type_entry(name)?;
                (entry.filename != file.filename).then_some((name.as_str(), entry.filename.as_str()))
            })
            .collect();
        if !earlier.is_empty() {
            types.push("Types from earlier files used here:\n".to_string());
            for (name, filename) in earlier {
                types.push(format!("- {} *({})*", type_link(name), filename));
            }
            types.push(String::new());
        }
        if !types.is_empty() {
            out.push(format!("### {} types\n", file.filename));
            out.extend(types);
        }

        if out.is_empty() {
            return String::new();
        }
        let text = decorate_headings(&out.join("\n"), &file.filename);
        format!("{}\n\n", text.trim_end_matches('\n'))
    }
}

/// Icon and anchor on `## ` and `### ` headings.
fn decorate_headings(text: &str, filename: &str) -> String {
    let text = RE_H2.replace_all(text, |caps: &Captures| {
        format!(
            "## <span style=\"font-size: 1.1em; color: yellow\">📘{}</span>{}",
            &caps[1],
            anchor("file", &caps[1])
        )
    });
    RE_H3
        .replace_all(&text, |caps: &Captures| {
            format!(
                "### <i>📑{}</i>{}",
                &caps[1],
                anchor(&format!("{}-ch", filename), &caps[1])
            )
        })
        .into_owned()
}

fn anchor(prefix: &str, id: &str) -> String {
    format!("<a id='{}-{}'></a>", prefix, id)
}

fn escape(name: &str) -> String {
    name.replace('_', "\\_")
}

fn type_link(name: &str) -> String {
    format!("<a href=\"#t-{}\">{}</a>", name, name)
}

fn notes(text: &str) -> String {
    NOTE_ICONS
        .iter()
        .fold(text.to_string(), |acc, (find, replace)| acc.replace(find, replace))
}

/// Markdown for a linked type. Function types collapse to `function` unless
/// `full_fn` is set.
fn md_type(t: &LinkedType, full_fn: bool) -> String {
    match t {
        LinkedType::Builtin(name) => name.clone(),
        LinkedType::Named(name) => type_link(name),
        LinkedType::Union(alts) => join(alts, "|", full_fn),
        LinkedType::List(elements) => format!("list\\[{}]", join(elements, ",", full_fn)),
        LinkedType::Function { .. } if !full_fn => "function".to_string(),
        LinkedType::Function { params, returns } => {
            let params: Vec<String> = params
                .iter()
                .map(|(name, t)| match name {
                    Some(name) => format!("{}: {}", name, md_type(t, full_fn)),
                    None => md_type(t, full_fn),
                })
                .collect();
            let mut s = format!("function({})", params.join(", "));
            if let Some(ret) = returns {
                s.push_str(": ");
                s.push_str(&md_type(ret, full_fn));
            }
            s
        }
    }
}

fn join(types: &[LinkedType], sep: &str, full_fn: bool) -> String {
    types
        .iter()
        .map(|t| md_type(t, full_fn))
        .collect::<Vec<_>>()
        .join(sep)
}

fn linked(registry: &Registry, doc: &DocModel, expr: &str, full_fn: bool) -> String {
    registry
        .lookup(expr, &doc.location)
        .map(|t| md_type(&t, full_fn))
        .unwrap_or_else(|_| expr.to_string())
}

/// The callback a typedef directly aliases.
fn aliased_callback<'a>(registry: &'a Registry, doc: &DocModel) -> Option<&'a DocModel> {
    if doc.kind != DocKind::Typedef {
        return None;
    }
    let aliased = registry.type_doc(doc.header_type()?.trim())?;
    (aliased.kind == DocKind::Callback).then_some(aliased.as_ref())
}

fn param_list(registry: &Registry, doc: &DocModel) -> String {
    doc.params()
        .iter()
        .map(|p| {
            if p.type_expr.is_empty() {
                escape(&p.id)
            } else {
                format!("{}: {}", escape(&p.id), linked(registry, doc, &p.type_expr, false))
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn return_suffix(registry: &Registry, doc: &DocModel) -> String {
    doc.return_type()
        .map(|r| format!(" : {}", linked(registry, doc, r, true)))
        .unwrap_or_default()
}

fn signature(registry: &Registry, doc: &DocModel, id: &str) -> String {
    let sig = match doc.kind {
        DocKind::Callback => format!(
            "*callback* {}({}){}",
            id,
            param_list(registry, doc),
            return_suffix(registry, doc)
        ),
        DocKind::Typedef => {
            if let Some(callback) = aliased_callback(registry, doc) {
                return signature(registry, callback, id);
            }
            match doc.header_type() {
                Some(t) => format!("*type* {} = {}", id, linked(registry, doc, t, true)),
                None => format!("*type* {}", id),
            }
        }
        DocKind::Type => match doc.header_type() {
            Some(t) => format!("*value* {} : {}", id, linked(registry, doc, t, true)),
            None => format!("*value* {} : ???", id),
        },
        _ => match doc.symbol.as_ref().map(|s| s.kind) {
            Some(SymbolKind::Function) => format!(
                "*function* {}({}){}",
                id,
                param_list(registry, doc),
                return_suffix(registry, doc)
            ),
            Some(SymbolKind::Module) => format!("*module* {}({})", id, param_list(registry, doc)),
            _ => format!("*value* {} : ???", id),
        },
    };
    format!("<code>{}</code>", sig)
}

fn callchains(out: &mut Vec<String>, registry: &Registry, doc: &DocModel) {
    let derived = callchain::derive(registry, doc, None);
    if derived.lines.is_empty() {
        return;
    }
    out.push("Possible callchains:\n".to_string());
    out.extend(derived.lines.iter().map(|l| format!("    {}", l)));
    out.push(String::new());
}

fn descriptions(out: &mut Vec<String>, doc: &DocModel) {
    for desc in doc.descriptions.iter().filter(|d| !d.trim().is_empty()) {
        out.push(notes(desc.trim_end()));
        out.push(String::new());
    }
}

/// Field description with its two-space indent removed; falls back to the
/// description of the field's type.
fn field_desc(out: &mut Vec<String>, registry: &Registry, desc: &str, type_expr: &str) {
    if !desc.is_empty() {
        let desc = RE_INDENT.replace_all(desc, "");
        out.push(format!("{}\n", notes(desc.trim_end_matches(['\r', '\n']))));
    } else if let Some(t) = registry.type_doc(type_expr.trim()) {
        descriptions(out, t);
    }
}

fn slots(out: &mut Vec<String>, registry: &Registry, doc: &DocModel) {
    if doc.slots().is_empty() {
        return;
    }
    out.push("<details><summary>slots</summary>".to_string());
    for slot in doc.slots() {
        let mut line = format!("<code><b>{}</b></code>", slot.id);
        if !slot.type_expr.is_empty() {
            line.push_str(&format!(": <code>{}</code>\n", linked(registry, doc, &slot.type_expr, true)));
        }
        out.push(line);
        field_desc(out, registry, &slot.desc, &slot.type_expr);
    }
    out.push("</details>".to_string());
    out.push(String::new());
}

/// Default from the declaration, else from the doc's `[name=default]`.
fn param_default(doc: &DocModel, param: &Field) -> Option<String> {
    let declared = doc
        .symbol
        .as_ref()
        .and_then(|s| s.params.as_ref())
        .and_then(|params| params.iter().find(|p| p.name == param.id))
        .map(|p| p.default.clone())
        .filter(|d| !d.is_empty());
    declared.or_else(|| param.default.clone().filter(|d| !d.is_empty()))
}

fn params(out: &mut Vec<String>, registry: &Registry, doc: &DocModel) {
    if doc.params().is_empty() {
        return;
    }
    out.push("<details><summary>parameters</summary>".to_string());
    out.push(String::new());
    for param in doc.params() {
        let mut line = format!("**<code>{}</code>**", param.id);
        if !param.type_expr.is_empty() {
            line.push_str(&format!(": <code>{}</code>\n", linked(registry, doc, &param.type_expr, false)));
        }
        match param_default(doc, param) {
            Some(default) => line.push_str(&format!(" *(Default: `{}`)*\n", default)),
            None if param.optional => line.push_str(" *(Optional)*\n"),
            None => {}
        }
        out.push(line);
        field_desc(out, registry, &param.desc, &param.type_expr);
    }
    out.push("</details>".to_string());
    out.push(String::new());
}

fn returns(out: &mut Vec<String>, registry: &Registry, doc: &DocModel, ret: &Returns) {
    out.push("<details><summary>returns</summary>".to_string());
    out.push(String::new());
    if ret.type_expr.is_empty() {
        out.push("**Returns**\n".to_string());
    } else {
        out.push(format!(
            "**Returns**: <code>{}</code>\n",
            linked(registry, doc, &ret.type_expr, true)
        ));
    }
    if !ret.desc.is_empty() {
        let desc = RE_INDENT.replace_all(&ret.desc, "");
        out.push(format!("{}\n", notes(desc.trim_end_matches(['\r', '\n']))));
    }

    let chains: Vec<String> = union_alternatives(&ret.type_expr)
        .into_iter()
        .flat_map(|alt| callchain::resolve(registry, alt, false))
        .collect();
    if !chains.is_empty() {
        out.push("Possible callchains:\n".to_string());
        out.extend(chains.iter().map(|c| format!("    {}", c)));
        out.push(String::new());
    }
    out.push("</details>".to_string());
    out.push(String::new());
}

fn symbol_doc(out: &mut Vec<String>, registry: &Registry, doc: &DocModel) {
    let Some(ref symbol) = doc.symbol else {
        return;
    };
    let (emoji, prefix) = match symbol.kind {
        SymbolKind::Function => ("⚙️", "f"),
        SymbolKind::Module if symbol.name.starts_with("test_") => ("🧪", "m"),
        SymbolKind::Module => ("🧊", "m"),
        SymbolKind::Value => ("💠", "v"),
    };
    out.push(format!(
        "#### {}{}{}",
        emoji,
        escape(&symbol.name),
        anchor(prefix, &symbol.name)
    ));
    out.push(String::new());
    out.push(signature(registry, doc, &symbol.name));
    out.push(String::new());
    callchains(out, registry, doc);
    descriptions(out, doc);
    params(out, registry, doc);
    if let Some(ret) = doc.returns() {
        returns(out, registry, doc, ret);
    }
}

fn type_doc(out: &mut Vec<String>, registry: &Registry, doc: &DocModel) {
    let Some(ref id) = doc.id else {
        return;
    };
    let callback = aliased_callback(registry, doc);
    let emoji = if doc.kind == DocKind::Callback || callback.is_some() {
        "🧩⚙️"
    } else {
        "🧩"
    };
    out.push(format!("#### {}{}{}", emoji, escape(id), anchor("t", id)));
    out.push(String::new());
    out.push(signature(registry, doc, id));
    out.push(String::new());
    callchains(out, registry, doc);
    descriptions(out, doc);
    slots(out, registry, doc);

    // an alias shows the parameters of the callback it stands for
    let source = match callback {
        Some(cb) if doc.params().is_empty() => cb,
        _ => doc,
    };
    params(out, registry, source);
    if let Some(ret) = doc.returns().or_else(|| source.returns()) {
        returns(out, registry, source, ret);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::Diagnostics;
    use crate::parser::process_file;

    fn render_files(files: &[(&str, &str)], show_private: bool) -> Vec<String> {
        let mut registry = Registry::default();
        let mut diags = Diagnostics::default();
        let parsed: Vec<_> = files
            .iter()
            .map(|(name, text)| process_file(name, text.to_string(), &mut registry, &mut diags).unwrap())
            .collect();
        let renderer = MarkdownRenderer { show_private };
        parsed.iter().map(|f| renderer.render(f, &registry)).collect()
    }

    fn render_one(text: &str) -> String {
        render_files(&[("lib.scad", text)], false).remove(0)
    }

    const LIB: &str = r#"/**
 * ## lib.scad
 *
 * ### Usage
 *
 * > NOTE: read me.
 */

/**
 * @typedef {list} Point
 *
 * A 2D point.
 *
 * @slot {number} 0
 *   x coordinate
 * @slot {number} [1]
 */

/**
 * @callback Scale
 *
 * @param {number} k
 * @returns {Point}
 */

/**
 * Moves a point.
 *
 * @param {Point} p
 *   the point
 * @param {number} [d]
 * @returns {Scale}
 *   a scaler
 */
function move_pt(p, d = 1) = function (k) p * k * d;

/** Hidden. */
function _helper() = 0;

/**
 * @param {number} s
 */
module test_box(s) { cube(s); }
"#;

    #[test]
    fn symbol_entries() {
        let md = render_one(LIB);
        assert!(md.contains("#### ⚙️move\\_pt<a id='f-move_pt'></a>"), "{md}");
        assert!(md.contains(
            "<code>*function* move\\_pt(p: <a href=\"#t-Point\">Point</a>, d: number) : <a href=\"#t-Scale\">Scale</a></code>"
        ));
        assert!(md.contains("Possible callchains:\n\n    move_pt(p, d) (k) : Point"), "{md}");
        assert!(md.contains("**<code>d</code>**: <code>number</code>\n *(Default: `1`)*\n"));
        assert!(md.contains("**Returns**: <code><a href=\"#t-Scale\">Scale</a></code>\n"));
        assert!(md.contains("a scaler\n"));
        assert!(md.contains("#### 🧪test\\_box<a id='m-test_box'></a>"));
        assert!(md.contains("<code>*module* test\\_box(s: number)</code>"));
    }

    #[test]
    fn private_symbols_hidden_unless_asked() {
        assert!(!render_one(LIB).contains("\\_helper"));
        let md = render_files(&[("lib.scad", LIB)], true).remove(0);
        assert!(md.contains("#### ⚙️\\_helper<a id='f-_helper'></a>"));
    }

    #[test]
    fn types_chapter() {
        let md = render_one(LIB);
        let types_at = md.find("### <i>📑lib.scad types</i><a id='lib.scad-ch-lib.scad types'></a>").unwrap();
        let point_at = md.find("#### 🧩Point<a id='t-Point'></a>").unwrap();
        let scale_at = md.find("#### 🧩⚙️Scale<a id='t-Scale'></a>").unwrap();
        assert!(types_at < point_at && point_at < scale_at);
        assert!(md.contains("<code>*type* Point = list</code>"));
        assert!(md.contains("<code>*callback* Scale(k: number) : <a href=\"#t-Point\">Point</a></code>"));
        assert!(md.contains("<details><summary>slots</summary>\n<code><b>0</b></code>: <code>number</code>\n\nx coordinate\n"));
    }

    #[test]
    fn file_doc_headings_and_notes() {
        let md = render_one(LIB);
        assert!(md.starts_with(
            "## <span style=\"font-size: 1.1em; color: yellow\">📘lib.scad</span><a id='file-lib.scad'></a>"
        ));
        assert!(md.contains("### <i>📑Usage</i><a id='lib.scad-ch-Usage'></a>"));
        assert!(md.contains("> ℹ️ NOTE: read me."));
        assert!(md.ends_with("\n\n") && !md.ends_with("\n\n\n"));
    }

    #[test]
    fn alias_renders_as_callback() {
        let md = render_one(
            "/**\n * @callback Cb\n *\n * @param {number} x\n * @returns {number}\n */\n\
             /** @typedef {Cb} Alias */\n",
        );
        assert!(md.contains("#### 🧩⚙️Alias<a id='t-Alias'></a>"));
        assert!(md.contains("<code>*callback* Alias(x: number) : number</code>"));
        assert!(md.contains("**<code>x</code>**: <code>number</code>\n"), "{md}");
    }

    #[test]
    fn earlier_types_are_linked() {
        let out = render_files(
            &[
                ("a.scad", "/** @typedef {list} Vec */\n"),
                ("b.scad", "/** @param {Vec} v */\nfunction len(v) = 0;\n"),
            ],
            false,
        );
        assert!(out[1].contains("### <i>📑b.scad types</i>"));
        assert!(out[1].contains("- <a href=\"#t-Vec\">Vec</a> *(a.scad)*"));
        assert!(!out[1].contains("<a id='t-Vec'>"));
    }

    #[test]
    fn function_types_collapse_in_params() {
        let md = render_one(
            "/**\n * @param {function(x: number): number} f\n * @returns {function(x: number): number}\n */\n\
             function wrap(f) = f;\n",
        );
        assert!(md.contains("<code>*function* wrap(f: function) : function(x: number): number</code>"));
    }

    #[test]
    fn empty_file_renders_nothing() {
        assert_eq!(render_one("x = 1;\n"), "");
    }
}
