//! Cross-file symbol and type tables, and the type linker.
//!
//! One [`Registry`] lives for the whole run. Files are registered in the order
//! given on the command line, so a type can only be used by docs that come
//! after its declaration.

use crate::diag::{DocError, Location};
use crate::model::{DocKind, DocModel, SymbolKind};
use crate::parser::balanced::{identifier, scan_until, skip_group, split_top_level};
use indexmap::{IndexMap, IndexSet};
use std::fmt;
use std::rc::Rc;

/// Type names that never need a declaration. `any` and `...` are
/// placeholders rather than real types.
pub const BUILTIN_TYPES: &[&str] = &[
    "number", "string", "list", "undef", "function", "bool", "any", "...",
];

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_TYPES.contains(&name)
}

/// A registered doc and the file it came from.
#[derive(Debug, Clone)]
pub struct Entry {
    pub filename: String,
    pub doc: Rc<DocModel>,
}

#[derive(Debug, Default)]
pub struct Registry {
    types: IndexMap<String, Entry>,
    functions: IndexMap<String, Entry>,
    modules: IndexMap<String, Entry>,
    values: IndexMap<String, Entry>,
    referenced: IndexSet<String>,
}

impl Registry {
    /// Insert a doc into the tables its kind belongs to.
    ///
    /// Typedefs and callbacks go into the type table under their header id;
    /// when attached to a declaration they also claim the symbol's name.
    /// File docs and undocumented symbols are not registered.
    pub fn register(&mut self, doc: &Rc<DocModel>) -> Result<(), DocError> {
        match doc.kind {
            DocKind::Typedef | DocKind::Callback => {
                if let Some(ref id) = doc.id {
                    insert(&mut self.types, id, doc)?;
                }
                self.register_symbol(doc)
            }
            DocKind::Type | DocKind::Documented => self.register_symbol(doc),
            DocKind::File | DocKind::Undocumented => Ok(()),
        }
    }

    fn register_symbol(&mut self, doc: &Rc<DocModel>) -> Result<(), DocError> {
        let Some(ref symbol) = doc.symbol else {
            return Ok(());
        };
        let table = match symbol.kind {
            SymbolKind::Function => &mut self.functions,
            SymbolKind::Module => &mut self.modules,
            SymbolKind::Value => &mut self.values,
        };
        insert(table, &symbol.name, doc)
    }

    pub fn type_doc(&self, name: &str) -> Option<&Rc<DocModel>> {
        self.types.get(name).map(|e| &e.doc)
    }

    pub fn type_entry(&self, name: &str) -> Option<&Entry> {
        self.types.get(name)
    }

    pub fn function_doc(&self, name: &str) -> Option<&Rc<DocModel>> {
        self.symbol_doc(SymbolKind::Function, name)
    }

    pub fn symbol_doc(&self, kind: SymbolKind, name: &str) -> Option<&Rc<DocModel>> {
        let table = match kind {
            SymbolKind::Function => &self.functions,
            SymbolKind::Module => &self.modules,
            SymbolKind::Value => &self.values,
        };
        table.get(name).map(|e| &e.doc)
    }

    /// Type docs in registration order.
    pub fn types(&self) -> impl Iterator<Item = (&str, &Rc<DocModel>)> {
        self.types.iter().map(|(name, e)| (name.as_str(), &e.doc))
    }

    /// Type names used by any linked signature, in first-use order.
    pub fn referenced(&self) -> &IndexSet<String> {
        &self.referenced
    }

    pub fn unreferenced_types(&self) -> Vec<&str> {
        self.types
            .keys()
            .filter(|name| !self.referenced.contains(*name))
            .map(String::as_str)
            .collect()
    }

    /// Link a type expression, marking every named type in it as referenced.
    pub fn link(&mut self, expr: &str, loc: &Location) -> Result<LinkedType, DocError> {
        let mut names = Vec::new();
        let linked = self.link_expr(expr, loc, &mut names)?;
        self.referenced.extend(names);
        Ok(linked)
    }

    /// Link without touching the referenced set.
    pub fn lookup(&self, expr: &str, loc: &Location) -> Result<LinkedType, DocError> {
        self.link_expr(expr, loc, &mut Vec::new())
    }

    fn link_expr(
        &self,
        expr: &str,
        loc: &Location,
        names: &mut Vec<String>,
    ) -> Result<LinkedType, DocError> {
        let expr = expr.trim();
        let malformed = || DocError::StructuralGrammar {
            loc: loc.clone(),
            detail: format!("malformed type expression `{}`", expr),
        };
        if expr.is_empty() {
            return Err(malformed());
        }

        if let Some(rest) = expr.strip_prefix("function") {
            let rest = rest.trim_start();
            if rest.starts_with('(') {
                return self.link_function(expr, rest, loc, names);
            }
        }

        let alternatives = union_alternatives(expr);
        if alternatives.len() > 1 || alternatives[0] != expr {
            return self.link_union(&alternatives, loc, names);
        }

        if let Some(inner) = expr.strip_prefix("list[") {
            let (elements, end) = split_top_level(inner, b',');
            if &inner[end..] != "]" {
                return Err(malformed());
            }
            let elements = elements
                .into_iter()
                .map(|e| self.link_expr(e, loc, names))
                .collect::<Result<_, _>>()?;
            return Ok(LinkedType::List(elements));
        }

        if is_builtin(expr) {
            return Ok(LinkedType::Builtin(expr.to_string()));
        }
        if self.types.contains_key(expr) {
            names.push(expr.to_string());
            return Ok(LinkedType::Named(expr.to_string()));
        }
        Err(DocError::UndefinedTypeReference {
            loc: loc.clone(),
            name: expr.to_string(),
        })
    }

    fn link_union(
        &self,
        alternatives: &[&str],
        loc: &Location,
        names: &mut Vec<String>,
    ) -> Result<LinkedType, DocError> {
        let mut linked: Vec<LinkedType> = Vec::with_capacity(alternatives.len());
        for alt in alternatives {
            let t = self.link_expr(alt, loc, names)?;
            // only neighbouring duplicates collapse
            if linked.last() != Some(&t) {
                linked.push(t);
            }
        }
        if linked.len() == 1 {
            return Ok(linked.remove(0));
        }
        Ok(LinkedType::Union(linked))
    }

    /// `function(name: T, U): R`, `rest` starting at the `(`.
    fn link_function(
        &self,
        expr: &str,
        rest: &str,
        loc: &Location,
        names: &mut Vec<String>,
    ) -> Result<LinkedType, DocError> {
        let malformed = || DocError::StructuralGrammar {
            loc: loc.clone(),
            detail: format!("malformed function type `{}`", expr),
        };
        let end = scan_until(rest, 1, &[], false).map_err(|_| malformed())?;
        if rest.as_bytes().get(end) != Some(&b')') {
            return Err(malformed());
        }
        let close = end + 1;

        let mut params = Vec::new();
        let inner = &rest[1..end];
        if !inner.trim().is_empty() {
            let (parts, _) = split_top_level(inner, b',');
            for part in parts {
                let part = part.trim();
                let (name, type_expr) = match identifier(part.as_bytes(), 0) {
                    Some(end) if part[end..].trim_start().starts_with(':') => {
                        let colon = part[end..].find(':').unwrap_or(0) + end;
                        (Some(part[..end].to_string()), &part[colon + 1..])
                    }
                    _ => (None, part),
                };
                params.push((name, self.link_expr(type_expr, loc, names)?));
            }
        }

        let tail = rest[close..].trim();
        let returns = if tail.is_empty() {
            None
        } else {
            let ret = tail.strip_prefix(':').ok_or_else(malformed)?.trim();
            let alternatives = union_alternatives(ret);
            Some(Box::new(self.link_union(&alternatives, loc, names)?))
        };
        Ok(LinkedType::Function { params, returns })
    }
}

fn insert(table: &mut IndexMap<String, Entry>, name: &str, doc: &Rc<DocModel>) -> Result<(), DocError> {
    if let Some(first) = table.get(name) {
        return Err(DocError::DuplicateSymbol {
            name: name.to_string(),
            first: first.filename.clone(),
            second: doc.location.clone(),
        });
    }
    table.insert(
        name.to_string(),
        Entry {
            filename: doc.location.filename.clone(),
            doc: Rc::clone(doc),
        },
    );
    Ok(())
}

/// Alternatives of `(A|B)` or a bare `A|B`; anything else is its own single
/// alternative.
pub fn union_alternatives(expr: &str) -> Vec<&str> {
    let expr = expr.trim();
    if expr.starts_with('(') {
        if let Ok(end) = skip_group(expr, 0, false) {
            if end == expr.len() && expr.ends_with(')') {
                let (parts, _) = split_top_level(&expr[1..end - 1], b'|');
                return parts.into_iter().map(str::trim).collect();
            }
        }
    }
    let (parts, end) = split_top_level(expr, b'|');
    if parts.len() > 1 && end == expr.len() {
        return parts.into_iter().map(str::trim).collect();
    }
    vec![expr]
}

/// A type expression with every name checked against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkedType {
    Builtin(String),
    /// Reference to a registered typedef or callback
    Named(String),
    Union(Vec<LinkedType>),
    List(Vec<LinkedType>),
    Function {
        params: Vec<(Option<String>, LinkedType)>,
        returns: Option<Box<LinkedType>>,
    },
}

impl fmt::Display for LinkedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkedType::Builtin(name) | LinkedType::Named(name) => f.write_str(name),
            LinkedType::Union(alts) => write_joined(f, alts, "|"),
            LinkedType::List(elements) => {
                f.write_str("list[")?;
                write_joined(f, elements, ",")?;
                f.write_str("]")
            }
            LinkedType::Function { params, returns } => {
                f.write_str("function(")?;
                for (i, (name, t)) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if let Some(name) = name {
                        write!(f, "{}: ", name)?;
                    }
                    write!(f, "{}", t)?;
                }
                f.write_str(")")?;
                if let Some(ret) = returns {
                    write!(f, ": {}", ret)?;
                }
                Ok(())
            }
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, types: &[LinkedType], sep: &str) -> fmt::Result {
    for (i, t) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", t)?;
    }
    Ok(())
}
