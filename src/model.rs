//! Data model for scanned items and parsed documentation.

use crate::diag::Location;
use std::ops::Range;

/// Half-open byte range into a file's text.
pub type Span = Range<usize>;

/// One syntactic unit of a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub span: Span,
    pub kind: ItemKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    /// `/* */` block or a run of `//` lines
    Comment,
    Use,
    Include,
    /// `/** */` not (yet) attached to a symbol
    DocComment,
    /// Anything else terminated by `;`
    Command,
    Symbol(Symbol),
    /// Trailing text with no terminating `;`
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Function,
    Module,
    Value,
}

impl SymbolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Module => "module",
            SymbolKind::Value => "value",
        }
    }
}

/// A declared function, module or value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub id: Span,
    pub signature: Span,
    /// `None` when the declaration isn't a literal callable
    pub params: Option<Vec<Param>>,
    pub body: Span,
    /// Doc comment that immediately preceded the declaration
    pub doc: Option<Span>,
}

/// Declared parameter with its (possibly empty) default text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub default: String,
}

impl Item {
    pub fn symbol(&self) -> Option<&Symbol> {
        match self.kind {
            ItemKind::Symbol(ref sym) => Some(sym),
            _ => None,
        }
    }
}

// -- Documentation ------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocKind {
    File,
    Type,
    Typedef,
    Callback,
    Documented,
    Undocumented,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderTag {
    Type,
    Typedef,
    Callback,
}

impl HeaderTag {
    pub fn kind(self) -> DocKind {
        match self {
            HeaderTag::Type => DocKind::Type,
            HeaderTag::Typedef => DocKind::Typedef,
            HeaderTag::Callback => DocKind::Callback,
        }
    }
}

/// `@type {T}`, `@typedef {T} id` or `@callback id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub tag: HeaderTag,
    /// Empty when no type was given
    pub type_expr: String,
    /// Empty for `@type`, whose name comes from the symbol
    pub id: String,
}

/// A `@slot` or `@param` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub type_expr: String,
    pub id: String,
    /// Written as `[id]` or `[id=default]`
    pub optional: bool,
    pub default: Option<String>,
    pub desc: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Returns {
    pub type_expr: String,
    pub desc: String,
}

/// Slots and parameters never appear in the same doc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocBody {
    Slots(Vec<Field>),
    Callable {
        params: Vec<Field>,
        returns: Option<Returns>,
    },
}

impl Default for DocBody {
    fn default() -> Self {
        DocBody::Callable {
            params: Vec::new(),
            returns: None,
        }
    }
}

/// Owned copy of the declaration a doc belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    pub kind: SymbolKind,
    pub name: String,
    pub signature: String,
    pub params: Option<Vec<Param>>,
}

/// Parsed documentation of one doc comment or undocumented symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocModel {
    /// Registered name: the header id for types, the symbol name otherwise
    pub id: Option<String>,
    pub kind: DocKind,
    pub header: Option<Header>,
    pub callchains: Vec<String>,
    pub descriptions: Vec<String>,
    pub body: DocBody,
    pub symbol: Option<SymbolInfo>,
    pub location: Location,
}

impl DocModel {
    pub fn params(&self) -> &[Field] {
        match self.body {
            DocBody::Callable { ref params, .. } => params,
            DocBody::Slots(_) => &[],
        }
    }

    pub fn slots(&self) -> &[Field] {
        match self.body {
            DocBody::Slots(ref slots) => slots,
            DocBody::Callable { .. } => &[],
        }
    }

    pub fn returns(&self) -> Option<&Returns> {
        match self.body {
            DocBody::Callable { ref returns, .. } => returns.as_ref(),
            DocBody::Slots(_) => None,
        }
    }

    /// Non-empty `@returns` type.
    pub fn return_type(&self) -> Option<&str> {
        self.returns()
            .map(|r| r.type_expr.as_str())
            .filter(|t| !t.is_empty())
    }

    /// Type expression declared in the header, if any.
    pub fn header_type(&self) -> Option<&str> {
        self.header
            .as_ref()
            .map(|h| h.type_expr.as_str())
            .filter(|t| !t.is_empty())
    }

    pub fn is_type(&self) -> bool {
        matches!(self.kind, DocKind::Typedef | DocKind::Callback)
    }

    pub fn is_private(&self) -> bool {
        self.id.as_deref().is_some_and(|id| id.starts_with('_'))
    }
}
