//! Fatal errors and non-fatal warnings raised while reading documentation.

use crate::lines::LinePair;
use std::fmt;

/// Where a diagnostic points: `file:symbol:lines`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub filename: String,
    pub symbol: Option<String>,
    pub lines: LinePair,
}

impl Location {
    pub fn new(filename: &str, symbol: Option<&str>, lines: LinePair) -> Self {
        Location {
            filename: filename.to_string(),
            symbol: symbol.map(str::to_string),
            lines,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.filename)?;
        if let Some(ref symbol) = self.symbol {
            write!(f, ":{}", symbol)?;
        }
        write!(f, ":{}", self.lines)
    }
}

/// Errors that abort the whole run.
#[derive(Debug, thiserror::Error)]
pub enum DocError {
    #[error("{loc}: unterminated string literal")]
    Lex { loc: Location },

    #[error("{loc}: doc comment does not match the tag grammar: {detail}")]
    StructuralGrammar { loc: Location, detail: String },

    #[error(
        "{loc}: declared param '{declared}' at position {position} doesn't match documented param '{documented}'"
    )]
    ParamMismatch {
        loc: Location,
        position: usize,
        declared: String,
        documented: String,
    },

    #[error(
        "{loc}: documents {documented} parameters but only {declared} are declared"
    )]
    OverDocumentedParams {
        loc: Location,
        documented: usize,
        declared: usize,
    },

    #[error(
        "{loc}: if any @callchain tags are defined, then a @returns tag and its type must also be defined"
    )]
    MissingTypedReturns { loc: Location },

    #[error("{loc}: uses type '{name}' which has not been defined yet")]
    UndefinedTypeReference { loc: Location, name: String },

    #[error("'{name}' cannot be registered twice. Found in files:\n  {first}\n  {second}")]
    DuplicateSymbol {
        name: String,
        first: String,
        second: Location,
    },
}

/// Problems worth reporting that never stop processing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Warning {
    #[error(
        "{loc}: isn't documenting all callable parameters ({documented} of {declared})"
    )]
    UnderDocumentedParams {
        loc: Location,
        documented: usize,
        declared: usize,
    },

    #[error(
        "{loc}: has auto-generated callchains for {count} return types. Cannot determine which parameter subsets map to which return types; use @callchain tags for accurate curried function documentation"
    )]
    AmbiguousCurry { loc: Location, count: usize },
}

/// Collects warnings for the whole run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}
