//! Curried call-chain synthesis.
//!
//! A callback whose return type is itself a callback can be called as
//! `Cb(a, b) (c) : number`. [`resolve`] builds that text for a type name by
//! following typedef aliases, and [`derive`] builds it for a documented
//! function or type from its `@returns`.

use crate::model::{DocKind, DocModel};
use crate::registry::{is_builtin, union_alternatives, Registry};
use std::collections::HashSet;
use std::rc::Rc;

/// Chains synthesized for one doc.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Derived {
    pub lines: Vec<String>,
    /// Number of return alternatives that produced a chain
    pub generated: usize,
}

impl Derived {
    /// Chains were generated for more than one return alternative, so the
    /// parameters can't be split between them.
    pub fn is_ambiguous(&self) -> bool {
        self.generated > 1
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('(') && !name.starts_with("list[") && !is_builtin(name)
}

/// Call chains for `name`, a type or function.
///
/// Explicit `@callchain` lines win. Otherwise `name` must resolve to a
/// callback; the result is empty when it doesn't, when the final return type
/// is missing, or when `require_curry` is set and nothing was curried.
pub fn resolve(registry: &Registry, name: &str, require_curry: bool) -> Vec<String> {
    let name = name.trim();
    if !is_plain_name(name) {
        return Vec::new();
    }
    let Some(doc) = registry
        .type_doc(name)
        .or_else(|| registry.function_doc(name))
    else {
        return Vec::new();
    };
    if !doc.callchains.is_empty() {
        return doc
            .callchains
            .iter()
            .filter(|c| !c.is_empty())
            .cloned()
            .collect();
    }

    let Some(callback) = resolve_to_callback(registry, name) else {
        return Vec::new();
    };
    let mut segments = vec![format!("{}({})", name, param_names(&callback))];
    let mut ret = return_type(registry, name, &callback);

    let mut seen = HashSet::from([name.to_string()]);
    let mut curried = false;
    while let Some(next_name) = ret.clone().filter(|r| !seen.contains(r)) {
        let Some(next) = resolve_to_callback(registry, &next_name) else {
            break;
        };
        curried = true;
        segments.push(format!("({})", param_names(&next)));
        ret = return_type(registry, &next_name, &next);
        seen.insert(next_name);
    }

    match ret {
        Some(ret) if curried || !require_curry => {
            vec![format!("{} : {}", segments.join(" "), ret)]
        }
        _ => Vec::new(),
    }
}

/// Follow typedef hops from `name` until a callback; `None` on a cycle or
/// anything that isn't a registered alias chain.
fn resolve_to_callback(registry: &Registry, name: &str) -> Option<Rc<DocModel>> {
    let mut seen = HashSet::new();
    let mut name = name.trim().to_string();
    loop {
        if !is_plain_name(&name) || !seen.insert(name.clone()) {
            return None;
        }
        let doc = registry.type_doc(&name)?;
        match doc.kind {
            DocKind::Callback => return Some(Rc::clone(doc)),
            DocKind::Typedef => name = doc.header_type()?.trim().to_string(),
            _ => return None,
        }
    }
}

/// The alias's own `@returns` type if it has one, else the callback's.
fn return_type(registry: &Registry, name: &str, callback: &DocModel) -> Option<String> {
    registry
        .type_doc(name)
        .and_then(|d| d.return_type())
        .or_else(|| callback.return_type())
        .map(|r| r.trim().to_string())
}

fn param_names(doc: &DocModel) -> String {
    doc.params()
        .iter()
        .map(|p| p.id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Call chains to show for `doc`, explicit or generated.
///
/// `id_override` renames the head of the chain, which is how a typedef shows
/// the chains of the callback it aliases.
pub fn derive(registry: &Registry, doc: &DocModel, id_override: Option<&str>) -> Derived {
    derive_inner(registry, doc, id_override, &mut HashSet::new())
}

fn derive_inner(
    registry: &Registry,
    doc: &DocModel,
    id_override: Option<&str>,
    seen: &mut HashSet<String>,
) -> Derived {
    if !doc.callchains.is_empty() {
        let lines = match (id_override, doc.symbol.as_ref()) {
            (Some(id), Some(symbol)) => doc
                .callchains
                .iter()
                .map(|c| c.replacen(&symbol.name, id, 1))
                .collect(),
            _ => doc.callchains.clone(),
        };
        return Derived {
            lines,
            generated: 0,
        };
    }

    let Some(id) = id_override.or(doc.id.as_deref()) else {
        return Derived::default();
    };

    if doc.kind == DocKind::Typedef {
        let Some(aliased) = doc.header_type().and_then(|t| registry.type_doc(t.trim())) else {
            return Derived::default();
        };
        let aliased_id = aliased.id.clone().unwrap_or_default();
        if !seen.insert(aliased_id) {
            return Derived::default();
        }
        return derive_inner(registry, aliased, Some(id), seen);
    }

    let Some(ret) = doc.return_type() else {
        return Derived::default();
    };
    let prefix = format!("{}({}) ", id, param_names(doc));
    let mut derived = Derived::default();
    for alt in union_alternatives(ret) {
        let mut produced = false;
        for chain in resolve(registry, alt, false) {
            if let Some(rest) = chain.strip_prefix(alt) {
                derived.lines.push(format!("{}{}", prefix, rest));
                produced = true;
            }
        }
        if produced {
            derived.generated += 1;
        }
    }
    derived
}
