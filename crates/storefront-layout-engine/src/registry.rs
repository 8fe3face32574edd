//! Static registry of block kinds.
//!
//! The registry is the single source of truth for the mapping between block
//! `type` tags and wire-format resolved names, and for the per-kind
//! containment rules. It is fixed at compile time; unknown resolved names in
//! a persisted document are skippable data, not corruption, so
//! [`block_type_for`] is lenient while [`resolved_name_for`] is strict.

use thiserror::Error;

/// Resolved-name prefix reserved for the menu-item family of kinds.
pub const MENU_ITEM_PREFIX: &str = "MenuItem";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown block type: {0}")]
    UnknownBlockType(String),
}

/// Which child kinds a container kind accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Containment {
    /// Admit any candidate (default for most kinds).
    Any,
    /// Admit only candidates whose resolved name carries the given prefix.
    Family(&'static str),
}

struct KindSpec {
    tag: &'static str,
    resolved_name: &'static str,
    containment: Containment,
}

/// The closed set of block kinds this version of the engine understands.
const KINDS: &[KindSpec] = &[
    KindSpec {
        tag: "hero",
        resolved_name: "Hero",
        containment: Containment::Any,
    },
    KindSpec {
        tag: "banner",
        resolved_name: "Banner",
        containment: Containment::Any,
    },
    KindSpec {
        tag: "categories",
        resolved_name: "Categories",
        containment: Containment::Any,
    },
    KindSpec {
        tag: "products",
        resolved_name: "Products",
        containment: Containment::Any,
    },
    KindSpec {
        tag: "text",
        resolved_name: "Text",
        containment: Containment::Any,
    },
    KindSpec {
        tag: "image",
        resolved_name: "Image",
        containment: Containment::Any,
    },
    KindSpec {
        tag: "menu",
        resolved_name: "MenuItemContainer",
        containment: Containment::Family(MENU_ITEM_PREFIX),
    },
    KindSpec {
        tag: "menu-item",
        resolved_name: "MenuItemLink",
        containment: Containment::Any,
    },
    KindSpec {
        tag: "menu-dropdown",
        resolved_name: "MenuItemDropdown",
        containment: Containment::Any,
    },
];

fn spec_by_tag(tag: &str) -> Option<&'static KindSpec> {
    KINDS.iter().find(|spec| spec.tag == tag)
}

fn spec_by_resolved_name(resolved_name: &str) -> Option<&'static KindSpec> {
    KINDS.iter().find(|spec| spec.resolved_name == resolved_name)
}

/// Wire-format resolved name for a block type tag.
///
/// Strict: persisting a document must not silently drop content, so an
/// unregistered tag is an error here.
pub fn resolved_name_for(tag: &str) -> Result<&'static str, RegistryError> {
    spec_by_tag(tag)
        .map(|spec| spec.resolved_name)
        .ok_or_else(|| RegistryError::UnknownBlockType(tag.to_string()))
}

/// Block type tag for a wire-format resolved name.
///
/// Lenient: a document written by a newer editor may reference kinds this
/// version does not know, and those nodes are skipped rather than failing
/// the whole page.
pub fn block_type_for(resolved_name: &str) -> Option<&'static str> {
    spec_by_resolved_name(resolved_name).map(|spec| spec.tag)
}

/// Whether every candidate child may be attached under the given parent kind.
///
/// A move may carry several nodes at once; admission is all-or-nothing.
/// Kinds without a specialized rule (including unregistered parents, such as
/// the structural `div` containers) admit anything.
pub fn can_attach(parent_resolved_name: &str, candidate_resolved_names: &[&str]) -> bool {
    let rule = spec_by_resolved_name(parent_resolved_name)
        .map(|spec| spec.containment)
        .unwrap_or(Containment::Any);

    match rule {
        Containment::Any => true,
        Containment::Family(prefix) => candidate_resolved_names
            .iter()
            .all(|name| name.starts_with(prefix)),
    }
}
