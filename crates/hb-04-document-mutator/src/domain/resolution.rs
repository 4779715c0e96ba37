//! # Identity Resolution
//!
//! Locating the native element a domain object stands for.
//!
//! | Step | Condition | Lookup |
//! |------|-----------|--------|
//! | 1 | identity link present | element with that unique id, no fallback |
//! | 2 | no identity link, name present | elements of the native class registered for the domain type, matched by name |
//! | 3 | several name matches | `TieBreak` |

use serde::{Deserialize, Serialize};
use shared_types::NativeClass;
use std::collections::HashMap;

use super::element::NativeElement;

/// How a domain type is searched by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCapability {
    pub native_class: NativeClass,
    pub case_sensitive: bool,
}

impl ClassCapability {
    /// Exact name match, honoring case sensitivity.
    #[must_use]
    pub fn name_matches(&self, candidate: &str, wanted: &str) -> bool {
        if self.case_sensitive {
            candidate == wanted
        } else {
            candidate.to_lowercase() == wanted.to_lowercase()
        }
    }
}

/// Domain type to native class lookup, populated at startup.
#[derive(Debug, Clone, Default)]
pub struct ResolutionTable {
    by_domain_type: HashMap<String, ClassCapability>,
}

impl ResolutionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table covering the datum types matched by name out of the box.
    pub fn standard() -> Self {
        Self::new()
            .with_class("Storey", "Level")
            .with_class("Level", "Level")
            .with_class("Grid", "Grid")
    }

    /// Register a case-sensitive mapping.
    #[must_use]
    pub fn with_class(mut self, domain_type: &str, native_class: &str) -> Self {
        self.register(domain_type, native_class, true);
        self
    }

    /// Register a mapping whose name match ignores case.
    #[must_use]
    pub fn with_class_ignoring_case(mut self, domain_type: &str, native_class: &str) -> Self {
        self.register(domain_type, native_class, false);
        self
    }

    pub fn register(&mut self, domain_type: &str, native_class: &str, case_sensitive: bool) {
        self.by_domain_type.insert(
            domain_type.to_string(),
            ClassCapability {
                native_class: NativeClass::new(native_class),
                case_sensitive,
            },
        );
    }

    pub fn lookup(&self, domain_type: &str) -> Option<&ClassCapability> {
        self.by_domain_type.get(domain_type)
    }

    pub fn len(&self) -> usize {
        self.by_domain_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_domain_type.is_empty()
    }
}

/// Which candidate wins when several elements share a name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Smallest numeric id. Deterministic regardless of host enumeration.
    #[default]
    LowestNumericId,
    /// Whatever the host enumerates first.
    FirstEnumerated,
}

impl TieBreak {
    pub fn pick(self, candidates: impl IntoIterator<Item = NativeElement>) -> Option<NativeElement> {
        let mut candidates = candidates.into_iter();
        match self {
            Self::LowestNumericId => candidates.min_by_key(|element| element.numeric_id),
            Self::FirstEnumerated => candidates.next(),
        }
    }
}
