//! Native element as the mutator sees it.

use serde::{Deserialize, Serialize};
use shared_types::{ElementIdentifiers, ElementReference, NativeClass, NumericId, WorksetId};

/// One element of the host document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeElement {
    /// Session-transient id. `NumericId::INVALID` until the host assigns one.
    pub numeric_id: NumericId,
    /// Session-stable id. Empty until the host assigns one.
    pub unique_id: String,
    pub name: String,
    pub class: NativeClass,
    pub category: Option<String>,
    pub workset: Option<WorksetId>,
    /// Element this one depends on. Deleting the host removes it too.
    pub host: Option<NumericId>,
}

impl NativeElement {
    /// Element not yet added to a document.
    pub fn new(name: impl Into<String>, class: impl Into<NativeClass>) -> Self {
        Self {
            numeric_id: NumericId::INVALID,
            unique_id: String::new(),
            name: name.into(),
            class: class.into(),
            category: None,
            workset: None,
            host: None,
        }
    }

    #[must_use]
    pub fn with_ids(mut self, numeric_id: NumericId, unique_id: impl Into<String>) -> Self {
        self.numeric_id = numeric_id;
        self.unique_id = unique_id.into();
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn in_workset(mut self, workset: WorksetId) -> Self {
        self.workset = Some(workset);
        self
    }

    #[must_use]
    pub fn hosted_by(mut self, host: NumericId) -> Self {
        self.host = Some(host);
        self
    }

    /// Fresh policy reference for this element.
    pub fn reference(&self) -> ElementReference {
        ElementReference {
            unique_id: (!self.unique_id.is_empty()).then(|| self.unique_id.clone()),
            numeric_id: self.numeric_id.is_valid().then_some(self.numeric_id),
            category: self.category.clone(),
        }
    }

    /// Identifier fragment to copy onto the translated domain object.
    pub fn identifiers(&self) -> ElementIdentifiers {
        ElementIdentifiers {
            unique_id: self.unique_id.clone(),
            element_id: self.numeric_id.0,
            category_name: self.category.clone().unwrap_or_default(),
            parent_element_id: self.host.map_or(-1, |host| host.0),
            ..ElementIdentifiers::default()
        }
    }
}
