//! # Passthrough Translator
//!
//! Translator whose domain objects are the element fields as JSON. The
//! object shape deserializes as an `ElementLocator`, so pulled objects can be
//! sent straight back for deletion.

use crate::domain::errors::TranslationError;
use crate::domain::{NativeElement, ResolutionTable};
use crate::ports::{HostDocument, Translator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{ElementIdentifiers, NativeClass, NumericId, SettingsBundle, WorksetId};

/// Domain object produced and consumed by [`PassthroughTranslator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainObject {
    #[serde(default)]
    pub identifiers: Option<ElementIdentifiers>,
    pub name: String,
    pub domain_type: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub workset: Option<WorksetId>,
}

#[derive(Debug, Clone, Default)]
pub struct PassthroughTranslator {
    table: ResolutionTable,
}

impl PassthroughTranslator {
    /// Native classes are taken verbatim from the domain type.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map domain types through `table` when building native elements.
    pub fn with_table(table: ResolutionTable) -> Self {
        Self { table }
    }

    fn parse(object: &Value) -> Result<DomainObject, TranslationError> {
        let object: DomainObject = serde_json::from_value(object.clone())
            .map_err(|e| TranslationError::Invalid(e.to_string()))?;
        if object.name.is_empty() {
            return Err(TranslationError::Invalid("object has no name".into()));
        }
        Ok(object)
    }

    fn native_class(&self, domain_type: &str) -> NativeClass {
        self.table
            .lookup(domain_type)
            .map_or_else(|| NativeClass::new(domain_type), |c| c.native_class.clone())
    }
}

impl<D: HostDocument + ?Sized> Translator<D> for PassthroughTranslator {
    fn translate(
        &self,
        element: &NativeElement,
        _settings: &SettingsBundle,
    ) -> Result<Value, TranslationError> {
        let object = DomainObject {
            identifiers: Some(element.identifiers()),
            name: element.name.clone(),
            domain_type: element.class.to_string(),
            category: element.category.clone(),
            workset: element.workset,
        };
        serde_json::to_value(object).map_err(|e| TranslationError::Invalid(e.to_string()))
    }

    fn translate_back(
        &self,
        object: &Value,
        document: &mut D,
        _settings: &SettingsBundle,
    ) -> Result<NumericId, TranslationError> {
        let object = Self::parse(object)?;
        if object.domain_type.is_empty() {
            return Err(TranslationError::Unsupported("object has no domain type".into()));
        }

        let mut element = NativeElement::new(object.name, self.native_class(&object.domain_type));
        element.category = object.category;
        element.workset = object.workset;
        if let Some(host) = object
            .identifiers
            .map(|ids| ids.parent_element_id)
            .filter(|id| *id >= 0)
        {
            element.host = Some(NumericId(host));
        }

        Ok(document.insert(element)?)
    }

    fn identity(&self, object: &Value) -> Option<String> {
        let identifiers: ElementIdentifiers =
            serde_json::from_value(object.get("identifiers")?.clone()).ok()?;
        (!identifiers.unique_id.is_empty()).then_some(identifiers.unique_id)
    }

    fn update(
        &self,
        object: &Value,
        element: &NativeElement,
        document: &mut D,
        _settings: &SettingsBundle,
    ) -> Result<NumericId, TranslationError> {
        let object = Self::parse(object)?;

        let mut updated = element.clone();
        updated.name = object.name;
        if object.category.is_some() {
            updated.category = object.category;
        }
        if object.workset.is_some() {
            updated.workset = object.workset;
        }
        document.update(updated)?;
        Ok(element.numeric_id)
    }
}
