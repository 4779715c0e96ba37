use super::denial::PolicyDenial;
use crate::ports::SelectionSource;
use shared_types::{ElementReference, SelectionPolicy};

/// Selection criterion of the write-access policy.
///
/// Decision order:
///
/// 1. Unique-id allow-list non-empty: the reference's unique id must be in it.
/// 2. Numeric-id and category allow-lists empty and live selection not
///    requested: allow.
/// 3. Numeric id in the allow-list: go to the category check.
/// 4. Otherwise the live selection decides: not requested, unavailable, or
///    non-empty without the element all deny. An empty selection passes.
///    A category list therefore narrows explicit ids or the live selection
///    and never admits an element on its own.
/// 5. Category allow-list non-empty: the reference's category must be in it.
pub struct SelectionRules;

impl SelectionRules {
    /// Evaluate the selection criterion for one element.
    pub fn evaluate<S: SelectionSource + ?Sized>(
        policy: &SelectionPolicy,
        reference: &ElementReference,
        selection: &S,
    ) -> Result<(), PolicyDenial> {
        Self::validate_unique_id(policy, reference)?;
        Self::validate_numeric_id(policy, reference, selection)?;
        Self::validate_category(policy, reference)
    }

    /// Step 1.
    pub fn validate_unique_id(
        policy: &SelectionPolicy,
        reference: &ElementReference,
    ) -> Result<(), PolicyDenial> {
        if policy.unique_ids.is_empty() {
            return Ok(());
        }

        match reference.unique_id.as_deref() {
            Some(uid) if policy.unique_ids.contains(uid) => Ok(()),
            _ => Err(PolicyDenial::UniqueIdNotAllowed {
                unique_id: reference.unique_id.clone(),
            }),
        }
    }

    /// Steps 2 to 4.
    pub fn validate_numeric_id<S: SelectionSource + ?Sized>(
        policy: &SelectionPolicy,
        reference: &ElementReference,
        selection: &S,
    ) -> Result<(), PolicyDenial> {
        if policy.numeric_ids.is_empty()
            && policy.category_names.is_empty()
            && !policy.include_selected
        {
            return Ok(());
        }

        if reference
            .numeric_id
            .is_some_and(|id| policy.numeric_ids.contains(&id))
        {
            return Ok(());
        }

        if !policy.include_selected {
            return Err(PolicyDenial::NumericIdNotAllowed {
                numeric_id: reference.numeric_id,
            });
        }

        let Some(selected) = selection.current_selection() else {
            return Err(PolicyDenial::SelectionUnavailable);
        };

        let is_selected = reference
            .numeric_id
            .is_some_and(|id| selected.contains(&id));
        if !selected.is_empty() && !is_selected {
            return Err(PolicyDenial::NotSelected {
                numeric_id: reference.numeric_id,
            });
        }

        Ok(())
    }

    /// Step 5. A reference without a category fails a non-empty list.
    pub fn validate_category(
        policy: &SelectionPolicy,
        reference: &ElementReference,
    ) -> Result<(), PolicyDenial> {
        if policy.category_names.is_empty() {
            return Ok(());
        }

        match reference.category.as_deref() {
            Some(category) if policy.category_names.contains(category) => Ok(()),
            _ => Err(PolicyDenial::CategoryNotAllowed {
                category: reference.category.clone(),
            }),
        }
    }
}
