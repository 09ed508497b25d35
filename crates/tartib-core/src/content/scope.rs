use crate::store::{Filter, Sort, ORDER_FIELD};

/// Foreign-key field tying a subcategory to its owning category.
pub(crate) const CATEGORY_ID_FIELD: &str = "categoryId";

/// The set of entities among which a strict order is maintained.
///
/// Categories, glossary terms, diagrams and templates order globally within
/// their collection; subcategories order within their owning category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiblingScope {
    Global,
    WithinParent {
        field: &'static str,
        parent_id: String,
    },
}

impl SiblingScope {
    /// Scope of the subcategories owned by one category.
    pub fn subcategories_of(category_id: impl Into<String>) -> Self {
        SiblingScope::WithinParent {
            field: CATEGORY_ID_FIELD,
            parent_id: category_id.into(),
        }
    }

    /// Filter selecting exactly the siblings of this scope.
    pub fn filter(&self) -> Filter {
        match self {
            SiblingScope::Global => Filter::all(),
            SiblingScope::WithinParent { field, parent_id } => {
                Filter::field(*field, parent_id.as_str())
            }
        }
    }

    /// Sort to request from the store.
    ///
    /// Global scopes delegate ordering to the store. Parent-scoped reads
    /// sort client-side after filtering, which keeps the store free of a
    /// compound (parent, order) index at the cost of a little CPU per
    /// snapshot.
    pub fn server_sort(&self) -> Option<Sort> {
        match self {
            SiblingScope::Global => Some(Sort::ascending(ORDER_FIELD)),
            SiblingScope::WithinParent { .. } => None,
        }
    }
}
