//! Entity families of the content model.
//!
//! Field names serialize in the camelCase form the admin console's
//! documents use (`titleEn`, `categoryId`, `imageUrl`, ...). Ids, `order`
//! and both timestamps are store-assigned; the `New*` drafts carry only the
//! caller-supplied fields and the `*Update` patches carry optional
//! replacements (absent fields are left untouched).

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::store::Fields;

use super::scope::{SiblingScope, CATEGORY_ID_FIELD};

/// Default swatch assigned to new categories.
pub const DEFAULT_COLOR_HEX: &str = "#37B24D";

/// An entity participating in a strictly ordered sibling scope.
pub trait OrderedEntity:
    Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Store collection holding this entity family.
    const COLLECTION: &'static str;

    /// Human-readable kind for logs.
    const KIND: &'static str;

    fn id(&self) -> &str;

    fn order(&self) -> i64;

    /// Display name used to break order ties at read time (never persisted
    /// into the order itself).
    fn display_name(&self) -> &str;

    /// Resolves the sibling scope from an entity's own fields.
    ///
    /// This is the single source of truth for "what counts as a sibling":
    /// order assignment on create and neighbor lookup on move both derive
    /// their filter from here, so the two can never disagree.
    fn scope_of(fields: &Fields) -> SiblingScope;
}

fn default_color_hex() -> String {
    DEFAULT_COLOR_HEX.to_string()
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Top-level taxonomy node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default)]
    pub id: String,
    pub title_en: String,
    #[serde(default)]
    pub title_ar: String,
    #[serde(default = "default_color_hex")]
    pub color_hex: String,
    #[serde(default)]
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub title_en: String,
    pub title_ar: String,
    pub color_hex: String,
}

impl NewCategory {
    /// Draft with just the English title; the Arabic title can be added
    /// later through an edit.
    pub fn new(title_en: impl Into<String>) -> Self {
        Self {
            title_en: title_en.into(),
            title_ar: String::new(),
            color_hex: default_color_hex(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_ar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_hex: Option<String>,
}

impl OrderedEntity for Category {
    const COLLECTION: &'static str = "categories";
    const KIND: &'static str = "category";

    fn id(&self) -> &str {
        &self.id
    }

    fn order(&self) -> i64 {
        self.order
    }

    fn display_name(&self) -> &str {
        &self.title_en
    }

    fn scope_of(_fields: &Fields) -> SiblingScope {
        SiblingScope::Global
    }
}

// ---------------------------------------------------------------------------
// Subcategories
// ---------------------------------------------------------------------------

/// Second- and third-level taxonomy node.
///
/// Sub-subcategories are stored in the same collection with
/// `parentSubcategoryId` set; they share the per-category ordering scope,
/// exactly as the console stores them. `categoryId` is immutable after
/// creation (no re-parenting).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subcategory {
    #[serde(default)]
    pub id: String,
    pub category_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_subcategory_id: Option<String>,
    pub title_en: String,
    #[serde(default)]
    pub title_ar: String,
    #[serde(default)]
    pub content_en: String,
    #[serde(default)]
    pub content_ar: String,
    #[serde(default)]
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubcategory {
    pub category_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_subcategory_id: Option<String>,
    pub title_en: String,
    pub title_ar: String,
    pub content_en: String,
    pub content_ar: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_ar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_ar: Option<String>,
}

impl OrderedEntity for Subcategory {
    const COLLECTION: &'static str = "subcategories";
    const KIND: &'static str = "subcategory";

    fn id(&self) -> &str {
        &self.id
    }

    fn order(&self) -> i64 {
        self.order
    }

    fn display_name(&self) -> &str {
        &self.title_en
    }

    fn scope_of(fields: &Fields) -> SiblingScope {
        let parent = fields
            .get(CATEGORY_ID_FIELD)
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        SiblingScope::subcategories_of(parent)
    }
}

// ---------------------------------------------------------------------------
// Glossary
// ---------------------------------------------------------------------------

/// Cross-linked glossary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryTerm {
    #[serde(default)]
    pub id: String,
    pub term: String,
    #[serde(default)]
    pub term_arabic: String,
    pub definition: String,
    #[serde(default)]
    pub definition_arabic: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGlossaryTerm {
    pub term: String,
    pub term_arabic: String,
    pub definition: String,
    pub definition_arabic: String,
    pub category: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryTermUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_arabic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition_arabic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl OrderedEntity for GlossaryTerm {
    const COLLECTION: &'static str = "glossary";
    const KIND: &'static str = "glossary term";

    fn id(&self) -> &str {
        &self.id
    }

    fn order(&self) -> i64 {
        self.order
    }

    fn display_name(&self) -> &str {
        &self.term
    }

    fn scope_of(_fields: &Fields) -> SiblingScope {
        SiblingScope::Global
    }
}

// ---------------------------------------------------------------------------
// Diagrams
// ---------------------------------------------------------------------------

/// Diagram with an optional stored image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub title_arabic: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_arabic: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub image_file_name: String,
    #[serde(default)]
    pub image_original_name: String,
    #[serde(default)]
    pub image_size: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDiagram {
    pub title: String,
    pub title_arabic: String,
    pub description: String,
    pub description_arabic: String,
    pub category: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_arabic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_arabic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl OrderedEntity for Diagram {
    const COLLECTION: &'static str = "diagrams";
    const KIND: &'static str = "diagram";

    fn id(&self) -> &str {
        &self.id
    }

    fn order(&self) -> i64 {
        self.order
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn scope_of(_fields: &Fields) -> SiblingScope {
        SiblingScope::Global
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// Downloadable document template; the PDF is mandatory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub title_arabic: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_arabic: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub pdf_url: String,
    #[serde(default)]
    pub pdf_file_name: String,
    #[serde(default)]
    pub pdf_original_name: String,
    #[serde(default)]
    pub pdf_size: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    pub title: String,
    pub title_arabic: String,
    pub description: String,
    pub description_arabic: String,
    pub category: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_arabic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_arabic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl OrderedEntity for Template {
    const COLLECTION: &'static str = "templates";
    const KIND: &'static str = "template";

    fn id(&self) -> &str {
        &self.id
    }

    fn order(&self) -> i64 {
        self.order
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn scope_of(_fields: &Fields) -> SiblingScope {
        SiblingScope::Global
    }
}
