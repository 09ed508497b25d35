//! Bilingual content services: ordered taxonomy, glossary and media
//! collections over a [`DocumentStore`] and an [`ObjectStorage`].
//!
//! Each family exposes the same shape — `create`, `update`, `delete`,
//! `move_up`, `move_down`, `list`, `subscribe` — backed by one generic
//! [`OrderedCollection`]. Reordering never leaves a partial swap behind,
//! category deletion cascades atomically over the owned subcategories, and
//! subscribers always observe confirmed, fully sorted sibling snapshots.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tartib_core::content::{ContentService, NewCategory};
//! use tartib_core::objects::FsObjectStorage;
//! use tartib_core::store::MemoryStore;
//!
//! let service = ContentService::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(FsObjectStorage::new("./assets")),
//! );
//! let id = service.categories().create(NewCategory::new("Law")).await?;
//! service.categories().move_up(&id).await?;
//! ```

mod entities;
mod error;
mod media;
mod ordering;
mod scope;
mod validate;

pub use entities::{
    Category, CategoryUpdate, Diagram, DiagramUpdate, GlossaryTerm, GlossaryTermUpdate,
    NewCategory, NewDiagram, NewGlossaryTerm, NewSubcategory, NewTemplate, OrderedEntity,
    Subcategory, SubcategoryUpdate, Template, TemplateUpdate, DEFAULT_COLOR_HEX,
};
pub use error::ContentError;
pub use media::AssetUpload;
pub use ordering::{sort_siblings, OrderedCollection, Subscription};
pub use scope::SiblingScope;

use std::sync::Arc;

use tracing::info;

use crate::objects::ObjectStorage;
use crate::store::{Document, DocumentStore, Filter, WriteOp};

use media::{DIAGRAM_ASSET, TEMPLATE_ASSET};
use scope::CATEGORY_ID_FIELD;

/// Facade constructing the per-family services over shared collaborators.
pub struct ContentService {
    categories: CategoryService,
    subcategories: SubcategoryService,
    glossary: GlossaryService,
    diagrams: DiagramService,
    templates: TemplateService,
}

impl ContentService {
    pub fn new(store: Arc<dyn DocumentStore>, objects: Arc<dyn ObjectStorage>) -> Self {
        Self {
            categories: CategoryService::new(Arc::clone(&store)),
            subcategories: SubcategoryService::new(Arc::clone(&store)),
            glossary: GlossaryService::new(Arc::clone(&store)),
            diagrams: DiagramService::new(Arc::clone(&store), Arc::clone(&objects)),
            templates: TemplateService::new(store, objects),
        }
    }

    pub fn categories(&self) -> &CategoryService {
        &self.categories
    }

    pub fn subcategories(&self) -> &SubcategoryService {
        &self.subcategories
    }

    pub fn glossary(&self) -> &GlossaryService {
        &self.glossary
    }

    pub fn diagrams(&self) -> &DiagramService {
        &self.diagrams
    }

    pub fn templates(&self) -> &TemplateService {
        &self.templates
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Top-level taxonomy management, including the cascade delete.
pub struct CategoryService {
    items: OrderedCollection<Category>,
    store: Arc<dyn DocumentStore>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            items: OrderedCollection::new(Arc::clone(&store)),
            store,
        }
    }

    pub async fn create(&self, draft: NewCategory) -> Result<String, ContentError> {
        validate::require("titleEn", &draft.title_en)?;
        validate::color_hex(&draft.color_hex)?;
        self.items.create(Document::encode(&draft)?).await
    }

    pub async fn get(&self, id: &str) -> Result<Category, ContentError> {
        self.items.get(id).await
    }

    pub async fn update(&self, id: &str, update: CategoryUpdate) -> Result<(), ContentError> {
        validate::require_opt("titleEn", update.title_en.as_ref())?;
        validate::color_hex_opt(update.color_hex.as_ref())?;
        self.items.update(id, Document::encode(&update)?).await
    }

    /// Deletes the category and every subcategory that references it, as
    /// one atomic batch. The subcategory set is queried first and the batch
    /// includes every match, so no orphan can survive.
    pub async fn delete(&self, id: &str) -> Result<(), ContentError> {
        self.items.get(id).await?;

        let children = self
            .store
            .query(
                Subcategory::COLLECTION,
                Filter::field(CATEGORY_ID_FIELD, id),
                None,
            )
            .await?;

        let mut ops = vec![WriteOp::delete(Category::COLLECTION, id)];
        ops.extend(
            children
                .iter()
                .map(|doc| WriteOp::delete(Subcategory::COLLECTION, doc.id.clone())),
        );
        self.store.batch_write(ops).await?;

        info!(
            category = id,
            subcategories = children.len(),
            "cascade-deleted category"
        );
        Ok(())
    }

    pub async fn move_up(&self, id: &str) -> Result<(), ContentError> {
        self.items.move_up(id).await
    }

    pub async fn move_down(&self, id: &str) -> Result<(), ContentError> {
        self.items.move_down(id).await
    }

    pub async fn list(&self) -> Result<Vec<Category>, ContentError> {
        self.items.list(&SiblingScope::Global).await
    }

    pub async fn subscribe<F>(&self, callback: F) -> Result<Subscription, ContentError>
    where
        F: Fn(Vec<Category>) + Send + 'static,
    {
        self.items.subscribe(&SiblingScope::Global, callback).await
    }
}

// ---------------------------------------------------------------------------
// Subcategories
// ---------------------------------------------------------------------------

/// Subcategory management; every read and reorder is scoped to the owning
/// category.
pub struct SubcategoryService {
    items: OrderedCollection<Subcategory>,
}

impl SubcategoryService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            items: OrderedCollection::new(store),
        }
    }

    pub async fn create(&self, draft: NewSubcategory) -> Result<String, ContentError> {
        validate::require("categoryId", &draft.category_id)?;
        validate::require("titleEn", &draft.title_en)?;
        validate::require("titleAr", &draft.title_ar)?;
        validate::require("contentEn", &draft.content_en)?;
        validate::require("contentAr", &draft.content_ar)?;
        self.items.create(Document::encode(&draft)?).await
    }

    pub async fn get(&self, id: &str) -> Result<Subcategory, ContentError> {
        self.items.get(id).await
    }

    pub async fn update(&self, id: &str, update: SubcategoryUpdate) -> Result<(), ContentError> {
        validate::require_opt("titleEn", update.title_en.as_ref())?;
        validate::require_opt("titleAr", update.title_ar.as_ref())?;
        validate::require_opt("contentEn", update.content_en.as_ref())?;
        validate::require_opt("contentAr", update.content_ar.as_ref())?;
        self.items.update(id, Document::encode(&update)?).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ContentError> {
        self.items.delete(id).await
    }

    pub async fn move_up(&self, id: &str) -> Result<(), ContentError> {
        self.items.move_up(id).await
    }

    pub async fn move_down(&self, id: &str) -> Result<(), ContentError> {
        self.items.move_down(id).await
    }

    pub async fn list(&self, category_id: &str) -> Result<Vec<Subcategory>, ContentError> {
        self.items
            .list(&SiblingScope::subcategories_of(category_id))
            .await
    }

    pub async fn subscribe<F>(
        &self,
        category_id: &str,
        callback: F,
    ) -> Result<Subscription, ContentError>
    where
        F: Fn(Vec<Subcategory>) + Send + 'static,
    {
        self.items
            .subscribe(&SiblingScope::subcategories_of(category_id), callback)
            .await
    }
}

// ---------------------------------------------------------------------------
// Glossary
// ---------------------------------------------------------------------------

pub struct GlossaryService {
    items: OrderedCollection<GlossaryTerm>,
}

impl GlossaryService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            items: OrderedCollection::new(store),
        }
    }

    pub async fn create(&self, draft: NewGlossaryTerm) -> Result<String, ContentError> {
        validate::require("term", &draft.term)?;
        validate::require("definition", &draft.definition)?;
        self.items.create(Document::encode(&draft)?).await
    }

    pub async fn get(&self, id: &str) -> Result<GlossaryTerm, ContentError> {
        self.items.get(id).await
    }

    pub async fn update(&self, id: &str, update: GlossaryTermUpdate) -> Result<(), ContentError> {
        validate::require_opt("term", update.term.as_ref())?;
        validate::require_opt("definition", update.definition.as_ref())?;
        self.items.update(id, Document::encode(&update)?).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ContentError> {
        self.items.delete(id).await
    }

    pub async fn move_up(&self, id: &str) -> Result<(), ContentError> {
        self.items.move_up(id).await
    }

    pub async fn move_down(&self, id: &str) -> Result<(), ContentError> {
        self.items.move_down(id).await
    }

    pub async fn list(&self) -> Result<Vec<GlossaryTerm>, ContentError> {
        self.items.list(&SiblingScope::Global).await
    }

    pub async fn subscribe<F>(&self, callback: F) -> Result<Subscription, ContentError>
    where
        F: Fn(Vec<GlossaryTerm>) + Send + 'static,
    {
        self.items.subscribe(&SiblingScope::Global, callback).await
    }
}

// ---------------------------------------------------------------------------
// Diagrams
// ---------------------------------------------------------------------------

/// Diagram management; the image lives in object storage and follows the
/// metadata record through replace and delete.
pub struct DiagramService {
    items: OrderedCollection<Diagram>,
    objects: Arc<dyn ObjectStorage>,
}

impl DiagramService {
    pub fn new(store: Arc<dyn DocumentStore>, objects: Arc<dyn ObjectStorage>) -> Self {
        Self {
            items: OrderedCollection::new(store),
            objects,
        }
    }

    /// Creates the diagram, then uploads and records the image if one was
    /// provided.
    pub async fn create(
        &self,
        draft: NewDiagram,
        image: Option<AssetUpload>,
    ) -> Result<String, ContentError> {
        validate::require("title", &draft.title)?;
        let id = self.items.create(Document::encode(&draft)?).await?;

        if let Some(upload) = image {
            let patch = media::attach_asset(&self.objects, &DIAGRAM_ASSET, &id, &upload).await?;
            self.items.update(&id, patch).await?;
        }
        Ok(id)
    }

    pub async fn get(&self, id: &str) -> Result<Diagram, ContentError> {
        self.items.get(id).await
    }

    /// Patches content fields; a new image replaces the old one, which is
    /// then deleted best-effort.
    pub async fn update(
        &self,
        id: &str,
        update: DiagramUpdate,
        new_image: Option<AssetUpload>,
    ) -> Result<(), ContentError> {
        validate::require_opt("title", update.title.as_ref())?;
        let current = self.items.get(id).await?;

        let mut patch = Document::encode(&update)?;
        if let Some(upload) = &new_image {
            let asset_patch =
                media::attach_asset(&self.objects, &DIAGRAM_ASSET, id, upload).await?;
            patch.extend(asset_patch);
        }
        self.items.update(id, patch).await?;

        if new_image.is_some() {
            media::discard_asset(&self.objects, &DIAGRAM_ASSET, &current.image_file_name).await;
        }
        Ok(())
    }

    /// Deletes the stored image together with the metadata record. The
    /// image delete is best-effort; only a failed metadata delete fails the
    /// operation.
    pub async fn delete(&self, id: &str) -> Result<(), ContentError> {
        let current = self.items.get(id).await?;
        media::discard_asset(&self.objects, &DIAGRAM_ASSET, &current.image_file_name).await;
        self.items.delete(id).await
    }

    pub async fn move_up(&self, id: &str) -> Result<(), ContentError> {
        self.items.move_up(id).await
    }

    pub async fn move_down(&self, id: &str) -> Result<(), ContentError> {
        self.items.move_down(id).await
    }

    pub async fn list(&self) -> Result<Vec<Diagram>, ContentError> {
        self.items.list(&SiblingScope::Global).await
    }

    pub async fn subscribe<F>(&self, callback: F) -> Result<Subscription, ContentError>
    where
        F: Fn(Vec<Diagram>) + Send + 'static,
    {
        self.items.subscribe(&SiblingScope::Global, callback).await
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// Template management; unlike diagrams, the PDF is mandatory at creation.
pub struct TemplateService {
    items: OrderedCollection<Template>,
    objects: Arc<dyn ObjectStorage>,
}

impl TemplateService {
    pub fn new(store: Arc<dyn DocumentStore>, objects: Arc<dyn ObjectStorage>) -> Self {
        Self {
            items: OrderedCollection::new(store),
            objects,
        }
    }

    pub async fn create(
        &self,
        draft: NewTemplate,
        pdf: AssetUpload,
    ) -> Result<String, ContentError> {
        validate::require("title", &draft.title)?;
        if pdf.bytes.is_empty() {
            return Err(ContentError::Validation("a PDF file is required".into()));
        }

        let id = self.items.create(Document::encode(&draft)?).await?;
        let patch = media::attach_asset(&self.objects, &TEMPLATE_ASSET, &id, &pdf).await?;
        self.items.update(&id, patch).await?;
        Ok(id)
    }

    pub async fn get(&self, id: &str) -> Result<Template, ContentError> {
        self.items.get(id).await
    }

    pub async fn update(
        &self,
        id: &str,
        update: TemplateUpdate,
        new_pdf: Option<AssetUpload>,
    ) -> Result<(), ContentError> {
        validate::require_opt("title", update.title.as_ref())?;
        let current = self.items.get(id).await?;

        let mut patch = Document::encode(&update)?;
        if let Some(upload) = &new_pdf {
            let asset_patch =
                media::attach_asset(&self.objects, &TEMPLATE_ASSET, id, upload).await?;
            patch.extend(asset_patch);
        }
        self.items.update(id, patch).await?;

        if new_pdf.is_some() {
            media::discard_asset(&self.objects, &TEMPLATE_ASSET, &current.pdf_file_name).await;
        }
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), ContentError> {
        let current = self.items.get(id).await?;
        media::discard_asset(&self.objects, &TEMPLATE_ASSET, &current.pdf_file_name).await;
        self.items.delete(id).await
    }

    pub async fn move_up(&self, id: &str) -> Result<(), ContentError> {
        self.items.move_up(id).await
    }

    pub async fn move_down(&self, id: &str) -> Result<(), ContentError> {
        self.items.move_down(id).await
    }

    pub async fn list(&self) -> Result<Vec<Template>, ContentError> {
        self.items.list(&SiblingScope::Global).await
    }

    pub async fn subscribe<F>(&self, callback: F) -> Result<Subscription, ContentError>
    where
        F: Fn(Vec<Template>) + Send + 'static,
    {
        self.items.subscribe(&SiblingScope::Global, callback).await
    }
}
