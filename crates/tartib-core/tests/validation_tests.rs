use std::sync::Arc;

use tartib_core::content::{
    CategoryUpdate, ContentService, NewCategory, NewGlossaryTerm, NewSubcategory,
};
use tartib_core::objects::FsObjectStorage;
use tartib_core::store::MemoryStore;
use tartib_core::ContentError;
use tempfile::TempDir;

fn test_service() -> (ContentService, TempDir) {
    let temp = TempDir::new().unwrap();
    let service = ContentService::new(
        Arc::new(MemoryStore::new()),
        Arc::new(FsObjectStorage::new(temp.path())),
    );
    (service, temp)
}

fn is_validation(err: &ContentError) -> bool {
    matches!(err, ContentError::Validation(_))
}

#[tokio::test]
async fn category_title_is_required() {
    let (service, _temp) = test_service();

    let err = service
        .categories()
        .create(NewCategory::new("   "))
        .await
        .unwrap_err();
    assert!(is_validation(&err));
    assert!(service.categories().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn category_color_must_be_a_hex_code() {
    let (service, _temp) = test_service();

    let mut draft = NewCategory::new("Law");
    draft.color_hex = "green".to_string();
    let err = service.categories().create(draft).await.unwrap_err();
    assert!(is_validation(&err));

    let mut draft = NewCategory::new("Law");
    draft.color_hex = "#37B24D".to_string();
    let id = service.categories().create(draft).await.unwrap();

    let err = service
        .categories()
        .update(
            &id,
            CategoryUpdate {
                color_hex: Some("#12345".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(is_validation(&err));
}

#[tokio::test]
async fn update_with_an_empty_patch_is_a_noop() {
    let (service, _temp) = test_service();
    let id = service.categories().create(NewCategory::new("Law")).await.unwrap();
    let before = service.categories().get(&id).await.unwrap();

    service.categories().update(&id, CategoryUpdate::default()).await.unwrap();

    let after = service.categories().get(&id).await.unwrap();
    assert_eq!(before, after, "an all-None patch must not even touch updatedAt");
}

#[tokio::test]
async fn subcategory_requires_all_bilingual_fields() {
    let (service, _temp) = test_service();
    let x = service.categories().create(NewCategory::new("X")).await.unwrap();

    let err = service
        .subcategories()
        .create(NewSubcategory {
            category_id: x,
            parent_subcategory_id: None,
            title_en: "Search and seizure".to_string(),
            title_ar: String::new(),
            content_en: "...".to_string(),
            content_ar: "...".to_string(),
        })
        .await
        .unwrap_err();
    assert!(is_validation(&err));
}

#[tokio::test]
async fn subcategory_requires_a_parent_category() {
    let (service, _temp) = test_service();

    let err = service
        .subcategories()
        .create(NewSubcategory {
            category_id: String::new(),
            parent_subcategory_id: None,
            title_en: "Orphan".to_string(),
            title_ar: "(ar)".to_string(),
            content_en: "...".to_string(),
            content_ar: "...".to_string(),
        })
        .await
        .unwrap_err();
    assert!(is_validation(&err));
}

#[tokio::test]
async fn glossary_term_and_definition_are_required() {
    let (service, _temp) = test_service();

    let err = service
        .glossary()
        .create(NewGlossaryTerm {
            term: "Forensics".to_string(),
            term_arabic: String::new(),
            definition: String::new(),
            definition_arabic: String::new(),
            category: String::new(),
        })
        .await
        .unwrap_err();
    assert!(is_validation(&err));
}
