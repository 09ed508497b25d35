use std::sync::Arc;

use tartib_core::content::{ContentService, NewCategory, NewSubcategory};
use tartib_core::objects::FsObjectStorage;
use tartib_core::store::{MemoryStore, StoreError};
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

fn subcategory(category_id: &str, title: &str) -> NewSubcategory {
    NewSubcategory {
        category_id: category_id.to_string(),
        parent_subcategory_id: None,
        title_en: title.to_string(),
        title_ar: format!("{title} (ar)"),
        content_en: "content".to_string(),
        content_ar: "(ar) content".to_string(),
    }
}

#[tokio::test]
async fn deleting_a_category_removes_every_owned_subcategory() {
    let (service, _temp) = test_service();
    let x = service.categories().create(NewCategory::new("X")).await.unwrap();

    for title in ["S1", "S2", "S3", "S4"] {
        service.subcategories().create(subcategory(&x, title)).await.unwrap();
    }

    service.categories().delete(&x).await.unwrap();

    let remaining = service.subcategories().list(&x).await.unwrap();
    assert!(remaining.is_empty(), "no orphaned subcategory may persist");
    assert!(service.categories().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn cascade_spares_subcategories_of_other_categories() {
    // Scenario: X owns S1(1), S2(2); Y owns T1(1). Deleting X empties X's
    // scope and leaves T1 exactly as it was.
    let (service, _temp) = test_service();
    let x = service.categories().create(NewCategory::new("X")).await.unwrap();
    let y = service.categories().create(NewCategory::new("Y")).await.unwrap();

    service.subcategories().create(subcategory(&x, "S1")).await.unwrap();
    service.subcategories().create(subcategory(&x, "S2")).await.unwrap();
    service.subcategories().create(subcategory(&y, "T1")).await.unwrap();

    service.categories().delete(&x).await.unwrap();

    assert!(service.subcategories().list(&x).await.unwrap().is_empty());

    let in_y = service.subcategories().list(&y).await.unwrap();
    assert_eq!(in_y.len(), 1);
    assert_eq!(in_y[0].title_en, "T1");
    assert_eq!(in_y[0].order, 1);
}

#[tokio::test]
async fn cascade_includes_nested_subcategories() {
    let (service, _temp) = test_service();
    let x = service.categories().create(NewCategory::new("X")).await.unwrap();

    let s1 = service.subcategories().create(subcategory(&x, "S1")).await.unwrap();
    let mut nested = subcategory(&x, "SS1");
    nested.parent_subcategory_id = Some(s1);
    service.subcategories().create(nested).await.unwrap();

    service.categories().delete(&x).await.unwrap();

    assert!(service.subcategories().list(&x).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_childless_category_works() {
    let (service, _temp) = test_service();
    let x = service.categories().create(NewCategory::new("X")).await.unwrap();

    service.categories().delete(&x).await.unwrap();

    assert!(service.categories().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_missing_category_is_an_error() {
    let (service, _temp) = test_service();

    let err = service.categories().delete("no-such-id").await.unwrap_err();
    assert!(matches!(
        err,
        ContentError::Store(StoreError::NotFound { .. })
    ));
}
