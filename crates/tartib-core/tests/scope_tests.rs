use std::sync::Arc;

use tartib_core::content::{ContentService, NewCategory, NewSubcategory};
use tartib_core::objects::FsObjectStorage;
use tartib_core::store::MemoryStore;
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
async fn sibling_orders_are_scoped_per_category() {
    let (service, _temp) = test_service();
    let x = service.categories().create(NewCategory::new("X")).await.unwrap();
    let y = service.categories().create(NewCategory::new("Y")).await.unwrap();

    // Interleaved creation across the two scopes: each keeps its own
    // 1-based sequence.
    service.subcategories().create(subcategory(&x, "S1")).await.unwrap();
    service.subcategories().create(subcategory(&y, "T1")).await.unwrap();
    service.subcategories().create(subcategory(&x, "S2")).await.unwrap();
    service.subcategories().create(subcategory(&y, "T2")).await.unwrap();
    service.subcategories().create(subcategory(&y, "T3")).await.unwrap();

    let in_x = service.subcategories().list(&x).await.unwrap();
    let in_y = service.subcategories().list(&y).await.unwrap();
    assert_eq!(in_x.iter().map(|s| s.order).collect::<Vec<_>>(), [1, 2]);
    assert_eq!(in_y.iter().map(|s| s.order).collect::<Vec<_>>(), [1, 2, 3]);
}

#[tokio::test]
async fn moves_in_one_scope_never_touch_another() {
    let (service, _temp) = test_service();
    let x = service.categories().create(NewCategory::new("X")).await.unwrap();
    let y = service.categories().create(NewCategory::new("Y")).await.unwrap();

    let s1 = service.subcategories().create(subcategory(&x, "S1")).await.unwrap();
    service.subcategories().create(subcategory(&x, "S2")).await.unwrap();
    service.subcategories().create(subcategory(&y, "T1")).await.unwrap();
    service.subcategories().create(subcategory(&y, "T2")).await.unwrap();
    service.subcategories().create(subcategory(&y, "T3")).await.unwrap();

    let before = service.subcategories().list(&y).await.unwrap();
    service.subcategories().move_down(&s1).await.unwrap();
    let after = service.subcategories().list(&y).await.unwrap();

    assert_eq!(before, after, "scope Y must be untouched by a move in X");

    let in_x = service.subcategories().list(&x).await.unwrap();
    assert_eq!(
        in_x.iter().map(|s| s.title_en.as_str()).collect::<Vec<_>>(),
        ["S2", "S1"]
    );
}

#[tokio::test]
async fn same_order_values_in_different_scopes_never_swap() {
    // S1 in X and T1 in Y both hold order 1; a move in X must pick its
    // neighbor from X only, even though T1's order also matches.
    let (service, _temp) = test_service();
    let x = service.categories().create(NewCategory::new("X")).await.unwrap();
    let y = service.categories().create(NewCategory::new("Y")).await.unwrap();

    service.subcategories().create(subcategory(&x, "S1")).await.unwrap();
    let s2 = service.subcategories().create(subcategory(&x, "S2")).await.unwrap();
    service.subcategories().create(subcategory(&y, "T1")).await.unwrap();

    service.subcategories().move_up(&s2).await.unwrap();

    let t1 = &service.subcategories().list(&y).await.unwrap()[0];
    assert_eq!(t1.title_en, "T1");
    assert_eq!(t1.order, 1);
}

#[tokio::test]
async fn nested_subcategories_share_the_parent_category_scope() {
    // A sub-subcategory lives in the same collection and the same
    // per-category ordering sequence as its siblings.
    let (service, _temp) = test_service();
    let x = service.categories().create(NewCategory::new("X")).await.unwrap();

    let s1 = service.subcategories().create(subcategory(&x, "S1")).await.unwrap();
    let s2 = service.subcategories().create(subcategory(&x, "S2")).await.unwrap();

    let mut nested = subcategory(&x, "SS1");
    nested.parent_subcategory_id = Some(s1.clone());
    let ss1 = service.subcategories().create(nested).await.unwrap();

    let listed = service.subcategories().list(&x).await.unwrap();
    assert_eq!(listed.iter().map(|s| s.order).collect::<Vec<_>>(), [1, 2, 3]);

    service.subcategories().move_up(&ss1).await.unwrap();

    let s2_after = service.subcategories().get(&s2).await.unwrap();
    let ss1_after = service.subcategories().get(&ss1).await.unwrap();
    assert_eq!(ss1_after.order, 2);
    assert_eq!(s2_after.order, 3);
    assert_eq!(ss1_after.parent_subcategory_id.as_deref(), Some(s1.as_str()));
}
