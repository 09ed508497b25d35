use std::path::PathBuf;
use std::sync::Arc;

use tartib_core::content::{AssetUpload, ContentService, NewDiagram, NewTemplate};
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

fn diagram(title: &str) -> NewDiagram {
    NewDiagram {
        title: title.to_string(),
        title_arabic: String::new(),
        description: "A flow".to_string(),
        description_arabic: String::new(),
        category: String::new(),
    }
}

fn template(title: &str) -> NewTemplate {
    NewTemplate {
        title: title.to_string(),
        title_arabic: String::new(),
        description: String::new(),
        description_arabic: String::new(),
        category: String::new(),
    }
}

fn png() -> AssetUpload {
    AssetUpload::new("chart.png", vec![0x89, b'P', b'N', b'G'])
}

fn stored_file(temp: &TempDir, prefix: &str, file_name: &str) -> PathBuf {
    temp.path().join(prefix).join(file_name)
}

#[tokio::test]
async fn diagram_create_uploads_and_records_the_image() {
    let (service, temp) = test_service();

    let id = service.diagrams().create(diagram("Seizure flow"), Some(png())).await.unwrap();

    let stored = service.diagrams().get(&id).await.unwrap();
    assert!(!stored.image_url.is_empty());
    assert_eq!(stored.image_original_name, "chart.png");
    assert_eq!(stored.image_size, 4);
    assert!(stored.image_file_name.starts_with(&format!("{id}_")));
    assert!(stored.image_file_name.ends_with(".png"));
    assert!(stored_file(&temp, "diagrams", &stored.image_file_name).exists());
}

#[tokio::test]
async fn diagram_create_without_an_image_is_fine() {
    let (service, _temp) = test_service();

    let id = service.diagrams().create(diagram("Bare"), None).await.unwrap();

    let stored = service.diagrams().get(&id).await.unwrap();
    assert!(stored.image_url.is_empty());
    assert!(stored.image_file_name.is_empty());
    assert_eq!(stored.image_size, 0);
}

#[tokio::test]
async fn deleting_a_diagram_removes_image_and_metadata() {
    let (service, temp) = test_service();
    let id = service.diagrams().create(diagram("Doomed"), Some(png())).await.unwrap();
    let stored = service.diagrams().get(&id).await.unwrap();
    let file = stored_file(&temp, "diagrams", &stored.image_file_name);
    assert!(file.exists());

    service.diagrams().delete(&id).await.unwrap();

    assert!(!file.exists());
    assert!(service.diagrams().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_diagram_with_a_missing_image_still_removes_metadata() {
    let (service, temp) = test_service();
    let id = service.diagrams().create(diagram("Half-gone"), Some(png())).await.unwrap();
    let stored = service.diagrams().get(&id).await.unwrap();

    // Someone already removed the object out from under us.
    std::fs::remove_file(stored_file(&temp, "diagrams", &stored.image_file_name)).unwrap();

    service.diagrams().delete(&id).await.unwrap();
    assert!(service.diagrams().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn replacing_an_image_deletes_the_old_object() {
    let (service, temp) = test_service();
    let id = service.diagrams().create(diagram("Evolving"), Some(png())).await.unwrap();
    let old = service.diagrams().get(&id).await.unwrap();
    let old_file = stored_file(&temp, "diagrams", &old.image_file_name);

    service
        .diagrams()
        .update(
            &id,
            Default::default(),
            Some(AssetUpload::new("better.jpg", vec![1, 2, 3, 4, 5])),
        )
        .await
        .unwrap();

    let new = service.diagrams().get(&id).await.unwrap();
    assert_ne!(new.image_file_name, old.image_file_name);
    assert_eq!(new.image_original_name, "better.jpg");
    assert_eq!(new.image_size, 5);
    assert!(new.image_file_name.ends_with(".jpg"));
    assert!(!old_file.exists());
    assert!(stored_file(&temp, "diagrams", &new.image_file_name).exists());
}

#[tokio::test]
async fn template_create_requires_a_pdf() {
    let (service, _temp) = test_service();

    let err = service
        .templates()
        .create(template("No file"), AssetUpload::new("empty.pdf", Vec::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, ContentError::Validation(_)));
}

#[tokio::test]
async fn template_create_stores_the_pdf() {
    let (service, temp) = test_service();

    let id = service
        .templates()
        .create(
            template("Evidence log"),
            AssetUpload::new("log.pdf", b"%PDF-1.7".to_vec()),
        )
        .await
        .unwrap();

    let stored = service.templates().get(&id).await.unwrap();
    assert_eq!(stored.pdf_original_name, "log.pdf");
    assert_eq!(stored.pdf_size, 8);
    assert!(stored.pdf_file_name.ends_with(".pdf"));
    assert!(stored_file(&temp, "templates", &stored.pdf_file_name).exists());

    service.templates().delete(&id).await.unwrap();
    assert!(!stored_file(&temp, "templates", &stored.pdf_file_name).exists());
}

#[tokio::test]
async fn media_families_order_independently() {
    let (service, _temp) = test_service();

    let d1 = service.diagrams().create(diagram("D1"), None).await.unwrap();
    service.diagrams().create(diagram("D2"), None).await.unwrap();
    service
        .templates()
        .create(template("T1"), AssetUpload::new("t1.pdf", b"%PDF".to_vec()))
        .await
        .unwrap();

    service.diagrams().move_down(&d1).await.unwrap();

    let diagrams = service.diagrams().list().await.unwrap();
    let templates = service.templates().list().await.unwrap();
    assert_eq!(
        diagrams.iter().map(|d| d.title.as_str()).collect::<Vec<_>>(),
        ["D2", "D1"]
    );
    assert_eq!(templates[0].order, 1);
}
