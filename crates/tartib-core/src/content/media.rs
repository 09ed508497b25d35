//! Asset lifecycle shared by the diagram and template families.
//!
//! An asset is uploaded after its metadata document exists (the object key
//! embeds the document id), and the document is then patched with the
//! resulting url/filename/size. Deletion is best-effort on the object side:
//! a missing or undeletable object is logged and skipped, and only a failed
//! metadata delete fails the operation.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::warn;

use crate::objects::{ObjectError, ObjectStorage};
use crate::store::Fields;

use super::error::ContentError;

/// Field layout of one asset-carrying entity family.
pub(crate) struct AssetSpec {
    pub prefix: &'static str,
    pub url_field: &'static str,
    pub file_name_field: &'static str,
    pub original_name_field: &'static str,
    pub size_field: &'static str,
}

pub(crate) const DIAGRAM_ASSET: AssetSpec = AssetSpec {
    prefix: "diagrams",
    url_field: "imageUrl",
    file_name_field: "imageFileName",
    original_name_field: "imageOriginalName",
    size_field: "imageSize",
};

pub(crate) const TEMPLATE_ASSET: AssetSpec = AssetSpec {
    prefix: "templates",
    url_field: "pdfUrl",
    file_name_field: "pdfFileName",
    original_name_field: "pdfOriginalName",
    size_field: "pdfSize",
};

/// A binary asset handed in by the caller.
#[derive(Debug, Clone)]
pub struct AssetUpload {
    pub original_name: String,
    pub bytes: Vec<u8>,
}

impl AssetUpload {
    pub fn new(original_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            original_name: original_name.into(),
            bytes,
        }
    }
}

/// Uploads the asset and returns the document patch recording it.
pub(crate) async fn attach_asset(
    objects: &Arc<dyn ObjectStorage>,
    spec: &AssetSpec,
    doc_id: &str,
    upload: &AssetUpload,
) -> Result<Fields, ContentError> {
    let extension = Path::new(&upload.original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("bin");
    let file_name = format!("{doc_id}_{}.{extension}", Utc::now().timestamp_millis());
    let path = format!("{}/{file_name}", spec.prefix);

    let url = objects.put(&path, &upload.bytes).await?;

    let mut patch = Fields::new();
    patch.insert(spec.url_field.to_string(), Value::String(url));
    patch.insert(spec.file_name_field.to_string(), Value::String(file_name));
    patch.insert(
        spec.original_name_field.to_string(),
        Value::String(upload.original_name.clone()),
    );
    patch.insert(
        spec.size_field.to_string(),
        Value::from(upload.bytes.len() as u64),
    );
    Ok(patch)
}

/// Removes a stored asset, best-effort. Empty file names (no asset was ever
/// attached) are a no-op.
pub(crate) async fn discard_asset(
    objects: &Arc<dyn ObjectStorage>,
    spec: &AssetSpec,
    file_name: &str,
) {
    if file_name.is_empty() {
        return;
    }
    let path = format!("{}/{file_name}", spec.prefix);
    match objects.delete(&path).await {
        Ok(()) => {}
        Err(ObjectError::NotFound(_)) => {
            warn!(%path, "asset already missing, continuing");
        }
        Err(err) => {
            warn!(%path, %err, "failed to delete asset, continuing");
        }
    }
}
