//! Integration tests for the media storage pipeline
//!
//! Runs the full store/replace/delete cycle against the in-memory backend.

use image::{DynamicImage, ImageFormat, RgbImage};
use media_vault::store::{MemoryObjectStore, ObjectStore};
use media_vault::{MediaKind, MediaStorageService, MediaUpload, MediaVariant};
use std::io::Cursor;
use std::sync::Arc;

/// Helper to create a service over a shared in-memory store
fn test_service(store: &Arc<MemoryObjectStore>) -> MediaStorageService {
    MediaStorageService::new(Arc::clone(store) as Arc<dyn ObjectStore>, None)
}

fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([200, 80, 40])))
        .write_to(&mut Cursor::new(&mut buffer), format)
        .unwrap();
    buffer
}

fn png_upload(width: u32, height: u32) -> MediaUpload {
    MediaUpload::new(
        Some("picture.png".to_string()),
        Some("image/png".to_string()),
        encoded_image(width, height, ImageFormat::Png),
    )
}

fn pdf_upload(body: &[u8]) -> MediaUpload {
    MediaUpload::new(
        Some("resume.pdf".to_string()),
        Some("application/pdf".to_string()),
        body.to_vec(),
    )
}

#[tokio::test]
async fn test_image_upload_produces_bounded_variants() {
    let store = Arc::new(MemoryObjectStore::new("media"));
    let service = test_service(&store);

    let upload = MediaUpload::new(
        Some("holiday.jpg".to_string()),
        Some("image/jpeg".to_string()),
        encoded_image(4000, 3000, ImageFormat::Jpeg),
    );
    let asset = service.store(MediaKind::Image, "avatar", &upload).await.unwrap();

    assert!(asset.base_path.starts_with("media/image/avatar/"));
    assert!(asset.base_path.ends_with('/'));
    assert_eq!(asset.manifest_key, format!("{}manifest.json", asset.base_path));

    let original = &asset.manifest.original;
    assert_eq!(original.key, format!("{}original.jpg", asset.base_path));
    assert_eq!(original.content_type, "image/jpeg");
    assert_eq!(original.size, upload.size());
    assert_eq!((original.width, original.height), (Some(4000), Some(3000)));

    let expected = [
        (MediaVariant::Web, "web", 1920, 1440),
        (MediaVariant::Mobile, "mobile", 1080, 810),
        (MediaVariant::Thumb, "thumb", 320, 240),
    ];
    assert_eq!(asset.manifest.variants.len(), expected.len());
    for (variant, segment, width, height) in expected {
        let descriptor = &asset.manifest.variants[&variant];
        assert_eq!(descriptor.key, format!("{}variants/{segment}.jpg", asset.base_path));
        assert_eq!((descriptor.width, descriptor.height), (Some(width), Some(height)));
        assert_eq!(descriptor.content_type, "image/jpeg");

        let object = store.object(&descriptor.key).unwrap();
        assert_eq!(object.data.len() as u64, descriptor.size);
    }

    // original + 3 variants + manifest, all under the base path
    assert_eq!(store.keys_with_prefix(&asset.base_path).len(), 5);
    assert_eq!(store.len(), 5);
}

#[tokio::test]
async fn test_base_path_layout() {
    let store = Arc::new(MemoryObjectStore::new("media"));
    let service = test_service(&store);

    let asset = service
        .store(MediaKind::Document, "Profile Photos", &pdf_upload(b"%PDF-1.4 layout"))
        .await
        .unwrap();

    let segments: Vec<&str> = asset.base_path.trim_end_matches('/').split('/').collect();
    assert_eq!(segments.len(), 7);
    assert_eq!(&segments[..3], &["media", "document", "profile-photos"]);
    assert_eq!(segments[3].len(), 4);
    assert_eq!(segments[4].len(), 2);
    assert_eq!(segments[5].len(), 2);

    let (hash, id) = segments[6].split_at(12);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(uuid::Uuid::parse_str(id.trim_start_matches('-')).is_ok());
}

#[tokio::test]
async fn test_document_has_no_variants() {
    let store = Arc::new(MemoryObjectStore::new("media"));
    let service = test_service(&store);

    let asset = service
        .store(MediaKind::Document, "resumes", &pdf_upload(b"%PDF-1.7 body"))
        .await
        .unwrap();

    assert!(asset.manifest.variants.is_empty());
    assert_eq!(asset.manifest.original.width, None);
    assert!(asset.manifest.original.key.ends_with("/original.pdf"));
    assert_eq!(store.len(), 2);

    let manifest = store.object(&asset.manifest_key).unwrap();
    assert_eq!(manifest.content_type, "application/json");
    let value: serde_json::Value = serde_json::from_slice(&manifest.data).unwrap();
    assert_eq!(value["variants"], serde_json::json!({}));
}

#[tokio::test]
async fn test_store_all_rejects_empty_batch() {
    let store = Arc::new(MemoryObjectStore::new("media"));
    let service = test_service(&store);

    let err = service
        .store_all(MediaKind::Image, "gallery", &[])
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("at least one file"));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_gif_is_rejected_before_any_write() {
    let store = Arc::new(MemoryObjectStore::new("media"));
    let service = test_service(&store);

    let upload = MediaUpload::new(
        Some("anim.gif".to_string()),
        Some("image/gif".to_string()),
        b"GIF89a\x01\x00\x01\x00".to_vec(),
    );
    let err = service.store(MediaKind::Image, "avatar", &upload).await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(store.put_count(), 0);
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let store = Arc::new(MemoryObjectStore::new("media"));
    let service = test_service(&store);

    let upload = MediaUpload::new(
        None,
        Some("text/plain".to_string()),
        vec![b'a'; 20 * 1024 * 1024 + 1],
    );
    let err = service.store(MediaKind::Document, "notes", &upload).await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(store.put_count(), 0);
}

#[tokio::test]
async fn test_mime_type_is_case_insensitive() {
    let store = Arc::new(MemoryObjectStore::new("media"));
    let service = test_service(&store);

    let upload = MediaUpload::new(None, Some("Application/PDF".to_string()), b"%PDF".to_vec());
    let asset = service.store(MediaKind::Document, "cv", &upload).await.unwrap();

    assert_eq!(asset.manifest.original.content_type, "application/pdf");
    assert!(asset.manifest.original.key.ends_with("/original.pdf"));
}

#[tokio::test]
async fn test_replace_deletes_previous_asset() {
    let store = Arc::new(MemoryObjectStore::new("media"));
    let service = test_service(&store);

    let old = service.store(MediaKind::Image, "avatar", &png_upload(800, 600)).await.unwrap();
    let old_keys: Vec<String> = old.manifest.keys().map(str::to_string).collect();

    let new = service
        .replace(Some(&old.manifest), MediaKind::Image, "avatar", &png_upload(640, 480))
        .await
        .unwrap();

    assert_ne!(new.base_path, old.base_path);
    for key in &old_keys {
        assert!(!store.contains(key), "{key} should have been deleted");
    }
    assert!(!store.contains(&old.manifest_key));
    assert!(store.keys_with_prefix(&old.base_path).is_empty());

    for key in new.manifest.keys() {
        assert!(store.contains(key));
    }
    assert!(store.contains(&new.manifest_key));
}

#[tokio::test]
async fn test_replace_without_existing_just_stores() {
    let store = Arc::new(MemoryObjectStore::new("media"));
    let service = test_service(&store);

    let asset = service
        .replace(None, MediaKind::Document, "cv", &pdf_upload(b"%PDF first"))
        .await
        .unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(store.delete_count(), 0);
    assert!(store.contains(&asset.manifest_key));
}

#[tokio::test]
async fn test_failed_replace_keeps_old_asset() {
    let store = Arc::new(MemoryObjectStore::new("media").fail_puts_containing("/banner/"));
    let service = test_service(&store);

    let old = service.store(MediaKind::Image, "avatar", &png_upload(400, 400)).await.unwrap();
    let err = service
        .replace(Some(&old.manifest), MediaKind::Image, "banner", &png_upload(400, 400))
        .await
        .unwrap_err();

    assert!(err.is_storage());
    assert_eq!(store.delete_count(), 0);
    for key in old.manifest.keys() {
        assert!(store.contains(key));
    }
    assert!(store.contains(&old.manifest_key));
}

#[tokio::test]
async fn test_variant_failure_leaves_orphans_without_manifest() {
    let store = Arc::new(MemoryObjectStore::new("media").fail_puts_containing("/variants/mobile"));
    let service = test_service(&store).with_parallel_variants(false);

    let err = service
        .store(MediaKind::Image, "avatar", &png_upload(2000, 1000))
        .await
        .unwrap_err();
    assert!(err.is_storage());

    let keys = store.keys();
    assert!(keys.iter().any(|k| k.ends_with("/original.png")));
    assert!(keys.iter().any(|k| k.ends_with("/variants/web.png")));
    assert!(!keys.iter().any(|k| k.ends_with("/variants/thumb.png")));
    assert!(!keys.iter().any(|k| k.ends_with("/manifest.json")));
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let store = Arc::new(MemoryObjectStore::new("media"));
    let service = test_service(&store);

    let asset = service.store(MediaKind::Image, "avatar", &png_upload(500, 500)).await.unwrap();
    assert_eq!(store.len(), 5);

    service.delete(Some(&asset.manifest)).await.unwrap();
    assert!(store.is_empty());

    service.delete(Some(&asset.manifest)).await.unwrap();
    assert!(store.is_empty());

    service.delete(None).await.unwrap();
}

#[tokio::test]
async fn test_store_all_preserves_input_order() {
    let store = Arc::new(MemoryObjectStore::new("media"));
    let service = test_service(&store);

    let uploads = vec![
        pdf_upload(b"%PDF a"),
        pdf_upload(b"%PDF bbbb"),
        pdf_upload(b"%PDF cccccccc"),
    ];
    let assets = service
        .store_all(MediaKind::Document, "contracts", &uploads)
        .await
        .unwrap();

    let sizes: Vec<u64> = assets.iter().map(|a| a.manifest.original.size).collect();
    let expected: Vec<u64> = uploads.iter().map(MediaUpload::size).collect();
    assert_eq!(sizes, expected);
    assert_eq!(store.len(), 6);
}

#[tokio::test]
async fn test_store_all_stops_at_first_failure() {
    let store = Arc::new(MemoryObjectStore::new("media"));
    let service = test_service(&store);

    let uploads = vec![
        pdf_upload(b"%PDF ok"),
        MediaUpload::new(None, Some("image/gif".to_string()), b"GIF89a".to_vec()),
        pdf_upload(b"%PDF never stored"),
    ];
    let err = service
        .store_all(MediaKind::Document, "contracts", &uploads)
        .await
        .unwrap_err();

    assert!(err.is_validation());
    // The first asset stays; the third was never attempted
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn test_identical_uploads_get_distinct_base_paths() {
    let store = Arc::new(MemoryObjectStore::new("media"));
    let service = test_service(&store);

    let upload = pdf_upload(b"%PDF same bytes");
    let first = service.store(MediaKind::Document, "cv", &upload).await.unwrap();
    let second = service.store(MediaKind::Document, "cv", &upload).await.unwrap();

    assert_ne!(first.base_path, second.base_path);
    let hash = |path: &str| path.trim_end_matches('/').rsplit('/').next().unwrap()[..12].to_string();
    assert_eq!(hash(&first.base_path), hash(&second.base_path));
}

#[tokio::test]
async fn test_load_returns_stored_manifest() {
    let store = Arc::new(MemoryObjectStore::new("media"));
    let service = test_service(&store);

    let asset = service.store(MediaKind::Image, "avatar", &png_upload(300, 200)).await.unwrap();
    let loaded = service.load(&asset.manifest_key).await.unwrap();
    assert_eq!(loaded, asset.manifest);

    let missing = service.load("media/image/avatar/none/manifest.json").await.unwrap_err();
    assert!(missing.is_storage());
}

#[tokio::test]
async fn test_public_base_url_prefixes_descriptor_urls() {
    let store = Arc::new(MemoryObjectStore::new("media"));
    let service = MediaStorageService::new(
        Arc::clone(&store) as Arc<dyn ObjectStore>,
        Some("https://cdn.example.com".to_string()),
    );

    let asset = service.store(MediaKind::Image, "avatar", &png_upload(100, 100)).await.unwrap();
    assert_eq!(
        asset.manifest.original.url,
        format!("https://cdn.example.com/{}", asset.manifest.original.key)
    );
    for descriptor in asset.manifest.variants.values() {
        assert!(descriptor.url.starts_with("https://cdn.example.com/media/image/avatar/"));
    }
}

#[tokio::test]
async fn test_sequential_and_parallel_variants_agree() {
    let store = Arc::new(MemoryObjectStore::new("media"));
    let parallel = test_service(&store);
    let sequential = test_service(&store).with_parallel_variants(false);

    let upload = png_upload(1500, 2500);
    let a = parallel.store(MediaKind::Image, "gallery", &upload).await.unwrap();
    let b = sequential.store(MediaKind::Image, "gallery", &upload).await.unwrap();

    let dims = |asset: &media_vault::MediaAsset| {
        asset
            .manifest
            .variants
            .iter()
            .map(|(v, d)| (*v, d.width, d.height))
            .collect::<Vec<_>>()
    };
    assert_eq!(dims(&a), dims(&b));
    assert_eq!(a.manifest.variants[&MediaVariant::Web].height, Some(1920));
}
