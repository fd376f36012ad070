//! Avatar pipeline
//!
//! Two distinct paths: a pure derivation of the default avatar URL from
//! the email address (registration time, no I/O), and the upload
//! pipeline that spools the transient upload, normalizes the image to a
//! fixed square in the background, and stores it under a deterministic
//! name. Processing failures are logged; they never reach the response.

use anyhow::{Context, Result};
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, ImageFormat};
use sha2::{Digest, Sha256};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Side length of stored avatars, in pixels
pub const AVATAR_SIZE: u32 = 250;

/// JPEG re-encode quality
pub const JPEG_QUALITY: u8 = 90;

/// Deterministic default avatar for an address (gravatar-style URL
/// keyed by the SHA-256 of the normalized email). Pure, no I/O.
pub fn default_avatar_url(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    let hash = hex::encode(Sha256::digest(normalized.as_bytes()));
    format!("https://www.gravatar.com/avatar/{}", hash)
}

/// Asset name for an uploaded avatar: `<account_id>_<original filename>`,
/// with any path components stripped from the client-supplied name.
pub fn asset_name(account_id: &str, original_filename: &str) -> String {
    let safe_name = Path::new(original_filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("avatar");
    format!("{}_{}", account_id, safe_name)
}

/// Stores processed avatars and spools transient uploads
pub struct AvatarStore {
    avatars_dir: PathBuf,
    tmp_dir: PathBuf,
}

impl AvatarStore {
    pub async fn new(avatars_dir: PathBuf, tmp_dir: PathBuf) -> Result<Self> {
        tokio::fs::create_dir_all(&avatars_dir)
            .await
            .with_context(|| format!("creating avatars dir {}", avatars_dir.display()))?;
        tokio::fs::create_dir_all(&tmp_dir)
            .await
            .with_context(|| format!("creating tmp dir {}", tmp_dir.display()))?;

        Ok(Self {
            avatars_dir,
            tmp_dir,
        })
    }

    /// Directory served statically under /avatars
    pub fn dir(&self) -> &Path {
        &self.avatars_dir
    }

    /// Write the raw upload to a transient spool file
    pub async fn spool(&self, data: &[u8]) -> Result<PathBuf> {
        let path = self.tmp_dir.join(Uuid::new_v4().to_string());
        tokio::fs::write(&path, data)
            .await
            .with_context(|| format!("spooling upload to {}", path.display()))?;
        Ok(path)
    }

    /// Delete a spooled upload. Called on every code path, so a failure
    /// here is logged rather than propagated.
    pub async fn discard(&self, path: &Path) {
        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::warn!("Failed to remove transient upload {}: {}", path.display(), e);
        }
    }

    /// Dispatch decode → resize → encode without blocking the request.
    /// The task owns its copy of the bytes, so discarding the spool file
    /// cannot race the decode. Failures are reported through the log.
    pub fn process_in_background(&self, data: Vec<u8>, filename: &str) {
        let dest = self.avatars_dir.join(filename);
        tokio::task::spawn_blocking(move || {
            if let Err(e) = write_normalized(&data, &dest) {
                tracing::error!("Avatar processing failed for {}: {:#}", dest.display(), e);
            }
        });
    }
}

/// Decode, resize to the fixed square, and re-encode at the destination.
/// Output format follows the destination extension; JPEG is written at
/// the fixed quality level.
fn write_normalized(data: &[u8], dest: &Path) -> Result<()> {
    let img = image::load_from_memory(data).context("decoding uploaded image")?;
    let resized = img.resize_exact(AVATAR_SIZE, AVATAR_SIZE, FilterType::Triangle);

    let format = ImageFormat::from_path(dest).unwrap_or(ImageFormat::Jpeg);
    let file = std::fs::File::create(dest)
        .with_context(|| format!("creating {}", dest.display()))?;
    let mut writer = BufWriter::new(file);

    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
            resized
                .write_with_encoder(encoder)
                .context("encoding avatar as JPEG")?;
        }
        _ => {
            resized
                .write_to(&mut writer, format)
                .context("encoding avatar")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(8, 8, image::Rgb([120, 40, 200]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_default_avatar_is_deterministic() {
        let a = default_avatar_url("user@example.com");
        let b = default_avatar_url("user@example.com");
        assert_eq!(a, b);

        // Normalization: case and surrounding whitespace don't matter
        assert_eq!(a, default_avatar_url("  User@Example.COM "));

        // Different addresses get different avatars
        assert_ne!(a, default_avatar_url("other@example.com"));
    }

    #[test]
    fn test_default_avatar_shape() {
        let url = default_avatar_url("user@example.com");
        let hash = url.rsplit('/').next().unwrap();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_asset_name_strips_path_components() {
        assert_eq!(asset_name("id-1", "me.png"), "id-1_me.png");
        assert_eq!(asset_name("id-1", "../../etc/passwd"), "id-1_passwd");
        assert_eq!(asset_name("id-1", "dir/photo.jpg"), "id-1_photo.jpg");
    }

    #[test]
    fn test_normalize_resizes_to_fixed_square() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.png");

        write_normalized(&tiny_png(), &dest).unwrap();

        let stored = image::open(&dest).unwrap();
        assert_eq!(stored.width(), AVATAR_SIZE);
        assert_eq!(stored.height(), AVATAR_SIZE);
    }

    #[test]
    fn test_normalize_writes_jpeg_for_jpg_extension() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.jpg");

        write_normalized(&tiny_png(), &dest).unwrap();

        // Content, not just extension: the bytes were re-encoded as JPEG
        let reader = image::ImageReader::open(&dest)
            .unwrap()
            .with_guessed_format()
            .unwrap();
        assert_eq!(reader.format(), Some(ImageFormat::Jpeg));

        let stored = image::open(&dest).unwrap();
        assert_eq!(stored.width(), AVATAR_SIZE);
    }

    #[test]
    fn test_normalize_rejects_corrupt_data() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.png");

        let result = write_normalized(b"definitely not an image", &dest);
        assert!(result.is_err());
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_spool_and_discard() {
        let dir = tempfile::tempdir().unwrap();
        let store = AvatarStore::new(dir.path().join("avatars"), dir.path().join("tmp"))
            .await
            .unwrap();

        let spooled = store.spool(b"raw upload bytes").await.unwrap();
        assert!(spooled.exists());
        assert_eq!(tokio::fs::read(&spooled).await.unwrap(), b"raw upload bytes");

        store.discard(&spooled).await;
        assert!(!spooled.exists());
    }
}
