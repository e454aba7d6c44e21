use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use beans_core::{CoreError, CoreResult};
use beans_types::api::UploadPhotoRequest;
use beans_types::models::UserId;
use reqwest::StatusCode;
use tracing::debug;
use uuid::Uuid;

pub type PhotoFuture<'a> = Pin<Box<dyn Future<Output = CoreResult<String>> + Send + 'a>>;

/// Turns an uploaded photo request into a stored image URL.
pub trait PhotoStore: Send + Sync {
    fn store<'a>(&'a self, user_id: UserId, req: &'a UploadPhotoRequest) -> PhotoFuture<'a>;
}

/// Width and height from the first start-of-frame segment of a JPEG.
pub fn jpeg_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return None;
    }
    let mut i = 2;
    while i + 4 <= bytes.len() {
        if bytes[i] != 0xFF {
            return None;
        }
        let marker = bytes[i + 1];
        if marker == 0xFF {
            // Fill byte.
            i += 1;
            continue;
        }
        let len = usize::from(u16::from_be_bytes([bytes[i + 2], bytes[i + 3]]));
        let is_frame = (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_frame {
            let seg = bytes.get(i + 4..i + 9)?;
            let height = u16::from_be_bytes([seg[1], seg[2]]);
            let width = u16::from_be_bytes([seg[3], seg[4]]);
            return Some((u32::from(width), u32::from(height)));
        }
        i += 2 + len;
    }
    None
}

/// The crop box must be non-empty and inside a `width` x `height` image.
pub fn check_crop(req: &UploadPhotoRequest, width: u32, height: u32) -> CoreResult<()> {
    let (w, h) = (i64::from(width), i64::from(height));
    if req.x_end <= req.x_start || req.y_end <= req.y_start {
        return Err(CoreError::invalid("crop end must be after crop start"));
    }
    let inside = |v: i64, max: i64| (0..=max).contains(&v);
    if !(inside(req.x_start, w) && inside(req.x_end, w) && inside(req.y_start, h) && inside(req.y_end, h)) {
        return Err(CoreError::invalid("crop box is outside the image"));
    }
    Ok(())
}

/// Downloads photos over HTTP and keeps them under a local directory that
/// the server exposes at `/imgurl`.
pub struct HttpPhotoStore {
    client: reqwest::Client,
    dir: PathBuf,
    public_url: String,
}

impl HttpPhotoStore {
    pub fn new(dir: PathBuf, public_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            dir,
            public_url,
        }
    }

    async fn fetch_and_store(&self, user_id: UserId, req: &UploadPhotoRequest) -> CoreResult<String> {
        let resp = self
            .client
            .get(&req.img_url)
            .send()
            .await
            .map_err(|e| CoreError::invalid(format!("could not fetch image: {}", e)))?;
        if resp.status() != StatusCode::OK {
            return Err(CoreError::invalid(format!("image fetch returned {}", resp.status())));
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| CoreError::invalid(format!("could not read image: {}", e)))?;

        let (width, height) =
            jpeg_dimensions(&bytes).ok_or_else(|| CoreError::invalid("image is not a JPEG"))?;
        check_crop(req, width, height)?;

        let name = format!("{}-{}.jpg", user_id, Uuid::new_v4());
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(anyhow::Error::from)?;
        tokio::fs::write(self.dir.join(&name), &bytes)
            .await
            .map_err(anyhow::Error::from)?;
        debug!("Stored {} ({}x{}) for user {}", name, width, height, user_id);

        Ok(format!("{}/imgurl/{}", self.public_url.trim_end_matches('/'), name))
    }
}

impl PhotoStore for HttpPhotoStore {
    fn store<'a>(&'a self, user_id: UserId, req: &'a UploadPhotoRequest) -> PhotoFuture<'a> {
        Box::pin(self.fetch_and_store(user_id, req))
    }
}
