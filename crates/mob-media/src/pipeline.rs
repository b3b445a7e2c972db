use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::data_uri::DataUri;
use crate::error::{IngestError, IngestResult};
use crate::source::ImageSource;

/// What the pipeline does with the bytes it reads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestMode {
    /// Store the original file as-is.
    Passthrough,
    /// Decode, downsample, and re-encode as JPEG.
    #[default]
    Compress,
}

/// Configuration for the [`ImageIngestor`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub mode: IngestMode,
    /// Cap on the longer side, in pixels.
    pub max_dimension: u32,
    /// JPEG quality, 1-100.
    pub jpeg_quality: u8,
    /// Scale images smaller than `max_dimension` up to it.
    pub allow_upscale: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            mode: IngestMode::Compress,
            max_dimension: 1200,
            jpeg_quality: 70,
            allow_upscale: false,
        }
    }
}

impl IngestConfig {
    pub fn passthrough() -> Self {
        Self {
            mode: IngestMode::Passthrough,
            ..Default::default()
        }
    }
}

/// Target size for an image so that its longer side fits `max`.
///
/// Landscape images (wider than tall) cap the width, everything else caps
/// the height. The other side is scaled by the same factor and truncated,
/// never below one pixel. Images already within the cap are returned
/// unchanged unless `allow_upscale` is set.
pub fn fit_dimensions(width: u32, height: u32, max: u32, allow_upscale: bool) -> (u32, u32) {
    let long = width.max(height);
    if long == 0 || max == 0 || (long <= max && !allow_upscale) {
        return (width, height);
    }
    let scale = f64::from(max) / f64::from(long);
    let scaled = |side: u32| ((f64::from(side) * scale) as u32).max(1);
    if width > height {
        (max, scaled(height))
    } else {
        (scaled(width), max)
    }
}

/// Turns uploaded images into storable data URIs.
///
/// Each call runs read -> decode -> resize -> encode strictly in that order
/// and resolves only once the encoded string exists. Decoding and encoding
/// are CPU-bound and run on the blocking pool.
#[derive(Clone, Debug, Default)]
pub struct ImageIngestor {
    config: IngestConfig,
}

impl ImageIngestor {
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Ingest one image.
    pub async fn ingest<S: ImageSource + ?Sized>(&self, source: &S) -> IngestResult<DataUri> {
        let name = source.name().to_string();
        let bytes = source.read().await.map_err(|e| {
            warn!(name = %name, error = %e, "image read failed");
            IngestError::Read {
                name: name.clone(),
                source: e,
            }
        })?;
        debug!(name = %name, bytes = bytes.len(), mode = ?self.config.mode, "image read");

        match self.config.mode {
            IngestMode::Passthrough => Ok(passthrough(&bytes, source.content_type())),
            IngestMode::Compress => {
                let config = self.config.clone();
                tokio::task::spawn_blocking(move || compress(&name, &bytes, &config))
                    .await
                    .map_err(|e| IngestError::Worker(e.to_string()))?
            }
        }
    }

    /// Ingest several images one after another, keeping their order.
    /// Stops at the first failure.
    pub async fn ingest_all<S: ImageSource>(&self, sources: &[S]) -> IngestResult<Vec<DataUri>> {
        let mut uris = Vec::with_capacity(sources.len());
        for source in sources {
            uris.push(self.ingest(source).await?);
        }
        Ok(uris)
    }
}

fn passthrough(bytes: &[u8], declared: Option<&str>) -> DataUri {
    let mime = image::guess_format(bytes)
        .ok()
        .map(|format| format.to_mime_type())
        .or(declared)
        .unwrap_or("application/octet-stream");
    DataUri::encode(mime, bytes)
}

fn compress(name: &str, bytes: &[u8], config: &IngestConfig) -> IngestResult<DataUri> {
    let decoded = image::load_from_memory(bytes).map_err(|e| {
        warn!(name, error = %e, "image decode failed");
        IngestError::Decode {
            name: name.to_string(),
            source: e,
        }
    })?;

    let (width, height) = (decoded.width(), decoded.height());
    let (target_w, target_h) =
        fit_dimensions(width, height, config.max_dimension, config.allow_upscale);
    let resized = if (target_w, target_h) == (width, height) {
        decoded
    } else {
        decoded.resize_exact(target_w, target_h, FilterType::Triangle)
    };

    // JPEG has no alpha channel.
    let rgb = resized.to_rgb8();
    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, config.jpeg_quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(|e| IngestError::Encode {
            name: name.to_string(),
            source: e,
        })?;

    debug!(
        name,
        from = ?(width, height),
        to = ?(target_w, target_h),
        bytes_in = bytes.len(),
        bytes_out = encoded.len(),
        "image compressed"
    );
    Ok(DataUri::encode("image/jpeg", &encoded))
}
