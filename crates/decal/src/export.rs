//! Composite export.
//!
//! Visible layers are loaded in z-order and drawn centered on one
//! transparent canvas, then encoded as PNG. The print file keeps source
//! resolution (upscaling small art up to a cap) and the thumbnail is a
//! fixed square.
//!
//! Layers whose images fail to load are logged and skipped; the export only
//! fails when nothing could be loaded.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use atelier_config::ExportConfig;
use atelier_ipc::{ExportKind, ExportSummary};
use image::{DynamicImage, ImageFormat, RgbaImage, imageops};
use tracing::{debug, info, warn};

use crate::error::{ExportError, ImageLoadError};
use crate::types::{Layer, SourceRef};

/// Resolves a layer source to pixels
#[allow(async_fn_in_trait)]
pub trait ImageLoader {
    async fn load(&self, source: &SourceRef) -> Result<RgbaImage, ImageLoadError>;
}

/// Loads sources as file paths, optionally relative to a root directory.
/// `file://` prefixes are accepted.
#[derive(Debug, Clone, Default)]
pub struct FsImageLoader {
    root: Option<PathBuf>,
}

impl FsImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, source: &SourceRef) -> PathBuf {
        let raw = source.as_str();
        let path = Path::new(raw.strip_prefix("file://").unwrap_or(raw));
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ImageLoader for FsImageLoader {
    async fn load(&self, source: &SourceRef) -> Result<RgbaImage, ImageLoadError> {
        let path = self.resolve(source);
        let bytes = tokio::fs::read(&path).await.map_err(|error| {
            if error.kind() == std::io::ErrorKind::NotFound {
                ImageLoadError::NotFound(path.display().to_string())
            } else {
                ImageLoadError::Io {
                    source_ref: source.to_string(),
                    error,
                }
            }
        })?;
        let image = image::load_from_memory(&bytes).map_err(|error| ImageLoadError::Decode {
            source_ref: source.to_string(),
            error,
        })?;
        Ok(image.to_rgba8())
    }
}

/// In-memory images keyed by source, for hosts that already hold decoded
/// uploads
#[derive(Debug, Clone, Default)]
pub struct MemoryImageLoader {
    images: HashMap<SourceRef, RgbaImage>,
}

impl MemoryImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: impl Into<SourceRef>, image: RgbaImage) {
        self.images.insert(source.into(), image);
    }
}

impl ImageLoader for MemoryImageLoader {
    async fn load(&self, source: &SourceRef) -> Result<RgbaImage, ImageLoadError> {
        self.images
            .get(source)
            .cloned()
            .ok_or_else(|| ImageLoadError::NotFound(source.to_string()))
    }
}

/// Canvas size and per-image scale of a composite
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasLayout {
    pub width: u32,
    pub height: u32,
    pub scale: f32,
}

impl CanvasLayout {
    /// Print file: the largest image is scaled toward the max edge (capped
    /// upscale) and the canvas never goes below the min edge.
    pub fn print(max_width: u32, max_height: u32, config: &ExportConfig) -> Self {
        let longest = max_width.max(max_height).max(1) as f32;
        let scale = (config.print_max_size as f32 / longest).min(config.print_max_upscale);
        Self {
            width: config.print_min_size.max((max_width as f32 * scale) as u32),
            height: config.print_min_size.max((max_height as f32 * scale) as u32),
            scale,
        }
    }

    /// Thumbnail: fixed square, the largest image covers the fill fraction
    pub fn thumbnail(max_width: u32, max_height: u32, config: &ExportConfig) -> Self {
        let longest = max_width.max(max_height).max(1) as f32;
        Self {
            width: config.thumbnail_size,
            height: config.thumbnail_size,
            scale: config.thumbnail_size as f32 * config.thumbnail_fill / longest,
        }
    }

    fn for_kind(kind: ExportKind, max_width: u32, max_height: u32, config: &ExportConfig) -> Self {
        match kind {
            ExportKind::PrintFile => Self::print(max_width, max_height, config),
            ExportKind::Thumbnail => Self::thumbnail(max_width, max_height, config),
        }
    }
}

/// An encoded composite
#[derive(Debug, Clone)]
pub struct Composite {
    pub kind: ExportKind,
    pub width: u32,
    pub height: u32,
    /// Layers drawn into the composite
    pub layer_count: usize,
    pub png: Vec<u8>,
}

impl Composite {
    pub fn summary(&self) -> ExportSummary {
        ExportSummary {
            kind: self.kind,
            width: self.width,
            height: self.height,
            byte_len: self.png.len(),
            layer_count: self.layer_count,
        }
    }
}

/// Full resolution print file of all visible layers
pub async fn export_print_file(
    layers: &[Layer],
    loader: &impl ImageLoader,
    config: &ExportConfig,
) -> Result<Composite, ExportError> {
    export_composite(ExportKind::PrintFile, layers, loader, config).await
}

/// Square thumbnail of all visible layers
pub async fn export_thumbnail(
    layers: &[Layer],
    loader: &impl ImageLoader,
    config: &ExportConfig,
) -> Result<Composite, ExportError> {
    export_composite(ExportKind::Thumbnail, layers, loader, config).await
}

pub async fn export_composite(
    kind: ExportKind,
    layers: &[Layer],
    loader: &impl ImageLoader,
    config: &ExportConfig,
) -> Result<Composite, ExportError> {
    let images = load_visible(layers, loader).await?;

    let max_width = images.iter().map(|i| i.width()).max().unwrap_or(0);
    let max_height = images.iter().map(|i| i.height()).max().unwrap_or(0);
    let layout = CanvasLayout::for_kind(kind, max_width, max_height, config);
    debug!("{:?} layout: {:?}", kind, layout);

    let canvas = compose(&images, &layout);
    let png = encode_png(canvas)?;
    info!(
        "Exported {:?} {}x{} with {} layers ({} bytes)",
        kind,
        layout.width,
        layout.height,
        images.len(),
        png.len()
    );

    Ok(Composite {
        kind,
        width: layout.width,
        height: layout.height,
        layer_count: images.len(),
        png,
    })
}

/// Load visible layer images sequentially, in z-order
async fn load_visible(
    layers: &[Layer],
    loader: &impl ImageLoader,
) -> Result<Vec<RgbaImage>, ExportError> {
    let visible: Vec<&Layer> = layers.iter().filter(|l| l.visible).collect();
    if visible.is_empty() {
        return Err(ExportError::EmptyExport);
    }

    let mut images = Vec::with_capacity(visible.len());
    for layer in visible {
        match loader.load(&layer.source).await {
            Ok(image) => images.push(image),
            Err(e) => warn!("Skipping layer {} in export: {}", layer.id, e),
        }
    }

    if images.is_empty() {
        return Err(ExportError::NoImagesLoaded);
    }
    Ok(images)
}

/// Draw every image centered on a transparent canvas, later images on top
fn compose(images: &[RgbaImage], layout: &CanvasLayout) -> RgbaImage {
    let mut canvas = RgbaImage::new(layout.width, layout.height);

    for image in images {
        let width = ((image.width() as f32 * layout.scale).round() as u32).max(1);
        let height = ((image.height() as f32 * layout.scale).round() as u32).max(1);
        let scaled = if (width, height) == image.dimensions() {
            image.clone()
        } else {
            imageops::resize(image, width, height, imageops::FilterType::CatmullRom)
        };

        let x = (layout.width as i64 - width as i64) / 2;
        let y = (layout.height as i64 - height as i64) / 2;
        imageops::overlay(&mut canvas, &scaled, x, y);
    }
    canvas
}

fn encode_png(canvas: RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut png = Vec::new();
    DynamicImage::ImageRgba8(canvas).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    if png.is_empty() {
        return Err(ExportError::Serialization("encoder produced no data".to_string()));
    }
    Ok(png)
}
