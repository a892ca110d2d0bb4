//! Subcommand implementations

use std::path::{Path, PathBuf};

use atelier_config::{ConfigError, StudioConfig};
use atelier_ipc::{EngineToUi, ExportKind, IpcError, encode_engine_message};
use decal::{
    DesignDocument, DesignError, ExportError, FsImageLoader, OptimizeError, Studio, optimize_upload,
    print_size_cm,
};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to read design {path}: {error}")]
    Design { path: PathBuf, error: DesignError },

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Optimize(#[from] OptimizeError),

    #[error(transparent)]
    Ipc(#[from] IpcError),

    #[error("{path}: {error}")]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },
}

/// Resolve the studio configuration from flags and the environment
pub fn load_config(
    path: Option<&Path>,
    product: Option<&str>,
) -> Result<StudioConfig, CliError> {
    let mut config = match path {
        Some(path) => StudioConfig::load(path)?,
        None => StudioConfig::from_env()?,
    };
    if let Some(product) = product {
        config.select_product(product)?;
    }
    Ok(config)
}

async fn read_design(path: &Path) -> Result<DesignDocument, CliError> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|error| CliError::Io {
            path: path.to_path_buf(),
            error,
        })?;
    DesignDocument::from_json(&json).map_err(|error| CliError::Design {
        path: path.to_path_buf(),
        error,
    })
}

/// Composite a design to PNG. Prints the export summary as a panel message.
pub async fn export(
    config: StudioConfig,
    design: &Path,
    out: &Path,
    kind: ExportKind,
    images_root: Option<&Path>,
) -> Result<String, CliError> {
    let document = read_design(design).await?;
    let mut studio = Studio::new(config)?;
    studio.load_design(document);

    let root = images_root
        .map(Path::to_path_buf)
        .or_else(|| design.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    let loader = FsImageLoader::with_root(root);

    let composite = studio.export(kind, &loader).await?;
    tokio::fs::write(out, &composite.png)
        .await
        .map_err(|error| CliError::Io {
            path: out.to_path_buf(),
            error,
        })?;
    info!("Wrote {}", out.display());

    Ok(encode_engine_message(&EngineToUi::ExportFinished(
        composite.summary(),
    ))?)
}

/// One line per layer, bottom to top
pub async fn inspect(config: StudioConfig, design: &Path) -> Result<Vec<String>, CliError> {
    let document = read_design(design).await?;
    let mut studio = Studio::new(config)?;
    studio.load_design(document);

    let store = studio.store();
    let lines = store
        .layers()
        .iter()
        .enumerate()
        .map(|(index, layer)| {
            let (width_cm, height_cm) = print_size_cm(layer.scale);
            let mut flags = Vec::new();
            if !layer.visible {
                flags.push("hidden");
            }
            if layer.locked {
                flags.push("locked");
            }
            if store.active() == Some(layer.id) {
                flags.push("active");
            }
            format!(
                "{index:>2} {} {:?} {} at ({:.3}, {:.3}, {:.3}) {width_cm}x{height_cm} cm {}",
                layer.id,
                layer.kind,
                layer.source,
                layer.position.x,
                layer.position.y,
                layer.position.z,
                flags.join(","),
            )
            .trim_end()
            .to_string()
        })
        .collect();
    Ok(lines)
}

/// Apply upload optimization to a file on disk
pub async fn optimize(config: StudioConfig, input: &Path, out: &Path) -> Result<(), CliError> {
    let bytes = tokio::fs::read(input).await.map_err(|error| CliError::Io {
        path: input.to_path_buf(),
        error,
    })?;

    let optimized = optimize_upload(&bytes, &config.upload)?;
    if optimized.was_resized() {
        info!(
            "Resized {}x{} -> {}x{}",
            optimized.original_width, optimized.original_height, optimized.width, optimized.height
        );
    } else if optimized.png.len() > optimized.original_bytes {
        warn!(
            "Re-encoded image is larger than the input ({} > {} bytes)",
            optimized.png.len(),
            optimized.original_bytes
        );
    }

    tokio::fs::write(out, &optimized.png)
        .await
        .map_err(|error| CliError::Io {
            path: out.to_path_buf(),
            error,
        })
}
