use std::path::PathBuf;

use thiserror::Error;

/// Failure of a model or skybox load
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("glTF import failed: {0:#}")]
    Gltf(anyhow::Error),

    #[error("cannot decode image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("unsupported asset feature: {0}")]
    Unsupported(String),

    #[error("invalid skybox: {0}")]
    Skybox(String),

    #[error("loader thread ended without a result")]
    Canceled,

    #[error("{} contains no triangle geometry", .0.display())]
    NoGeometry(PathBuf),
}

/// Failure while presenting a frame
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("surface error: {0}")]
    Surface(wgpu::SurfaceError),

    #[error("GPU out of memory")]
    OutOfMemory,
}

impl RenderError {
    /// Lost and outdated surfaces recover by reconfiguring
    pub fn needs_reconfigure(&self) -> bool {
        matches!(
            self,
            RenderError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)
        )
    }

    /// The render loop must stop
    pub fn is_fatal(&self) -> bool {
        matches!(self, RenderError::OutOfMemory)
    }
}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(error: wgpu::SurfaceError) -> Self {
        match error {
            wgpu::SurfaceError::OutOfMemory => RenderError::OutOfMemory,
            other => RenderError::Surface(other),
        }
    }
}

/// Failure reading a JSON scene config
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid colour {0:?}, expected #rrggbb")]
    Color(String),
}
