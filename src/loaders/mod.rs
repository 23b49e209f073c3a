//! Background asset loading. Each load runs on its own thread and reports
//! back through a oneshot channel; the frame loop polls without blocking.

mod gltf;
mod manager;
mod skybox;

pub use self::gltf::{load_model, ModelAsset};
pub use manager::LoadingManager;
pub use skybox::{face_paths, load_cube_images, CubeImages, FACE_NAMES};

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;

use crate::error::LoadError;

/// A load in flight. Resolves to the asset or the reason it failed.
pub struct PendingLoad<T> {
    label: String,
    receiver: oneshot::Receiver<Result<T, LoadError>>,
    resolved: bool,
}

impl<T> PendingLoad<T> {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Non-blocking; yields the result once and `None` before and after
    pub fn try_take(&mut self) -> Option<Result<T, LoadError>> {
        if self.resolved {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(Some(result)) => {
                self.resolved = true;
                Some(result)
            }
            Ok(None) => None,
            Err(oneshot::Canceled) => {
                self.resolved = true;
                Some(Err(LoadError::Canceled))
            }
        }
    }
}

impl<T> Future for PendingLoad<T> {
    type Output = Result<T, LoadError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if this.resolved {
            return Poll::Ready(Err(LoadError::Canceled));
        }
        Pin::new(&mut this.receiver).poll(cx).map(|received| {
            this.resolved = true;
            received.unwrap_or(Err(LoadError::Canceled))
        })
    }
}

/// Starts loads and keeps the loading manager's books
#[derive(Debug, Default)]
pub struct AssetLoader {
    manager: LoadingManager,
}

impl AssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn manager(&self) -> &LoadingManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut LoadingManager {
        &mut self.manager
    }

    pub fn load_model(&mut self, path: impl Into<PathBuf>) -> PendingLoad<ModelAsset> {
        let path = path.into();
        let label = path.display().to_string();
        self.spawn(label, move || load_model(&path))
    }

    /// `paths` in px, nx, py, ny, pz, nz order
    pub fn load_skybox(&mut self, paths: [PathBuf; 6]) -> PendingLoad<CubeImages> {
        let label = match paths[0].parent() {
            Some(dir) => format!("skybox {}", dir.display()),
            None => "skybox".to_owned(),
        };
        self.spawn(label, move || load_cube_images(&paths))
    }

    /// Polls `pending` and records the outcome with the manager
    pub fn poll<T>(&mut self, pending: &mut PendingLoad<T>) -> Option<Result<T, LoadError>> {
        let result = pending.try_take()?;
        self.finish(&pending.label, &result);
        Some(result)
    }

    /// Blocks until `pending` resolves and records the outcome
    pub fn wait<T>(&mut self, mut pending: PendingLoad<T>) -> Result<T, LoadError> {
        let result = pollster::block_on(&mut pending);
        self.finish(&pending.label, &result);
        result
    }

    fn finish<T>(&mut self, label: &str, result: &Result<T, LoadError>) {
        match result {
            Ok(_) => self.manager.item_end(label),
            Err(error) => self.manager.item_error(label, error),
        }
    }

    fn spawn<T, F>(&mut self, label: String, job: F) -> PendingLoad<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, LoadError> + Send + 'static,
    {
        self.manager.item_start(&label);
        let (sender, receiver) = oneshot::channel();

        let spawned = std::thread::Builder::new()
            .name(format!("load {label}"))
            .spawn(move || {
                // Receiver may be gone if the app quit mid-load
                let _ = sender.send(job());
            });
        if let Err(e) = spawned {
            // Dropping the job drops the sender, so the load resolves as Canceled
            log::error!("Could not start loader thread for {}: {}", label, e);
        }

        PendingLoad {
            label,
            receiver,
            resolved: false,
        }
    }
}
