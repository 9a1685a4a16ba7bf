//! Asset loading.
//!
//! Loading is a request/response affair: [`AssetService::load`] hands back a receiver right
//! away and the bytes arrive on it once the service is done. The caller decides when to block.

use std::{
    io,
    path::PathBuf,
    sync::mpsc::{self, Receiver},
    thread,
};

use include_dir::{Dir, include_dir};

static RES: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/res");

/// The pending result of an asset request.
pub type AssetReceiver = Receiver<io::Result<Vec<u8>>>;

/// Something that can fetch asset files by logical path, e.g. `res/drawable/gopher.png`.
pub trait AssetService {
    /// Starts loading the asset at `path`.
    fn load(&self, path: &str) -> AssetReceiver;
}

/// Assets compiled into the binary from the `res/` directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedAssets;

impl AssetService for EmbeddedAssets {
    fn load(&self, path: &str) -> AssetReceiver {
        let (sender, receiver) = mpsc::sync_channel(1);
        let result = path
            .strip_prefix("res/")
            .and_then(|relative| RES.get_file(relative))
            .map(|file| file.contents().to_vec())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no embedded asset at {path}"),
                )
            });
        // The receiver is still in scope, so this can't fail.
        let _ = sender.send(result);
        receiver
    }
}

/// Assets read from a directory on disk by a worker thread.
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetService for DirAssets {
    fn load(&self, path: &str) -> AssetReceiver {
        let (sender, receiver) = mpsc::sync_channel(1);
        let full_path = self.root.join(path);
        thread::spawn(move || {
            log::debug!("Reading {}", full_path.display());
            let _ = sender.send(std::fs::read(&full_path));
        });
        receiver
    }
}
