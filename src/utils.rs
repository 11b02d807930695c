use log::{debug, info, warn};
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const CACHE_DIR_NAME: &str = "rasterharvest";

pub fn get_cache_dir() -> io::Result<PathBuf> {
    dirs::cache_dir()
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine system cache directory",
            )
        })
        .map(|p| p.join(CACHE_DIR_NAME))
}

/// Creates `path` if it is missing. Returns whether it had to be created.
pub fn ensure_dir_exists(path: &Path) -> io::Result<bool> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => Ok(false),
        Ok(_) => Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("Path exists but is not a directory: {}", path.display()),
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating directory: {}", path.display());
            fs::create_dir_all(path)?;
            Ok(true)
        }
        Err(e) => Err(e),
    }
}

/// Directory that downloaded tiles are written to for the span of one call.
///
/// Only files this guard downloads are recorded; files that were already
/// present are reused and left alone. With `clean` set, dropping the guard
/// deletes the recorded files, and the directory too if the guard created it
/// and it ended up empty.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    created_dir: bool,
    clean: bool,
    created_files: RefCell<Vec<PathBuf>>,
}

impl ScratchDir {
    pub fn open(path: PathBuf, clean: bool) -> io::Result<Self> {
        let created_dir = ensure_dir_exists(&path)?;
        Ok(Self {
            path,
            created_dir,
            clean,
            created_files: RefCell::new(Vec::new()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of `file_name`, produced by `download` unless it already exists.
    pub fn obtain<E, F>(&self, file_name: &str, download: F) -> Result<PathBuf, E>
    where
        F: FnOnce(&Path) -> Result<(), E>,
    {
        let target = self.path.join(file_name);
        if target.is_file() {
            debug!("Reusing {}", target.display());
            return Ok(target);
        }
        download(&target)?;
        self.created_files.borrow_mut().push(target.clone());
        Ok(target)
    }

    /// Files downloaded through this guard so far.
    pub fn created_files(&self) -> Vec<PathBuf> {
        self.created_files.borrow().clone()
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if !self.clean {
            return;
        }
        let files = self.created_files.get_mut();
        for file in files.drain(..) {
            if let Err(e) = fs::remove_file(&file) {
                warn!("Failed to remove {}: {}", file.display(), e);
            }
        }
        if self.created_dir {
            let empty = fs::read_dir(&self.path)
                .map(|mut entries| entries.next().is_none())
                .unwrap_or(false);
            if empty {
                if let Err(e) = fs::remove_dir(&self.path) {
                    warn!("Failed to remove {}: {}", self.path.display(), e);
                }
            }
        }
    }
}
