use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use log::info;
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

use crate::storage::{LocalStore, StorageError};

/// Storage key holding the profile picture as a data URI.
pub const PROFILE_IMAGE_KEY: &str = "userProfileImage";

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("{0} is not a supported image file")]
    NotAnImage(PathBuf),
    #[error("could not read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The user's profile picture, backed by the local store.
#[derive(Debug)]
pub struct ProfileStore {
    store: LocalStore,
    image: Option<String>,
}

/// Handle given to every screen that shows or edits the profile picture.
pub type SharedProfile = Rc<RefCell<ProfileStore>>;

impl ProfileStore {
    pub fn load(store: LocalStore) -> Self {
        let image = store.get(PROFILE_IMAGE_KEY).map(str::to_string);
        ProfileStore { store, image }
    }

    pub fn shared(self) -> SharedProfile {
        Rc::new(RefCell::new(self))
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Store a new picture, or remove the key altogether for `None` or an empty value.
    pub fn set(&mut self, image: Option<String>) -> Result<(), ProfileError> {
        let image = image.filter(|uri| !uri.is_empty());
        match &image {
            Some(uri) => {
                self.store.set(PROFILE_IMAGE_KEY, uri)?;
                info!("Profile image updated ({} bytes)", uri.len());
            }
            None => {
                self.store.remove(PROFILE_IMAGE_KEY)?;
                info!("Profile image removed");
            }
        }
        self.image = image;
        Ok(())
    }
}

fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// Read an image file into a `data:` URI.
pub fn encode_data_uri(path: &Path) -> Result<String, ProfileError> {
    let mime = image_mime(path).ok_or_else(|| ProfileError::NotAnImage(path.to_path_buf()))?;
    let bytes = fs::read(path).map_err(|source| ProfileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(format!("data:{};base64,{}", mime, BASE64.encode(bytes)))
}
