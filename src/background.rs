//! Numbered background sample images on disk.
//!
//! Samples live in one directory as `{index}.png`. Capture mode writes a
//! sequence of them; chroma-key mode reads back one or more indices, resized
//! to the working resolution.

use image::{ImageFormat, RgbaImage};
use std::path::{Path, PathBuf};

use crate::frame::{resample, Kernel};

/// Index the chroma key loads when none is configured.
pub const DEFAULT_SAMPLE_INDEX: u32 = 40;

/// Errors from reading or writing background samples.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to create sample directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("background sample '{path}' not found")]
    NotFound { path: PathBuf },

    #[error("failed to read background sample '{path}': {source}")]
    Read {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("failed to write background sample '{path}': {source}")]
    Write {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Directory of numbered lossless sample images.
#[derive(Debug, Clone)]
pub struct BackgroundStore {
    dir: PathBuf,
}

impl BackgroundStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds sample `index`.
    pub fn path(&self, index: u32) -> PathBuf {
        self.dir.join(format!("{}.png", index))
    }

    /// Write `image` as sample `index`, creating the directory and replacing
    /// any existing file.
    pub fn save(&self, index: u32, image: &RgbaImage) -> Result<PathBuf, StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| StoreError::CreateDir {
            path: self.dir.clone(),
            source: e,
        })?;

        let path = self.path(index);
        image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|e| StoreError::Write {
                path: path.clone(),
                source: e,
            })?;

        log::debug!("saved background sample {}", path.display());
        Ok(path)
    }

    /// Read sample `index` and scale it to `width` x `height`.
    pub fn load(&self, index: u32, width: u32, height: u32) -> Result<RgbaImage, StoreError> {
        let path = self.path(index);
        if !path.is_file() {
            return Err(StoreError::NotFound { path });
        }

        let image = image::open(&path)
            .map_err(|e| StoreError::Read {
                path: path.clone(),
                source: e,
            })?
            .to_rgba8();

        Ok(resample(&image, width, height, Kernel::Lanczos3))
    }

    /// Load every index in `indices`, failing on the first missing sample.
    pub fn load_all(
        &self,
        indices: &[u32],
        width: u32,
        height: u32,
    ) -> Result<Vec<RgbaImage>, StoreError> {
        indices
            .iter()
            .map(|&index| self.load(index, width, height))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::TempDir;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 40) as u8, (y * 60) as u8, 77, 255])
        })
    }

    #[test]
    fn test_path_naming() {
        let store = BackgroundStore::new("/tmp/bg");
        assert_eq!(store.path(40), PathBuf::from("/tmp/bg/40.png"));
    }

    #[test]
    fn test_save_and_load_exact() {
        let tmp = TempDir::new().unwrap();
        let store = BackgroundStore::new(tmp.path().join("nested"));
        let img = gradient(6, 4);

        let path = store.save(3, &img).unwrap();
        assert!(path.ends_with("3.png"));

        let loaded = store.load(3, 6, 4).unwrap();
        assert_eq!(loaded, img);
    }

    #[test]
    fn test_load_resizes() {
        let tmp = TempDir::new().unwrap();
        let store = BackgroundStore::new(tmp.path());
        store.save(0, &gradient(8, 8)).unwrap();
        assert_eq!(store.load(0, 4, 2).unwrap().dimensions(), (4, 2));
    }

    #[test]
    fn test_save_overwrites() {
        let tmp = TempDir::new().unwrap();
        let store = BackgroundStore::new(tmp.path());
        store.save(1, &gradient(2, 2)).unwrap();
        let other = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]));
        store.save(1, &other).unwrap();
        assert_eq!(store.load(1, 2, 2).unwrap(), other);
    }

    #[test]
    fn test_missing_sample() {
        let tmp = TempDir::new().unwrap();
        let store = BackgroundStore::new(tmp.path());
        assert!(matches!(
            store.load(DEFAULT_SAMPLE_INDEX, 4, 4),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_corrupt_sample() {
        let tmp = TempDir::new().unwrap();
        let store = BackgroundStore::new(tmp.path());
        std::fs::write(store.path(5), b"not a png").unwrap();
        assert!(matches!(store.load(5, 4, 4), Err(StoreError::Read { .. })));
    }

    #[test]
    fn test_load_all_stops_on_missing() {
        let tmp = TempDir::new().unwrap();
        let store = BackgroundStore::new(tmp.path());
        store.save(1, &gradient(2, 2)).unwrap();
        assert_eq!(store.load_all(&[1], 2, 2).unwrap().len(), 1);
        assert!(store.load_all(&[1, 2], 2, 2).is_err());
    }
}
