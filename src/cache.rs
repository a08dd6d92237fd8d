//! Directory-backed download cache.
//!
//! The presence of a file under the cache root is both the cache index and
//! the cache value; there is no separate metadata store.

use crate::error::{AbpError, AbpResult};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub struct DownloadCache {
    root: PathBuf,
}

impl DownloadCache {
    /// Opens a cache rooted at `root`, creating the directory if needed.
    pub fn open(root: &Path) -> io::Result<Self> {
        if !root.exists() {
            log::info!("Creating download cache dir: {}", root.display());
            fs::create_dir_all(root)?;
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of the entry for `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    pub fn exists(&self, key: &str) -> bool {
        self.path_for(key).exists()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        fs::read(self.path_for(key)).ok()
    }

    /// Streams `reader` into the entry for `key`, returning its path.
    ///
    /// The bytes land in a temporary file that is moved into place on
    /// success, so an entry is never observable half-written.
    pub fn put_stream<R: io::Read>(&self, key: &str, reader: &mut R) -> AbpResult<PathBuf> {
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        io::copy(reader, tmp.as_file_mut())?;
        let path = self.path_for(key);
        tmp.persist(&path).map_err(|e| AbpError::Io(e.error))?;
        Ok(path)
    }

    /// Stores a complete entry.
    pub fn put(&self, key: &str, mut bytes: &[u8]) -> AbpResult<PathBuf> {
        self.put_stream(key, &mut bytes)
    }

    /// First cached file named `stem` plus an extension, if any.
    pub fn find(&self, stem: &str) -> Option<PathBuf> {
        let prefix = format!("{}.", stem);
        let mut hits: Vec<PathBuf> = fs::read_dir(&self.root)
            .ok()?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(&prefix))
            .map(|entry| entry.path())
            .collect();
        hits.sort();
        hits.into_iter().next()
    }

    /// Deletes every entry whose file name starts with `prefix`,
    /// returning how many were removed.
    pub fn purge(&self, prefix: &str) -> io::Result<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_name().to_string_lossy().starts_with(prefix) {
                log::debug!("Deleting cache file {}", entry.path().display());
                fs::remove_file(entry.path())?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn put_and_get_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let cache = DownloadCache::open(temp_dir.path()).unwrap();

        assert!(!cache.exists("foo.jpg"));
        assert!(cache.get("foo.jpg").is_none());

        let path = cache.put("foo.jpg", b"bytes").unwrap();
        assert_eq!(path, cache.path_for("foo.jpg"));
        assert!(cache.exists("foo.jpg"));
        assert_eq!(cache.get("foo.jpg").unwrap(), b"bytes");
    }

    #[test]
    fn put_leaves_no_stray_files() {
        let temp_dir = TempDir::new().unwrap();
        let cache = DownloadCache::open(temp_dir.path()).unwrap();
        cache.put("foo.jpg", b"bytes").unwrap();

        let names: Vec<String> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["foo.jpg"]);
    }

    #[test]
    fn find_matches_stem_dot_anything() {
        let temp_dir = TempDir::new().unwrap();
        let cache = DownloadCache::open(temp_dir.path()).unwrap();
        cache.put("stripmine.jpg", b"img").unwrap();
        cache.put("stripmine_html.html", b"page").unwrap();
        cache.put("stripminefield.jpg", b"other").unwrap();

        // Neither the scraped page nor the longer name counts as a hit
        let found = cache.find("stripmine").unwrap();
        assert_eq!(found, cache.path_for("stripmine.jpg"));
        assert!(cache.find("blacklotus").is_none());
    }

    #[test]
    fn find_is_deterministic_across_extensions() {
        let temp_dir = TempDir::new().unwrap();
        let cache = DownloadCache::open(temp_dir.path()).unwrap();
        cache.put("foo.png", b"png").unwrap();
        cache.put("foo.jpg", b"jpg").unwrap();

        assert_eq!(cache.find("foo").unwrap(), cache.path_for("foo.jpg"));
    }

    #[test]
    fn purge_removes_everything_with_the_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let cache = DownloadCache::open(temp_dir.path()).unwrap();
        cache.put("pianalaar.jpg", b"img").unwrap();
        cache.put("pianalaar_ask_search.html", b"page").unwrap();
        cache.put("stripmine.jpg", b"keep").unwrap();

        let removed = cache.purge("pianalaar").unwrap();
        assert_eq!(removed, 2);
        assert!(!cache.exists("pianalaar.jpg"));
        assert!(cache.exists("stripmine.jpg"));
    }

    #[test]
    fn open_creates_the_root_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("nested").join("cache");
        let cache = DownloadCache::open(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(cache.root(), root);
    }
}
