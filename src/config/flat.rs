//! Flat `key=value` files
//!
//! Records, session defaults and global defaults all share this format:
//! one pair per line, the first `=` separates key from value, and the value
//! is trimmed of trailing whitespace. Lines without a separator (or with an
//! empty key) are skipped without complaint.

use std::fs;
use std::io;
use std::path::Path;

/// Field separator.
pub const SEPARATOR: char = '=';

/// Errors for flat file access
#[derive(Debug, thiserror::Error)]
pub enum FlatFileError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Ordered string mapping.
///
/// Entries keep the position they were first inserted (or read) at, so a
/// load followed by a persist reproduces the file byte for byte.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValues {
    entries: Vec<(String, String)>,
}

impl KeyValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse flat file content.
    ///
    /// A repeated key keeps its first position and its last value.
    pub fn parse(content: &str) -> Self {
        let mut values = Self::new();
        for line in content.lines() {
            match line.find(SEPARATOR) {
                Some(pos) if pos > 0 => {
                    let key = &line[..pos];
                    let value = line[pos + SEPARATOR.len_utf8()..].trim_end();
                    values.insert(key, value);
                }
                _ => {}
            }
        }
        values
    }

    /// Load a flat file. A missing file is an empty mapping; bytes that are
    /// not UTF-8 are replaced rather than rejected.
    pub fn load(path: &Path) -> Result<Self, FlatFileError> {
        match fs::read(path) {
            Ok(bytes) => Ok(Self::parse(&String::from_utf8_lossy(&bytes))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::new()),
            Err(source) => Err(FlatFileError::Read {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    /// Render as flat file content, one `key=value\n` line per entry.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push(SEPARATOR);
            out.push_str(value);
            out.push('\n');
        }
        out
    }

    /// Write the complete mapping, replacing whatever the file held.
    pub fn persist(&self, path: &Path) -> Result<(), FlatFileError> {
        fs::write(path, self.serialize()).map_err(|source| FlatFileError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Insert or overwrite; returns the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeyValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (k, v) in iter {
            values.insert(k, v);
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_first_separator_wins() {
        let values = KeyValues::parse("coverage.abstract=a=b\n");
        assert_eq!(values.get("coverage.abstract"), Some("a=b"));
    }

    #[test]
    fn test_parse_trims_trailing_whitespace_only() {
        let values = KeyValues::parse("coverage.title=  Elevation  \r\n");
        assert_eq!(values.get("coverage.title"), Some("  Elevation"));
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let values = KeyValues::parse("no separator here\n=orphan\nlayer.style=dem\n\n");
        assert_eq!(values.len(), 1);
        assert_eq!(values.get("layer.style"), Some("dem"));
    }

    #[test]
    fn test_parse_empty_value() {
        let values = KeyValues::parse("layer.style=\n");
        assert_eq!(values.get("layer.style"), Some(""));
        assert!(values.contains_key("layer.style"));
    }

    #[test]
    fn test_duplicate_key_keeps_position() {
        let values = KeyValues::parse("a=1\nb=2\na=3\n");
        assert_eq!(values.serialize(), "a=3\nb=2\n");
    }

    #[test]
    fn test_insert_appends_new_keys() {
        let mut values = KeyValues::parse("b=2\na=1\n");
        assert_eq!(values.insert("c", "3"), None);
        assert_eq!(values.insert("b", "20"), Some("2".to_string()));
        assert_eq!(values.serialize(), "b=20\na=1\nc=3\n");
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let values = KeyValues::load(&dir.path().join("absent.gpd")).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn test_persist_load_is_byte_stable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dem.gpd");
        fs::write(&path, "z=last\njunk line\na=first \nm=\n").unwrap();

        let loaded = KeyValues::load(&path).unwrap();
        loaded.persist(&path).unwrap();
        let first = fs::read(&path).unwrap();

        KeyValues::load(&path).unwrap().persist(&path).unwrap();
        let second = fs::read(&path).unwrap();

        assert_eq!(first, second);
        assert_eq!(String::from_utf8(first).unwrap(), "z=last\na=first\nm=\n");
    }

    #[test]
    fn test_non_utf8_bytes_do_not_fail_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dem.gpd");
        fs::write(&path, b"coverage.title=h\xf6he\nlayer.style=dem\n").unwrap();
        let values = KeyValues::load(&path).unwrap();
        assert_eq!(values.get("layer.style"), Some("dem"));
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_unreadable_path_is_error() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be read as a file
        let err = KeyValues::load(dir.path()).unwrap_err();
        assert!(matches!(err, FlatFileError::Read { .. }));
    }
}
