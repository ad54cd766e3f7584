//! Zettel record parser.
//!
//! A zettel is a file whose name starts with a numeric id, a single whitespace
//! and a title, e.g. `201906242157 Reading notes.md`. Links are written in the
//! body as `[[201906242157]]`.

use crate::error::{Result, ZkError};
use crate::types::ZettelRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Id prefix followed by one whitespace and the title, matched on the file stem.
static ZETTEL_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\s(.*)").unwrap());

/// `[[<digits>]]` link token.
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[(\d+)\]\]").unwrap());

/// Split a zettel path into `(id, title)`.
///
/// Returns `None` when the filename has no id prefix, which means the file is
/// not a zettel.
pub fn parse_filename(path: &Path) -> Option<(String, String)> {
    let stem = path.file_stem()?.to_str()?;
    let caps = ZETTEL_ID.captures(stem)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// Collect every linked id in `text`, in order, duplicates included.
pub fn extract_links(text: &str) -> Vec<String> {
    LINK.captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Parse a single zettel file.
///
/// `Ok(None)` for a file that is not a zettel. A file that cannot be read as
/// UTF-8 is an error.
pub fn parse_zettel(path: &Path) -> Result<Option<ZettelRecord>> {
    let Some((id, title)) = parse_filename(path) else {
        tracing::debug!("Skipping {}: no zettel id in filename", path.display());
        return Ok(None);
    };

    let content = fs::read_to_string(path).map_err(|source| ZkError::UnreadableFile {
        path: path.to_path_buf(),
        source,
    })?;
    let links = extract_links(&content);

    tracing::debug!("Parsed zettel {} with {} link(s)", id, links.len());
    Ok(Some(ZettelRecord { id, title, links }))
}

/// Parse zettels from a list of paths, keeping input order.
pub fn parse_zettels<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<ZettelRecord>> {
    let mut records = Vec::with_capacity(paths.len());
    for path in paths {
        if let Some(record) = parse_zettel(path.as_ref())? {
            records.push(record);
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn write_zettel(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        File::create(&path)
            .unwrap()
            .write_all(content.as_bytes())
            .unwrap();
        path
    }

    #[test]
    fn test_parse_filename() {
        assert_eq!(
            parse_filename(Path::new("201906242157 Reading notes.md")),
            Some(("201906242157".to_string(), "Reading notes".to_string()))
        );
        assert_eq!(
            parse_filename(Path::new("/notes/1 Intro.txt")),
            Some(("1".to_string(), "Intro".to_string()))
        );
        // Only the last extension is stripped
        assert_eq!(
            parse_filename(Path::new("42 Version 1.2 notes.md")),
            Some(("42".to_string(), "Version 1.2 notes".to_string()))
        );
    }

    #[test]
    fn test_parse_filename_rejects_non_zettels() {
        assert_eq!(parse_filename(Path::new("README.md")), None);
        assert_eq!(parse_filename(Path::new("201906242157.md")), None);
        assert_eq!(parse_filename(Path::new("notes 123.md")), None);
        assert_eq!(parse_filename(Path::new("12_underscore.md")), None);
    }

    #[test]
    fn test_extract_links_keeps_order_and_duplicates() {
        let text = "See [[2]] and [[10]].\nAgain [[2]], not [2] or [[abc]] or [[ 3 ]].";
        assert_eq!(extract_links(text), vec!["2", "10", "2"]);
        assert!(extract_links("no links here").is_empty());
    }

    #[test]
    fn test_extract_links_count_matches_occurrences() {
        for k in 0..6 {
            let body: String = (0..k).map(|i| format!("text [[{}]] ", i % 2)).collect();
            assert_eq!(extract_links(&body).len(), k);
        }
    }

    #[test]
    fn test_parse_zettels_skips_unrecognized_and_keeps_order() {
        let dir = TempDir::new().unwrap();
        let b = write_zettel(&dir, "2 Body.md", "[[1]] then [[2]]");
        let readme = write_zettel(&dir, "README.md", "[[1]]");
        let a = write_zettel(&dir, "1 Intro.md", "links to [[2]]");

        let records = parse_zettels(&[b, readme, a]).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0], ZettelRecord::new("2", "Body", vec!["1".into(), "2".into()]));
        assert_eq!(records[1], ZettelRecord::new("1", "Intro", vec!["2".into()]));
    }

    #[test]
    fn test_parse_zettel_invalid_utf8_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("3 Binary.md");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x5b]).unwrap();

        let err = parse_zettels(&[path]).unwrap_err();
        assert!(matches!(err, ZkError::UnreadableFile { .. }));
    }

    #[test]
    fn test_parse_zettel_missing_file_is_fatal() {
        let err = parse_zettel(Path::new("/nonexistent/7 Gone.md")).unwrap_err();
        assert!(matches!(err, ZkError::UnreadableFile { .. }));
    }

    #[test]
    fn test_unrecognized_file_is_not_read() {
        // A non-zettel path is skipped before any IO happens.
        let result = parse_zettel(Path::new("/nonexistent/README.md")).unwrap();
        assert!(result.is_none());
    }
}
