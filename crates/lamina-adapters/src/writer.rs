//! Atomic, idempotent output of compiled documents.

use std::io::Write as _;
use std::path::Path;

use crate::error::{AdapterError, AdapterResult};

/// Compiled output filename.
pub const OUTPUT_FILENAME: &str = "params.yaml";

/// Banner prepended to every compiled document.
pub const GENERATED_FILE_BANNER: &str = "\
# Do not modify this file manually. It was automatically generated
# from params.in.yaml by `lamina compile`. Edit the corresponding
# params.in.yaml instead and recompile.
";

/// Write `body` (plus the banner) to `out_file`, replacing it atomically.
///
/// Returns `false` without touching the file when it already holds the
/// exact same bytes, so timestamps only move on real changes.
pub fn write_compiled(out_file: &Path, body: &str) -> AdapterResult<bool> {
    let contents = format!("{GENERATED_FILE_BANNER}\n{body}");

    match std::fs::read_to_string(out_file) {
        Ok(existing) if existing == contents => return Ok(false),
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(AdapterError::io(out_file, e)),
    }

    let dir = out_file.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::Builder::new()
        .prefix(".params-")
        .suffix(".yaml")
        .tempfile_in(dir)
        .map_err(|e| AdapterError::io(dir, e))?;
    tmp.write_all(contents.as_bytes())
        .map_err(|e| AdapterError::io(tmp.path().to_path_buf(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| AdapterError::io(tmp.path().to_path_buf(), e))?;
    tmp.persist(out_file)
        .map_err(|e| AdapterError::io(out_file, e.error))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn writes_banner_and_body() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join(OUTPUT_FILENAME);
        let changed = write_compiled(&out, "a: 1\n").unwrap();
        assert!(changed);
        let text = fs::read_to_string(&out).unwrap();
        assert!(text.starts_with("# Do not modify this file manually."));
        assert!(text.ends_with("a: 1\n"));
    }

    #[test]
    fn identical_content_is_not_rewritten() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join(OUTPUT_FILENAME);
        assert!(write_compiled(&out, "a: 1\n").unwrap());
        let mtime = fs::metadata(&out).unwrap().modified().unwrap();
        assert!(!write_compiled(&out, "a: 1\n").unwrap());
        assert_eq!(fs::metadata(&out).unwrap().modified().unwrap(), mtime);
    }

    #[test]
    fn changed_content_replaces_the_file() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join(OUTPUT_FILENAME);
        assert!(write_compiled(&out, "a: 1\n").unwrap());
        assert!(write_compiled(&out, "a: 2\n").unwrap());
        let text = fs::read_to_string(&out).unwrap();
        assert!(text.ends_with("a: 2\n"));
    }

    #[test]
    fn no_temp_files_left_behind() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join(OUTPUT_FILENAME);
        write_compiled(&out, "a: 1\n").unwrap();
        let leftovers: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != OUTPUT_FILENAME)
            .collect();
        assert!(leftovers.is_empty());
    }
}
