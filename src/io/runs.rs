//! Run corpus loading.
//!
//! `--input` may be a single JSON file or a directory. Directories are scanned
//! recursively for `*.json` files in sorted path order, so corpus order (and
//! every tie-break that depends on it) is stable across invocations.
//!
//! Individual files that cannot be read or parsed, or that are not JSON
//! objects, are skipped and counted; they never abort the load.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::Run;
use crate::error::AppError;

/// Loaded runs plus bookkeeping about what was skipped.
#[derive(Debug, Clone)]
pub struct RunCorpus {
    pub runs: Vec<Run>,
    pub files_seen: usize,
    pub files_skipped: usize,
}

/// Load every run under `input`.
pub fn load_runs(input: &Path) -> Result<RunCorpus, AppError> {
    if !input.exists() {
        return Err(AppError::input(format!("Input not found: {}", input.display())));
    }

    let paths = if input.is_dir() {
        discover_json_files(input)
    } else {
        vec![input.to_path_buf()]
    };

    let mut runs = Vec::with_capacity(paths.len());
    let mut files_skipped = 0;
    for path in &paths {
        match read_run(path) {
            Ok(run) => runs.push(run),
            Err(reason) => {
                debug!(path = %path.display(), %reason, "skipping run file");
                files_skipped += 1;
            }
        }
    }

    info!(
        input = %input.display(),
        runs = runs.len(),
        skipped = files_skipped,
        "loaded run corpus"
    );

    Ok(RunCorpus {
        runs,
        files_seen: paths.len(),
        files_skipped,
    })
}

fn read_run(path: &Path) -> Result<Run, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("unreadable: {e}"))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| format!("invalid JSON: {e}"))?;
    Run::from_value(value).ok_or_else(|| "not a JSON object".to_string())
}

/// Recursively list `*.json` files under `root` (sorted).
pub fn discover_json_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_json_files_inner(root, &mut out);
    out.sort();
    out
}

fn find_json_files_inner(root: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(_) => continue,
        };

        if file_type.is_dir() {
            if should_skip_dir(&path) {
                continue;
            }
            find_json_files_inner(&path, out);
            continue;
        }

        if file_type.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("json"))
                == Some(true)
        {
            out.push(path);
        }
    }
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules")
}

/// Write one pretty-printed file per run (`run-0001.json`, ...) into `dir`,
/// creating it if needed. Returns the number of files written.
pub fn write_runs(dir: &Path, runs: &[serde_json::Value]) -> Result<usize, AppError> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::input(format!("Failed to create '{}': {e}", dir.display())))?;

    for (i, run) in runs.iter().enumerate() {
        let path = dir.join(format!("run-{:04}.json", i + 1));
        let text = serde_json::to_string_pretty(run)
            .map_err(|e| AppError::input(format!("Failed to encode run {}: {e}", i + 1)))?;
        fs::write(&path, text)
            .map_err(|e| AppError::input(format!("Failed to write '{}': {e}", path.display())))?;
    }

    Ok(runs.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_directory_tree_and_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("site-b").join("2024");
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir_all(dir.path().join("node_modules")).unwrap();

        fs::write(
            dir.path().join("a.json"),
            r#"{"log": [{"itemId": "q1", "domain": "math", "correct": true}]}"#,
        )
        .unwrap();
        fs::write(nested.join("b.JSON"), r#"{"log": []}"#).unwrap();
        fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        fs::write(dir.path().join("list.json"), "[1, 2]").unwrap();
        fs::write(dir.path().join("notes.txt"), "{}").unwrap();
        fs::write(dir.path().join("node_modules").join("c.json"), "{}").unwrap();

        let corpus = load_runs(dir.path()).unwrap();
        assert_eq!(corpus.files_seen, 4);
        assert_eq!(corpus.files_skipped, 2);
        assert_eq!(corpus.runs.len(), 2);
        assert_eq!(corpus.runs[0].log.len(), 1);
    }

    #[test]
    fn loads_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        fs::write(&path, r#"{"summary": {"composite": {"theta": 1.25}}}"#).unwrap();
        let corpus = load_runs(&path).unwrap();
        assert_eq!(corpus.runs.len(), 1);
        assert_eq!(corpus.runs[0].composite_theta, Some(1.25));
    }

    #[test]
    fn written_runs_load_back_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("corpus");
        let docs: Vec<serde_json::Value> = (0..3)
            .map(|i| serde_json::json!({"summary": {"composite": {"theta": i as f64}}}))
            .collect();
        assert_eq!(write_runs(&out, &docs).unwrap(), 3);

        let corpus = load_runs(&out).unwrap();
        let thetas: Vec<_> = corpus.runs.iter().map(|r| r.composite_theta).collect();
        assert_eq!(thetas, vec![Some(0.0), Some(1.0), Some(2.0)]);
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_runs(&dir.path().join("absent")).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
    }
}
