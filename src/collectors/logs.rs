use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const MAX_EXAMPLES_PER_PATTERN: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogAnalysis {
    pub logs_dir: PathBuf,
    pub files_scanned: u64,
    pub problem_counts: IndexMap<String, u64>,
    pub examples: IndexMap<String, Vec<String>>,
    #[serde(default)]
    pub skipped_files: Vec<SkippedFile>,
}

/// A file (or the directory itself) the scan could not read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

impl LogAnalysis {
    pub fn empty(logs_dir: &Path, patterns: &[String]) -> Self {
        Self {
            logs_dir: logs_dir.to_path_buf(),
            files_scanned: 0,
            problem_counts: patterns.iter().map(|p| (p.clone(), 0)).collect(),
            examples: patterns.iter().map(|p| (p.clone(), Vec::new())).collect(),
            skipped_files: Vec::new(),
        }
    }

    fn record_line(&mut self, line: &str, patterns: &[String]) {
        for pattern in patterns {
            if !line.contains(pattern.as_str()) {
                continue;
            }
            *self.problem_counts.entry(pattern.clone()).or_insert(0) += 1;
            let examples = self.examples.entry(pattern.clone()).or_default();
            if examples.len() < MAX_EXAMPLES_PER_PATTERN {
                examples.push(line.to_string());
            }
        }
    }

    fn scan_file(&mut self, path: &Path, patterns: &[String]) -> io::Result<()> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                return Ok(());
            }
            let line = String::from_utf8_lossy(&buf);
            self.record_line(line.trim(), patterns);
        }
    }

    fn skip(&mut self, path: PathBuf, err: &io::Error) {
        warn!(path = %path.display(), error = %err, "skipping unreadable log file");
        self.skipped_files.push(SkippedFile {
            path,
            reason: err.to_string(),
        });
    }
}

/// Counts keyword hits in every regular file directly inside `logs_dir`,
/// visited in name order. A missing directory yields a zeroed analysis.
pub fn scan(logs_dir: &Path, patterns: &[String]) -> LogAnalysis {
    let mut analysis = LogAnalysis::empty(logs_dir, patterns);

    if !logs_dir.is_dir() {
        debug!(logs_dir = %logs_dir.display(), "logs directory not found, nothing to scan");
        return analysis;
    }

    let entries = match fs::read_dir(logs_dir) {
        Ok(entries) => entries,
        Err(err) => {
            analysis.skip(logs_dir.to_path_buf(), &err);
            return analysis;
        }
    };

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if path.is_file() {
                    files.push(path);
                }
            }
            Err(err) => analysis.skip(logs_dir.to_path_buf(), &err),
        }
    }
    files.sort();

    for path in files {
        analysis.files_scanned += 1;
        if let Err(err) = analysis.scan_file(&path, patterns) {
            analysis.skip(path, &err);
        }
    }

    debug!(
        logs_dir = %logs_dir.display(),
        files_scanned = analysis.files_scanned,
        skipped = analysis.skipped_files.len(),
        "log scan finished"
    );
    analysis
}
