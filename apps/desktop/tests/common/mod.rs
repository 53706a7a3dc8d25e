//! Shared setup for integration tests.
//!
//! Each `TestContext` owns a temporary directory holding the database,
//! the dictionary CSV and the backup directory.

#![allow(dead_code)]

pub mod fixtures;

use std::path::PathBuf;

use kana_review_lib::config::AppConfig;
use kana_review_lib::state::AppState;
use tempfile::TempDir;

pub struct TestContext {
    pub state: AppState,
    dir: TempDir,
}

impl TestContext {
    /// Open a fresh database in a temporary directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = AppConfig {
            db_path: dir.path().join("vocab.db"),
            dictionary_path: dir.path().join("jp_zh_dict.csv"),
            backup_dir: dir.path().join("backups"),
        };
        let state = AppState::open(config).expect("Failed to open database");
        Self { state, dir }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write the dictionary CSV at the configured location.
    pub fn write_dictionary(&self, contents: &str) {
        std::fs::write(&self.state.config.dictionary_path, contents)
            .expect("Failed to write dictionary");
    }

    /// Write a file into the temporary directory and return its path.
    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, contents).expect("Failed to write file");
        path
    }

    /// Write `contents` in a legacy encoding, as spreadsheet exports do.
    pub fn write_encoded(&self, name: &str, contents: &str, encoding: &'static encoding_rs::Encoding) -> PathBuf {
        let (bytes, _, unmappable) = encoding.encode(contents);
        assert!(!unmappable, "{contents:?} is not representable in {}", encoding.name());
        let path = self.path(name);
        std::fs::write(&path, &bytes).expect("Failed to write file");
        path
    }
}

/// Capture command output as a string.
pub fn output(buf: Vec<u8>) -> String {
    String::from_utf8(buf).expect("output is UTF-8")
}
