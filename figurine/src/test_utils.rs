//! Shared helpers for handler tests: a real router over filesystem-backed
//! storage in a temporary directory, with a fast poll budget.

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use bytes::Bytes;

use crate::config::{Config, StorageConfig};
use crate::storage::{BlobStore, FsStore};
use crate::{AppState, build_router};

/// Handles to the test app's storage, plus the tempdir keeping it alive.
pub struct TestContext {
    pub config: Config,
    pub input: Arc<dyn BlobStore>,
    pub output: Arc<dyn BlobStore>,
    _tmp: tempfile::TempDir,
}

impl TestContext {
    /// Place an image into the input bucket where the handlers expect it.
    pub async fn stage_upload(&self, task_id: &str, extension: &str, data: &[u8]) {
        let key = self.config.input.key(task_id, extension);
        self.input
            .upload(&key, Bytes::copy_from_slice(data), "application/octet-stream")
            .await
            .expect("staging upload must succeed");
    }
}

/// Build a `TestServer` over the real router with tempdir-backed storage.
///
/// The poll budget is shrunk so missing-blob tests fail fast instead of
/// sleeping through the production 5x2s schedule.
pub async fn create_test_app() -> (TestServer, TestContext) {
    let tmp = tempfile::tempdir().expect("create tempdir");

    let mut config = Config::default();
    config.storage = StorageConfig::Filesystem {
        root: tmp.path().to_path_buf(),
    };
    config.upload_poll.attempts = 2;
    config.upload_poll.interval = Duration::from_millis(10);

    let input: Arc<dyn BlobStore> = Arc::new(FsStore::new(
        tmp.path().join(&config.input.bucket),
        &config.input.bucket,
    ));
    let output: Arc<dyn BlobStore> = Arc::new(FsStore::new(
        tmp.path().join(&config.output.bucket),
        &config.output.bucket,
    ));

    let state = AppState {
        config: config.clone(),
        input: input.clone(),
        output: output.clone(),
    };
    let server = TestServer::new(build_router(state)).expect("Failed to create test server");

    (
        server,
        TestContext {
            config,
            input,
            output,
            _tmp: tmp,
        },
    )
}
