//! Fakes for the pipeline seams.

use crate::config::StorageConfig;
use crate::error::{FetchError, StorageError};
use crate::records::identity::format_cpf;
use crate::records::{Endpoint, IdentitySource, RemoteSource};
use crate::s3_uploader::{ObjectBody, ObjectStore, PutAck};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Mutex;

pub fn storage_config() -> StorageConfig {
    StorageConfig {
        endpoint: "localhost:9000".to_string(),
        access_key: "minio".to_string(),
        secret_key: "minio123".to_string(),
        bucket: "raw".to_string(),
        columnar_bucket: "landing".to_string(),
        root_folder: "com.owshq.data".to_string(),
        region: "us-east-1".to_string(),
        force_path_style: true,
    }
}

/// Identity with a fixed clock and sequential national ids
pub struct FixedIdentity {
    user_id: u32,
    sequential_user_ids: bool,
    next_national_id: u32,
    national_ids: bool,
}

impl FixedIdentity {
    /// Identity answering every draw with `user_id`
    pub fn new(user_id: u32) -> Self {
        Self {
            user_id,
            sequential_user_ids: false,
            next_national_id: 1,
            national_ids: true,
        }
    }

    /// Identity handing out `first`, `first + 1`, ... one per draw
    pub fn sequential(first: u32) -> Self {
        Self {
            sequential_user_ids: true,
            ..Self::new(first)
        }
    }

    /// Identity whose national ids are empty, closing the gate
    pub fn without_national_ids(user_id: u32) -> Self {
        Self {
            national_ids: false,
            ..Self::new(user_id)
        }
    }

    pub fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 45).unwrap()
    }
}

impl IdentitySource for FixedIdentity {
    fn user_id(&mut self) -> u32 {
        let user_id = self.user_id;
        if self.sequential_user_ids {
            self.user_id += 1;
        }
        user_id
    }

    fn national_id(&mut self) -> String {
        if !self.national_ids {
            return String::new();
        }

        let mut n = self.next_national_id;
        self.next_national_id += 1;

        let mut base = [0u8; 9];
        for digit in base.iter_mut().rev() {
            *digit = (n % 10) as u8;
            n /= 10;
        }
        format_cpf(&base)
    }

    fn now(&self) -> DateTime<Utc> {
        Self::fixed_now()
    }
}

/// Remote source answering every endpoint with `size` canned records
pub struct FakeRemote {
    size: usize,
    failing: bool,
    calls: Mutex<Vec<Endpoint>>,
}

impl FakeRemote {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            failing: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Remote source whose every fetch fails with a 503
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new(0)
        }
    }

    pub fn calls(&self) -> Vec<Endpoint> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteSource for FakeRemote {
    async fn fetch(&self, endpoint: Endpoint) -> Result<Value, FetchError> {
        self.calls.lock().unwrap().push(endpoint);

        if self.failing {
            return Err(FetchError::Status {
                url: format!("http://fake/{}", endpoint.path()),
                status: 503,
            });
        }

        Ok(Value::Array(
            (0..self.size)
                .map(|i| {
                    json!({
                        "id": i,
                        "uid": format!("uid-{i}"),
                        "source": endpoint.path(),
                    })
                })
                .collect(),
        ))
    }
}

/// One object captured by [`RecordingStore`]
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bucket: String,
    pub key: String,
    pub body: Vec<u8>,
    pub length: u64,
    pub content_type: String,
}

/// Object store keeping every put in memory.
///
/// File bodies are read at put time, while the staging file still exists.
#[derive(Default)]
pub struct RecordingStore {
    objects: Mutex<Vec<StoredObject>>,
    staged: Mutex<Vec<PathBuf>>,
    fail_keys_containing: Option<String>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store rejecting every key that contains `needle`
    pub fn failing_on(needle: &str) -> Self {
        Self {
            fail_keys_containing: Some(needle.to_string()),
            ..Self::default()
        }
    }

    pub fn objects(&self) -> Vec<StoredObject> {
        self.objects.lock().unwrap().clone()
    }

    pub fn staged_paths(&self) -> Vec<PathBuf> {
        self.staged.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: ObjectBody,
        length: u64,
        content_type: &str,
    ) -> Result<PutAck, StorageError> {
        if let Some(needle) = &self.fail_keys_containing {
            if key.contains(needle.as_str()) {
                return Err(StorageError::Put {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    message: "simulated outage".to_string(),
                });
            }
        }

        let body = match body {
            ObjectBody::Memory(bytes) => bytes.to_vec(),
            ObjectBody::File(path) => {
                let bytes = std::fs::read(&path).unwrap();
                self.staged.lock().unwrap().push(path);
                bytes
            }
        };

        self.objects.lock().unwrap().push(StoredObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
            body,
            length,
            content_type: content_type.to_string(),
        });

        Ok(PutAck {
            bucket: bucket.to_string(),
            key: key.to_string(),
            etag: Some(format!("etag-{}", self.objects.lock().unwrap().len())),
            version_id: None,
        })
    }
}
