//! Hand-written port doubles shared by the unit tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use apiprobe_domain::{RequestSpec, ResponseSpec};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::ports::{
    Clock, HttpTransport, RecordStore, RecordStoreError, TransportError, TransportResult,
};

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()),
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        let mut now = self.now.lock().unwrap();
        *now += Duration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Record store backed by a map; two token stores sharing one instance
/// behave like two processes sharing one token file.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: Mutex<HashMap<String, Value>>,
    read_only: AtomicBool,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, slot: &str) -> Option<Value> {
        self.records.lock().unwrap().get(slot).cloned()
    }

    pub fn insert_raw(&self, slot: &str, value: Value) {
        self.records.lock().unwrap().insert(slot.to_string(), value);
    }

    /// Makes writes and removals fail while reads keep working, like a
    /// token directory without write permission.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), RecordStoreError> {
        if self.read_only.load(Ordering::SeqCst) {
            Err(RecordStoreError::Io(std::io::Error::from(
                std::io::ErrorKind::PermissionDenied,
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn read_record(&self, slot: &str) -> Result<Option<Value>, RecordStoreError> {
        Ok(self.raw(slot))
    }

    async fn write_record(&self, slot: &str, record: &Value) -> Result<(), RecordStoreError> {
        self.check_writable()?;
        self.insert_raw(slot, record.clone());
        Ok(())
    }

    async fn remove_record(&self, slot: &str) -> Result<(), RecordStoreError> {
        self.check_writable()?;
        self.records.lock().unwrap().remove(slot);
        Ok(())
    }
}

/// Record store whose every operation fails.
pub struct FailingRecordStore;

fn disk_gone() -> RecordStoreError {
    RecordStoreError::Io(std::io::Error::other("disk gone"))
}

#[async_trait]
impl RecordStore for FailingRecordStore {
    async fn read_record(&self, _slot: &str) -> Result<Option<Value>, RecordStoreError> {
        Err(disk_gone())
    }

    async fn write_record(&self, _slot: &str, _record: &Value) -> Result<(), RecordStoreError> {
        Err(disk_gone())
    }

    async fn remove_record(&self, _slot: &str) -> Result<(), RecordStoreError> {
        Err(disk_gone())
    }
}

/// Transport that replays scripted outcomes per URL fragment and logs requests.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<Vec<(String, VecDeque<TransportResult>)>>,
    requests: Mutex<Vec<RequestSpec>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an outcome for the next request whose URL contains `fragment`.
    pub fn script(&self, fragment: &str, outcome: TransportResult) {
        let mut routes = self.routes.lock().unwrap();
        if let Some((_, queue)) = routes.iter_mut().find(|(f, _)| f == fragment) {
            queue.push_back(outcome);
        } else {
            routes.push((fragment.to_string(), VecDeque::from([outcome])));
        }
    }

    pub fn respond(&self, fragment: &str, status: u16, body: Value) {
        self.script(fragment, Ok(ResponseSpec::new(status, body)));
    }

    pub fn requests(&self) -> Vec<RequestSpec> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls_to(&self, fragment: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.contains(fragment))
            .count()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: &RequestSpec) -> TransportResult {
        self.requests.lock().unwrap().push(request.clone());
        let mut routes = self.routes.lock().unwrap();
        routes
            .iter_mut()
            .find(|(fragment, _)| request.url.contains(fragment.as_str()))
            .and_then(|(_, queue)| queue.pop_front())
            .unwrap_or_else(|| Err(TransportError::Other(format!("unscripted call to {}", request.url))))
    }
}
