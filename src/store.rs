use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::models::StatusRecord;

struct StatusTable {
    order: Vec<String>,
    records: HashMap<String, StatusRecord>,
}

/// Shared map from target URL to its latest [`StatusRecord`].
///
/// Cloning yields another handle to the same table. Every read and write
/// happens under one lock, so a snapshot never contains a half-written record.
#[derive(Clone)]
pub struct StatusStore {
    inner: Arc<Mutex<StatusTable>>,
}

impl StatusStore {
    /// Seeds a pending record for every target, keeping the given order.
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut order = Vec::new();
        let mut records = HashMap::new();
        for target in targets {
            let url = target.into();
            if records.insert(url.clone(), StatusRecord::pending()).is_none() {
                order.push(url);
            }
        }
        Self {
            inner: Arc::new(Mutex::new(StatusTable { order, records })),
        }
    }

    /// Copy of every record in target order.
    pub async fn snapshot(&self) -> Vec<(String, StatusRecord)> {
        let table = self.inner.lock().await;
        table
            .order
            .iter()
            .filter_map(|url| table.records.get(url).map(|r| (url.clone(), r.clone())))
            .collect()
    }

    /// Overwrites the record for `url` and returns the previous one.
    pub async fn set(&self, url: &str, record: StatusRecord) -> Option<StatusRecord> {
        let mut table = self.inner.lock().await;
        let previous = table.records.insert(url.to_string(), record);
        if previous.is_none() {
            table.order.push(url.to_string());
        }
        previous
    }

    pub async fn get(&self, url: &str) -> Option<StatusRecord> {
        self.inner.lock().await.records.get(url).cloned()
    }
}
