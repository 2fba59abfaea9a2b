//! Scriptable in-memory catalog source
//!
//! Records every call so tests can assert which backend was consulted and in
//! what order.

use async_trait::async_trait;
use beatschain_common::{Beat, Producer};
use beatschain_dp::backends::{BackendError, BackendResult, CatalogSource};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How the source misbehaves, if at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Failure {
    #[default]
    None,
    /// Every call returns an error
    Error,
    /// Every call panics
    Panic,
    /// Every call sleeps far beyond any test timeout
    Hang,
}

#[derive(Default)]
pub struct MockSource {
    name: &'static str,
    producers: HashMap<String, Producer>,
    producer_beats: HashMap<String, Vec<Beat>>,
    all_producers: Vec<Producer>,
    beats: HashMap<String, Beat>,
    featured: Vec<Beat>,
    failing_producer_ids: HashSet<String>,
    failure: Failure,
    calls: Mutex<Vec<String>>,
}

impl MockSource {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    pub fn with_producer(mut self, key: &str, producer: Producer) -> Self {
        self.producers.insert(key.to_string(), producer);
        self
    }

    pub fn with_producer_beats(mut self, key: &str, beats: Vec<Beat>) -> Self {
        self.producer_beats.insert(key.to_string(), beats);
        self
    }

    pub fn with_all_producers(mut self, producers: Vec<Producer>) -> Self {
        self.all_producers = producers;
        self
    }

    pub fn with_beat(mut self, key: &str, beat: Beat) -> Self {
        self.beats.insert(key.to_string(), beat);
        self
    }

    pub fn with_featured(mut self, beats: Vec<Beat>) -> Self {
        self.featured = beats;
        self
    }

    /// `get_producer` errors for this id only
    pub fn failing_producer(mut self, key: &str) -> Self {
        self.failing_producer_ids.insert(key.to_string());
        self
    }

    pub fn failing(mut self, failure: Failure) -> Self {
        self.failure = failure;
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Calls recorded so far, formatted as `operation:argument`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    async fn record(&self, call: String) -> BackendResult<()> {
        self.calls.lock().unwrap().push(call);
        match self.failure {
            Failure::None => Ok(()),
            Failure::Error => Err(BackendError::Decode(format!("{} unavailable", self.name))),
            Failure::Panic => panic!("{} exploded", self.name),
            Failure::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl CatalogSource for MockSource {
    fn source_id(&self) -> &'static str {
        self.name
    }

    async fn get_producer(&self, id: &str) -> BackendResult<Option<Producer>> {
        self.record(format!("get_producer:{}", id)).await?;
        if self.failing_producer_ids.contains(id) {
            return Err(BackendError::Rpc {
                code: -32000,
                message: format!("lookup of {} failed", id),
            });
        }
        Ok(self.producers.get(id).cloned())
    }

    async fn get_producer_beats(&self, producer_id: &str) -> BackendResult<Vec<Beat>> {
        self.record(format!("get_producer_beats:{}", producer_id))
            .await?;
        Ok(self
            .producer_beats
            .get(producer_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_all_producers(&self) -> BackendResult<Vec<Producer>> {
        self.record("get_all_producers:".to_string()).await?;
        Ok(self.all_producers.clone())
    }

    async fn get_beat(&self, id: &str) -> BackendResult<Option<Beat>> {
        self.record(format!("get_beat:{}", id)).await?;
        Ok(self.beats.get(id).cloned())
    }

    async fn get_featured_beats(&self, limit: Option<usize>) -> BackendResult<Vec<Beat>> {
        self.record(format!("get_featured_beats:{:?}", limit)).await?;
        let limit = limit.unwrap_or(6);
        Ok(self.featured.iter().take(limit).cloned().collect())
    }
}
