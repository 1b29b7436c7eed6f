//! PostgREST-style remote data service client
//!
//! Collection-oriented reads (`select` / `order` / `limit`) and id-scoped
//! writes over the remote's REST surface. Column sets are fixed projections
//! per collection (never `select=*`) to bound payload size.
//!
//! The change feed is poll-based: a background task probes the critical-tier
//! tables and emits a payload-free [`ChangeSignal`] whenever the probe
//! fingerprint differs from the previous cycle. Edits that leave the newest
//! row and the row count untouched can slip past a probe; the refresh after
//! every local mutation covers the common case.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use tokio::sync::broadcast;

use super::{ChangeSignal, RemoteError, RemoteResult, RemoteStore};
use crate::cache::Collection;
use crate::config::Config;

/// Fixed column projection per collection.
fn columns(collection: Collection) -> &'static str {
    match collection {
        Collection::Barrels => {
            "id,code,capacity,beer_type,status,last_location_id,last_location_name,last_update,created_at"
        }
        Collection::Locations => "id,name,address,lat,lng",
        Collection::Batches => {
            "id,fermenter_name,beer_type,total_liters,remaining_liters,filling_date,status,created_at"
        }
        Collection::Activities => {
            "id,barrel_id,barrel_code,user_name,previous_status,new_status,location_id,location_name,beer_type,batch_id,event_name,notes,created_at"
        }
        Collection::Events => "id,name,date,notes,barrel_ids,checklist",
        Collection::Recipes => "id,name,description,ingredients,steps",
        Collection::Notifications => "id,title,message,type,created_at,read",
        Collection::Comments => "id,barrel_id,user_name,content,created_at",
    }
}

/// Server-side ordering per collection.
fn order(collection: Collection) -> &'static str {
    match collection {
        Collection::Barrels => "created_at.asc",
        Collection::Locations => "name.asc",
        Collection::Batches => "created_at.desc",
        Collection::Activities => "created_at.desc",
        Collection::Events => "date.asc",
        Collection::Recipes => "name.asc",
        Collection::Notifications => "created_at.desc",
        Collection::Comments => "created_at.desc",
    }
}

/// Remote store over a PostgREST-compatible API.
pub struct RestRemoteStore {
    client: Client,
    base_url: String,
    changes: broadcast::Sender<ChangeSignal>,
    poll_interval: Duration,
    poller_started: AtomicBool,
}

impl RestRemoteStore {
    pub fn new(config: &Config) -> RemoteResult<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.remote_key)
            .unwrap_or_else(|_| HeaderValue::from_static(""));
        headers.insert("apikey", key);
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.remote_key))
            .unwrap_or_else(|_| HeaderValue::from_static(""));
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        let (changes, _) = broadcast::channel(16);

        Ok(Self {
            client,
            base_url: config.remote_url.trim_end_matches('/').to_string(),
            changes,
            poll_interval: config.poll_interval,
            poller_started: AtomicBool::new(false),
        })
    }

    fn endpoint(&self, collection: Collection) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection.table())
    }

    async fn check(response: reqwest::Response) -> RemoteResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }

    /// Probe the critical-tier tables and fold the responses into a
    /// fingerprint string. Any difference between cycles means "something
    /// changed somewhere" — which is all the listener needs.
    async fn probe(&self) -> RemoteResult<String> {
        let mut fingerprint = String::new();
        for collection in Collection::CRITICAL {
            let response = self
                .client
                .get(self.endpoint(collection))
                .header("Prefer", "count=exact")
                .query(&[
                    ("select", columns(collection)),
                    ("order", order(collection)),
                    ("limit", "1"),
                ])
                .send()
                .await?;
            let response = Self::check(response).await?;
            if let Some(range) = response.headers().get("content-range") {
                fingerprint.push_str(&String::from_utf8_lossy(range.as_bytes()));
            }
            fingerprint.push_str(&response.text().await?);
            fingerprint.push('\n');
        }
        Ok(fingerprint)
    }

    async fn poll_loop(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        let mut last_fingerprint: Option<String> = None;

        loop {
            ticker.tick().await;

            match self.probe().await {
                Ok(fingerprint) => {
                    let changed = last_fingerprint
                        .as_ref()
                        .is_some_and(|last| *last != fingerprint);
                    last_fingerprint = Some(fingerprint);
                    if changed {
                        // Receiver lag or absence is fine; signals are redundant
                        let _ = self.changes.send(ChangeSignal);
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Change-feed probe failed; will retry");
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl RemoteStore for RestRemoteStore {
    async fn fetch(&self, collection: Collection, limit: Option<u32>) -> RemoteResult<Vec<Value>> {
        let mut request = self.client.get(self.endpoint(collection)).query(&[
            ("select", columns(collection)),
            ("order", order(collection)),
        ]);
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit.to_string())]);
        }

        let response = Self::check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn insert(&self, collection: Collection, row: Value) -> RemoteResult<()> {
        let response = self
            .client
            .post(self.endpoint(collection))
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn update(&self, collection: Collection, id: &str, patch: Value) -> RemoteResult<()> {
        let response = self
            .client
            .patch(self.endpoint(collection))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal")
            .json(&patch)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> RemoteResult<()> {
        let response = self
            .client
            .delete(self.endpoint(collection))
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_all(&self, collection: Collection) -> RemoteResult<()> {
        // PostgREST refuses an unfiltered DELETE; "id is not null" matches all
        let response = self
            .client
            .delete(self.endpoint(collection))
            .query(&[("id", "not.is.null")])
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    fn subscribe_changes(&self) -> broadcast::Receiver<ChangeSignal> {
        self.changes.subscribe()
    }

    fn start_change_feed(self: Arc<Self>) {
        if self.poller_started.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::debug!(interval_ms = self.poll_interval.as_millis() as u64, "Starting change-feed poller");
        tokio::spawn(self.poll_loop());
    }
}
