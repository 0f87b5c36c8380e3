//! Model fixtures exercising the Loader contract.

#![allow(dead_code)]

use super::builders::{author_row, book_rows_for, record, tag_rows};
use async_trait::async_trait;
use row_hydrator::{BoxError, HydrationContext, Model, RawRecord};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;

/// Sets `abc` right away and `xyz` after a delay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegerModel {
    pub integer: i64,
    #[serde(default)]
    pub abc: String,
    #[serde(default)]
    pub xyz: String,
}

#[async_trait]
impl Model for IntegerModel {
    const MODEL_NAME: &'static str = "IntegerModel";

    async fn load(
        &mut self,
        _record: &RawRecord,
        _ctx: &HydrationContext,
    ) -> Result<(), BoxError> {
        self.abc = "xyz".to_string();
        tokio::time::sleep(Duration::from_millis(500)).await;
        self.xyz = "abc".to_string();
        Ok(())
    }
}

pub static PROBE_IN_FLIGHT: AtomicUsize = AtomicUsize::new(0);
pub static PROBE_PEAK: AtomicUsize = AtomicUsize::new(0);
pub static PROBE_LOADS: AtomicUsize = AtomicUsize::new(0);

/// Counts how many Loaders are unresolved at once
#[derive(Debug, Serialize, Deserialize)]
pub struct ConcurrencyProbe {
    pub integer: i64,
}

#[async_trait]
impl Model for ConcurrencyProbe {
    const MODEL_NAME: &'static str = "ConcurrencyProbe";

    async fn load(
        &mut self,
        _record: &RawRecord,
        _ctx: &HydrationContext,
    ) -> Result<(), BoxError> {
        PROBE_LOADS.fetch_add(1, Ordering::SeqCst);
        let running = PROBE_IN_FLIGHT.fetch_add(1, Ordering::SeqCst) + 1;
        PROBE_PEAK.fetch_max(running, Ordering::SeqCst);

        let delay = 10 * (self.integer as u64 % 3 + 1);
        tokio::time::sleep(Duration::from_millis(delay)).await;

        PROBE_IN_FLIGHT.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("row {integer} rejected")]
pub struct RowRejected {
    pub integer: i64,
}

/// Fails for the row whose `integer` equals the `fail_at` metadata entry;
/// every other row takes a second to load
#[derive(Debug, Serialize, Deserialize)]
pub struct Failing {
    pub integer: i64,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[async_trait]
impl Model for Failing {
    const MODEL_NAME: &'static str = "Failing";

    async fn load(
        &mut self,
        _record: &RawRecord,
        ctx: &HydrationContext,
    ) -> Result<(), BoxError> {
        self.request_id = ctx
            .metadata()
            .get("request_id")
            .and_then(|value| value.as_str())
            .map(str::to_string);

        let fail_at = ctx.metadata().get("fail_at").and_then(|value| value.as_i64());
        if fail_at == Some(self.integer) {
            return Err(Box::new(RowRejected {
                integer: self.integer,
            }));
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
        Ok(())
    }
}

/// Authors load their books, books load their author
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub books: Vec<Book>,
    #[serde(default)]
    pub loaded_as_top: bool,
}

#[async_trait]
impl Model for Author {
    const MODEL_NAME: &'static str = "Author";

    fn identity(record: &RawRecord) -> String {
        record.get("id").map(|id| id.to_string()).unwrap_or_default()
    }

    async fn load(
        &mut self,
        _record: &RawRecord,
        ctx: &HydrationContext,
    ) -> Result<(), BoxError> {
        self.loaded_as_top = ctx.is_top();
        let rows = book_rows_for(self.id);
        if let Some(books) = ctx.hydrate::<Book>(Some(rows.into())).await? {
            self.books = books.into_vec();
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author_id: i64,
    #[serde(default)]
    pub author: Option<Box<Author>>,
    #[serde(default)]
    pub loaded_as_top: bool,
}

#[async_trait]
impl Model for Book {
    const MODEL_NAME: &'static str = "Book";

    fn identity(record: &RawRecord) -> String {
        record.get("id").map(|id| id.to_string()).unwrap_or_default()
    }

    async fn load(
        &mut self,
        _record: &RawRecord,
        ctx: &HydrationContext,
    ) -> Result<(), BoxError> {
        self.loaded_as_top = ctx.is_top();
        let author = ctx.hydrate_one::<Author>(author_row(self.author_id)).await?;
        self.author = Some(Box::new(author));
        Ok(())
    }
}

/// Every link loads a fresh next link, so only the depth limit stops it
#[derive(Debug, Serialize, Deserialize)]
pub struct Chain {
    pub n: i64,
    #[serde(default)]
    pub next: Option<Box<Chain>>,
}

#[async_trait]
impl Model for Chain {
    const MODEL_NAME: &'static str = "Chain";

    async fn load(
        &mut self,
        _record: &RawRecord,
        ctx: &HydrationContext,
    ) -> Result<(), BoxError> {
        let next = ctx
            .hydrate_one::<Chain>(record(json!({ "n": self.n + 1 })))
            .await?;
        self.next = Some(Box::new(next));
        Ok(())
    }
}

/// Marks itself loaded; reached from several posts with the same row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub loaded: bool,
}

#[async_trait]
impl Model for Tag {
    const MODEL_NAME: &'static str = "Tag";

    async fn load(
        &mut self,
        _record: &RawRecord,
        _ctx: &HydrationContext,
    ) -> Result<(), BoxError> {
        tokio::task::yield_now().await;
        self.loaded = true;
        Ok(())
    }
}

/// Every post hydrates its own copy of the shared tag rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[async_trait]
impl Model for Post {
    const MODEL_NAME: &'static str = "Post";

    async fn load(
        &mut self,
        _record: &RawRecord,
        ctx: &HydrationContext,
    ) -> Result<(), BoxError> {
        if let Some(tags) = ctx.hydrate::<Tag>(Some(tag_rows().into())).await? {
            self.tags = tags.into_vec();
        }
        Ok(())
    }
}
