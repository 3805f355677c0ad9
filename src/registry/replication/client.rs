//! Client for the DAWA replication API
//!
//! Transaction cursors, full snapshots as of a transaction and change feeds
//! between two transactions. Snapshots and change feeds are streamed as
//! newline-delimited JSON.

use std::time::Instant;

use async_stream::try_stream;
use futures::{Stream, StreamExt, TryStreamExt, future, pin_mut};
use serde::de::DeserializeOwned;
use tokio_util::io::StreamReader;
use tokio_util::sync::CancellationToken;

use super::mapping::ReplicationEntity;
use crate::async_io::{RecordStream, decode_records, decode_single};
use crate::config::ReplicationConfig;
use crate::error::{DawaError, Result};
use crate::models::{EntityChange, TransactionCursor};
use crate::transport::{HttpTransport, Transport, get_with_cancel, read_body};
use crate::utils::{log_operation_complete, log_operation_start, redact_url};

/// Client for the replication API
#[derive(Debug, Clone)]
pub struct ReplicationClient<T = HttpTransport> {
    transport: T,
    config: ReplicationConfig,
}

impl ReplicationClient<HttpTransport> {
    /// Client against the public endpoint with a default HTTP transport
    pub fn new() -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new()?, ReplicationConfig::default()))
    }
}

impl<T: Transport> ReplicationClient<T> {
    /// Client using the given transport and configuration
    pub fn with_transport(transport: T, config: ReplicationConfig) -> Self {
        Self { transport, config }
    }

    /// Get the newest transaction in the replication log
    pub async fn latest_cursor(&self, cancel: &CancellationToken) -> Result<TransactionCursor> {
        let url = format!("{}/senestetransaktion", self.base_url());
        let body = self.fetch(&url, cancel).await?;
        decode_single(&body, &redact_url(&url))
    }

    /// Get all transactions after `cursor`, excluding `cursor` itself
    ///
    /// The endpoint returns one bounded array, so it is read eagerly.
    pub async fn transactions_after(
        &self,
        cursor: TransactionCursor,
        cancel: &CancellationToken,
    ) -> Result<Vec<TransactionCursor>> {
        let url = format!("{}/transaktioner?txidfra={}", self.base_url(), cursor.next_id());
        let body = self.fetch(&url, cancel).await?;
        let source = redact_url(&url);

        let transactions: Vec<Option<TransactionCursor>> = decode_single(&body, &source)?;
        let transactions = transactions
            .into_iter()
            .map(|transaction| {
                transaction.ok_or_else(|| DawaError::empty_result(format!("Null transaction from {source}")))
            })
            .collect::<Result<Vec<_>>>()?;

        log::debug!("{} transactions after {cursor}", transactions.len());
        Ok(transactions)
    }

    /// Stream every record of `entity_name` as of `cursor`, in wire shape
    pub fn raw_snapshot<W>(
        &self,
        entity_name: &str,
        cursor: TransactionCursor,
        cancel: &CancellationToken,
    ) -> RecordStream<'_, W>
    where
        W: DeserializeOwned + Send + 'static,
    {
        let url = format!(
            "{}/udtraek?entitet={entity_name}&ndjson&txid={cursor}",
            self.base_url()
        );
        Box::pin(self.stream_lines(url, cancel.clone()))
    }

    /// Stream the changes to `entity_name` after `from` up to and including `to`, in wire shape
    pub fn raw_changes<W>(
        &self,
        entity_name: &str,
        from: TransactionCursor,
        to: TransactionCursor,
        cancel: &CancellationToken,
    ) -> RecordStream<'_, EntityChange<W>>
    where
        W: DeserializeOwned + Send + 'static,
    {
        let url = format!(
            "{}/haendelser?entitet={entity_name}&ndjson&txidfra={}&txidtil={to}",
            self.base_url(),
            from.next_id()
        );
        Box::pin(self.stream_lines(url, cancel.clone()))
    }

    /// Stream every `E` as of `cursor`
    ///
    /// Records the mapper drops are skipped.
    pub fn snapshot<E: ReplicationEntity>(
        &self,
        cursor: TransactionCursor,
        cancel: &CancellationToken,
    ) -> RecordStream<'_, E> {
        let records = self.raw_snapshot::<E::Wire>(E::ENTITY_NAME, cursor, cancel);
        Box::pin(records.try_filter_map(|record| future::ready(E::from_replication(record))))
    }

    /// Stream the changes to `E` between two cursors
    ///
    /// Every change satisfies `from < change.id <= to`.
    pub fn changes<E: ReplicationEntity>(
        &self,
        from: TransactionCursor,
        to: TransactionCursor,
        cancel: &CancellationToken,
    ) -> RecordStream<'_, EntityChange<E>> {
        let changes = self.raw_changes::<E::Wire>(E::ENTITY_NAME, from, to, cancel);
        Box::pin(changes.try_filter_map(|change| future::ready(change.try_filter_map(E::from_replication))))
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<Vec<u8>> {
        log::debug!("GET {}", redact_url(url));
        let body = get_with_cancel(&self.transport, url, cancel).await?;
        read_body(body, cancel).await
    }

    fn stream_lines<W>(
        &self,
        url: String,
        cancel: CancellationToken,
    ) -> impl Stream<Item = Result<W>> + Send + '_
    where
        W: DeserializeOwned + Send + 'static,
    {
        try_stream! {
            let started = Instant::now();
            log_operation_start("Streaming", &url);

            let body = get_with_cancel(&self.transport, &url, &cancel).await?;
            let records = decode_records::<W, _>(StreamReader::new(body), cancel.clone(), redact_url(&url));
            pin_mut!(records);

            let mut count = 0usize;
            while let Some(record) = records.next().await {
                count += 1;
                yield record?;
            }

            log_operation_complete("streamed", &redact_url(&url), count, Some(started.elapsed()));
        }
    }
}
