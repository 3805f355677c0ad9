//! Client for the Datafordeler DAR REST service and file downloads
//!
//! Two ways to get the same entities:
//! - paged REST queries over a date range, one page in memory at a time
//! - the newest full bulk file, downloaded as a ZIP and streamed record by record

use std::collections::HashSet;
use std::time::Instant;

use async_stream::try_stream;
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt, pin_mut};
use itertools::Itertools;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use super::mapping::{DatafordelerEntity, FlatFileEntity, map_file_access_address, map_post_code};
use super::wire::{
    DafAddressPoint, DafFileAccessAddress, DafPostCode, DafSupplementaryTownName, FileCatalog,
    FileDownload, select_latest_file,
};
use super::xref::CrossReferenceIndex;
use crate::async_io::{RecordStream, decode_single, stream_archive_records};
use crate::config::DatafordelerConfig;
use crate::error::{DawaError, Result};
use crate::models::{AccessAddress, AddressStatus, PostCode};
use crate::transport::{HttpTransport, Transport, get_with_cancel, read_body};
use crate::utils::{format_query_date, log_operation_complete, log_warning, redact_url};

/// File entity holding address point positions
pub const ADDRESS_POINT_FILE: &str = "Adressepunkt";

/// File entity holding supplementary town names
pub const SUPPLEMENTARY_TOWN_NAME_FILE: &str = "SupplerendeBynavn";

/// Client for Datafordeler
#[derive(Debug, Clone)]
pub struct DatafordelerClient<T = HttpTransport> {
    transport: T,
    config: DatafordelerConfig,
}

impl DatafordelerClient<HttpTransport> {
    /// Client with a default HTTP transport
    pub fn new(config: DatafordelerConfig) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new()?, config))
    }
}

impl<T: Transport> DatafordelerClient<T> {
    /// Client using the given transport
    pub fn with_transport(transport: T, config: DatafordelerConfig) -> Self {
        Self { transport, config }
    }

    /// The active configuration
    #[must_use]
    pub const fn config(&self) -> &DatafordelerConfig {
        &self.config
    }

    /// Stream every `E` changed in a date range, page by page
    ///
    /// Paging stops at the first page shorter than the page size. A failing
    /// record ends the stream.
    pub fn get_by_date_range<E: DatafordelerEntity>(
        &self,
        from: DateTime<Utc>,
        to: Option<DateTime<Utc>>,
        status: Option<E::Status>,
        cancel: &CancellationToken,
    ) -> RecordStream<'_, E> {
        Box::pin(self.paged_records::<E>(from, to, status, cancel.clone()))
    }

    /// Stream every `E` from the newest bulk file
    ///
    /// With `statuses`, records with any other status are left out.
    pub fn get_all_from_file<E: FlatFileEntity>(
        &self,
        statuses: Option<&HashSet<E::Status>>,
        cancel: &CancellationToken,
    ) -> RecordStream<'_, E> {
        Box::pin(self.flat_file_records::<E>(statuses.cloned(), cancel.clone()))
    }

    /// Stream every access address from the newest bulk files
    ///
    /// Address points, supplementary town names and post codes are loaded
    /// into a [`CrossReferenceIndex`] first. Husnumre with dangling
    /// references are skipped.
    pub fn access_addresses_from_file(
        &self,
        statuses: Option<&HashSet<AddressStatus>>,
        cancel: &CancellationToken,
    ) -> RecordStream<'_, AccessAddress> {
        Box::pin(self.access_address_file_records(statuses.cloned(), cancel.clone()))
    }

    /// Load the lookup tables needed by [`Self::access_addresses_from_file`]
    pub async fn build_cross_reference_index(&self, cancel: &CancellationToken) -> Result<CrossReferenceIndex> {
        let mut builder = CrossReferenceIndex::builder();

        let points = self.file_records::<DafAddressPoint>(ADDRESS_POINT_FILE, cancel.clone());
        pin_mut!(points);
        while let Some(point) = points.next().await {
            builder.insert_address_point(point?)?;
        }

        let towns = self.file_records::<DafSupplementaryTownName>(SUPPLEMENTARY_TOWN_NAME_FILE, cancel.clone());
        pin_mut!(towns);
        while let Some(town) = towns.next().await {
            builder.insert_supplementary_town_name(town?)?;
        }

        let post_codes =
            self.file_records::<DafPostCode>(<PostCode as DatafordelerEntity>::FILE_ENTITY, cancel.clone());
        pin_mut!(post_codes);
        while let Some(post_code) = post_codes.next().await {
            builder.insert_post_code(map_post_code(post_code?)?);
        }

        Ok(builder.build())
    }

    /// Find the newest full JSON dump of `entity_name` in the file catalog
    pub async fn latest_file(&self, entity_name: &str, cancel: &CancellationToken) -> Result<FileDownload> {
        let url = format!(
            "{}/FileDownloads/GetAvailableFileDownloads?Register=DAR&format=JSON{}",
            self.file_api_base_url(),
            self.api_key_param()
        );
        log::debug!("GET {}", redact_url(&url));

        let body = get_with_cancel(&self.transport, &url, cancel).await?;
        let body = read_body(body, cancel).await?;
        let catalog: FileCatalog = decode_single(&body, &redact_url(&url))?;

        let file = select_latest_file(&catalog.available_file_downloads, entity_name)
            .cloned()
            .ok_or_else(|| DawaError::FileNotFound(entity_name.to_string()))?;

        log::info!(
            "Latest {} file is generation {} ({})",
            file.entity_name,
            file.generation_number,
            file.file_name
        );
        Ok(file)
    }

    /// Download URL of a catalog entry
    #[must_use]
    pub fn file_url(&self, file: &FileDownload) -> String {
        format!(
            "{}/FileDownloads/GetFile?Register=DAR&EntityName={}&TypeOfDownload=TotalDownload&TypeOfData=Current&Format=JSON&GenerationNumber={}{}",
            self.file_api_base_url(),
            file.entity_name,
            file.generation_number,
            self.api_key_param()
        )
    }

    /// URL of one REST page
    #[must_use]
    pub fn page_url<E: DatafordelerEntity>(
        &self,
        from: &DateTime<Utc>,
        to: Option<&DateTime<Utc>>,
        page_size: usize,
        page: usize,
        status: Option<E::Status>,
    ) -> String {
        let mut params = vec![format!("DAFTimestampFra={}", format_query_date(from))];
        if let Some(to) = to {
            params.push(format!("DAFTimestampTil={}", format_query_date(to)));
        }
        params.push(format!("pagesize={page_size}"));
        params.push(format!("page={page}"));
        if let Some(status) = status {
            params.push(format!("status={}", E::status_code(status)));
        }
        if !E::INCLUDE_NESTED {
            params.push("meddybde=false".to_string());
        }
        params.push("Format=JSON".to_string());

        format!(
            "{}/{}?{}",
            self.config.base_url.trim_end_matches('/'),
            E::RESOURCE,
            params.iter().join("&")
        )
    }

    fn file_api_base_url(&self) -> &str {
        self.config.file_api_base_url.trim_end_matches('/')
    }

    fn api_key_param(&self) -> String {
        self.config
            .api_key
            .as_ref()
            .map_or_else(String::new, |key| format!("&apikey={key}"))
    }

    fn paged_records<E: DatafordelerEntity>(
        &self,
        from: DateTime<Utc>,
        to: Option<DateTime<Utc>>,
        status: Option<E::Status>,
        cancel: CancellationToken,
    ) -> impl Stream<Item = Result<E>> + Send + '_ {
        try_stream! {
            let started = Instant::now();
            let page_size = E::page_size(&self.config).max(1);
            let mut page = 1usize;
            let mut total = 0usize;

            loop {
                if cancel.is_cancelled() {
                    Err::<(), _>(DawaError::Cancelled)?;
                }

                let url = self.page_url::<E>(&from, to.as_ref(), page_size, page, status);
                log::debug!("Fetching {} page {page}: {}", E::RESOURCE, redact_url(&url));

                let body = get_with_cancel(&self.transport, &url, &cancel).await?;
                let body = read_body(body, &cancel).await?;
                let records: Option<Vec<E::Wire>> = serde_json::from_slice(&body)?;
                let records = records.ok_or_else(|| {
                    DawaError::InvalidOperation(format!(
                        "Received NULL when trying to get {} from path: '{}'",
                        E::RESOURCE,
                        redact_url(&url)
                    ))
                })?;

                let received = records.len();
                for record in records {
                    if let Some(mapped) = E::from_rest(record)? {
                        total += 1;
                        yield mapped;
                    }
                }

                if received < page_size {
                    break;
                }
                page += 1;
            }

            log_operation_complete("retrieved", E::RESOURCE, total, Some(started.elapsed()));
        }
    }

    fn flat_file_records<E: FlatFileEntity>(
        &self,
        statuses: Option<HashSet<E::Status>>,
        cancel: CancellationToken,
    ) -> impl Stream<Item = Result<E>> + Send + '_ {
        try_stream! {
            let records = self.file_records::<E::Wire>(E::FILE_ENTITY, cancel.clone());
            pin_mut!(records);

            let mut filtered = 0usize;
            while let Some(record) = records.next().await {
                let Some(mapped) = E::from_rest(record?)? else {
                    continue;
                };
                if statuses.as_ref().is_some_and(|statuses| !statuses.contains(&mapped.status())) {
                    filtered += 1;
                    continue;
                }
                yield mapped;
            }

            log::debug!("Filtered {filtered} {} records by status", E::FILE_ENTITY);
        }
    }

    fn access_address_file_records(
        &self,
        statuses: Option<HashSet<AddressStatus>>,
        cancel: CancellationToken,
    ) -> impl Stream<Item = Result<AccessAddress>> + Send + '_ {
        try_stream! {
            let index = self.build_cross_reference_index(&cancel).await?;

            let records = self.file_records::<DafFileAccessAddress>(
                <AccessAddress as DatafordelerEntity>::FILE_ENTITY,
                cancel.clone(),
            );
            pin_mut!(records);

            let mut dropped = 0usize;
            while let Some(record) = records.next().await {
                let Some(address) = map_file_access_address(record?, &index)? else {
                    dropped += 1;
                    continue;
                };
                if statuses.as_ref().is_some_and(|statuses| !statuses.contains(&address.status)) {
                    continue;
                }
                yield address;
            }

            if dropped > 0 {
                log_warning(
                    &format!("Dropped {dropped} access addresses with unresolved references"),
                    None,
                );
            }
        }
    }

    fn file_records<W>(&self, entity_name: &'static str, cancel: CancellationToken) -> impl Stream<Item = Result<W>> + Send + '_
    where
        W: DeserializeOwned + Send + 'static,
    {
        try_stream! {
            let file = self.latest_file(entity_name, &cancel).await?;
            let url = self.file_url(&file);

            let records = stream_archive_records::<W, T>(
                &self.transport,
                url,
                self.config.temp_dir.clone(),
                cancel.clone(),
            );
            pin_mut!(records);

            while let Some(record) = records.next().await {
                yield record?;
            }
        }
    }
}
