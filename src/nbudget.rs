//! High-level budget client.
//!
//! [`NBudget`] ties the settings, a [`Transport`], a [`TagCache`] and an
//! [`ErrorDelivery`] strategy together and exposes the operations of the
//! command-line tool as a library.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::cache::{InMemoryTagCache, TagCache};
use crate::classifier::classify;
use crate::date::resolve_date;
use crate::delivery::{ErrorDelivery, Propagate};
use crate::error::{NBudgetError, Result};
use crate::models::{Balance, PagePayload, PageSum, QueryRequest, Record, tag_options};
use crate::settings::Settings;
use crate::transport::{ApiRequest, HttpTransport, Transport};

/// Page created by [`NBudget::insert_record`].
///
/// Fields are read leniently; a response without them still counts as a
/// successful insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreatedPage {
    /// Identifier of the new page.
    #[serde(default)]
    pub id: Option<String>,
    /// Link to the new page.
    #[serde(default)]
    pub url: Option<String>,
    /// Date written to the date column, after resolution.
    #[serde(skip)]
    pub date: Option<NaiveDate>,
}

/// Builder for constructing an [`NBudget`] client.
///
/// Settings and a transport are required. The tag cache defaults to an
/// empty [`InMemoryTagCache`] and errors are propagated unless another
/// [`ErrorDelivery`] is set.
#[derive(Debug)]
pub struct NBudgetBuilder<T, C> {
    /// Session settings.
    settings: Option<Settings>,
    /// Transport used for every remote call.
    transport: Option<T>,
    /// Tag cache.
    cache: C,
    /// Error delivery strategy.
    delivery: Option<Box<dyn ErrorDelivery>>,
}

impl<T: Transport, C: TagCache> NBudgetBuilder<T, C> {
    /// Sets the session settings.
    #[inline]
    #[must_use]
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Sets the transport.
    #[inline]
    #[must_use]
    pub fn transport<U: Transport>(self, transport: U) -> NBudgetBuilder<U, C> {
        NBudgetBuilder {
            settings: self.settings,
            transport: Some(transport),
            cache: self.cache,
            delivery: self.delivery,
        }
    }

    /// Replaces the tag cache.
    #[inline]
    #[must_use]
    pub fn cache<D: TagCache>(self, cache: D) -> NBudgetBuilder<T, D> {
        NBudgetBuilder {
            settings: self.settings,
            transport: self.transport,
            cache,
            delivery: self.delivery,
        }
    }

    /// Sets how errors leave the client's public operations.
    #[inline]
    #[must_use]
    pub fn delivery<D: ErrorDelivery + 'static>(mut self, delivery: D) -> Self {
        self.delivery = Some(Box::new(delivery));
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`NBudgetError::Configuration`] if the settings or the
    /// transport were not provided.
    #[inline]
    #[tracing::instrument(skip_all)]
    pub fn build(self) -> Result<NBudget<T, C>> {
        let settings = self
            .settings
            .ok_or_else(|| NBudgetError::Configuration("settings are required".to_owned()))?;
        let transport = self
            .transport
            .ok_or_else(|| NBudgetError::Configuration("transport is required".to_owned()))?;
        tracing::debug!(database_id = %settings.database_id, "building client");

        Ok(NBudget {
            settings,
            transport,
            cache: self.cache,
            delivery: self.delivery.unwrap_or_else(|| Box::new(Propagate)),
        })
    }
}

/// Budget client for one Notion database.
///
/// Operations run sequentially and block until the API answers. Tag
/// options are fetched once and reused until [`NBudget::clear_tags_cache`]
/// is called.
#[derive(Debug)]
pub struct NBudget<T, C = InMemoryTagCache> {
    /// Session settings.
    settings: Settings,
    /// Transport used for every remote call.
    transport: T,
    /// Known tag options.
    cache: C,
    /// Error delivery strategy.
    delivery: Box<dyn ErrorDelivery>,
}

impl NBudget<HttpTransport, InMemoryTagCache> {
    /// Creates a new builder for configuring the client.
    #[inline]
    #[must_use]
    pub fn builder() -> NBudgetBuilder<HttpTransport, InMemoryTagCache> {
        NBudgetBuilder {
            settings: None,
            transport: None,
            cache: InMemoryTagCache::new(),
            delivery: None,
        }
    }

    /// Builds a client talking to the Notion API with the settings' key.
    ///
    /// # Errors
    ///
    /// Returns [`NBudgetError::Transport`] if the HTTP client fails to build.
    #[inline]
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let transport = HttpTransport::from_settings(&settings)?;
        Self::builder()
            .settings(settings)
            .transport(transport)
            .build()
    }
}

impl<T: Transport, C: TagCache> NBudget<T, C> {
    /// Returns the session settings.
    #[inline]
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the tag cache.
    #[inline]
    #[must_use]
    pub const fn tags_cache(&self) -> &C {
        &self.cache
    }

    /// Fetches the options of the tag column and replaces the cache with
    /// them.
    ///
    /// # Errors
    ///
    /// Returns [`NBudgetError::ApiParsing`] if the schema has no usable tag
    /// column, or an API/transport error if the request fails.
    #[inline]
    #[tracing::instrument(skip_all)]
    pub fn fetch_tags(&mut self) -> Result<Vec<String>> {
        let result = self.fetch_tags_inner();
        self.deliver(result)
    }

    /// Checks that every tag is an option of the tag column, fetching the
    /// options first if the cache is empty.
    ///
    /// # Errors
    ///
    /// Returns [`NBudgetError::InvalidTag`] for the first unknown tag, or
    /// any error of [`NBudget::fetch_tags`].
    #[inline]
    #[tracing::instrument(skip_all, fields(count = tags.len()))]
    pub fn validate_tags<S: AsRef<str>>(&mut self, tags: &[S]) -> Result<()> {
        let result = self.validate_tags_inner(tags);
        self.deliver(result)
    }

    /// Empties the tag cache. Nothing is fetched until the next validation
    /// or explicit fetch.
    #[inline]
    pub fn clear_tags_cache(&mut self) {
        tracing::debug!("clearing tags cache");
        self.cache.clear();
    }

    /// Builds the page-creation payload for `record`.
    ///
    /// # Errors
    ///
    /// Returns [`NBudgetError::InvalidAmount`] if the amount is NaN or
    /// infinite, date errors from [`crate::date::parse_date`], or tag errors
    /// from [`NBudget::validate_tags`] when the record has tags.
    #[inline]
    #[tracing::instrument(skip_all)]
    pub fn build_payload(&mut self, record: &Record) -> Result<PagePayload> {
        let result = self.build_payload_inner(record);
        self.deliver(result)
    }

    /// Inserts `record` as a new page of the database.
    ///
    /// # Errors
    ///
    /// Returns any error of [`NBudget::build_payload`], or an
    /// API/transport error if the insertion fails.
    #[inline]
    #[tracing::instrument(skip_all)]
    pub fn insert_record(&mut self, record: &Record) -> Result<CreatedPage> {
        let result = self.insert_record_inner(record);
        self.deliver(result)
    }

    /// Sums the amount column over every record of the database.
    ///
    /// Records whose amount is missing or not a number contribute nothing
    /// and are counted in [`Balance::skipped`].
    ///
    /// # Errors
    ///
    /// Returns [`NBudgetError::ApiParsing`] if a page has no results, or an
    /// API/transport error if a request fails.
    #[inline]
    #[tracing::instrument(skip_all)]
    pub fn balance(&self) -> Result<Balance> {
        let result = self.balance_inner();
        self.deliver(result)
    }

    /// Routes an error through the delivery strategy.
    fn deliver<R>(&self, result: Result<R>) -> Result<R> {
        result.map_err(|err| self.delivery.deliver(err))
    }

    /// Sends a request and classifies its response.
    fn call(&self, request: &ApiRequest) -> Result<serde_json::Value> {
        tracing::debug!(method = request.method.as_str(), path = %request.path, "calling API");
        let response = self.transport.send(request)?;
        classify(response)
    }

    /// Fetches tag options without delivering errors.
    fn fetch_tags_inner(&mut self) -> Result<Vec<String>> {
        let schema = self.call(&ApiRequest::database(&self.settings.database_id))?;
        let tags = tag_options(&schema, &self.settings.columns.tags_name)?;
        tracing::debug!(count = tags.len(), "fetched tags");
        self.cache.set(tags.clone());
        Ok(tags)
    }

    /// Validates tags without delivering errors.
    fn validate_tags_inner<S: AsRef<str>>(&mut self, tags: &[S]) -> Result<()> {
        if self.cache.is_empty() {
            let _fetched = self.fetch_tags_inner()?;
        }
        match tags.iter().map(AsRef::<str>::as_ref).find(|tag| !self.cache.contains(tag)) {
            Some(tag) => Err(NBudgetError::InvalidTag {
                tag: tag.to_owned(),
                valid: self.cache.get().to_vec(),
            }),
            None => Ok(()),
        }
    }

    /// Builds a payload without delivering errors.
    fn build_payload_inner(&mut self, record: &Record) -> Result<PagePayload> {
        self.prepare(record).map(|(_, payload)| payload)
    }

    /// Resolves the record date and builds the payload for it.
    fn prepare(&mut self, record: &Record) -> Result<(NaiveDate, PagePayload)> {
        if !record.amount.is_finite() {
            return Err(NBudgetError::InvalidAmount(record.amount));
        }
        let date = resolve_date(record.date.as_deref(), &self.settings.date_input_format)?;
        if !record.tags.is_empty() {
            self.validate_tags_inner(record.tags.as_slice())?;
        }
        let payload = PagePayload::build(
            &self.settings.database_id,
            &self.settings.columns,
            record,
            date,
        );
        Ok((date, payload))
    }

    /// Inserts a record without delivering errors.
    fn insert_record_inner(&mut self, record: &Record) -> Result<CreatedPage> {
        let (date, payload) = self.prepare(record)?;
        let body = serde_json::to_value(&payload)?;
        let created = self.call(&ApiRequest::create_page(body))?;
        let mut page: CreatedPage = serde_json::from_value(created).unwrap_or_default();
        page.date = Some(date);
        tracing::debug!(id = ?page.id, %date, "inserted record");
        Ok(page)
    }

    /// Computes the balance without delivering errors.
    fn balance_inner(&self) -> Result<Balance> {
        let amount_column = &self.settings.columns.amount_name;
        let mut balance = Balance::default();
        let mut request = QueryRequest::first();
        loop {
            let body = serde_json::to_value(&request)?;
            let page = self.call(&ApiRequest::query(&self.settings.database_id, body))?;
            let sum = PageSum::from_page(&page, amount_column)?;
            balance.add(&sum);
            match sum.next_cursor {
                Some(cursor) => request = QueryRequest::after(cursor),
                None => break,
            }
        }
        if balance.skipped > 0 {
            tracing::warn!(
                skipped = balance.skipped,
                column = %amount_column,
                "records without a numeric amount were left out of the balance"
            );
        }
        tracing::debug!(pages = balance.pages, total = balance.total, "computed balance");
        Ok(balance)
    }
}
