//! Shared query parsing helpers for inbound HTTP adapters.
//!
//! Query strings arrive loosely typed; these helpers turn them into the
//! domain's page requests, id lists and dates, reporting the offending
//! parameter by name.

use chrono::NaiveDate;
use pagination::{PageLimits, PageRequest, SortKey};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::Error;

/// `page`, `size` and `sort` parameters shared by every list endpoint.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Zero-based page index.
    pub page: Option<i64>,
    /// Page size; clamped to the configured maximum.
    pub size: Option<i64>,
    /// `field` or `field,direction`, for example `lastName,desc`.
    pub sort: Option<String>,
}

impl PageQuery {
    /// Compose a validated page request for sort key `K`.
    ///
    /// # Errors
    /// Returns an `InvalidRequest` error naming `page`, `size` or `sort`.
    pub fn page_request<K: SortKey>(&self, limits: PageLimits) -> Result<PageRequest<K>, Error> {
        PageRequest::compose(self.page, self.size, self.sort.as_deref(), limits)
            .map_err(Error::from)
    }
}

/// `enrich` flag; the default differs per endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EnrichQuery {
    /// Attach detail fetched from the owning peer service.
    pub enrich: Option<bool>,
}

/// `q` parameter of search endpoints.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive text to look for; must not be blank.
    pub q: Option<String>,
}

impl SearchQuery {
    /// The trimmed search text.
    ///
    /// # Errors
    /// Returns an `InvalidRequest` error when `q` is absent or blank.
    pub fn text(&self) -> Result<String, Error> {
        pagination::filter_value(self.q.as_deref())
            .ok_or_else(|| Error::invalid_field("q", "must not be blank"))
    }
}

/// `ids` parameter of batch lookups, e.g. `ids=1,2,3`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IdsQuery {
    /// Comma-separated positive identifiers.
    pub ids: Option<String>,
}

impl IdsQuery {
    /// Parse the list, ignoring blank segments.
    ///
    /// # Errors
    /// Returns an `InvalidRequest` error when any segment is not a positive
    /// integer.
    pub fn parse<I: From<i64>>(&self) -> Result<Vec<I>, Error> {
        parse_id_list("ids", self.ids.as_deref().unwrap_or_default())
    }
}

pub(crate) fn parse_id_list<I: From<i64>>(field: &str, raw: &str) -> Result<Vec<I>, Error> {
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.parse::<i64>() {
            Ok(value) if value > 0 => Ok(I::from(value)),
            _ => Err(Error::invalid_field(
                field,
                format!("'{segment}' is not a positive identifier"),
            )),
        })
        .collect()
}

pub(crate) fn parse_date(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, Error> {
    pagination::filter_value(raw)
        .map(|value| {
            NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                .map_err(|_| Error::invalid_field(field, "must be a date in YYYY-MM-DD format"))
        })
        .transpose()
}
