//! Page-by-page listing shared by repositories and commits.
//!
//! Walk: request page N; a full page (length == per_page) means page N+1 is
//! requested next; the first short or empty page ends the walk. Pages are
//! concatenated in request order.
//!
//! Failures are lenient: a transport error, a non-success status, or a body
//! that is not a JSON array stops the walk at that page and the items
//! gathered so far are returned, marked [`ListingStatus::Truncated`].

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{TransportError, UpstreamFormatError, ValidationError};
use crate::github::client::GitHubClient;

/// Largest page size the hosting API is asked for.
pub const MAX_PER_PAGE: u32 = 30;

/// Safety limit to prevent runaway listings.
pub const MAX_PAGES: u32 = 100;

/// Where a listing starts and how big each page is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: MAX_PER_PAGE,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    /// Fill omitted values with the defaults (page 1, [`MAX_PER_PAGE`]).
    pub fn from_parts(page: Option<u32>, per_page: Option<u32>) -> Self {
        let defaults = Self::default();
        Self {
            page: page.unwrap_or(defaults.page),
            per_page: per_page.unwrap_or(defaults.per_page),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.per_page > MAX_PER_PAGE {
            return Err(ValidationError::PageSizeTooLarge {
                requested: self.per_page,
                max: MAX_PER_PAGE,
            });
        }
        if self.per_page == 0 {
            return Err(ValidationError::PageSizeZero);
        }
        if self.page == 0 {
            return Err(ValidationError::PageZero);
        }
        Ok(())
    }
}

/// Why a listing stopped before the last page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TruncationReason {
    /// The page answered with a non-success status.
    Status(u16),
    Transport(TransportError),
    Format(UpstreamFormatError),
    /// [`MAX_PAGES`] pages were fetched and the last one was still full.
    /// `page` is then the last page fetched, not the next one.
    PageLimit,
}

/// Whether a listing saw every page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingStatus {
    Complete,
    /// `page` is the page that failed, or the last page fetched for
    /// [`TruncationReason::PageLimit`].
    Truncated { page: u32, reason: TruncationReason },
}

/// Result of a paginated listing.
///
/// `skipped` counts malformed or duplicate records that were dropped.
/// A truncated listing with no items is distinguishable from an account
/// that simply has nothing to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub skipped: usize,
    pub pages_fetched: u32,
    pub status: ListingStatus,
}

impl<T> Listing<T> {
    pub fn is_complete(&self) -> bool {
        matches!(self.status, ListingStatus::Complete)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Walk pages starting at `request.page`, normalizing every raw record.
///
/// `route_for(page, per_page)` builds the path and query for one page.
/// Records `normalize` rejects are skipped and counted; they still count
/// towards the page length that decides whether another page is fetched.
///
/// Validation happens before the first request, so an invalid request
/// never touches the network.
pub(crate) async fn walk_pages<T, R, N>(
    client: &GitHubClient,
    request: PageRequest,
    route_for: R,
    mut normalize: N,
) -> Result<Listing<T>, ValidationError>
where
    R: Fn(u32, u32) -> String,
    N: FnMut(&Value) -> Result<T, UpstreamFormatError>,
{
    request.validate()?;

    let mut items = Vec::new();
    let mut skipped = 0usize;
    let mut pages_fetched = 0u32;
    let mut page = request.page;

    let status = loop {
        if pages_fetched >= MAX_PAGES {
            let last = page.saturating_sub(1);
            warn!("Reached {}-page safety limit at page {}", MAX_PAGES, last);
            break ListingStatus::Truncated {
                page: last,
                reason: TruncationReason::PageLimit,
            };
        }

        let route = route_for(page, request.per_page);
        let response = match client.get(&route).await {
            Ok(response) => response,
            Err(e) => {
                warn!(page, error = %e, "listing stopped by transport failure");
                break ListingStatus::Truncated {
                    page,
                    reason: TruncationReason::Transport(e),
                };
            }
        };
        pages_fetched += 1;

        if !response.is_success() {
            warn!(page, status = response.status, "listing stopped by non-success status");
            break ListingStatus::Truncated {
                page,
                reason: TruncationReason::Status(response.status),
            };
        }

        let records = match response.json().and_then(into_records) {
            Ok(records) => records,
            Err(e) => {
                warn!(page, error = %e, "listing stopped by malformed page");
                break ListingStatus::Truncated {
                    page,
                    reason: TruncationReason::Format(e),
                };
            }
        };

        let page_len = records.len();
        for record in &records {
            match normalize(record) {
                Ok(item) => items.push(item),
                Err(e) => {
                    skipped += 1;
                    debug!(page, error = %e, "skipping record");
                }
            }
        }
        debug!(page, records = page_len, "fetched page");

        if page_len < request.per_page as usize {
            break ListingStatus::Complete;
        }

        page = match page.checked_add(1) {
            Some(next) => next,
            None => {
                break ListingStatus::Truncated {
                    page,
                    reason: TruncationReason::PageLimit,
                };
            }
        };
    };

    Ok(Listing {
        items,
        skipped,
        pages_fetched,
        status,
    })
}

fn into_records(value: Value) -> Result<Vec<Value>, UpstreamFormatError> {
    match value {
        Value::Array(records) => Ok(records),
        Value::Object(_) => Err(UpstreamFormatError::NotAnArray("object")),
        Value::String(_) => Err(UpstreamFormatError::NotAnArray("string")),
        Value::Number(_) => Err(UpstreamFormatError::NotAnArray("number")),
        Value::Bool(_) => Err(UpstreamFormatError::NotAnArray("bool")),
        Value::Null => Err(UpstreamFormatError::NotAnArray("null")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_request_is_first_full_page() {
        assert_eq!(PageRequest::default(), PageRequest::new(1, 30));
    }

    #[test]
    fn test_omitted_page_equals_page_one() {
        assert_eq!(
            PageRequest::from_parts(None, Some(10)),
            PageRequest::from_parts(Some(1), Some(10))
        );
        assert_eq!(PageRequest::from_parts(None, None), PageRequest::default());
    }

    #[test]
    fn test_validate_bounds() {
        assert!(PageRequest::new(1, 30).validate().is_ok());
        assert_eq!(
            PageRequest::new(1, 31).validate(),
            Err(ValidationError::PageSizeTooLarge {
                requested: 31,
                max: 30
            })
        );
        assert_eq!(
            PageRequest::new(1, 0).validate(),
            Err(ValidationError::PageSizeZero)
        );
        assert_eq!(
            PageRequest::new(0, 10).validate(),
            Err(ValidationError::PageZero)
        );
    }

    #[test]
    fn test_into_records() {
        assert_eq!(into_records(json!([1, 2])).unwrap().len(), 2);
        assert_eq!(
            into_records(json!({"message": "Not Found"})),
            Err(UpstreamFormatError::NotAnArray("object"))
        );
        assert_eq!(
            into_records(Value::Null),
            Err(UpstreamFormatError::NotAnArray("null"))
        );
    }

    #[test]
    fn test_listing_helpers() {
        let listing: Listing<u8> = Listing {
            items: vec![],
            skipped: 0,
            pages_fetched: 1,
            status: ListingStatus::Truncated {
                page: 1,
                reason: TruncationReason::Status(500),
            },
        };
        assert!(listing.is_empty());
        assert!(!listing.is_complete());
    }
}
