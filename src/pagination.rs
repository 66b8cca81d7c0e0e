//! Page arithmetic and navigation links for listings.
//!
//! A [`PageRequest`] can only hold `page >= 1` and `limit >= 1`, so the
//! offset is never negative and the "has next page" test never divides a
//! listing into empty pages.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use validator::Validate;

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("page must be at least 1")]
    InvalidPage,

    #[error("limit must be at least 1")]
    InvalidLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Result<Self, PaginationError> {
        if page < 1 {
            return Err(PaginationError::InvalidPage);
        }
        if limit < 1 {
            return Err(PaginationError::InvalidLimit);
        }
        Ok(Self { page, limit })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Fetch offset.
    pub fn skipped_items(&self) -> u64 {
        (u64::from(self.page) - 1) * u64::from(self.limit)
    }

    pub fn has_next(&self, total_count: u64) -> bool {
        u64::from(self.page) * u64::from(self.limit) < total_count
    }

    pub fn has_prev(&self) -> bool {
        self.page >= 2
    }
}

/// Query-string form of a page request, validated at the HTTP boundary.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: u32,

    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

impl PageQuery {
    pub fn to_request(&self) -> Result<PageRequest, PaginationError> {
        PageRequest::new(self.page, self.limit.min(MAX_LIMIT))
    }
}

/// Builds absolute page links under the configured public URL.
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    base: Url,
}

impl LinkBuilder {
    pub fn new(public_url: &str) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(public_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { base })
    }

    pub fn link(&self, resource_path: &str, page: u32, limit: u32) -> String {
        match self.base.join(resource_path.trim_start_matches('/')) {
            Ok(mut url) => {
                url.query_pairs_mut()
                    .clear()
                    .append_pair("page", &page.to_string())
                    .append_pair("limit", &limit.to_string());
                url.to_string()
            }
            Err(e) => {
                tracing::error!("Could not build page link for {}: {}", resource_path, e);
                String::new()
            }
        }
    }

    pub fn next_page(&self, resource_path: &str, request: &PageRequest, total_count: u64) -> String {
        if request.has_next(total_count) {
            self.link(resource_path, request.page() + 1, request.limit())
        } else {
            String::new()
        }
    }

    pub fn prev_page(&self, resource_path: &str, request: &PageRequest) -> String {
        if request.has_prev() {
            self.link(resource_path, request.page() - 1, request.limit())
        } else {
            String::new()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResult<T> {
    pub total_count: u64,
    pub page: u32,
    pub limit: u32,
    pub data: Vec<T>,
    pub next_page: String,
    pub prev_page: String,
}

impl<T> PaginatedResult<T> {
    pub fn new(
        request: &PageRequest,
        total_count: u64,
        data: Vec<T>,
        links: &LinkBuilder,
        resource_path: &str,
    ) -> Self {
        Self {
            total_count,
            page: request.page(),
            limit: request.limit(),
            data,
            next_page: links.next_page(resource_path, request, total_count),
            prev_page: links.prev_page(resource_path, request),
        }
    }
}
