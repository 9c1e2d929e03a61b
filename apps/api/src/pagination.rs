//! LIST query parameters and the paged response envelope shared by every
//! entity endpoint.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::ParseEnumError;
use crate::store::ListQuery;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Raw query string of a LIST call. Parent filters apply only to the entity
/// they make sense for; handlers pick the one they need.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub company_id: Option<Uuid>,
    pub posting_id: Option<Uuid>,
    pub application_id: Option<Uuid>,
}

/// Validated page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub page: u32,
    pub page_size: u32,
}

impl ListParams {
    pub fn window(&self) -> Result<Window, AppError> {
        let page = self.page.unwrap_or(1);
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page == 0 {
            return Err(AppError::Validation("page starts at 1".to_string()));
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(AppError::Validation(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(Window { page, page_size })
    }

    fn search(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Store query for an entity with a status filter. One extra row is
    /// fetched to tell whether another page exists.
    pub fn query<S>(&self, parent_id: Option<Uuid>) -> Result<(Window, ListQuery<S>), AppError>
    where
        S: FromStr<Err = ParseEnumError>,
    {
        let window = self.window()?;
        let status = self
            .status
            .as_deref()
            .map(str::parse::<S>)
            .transpose()?;
        Ok((window, self.build(window, status, parent_id)))
    }

    /// Store query for an entity that has no status column.
    pub fn plain_query(
        &self,
        parent_id: Option<Uuid>,
    ) -> Result<(Window, ListQuery<()>), AppError> {
        if self.status.is_some() {
            return Err(AppError::Validation(
                "status filter is not supported here".to_string(),
            ));
        }
        let window = self.window()?;
        Ok((window, self.build(window, None, parent_id)))
    }

    fn build<S>(&self, window: Window, status: Option<S>, parent_id: Option<Uuid>) -> ListQuery<S> {
        ListQuery {
            status,
            search: self.search(),
            parent_id,
            limit: i64::from(window.page_size) + 1,
            offset: i64::from(window.page - 1) * i64::from(window.page_size),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Builds a page from up to `page_size + 1` fetched rows.
    pub fn from_rows(mut rows: Vec<T>, window: Window) -> Self {
        let has_more = rows.len() > window.page_size as usize;
        rows.truncate(window.page_size as usize);
        Self {
            items: rows,
            page: window.page,
            page_size: window.page_size,
            has_more,
        }
    }

    pub fn empty(window: Window) -> Self {
        Self::from_rows(Vec::new(), window)
    }
}
