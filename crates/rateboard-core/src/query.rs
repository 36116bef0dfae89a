//! # Listing Queries
//!
//! Filter, sort and page parameters for store and user listings.
//!
//! Sort columns are closed enumerations mapped to fixed column names, so a
//! client-supplied `sortBy` never reaches SQL as text.

use std::str::FromStr;

use crate::error::ValidationError;
use crate::types::Role;
use crate::validation::{validate_search_term, ValidationResult};
use crate::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

// =============================================================================
// Sorting
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parses `asc`/`desc` in any case; anything else sorts ascending.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }

    pub const fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

fn not_allowed(field: &str, allowed: &[&str]) -> ValidationError {
    ValidationError::NotAllowed {
        field: field.to_string(),
        allowed: allowed.iter().map(|s| s.to_string()).collect(),
    }
}

/// Columns a store listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreSortField {
    #[default]
    Name,
    Email,
    Address,
    CreatedAt,
}

impl StoreSortField {
    const NAMES: [&'static str; 4] = ["name", "email", "address", "createdAt"];

    pub const fn column(&self) -> &'static str {
        match self {
            StoreSortField::Name => "name",
            StoreSortField::Email => "email",
            StoreSortField::Address => "address",
            StoreSortField::CreatedAt => "created_at",
        }
    }
}

impl FromStr for StoreSortField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(StoreSortField::Name),
            "email" => Ok(StoreSortField::Email),
            "address" => Ok(StoreSortField::Address),
            "createdAt" | "created_at" => Ok(StoreSortField::CreatedAt),
            _ => Err(not_allowed("sortBy", &Self::NAMES)),
        }
    }
}

/// Columns a user listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserSortField {
    #[default]
    Name,
    Email,
    Address,
    Role,
    CreatedAt,
}

impl UserSortField {
    const NAMES: [&'static str; 5] = ["name", "email", "address", "role", "createdAt"];

    pub const fn column(&self) -> &'static str {
        match self {
            UserSortField::Name => "name",
            UserSortField::Email => "email",
            UserSortField::Address => "address",
            UserSortField::Role => "role",
            UserSortField::CreatedAt => "created_at",
        }
    }
}

impl FromStr for UserSortField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(UserSortField::Name),
            "email" => Ok(UserSortField::Email),
            "address" => Ok(UserSortField::Address),
            "role" => Ok(UserSortField::Role),
            "createdAt" | "created_at" => Ok(UserSortField::CreatedAt),
            _ => Err(not_allowed("sortBy", &Self::NAMES)),
        }
    }
}

fn parse_sort<T>(raw: Option<&str>) -> ValidationResult<T>
where
    T: FromStr<Err = ValidationError> + Default,
{
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse(),
        None => Ok(T::default()),
    }
}

// =============================================================================
// Paging
// =============================================================================

/// Offset/limit paging. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Normalizes raw paging input.
    ///
    /// `page` below 1 becomes 1; `limit` is clamped to `1..=100`.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.unwrap_or(1).clamp(1, u32::MAX as i64) as u32;
        let limit = limit
            .unwrap_or(DEFAULT_PAGE_SIZE as i64)
            .clamp(1, MAX_PAGE_SIZE as i64) as u32;
        Pagination { page, limit }
    }

    pub const fn page(&self) -> u32 {
        self.page
    }

    pub const fn limit(&self) -> i64 {
        self.limit as i64
    }

    pub const fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

// =============================================================================
// Store Listing
// =============================================================================

/// Substring filters for stores. `None` fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreFilter {
    /// Matches name OR address.
    pub q: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// A complete store listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreQuery {
    pub filter: StoreFilter,
    pub sort: StoreSortField,
    pub order: SortOrder,
    pub pagination: Pagination,
}

/// Raw store listing parameters as they arrive from a query string.
#[derive(Debug, Clone, Default)]
pub struct RawListParams<'a> {
    pub q: Option<&'a str>,
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub address: Option<&'a str>,
    pub role: Option<&'a str>,
    pub sort_by: Option<&'a str>,
    pub order: Option<&'a str>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl StoreQuery {
    /// Validates raw parameters into a store query.
    pub fn parse(raw: &RawListParams<'_>) -> ValidationResult<Self> {
        Ok(StoreQuery {
            filter: StoreFilter {
                q: validate_search_term("q", raw.q)?,
                name: validate_search_term("name", raw.name)?,
                email: validate_search_term("email", raw.email)?,
                address: validate_search_term("address", raw.address)?,
            },
            sort: parse_sort(raw.sort_by)?,
            order: SortOrder::parse_lenient(raw.order),
            pagination: Pagination::new(raw.page, raw.limit),
        })
    }
}

// =============================================================================
// User Listing
// =============================================================================

/// Filters for users. Text fields match substrings; role matches exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<Role>,
}

/// A complete user listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    pub filter: UserFilter,
    pub sort: UserSortField,
    pub order: SortOrder,
    pub pagination: Pagination,
}

impl UserQuery {
    /// Validates raw parameters into a user query.
    pub fn parse(raw: &RawListParams<'_>) -> ValidationResult<Self> {
        let role = match raw.role.map(str::trim).filter(|r| !r.is_empty()) {
            Some(r) => Some(r.parse::<Role>()?),
            None => None,
        };

        Ok(UserQuery {
            filter: UserFilter {
                name: validate_search_term("name", raw.name)?,
                email: validate_search_term("email", raw.email)?,
                address: validate_search_term("address", raw.address)?,
                role,
            },
            sort: parse_sort(raw.sort_by)?,
            order: SortOrder::parse_lenient(raw.order),
            pagination: Pagination::new(raw.page, raw.limit),
        })
    }
}
