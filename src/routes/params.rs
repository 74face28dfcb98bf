use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    #[serde(rename = "perPage")]
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1).saturating_mul(per_page);
        (page, per_page, offset)
    }

    /// Page window only when the caller asked for one; otherwise the whole list.
    pub fn requested(&self) -> Option<(i64, i64, i64)> {
        (self.page.is_some() || self.per_page.is_some()).then(|| self.normalize())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ToSchema)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Case-insensitive; anything but `ASC` sorts descending.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(value) if value.trim().eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    pub fn to_orm(self) -> sea_orm::Order {
        match self {
            SortOrder::Asc => sea_orm::Order::Asc,
            SortOrder::Desc => sea_orm::Order::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ToSchema)]
pub enum ProductSortBy {
    Name,
    Price,
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl ProductSortBy {
    /// Unknown keys fall back to creation time.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("nome") => ProductSortBy::Name,
            Some("preco") => ProductSortBy::Price,
            Some("updatedAt") => ProductSortBy::UpdatedAt,
            _ => ProductSortBy::CreatedAt,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ToSchema)]
pub enum OrderSortBy {
    TotalAmount,
    Status,
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl OrderSortBy {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("valorTotal") => OrderSortBy::TotalAmount,
            Some("status") => OrderSortBy::Status,
            Some("updatedAt") => OrderSortBy::UpdatedAt,
            _ => OrderSortBy::CreatedAt,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProductQuery {
    pub page: Option<i64>,
    #[serde(rename = "perPage")]
    pub per_page: Option<i64>,
    pub search: Option<String>,
    #[serde(rename = "minPrice")]
    pub min_price: Option<Decimal>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<Decimal>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

impl ProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AdminOrderQuery {
    pub status: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<Uuid>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`.
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SearchQuery {
    pub termo: Option<String>,
}

impl SearchQuery {
    /// The trimmed term, rejected below three characters.
    pub fn term(&self) -> Result<&str, AppError> {
        let term = self.termo.as_deref().map(str::trim).unwrap_or_default();
        if term.chars().count() < 3 {
            return Err(AppError::validation(
                "Search term must have at least 3 characters",
            ));
        }
        Ok(term)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum DateBound {
    Start,
    End,
}

/// Parse a filter date. A bare date covers the whole day on the given side.
pub fn parse_date_bound(raw: &str, bound: DateBound) -> Result<DateTime<Utc>, AppError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date: {raw}")))?;
    let time = match bound {
        DateBound::Start => NaiveTime::MIN,
        DateBound::End => NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN),
    };
    Ok(date.and_time(time).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_is_clamped() {
        let p = Pagination {
            page: Some(0),
            per_page: Some(1000),
        };
        assert_eq!(p.normalize(), (1, 100, 0));
        assert_eq!(Pagination::default().normalize(), (1, 20, 0));
        let p = Pagination {
            page: Some(3),
            per_page: Some(10),
        };
        assert_eq!(p.normalize(), (3, 10, 20));
    }

    #[test]
    fn huge_page_saturates_instead_of_overflowing() {
        let p = Pagination {
            page: Some(i64::MAX),
            per_page: Some(100),
        };
        let (page, per_page, offset) = p.normalize();
        assert_eq!((page, per_page), (i64::MAX, 100));
        assert_eq!(offset, i64::MAX);
    }

    #[test]
    fn window_applies_only_when_asked_for() {
        assert_eq!(Pagination::default().requested(), None);
        let p = Pagination {
            page: None,
            per_page: Some(5),
        };
        assert_eq!(p.requested(), Some((1, 5, 0)));
    }

    #[test]
    fn unknown_sort_values_fall_back() {
        assert_eq!(SortOrder::parse(Some("asc")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("ASC")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("sideways")), SortOrder::Desc);
        assert_eq!(SortOrder::parse(None), SortOrder::Desc);
        assert_eq!(ProductSortBy::parse(Some("preco")), ProductSortBy::Price);
        assert_eq!(ProductSortBy::parse(Some("estoque")), ProductSortBy::CreatedAt);
        assert_eq!(OrderSortBy::parse(Some("valorTotal")), OrderSortBy::TotalAmount);
        assert_eq!(OrderSortBy::parse(None), OrderSortBy::CreatedAt);
    }

    #[test]
    fn search_term_needs_three_characters() {
        let short = SearchQuery {
            termo: Some("  ab ".into()),
        };
        assert!(short.term().is_err());
        assert!(SearchQuery::default().term().is_err());
        let ok = SearchQuery {
            termo: Some(" choc ".into()),
        };
        assert_eq!(ok.term().unwrap(), "choc");
    }

    #[test]
    fn bare_dates_cover_the_whole_day() {
        let start = parse_date_bound("2025-03-01", DateBound::Start).unwrap();
        let end = parse_date_bound("2025-03-01", DateBound::End).unwrap();
        assert_eq!(start.to_rfc3339(), "2025-03-01T00:00:00+00:00");
        assert!(end > start);
        assert!(parse_date_bound("2025-03-01T10:00:00Z", DateBound::Start).is_ok());
        assert!(parse_date_bound("ontem", DateBound::Start).is_err());
    }
}
