use crate::config::PaginationConfig;
use crate::error::app_error::AppError;
use rocket::serde::Serialize;

/// Validated page request. `page` is 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: i64,
    pub per_page: i64,
}

impl PaginationParams {
    /// Parse raw `page` / `per_page` query values, applying defaults for the
    /// absent ones. Non-integers and out-of-range values are input errors.
    pub fn parse(page: Option<&str>, per_page: Option<&str>, config: &PaginationConfig) -> Result<Self, AppError> {
        let page = parse_integer("page", page)?.unwrap_or(1);
        let per_page = parse_integer("per_page", per_page)?.unwrap_or(config.default_per_page);

        if page < 1 {
            return Err(AppError::BadRequest("page must be at least 1".to_string()));
        }
        if per_page < 1 || per_page > config.max_per_page {
            return Err(AppError::BadRequest(format!("per_page must be between 1 and {}", config.max_per_page)));
        }

        Ok(Self { page, per_page })
    }

    /// Saturates instead of overflowing for absurd page numbers.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }
}

/// Parse an optional integer query value; blank values count as absent.
pub fn parse_integer(name: &str, raw: Option<&str>) -> Result<Option<i64>, AppError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse::<i64>()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("{} must be an integer", name))),
    }
}

/// Paginated response wrapper with metadata
#[derive(Debug, Clone, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total_items: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub per_page: i64,
}

pub fn total_pages(total_items: i64, per_page: i64) -> i64 {
    if per_page > 0 { (total_items + per_page - 1) / per_page } else { 0 }
}

/// Slice one page out of an already filtered result set.
///
/// Asking for a page past the last one is an input error rather than an
/// empty page. An empty result set yields an empty first page.
pub fn paginate<T>(items: Vec<T>, params: PaginationParams) -> Result<PaginatedResponse<T>, AppError> {
    let total_items = items.len() as i64;
    let total_pages = total_pages(total_items, params.per_page);

    if total_items > 0 && params.page > total_pages {
        return Err(AppError::BadRequest(format!(
            "page {} is out of range, there are {} pages",
            params.page, total_pages
        )));
    }

    let items = items
        .into_iter()
        .skip(usize::try_from(params.offset()).unwrap_or(usize::MAX))
        .take(usize::try_from(params.per_page).unwrap_or(usize::MAX))
        .collect();

    Ok(PaginatedResponse {
        items,
        total_items,
        total_pages,
        current_page: params.page,
        per_page: params.per_page,
    })
}
