//! Sales report endpoint.

use crate::error::AppError;
use crate::extractors::{ApiQuery, CurrentUser};
use crate::state::AppState;
use axum::{Json, extract::State};
use fanclub_core::{EventId, ReportQuery, SalesReport};
use serde::Deserialize;
use uuid::Uuid;

/// Query parameters for the sales report.
#[derive(Debug, Default, Deserialize)]
pub struct SalesReportQuery {
    /// Look-back window in days, 30 when absent
    pub period_days: Option<u32>,
    /// Restrict to one event
    pub event_id: Option<Uuid>,
}

impl From<SalesReportQuery> for ReportQuery {
    fn from(query: SalesReportQuery) -> Self {
        let defaults = Self::default();
        Self {
            period_days: query.period_days.unwrap_or(defaults.period_days),
            event_id: query.event_id.map(EventId::from_uuid),
        }
    }
}

/// Paid sales over the last `period_days` days.
///
/// ```bash
/// curl -H "Authorization: Bearer <admin token>" \
///   "http://localhost:8080/api/reports/sales?period_days=7"
/// ```
pub async fn sales_report(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiQuery(query): ApiQuery<SalesReportQuery>,
) -> Result<Json<SalesReport>, AppError> {
    let report = state.catalog.sales_report(&actor, query.into()).await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_period_defaults_to_thirty_days() {
        let query = ReportQuery::from(SalesReportQuery::default());
        assert_eq!(query.period_days, 30);
        assert_eq!(query.event_id, None);
    }
}
