//! Reports API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use rust_decimal::Decimal;
use shared::models::{ReportQuery, SalesReport, StatusCount, StockAlert, TopItem};

use crate::core::ServerState;
use crate::db::repository::report::{self, SalesTotals};
use crate::orders::money;
use crate::stock::StockService;
use crate::utils::AppResult;
use crate::utils::time::date_range;

const DEFAULT_TOP_LIMIT: i64 = 10;
const MAX_TOP_LIMIT: i64 = 100;

/// GET /api/reports/sales
pub async fn sales(
    State(state): State<ServerState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<SalesReport>> {
    let (from, to, start, end) = date_range(query.from.as_deref(), query.to.as_deref())?;
    let totals = report::sales_totals(&state.pool, start, end).await?;
    let by_method = report::sales_by_method(&state.pool, start, end).await?;

    Ok(Json(SalesReport {
        from: from.to_string(),
        to: to.to_string(),
        orders_paid: totals.orders_paid,
        revenue: money::to_f64(money::to_decimal(totals.revenue)),
        average_ticket: average_ticket(&totals),
        tax_collected: money::to_f64(money::to_decimal(totals.tax_collected)),
        discounts: money::to_f64(money::to_decimal(totals.discounts)),
        by_method,
    }))
}

fn average_ticket(totals: &SalesTotals) -> f64 {
    if totals.orders_paid == 0 {
        return 0.0;
    }
    money::to_f64(money::to_decimal(totals.revenue) / Decimal::from(totals.orders_paid))
}

/// GET /api/reports/top-items - by quantity sold
pub async fn top_items(
    State(state): State<ServerState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<Vec<TopItem>>> {
    let (_, _, start, end) = date_range(query.from.as_deref(), query.to.as_deref())?;
    let limit = query.limit.unwrap_or(DEFAULT_TOP_LIMIT).clamp(1, MAX_TOP_LIMIT);
    Ok(Json(report::top_items(&state.pool, start, end, limit).await?))
}

/// GET /api/reports/stock-alerts
pub async fn stock_alerts(State(state): State<ServerState>) -> AppResult<Json<Vec<StockAlert>>> {
    let alerts = StockService::new(state.pool.clone(), state.notifier.clone())
        .alerts()
        .await?;
    Ok(Json(alerts))
}

/// GET /api/reports/orders-by-status
pub async fn orders_by_status(State(state): State<ServerState>) -> AppResult<Json<Vec<StatusCount>>> {
    Ok(Json(report::orders_by_status(&state.pool).await?))
}
