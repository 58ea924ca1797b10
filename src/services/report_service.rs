// src/services/report_service.rs

use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::ReportRepository,
    models::report::{
        DailySalesRow, ProductRanking, ProductSalesRow, RankEntry, ReportSummary, SalesTrend,
    },
};

// Janelas fixas dos relatórios.
const TREND_WINDOW_DAYS: i64 = 30;
const RANKING_WINDOW_DAYS: i64 = 90;
const RANKING_TOP_N: usize = 10;

#[derive(Clone)]
pub struct ReportService {
    report_repo: ReportRepository,
}

impl ReportService {
    pub fn new(report_repo: ReportRepository) -> Self {
        Self { report_repo }
    }

    pub async fn summary(&self) -> Result<ReportSummary, AppError> {
        let (total_sales, completed_orders, today_sales) = self.report_repo.get_summary().await?;

        Ok(ReportSummary {
            total_sales,
            completed_orders,
            today_sales,
        })
    }

    // Série diária dos últimos 30 dias, do primeiro dia da janela até hoje,
    // com zero nos dias sem venda.
    pub async fn sales_trend(&self) -> Result<SalesTrend, AppError> {
        let today = Utc::now().date_naive();
        let window_start = today - Duration::days(TREND_WINDOW_DAYS);
        let since = window_start.and_time(NaiveTime::MIN).and_utc();

        let rows = self.report_repo.daily_sales(since).await?;
        Ok(fill_daily_series(window_start, today, &rows))
    }

    pub async fn product_ranking(&self) -> Result<ProductRanking, AppError> {
        let since = (Utc::now().date_naive() - Duration::days(RANKING_WINDOW_DAYS))
            .and_time(NaiveTime::MIN)
            .and_utc();

        let rows = self.report_repo.product_sales(since).await?;

        Ok(ProductRanking {
            quantity_rank: rank_top(&rows, RANKING_TOP_N, |r| Decimal::from(r.total_quantity)),
            profit_rank: rank_top(&rows, RANKING_TOP_N, |r| r.gross_profit),
        })
    }
}

// Preenche a série dia a dia (inclusive nas duas pontas). O gráfico espera
// arrays paralelos contínuos, nunca com buracos.
fn fill_daily_series(start: NaiveDate, end: NaiveDate, rows: &[DailySalesRow]) -> SalesTrend {
    let by_day: HashMap<NaiveDate, Decimal> = rows.iter().map(|r| (r.day, r.total)).collect();

    let mut dates = Vec::new();
    let mut amounts = Vec::new();
    let mut day = start;
    while day <= end {
        dates.push(day.format("%Y-%m-%d").to_string());
        amounts.push(by_day.get(&day).copied().unwrap_or(Decimal::ZERO));
        day += Duration::days(1);
    }

    SalesTrend { dates, amounts }
}

// Ordena pelo critério escolhido, maior primeiro, e corta no top N.
fn rank_top<F>(rows: &[ProductSalesRow], top_n: usize, metric: F) -> Vec<RankEntry>
where
    F: Fn(&ProductSalesRow) -> Decimal,
{
    let mut ranked: Vec<RankEntry> = rows
        .iter()
        .map(|r| RankEntry {
            name: r.product_name.clone(),
            value: metric(r),
        })
        .collect();

    ranked.sort_by(|a, b| b.value.cmp(&a.value));
    ranked.truncate(top_n);
    ranked
}
