//! Monthly character usage and quota checks

use async_trait::async_trait;
use aws_sdk_cloudwatch::error::DisplayErrorContext;
use aws_sdk_cloudwatch::primitives::DateTime as AwsDateTime;
use aws_sdk_cloudwatch::types::MetricDataQuery;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::core::errors::{ProxyError, Result};

/// Query id the usage total is reported under
pub const USAGE_QUERY_ID: &str = "characterCountSum";

/// Aggregation bucket: one day
pub const DAILY_PERIOD_SECS: i32 = 86400;

/// Metric aggregation request
#[derive(Debug, Clone, PartialEq)]
pub struct MetricQuery {
    /// Logical query id the result entries are reported under
    pub id: String,
    /// Search-and-sum metric math expression
    pub expression: String,
    /// Start of the range, inclusive
    pub start: DateTime<Utc>,
    /// End of the range, inclusive
    pub end: DateTime<Utc>,
    /// Bucket width in seconds
    pub period_secs: i32,
}

impl MetricQuery {
    /// Daily sums of every series named `metric_name` over `[start, end]`
    pub fn daily_sum(metric_name: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: USAGE_QUERY_ID.to_string(),
            expression: format!(
                "SUM(SEARCH('MetricName=\"{}\"', 'Sum', {}))",
                metric_name, DAILY_PERIOD_SECS
            ),
            start,
            end,
            period_secs: DAILY_PERIOD_SECS,
        }
    }
}

/// One result entry: per-bucket values for a query id
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    /// Query id, empty when the service omitted it
    pub id: String,
    /// One value per bucket
    pub values: Vec<f64>,
}

/// Source of aggregated metric data
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Run an aggregation query and return every result entry
    async fn query(&self, query: &MetricQuery) -> Result<Vec<MetricSeries>>;
}

/// CloudWatch `GetMetricData` backed metrics source
#[derive(Debug, Clone)]
pub struct CloudWatchMetrics {
    client: aws_sdk_cloudwatch::Client,
}

impl CloudWatchMetrics {
    /// Wrap an existing CloudWatch client
    pub fn new(client: aws_sdk_cloudwatch::Client) -> Self {
        Self { client }
    }

    /// Create from a loaded AWS SDK config
    pub fn from_sdk_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(aws_sdk_cloudwatch::Client::new(config))
    }
}

#[async_trait]
impl MetricsSource for CloudWatchMetrics {
    async fn query(&self, query: &MetricQuery) -> Result<Vec<MetricSeries>> {
        let data_query = MetricDataQuery::builder()
            .id(&query.id)
            .expression(&query.expression)
            .period(query.period_secs)
            .return_data(true)
            .build();

        let mut series = Vec::new();
        let mut next_token: Option<String> = None;

        // Follow pagination until every bucket has been returned
        loop {
            let output = self
                .client
                .get_metric_data()
                .metric_data_queries(data_query.clone())
                .start_time(AwsDateTime::from_secs(query.start.timestamp()))
                .end_time(AwsDateTime::from_secs(query.end.timestamp()))
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| ProxyError::MetricsError {
                    message: DisplayErrorContext(&e).to_string(),
                })?;

            for result in output.metric_data_results() {
                series.push(MetricSeries {
                    id: result.id().unwrap_or_default().to_string(),
                    values: result.values().to_vec(),
                });
            }

            match output.next_token() {
                Some(token) if !token.is_empty() => {
                    debug!("Fetching next metric data page");
                    next_token = Some(token.to_string());
                }
                _ => break,
            }
        }

        Ok(series)
    }
}

/// First and last instants of the calendar month containing `now`.
///
/// The range ends at 23:59:59 on the month's last day.
pub fn month_range(now: DateTime<Utc>) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let (year, month) = (now.year(), now.month());
    let invalid = || ProxyError::InternalError(format!("invalid month {}-{}", year, month));

    let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let last_day = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month)?)
        .ok_or_else(invalid)?;

    let start = first_day.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
    let end = last_day.and_hms_opt(23, 59, 59).ok_or_else(invalid)?;

    Ok((Utc.from_utc_datetime(&start), Utc.from_utc_datetime(&end)))
}

/// Number of days in the given month
pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .ok_or_else(|| ProxyError::InternalError(format!("invalid month {}-{}", year, month)))
}

/// Usage compared against the configured limit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuotaStatus {
    /// Characters counted so far this month
    pub usage: f64,
    /// Configured monthly limit
    pub limit: f64,
}

impl QuotaStatus {
    /// Quota is exhausted once usage reaches the limit
    pub fn is_exceeded(&self) -> bool {
        self.usage >= self.limit
    }
}

/// Computes monthly usage and applies the admission gate
#[derive(Clone)]
pub struct QuotaChecker {
    metrics: Arc<dyn MetricsSource>,
    metric_name: String,
    limit: f64,
}

impl QuotaChecker {
    /// Checker summing `metric_name` and gating at `limit`
    pub fn new(
        metrics: Arc<dyn MetricsSource>,
        metric_name: impl Into<String>,
        limit: f64,
    ) -> Self {
        Self {
            metrics,
            metric_name: metric_name.into(),
            limit,
        }
    }

    /// Total of the usage metric for the current calendar month
    pub async fn compute_monthly_usage(&self) -> Result<f64> {
        self.usage_for_month_of(Utc::now()).await
    }

    /// Total of the usage metric for the month containing `now`.
    ///
    /// Entries whose id differs from [`USAGE_QUERY_ID`] are ignored. An empty
    /// result set counts as zero usage.
    pub async fn usage_for_month_of(&self, now: DateTime<Utc>) -> Result<f64> {
        let (start, end) = month_range(now)?;
        let query = MetricQuery::daily_sum(&self.metric_name, start, end);

        debug!("Querying usage from {} to {}", start, end);
        let series = self.metrics.query(&query).await?;

        let total = series
            .iter()
            .filter(|s| s.id == query.id)
            .flat_map(|s| s.values.iter())
            .sum::<f64>();

        Ok(total)
    }

    /// Current usage against the limit
    pub async fn check(&self) -> Result<QuotaStatus> {
        let usage = self.compute_monthly_usage().await?;
        Ok(QuotaStatus {
            usage,
            limit: self.limit,
        })
    }
}
