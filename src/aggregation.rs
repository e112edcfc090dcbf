use crate::buckets::{ModelTokens, bucket_by_hour, floor_to_hour};
use crate::constants::HOURLY_WINDOW_HOURS;
use crate::estimator::{self, aggregate_totals, estimate, with_uncertainty};
use crate::source::UsageSource;
use crate::types::{
    AggregateTotals, CoefficientConfig, DailyRecord, HourlyRecord, ModelBreakdown, ModelUsage,
    PeriodTotals, Summary, TokenCounts, TokenUsage,
};
use chrono::{DateTime, Days, Duration, Local, NaiveDate, Timelike, Utc};
use std::collections::BTreeMap;

/// Answers the summary, daily and hourly queries.
///
/// Holds no aggregate state: each query re-reads its source and degrades to
/// zeros when the source data is absent.
#[derive(Debug)]
pub struct Aggregator<S> {
    source: S,
}

impl<S: UsageSource> Aggregator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn cumulative_usage(&self) -> BTreeMap<String, TokenCounts> {
        self.source
            .read_summary()
            .map(|stats| {
                stats
                    .model_usage
                    .iter()
                    .map(|(model, usage)| (model.clone(), TokenCounts::from(usage)))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn all_time_totals(&self, config: &CoefficientConfig) -> AggregateTotals {
        aggregate_totals(&self.cumulative_usage(), config)
    }

    /// All-time totals with uncertainty ranges, equivalences and per-model detail
    pub fn all_time_summary(&self, config: &CoefficientConfig) -> Summary {
        let aggregate = self.all_time_totals(config);
        let totals = aggregate.totals;
        let equivalences = estimator::equivalences(
            totals.estimate.co2_g,
            totals.estimate.water_total_ml,
            totals.estimate.energy_wh,
        );

        Summary {
            totals,
            ranges: with_uncertainty(&totals.estimate),
            equivalences,
            per_model: aggregate.per_model,
            config: *config,
        }
    }

    pub fn per_model(&self, config: &CoefficientConfig) -> BTreeMap<String, ModelBreakdown> {
        self.all_time_totals(config).per_model
    }

    /// Per-day records for the trailing `days`, ascending by date
    pub fn daily_breakdown(&self, days: u32, config: &CoefficientConfig) -> Vec<DailyRecord> {
        self.daily_breakdown_at(Local::now().date_naive(), days, config)
    }

    pub fn daily_breakdown_at(
        &self,
        today: NaiveDate,
        days: u32,
        config: &CoefficientConfig,
    ) -> Vec<DailyRecord> {
        let Some(stats) = self.source.read_summary() else {
            return Vec::new();
        };

        let cutoff = today
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN)
            .format("%Y-%m-%d")
            .to_string();
        let activity = stats.activity_by_date();

        let mut daily: Vec<DailyRecord> = stats
            .daily_model_tokens
            .iter()
            .filter(|day| day.date.as_str() >= cutoff.as_str())
            .map(|day| {
                let mut totals = PeriodTotals::default();
                for (model, &output) in &day.tokens_by_model {
                    let tokens = infer_day_tokens(output, stats.model_usage.get(model));
                    let result = estimate(&TokenUsage::new(model.as_str(), tokens), config);
                    totals.add_model(model, tokens, result);
                }

                let (messages, sessions) = activity
                    .get(day.date.as_str())
                    .map(|a| (a.message_count, a.session_count))
                    .unwrap_or((0, 0));

                DailyRecord {
                    date: day.date.clone(),
                    totals,
                    messages,
                    sessions,
                }
            })
            .collect();

        daily.sort_by(|a, b| a.date.cmp(&b.date));
        daily
    }

    /// 24 hourly slots ending with the current hour, oldest first
    pub fn hourly_breakdown(&self, config: &CoefficientConfig) -> Vec<HourlyRecord> {
        self.hourly_breakdown_at(Utc::now(), config)
    }

    pub fn hourly_breakdown_at(
        &self,
        now: DateTime<Utc>,
        config: &CoefficientConfig,
    ) -> Vec<HourlyRecord> {
        let records = self.source.usage_records();
        let by_hour = bucket_by_hour(&records, now, HOURLY_WINDOW_HOURS);
        let empty = ModelTokens::new();

        (0..HOURLY_WINDOW_HOURS)
            .rev()
            .map(|hours_ago| {
                let instant = now - Duration::hours(hours_ago);
                let start = floor_to_hour(instant);

                let mut totals = PeriodTotals::default();
                for (model, &tokens) in by_hour.get(&start).unwrap_or(&empty) {
                    let result = estimate(&TokenUsage::new(model.as_str(), tokens), config);
                    totals.add_model(model, tokens, result);
                }

                HourlyRecord {
                    hour: format!("{}:00", instant.with_timezone(&Local).hour()),
                    start,
                    totals,
                }
            })
            .collect()
    }
}

/// Extrapolate a day's input / cache tokens from its output tokens using the
/// model's cumulative mix
fn infer_day_tokens(output: u64, cumulative: Option<&ModelUsage>) -> TokenCounts {
    let (input_ratio, cache_read_ratio, cache_creation_ratio) = match cumulative {
        Some(usage) if usage.output_tokens > 0 => {
            let out = usage.output_tokens as f64;
            (
                usage.input_tokens as f64 / out,
                usage.cache_read_input_tokens as f64 / out,
                usage.cache_creation_input_tokens as f64 / out,
            )
        }
        _ => (1.0, 0.0, 0.0),
    };
    let scaled = |ratio: f64| (output as f64 * ratio).round() as u64;

    TokenCounts {
        input: scaled(input_ratio),
        output,
        cache_read: scaled(cache_read_ratio),
        cache_creation: scaled(cache_creation_ratio),
    }
}
