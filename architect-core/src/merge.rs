//! Result merger — joins per-strategy and per-benchmark histories into one
//! date-indexed comparison table for the combined growth chart.
//!
//! The reference axis is Risk Parity's constrained history. Every other series
//! is joined on the `date` field, never by position, so a shifted or shortened
//! series cannot silently land on the wrong row. What happens when a series
//! does not line up is an explicit [`AlignmentPolicy`]:
//!
//! - `Lenient`: the field is left absent for rows the series does not cover.
//! - `Strict`: the merge fails with [`MergeError`].

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    BenchmarkKind, BenchmarkResult, OptimizationResult, SeriesPoint, StrategyKind, StrategyResult,
};

/// A result the merger could not align.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("reference series (Risk Parity, constrained) is missing")]
    MissingReferenceSeries,

    #[error("series '{series}' has {actual} points, reference axis has {expected}")]
    SeriesLengthMismatch {
        series: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("series '{series}' has no point on reference date {date}")]
    DateMisaligned {
        series: &'static str,
        date: NaiveDate,
    },
}

/// How to treat series that do not cover the reference axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentPolicy {
    #[default]
    Lenient,
    Strict,
}

impl std::str::FromStr for AlignmentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(AlignmentPolicy::Lenient),
            "strict" => Ok(AlignmentPolicy::Strict),
            other => Err(format!("unknown alignment policy '{other}' (expected lenient or strict)")),
        }
    }
}

impl std::fmt::Display for AlignmentPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlignmentPolicy::Lenient => f.write_str("lenient"),
            AlignmentPolicy::Strict => f.write_str("strict"),
        }
    }
}

/// One line of the combined chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonSeries {
    Strategy(StrategyKind),
    Benchmark(BenchmarkKind),
}

impl ComparisonSeries {
    /// Column order of the merged table.
    pub const ALL: [ComparisonSeries; 5] = [
        ComparisonSeries::Strategy(StrategyKind::RiskParity),
        ComparisonSeries::Strategy(StrategyKind::MaxSharpe),
        ComparisonSeries::Strategy(StrategyKind::Hrp),
        ComparisonSeries::Benchmark(BenchmarkKind::SixtyForty),
        ComparisonSeries::Benchmark(BenchmarkKind::Permanent),
    ];

    pub fn label(self) -> &'static str {
        match self {
            ComparisonSeries::Strategy(k) => k.label(),
            ComparisonSeries::Benchmark(k) => k.label(),
        }
    }

    pub fn is_benchmark(self) -> bool {
        matches!(self, ComparisonSeries::Benchmark(_))
    }
}

/// One date of the comparison table. Absent fields mean "no value on this date".
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MergedRow {
    pub date: NaiveDate,
    #[serde(rename = "Risk Parity", skip_serializing_if = "Option::is_none")]
    pub risk_parity: Option<f64>,
    #[serde(rename = "Max Sharpe", skip_serializing_if = "Option::is_none")]
    pub max_sharpe: Option<f64>,
    #[serde(rename = "HRP", skip_serializing_if = "Option::is_none")]
    pub hrp: Option<f64>,
    #[serde(rename = "60/40", skip_serializing_if = "Option::is_none")]
    pub sixty_forty: Option<f64>,
    #[serde(rename = "Permanent", skip_serializing_if = "Option::is_none")]
    pub permanent: Option<f64>,
}

impl MergedRow {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            risk_parity: None,
            max_sharpe: None,
            hrp: None,
            sixty_forty: None,
            permanent: None,
        }
    }

    pub fn value(&self, series: ComparisonSeries) -> Option<f64> {
        *self.slot(series)
    }

    fn slot(&self, series: ComparisonSeries) -> &Option<f64> {
        match series {
            ComparisonSeries::Strategy(StrategyKind::RiskParity) => &self.risk_parity,
            ComparisonSeries::Strategy(StrategyKind::MaxSharpe) => &self.max_sharpe,
            ComparisonSeries::Strategy(StrategyKind::Hrp) => &self.hrp,
            ComparisonSeries::Benchmark(BenchmarkKind::SixtyForty) => &self.sixty_forty,
            ComparisonSeries::Benchmark(BenchmarkKind::Permanent) => &self.permanent,
        }
    }

    fn slot_mut(&mut self, series: ComparisonSeries) -> &mut Option<f64> {
        match series {
            ComparisonSeries::Strategy(StrategyKind::RiskParity) => &mut self.risk_parity,
            ComparisonSeries::Strategy(StrategyKind::MaxSharpe) => &mut self.max_sharpe,
            ComparisonSeries::Strategy(StrategyKind::Hrp) => &mut self.hrp,
            ComparisonSeries::Benchmark(BenchmarkKind::SixtyForty) => &mut self.sixty_forty,
            ComparisonSeries::Benchmark(BenchmarkKind::Permanent) => &mut self.permanent,
        }
    }
}

/// The merged, date-indexed comparison table.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ComparisonTable {
    pub rows: Vec<MergedRow>,
}

impl ComparisonTable {
    /// Merge the histories of a full optimization result.
    pub fn from_result(
        result: &OptimizationResult,
        policy: AlignmentPolicy,
    ) -> Result<Self, MergeError> {
        merge_histories(&result.strategies, &result.benchmarks, policy)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether any row carries a value for `series`.
    pub fn has_series(&self, series: ComparisonSeries) -> bool {
        self.rows.iter().any(|r| r.value(series).is_some())
    }

    /// Series that appear in at least one row, in column order.
    pub fn present_series(&self) -> Vec<ComparisonSeries> {
        ComparisonSeries::ALL
            .into_iter()
            .filter(|&s| self.has_series(s))
            .collect()
    }

    /// (row index, value) pairs for charting; gaps are skipped.
    pub fn points(&self, series: ComparisonSeries) -> Vec<(f64, f64)> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.value(series).map(|v| (i as f64, v)))
            .collect()
    }

    /// Number of rows with no value for `series`.
    pub fn gaps(&self, series: ComparisonSeries) -> usize {
        self.rows.iter().filter(|r| r.value(series).is_none()).count()
    }

    /// Smallest and largest value across every series, if any.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.rows
            .iter()
            .flat_map(|r| ComparisonSeries::ALL.into_iter().filter_map(|s| r.value(s)))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// The history a series is drawn from: constrained for Risk Parity and Max
/// Sharpe, unconstrained for HRP, the plain history for benchmarks.
fn series_history<'a>(
    series: ComparisonSeries,
    strategies: &'a BTreeMap<String, StrategyResult>,
    benchmarks: &'a BTreeMap<String, BenchmarkResult>,
) -> Option<&'a [SeriesPoint]> {
    match series {
        ComparisonSeries::Strategy(kind) => {
            let strategy = strategies.get(kind.label())?;
            match kind {
                StrategyKind::Hrp => Some(&strategy.unconstrained.history),
                _ => strategy.constrained.as_ref().map(|v| v.history.as_slice()),
            }
        }
        ComparisonSeries::Benchmark(kind) => {
            benchmarks.get(kind.label()).map(|b| b.history.as_slice())
        }
    }
}

const REFERENCE: ComparisonSeries = ComparisonSeries::Strategy(StrategyKind::RiskParity);

/// Align every history onto the reference date axis.
pub fn merge_histories(
    strategies: &BTreeMap<String, StrategyResult>,
    benchmarks: &BTreeMap<String, BenchmarkResult>,
    policy: AlignmentPolicy,
) -> Result<ComparisonTable, MergeError> {
    let reference = series_history(REFERENCE, strategies, benchmarks)
        .ok_or(MergeError::MissingReferenceSeries)?;

    let mut rows: Vec<MergedRow> = reference
        .iter()
        .map(|p| {
            let mut row = MergedRow::empty(p.date);
            row.risk_parity = Some(p.value);
            row
        })
        .collect();

    for series in ComparisonSeries::ALL.into_iter().filter(|&s| s != REFERENCE) {
        let Some(history) = series_history(series, strategies, benchmarks) else {
            continue;
        };

        if policy == AlignmentPolicy::Strict && history.len() != reference.len() {
            return Err(MergeError::SeriesLengthMismatch {
                series: series.label(),
                expected: reference.len(),
                actual: history.len(),
            });
        }

        let by_date: HashMap<NaiveDate, f64> =
            history.iter().map(|p| (p.date, p.value)).collect();

        let mut gaps = 0usize;
        for row in rows.iter_mut() {
            match by_date.get(&row.date) {
                Some(&v) => *row.slot_mut(series) = Some(v),
                None if policy == AlignmentPolicy::Strict => {
                    return Err(MergeError::DateMisaligned {
                        series: series.label(),
                        date: row.date,
                    });
                }
                None => gaps += 1,
            }
        }

        if gaps > 0 {
            tracing::debug!(series = series.label(), gaps, "series does not cover reference axis");
        }
    }

    Ok(ComparisonTable { rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Metrics, RiskDecomposition, StrategyVariant};
    use proptest::prelude::*;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n).map(|i| start + chrono::Days::new(i as u64)).collect()
    }

    fn history(n: usize, base: f64) -> Vec<SeriesPoint> {
        dates(n)
            .into_iter()
            .enumerate()
            .map(|(i, date)| SeriesPoint { date, value: base + i as f64 })
            .collect()
    }

    fn variant(history: Vec<SeriesPoint>) -> StrategyVariant {
        StrategyVariant {
            metrics: Metrics::default(),
            allocation: BTreeMap::new(),
            history,
            drawdowns: Vec::new(),
            risk_decomposition: RiskDecomposition::default(),
        }
    }

    fn strategy(constrained: Option<Vec<SeriesPoint>>, unconstrained: Vec<SeriesPoint>) -> StrategyResult {
        StrategyResult {
            unconstrained: variant(unconstrained),
            constrained: constrained.map(variant),
            rebalance: None,
        }
    }

    fn benchmark(history: Vec<SeriesPoint>) -> BenchmarkResult {
        BenchmarkResult {
            ret: 0.0,
            sharpe: 0.0,
            volatility: 0.0,
            value_at_risk: None,
            allocation: BTreeMap::new(),
            history,
            drawdowns: Vec::new(),
            risk_decomposition: None,
        }
    }

    fn full_inputs(
        ms_len: usize,
    ) -> (BTreeMap<String, StrategyResult>, BTreeMap<String, BenchmarkResult>) {
        let mut strategies = BTreeMap::new();
        strategies.insert("Risk Parity".to_string(), strategy(Some(history(5, 100.0)), history(5, 90.0)));
        strategies.insert("Max Sharpe".to_string(), strategy(Some(history(ms_len, 200.0)), history(5, 0.0)));
        strategies.insert("HRP".to_string(), strategy(None, history(5, 300.0)));
        let mut benchmarks = BTreeMap::new();
        benchmarks.insert("60/40".to_string(), benchmark(history(5, 400.0)));
        benchmarks.insert("Permanent".to_string(), benchmark(history(5, 500.0)));
        (strategies, benchmarks)
    }

    #[test]
    fn aligned_inputs_fill_every_field() {
        let (s, b) = full_inputs(5);
        let table = merge_histories(&s, &b, AlignmentPolicy::Lenient).unwrap();
        assert_eq!(table.len(), 5);
        for row in &table.rows {
            for series in ComparisonSeries::ALL {
                assert!(row.value(series).is_some(), "{} missing", series.label());
            }
        }
        // Constrained for Risk Parity, unconstrained for HRP.
        assert_eq!(table.rows[0].risk_parity, Some(100.0));
        assert_eq!(table.rows[2].hrp, Some(302.0));
    }

    #[test]
    fn short_series_leaves_gaps_in_lenient_mode() {
        let (s, b) = full_inputs(3);
        let table = merge_histories(&s, &b, AlignmentPolicy::Lenient).unwrap();
        assert_eq!(table.len(), 5);
        assert_eq!(table.rows[2].max_sharpe, Some(202.0));
        assert!(table.rows[3].max_sharpe.is_none());
        assert!(table.rows[4].max_sharpe.is_none());
        for row in &table.rows[3..] {
            assert!(row.risk_parity.is_some());
            assert!(row.hrp.is_some());
            assert!(row.sixty_forty.is_some());
            assert!(row.permanent.is_some());
        }
        let ms = ComparisonSeries::Strategy(StrategyKind::MaxSharpe);
        assert_eq!(table.gaps(ms), 2);
        assert_eq!(table.points(ms).len(), 3);
    }

    #[test]
    fn short_series_fails_in_strict_mode() {
        let (s, b) = full_inputs(3);
        let err = merge_histories(&s, &b, AlignmentPolicy::Strict).unwrap_err();
        assert_eq!(
            err,
            MergeError::SeriesLengthMismatch { series: "Max Sharpe", expected: 5, actual: 3 }
        );
    }

    #[test]
    fn shifted_dates_are_joined_by_date_not_position() {
        let (mut s, b) = full_inputs(5);
        let shifted: Vec<SeriesPoint> = history(6, 200.0).into_iter().skip(1).collect();
        s.insert("Max Sharpe".to_string(), strategy(Some(shifted), history(5, 0.0)));

        let table = merge_histories(&s, &b, AlignmentPolicy::Lenient).unwrap();
        assert!(table.rows[0].max_sharpe.is_none());
        assert_eq!(table.rows[1].max_sharpe, Some(201.0));

        let err = merge_histories(&s, &b, AlignmentPolicy::Strict).unwrap_err();
        assert!(matches!(err, MergeError::DateMisaligned { series: "Max Sharpe", .. }));
    }

    #[test]
    fn missing_reference_series() {
        let (mut s, b) = full_inputs(5);
        s.insert("Risk Parity".to_string(), strategy(None, history(5, 0.0)));
        assert_eq!(
            merge_histories(&s, &b, AlignmentPolicy::Lenient).unwrap_err(),
            MergeError::MissingReferenceSeries
        );
        s.remove("Risk Parity");
        assert_eq!(
            merge_histories(&s, &b, AlignmentPolicy::Lenient).unwrap_err(),
            MergeError::MissingReferenceSeries
        );
    }

    #[test]
    fn absent_benchmarks_are_absent_fields() {
        let (s, _) = full_inputs(5);
        let table = merge_histories(&s, &BTreeMap::new(), AlignmentPolicy::Strict).unwrap();
        assert_eq!(table.present_series().len(), 3);
        assert!(table.rows.iter().all(|r| r.sixty_forty.is_none() && r.permanent.is_none()));
    }

    #[test]
    fn serializes_with_display_keys() {
        let (s, _) = full_inputs(5);
        let table = merge_histories(&s, &BTreeMap::new(), AlignmentPolicy::Lenient).unwrap();
        let json = serde_json::to_value(&table).unwrap();
        let first = &json[0];
        assert_eq!(first["date"], "2024-01-01");
        assert_eq!(first["Risk Parity"], 100.0);
        assert_eq!(first["HRP"], 300.0);
        assert!(first.get("60/40").is_none());
    }

    #[test]
    fn value_bounds_span_all_series() {
        let (s, b) = full_inputs(5);
        let table = merge_histories(&s, &b, AlignmentPolicy::Lenient).unwrap();
        assert_eq!(table.value_bounds(), Some((100.0, 504.0)));
        assert_eq!(ComparisonTable::default().value_bounds(), None);
    }

    proptest! {
        #[test]
        fn lenient_merge_never_fails_on_short_series(ms_len in 0usize..8, bench_len in 0usize..8) {
            let (mut s, mut b) = full_inputs(ms_len);
            b.insert("60/40".to_string(), benchmark(history(bench_len, 400.0)));
            s.insert("HRP".to_string(), strategy(None, history(bench_len, 300.0)));

            let table = merge_histories(&s, &b, AlignmentPolicy::Lenient).unwrap();
            prop_assert_eq!(table.len(), 5);
            let ms = ComparisonSeries::Strategy(StrategyKind::MaxSharpe);
            prop_assert_eq!(table.points(ms).len(), ms_len.min(5));
            prop_assert!(table.rows.iter().all(|r| r.risk_parity.is_some()));
        }
    }
}
