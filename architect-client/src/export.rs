//! Export of optimization output: the merged comparison table as CSV and the
//! full result as pretty JSON.

use std::path::Path;

use anyhow::{Context, Result};
use architect_core::{ComparisonTable, OptimizationResult};

/// Comparison table as CSV: a `date` column, then one column per series present
/// in the table. Dates a series does not cover are empty cells.
pub fn comparison_csv(table: &ComparisonTable) -> Result<String> {
    let series = table.present_series();
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["date"];
    header.extend(series.iter().map(|s| s.label()));
    wtr.write_record(&header)?;

    for row in &table.rows {
        let mut record = vec![row.date.format("%Y-%m-%d").to_string()];
        record.extend(
            series
                .iter()
                .map(|&s| row.value(s).map(|v| v.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

pub fn result_json(result: &OptimizationResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize optimization result")
}

pub fn write_comparison_csv(path: &Path, table: &ComparisonTable) -> Result<()> {
    write_file(path, &comparison_csv(table)?)
}

pub fn write_result_json(path: &Path, result: &OptimizationResult) -> Result<()> {
    write_file(path, &result_json(result)?)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use architect_core::merge::MergedRow;
    use chrono::NaiveDate;

    fn row(day: u32, rp: f64, permanent: Option<f64>) -> MergedRow {
        MergedRow {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            risk_parity: Some(rp),
            max_sharpe: None,
            hrp: Some(rp + 1.0),
            sixty_forty: None,
            permanent,
        }
    }

    #[test]
    fn absent_values_are_empty_cells() {
        let table = ComparisonTable {
            rows: vec![row(2, 100.0, Some(100.0)), row(3, 101.5, None)],
        };
        let csv = comparison_csv(&table).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "date,Risk Parity,HRP,Permanent");
        assert_eq!(lines[1], "2024-01-02,100,101,100");
        assert_eq!(lines[2], "2024-01-03,101.5,102.5,");
    }

    #[test]
    fn writes_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("chart.csv");
        let table = ComparisonTable {
            rows: vec![row(2, 100.0, None)],
        };
        write_comparison_csv(&path, &table).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("date,Risk Parity,HRP\n"));
    }
}
