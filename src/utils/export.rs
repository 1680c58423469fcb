//! Export writers
//!
//! CSV of the ranked holders (with a commented metadata and statistics header)
//! and a pretty-printed JSON dump of the whole report. Both are best-effort:
//! callers log failures and carry on.

use chrono::Utc;
use csv::WriterBuilder;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::errors::{AppError, AppResult};
use crate::models::types::{AnalysisReport, Holder, HolderStatistics, TokenMetadata};
use crate::utils::constants::EXPORT_TIMESTAMP_FORMAT;

pub const CSV_HEADER: [&str; 4] = ["Rank", "Address", "Balance", "Percentage"];

/// Create `dir` (and parents) if missing
pub fn ensure_output_dir(dir: &Path) -> AppResult<()> {
    fs::create_dir_all(dir).map_err(|e| {
        AppError::export_failed(format!("cannot create {}: {}", dir.display(), e))
    })
}

fn timestamped(dir: &Path, prefix: &str, extension: &str) -> PathBuf {
    let stamp = Utc::now().format(EXPORT_TIMESTAMP_FORMAT);
    dir.join(format!("{}_{}.{}", prefix, stamp, extension))
}

/// Write `holders_<timestamp>.csv` into `dir`
pub fn export_csv(
    dir: &Path,
    holders: &[Holder],
    metadata: &TokenMetadata,
    statistics: &HolderStatistics,
) -> AppResult<PathBuf> {
    ensure_output_dir(dir)?;
    let path = timestamped(dir, "holders", "csv");
    write_csv(&path, holders, metadata, statistics)?;
    info!("💾 CSV exported: {}", path.display());
    Ok(path)
}

fn write_csv(
    path: &Path,
    holders: &[Holder],
    metadata: &TokenMetadata,
    statistics: &HolderStatistics,
) -> AppResult<()> {
    let mut out = BufWriter::new(File::create(path)?);

    writeln!(out, "# Generated: {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"))?;
    writeln!(out, "# Mint: {}", metadata.mint_address)?;
    writeln!(out, "# Total Supply: {:.6}", metadata.total_supply)?;
    writeln!(out, "# Decimals: {}", metadata.decimals)?;
    writeln!(out, "#")?;
    writeln!(out, "# Statistics")?;
    for (label, value) in statistics.entries() {
        match value {
            Some(v) => writeln!(out, "# {}: {:.6}", label, v)?,
            None => writeln!(out, "# {}: N/A", label)?,
        }
    }
    writeln!(out)?;

    let mut writer = WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(CSV_HEADER)?;
    for (rank, holder) in holders.iter().enumerate() {
        let share = holder
            .share_of(metadata.total_supply)
            .map(|p| format!("{:.4}%", p))
            .unwrap_or_else(|| "N/A".to_string());
        writer.write_record([
            (rank + 1).to_string(),
            holder.address.clone(),
            format!("{:.6}", holder.balance),
            share,
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `analysis_<timestamp>.json` into `dir`
pub fn export_json(dir: &Path, report: &AnalysisReport) -> AppResult<PathBuf> {
    ensure_output_dir(dir)?;
    let path = timestamped(dir, "analysis", "json");
    let body = serde_json::to_string_pretty(report)
        .map_err(|e| AppError::export_failed(format!("report serialization: {}", e)))?;
    fs::write(&path, body)?;
    info!("💾 JSON exported: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::report::ReportAssembler;
    use crate::core::statistics::aggregate;
    use std::time::Duration;
    use tempfile::TempDir;

    fn metadata(total_supply: f64) -> TokenMetadata {
        TokenMetadata {
            mint_address: "Mint111".into(),
            decimals: 6,
            raw_supply: (total_supply * 1e6) as u64,
            total_supply,
            query_elapsed_secs: 0.1,
            mint_authority: None,
            freeze_authority: None,
            is_initialized: None,
            token_program: None,
            account_query_elapsed_secs: None,
            observed_at: Utc::now(),
        }
    }

    fn holders() -> Vec<Holder> {
        vec![
            Holder::from_raw("addr1", 400_000_000_000, 6),
            Holder::from_raw("addr2", 300_000_000_000, 6),
        ]
    }

    #[test]
    fn test_csv_layout() {
        let dir = TempDir::new().unwrap();
        let holders = holders();
        let stats = aggregate(&holders, 1_000_000.0);

        let path = export_csv(dir.path(), &holders, &metadata(1_000_000.0), &stats).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("holders_") && name.ends_with(".csv"));

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("# Mint: Mint111"));
        assert!(content.contains("# top_5_percentage: 70.000000"));

        let rows: Vec<&str> = content.lines().filter(|l| !l.starts_with('#') && !l.is_empty()).collect();
        assert_eq!(rows[0], "Rank,Address,Balance,Percentage");
        assert_eq!(rows[1], "1,addr1,400000.000000,40.0000%");
        assert_eq!(rows[2], "2,addr2,300000.000000,30.0000%");
    }

    #[test]
    fn test_csv_without_supply_marks_percentages() {
        let dir = TempDir::new().unwrap();
        let holders = holders();
        let stats = aggregate(&holders, 0.0);

        let path = export_csv(dir.path(), &holders, &metadata(0.0), &stats).unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("# top_5_percentage: N/A"));
        assert!(content.contains("1,addr1,400000.000000,N/A"));
    }

    #[test]
    fn test_json_export_creates_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("reports").join("today");
        let holders = holders();
        let stats = aggregate(&holders, 1_000_000.0);
        let report = ReportAssembler::new(metadata(1_000_000.0), holders, stats).build(Duration::from_secs(1));

        let path = export_json(&nested, &report).unwrap();
        assert!(path.starts_with(&nested));

        let parsed: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed["success"], true);
        assert_eq!(parsed["holders"].as_array().unwrap().len(), 2);
        assert_eq!(parsed["metadata"]["mint_address"], "Mint111");
    }

    #[test]
    fn test_unwritable_dir_is_export_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let err = ensure_output_dir(&blocker.join("sub")).unwrap_err();
        assert_eq!(err.code_str(), "EXPORT_FAILED");
    }
}
