//! Terminal report rendering

use num_format::{Locale, ToFormattedString};
use std::fmt::Write;
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::models::types::{AnalysisReport, CapabilityReport};
use crate::utils::constants::DISPLAY_TOP_HOLDERS;

const RULE_WIDTH: usize = 80;

/// `1234567.891` with 2 decimals -> `1,234,567.89`
pub fn with_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let grouped = int_part
        .parse::<u128>()
        .map(|n| n.to_formatted_string(&Locale::en))
        .unwrap_or_else(|_| int_part.to_string());

    let sign = if value < 0.0 { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

#[derive(Tabled)]
struct CapabilityRow {
    #[tabled(rename = "Check")]
    check: String,
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Bytes")]
    bytes: String,
    #[tabled(rename = "Result")]
    result: String,
}

/// Per-method probe table for one endpoint.
pub fn render_capability_table(report: &CapabilityReport) -> String {
    let rows: Vec<CapabilityRow> = report
        .methods
        .iter()
        .map(|m| CapabilityRow {
            check: m.description.clone(),
            method: m.method.clone(),
            time: m
                .elapsed_secs
                .map(|s| format!("{:.2}s", s))
                .unwrap_or_else(|| "-".to_string()),
            bytes: m
                .data_size
                .map(|b| b.to_formatted_string(&Locale::en))
                .unwrap_or_else(|| "-".to_string()),
            result: if m.supported {
                "✅".to_string()
            } else {
                format!("❌ {}", m.error_detail.as_deref().unwrap_or("failed"))
            },
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..=3)).with(Alignment::right()));
    table.to_string()
}

fn percent(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|p| format!("{:.*}%", decimals, p))
        .unwrap_or_else(|| "N/A".to_string())
}

/// Human-readable report. `exported` lists files written for this run.
pub fn render_report(report: &AnalysisReport, symbol: &str, exported: &[PathBuf]) -> String {
    let mut out = String::new();
    let rule = "=".repeat(RULE_WIDTH);
    let thin = "-".repeat(RULE_WIDTH);

    let (metadata, statistics) = match (&report.metadata, &report.statistics) {
        (Some(m), Some(s)) if report.success => (m, s),
        _ => {
            let reason = report.failure_reason.as_deref().unwrap_or("unknown error");
            let _ = writeln!(out, "\n❌ Analysis failed: {}", reason);
            for attempt in &report.attempt_log {
                let _ = writeln!(
                    out,
                    "   - {}: [{}] {}",
                    attempt.endpoint, attempt.code, attempt.message
                );
            }
            let _ = writeln!(out, "\n💡 Recommendations:");
            let _ = writeln!(out, "1. Use premium RPC services (QuickNode, Alchemy, Helius)");
            let _ = writeln!(out, "2. Check network connectivity");
            let _ = writeln!(out, "3. Try again later");
            return out;
        }
    };

    let _ = writeln!(out, "\n🏆 {} Token Analysis Complete", symbol);
    let _ = writeln!(out, "{}", rule);

    let _ = writeln!(out, "\n📊 Token Information");
    let _ = writeln!(out, "   Address: {}", metadata.mint_address);
    let _ = writeln!(
        out,
        "   Total Supply: {} {}",
        with_thousands(metadata.total_supply, 2),
        symbol
    );
    let _ = writeln!(out, "   Decimals: {}", metadata.decimals);
    if let Some(program) = &metadata.token_program {
        let _ = writeln!(out, "   Program: {}", program);
    }
    if metadata.is_enriched() {
        let _ = writeln!(
            out,
            "   Mint Authority: {}",
            metadata.mint_authority.as_deref().unwrap_or("none")
        );
        let _ = writeln!(
            out,
            "   Freeze Authority: {}",
            metadata.freeze_authority.as_deref().unwrap_or("none")
        );
    }
    let _ = writeln!(
        out,
        "   Analysis Time: {}",
        report.analyzed_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let _ = writeln!(out, "\n🌐 RPC Information");
    if let Some(endpoint) = &report.endpoint_used {
        let _ = writeln!(out, "   Provider: {}", endpoint.label());
    }
    if let Some(method) = &report.method_used {
        let _ = writeln!(out, "   Method Used: {}", method);
    }
    let _ = writeln!(
        out,
        "   Query Time: {:.2}s (holders {:.2}s)",
        report.total_query_elapsed_secs, report.holders_query_elapsed_secs
    );
    if let Some(secs) = metadata.account_query_elapsed_secs {
        let _ = writeln!(out, "   Mint Account Query: {:.2}s", secs);
    }
    if !report.attempt_log.is_empty() {
        let _ = writeln!(out, "   Endpoints skipped: {}", report.attempt_log.len());
    }

    let shown = report.top_holders(DISPLAY_TOP_HOLDERS);
    let _ = writeln!(out, "\n🥇 Top {} Holders", shown.len());
    let _ = writeln!(out, "{}", thin);
    for (i, holder) in shown.iter().enumerate() {
        let _ = writeln!(out, "{:2}. {}", i + 1, holder.address);
        let _ = writeln!(
            out,
            "    Balance: {} {} ({})",
            with_thousands(holder.balance, 6),
            symbol,
            percent(holder.share_of(metadata.total_supply), 4)
        );
        let _ = writeln!(out, "{}", thin);
    }

    let _ = writeln!(out, "\n📈 Holder Statistics");
    let _ = writeln!(out, "   Holders Analyzed: {}", statistics.total_holders_analyzed);
    for (label, balance, share) in [
        ("Top 5", statistics.top_5_balance, statistics.top_5_percentage),
        ("Top 10", statistics.top_10_balance, statistics.top_10_percentage),
        ("Top 20", statistics.top_20_balance, statistics.top_20_percentage),
    ] {
        let _ = writeln!(
            out,
            "   {} Holdings: {} {} ({})",
            label,
            with_thousands(balance, 2),
            symbol,
            percent(share, 2)
        );
    }
    let _ = writeln!(
        out,
        "   Largest Holder: {} {} ({})",
        with_thousands(statistics.largest_holder_balance, 6),
        symbol,
        percent(statistics.largest_holder_percentage, 4)
    );
    let _ = writeln!(
        out,
        "   Average Balance: {} {}",
        with_thousands(statistics.average_balance, 6),
        symbol
    );
    let _ = writeln!(
        out,
        "   Median Balance: {} {}",
        with_thousands(statistics.median_balance, 6),
        symbol
    );

    if !exported.is_empty() {
        let _ = writeln!(out);
        for path in exported {
            let _ = writeln!(out, "📁 Exported to: {}", path.display());
        }
    }

    out
}
