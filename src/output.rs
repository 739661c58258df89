//! Output formatting utilities

use crate::error::Result;
use crate::report::{ComparisonReport, Finding, Section};
use crate::table::TableRef;

/// Renders findings into report lines.
///
/// Rendering depends only on the tables and the sequence of findings, so
/// unchanged data always produces the same lines. Section headers and
/// summaries are emitted as the section changes.
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    label_a: String,
    label_b: String,
    filter_a: Option<String>,
    filter_b: Option<String>,
    current: Option<Section>,
    distinct_total: usize,
    distinct_mismatched: usize,
    value_total: usize,
    value_mismatched: usize,
    value_skipped: usize,
    mismatches: usize,
}

impl ReportRenderer {
    pub fn new(table_a: &TableRef, table_b: &TableRef) -> Self {
        Self {
            label_a: table_a.name().to_string(),
            label_b: table_b.name().to_string(),
            filter_a: table_a.filter().map(str::to_string),
            filter_b: table_b.filter().map(str::to_string),
            current: None,
            distinct_total: 0,
            distinct_mismatched: 0,
            value_total: 0,
            value_mismatched: 0,
            value_skipped: 0,
            mismatches: 0,
        }
    }

    pub fn banner(&self) -> Vec<String> {
        let mut lines = vec![
            String::new(),
            "🔍 Comparing tables:".to_string(),
            format!("├─ Table A: {}", self.label_a),
        ];
        if let Some(filter) = &self.filter_a {
            lines.push(format!("│  └─ where {}", filter));
        }
        lines.push(format!("└─ Table B: {}", self.label_b));
        if let Some(filter) = &self.filter_b {
            lines.push(format!("   └─ where {}", filter));
        }
        lines.push(String::new());
        lines
    }

    /// Lines for one finding, preceded by section transitions if needed
    pub fn render(&mut self, finding: &Finding) -> Vec<String> {
        let mut lines = self.enter_section(finding.section());
        if finding.is_mismatch() {
            self.mismatches += 1;
        }

        match finding {
            Finding::RowCount { count_a, count_b } => {
                lines.push(format!("🔢 Row count in {}: {}", self.label_a, count_a));
                lines.push(format!("🔢 Row count in {}: {}", self.label_b, count_b));
                if count_a == count_b {
                    lines.push("✅ Both tables have the same number of rows.".to_string());
                } else {
                    lines.push(format!(
                        "❌ Tables do NOT have the same number of rows (difference: {}).",
                        count_a.abs_diff(*count_b)
                    ));
                }
            }
            Finding::ColumnSet { diff } => {
                lines.push(format!(
                    "📌 Columns only in {}: {}",
                    self.label_a,
                    format_list(&diff.only_in_a)
                ));
                lines.push(format!(
                    "📌 Columns only in {}: {}",
                    self.label_b,
                    format_list(&diff.only_in_b)
                ));
                lines.push(format!("📌 Common columns: {}", diff.common.len()));
            }
            Finding::DistinctCount {
                column,
                count_a,
                count_b,
            } => {
                self.distinct_total += 1;
                if count_a != count_b {
                    self.distinct_mismatched += 1;
                    lines.push(format!(
                        "⚠️  Column '{}': {} has {}, {} has {}",
                        column, self.label_a, count_a, self.label_b, count_b
                    ));
                }
            }
            Finding::ValueCounts { column, diff } => {
                self.value_total += 1;
                if diff.has_differences() {
                    self.value_mismatched += 1;
                    lines.push(format!(
                        "⚠️  Column '{}': {} value difference(s)",
                        column,
                        diff.total_differences()
                    ));

                    let mut detail = Vec::new();
                    for value in &diff.missing_in_b {
                        detail.push(format!("{} only in {}", value, self.label_a));
                    }
                    for value in &diff.missing_in_a {
                        detail.push(format!("{} only in {}", value, self.label_b));
                    }
                    for mismatch in &diff.count_mismatches {
                        detail.push(format!(
                            "{}: {} has {}, {} has {}",
                            mismatch.value, self.label_a, mismatch.count_a, self.label_b, mismatch.count_b
                        ));
                    }

                    let last = detail.len().saturating_sub(1);
                    for (i, line) in detail.into_iter().enumerate() {
                        let prefix = if i == last { "└─" } else { "├─" };
                        lines.push(format!("   {} {}", prefix, line));
                    }
                }
            }
            Finding::ValueCheckSkipped { column, limit } => {
                self.value_total += 1;
                self.value_skipped += 1;
                lines.push(format!(
                    "⏭️  Column '{}': skipped, more than {} distinct values",
                    column, limit
                ));
            }
        }

        lines
    }

    /// Close the open section and add the overall result line
    pub fn finish(&mut self) -> Vec<String> {
        let mut lines = self.close_section();
        self.current = None;

        if self.mismatches == 0 {
            lines.push("🏁 No differences found.".to_string());
        } else {
            lines.push(format!("🏁 {} check(s) reported differences.", self.mismatches));
        }
        lines
    }

    /// Open a per-column section with its header, closing the previous one.
    /// The section's summary follows even when no finding arrives for it.
    pub fn begin_section(&mut self, section: Section, columns: usize) -> Vec<String> {
        let mut lines = self.close_section();
        self.current = Some(section);

        match section {
            Section::DistinctCounts => {
                lines.push(format!("📊 Distinct value counts for {} common column(s):", columns));
            }
            Section::Values => {
                lines.push(format!("🔬 Value-level comparison for {} common column(s):", columns));
            }
            Section::RowCount | Section::Columns => {}
        }
        lines
    }

    fn enter_section(&mut self, section: Section) -> Vec<String> {
        if self.current == Some(section) {
            return Vec::new();
        }

        let mut lines = self.close_section();
        self.current = Some(section);

        match section {
            Section::DistinctCounts => {
                lines.push("📊 Distinct value counts per common column:".to_string());
            }
            Section::Values => {
                lines.push("🔬 Value-level comparison per common column:".to_string());
            }
            Section::RowCount | Section::Columns => {}
        }
        lines
    }

    fn close_section(&self) -> Vec<String> {
        let mut lines = Vec::new();
        match self.current {
            Some(Section::DistinctCounts) => {
                if self.distinct_mismatched == 0 {
                    lines.push("✅ All common columns have matching distinct counts.".to_string());
                } else {
                    lines.push(format!(
                        "✅ Remaining {} columns have matching distinct counts.",
                        self.distinct_total - self.distinct_mismatched
                    ));
                }
            }
            Some(Section::Values) => {
                let compared = self.value_total - self.value_skipped;
                if self.value_mismatched == 0 {
                    lines.push(format!("✅ All {} compared columns have matching values.", compared));
                } else {
                    lines.push(format!(
                        "❌ {} of {} compared columns have value differences.",
                        self.value_mismatched, compared
                    ));
                }
                if self.value_skipped > 0 {
                    lines.push(format!(
                        "⏭️  {} column(s) skipped for having too many distinct values.",
                        self.value_skipped
                    ));
                }
            }
            Some(Section::RowCount) | Some(Section::Columns) | None => {}
        }
        if self.current.is_some() {
            lines.push(String::new());
        }
        lines
    }
}

/// Render a whole report the same way the report log does
pub fn render_report(report: &ComparisonReport) -> Vec<String> {
    let mut renderer = ReportRenderer::new(&report.table_a, &report.table_b);
    let mut lines = renderer.banner();
    for finding in report.findings.iter().filter(|f| f.section() <= Section::Columns) {
        lines.extend(renderer.render(finding));
    }

    let per_column = [
        (Section::DistinctCounts, report.checks.distinct_counts),
        (Section::Values, report.checks.values),
    ];
    for (section, enabled) in per_column {
        if !enabled {
            continue;
        }
        let findings: Vec<&Finding> = report
            .findings
            .iter()
            .filter(|f| f.section() == section)
            .collect();
        lines.extend(renderer.begin_section(section, findings.len()));
        for finding in findings {
            lines.extend(renderer.render(finding));
        }
    }

    lines.extend(renderer.finish());
    lines
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Report plus a summary block
    pub fn format_report(report: &ComparisonReport) -> Result<String> {
        let json = serde_json::json!({
            "table_a": report.table_a,
            "table_b": report.table_b,
            "checks": report.checks,
            "mismatches": report.mismatch_count(),
            "findings": report.findings,
        });
        Ok(serde_json::to_string_pretty(&json)?)
    }
}

fn format_list(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        format!("[{}]", items.join(", "))
    }
}
