//! Report rendering.
//!
//! Rendering is read-only over the report it is given. Terminal emphasis is
//! controlled by [`RenderConfig`], never by process-wide state.

use checker_core::{AuditContext, AuditReport, Field, Schema, SizeReport, Violation};
use clap::ValueEnum;
use colored::{Color, Colorize};
use serde_json::{Value, json};
use std::io::{self, Write};

/// Report output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    #[default]
    Text,
    /// One pretty-printed JSON document
    Json,
}

/// Presentation options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    /// Whether to use terminal colors
    pub highlight: bool,
    /// Ceiling in KiB used for the EXCEEDS flag
    pub size_limit_kb: f64,
}

impl RenderConfig {
    pub fn from_context(context: &AuditContext) -> Self {
        Self {
            highlight: context.highlight,
            size_limit_kb: context.size_limit_kb,
        }
    }
}

pub struct ReportRenderer {
    config: RenderConfig,
}

impl ReportRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Renders a complete report in the requested format.
    pub fn render(
        &self,
        report: &AuditReport,
        format: OutputFormat,
        out: &mut impl Write,
    ) -> io::Result<()> {
        match format {
            OutputFormat::Text => {
                self.render_schema(&report.schema, out)?;
                self.render_violations(&report.violations, out)?;
                if let Some(sizes) = &report.sizes {
                    self.render_sizes(sizes, out)?;
                }
                Ok(())
            }
            OutputFormat::Json => self.render_json(report, out),
        }
    }

    pub fn render_schema(&self, schema: &Schema, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "{}", self.paint("Parquet schema:", None))?;
        for field in &schema.fields {
            write_field(field, 1, out)?;
        }
        writeln!(
            out,
            "Rows: {}, row groups: {}",
            schema.num_rows, schema.num_row_groups
        )
    }

    pub fn render_violations(
        &self,
        violations: &[Violation],
        out: &mut impl Write,
    ) -> io::Result<()> {
        writeln!(out, "\nChecking column types...")?;
        if violations.is_empty() {
            writeln!(
                out,
                "{}",
                self.paint("No unsupported column types found.", Some(Color::Green))
            )?;
        }
        for violation in violations {
            writeln!(out, "{}", self.paint(&violation.to_string(), Some(Color::Red)))?;
        }
        writeln!(out, "Column type check complete.")
    }

    pub fn render_sizes(&self, sizes: &SizeReport, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "\nVerifying overall element sizes (in KB):")?;

        for column in &sizes.columns {
            match column.size_kb() {
                Some(kb) if column.exceeds(self.config.size_limit_kb) => {
                    let flag = format!("[EXCEEDS {}KB]", self.config.size_limit_kb);
                    writeln!(
                        out,
                        "Column '{}': {:.2} KB {}",
                        column.name,
                        kb,
                        self.paint(&flag, Some(Color::Red))
                    )?;
                }
                Some(kb) => writeln!(out, "Column '{}': {:.2} KB", column.name, kb)?,
                None => writeln!(
                    out,
                    "Column '{}': {}",
                    column.name,
                    self.paint("unmeasured (nested type)", Some(Color::Yellow))
                )?,
            }
        }

        if sizes.has_unmeasured() {
            writeln!(
                out,
                "{}",
                self.paint(
                    "Checking size of nested columns is not supported.",
                    Some(Color::Yellow)
                )
            )?;
        }

        writeln!(
            out,
            "\nTime taken for element size verification: {:.2} seconds",
            sizes.elapsed.as_secs_f64()
        )
    }

    fn render_json(&self, report: &AuditReport, out: &mut impl Write) -> io::Result<()> {
        let limit = self.config.size_limit_kb;
        let sizes = report.sizes.as_ref().map(|sizes| {
            json!({
                "strategy": sizes.strategy.to_string(),
                "batches_processed": sizes.batches_processed,
                "rows_processed": sizes.rows_processed,
                "size_limit_kb": limit,
                "columns": sizes.columns.iter().map(|c| json!({
                    "name": c.name,
                    "max_bytes": c.max_bytes(),
                    "size_kb": c.size_kb(),
                    "unmeasured": c.is_unmeasured(),
                    "exceeds": c.exceeds(limit),
                })).collect::<Vec<_>>(),
            })
        });

        let output = json!({
            "file": report.schema.location,
            "schema": {
                "fields": report.schema.fields,
                "num_rows": report.schema.num_rows,
                "num_row_groups": report.schema.num_row_groups,
            },
            "violations": report.violations,
            "sizes": sizes.unwrap_or(Value::Null),
            "elapsed_seconds": report.sizes.as_ref().map(|s| s.elapsed.as_secs_f64()),
        });

        serde_json::to_writer_pretty(&mut *out, &output)?;
        writeln!(out)
    }

    fn paint(&self, text: &str, color: Option<Color>) -> String {
        if !self.config.highlight {
            return text.to_string();
        }
        match color {
            Some(color) => text.color(color).bold().to_string(),
            None => text.bold().to_string(),
        }
    }
}

fn write_field(field: &Field, depth: usize, out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "{}{}: {}",
        "  ".repeat(depth),
        field.name,
        field.data_type
    )?;
    for child in &field.children {
        write_field(child, depth + 1, out)?;
    }
    Ok(())
}
