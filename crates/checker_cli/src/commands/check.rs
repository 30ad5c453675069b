use anyhow::{Context, Result, ensure};
use checker_config::parse_file;
use checker_core::AuditContext;
use checker_parquet::ParquetChecker;
use std::io::{self, Write};
use tracing::info;

use crate::Cli;
use crate::output::{OutputFormat, RenderConfig, ReportRenderer};

pub async fn execute(cli: &Cli) -> Result<()> {
    let context = build_context(cli)?;
    info!("Checking Parquet file: {}", cli.file_path.display());

    let checker = ParquetChecker::new(&cli.file_path, context.clone());
    let renderer = ReportRenderer::new(RenderConfig::from_context(&context));

    match cli.format {
        OutputFormat::Json => {
            let report = checker
                .run()
                .await
                .with_context(|| format!("Failed to check {}", cli.file_path.display()))?;
            renderer.render(&report, OutputFormat::Json, &mut io::stdout().lock())?;
        }
        OutputFormat::Text => {
            // Each section is printed as soon as its phase completes
            let schema = checker
                .load_schema()
                .with_context(|| format!("Failed to read schema of {}", cli.file_path.display()))?;
            renderer.render_schema(&schema, &mut io::stdout().lock())?;

            let violations = checker.validate_types(&schema);
            renderer.render_violations(&violations, &mut io::stdout().lock())?;

            if context.check_element_sizes {
                let sizes = checker.audit_sizes(&schema).await.with_context(|| {
                    format!("Failed to check element sizes of {}", cli.file_path.display())
                })?;
                renderer.render_sizes(&sizes, &mut io::stdout().lock())?;
            }
        }
    }

    io::stdout().flush()?;
    Ok(())
}

/// Merges the optional config file with command-line overrides.
fn build_context(cli: &Cli) -> Result<AuditContext> {
    let mut context = match &cli.config {
        Some(path) => parse_file(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => AuditContext::default(),
    };

    if cli.check_element_sizes {
        context = context.with_element_sizes(true);
    }
    if let Some(batch_size) = cli.batch_size {
        ensure!(batch_size > 0, "--batch-size must be at least 1");
        context = context.with_batch_size(batch_size);
    }
    if let Some(limit) = cli.size_limit_kb {
        ensure!(
            limit.is_finite() && limit >= 0.0,
            "--size-limit-kb must be a non-negative number, got {}",
            limit
        );
        context = context.with_size_limit_kb(limit);
    }
    if let Some(strategy) = cli.strategy {
        context = context.with_strategy(strategy.into());
    }
    if cli.no_color {
        context = context.with_highlight(false);
    }

    Ok(context)
}
