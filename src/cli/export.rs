use std::path::{Path, PathBuf};

use crate::cli::{signed_in, today, Ctx, ExportCommands};
use crate::clients::{get_client, profile};
use crate::error::Result;
use crate::metrics::derive;
use crate::models::{Transaction, TxnStatus};
use crate::pdf::{self, PdfContext};
use crate::reports::{self, period_label, ReportKind};
use crate::settings::get_data_dir;
use crate::store::load_transactions;

fn default_dir() -> PathBuf {
    get_data_dir().join("exports")
}

fn write_pdf(bytes: &[u8], path: &Path) -> Result<String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote report");
    let written = path.display().to_string();
    println!("Wrote {written}");
    Ok(written)
}

fn pdf_context(ctx: &Ctx) -> PdfContext {
    PdfContext {
        currency: ctx.settings.currency,
        date_format: ctx.settings.date_format,
        generated_on: today(),
    }
}

fn completed(ctx: &Ctx) -> Result<Vec<Transaction>> {
    load_transactions(&ctx.conn, Some(TxnStatus::Completed))
}

fn cash_balance_pdf(ctx: &Ctx) -> Result<Vec<u8>> {
    let txns = completed(ctx)?;
    pdf::render_cash_balance(&reports::cash_balance_ledger(&txns), &pdf_context(ctx))
}

fn burn_rate_pdf(ctx: &Ctx, months: u32) -> Result<Vec<u8>> {
    let (today, months) = (today(), months.max(1));
    let txns = completed(ctx)?;
    pdf::render_burn_rate(
        &reports::burn_rate_breakdown(&txns, months, today),
        &period_label(months, today),
        &pdf_context(ctx),
    )
}

fn revenue_pdf(ctx: &Ctx, months: u32) -> Result<Vec<u8>> {
    let (today, months) = (today(), months.max(1));
    let txns = completed(ctx)?;
    pdf::render_revenue(
        &reports::revenue_breakdown(&txns, months, today),
        &period_label(months, today),
        &pdf_context(ctx),
    )
}

fn runway_pdf(ctx: &Ctx) -> Result<Vec<u8>> {
    let txns = completed(ctx)?;
    let metrics = derive(&txns, today());
    pdf::render_runway(&reports::runway_scenarios(&metrics), &pdf_context(ctx))
}

fn insights_pdf(ctx: &Ctx) -> Result<Vec<u8>> {
    let today = today();
    let txns = completed(ctx)?;
    let metrics = derive(&txns, today);
    pdf::render_insights(&reports::insights_bundle(&txns, &metrics, today), &pdf_context(ctx))
}

fn output_path(output: Option<String>, kind: ReportKind) -> PathBuf {
    output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_dir().join(kind.file_name()))
}

fn single(
    kind: ReportKind,
    output: Option<String>,
    build: impl FnOnce(&Ctx) -> Result<Vec<u8>>,
) -> Result<String> {
    let ctx = signed_in()?;
    let bytes = build(&ctx)?;
    write_pdf(&bytes, &output_path(output, kind))
}

pub fn client(id: i64, output: Option<String>) -> Result<String> {
    let ctx = signed_in()?;
    let report = profile(&ctx.conn, get_client(&ctx.conn, id)?)?;
    let bytes = pdf::render_client(&report, &pdf_context(&ctx))?;
    write_pdf(&bytes, &output_path(output, ReportKind::Client))
}

/// Every report except the client report, which needs a client id.
pub fn all(months: u32, output_dir: Option<String>) -> Result<()> {
    let ctx = signed_in()?;
    let dir = output_dir.map(PathBuf::from).unwrap_or_else(default_dir);
    std::fs::create_dir_all(&dir)?;

    let reports = [
        (ReportKind::CashBalance, cash_balance_pdf(&ctx)?),
        (ReportKind::BurnRate, burn_rate_pdf(&ctx, months)?),
        (ReportKind::RevenueGrowth, revenue_pdf(&ctx, months)?),
        (ReportKind::Runway, runway_pdf(&ctx)?),
        (ReportKind::Insights, insights_pdf(&ctx)?),
    ];
    for (kind, bytes) in &reports {
        write_pdf(bytes, &dir.join(kind.file_name()))?;
    }
    println!("All reports exported to {}", dir.display());
    Ok(())
}

pub fn dispatch(cmd: ExportCommands) -> Result<()> {
    let written = match cmd {
        ExportCommands::CashBalance { output } => {
            single(ReportKind::CashBalance, output, cash_balance_pdf)
        }
        ExportCommands::BurnRate { months, output } => {
            single(ReportKind::BurnRate, output, |ctx| burn_rate_pdf(ctx, months))
        }
        ExportCommands::RevenueGrowth { months, output } => {
            single(ReportKind::RevenueGrowth, output, |ctx| revenue_pdf(ctx, months))
        }
        ExportCommands::Runway { output } => single(ReportKind::Runway, output, runway_pdf),
        ExportCommands::Insights { output } => single(ReportKind::Insights, output, insights_pdf),
        ExportCommands::Client { client: id, output } => client(id, output),
        ExportCommands::All { months, output_dir } => return all(months, output_dir),
    };
    written.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_pdf_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("exports").join("nested").join("runway-report.pdf");
        let written = write_pdf(b"%PDF-1.3", &path).unwrap();
        assert_eq!(written, path.display().to_string());
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.3");
    }

    #[test]
    fn test_output_path_prefers_explicit_path() {
        let path = output_path(Some("/tmp/custom.pdf".into()), ReportKind::Runway);
        assert_eq!(path, PathBuf::from("/tmp/custom.pdf"));
    }
}
