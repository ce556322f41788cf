use std::io::BufWriter;

use chrono::NaiveDate;
use printpdf::*;

use crate::clients::ClientProfile;
use crate::error::{Result, RunwayError};
use crate::fmt::{format_date, percent, Currency, DateFormat};
use crate::reports::*;

// US Letter dimensions (mm)
const PAGE_W: f32 = 215.9;
const PAGE_H: f32 = 279.4;
const MARGIN_TOP: f32 = 25.4;
const MARGIN_BOTTOM: f32 = 25.4;
const MARGIN_LEFT: f32 = 19.05;
const MARGIN_RIGHT: f32 = 19.05;
const ROW_H: f32 = 5.0;
const FONT_SIZE: f32 = 10.0;
const TITLE_SIZE: f32 = 16.0;
const SUBTITLE_SIZE: f32 = 10.0;

fn approx_text_width(text: &str, size: f32) -> f32 {
    text.len() as f32 * size * 0.18
}

/// How amounts and dates are written into a report.
#[derive(Debug, Clone, Copy)]
pub struct PdfContext {
    pub currency: Currency,
    pub date_format: DateFormat,
    pub generated_on: NaiveDate,
}

impl PdfContext {
    /// Builtin Helvetica has no rupee glyph, so amounts carry the ISO code.
    fn money(&self, val: f64) -> String {
        let formatted = self.currency.format(val);
        formatted.replacen(self.currency.symbol(), &format!("{} ", self.currency.code()), 1)
    }

    fn date(&self, date: NaiveDate) -> String {
        format_date(date, self.date_format)
    }
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Col {
    width: f32,
    align: Align,
}

struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    current_page: PdfPageIndex,
    current_layer: PdfLayerIndex,
    y: f32,
    title: String,
    subtitle: String,
    pages: usize,
    headers: usize,
}

impl PdfWriter {
    /// Opens the document and draws the header on the first page.
    fn new(title: &str, subtitle: &str, ctx: &PdfContext) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RunwayError::Pdf(format!("{e:?}")))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RunwayError::Pdf(format!("{e:?}")))?;
        let mut pdf = Self {
            doc,
            font,
            font_bold,
            current_page: page,
            current_layer: layer,
            y: MARGIN_TOP,
            title: title.to_string(),
            subtitle: format!("Generated on {}", ctx.date(ctx.generated_on)),
            pages: 1,
            headers: 0,
        };
        if !subtitle.is_empty() {
            pdf.subtitle = format!("{subtitle}  |  {}", pdf.subtitle);
        }
        pdf.header();
        Ok(pdf)
    }

    fn pdf_y(&self) -> f32 {
        PAGE_H - self.y
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer");
        self.current_page = page;
        self.current_layer = layer;
        self.pages += 1;
        self.y = MARGIN_TOP;
        self.header();
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y + needed > PAGE_H - MARGIN_BOTTOM {
            self.new_page();
        }
    }

    fn text(&self, s: &str, x: f32, size: f32, bold: bool) {
        let font = if bold {
            self.font_bold.clone()
        } else {
            self.font.clone()
        };
        let layer = self
            .doc
            .get_page(self.current_page)
            .get_layer(self.current_layer);
        layer.use_text(s, size, Mm(x), Mm(self.pdf_y()), &font);
    }

    fn hline(&self, x1: f32, x2: f32) {
        let layer = self
            .doc
            .get_page(self.current_page)
            .get_layer(self.current_layer);
        layer.set_outline_thickness(0.5);
        let line = Line {
            points: vec![
                (Point::new(Mm(x1), Mm(self.pdf_y())), false),
                (Point::new(Mm(x2), Mm(self.pdf_y())), false),
            ],
            is_closed: false,
        };
        layer.add_line(line);
    }

    // Repeated at the top of every page.
    fn header(&mut self) {
        self.headers += 1;
        self.text(&self.title, MARGIN_LEFT, TITLE_SIZE, true);
        self.y += 7.0;
        self.text(&self.subtitle, MARGIN_LEFT, SUBTITLE_SIZE, false);
        self.y += 5.0;
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 5.0;
    }

    fn table_header(&mut self, cols: &[Col], headers: &[&str]) {
        self.ensure_space(ROW_H * 2.0);
        self.cells(cols, headers, true);
        self.y += ROW_H;
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 2.0;
    }

    fn table_row(&mut self, cols: &[Col], values: &[&str], bold: bool) {
        self.ensure_space(ROW_H);
        self.cells(cols, values, bold);
        self.y += ROW_H;
    }

    fn cells(&self, cols: &[Col], values: &[&str], bold: bool) {
        let mut x = MARGIN_LEFT;
        for (col, value) in cols.iter().zip(values) {
            match col.align {
                Align::Left => self.text(value, x, FONT_SIZE, bold),
                Align::Right => {
                    let tw = approx_text_width(value, FONT_SIZE);
                    self.text(value, x + col.width - tw, FONT_SIZE, bold);
                }
            }
            x += col.width;
        }
    }

    fn section_label(&mut self, label: &str) {
        self.ensure_space(ROW_H * 2.0);
        self.text(label, MARGIN_LEFT, FONT_SIZE + 1.0, true);
        self.y += ROW_H + 1.0;
    }

    fn paragraph(&mut self, s: &str, bold: bool) {
        self.ensure_space(ROW_H);
        self.text(s, MARGIN_LEFT, FONT_SIZE, bold);
        self.y += ROW_H;
    }

    fn blank_row(&mut self) {
        self.y += ROW_H;
    }

    fn separator(&mut self) {
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 2.0;
    }

    fn to_bytes(self) -> Result<Vec<u8>> {
        debug_assert_eq!(self.headers, self.pages);
        tracing::debug!(title = %self.title, pages = self.pages, "rendering pdf");
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| RunwayError::Pdf(format!("{e:?}")))?;
        buf.into_inner().map_err(|e| RunwayError::Pdf(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Render functions
// ---------------------------------------------------------------------------

pub fn render_cash_balance(report: &CashBalanceLedger, ctx: &PdfContext) -> Result<Vec<u8>> {
    cash_balance_writer(report, ctx)?.to_bytes()
}

fn cash_balance_writer(report: &CashBalanceLedger, ctx: &PdfContext) -> Result<PdfWriter> {
    let mut pdf = PdfWriter::new(ReportKind::CashBalance.title(), "", ctx)?;

    pdf.section_label("Summary");
    let closing = ctx.money(report.closing_balance);
    pdf.paragraph(&format!("Current cash balance: {closing}"), true);
    pdf.paragraph(&format!("Transactions: {}", report.rows.len()), false);
    pdf.blank_row();

    let cols = &[
        Col { width: 28.0, align: Align::Left },
        Col { width: 78.0, align: Align::Left },
        Col { width: 35.0, align: Align::Right },
        Col { width: 36.8, align: Align::Right },
    ];
    pdf.section_label("Transaction Ledger");
    pdf.table_header(cols, &["Date", "Description", "Amount", "Balance"]);
    for row in &report.rows {
        let date = ctx.date(row.date);
        let amt = ctx.money(row.amount);
        let bal = ctx.money(row.balance);
        pdf.table_row(cols, &[&date, &row.description, &amt, &bal], false);
    }
    pdf.separator();
    pdf.table_row(cols, &["", "Closing balance", "", &closing], true);

    Ok(pdf)
}

pub fn render_burn_rate(
    report: &BurnRateBreakdown,
    period: &str,
    ctx: &PdfContext,
) -> Result<Vec<u8>> {
    let mut pdf = PdfWriter::new(ReportKind::BurnRate.title(), period, ctx)?;

    let cols = &[
        Col { width: 120.0, align: Align::Left },
        Col { width: 57.8, align: Align::Right },
    ];
    for month in &report.months {
        pdf.section_label(&month.label);
        if month.breakdown.is_empty() {
            pdf.paragraph("No expenses recorded", false);
        } else {
            pdf.table_header(cols, &["Category", "Amount"]);
            for line in &month.breakdown {
                let amt = ctx.money(line.amount);
                pdf.table_row(cols, &[&line.category, &amt], false);
            }
        }
        pdf.separator();
        let total = ctx.money(month.total);
        pdf.table_row(cols, &["Total burn", &total], true);
        pdf.blank_row();
    }

    pdf.to_bytes()
}

pub fn render_revenue(
    report: &RevenueBreakdown,
    period: &str,
    ctx: &PdfContext,
) -> Result<Vec<u8>> {
    let mut pdf = PdfWriter::new(ReportKind::RevenueGrowth.title(), period, ctx)?;

    let summary_cols = &[
        Col { width: 60.0, align: Align::Left },
        Col { width: 60.0, align: Align::Right },
        Col { width: 57.8, align: Align::Right },
    ];
    pdf.section_label("Monthly Revenue");
    pdf.table_header(summary_cols, &["Month", "Revenue", "Growth"]);
    for month in &report.months {
        let total = ctx.money(month.total);
        let growth = percent(month.growth);
        pdf.table_row(summary_cols, &[&month.label, &total, &growth], false);
    }
    pdf.blank_row();

    let cols = &[
        Col { width: 120.0, align: Align::Left },
        Col { width: 57.8, align: Align::Right },
    ];
    for month in report.months.iter().filter(|m| !m.sources.is_empty()) {
        pdf.section_label(&format!("Revenue sources: {}", month.label));
        pdf.table_header(cols, &["Source", "Amount"]);
        for line in &month.sources {
            let amt = ctx.money(line.amount);
            pdf.table_row(cols, &[&line.category, &amt], false);
        }
        pdf.blank_row();
    }

    pdf.to_bytes()
}

pub fn render_runway(report: &RunwayScenarios, ctx: &PdfContext) -> Result<Vec<u8>> {
    let mut pdf = PdfWriter::new(ReportKind::Runway.title(), "", ctx)?;

    let status_cols = &[
        Col { width: 120.0, align: Align::Left },
        Col { width: 57.8, align: Align::Right },
    ];
    pdf.section_label("Current Status");
    let balance = ctx.money(report.current.cash_balance);
    let burn = ctx.money(report.current.monthly_burn);
    let months = format!("{:.0} months", report.current.months);
    pdf.table_row(status_cols, &["Cash balance", &balance], false);
    pdf.table_row(status_cols, &["Monthly burn", &burn], false);
    pdf.table_row(status_cols, &["Runway", &months], true);
    pdf.blank_row();

    let cols = &[
        Col { width: 80.0, align: Align::Left },
        Col { width: 50.0, align: Align::Right },
        Col { width: 47.8, align: Align::Right },
    ];
    pdf.section_label("Scenarios");
    pdf.table_header(cols, &["Scenario", "Monthly burn", "Runway"]);
    for s in &report.scenarios {
        let burn = ctx.money(s.burn_rate);
        let runway = format!("{:.0} months", s.runway);
        pdf.table_row(cols, &[&s.name, &burn, &runway], false);
    }

    pdf.to_bytes()
}

fn insight_section(pdf: &mut PdfWriter, label: &str, insights: &[Insight]) {
    pdf.section_label(label);
    for insight in insights {
        pdf.paragraph(
            &format!("[{}] {}", insight.priority.as_str(), insight.title),
            true,
        );
        pdf.paragraph(insight.description, false);
        pdf.paragraph(&format!("Impact: {}", insight.impact), false);
        pdf.blank_row();
    }
}

pub fn render_insights(report: &InsightsBundle, ctx: &PdfContext) -> Result<Vec<u8>> {
    let mut pdf = PdfWriter::new(ReportKind::Insights.title(), "", ctx)?;

    let summary_cols = &[
        Col { width: 120.0, align: Align::Left },
        Col { width: 57.8, align: Align::Right },
    ];
    pdf.section_label(&format!(
        "Summary as of {}",
        ctx.date(report.summary.date)
    ));
    let income = ctx.money(report.summary.total_income);
    let expenses = ctx.money(report.summary.total_expenses);
    let net = ctx.money(report.summary.net);
    pdf.table_row(summary_cols, &["Total income", &income], false);
    pdf.table_row(summary_cols, &["Total expenses", &expenses], false);
    pdf.separator();
    pdf.table_row(summary_cols, &["Net", &net], true);
    pdf.blank_row();

    insight_section(&mut pdf, "Cost Optimization", report.cost_optimization);
    insight_section(&mut pdf, "Growth Opportunities", report.growth);

    let cols = &[
        Col { width: 60.0, align: Align::Left },
        Col { width: 40.0, align: Align::Right },
        Col { width: 40.0, align: Align::Right },
        Col { width: 37.8, align: Align::Right },
    ];
    pdf.section_label("Industry Benchmarks");
    pdf.table_header(cols, &["Metric", "Yours", "Benchmark", "Status"]);
    for b in &report.benchmarks {
        let status = if b.above { "Above" } else { "Below" };
        pdf.table_row(cols, &[&b.metric, &b.value, &b.benchmark, status], false);
    }

    pdf.to_bytes()
}

pub fn render_client(report: &ClientProfile, ctx: &PdfContext) -> Result<Vec<u8>> {
    let subtitle = format!("{} ({})", report.client.name, report.client.company);
    let mut pdf = PdfWriter::new(ReportKind::Client.title(), &subtitle, ctx)?;

    pdf.section_label("Client");
    pdf.paragraph(&format!("Email: {}", report.client.email), false);
    pdf.paragraph(&format!("Category: {}", report.client.category), false);
    pdf.paragraph(&format!("Status: {}", report.client.status.as_str()), false);
    pdf.blank_row();

    let cols = &[
        Col { width: 28.0, align: Align::Left },
        Col { width: 84.0, align: Align::Left },
        Col { width: 25.0, align: Align::Left },
        Col { width: 40.8, align: Align::Right },
    ];
    pdf.section_label("Transactions");
    if report.transactions.is_empty() {
        pdf.paragraph("No transactions linked to this client", false);
    } else {
        pdf.table_header(cols, &["Date", "Description", "Type", "Amount"]);
        for t in &report.transactions {
            let date = ctx.date(t.date);
            let amt = ctx.money(t.signed_amount());
            pdf.table_row(cols, &[&date, &t.description, t.txn_type.as_str(), &amt], false);
        }
    }
    pdf.blank_row();

    let totals_cols = &[
        Col { width: 120.0, align: Align::Left },
        Col { width: 57.8, align: Align::Right },
    ];
    let income = ctx.money(report.total_income);
    let expenses = ctx.money(report.total_expenses);
    let net = ctx.money(report.net);
    pdf.table_row(totals_cols, &["Total income", &income], false);
    pdf.table_row(totals_cols, &["Total expenses", &expenses], false);
    pdf.separator();
    pdf.table_row(totals_cols, &["Net", &net], true);

    pdf.to_bytes()
}
