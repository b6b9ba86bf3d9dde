//! Server-rendered dashboard page

use std::fmt::Write;

use super::charts::{category_bar_chart, monthly_trend_chart, share_donut_chart};
use super::format::{percent, rupiah, signed, thousands};
use crate::error::Result;
use crate::forecast::ForecastState;
use crate::pipeline::{DataOrigin, Snapshot};
use crate::risk::{RiskAssessment, RiskInput, RiskState};

pub const TABLE_ROWS: usize = 50;
const PRODUCT_BARS: usize = 8;

/// Outcome of a risk-form submission, if any
pub enum RiskPanel {
    Form(RiskInput),
    Result(RiskInput, RiskAssessment),
    Error(RiskInput, String),
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f5f7fb; color: #1f2933; }
header { background: #1f3a93; color: #fff; padding: 16px 32px; display: flex; justify-content: space-between; align-items: center; }
main { display: grid; grid-template-columns: 1fr 300px; gap: 24px; padding: 24px 32px; }
.cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr)); gap: 12px; }
.card, section, aside { background: #fff; border-radius: 8px; padding: 16px; box-shadow: 0 1px 3px rgba(0,0,0,.08); }
.card .value { font-size: 1.4em; font-weight: 600; }
.card .delta { font-size: .85em; color: #52606d; }
.warning { background: #fff4e5; border-left: 4px solid #f0a030; padding: 8px 12px; margin-bottom: 8px; }
.info { background: #e8f0fe; border-left: 4px solid #1f3a93; padding: 8px 12px; }
.ok { color: #107c10; font-weight: 600; }
.bad { color: #c50f1f; font-weight: 600; }
table { border-collapse: collapse; width: 100%; font-size: .9em; }
th, td { text-align: left; padding: 4px 8px; border-bottom: 1px solid #e4e7eb; }
td.num { text-align: right; }
svg { max-width: 100%; height: auto; }
label { display: block; margin-top: 8px; }
input { width: 100%; }
"#;

/// Minimal HTML escaping for text and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn card(out: &mut String, title: &str, value: &str, delta: Option<&str>) {
    let _ = write!(
        out,
        r#"<div class="card"><div>{}</div><div class="value">{}</div>"#,
        escape(title),
        escape(value)
    );
    if let Some(delta) = delta {
        let _ = write!(out, r#"<div class="delta">{}</div>"#, escape(delta));
    }
    out.push_str("</div>");
}

/// Embed a chart, or a note when it could not be drawn
fn chart_or_note(out: &mut String, chart: Result<String>) {
    match chart {
        Ok(svg) => out.push_str(&svg),
        Err(e) => {
            let _ = write!(out, r#"<p class="info">Chart unavailable: {}</p>"#, escape(&e.to_string()));
        }
    }
}

fn render_cards(out: &mut String, snapshot: &Snapshot) {
    let kpis = &snapshot.kpis;
    out.push_str(r#"<div class="cards">"#);
    card(out, "Total sales", &rupiah(kpis.total_sales), None);
    card(out, "Transactions", &thousands(kpis.transaction_count as f64), None);
    card(out, "Average sale", &rupiah(kpis.mean_sale), None);
    card(out, "Units sold", &thousands(kpis.total_quantity), None);
    card(
        out,
        "Top region",
        kpis.top_region.as_deref().unwrap_or("-"),
        Some(&format!("{} months of data", kpis.months_covered)),
    );
    match &snapshot.forecast {
        ForecastState::Ready(f) => card(
            out,
            &format!("Projected {}", f.next_month.label()),
            &rupiah(f.projection),
            Some(&format!("{} vs last month", signed(f.delta_vs_last))),
        ),
        ForecastState::Insufficient { .. } => {
            card(out, "Projected next month", "-", Some("needs at least 2 months"))
        }
    }
    out.push_str("</div>");
}

fn render_charts(out: &mut String, snapshot: &Snapshot) {
    if !snapshot.has_data() {
        out.push_str(r#"<section><p class="info">No sales data to chart yet.</p></section>"#);
        return;
    }

    out.push_str("<section><h2>Trend and regression line</h2>");
    chart_or_note(
        out,
        monthly_trend_chart(&snapshot.monthly, snapshot.forecast.forecast()),
    );
    if let ForecastState::Insufficient { months } = &snapshot.forecast {
        let _ = write!(
            out,
            r#"<p class="warning">Not enough monthly data to forecast (need at least 2 months, have {}).</p>"#,
            months
        );
    }
    out.push_str("</section>");

    out.push_str("<section><h2>Share by region</h2>");
    chart_or_note(out, share_donut_chart("Share by region", &snapshot.by_region));
    out.push_str("</section>");

    out.push_str("<section><h2>Sales by product</h2>");
    chart_or_note(
        out,
        category_bar_chart("Sales by product", &snapshot.by_product, PRODUCT_BARS),
    );
    out.push_str("</section>");
}

fn render_table(out: &mut String, snapshot: &Snapshot) {
    out.push_str("<section><h2>Transactions</h2>");
    if snapshot.records.is_empty() {
        out.push_str(r#"<p class="info">No rows.</p></section>"#);
        return;
    }
    let _ = write!(
        out,
        "<p>Newest {} of {} rows.</p>",
        snapshot.records.len().min(TABLE_ROWS),
        snapshot.records.len()
    );
    out.push_str(
        "<table><thead><tr><th>Date</th><th>Region</th><th>Product</th><th>Qty</th><th>Total</th></tr></thead><tbody>",
    );
    for r in snapshot.records.iter().rev().take(TABLE_ROWS) {
        let _ = write!(
            out,
            r#"<tr><td>{}</td><td>{}</td><td>{}</td><td class="num">{}</td><td class="num">{}</td></tr>"#,
            r.date.format("%Y-%m-%d"),
            escape(r.region.as_deref().unwrap_or("-")),
            escape(r.product.as_deref().unwrap_or("-")),
            r.quantity.map(thousands).unwrap_or_else(|| "-".into()),
            rupiah(r.amount)
        );
    }
    out.push_str("</tbody></table></section>");
}

fn render_risk(out: &mut String, snapshot: &Snapshot, panel: &RiskPanel) {
    out.push_str("<aside><h2>Customer risk check</h2>");
    let model = match &snapshot.risk {
        RiskState::Ready(model) => model,
        RiskState::Unavailable(reason) => {
            let _ = write!(out, r#"<p class="info">{}</p></aside>"#, escape(reason));
            return;
        }
    };

    let input = match panel {
        RiskPanel::Form(input) | RiskPanel::Result(input, _) | RiskPanel::Error(input, _) => input,
    };
    let _ = write!(
        out,
        r#"<form method="get" action="/risk">
<label>Income / amount (Rp)<input type="number" name="amount" min="0" step="any" value="{}"></label>
<label>Dependents<input type="number" name="dependents" min="0" step="1" value="{}"></label>
<label>Credit limit (Rp)<input type="number" name="credit_limit" min="0" step="any" value="{}"></label>
<p><button type="submit">Check risk</button></p>
</form>"#,
        input.amount, input.dependents, input.credit_limit
    );

    match panel {
        RiskPanel::Form(_) => {}
        RiskPanel::Result(_, assessment) => {
            let class = match assessment.status {
                crate::models::RiskStatus::Current => "ok",
                crate::models::RiskStatus::Delinquent => "bad",
            };
            let _ = write!(
                out,
                r#"<p>Prediction: <span class="{}">{}</span></p><p>Confidence: {}</p>"#,
                class,
                assessment.status.display_name(),
                percent(assessment.confidence)
            );
        }
        RiskPanel::Error(_, message) => {
            let _ = write!(out, r#"<p class="warning">{}</p>"#, escape(message));
        }
    }
    let _ = write!(
        out,
        r#"<p class="delta">Trained on {} customers ({} current, {} delinquent). Indicative only.</p></aside>"#,
        model.training_rows, model.current_examples, model.delinquent_examples
    );
}

/// Render the whole dashboard page
pub fn render_page(snapshot: &Snapshot, table: &str, panel: &RiskPanel) -> String {
    let mut out = String::with_capacity(64 * 1024);
    let _ = write!(
        out,
        r#"<!DOCTYPE html><html lang="en"><head><meta charset="utf-8"><title>Sales Forecasting Dashboard</title><style>{}</style></head><body>"#,
        STYLE
    );
    let _ = write!(
        out,
        r#"<header><h1>Sales Forecasting Dashboard</h1><form method="post" action="/refresh"><button type="submit">Refresh data</button></form></header>"#
    );
    out.push_str("<main><div>");

    for warning in &snapshot.warnings {
        let _ = write!(out, r#"<div class="warning">{}</div>"#, escape(warning));
    }
    match snapshot.origin {
        DataOrigin::Live => {}
        DataOrigin::Sample => out.push_str(
            r#"<div class="info">Live data unavailable, the figures below are sample data.</div>"#,
        ),
        DataOrigin::Empty => {
            let _ = write!(
                out,
                r#"<div class="info">Waiting for data. Make sure table '{}' has rows.</div>"#,
                escape(table)
            );
        }
    }

    render_cards(&mut out, snapshot);
    render_charts(&mut out, snapshot);
    render_table(&mut out, snapshot);
    out.push_str("</div>");

    render_risk(&mut out, snapshot, panel);

    let _ = write!(
        out,
        "</main><footer><p>Updated: {}</p></footer></body></html>",
        snapshot.fetched_at.format("%d/%m/%Y %H:%M:%S UTC")
    );
    out
}
