//! Inline SVG charts rendered with plotters

use plotters::element::Pie;
use plotters::prelude::*;

use super::format::compact;
use crate::error::{DashboardError, Result};
use crate::forecast::Forecast;
use crate::models::{CategoryAggregate, MonthlyAggregate};

const WIDTH: u32 = 760;
const HEIGHT: u32 = 380;

const BAR_COLOR: RGBColor = RGBColor(51, 102, 204);
const TREND_COLOR: RGBColor = RGBColor(220, 57, 18);
const PALETTE: [RGBColor; 8] = [
    RGBColor(51, 102, 204),
    RGBColor(255, 153, 0),
    RGBColor(16, 150, 24),
    RGBColor(153, 0, 153),
    RGBColor(0, 153, 198),
    RGBColor(221, 68, 119),
    RGBColor(102, 170, 0),
    RGBColor(184, 46, 46),
];

fn render_err<E: std::fmt::Display>(e: E) -> DashboardError {
    DashboardError::Render(e.to_string())
}

fn value_range<I: Iterator<Item = f64>>(values: I) -> (f64, f64) {
    let (lo, hi) = values.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let top = if hi > 0.0 { hi * 1.1 } else { 1.0 };
    let bottom = if lo < 0.0 { lo * 1.1 } else { 0.0 };
    (bottom, top)
}

/// Monthly totals as bars with the fitted trend as a dashed-looking line
pub fn monthly_trend_chart(monthly: &[MonthlyAggregate], forecast: Option<&Forecast>) -> Result<String> {
    if monthly.is_empty() {
        return Err(DashboardError::Render("no monthly data".into()));
    }

    let labels: Vec<String> = monthly.iter().map(|m| m.month.label()).collect();
    let trend: Vec<f64> = forecast
        .map(|f| f.points.iter().map(|p| p.trend).collect())
        .unwrap_or_default();
    let (y_min, y_max) = value_range(
        monthly
            .iter()
            .map(|m| m.total_amount)
            .chain(trend.iter().copied()),
    );

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Monthly sales and trend", ("sans-serif", 20))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d((0..monthly.len()).into_segmented(), y_min..y_max)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(monthly.len())
            .x_label_formatter(&|x| match x {
                SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .y_label_formatter(&|y| compact(*y))
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(BAR_COLOR.filled())
                    .margin(10)
                    .data(monthly.iter().enumerate().map(|(i, m)| (i, m.total_amount))),
            )
            .map_err(render_err)?
            .label("Sales")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], BAR_COLOR.filled()));

        if !trend.is_empty() {
            chart
                .draw_series(LineSeries::new(
                    trend
                        .iter()
                        .enumerate()
                        .map(|(i, v)| (SegmentValue::CenterOf(i), *v)),
                    TREND_COLOR.stroke_width(3),
                ))
                .map_err(render_err)?
                .label("Trend")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], TREND_COLOR.stroke_width(3)));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

/// Vertical bars for a category breakdown, largest first, at most `limit`
pub fn category_bar_chart(title: &str, categories: &[CategoryAggregate], limit: usize) -> Result<String> {
    let shown: Vec<&CategoryAggregate> = categories.iter().take(limit.max(1)).collect();
    if shown.is_empty() {
        return Err(DashboardError::Render("no categories".into()));
    }
    let labels: Vec<String> = shown.iter().map(|c| c.label.clone()).collect();
    let (y_min, y_max) = value_range(shown.iter().map(|c| c.total_amount));

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 20))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d((0..shown.len()).into_segmented(), y_min..y_max)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(shown.len())
            .x_label_formatter(&|x| match x {
                SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .y_label_formatter(&|y| compact(*y))
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(PALETTE[1].filled())
                    .margin(14)
                    .data(shown.iter().enumerate().map(|(i, c)| (i, c.total_amount))),
            )
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

/// Donut of each category's share of total sales
pub fn share_donut_chart(title: &str, categories: &[CategoryAggregate]) -> Result<String> {
    let slices: Vec<&CategoryAggregate> = categories.iter().filter(|c| c.total_amount > 0.0).collect();
    if slices.is_empty() {
        return Err(DashboardError::Render("no positive totals to share".into()));
    }

    let sizes: Vec<f64> = slices.iter().map(|c| c.total_amount).collect();
    let labels: Vec<String> = slices.iter().map(|c| c.label.clone()).collect();
    let colors: Vec<RGBColor> = (0..slices.len()).map(|i| PALETTE[i % PALETTE.len()]).collect();

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        let area = root.titled(title, ("sans-serif", 20)).map_err(render_err)?;

        let (w, h) = area.dim_in_pixel();
        let center = (w as i32 / 2, h as i32 / 2);
        let radius = f64::from(h.min(w)) * 0.36;

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(-90.0);
        pie.donut_hole(radius * 0.55);
        pie.label_style(("sans-serif", 14).into_font().color(&BLACK));
        pie.percentages(("sans-serif", 12).into_font().color(&WHITE));
        area.draw(&pie).map_err(render_err)?;

        root.present().map_err(render_err)?;
    }
    Ok(svg)
}
