//! Graphical report: SVG charts plus an HTML page embedding them
//!
//! Charts are rendered with plotters' SVG backend. Strategies without data
//! are omitted from every chart.

use crate::derive::{metric_values, percent_change, summarize, Metric, StrategySummary};
use crate::record::{DerivedRecord, Strategy};
use anyhow::{Context, Result};
use plotters::prelude::*;
use std::fmt::Write;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

const CHART_SIZE: (u32, u32) = (560, 360);
const FONT: &str = "sans-serif";

/// Colour of each strategy across all charts
pub fn strategy_color(strategy: Strategy) -> RGBColor {
    match strategy {
        Strategy::Baseline => RGBColor(0x7f, 0xb3, 0xd5),
        Strategy::Parallel => RGBColor(0xe7, 0x4c, 0x3c),
        Strategy::Tia => RGBColor(0x27, 0xae, 0x60),
    }
}

/// `#rrggbb` form of a colour, for the HTML page
fn css_color(color: RGBColor) -> String {
    format!("#{:02x}{:02x}{:02x}", color.0, color.1, color.2)
}

/// A rendered chart and the file it is saved as
#[derive(Debug, Clone)]
pub struct Chart {
    pub file_name: String,
    pub title: String,
    pub svg: String,
}

/// Escape HTML special characters to prevent XSS
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Value range padded so extreme points are not drawn on the frame
fn padded_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    (lo - pad)..(hi + pad)
}

fn format_tick(value: f64) -> String {
    if value.abs() >= 100.0 {
        format!("{:.0}", value)
    } else if value.abs() >= 1.0 {
        format!("{:.1}", value)
    } else {
        format!("{:.3}", value)
    }
}

/// Label of the category drawn at integer position `x`; blank elsewhere
fn category_at(labels: &[&str], x: f64) -> String {
    let i = x.round();
    if (x - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    labels
        .get(i as usize)
        .map(|l| l.to_string())
        .unwrap_or_default()
}

fn chart_stem(metric: Metric) -> &'static str {
    match metric {
        Metric::WallTime => "tempo",
        Metric::CpuPercent => "cpu",
        Metric::Edp => "edp",
        Metric::Energy => "energia",
        Metric::CpuTotal => "cpu_total",
        Metric::MemoryMb => "memoria",
        _ => "metrica",
    }
}

/// Box plot of one metric per strategy
///
/// With `log_scale` values are plotted as log10 and non-positive values are
/// dropped.
pub fn box_plot(
    records: &[DerivedRecord],
    metric: Metric,
    log_scale: bool,
) -> Result<Option<Chart>> {
    let project = |v: f64| if log_scale { v.log10() } else { v };
    let groups: Vec<(Strategy, Vec<f64>)> = Strategy::ALL
        .iter()
        .map(|&s| {
            let values = metric_values(records, s, metric)
                .into_iter()
                .filter(|v| !log_scale || *v > 0.0)
                .map(project)
                .collect::<Vec<_>>();
            (s, values)
        })
        .filter(|(_, values)| !values.is_empty())
        .collect();

    if groups.is_empty() {
        return Ok(None);
    }

    let quartiles: Vec<Quartiles> = groups.iter().map(|(_, v)| Quartiles::new(&v[..])).collect();
    let labels: Vec<String> = groups
        .iter()
        .map(|(s, v)| format!("{} (n={})", s.label(), v.len()))
        .collect();
    let range = padded_range(
        groups
            .iter()
            .flat_map(|(_, v)| v.iter().copied())
            .chain(quartiles.iter().flat_map(|q| q.values().map(f64::from))),
    );

    let title = if log_scale {
        format!("{} by strategy (log scale)", metric.label())
    } else {
        format!("{} by strategy", metric.label())
    };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&title, (FONT, 16))
            .margin(12)
            .x_label_area_size(32)
            .y_label_area_size(64)
            .build_cartesian_2d(
                labels[..].into_segmented(),
                (range.start as f32)..(range.end as f32),
            )?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len())
            .x_label_formatter(&|v| match v {
                SegmentValue::Exact(l) | SegmentValue::CenterOf(l) => l.to_string(),
                SegmentValue::Last => String::new(),
            })
            .y_desc(metric.label())
            .y_label_formatter(&|y| {
                let y = f64::from(*y);
                format_tick(if log_scale { 10f64.powf(y) } else { y })
            })
            .draw()?;

        for (((strategy, values), q), label) in groups.iter().zip(&quartiles).zip(&labels) {
            let color = strategy_color(*strategy);
            chart.draw_series(std::iter::once(
                Boxplot::new_vertical(SegmentValue::CenterOf(label), q)
                    .width(40)
                    .whisker_width(0.5)
                    .style(color.stroke_width(2)),
            ))?;
            chart.draw_series(values.iter().map(|v| {
                Circle::new(
                    (SegmentValue::CenterOf(label), *v as f32),
                    3,
                    color.mix(0.7).filled(),
                )
            }))?;
        }

        root.present()?;
    }

    Ok(Some(Chart {
        file_name: format!("{}_boxplot.svg", chart_stem(metric)),
        title,
        svg,
    }))
}

/// Energy against wall time, one colour per strategy
pub fn energy_time_scatter(records: &[DerivedRecord]) -> Result<Option<Chart>> {
    let points: Vec<(Strategy, f64, f64)> = records
        .iter()
        .filter_map(|r| {
            Some((
                r.strategy()?,
                Metric::WallTime.value(r)?,
                Metric::Energy.value(r)?,
            ))
        })
        .collect();

    if points.is_empty() {
        return Ok(None);
    }

    let x_range = padded_range(points.iter().map(|p| p.1));
    let y_range = padded_range(points.iter().map(|p| p.2));
    let title = "Energy vs. execution time".to_string();

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&title, (FONT, 16))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(64)
            .build_cartesian_2d(x_range, y_range)?;

        chart
            .configure_mesh()
            .x_desc(Metric::WallTime.label())
            .y_desc(Metric::Energy.label())
            .x_label_formatter(&|x| format_tick(*x))
            .y_label_formatter(&|y| format_tick(*y))
            .draw()?;

        for strategy in Strategy::ALL {
            let color = strategy_color(strategy);
            let series: Vec<(f64, f64)> = points
                .iter()
                .filter(|p| p.0 == strategy)
                .map(|p| (p.1, p.2))
                .collect();
            if series.is_empty() {
                continue;
            }
            chart
                .draw_series(series.into_iter().map(|c| Circle::new(c, 4, color.filled())))?
                .label(strategy.as_str())
                .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
    }

    Ok(Some(Chart {
        file_name: "energia_vs_tempo.svg".to_string(),
        title,
        svg,
    }))
}

/// Metrics compared in the reduction bar chart
pub const REDUCTION_METRICS: [Metric; 4] =
    [Metric::WallTime, Metric::CpuTotal, Metric::Energy, Metric::Edp];

/// One bar: group index, slot within the group, group size
struct Bar {
    group: usize,
    slot: usize,
    width: usize,
    strategy: Strategy,
    change: f64,
}

impl Bar {
    fn left(&self) -> f64 {
        let bar = 0.7 / self.width as f64;
        self.group as f64 - 0.35 + bar * self.slot as f64
    }

    fn right(&self) -> f64 {
        self.left() + 0.7 / self.width as f64
    }

    fn center(&self) -> f64 {
        (self.left() + self.right()) / 2.0
    }
}

/// Percent reduction of each strategy's mean against the baseline mean
pub fn reduction_bars(summaries: &[StrategySummary]) -> Result<Option<Chart>> {
    let Some(baseline) = summaries.iter().find(|s| s.strategy == Strategy::Baseline) else {
        return Ok(None);
    };

    let mut metrics: Vec<Metric> = Vec::new();
    let mut bars: Vec<Bar> = Vec::new();
    for metric in REDUCTION_METRICS {
        let Some(control) = baseline.metric(metric) else {
            continue;
        };
        let changes: Vec<(Strategy, f64)> = summaries
            .iter()
            .filter(|s| s.strategy != Strategy::Baseline)
            .filter_map(|s| {
                let change = percent_change(control.mean, s.metric(metric)?.mean)?;
                Some((s.strategy, change))
            })
            .collect();
        if changes.is_empty() {
            continue;
        }
        let group = metrics.len();
        metrics.push(metric);
        let width = changes.len();
        bars.extend(
            changes
                .into_iter()
                .enumerate()
                .map(|(slot, (strategy, change))| Bar {
                    group,
                    slot,
                    width,
                    strategy,
                    change,
                }),
        );
    }

    if bars.is_empty() {
        return Ok(None);
    }

    let labels: Vec<&str> = metrics.iter().map(|m| m.label()).collect();
    let y_range = padded_range(bars.iter().map(|b| b.change).chain([0.0]));
    let x_range = -0.5..(metrics.len() as f64 - 0.5);
    let title = "Reduction vs. baseline (%)".to_string();

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&title, (FONT, 16))
            .margin(12)
            .x_label_area_size(32)
            .y_label_area_size(64)
            .build_cartesian_2d(x_range.clone(), y_range)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(metrics.len())
            .x_label_formatter(&|x| category_at(&labels, *x))
            .y_desc("Reduction (%)")
            .y_label_formatter(&|y| format_tick(*y))
            .draw()?;

        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x_range.start, 0.0), (x_range.end, 0.0)],
            BLACK,
        )))?;

        for strategy in Strategy::ALL {
            let color = strategy_color(strategy);
            let own: Vec<&Bar> = bars.iter().filter(|b| b.strategy == strategy).collect();
            if own.is_empty() {
                continue;
            }
            chart
                .draw_series(own.iter().map(|b| {
                    Rectangle::new(
                        [(b.left(), b.change.max(0.0)), (b.right(), b.change.min(0.0))],
                        color.filled(),
                    )
                }))?
                .label(strategy.as_str())
                .legend(move |(x, y)| Rectangle::new([(x - 5, y - 5), (x + 5, y + 5)], color.filled()));
        }

        chart.draw_series(bars.iter().map(|b| {
            Text::new(format!("{:.1}%", b.change), (b.center(), b.change), (FONT, 10))
        }))?;

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
    }

    Ok(Some(Chart {
        file_name: "comparacao_barras.svg".to_string(),
        title,
        svg,
    }))
}

/// HTML report formatter
#[derive(Debug)]
pub struct HtmlReport {
    charts: Vec<Chart>,
    summaries: Vec<StrategySummary>,
    notes: Vec<String>,
}

impl HtmlReport {
    /// Build every chart the records support
    pub fn build(records: &[DerivedRecord]) -> Result<Self> {
        let summaries = summarize(records);
        let charts: Vec<Chart> = [
            box_plot(records, Metric::WallTime, false)?,
            box_plot(records, Metric::CpuPercent, false)?,
            box_plot(records, Metric::Edp, true)?,
            box_plot(records, Metric::Energy, false)?,
            energy_time_scatter(records)?,
            reduction_bars(&summaries)?,
        ]
        .into_iter()
        .flatten()
        .collect();

        Ok(Self {
            charts,
            summaries,
            notes: Vec::new(),
        })
    }

    /// Free-text paragraph shown under the summary table
    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn charts(&self) -> &[Chart] {
        &self.charts
    }

    fn generate_styles() -> &'static str {
        r#"
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            margin: 20px;
            background-color: #f5f5f5;
        }
        h1, h2 {
            color: #333;
        }
        table {
            border-collapse: collapse;
            background-color: white;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
            margin-bottom: 20px;
        }
        th, td {
            border: 1px solid #ddd;
            padding: 6px 10px;
            text-align: right;
        }
        th {
            background-color: #4a90d9;
            color: white;
        }
        td.strategy {
            text-align: left;
            font-weight: bold;
        }
        .charts {
            display: flex;
            flex-wrap: wrap;
            gap: 16px;
        }
        .note {
            font-size: 0.9em;
            color: #666;
        }
        "#
    }

    fn render_summary_table(&self) -> String {
        let columns = [
            Metric::WallTime,
            Metric::CpuTotal,
            Metric::CpuPercent,
            Metric::MemoryMb,
            Metric::Energy,
            Metric::Edp,
        ];
        let mut html = String::new();
        html.push_str("    <table>\n        <tr><th>Strategy</th><th>n</th>");
        for metric in columns {
            let _ = write!(html, "<th>{}</th>", escape_html(metric.label()));
        }
        html.push_str("</tr>\n");

        for summary in &self.summaries {
            let _ = write!(
                html,
                r#"        <tr><td class="strategy" style="color: {}">{}</td><td>{}</td>"#,
                css_color(strategy_color(summary.strategy)),
                escape_html(summary.strategy.label()),
                summary.n
            );
            for metric in columns {
                match summary.metric(metric) {
                    Some(m) => {
                        let _ = write!(html, "<td>{:.2}</td>", m.mean);
                    }
                    None => html.push_str("<td></td>"),
                }
            }
            html.push_str("</tr>\n");
        }
        html.push_str("    </table>\n");
        html
    }

    /// Complete document; charts are inlined
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        html.push_str("    <meta charset=\"UTF-8\">\n");
        html.push_str("    <title>CI Strategy Comparison</title>\n");
        html.push_str("    <style>");
        html.push_str(Self::generate_styles());
        html.push_str("</style>\n</head>\n<body>\n");
        html.push_str("    <h1>CI Strategy Comparison</h1>\n");

        html.push_str("    <h2>Summary (means)</h2>\n");
        html.push_str(&self.render_summary_table());
        for note in &self.notes {
            let _ = writeln!(html, "    <p class=\"note\">{}</p>", escape_html(note));
        }

        html.push_str("    <h2>Charts</h2>\n    <div class=\"charts\">\n");
        for chart in &self.charts {
            html.push_str(&chart.svg);
            html.push('\n');
        }
        html.push_str("    </div>\n</body>\n</html>\n");
        html
    }

    /// Write every chart and `report.html` into `dir`
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

        let mut written = Vec::new();
        for chart in &self.charts {
            let path = dir.join(&chart.file_name);
            fs::write(&path, &chart.svg)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            written.push(path);
        }

        let path = dir.join("report.html");
        fs::write(&path, self.to_html())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);

        Ok(written)
    }
}
