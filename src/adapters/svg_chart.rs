//! SVG rendering of the price vs. rank diagnostic.
//!
//! Two stacked panels share the bar index as x axis: closing price on top,
//! signed rank (fixed -100..100 range, zero line marked) below.

use std::fs;
use std::path::Path;

use crate::domain::bias_model::DiagnosticRow;
use crate::domain::error::BiasError;
use crate::ports::chart_port::ChartPort;

const WIDTH: f64 = 800.0;
const PANEL_HEIGHT: f64 = 220.0;
const PADDING: f64 = 40.0;
const RANK_MIN: f64 = -100.0;
const RANK_MAX: f64 = 100.0;

pub struct SvgChartAdapter;

impl ChartPort for SvgChartAdapter {
    fn write(
        &self,
        rows: &[DiagnosticRow],
        title: &str,
        output_path: &Path,
    ) -> Result<(), BiasError> {
        if rows.is_empty() {
            return Err(BiasError::Chart {
                reason: "no rows to plot".to_string(),
            });
        }
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, format_diagnostic_chart(rows, title))?;
        Ok(())
    }
}

struct Panel {
    top: f64,
    min: f64,
    max: f64,
}

impl Panel {
    fn plot_width() -> f64 {
        WIDTH - 2.0 * PADDING
    }

    fn plot_height() -> f64 {
        PANEL_HEIGHT - 2.0 * PADDING
    }

    fn y(&self, value: f64) -> f64 {
        let range = self.max - self.min;
        let scale = if range > 0.0 {
            Self::plot_height() / range
        } else {
            1.0
        };
        self.top + PANEL_HEIGHT - PADDING - (value - self.min) * scale
    }

    fn polyline(&self, values: &[f64], color: &str) -> String {
        let scale_x = if values.len() > 1 {
            Self::plot_width() / (values.len() - 1) as f64
        } else {
            0.0
        };
        let points: Vec<String> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| format!("{:.1},{:.1}", PADDING + i as f64 * scale_x, self.y(v)))
            .collect();
        format!(
            r#"<polyline fill="none" stroke="{}" stroke-width="1" points="{}"/>"#,
            color,
            points.join(" ")
        )
    }

    fn frame(&self, label: &str) -> String {
        let left = PADDING;
        let right = WIDTH - PADDING;
        let top = self.top + PADDING;
        let bottom = self.top + PANEL_HEIGHT - PADDING;
        format!(
            concat!(
                r##"<rect x="{:.0}" y="{:.0}" width="{:.0}" height="{:.0}" fill="none" stroke="#999"/>"##,
                "\n",
                r#"<text x="{:.0}" y="{:.0}" font-size="12">{}</text>"#,
                "\n",
                r#"<text x="{:.0}" y="{:.0}" font-size="10" text-anchor="end">{:.2}</text>"#,
                "\n",
                r#"<text x="{:.0}" y="{:.0}" font-size="10" text-anchor="end">{:.2}</text>"#,
            ),
            left,
            top,
            right - left,
            bottom - top,
            left,
            top - 6.0,
            label,
            left - 4.0,
            top + 4.0,
            self.max,
            left - 4.0,
            bottom,
            self.min,
        )
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn format_diagnostic_chart(rows: &[DiagnosticRow], title: &str) -> String {
    let closes: Vec<f64> = rows.iter().map(|r| r.close).collect();
    let ranks: Vec<f64> = rows.iter().map(|r| r.rank).collect();

    let price = Panel {
        top: PADDING,
        min: closes.iter().copied().fold(f64::INFINITY, f64::min),
        max: closes.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    };
    let rank = Panel {
        top: PADDING + PANEL_HEIGHT,
        min: RANK_MIN,
        max: RANK_MAX,
    };

    let zero_y = rank.y(0.0);
    let height = 2.0 * PANEL_HEIGHT + 2.0 * PADDING;

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">
<rect width="100%" height="100%" fill="white"/>
<text x="{cx:.0}" y="24" font-size="14" text-anchor="middle">{title}</text>
{price_frame}
{price_line}
{rank_frame}
<line x1="{x0:.0}" y1="{zy:.1}" x2="{x1:.0}" y2="{zy:.1}" stroke="#bbb" stroke-dasharray="4 3"/>
{rank_line}
</svg>
"##,
        w = WIDTH,
        h = height,
        cx = WIDTH / 2.0,
        title = escape(title),
        price_frame = price.frame("close"),
        price_line = price.polyline(&closes, "#1f77b4"),
        rank_frame = rank.frame("rank"),
        x0 = PADDING,
        x1 = WIDTH - PADDING,
        zy = zero_y,
        rank_line = rank.polyline(&ranks, "#d62728"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn row(day: u32, close: f64, rank: f64) -> DiagnosticRow {
        DiagnosticRow {
            time: NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            close,
            bias: rank / 100.0,
            rank,
        }
    }

    #[test]
    fn chart_has_two_panels() {
        let rows = vec![row(1, 10.0, -50.0), row(2, 11.0, 20.0), row(3, 12.0, 80.0)];
        let svg = format_diagnostic_chart(&rows, "000001 1d BIAS(3,15)");

        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains(">close<"));
        assert!(svg.contains(">rank<"));
        assert!(svg.contains("000001 1d BIAS(3,15)"));
    }

    #[test]
    fn rank_panel_zero_line_is_centered() {
        let rows = vec![row(1, 10.0, 0.0), row(2, 10.0, 0.0)];
        let svg = format_diagnostic_chart(&rows, "t");

        // rank panel spans 300..440, zero sits halfway
        assert!(svg.contains(r#"y1="370.0""#));
    }

    #[test]
    fn flat_price_does_not_divide_by_zero() {
        let rows = vec![row(1, 10.0, 5.0)];
        let svg = format_diagnostic_chart(&rows, "t");
        assert!(!svg.contains("NaN"));
        assert!(!svg.contains("inf"));
    }

    #[test]
    fn title_is_escaped() {
        let rows = vec![row(1, 10.0, 5.0)];
        let svg = format_diagnostic_chart(&rows, "A&B <1m>");
        assert!(svg.contains("A&amp;B &lt;1m&gt;"));
    }

    #[test]
    fn write_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plots").join("bias.svg");
        let rows = vec![row(1, 10.0, 5.0), row(2, 11.0, -5.0)];

        SvgChartAdapter.write(&rows, "t", &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("<polyline"));
    }

    #[test]
    fn write_rejects_empty_rows() {
        let dir = TempDir::new().unwrap();
        let result = SvgChartAdapter.write(&[], "t", &dir.path().join("x.svg"));
        assert!(matches!(result, Err(BiasError::Chart { .. })));
    }
}
