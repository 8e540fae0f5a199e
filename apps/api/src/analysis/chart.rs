//! Match-vs-gap pie chart, rendered as a self-contained SVG string.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

const SIZE: f64 = 200.0;
const RADIUS: f64 = 90.0;
const MATCH_COLOR: &str = "#4CAF50";
const GAP_COLOR: &str = "#E0E0E0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    pub value: f64, // percent of the whole
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieChart {
    pub slices: Vec<PieSlice>,
    pub svg: String,
}

impl PieChart {
    /// Two slices: "Match" (the final score) and "Gap" (the rest of 100).
    pub fn for_score(final_score: u32) -> Self {
        let matched = f64::from(final_score.min(100));
        let slices = vec![
            PieSlice {
                label: "Match".to_string(),
                value: matched,
                color: MATCH_COLOR.to_string(),
            },
            PieSlice {
                label: "Gap".to_string(),
                value: 100.0 - matched,
                color: GAP_COLOR.to_string(),
            },
        ];
        let svg = render_svg(&slices);
        Self { slices, svg }
    }
}

fn render_svg(slices: &[PieSlice]) -> String {
    let center = SIZE / 2.0;
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{SIZE}" height="{SIZE}" viewBox="0 0 {SIZE} {SIZE}">"#
    );

    // Start at 12 o'clock, go clockwise.
    let mut start = -PI / 2.0;
    for slice in slices.iter().filter(|s| s.value > 0.0) {
        svg.push_str(&format!("<title>{}: {:.0}%</title>", slice.label, slice.value));
        if slice.value >= 100.0 {
            // A single arc cannot draw a full circle
            svg.push_str(&format!(
                r#"<circle cx="{center}" cy="{center}" r="{RADIUS}" fill="{}"/>"#,
                slice.color
            ));
            continue;
        }

        let sweep = slice.value / 100.0 * 2.0 * PI;
        let end = start + sweep;
        let (x1, y1) = point_on_circle(center, start);
        let (x2, y2) = point_on_circle(center, end);
        let large_arc = u8::from(sweep > PI);
        svg.push_str(&format!(
            r#"<path d="M {center} {center} L {x1:.3} {y1:.3} A {RADIUS} {RADIUS} 0 {large_arc} 1 {x2:.3} {y2:.3} Z" fill="{}"/>"#,
            slice.color
        ));
        start = end;
    }

    svg.push_str("</svg>");
    svg
}

fn point_on_circle(center: f64, angle: f64) -> (f64, f64) {
    (center + RADIUS * angle.cos(), center + RADIUS * angle.sin())
}
