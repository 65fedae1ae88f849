//! Geometry for the yearly activity graph: grid lines, the cubic-Bezier
//! contribution path, dot markers and axis labels.

use std::fmt::Write;

const X_START: f64 = 60.0;
const X_END: f64 = 800.0;
const TOP: f64 = 80.0;
const BOTTOM: f64 = 350.0;
const GRID_COUNT: usize = 5;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Map a contribution value to an SVG Y coordinate within the chart bounds.
fn map_y(value: f64, max: f64) -> f64 {
    BOTTOM - (value / max) * (BOTTOM - TOP)
}

/// Cubic Bezier path through the given points, with control points at the
/// horizontal midpoint of each segment.
pub fn bezier_path(points: &[(f64, f64)]) -> String {
    let Some(((first_x, first_y), rest)) = points.split_first() else {
        return String::new();
    };
    let mut d = format!("M{first_x},{first_y}");
    let mut prev = (*first_x, *first_y);
    for &(x, y) in rest {
        let cx = (prev.0 + x) / 2.0;
        let _ = write!(d, "C{cx},{},{cx},{y},{x},{y}", prev.1);
        prev = (x, y);
    }
    d
}

/// Substitute all graph placeholders into the activity template.
pub fn render(template: &str, year: i32, slots: &[Option<u64>]) -> String {
    let step = (X_END - X_START) / (slots.len().saturating_sub(1).max(1)) as f64;
    let max_value = slots
        .iter()
        .flatten()
        .copied()
        .max()
        .unwrap_or(1)
        .max(1) as f64;

    let mut grid_h = String::new();
    for i in 0..=GRID_COUNT {
        let y = TOP + i as f64 * (BOTTOM - TOP) / GRID_COUNT as f64;
        let _ = writeln!(
            grid_h,
            r#"<line x1="{X_START}" x2="{X_END}" y1="{y}" y2="{y}" class="grid-h"/>"#
        );
    }

    let mut grid_v = String::new();
    for i in 0..slots.len() {
        let x = X_START + i as f64 * step;
        let class = if i % 4 == 0 { "grid-month" } else { "grid-week" };
        let _ = writeln!(
            grid_v,
            r#"<line x1="{x}" y1="{TOP}" x2="{x}" y2="{BOTTOM}" class="{class}"/>"#
        );
    }

    let points: Vec<(f64, f64)> = slots
        .iter()
        .enumerate()
        .filter_map(|(i, slot)| {
            slot.map(|value| (X_START + i as f64 * step, map_y(value as f64, max_value)))
        })
        .collect();
    let path = bezier_path(&points);

    let mut week_dots = String::new();
    let mut main_dots = String::new();
    for (i, slot) in slots.iter().enumerate() {
        let Some(value) = slot else {
            continue;
        };
        let x = X_START + i as f64 * step;
        let y = map_y(*value as f64, max_value);
        let x_end = x + 0.01;
        let _ = writeln!(
            week_dots,
            r#"<line x1="{x}" y1="{y}" x2="{x_end}" y2="{y}" class="ct-point-week"/>"#
        );
        if *value > 0 {
            let _ = writeln!(
                main_dots,
                r#"<line x1="{x}" y1="{y}" x2="{x_end}" y2="{y}" class="ct-point-main"/>"#
            );
        }
    }

    let mut month_labels = String::new();
    for (i, label) in MONTH_LABELS.iter().enumerate() {
        let x = X_START + (i as f64 * 4.0 + 2.0) * step;
        let _ = writeln!(
            month_labels,
            r#"<text x="{x}" y="372" text-anchor="middle" class="ct-label">{label}</text>"#
        );
    }

    let mut y_labels = String::new();
    for i in 0..=GRID_COUNT {
        let value = (max_value * (GRID_COUNT - i) as f64 / GRID_COUNT as f64) as u64;
        let y = TOP + i as f64 * (BOTTOM - TOP) / GRID_COUNT as f64 + 4.0;
        let _ = writeln!(
            y_labels,
            r#"<text x="{}" y="{y}" text-anchor="end" class="ct-label">{value}</text>"#,
            X_START - 10.0
        );
    }

    template
        .replace("{{ TITLE }}", &format!("Contribution Activity ({year})"))
        .replace("{{ GRID_H }}", &grid_h)
        .replace("{{ GRID_V }}", &grid_v)
        .replace("{{ PATH }}", &path)
        .replace("{{ WEEK_DOTS }}", &week_dots)
        .replace("{{ MAIN_DOTS }}", &main_dots)
        .replace("{{ MONTH_LABELS }}", &month_labels)
        .replace("{{ Y_LABELS }}", &y_labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bezier_path_of_nothing_is_empty() {
        assert_eq!(bezier_path(&[]), "");
    }

    #[test]
    fn bezier_path_moves_then_curves() {
        let d = bezier_path(&[(0.0, 10.0), (10.0, 20.0)]);
        assert_eq!(d, "M0,10C5,10,5,20,10,20");
    }

    #[test]
    fn map_y_spans_chart_bounds() {
        assert_eq!(map_y(0.0, 10.0), BOTTOM);
        assert_eq!(map_y(10.0, 10.0), TOP);
    }

    #[test]
    fn render_replaces_every_placeholder() {
        let template = "{{ TITLE }}|{{ GRID_H }}|{{ GRID_V }}|{{ PATH }}|{{ WEEK_DOTS }}|{{ MAIN_DOTS }}|{{ MONTH_LABELS }}|{{ Y_LABELS }}";
        let slots: Vec<Option<u64>> = (0..48).map(|i| (i < 8).then_some(i as u64)).collect();
        let svg = render(template, 2024, &slots);
        assert!(!svg.contains("{{"));
        assert!(svg.contains("Contribution Activity (2024)"));
        assert!(svg.contains("ct-point-week"));
        // Slot 0 has value 0: a week dot but no main dot is drawn for it.
        assert!(svg.matches("ct-point-week").count() > svg.matches("ct-point-main").count());
    }

    #[test]
    fn render_with_no_data_still_produces_grid() {
        let slots = vec![None; 48];
        let svg = render("{{ GRID_H }}{{ PATH }}", 2024, &slots);
        assert!(svg.contains("grid-h"));
    }
}
