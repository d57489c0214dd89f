//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - zero axis: `-` line
//! - one bar per earnings event: `|` body, `o` tip, positioned by date

use chrono::Datelike;

use crate::domain::FeatureRow;

/// Render the realized per-event moves as a bar chart.
///
/// Rows are expected sorted ascending by date (the dataset invariant).
pub fn render_ascii_plot(rows: &[FeatureRow], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    if rows.is_empty() {
        return "(no events to plot)\n".to_string();
    }

    let x_min = day_number(rows[0].date);
    let x_max = day_number(rows[rows.len() - 1].date);

    // The zero axis is always visible, even for one-sided histories.
    let (y_min_raw, y_max_raw) = rows.iter().fold((0.0_f64, 0.0_f64), |(lo, hi), r| {
        (lo.min(r.change_pct), hi.max(r.change_pct))
    });
    let (y_min, y_max) = pad_range(y_min_raw, y_max_raw, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Axis first; bars overwrite it where they cross.
    let zero_row = map_y(0.0, y_min, y_max, height);
    for cell in &mut grid[zero_row] {
        *cell = '-';
    }

    for row in rows {
        let x = map_x(day_number(row.date), x_min, x_max, width);
        let tip = map_y(row.change_pct, y_min, y_max, height);

        let (top, bottom) = if tip <= zero_row { (tip, zero_row) } else { (zero_row, tip) };
        for y in top..=bottom {
            grid[y][x] = '|';
        }
        grid[tip][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: events=[{}, {}] | change=[{y_min:.2}, {y_max:.2}]%\n",
        rows[0].date,
        rows[rows.len() - 1].date
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn day_number(date: chrono::NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = if t_max > t_min {
        ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0)
    } else {
        0.5
    };
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(y: i32, m: u32, d: u32, change_pct: f64) -> FeatureRow {
        FeatureRow {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            change_pct,
            eps: 1.0,
            vix_level: 20.0,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let rows = vec![
            row(2024, 1, 3, 10.0),
            row(2024, 2, 3, -5.0),
        ];

        let txt = render_ascii_plot(&rows, 11, 7);
        let expected = concat!(
            "Plot: events=[2024-01-03, 2024-02-03] | change=[-5.75, 10.75]%\n",
            "o          \n",
            "|          \n",
            "|          \n",
            "|          \n",
            "|---------|\n",
            "          |\n",
            "          o\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn single_event_lands_in_the_middle_column() {
        let txt = render_ascii_plot(&[row(2024, 1, 3, 4.0)], 11, 5);
        // 11 columns -> center column 5; the tip row is the top.
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[1].find('o'), Some(5));
    }

    #[test]
    fn empty_dataset_has_a_placeholder() {
        assert_eq!(render_ascii_plot(&[], 40, 10), "(no events to plot)\n");
    }
}
