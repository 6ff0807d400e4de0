//! # Tabular display for comparisons
//!
//! Borrowing renderers for [`ComparisonSummary`] and the per-node deltas of a
//! [`ComparisonResult`].
//!
//! - `format!("{summary}")` – one compact line (max/avg displacement, location of the maximum).
//! - `format!("{summary:#}")` – a `comfy-table` with max/avg per channel.
//! - `result.show()` – a display adaptor printing one row per grid node, with
//!   [`ComparisonDisplay::with_precision`] to control fixed-point digits.
//!
//! ```rust,ignore
//! println!("{:#}", result.summary);
//! println!("{}", result.show().with_precision(3));
//! ```

use std::fmt;

use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Row, Table};
use itertools::izip;

use super::{ComparisonResult, ComparisonSummary};

fn right(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

impl ComparisonSummary {
    fn render_comfy(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![Cell::new("Channel"), Cell::new("Max |Δ|"), Cell::new("Avg |Δ|")]);

        let rows = [
            ("North", self.max_north, self.avg_north),
            ("East", self.max_east, self.avg_east),
            ("TVD", self.max_tvd, self.avg_tvd),
            ("Horizontal", self.max_horizontal, self.avg_horizontal),
            ("Displacement", self.max_displacement, self.avg_displacement),
            ("Inclination [°]", self.max_inclination, self.avg_inclination),
            ("Azimuth [°]", self.max_azimuth, self.avg_azimuth),
        ];

        for (name, max, avg) in rows {
            table.add_row(Row::from(vec![
                Cell::new(name),
                right(format!("{max:.3}")),
                right(format!("{avg:.3}")),
            ]));
        }

        format!(
            "{table}\nMax displacement at depth {:.2} ({} points)",
            self.max_displacement_depth, self.point_count
        )
    }
}

impl fmt::Display for ComparisonSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{}", self.render_comfy())
        } else {
            write!(
                f,
                "ComparisonSummary(points={}, max_displacement={:.3} @ {:.2}, avg_displacement={:.3}, max_Δinc={:.3}°, max_Δazi={:.3}°)",
                self.point_count,
                self.max_displacement,
                self.max_displacement_depth,
                self.avg_displacement,
                self.max_inclination,
                self.max_azimuth
            )
        }
    }
}

/// Display adaptor over a [`ComparisonResult`], one row per grid node.
pub struct ComparisonDisplay<'a> {
    result: &'a ComparisonResult,
    precision: usize,
}

impl<'a> ComparisonDisplay<'a> {
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }
}

impl ComparisonResult {
    /// Borrowing per-node table of the deltas.
    pub fn show(&self) -> ComparisonDisplay<'_> {
        ComparisonDisplay {
            result: self,
            precision: 2,
        }
    }

    /// Per-channel max/avg table of the summary, same as `format!("{:#}", self.summary)`.
    pub fn summary_table(&self) -> String {
        self.summary.render_comfy()
    }
}

impl fmt::Display for ComparisonDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.result.deltas;
        let p = self.precision;

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Depth"),
            Cell::new("ΔN"),
            Cell::new("ΔE"),
            Cell::new("ΔTVD"),
            Cell::new("Horizontal"),
            Cell::new("Displacement"),
            Cell::new("ΔInc [°]"),
            Cell::new("ΔAzi [°]"),
        ]);

        for (depth, n, e, v, h, disp, inc, azi) in izip!(
            &self.result.depth,
            &d.north,
            &d.east,
            &d.tvd,
            &d.horizontal,
            &d.displacement,
            &d.inclination,
            &d.azimuth
        ) {
            table.add_row(Row::from(vec![
                right(format!("{depth:.p$}")),
                right(format!("{n:.p$}")),
                right(format!("{e:.p$}")),
                right(format!("{v:.p$}")),
                right(format!("{h:.p$}")),
                right(format!("{disp:.p$}")),
                right(format!("{inc:.p$}")),
                right(format!("{azi:.p$}")),
            ]));
        }

        write!(f, "{table}")
    }
}
