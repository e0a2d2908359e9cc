//! # Tabular rendering of results
//!
//! `Display` implementations rendering the outputs of a run as UTF-8 tables with
//! [`comfy-table`]:
//!
//! * [`PValueMatrix`] – condition × condition, 4 decimals, `—` on the diagonal.
//! * [`AnovaOutcome`] – the Tukey table (`group1, group2, meandiff, p-adj, lower,
//!   upper, reject`, values rounded to 4 decimals) or the single
//!   `p-value, Significance` row.
//! * [`ConditionSummary`] – `x, mean, SEM, n` per point.
//! * [`TrackTable`] – one line per row with every derived column filled so far;
//!   per-track scalars (average speed, persistence per lag) on the first row.
//! * [`CellMetricsTable`] – the per-cell metric records.
//!
//! Undefined values are printed as `NaN`, matching what spreadsheet exports show.
//!
//! [`comfy-table`]: https://crates.io/crates/comfy-table
use std::fmt;

use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Row, Table};
use nalgebra::Vector2;

use crate::aggregation::ConditionSummary;
use crate::statistics::anova::AnovaOutcome;
use crate::statistics::metrics::CellMetricRecord;
use crate::statistics::pairwise::{round_to, PValueMatrix};
use crate::track::{DerivedColumns, TrackTable};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

#[inline]
fn num(v: f64, decimals: usize) -> Cell {
    Cell::new(format!("{v:.decimals$}")).set_alignment(CellAlignment::Right)
}

#[inline]
fn opt(v: Option<f64>, decimals: usize) -> Cell {
    match v {
        Some(v) => num(v, decimals),
        None => Cell::new("NaN").set_alignment(CellAlignment::Right),
    }
}

impl fmt::Display for PValueMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut table = new_table();
        let mut header = vec![Cell::new("")];
        header.extend(self.labels.iter().map(Cell::new));
        table.set_header(header);

        for (label, row) in self.labels.iter().zip(&self.values) {
            let mut cells = vec![Cell::new(label)];
            cells.extend(row.iter().map(|p| match p {
                Some(p) => num(*p, 4),
                None => Cell::new("—").set_alignment(CellAlignment::Center),
            }));
            table.add_row(Row::from(cells));
        }
        write!(f, "{table}")
    }
}

impl fmt::Display for AnovaOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut table = new_table();
        match self {
            AnovaOutcome::Significant { tukey, .. } => {
                table.set_header(vec![
                    "group1", "group2", "meandiff", "p-adj", "lower", "upper", "reject",
                ]);
                for r in tukey {
                    table.add_row(Row::from(vec![
                        Cell::new(&r.group1),
                        Cell::new(&r.group2),
                        num(round_to(r.meandiff, 4), 4),
                        num(round_to(r.p_adj, 4), 4),
                        num(round_to(r.lower, 4), 4),
                        num(round_to(r.upper, 4), 4),
                        Cell::new(if r.reject { "True" } else { "False" }),
                    ]));
                }
            }
            AnovaOutcome::NotSignificant { anova } => {
                table.set_header(vec!["p-value", "Significance"]);
                table.add_row(Row::from(vec![
                    num(anova.p_value, 4),
                    Cell::new("Not Significant"),
                ]));
            }
        }
        write!(f, "{table}")
    }
}

impl fmt::Display for ConditionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut table = new_table();
        table.set_header(vec![
            Cell::new(self.x_label),
            Cell::new(format!("{} (mean)", self.y_label)),
            Cell::new("SEM"),
            Cell::new("n"),
        ]);
        for p in &self.points {
            table.add_row(Row::from(vec![
                num(p.x, 3),
                opt(p.stats.map(|s| s.mean), 6),
                opt(p.stats.and_then(|s| s.sem), 6),
                Cell::new(p.stats.map_or(0, |s| s.n)).set_alignment(CellAlignment::Right),
            ]));
        }
        writeln!(f, "{}", self.label)?;
        write!(f, "{table}")
    }
}

impl fmt::Display for TrackTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut table = new_table();

        // Only columns that at least one track carries are shown.
        let any = |pred: fn(&DerivedColumns) -> bool| {
            self.tracks().iter().any(|t| pred(t.columns()))
        };
        let show_disp = any(|c| c.displacement.is_some());
        let show_mag = any(|c| c.magnitude.is_some());
        let show_dir = any(|c| c.direction.is_some());
        let show_time = any(|c| c.time.is_some());
        let show_path = any(|c| c.cumulative_distance.is_some());
        let show_speed = any(|c| c.instant_speed.is_some());
        let show_msd = any(|c| c.msd.is_some());
        let show_ratio = any(|c| c.dir_ratio.is_some());
        let show_avg_speed = any(|c| c.average_speed.is_some());

        // persistence lags, labelled by their time lag
        let persistence = self
            .tracks()
            .iter()
            .filter_map(|t| t.columns().persistence.as_ref())
            .max_by_key(|p| p.values.len());
        let n_lags = persistence.map_or(0, |p| p.values.len());

        let mut header: Vec<String> =
            ["Track n", "Slice n", "X", "Y"].map(String::from).to_vec();
        let mut push = |names: &[&str], on: bool| {
            if on {
                header.extend(names.iter().map(|n| n.to_string()));
            }
        };
        push(&["dx", "dy"], show_disp);
        push(&["distance_bw_points"], show_mag);
        push(&["cos_theta", "sin_theta"], show_dir);
        push(&["time"], show_time);
        push(&["distance_to_start", "cumulative_distance"], show_path);
        push(&["instant_speed"], show_speed);
        push(&["msd_by_lag"], show_msd);
        push(&["dir_ratio"], show_ratio);
        push(&["avg_speed_by_cell"], show_avg_speed);
        if let Some(p) = persistence {
            header.extend(
                (1..=n_lags).map(|lag| format!("scalar_time_{}", lag as f64 * p.time_interval)),
            );
        }
        table.set_header(header);

        for track in self.tracks() {
            let c = track.columns();
            let vec_at = |col: &Option<Vec<Option<Vector2<f64>>>>, i: usize| {
                col.as_ref().and_then(|v| v.get(i).copied().flatten())
            };
            let opt_at = |col: &Option<Vec<Option<f64>>>, i: usize| {
                col.as_ref().and_then(|v| v.get(i).copied().flatten())
            };

            for (i, p) in track.points().iter().enumerate() {
                let mut cells = vec![
                    Cell::new(track.id()).set_alignment(CellAlignment::Right),
                    Cell::new(p.slice_index).set_alignment(CellAlignment::Right),
                    opt(p.x, 3),
                    opt(p.y, 3),
                ];
                if show_disp {
                    let d = vec_at(&c.displacement, i);
                    cells.push(opt(d.map(|v| v.x), 4));
                    cells.push(opt(d.map(|v| v.y), 4));
                }
                if show_mag {
                    cells.push(opt(opt_at(&c.magnitude, i), 4));
                }
                if show_dir {
                    let d = vec_at(&c.direction, i);
                    cells.push(opt(d.map(|v| v.x), 4));
                    cells.push(opt(d.map(|v| v.y), 4));
                }
                if show_time {
                    cells.push(opt(c.time.as_ref().and_then(|t| t.values.get(i).copied()), 3));
                }
                if show_path {
                    let cumul = c.cumulative_distance.as_ref().and_then(|d| d.get(i).copied());
                    cells.push(opt(opt_at(&c.distance_to_start, i), 4));
                    cells.push(opt(cumul, 4));
                }
                if show_speed {
                    let s = c.instant_speed.as_ref().and_then(|s| s.values.get(i).copied().flatten());
                    cells.push(opt(s, 4));
                }
                if show_msd {
                    cells.push(opt(opt_at(&c.msd, i), 4));
                }
                if show_ratio {
                    cells.push(opt(opt_at(&c.dir_ratio, i), 4));
                }
                // per-track scalars go on the first row of the track
                if show_avg_speed {
                    cells.push(if i == 0 {
                        opt(c.average_speed.flatten(), 4)
                    } else {
                        Cell::new("")
                    });
                }
                for lag in 1..=n_lags {
                    cells.push(match (&c.persistence, i) {
                        (Some(col), 0) => opt(col.at(lag), 4),
                        _ => Cell::new(""),
                    });
                }
                table.add_row(Row::from(cells));
            }
        }
        writeln!(f, "{}", self.label())?;
        write!(f, "{table}")
    }
}

/// Display adaptor for a slice of [`CellMetricRecord`].
pub struct CellMetricsTable<'a>(pub &'a [CellMetricRecord]);

impl fmt::Display for CellMetricsTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut table = new_table();
        table.set_header(vec![
            "cell_id",
            "condition",
            "Speed",
            "MSD",
            "Directionality Ratio",
            "Migration Persistence (Autocorrelation)",
        ]);
        for r in self.0 {
            table.add_row(Row::from(vec![
                Cell::new(r.cell_id).set_alignment(CellAlignment::Right),
                Cell::new(&r.condition),
                opt(r.speed, 6),
                opt(r.msd, 6),
                opt(r.directionality_ratio, 6),
                opt(r.persistence, 6),
            ]));
        }
        write!(f, "{table}")
    }
}
