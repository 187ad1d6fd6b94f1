//! Chart-ready series derived from the published totals.
//!
//! Nothing here draws; the structures are handed to whatever surface renders
//! the distribution and trend charts.

use serde::Serialize;

use crate::model::{DailyTotals, WasteCategory, WeeklyTotals};

/// Short weekday labels for the trend chart, Monday first.
pub const WEEKDAY_LABELS: [&str; 7] = ["Sen", "Sel", "Rab", "Kam", "Jum", "Sab", "Min"];
/// Series name of the weekly trend line.
pub const TREND_SERIES_NAME: &str = "Berat Sampah (kg)";
/// Series name of the distribution chart.
pub const DISTRIBUTION_SERIES_NAME: &str = "Distribusi Sampah";
/// Caption shown when nothing was collected today.
pub const NO_DATA_CAPTION: &str = "No Data Today";

/// Format a weight with one decimal, e.g. `3.5 kg`.
#[must_use]
pub fn format_kg(weight_kg: f64) -> String {
    format!("{weight_kg:.1} kg")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// One slice of the distribution chart.
pub struct Slice {
    /// Category the slice stands for.
    pub category: WasteCategory,
    /// Legend label.
    pub label: &'static str,
    /// Weight in kilograms.
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Today's distribution by category.
pub enum DistributionChart {
    /// At least one category has weight; only those categories get a slice.
    Slices(Vec<Slice>),
    /// Nothing collected today.
    Empty {
        /// Caption for the placeholder.
        caption: &'static str,
    },
}

impl DistributionChart {
    /// Build the distribution from today's totals.
    #[must_use]
    pub fn from_daily(daily: &DailyTotals) -> Self {
        let slices: Vec<Slice> = [
            WasteCategory::Organic,
            WasteCategory::Inorganic,
            WasteCategory::Residual,
        ]
        .into_iter()
        .filter(|category| daily.get(*category) > 0.0)
        .map(|category| Slice {
            category,
            label: category.store_label(),
            value: daily.get(category),
        })
        .collect();

        if slices.is_empty() {
            DistributionChart::Empty {
                caption: NO_DATA_CAPTION,
            }
        } else {
            DistributionChart::Slices(slices)
        }
    }

    /// Slices to draw; empty for the placeholder.
    #[must_use]
    pub fn slices(&self) -> &[Slice] {
        match self {
            DistributionChart::Slices(slices) => slices,
            DistributionChart::Empty { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// One point on the weekly trend line.
pub struct TrendPoint {
    /// Position on the x axis, 0 = Monday.
    pub index: usize,
    /// Axis label for the day.
    pub label: &'static str,
    /// Weight in kilograms.
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Weekly trend line, always seven points.
pub struct TrendChart {
    /// Series name for the legend.
    pub name: &'static str,
    /// Points, Monday first.
    pub points: Vec<TrendPoint>,
}

impl TrendChart {
    /// Build the trend line from this week's totals.
    #[must_use]
    pub fn from_weekly(weekly: &WeeklyTotals) -> Self {
        let points = WEEKDAY_LABELS
            .into_iter()
            .zip(weekly.iter())
            .enumerate()
            .map(|(index, (label, value))| TrendPoint {
                index,
                label,
                value,
            })
            .collect();

        Self {
            name: TREND_SERIES_NAME,
            points,
        }
    }
}
