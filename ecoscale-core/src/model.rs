//! Domain data structures for waste records and the dashboard totals derived from them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of buckets in a [`WeeklyTotals`] series, Monday through Sunday.
pub const DAYS_PER_WEEK: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Waste categories a weighing station can record.
pub enum WasteCategory {
    /// Compostable kitchen and garden waste.
    Organic,
    /// Recyclables such as plastic, paper and metal.
    Inorganic,
    /// Residual waste that is neither organic nor recyclable.
    Residual,
    /// Unsorted waste; stored but never aggregated.
    General,
}

impl WasteCategory {
    /// Label used for the category in the document store.
    #[must_use]
    pub fn store_label(self) -> &'static str {
        match self {
            WasteCategory::Organic => "Organik",
            WasteCategory::Inorganic => "Anorganik",
            WasteCategory::Residual => "Residu",
            WasteCategory::General => "Umum",
        }
    }

    /// Resolve a category from its store label or its English name.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Organik" | "Organic" => Some(WasteCategory::Organic),
            "Anorganik" | "Inorganic" => Some(WasteCategory::Inorganic),
            "Residu" | "Residual" => Some(WasteCategory::Residual),
            "Umum" | "General" => Some(WasteCategory::General),
            _ => None,
        }
    }

    /// Whether records of this category take part in aggregation.
    #[must_use]
    pub fn is_aggregated(self) -> bool {
        !matches!(self, WasteCategory::General)
    }
}

impl fmt::Display for WasteCategory {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.store_label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A single weighing, decoded from a store document.
pub struct WasteRecord {
    /// Moment the waste was weighed.
    pub timestamp: DateTime<Utc>,
    /// Weight in kilograms, never negative.
    pub weight_kg: f64,
    /// Category the waste was sorted into, `None` when missing or unrecognised.
    pub category: Option<WasteCategory>,
}

impl WasteRecord {
    /// Whether the record counts towards any total. Only general waste is left out;
    /// a record without a known category still counts for the week.
    #[must_use]
    pub fn is_aggregated(&self) -> bool {
        self.category.is_none_or(WasteCategory::is_aggregated)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
/// Weight collected today, per aggregated category.
pub struct DailyTotals {
    /// Organic weight in kilograms.
    pub organic: f64,
    /// Inorganic weight in kilograms.
    pub inorganic: f64,
    /// Residual weight in kilograms.
    pub residual: f64,
}

impl DailyTotals {
    /// Add `weight_kg` to the accumulator of `category`. General waste is ignored.
    pub fn add(&mut self, category: WasteCategory, weight_kg: f64) {
        match category {
            WasteCategory::Organic => self.organic += weight_kg,
            WasteCategory::Inorganic => self.inorganic += weight_kg,
            WasteCategory::Residual => self.residual += weight_kg,
            WasteCategory::General => {}
        }
    }

    /// Weight of a single category.
    #[must_use]
    pub fn get(&self, category: WasteCategory) -> f64 {
        match category {
            WasteCategory::Organic => self.organic,
            WasteCategory::Inorganic => self.inorganic,
            WasteCategory::Residual => self.residual,
            WasteCategory::General => 0.0,
        }
    }

    /// Total weight collected today across all categories.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.organic + self.inorganic + self.residual
    }

    /// True when nothing has been collected today.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.organic <= 0.0 && self.inorganic <= 0.0 && self.residual <= 0.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
/// Weight collected on each day of the current week, Monday first.
pub struct WeeklyTotals(pub [f64; DAYS_PER_WEEK]);

impl WeeklyTotals {
    /// Add `weight_kg` to the bucket at `day_index` (0 = Monday).
    /// Indices outside the week are ignored.
    pub fn add(&mut self, day_index: usize, weight_kg: f64) {
        if let Some(bucket) = self.0.get_mut(day_index) {
            *bucket += weight_kg;
        }
    }

    /// Weight for the day at `day_index` (0 = Monday).
    #[must_use]
    pub fn day(&self, day_index: usize) -> Option<f64> {
        self.0.get(day_index).copied()
    }

    /// Sum over the whole week.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Iterator over the daily values, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
/// Both outputs of one aggregation pass, published together.
pub struct DashboardTotals {
    /// Today's totals by category.
    pub daily: DailyTotals,
    /// This week's totals by day.
    pub weekly: WeeklyTotals,
    /// Number of passes completed before this value was published.
    pub revision: u64,
}
