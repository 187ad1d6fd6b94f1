use std::io::{self, Write};

use ecoscale_core::{
    chart::{DISTRIBUTION_SERIES_NAME, DistributionChart, TrendChart, format_kg},
    label::DateLabel,
    model::{DashboardTotals, WasteCategory},
};

pub(crate) fn write_header<W: Write>(out: &mut W, label: &DateLabel) -> io::Result<()> {
    writeln!(out, "{label}")?;
    writeln!(out)
}

pub(crate) fn write_totals<W: Write>(out: &mut W, totals: &DashboardTotals) -> io::Result<()> {
    let daily = &totals.daily;
    writeln!(out, "Total today: {}", format_kg(daily.total()))?;
    for category in [
        WasteCategory::Organic,
        WasteCategory::Inorganic,
        WasteCategory::Residual,
    ] {
        writeln!(out, "  {:<10} {}", category.store_label(), format_kg(daily.get(category)))?;
    }

    match DistributionChart::from_daily(daily) {
        DistributionChart::Slices(slices) => {
            let shares = slices
                .iter()
                .map(|slice| {
                    let share = slice.value / daily.total() * 100.0;
                    format!("{} {share:.0}%", slice.label)
                })
                .collect::<Vec<_>>()
                .join(" · ");
            writeln!(out, "{DISTRIBUTION_SERIES_NAME}: {shares}")?;
        }
        DistributionChart::Empty { caption } => writeln!(out, "{DISTRIBUTION_SERIES_NAME}: {caption}")?,
    }

    let trend = TrendChart::from_weekly(&totals.weekly);
    let days = trend
        .points
        .iter()
        .map(|point| format!("{} {:.1}", point.label, point.value))
        .collect::<Vec<_>>()
        .join(" | ");
    writeln!(out, "{}: {days}", trend.name)?;
    writeln!(out)
}
