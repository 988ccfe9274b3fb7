//! Text rendering of the view model.

use std::fmt::Write as _;

use client_core::ViewState;
use shared::domain::StatsCategory;

const TOP_ENTRIES: usize = 5;
const NEARBY_PREVIEW: usize = 5;

const CATEGORIES: [(StatsCategory, &str); 4] = [
    (StatsCategory::City, "By city"),
    (StatsCategory::AccidentType, "By accident type"),
    (StatsCategory::Vehicle, "By vehicle"),
    (StatsCategory::Weather, "By weather"),
];

pub fn render_view(view: &ViewState) -> String {
    let mut out = String::new();

    if view.loading {
        out.push_str("[loading]\n");
    }

    match &view.route {
        Some(route) => {
            let _ = writeln!(
                out,
                "Route: {:.2} km, risk {} (score {:.2}; origin {:.2}, destination {:.2}), {} points",
                route.distance_km,
                route.risk_level.label(),
                route.total_risk_score,
                route.origin_risk,
                route.destination_risk,
                route.polyline.len()
            );
        }
        None => out.push_str("Route: no route available\n"),
    }

    let _ = writeln!(
        out,
        "Nearby accidents: {} found",
        view.nearby_accidents.len()
    );
    for accident in view.nearby_accidents.iter().take(NEARBY_PREVIEW) {
        let _ = writeln!(
            out,
            "  - {} | {} | {:.2} km | fatalities {}, serious injuries {}",
            accident.municipality,
            accident.accident_type,
            accident.distance_km,
            accident.fatalities,
            accident.serious_injuries
        );
    }

    if let Some(stats) = &view.stats {
        let _ = writeln!(out, "Accidents total: {}", stats.total_accidents);
        for (category, title) in CATEGORIES {
            let top = stats.top(category, TOP_ENTRIES);
            if top.is_empty() {
                continue;
            }
            let entries = top
                .iter()
                .map(|(key, count)| format!("{key} ({count})"))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "  {title}: {entries}");
        }
    }

    if let Some(status) = &view.upload_status {
        let _ = writeln!(out, "Upload: {status}");
    }

    out
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
