use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(AccidentId);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// False for NaN/infinite components or anything outside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "Baixo")]
    Low,
    #[serde(rename = "Médio")]
    Medium,
    #[serde(rename = "Alto")]
    High,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub polyline: Vec<Coordinate>,
    pub distance_km: f64,
    pub risk_level: RiskLevel,
    pub total_risk_score: f64,
    pub origin_risk: f64,
    pub destination_risk: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccidentRecord {
    pub id: AccidentId,
    pub position: Coordinate,
    pub municipality: String,
    pub accident_type: String,
    pub fatalities: u32,
    pub serious_injuries: u32,
    /// Only meaningful for records returned by a nearby query.
    pub distance_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsCategory {
    City,
    AccidentType,
    Vehicle,
    Weather,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_accidents: u64,
    pub by_city: BTreeMap<String, u64>,
    pub by_type: BTreeMap<String, u64>,
    pub by_vehicle: BTreeMap<String, u64>,
    pub by_weather: BTreeMap<String, u64>,
}

impl StatsSnapshot {
    pub fn breakdown(&self, category: StatsCategory) -> &BTreeMap<String, u64> {
        match category {
            StatsCategory::City => &self.by_city,
            StatsCategory::AccidentType => &self.by_type,
            StatsCategory::Vehicle => &self.by_vehicle,
            StatsCategory::Weather => &self.by_weather,
        }
    }

    /// Largest `n` entries of a category, ties broken by key order.
    pub fn top(&self, category: StatsCategory, n: usize) -> Vec<(&str, u64)> {
        let mut entries = self
            .breakdown(category)
            .iter()
            .map(|(key, count)| (key.as_str(), *count))
            .collect::<Vec<_>>();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(n);
        entries
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
