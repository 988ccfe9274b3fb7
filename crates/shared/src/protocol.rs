//! Wire shapes of the accident service HTTP API and their domain conversions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{
    AccidentId, AccidentRecord, Coordinate, RiskLevel, RouteResult, StatsSnapshot,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_acidentes: u64,
    #[serde(default)]
    pub por_cidade: BTreeMap<String, u64>,
    #[serde(default)]
    pub por_tipo: BTreeMap<String, u64>,
    #[serde(default)]
    pub por_veiculo: BTreeMap<String, u64>,
    #[serde(default)]
    pub por_clima: BTreeMap<String, u64>,
}

impl From<StatsResponse> for StatsSnapshot {
    fn from(value: StatsResponse) -> Self {
        Self {
            total_accidents: value.total_acidentes,
            by_city: value.por_cidade,
            by_type: value.por_tipo,
            by_vehicle: value.por_veiculo,
            by_weather: value.por_clima,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteQuery {
    pub origem_lat: f64,
    pub origem_lon: f64,
    pub destino_lat: f64,
    pub destino_lon: f64,
}

impl RouteQuery {
    pub fn new(origin: Coordinate, destination: Coordinate) -> Self {
        Self {
            origem_lat: origin.latitude,
            origem_lon: origin.longitude,
            destino_lat: destination.latitude,
            destino_lon: destination.longitude,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResponse {
    pub rota: Vec<LatLng>,
    pub distancia_km: f64,
    pub nivel_risco: RiskLevel,
    pub risco_total: f64,
    pub risco_origem: f64,
    pub risco_destino: f64,
}

impl From<RouteResponse> for RouteResult {
    fn from(value: RouteResponse) -> Self {
        Self {
            polyline: value
                .rota
                .into_iter()
                .map(|point| Coordinate::new(point.lat, point.lng))
                .collect(),
            distance_km: value.distancia_km,
            risk_level: value.nivel_risco,
            total_risk_score: value.risco_total,
            origin_risk: value.risco_origem,
            destination_risk: value.risco_destino,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyAccident {
    pub id: i64,
    #[serde(default)]
    pub municipio: Option<String>,
    #[serde(default)]
    pub tipo_acidente: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub mortos: Option<u32>,
    #[serde(default)]
    pub feridos_graves: Option<u32>,
    #[serde(default)]
    pub distancia_km: f64,
}

impl From<NearbyAccident> for AccidentRecord {
    fn from(value: NearbyAccident) -> Self {
        Self {
            id: AccidentId(value.id),
            position: Coordinate::new(value.latitude, value.longitude),
            municipality: value.municipio.unwrap_or_default(),
            accident_type: value.tipo_acidente.unwrap_or_default(),
            fatalities: value.mortos.unwrap_or_default(),
            serious_injuries: value.feridos_graves.unwrap_or_default(),
            distance_km: value.distancia_km,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NearbyResponse {
    #[serde(default)]
    pub acidentes: Vec<NearbyAccident>,
}

impl NearbyResponse {
    pub fn into_records(self) -> Vec<AccidentRecord> {
        self.acidentes.into_iter().map(AccidentRecord::from).collect()
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
