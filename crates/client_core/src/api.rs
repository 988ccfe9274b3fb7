//! Typed transport over the accident service. No retries and no caching.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::{AccidentRecord, Coordinate, RouteResult, StatsSnapshot},
    error::ErrorBody,
    protocol::{
        NearbyQuery, NearbyResponse, RouteQuery, RouteResponse, StatsResponse, UploadResponse,
    },
};
use tracing::debug;
use url::Url;

use crate::error::ApiError;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn get_stats(&self) -> Result<StatsSnapshot, ApiError>;
    async fn upload_csv(&self, file: CsvUpload) -> Result<String, ApiError>;
    async fn get_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteResult, ApiError>;
    async fn get_nearby(
        &self,
        center: Coordinate,
        radius_km: f64,
    ) -> Result<Vec<AccidentRecord>, ApiError>;
}

pub struct HttpApiClient {
    http: Client,
    base_url: Url,
}

impl HttpApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).with_context(|| format!("invalid API base url '{base_url}'"))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|err| ApiError::Network(format!("invalid endpoint '{path}': {err}")))
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let detail = response
            .bytes()
            .await
            .ok()
            .and_then(|body| serde_json::from_slice::<ErrorBody>(&body).ok())
            .and_then(|body| body.message());
        return Err(ApiError::Server {
            status: status.as_u16(),
            detail,
        });
    }

    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|err| ApiError::Decode(err.to_string()))
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn get_stats(&self) -> Result<StatsSnapshot, ApiError> {
        let url = self.endpoint("stats/")?;
        debug!(%url, "api: fetching stats");
        let response = self.http.get(url).send().await?;
        let body: StatsResponse = decode_json(response).await?;
        Ok(body.into())
    }

    async fn upload_csv(&self, file: CsvUpload) -> Result<String, ApiError> {
        let url = self.endpoint("upload_csv/")?;
        debug!(%url, filename = %file.filename, size = file.bytes.len(), "api: uploading csv");
        let part = Part::bytes(file.bytes)
            .file_name(file.filename)
            .mime_str("text/csv")?;
        let response = self
            .http
            .post(url)
            .multipart(Form::new().part("file", part))
            .send()
            .await?;
        let body: UploadResponse = decode_json(response).await?;
        Ok(body.message)
    }

    async fn get_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteResult, ApiError> {
        let url = self.endpoint("route/")?;
        debug!(%url, ?origin, ?destination, "api: requesting route");
        let response = self
            .http
            .get(url)
            .query(&RouteQuery::new(origin, destination))
            .send()
            .await?;
        let body: RouteResponse = decode_json(response).await?;
        Ok(body.into())
    }

    async fn get_nearby(
        &self,
        center: Coordinate,
        radius_km: f64,
    ) -> Result<Vec<AccidentRecord>, ApiError> {
        let url = self.endpoint("accidents_nearby/")?;
        debug!(%url, ?center, radius_km, "api: requesting nearby accidents");
        let response = self
            .http
            .get(url)
            .query(&NearbyQuery {
                lat: center.latitude,
                lon: center.longitude,
                radius_km,
            })
            .send()
            .await?;
        let body: NearbyResponse = decode_json(response).await?;
        Ok(body.into_records())
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
