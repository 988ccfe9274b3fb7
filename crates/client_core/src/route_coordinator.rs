use std::sync::Arc;

use shared::domain::Coordinate;
use tracing::{info, warn};

use crate::{
    api::ApiClient,
    error::{InvalidInput, PartialFailure, RouteStep},
    sequencer::Generation,
    view_state::{ViewEvent, ViewStore},
};

#[derive(Debug, Clone, PartialEq)]
pub struct RouteOutcome {
    pub generation: Generation,
    /// A newer generation was issued before this one settled, so none of its
    /// results are visible.
    pub superseded: bool,
    pub failures: Vec<PartialFailure>,
}

impl RouteOutcome {
    pub fn is_complete_success(&self) -> bool {
        !self.superseded && self.failures.is_empty()
    }
}

/// A validated route request whose generation has already been issued.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteTicket {
    pub generation: Generation,
    pub origin: Coordinate,
    pub destination: Coordinate,
}

/// Runs the route and nearby-accident lookups for one input change and
/// reconciles both into the view.
pub struct RouteCoordinator {
    api: Arc<dyn ApiClient>,
    store: Arc<ViewStore>,
}

fn validate(field: &'static str, coordinate: Coordinate) -> Result<(), InvalidInput> {
    if coordinate.is_valid() {
        Ok(())
    } else {
        Err(InvalidInput::Coordinate {
            field,
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
        })
    }
}

impl RouteCoordinator {
    pub fn new(api: Arc<dyn ApiClient>, store: Arc<ViewStore>) -> Self {
        Self { api, store }
    }

    /// Validates the input and claims its generation. Callers that fan route
    /// work out to tasks must call this in input order and only then spawn
    /// [`RouteCoordinator::run`].
    pub async fn begin(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteTicket, InvalidInput> {
        validate("origin", origin)?;
        validate("destination", destination)?;

        let generation = self.store.begin_route().await;
        Ok(RouteTicket {
            generation,
            origin,
            destination,
        })
    }

    /// `begin` followed by `run`.
    pub async fn compute_safe_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        radius_km: f64,
    ) -> Result<RouteOutcome, InvalidInput> {
        let ticket = self.begin(origin, destination).await?;
        Ok(self.run(ticket, radius_km).await)
    }

    /// The nearby lookup is centered on the ticket's origin and is issued
    /// alongside the route request, not after it; either may finish first and
    /// either may fail without affecting the other.
    pub async fn run(&self, ticket: RouteTicket, radius_km: f64) -> RouteOutcome {
        let RouteTicket {
            generation,
            origin,
            destination,
        } = ticket;
        info!(
            generation = generation.0,
            ?origin,
            ?destination,
            radius_km,
            "route: computing safe route"
        );

        let route_step = async {
            let result = self.api.get_route(origin, destination).await;
            let failure = result.as_ref().err().cloned();
            self.store
                .dispatch(ViewEvent::RouteResolved { generation, result })
                .await;
            failure.map(|error| PartialFailure {
                generation,
                step: RouteStep::Route,
                error,
            })
        };

        let nearby_step = async {
            let result = self.api.get_nearby(origin, radius_km).await;
            let failure = result.as_ref().err().cloned();
            self.store
                .dispatch(ViewEvent::NearbyResolved { generation, result })
                .await;
            failure.map(|error| PartialFailure {
                generation,
                step: RouteStep::Nearby,
                error,
            })
        };

        let (route_failure, nearby_failure) = futures::join!(route_step, nearby_step);
        let failures = [route_failure, nearby_failure]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();
        for failure in &failures {
            warn!(generation = generation.0, step = %failure.step, error = %failure.error, "route: partial failure");
        }

        let superseded = !self
            .store
            .dispatch(ViewEvent::RouteSettled { generation })
            .await;
        if superseded {
            info!(generation = generation.0, "route: results superseded by newer input");
        }

        RouteOutcome {
            generation,
            superseded,
            failures,
        }
    }
}

#[cfg(test)]
#[path = "tests/route_coordinator_tests.rs"]
mod tests;
