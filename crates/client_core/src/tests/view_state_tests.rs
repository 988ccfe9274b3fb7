use super::*;
use crate::test_support::{accident_fixture, route_fixture, stats_fixture};

fn busy_at(generation: Generation) -> ViewState {
    reduce(
        ViewState::default(),
        generation,
        ViewEvent::RouteStarted { generation },
    )
}

#[test]
fn route_events_from_older_generations_are_ignored() {
    let state = busy_at(Generation(2));

    let state = reduce(
        state,
        Generation(2),
        ViewEvent::RouteResolved {
            generation: Generation(1),
            result: Ok(route_fixture(3.0)),
        },
    );
    let state = reduce(
        state,
        Generation(2),
        ViewEvent::NearbyResolved {
            generation: Generation(1),
            result: Ok(vec![accident_fixture(1)]),
        },
    );
    let state = reduce(
        state,
        Generation(2),
        ViewEvent::RouteSettled {
            generation: Generation(1),
        },
    );

    assert_eq!(state.route, None);
    assert!(state.nearby_accidents.is_empty());
    assert!(state.loading, "stale settle must not clear the newer busy state");
}

#[test]
fn current_route_failure_clears_route_and_nearby_failure_keeps_list() {
    let mut state = busy_at(Generation(1));
    state.route = Some(route_fixture(9.0));
    state.nearby_accidents = vec![accident_fixture(7)];

    let state = reduce(
        state,
        Generation(1),
        ViewEvent::RouteResolved {
            generation: Generation(1),
            result: Err(ApiError::Server {
                status: 500,
                detail: None,
            }),
        },
    );
    let state = reduce(
        state,
        Generation(1),
        ViewEvent::NearbyResolved {
            generation: Generation(1),
            result: Err(ApiError::Network("connection reset".into())),
        },
    );
    let state = reduce(
        state,
        Generation(1),
        ViewEvent::RouteSettled {
            generation: Generation(1),
        },
    );

    assert_eq!(state.route, None);
    assert_eq!(state.nearby_accidents, vec![accident_fixture(7)]);
    assert!(!state.loading);
}

#[test]
fn upload_events_set_status_text() {
    let state = reduce(ViewState::default(), Generation(0), ViewEvent::UploadStarted);
    assert!(state.loading);
    assert_eq!(state.upload_status.as_deref(), Some(UPLOAD_SUBMITTING_STATUS));

    let failed = reduce(
        state.clone(),
        Generation(0),
        ViewEvent::UploadResolved(Err(ApiError::Server {
            status: 400,
            detail: Some("Apenas arquivos CSV são permitidos".into()),
        })),
    );
    assert_eq!(
        failed.upload_status.as_deref(),
        Some("Error uploading file: server responded with status 400: Apenas arquivos CSV são permitidos")
    );

    let done = reduce(
        state,
        Generation(0),
        ViewEvent::UploadResolved(Ok("10 registros importados com sucesso".into())),
    );
    let done = reduce(done, Generation(0), ViewEvent::UploadSettled);
    assert_eq!(
        done.upload_status.as_deref(),
        Some("10 registros importados com sucesso")
    );
    assert!(!done.loading);
}

#[test]
fn upload_and_stats_events_ignore_route_generation() {
    let state = reduce(
        ViewState::default(),
        Generation(41),
        ViewEvent::StatsResolved(Ok(stats_fixture(5))),
    );
    assert_eq!(state.stats, Some(stats_fixture(5)));

    let state = reduce(
        state,
        Generation(42),
        ViewEvent::StatsResolved(Err(ApiError::Decode("expected value".into()))),
    );
    assert_eq!(state.stats, Some(stats_fixture(5)));
}

#[tokio::test]
async fn store_publishes_applied_events_and_reports_stale_ones() {
    let store = ViewStore::new(Arc::new(RequestSequencer::new()));
    let mut updates = store.subscribe();

    let first = store.begin_route().await;
    let second = store.begin_route().await;
    assert!(updates.has_changed().expect("sender alive"));
    assert!(updates.borrow_and_update().loading);

    let applied = store
        .dispatch(ViewEvent::RouteResolved {
            generation: first,
            result: Ok(route_fixture(1.0)),
        })
        .await;
    assert!(!applied);
    assert!(!updates.has_changed().expect("sender alive"));

    let applied = store
        .dispatch(ViewEvent::RouteResolved {
            generation: second,
            result: Ok(route_fixture(2.0)),
        })
        .await;
    assert!(applied);
    assert_eq!(updates.borrow_and_update().route, Some(route_fixture(2.0)));
    assert_eq!(store.snapshot().await.route, Some(route_fixture(2.0)));
}
