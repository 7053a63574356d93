//! Fan-out, caching and stale-result handling against a wiremock lookup API.

use std::time::Duration;

use tokio::sync::mpsc;
use whatregion_core::{
    find_region, CanonicalAppId, Continent, Region, RegionAvailability, RegionState, REGIONS,
};
use whatregion_itunes::{
    Aggregator, Applied, BaselineState, ItunesClient, LookupCache, LookupEvent, RegionBoard,
    Session,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

static THREE: [Region; 3] = [
    Region {
        code: "us",
        name: "United States",
        continent: Continent::NorthAmerica,
    },
    Region {
        code: "gb",
        name: "United Kingdom",
        continent: Continent::Europe,
    },
    Region {
        code: "jp",
        name: "Japan",
        continent: Continent::Asia,
    },
];

fn app_id(raw: &str) -> CanonicalAppId {
    CanonicalAppId::parse(raw).expect("valid app id")
}

fn hit(name: &str, price: &str) -> serde_json::Value {
    serde_json::json!({
        "resultCount": 1,
        "results": [{
            "trackId": 6_743_941_366_i64,
            "trackName": name,
            "artistName": "Example Inc.",
            "formattedPrice": price
        }]
    })
}

fn miss() -> serde_json::Value {
    serde_json::json!({ "resultCount": 0, "results": [] })
}

fn aggregator(server: &MockServer, timeout_secs: u64) -> Aggregator {
    let client = ItunesClient::with_base_url(timeout_secs, "whatregion-test", &server.uri())
        .expect("client construction should not fail");
    let us = find_region("us").expect("us in catalog");
    Aggregator::new(client, LookupCache::new(Duration::from_secs(60)), us)
}

async fn mount_region(server: &MockServer, id: &str, country: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/lookup"))
        .and(query_param("id", id))
        .and(query_param("country", country))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn mount_fallback(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/lookup"))
        .respond_with(template)
        .with_priority(10)
        .mount(server)
        .await;
}

async fn mount_failure_then_hit(server: &MockServer, id: &str, country: &str) {
    Mock::given(method("GET"))
        .and(path("/lookup"))
        .and(query_param("id", id))
        .and(query_param("country", country))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(server)
        .await;
    mount_region(
        server,
        id,
        country,
        ResponseTemplate::new(200).set_body_json(hit("Recovered", "$3.99")),
    )
    .await;
}

#[tokio::test]
async fn region_hit_is_available_with_price() {
    let server = MockServer::start().await;
    mount_region(
        &server,
        "6743941366",
        "us",
        ResponseTemplate::new(200).set_body_json(hit("Example App", "$0.99")),
    )
    .await;

    let agg = aggregator(&server, 5);
    let us = find_region("us").unwrap();
    let result = agg.check_region(&app_id("6743941366"), us).await;

    assert_eq!(
        result,
        RegionAvailability::available(us, Some("$0.99".to_owned()))
    );
}

#[tokio::test]
async fn failures_look_exactly_like_empty_results() {
    let server = MockServer::start().await;
    mount_region(
        &server,
        "1",
        "gb",
        ResponseTemplate::new(200).set_body_json(miss()),
    )
    .await;
    mount_region(&server, "1", "jp", ResponseTemplate::new(500)).await;
    mount_region(
        &server,
        "1",
        "de",
        ResponseTemplate::new(200).set_body_string("not json"),
    )
    .await;
    mount_region(
        &server,
        "1",
        "fr",
        ResponseTemplate::new(200)
            .set_body_json(hit("Late", "€1,09"))
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let agg = aggregator(&server, 1);
    let id = app_id("1");
    for code in ["gb", "jp", "de", "fr"] {
        let region = find_region(code).unwrap();
        assert_eq!(
            agg.check_region(&id, region).await,
            RegionAvailability::unavailable(region),
            "region {code}"
        );
    }
}

#[tokio::test]
async fn repeated_checks_hit_the_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("country", "gb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hit("Cached", "£0.99")))
        .expect(1)
        .mount(&server)
        .await;

    let agg = aggregator(&server, 5);
    let gb = find_region("gb").unwrap();
    let id = app_id("77");
    let first = agg.check_region(&id, gb).await;
    let second = agg.check_region(&id, gb).await;
    assert_eq!(first, second);
    assert!(first.is_available);
}

#[tokio::test]
async fn invalidate_allows_a_fresh_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("country", "gb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(miss()))
        .expect(2)
        .mount(&server)
        .await;

    let agg = aggregator(&server, 5);
    let gb = find_region("gb").unwrap();
    let id = app_id("78");
    agg.check_region(&id, gb).await;
    assert!(agg.cache().invalidate(&id, "gb").await);
    agg.check_region(&id, gb).await;
}

#[tokio::test]
async fn cached_failure_is_retried_after_refresh() {
    let server = MockServer::start().await;
    mount_failure_then_hit(&server, "12", "gb").await;

    let agg = aggregator(&server, 5);
    let gb = find_region("gb").unwrap();
    let id = app_id("12");

    assert!(!agg.check_region(&id, gb).await.is_available);
    assert!(
        !agg.check_region(&id, gb).await.is_available,
        "failure is served from the cache until re-triggered"
    );

    assert_eq!(agg.refresh(&id).await, 1);
    let retried = agg.check_region(&id, gb).await;
    assert!(retried.is_available);
    assert_eq!(retried.price.as_deref(), Some("$3.99"));
}

#[tokio::test]
async fn resubmitting_in_a_session_retries_failed_regions() {
    let server = MockServer::start().await;
    mount_failure_then_hit(&server, "13", "jp").await;
    mount_fallback(&server, ResponseTemplate::new(200).set_body_json(miss())).await;

    let mut session = Session::new(aggregator(&server, 5).with_regions(&THREE));
    session.check("13").await.expect("numeric id");
    session.settle().await;
    assert_eq!(session.snapshot().summary.available, 0);

    session.check("13").await.expect("numeric id");
    session.settle().await;
    let jp = session
        .board()
        .entries()
        .iter()
        .find(|entry| entry.region.code == "jp")
        .expect("jp entry");
    assert_eq!(
        jp.state,
        RegionState::Available {
            price: Some("$3.99".to_owned())
        }
    );
}

#[tokio::test]
async fn stalled_lookups_are_expired_as_unavailable() {
    let server = MockServer::start().await;
    mount_region(
        &server,
        "14",
        "jp",
        ResponseTemplate::new(200)
            .set_body_json(hit("Slow", "¥100"))
            .set_delay(Duration::from_secs(2)),
    )
    .await;
    mount_fallback(&server, ResponseTemplate::new(200).set_body_json(miss())).await;

    let mut session = Session::new(aggregator(&server, 5).with_regions(&THREE))
        .with_idle_timeout(Duration::from_millis(300));
    session.check("14").await.expect("numeric id");

    assert_eq!(session.settle().await, 0);
    assert!(session.board().is_settled());
    let jp = session
        .board()
        .entries()
        .iter()
        .find(|entry| entry.region.code == "jp")
        .expect("jp entry");
    assert_eq!(jp.state, RegionState::Unavailable);
    assert!(session.pump().await.is_none());
}

#[tokio::test]
async fn baseline_miss_does_not_stop_the_fan_out() {
    let server = MockServer::start().await;
    mount_region(
        &server,
        "9",
        "us",
        ResponseTemplate::new(200).set_body_json(miss()),
    )
    .await;
    mount_region(
        &server,
        "9",
        "gb",
        ResponseTemplate::new(200).set_body_json(hit("Nine", "£2.49")),
    )
    .await;
    mount_fallback(&server, ResponseTemplate::new(200).set_body_json(miss())).await;

    let agg = aggregator(&server, 5).with_regions(&THREE);
    let mut rx = agg.stream(&app_id("9"));

    let mut regions = Vec::new();
    let mut baseline = None;
    while let Some(event) = rx.recv().await {
        match event {
            LookupEvent::Region { availability, .. } => regions.push(availability),
            LookupEvent::Baseline { record, .. } => baseline = Some(record),
        }
    }

    assert_eq!(baseline, Some(None), "baseline settled with no record");
    assert_eq!(regions.len(), THREE.len());
    let gb = regions.iter().find(|r| r.region.code == "gb").unwrap();
    assert!(gb.is_available);
    assert_eq!(gb.price.as_deref(), Some("£2.49"));
}

#[tokio::test]
async fn slow_region_does_not_delay_the_others() {
    let server = MockServer::start().await;
    mount_region(
        &server,
        "10",
        "jp",
        ResponseTemplate::new(200)
            .set_body_json(miss())
            .set_delay(Duration::from_millis(800)),
    )
    .await;
    mount_fallback(&server, ResponseTemplate::new(200).set_body_json(miss())).await;

    let agg = aggregator(&server, 5).with_regions(&THREE);
    let mut rx = agg.stream(&app_id("10"));

    let mut order = Vec::new();
    while let Some(event) = rx.recv().await {
        if let LookupEvent::Region { availability, .. } = event {
            order.push(availability.region.code);
        }
    }
    assert_eq!(order.len(), 3);
    assert_eq!(order.last(), Some(&"jp"), "slow region settles last: {order:?}");
}

#[tokio::test]
async fn slow_results_for_a_previous_app_are_discarded() {
    let server = MockServer::start().await;
    for region in &THREE {
        mount_region(
            &server,
            "111",
            region.code,
            ResponseTemplate::new(200)
                .set_body_json(hit("Old App", "$9.99"))
                .set_delay(Duration::from_millis(400)),
        )
        .await;
    }
    mount_fallback(&server, ResponseTemplate::new(200).set_body_json(miss())).await;

    let agg = aggregator(&server, 5).with_regions(&THREE);
    let mut board = RegionBoard::new(&THREE);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let old = board.set_app_id(app_id("111"));
    agg.spawn_check(&app_id("111"), old, &tx);
    let current = board.set_app_id(app_id("222"));
    agg.spawn_check(&app_id("222"), current, &tx);
    drop(tx);

    let mut stale = 0;
    while let Some(event) = rx.recv().await {
        if board.apply(event) == Applied::Stale {
            stale += 1;
        }
    }

    assert_eq!(stale, THREE.len() + 1, "regions plus baseline for the old app");
    assert_eq!(board.app_id(), Some(&app_id("222")));
    assert_eq!(board.baseline(), &BaselineState::Missing);
    assert!(board
        .entries()
        .iter()
        .all(|entry| entry.state == RegionState::Unavailable));
}

#[tokio::test]
async fn session_switch_discards_results_that_arrive_first_for_the_old_app() {
    let server = MockServer::start().await;
    for region in &THREE {
        mount_region(
            &server,
            "333",
            region.code,
            ResponseTemplate::new(200).set_body_json(hit("Old", "$1.00")),
        )
        .await;
        mount_region(
            &server,
            "444",
            region.code,
            ResponseTemplate::new(200)
                .set_body_json(miss())
                .set_delay(Duration::from_millis(300)),
        )
        .await;
    }

    let mut session = Session::new(aggregator(&server, 5).with_regions(&THREE));
    session.check("333").await.expect("numeric id");
    let current = session
        .check("https://apps.apple.com/us/app/new/id444")
        .await
        .expect("url id");
    assert_eq!(current, app_id("444"));

    let stale = session.settle().await;
    assert_eq!(stale, THREE.len() + 1);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.generation, 2);
    assert_eq!(snapshot.summary.available, 0);
    assert_eq!(snapshot.summary.settled, THREE.len());
}

#[tokio::test]
async fn session_rejects_input_without_an_id() {
    let server = MockServer::start().await;
    let mut session = Session::new(aggregator(&server, 5).with_regions(&THREE));
    assert!(session.check("not-a-valid-id").await.is_err());
    assert_eq!(session.board().generation(), 0);
    assert!(session.pump().await.is_none());
}

#[tokio::test]
async fn end_to_end_over_the_full_catalog() {
    let server = MockServer::start().await;
    mount_region(
        &server,
        "6743941366",
        "us",
        ResponseTemplate::new(200).set_body_json(hit("Example App", "$0.99")),
    )
    .await;
    mount_fallback(&server, ResponseTemplate::new(200).set_body_json(miss())).await;

    let mut session = Session::new(aggregator(&server, 5));
    let id = session
        .check("https://apps.apple.com/us/app/example-app/id6743941366?mt=8")
        .await
        .expect("url id");
    assert_eq!(id.as_str(), "6743941366");

    assert_eq!(session.settle().await, 0);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.summary.total, REGIONS.len());
    assert_eq!(snapshot.summary.settled, REGIONS.len());
    assert_eq!(snapshot.summary.available, 1);
    match &snapshot.baseline {
        BaselineState::Found(record) => assert_eq!(record.track_name, "Example App"),
        other => panic!("expected baseline record, got {other:?}"),
    }

    let us = snapshot
        .continents
        .iter()
        .flat_map(|group| group.regions.iter())
        .find(|entry| entry.region.code == "us")
        .expect("us entry");
    assert_eq!(
        us.state,
        RegionState::Available {
            price: Some("$0.99".to_owned())
        }
    );
}
