use std::path::PathBuf;

use mockito::Matcher;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

use coordinates::CoordinateTable;
use seeder_app::{AssumeYes, Confirm, Seeder};
use sensor_client::{ClientConfig, SensorApiClient};

struct Decline;

impl Confirm for Decline {
    fn confirm(&mut self, _question: &str) -> std::io::Result<bool> {
        Ok(false)
    }
}

fn client_for(server: &mockito::ServerGuard) -> SensorApiClient {
    SensorApiClient::new(ClientConfig {
        base_url: format!("{}/api/v1", server.url()),
        timeout_ms: 2_000,
    })
    .expect("client")
}

#[tokio::test]
async fn e2e_seeds_fixture_plan_against_api() {
    let mut server = mockito::Server::new_async().await;
    let listing = server
        .mock("GET", "/api/v1/sensors")
        .with_status(200)
        .with_body(r#"{"success":true,"data":[]}"#)
        .create_async()
        .await;
    let pusat = server
        .mock("POST", "/api/v1/sensors")
        .match_body(Matcher::PartialJson(json!({ "districtName": "Jakarta Pusat" })))
        .with_status(201)
        .with_body(r#"{"success":true,"data":{"sensorId":"11111111-aaaa-bbbb-cccc-000000000000"}}"#)
        .expect(2)
        .create_async()
        .await;
    let selatan = server
        .mock("POST", "/api/v1/sensors")
        .match_body(Matcher::PartialJson(json!({ "districtName": "Jakarta Selatan" })))
        .with_status(201)
        .with_body(r#"{"success":true,"data":{"sensorId":"22222222-aaaa-bbbb-cccc-000000000000"}}"#)
        .expect(3)
        .create_async()
        .await;
    let seribu = server
        .mock("POST", "/api/v1/sensors")
        .match_body(Matcher::PartialJson(json!({ "districtName": "Kepulauan Seribu" })))
        .with_status(500)
        .with_body(r#"{"success":false,"message":"Cassandra unavailable"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let table = CoordinateTable::jakarta();
    let mut seeder = Seeder::new(&client, &table, AssumeYes, StdRng::seed_from_u64(1), Vec::new());
    let report = seeder.run(&fixture_path("districts.json")).await.expect("run");
    let output = String::from_utf8(seeder.into_output()).expect("utf8");

    listing.assert_async().await;
    pusat.assert_async().await;
    selatan.assert_async().await;
    seribu.assert_async().await;

    assert_eq!(report.attempted, 6);
    assert_eq!(report.created, 5);
    assert_eq!(report.failed, 1);
    assert!(output.contains("ID: 11111111..."));
    assert!(output.contains("Failed to create sensor: 500 (Cassandra unavailable)"));
}

#[tokio::test]
async fn e2e_declined_run_never_posts() {
    let mut server = mockito::Server::new_async().await;
    let _listing = server
        .mock("GET", "/api/v1/sensors")
        .with_status(200)
        .with_body(r#"{"data":[{"sensorId":"a"},{"sensorId":"b"}]}"#)
        .create_async()
        .await;
    let create = server
        .mock("POST", "/api/v1/sensors")
        .with_status(201)
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server);
    let table = CoordinateTable::jakarta();
    let mut seeder = Seeder::new(&client, &table, Decline, StdRng::seed_from_u64(2), Vec::new());
    let report = seeder.run(&fixture_path("districts.json")).await.expect("run");

    create.assert_async().await;
    assert!(report.aborted);
    assert_eq!(report.existing, 2);
}

#[tokio::test]
async fn e2e_unreachable_api_fails_every_sensor() {
    let client = SensorApiClient::new(ClientConfig {
        base_url: "http://127.0.0.1:1/api/v1".to_string(),
        timeout_ms: 2_000,
    })
    .expect("client");
    let table = CoordinateTable::jakarta();
    let mut seeder = Seeder::new(&client, &table, AssumeYes, StdRng::seed_from_u64(3), Vec::new());

    let report = seeder.run(&fixture_path("districts.json")).await.expect("run");
    let output = String::from_utf8(seeder.into_output()).expect("utf8");

    assert!(report.preflight_failed);
    assert_eq!(report.attempted, 6);
    assert_eq!(report.created, 0);
    assert_eq!(report.failed, 6);
    assert_eq!(output.matches("Cannot connect to backend").count(), 6);
}

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}
