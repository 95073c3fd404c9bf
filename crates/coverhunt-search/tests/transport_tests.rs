mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{only, png, Recorded, Recorder};
use coverhunt_search::{
    ArtworkSearch, ConfigCredentials, Endpoints, HttpTransport, ProviderKind, ReqwestTransport,
    SearchRequest, TransportError,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_fetch_text_returns_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("term", "Daft Punk Discovery"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"resultCount\":0}"))
        .expect(1)
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new().expect("client builds");
    let body = transport
        .fetch_text(&format!("{}/search?term=Daft+Punk+Discovery", server.uri()))
        .await
        .expect("text fetched");

    assert_eq!(body, "{\"resultCount\":0}");
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new().expect("client builds");
    let result = transport
        .fetch_binary(&format!("{}/missing", server.uri()))
        .await;

    assert!(matches!(result, Err(TransportError::Status { status: 404, .. })));
}

#[tokio::test]
async fn test_fetch_binary_and_user_agent() {
    let server = MockServer::start().await;
    let image = png(2, 3);

    Mock::given(method("GET"))
        .and(path("/cover.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(image.clone()),
        )
        .mount(&server)
        .await;

    let transport = ReqwestTransport::builder()
        .timeout(Duration::from_secs(5))
        .contact("ops@example.org")
        .build()
        .expect("client builds");
    let data = transport
        .fetch_binary(&format!("{}/cover.png", server.uri()))
        .await
        .expect("bytes fetched");
    assert_eq!(data.as_ref(), image.as_slice());

    let requests = server.received_requests().await.expect("recording enabled");
    let user_agent = requests[0]
        .headers
        .get("user-agent")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(user_agent.starts_with("coverhunt/"), "{user_agent}");
    assert!(user_agent.ends_with("( ops@example.org )"), "{user_agent}");
}

#[tokio::test]
async fn test_timeout_surfaces_as_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::builder()
        .timeout(Duration::from_millis(50))
        .build()
        .expect("client builds");
    let result = transport.fetch_text(&format!("{}/slow", server.uri())).await;

    assert!(matches!(result, Err(TransportError::Http(_))));
}

#[tokio::test]
async fn test_musicbrainz_search_over_http() {
    let server = MockServer::start().await;
    let release_id = "48117b82-0d65-4428-a1d8-d5a5b8a4b6d0";

    Mock::given(method("GET"))
        .and(path("/musicbrainz/recording/"))
        .and(query_param("query", "artist:\"Daft Punk\" AND recording:\"Discovery\""))
        .and(query_param("fmt", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "recordings": [{
                "title": "Discovery",
                "artist-credit": [{ "name": "Daft Punk" }],
                "releases": [{ "id": release_id }]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/coverartarchive/release/{release_id}/front")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png(16, 9)))
        .expect(1)
        .mount(&server)
        .await;

    let recorder = Recorder::default();
    let transport = ReqwestTransport::builder()
        .rate_limit_host("127.0.0.1", Duration::from_millis(10))
        .build()
        .expect("client builds");
    let search = ArtworkSearch::new(
        SearchRequest::new("Daft Punk", "Discovery"),
        Arc::new(transport),
        Arc::new(ConfigCredentials::new(only(&[ProviderKind::MusicBrainz]))),
        Endpoints::all_at(&server.uri()),
        recorder.callbacks(),
    );

    search.start();
    tokio::time::timeout(Duration::from_secs(5), search.wait_done())
        .await
        .expect("search finished");

    assert_eq!(
        recorder.events(),
        vec![
            Recorded::Result {
                source: "MusicBrainz".to_string(),
                url: format!("{}/coverartarchive/release/{release_id}/front", server.uri()),
            },
            Recorded::ProviderDone("MusicBrainz".to_string(), true),
            Recorded::AllDone,
        ]
    );
}
