use coverhunt_providers::musicbrainz;
use coverhunt_providers::ParseError;
use serde_json::json;

const DISCOVERY_RELEASE: &str = "48117b82-0d65-4428-a1d8-d5a5b8a4b6d0";
const DISCOVERY_REISSUE: &str = "a9f1b3a6-3a2e-4c51-9a0b-6b0c3d7d8e11";
const COMPILATION_RELEASE: &str = "0f4b9b74-7c0a-4c4c-8a0e-2f2d3d0b1a22";

fn recording(credit: serde_json::Value, releases: &[&str]) -> serde_json::Value {
    json!({
        "id": "rec",
        "title": "Discovery",
        "artist-credit": credit,
        "releases": releases.iter().map(|id| json!({ "id": id, "title": "Discovery" })).collect::<Vec<_>>()
    })
}

#[test]
fn test_parse_collects_unique_release_ids() {
    let body = json!({
        "created": "2026-01-08T12:00:00.000Z",
        "count": 2,
        "offset": 0,
        "recordings": [
            recording(json!([{ "name": "Daft Punk", "artist": { "id": "x", "name": "Daft Punk" } }]),
                &[DISCOVERY_RELEASE, DISCOVERY_REISSUE]),
            recording(json!([{ "name": "Daft Punk" }]), &[DISCOVERY_RELEASE, COMPILATION_RELEASE])
        ]
    })
    .to_string();

    let ids = musicbrainz::parse_release_ids(&body, "Daft Punk", 10).expect("ids found");
    assert_eq!(
        ids,
        vec![
            DISCOVERY_RELEASE.to_string(),
            DISCOVERY_REISSUE.to_string(),
            COMPILATION_RELEASE.to_string(),
        ]
    );
}

#[test]
fn test_parse_caps_release_ids() {
    let body = json!({
        "count": 1,
        "recordings": [
            recording(json!([{ "name": "Daft Punk" }]),
                &[DISCOVERY_RELEASE, DISCOVERY_REISSUE, COMPILATION_RELEASE])
        ]
    })
    .to_string();

    let ids = musicbrainz::parse_release_ids(&body, "Daft Punk", 2).expect("ids found");
    assert_eq!(ids.len(), 2);
}

#[test]
fn test_parse_matches_nested_artist_name() {
    let body = json!({
        "count": 1,
        "recordings": [
            recording(json!([{ "name": "DP", "artist": { "name": "Daft Punk" } }]), &[DISCOVERY_RELEASE])
        ]
    })
    .to_string();

    let ids = musicbrainz::parse_release_ids(&body, "daft punk", 3).expect("ids found");
    assert_eq!(ids, vec![DISCOVERY_RELEASE.to_string()]);
}

#[test]
fn test_parse_skips_other_artists() {
    let body = json!({
        "count": 1,
        "recordings": [
            recording(json!([{ "name": "Justice" }]), &[COMPILATION_RELEASE])
        ]
    })
    .to_string();

    assert!(matches!(
        musicbrainz::parse_release_ids(&body, "Daft Punk", 3),
        Err(ParseError::NoMatches)
    ));
}

#[test]
fn test_parse_zero_count_fails() {
    let body = json!({ "count": 0, "recordings": [] }).to_string();
    assert!(matches!(
        musicbrainz::parse_release_ids(&body, "Daft Punk", 3),
        Err(ParseError::NoResults)
    ));
}

#[test]
fn test_parse_missing_recordings_fails() {
    let body = json!({ "count": 3 }).to_string();
    assert!(matches!(
        musicbrainz::parse_release_ids(&body, "Daft Punk", 3),
        Err(ParseError::MissingField("recordings"))
    ));
}
