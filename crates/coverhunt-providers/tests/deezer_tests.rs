use coverhunt_providers::deezer;
use coverhunt_providers::ParseError;
use serde_json::json;

fn track(title: &str, artist: &str, rank: i64, cover: &str) -> serde_json::Value {
    json!({
        "title": title,
        "rank": rank,
        "artist": {
            "name": artist,
            "picture_xl": format!("https://e-cdns-images.dzcdn.net/images/artist/{}/1000x1000.jpg", artist.replace(' ', ""))
        },
        "album": {
            "cover_big": format!("https://e-cdns-images.dzcdn.net/images/cover/{cover}/500x500.jpg"),
            "cover_xl": format!("https://e-cdns-images.dzcdn.net/images/cover/{cover}/1000x1000.jpg")
        }
    })
}

#[test]
fn test_parse_sorts_by_rank_before_matching() {
    let body = json!({
        "total": 3,
        "data": [
            track("Discovery", "Daft Punk", 100, "low"),
            track("Discovery", "Daft Punk", 900, "high"),
            track("Discovery", "Daft Punk", 500, "mid")
        ]
    })
    .to_string();

    let urls = deezer::parse(&body, "Daft Punk", "Discovery", 2).expect("matches found");
    assert_eq!(
        urls,
        vec![
            "https://e-cdns-images.dzcdn.net/images/cover/high/1200x1200.jpg".to_string(),
            "https://e-cdns-images.dzcdn.net/images/cover/mid/1200x1200.jpg".to_string(),
        ]
    );
}

#[test]
fn test_parse_falls_back_to_artist_only_matches() {
    let body = json!({
        "total": 2,
        "data": [
            track("One More Time", "Daft Punk", 900, "single"),
            track("Discovery", "Daft Punk", 100, "album")
        ]
    })
    .to_string();

    let urls = deezer::parse(&body, "Daft Punk", "Discovery", 5).expect("matches found");
    assert_eq!(
        urls,
        vec![
            "https://e-cdns-images.dzcdn.net/images/cover/album/1200x1200.jpg".to_string(),
            "https://e-cdns-images.dzcdn.net/images/cover/single/1200x1200.jpg".to_string(),
        ]
    );
}

#[test]
fn test_parse_uses_cover_big_when_xl_missing() {
    let body = json!({
        "total": 1,
        "data": [{
            "title": "Discovery",
            "rank": 1,
            "artist": { "name": "Daft Punk" },
            "album": { "cover_big": "https://e-cdns-images.dzcdn.net/images/cover/x/500x500.jpg" }
        }]
    })
    .to_string();

    let urls = deezer::parse(&body, "Daft Punk", "Discovery", 3).expect("match found");
    assert_eq!(
        urls,
        vec!["https://e-cdns-images.dzcdn.net/images/cover/x/500x500.jpg".to_string()]
    );
}

#[test]
fn test_parse_deduplicates_shared_album_cover() {
    let body = json!({
        "total": 2,
        "data": [
            track("Discovery", "Daft Punk", 10, "same"),
            track("Discovery", "Daft Punk", 5, "same")
        ]
    })
    .to_string();

    let urls = deezer::parse(&body, "Daft Punk", "Discovery", 5).expect("match found");
    assert_eq!(urls.len(), 1);
}

#[test]
fn test_parse_zero_total_fails() {
    let body = json!({ "total": 0, "data": [] }).to_string();
    assert!(matches!(
        deezer::parse(&body, "Daft Punk", "Discovery", 3),
        Err(ParseError::NoResults)
    ));
}

#[test]
fn test_parse_api_error_fails() {
    let body = json!({ "error": { "type": "Exception", "message": "Quota limit exceeded", "code": 4 } })
        .to_string();
    assert!(matches!(
        deezer::parse(&body, "Daft Punk", "Discovery", 3),
        Err(ParseError::Api(_))
    ));
}

#[test]
fn test_parse_missing_artist_is_malformed() {
    let body = json!({ "total": 1, "data": [{ "title": "Discovery", "rank": 1 }] }).to_string();
    assert!(matches!(
        deezer::parse(&body, "Daft Punk", "Discovery", 3),
        Err(ParseError::Malformed(_))
    ));
}

#[test]
fn test_parse_artist_images() {
    let body = json!({
        "total": 3,
        "data": [
            track("Discovery", "Daft Punk", 10, "a"),
            track("Digital Love", "Daft Punk", 5, "b"),
            track("D.A.N.C.E.", "Justice", 50, "c")
        ]
    })
    .to_string();

    let urls = deezer::parse_artist_images(&body, "Daft Punk", 3).expect("picture found");
    assert_eq!(
        urls,
        vec!["https://e-cdns-images.dzcdn.net/images/artist/DaftPunk/1200x1200.jpg".to_string()]
    );
}
