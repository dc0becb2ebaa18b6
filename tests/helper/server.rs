//! Static data API and CDN fixtures served by mockito

use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;

pub const API_KEY: &str = "test-key";

/// Realm document whose CDN points back at the mock server
pub fn realm_body(server: &ServerGuard, version: &str) -> String {
    json!({
        "v": version,
        "cdn": format!("{}/cdn", server.url()),
        "profileiconmax": 28,
        "n": {
            "champion": version,
            "summoner": version,
            "language": version,
            "map": version,
            "item": version,
            "mastery": version,
            "rune": version,
            "profileicon": version
        }
    })
    .to_string()
}

/// Two champions with three skins between them
pub fn champions_body() -> String {
    json!({
        "type": "champion",
        "version": "5.15.1",
        "data": {
            "Aatrox": {
                "id": 266,
                "key": "Aatrox",
                "name": "Aatrox",
                "title": "the Darkin Blade",
                "blurb": "Aatrox is a legendary warrior.",
                "skins": [
                    { "id": 266000, "num": 0, "name": "default" },
                    { "id": 266001, "num": 1, "name": "Justicar Aatrox" }
                ]
            },
            "Ahri": {
                "id": 103,
                "key": "Ahri",
                "name": "Ahri",
                "title": "the Nine-Tailed Fox",
                "blurb": "Unlike other foxes that roamed the woods of southern Ionia...",
                "skins": [
                    { "id": 103000, "num": 0, "name": "default" }
                ]
            }
        }
    })
    .to_string()
}

/// Realm endpoint expecting `hits` requests
pub async fn mock_realm(server: &mut ServerGuard, version: &str, hits: usize) -> Mock {
    let body = realm_body(server, version);
    server
        .mock("GET", "/api/lol/static-data/na/v1.2/realm")
        .match_query(Matcher::UrlEncoded("api_key".into(), API_KEY.into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(hits)
        .create_async()
        .await
}

pub async fn mock_champions(server: &mut ServerGuard, status: usize, hits: usize) -> Mock {
    server
        .mock("GET", "/api/lol/static-data/na/v1.2/champion")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("champData".into(), "blurb,skins".into()),
            Matcher::UrlEncoded("api_key".into(), API_KEY.into()),
        ]))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(if status == 200 {
            champions_body()
        } else {
            r#"{"status": {"message": "Internal server error"}}"#.to_string()
        })
        .expect(hits)
        .create_async()
        .await
}

/// Serve every CDN image, except splash art which answers `splash_status`
pub async fn mock_images(server: &mut ServerGuard, splash_status: usize) -> (Mock, Mock) {
    let splash = server
        .mock("GET", Matcher::Regex(r"^/cdn/img/champion/splash/".to_string()))
        .with_status(splash_status)
        .with_body("splash")
        .create_async()
        .await;
    let others = server
        .mock(
            "GET",
            Matcher::Regex(r"^/cdn/(\d+\.\d+\.\d+/img/champion|img/champion/loading)/".to_string()),
        )
        .with_status(200)
        .with_body("image")
        .create_async()
        .await;
    (splash, others)
}
