mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

/// Every protected route must reject anonymous requests before doing any work
#[tokio::test]
async fn chart_routes_require_auth() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let chart_id = "7b6fd2f0-0cf8-4f2e-9df1-111111111111";

    let list = client
        .get(format!("{}/api/charts", server.base_url))
        .send()
        .await?;
    assert_eq!(list.status(), StatusCode::UNAUTHORIZED);

    let create = client
        .post(format!("{}/api/charts", server.base_url))
        .json(&json!({
            "name": "My chart",
            "birth_date": "1990-06-15",
            "birth_time": "08:30",
            "birth_timezone": "Europe/Berlin",
            "birth_latitude": 52.52,
            "birth_longitude": 13.40,
            "birth_city": "Berlin",
            "birth_country": "Germany"
        }))
        .send()
        .await?;
    assert_eq!(create.status(), StatusCode::UNAUTHORIZED);

    let fetch = client
        .get(format!("{}/api/charts/{}", server.base_url, chart_id))
        .send()
        .await?;
    assert_eq!(fetch.status(), StatusCode::UNAUTHORIZED);

    let transits = client
        .post(format!("{}/api/charts/{}/transits", server.base_url, chart_id))
        .send()
        .await?;
    assert_eq!(transits.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn horoscope_routes_require_auth() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for path in [
        "/api/horoscopes/daily?sign=aries",
        "/api/horoscopes/all-signs",
        "/api/horoscopes/weekly?sign=leo",
        "/api/horoscopes/monthly?sign=leo",
    ] {
        let res = client
            .get(format!("{}{}", server.base_url, path))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "path: {}", path);

        let body = res.json::<serde_json::Value>().await?;
        assert_eq!(body["code"], "UNAUTHORIZED", "path: {}", path);
    }

    Ok(())
}

#[tokio::test]
async fn unknown_route_is_404() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/tarot", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
