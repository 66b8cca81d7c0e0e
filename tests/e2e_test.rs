/// E2E tests over a real listener.
/// The server is started in-process on an ephemeral port, and the session
/// travels in the cookie jar rather than a bearer header.
use reqwest::Client;
use serde_json::{json, Value};
use shelfmark::config::Config;
use shelfmark::db;
use shelfmark::routes;
use shelfmark::state::AppState;
use tempfile::TempDir;

async fn spawn_server() -> Result<(String, TempDir), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let pool = db::create_pool(&temp_dir.path().join("e2e.db"))?;
    db::run_migrations(&pool)?;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let base_url = format!("http://{}", listener.local_addr()?);

    let mut config = Config::default();
    config.server.public_url = base_url.clone();
    config.auth.bcrypt_cost = 4;
    let app = routes::router(AppState::new(pool, config)?);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("test server stopped: {}", e);
        }
    });

    Ok((base_url, temp_dir))
}

#[tokio::test]
async fn test_cookie_session_and_page_links() -> Result<(), Box<dyn std::error::Error>> {
    let (base_url, _tmp) = spawn_server().await?;
    let client = Client::builder().cookie_store(true).build()?;

    let credentials = json!({ "username": "curator", "password": "long-enough-password" });
    let response = client
        .post(format!("{}/auth/register", base_url))
        .json(&credentials)
        .send()
        .await?;
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/auth/login", base_url))
        .json(&credentials)
        .send()
        .await?;
    assert_eq!(response.status(), 200);
    assert!(response
        .cookies()
        .any(|c| c.name() == "shelfmark_session"));

    // the cookie alone authenticates from here on
    let response = client.get(format!("{}/auth/me", base_url)).send().await?;
    assert_eq!(response.status(), 200);
    let me: Value = response.json().await?;
    assert_eq!(me["role"], "ADMIN");

    for title in ["Nausicaa", "Berserk", "Monster"] {
        let response = client
            .post(format!("{}/mangas", base_url))
            .json(&json!({ "title": title, "volumes": 7 }))
            .send()
            .await?;
        assert_eq!(response.status(), 201);
    }

    // follow the next_page links until they run out
    let mut url = format!("{}/mangas?limit=2", base_url);
    let mut titles = Vec::new();
    loop {
        let page: Value = client.get(&url).send().await?.json().await?;
        for article in page["data"].as_array().ok_or("data is not an array")? {
            titles.push(article["title"].as_str().unwrap_or_default().to_string());
        }
        match page["next_page"].as_str() {
            Some(next) if !next.is_empty() => url = next.to_string(),
            _ => break,
        }
    }
    assert_eq!(titles, vec!["Monster", "Berserk", "Nausicaa"]);

    let response = client.post(format!("{}/auth/logout", base_url)).send().await?;
    assert_eq!(response.status(), 204);
    let response = client.get(format!("{}/auth/me", base_url)).send().await?;
    assert_eq!(response.status(), 401);

    Ok(())
}
