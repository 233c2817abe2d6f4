use murmur_backend::api;
use murmur_backend::auth::SessionService;
use murmur_backend::bootstrap;
use murmur_backend::config::{MurmurConfig, MurmurPaths};
use serde_json::json;
use tempfile::{tempdir, TempDir};
use tokio::time::{sleep, Duration};

struct TestServer {
    _dir: TempDir,
    base_url: String,
    server: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn shutdown(self) {
        self.server.abort();
        let _ = self.server.await;
    }
}

fn next_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .expect("bind ephemeral port")
        .local_addr()
        .unwrap()
        .port()
}

async fn wait_for_health(base_url: &str) {
    let client = reqwest::Client::new();
    for _ in 0..50 {
        if let Ok(resp) = client.get(format!("{base_url}/health")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        sleep(Duration::from_millis(100)).await;
    }
    panic!("server did not become healthy in time");
}

async fn spawn_server() -> TestServer {
    let dir = tempdir().expect("tempdir");
    let port = next_port();
    let config = MurmurConfig::new(
        port,
        MurmurPaths::from_base_dir(dir.path()).expect("paths"),
    );

    let resources = bootstrap::initialize(&config).expect("bootstrap");
    let sessions = SessionService::new(resources.database.clone(), &resources.session_secret);
    let database = resources.database.clone();

    let server = tokio::spawn(async move {
        let _ = api::serve_http(config, database, sessions).await;
    });

    let base_url = format!("http://127.0.0.1:{port}");
    wait_for_health(&base_url).await;

    TestServer {
        _dir: dir,
        base_url,
        server,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rest_feed_roundtrip() {
    let node = spawn_server().await;
    let base_url = node.base_url.clone();
    let client = reqwest::Client::new();

    // Handles are validated at sign-in with a field-level error.
    let resp = client
        .post(format!("{base_url}/session"))
        .json(&json!({ "handle": "not a handle" }))
        .send()
        .await
        .expect("bad sign-in response");
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json().await.expect("bad sign-in json");
    assert_eq!(body["field"], "handle");

    let resp = client
        .post(format!("{base_url}/session"))
        .json(&json!({ "handle": "alice", "display_name": "Alice" }))
        .send()
        .await
        .expect("sign-in response");
    assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
    let session: serde_json::Value = resp.json().await.expect("session json");
    let token = session
        .get("token")
        .and_then(|t| t.as_str())
        .expect("session token")
        .to_string();
    assert_eq!(session["user"]["handle"], "alice");

    // Posting anonymously is rejected.
    let resp = client
        .post(format!("{base_url}/posts"))
        .json(&json!({ "body": "hello" }))
        .send()
        .await
        .expect("anonymous post response");
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    // Empty bodies surface as field-level validation errors.
    let resp = client
        .post(format!("{base_url}/posts"))
        .bearer_auth(&token)
        .json(&json!({ "body": "   " }))
        .send()
        .await
        .expect("empty post response");
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json().await.expect("error json");
    assert_eq!(body["field"], "content");

    for body in ["first murmur", "second murmur"] {
        let resp = client
            .post(format!("{base_url}/posts"))
            .bearer_auth(&token)
            .json(&json!({ "body": body }))
            .send()
            .await
            .expect("create post response");
        assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
    }

    // Feed is public and newest-first, with authors attached.
    let feed: serde_json::Value = client
        .get(format!("{base_url}/posts"))
        .send()
        .await
        .expect("feed response")
        .json()
        .await
        .expect("feed json");
    let posts = feed["posts"].as_array().expect("posts array");
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0]["post"]["body"], "second murmur");
    assert_eq!(posts[0]["author"]["handle"], "alice");
    assert_eq!(posts[1]["post"]["body"], "first murmur");

    let me: serde_json::Value = client
        .get(format!("{base_url}/session/me"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("me response")
        .json()
        .await
        .expect("me json");
    assert_eq!(me["handle"], "alice");

    // Sign-out revokes the token.
    let resp = client
        .delete(format!("{base_url}/session"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("sign-out response");
    assert_eq!(resp.status(), reqwest::StatusCode::NO_CONTENT);

    let resp = client
        .post(format!("{base_url}/posts"))
        .bearer_auth(&token)
        .json(&json!({ "body": "after sign-out" }))
        .send()
        .await
        .expect("post after sign-out");
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    node.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn feed_limit_is_respected() {
    let node = spawn_server().await;
    let base_url = node.base_url.clone();
    let client = reqwest::Client::new();

    let session: serde_json::Value = client
        .post(format!("{base_url}/session"))
        .json(&json!({ "handle": "bob" }))
        .send()
        .await
        .expect("sign-in response")
        .json()
        .await
        .expect("session json");
    let token = session["token"].as_str().expect("token").to_string();

    for i in 0..5 {
        client
            .post(format!("{base_url}/posts"))
            .bearer_auth(&token)
            .json(&json!({ "body": format!("murmur {i}") }))
            .send()
            .await
            .expect("create post response");
    }

    let feed: serde_json::Value = client
        .get(format!("{base_url}/posts?limit=3"))
        .send()
        .await
        .expect("feed response")
        .json()
        .await
        .expect("feed json");
    let posts = feed["posts"].as_array().expect("posts array");
    assert_eq!(posts.len(), 3);
    assert_eq!(posts[0]["post"]["body"], "murmur 4");

    node.shutdown().await;
}
