//! Proves the client paces itself off rate limit headers instead of
//! tripping 429s, against a server that actually enforces a budget.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use discord_oauth2::{Client, UsersApi};

fn user_body() -> serde_json::Value {
    serde_json::json!({
        "id": "80351110224678912",
        "username": "Nelly",
        "discriminator": "1337",
        "avatar": "8342729096ea3675442027381ff50dfe"
    })
}

struct WindowState {
    started: Instant,
    used: u32,
    rejected: u32,
}

/// A fixed-window endpoint: `limit` requests per `window`, then 429s
/// until the window rolls over. Every 200 carries the same headers
/// Discord sends, so the client can learn the budget.
#[derive(Clone)]
struct BudgetedEndpoint {
    limit: u32,
    window: Duration,
    state: Arc<Mutex<WindowState>>,
}

impl BudgetedEndpoint {
    fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            state: Arc::new(Mutex::new(WindowState {
                started: Instant::now(),
                used: 0,
                rejected: 0,
            })),
        }
    }

    fn rejected(&self) -> u32 {
        self.state.lock().unwrap().rejected
    }
}

impl Respond for BudgetedEndpoint {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let mut state = self.state.lock().unwrap();
        let now = Instant::now();
        if now.duration_since(state.started) >= self.window {
            state.started = now;
            state.used = 0;
        }
        let reset_in = self.window.saturating_sub(now.duration_since(state.started));

        if state.used >= self.limit {
            state.rejected += 1;
            return ResponseTemplate::new(429)
                .insert_header("retry-after", reset_in.as_secs().max(1).to_string())
                .set_body_json(serde_json::json!({
                    "message": "You are being rate limited.",
                    "retry_after": reset_in.as_secs_f64(),
                    "global": false
                }));
        }

        state.used += 1;
        let remaining = self.limit - state.used;
        ResponseTemplate::new(200)
            .insert_header("x-ratelimit-limit", self.limit.to_string())
            .insert_header("x-ratelimit-remaining", remaining.to_string())
            .insert_header(
                "x-ratelimit-reset-after",
                format!("{:.3}", reset_in.as_secs_f64()),
            )
            .insert_header("x-ratelimit-bucket", "abcd1234")
            .set_body_json(user_body())
    }
}

fn client_for(server: &MockServer) -> Client {
    Client::builder(
        80351110224678912u64,
        "client-secret-value",
        "https://example.invalid/callback",
        &["identify"],
    )
    .api_url(server.uri())
    .build()
    .unwrap()
}

fn bearer() -> discord_oauth2::AccessToken {
    serde_json::from_value(serde_json::json!({
        "access_token": "6qrZcUqja7812RVdnEKjpzOL4CvHBFG",
        "token_type": "Bearer",
        "expires_in": 604800,
        "scope": "identify"
    }))
    .unwrap()
}

#[tokio::test]
async fn sequential_bursts_never_see_a_429() {
    let server = MockServer::start().await;
    let endpoint = BudgetedEndpoint::new(2, Duration::from_millis(400));
    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .respond_with(endpoint.clone())
        .mount(&server)
        .await;

    let client = client_for(&server);
    let token = bearer();

    // Six requests through a budget of two per window forces at least
    // two full waits, and every single one must come back 200.
    let started = Instant::now();
    for _ in 0..6 {
        client.fetch_user(&token).await.unwrap();
    }

    assert_eq!(endpoint.rejected(), 0);
    assert!(started.elapsed() >= Duration::from_millis(600));
    assert_eq!(server.received_requests().await.unwrap().len(), 6);
}

#[tokio::test]
async fn concurrent_callers_queue_on_the_bucket() {
    let server = MockServer::start().await;
    let endpoint = BudgetedEndpoint::new(2, Duration::from_millis(300));
    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .respond_with(endpoint.clone())
        .mount(&server)
        .await;

    let client = client_for(&server);

    // A cold-start stampede: the first task probes the route while the
    // rest queue behind it, then everyone spends the learned budget.
    let mut tasks = Vec::new();
    for _ in 0..6 {
        let client = client.clone();
        let token = bearer();
        tasks.push(tokio::spawn(async move {
            client.fetch_user(&token).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(endpoint.rejected(), 0);
    assert_eq!(server.received_requests().await.unwrap().len(), 6);
}

#[tokio::test]
async fn an_unpaced_client_would_have_been_rejected() {
    // Sanity check on the mock itself: raw requests over budget do 429.
    let server = MockServer::start().await;
    let endpoint = BudgetedEndpoint::new(2, Duration::from_secs(30));
    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .respond_with(endpoint.clone())
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    for _ in 0..4 {
        http.get(format!("{}/users/@me", server.uri()))
            .send()
            .await
            .unwrap();
    }
    assert_eq!(endpoint.rejected(), 2);
}
