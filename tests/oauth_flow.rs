//! End-to-end token flows against a mocked Discord.

use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use discord_oauth2::{AccessToken, Client, Error, OauthApi};

fn token_body() -> serde_json::Value {
    serde_json::json!({
        "access_token": "6qrZcUqja7812RVdnEKjpzOL4CvHBFG",
        "token_type": "Bearer",
        "expires_in": 604800,
        "refresh_token": "D43f5y0ahjqew82jZ4NViEr2YafMKhue",
        "scope": "identify guilds"
    })
}

fn bearer() -> AccessToken {
    serde_json::from_value(token_body()).unwrap()
}

fn client_for(server: &MockServer) -> Client {
    Client::builder(
        80351110224678912u64,
        "client-secret-value",
        "https://example.invalid/callback",
        &["identify", "guilds"],
    )
    .api_url(server.uri())
    .build()
    .unwrap()
}

#[tokio::test]
async fn exchange_code_posts_the_code_grant_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=my_code"))
        .and(body_string_contains("client_id=80351110224678912"))
        .and(body_string_contains("client_secret=client-secret-value"))
        .and(body_string_contains(
            "redirect_uri=https%3A%2F%2Fexample.invalid%2Fcallback",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let token = client.exchange_code("my_code").await.unwrap();

    assert_eq!(token.access_token(), "6qrZcUqja7812RVdnEKjpzOL4CvHBFG");
    assert_eq!(token.token_type(), "Bearer");
    assert!(!token.is_expired());
    assert_eq!(token.scopes().collect::<Vec<_>>(), ["identify", "guilds"]);
}

#[tokio::test]
async fn a_consumed_code_fails_the_same_way_every_time() {
    let server = MockServer::start().await;
    // The first exchange succeeds and consumes the code.
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("code=one_shot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    // Afterwards the code is dead, no matter how often it is retried.
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "Invalid \"code\" in request."
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.exchange_code("one_shot").await.unwrap();

    let second = client.exchange_code("one_shot").await.unwrap_err();
    let third = client.exchange_code("one_shot").await.unwrap_err();
    assert!(matches!(second, Error::Auth { status: 400, .. }));
    assert!(matches!(third, Error::Auth { status: 400, .. }));
}

#[tokio::test]
async fn refresh_posts_the_refresh_grant_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains(
            "refresh_token=D43f5y0ahjqew82jZ4NViEr2YafMKhue",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let token = bearer();
    let refreshed = client
        .refresh_token(token.refresh_token().unwrap())
        .await
        .unwrap();
    assert_eq!(refreshed.expires_in(), 604800);
}

#[tokio::test]
async fn revoke_succeeds_even_for_tokens_that_are_already_dead() {
    let server = MockServer::start().await;
    // Discord answers 200 regardless of whether the token was live.
    Mock::given(method("POST"))
        .and(path("/oauth2/token/revoke"))
        .and(body_string_contains("client_secret=client-secret-value"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .revoke_token("6qrZcUqja7812RVdnEKjpzOL4CvHBFG")
        .await
        .unwrap();
    client
        .revoke_token("6qrZcUqja7812RVdnEKjpzOL4CvHBFG")
        .await
        .unwrap();
}

#[tokio::test]
async fn authorization_info_describes_the_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth2/@me"))
        .and(header(
            "authorization",
            "Bearer 6qrZcUqja7812RVdnEKjpzOL4CvHBFG",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "application": {
                "id": "159799960412356608",
                "name": "AIRHORN SOLUTIONS",
                "icon": "f03590d3eb764081d154a66340ea7d6d",
                "description": "",
                "hook": true,
                "bot_public": true,
                "bot_require_code_grant": false,
                "verify_key": "c8cde6a3c8c6e49d7bb5efca0021e90c"
            },
            "scopes": ["guilds", "identify"],
            "expires": "2021-08-31T20:15:39.954000+00:00",
            "user": {
                "id": "268473310986240001",
                "username": "discord",
                "discriminator": "0001",
                "avatar": "f749bb0cbeeb26ef21eca719337d20f1",
                "public_flags": 131072
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let info = client.fetch_authorization_info(&bearer()).await.unwrap();

    assert_eq!(info.application.name, "AIRHORN SOLUTIONS");
    assert_eq!(info.scopes, ["guilds", "identify"]);
    assert_eq!(info.user.unwrap().username, "discord");
}

#[tokio::test]
async fn a_server_error_maps_onto_the_api_variant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(
            ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.exchange_code("any").await.unwrap_err();
    assert!(matches!(err, Error::Api { status: 502, .. }));
}
