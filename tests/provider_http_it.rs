#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use reddit_bridge::{
	auth::Secret,
	config::{RedditAppConfig, SalesforceAppConfig},
	provider::{ProviderError, RedditApp, SalesforceApp, VoteDirection, http::{HttpRedditApp, HttpSalesforceApp}},
	url::Url,
};

fn reddit_config() -> RedditAppConfig {
	RedditAppConfig::new(
		"reddit-id",
		"reddit-secret",
		"bridge-tests/0.1",
		Url::parse("https://bridge.example.com/clients/oauth_callback")
			.expect("Redirect URI fixture should parse successfully."),
	)
}

fn reddit_app(server: &MockServer) -> HttpRedditApp {
	let base = Url::parse(&server.base_url()).expect("Mock server URL should parse.");

	HttpRedditApp::with_endpoints(reddit_config(), base.clone(), base)
		.expect("Building the HTTP app should succeed.")
}

#[test]
fn authorize_url_carries_the_oauth_parameters() {
	let app = HttpRedditApp::new(reddit_config()).expect("Building the HTTP app should succeed.");
	let url = app.authorize_url("12345");
	let pairs = url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect::<Vec<_>>();

	assert_eq!(url.host_str(), Some("www.reddit.com"));
	assert_eq!(url.path(), "/api/v1/authorize");
	assert!(pairs.contains(&("client_id".into(), "reddit-id".into())));
	assert!(pairs.contains(&("response_type".into(), "code".into())));
	assert!(pairs.contains(&("state".into(), "12345".into())));
	assert!(pairs.contains(&("duration".into(), "permanent".into())));
	assert!(pairs.contains(&("scope".into(), "*".into())));
}

#[tokio::test]
async fn exchange_code_posts_the_authorization_grant() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/v1/access_token")
				.body_includes("grant_type=authorization_code")
				.body_includes("code=the-code");
			then.status(200).json_body(json!({
				"access_token": "acc-1",
				"refresh_token": "ref-1",
				"token_type": "bearer",
				"expires_in": 3600,
			}));
		})
		.await;
	let app = reddit_app(&server);
	let refresh = app
		.exchange_code("the-code")
		.await
		.expect("The code exchange should succeed.");

	assert_eq!(refresh.expose(), "ref-1");
	token_mock.assert_async().await;
}

#[tokio::test]
async fn session_fetches_a_token_then_the_identity() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/v1/access_token")
				.body_includes("grant_type=refresh_token")
				.body_includes("refresh_token=ref-1");
			then.status(200).json_body(json!({ "access_token": "acc-1", "token_type": "bearer" }));
		})
		.await;

	let me_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v1/me")
				.query_param("raw_json", "1")
				.header("authorization", "Bearer acc-1");
			then.status(200).json_body(json!({
				"id": "4rfkxa54",
				"name": "sfdctest",
				"created_utc": 1572549765.0,
				"has_verified_email": true,
				"icon_img": "https://example.com/avatar.png",
				"comment_karma": 42,
				"link_karma": 7,
			}));
		})
		.await;
	let app = reddit_app(&server);
	let session = app.session(Some(&Secret::new("ref-1")));
	let me = session.me().await.expect("The identity call should succeed.");

	assert_eq!(me.name, "sfdctest");
	assert_eq!(me.created_utc.unix_timestamp(), 1572549765);
	me_mock.assert_async().await;

	// The access token is cached, so a second call hits /me once more only.
	session.check().await.expect("The cached token should still work.");
	me_mock.assert_hits_async(2).await;
}

#[tokio::test]
async fn missing_subreddits_read_as_none() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/access_token");
			then.status(200).json_body(json!({ "access_token": "acc-1" }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/r/missing/about");
			then.status(404).json_body(json!({ "message": "Not Found", "error": 404 }));
		})
		.await;

	let app = reddit_app(&server);
	let session = app.session(None);
	let subreddit =
		session.subreddit("missing").await.expect("A 404 should not be an error.");

	assert!(subreddit.is_none());
}

#[tokio::test]
async fn expired_grants_surface_as_auth_errors() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/access_token");
			then.status(400).json_body(json!({ "error": "invalid_grant" }));
		})
		.await;

	let app = reddit_app(&server);
	let session = app.session(Some(&Secret::new("dead-refresh")));
	let err = session.check().await.expect_err("A rejected refresh should fail.");

	assert!(matches!(err, ProviderError::AuthExpired));
}

#[tokio::test]
async fn votes_post_the_fullname_and_direction() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/access_token");
			then.status(200).json_body(json!({ "access_token": "acc-1" }));
		})
		.await;

	let vote_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/vote")
				.header("authorization", "Bearer acc-1")
				.body_includes("id=t3_abc123")
				.body_includes("dir=1");
			then.status(200).json_body(json!({}));
		})
		.await;
	let app = reddit_app(&server);
	let session = app.session(Some(&Secret::new("ref-1")));
	let direction = VoteDirection::from_value(1).expect("1 should be a valid vote value.");

	session.vote("t3_abc123", direction).await.expect("The vote should succeed.");
	vote_mock.assert_async().await;
}

#[tokio::test]
async fn salesforce_exchange_decodes_the_grant() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/services/oauth2/token")
				.body_includes("grant_type=authorization_code")
				.body_includes("client_id=sf-key");
			then.status(200).json_body(json!({
				"access_token": "sf-access",
				"refresh_token": "sf-refresh",
				"instance_url": "https://dummy.my.salesforce.com",
				"id": "https://login.salesforce.com/id/00D5g000004NVq7EAG/0055g000004XvDkAAK",
				"issued_at": "1572549765000",
				"signature": "c2ln",
				"token_type": "Bearer",
			}));
		})
		.await;
	let config = SalesforceAppConfig::new(
		"sf-key",
		"sf-secret",
		Url::parse("https://bridge.example.com/clients/salesforce_oauth_callback")
			.expect("Redirect URI fixture should parse successfully."),
	)
	.with_login_url(Url::parse(&server.base_url()).expect("Mock server URL should parse."));
	let app = HttpSalesforceApp::new(config).expect("Building the HTTP app should succeed.");
	let grant = app.exchange_code("sf-code").await.expect("The code exchange should succeed.");

	assert_eq!(grant.access_token.expose(), "sf-access");
	assert_eq!(grant.instance_url, "https://dummy.my.salesforce.com");
	assert_eq!(grant.identity.org_id(), Some("00D5g000004NVq7EAG"));
	token_mock.assert_async().await;
}
