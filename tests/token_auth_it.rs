#![cfg(feature = "test")]

// self
use reddit_bridge::{
	_preludet::*,
	auth::{Principal, Secret, SessionResolver},
	model::Token,
	store::RecordStore,
};

#[tokio::test]
async fn malformed_and_unknown_tokens_fail_authentication() {
	let tb = build_test_bridge();
	let malformed =
		tb.bridge.me("not-a-token").await.expect_err("A malformed token should be rejected.");

	assert_eq!(malformed.http_status(), 401);
	assert_eq!(malformed.to_string(), "Invalid token.");

	let unknown = tb
		.bridge
		.me("0123456789abcdef0123456789abcdef01234567")
		.await
		.expect_err("An unknown token should be rejected.");

	assert_eq!(unknown.http_status(), 401);
	assert_eq!(unknown.to_string(), "Invalid token.");
}

#[tokio::test]
async fn dummy_client_serves_the_cached_mirror() {
	let tb = build_test_bridge();
	let (_, bearer) = insert_dummy_client(&tb.store).await;
	let me = tb.bridge.me(&bearer).await.expect("The dummy client should authenticate.");

	assert_eq!(me.status, 200);
	assert_eq!(me.body["data"]["name"], "sfdctest");
	assert_eq!(
		me.body["data"]["subscriptions"]
			.as_array()
			.expect("Identity payload should carry a subscription list.")
			.len(),
		0
	);
}

#[tokio::test]
async fn inactive_client_org_fails_authentication_cleanly() {
	let tb = build_test_bridge();
	let (mut org, bearer) = insert_dummy_client(&tb.store).await;

	org.is_active = false;

	tb.store.update_client_org(org).await.expect("Deactivating the org should succeed.");

	let err = tb.bridge.me(&bearer).await.expect_err("An inactive org should be rejected.");

	assert_eq!(err.http_status(), 401);
	assert_eq!(err.to_string(), "Client org inactive or deleted.");
}

#[tokio::test]
async fn authentication_stamps_last_request_at() {
	let tb = build_test_bridge();
	let (org, bearer) = insert_dummy_client(&tb.store).await;

	assert!(org.last_request_at.is_none());

	tb.bridge.me(&bearer).await.expect("The dummy client should authenticate.");

	let stamped = tb
		.store
		.client_org(org.id)
		.await
		.expect("Reading the org should succeed.")
		.expect("The org should still exist.");

	assert!(stamped.last_request_at.is_some());
}

#[tokio::test]
async fn replacing_a_token_invalidates_the_old_one() {
	let tb = build_test_bridge();
	let (org, old_bearer) = insert_dummy_client(&tb.store).await;
	let replacement = Token::issue(org.id);
	let new_bearer = replacement.key.expose().to_owned();

	tb.store.replace_token(replacement).await.expect("Replacing the token should succeed.");

	let err = tb.bridge.me(&old_bearer).await.expect_err("The old token should be dead.");

	assert_eq!(err.http_status(), 401);
	assert_eq!(err.to_string(), "Invalid token.");

	tb.bridge.me(&new_bearer).await.expect("The new token should authenticate.");
}

#[tokio::test]
async fn disconnect_revokes_everything() {
	let tb = build_test_bridge();

	{
		let mut world = tb.reddit.world.lock();
		let me = dummy_redditor();

		world.redditors.insert(me.name.clone(), me);
		world.grants.insert("refresh-1".into(), "sfdctest".into());
	}

	let (mut org, bearer) = insert_dummy_client(&tb.store).await;

	org.reddit_token = Some(Secret::new("refresh-1"));

	tb.store.update_client_org(org.clone()).await.expect("Attaching the grant should succeed.");

	let reply = tb.bridge.disconnect(&bearer).await.expect("Disconnecting should succeed.");

	assert_eq!(reply.status, 200);
	assert!(
		tb.reddit.world.lock().revoked.iter().any(|token| token == "refresh-1"),
		"The provider revoke should have been attempted."
	);

	let stored = tb
		.store
		.client_org(org.id)
		.await
		.expect("Reading the org should succeed.")
		.expect("The org row should survive disconnect.");

	assert!(!stored.is_active);
	assert!(stored.reddit_token.is_none());
	assert!(stored.disconnected_at.is_some());

	let err = tb.bridge.me(&bearer).await.expect_err("The bearer token should be deleted.");

	assert_eq!(err.http_status(), 401);
}

#[tokio::test]
async fn operator_resolution_degrades_to_read_only_on_dead_grants() {
	let tb = build_test_bridge();

	{
		let mut world = tb.reddit.world.lock();
		let me = dummy_redditor();

		world.redditors.insert(me.name.clone(), me);
		world.grants.insert("refresh-1".into(), "sfdctest".into());
	}

	let (mut org, _) = insert_dummy_client(&tb.store).await;

	org.reddit_token = Some(Secret::new("refresh-1"));

	tb.store.update_client_org(org.clone()).await.expect("Attaching the grant should succeed.");

	let resolver = SessionResolver::new(tb.store.clone(), Arc::new(tb.reddit.clone()));
	let live = resolver
		.resolve(&Principal::Operator { username: "sfdctest".into() })
		.await
		.expect("Operator resolution should succeed.");

	assert!(!live.session.is_read_only());
	assert_eq!(live.client_org.as_ref().map(|o| o.id), Some(org.id));

	// Kill the grant; operators still get the cached view.
	tb.reddit.world.lock().revoked.push("refresh-1".into());

	let degraded = resolver
		.resolve(&Principal::Operator { username: "sfdctest".into() })
		.await
		.expect("Operator resolution should degrade rather than fail.");

	assert!(degraded.session.is_read_only());
	assert!(degraded.client_org.is_some());

	let unknown = resolver
		.resolve(&Principal::Operator { username: "nobody".into() })
		.await
		.expect("Unknown operators should resolve to a read-only session.");

	assert!(unknown.session.is_read_only());
	assert!(unknown.client_org.is_none());
}

#[tokio::test]
async fn operator_resolution_stamps_last_request_at() {
	let tb = build_test_bridge();

	{
		let mut world = tb.reddit.world.lock();
		let me = dummy_redditor();

		world.redditors.insert(me.name.clone(), me);
		world.grants.insert("refresh-1".into(), "sfdctest".into());
	}

	let (mut org, _) = insert_dummy_client(&tb.store).await;

	org.reddit_token = Some(Secret::new("refresh-1"));

	tb.store.update_client_org(org.clone()).await.expect("Attaching the grant should succeed.");
	assert!(org.last_request_at.is_none());

	let resolver = SessionResolver::new(tb.store.clone(), Arc::new(tb.reddit.clone()));

	resolver
		.resolve(&Principal::Operator { username: "sfdctest".into() })
		.await
		.expect("Operator resolution should succeed.");

	let stamped = tb
		.store
		.client_org(org.id)
		.await
		.expect("Reading the org should succeed.")
		.expect("The org should still exist.");

	assert!(stamped.last_request_at.is_some());
}
