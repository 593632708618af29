#![cfg(feature = "test")]

// self
use reddit_bridge::{
	_preludet::*,
	api::subreddits::SubmissionListingQuery,
	auth::Secret,
	model::{NewClientOrg, Redditor, SalesforceOrg, Token},
	provider::SubredditRule,
	store::RecordStore,
};

async fn connected_client(tb: &TestBridge) -> String {
	let me = dummy_redditor();

	{
		let mut world = tb.reddit.world.lock();

		world.redditors.insert(me.name.clone(), me.clone());
		world.grants.insert("refresh-1".into(), "sfdctest".into());
	}

	tb.store
		.upsert_redditor(Redditor::from(&me))
		.await
		.expect("Seeding the redditor mirror should succeed.");
	tb.store
		.upsert_salesforce_org(SalesforceOrg::new(DUMMY_ORG_ID, DUMMY_ORG_NAME))
		.await
		.expect("Seeding the org should succeed.");

	let org = tb
		.store
		.insert_client_org(NewClientOrg {
			redditor_id: me.id,
			salesforce_org_id: DUMMY_ORG_ID.into(),
			reddit_token: Some(Secret::new("refresh-1")),
		})
		.await
		.expect("Seeding the client org should succeed.");
	let token = Token::issue(org.id);
	let bearer = token.key.expose().to_owned();

	tb.store.replace_token(token).await.expect("Seeding the token should succeed.");

	bearer
}

fn seed_subreddit(tb: &TestBridge, display_name: &str) {
	let subreddit = dummy_subreddit(display_name);

	tb.reddit.world.lock().subreddits.insert(display_name.to_owned(), subreddit);
}

#[tokio::test]
async fn info_refreshes_the_mirror_idempotently() {
	let tb = build_test_bridge();
	let bearer = connected_client(&tb).await;

	seed_subreddit(&tb, "salesforce");

	for _ in 0..2 {
		let reply = tb
			.bridge
			.subreddit_info(&bearer, "salesforce")
			.await
			.expect("The subreddit lookup should succeed.");

		assert_eq!(reply.status, 200);
		assert_eq!(reply.body["data"]["display_name"], "salesforce");
	}

	let mirror = tb
		.store
		.subreddit("id_salesforce")
		.await
		.expect("Reading the mirror should succeed.")
		.expect("The subreddit mirror should be persisted.");

	assert_eq!(mirror.display_name, "salesforce");
}

#[tokio::test]
async fn unknown_subreddit_reports_the_exact_detail() {
	let tb = build_test_bridge();
	let bearer = connected_client(&tb).await;
	let err = tb
		.bridge
		.subreddit_info(&bearer, "nope")
		.await
		.expect_err("An unknown subreddit should be rejected.");

	assert_eq!(err.http_status(), 404);
	assert_eq!(err.to_string(), "No subreddit exists with the name: nope.");
}

#[tokio::test]
async fn connect_subscribes_and_links() {
	let tb = build_test_bridge();
	let bearer = connected_client(&tb).await;

	seed_subreddit(&tb, "salesforce");

	let reply = tb
		.bridge
		.subreddit_connect(&bearer, "salesforce")
		.await
		.expect("Connecting the subreddit should succeed.");

	assert_eq!(reply.status, 201);
	assert!(
		tb.reddit
			.world
			.lock()
			.subscriptions
			.get("sfdctest")
			.is_some_and(|subs| subs.iter().any(|sub| sub == "salesforce")),
		"Connecting should subscribe the account."
	);

	let subscriptions =
		tb.bridge.subscriptions(&bearer).await.expect("Listing subscriptions should succeed.");

	assert_eq!(subscriptions.body["data"]["subscriptions"][0]["display_name"], "salesforce");

	let disconnect = tb
		.bridge
		.subreddit_disconnect(&bearer, "salesforce")
		.await
		.expect("Disconnecting the subreddit should succeed.");

	assert_eq!(disconnect.status, 200);
	assert_eq!(
		disconnect.body["data"]["detail"],
		"Successfully disconnected from the subreddit: salesforce."
	);
}

#[tokio::test]
async fn subscribe_actions_respect_session_and_state() {
	let tb = build_test_bridge();
	let bearer = connected_client(&tb).await;

	seed_subreddit(&tb, "salesforce");
	tb.reddit.world.lock().subscriptions.insert("sfdctest".into(), vec!["salesforce".into()]);

	let already = tb
		.bridge
		.subreddit_subscribe(&bearer, "salesforce")
		.await
		.expect("Subscribing while subscribed should short-circuit.");

	assert_eq!(already.status, 200);
	assert_eq!(
		already.body["data"]["detail"],
		"Already subscribed to the subreddit: salesforce."
	);

	let unsubscribed = tb
		.bridge
		.subreddit_unsubscribe(&bearer, "salesforce")
		.await
		.expect("Unsubscribing should succeed.");

	assert_eq!(
		unsubscribed.body["data"]["detail"],
		"Successfully unsubscribed from the subreddit: salesforce."
	);

	let (_, read_only_bearer) = insert_dummy_client(&tb.store).await;
	let err = tb
		.bridge
		.subreddit_subscribe(&read_only_bearer, "salesforce")
		.await
		.expect_err("A read-only session should not subscribe.");

	assert_eq!(err.http_status(), 405);
}

#[tokio::test]
async fn rules_come_back_in_listing_order() {
	let tb = build_test_bridge();
	let bearer = connected_client(&tb).await;

	seed_subreddit(&tb, "salesforce");
	tb.reddit.world.lock().rules.insert(
		"salesforce".into(),
		vec![SubredditRule {
			short_name: "Be civil".into(),
			description: Some("No personal attacks.".into()),
			violation_reason: Some("Incivility".into()),
			kind: "all".into(),
			priority: 0,
		}],
	);

	let reply = tb
		.bridge
		.subreddit_rules(&bearer, "salesforce")
		.await
		.expect("Fetching rules should succeed.");

	assert_eq!(reply.status, 200);
	assert_eq!(reply.body["data"]["rules"][0]["short_name"], "Be civil");
}

#[tokio::test]
async fn submission_listing_pages_by_five() {
	let tb = build_test_bridge();
	let bearer = connected_client(&tb).await;

	seed_subreddit(&tb, "salesforce");

	{
		let mut world = tb.reddit.world.lock();
		let author = dummy_redditor();
		let ids = (0..8).map(|i| format!("s{i}")).collect::<Vec<_>>();

		for id in &ids {
			let submission = dummy_submission(id, &author);

			world.submissions.insert(id.clone(), submission);
		}

		world.subreddit_submissions.insert("salesforce".into(), ids);
	}

	let page = tb
		.bridge
		.subreddit_submissions(&bearer, "salesforce", SubmissionListingQuery::default())
		.await
		.expect("The first page should succeed.");

	assert_eq!(page.body["data"]["submissions"].as_array().map(Vec::len), Some(5));
	assert_eq!(page.body["data"]["sort_type"], "hot");
	assert_eq!(page.body["data"]["time_filter"], "all");
	assert_eq!(page.body["data"]["offset"], 0);

	let next = tb
		.bridge
		.subreddit_submissions(
			&bearer,
			"salesforce",
			SubmissionListingQuery { offset: Some(5), ..Default::default() },
		)
		.await
		.expect("The second page should succeed.");

	assert_eq!(next.body["data"]["submissions"].as_array().map(Vec::len), Some(3));
	assert_eq!(next.body["data"]["submissions"][0]["id"], "s5");
}

#[tokio::test]
async fn listing_parameters_are_validated() {
	let tb = build_test_bridge();
	let bearer = connected_client(&tb).await;

	seed_subreddit(&tb, "salesforce");

	let bad_sort = tb
		.bridge
		.subreddit_submissions(
			&bearer,
			"salesforce",
			SubmissionListingQuery { sort: Some("best".into()), ..Default::default() },
		)
		.await
		.expect_err("An invalid sort should be rejected.");

	assert_eq!(bad_sort.http_status(), 400);
	assert_eq!(
		bad_sort.to_string(),
		"Sort type best invalid. Valid options: controversial, gilded, hot, new, rising, top."
	);

	let bad_offset = tb
		.bridge
		.subreddit_submissions(
			&bearer,
			"salesforce",
			SubmissionListingQuery { offset: Some(-2), ..Default::default() },
		)
		.await
		.expect_err("A negative offset should be rejected.");

	assert_eq!(bad_offset.to_string(), "Offset -2 outside allowed range (int>=0).");
}
