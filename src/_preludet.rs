//! Test kit: in-memory fake providers and fixtures; enabled via `cfg(test)` or
//! the `test` crate feature.

pub use crate::_prelude::*;

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use sha2::Sha256;
// self
use crate::{
	api::Bridge,
	auth::Secret,
	config::{BridgeConfig, RedditAppConfig, SalesforceAppConfig},
	model::{ClientOrg, NewClientOrg, Redditor, SalesforceOrg, Token},
	provider::{
		CommentData, CommentSort, CommentSummary, ProviderError, ProviderFuture, RedditApp,
		RedditSession, RedditorData, RedditorSummary, SalesforceApp, SalesforceGrant,
		SalesforceIdentity, SubmissionData, SubmissionSort, SubmissionSummary, SubredditData,
		SubredditRule, SubredditSummary, TimeFilter, VoteDirection,
	},
	store::{MemoryStore, RecordStore},
};

/// Org id used by the dummy client fixture.
pub const DUMMY_ORG_ID: &str = "1234567890";
/// Org name used by the dummy client fixture.
pub const DUMMY_ORG_NAME: &str = "dummy";

/// Seedable world state backing [`FakeReddit`].
#[derive(Debug, Default)]
pub struct RedditWorld {
	/// Redditors keyed by username.
	pub redditors: HashMap<String, RedditorData>,
	/// Subreddits keyed by display name.
	pub subreddits: HashMap<String, SubredditData>,
	/// Rules keyed by subreddit display name.
	pub rules: HashMap<String, Vec<SubredditRule>>,
	/// Submissions keyed by id.
	pub submissions: HashMap<String, SubmissionData>,
	/// Submission ids per subreddit display name, listing order.
	pub subreddit_submissions: HashMap<String, Vec<String>>,
	/// Comments keyed by id.
	pub comments: HashMap<String, CommentData>,
	/// Top-level comment ids per submission id.
	pub submission_comments: HashMap<String, Vec<String>>,
	/// Reply ids per comment id.
	pub comment_replies: HashMap<String, Vec<String>>,
	/// Authorization code to refresh token.
	pub codes: HashMap<String, String>,
	/// Refresh token to the username it grants.
	pub grants: HashMap<String, String>,
	/// Refresh tokens revoked via the app endpoint.
	pub revoked: Vec<String>,
	/// Subreddit display names each username subscribes to.
	pub subscriptions: HashMap<String, Vec<String>>,
	/// Votes recorded as `(fullname, direction)`.
	pub votes: Vec<(String, i8)>,
	/// Fullnames deleted through the session.
	pub deleted: Vec<String>,
	next_id: u64,
}
impl RedditWorld {
	/// Registers a code/refresh/username grant chain.
	pub fn seed_grant(&mut self, code: &str, refresh: &str, username: &str) {
		self.codes.insert(code.to_owned(), refresh.to_owned());
		self.grants.insert(refresh.to_owned(), username.to_owned());
	}

	fn fresh_id(&mut self) -> String {
		self.next_id += 1;

		format!("fk{:04x}", self.next_id)
	}
}

/// In-memory [`RedditApp`] whose behavior is driven by a shared [`RedditWorld`].
#[derive(Clone, Debug, Default)]
pub struct FakeReddit {
	/// Shared world; seed through `world.lock()`.
	pub world: Arc<Mutex<RedditWorld>>,
}
impl RedditApp for FakeReddit {
	fn authorize_url(&self, state: &str) -> Url {
		let mut url = Url::parse("https://www.reddit.com/api/v1/authorize")
			.expect("Static fixture URL should parse.");

		url.query_pairs_mut().append_pair("state", state);

		url
	}

	fn exchange_code<'a>(&'a self, code: &'a str) -> ProviderFuture<'a, Secret> {
		Box::pin(async move {
			self.world
				.lock()
				.codes
				.get(code)
				.cloned()
				.map(Secret::new)
				.ok_or_else(|| ProviderError::unexpected("unknown authorization code"))
		})
	}

	fn revoke_refresh_token<'a>(&'a self, token: &'a Secret) -> ProviderFuture<'a, ()> {
		Box::pin(async move {
			self.world.lock().revoked.push(token.expose().to_owned());

			Ok(())
		})
	}

	fn session(&self, refresh_token: Option<&Secret>) -> Arc<dyn RedditSession> {
		Arc::new(FakeRedditSession {
			world: self.world.clone(),
			refresh: refresh_token.cloned(),
		})
	}
}

/// Session handle over the shared [`RedditWorld`].
pub struct FakeRedditSession {
	world: Arc<Mutex<RedditWorld>>,
	refresh: Option<Secret>,
}
impl FakeRedditSession {
	fn identity(&self) -> Result<String, ProviderError> {
		let refresh =
			self.refresh.as_ref().ok_or_else(|| ProviderError::unexpected("read-only session"))?;
		let world = self.world.lock();

		if world.revoked.iter().any(|revoked| revoked == refresh.expose()) {
			return Err(ProviderError::AuthExpired);
		}

		world.grants.get(refresh.expose()).cloned().ok_or(ProviderError::AuthExpired)
	}

	fn collect(
		world: &RedditWorld,
		ids: &[String],
		flat: bool,
		limit: usize,
	) -> Vec<CommentSummary> {
		let mut out = Vec::new();
		let mut stack = ids.iter().rev().cloned().collect::<Vec<_>>();

		while let Some(id) = stack.pop() {
			if out.len() >= limit {
				break;
			}

			let Some(comment) = world.comments.get(&id) else { continue };

			out.push(comment.to_summary());

			if flat && let Some(replies) = world.comment_replies.get(&id) {
				for reply in replies.iter().rev() {
					stack.push(reply.clone());
				}
			}
		}

		out
	}
}
impl RedditSession for FakeRedditSession {
	fn is_read_only(&self) -> bool {
		self.refresh.is_none()
	}

	fn check(&self) -> ProviderFuture<'_, ()> {
		Box::pin(async move {
			self.identity()?;

			Ok(())
		})
	}

	fn me(&self) -> ProviderFuture<'_, RedditorData> {
		Box::pin(async move {
			let name = self.identity()?;

			self.world
				.lock()
				.redditors
				.get(&name)
				.cloned()
				.ok_or_else(|| ProviderError::unexpected("granted redditor is not seeded"))
		})
	}

	fn redditor<'a>(&'a self, name: &'a str) -> ProviderFuture<'a, Option<RedditorData>> {
		Box::pin(async move { Ok(self.world.lock().redditors.get(name).cloned()) })
	}

	fn my_subreddits(&self) -> ProviderFuture<'_, Vec<SubredditSummary>> {
		Box::pin(async move {
			let name = self.identity()?;
			let world = self.world.lock();

			Ok(world
				.subscriptions
				.get(&name)
				.into_iter()
				.flatten()
				.filter_map(|display| world.subreddits.get(display).map(SubredditData::to_summary))
				.collect())
		})
	}

	fn subreddit<'a>(&'a self, name: &'a str) -> ProviderFuture<'a, Option<SubredditData>> {
		Box::pin(async move { Ok(self.world.lock().subreddits.get(name).cloned()) })
	}

	fn subreddit_rules<'a>(&'a self, name: &'a str) -> ProviderFuture<'a, Vec<SubredditRule>> {
		Box::pin(async move { Ok(self.world.lock().rules.get(name).cloned().unwrap_or_default()) })
	}

	fn user_is_subscriber<'a>(&'a self, name: &'a str) -> ProviderFuture<'a, bool> {
		Box::pin(async move {
			let username = self.identity()?;

			Ok(self
				.world
				.lock()
				.subscriptions
				.get(&username)
				.is_some_and(|subs| subs.iter().any(|sub| sub == name)))
		})
	}

	fn set_subscribed<'a>(&'a self, name: &'a str, subscribed: bool) -> ProviderFuture<'a, ()> {
		Box::pin(async move {
			let username = self.identity()?;
			let mut world = self.world.lock();

			if !world.subreddits.contains_key(name) {
				return Err(ProviderError::NotFound { subject: format!("subreddit {name}") });
			}

			let subs = world.subscriptions.entry(username).or_default();

			if subscribed {
				if !subs.iter().any(|sub| sub == name) {
					subs.push(name.to_owned());
				}
			} else {
				subs.retain(|sub| sub != name);
			}

			Ok(())
		})
	}

	fn submissions<'a>(
		&'a self,
		subreddit: &'a str,
		_sort: SubmissionSort,
		_time_filter: TimeFilter,
		limit: usize,
	) -> ProviderFuture<'a, Vec<SubmissionSummary>> {
		Box::pin(async move {
			let world = self.world.lock();

			Ok(world
				.subreddit_submissions
				.get(subreddit)
				.into_iter()
				.flatten()
				.filter_map(|id| world.submissions.get(id).map(SubmissionData::to_summary))
				.take(limit)
				.collect())
		})
	}

	fn submission<'a>(&'a self, id: &'a str) -> ProviderFuture<'a, Option<SubmissionData>> {
		Box::pin(async move { Ok(self.world.lock().submissions.get(id).cloned()) })
	}

	fn submission_comments<'a>(
		&'a self,
		id: &'a str,
		_sort: CommentSort,
		limit: usize,
		flat: bool,
	) -> ProviderFuture<'a, Vec<CommentSummary>> {
		Box::pin(async move {
			let world = self.world.lock();
			let ids = world.submission_comments.get(id).cloned().unwrap_or_default();

			Ok(Self::collect(&world, &ids, flat, limit))
		})
	}

	fn comment<'a>(&'a self, id: &'a str) -> ProviderFuture<'a, Option<CommentData>> {
		Box::pin(async move { Ok(self.world.lock().comments.get(id).cloned()) })
	}

	fn comment_replies<'a>(
		&'a self,
		id: &'a str,
		limit: usize,
		flat: bool,
	) -> ProviderFuture<'a, Vec<CommentSummary>> {
		Box::pin(async move {
			let world = self.world.lock();
			let ids = world.comment_replies.get(id).cloned().unwrap_or_default();

			Ok(Self::collect(&world, &ids, flat, limit))
		})
	}

	fn vote<'a>(
		&'a self,
		fullname: &'a str,
		direction: VoteDirection,
	) -> ProviderFuture<'a, ()> {
		Box::pin(async move {
			self.identity()?;
			self.world.lock().votes.push((fullname.to_owned(), direction.wire_value()));

			Ok(())
		})
	}

	fn reply<'a>(
		&'a self,
		parent_fullname: &'a str,
		text: &'a str,
	) -> ProviderFuture<'a, CommentData> {
		Box::pin(async move {
			let username = self.identity()?;
			let mut world = self.world.lock();
			let id = world.fresh_id();
			let author = world.redditors.get(&username).map(|me| RedditorSummary {
				id: me.id.clone(),
				name: me.name.clone(),
				created_utc: me.created_utc,
				icon_img: me.icon_img.clone(),
				comment_karma: me.comment_karma,
				link_karma: me.link_karma,
			});
			let (submission, subreddit) = if let Some(submission_id) =
				parent_fullname.strip_prefix("t3_")
			{
				let submission = world
					.submissions
					.get(submission_id)
					.ok_or_else(|| ProviderError::NotFound {
						subject: format!("submission {submission_id}"),
					})?
					.to_summary();
				let subreddit = world
					.subreddits
					.values()
					.next()
					.map(SubredditData::to_summary)
					.ok_or_else(|| ProviderError::unexpected("no subreddit is seeded"))?;

				(submission, subreddit)
			} else {
				let parent_id = parent_fullname.trim_start_matches("t1_");
				let parent = world
					.comments
					.get(parent_id)
					.ok_or_else(|| ProviderError::NotFound {
						subject: format!("comment {parent_id}"),
					})?;

				(parent.submission.clone(), parent.subreddit.clone())
			};
			let comment = CommentData {
				id: id.clone(),
				body: text.to_owned(),
				created_utc: OffsetDateTime::now_utc(),
				author,
				score: 1,
				permalink: format!("/comments/{}/comment/{id}", submission.id),
				link_id: format!("t3_{}", submission.id),
				parent_id: parent_fullname.to_owned(),
				submission,
				subreddit,
				has_replies: false,
				is_submitter: false,
				distinguished: None,
				edited: false,
				stickied: false,
			};

			world.comments.insert(id.clone(), comment.clone());

			if let Some(parent_id) = parent_fullname.strip_prefix("t1_") {
				let parent_id = parent_id.to_owned();

				world.comment_replies.entry(parent_id).or_default().push(id);
			} else if let Some(submission_id) = parent_fullname.strip_prefix("t3_") {
				let submission_id = submission_id.to_owned();

				world.submission_comments.entry(submission_id).or_default().push(id);
			}

			Ok(comment)
		})
	}

	fn delete<'a>(&'a self, fullname: &'a str) -> ProviderFuture<'a, ()> {
		Box::pin(async move {
			self.identity()?;

			let mut world = self.world.lock();

			world.deleted.push(fullname.to_owned());

			if let Some(id) = fullname.strip_prefix("t3_") {
				world.submissions.remove(id);
			} else if let Some(id) = fullname.strip_prefix("t1_") {
				world.comments.remove(id);
			}

			Ok(())
		})
	}

	fn crosspost<'a>(
		&'a self,
		submission_id: &'a str,
		subreddit: &'a str,
		title: Option<&'a str>,
	) -> ProviderFuture<'a, SubmissionData> {
		Box::pin(async move {
			self.identity()?;

			let mut world = self.world.lock();
			let mut created = world
				.submissions
				.get(submission_id)
				.cloned()
				.ok_or_else(|| ProviderError::NotFound {
					subject: format!("submission {submission_id}"),
				})?;
			let id = world.fresh_id();

			created.name = format!("t3_{id}");
			created.id = id.clone();

			if let Some(title) = title {
				created.title = title.to_owned();
			}

			world.submissions.insert(id.clone(), created.clone());
			world
				.subreddit_submissions
				.entry(subreddit.to_owned())
				.or_default()
				.insert(0, id);

			Ok(created)
		})
	}
}

/// In-memory [`SalesforceApp`] with pre-seeded code exchanges.
#[derive(Clone, Debug, Default)]
pub struct FakeSalesforce {
	/// Grants handed out per authorization code.
	pub grants: Arc<Mutex<HashMap<String, SalesforceGrant>>>,
}
impl FakeSalesforce {
	/// Seeds a code exchange yielding a correctly signed grant for the org.
	pub fn seed_code(&self, code: &str, consumer_secret: &str, org_id: &str) {
		self.grants.lock().insert(code.to_owned(), signed_grant(consumer_secret, org_id));
	}

	/// Seeds a code exchange whose identity signature will not verify.
	pub fn seed_tampered_code(&self, code: &str, consumer_secret: &str, org_id: &str) {
		let mut grant = signed_grant(consumer_secret, org_id);

		grant.identity.issued_at.push('9');

		self.grants.lock().insert(code.to_owned(), grant);
	}
}
impl SalesforceApp for FakeSalesforce {
	fn authorize_url(&self, state: &str) -> Url {
		let mut url = Url::parse("https://login.salesforce.com/services/oauth2/authorize")
			.expect("Static fixture URL should parse.");

		url.query_pairs_mut().append_pair("state", state);

		url
	}

	fn exchange_code<'a>(&'a self, code: &'a str) -> ProviderFuture<'a, SalesforceGrant> {
		Box::pin(async move {
			self.grants
				.lock()
				.get(code)
				.cloned()
				.ok_or_else(|| ProviderError::unexpected("unknown authorization code"))
		})
	}
}

/// Builds a Salesforce grant whose identity signature verifies against the secret.
pub fn signed_grant(consumer_secret: &str, org_id: &str) -> SalesforceGrant {
	let id = format!("https://login.salesforce.com/id/{org_id}/0055g000004XvDkAAK");
	let issued_at = "1572549765000".to_owned();
	let mut mac = Hmac::<Sha256>::new_from_slice(consumer_secret.as_bytes())
		.expect("HMAC should accept a key of any length.");

	mac.update(id.as_bytes());
	mac.update(issued_at.as_bytes());

	SalesforceGrant {
		access_token: Secret::new("sf-access-token"),
		refresh_token: Secret::new("sf-refresh-token"),
		instance_url: "https://dummy.my.salesforce.com".into(),
		identity: SalesforceIdentity {
			id,
			issued_at,
			signature: BASE64.encode(mac.finalize().into_bytes()),
		},
	}
}

/// A bridge wired to fakes, plus seeding handles.
pub struct TestBridge {
	/// The bridge under test.
	pub bridge: Bridge,
	/// Backing store, shared by the handshake cache and the relational mirror.
	pub store: Arc<MemoryStore>,
	/// Fake Reddit provider.
	pub reddit: FakeReddit,
	/// Fake Salesforce provider.
	pub salesforce: FakeSalesforce,
}

/// Configuration used by every test bridge.
pub fn test_config() -> BridgeConfig {
	let reddit = RedditAppConfig::new(
		"reddit-id",
		"reddit-secret",
		"bridge-tests/0.1",
		Url::parse("https://bridge.example.com/clients/oauth_callback")
			.expect("Redirect URI fixture should parse successfully."),
	);
	let salesforce = SalesforceAppConfig::new(
		"sf-key",
		"sf-secret",
		Url::parse("https://bridge.example.com/clients/salesforce_oauth_callback")
			.expect("Redirect URI fixture should parse successfully."),
	);

	BridgeConfig::new(reddit, salesforce)
}

/// Constructs a [`Bridge`] over memory stores and fake providers.
pub fn build_test_bridge() -> TestBridge {
	let store = Arc::new(MemoryStore::default());
	let reddit = FakeReddit::default();
	let salesforce = FakeSalesforce::default();
	let bridge = Bridge::new(
		test_config(),
		store.clone(),
		store.clone(),
		Arc::new(reddit.clone()),
		Arc::new(salesforce.clone()),
	);

	TestBridge { bridge, store, reddit, salesforce }
}

/// The `sfdctest` redditor fixture.
pub fn dummy_redditor() -> RedditorData {
	RedditorData {
		id: "4rfkxa54".into(),
		name: "sfdctest".into(),
		created_utc: time::macros::datetime!(2019-10-31 19:22:45 UTC),
		has_verified_email: true,
		icon_img: "https://example.com/avatar.png".into(),
		comment_karma: 42,
		link_karma: 7,
		num_friends: Some(0),
		is_employee: Some(false),
		is_friend: Some(false),
		is_mod: Some(false),
		is_gold: Some(false),
	}
}

/// A subreddit fixture with the given display name.
pub fn dummy_subreddit(display_name: &str) -> SubredditData {
	SubredditData {
		id: format!("id_{display_name}"),
		name: format!("t5_{display_name}"),
		display_name: display_name.to_owned(),
		description: Some("Sidebar text.".into()),
		description_html: None,
		public_description: Some("A test subreddit.".into()),
		created_utc: time::macros::datetime!(2015-06-01 00:00:00 UTC),
		subscribers: 1234,
		spoilers_enabled: Some(true),
		over18: Some(false),
		can_assign_link_flair: Some(false),
		can_assign_user_flair: Some(false),
	}
}

/// A submission fixture living in the given subreddit.
pub fn dummy_submission(id: &str, author: &RedditorData) -> SubmissionData {
	SubmissionData {
		id: id.to_owned(),
		name: format!("t3_{id}"),
		title: format!("Submission {id}"),
		created_utc: time::macros::datetime!(2019-11-01 10:00:00 UTC),
		author: Some(RedditorSummary {
			id: author.id.clone(),
			name: author.name.clone(),
			created_utc: author.created_utc,
			icon_img: author.icon_img.clone(),
			comment_karma: author.comment_karma,
			link_karma: author.link_karma,
		}),
		num_comments: 0,
		score: 10,
		upvote_ratio: 0.9,
		permalink: format!("/comments/{id}"),
		url: format!("https://redd.it/{id}"),
		is_original_content: false,
		is_self: true,
		selftext: "Body text.".into(),
		distinguished: None,
		edited: false,
		locked: false,
		stickied: false,
		spoiler: false,
		over_18: false,
	}
}

/// A comment fixture hanging off the given submission.
pub fn dummy_comment(id: &str, submission: &SubmissionData, subreddit: &SubredditData) -> CommentData {
	CommentData {
		id: id.to_owned(),
		body: format!("Comment {id}"),
		created_utc: time::macros::datetime!(2019-11-01 11:00:00 UTC),
		author: submission.author.clone(),
		score: 3,
		permalink: format!("{}/comment/{id}", submission.permalink),
		link_id: submission.name.clone(),
		parent_id: submission.name.clone(),
		submission: submission.to_summary(),
		subreddit: subreddit.to_summary(),
		has_replies: false,
		is_submitter: true,
		distinguished: None,
		edited: false,
		stickied: false,
	}
}

/// Seeds the read-only dummy client: mirrored `sfdctest` redditor, the dummy
/// Salesforce org, a tokenless client org, and a live bearer token. Returns
/// the client org and the bearer key.
pub async fn insert_dummy_client(store: &Arc<MemoryStore>) -> (ClientOrg, String) {
	let me = dummy_redditor();

	store
		.upsert_redditor(Redditor::from(&me))
		.await
		.expect("Seeding the dummy redditor should succeed.");
	store
		.upsert_salesforce_org(SalesforceOrg::new(DUMMY_ORG_ID, DUMMY_ORG_NAME))
		.await
		.expect("Seeding the dummy org should succeed.");

	let org = store
		.insert_client_org(NewClientOrg {
			redditor_id: me.id,
			salesforce_org_id: DUMMY_ORG_ID.into(),
			reddit_token: None,
		})
		.await
		.expect("Seeding the dummy client org should succeed.");
	let token = Token::issue(org.id);
	let key = token.key.expose().to_owned();

	store.replace_token(token).await.expect("Seeding the dummy token should succeed.");

	(org, key)
}
