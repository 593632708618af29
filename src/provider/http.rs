//! reqwest-backed Reddit and Salesforce provider implementations.
//!
//! [`HttpRedditApp`] speaks the Reddit OAuth2 endpoints on `www.reddit.com` and
//! the data API on `oauth.reddit.com`; [`HttpSalesforceApp`] speaks the
//! `/services/oauth2` endpoints under the configured login URL. Both accept
//! alternate base URLs so tests can point them at a local mock server.

// crates.io
use serde::de::DeserializeOwned;
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::Secret,
	config::{RedditAppConfig, SalesforceAppConfig},
	provider::{
		CommentData, CommentSort, CommentSummary, ProviderError, ProviderFuture, RedditApp,
		RedditSession, RedditorData, RedditorSummary, SalesforceApp, SalesforceGrant,
		SalesforceIdentity, SubmissionData, SubmissionSort, SubmissionSummary, SubredditData,
		SubredditRule, SubredditSummary, TimeFilter, VoteDirection,
	},
};

const REDDIT_WWW: &str = "https://www.reddit.com";
const REDDIT_OAUTH: &str = "https://oauth.reddit.com";

fn parse_base(value: &str) -> Url {
	Url::parse(value).expect("Static Reddit endpoint URL must parse.")
}

fn join(base: &Url, path: &str) -> Result<Url, ProviderError> {
	base.join(path).map_err(|e| ProviderError::unexpected(format!("invalid endpoint path: {e}")))
}

fn decode<T>(bytes: &[u8]) -> Result<T, ProviderError>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(bytes);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|e| ProviderError::unexpected(format!("undecodable provider payload: {e}")))
}

fn epoch(secs: f64) -> Result<OffsetDateTime, ProviderError> {
	OffsetDateTime::from_unix_timestamp(secs as _)
		.map_err(|e| ProviderError::unexpected(format!("invalid creation timestamp: {e}")))
}

fn edited_flag(value: &Value) -> bool {
	!matches!(value, Value::Bool(false) | Value::Null)
}

/// Reddit connected app backed by reqwest.
#[derive(Clone)]
pub struct HttpRedditApp {
	client: ReqwestClient,
	config: RedditAppConfig,
	www_base: Url,
	oauth_base: Url,
}
impl HttpRedditApp {
	/// Creates an app against the production Reddit endpoints.
	pub fn new(config: RedditAppConfig) -> Result<Self, ProviderError> {
		Self::with_endpoints(config, parse_base(REDDIT_WWW), parse_base(REDDIT_OAUTH))
	}

	/// Creates an app against alternate base URLs, for tests and proxies.
	pub fn with_endpoints(
		config: RedditAppConfig,
		www_base: Url,
		oauth_base: Url,
	) -> Result<Self, ProviderError> {
		let client = ReqwestClient::builder()
			.user_agent(config.user_agent.clone())
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.map_err(ProviderError::network)?;

		Ok(Self { client, config, www_base, oauth_base })
	}
}
impl RedditApp for HttpRedditApp {
	fn authorize_url(&self, state: &str) -> Url {
		let mut url = self.www_base.clone();

		url.set_path("/api/v1/authorize");
		url.query_pairs_mut()
			.append_pair("client_id", &self.config.client_id)
			.append_pair("response_type", "code")
			.append_pair("state", state)
			.append_pair("redirect_uri", self.config.redirect_uri.as_str())
			.append_pair("duration", "permanent")
			.append_pair("scope", &self.config.scopes.join(" "));

		url
	}

	fn exchange_code<'a>(&'a self, code: &'a str) -> ProviderFuture<'a, Secret> {
		Box::pin(async move {
			let url = join(&self.www_base, "/api/v1/access_token")?;
			let response = self
				.client
				.post(url)
				.basic_auth(&self.config.client_id, Some(&self.config.client_secret))
				.form(&[
					("grant_type", "authorization_code"),
					("code", code),
					("redirect_uri", self.config.redirect_uri.as_str()),
				])
				.send()
				.await
				.map_err(ProviderError::network)?;

			if !response.status().is_success() {
				return Err(ProviderError::unexpected(format!(
					"authorization code rejected with status {}",
					response.status()
				)));
			}

			let payload =
				decode::<TokenResponse>(&response.bytes().await.map_err(ProviderError::network)?)?;

			payload.refresh_token.map(Secret::new).ok_or_else(|| {
				ProviderError::unexpected("token response carried no refresh token")
			})
		})
	}

	fn revoke_refresh_token<'a>(&'a self, token: &'a Secret) -> ProviderFuture<'a, ()> {
		Box::pin(async move {
			let url = join(&self.www_base, "/api/v1/revoke_token")?;
			let response = self
				.client
				.post(url)
				.basic_auth(&self.config.client_id, Some(&self.config.client_secret))
				.form(&[("token", token.expose()), ("token_type_hint", "refresh_token")])
				.send()
				.await
				.map_err(ProviderError::network)?;

			if !response.status().is_success() {
				return Err(ProviderError::unexpected(format!(
					"token revocation failed with status {}",
					response.status()
				)));
			}

			Ok(())
		})
	}

	fn session(&self, refresh_token: Option<&Secret>) -> Arc<dyn RedditSession> {
		Arc::new(HttpRedditSession {
			client: self.client.clone(),
			config: self.config.clone(),
			www_base: self.www_base.clone(),
			oauth_base: self.oauth_base.clone(),
			refresh_token: refresh_token.cloned(),
			access: AsyncMutex::new(None),
		})
	}
}

/// One Reddit grant's worth of API access.
///
/// The access token is fetched lazily on the first API call and cached for the
/// session's lifetime; sessions are short-lived (one bridge request), so no
/// refresh-before-expiry logic is needed.
pub struct HttpRedditSession {
	client: ReqwestClient,
	config: RedditAppConfig,
	www_base: Url,
	oauth_base: Url,
	refresh_token: Option<Secret>,
	access: AsyncMutex<Option<Secret>>,
}
impl HttpRedditSession {
	async fn bearer(&self) -> Result<Secret, ProviderError> {
		let mut slot = self.access.lock().await;

		if let Some(token) = slot.as_ref() {
			return Ok(token.clone());
		}

		let form = match &self.refresh_token {
			Some(refresh) => vec![
				("grant_type".to_owned(), "refresh_token".to_owned()),
				("refresh_token".to_owned(), refresh.expose().to_owned()),
			],
			None => vec![("grant_type".to_owned(), "client_credentials".to_owned())],
		};
		let url = join(&self.www_base, "/api/v1/access_token")?;
		let response = self
			.client
			.post(url)
			.basic_auth(&self.config.client_id, Some(&self.config.client_secret))
			.form(&form)
			.send()
			.await
			.map_err(ProviderError::network)?;

		if !response.status().is_success() {
			return Err(if self.refresh_token.is_some() {
				ProviderError::AuthExpired
			} else {
				ProviderError::unexpected(format!(
					"application token request failed with status {}",
					response.status()
				))
			});
		}

		let payload =
			decode::<TokenResponse>(&response.bytes().await.map_err(ProviderError::network)?)?;
		let token = Secret::new(payload.access_token);

		*slot = Some(token.clone());

		Ok(token)
	}

	async fn get<T>(&self, path: &str, query: &[(&str, String)]) -> Result<Option<T>, ProviderError>
	where
		T: DeserializeOwned,
	{
		let token = self.bearer().await?;
		let url = join(&self.oauth_base, path)?;
		let response = self
			.client
			.get(url)
			.bearer_auth(token.expose())
			.query(&[("raw_json", "1")])
			.query(query)
			.send()
			.await
			.map_err(ProviderError::network)?;

		match response.status().as_u16() {
			404 => Ok(None),
			401 => Err(ProviderError::AuthExpired),
			403 => Err(ProviderError::Forbidden { reason: "insufficient scope".into() }),
			status if !response.status().is_success() =>
				Err(ProviderError::unexpected(format!("provider returned status {status}"))),
			_ => Ok(Some(decode(&response.bytes().await.map_err(ProviderError::network)?)?)),
		}
	}

	async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<Value, ProviderError> {
		let token = self.bearer().await?;
		let url = join(&self.oauth_base, path)?;
		let response = self
			.client
			.post(url)
			.bearer_auth(token.expose())
			.form(form)
			.send()
			.await
			.map_err(ProviderError::network)?;

		match response.status().as_u16() {
			404 => Err(ProviderError::NotFound { subject: path.to_owned() }),
			401 => Err(ProviderError::AuthExpired),
			403 => Err(ProviderError::Forbidden { reason: "action not permitted".into() }),
			status if !response.status().is_success() =>
				Err(ProviderError::unexpected(format!("provider returned status {status}"))),
			_ => decode(&response.bytes().await.map_err(ProviderError::network)?),
		}
	}

	/// Expands an author name into a summary; lookup failures read as a
	/// deleted account rather than failing the parent request.
	async fn author_summary(&self, name: Option<&str>) -> Option<RedditorSummary> {
		let name = name.filter(|name| *name != "[deleted]")?;
		let about =
			self.get::<Thing<RawRedditor>>(&format!("/user/{name}/about"), &[]).await.ok()??;

		about.data.into_summary().ok()
	}

	async fn focused_comment_nodes(
		&self,
		submission_id: &str,
		comment_id: &str,
		sort: CommentSort,
		limit: usize,
	) -> Result<Option<Vec<RawNode>>, ProviderError> {
		let listings = self
			.get::<Vec<Thing<RawListing>>>(
				&format!("/comments/{submission_id}"),
				&[
					("comment", comment_id.to_owned()),
					("sort", sort.as_str().to_owned()),
					("limit", limit.to_string()),
				],
			)
			.await?;

		Ok(listings.and_then(|mut listings| {
			if listings.len() < 2 {
				return None;
			}

			Some(listings.remove(1).data.children)
		}))
	}
}
impl RedditSession for HttpRedditSession {
	fn is_read_only(&self) -> bool {
		self.refresh_token.is_none()
	}

	fn check(&self) -> ProviderFuture<'_, ()> {
		Box::pin(async move {
			self.get::<RawRedditor>("/api/v1/me", &[])
				.await?
				.ok_or_else(|| ProviderError::unexpected("identity endpoint returned no payload"))?;

			Ok(())
		})
	}

	fn me(&self) -> ProviderFuture<'_, RedditorData> {
		Box::pin(async move {
			let raw = self
				.get::<RawRedditor>("/api/v1/me", &[])
				.await?
				.ok_or_else(|| ProviderError::unexpected("identity endpoint returned no payload"))?;

			raw.into_data()
		})
	}

	fn redditor<'a>(&'a self, name: &'a str) -> ProviderFuture<'a, Option<RedditorData>> {
		Box::pin(async move {
			let Some(about) = self.get::<Thing<RawRedditor>>(&format!("/user/{name}/about"), &[]).await?
			else {
				return Ok(None);
			};

			Ok(Some(about.data.into_data()?))
		})
	}

	fn my_subreddits(&self) -> ProviderFuture<'_, Vec<SubredditSummary>> {
		Box::pin(async move {
			let listing = self
				.get::<Thing<TypedListing<RawSubreddit>>>(
					"/subreddits/mine/subscriber",
					&[("limit", "100".to_owned())],
				)
				.await?
				.ok_or_else(|| ProviderError::unexpected("subscription listing was empty"))?;

			listing
				.data
				.children
				.into_iter()
				.map(|child| child.data.into_summary())
				.collect::<Result<Vec<_>, _>>()
		})
	}

	fn subreddit<'a>(&'a self, name: &'a str) -> ProviderFuture<'a, Option<SubredditData>> {
		Box::pin(async move {
			let Some(about) =
				self.get::<Thing<RawSubreddit>>(&format!("/r/{name}/about"), &[]).await?
			else {
				return Ok(None);
			};

			Ok(Some(about.data.into_data()?))
		})
	}

	fn subreddit_rules<'a>(&'a self, name: &'a str) -> ProviderFuture<'a, Vec<SubredditRule>> {
		Box::pin(async move {
			let payload = self
				.get::<RawRules>(&format!("/r/{name}/about/rules"), &[])
				.await?
				.ok_or_else(|| ProviderError::NotFound { subject: format!("subreddit {name}") })?;

			Ok(payload
				.rules
				.into_iter()
				.map(|rule| SubredditRule {
					short_name: rule.short_name,
					description: rule.description.filter(|d| !d.is_empty()),
					violation_reason: rule.violation_reason,
					kind: rule.kind,
					priority: rule.priority,
				})
				.collect())
		})
	}

	fn user_is_subscriber<'a>(&'a self, name: &'a str) -> ProviderFuture<'a, bool> {
		Box::pin(async move {
			let about = self
				.get::<Thing<RawSubreddit>>(&format!("/r/{name}/about"), &[])
				.await?
				.ok_or_else(|| ProviderError::NotFound { subject: format!("subreddit {name}") })?;

			Ok(about.data.user_is_subscriber.unwrap_or(false))
		})
	}

	fn set_subscribed<'a>(&'a self, name: &'a str, subscribed: bool) -> ProviderFuture<'a, ()> {
		Box::pin(async move {
			let action = if subscribed { "sub" } else { "unsub" };

			self.post_form("/api/subscribe", &[("action", action), ("sr_name", name)]).await?;

			Ok(())
		})
	}

	fn submissions<'a>(
		&'a self,
		subreddit: &'a str,
		sort: SubmissionSort,
		time_filter: TimeFilter,
		limit: usize,
	) -> ProviderFuture<'a, Vec<SubmissionSummary>> {
		Box::pin(async move {
			let mut query = vec![("limit", limit.to_string())];

			if sort.uses_time_filter() {
				query.push(("t", time_filter.as_str().to_owned()));
			}

			let listing = self
				.get::<Thing<TypedListing<RawSubmission>>>(
					&format!("/r/{subreddit}/{sort}"),
					&query,
				)
				.await?
				.ok_or_else(|| ProviderError::NotFound {
					subject: format!("subreddit {subreddit}"),
				})?;

			listing
				.data
				.children
				.into_iter()
				.map(|child| child.data.into_summary())
				.collect::<Result<Vec<_>, _>>()
		})
	}

	fn submission<'a>(&'a self, id: &'a str) -> ProviderFuture<'a, Option<SubmissionData>> {
		Box::pin(async move {
			let listing = self
				.get::<Thing<TypedListing<RawSubmission>>>(
					"/api/info",
					&[("id", format!("t3_{id}"))],
				)
				.await?;
			let Some(raw) =
				listing.and_then(|listing| listing.data.children.into_iter().next())
			else {
				return Ok(None);
			};
			let author = self.author_summary(raw.data.author.as_deref()).await;

			Ok(Some(raw.data.into_data(author)?))
		})
	}

	fn submission_comments<'a>(
		&'a self,
		id: &'a str,
		sort: CommentSort,
		limit: usize,
		flat: bool,
	) -> ProviderFuture<'a, Vec<CommentSummary>> {
		Box::pin(async move {
			let listings = self
				.get::<Vec<Thing<RawListing>>>(
					&format!("/comments/{id}"),
					&[("sort", sort.as_str().to_owned()), ("limit", limit.to_string())],
				)
				.await?
				.ok_or_else(|| ProviderError::NotFound {
					subject: format!("submission {id}"),
				})?;
			let nodes = listings
				.into_iter()
				.nth(1)
				.map(|listing| listing.data.children)
				.unwrap_or_default();

			collect_comments(nodes, flat, limit)
		})
	}

	fn comment<'a>(&'a self, id: &'a str) -> ProviderFuture<'a, Option<CommentData>> {
		Box::pin(async move {
			let listing = self
				.get::<Thing<TypedListing<RawComment>>>("/api/info", &[("id", format!("t1_{id}"))])
				.await?;
			let Some(raw) = listing.and_then(|listing| listing.data.children.into_iter().next())
			else {
				return Ok(None);
			};
			let raw = raw.data;
			let submission_id = raw
				.link_id
				.strip_prefix("t3_")
				.ok_or_else(|| ProviderError::unexpected("comment carried a malformed link id"))?
				.to_owned();
			let submission = self
				.submission(&submission_id)
				.await?
				.ok_or_else(|| ProviderError::unexpected("comment points at a missing submission"))?;
			let subreddit = self
				.subreddit(&raw.subreddit)
				.await?
				.ok_or_else(|| ProviderError::unexpected("comment points at a missing subreddit"))?;
			let author = self.author_summary(raw.author.as_deref()).await;

			Ok(Some(raw.into_data(author, submission.to_summary(), subreddit.to_summary())?))
		})
	}

	fn comment_replies<'a>(
		&'a self,
		id: &'a str,
		limit: usize,
		flat: bool,
	) -> ProviderFuture<'a, Vec<CommentSummary>> {
		Box::pin(async move {
			let Some(comment) = self.comment(id).await? else {
				return Err(ProviderError::NotFound { subject: format!("comment {id}") });
			};
			let nodes = self
				.focused_comment_nodes(&comment.submission.id, id, CommentSort::default(), limit)
				.await?
				.unwrap_or_default();
			// The focal comment is the first node; its replies are the listing we want.
			let replies = nodes
				.into_iter()
				.next()
				.and_then(|node| node.reply_nodes())
				.unwrap_or_default();

			collect_comments(replies, flat, limit)
		})
	}

	fn vote<'a>(
		&'a self,
		fullname: &'a str,
		direction: VoteDirection,
	) -> ProviderFuture<'a, ()> {
		Box::pin(async move {
			self.post_form(
				"/api/vote",
				&[("id", fullname), ("dir", &direction.wire_value().to_string())],
			)
			.await?;

			Ok(())
		})
	}

	fn reply<'a>(
		&'a self,
		parent_fullname: &'a str,
		text: &'a str,
	) -> ProviderFuture<'a, CommentData> {
		Box::pin(async move {
			let payload = self
				.post_form(
					"/api/comment",
					&[("api_type", "json"), ("thing_id", parent_fullname), ("text", text)],
				)
				.await?;
			let created = payload
				.pointer("/json/data/things/0/data")
				.cloned()
				.ok_or_else(|| ProviderError::unexpected("reply response carried no comment"))?;
			let raw = serde_json::from_value::<RawComment>(created)
				.map_err(|e| ProviderError::unexpected(format!("undecodable reply payload: {e}")))?;
			let id = raw.id.clone();

			self.comment(&id)
				.await?
				.ok_or_else(|| ProviderError::unexpected("created comment could not be fetched"))
		})
	}

	fn delete<'a>(&'a self, fullname: &'a str) -> ProviderFuture<'a, ()> {
		Box::pin(async move {
			self.post_form("/api/del", &[("id", fullname)]).await?;

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
			let original = self.submission(submission_id).await?.ok_or_else(|| {
				ProviderError::NotFound { subject: format!("submission {submission_id}") }
			})?;
			let title = title.unwrap_or(&original.title);
			let fullname = format!("t3_{submission_id}");
			let payload = self
				.post_form(
					"/api/submit",
					&[
						("api_type", "json"),
						("kind", "crosspost"),
						("sr", subreddit),
						("title", title),
						("crosspost_fullname", &fullname),
					],
				)
				.await?;
			let created_id = payload
				.pointer("/json/data/id")
				.and_then(Value::as_str)
				.ok_or_else(|| ProviderError::unexpected("crosspost response carried no id"))?
				.to_owned();

			self.submission(&created_id)
				.await?
				.ok_or_else(|| ProviderError::unexpected("created crosspost could not be fetched"))
		})
	}
}

/// Salesforce connected app backed by reqwest.
#[derive(Clone)]
pub struct HttpSalesforceApp {
	client: ReqwestClient,
	config: SalesforceAppConfig,
}
impl HttpSalesforceApp {
	/// Creates an app against the configured login URL.
	pub fn new(config: SalesforceAppConfig) -> Result<Self, ProviderError> {
		let client = ReqwestClient::builder()
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.map_err(ProviderError::network)?;

		Ok(Self { client, config })
	}
}
impl SalesforceApp for HttpSalesforceApp {
	fn authorize_url(&self, state: &str) -> Url {
		let mut url = self.config.login_url.clone();

		url.set_path("/services/oauth2/authorize");
		url.query_pairs_mut()
			.append_pair("response_type", "code")
			.append_pair("client_id", &self.config.consumer_key)
			.append_pair("redirect_uri", self.config.redirect_uri.as_str())
			.append_pair("state", state);

		url
	}

	fn exchange_code<'a>(&'a self, code: &'a str) -> ProviderFuture<'a, SalesforceGrant> {
		Box::pin(async move {
			let url = join(&self.config.login_url, "/services/oauth2/token")?;
			let response = self
				.client
				.post(url)
				.form(&[
					("grant_type", "authorization_code"),
					("code", code),
					("client_id", &self.config.consumer_key),
					("client_secret", &self.config.consumer_secret),
					("redirect_uri", self.config.redirect_uri.as_str()),
				])
				.send()
				.await
				.map_err(ProviderError::network)?;

			if !response.status().is_success() {
				return Err(ProviderError::unexpected(format!(
					"authorization code rejected with status {}",
					response.status()
				)));
			}

			let payload = decode::<SalesforceTokenResponse>(
				&response.bytes().await.map_err(ProviderError::network)?,
			)?;

			Ok(SalesforceGrant {
				access_token: Secret::new(payload.access_token),
				refresh_token: Secret::new(payload.refresh_token),
				instance_url: payload.instance_url,
				identity: SalesforceIdentity {
					id: payload.id,
					issued_at: payload.issued_at,
					signature: payload.signature,
				},
			})
		})
	}
}

fn collect_comments(
	nodes: Vec<RawNode>,
	flat: bool,
	limit: usize,
) -> Result<Vec<CommentSummary>, ProviderError> {
	let mut out = Vec::new();
	let mut stack = nodes;

	stack.reverse();

	while let Some(node) = stack.pop() {
		if out.len() >= limit {
			break;
		}

		if node.kind != "t1" {
			continue;
		}

		let replies = node.reply_nodes();
		let raw = serde_json::from_value::<RawComment>(node.data)
			.map_err(|e| ProviderError::unexpected(format!("undecodable comment payload: {e}")))?;

		out.push(raw.into_summary()?);

		if flat && let Some(mut replies) = replies {
			replies.reverse();
			stack.extend(replies);
		}
	}

	Ok(out)
}

#[derive(Deserialize)]
struct TokenResponse {
	access_token: String,
	refresh_token: Option<String>,
}

#[derive(Deserialize)]
struct SalesforceTokenResponse {
	access_token: String,
	refresh_token: String,
	instance_url: String,
	id: String,
	issued_at: String,
	signature: String,
}

#[derive(Deserialize)]
struct Thing<T> {
	data: T,
}

#[derive(Deserialize)]
struct TypedListing<T> {
	children: Vec<Thing<T>>,
}

#[derive(Deserialize)]
struct RawListing {
	children: Vec<RawNode>,
}

#[derive(Clone, Deserialize)]
struct RawNode {
	kind: String,
	data: Value,
}
impl RawNode {
	fn reply_nodes(&self) -> Option<Vec<RawNode>> {
		let listing = self.data.get("replies")?;

		if !listing.is_object() {
			return None;
		}

		serde_json::from_value::<Thing<RawListing>>(listing.clone())
			.ok()
			.map(|thing| thing.data.children)
	}
}

#[derive(Deserialize)]
struct RawRedditor {
	id: String,
	name: String,
	created_utc: f64,
	#[serde(default)]
	has_verified_email: Option<bool>,
	#[serde(default)]
	icon_img: Option<String>,
	#[serde(default)]
	comment_karma: i64,
	#[serde(default)]
	link_karma: i64,
	#[serde(default)]
	num_friends: Option<u32>,
	#[serde(default)]
	is_employee: Option<bool>,
	#[serde(default)]
	is_friend: Option<bool>,
	#[serde(default)]
	is_mod: Option<bool>,
	#[serde(default)]
	is_gold: Option<bool>,
}
impl RawRedditor {
	fn into_data(self) -> Result<RedditorData, ProviderError> {
		Ok(RedditorData {
			created_utc: epoch(self.created_utc)?,
			id: self.id,
			name: self.name,
			has_verified_email: self.has_verified_email.unwrap_or(false),
			icon_img: self.icon_img.unwrap_or_default(),
			comment_karma: self.comment_karma,
			link_karma: self.link_karma,
			num_friends: self.num_friends,
			is_employee: self.is_employee,
			is_friend: self.is_friend,
			is_mod: self.is_mod,
			is_gold: self.is_gold,
		})
	}

	fn into_summary(self) -> Result<RedditorSummary, ProviderError> {
		Ok(RedditorSummary {
			created_utc: epoch(self.created_utc)?,
			id: self.id,
			name: self.name,
			icon_img: self.icon_img.unwrap_or_default(),
			comment_karma: self.comment_karma,
			link_karma: self.link_karma,
		})
	}
}

#[derive(Deserialize)]
struct RawSubreddit {
	id: String,
	name: String,
	display_name: String,
	#[serde(default)]
	description: Option<String>,
	#[serde(default)]
	description_html: Option<String>,
	#[serde(default)]
	public_description: Option<String>,
	created_utc: f64,
	#[serde(default)]
	subscribers: Option<u64>,
	#[serde(default)]
	spoilers_enabled: Option<bool>,
	#[serde(default)]
	over18: Option<bool>,
	#[serde(default)]
	can_assign_link_flair: Option<bool>,
	#[serde(default)]
	can_assign_user_flair: Option<bool>,
	#[serde(default)]
	user_is_subscriber: Option<bool>,
}
impl RawSubreddit {
	fn into_data(self) -> Result<SubredditData, ProviderError> {
		Ok(SubredditData {
			created_utc: epoch(self.created_utc)?,
			id: self.id,
			name: self.name,
			display_name: self.display_name,
			description: self.description,
			description_html: self.description_html,
			public_description: self.public_description,
			subscribers: self.subscribers.unwrap_or(0),
			spoilers_enabled: self.spoilers_enabled,
			over18: self.over18,
			can_assign_link_flair: self.can_assign_link_flair,
			can_assign_user_flair: self.can_assign_user_flair,
		})
	}

	fn into_summary(self) -> Result<SubredditSummary, ProviderError> {
		Ok(SubredditSummary {
			created_utc: epoch(self.created_utc)?,
			id: self.id,
			name: self.name,
			display_name: self.display_name,
			public_description: self.public_description,
			subscribers: self.subscribers.unwrap_or(0),
		})
	}
}

#[derive(Deserialize)]
struct RawRules {
	rules: Vec<RawRule>,
}

#[derive(Deserialize)]
struct RawRule {
	short_name: String,
	#[serde(default)]
	description: Option<String>,
	#[serde(default)]
	violation_reason: Option<String>,
	kind: String,
	#[serde(default)]
	priority: i64,
}

#[derive(Deserialize)]
struct RawSubmission {
	id: String,
	name: String,
	title: String,
	created_utc: f64,
	#[serde(default)]
	author: Option<String>,
	#[serde(default)]
	num_comments: u64,
	#[serde(default)]
	score: i64,
	#[serde(default)]
	upvote_ratio: Option<f64>,
	#[serde(default)]
	permalink: String,
	#[serde(default)]
	url: String,
	#[serde(default)]
	is_original_content: bool,
	#[serde(default)]
	is_self: bool,
	#[serde(default)]
	selftext: String,
	#[serde(default)]
	distinguished: Option<String>,
	#[serde(default)]
	edited: Value,
	#[serde(default)]
	locked: bool,
	#[serde(default)]
	stickied: bool,
	#[serde(default)]
	spoiler: bool,
	#[serde(default)]
	over_18: bool,
}
impl RawSubmission {
	fn into_data(self, author: Option<RedditorSummary>) -> Result<SubmissionData, ProviderError> {
		Ok(SubmissionData {
			created_utc: epoch(self.created_utc)?,
			edited: edited_flag(&self.edited),
			id: self.id,
			name: self.name,
			title: self.title,
			author,
			num_comments: self.num_comments,
			score: self.score,
			upvote_ratio: self.upvote_ratio.unwrap_or(0.0),
			permalink: self.permalink,
			url: self.url,
			is_original_content: self.is_original_content,
			is_self: self.is_self,
			selftext: self.selftext,
			distinguished: self.distinguished,
			locked: self.locked,
			stickied: self.stickied,
			spoiler: self.spoiler,
			over_18: self.over_18,
		})
	}

	fn into_summary(self) -> Result<SubmissionSummary, ProviderError> {
		Ok(SubmissionSummary {
			created_utc: epoch(self.created_utc)?,
			id: self.id,
			name: self.name,
			title: self.title,
			author_name: self.author,
			num_comments: self.num_comments,
			score: self.score,
			url: self.url,
		})
	}
}

#[derive(Deserialize)]
struct RawComment {
	id: String,
	body: String,
	created_utc: f64,
	#[serde(default)]
	author: Option<String>,
	#[serde(default)]
	score: i64,
	#[serde(default)]
	permalink: String,
	link_id: String,
	parent_id: String,
	subreddit: String,
	#[serde(default)]
	subreddit_id: String,
	#[serde(default)]
	replies: Value,
	#[serde(default)]
	is_submitter: bool,
	#[serde(default)]
	distinguished: Option<String>,
	#[serde(default)]
	edited: Value,
	#[serde(default)]
	stickied: bool,
}
impl RawComment {
	fn has_replies(&self) -> bool {
		self.replies.is_object()
	}

	fn into_data(
		self,
		author: Option<RedditorSummary>,
		submission: SubmissionSummary,
		subreddit: SubredditSummary,
	) -> Result<CommentData, ProviderError> {
		Ok(CommentData {
			created_utc: epoch(self.created_utc)?,
			edited: edited_flag(&self.edited),
			has_replies: self.has_replies(),
			id: self.id,
			body: self.body,
			author,
			score: self.score,
			permalink: self.permalink,
			link_id: self.link_id,
			parent_id: self.parent_id,
			submission,
			subreddit,
			is_submitter: self.is_submitter,
			distinguished: self.distinguished,
			stickied: self.stickied,
		})
	}

	fn into_summary(self) -> Result<CommentSummary, ProviderError> {
		Ok(CommentSummary {
			created_utc: epoch(self.created_utc)?,
			has_replies: self.has_replies(),
			id: self.id,
			body: self.body,
			author_name: self.author,
			score: self.score,
			subreddit_id: self.subreddit_id,
			link_id: self.link_id,
			parent_id: self.parent_id,
		})
	}
}
