//! Subreddit endpoints: lookups, org links, subscriptions, and listings.

// crates.io
use serde_json::json;
// self
use crate::{
	_prelude::*,
	api::{self, Bridge, Reply, SUBMISSION_PAGE_SIZE, observed},
	model::Subreddit,
	obs::RequestKind,
	provider::{RedditSession, SubredditData},
};

/// Query parameters of [`Bridge::subreddit_submissions`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SubmissionListingQuery {
	/// Listing sort, defaults to `hot`.
	pub sort: Option<String>,
	/// Time filter for `controversial`/`top`, defaults to `all`.
	pub time_filter: Option<String>,
	/// Number of leading submissions to skip, defaults to 0.
	pub offset: Option<i64>,
}

impl Bridge {
	/// Subreddits the connected account subscribes to; empty on read-only orgs.
	pub async fn subscriptions(&self, bearer: &str) -> Result<Reply> {
		observed(RequestKind::Subreddit, "subscriptions", async {
			let (_, session) = self.authed_session(bearer).await?;

			if session.is_read_only() {
				return Reply::data(200, json!({ "subscriptions": [] }));
			}

			let subscriptions = session
				.my_subreddits()
				.await
				.map_err(|e| Error::from_provider(e, "subscription listing"))?;

			Reply::data(200, json!({ "subscriptions": subscriptions }))
		})
		.await
	}

	/// Full subreddit payload, refreshing the local mirror.
	pub async fn subreddit_info(&self, bearer: &str, name: &str) -> Result<Reply> {
		observed(RequestKind::Subreddit, "subreddit_info", async {
			let (_, session) = self.authed_session(bearer).await?;
			let data = fetch_subreddit(session.as_ref(), name).await?;

			self.records.upsert_subreddit(Subreddit::from(&data)).await?;

			Reply::data(200, data)
		})
		.await
	}

	/// Links a subreddit to the calling client org, subscribing first when the
	/// session can write and is not yet subscribed.
	pub async fn subreddit_connect(&self, bearer: &str, name: &str) -> Result<Reply> {
		observed(RequestKind::Subreddit, "subreddit_connect", async {
			let (org, session) = self.authed_session(bearer).await?;
			let data = fetch_subreddit(session.as_ref(), name).await?;

			if !session.is_read_only()
				&& !session
					.user_is_subscriber(name)
					.await
					.map_err(|e| Error::from_provider(e, &format!("subreddit {name}")))?
			{
				session
					.set_subscribed(name, true)
					.await
					.map_err(|e| Error::from_provider(e, &format!("subreddit {name}")))?;
			}

			self.records.upsert_subreddit(Subreddit::from(&data)).await?;
			self.records.link_subreddit(&data.id, org.id).await?;

			Reply::data(201, data)
		})
		.await
	}

	/// Unlinks a subreddit from the calling client org.
	pub async fn subreddit_disconnect(&self, bearer: &str, name: &str) -> Result<Reply> {
		observed(RequestKind::Subreddit, "subreddit_disconnect", async {
			let (org, session) = self.authed_session(bearer).await?;
			let data = fetch_subreddit(session.as_ref(), name).await?;

			self.records.subreddit(&data.id).await?.ok_or_else(|| {
				Error::not_found(format!("No connected subreddit exists with the name: {name}."))
			})?;
			self.records.unlink_subreddit(&data.id, org.id).await?;

			Ok(Reply::detail(200, format!("Successfully disconnected from the subreddit: {name}.")))
		})
		.await
	}

	/// Rules of a subreddit.
	pub async fn subreddit_rules(&self, bearer: &str, name: &str) -> Result<Reply> {
		observed(RequestKind::Subreddit, "subreddit_rules", async {
			let (_, session) = self.authed_session(bearer).await?;

			fetch_subreddit(session.as_ref(), name).await?;

			let rules = session
				.subreddit_rules(name)
				.await
				.map_err(|e| Error::from_provider(e, &format!("subreddit {name}")))?;

			Reply::data(200, json!({ "rules": rules }))
		})
		.await
	}

	/// Subscribes the connected account to a subreddit.
	pub async fn subreddit_subscribe(&self, bearer: &str, name: &str) -> Result<Reply> {
		self.subscribe_action(bearer, name, true).await
	}

	/// Unsubscribes the connected account from a subreddit.
	pub async fn subreddit_unsubscribe(&self, bearer: &str, name: &str) -> Result<Reply> {
		self.subscribe_action(bearer, name, false).await
	}

	/// Pages through a subreddit's submissions, five at a time.
	pub async fn subreddit_submissions(
		&self,
		bearer: &str,
		name: &str,
		query: SubmissionListingQuery,
	) -> Result<Reply> {
		observed(RequestKind::Subreddit, "subreddit_submissions", async {
			let sort = api::parse_submission_sort(query.sort.as_deref())?;
			let time_filter = api::parse_time_filter(query.time_filter.as_deref())?;
			let offset = api::parse_offset(query.offset)?;
			let (_, session) = self.authed_session(bearer).await?;

			fetch_subreddit(session.as_ref(), name).await?;

			let submissions = session
				.submissions(name, sort, time_filter, offset + SUBMISSION_PAGE_SIZE)
				.await
				.map_err(|e| Error::from_provider(e, &format!("subreddit {name}")))?
				.into_iter()
				.skip(offset)
				.collect::<Vec<_>>();

			Reply::data(
				200,
				json!({
					"submissions": submissions,
					"sort_type": sort.as_str(),
					"time_filter": time_filter.as_str(),
					"offset": offset,
				}),
			)
		})
		.await
	}

	async fn subscribe_action(&self, bearer: &str, name: &str, subscribe: bool) -> Result<Reply> {
		let stage = if subscribe { "subreddit_subscribe" } else { "subreddit_unsubscribe" };

		observed(RequestKind::Subreddit, stage, async {
			let verb = if subscribe { "subscribe" } else { "unsubscribe" };
			let (_, session) = self.authed_session(bearer).await?;

			if session.is_read_only() {
				return Err(Error::method_not_allowed(format!(
					"Cannot {verb} without a connected Reddit account."
				)));
			}

			fetch_subreddit(session.as_ref(), name).await?;

			let subscribed = session
				.user_is_subscriber(name)
				.await
				.map_err(|e| Error::from_provider(e, &format!("subreddit {name}")))?;

			if subscribed == subscribe {
				let detail = if subscribe {
					format!("Already subscribed to the subreddit: {name}.")
				} else {
					format!("Not subscribed to the subreddit: {name}.")
				};

				return Ok(Reply::detail(200, detail));
			}

			session.set_subscribed(name, subscribe).await.map_err(|_| {
				Error::service_unavailable(format!(
					"Could not {verb} the subreddit: {name}. Try again later."
				))
			})?;

			let detail = if subscribe {
				format!("Successfully subscribed to the subreddit: {name}.")
			} else {
				format!("Successfully unsubscribed from the subreddit: {name}.")
			};

			Ok(Reply::detail(200, detail))
		})
		.await
	}
}

pub(crate) async fn fetch_subreddit(
	session: &dyn RedditSession,
	name: &str,
) -> Result<SubredditData> {
	session
		.subreddit(name)
		.await
		.map_err(|e| Error::from_provider(e, &format!("subreddit {name}")))?
		.ok_or_else(|| Error::not_found(format!("No subreddit exists with the name: {name}.")))
}
