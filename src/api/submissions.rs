//! Submission endpoints: info, votes, comment listings, replies, deletes, crossposts.

// crates.io
use serde_json::json;
// self
use crate::{
	_prelude::*,
	api::{self, Bridge, Reply, observed},
	obs::RequestKind,
	provider::{RedditSession, SubmissionData},
};

/// Query parameters of [`Bridge::submission_comments`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CommentListingQuery {
	/// Comment sort, defaults to `best`.
	pub sort: Option<String>,
	/// Listing limit, `0 < limit < 21`, defaults to 10.
	pub limit: Option<i64>,
	/// Number of leading comments to skip, defaults to 0.
	pub offset: Option<i64>,
	/// Whether to flatten reply trees into the listing, defaults to `false`.
	pub flat: Option<bool>,
}

impl Bridge {
	/// Full submission payload.
	pub async fn submission_info(&self, bearer: &str, id: &str) -> Result<Reply> {
		observed(RequestKind::Submission, "submission_info", async {
			let (_, session) = self.authed_session(bearer).await?;
			let data = fetch_submission(session.as_ref(), id).await?;

			Reply::data(200, data)
		})
		.await
	}

	/// Casts a vote on a submission.
	///
	/// Read-only sessions report a synthetic `dummy` action without touching
	/// the provider, so unconnected orgs can exercise their integration.
	pub async fn submission_vote(
		&self,
		bearer: &str,
		id: &str,
		vote_value: Option<i64>,
	) -> Result<Reply> {
		observed(RequestKind::Submission, "submission_vote", async {
			let direction = api::parse_vote(vote_value)?;
			let (_, session) = self.authed_session(bearer).await?;

			fetch_submission(session.as_ref(), id).await?;

			let action = if session.is_read_only() {
				"dummy"
			} else {
				session
					.vote(&format!("t3_{id}"), direction)
					.await
					.map_err(|e| Error::from_provider(e, &format!("submission with the id: {id}")))?;

				direction.action_label()
			};

			Reply::data(
				200,
				json!({
					"action": action,
					"detail":
						format!("Vote action {action} successful for the submission with the id: {id}."),
				}),
			)
		})
		.await
	}

	/// Pages through a submission's comment tree.
	pub async fn submission_comments(
		&self,
		bearer: &str,
		id: &str,
		query: CommentListingQuery,
	) -> Result<Reply> {
		observed(RequestKind::Submission, "submission_comments", async {
			let sort = api::parse_comment_sort(query.sort.as_deref())?;
			let limit = api::parse_limit(query.limit)?;
			let offset = api::parse_offset(query.offset)?;
			let flat = query.flat.unwrap_or(false);
			let (_, session) = self.authed_session(bearer).await?;

			fetch_submission(session.as_ref(), id).await?;

			let comments = session
				.submission_comments(id, sort, offset + limit, flat)
				.await
				.map_err(|e| Error::from_provider(e, &format!("submission with the id: {id}")))?
				.into_iter()
				.skip(offset)
				.collect::<Vec<_>>();

			Reply::data(
				200,
				json!({
					"comments": comments,
					"sort_type": sort.as_str(),
					"limit_request": limit,
					"offset": offset,
					"flat": flat,
				}),
			)
		})
		.await
	}

	/// Replies to a submission with Markdown text.
	pub async fn submission_reply(
		&self,
		bearer: &str,
		id: &str,
		text: Option<&str>,
	) -> Result<Reply> {
		observed(RequestKind::Submission, "submission_reply", async {
			let (_, session) = self.authed_session(bearer).await?;

			if session.is_read_only() {
				return Err(Error::method_not_allowed(
					"Cannot reply without a connected Reddit account.",
				));
			}

			let text = text
				.filter(|text| !text.trim().is_empty())
				.ok_or_else(|| Error::parse("Text must be provided."))?;

			fetch_submission(session.as_ref(), id).await?;

			let comment = session
				.reply(&format!("t3_{id}"), text)
				.await
				.map_err(|e| Error::from_provider(e, &format!("submission with the id: {id}")))?;

			Reply::data(201, comment)
		})
		.await
	}

	/// Deletes a submission owned by the connected redditor.
	pub async fn submission_delete(&self, bearer: &str, id: &str) -> Result<Reply> {
		observed(RequestKind::Submission, "submission_delete", async {
			let (_, session) = self.authed_session(bearer).await?;

			if session.is_read_only() {
				return Err(Error::method_not_allowed(
					"Cannot delete without a connected Reddit account.",
				));
			}

			let data = fetch_submission(session.as_ref(), id).await?;

			ensure_own_object(session.as_ref(), data.author.as_ref().map(|a| a.name.as_str()), id, "submission")
				.await?;
			session
				.delete(&format!("t3_{id}"))
				.await
				.map_err(|e| Error::from_provider(e, &format!("submission with the id: {id}")))?;

			Ok(Reply::detail(200, format!("Successfully deleted the submission with the id: {id}.")))
		})
		.await
	}

	/// Crossposts a submission into another subreddit.
	pub async fn submission_crosspost(
		&self,
		bearer: &str,
		id: &str,
		subreddit: &str,
		title: Option<&str>,
	) -> Result<Reply> {
		observed(RequestKind::Submission, "submission_crosspost", async {
			let (_, session) = self.authed_session(bearer).await?;

			if session.is_read_only() {
				return Err(Error::method_not_allowed(
					"Cannot crosspost without a connected Reddit account.",
				));
			}

			fetch_submission(session.as_ref(), id).await?;
			crate::api::subreddits::fetch_subreddit(session.as_ref(), subreddit).await?;

			let created = session
				.crosspost(id, subreddit, title)
				.await
				.map_err(|e| Error::from_provider(e, &format!("submission with the id: {id}")))?;

			Reply::data(201, created)
		})
		.await
	}
}

pub(crate) async fn fetch_submission(
	session: &dyn RedditSession,
	id: &str,
) -> Result<SubmissionData> {
	session
		.submission(id)
		.await
		.map_err(|e| Error::from_provider(e, &format!("submission with the id: {id}")))?
		.ok_or_else(|| Error::not_found(format!("No submission exists with the id: {id}.")))
}

/// Deletion requires the authenticated redditor to own the object.
pub(crate) async fn ensure_own_object(
	session: &dyn RedditSession,
	author_name: Option<&str>,
	id: &str,
	kind: &str,
) -> Result<()> {
	let me = session.me().await.map_err(|e| Error::from_provider(e, "redditor identity"))?;

	if author_name != Some(me.name.as_str()) {
		return Err(Error::permission_denied(format!(
			"Cannot delete the {kind} with the id: {id}. It belongs to another redditor."
		)));
	}

	Ok(())
}
