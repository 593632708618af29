//! Comment endpoints: info, votes, reply listings, replies, deletes.

// crates.io
use serde_json::json;
// self
use crate::{
	_prelude::*,
	api::{self, Bridge, Reply, observed, submissions::ensure_own_object},
	obs::RequestKind,
	provider::{CommentData, RedditSession},
};

/// Query parameters of [`Bridge::comment_replies`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ReplyListingQuery {
	/// Listing limit, `0 < limit < 21`, defaults to 10.
	pub limit: Option<i64>,
	/// Number of leading replies to skip, defaults to 0.
	pub offset: Option<i64>,
	/// Whether to flatten nested reply trees, defaults to `false`.
	pub flat: Option<bool>,
}

impl Bridge {
	/// Full comment payload, including its submission and subreddit context.
	pub async fn comment_info(&self, bearer: &str, id: &str) -> Result<Reply> {
		observed(RequestKind::Comment, "comment_info", async {
			let (_, session) = self.authed_session(bearer).await?;
			let data = fetch_comment(session.as_ref(), id).await?;

			Reply::data(200, data)
		})
		.await
	}

	/// Casts a vote on a comment; same contract as submission votes.
	pub async fn comment_vote(
		&self,
		bearer: &str,
		id: &str,
		vote_value: Option<i64>,
	) -> Result<Reply> {
		observed(RequestKind::Comment, "comment_vote", async {
			let direction = api::parse_vote(vote_value)?;
			let (_, session) = self.authed_session(bearer).await?;

			fetch_comment(session.as_ref(), id).await?;

			let action = if session.is_read_only() {
				"dummy"
			} else {
				session
					.vote(&format!("t1_{id}"), direction)
					.await
					.map_err(|e| Error::from_provider(e, &format!("comment with the id: {id}")))?;

				direction.action_label()
			};

			Reply::data(
				200,
				json!({
					"action": action,
					"detail":
						format!("Vote action {action} successful for the comment with the id: {id}."),
				}),
			)
		})
		.await
	}

	/// Pages through a comment's replies.
	pub async fn comment_replies(
		&self,
		bearer: &str,
		id: &str,
		query: ReplyListingQuery,
	) -> Result<Reply> {
		observed(RequestKind::Comment, "comment_replies", async {
			let limit = api::parse_limit(query.limit)?;
			let offset = api::parse_offset(query.offset)?;
			let flat = query.flat.unwrap_or(false);
			let (_, session) = self.authed_session(bearer).await?;

			fetch_comment(session.as_ref(), id).await?;

			let replies = session
				.comment_replies(id, offset + limit, flat)
				.await
				.map_err(|e| Error::from_provider(e, &format!("comment with the id: {id}")))?
				.into_iter()
				.skip(offset)
				.collect::<Vec<_>>();

			Reply::data(
				200,
				json!({
					"replies": replies,
					"limit_request": limit,
					"offset": offset,
					"flat": flat,
				}),
			)
		})
		.await
	}

	/// Replies to a comment with Markdown text.
	pub async fn comment_reply(&self, bearer: &str, id: &str, text: Option<&str>) -> Result<Reply> {
		observed(RequestKind::Comment, "comment_reply", async {
			let (_, session) = self.authed_session(bearer).await?;

			if session.is_read_only() {
				return Err(Error::method_not_allowed(
					"Cannot reply without a connected Reddit account.",
				));
			}

			let text = text
				.filter(|text| !text.trim().is_empty())
				.ok_or_else(|| Error::parse("Text must be provided."))?;

			fetch_comment(session.as_ref(), id).await?;

			let created = session
				.reply(&format!("t1_{id}"), text)
				.await
				.map_err(|e| Error::from_provider(e, &format!("comment with the id: {id}")))?;

			Reply::data(201, created)
		})
		.await
	}

	/// Deletes a comment owned by the connected redditor.
	pub async fn comment_delete(&self, bearer: &str, id: &str) -> Result<Reply> {
		observed(RequestKind::Comment, "comment_delete", async {
			let (_, session) = self.authed_session(bearer).await?;

			if session.is_read_only() {
				return Err(Error::method_not_allowed(
					"Cannot delete without a connected Reddit account.",
				));
			}

			let data = fetch_comment(session.as_ref(), id).await?;

			ensure_own_object(
				session.as_ref(),
				data.author.as_ref().map(|a| a.name.as_str()),
				id,
				"comment",
			)
			.await?;
			session
				.delete(&format!("t1_{id}"))
				.await
				.map_err(|e| Error::from_provider(e, &format!("comment with the id: {id}")))?;

			Ok(Reply::detail(200, format!("Successfully deleted the comment with the id: {id}.")))
		})
		.await
	}
}

pub(crate) async fn fetch_comment(session: &dyn RedditSession, id: &str) -> Result<CommentData> {
	session
		.comment(id)
		.await
		.map_err(|e| Error::from_provider(e, &format!("comment with the id: {id}")))?
		.ok_or_else(|| Error::not_found(format!("No comment exists with the id: {id}.")))
}
