//! Provider seam: trait contracts and data types for the Reddit and Salesforce APIs.
//!
//! The bridge never talks to a provider directly. Reddit access goes through
//! [`RedditApp`] (app-level: authorize URL, code exchange, session construction)
//! and [`RedditSession`] (per-grant: identity, subreddits, submissions, comments,
//! votes). Salesforce access goes through [`SalesforceApp`]. Production
//! implementations live in [`http`] behind the `reqwest` feature; tests plug in
//! in-memory fakes from `_preludet`.

#[cfg(feature = "reqwest")] pub mod http;
pub mod salesforce;

pub use salesforce::*;

// self
use crate::{_prelude::*, auth::Secret};

/// Boxed future returned by provider trait methods.
pub type ProviderFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, ProviderError>> + 'a + Send>>;

/// Failure modes surfaced by provider implementations.
///
/// Handlers translate these into the caller-facing taxonomy at the boundary;
/// lookups model absence as `Option` rather than [`ProviderError::NotFound`], which
/// is reserved for mutations against objects that vanished mid-flight.
#[derive(Debug, ThisError)]
pub enum ProviderError {
	/// The targeted provider object does not exist.
	#[error("Provider object not found: {subject}.")]
	NotFound {
		/// Human-readable name of the missing object.
		subject: String,
	},
	/// The provider rejected the action for this identity.
	#[error("Provider denied the request: {reason}.")]
	Forbidden {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// The stored refresh token is no longer accepted by the provider.
	#[error("Provider rejected the stored grant.")]
	AuthExpired,
	/// Transport-level failure (DNS, TCP, TLS).
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: Box<dyn StdError + Send + Sync>,
	},
	/// The provider returned something the bridge cannot interpret.
	#[error("Provider returned an unexpected response: {message}.")]
	Unexpected {
		/// Summary of the unexpected response.
		message: String,
	},
}
impl ProviderError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Builds an [`ProviderError::Unexpected`] from a message.
	pub fn unexpected(message: impl Into<String>) -> Self {
		Self::Unexpected { message: message.into() }
	}
}

/// App-level Reddit contract: the pieces that exist before any user grant.
pub trait RedditApp
where
	Self: Send + Sync,
{
	/// Fully-formed authorization URL embedding the handshake state.
	fn authorize_url(&self, state: &str) -> Url;

	/// Exchanges an authorization code for a permanent refresh token.
	fn exchange_code<'a>(&'a self, code: &'a str) -> ProviderFuture<'a, Secret>;

	/// Revokes a refresh token at the provider. Best-effort; callers log failures.
	fn revoke_refresh_token<'a>(&'a self, token: &'a Secret) -> ProviderFuture<'a, ()>;

	/// Builds a session for the given refresh token, or a read-only session
	/// when no token is supplied.
	fn session(&self, refresh_token: Option<&Secret>) -> Arc<dyn RedditSession>;
}

/// Per-grant Reddit contract covering every operation the bridge proxies.
pub trait RedditSession
where
	Self: Send + Sync,
{
	/// Whether this session carries no user grant and can only read.
	fn is_read_only(&self) -> bool;

	/// Liveness probe; fails with [`ProviderError::AuthExpired`] when the
	/// underlying grant is no longer usable.
	fn check(&self) -> ProviderFuture<'_, ()>;

	/// Identity of the authenticated redditor.
	fn me(&self) -> ProviderFuture<'_, RedditorData>;

	/// Looks up a redditor by username; `None` when no such account exists.
	fn redditor<'a>(&'a self, name: &'a str) -> ProviderFuture<'a, Option<RedditorData>>;

	/// Subreddits the authenticated redditor subscribes to.
	fn my_subreddits(&self) -> ProviderFuture<'_, Vec<SubredditSummary>>;

	/// Looks up a subreddit by display name; `None` when no such subreddit exists.
	fn subreddit<'a>(&'a self, name: &'a str) -> ProviderFuture<'a, Option<SubredditData>>;

	/// Rules of a subreddit.
	fn subreddit_rules<'a>(&'a self, name: &'a str) -> ProviderFuture<'a, Vec<SubredditRule>>;

	/// Whether the authenticated redditor subscribes to the subreddit.
	fn user_is_subscriber<'a>(&'a self, name: &'a str) -> ProviderFuture<'a, bool>;

	/// Subscribes (`true`) or unsubscribes (`false`) the authenticated redditor.
	fn set_subscribed<'a>(&'a self, name: &'a str, subscribed: bool) -> ProviderFuture<'a, ()>;

	/// Listing of subreddit submissions under the given sort.
	fn submissions<'a>(
		&'a self,
		subreddit: &'a str,
		sort: SubmissionSort,
		time_filter: TimeFilter,
		limit: usize,
	) -> ProviderFuture<'a, Vec<SubmissionSummary>>;

	/// Looks up a submission by id; `None` when no such submission exists.
	fn submission<'a>(&'a self, id: &'a str) -> ProviderFuture<'a, Option<SubmissionData>>;

	/// Top-level comments of a submission (recursively flattened when `flat`).
	fn submission_comments<'a>(
		&'a self,
		id: &'a str,
		sort: CommentSort,
		limit: usize,
		flat: bool,
	) -> ProviderFuture<'a, Vec<CommentSummary>>;

	/// Looks up a comment by id; `None` when no such comment exists.
	fn comment<'a>(&'a self, id: &'a str) -> ProviderFuture<'a, Option<CommentData>>;

	/// Top-level replies of a comment (recursively flattened when `flat`).
	fn comment_replies<'a>(
		&'a self,
		id: &'a str,
		limit: usize,
		flat: bool,
	) -> ProviderFuture<'a, Vec<CommentSummary>>;

	/// Casts a vote on a fullname (`t3_*` submission, `t1_*` comment).
	fn vote<'a>(
		&'a self,
		fullname: &'a str,
		direction: VoteDirection,
	) -> ProviderFuture<'a, ()>;

	/// Replies to a fullname with Markdown text, returning the created comment.
	fn reply<'a>(
		&'a self,
		parent_fullname: &'a str,
		text: &'a str,
	) -> ProviderFuture<'a, CommentData>;

	/// Deletes a fullname owned by the authenticated redditor.
	fn delete<'a>(&'a self, fullname: &'a str) -> ProviderFuture<'a, ()>;

	/// Crossposts a submission into another subreddit.
	fn crosspost<'a>(
		&'a self,
		submission_id: &'a str,
		subreddit: &'a str,
		title: Option<&'a str>,
	) -> ProviderFuture<'a, SubmissionData>;
}

/// Vote directions accepted by the vote endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteDirection {
	/// `vote_value: -1`.
	Down,
	/// `vote_value: 0`.
	Clear,
	/// `vote_value: 1`.
	Up,
}
impl VoteDirection {
	/// Parses the wire value; only `-1`, `0`, and `1` are accepted.
	pub fn from_value(value: i64) -> Option<Self> {
		match value {
			-1 => Some(Self::Down),
			0 => Some(Self::Clear),
			1 => Some(Self::Up),
			_ => None,
		}
	}

	/// Caller-facing action label used in response details.
	pub fn action_label(self) -> &'static str {
		match self {
			Self::Down => "Downvote",
			Self::Clear => "Clear Vote",
			Self::Up => "Upvote",
		}
	}

	/// Reddit wire value for the `/api/vote` direction parameter.
	pub fn wire_value(self) -> i8 {
		match self {
			Self::Down => -1,
			Self::Clear => 0,
			Self::Up => 1,
		}
	}
}

/// Submission listing sorts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubmissionSort {
	/// Controversial listing; honors the time filter.
	Controversial,
	/// Gilded listing.
	Gilded,
	#[default]
	/// Hot listing (the default).
	Hot,
	/// New listing.
	New,
	/// Rising listing.
	Rising,
	/// Top listing; honors the time filter.
	Top,
}
impl SubmissionSort {
	/// Parses the query-parameter spelling.
	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"controversial" => Some(Self::Controversial),
			"gilded" => Some(Self::Gilded),
			"hot" => Some(Self::Hot),
			"new" => Some(Self::New),
			"rising" => Some(Self::Rising),
			"top" => Some(Self::Top),
			_ => None,
		}
	}

	/// Stable wire label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Controversial => "controversial",
			Self::Gilded => "gilded",
			Self::Hot => "hot",
			Self::New => "new",
			Self::Rising => "rising",
			Self::Top => "top",
		}
	}

	/// Whether the sort honors a time filter.
	pub const fn uses_time_filter(self) -> bool {
		matches!(self, Self::Controversial | Self::Top)
	}
}
impl Display for SubmissionSort {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Time filters for controversial/top submission listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeFilter {
	#[default]
	/// All time (the default).
	All,
	/// Past day.
	Day,
	/// Past hour.
	Hour,
	/// Past month.
	Month,
	/// Past week.
	Week,
	/// Past year.
	Year,
}
impl TimeFilter {
	/// Parses the query-parameter spelling.
	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"all" => Some(Self::All),
			"day" => Some(Self::Day),
			"hour" => Some(Self::Hour),
			"month" => Some(Self::Month),
			"week" => Some(Self::Week),
			"year" => Some(Self::Year),
			_ => None,
		}
	}

	/// Stable wire label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::All => "all",
			Self::Day => "day",
			Self::Hour => "hour",
			Self::Month => "month",
			Self::Week => "week",
			Self::Year => "year",
		}
	}
}
impl Display for TimeFilter {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Comment listing sorts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CommentSort {
	#[default]
	/// Best (the default).
	Best,
	/// Top.
	Top,
	/// New.
	New,
	/// Controversial.
	Controversial,
	/// Old.
	Old,
	/// Q&A; wire spelling is `q&a`.
	QAndA,
}
impl CommentSort {
	/// Parses the query-parameter spelling (`q&a` for [`CommentSort::QAndA`]).
	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"best" => Some(Self::Best),
			"top" => Some(Self::Top),
			"new" => Some(Self::New),
			"controversial" => Some(Self::Controversial),
			"old" => Some(Self::Old),
			"q&a" => Some(Self::QAndA),
			_ => None,
		}
	}

	/// Stable wire label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Best => "best",
			Self::Top => "top",
			Self::New => "new",
			Self::Controversial => "controversial",
			Self::Old => "old",
			Self::QAndA => "q&a",
		}
	}
}
impl Display for CommentSort {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Full redditor payload mirrored into the local [`Redditor`](crate::model::Redditor) row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RedditorData {
	/// Provider-issued redditor id.
	pub id: String,
	/// Username.
	pub name: String,
	/// Account creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_utc: OffsetDateTime,
	/// Whether the account verified its email.
	pub has_verified_email: bool,
	/// Avatar URL.
	pub icon_img: String,
	/// Comment karma.
	pub comment_karma: i64,
	/// Link karma.
	pub link_karma: i64,
	/// Friend count, when exposed by the provider.
	pub num_friends: Option<u32>,
	/// Whether the account belongs to a Reddit employee.
	pub is_employee: Option<bool>,
	/// Whether the account is a friend of the authenticated redditor.
	pub is_friend: Option<bool>,
	/// Whether the account moderates any subreddit.
	pub is_mod: Option<bool>,
	/// Whether the account has gold status.
	pub is_gold: Option<bool>,
}

/// Condensed redditor payload embedded in submissions and comments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RedditorSummary {
	/// Provider-issued redditor id.
	pub id: String,
	/// Username.
	pub name: String,
	/// Account creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_utc: OffsetDateTime,
	/// Avatar URL.
	pub icon_img: String,
	/// Comment karma.
	pub comment_karma: i64,
	/// Link karma.
	pub link_karma: i64,
}

/// Full subreddit payload mirrored into the local [`Subreddit`](crate::model::Subreddit) row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubredditData {
	/// Provider-issued subreddit id.
	pub id: String,
	/// Fullname (`t5_*`).
	pub name: String,
	/// Display name.
	pub display_name: String,
	/// Sidebar description in Markdown.
	pub description: Option<String>,
	/// Sidebar description in HTML.
	pub description_html: Option<String>,
	/// Public description shown in searches.
	pub public_description: Option<String>,
	/// Creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_utc: OffsetDateTime,
	/// Subscriber count.
	pub subscribers: u64,
	/// Whether the spoiler tag feature is enabled.
	pub spoilers_enabled: Option<bool>,
	/// Whether the subreddit is NSFW.
	pub over18: Option<bool>,
	/// Whether the authenticated redditor can assign link flair.
	pub can_assign_link_flair: Option<bool>,
	/// Whether the authenticated redditor can assign user flair.
	pub can_assign_user_flair: Option<bool>,
}
impl SubredditData {
	/// Condensed view of this payload for listings.
	pub fn to_summary(&self) -> SubredditSummary {
		SubredditSummary {
			id: self.id.clone(),
			name: self.name.clone(),
			display_name: self.display_name.clone(),
			public_description: self.public_description.clone(),
			created_utc: self.created_utc,
			subscribers: self.subscribers,
		}
	}
}

/// Condensed subreddit payload used in subscription listings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubredditSummary {
	/// Provider-issued subreddit id.
	pub id: String,
	/// Fullname (`t5_*`).
	pub name: String,
	/// Display name.
	pub display_name: String,
	/// Public description shown in searches.
	pub public_description: Option<String>,
	/// Creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_utc: OffsetDateTime,
	/// Subscriber count.
	pub subscribers: u64,
}

/// A single subreddit rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubredditRule {
	/// Short rule name.
	pub short_name: String,
	/// Rule description, when provided.
	pub description: Option<String>,
	/// Violation reason shown in report flows.
	pub violation_reason: Option<String>,
	/// Rule kind (`link`, `comment`, or `all`).
	pub kind: String,
	/// Ordering priority.
	pub priority: i64,
}

/// Full submission payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubmissionData {
	/// Provider-issued submission id.
	pub id: String,
	/// Fullname (`t3_*`).
	pub name: String,
	/// Title.
	pub title: String,
	/// Creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_utc: OffsetDateTime,
	/// Author, when the account still exists.
	pub author: Option<RedditorSummary>,
	/// Comment count.
	pub num_comments: u64,
	/// Score.
	pub score: i64,
	/// Upvote ratio.
	pub upvote_ratio: f64,
	/// Site-relative permalink.
	pub permalink: String,
	/// Target URL (self URL for text posts).
	pub url: String,
	/// Whether the post is marked OC.
	pub is_original_content: bool,
	/// Whether the post is a text post.
	pub is_self: bool,
	/// Text body for self posts.
	pub selftext: String,
	/// Distinguished label (`moderator`, `admin`), when set.
	pub distinguished: Option<String>,
	/// Whether the post was edited.
	pub edited: bool,
	/// Whether the post is locked.
	pub locked: bool,
	/// Whether the post is stickied.
	pub stickied: bool,
	/// Whether the post is marked as a spoiler.
	pub spoiler: bool,
	/// Whether the post is NSFW.
	pub over_18: bool,
}
impl SubmissionData {
	/// Condensed view of this payload for listings.
	pub fn to_summary(&self) -> SubmissionSummary {
		SubmissionSummary {
			id: self.id.clone(),
			name: self.name.clone(),
			title: self.title.clone(),
			created_utc: self.created_utc,
			author_name: self.author.as_ref().map(|author| author.name.clone()),
			num_comments: self.num_comments,
			score: self.score,
			url: self.url.clone(),
		}
	}
}

/// Condensed submission payload used in listings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubmissionSummary {
	/// Provider-issued submission id.
	pub id: String,
	/// Fullname (`t3_*`).
	pub name: String,
	/// Title.
	pub title: String,
	/// Creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_utc: OffsetDateTime,
	/// Author name, when the account still exists.
	pub author_name: Option<String>,
	/// Comment count.
	pub num_comments: u64,
	/// Score.
	pub score: i64,
	/// Target URL.
	pub url: String,
}

/// Full comment payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommentData {
	/// Provider-issued comment id.
	pub id: String,
	/// Markdown body.
	pub body: String,
	/// Creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_utc: OffsetDateTime,
	/// Author, when the account still exists.
	pub author: Option<RedditorSummary>,
	/// Score.
	pub score: i64,
	/// Site-relative permalink.
	pub permalink: String,
	/// Fullname of the submission this comment belongs to.
	pub link_id: String,
	/// Fullname of the direct parent (submission or comment).
	pub parent_id: String,
	/// Condensed payload of the owning submission.
	pub submission: SubmissionSummary,
	/// Condensed payload of the owning subreddit.
	pub subreddit: SubredditSummary,
	/// Whether the comment has replies.
	pub has_replies: bool,
	/// Whether the author also authored the submission.
	pub is_submitter: bool,
	/// Distinguished label, when set.
	pub distinguished: Option<String>,
	/// Whether the comment was edited.
	pub edited: bool,
	/// Whether the comment is stickied.
	pub stickied: bool,
}
impl CommentData {
	/// Condensed view of this payload for reply listings.
	pub fn to_summary(&self) -> CommentSummary {
		CommentSummary {
			id: self.id.clone(),
			body: self.body.clone(),
			created_utc: self.created_utc,
			author_name: self.author.as_ref().map(|author| author.name.clone()),
			score: self.score,
			subreddit_id: self.subreddit.name.clone(),
			link_id: self.link_id.clone(),
			parent_id: self.parent_id.clone(),
			has_replies: self.has_replies,
		}
	}
}

/// Condensed comment payload used in comment/reply listings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommentSummary {
	/// Provider-issued comment id.
	pub id: String,
	/// Markdown body.
	pub body: String,
	/// Creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_utc: OffsetDateTime,
	/// Author name, when the account still exists.
	pub author_name: Option<String>,
	/// Score.
	pub score: i64,
	/// Fullname of the owning subreddit.
	pub subreddit_id: String,
	/// Fullname of the owning submission.
	pub link_id: String,
	/// Fullname of the direct parent.
	pub parent_id: String,
	/// Whether the comment has replies.
	pub has_replies: bool,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn vote_direction_parses_only_the_three_wire_values() {
		assert_eq!(VoteDirection::from_value(-1), Some(VoteDirection::Down));
		assert_eq!(VoteDirection::from_value(0), Some(VoteDirection::Clear));
		assert_eq!(VoteDirection::from_value(1), Some(VoteDirection::Up));
		assert_eq!(VoteDirection::from_value(2), None);
		assert_eq!(VoteDirection::from_value(-2), None);
		assert_eq!(VoteDirection::Clear.action_label(), "Clear Vote");
	}

	#[test]
	fn submission_sorts_match_the_documented_set() {
		for label in ["controversial", "gilded", "hot", "new", "rising", "top"] {
			let sort = SubmissionSort::parse(label)
				.expect("Documented sort labels should parse successfully.");

			assert_eq!(sort.as_str(), label);
		}

		assert_eq!(SubmissionSort::parse("best"), None);
		assert!(SubmissionSort::Top.uses_time_filter());
		assert!(SubmissionSort::Controversial.uses_time_filter());
		assert!(!SubmissionSort::Hot.uses_time_filter());
	}

	#[test]
	fn comment_sort_keeps_the_ampersand_spelling() {
		assert_eq!(CommentSort::parse("q&a"), Some(CommentSort::QAndA));
		assert_eq!(CommentSort::QAndA.as_str(), "q&a");
		assert_eq!(CommentSort::parse("q_a"), None);
	}

	#[test]
	fn time_filter_includes_day() {
		assert_eq!(TimeFilter::parse("day"), Some(TimeFilter::Day));
		assert_eq!(TimeFilter::parse("decade"), None);
	}

	#[test]
	fn redditor_data_serializes_created_utc_as_rfc3339() {
		let data = RedditorData {
			id: "4rfkxa54".into(),
			name: "sfdctest".into(),
			created_utc: time::macros::datetime!(2019-10-31 19:22:45 UTC),
			has_verified_email: true,
			icon_img: "https://example.com/avatar.png".into(),
			comment_karma: 0,
			link_karma: 1,
			num_friends: Some(0),
			is_employee: Some(false),
			is_friend: Some(false),
			is_mod: Some(false),
			is_gold: Some(false),
		};
		let value =
			serde_json::to_value(&data).expect("Redditor payload should serialize successfully.");

		assert_eq!(value["created_utc"], "2019-10-31T19:22:45Z");

		let round_trip: RedditorData = serde_json::from_value(value)
			.expect("Serialized redditor payload should deserialize.");

		assert_eq!(round_trip, data);
	}
}
