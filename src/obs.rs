//! Request and outcome labels for bridge observability.
//!
//! Every endpoint runs through one instrumented wrapper on the [`Bridge`]
//! side, which tags its span and counter with these labels.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `reddit_bridge.request` with the `request`
//!   (operation family) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `reddit_bridge_request_total` counter for every
//!   attempt/success/failure, labeled by `request` + `outcome`.
//!
//! [`Bridge`]: crate::api::Bridge

// self
use crate::_prelude::*;

/// Operation families observed by the bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestKind {
	/// Reddit OAuth handshake operations.
	RedditOauth,
	/// Salesforce OAuth handshake operations.
	SalesforceOauth,
	/// Client-org and token operations.
	Client,
	/// Redditor lookups.
	Redditor,
	/// Subreddit operations.
	Subreddit,
	/// Submission operations.
	Submission,
	/// Comment operations.
	Comment,
}
impl RequestKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestKind::RedditOauth => "reddit_oauth",
			RequestKind::SalesforceOauth => "salesforce_oauth",
			RequestKind::Client => "client",
			RequestKind::Redditor => "redditor",
			RequestKind::Subreddit => "subreddit",
			RequestKind::Submission => "submission",
			RequestKind::Comment => "comment",
		}
	}
}
impl Display for RequestKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
	/// Entry to a bridge operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl RequestOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestOutcome::Attempt => "attempt",
			RequestOutcome::Success => "success",
			RequestOutcome::Failure => "failure",
		}
	}
}
impl Display for RequestOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
