//! The [`Bridge`] facade: every endpoint as an async method.
//!
//! Methods take parsed inputs and return [`Reply`] values carrying an HTTP
//! status and a JSON body already wrapped in the `{data: ...}` envelope; errors
//! render through [`Error::to_envelope`](crate::error::Error::to_envelope) on
//! the transport side. Per-surface implementations live in the submodules.

pub mod clients;
pub mod comments;
pub mod redditors;
pub mod salesforce;
pub mod submissions;
pub mod subreddits;

// crates.io
use async_lock::MutexGuardArc;
use serde_json::{Value, json};
// self
use crate::{
	_prelude::*,
	auth::{Principal, SessionResolver},
	config::BridgeConfig,
	handshake::HandshakeTracker,
	model::ClientOrg,
	obs::{RequestKind, RequestOutcome},
	provider::{
		CommentSort, RedditApp, RedditSession, SalesforceApp, SubmissionSort, TimeFilter,
		VoteDirection,
	},
	store::{HandshakeStore, RecordStore},
};
#[cfg(feature = "reqwest")]
use crate::{
	provider::http::{HttpRedditApp, HttpSalesforceApp},
	store::MemoryStore,
};

/// Page size of subreddit submission listings.
pub const SUBMISSION_PAGE_SIZE: usize = 5;
/// Default comment listing limit.
pub const DEFAULT_COMMENT_LIMIT: usize = 10;
/// Exclusive upper bound of comment listing limits.
pub const COMMENT_LIMIT_CAP: usize = 21;

/// Status + JSON body pair handed back to the transport layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
	/// HTTP status code.
	pub status: u16,
	/// Response body, already wrapped in the `{data: ...}` envelope.
	pub body: Value,
}
impl Reply {
	/// Wraps a serializable payload in the success envelope.
	pub fn data(status: u16, payload: impl Serialize) -> Result<Self> {
		Ok(Self { status, body: json!({ "data": serde_json::to_value(payload)? }) })
	}

	/// Wraps a human-readable detail string in the success envelope.
	pub fn detail(status: u16, detail: impl Into<String>) -> Self {
		Self { status, body: json!({ "data": { "detail": detail.into() } }) }
	}
}

/// Framework-agnostic facade over the handshake tracker, stores, and providers.
///
/// One bridge serves every client org; all state lives behind the injected
/// store and provider seams, so bridges are cheap to construct and hermetic to
/// test.
pub struct Bridge {
	pub(crate) config: BridgeConfig,
	pub(crate) handshakes: HandshakeTracker,
	pub(crate) records: Arc<dyn RecordStore>,
	pub(crate) reddit: Arc<dyn RedditApp>,
	pub(crate) salesforce: Arc<dyn SalesforceApp>,
	pub(crate) resolver: SessionResolver,
	confirm_guards: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}
impl Bridge {
	/// Assembles a bridge from explicit store and provider implementations.
	pub fn new(
		config: BridgeConfig,
		handshake_store: Arc<dyn HandshakeStore>,
		records: Arc<dyn RecordStore>,
		reddit: Arc<dyn RedditApp>,
		salesforce: Arc<dyn SalesforceApp>,
	) -> Self {
		Self {
			handshakes: HandshakeTracker::new(handshake_store, config.handshake_ttl),
			resolver: SessionResolver::new(records.clone(), reddit.clone()),
			config,
			records,
			reddit,
			salesforce,
			confirm_guards: Default::default(),
		}
	}

	/// Assembles a bridge over the built-in memory stores and reqwest providers.
	#[cfg(feature = "reqwest")]
	pub fn over_http(config: BridgeConfig) -> Result<Self> {
		let store = Arc::new(MemoryStore::default());
		let reddit = HttpRedditApp::new(config.reddit.clone())
			.map_err(|e| Error::from_provider(e, "Reddit client"))?;
		let salesforce = HttpSalesforceApp::new(config.salesforce.clone())
			.map_err(|e| Error::from_provider(e, "Salesforce client"))?;

		Ok(Self::new(config, store.clone(), store, Arc::new(reddit), Arc::new(salesforce)))
	}

	/// Serializes destructive handshake reads per state. The returned guard
	/// holds the per-state lock until dropped; the last holder for a state
	/// also evicts its slot from the map.
	pub(crate) async fn confirm_guard(&self, state: &str) -> ConfirmGuard {
		let slot = self.confirm_guards.lock().entry(state.to_owned()).or_default().clone();
		let lock = slot.lock_arc().await;

		ConfirmGuard { state: state.to_owned(), slots: self.confirm_guards.clone(), _lock: lock }
	}

	/// Authenticates a bearer key and resolves its Reddit session.
	pub(crate) async fn authed_session(
		&self,
		bearer: &str,
	) -> Result<(ClientOrg, Arc<dyn RedditSession>)> {
		let org = self.resolver.authenticate(bearer).await?;
		let resolved = self.resolver.resolve(&Principal::Bearer(org.clone())).await?;

		Ok((org, resolved.session))
	}
}
impl Debug for Bridge {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Bridge").field("config", &self.config).finish()
	}
}

/// Per-state singleflight lock handed out by [`Bridge::confirm_guard`].
pub(crate) struct ConfirmGuard {
	state: String,
	slots: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
	_lock: MutexGuardArc<()>,
}
impl Drop for ConfirmGuard {
	fn drop(&mut self) {
		let mut slots = self.slots.lock();

		// Two handles means the map entry plus our own lock; with no other
		// confirm in flight for this state the slot goes with us.
		if slots.get(&self.state).is_some_and(|slot| Arc::strong_count(slot) == 2) {
			slots.remove(&self.state);
		}
	}
}

/// Runs an endpoint future inside a request span, counting attempt and outcome.
pub(crate) async fn observed<T, Fut>(kind: RequestKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	fn count(kind: RequestKind, outcome: RequestOutcome) {
		#[cfg(feature = "metrics")]
		metrics::counter!(
			"reddit_bridge_request_total",
			"request" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
		#[cfg(not(feature = "metrics"))]
		let _ = (kind, outcome);
	}

	count(kind, RequestOutcome::Attempt);

	#[cfg(feature = "tracing")]
	let result = {
		use tracing::Instrument;

		fut.instrument(tracing::info_span!(
			"reddit_bridge.request",
			request = kind.as_str(),
			stage
		))
		.await
	};
	#[cfg(not(feature = "tracing"))]
	let result = {
		let _ = stage;

		fut.await
	};

	count(kind, if result.is_ok() { RequestOutcome::Success } else { RequestOutcome::Failure });

	result
}

pub(crate) fn parse_submission_sort(sort: Option<&str>) -> Result<SubmissionSort> {
	match sort {
		None => Ok(SubmissionSort::default()),
		Some(value) => SubmissionSort::parse(value).ok_or_else(|| {
			Error::parse(format!(
				"Sort type {value} invalid. Valid options: controversial, gilded, hot, new, rising, top."
			))
		}),
	}
}

pub(crate) fn parse_time_filter(time_filter: Option<&str>) -> Result<TimeFilter> {
	match time_filter {
		None => Ok(TimeFilter::default()),
		Some(value) => TimeFilter::parse(value).ok_or_else(|| {
			Error::parse(format!(
				"Time filter {value} invalid. Valid options: all, day, hour, month, week, year."
			))
		}),
	}
}

pub(crate) fn parse_comment_sort(sort: Option<&str>) -> Result<CommentSort> {
	match sort {
		None => Ok(CommentSort::default()),
		Some(value) => CommentSort::parse(value).ok_or_else(|| {
			Error::parse(format!(
				"Sort type {value} invalid. Valid options: best, top, new, controversial, old, q&a."
			))
		}),
	}
}

pub(crate) fn parse_limit(limit: Option<i64>) -> Result<usize> {
	match limit {
		None => Ok(DEFAULT_COMMENT_LIMIT),
		Some(value) if value > 0 && (value as usize) < COMMENT_LIMIT_CAP => Ok(value as _),
		Some(value) => Err(Error::parse(format!("Limit {value} outside allowed range (0<int<21)."))),
	}
}

pub(crate) fn parse_offset(offset: Option<i64>) -> Result<usize> {
	match offset {
		None => Ok(0),
		Some(value) if value >= 0 => Ok(value as _),
		Some(value) => Err(Error::parse(format!("Offset {value} outside allowed range (int>=0)."))),
	}
}

pub(crate) fn parse_vote(vote_value: Option<i64>) -> Result<VoteDirection> {
	vote_value.and_then(VoteDirection::from_value).ok_or_else(|| {
		Error::parse(format!(
			"Vote value {} outside allowed range (-1<=int<=1).",
			vote_value.map(|v| v.to_string()).unwrap_or_else(|| "missing".into())
		))
	})
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn limit_bounds_are_exclusive() {
		assert_eq!(parse_limit(None).expect("Default limit should be accepted."), 10);
		assert_eq!(parse_limit(Some(20)).expect("Limit 20 should be accepted."), 20);

		for out_of_range in [0, -3, 21, 100] {
			let err = parse_limit(Some(out_of_range))
				.expect_err("Out-of-range limits should be rejected.");

			assert_eq!(
				err.to_string(),
				format!("Limit {out_of_range} outside allowed range (0<int<21).")
			);
		}
	}

	#[test]
	fn offset_must_be_non_negative() {
		assert_eq!(parse_offset(None).expect("Default offset should be accepted."), 0);
		assert_eq!(parse_offset(Some(7)).expect("Offset 7 should be accepted."), 7);
		assert!(parse_offset(Some(-1)).is_err());
	}

	#[test]
	fn vote_values_outside_range_are_rejected() {
		assert!(parse_vote(Some(1)).is_ok());
		assert!(parse_vote(Some(0)).is_ok());
		assert!(parse_vote(Some(-1)).is_ok());
		assert!(parse_vote(Some(2)).is_err());
		assert!(parse_vote(None).is_err());
	}

	#[test]
	fn sort_errors_name_the_valid_options() {
		let err = parse_submission_sort(Some("best"))
			.expect_err("Comment-only sorts should be rejected for submissions.");

		assert!(err.to_string().contains("controversial, gilded, hot, new, rising, top"));

		let err = parse_comment_sort(Some("rising"))
			.expect_err("Submission-only sorts should be rejected for comments.");

		assert!(err.to_string().contains("best, top, new, controversial, old, q&a"));
	}

	#[test]
	fn detail_reply_wraps_the_envelope() {
		let reply = Reply::detail(200, "OAuth code saved successfully.");

		assert_eq!(reply.body, json!({ "data": { "detail": "OAuth code saved successfully." } }));
	}

	#[tokio::test]
	async fn observed_passes_results_through() {
		let ok: Result<u8> =
			observed(RequestKind::Comment, "observed_passes_results_through", async { Ok(7) })
				.await;

		assert_eq!(ok.expect("The wrapped value should come back unchanged."), 7);

		let err: Result<u8> =
			observed(RequestKind::Comment, "observed_passes_results_through", async {
				Err(Error::parse("Text must be provided."))
			})
			.await;

		assert_eq!(
			err.expect_err("The wrapped error should come back unchanged.").to_string(),
			"Text must be provided."
		);
	}

	#[tokio::test]
	async fn confirm_guard_slots_are_evicted_after_release() {
		let tb = crate::_preludet::build_test_bridge();

		{
			let _held = tb.bridge.confirm_guard("oauth_77").await;
			let _other = tb.bridge.confirm_guard("salesforce_12").await;

			assert_eq!(tb.bridge.confirm_guards.lock().len(), 2);
		}

		assert!(
			tb.bridge.confirm_guards.lock().is_empty(),
			"Released guard slots should not accumulate."
		);

		// A fresh confirm for a released state gets a fresh slot.
		let _reuse = tb.bridge.confirm_guard("oauth_77").await;

		assert_eq!(tb.bridge.confirm_guards.lock().len(), 1);
	}
}
