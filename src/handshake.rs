//! OAuth handshake tracking through the TTL cache.
//!
//! A handshake starts when the bridge hands out an authorization URL and ends
//! when the client confirms the result. The interval in between lives entirely
//! in the [`HandshakeStore`]: the browser callback lands on a different request
//! than the poll that observes it, so the cache is the only shared state.

// crates.io
use rand::Rng;
// self
use crate::{_prelude::*, store::HandshakeStore};

const STATE_MAX: u32 = 65536;

/// Cache key namespace per OAuth flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowPrefix {
	/// Reddit authorization flow.
	Reddit,
	/// Salesforce authorization flow.
	Salesforce,
}
impl FlowPrefix {
	const fn as_str(self) -> &'static str {
		match self {
			Self::Reddit => "oauth",
			Self::Salesforce => "salesforce_oauth",
		}
	}

	fn key(self, state: &str) -> String {
		format!("{}_{state}", self.as_str())
	}
}

/// Lifecycle of a tracked handshake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandshakeStatus {
	/// Authorization URL handed out, callback not yet seen.
	Pending,
	/// Callback delivered an authorization code.
	Accepted,
	/// Callback reported a provider error.
	Error,
}

/// Cached state of one in-flight handshake.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeRecord {
	/// Current lifecycle stage.
	pub status: HandshakeStatus,
	/// Authorization code, present once accepted.
	pub code: Option<String>,
	/// Salesforce org id captured at flow start, when the caller supplied one.
	pub org_id: Option<String>,
	/// Provider error detail, present once failed.
	pub detail: Option<String>,
}
impl HandshakeRecord {
	fn pending(org_id: Option<String>) -> Self {
		Self { status: HandshakeStatus::Pending, code: None, org_id, detail: None }
	}
}

/// Coordinates handshakes against the TTL cache.
pub struct HandshakeTracker {
	store: Arc<dyn HandshakeStore>,
	ttl: Duration,
}
impl HandshakeTracker {
	/// Creates a tracker over the given cache with the given entry lifetime.
	pub fn new(store: Arc<dyn HandshakeStore>, ttl: Duration) -> Self {
		Self { store, ttl }
	}

	/// Opens a handshake and returns its state value.
	///
	/// States are small decimals drawn from `0..=65536`; on collision with a
	/// live handshake the draw repeats until a free key is found.
	pub async fn begin(&self, prefix: FlowPrefix, org_id: Option<String>) -> Result<String> {
		let state = loop {
			let candidate = rand::rng().random_range(0..=STATE_MAX).to_string();

			if !self.store.contains(&prefix.key(&candidate)).await? {
				break candidate;
			}
		};

		self.store.put(&prefix.key(&state), HandshakeRecord::pending(org_id), self.ttl).await?;

		Ok(state)
	}

	/// Records a successful callback. The org id captured at flow start and
	/// the entry's expiry are both preserved. Returns `false` for unknown or
	/// expired states.
	pub async fn accept(&self, prefix: FlowPrefix, state: &str, code: &str) -> Result<bool> {
		let key = prefix.key(state);
		let Some(mut record) = self.store.get(&key).await? else { return Ok(false) };

		record.status = HandshakeStatus::Accepted;
		record.code = Some(code.to_owned());
		record.detail = None;

		Ok(self.store.update(&key, record).await?)
	}

	/// Records a failed callback. Returns `false` for unknown or expired states.
	pub async fn fail(&self, prefix: FlowPrefix, state: &str, detail: &str) -> Result<bool> {
		let key = prefix.key(state);
		let Some(mut record) = self.store.get(&key).await? else { return Ok(false) };

		record.status = HandshakeStatus::Error;
		record.code = None;
		record.detail = Some(detail.to_owned());

		Ok(self.store.update(&key, record).await?)
	}

	/// Non-destructive read of the handshake's current state.
	pub async fn poll(&self, prefix: FlowPrefix, state: &str) -> Result<Option<HandshakeRecord>> {
		Ok(self.store.get(&prefix.key(state)).await?)
	}

	/// Destructive read that closes the handshake.
	pub async fn finalize(
		&self,
		prefix: FlowPrefix,
		state: &str,
	) -> Result<Option<HandshakeRecord>> {
		Ok(self.store.take(&prefix.key(state)).await?)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::MemoryStore;

	fn tracker() -> HandshakeTracker {
		HandshakeTracker::new(Arc::new(MemoryStore::default()), Duration::seconds(900))
	}

	#[tokio::test]
	async fn begin_yields_a_small_decimal_state() {
		let tracker = tracker();
		let state = tracker
			.begin(FlowPrefix::Reddit, None)
			.await
			.expect("Opening a handshake should succeed.");
		let value: u32 = state.parse().expect("State should be a decimal integer.");

		assert!(value <= STATE_MAX);

		let record = tracker
			.poll(FlowPrefix::Reddit, &state)
			.await
			.expect("Polling should succeed.")
			.expect("A freshly opened handshake should be present.");

		assert_eq!(record.status, HandshakeStatus::Pending);
	}

	#[tokio::test]
	async fn accept_preserves_the_org_id() {
		let tracker = tracker();
		let state = tracker
			.begin(FlowPrefix::Reddit, Some("00D5g000004NVq7EAG".into()))
			.await
			.expect("Opening a handshake should succeed.");

		assert!(
			tracker
				.accept(FlowPrefix::Reddit, &state, "auth-code")
				.await
				.expect("Accepting should succeed.")
		);

		let record = tracker
			.poll(FlowPrefix::Reddit, &state)
			.await
			.expect("Polling should succeed.")
			.expect("An accepted handshake should still be present.");

		assert_eq!(record.status, HandshakeStatus::Accepted);
		assert_eq!(record.code.as_deref(), Some("auth-code"));
		assert_eq!(record.org_id.as_deref(), Some("00D5g000004NVq7EAG"));
	}

	#[tokio::test]
	async fn flows_do_not_share_state_keys() {
		let tracker = tracker();
		let state = tracker
			.begin(FlowPrefix::Salesforce, None)
			.await
			.expect("Opening a handshake should succeed.");

		assert!(
			tracker
				.poll(FlowPrefix::Reddit, &state)
				.await
				.expect("Polling should succeed.")
				.is_none()
		);
	}

	#[tokio::test]
	async fn finalize_closes_the_handshake() {
		let tracker = tracker();
		let state = tracker
			.begin(FlowPrefix::Reddit, None)
			.await
			.expect("Opening a handshake should succeed.");

		tracker
			.finalize(FlowPrefix::Reddit, &state)
			.await
			.expect("Finalizing should succeed.")
			.expect("A live handshake should be returned on finalize.");

		assert!(
			tracker
				.poll(FlowPrefix::Reddit, &state)
				.await
				.expect("Polling should succeed.")
				.is_none()
		);
	}

	#[tokio::test]
	async fn accepting_an_unknown_state_reports_false() {
		let tracker = tracker();

		assert!(
			!tracker
				.accept(FlowPrefix::Reddit, "99999999", "auth-code")
				.await
				.expect("Accepting should not error on unknown states.")
		);
	}
}
