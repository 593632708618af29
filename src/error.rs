//! Bridge-level error taxonomy and the JSON error envelope shared by every endpoint.

// self
use crate::{_prelude::*, provider::ProviderError};

/// Bridge-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical bridge error exposed by the [`Bridge`](crate::api::Bridge) facade.
///
/// Each variant maps onto one HTTP status so a transport layer can render the
/// error envelope without inspecting variants itself. Validation failures carry
/// the caller-facing detail string verbatim; provider-call failures are translated
/// at the handler boundary via [`Error::from_provider`] instead of propagating raw.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Missing provider object or local row.
	#[error("{detail}")]
	NotFound {
		/// Caller-facing description of what was not found.
		detail: String,
	},
	/// Malformed or missing request parameter.
	#[error("{detail}")]
	Parse {
		/// Caller-facing description of the offending parameter.
		detail: String,
	},
	/// Bad or expired bearer token, or bad OAuth state.
	#[error("{detail}")]
	AuthenticationFailed {
		/// Caller-facing description of the credential failure.
		detail: String,
	},
	/// Acting on another identity's resource.
	#[error("{detail}")]
	PermissionDenied {
		/// Caller-facing description of the denial.
		detail: String,
	},
	/// Mutating action attempted against a read-only session.
	#[error("{detail}")]
	MethodNotAllowed {
		/// Caller-facing description of the rejected action.
		detail: String,
	},
	/// Provider call raised an unexpected failure.
	#[error("{detail}")]
	ServiceUnavailable {
		/// Caller-facing description of the upstream failure.
		detail: String,
	},
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Response payload could not be serialized.
	#[error("Response payload could not be serialized.")]
	Serialization(#[from] serde_json::Error),
}
impl Error {
	/// Builds a [`Error::NotFound`] from a detail string.
	pub fn not_found(detail: impl Into<String>) -> Self {
		Self::NotFound { detail: detail.into() }
	}

	/// Builds a [`Error::Parse`] from a detail string.
	pub fn parse(detail: impl Into<String>) -> Self {
		Self::Parse { detail: detail.into() }
	}

	/// Builds a [`Error::AuthenticationFailed`] from a detail string.
	pub fn authentication(detail: impl Into<String>) -> Self {
		Self::AuthenticationFailed { detail: detail.into() }
	}

	/// Builds a [`Error::PermissionDenied`] from a detail string.
	pub fn permission_denied(detail: impl Into<String>) -> Self {
		Self::PermissionDenied { detail: detail.into() }
	}

	/// Builds a [`Error::MethodNotAllowed`] from a detail string.
	pub fn method_not_allowed(detail: impl Into<String>) -> Self {
		Self::MethodNotAllowed { detail: detail.into() }
	}

	/// Builds a [`Error::ServiceUnavailable`] from a detail string.
	pub fn service_unavailable(detail: impl Into<String>) -> Self {
		Self::ServiceUnavailable { detail: detail.into() }
	}

	/// Translates a provider failure into the caller-facing taxonomy.
	///
	/// Forbidden maps to 403, expired grants to 401, missing objects to 404, and
	/// anything else—including transport failures—to 503. Handlers attach the
	/// subject (`"submission with id: abc"`) so the detail names the resource.
	pub fn from_provider(err: ProviderError, subject: &str) -> Self {
		match err {
			ProviderError::NotFound { .. } =>
				Self::NotFound { detail: format!("No {subject} exists.") },
			ProviderError::Forbidden { reason } => Self::PermissionDenied {
				detail: format!("Provider denied the action on {subject}: {reason}."),
			},
			ProviderError::AuthExpired => Self::AuthenticationFailed {
				detail: "Reddit grant is no longer valid. Reconnect the account.".into(),
			},
			ProviderError::Network { .. } | ProviderError::Unexpected { .. } => {
				Self::ServiceUnavailable {
					detail: format!("Provider call failed for {subject}. Try again later."),
				}
			},
		}
	}

	/// HTTP status code this error renders as.
	pub fn http_status(&self) -> u16 {
		match self {
			Self::NotFound { .. } => 404,
			Self::Parse { .. } => 400,
			Self::AuthenticationFailed { .. } => 401,
			Self::PermissionDenied { .. } => 403,
			Self::MethodNotAllowed { .. } => 405,
			Self::ServiceUnavailable { .. } => 503,
			Self::Storage(_) | Self::Serialization(_) => 500,
		}
	}

	/// Caller-facing message lines for the error envelope.
	pub fn messages(&self) -> Vec<String> {
		match self {
			Self::Storage(_) | Self::Serialization(_) =>
				vec!["detail: Internal server error.".into()],
			other => vec![format!("detail: {other}")],
		}
	}

	/// Renders the `{error: {code, messages}}` envelope body.
	pub fn to_envelope(&self) -> serde_json::Value {
		serde_json::json!({
			"error": {
				"code": self.http_status(),
				"messages": self.messages(),
			}
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn statuses_follow_the_taxonomy() {
		assert_eq!(Error::not_found("x").http_status(), 404);
		assert_eq!(Error::parse("x").http_status(), 400);
		assert_eq!(Error::authentication("x").http_status(), 401);
		assert_eq!(Error::permission_denied("x").http_status(), 403);
		assert_eq!(Error::method_not_allowed("x").http_status(), 405);
		assert_eq!(Error::service_unavailable("x").http_status(), 503);
	}

	#[test]
	fn envelope_carries_code_and_prefixed_messages() {
		let err = Error::not_found("No subreddit exists with the name: dummy_name.");
		let envelope = err.to_envelope();

		assert_eq!(envelope["error"]["code"], 404);
		assert_eq!(
			envelope["error"]["messages"][0],
			"detail: No subreddit exists with the name: dummy_name."
		);
	}

	#[test]
	fn storage_errors_hide_internals_from_callers() {
		let err = Error::Storage(crate::store::StoreError::Backend {
			message: "database unreachable".into(),
		});

		assert_eq!(err.http_status(), 500);
		assert_eq!(err.messages(), vec!["detail: Internal server error.".to_string()]);
	}

	#[test]
	fn provider_failures_translate_at_the_boundary() {
		let err = Error::from_provider(
			ProviderError::NotFound { subject: "submission".into() },
			"submission with id: abc",
		);

		assert!(matches!(err, Error::NotFound { .. }));

		let err = Error::from_provider(
			ProviderError::Forbidden { reason: "not the author".into() },
			"comment with id: xyz",
		);

		assert_eq!(err.http_status(), 403);

		let err = Error::from_provider(ProviderError::AuthExpired, "account");

		assert_eq!(err.http_status(), 401);

		let err = Error::from_provider(
			ProviderError::Unexpected { message: "500 from upstream".into() },
			"subreddit r/rust",
		);

		assert_eq!(err.http_status(), 503);
	}
}
