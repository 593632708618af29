//! Salesforce-to-Reddit bridge backend—dual-provider OAuth handshakes, bearer-token
//! session resolution, and provider-backed proxying with pluggable stores.
//!
//! The crate is framework-agnostic: endpoints live as async methods on
//! [`api::Bridge`], taking parsed inputs and returning [`api::Reply`] values that a
//! thin HTTP layer renders into the `{data}` / `{error}` envelope. The relational
//! database, the TTL cache, and the Reddit/Salesforce provider APIs sit behind
//! trait seams ([`store::RecordStore`], [`store::HandshakeStore`],
//! [`provider::RedditApp`], [`provider::SalesforceApp`]) with in-memory and
//! reqwest-backed implementations built in.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod handshake;
pub mod model;
pub mod obs;
pub mod provider;
pub mod store;

#[cfg(any(test, feature = "test"))] pub mod _preludet;

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
#[cfg(test)] use tokio as _;
