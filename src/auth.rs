//! Bearer-token authentication: secrets, keys, principals, and session resolution.

pub mod key;
pub mod principal;
pub mod resolver;
pub mod secret;

pub use key::*;
pub use principal::*;
pub use resolver::*;
pub use secret::*;
