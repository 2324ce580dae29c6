//! Layered configuration.
//!
//! Every layer is a [`fragment`] of the final configuration type, where all values are optional. Layers are
//! combined with [`merge::merge`], and the result is [`fragment::validate`]d into the full type once all layers
//! are in.
//!
//! ```
//! # use syndesis_operator::config::{fragment::{self, Fragment}, merge::{Merge, merge}};
//! #[derive(Fragment, Debug, PartialEq, Eq)]
//! #[fragment_attrs(derive(Merge, Default))]
//! struct Database {
//!     image: String,
//!     user: String,
//! }
//!
//! let template = DatabaseFragment {
//!     image: Some("postgresql:9.6".to_string()),
//!     user: Some("syndesis".to_string()),
//! };
//! let overlay = DatabaseFragment {
//!     image: Some("postgresql:12".to_string()),
//!     ..Default::default()
//! };
//!
//! let database: Database = fragment::validate(merge(overlay, &template)).unwrap();
//! assert_eq!(database, Database {
//!     image: "postgresql:12".to_string(),
//!     user: "syndesis".to_string(),
//! });
//! ```

pub mod fragment;
pub mod merge;
