//! Building blocks of the Syndesis operator.
//!
//! - [`configuration`] resolves the effective configuration of an installation from the template file, the persisted
//!   secret, the operator's environment and the `Syndesis` custom resource.
//! - [`crd`] defines the custom resource in all served schema versions and migrates older objects forward.
//! - [`addons`] lists the optional features of an installation.

// Lets the derive macros refer to this crate by name, also from within the crate.
extern crate self as syndesis_operator;

pub mod addons;
pub mod capabilities;
pub mod cli;
pub mod client;
pub mod config;
pub mod configuration;
pub mod crd;
pub mod logging;
pub mod secret_generator;
