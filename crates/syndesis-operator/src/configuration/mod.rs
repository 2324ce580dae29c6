//! Resolution of the effective Syndesis configuration.
//!
//! The configuration is built from layers, each later layer overriding the ones before it:
//!
//! 1. the template file shipped with the operator,
//! 2. the persisted `syndesis-global-config` secret (or freshly generated secrets),
//! 3. the operator's environment ([`environment::environment_overlay`]),
//! 4. the `Syndesis` custom resource.
//!
//! Every layer is a sparse [`ConfigFragment`], the layers are combined with [`merge`] and the result is validated
//! into a complete [`Config`].
use std::{
    fs,
    path::{Path, PathBuf},
};

use k8s_openapi::api::core::v1::Secret;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};
use strum::{EnumDiscriminants, IntoStaticStr};

use crate::{
    addons::AddonsConfig,
    capabilities::ApiServerSpec,
    config::{
        fragment::{self, Fragment, ValidationError},
        merge::{Merge, merge},
    },
    crd::v1beta2,
    secret_generator::SecretGenerator,
};

pub mod cluster;
pub mod components;
pub mod environment;
pub mod secrets;

use self::{
    cluster::ClusterState,
    components::ComponentsConfig,
    environment::{Environment, environment_overlay},
};

/// Coarse classification of [`Error`]s
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// An input could not be read
    Io,
    /// An input is malformed
    Parse,
    /// The layers do not combine into a complete configuration
    Merge,
}

#[derive(Debug, Snafu, EnumDiscriminants)]
#[strum_discriminants(derive(IntoStaticStr))]
pub enum Error {
    #[snafu(display("failed to read configuration template {path:?}"))]
    ReadTemplate {
        source: std::io::Error,
        path: PathBuf,
    },

    #[snafu(display("failed to parse YAML configuration template {path:?}"))]
    ParseYamlTemplate {
        source: serde_yaml::Error,
        path: PathBuf,
    },

    #[snafu(display("failed to parse JSON configuration template {path:?}"))]
    ParseJsonTemplate {
        source: serde_json::Error,
        path: PathBuf,
    },

    #[snafu(display("failed to read persisted secret {:?}", secrets::SECRET_NAME))]
    ReadPersistedSecret { source: secrets::Error },

    #[snafu(display("failed to serialize custom resource spec"))]
    SerializeCustomResourceSpec { source: serde_json::Error },

    #[snafu(display("custom resource spec does not fit the configuration"))]
    DeserializeCustomResourceSpec { source: serde_json::Error },

    #[snafu(display("resolved configuration is incomplete"))]
    ValidateConfig { source: ValidationError },

    #[snafu(display("failed to parse external database url {url:?}"))]
    ParseExternalDatabaseUrl {
        source: url::ParseError,
        url: String,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ReadTemplate { .. } => ErrorKind::Io,
            Self::ParseYamlTemplate { .. }
            | Self::ParseJsonTemplate { .. }
            | Self::ReadPersistedSecret { .. }
            | Self::SerializeCustomResourceSpec { .. }
            | Self::ParseExternalDatabaseUrl { .. } => ErrorKind::Parse,
            Self::DeserializeCustomResourceSpec { .. } | Self::ValidateConfig { .. } => {
                ErrorKind::Merge
            }
        }
    }

    pub fn category(&self) -> &'static str {
        ErrorDiscriminants::from(self).into()
    }
}

/// The effective configuration of a Syndesis installation
#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[fragment(default)]
    pub allow_localhost: bool,
    #[fragment(default)]
    pub productized: bool,
    /// Pull images from the image tags of a development build instead of the upstream registry
    #[fragment(default)]
    pub dev_support: bool,
    /// Legacy flag to mark image stream tags as scheduled
    #[fragment(default)]
    pub scheduled: bool,

    /// Usually `syndesis` or `fuse-online`
    pub product_name: String,
    pub version: String,
    /// Additional Prometheus rules
    #[fragment(default)]
    pub prometheus_rules: String,

    /// Namespace Syndesis is installed into
    pub open_shift_project: String,
    pub open_shift_oauth_client_secret: String,
    #[fragment(default)]
    pub open_shift_console_url: String,
    /// Pull secrets attached to the service accounts
    #[fragment(default)]
    pub image_pull_secrets: Vec<String>,
    /// Set when the running database uses a different image than configured
    #[fragment(default)]
    pub database_needs_upgrade: bool,
    #[fragment(default)]
    pub api_server: ApiServerSpec,

    pub syndesis: SyndesisConfig,
}

/// The part of the configuration that can be overridden by the custom resource
#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct SyndesisConfig {
    #[fragment(default)]
    pub demo_data: bool,
    /// External hostname of the UI and API
    #[fragment(default)]
    pub route_hostname: String,
    pub components: ComponentsConfig,
    pub addons: AddonsConfig,
}

/// Reads a configuration template, as YAML if the file extension says so, as JSON otherwise
pub fn load_template(path: &Path) -> Result<ConfigFragment, Error> {
    let contents = fs::read_to_string(path).context(ReadTemplateSnafu { path })?;

    let is_yaml = path
        .extension()
        .is_some_and(|extension| extension == "yaml" || extension == "yml");
    if is_yaml {
        serde_yaml::from_str(&contents).context(ParseYamlTemplateSnafu { path })
    } else {
        serde_json::from_str(&contents).context(ParseJsonTemplateSnafu { path })
    }
}

/// Reinterprets the custom resource spec as an overlay of [`SyndesisConfig`].
///
/// Only fields that are set in the custom resource are set in the overlay.
pub fn custom_resource_overlay(
    spec: &v1beta2::SyndesisSpec,
) -> Result<SyndesisConfigFragment, Error> {
    let value = serde_json::to_value(spec).context(SerializeCustomResourceSpecSnafu)?;
    serde_json::from_value(value).context(DeserializeCustomResourceSpecSnafu)
}

/// Resolves the [`Config`] of a Syndesis installation
pub struct Resolver<'a, E: ?Sized> {
    template: PathBuf,
    generator: &'a SecretGenerator,
    environment: &'a E,
    api_server: Option<ApiServerSpec>,
}

impl<'a, E: Environment + ?Sized> Resolver<'a, E> {
    pub fn new(
        template: impl Into<PathBuf>,
        generator: &'a SecretGenerator,
        environment: &'a E,
    ) -> Self {
        Self {
            template: template.into(),
            generator,
            environment,
            api_server: None,
        }
    }

    /// Records the discovered API server capabilities in the resolved configuration
    pub fn with_api_server(mut self, api_server: ApiServerSpec) -> Self {
        self.api_server = Some(api_server);
        self
    }

    /// Builds the configuration for `syndesis`.
    ///
    /// `persisted_secret` is the `syndesis-global-config` secret of the installation, if it exists.
    pub fn resolve(
        &self,
        persisted_secret: Option<&Secret>,
        syndesis: &v1beta2::Syndesis,
    ) -> Result<Config, Error> {
        let mut config = load_template(&self.template)?;
        tracing::debug!(template = %self.template.display(), "Loaded configuration template");

        let namespace = syndesis.metadata.namespace.clone().unwrap_or_default();
        config.syndesis.components.oauth.sar_namespace = Some(namespace.clone());
        config.open_shift_project = Some(namespace);

        if let Some(secret) = persisted_secret {
            secrets::apply_persisted_secret(&mut config, secret).context(ReadPersistedSecretSnafu)?;
            tracing::debug!(
                secret.name = secrets::SECRET_NAME,
                "Applied persisted secret"
            );
        } else {
            tracing::debug!(
                secret.name = secrets::SECRET_NAME,
                "No persisted secret found"
            );
        }
        secrets::generate_missing(&mut config, self.generator);

        let mut config = merge(environment_overlay(self.environment), &config);

        let overlay = custom_resource_overlay(&syndesis.spec)?;
        config.syndesis = merge(overlay, &config.syndesis);
        tracing::debug!(
            syndesis.name = syndesis.metadata.name.as_deref().unwrap_or_default(),
            "Applied custom resource overrides"
        );

        if let Some(api_server) = &self.api_server {
            config.api_server = Some(api_server.clone());
        }

        fragment::validate::<Config>(config).context(ValidateConfigSnafu)
    }

    /// Builds the configuration for `syndesis` and adjusts it to what is running in its namespace
    pub fn resolve_in_cluster(
        &self,
        state: &ClusterState,
        syndesis: &v1beta2::Syndesis,
    ) -> Result<Config, Error> {
        let mut config = self.resolve(state.persisted_secret.as_ref(), syndesis)?;
        config.apply_cluster_state(self.environment, state)?;
        Ok(config)
    }
}
