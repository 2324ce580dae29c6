//! Adjustments of a resolved [`Config`] to the state observed in the cluster.
use k8s_openapi::api::core::v1::Secret;
use snafu::ResultExt;
use url::Url;

use super::{
    Config, Error, ParseExternalDatabaseUrlSnafu,
    environment::{Environment, ROUTE_HOSTNAME},
};

/// Name of the database container in the `syndesis-db` deployment config
pub const DATABASE_CONTAINER: &str = "postgresql";

/// Objects read from the installation's namespace.
///
/// Every object is optional, a missing object is not an error.
#[derive(Clone, Debug, Default)]
pub struct ClusterState {
    pub persisted_secret: Option<Secret>,
    /// `spec.host` of the `syndesis` route
    pub route_host: Option<String>,
    /// Image of the [`DATABASE_CONTAINER`] of the `syndesis-db` deployment config
    pub database_image: Option<String>,
}

impl Config {
    /// Applies everything that depends on [`ClusterState`] except the persisted secret, which takes part in
    /// [`resolve`](super::Resolver::resolve) itself
    pub fn apply_cluster_state<E: Environment + ?Sized>(
        &mut self,
        environment: &E,
        state: &ClusterState,
    ) -> Result<(), Error> {
        self.set_route(environment, state.route_host.as_deref());
        self.apply_external_database()?;
        self.database_needs_upgrade = database_needs_upgrade(
            state.database_image.as_deref(),
            &self.syndesis.components.database.image,
        );
        Ok(())
    }

    /// Sets the route hostname from `ROUTE_HOSTNAME`, or else from the host of the existing route.
    ///
    /// Keeps the configured hostname when neither is available.
    pub fn set_route<E: Environment + ?Sized>(&mut self, environment: &E, route_host: Option<&str>) {
        if let Some(hostname) = environment.var(ROUTE_HOSTNAME) {
            tracing::debug!(%hostname, "Using route hostname from {ROUTE_HOSTNAME}");
            self.syndesis.route_hostname = hostname;
        } else if let Some(host) = route_host {
            self.syndesis.route_hostname = host.to_string();
        }
    }

    /// Points the database connection at the external database, if one is configured.
    ///
    /// A URL without a path connects to the database named in the configuration.
    pub fn apply_external_database(&mut self) -> Result<(), Error> {
        let database = &mut self.syndesis.components.database;
        if database.external_db_url.is_empty() {
            return Ok(());
        }

        let mut url = Url::parse(&database.external_db_url).context(ParseExternalDatabaseUrlSnafu {
            url: database.external_db_url.clone(),
        })?;
        if url.path().is_empty() {
            url.set_path(&format!("/{}", database.name));
        }

        tracing::info!(url = %url, "Using external database");
        database.url = url.into();
        Ok(())
    }
}

/// Whether the running database uses a different image than `image`.
///
/// `false` when no database container is running.
pub fn database_needs_upgrade(running_image: Option<&str>, image: &str) -> bool {
    running_image.is_some_and(|running| running != image)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::same_image(Some("postgresql:9.6"), false)]
    #[case::other_image(Some("postgresql:9.5"), true)]
    #[case::container_without_image(Some(""), true)]
    #[case::no_database(None, false)]
    fn database_image_drift(#[case] running_image: Option<&str>, #[case] expected: bool) {
        assert_eq!(
            database_needs_upgrade(running_image, "postgresql:9.6"),
            expected
        );
    }

    #[rstest]
    #[case::environment_wins(Some("env.example.com"), Some("route.example.com"), "env.example.com")]
    #[case::route_host(None, Some("route.example.com"), "route.example.com")]
    #[case::keep_configured(None, None, "configured.example.com")]
    fn route_hostname(
        #[case] variable: Option<&str>,
        #[case] route_host: Option<&str>,
        #[case] expected: &str,
    ) {
        let environment: BTreeMap<String, String> = variable
            .map(|hostname| (ROUTE_HOSTNAME.to_string(), hostname.to_string()))
            .into_iter()
            .collect();
        let mut config = Config::default();
        config.syndesis.route_hostname = "configured.example.com".to_string();

        config.set_route(&environment, route_host);
        assert_eq!(config.syndesis.route_hostname, expected);
    }

    #[rstest]
    #[case::no_path("postgresql://custom-db:5432", "postgresql://custom-db:5432/syndesis")]
    #[case::with_path("postgresql://custom-db:5432/other", "postgresql://custom-db:5432/other")]
    #[case::with_query(
        "postgresql://custom-db:5432/other?sslmode=require",
        "postgresql://custom-db:5432/other?sslmode=require"
    )]
    fn external_database(#[case] external: &str, #[case] expected: &str) {
        let mut config = Config::default();
        let database = &mut config.syndesis.components.database;
        database.name = "syndesis".to_string();
        database.url = "postgresql://syndesis-db:5432/syndesis?sslmode=disable".to_string();
        database.external_db_url = external.to_string();

        config.apply_external_database().unwrap();
        assert_eq!(config.syndesis.components.database.url, expected);
    }

    #[test]
    fn internal_database_is_kept() {
        let mut config = Config::default();
        config.syndesis.components.database.url = "postgresql://syndesis-db:5432/syndesis".to_string();
        config.apply_external_database().unwrap();
        assert_eq!(
            config.syndesis.components.database.url,
            "postgresql://syndesis-db:5432/syndesis"
        );
    }

    #[test]
    fn malformed_external_database_is_rejected() {
        let mut config = Config::default();
        config.syndesis.components.database.external_db_url = "not a url".to_string();
        let err = config.apply_external_database().unwrap_err();
        assert!(matches!(err, Error::ParseExternalDatabaseUrl { .. }));
    }

    #[test]
    fn cluster_state_is_applied() {
        let mut config = Config::default();
        config.syndesis.components.database.image = "postgresql:9.6".to_string();
        let state = ClusterState {
            route_host: Some("syndesis.apps.example.com".to_string()),
            database_image: Some("postgresql:9.5".to_string()),
            ..Default::default()
        };

        config
            .apply_cluster_state(&BTreeMap::<String, String>::new(), &state)
            .unwrap();
        assert_eq!(config.syndesis.route_hostname, "syndesis.apps.example.com");
        assert!(config.database_needs_upgrade);
    }
}
