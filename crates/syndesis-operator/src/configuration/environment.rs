//! Overrides read from the operator's environment.
//!
//! Only variables that are set to a non-empty value take part in the overlay, all other fields of the overlay stay
//! unset and leave the underlying configuration alone.
use std::collections::BTreeMap;

use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

use super::ConfigFragment;

/// Source of environment variables
pub trait Environment {
    /// The value of `name`, or [`None`] if it is unset or empty
    fn var(&self, name: &str) -> Option<String>;
}

/// The environment of the running process
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|value| !value.is_empty())
    }
}

impl Environment for BTreeMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).filter(|value| !value.is_empty()).cloned()
    }
}

/// Overrides the route hostname, bypassing the lookup of the `syndesis` route
pub const ROUTE_HOSTNAME: &str = "ROUTE_HOSTNAME";

/// Variables that override a string field
#[derive(Clone, Copy, Debug, EnumIter, IntoStaticStr, PartialEq, Eq)]
pub enum StringOverride {
    #[strum(serialize = "UI_IMAGE")]
    UiImage,
    #[strum(serialize = "S2I_IMAGE")]
    S2iImage,
    #[strum(serialize = "OAUTH_IMAGE")]
    OauthImage,
    #[strum(serialize = "SERVER_IMAGE")]
    ServerImage,
    #[strum(serialize = "META_IMAGE")]
    MetaImage,
    #[strum(serialize = "DATABASE_IMAGE")]
    DatabaseImage,
    #[strum(serialize = "PSQL_EXPORTER_IMAGE")]
    PsqlExporterImage,
    #[strum(serialize = "PROMETHEUS_IMAGE")]
    PrometheusImage,
    #[strum(serialize = "UPGRADE_IMAGE")]
    UpgradeImage,
    #[strum(serialize = "DV_IMAGE")]
    DvImage,
    #[strum(serialize = "CAMELK_IMAGE")]
    CamelKImage,
    #[strum(serialize = "TODO_IMAGE")]
    TodoImage,
    #[strum(serialize = "DATABASE_VOLUME_ACCESS_MODE")]
    DatabaseVolumeAccessMode,
    #[strum(serialize = "DATABASE_STORAGE_CLASS")]
    DatabaseStorageClass,
    #[strum(serialize = "DATABASE_VOLUME_NAME")]
    DatabaseVolumeName,
}

impl StringOverride {
    pub fn variable(self) -> &'static str {
        self.into()
    }

    fn slot(self, config: &mut ConfigFragment) -> &mut Option<String> {
        let components = &mut config.syndesis.components;
        let addons = &mut config.syndesis.addons;
        match self {
            Self::UiImage => &mut components.ui.image,
            Self::S2iImage => &mut components.s2i.image,
            Self::OauthImage => &mut components.oauth.image,
            Self::ServerImage => &mut components.server.image,
            Self::MetaImage => &mut components.meta.image,
            Self::DatabaseImage => &mut components.database.image,
            Self::PsqlExporterImage => &mut components.database.exporter.image,
            Self::PrometheusImage => &mut components.prometheus.image,
            Self::UpgradeImage => &mut components.upgrade.image,
            Self::DvImage => &mut addons.dv.image,
            Self::CamelKImage => &mut addons.camel_k.image,
            Self::TodoImage => &mut addons.todo.image,
            Self::DatabaseVolumeAccessMode => &mut components.database.resources.volume_access_mode,
            Self::DatabaseStorageClass => &mut components.database.resources.volume_storage_class,
            Self::DatabaseVolumeName => &mut components.database.resources.volume_name,
        }
    }
}

/// Variables that override a boolean field, only the literal `true` enables it
#[derive(Clone, Copy, Debug, EnumIter, IntoStaticStr, PartialEq, Eq)]
pub enum BoolOverride {
    #[strum(serialize = "DEV_SUPPORT")]
    DevSupport,
    #[strum(serialize = "TEST_SUPPORT")]
    TestSupport,
}

impl BoolOverride {
    pub fn variable(self) -> &'static str {
        self.into()
    }

    fn slot(self, config: &mut ConfigFragment) -> &mut Option<bool> {
        match self {
            Self::DevSupport => &mut config.dev_support,
            Self::TestSupport => &mut config.syndesis.components.server.features.test_support,
        }
    }
}

/// Builds the sparse configuration overlay described by `environment`
pub fn environment_overlay<E: Environment + ?Sized>(environment: &E) -> ConfigFragment {
    let mut overlay = ConfigFragment::default();

    for variable in StringOverride::iter() {
        if let Some(value) = environment.var(variable.variable()) {
            tracing::debug!(variable = variable.variable(), "Applying environment override");
            *variable.slot(&mut overlay) = Some(value);
        }
    }

    for variable in BoolOverride::iter() {
        if let Some(value) = environment.var(variable.variable()) {
            tracing::debug!(variable = variable.variable(), %value, "Applying environment override");
            *variable.slot(&mut overlay) = Some(value == "true");
        }
    }

    overlay
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn environment(vars: &[(&str, &str)]) -> BTreeMap<String, String> {
        vars.iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn empty_environment_yields_empty_overlay() {
        assert_eq!(
            environment_overlay(&BTreeMap::<String, String>::new()),
            ConfigFragment::default()
        );
    }

    #[test]
    fn empty_values_count_as_unset() {
        let env = environment(&[("SERVER_IMAGE", ""), ("DEV_SUPPORT", "")]);
        assert_eq!(environment_overlay(&env), ConfigFragment::default());
    }

    #[test]
    fn images_and_volume_settings_are_overridden() {
        let env = environment(&[
            ("SERVER_IMAGE", "docker.io/syndesis/syndesis-server:latest"),
            ("PSQL_EXPORTER_IMAGE", "docker.io/wrouesnel/postgres_exporter:v0.4.7"),
            ("CAMELK_IMAGE", "fabric8/s2i-java:3.0-java8"),
            ("DATABASE_STORAGE_CLASS", "gp2"),
        ]);
        let overlay = environment_overlay(&env);
        let components = &overlay.syndesis.components;

        assert_eq!(
            components.server.image.as_deref(),
            Some("docker.io/syndesis/syndesis-server:latest")
        );
        assert_eq!(
            components.database.exporter.image.as_deref(),
            Some("docker.io/wrouesnel/postgres_exporter:v0.4.7")
        );
        assert_eq!(
            overlay.syndesis.addons.camel_k.image.as_deref(),
            Some("fabric8/s2i-java:3.0-java8")
        );
        assert_eq!(
            components.database.resources.volume_storage_class.as_deref(),
            Some("gp2")
        );
        assert_eq!(components.ui.image, None);
        assert_eq!(components.database.resources.volume_name, None);
    }

    #[rstest]
    #[case::literal_true("true", true)]
    #[case::capitalized("True", false)]
    #[case::numeric("1", false)]
    #[case::literal_false("false", false)]
    fn bool_overrides_match_literal_true(#[case] value: &str, #[case] expected: bool) {
        let overlay = environment_overlay(&environment(&[
            ("DEV_SUPPORT", value),
            ("TEST_SUPPORT", value),
        ]));
        assert_eq!(overlay.dev_support, Some(expected));
        assert_eq!(
            overlay.syndesis.components.server.features.test_support,
            Some(expected)
        );
    }

    #[test]
    fn variable_names_are_unique() {
        let mut names: Vec<_> = StringOverride::iter()
            .map(StringOverride::variable)
            .chain(BoolOverride::iter().map(BoolOverride::variable))
            .collect();
        let count = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), count);
    }
}
