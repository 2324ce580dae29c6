use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{fragment::Fragment, merge::Merge};

#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct ComponentsConfig {
    pub ui: UiConfiguration,
    pub s2i: S2iConfiguration,
    pub oauth: OauthConfiguration,
    pub server: ServerConfiguration,
    pub meta: MetaConfiguration,
    pub database: DatabaseConfiguration,
    pub prometheus: PrometheusConfiguration,
    pub grafana: GrafanaConfiguration,
    pub upgrade: UpgradeConfiguration,
}

#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct UiConfiguration {
    pub image: String,
}

#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct S2iConfiguration {
    pub image: String,
}

/// The OAuth proxy in front of the UI and API
#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct OauthConfiguration {
    pub image: String,
    pub cookie_secret: String,
    #[fragment(default)]
    pub disable_sar_check: bool,
    #[fragment(default)]
    pub sar_namespace: String,
}

#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfiguration {
    pub image: String,
    #[fragment(default)]
    pub resources: Resources,
    pub features: ServerFeatures,
    pub syndesis_encrypt_key: String,
    pub client_state_authentication_key: String,
    pub client_state_encryption_key: String,
}

#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct ServerFeatures {
    /// Maximum number of integrations per user, 0 means unlimited
    #[fragment(default)]
    pub integration_limit: i32,
    #[fragment(default)]
    pub integration_state_check_interval: i32,
    #[fragment(default)]
    pub deploy_integrations: bool,
    #[fragment(default)]
    pub test_support: bool,
    #[fragment(default)]
    pub open_shift_master: String,
    #[fragment(default)]
    pub management_url_for_3scale: String,
    #[fragment(default)]
    pub maven: MavenConfiguration,
}

#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct MavenConfiguration {
    #[fragment(default)]
    pub repositories: BTreeMap<String, String>,
}

/// The metadata service
#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct MetaConfiguration {
    pub image: String,
    #[fragment(default)]
    pub resources: ResourcesWithPersistentVolume,
}

#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfiguration {
    pub image: String,
    pub user: String,
    pub name: String,
    pub url: String,
    #[fragment(default)]
    pub external_db_url: String,
    pub password: String,
    pub sampledb_password: String,
    pub exporter: ExporterConfiguration,
    #[fragment(default)]
    pub resources: ResourcesWithPersistentVolume,
}

/// The Prometheus exporter running next to the database
#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct ExporterConfiguration {
    pub image: String,
}

#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct PrometheusConfiguration {
    pub image: String,
    #[fragment(default)]
    pub rules: String,
    #[fragment(default)]
    pub resources: ResourcesWithPersistentVolume,
}

#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct GrafanaConfiguration {
    #[fragment(default)]
    pub resources: Resources,
}

/// The job migrating the database between product versions
#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeConfiguration {
    pub image: String,
    #[fragment(default)]
    pub resources: VolumeOnlyResources,
}

#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct ResourceParams {
    #[fragment(default)]
    pub memory: String,
}

#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct Resources {
    pub limit: ResourceParams,
    pub request: ResourceParams,
}

#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesWithPersistentVolume {
    pub limit: ResourceParams,
    pub request: ResourceParams,
    #[fragment(default)]
    pub volume_capacity: String,
    #[fragment(default)]
    pub volume_name: String,
    #[fragment(default)]
    pub volume_access_mode: String,
    #[fragment(default)]
    pub volume_storage_class: String,
    #[fragment(default)]
    pub volume_labels: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct VolumeOnlyResources {
    #[fragment(default)]
    pub volume_capacity: String,
}
