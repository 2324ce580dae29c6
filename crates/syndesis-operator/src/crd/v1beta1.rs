//! The intermediate `Syndesis` schema.
//!
//! Sizing is a single memory value. Types that did not change in [`v1beta2`](super::v1beta2) are shared with it.
use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::SyndesisStatus;
pub use super::v1beta2::{
    AddonSpec, JaegerConfiguration, MavenConfiguration, OauthConfiguration,
    PublicApiConfiguration, ServerFeatures, UpgradeConfiguration, VolumeOnlyResources,
};

#[derive(Clone, CustomResource, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[kube(
    group = "syndesis.io",
    version = "v1beta1",
    kind = "Syndesis",
    plural = "syndesises",
    namespaced,
    status = "SyndesisStatus",
    derive = "Default",
    derive = "PartialEq"
)]
#[serde(default, rename_all = "camelCase")]
pub struct SyndesisSpec {
    pub force_migration: bool,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub route_hostname: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_data: Option<bool>,

    pub components: ComponentsSpec,

    pub addons: AddonsSpec,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComponentsSpec {
    pub oauth: OauthConfiguration,
    pub server: ServerConfiguration,
    pub meta: MetaConfiguration,
    pub database: DatabaseConfiguration,
    pub prometheus: PrometheusConfiguration,
    pub grafana: GrafanaConfiguration,
    pub upgrade: UpgradeConfiguration,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfiguration {
    pub resources: Resources,
    pub features: ServerFeatures,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetaConfiguration {
    pub resources: ResourcesWithPersistentVolume,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DatabaseConfiguration {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub external_db_url: String,

    pub resources: ResourcesWithPersistentVolume,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrometheusConfiguration {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub rules: String,

    pub resources: ResourcesWithPersistentVolume,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GrafanaConfiguration {
    pub resources: Resources,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Resources {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub memory: String,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourcesWithPersistentVolume {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub memory: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub volume_capacity: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub volume_name: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub volume_access_mode: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub volume_storage_class: String,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub volume_labels: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddonsSpec {
    pub jaeger: JaegerConfiguration,
    pub ops: AddonSpec,
    pub todo: AddonSpec,
    pub knative: AddonSpec,
    pub dv: DvConfiguration,
    pub camel_k: AddonSpec,
    pub public_api: PublicApiConfiguration,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DvConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    pub resources: Resources,
}
