//! The newest `Syndesis` schema.
//!
//! Resource sizing is an explicit `{limit, request}` pair. Everything in [`SyndesisSpec`] except `forceMigration` is
//! an override on top of the operator configuration, and unset values leave the configuration untouched.
use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::SyndesisStatus;
use crate::addons::OlmSpec;

#[derive(Clone, CustomResource, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[kube(
    group = "syndesis.io",
    version = "v1beta2",
    kind = "Syndesis",
    plural = "syndesises",
    namespaced,
    status = "SyndesisStatus",
    derive = "Default",
    derive = "PartialEq"
)]
#[serde(default, rename_all = "camelCase")]
pub struct SyndesisSpec {
    /// Requests a migration of an object persisted in an older schema version
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
pub struct OauthConfiguration {
    /// Namespace against which subject access reviews are checked
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sar_namespace: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_sar_check: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfiguration {
    pub resources: Resources,
    pub features: ServerFeatures,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerFeatures {
    /// Maximum number of integrations a single user can run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integration_limit: Option<i32>,

    /// Seconds between two integration state checks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integration_state_check_interval: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy_integrations: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_support: Option<bool>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub open_shift_master: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub management_url_for_3scale: String,

    pub maven: MavenConfiguration,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MavenConfiguration {
    /// Replaces the default repositories, keyed by repository id
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub repositories: BTreeMap<String, String>,
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

    /// Connection URL of a database that is not managed by the operator
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
pub struct UpgradeConfiguration {
    pub resources: VolumeOnlyResources,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourceParams {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub memory: String,
}

impl ResourceParams {
    pub fn memory(memory: impl Into<String>) -> Self {
        Self {
            memory: memory.into(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Resources {
    pub limit: ResourceParams,
    pub request: ResourceParams,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourcesWithPersistentVolume {
    pub limit: ResourceParams,
    pub request: ResourceParams,

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
pub struct VolumeOnlyResources {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub volume_capacity: String,
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
pub struct AddonSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JaegerConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Only deploy the agent side and report to an existing collector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_only: Option<bool>,

    /// Only install the Jaeger operator, without a Jaeger instance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_only: Option<bool>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub query_uri: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub collector_uri: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub sampler_type: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub sampler_param: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub image_agent: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub image_all_in_one: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub image_operator: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub olm: Option<OlmSpec>,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DvConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    pub resources: Resources,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PublicApiConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub route_hostname: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_sar_check: Option<bool>,
}
