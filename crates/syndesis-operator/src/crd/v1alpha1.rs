//! The first `Syndesis` schema.
//!
//! Addons are an untyped map keyed by addon name, and sizing reuses the Kubernetes
//! `limits`/`requests` resource lists.
use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::SyndesisStatus;

/// Per-addon settings, for example `{"ops": {"enabled": "true"}}`
pub type AddonsSpec = BTreeMap<String, BTreeMap<String, String>>;

const MEMORY: &str = "memory";

#[derive(Clone, CustomResource, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    group = "syndesis.io",
    version = "v1alpha1",
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

    #[serde(skip_serializing_if = "String::is_empty")]
    pub sar_namespace: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_data: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy_integrations: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_support: Option<bool>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub open_shift_master: String,

    pub integration: IntegrationSpec,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub maven_repositories: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub addons: AddonsSpec,

    pub components: ComponentsSpec,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IntegrationSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_check_interval: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComponentsSpec {
    pub server: ServerConfiguration,
    pub meta: MetaConfiguration,
    pub db: DbConfiguration,
    pub prometheus: PrometheusConfiguration,
    pub grafana: GrafanaConfiguration,
    pub oauth: OauthConfiguration,
    pub upgrade: UpgradeConfiguration,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfiguration {
    pub resources: Resources,
    pub features: ServerFeatures,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerFeatures {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub management_url_for_3scale: String,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetaConfiguration {
    pub resources: ResourcesWithVolume,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DbConfiguration {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub database: String,

    pub resources: ResourcesWithVolume,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrometheusConfiguration {
    pub resources: ResourcesWithVolume,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GrafanaConfiguration {
    pub resources: Resources,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OauthConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_sar_check: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpgradeConfiguration {
    pub resources: VolumeOnlyResources,
}

/// Kubernetes style resource requirements, keyed by resource name (`cpu`, `memory`)
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Resources {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub limits: BTreeMap<String, Quantity>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub requests: BTreeMap<String, Quantity>,
}

impl Resources {
    /// The single memory figure of this requirement: the limit, or the request when no limit is set
    pub fn memory(&self) -> String {
        self.limits
            .get(MEMORY)
            .or_else(|| self.requests.get(MEMORY))
            .map(|quantity| quantity.0.clone())
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourcesWithVolume {
    #[serde(flatten)]
    pub resources: Resources,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub volume_capacity: String,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VolumeOnlyResources {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub volume_capacity: String,
}
