//! Optional Syndesis addons and a uniform view over them.
//!
//! Every addon has its own configuration type, but all of them can be enumerated through the [`Addon`] trait in a
//! stable order (see [`AddonsConfig::addons`]).
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

use crate::{
    config::{
        fragment::Fragment,
        merge::{Atomic, Merge},
    },
    configuration::{Config, components::Resources},
};

/// Addon names as used in custom resources and manifests.
///
/// The declaration order is the order in which addons are listed and must not change.
#[derive(Clone, Copy, Debug, Display, EnumIter, Hash, IntoStaticStr, PartialEq, Eq)]
pub enum AddonName {
    #[strum(serialize = "jaeger")]
    Jaeger,
    #[strum(serialize = "ops")]
    Ops,
    #[strum(serialize = "dv")]
    Dv,
    #[strum(serialize = "camelk")]
    CamelK,
    #[strum(serialize = "knative")]
    Knative,
    #[strum(serialize = "publicApi")]
    PublicApi,
    #[strum(serialize = "todo")]
    Todo,
}

/// The OLM package and channel an addon's operator is subscribed from
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OlmSpec {
    pub package: String,
    pub channel: String,
}

impl Atomic for OlmSpec {}

/// Capabilities shared by all addon configurations
pub trait Addon {
    fn name(&self) -> AddonName;

    fn is_enabled(&self) -> bool;

    /// OLM subscription coordinates, for addons that are installed through OLM
    fn olm_spec(&self) -> Option<&OlmSpec> {
        None
    }
}

/// Read-only snapshot of one addon
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddonInstance {
    pub name: AddonName,
    pub enabled: bool,
    pub olm: Option<OlmSpec>,
}

impl AddonInstance {
    pub fn of(addon: &dyn Addon) -> Self {
        Self {
            name: addon.name(),
            enabled: addon.is_enabled(),
            olm: addon.olm_spec().cloned(),
        }
    }
}

/// Lists all addons of the resolved configuration, in the order of [`AddonName`]
pub fn list_addons(config: &Config) -> Vec<AddonInstance> {
    config
        .syndesis
        .addons
        .addons()
        .into_iter()
        .map(AddonInstance::of)
        .collect()
}

#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct AddonsConfig {
    pub jaeger: JaegerConfiguration,
    pub ops: OpsConfiguration,
    pub todo: TodoConfiguration,
    pub knative: KnativeConfiguration,
    pub dv: DvConfiguration,
    pub camel_k: CamelKConfiguration,
    pub public_api: PublicApiConfiguration,
}

impl AddonsConfig {
    /// All addons, in the order of [`AddonName`]
    pub fn addons(&self) -> [&dyn Addon; 7] {
        [
            &self.jaeger,
            &self.ops,
            &self.dv,
            &self.camel_k,
            &self.knative,
            &self.public_api,
            &self.todo,
        ]
    }
}

#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct JaegerConfiguration {
    #[fragment(default)]
    pub enabled: bool,
    #[fragment(default)]
    pub client_only: bool,
    #[fragment(default)]
    pub operator_only: bool,
    #[fragment(default)]
    pub query_uri: String,
    #[fragment(default)]
    pub collector_uri: String,
    #[fragment(default)]
    pub sampler_type: String,
    #[fragment(default)]
    pub sampler_param: String,
    #[fragment(default)]
    pub image_agent: String,
    #[fragment(default)]
    pub image_all_in_one: String,
    #[fragment(default)]
    pub image_operator: String,
    pub olm: Option<OlmSpec>,
}

impl Addon for JaegerConfiguration {
    fn name(&self) -> AddonName {
        AddonName::Jaeger
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn olm_spec(&self) -> Option<&OlmSpec> {
        self.olm.as_ref()
    }
}

#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct OpsConfiguration {
    #[fragment(default)]
    pub enabled: bool,
}

impl Addon for OpsConfiguration {
    fn name(&self) -> AddonName {
        AddonName::Ops
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Sample "todo" application
#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct TodoConfiguration {
    #[fragment(default)]
    pub enabled: bool,
    #[fragment(default)]
    pub image: String,
}

impl Addon for TodoConfiguration {
    fn name(&self) -> AddonName {
        AddonName::Todo
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct KnativeConfiguration {
    #[fragment(default)]
    pub enabled: bool,
}

impl Addon for KnativeConfiguration {
    fn name(&self) -> AddonName {
        AddonName::Knative
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Data virtualization
#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct DvConfiguration {
    #[fragment(default)]
    pub enabled: bool,
    #[fragment(default)]
    pub image: String,
    #[fragment(default)]
    pub resources: Resources,
}

impl Addon for DvConfiguration {
    fn name(&self) -> AddonName {
        AddonName::Dv
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct CamelKConfiguration {
    #[fragment(default)]
    pub enabled: bool,
    #[fragment(default)]
    pub camel_version: String,
    #[fragment(default)]
    pub camel_k_runtime: String,
    /// Base image for integrations built by Camel K
    #[fragment(default)]
    pub image: String,
}

impl Addon for CamelKConfiguration {
    fn name(&self) -> AddonName {
        AddonName::CamelK
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[derive(Clone, Debug, Default, Fragment, PartialEq, Eq, Serialize)]
#[fragment_attrs(
    derive(Clone, Debug, Default, Deserialize, Merge, PartialEq, Eq),
    serde(default, rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub struct PublicApiConfiguration {
    #[fragment(default)]
    pub enabled: bool,
    #[fragment(default)]
    pub route_hostname: String,
    #[fragment(default)]
    pub disable_sar_check: bool,
}

impl Addon for PublicApiConfiguration {
    fn name(&self) -> AddonName {
        AddonName::PublicApi
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
