//! Forward migration of `Syndesis` objects between schema versions.
//!
//! A migration only runs for an installed object whose owner asked for it (`spec.forceMigration`). Otherwise the
//! caller's destination object is handed back untouched.
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Resource;

use super::{
    SyndesisPhase, SyndesisStatus, SyndesisStatusReason, v1alpha1, v1beta1,
    v1beta2::{self, ResourceParams},
};
use crate::addons::AddonName;

/// Conversion of `Self` into a newer schema version
pub trait Migrate<Destination> {
    /// Converts `self` into `Destination`.
    ///
    /// `destination` is the same object as currently seen in the newer version. It is returned as is when `self`
    /// is not eligible for migration, and provides the metadata of the migrated object otherwise.
    fn migrate(&self, destination: Destination) -> Destination;
}

impl Migrate<v1beta1::Syndesis> for v1alpha1::Syndesis {
    fn migrate(&self, destination: v1beta1::Syndesis) -> v1beta1::Syndesis {
        if !is_eligible(self.status.as_ref(), self.spec.force_migration) {
            log_skipped::<Self, v1beta1::Syndesis>(&self.metadata);
            return destination;
        }

        v1beta1::Syndesis {
            metadata: merge_metadata(&self.metadata, destination.metadata),
            spec: v1beta1::SyndesisSpec::from(&self.spec),
            status: Some(migrated_status::<Self, v1beta1::Syndesis>(
                self.status.as_ref(),
            )),
        }
    }
}

impl Migrate<v1beta2::Syndesis> for v1beta1::Syndesis {
    fn migrate(&self, destination: v1beta2::Syndesis) -> v1beta2::Syndesis {
        if !is_eligible(self.status.as_ref(), self.spec.force_migration) {
            log_skipped::<Self, v1beta2::Syndesis>(&self.metadata);
            return destination;
        }

        v1beta2::Syndesis {
            metadata: merge_metadata(&self.metadata, destination.metadata),
            spec: v1beta2::SyndesisSpec::from(self.spec.clone()),
            status: Some(migrated_status::<Self, v1beta2::Syndesis>(
                self.status.as_ref(),
            )),
        }
    }
}

// Both steps run under a single eligibility check, the intermediate object never carries `forceMigration`
impl Migrate<v1beta2::Syndesis> for v1alpha1::Syndesis {
    fn migrate(&self, destination: v1beta2::Syndesis) -> v1beta2::Syndesis {
        if !is_eligible(self.status.as_ref(), self.spec.force_migration) {
            log_skipped::<Self, v1beta2::Syndesis>(&self.metadata);
            return destination;
        }

        v1beta2::Syndesis {
            metadata: merge_metadata(&self.metadata, destination.metadata),
            spec: v1beta2::SyndesisSpec::from(v1beta1::SyndesisSpec::from(&self.spec)),
            status: Some(migrated_status::<Self, v1beta2::Syndesis>(
                self.status.as_ref(),
            )),
        }
    }
}

fn is_eligible(status: Option<&SyndesisStatus>, force_migration: bool) -> bool {
    force_migration && status.is_some_and(|status| status.phase == SyndesisPhase::Installed)
}

fn log_skipped<S, D>(metadata: &ObjectMeta)
where
    S: Resource<DynamicType = ()>,
    D: Resource<DynamicType = ()>,
{
    tracing::debug!(
        syndesis.name = metadata.name.as_deref().unwrap_or_default(),
        from = %S::api_version(&()),
        to = %D::api_version(&()),
        "Skipping migration, object is not installed or migration was not requested"
    );
}

/// Status of a freshly migrated object
fn migrated_status<S, D>(source: Option<&SyndesisStatus>) -> SyndesisStatus
where
    S: Resource<DynamicType = ()>,
    D: Resource<DynamicType = ()>,
{
    let from = S::api_version(&());
    let to = D::api_version(&());
    tracing::info!(%from, %to, "Migrated Syndesis custom resource");

    SyndesisStatus {
        phase: SyndesisPhase::Installed,
        reason: SyndesisStatusReason::Migrated,
        description: format!("App migrated from {from} to {to}"),
        force_upgrade: source.is_some_and(|status| status.force_upgrade),
        ..SyndesisStatus::default()
    }
}

/// The destination's metadata, with identity fields taken from the source where the destination has none
fn merge_metadata(source: &ObjectMeta, mut destination: ObjectMeta) -> ObjectMeta {
    if destination.name.is_none() {
        destination.name.clone_from(&source.name);
    }
    if destination.namespace.is_none() {
        destination.namespace.clone_from(&source.namespace);
    }
    destination
}

/// Whether `addon` is enabled, [`None`] if the addon has no `enabled` setting at all
fn addon_enabled(addons: &v1alpha1::AddonsSpec, addon: AddonName) -> Option<bool> {
    let name: &'static str = addon.into();
    addons
        .get(name)
        .and_then(|settings| settings.get("enabled"))
        .map(|enabled| enabled == "true")
}

fn with_volume(resources: &v1alpha1::ResourcesWithVolume) -> v1beta1::ResourcesWithPersistentVolume {
    v1beta1::ResourcesWithPersistentVolume {
        memory: resources.resources.memory(),
        volume_capacity: resources.volume_capacity.clone(),
        ..Default::default()
    }
}

impl From<&v1alpha1::SyndesisSpec> for v1beta1::SyndesisSpec {
    fn from(spec: &v1alpha1::SyndesisSpec) -> Self {
        let components = &spec.components;
        let enabled = |addon| addon_enabled(&spec.addons, addon);

        Self {
            force_migration: false,
            route_hostname: spec.route_hostname.clone(),
            demo_data: spec.demo_data,
            components: v1beta1::ComponentsSpec {
                oauth: v1beta1::OauthConfiguration {
                    sar_namespace: spec.sar_namespace.clone(),
                    disable_sar_check: components.oauth.disable_sar_check,
                },
                server: v1beta1::ServerConfiguration {
                    resources: v1beta1::Resources {
                        memory: components.server.resources.memory(),
                    },
                    features: v1beta1::ServerFeatures {
                        integration_limit: spec.integration.limit,
                        integration_state_check_interval: spec.integration.state_check_interval,
                        deploy_integrations: spec.deploy_integrations,
                        test_support: spec.test_support,
                        open_shift_master: spec.open_shift_master.clone(),
                        management_url_for_3scale: components
                            .server
                            .features
                            .management_url_for_3scale
                            .clone(),
                        maven: v1beta1::MavenConfiguration {
                            repositories: spec.maven_repositories.clone(),
                        },
                    },
                },
                meta: v1beta1::MetaConfiguration {
                    resources: with_volume(&components.meta.resources),
                },
                database: v1beta1::DatabaseConfiguration {
                    user: components.db.user.clone(),
                    name: components.db.database.clone(),
                    resources: with_volume(&components.db.resources),
                    ..Default::default()
                },
                prometheus: v1beta1::PrometheusConfiguration {
                    resources: with_volume(&components.prometheus.resources),
                    ..Default::default()
                },
                grafana: v1beta1::GrafanaConfiguration {
                    resources: v1beta1::Resources {
                        memory: components.grafana.resources.memory(),
                    },
                },
                upgrade: v1beta1::UpgradeConfiguration {
                    resources: v1beta1::VolumeOnlyResources {
                        volume_capacity: components.upgrade.resources.volume_capacity.clone(),
                    },
                },
            },
            addons: v1beta1::AddonsSpec {
                jaeger: v1beta1::JaegerConfiguration {
                    enabled: enabled(AddonName::Jaeger),
                    ..Default::default()
                },
                ops: v1beta1::AddonSpec {
                    enabled: enabled(AddonName::Ops),
                },
                todo: v1beta1::AddonSpec {
                    enabled: enabled(AddonName::Todo),
                },
                camel_k: v1beta1::AddonSpec {
                    enabled: enabled(AddonName::CamelK),
                },
                ..Default::default()
            },
        }
    }
}

// A single memory figure becomes both the limit and the request
impl From<v1beta1::Resources> for v1beta2::Resources {
    fn from(resources: v1beta1::Resources) -> Self {
        Self {
            limit: ResourceParams::memory(resources.memory.clone()),
            request: ResourceParams::memory(resources.memory),
        }
    }
}

impl From<v1beta1::ResourcesWithPersistentVolume> for v1beta2::ResourcesWithPersistentVolume {
    fn from(resources: v1beta1::ResourcesWithPersistentVolume) -> Self {
        Self {
            limit: ResourceParams::memory(resources.memory.clone()),
            request: ResourceParams::memory(resources.memory),
            volume_capacity: resources.volume_capacity,
            volume_name: resources.volume_name,
            volume_access_mode: resources.volume_access_mode,
            volume_storage_class: resources.volume_storage_class,
            volume_labels: resources.volume_labels,
        }
    }
}

impl From<v1beta1::ComponentsSpec> for v1beta2::ComponentsSpec {
    fn from(components: v1beta1::ComponentsSpec) -> Self {
        Self {
            oauth: components.oauth,
            server: v1beta2::ServerConfiguration {
                resources: components.server.resources.into(),
                features: components.server.features,
            },
            meta: v1beta2::MetaConfiguration {
                resources: components.meta.resources.into(),
            },
            database: v1beta2::DatabaseConfiguration {
                user: components.database.user,
                name: components.database.name,
                url: components.database.url,
                external_db_url: components.database.external_db_url,
                resources: components.database.resources.into(),
            },
            prometheus: v1beta2::PrometheusConfiguration {
                rules: components.prometheus.rules,
                resources: components.prometheus.resources.into(),
            },
            grafana: v1beta2::GrafanaConfiguration {
                resources: components.grafana.resources.into(),
            },
            upgrade: components.upgrade,
        }
    }
}

impl From<v1beta1::AddonsSpec> for v1beta2::AddonsSpec {
    fn from(addons: v1beta1::AddonsSpec) -> Self {
        Self {
            jaeger: addons.jaeger,
            ops: addons.ops,
            todo: addons.todo,
            knative: addons.knative,
            dv: v1beta2::DvConfiguration {
                enabled: addons.dv.enabled,
                resources: addons.dv.resources.into(),
            },
            camel_k: addons.camel_k,
            public_api: addons.public_api,
        }
    }
}

impl From<v1beta1::SyndesisSpec> for v1beta2::SyndesisSpec {
    fn from(spec: v1beta1::SyndesisSpec) -> Self {
        Self {
            force_migration: false,
            route_hostname: spec.route_hostname,
            demo_data: spec.demo_data,
            components: spec.components.into(),
            addons: spec.addons.into(),
        }
    }
}
