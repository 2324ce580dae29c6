//! Reads the cluster state a configuration resolution depends on.
//!
//! Objects that do not exist are reported as [`None`], only failed requests are errors.
use k8s_openapi::api::core::v1::Secret;
use kube::{
    Api, Client,
    api::{ApiResource, DynamicObject},
    core::GroupVersionKind,
};
use snafu::{OptionExt, ResultExt, Snafu};

use crate::{
    capabilities::{ApiServerSpec, PROBES},
    configuration::{
        self, Config, Resolver,
        cluster::{ClusterState, DATABASE_CONTAINER},
        environment::Environment,
        secrets::SECRET_NAME,
    },
    crd::v1beta2,
};

/// Name of the route exposing the Syndesis UI
pub const ROUTE_NAME: &str = "syndesis";

/// Name of the deployment config running the database
pub const DATABASE_DEPLOYMENT_NAME: &str = "syndesis-db";

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to get secret {SECRET_NAME:?} in namespace {namespace:?}"))]
    GetPersistedSecret {
        source: kube::Error,
        namespace: String,
    },

    #[snafu(display("failed to get deployment config {DATABASE_DEPLOYMENT_NAME:?} in namespace {namespace:?}"))]
    GetDatabaseDeployment {
        source: kube::Error,
        namespace: String,
    },

    #[snafu(display("failed to get route {ROUTE_NAME:?} in namespace {namespace:?}"))]
    GetRoute {
        source: kube::Error,
        namespace: String,
    },

    #[snafu(display("failed to determine the Kubernetes version"))]
    GetServerVersion { source: kube::Error },

    #[snafu(display("failed to list API groups"))]
    ListApiGroups { source: kube::Error },

    #[snafu(display("failed to list API resources of {group_version:?}"))]
    ListApiResources {
        source: kube::Error,
        group_version: String,
    },

    #[snafu(display("Syndesis {name:?} has no namespace"))]
    ObjectHasNoNamespace { name: String },

    #[snafu(display("failed to resolve the configuration of Syndesis {name:?}"))]
    ResolveConfig {
        source: configuration::Error,
        name: String,
    },
}

/// Reads the `syndesis-global-config` secret of the installation
pub async fn read_persisted_secret(client: &Client, namespace: &str) -> Result<Option<Secret>, Error> {
    Api::<Secret>::namespaced(client.clone(), namespace)
        .get_opt(SECRET_NAME)
        .await
        .context(GetPersistedSecretSnafu { namespace })
}

/// Reads the image of the database container from the OpenShift deployment config running it
pub async fn read_database_image(client: &Client, namespace: &str) -> Result<Option<String>, Error> {
    let resource = ApiResource::from_gvk(&GroupVersionKind::gvk(
        "apps.openshift.io",
        "v1",
        "DeploymentConfig",
    ));
    let deployment_config = Api::<DynamicObject>::namespaced_with(client.clone(), namespace, &resource)
        .get_opt(DATABASE_DEPLOYMENT_NAME)
        .await
        .context(GetDatabaseDeploymentSnafu { namespace })?;

    Ok(deployment_config.as_ref().and_then(database_image))
}

// A database container without an image reads as the empty image
fn database_image(deployment_config: &DynamicObject) -> Option<String> {
    deployment_config
        .data
        .pointer("/spec/template/spec/containers")?
        .as_array()?
        .iter()
        .find(|container| container.get("name").and_then(serde_json::Value::as_str) == Some(DATABASE_CONTAINER))
        .map(|container| {
            container
                .get("image")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string()
        })
}

/// Reads `spec.host` of the OpenShift route exposing Syndesis
pub async fn read_route_host(client: &Client, namespace: &str) -> Result<Option<String>, Error> {
    let resource = ApiResource::from_gvk(&GroupVersionKind::gvk("route.openshift.io", "v1", "Route"));
    let route = Api::<DynamicObject>::namespaced_with(client.clone(), namespace, &resource)
        .get_opt(ROUTE_NAME)
        .await
        .context(GetRouteSnafu { namespace })?;

    Ok(route.as_ref().and_then(route_host))
}

fn route_host(route: &DynamicObject) -> Option<String> {
    route
        .data
        .get("spec")?
        .get("host")?
        .as_str()
        .filter(|host| !host.is_empty())
        .map(str::to_string)
}

/// Reads every object of the installation's namespace that configuration resolution depends on
pub async fn read_cluster_state(client: &Client, namespace: &str) -> Result<ClusterState, Error> {
    let (persisted_secret, route_host, database_image) = futures::try_join!(
        read_persisted_secret(client, namespace),
        read_route_host(client, namespace),
        read_database_image(client, namespace),
    )?;

    tracing::debug!(
        namespace,
        persisted_secret = persisted_secret.is_some(),
        route = route_host.is_some(),
        database_image = database_image.as_deref(),
        "Read cluster state"
    );
    Ok(ClusterState {
        persisted_secret,
        route_host,
        database_image,
    })
}

/// Resolves the [`Config`] of `syndesis` against the cluster it is installed in.
///
/// Discovers the API server capabilities, reads the [`ClusterState`] of the object's namespace, and hands both to
/// `resolver`.
pub async fn resolve_config<E: Environment + ?Sized>(
    client: &Client,
    resolver: Resolver<'_, E>,
    syndesis: &v1beta2::Syndesis,
) -> Result<Config, Error> {
    let name = syndesis.metadata.name.clone().unwrap_or_default();
    let namespace = syndesis
        .metadata
        .namespace
        .as_deref()
        .context(ObjectHasNoNamespaceSnafu { name: name.as_str() })?;

    let (api_server, state) = futures::try_join!(
        discover_api_server(client),
        read_cluster_state(client, namespace),
    )?;

    resolver
        .with_api_server(api_server)
        .resolve_in_cluster(&state, syndesis)
        .context(ResolveConfigSnafu { name })
}

/// Discovers the Kubernetes version and the optional APIs of the cluster
pub async fn discover_api_server(client: &Client) -> Result<ApiServerSpec, Error> {
    let version = client
        .apiserver_version()
        .await
        .context(GetServerVersionSnafu)?
        .git_version;

    let groups = client.list_api_groups().await.context(ListApiGroupsSnafu)?;
    let served: Vec<_> = groups
        .groups
        .iter()
        .flat_map(|group| &group.versions)
        .map(|served| served.group_version.as_str())
        .filter(|group_version| {
            PROBES
                .iter()
                .any(|probe| probe.group_version == *group_version)
        })
        .collect();

    let mut discovered = Vec::with_capacity(served.len());
    for group_version in served {
        discovered.push(
            client
                .list_api_group_resources(group_version)
                .await
                .context(ListApiResourcesSnafu { group_version })?,
        );
    }

    let api_server = ApiServerSpec::from_api_resources(version, &discovered);
    tracing::info!(
        version = %api_server.version,
        routes = api_server.routes,
        image_streams = api_server.image_streams,
        embedded_provider = api_server.embedded_provider,
        olm_support = api_server.olm_support,
        "Discovered API server capabilities"
    );
    Ok(api_server)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn deployment_config(containers: serde_json::Value) -> DynamicObject {
        serde_json::from_value(json!({
            "apiVersion": "apps.openshift.io/v1",
            "kind": "DeploymentConfig",
            "metadata": { "name": "syndesis-db", "namespace": "syndesis" },
            "spec": {
                "replicas": 1,
                "template": { "spec": { "containers": containers } },
            },
        }))
        .unwrap()
    }

    #[test]
    fn database_image_is_read_from_postgresql_container() {
        let deployment_config = deployment_config(json!([
            { "name": "postgres-exporter", "image": "docker.io/wrouesnel/postgres_exporter:v0.4.7" },
            { "name": "postgresql", "image": "postgresql:9.5" },
        ]));
        assert_eq!(database_image(&deployment_config).as_deref(), Some("postgresql:9.5"));
    }

    #[test]
    fn database_container_without_image_reads_empty() {
        let deployment_config = deployment_config(json!([{ "name": "postgresql" }]));
        assert_eq!(database_image(&deployment_config).as_deref(), Some(""));
    }

    #[test]
    fn deployment_config_without_database_container_has_none() {
        let sidecar_only = deployment_config(json!([
            { "name": "postgres-exporter", "image": "docker.io/wrouesnel/postgres_exporter:v0.4.7" },
        ]));
        assert_eq!(database_image(&sidecar_only), None);
        assert_eq!(database_image(&deployment_config(json!(null))), None);
    }

    fn route(spec: serde_json::Value) -> DynamicObject {
        serde_json::from_value(json!({
            "apiVersion": "route.openshift.io/v1",
            "kind": "Route",
            "metadata": { "name": "syndesis", "namespace": "syndesis" },
            "spec": spec,
        }))
        .unwrap()
    }

    #[test]
    fn host_is_read_from_route_spec() {
        let route = route(json!({ "host": "syndesis.apps.example.com", "to": { "name": "syndesis-oauthproxy" } }));
        assert_eq!(route_host(&route).as_deref(), Some("syndesis.apps.example.com"));
    }

    #[test]
    fn route_without_host_has_none() {
        assert_eq!(route_host(&route(json!({ "to": { "name": "syndesis-oauthproxy" } }))), None);
        assert_eq!(route_host(&route(json!({ "host": "" }))), None);
    }
}
