//! Optional API server features that change how Syndesis is installed.
use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResourceList;
use serde::{Deserialize, Serialize};

use crate::config::merge::Atomic;

/// An API resource whose presence enables a capability
pub(crate) struct Probe {
    pub group_version: &'static str,
    pub plural: &'static str,
}

pub(crate) const ROUTES: Probe = Probe {
    group_version: "route.openshift.io/v1",
    plural: "routes",
};
pub(crate) const IMAGE_STREAMS: Probe = Probe {
    group_version: "image.openshift.io/v1",
    plural: "imagestreams",
};
pub(crate) const EMBEDDED_PROVIDER: Probe = Probe {
    group_version: "oauth.openshift.io/v1",
    plural: "oauthclientauthorizations",
};
pub(crate) const OLM_SUPPORT: Probe = Probe {
    group_version: "operators.coreos.com/v1alpha1",
    plural: "catalogsources",
};

pub(crate) const PROBES: [Probe; 4] = [ROUTES, IMAGE_STREAMS, EMBEDDED_PROVIDER, OLM_SUPPORT];

/// What the API server Syndesis is installed into supports
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiServerSpec {
    /// Kubernetes version, as reported by the API server
    pub version: String,
    pub routes: bool,
    pub image_streams: bool,
    /// Whether OpenShift's built-in OAuth server can be used
    pub embedded_provider: bool,
    pub olm_support: bool,
}

impl Atomic for ApiServerSpec {}

impl ApiServerSpec {
    /// Derives the capability flags from the discovered resource lists
    pub fn from_api_resources(version: impl Into<String>, discovered: &[APIResourceList]) -> Self {
        let supports = |probe: &Probe| {
            discovered
                .iter()
                .filter(|list| list.group_version == probe.group_version)
                .flat_map(|list| &list.resources)
                .any(|resource| resource.name == probe.plural)
        };

        Self {
            version: version.into(),
            routes: supports(&ROUTES),
            image_streams: supports(&IMAGE_STREAMS),
            embedded_provider: supports(&EMBEDDED_PROVIDER),
            olm_support: supports(&OLM_SUPPORT),
        }
    }
}
