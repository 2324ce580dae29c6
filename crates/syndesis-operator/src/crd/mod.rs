//! The `Syndesis` custom resource in all served schema versions, and the migration between them.
//!
//! The newest version is [`v1beta2`]. Objects persisted in an older shape are decoded with
//! [`VersionedSyndesis::from_json_value`] and brought forward with [`VersionedSyndesis::migrate_to_latest`].
use std::{fmt::Display, str::FromStr};

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::{CustomResourceExt, core::crd::MergeError};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt, Snafu, ensure};
use strum::EnumIter;

use crate::crd::migration::Migrate;

pub mod migration;
pub mod v1alpha1;
pub mod v1beta1;
pub mod v1beta2;

pub const GROUP: &str = "syndesis.io";
pub const KIND: &str = "Syndesis";

#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum SyndesisVersionParseError {
    #[snafu(display("api version {input:?} has no group"))]
    MissingGroup { input: String },

    #[snafu(display("api group {group:?} is not {GROUP:?}"))]
    UnknownGroup { group: String },

    #[snafu(display("version {version:?} is not served for {KIND}"))]
    UnknownVersion { version: String },
}

/// A schema version of the `Syndesis` custom resource, in the `syndesis.io/<version>` format.
///
/// Versions are ordered from oldest to newest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum SyndesisVersion {
    V1Alpha1,
    V1Beta1,
    V1Beta2,
}

impl SyndesisVersion {
    pub const LATEST: Self = Self::V1Beta2;

    /// The version without its group, for example `v1beta2`
    pub fn name(self) -> &'static str {
        match self {
            Self::V1Alpha1 => "v1alpha1",
            Self::V1Beta1 => "v1beta1",
            Self::V1Beta2 => "v1beta2",
        }
    }

    /// The `Syndesis` CRD serving every version, with `stored` as the storage version
    pub fn merged_crd(stored: Self) -> Result<CustomResourceDefinition, MergeError> {
        kube::core::crd::merge_crds(
            vec![
                v1alpha1::Syndesis::crd(),
                v1beta1::Syndesis::crd(),
                v1beta2::Syndesis::crd(),
            ],
            stored.name(),
        )
    }
}

impl FromStr for SyndesisVersion {
    type Err = SyndesisVersionParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (group, version) = input
            .split_once('/')
            .context(MissingGroupSnafu { input })?;
        ensure!(group == GROUP, UnknownGroupSnafu { group });

        match version {
            "v1alpha1" => Ok(Self::V1Alpha1),
            "v1beta1" => Ok(Self::V1Beta1),
            "v1beta2" => Ok(Self::V1Beta2),
            _ => UnknownVersionSnafu { version }.fail(),
        }
    }
}

impl Display for SyndesisVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{GROUP}/{}", self.name())
    }
}

/// Lifecycle phase of an installation, shared by all schema versions
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
pub enum SyndesisPhase {
    #[default]
    #[serde(rename = "")]
    Missing,
    Installing,
    Starting,
    StartupFailed,
    Installed,
    NotInstalled,
    Upgrading,
    UpgradeFailureBackoff,
    UpgradeFailed,
    PostUpgradeRun,
    PostUpgradeRunSucceed,
}

/// Machine readable reason for the current [`SyndesisPhase`]
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
pub enum SyndesisStatusReason {
    #[default]
    #[serde(rename = "")]
    Missing,
    Migrated,
    DeploymentNotReady,
    UpgradePodFailed,
    TooManyUpgradeAttempts,
    PostUpgradeRun,
}

/// Observed state of a `Syndesis` installation.
///
/// The status layout did not change between schema versions.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyndesisStatus {
    pub phase: SyndesisPhase,

    #[serde(skip_serializing_if = "is_zero")]
    pub upgrade_attempts: i32,

    /// Requests another upgrade attempt after the upgrade failed too often
    pub force_upgrade: bool,

    pub reason: SyndesisStatusReason,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Installed product version
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub target_version: String,
}

fn is_zero(value: &i32) -> bool {
    *value == 0
}

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("object has no apiVersion"))]
    MissingApiVersion,

    #[snafu(display("failed to parse apiVersion"))]
    ParseApiVersion { source: SyndesisVersionParseError },

    #[snafu(display("object is a {kind:?}, not a {KIND}"))]
    UnsupportedKind { kind: String },

    #[snafu(display("failed to decode object as {version}"))]
    DecodeObject {
        source: serde_json::Error,
        version: SyndesisVersion,
    },
}

/// A `Syndesis` object in whichever schema version it was persisted with
#[derive(Clone, Debug, PartialEq)]
pub enum VersionedSyndesis {
    V1Alpha1(v1alpha1::Syndesis),
    V1Beta1(v1beta1::Syndesis),
    V1Beta2(v1beta2::Syndesis),
}

impl VersionedSyndesis {
    /// Decodes a generic object into the typed shape named by its `apiVersion`
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, Error> {
        let version = value
            .get("apiVersion")
            .and_then(serde_json::Value::as_str)
            .context(MissingApiVersionSnafu)?
            .parse::<SyndesisVersion>()
            .context(ParseApiVersionSnafu)?;

        // Objects without a kind are accepted, a different kind is a caller bug
        if let Some(kind) = value.get("kind").and_then(serde_json::Value::as_str) {
            ensure!(kind == KIND, UnsupportedKindSnafu { kind });
        }

        let decoded = match version {
            SyndesisVersion::V1Alpha1 => serde_json::from_value(value).map(Self::V1Alpha1),
            SyndesisVersion::V1Beta1 => serde_json::from_value(value).map(Self::V1Beta1),
            SyndesisVersion::V1Beta2 => serde_json::from_value(value).map(Self::V1Beta2),
        };
        decoded.context(DecodeObjectSnafu { version })
    }

    pub fn version(&self) -> SyndesisVersion {
        match self {
            Self::V1Alpha1(_) => SyndesisVersion::V1Alpha1,
            Self::V1Beta1(_) => SyndesisVersion::V1Beta1,
            Self::V1Beta2(_) => SyndesisVersion::V1Beta2,
        }
    }

    /// Brings the object to the newest schema version.
    ///
    /// `destination` is the caller's view of the same object in the newest version. It is returned unchanged when
    /// the source is not eligible for migration. Objects that already are in the newest version are returned as is.
    pub fn migrate_to_latest(self, destination: v1beta2::Syndesis) -> v1beta2::Syndesis {
        match self {
            Self::V1Alpha1(source) => source.migrate(destination),
            Self::V1Beta1(source) => source.migrate(destination),
            Self::V1Beta2(source) => source,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;
    use strum::IntoEnumIterator;

    use super::*;

    #[rstest]
    #[case("syndesis.io/v1alpha1", SyndesisVersion::V1Alpha1)]
    #[case("syndesis.io/v1beta1", SyndesisVersion::V1Beta1)]
    #[case("syndesis.io/v1beta2", SyndesisVersion::V1Beta2)]
    fn valid_version(#[case] input: &str, #[case] expected: SyndesisVersion) {
        let version: SyndesisVersion = input.parse().expect("valid Syndesis api version");
        assert_eq!(version, expected);
        assert_eq!(version.to_string(), input);
    }

    #[rstest]
    #[case("v1beta2", SyndesisVersionParseError::MissingGroup { input: "v1beta2".to_string() })]
    #[case("camel.apache.org/v1beta2", SyndesisVersionParseError::UnknownGroup { group: "camel.apache.org".to_string() })]
    #[case("syndesis.io/v2", SyndesisVersionParseError::UnknownVersion { version: "v2".to_string() })]
    fn invalid_version(#[case] input: &str, #[case] error: SyndesisVersionParseError) {
        let err = input
            .parse::<SyndesisVersion>()
            .expect_err("invalid Syndesis api version");
        assert_eq!(err, error);
    }

    #[test]
    fn merged_crd_serves_every_version() {
        let crd = SyndesisVersion::merged_crd(SyndesisVersion::LATEST).unwrap();
        assert_eq!(crd.spec.group, GROUP);
        assert_eq!(crd.spec.names.kind, KIND);

        let versions: Vec<_> = crd
            .spec
            .versions
            .iter()
            .map(|version| (version.name.as_str(), version.served, version.storage))
            .collect();
        assert_eq!(
            versions,
            [
                ("v1alpha1", true, false),
                ("v1beta1", true, false),
                ("v1beta2", true, true),
            ]
        );
    }

    #[test]
    fn versions_are_ordered() {
        let versions: Vec<_> = SyndesisVersion::iter().collect();
        assert!(versions.is_sorted());
        assert_eq!(versions.last(), Some(&SyndesisVersion::LATEST));
    }

    #[test]
    fn empty_objects_of_any_version_decode_to_empty_latest() {
        let objects = [
            serde_json::to_value(v1alpha1::Syndesis::default()).unwrap(),
            serde_json::to_value(v1beta1::Syndesis::default()).unwrap(),
            serde_json::to_value(v1beta2::Syndesis::default()).unwrap(),
        ];

        for (object, version) in objects.into_iter().zip(SyndesisVersion::iter()) {
            let decoded = VersionedSyndesis::from_json_value(object).unwrap();
            assert_eq!(decoded.version(), version);
            assert_eq!(
                decoded.migrate_to_latest(v1beta2::Syndesis::default()),
                v1beta2::Syndesis::default()
            );
        }
    }

    #[test]
    fn populated_latest_object_is_kept() {
        let object = json!({
            "apiVersion": "syndesis.io/v1beta2",
            "kind": "Syndesis",
            "metadata": { "name": "app", "namespace": "syndesis" },
            "spec": {
                "components": { "server": { "resources": { "limit": { "memory": "800Mi" } } } }
            }
        });

        let migrated = VersionedSyndesis::from_json_value(object)
            .unwrap()
            .migrate_to_latest(v1beta2::Syndesis::default());
        assert_eq!(
            migrated.spec.components.server.resources.limit.memory,
            "800Mi"
        );
        assert_eq!(migrated.metadata.name.as_deref(), Some("app"));
    }

    #[test]
    fn missing_api_version_is_rejected() {
        let err = VersionedSyndesis::from_json_value(json!({ "kind": "Syndesis" })).unwrap_err();
        assert!(matches!(err, Error::MissingApiVersion));
    }

    #[test]
    fn other_kind_is_rejected() {
        let err = VersionedSyndesis::from_json_value(json!({
            "apiVersion": "syndesis.io/v1beta2",
            "kind": "Integration",
        }))
        .unwrap_err();
        assert!(matches!(err, Error::UnsupportedKind { kind } if kind == "Integration"));
    }

    #[test]
    fn mismatched_shape_is_a_decode_error() {
        let err = VersionedSyndesis::from_json_value(json!({
            "apiVersion": "syndesis.io/v1alpha1",
            "kind": "Syndesis",
            "metadata": {},
            "spec": { "addons": { "ops": "enabled" } }
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            Error::DecodeObject {
                version: SyndesisVersion::V1Alpha1,
                ..
            }
        ));
    }
}
