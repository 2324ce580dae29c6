//! Passwords and keys of an installation.
//!
//! They are read from the `syndesis-global-config` secret when it exists, and generated otherwise. Older
//! installations stored them as a `KEY=VALUE` blob under the `params` key, which is still understood.
use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::Secret;
use snafu::{OptionExt, ResultExt, Snafu};
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

use super::ConfigFragment;
use crate::secret_generator::SecretGenerator;

/// Name of the secret holding the generated passwords and keys
pub const SECRET_NAME: &str = "syndesis-global-config";

const LEGACY_PARAMS_KEY: &str = "params";

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("secret value {key:?} is not valid UTF-8"))]
    InvalidSecretValue {
        source: std::string::FromUtf8Error,
        key: String,
    },

    #[snafu(display("no configuration found in secret, it has neither {password_key:?} nor {LEGACY_PARAMS_KEY:?}"))]
    NoConfigurationFound { password_key: &'static str },
}

/// A password or key stored in the persisted secret
#[derive(Clone, Copy, Debug, EnumIter, IntoStaticStr, PartialEq, Eq)]
pub enum SecretField {
    #[strum(serialize = "OPENSHIFT_OAUTH_CLIENT_SECRET")]
    OauthClientSecret,
    #[strum(serialize = "POSTGRESQL_PASSWORD")]
    DatabasePassword,
    #[strum(serialize = "POSTGRESQL_SAMPLEDB_PASSWORD")]
    SampledbPassword,
    #[strum(serialize = "OAUTH_COOKIE_SECRET")]
    OauthCookieSecret,
    #[strum(serialize = "SYNDESIS_ENCRYPT_KEY")]
    EncryptKey,
    #[strum(serialize = "CLIENT_STATE_AUTHENTICATION_KEY")]
    ClientStateAuthenticationKey,
    #[strum(serialize = "CLIENT_STATE_ENCRYPTION_KEY")]
    ClientStateEncryptionKey,
}

impl SecretField {
    /// Key of the field in the persisted secret
    pub fn key(self) -> &'static str {
        self.into()
    }

    /// Length of a freshly generated value
    pub fn length(self) -> usize {
        match self {
            Self::OauthClientSecret | Self::EncryptKey => 64,
            Self::DatabasePassword | Self::SampledbPassword => 16,
            Self::OauthCookieSecret
            | Self::ClientStateAuthenticationKey
            | Self::ClientStateEncryptionKey => 32,
        }
    }

    fn slot(self, config: &mut ConfigFragment) -> &mut Option<String> {
        let components = &mut config.syndesis.components;
        match self {
            Self::OauthClientSecret => &mut config.open_shift_oauth_client_secret,
            Self::DatabasePassword => &mut components.database.password,
            Self::SampledbPassword => &mut components.database.sampledb_password,
            Self::OauthCookieSecret => &mut components.oauth.cookie_secret,
            Self::EncryptKey => &mut components.server.syndesis_encrypt_key,
            Self::ClientStateAuthenticationKey => &mut components.server.client_state_authentication_key,
            Self::ClientStateEncryptionKey => &mut components.server.client_state_encryption_key,
        }
    }
}

/// Copies the values of the persisted secret into `config`.
///
/// Fields the secret has no value for are reset to empty, and are generated later on.
pub fn apply_persisted_secret(config: &mut ConfigFragment, secret: &Secret) -> Result<(), Error> {
    let mut values = persisted_values(secret)?;
    for field in SecretField::iter() {
        *field.slot(config) = Some(values.remove(field.key()).unwrap_or_default());
    }
    Ok(())
}

fn persisted_values(secret: &Secret) -> Result<BTreeMap<String, String>, Error> {
    let empty = BTreeMap::new();
    let data = secret.data.as_ref().unwrap_or(&empty);
    let decode = |key: &str| {
        data.get(key)
            .map(|value| String::from_utf8(value.0.clone()).context(InvalidSecretValueSnafu { key }))
            .transpose()
    };

    let password_key = SecretField::DatabasePassword.key();
    if data.contains_key(password_key) {
        let mut values = BTreeMap::new();
        for field in SecretField::iter() {
            if let Some(value) = decode(field.key())? {
                values.insert(field.key().to_string(), value);
            }
        }
        Ok(values)
    } else {
        tracing::info!(
            secret.name = SECRET_NAME,
            "Secret has the legacy layout, reading values from {LEGACY_PARAMS_KEY:?}"
        );
        let params = decode(LEGACY_PARAMS_KEY)?.context(NoConfigurationFoundSnafu { password_key })?;
        Ok(parse_legacy_params(&params))
    }
}

/// Parses a newline separated list of `KEY=VALUE` pairs
pub fn parse_legacy_params(blob: &str) -> BTreeMap<String, String> {
    blob.lines()
        .map(|line| line.trim_matches([' ', '\r', '\t']))
        .filter(|line| !line.is_empty())
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Generates every password and key that is still empty.
///
/// Fields that already have a value are never touched, so calling this again is a no-op.
pub fn generate_missing(config: &mut ConfigFragment, generator: &SecretGenerator) {
    for field in SecretField::iter() {
        let slot = field.slot(config);
        if slot.as_deref().is_none_or(str::is_empty) {
            tracing::info!(secret.key = field.key(), "Generating missing secret value");
            *slot = Some(generator.generate(field.length()));
        }
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use k8s_openapi::ByteString;
    use rstest::rstest;

    use super::*;

    fn secret(entries: &[(&str, &str)]) -> Secret {
        Secret {
            data: Some(
                entries
                    .iter()
                    .map(|(key, value)| ((*key).to_string(), ByteString(value.as_bytes().to_vec())))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    fn values(config: &mut ConfigFragment) -> Vec<Option<String>> {
        SecretField::iter()
            .map(|field| field.slot(config).clone())
            .collect()
    }

    #[rstest]
    #[case(SecretField::OauthClientSecret, 64)]
    #[case(SecretField::DatabasePassword, 16)]
    #[case(SecretField::SampledbPassword, 16)]
    #[case(SecretField::OauthCookieSecret, 32)]
    #[case(SecretField::EncryptKey, 64)]
    #[case(SecretField::ClientStateAuthenticationKey, 32)]
    #[case(SecretField::ClientStateEncryptionKey, 32)]
    fn generated_values_have_fixed_length(#[case] field: SecretField, #[case] length: usize) {
        let mut config = ConfigFragment::default();
        generate_missing(&mut config, &SecretGenerator::with_seed(7));

        let value = field.slot(&mut config).clone().unwrap();
        assert_eq!(value.len(), length);
        assert!(value.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn generation_is_idempotent() {
        let generator = SecretGenerator::with_seed(7);
        let mut config = ConfigFragment::default();
        config.syndesis.components.database.password = Some("persisted".to_string());

        generate_missing(&mut config, &generator);
        let first = values(&mut config);
        generate_missing(&mut config, &generator);

        assert_eq!(values(&mut config), first);
        assert_eq!(
            config.syndesis.components.database.password.as_deref(),
            Some("persisted")
        );
    }

    #[test]
    fn empty_values_are_regenerated() {
        let mut config = ConfigFragment::default();
        config.syndesis.components.oauth.cookie_secret = Some(String::new());
        generate_missing(&mut config, &SecretGenerator::with_seed(7));
        assert_eq!(
            config.syndesis.components.oauth.cookie_secret.map(|value| value.len()),
            Some(32)
        );
    }

    #[test]
    fn current_layout_is_read_by_key() {
        let mut config = ConfigFragment::default();
        apply_persisted_secret(
            &mut config,
            &secret(&[
                ("POSTGRESQL_PASSWORD", "dbpassword"),
                ("OPENSHIFT_OAUTH_CLIENT_SECRET", "clientsecret"),
                ("params", "OAUTH_COOKIE_SECRET=ignored"),
            ]),
        )
        .unwrap();

        assert_eq!(
            config.syndesis.components.database.password.as_deref(),
            Some("dbpassword")
        );
        assert_eq!(
            config.open_shift_oauth_client_secret.as_deref(),
            Some("clientsecret")
        );
        assert_eq!(config.syndesis.components.oauth.cookie_secret.as_deref(), Some(""));
    }

    #[test]
    fn legacy_layout_is_read_from_params() {
        let params = indoc! {"
            OPENSHIFT_OAUTH_CLIENT_SECRET=clientsecret
              POSTGRESQL_PASSWORD=dbpassword\r
            POSTGRESQL_SAMPLEDB_PASSWORD=sample=db

            SYNDESIS_ENCRYPT_KEY=encrypt
            NOT_A_PAIR
        "};
        let mut config = ConfigFragment::default();
        apply_persisted_secret(&mut config, &secret(&[("params", params)])).unwrap();

        let components = &config.syndesis.components;
        assert_eq!(components.database.password.as_deref(), Some("dbpassword"));
        assert_eq!(
            components.database.sampledb_password.as_deref(),
            Some("sample=db")
        );
        assert_eq!(components.server.syndesis_encrypt_key.as_deref(), Some("encrypt"));
        assert_eq!(components.oauth.cookie_secret.as_deref(), Some(""));
    }

    #[test]
    fn secret_without_configuration_is_rejected() {
        let mut config = ConfigFragment::default();
        let err = apply_persisted_secret(&mut config, &secret(&[("unrelated", "value")])).unwrap_err();
        assert!(matches!(err, Error::NoConfigurationFound { .. }));

        let err = apply_persisted_secret(&mut config, &Secret::default()).unwrap_err();
        assert!(matches!(err, Error::NoConfigurationFound { .. }));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let mut config = ConfigFragment::default();
        let secret = Secret {
            data: Some(BTreeMap::from([(
                "POSTGRESQL_PASSWORD".to_string(),
                ByteString(vec![0xff, 0xfe]),
            )])),
            ..Default::default()
        };
        let err = apply_persisted_secret(&mut config, &secret).unwrap_err();
        assert!(matches!(err, Error::InvalidSecretValue { key, .. } if key == "POSTGRESQL_PASSWORD"));
    }

    #[rstest]
    #[case::plain("A=1\nB=2", &[("A", "1"), ("B", "2")])]
    #[case::value_with_equals("A=x=y", &[("A", "x=y")])]
    #[case::empty_value("A=", &[("A", "")])]
    #[case::blank_lines("\n \t\nA=1\r\n", &[("A", "1")])]
    #[case::no_separator("A", &[])]
    fn legacy_params(#[case] blob: &str, #[case] expected: &[(&str, &str)]) {
        let expected: BTreeMap<_, _> = expected
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        assert_eq!(parse_legacy_params(blob), expected);
    }
}
