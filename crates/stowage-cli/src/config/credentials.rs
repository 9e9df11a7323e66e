//! Storage credential options.

use std::collections::HashMap;
use std::path::PathBuf;

use clap::Args;
use stowage_object::bootstrap::{Credentials, OciClientProvider};
use stowage_object::providers::config_keys;

/// Where storage credentials come from.
///
/// Passing `--region` selects explicit credentials; otherwise the profile
/// (default `DEFAULT`) is read from the OCI config file.
#[derive(Clone, Args)]
pub struct CredentialsConfig {
    /// OCI config file profile.
    #[arg(long, env = "STOWAGE_PROFILE", conflicts_with = "region")]
    pub profile: Option<String>,

    /// OCI config file (defaults to `$OCI_CONFIG_FILE` or `~/.oci/config`).
    #[arg(long, env = "STOWAGE_OCI_CONFIG_FILE")]
    pub oci_config_file: Option<PathBuf>,

    /// Region for explicit credentials (e.g. `us-ashburn-1`).
    #[arg(long, env = "STOWAGE_REGION")]
    pub region: Option<String>,

    /// Customer secret key access key.
    #[arg(long, env = "STOWAGE_ACCESS_KEY_ID", requires = "region")]
    pub access_key_id: Option<String>,

    /// Customer secret key secret.
    #[arg(
        long,
        env = "STOWAGE_SECRET_ACCESS_KEY",
        hide_env_values = true,
        requires = "region"
    )]
    pub secret_access_key: Option<String>,

    /// Endpoint override (e.g. `http://localhost:9000`).
    #[arg(long, env = "STOWAGE_ENDPOINT", requires = "region")]
    pub endpoint: Option<String>,
}

impl CredentialsConfig {
    /// Converts the options into loader credentials.
    pub fn to_credentials(&self) -> Credentials {
        let Some(region) = &self.region else {
            return Credentials::Profile(self.profile.clone());
        };

        let mut map = HashMap::from([(config_keys::REGION.to_owned(), region.clone())]);
        let optional = [
            (config_keys::ACCESS_KEY_ID, &self.access_key_id),
            (config_keys::SECRET_ACCESS_KEY, &self.secret_access_key),
            (config_keys::ENDPOINT, &self.endpoint),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                map.insert(key.to_owned(), value.clone());
            }
        }
        Credentials::Explicit(map)
    }

    /// Returns the client provider honoring `--oci-config-file`.
    pub fn client_provider(&self) -> OciClientProvider {
        match &self.oci_config_file {
            Some(path) => OciClientProvider::new().with_config_file(path),
            None => OciClientProvider::new(),
        }
    }

    /// Names the credential source for logging.
    pub fn source(&self) -> &'static str {
        if self.region.is_some() {
            "explicit"
        } else {
            "profile"
        }
    }
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("profile", &self.profile)
            .field("oci_config_file", &self.oci_config_file)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id.as_ref().map(|_| "***"))
            .field("secret_access_key", &self.secret_access_key.as_ref().map(|_| "***"))
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::config::Cli;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        let base = ["stowage", "--namespace", "ns", "--bucket", "docs"];
        Cli::try_parse_from(base.iter().chain(args))
    }

    #[test]
    fn profile_by_default() {
        let cli = parse(&[]).unwrap();
        assert_eq!(cli.credentials.to_credentials(), super::Credentials::Profile(None));

        let cli = parse(&["--profile", "ingest"]).unwrap();
        assert_eq!(
            cli.credentials.to_credentials(),
            super::Credentials::profile("ingest")
        );
    }

    #[test]
    fn explicit_with_region() {
        let cli = parse(&[
            "--region",
            "eu-frankfurt-1",
            "--access-key-id",
            "key",
            "--secret-access-key",
            "secret",
        ])
        .unwrap();

        let super::Credentials::Explicit(map) = cli.credentials.to_credentials() else {
            panic!("expected explicit credentials");
        };
        assert_eq!(map["region"], "eu-frankfurt-1");
        assert_eq!(map["secret_access_key"], "secret");
        assert!(!map.contains_key("endpoint"));
    }

    #[test]
    fn profile_conflicts_with_region() {
        assert!(parse(&["--profile", "a", "--region", "r"]).is_err());
    }

    #[test]
    fn keys_require_region() {
        assert!(parse(&["--access-key-id", "key"]).is_err());
    }

    #[test]
    fn debug_masks_secrets() {
        let cli = parse(&["--region", "r", "--secret-access-key", "hunter2"]).unwrap();
        assert!(!format!("{:?}", cli.credentials).contains("hunter2"));
    }
}
