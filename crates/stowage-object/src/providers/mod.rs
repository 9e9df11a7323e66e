//! Store connectors and credential sources.

mod oci;
mod profile;

pub use oci::{OciConnector, OciCredentials, config_keys};
pub use profile::{
    CONFIG_FILE_ENV, DEFAULT_PROFILE, default_config_path, load_profile, parse_profile,
};
