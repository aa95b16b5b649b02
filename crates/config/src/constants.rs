//! Fixed names and defaults shared by the configuration layer

pub const CENTRAL_ID: &str = "central";
pub const CENTRAL_URL: &str = "https://repo1.maven.org/maven2/";

/// Directory under the config dir holding `config.toml`
pub const CONFIG_DIR_NAME: &str = "pkgrepo";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default local repository, relative to the user's home directory
pub const DEFAULT_LOCAL_REPO: &str = ".cache/pkgrepo";

pub const DEFAULT_SCOPE: &str = "runtime";

pub const USER_AGENT: &str = concat!("pkgrepo/", env!("CARGO_PKG_VERSION"));

pub const ENV_LOCAL_REPO: &str = "PKGREPO_LOCAL_REPO";
pub const ENV_SCOPES: &str = "PKGREPO_SCOPES";
pub const ENV_RETRIES: &str = "PKGREPO_RETRIES";
pub const ENV_TIMEOUT: &str = "PKGREPO_TIMEOUT";
pub const ENV_PARALLEL_DOWNLOADS: &str = "PKGREPO_PARALLEL_DOWNLOADS";
