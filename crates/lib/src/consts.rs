/// Application name, used in log areas and user-facing output.
pub const APP_NAME: &str = "cfgengine";

/// The only resource-definition document version this engine understands.
pub const RESOURCE_DEF_VERSION: &str = "1.0";

/// Default file name for the generated install script.
pub const INSTALL_SCRIPT_FILENAME: &str = "install.script";

/// Error report written next to the install script when a run fails.
pub const CONFIG_ERROR_FILENAME: &str = "config_error.json";

/// Log area used for everything emitted by the engine.
pub const LOG_AREA: &str = "Config";

/// Environment variable holding the CLI's tracing filter directives.
pub const LOG_ENV_VAR: &str = "CFGENGINE_LOG";
