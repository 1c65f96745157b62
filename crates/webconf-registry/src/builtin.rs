//! Built-in option table.

use serde_json::json;

use crate::option::{OptionKind, OptionScope, OptionSpec};

/// Name of the option that names an application group explicitly.
pub const APP_GROUP_NAME: &str = "app_group_name";

/// Name of the option that sets the application root.
pub const APP_ROOT: &str = "app_root";

/// Name of the option that sets the application environment.
pub const ENVIRONMENT: &str = "environment";

/// The options the application server module understands.
pub fn builtin_options() -> Vec<OptionSpec> {
    use OptionKind::*;
    use OptionScope::*;

    vec![
        // Global
        OptionSpec::with_static("max_pool_size", Global, UnsignedInteger, json!(6)),
        OptionSpec::with_static("pool_idle_time", Global, UnsignedInteger, json!(300)),
        OptionSpec::with_static("default_user", Global, String, json!("nobody")),
        OptionSpec::with_dynamic(
            "default_group",
            Global,
            String,
            "The primary group of default_user",
        ),
        OptionSpec::with_static("show_version_in_header", Global, Boolean, json!(true)),
        OptionSpec::with_static("abort_on_startup_error", Global, Boolean, json!(false)),
        OptionSpec::with_static("log_level", Global, Integer, json!(3)),
        OptionSpec::with_dynamic("log_file", Global, Path, "The web server's global error log"),
        OptionSpec::with_dynamic(
            "instance_registry_dir",
            Global,
            Path,
            "Either /var/run/webconf-instreg or $TMPDIR",
        ),
        OptionSpec::with_static("disable_security_update_check", Global, Boolean, json!(false)),
        // Application
        OptionSpec::with_dynamic(
            APP_ROOT,
            Application,
            Path,
            "The parent directory of the associated virtual host's root directory",
        ),
        OptionSpec::with_dynamic(
            APP_GROUP_NAME,
            Application,
            String,
            "The app root, followed by the environment name in parentheses",
        ),
        OptionSpec::with_static(ENVIRONMENT, Application, String, json!("production")),
        OptionSpec::with_dynamic("app_type", Application, String, "Autodetected"),
        OptionSpec::with_dynamic("startup_file", Application, Path, "Autodetected"),
        OptionSpec::with_dynamic(
            "user",
            Application,
            String,
            "The owner of the application's startup file",
        ),
        OptionSpec::with_static("min_instances", Application, UnsignedInteger, json!(1)),
        OptionSpec::with_static(
            "max_preloader_idle_time",
            Application,
            UnsignedInteger,
            json!(300),
        ),
        OptionSpec::with_static("restart_dir", Application, Path, json!("tmp")),
        OptionSpec::with_static("load_shell_envvars", Application, Boolean, json!(true)),
        OptionSpec::with_static("env_vars", Application, KeyValueTable, json!({})),
        // Location
        OptionSpec::with_static("enabled", Location, Boolean, json!(false)),
        OptionSpec::with_static("base_uris", Location, StringArray, json!([])),
        OptionSpec::with_static("friendly_error_pages", Location, Boolean, json!(false)),
        OptionSpec::with_static("max_request_queue_size", Location, UnsignedInteger, json!(100)),
        OptionSpec::with_static(
            "request_queue_overflow_status_code",
            Location,
            UnsignedInteger,
            json!(503),
        ),
        OptionSpec::with_static("buffer_response", Location, Boolean, json!(false)),
        OptionSpec::with_static("sticky_sessions", Location, Boolean, json!(false)),
        OptionSpec::with_static("pass_headers", Location, StringArray, json!([])),
        OptionSpec::with_static("set_headers", Location, KeyValueTable, json!({})),
    ]
}
