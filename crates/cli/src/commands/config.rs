use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use toml::Value;

use wasteflow_core::config::{AppConfig, LoadOptions};

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    let fields: [(&str, String, Option<&str>); 8] = [
        ("database.url", config.database.url.clone(), Some("WASTEFLOW_DATABASE_URL")),
        (
            "database.max_connections",
            config.database.max_connections.to_string(),
            Some("WASTEFLOW_DATABASE_MAX_CONNECTIONS"),
        ),
        (
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            Some("WASTEFLOW_DATABASE_TIMEOUT_SECS"),
        ),
        (
            "catalog.service_category",
            config.catalog.service_category.clone(),
            Some("WASTEFLOW_CATALOG_SERVICE_CATEGORY"),
        ),
        (
            "catalog.service_uom",
            config.catalog.service_uom.clone(),
            Some("WASTEFLOW_CATALOG_SERVICE_UOM"),
        ),
        (
            "catalog.reference_uom",
            config.catalog.reference_uom.clone(),
            Some("WASTEFLOW_CATALOG_REFERENCE_UOM"),
        ),
        ("logging.level", config.logging.level.clone(), Some("WASTEFLOW_LOGGING_LEVEL")),
        (
            "logging.format",
            format!("{:?}", config.logging.format).to_lowercase(),
            Some("WASTEFLOW_LOGGING_FORMAT"),
        ),
    ];

    for (field, value, env_var) in fields {
        lines.push(render_line(
            field,
            &value,
            field_source(field, env_var, config_file_doc.as_ref(), config_file_path.as_deref()),
        ));
    }

    lines.join("\n")
}

fn render_line(field: &str, value: &str, source: String) -> String {
    format!("- {field} = {value} ({source})")
}

fn field_source(
    field: &str,
    env_var: Option<&str>,
    doc: Option<&Value>,
    path: Option<&Path>,
) -> String {
    if let Some(var) = env_var {
        if env::var(var).map(|value| !value.trim().is_empty()).unwrap_or(false) {
            return format!("env:{var}");
        }
    }

    if let (Some(doc), Some(path)) = (doc, path) {
        if lookup_dotted(doc, field).is_some() {
            return format!("file:{}", path.display());
        }
    }

    "default".to_string()
}

fn lookup_dotted<'doc>(doc: &'doc Value, field: &str) -> Option<&'doc Value> {
    field.split('.').try_fold(doc, |value, key| value.get(key))
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("wasteflow.toml"), PathBuf::from("config/wasteflow.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}
