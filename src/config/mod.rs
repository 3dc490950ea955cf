use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::Serialize;

use crate::paging::Limit;

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ConfigFile {
    pub container: Option<String>,
    pub hostname: Option<String>,
    pub action: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<Limit>,
    pub pager_length: Option<u64>,
    pub data_key: Option<String>,
    pub header_template: Option<String>,
    pub row_template: Option<String>,
    pub output: Option<String>,
    pub standalone: Option<bool>,
    pub title: Option<String>,
    pub timeout: Option<u64>,
    pub proxy: Option<String>,
    pub header: Option<String>,
    pub no_color: Option<bool>,
}

const DEFAULT_CONFIG_YAML: &str = r#"# Flipscroll config
#
# Location (default):
#   ~/.flipscroll/config.yml

# Endpoint (required)
# hostname: https://example.com/api
# action: users

# Paging
page: 1
limit: 10
pager_length: 5

# Rendering
# data_key: users
# header_template: "<tr><th>{id}</th><th>{name}</th></tr>"
# row_template: "<tr><td>{id}</td><td>{name}</td></tr>"

# Output (optional)
# output: ./table.html
# standalone: true
# title: Users

# HTTP (optional)
timeout: 60
# proxy: http://127.0.0.1:8080
# header: "Authorization: Bearer ..."

# Output styling
no_color: false
"#;

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

pub fn default_config_path() -> Option<PathBuf> {
    home_dir().map(|home| home.join(".flipscroll").join("config.yml"))
}

/// Expands a leading `~/` against the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

pub fn load_config(path: &Path, allow_missing: bool) -> Result<ConfigFile, String> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return if allow_missing {
                Ok(ConfigFile::default())
            } else {
                Err(format!("config file not found '{}'", path.display()))
            };
        }
        Err(e) => return Err(format!("failed to read config '{}': {e}", path.display())),
    };
    serde_yaml::from_str(&contents)
        .map_err(|e| format!("failed to parse config '{}': {e}", path.display()))
}

pub fn ensure_default_config_file(path: &Path) -> Result<(), String> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            format!(
                "failed to create config directory '{}': {e}",
                parent.display()
            )
        })?;
    }
    std::fs::write(path, DEFAULT_CONFIG_YAML)
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_yaml_parses_back() {
        let cfg: ConfigFile = serde_yaml::from_str(DEFAULT_CONFIG_YAML).unwrap();
        assert_eq!(cfg.page, Some(1));
        assert_eq!(cfg.limit, Some(Limit::Rows(10)));
        assert_eq!(cfg.pager_length, Some(5));
        assert_eq!(cfg.no_color, Some(false));
    }

    #[test]
    fn limit_accepts_all_and_counts() {
        let cfg: ConfigFile = serde_yaml::from_str("limit: all\n").unwrap();
        assert_eq!(cfg.limit, Some(Limit::All));
        let cfg: ConfigFile = serde_yaml::from_str("limit: 25\n").unwrap();
        assert_eq!(cfg.limit, Some(Limit::Rows(25)));
    }

    #[test]
    fn tilde_paths_only_expand_with_a_home() {
        if env::var_os("HOME").or_else(|| env::var_os("USERPROFILE")).is_some() {
            assert!(!expand_tilde("~/table.html").starts_with("~"));
        }
        assert_eq!(expand_tilde("./table.html"), PathBuf::from("./table.html"));
    }
}
