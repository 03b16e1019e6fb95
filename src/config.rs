use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_ENV_PREFIX: &str = "FEED_ACTIONS";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub ui: UIConfig,
    #[serde(default)]
    pub messages: MessagesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Raw cookie header seeded into the session jar.
    #[serde(default)]
    pub cookie: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            cookie: String::new(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000/".into()
}

fn default_user_agent() -> String {
    format!("feed-actions/{}", crate::VERSION)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointsConfig {
    #[serde(default = "default_like_endpoint")]
    pub like: String,
    #[serde(default = "default_delete_post_endpoint")]
    pub delete_post: String,
    #[serde(default = "default_delete_comment_endpoint")]
    pub delete_comment: String,
    #[serde(default = "default_change_password_endpoint")]
    pub change_password: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            like: default_like_endpoint(),
            delete_post: default_delete_post_endpoint(),
            delete_comment: default_delete_comment_endpoint(),
            change_password: default_change_password_endpoint(),
        }
    }
}

fn default_like_endpoint() -> String {
    "/feed/like/".into()
}

fn default_delete_post_endpoint() -> String {
    "/feed/delete_post/".into()
}

fn default_delete_comment_endpoint() -> String {
    "/feed/delete_comment/".into()
}

fn default_change_password_endpoint() -> String {
    "/authentication/profile/password/".into()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UIConfig {
    #[serde(default = "default_liked_class")]
    pub liked_class: String,
    #[serde(default = "default_positive_status_class")]
    pub positive_status_class: String,
    #[serde(default = "default_negative_status_class")]
    pub negative_status_class: String,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            liked_class: default_liked_class(),
            positive_status_class: default_positive_status_class(),
            negative_status_class: default_negative_status_class(),
        }
    }
}

fn default_liked_class() -> String {
    "red-text".into()
}

fn default_positive_status_class() -> String {
    "light-green accent-3".into()
}

fn default_negative_status_class() -> String {
    "red accent-4".into()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessagesConfig {
    #[serde(default = "default_remove_post_failed")]
    pub remove_post_failed: String,
    #[serde(default = "default_remove_comment_failed")]
    pub remove_comment_failed: String,
    #[serde(default = "default_like_failed")]
    pub like_failed: String,
    #[serde(default = "default_password_changed")]
    pub password_changed: String,
    #[serde(default = "default_password_rejected")]
    pub password_rejected: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            remove_post_failed: default_remove_post_failed(),
            remove_comment_failed: default_remove_comment_failed(),
            like_failed: default_like_failed(),
            password_changed: default_password_changed(),
            password_rejected: default_password_rejected(),
        }
    }
}

fn default_remove_post_failed() -> String {
    "Não foi possível remover a publicação!".into()
}

fn default_remove_comment_failed() -> String {
    "Não foi possível remover o comentário!".into()
}

fn default_like_failed() -> String {
    "Não foi possível curtir a publicação!".into()
}

fn default_password_changed() -> String {
    "Senha alterada com sucesso!".into()
}

fn default_password_rejected() -> String {
    "Verifique os dados informados!".into()
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub config_file: Option<PathBuf>,
    pub env_prefix: Option<String>,
}

pub fn load(options: LoadOptions) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(path) = options.config_file.as_ref() {
        let from_file = read_config_file(path)?;
        cfg = merge_config(cfg, from_file);
    } else if let Some(default_path) = default_config_path() {
        if default_path.exists() {
            let from_file = read_config_file(&default_path)?;
            cfg = merge_config(cfg, from_file);
        }
    }

    let prefix = options.env_prefix.as_deref().unwrap_or(DEFAULT_ENV_PREFIX);
    cfg = merge_env(cfg, prefix);

    Ok(cfg)
}

fn read_config_file(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&data)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
    Ok(config)
}

fn merge_config(mut base: Config, other: Config) -> Config {
    if !other.server.base_url.is_empty() {
        base.server.base_url = other.server.base_url;
    }
    if !other.server.user_agent.is_empty() {
        base.server.user_agent = other.server.user_agent;
    }
    if !other.server.cookie.is_empty() {
        base.server.cookie = other.server.cookie;
    }

    merge_string(&mut base.endpoints.like, other.endpoints.like);
    merge_string(&mut base.endpoints.delete_post, other.endpoints.delete_post);
    merge_string(
        &mut base.endpoints.delete_comment,
        other.endpoints.delete_comment,
    );
    merge_string(
        &mut base.endpoints.change_password,
        other.endpoints.change_password,
    );

    merge_string(&mut base.ui.liked_class, other.ui.liked_class);
    merge_string(
        &mut base.ui.positive_status_class,
        other.ui.positive_status_class,
    );
    merge_string(
        &mut base.ui.negative_status_class,
        other.ui.negative_status_class,
    );

    merge_string(
        &mut base.messages.remove_post_failed,
        other.messages.remove_post_failed,
    );
    merge_string(
        &mut base.messages.remove_comment_failed,
        other.messages.remove_comment_failed,
    );
    merge_string(&mut base.messages.like_failed, other.messages.like_failed);
    merge_string(
        &mut base.messages.password_changed,
        other.messages.password_changed,
    );
    merge_string(
        &mut base.messages.password_rejected,
        other.messages.password_rejected,
    );

    base
}

fn merge_string(target: &mut String, value: String) {
    if !value.is_empty() {
        *target = value;
    }
}

// Only keys actually present in the environment are applied, so defaults
// never clobber values that came from the file.
fn merge_env(mut cfg: Config, prefix: &str) -> Config {
    let mut map: HashMap<String, String> = HashMap::new();
    let upper_prefix = format!("{}_", prefix.to_uppercase());

    for (key, value) in env::vars() {
        if let Some(stripped) = key.strip_prefix(&upper_prefix) {
            let normalized = stripped.to_ascii_lowercase().replace("__", ".");
            map.insert(normalized, value);
        }
    }

    for (key, value) in map {
        apply_env_value(&mut cfg, &key, value);
    }

    cfg
}

fn apply_env_value(cfg: &mut Config, key: &str, value: String) {
    match key {
        "server.base_url" => cfg.server.base_url = value,
        "server.user_agent" => cfg.server.user_agent = value,
        "server.cookie" => cfg.server.cookie = value,
        "endpoints.like" => cfg.endpoints.like = value,
        "endpoints.delete_post" => cfg.endpoints.delete_post = value,
        "endpoints.delete_comment" => cfg.endpoints.delete_comment = value,
        "endpoints.change_password" => cfg.endpoints.change_password = value,
        "ui.liked_class" => cfg.ui.liked_class = value,
        "ui.positive_status_class" => cfg.ui.positive_status_class = value,
        "ui.negative_status_class" => cfg.ui.negative_status_class = value,
        "messages.remove_post_failed" => cfg.messages.remove_post_failed = value,
        "messages.remove_comment_failed" => cfg.messages.remove_comment_failed = value,
        "messages.like_failed" => cfg.messages.like_failed = value,
        "messages.password_changed" => cfg.messages.password_changed = value,
        "messages.password_rejected" => cfg.messages.password_rejected = value,
        _ => {}
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("feed-actions").join("config.yaml"))
}
