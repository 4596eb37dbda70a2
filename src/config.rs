use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    net::{IpAddr, Ipv4Addr},
    path::{Path, PathBuf},
};

/// Tag names that receive an edit identifier when they hold literal text
pub const DEFAULT_EDITABLE_TAGS: &[&str] =
    &["a", "Button", "button", "p", "span", "h1", "h2", "h3", "h4"];

/// Tagger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, fieldwork::Fieldwork)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
#[fieldwork(get, set, with)]
pub struct TaggerConfig {
    /// Element names that are editable. Member-style names such as
    /// `motion.h1` match on their final segment.
    editable_tags: Vec<String>,
    /// Log every tagged element
    #[fieldwork(get(copy))]
    debug: bool,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            editable_tags: DEFAULT_EDITABLE_TAGS.iter().map(ToString::to_string).collect(),
            debug: false,
        }
    }
}

impl TaggerConfig {
    pub fn is_editable(&self, tag_name: &str) -> bool {
        self.editable_tags.iter().any(|tag| tag == tag_name)
    }
}

/// Development server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, fieldwork::Fieldwork)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
#[fieldwork(get(copy), set, with)]
pub struct ServerConfig {
    #[fieldwork(get(copy))]
    interface: IpAddr,
    port: u16,
    /// Number of tagged modules kept in memory
    module_cache_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 5174,
            module_cache_size: 50,
        }
    }
}

/// Browser overlay configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, fieldwork::Fieldwork)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
#[fieldwork(get, set, with)]
pub struct OverlayConfig {
    /// Parent-frame origins allowed to trigger saves
    allowed_parent_origins: Vec<String>,
    /// Endpoint saves are posted to
    apply_edit_url: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            allowed_parent_origins: vec!["http://localhost:4000".to_string()],
            apply_edit_url: "/api/apply-edit".to_string(),
        }
    }
}

impl OverlayConfig {
    pub fn is_allowed_origin(&self, origin: &str) -> bool {
        self.allowed_parent_origins.iter().any(|allowed| allowed == origin)
    }
}

/// Top-level configuration, loadable from a JSON file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, fieldwork::Fieldwork)]
#[serde(default, deny_unknown_fields)]
#[fieldwork(get, set, get_mut, with)]
pub struct Config {
    /// Project root that edit identifiers are relative to
    root: PathBuf,
    tagger: TaggerConfig,
    server: ServerConfig,
    overlay: OverlayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            tagger: TaggerConfig::default(),
            server: ServerConfig::default(),
            overlay: OverlayConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("invalid configuration in {}", path.display()))?;

        // a relative root in a config file is relative to the file itself
        if config.root.is_relative() {
            if let Some(parent) = path.parent() {
                let root = parent.join(&config.root);
                return Ok(config.with_root(root));
            }
        }

        Ok(config)
    }

    /// Canonical project root, resolving symlinks and `..`
    pub fn canonical_root(&self) -> Result<PathBuf> {
        let expanded = PathBuf::from(&*shellexpand::tilde(&self.root.to_string_lossy()));
        std::fs::canonicalize(&expanded)
            .with_context(|| format!("project root {} does not exist", expanded.display()))
    }
}
