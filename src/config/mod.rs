use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::report::ReportFormat;

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub ui: UiConfig,
    pub storage: StorageConfig,
    pub report: ReportConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UiConfig {
    pub color: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub scope_todos_by_user: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportConfig {
    pub default_format: ReportFormat,
    pub output_dir: PathBuf,
    pub results_dir: PathBuf,
}

impl EffectiveConfig {
    pub fn defaults(home_dir: &Path) -> Self {
        Self {
            ui: UiConfig { color: true },
            storage: StorageConfig {
                data_dir: home_dir.join(".local/share/todokit"),
                scope_todos_by_user: false,
            },
            report: ReportConfig {
                default_format: ReportFormat::Html,
                output_dir: PathBuf::from("."),
                results_dir: PathBuf::from("test-results"),
            },
            config_path: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    ui: Option<RawUiConfig>,
    storage: Option<RawStorageConfig>,
    report: Option<RawReportConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawUiConfig {
    color: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStorageConfig {
    data_dir: Option<PathBuf>,
    scope_todos_by_user: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReportConfig {
    default_format: Option<ReportFormat>,
    output_dir: Option<PathBuf>,
    results_dir: Option<PathBuf>,
}

pub fn default_config_path(home_dir: &Path) -> PathBuf {
    home_dir.join(".config/todokit/config.toml")
}

/// Defaults, then the TOML file (when present), then `TODOKIT_*`
/// environment overrides. A relative `data_dir` in the file is resolved
/// against the file's directory.
pub fn load(config_path: Option<&Path>, home_dir: &Path) -> Result<EffectiveConfig> {
    let mut cfg = EffectiveConfig::defaults(home_dir);

    let path = config_path
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| default_config_path(home_dir));

    if path.exists() {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let raw: RawConfig = toml::from_str(&s)
            .with_context(|| format!("failed to parse config file (TOML): {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        apply_raw_config(&mut cfg, raw, base);
        cfg.config_path = Some(path.display().to_string());
    } else if config_path.is_some() {
        anyhow::bail!("config file not found: {}", path.display());
    }

    apply_env_overrides(&mut cfg)?;

    Ok(cfg)
}

/// Relative paths in the file are taken relative to the file's directory.
fn apply_raw_config(cfg: &mut EffectiveConfig, raw: RawConfig, base: &Path) {
    if let Some(ui) = raw.ui {
        if let Some(color) = ui.color {
            cfg.ui.color = color;
        }
    }

    if let Some(storage) = raw.storage {
        if let Some(data_dir) = storage.data_dir {
            cfg.storage.data_dir = base.join(data_dir);
        }
        if let Some(scope) = storage.scope_todos_by_user {
            cfg.storage.scope_todos_by_user = scope;
        }
    }

    if let Some(report) = raw.report {
        if let Some(default_format) = report.default_format {
            cfg.report.default_format = default_format;
        }
        if let Some(output_dir) = report.output_dir {
            cfg.report.output_dir = base.join(output_dir);
        }
        if let Some(results_dir) = report.results_dir {
            cfg.report.results_dir = base.join(results_dir);
        }
    }
}

fn apply_env_overrides(cfg: &mut EffectiveConfig) -> Result<()> {
    if let Ok(v) = std::env::var("TODOKIT_UI_COLOR") {
        cfg.ui.color = parse_bool(&v).with_context(|| "TODOKIT_UI_COLOR")?;
    }
    if let Some(v) = non_blank_env("TODOKIT_DATA_DIR") {
        cfg.storage.data_dir = PathBuf::from(v);
    }
    if let Ok(v) = std::env::var("TODOKIT_SCOPE_TODOS_BY_USER") {
        cfg.storage.scope_todos_by_user =
            parse_bool(&v).with_context(|| "TODOKIT_SCOPE_TODOS_BY_USER")?;
    }
    if let Ok(v) = std::env::var("TODOKIT_REPORT_FORMAT") {
        cfg.report.default_format = v
            .parse::<ReportFormat>()
            .map_err(anyhow::Error::msg)
            .with_context(|| "TODOKIT_REPORT_FORMAT")?;
    }
    if let Some(v) = non_blank_env("TODOKIT_REPORT_OUTPUT_DIR") {
        cfg.report.output_dir = PathBuf::from(v);
    }
    if let Some(v) = non_blank_env("TODOKIT_REPORT_RESULTS_DIR") {
        cfg.report.results_dir = PathBuf::from(v);
    }

    Ok(())
}

fn non_blank_env(name: &str) -> Option<String> {
    let v = std::env::var(name).ok()?;
    let v = v.trim();
    if v.is_empty() {
        None
    } else {
        Some(v.to_string())
    }
}

fn parse_bool(s: &str) -> Result<bool> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow::anyhow!(
            "invalid boolean: {s} (expected true|false|1|0|yes|no|on|off)"
        )),
    }
}
