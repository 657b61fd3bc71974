use crate::annotations::focus_region::DEFAULT_FOCUS_RADIUS;
use crate::diagnosis::message::Language;
use crate::inference::hosted_model::{
    DEFAULT_API_URL, DEFAULT_MODEL_ID, DEFAULT_TIMEOUT, HostedModelClient,
};
use crate::overlay::renderer::OverlayRenderer;
use crate::overlay::style::OverlayStyle;
use crate::records::record_log::{DEFAULT_RECORDS_PATH, RecordLog};
use anyhow::{Result, anyhow};
use image::Rgb;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV: &str = "CAVITY_CONFIG";

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct AppConfigFile {
    inference: Option<InferenceConfigFile>,
    overlay: Option<OverlayConfigFile>,
    focus: Option<FocusConfigFile>,
    records: Option<RecordsConfigFile>,
    speech: Option<SpeechConfigFile>,
    mail: Option<MailConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct InferenceConfigFile {
    api_url: Option<String>,
    model_id: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct OverlayConfigFile {
    color: Option<[u8; 3]>,
    line_width: Option<u32>,
    label_offset: Option<i32>,
    label_scale: Option<f32>,
    font_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
struct FocusConfigFile {
    radius: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct RecordsConfigFile {
    path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
struct SpeechConfigFile {
    language: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct MailConfigFile {
    sender: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub inference: InferenceSettings,
    pub overlay: OverlaySettings,
    pub focus_radius: f32,
    pub records_path: PathBuf,
    pub language: Language,
    pub mail_sender: Option<String>,
}

#[derive(Clone)]
pub struct InferenceSettings {
    pub api_url: String,
    pub model_id: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl std::fmt::Debug for InferenceSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceSettings")
            .field("api_url", &self.api_url)
            .field("model_id", &self.model_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct OverlaySettings {
    pub style: OverlayStyle,
    pub font_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            inference: InferenceSettings {
                api_url: DEFAULT_API_URL.to_string(),
                model_id: DEFAULT_MODEL_ID.to_string(),
                api_key: None,
                timeout: DEFAULT_TIMEOUT,
            },
            overlay: OverlaySettings {
                style: OverlayStyle::default(),
                font_path: None,
            },
            focus_radius: DEFAULT_FOCUS_RADIUS,
            records_path: PathBuf::from(DEFAULT_RECORDS_PATH),
            language: Language::default(),
            mail_sender: None,
        }
    }
}

impl AppConfig {
    /// Reads the TOML file at `path` (or at `$CAVITY_CONFIG` when no path is given), applies
    /// `CAVITY_*` environment overrides and validates the result. Without any file the
    /// defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var(CONFIG_ENV).ok().filter(|p| !p.trim().is_empty());
        let config_path = path
            .map(Path::to_path_buf)
            .or_else(|| env_path.map(PathBuf::from));
        let file_cfg = match config_path.as_deref() {
            Some(path) => read_config_file(path)?,
            None => AppConfigFile::default(),
        };
        let mut cfg = Self::from_file(file_cfg)?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parses and validates a TOML document without looking at the environment.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: AppConfigFile =
            toml::from_str(raw).map_err(|e| anyhow!("invalid config: {}", e))?;
        let cfg = Self::from_file(file)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: AppConfigFile) -> Result<Self> {
        let defaults = AppConfig::default();
        let inference = file.inference.unwrap_or_default();
        let overlay = file.overlay.unwrap_or_default();
        let default_style = defaults.overlay.style;
        let language = match file.speech.and_then(|speech| speech.language) {
            Some(code) => code.parse::<Language>().map_err(|e| anyhow!(e))?,
            None => defaults.language,
        };
        Ok(Self {
            inference: InferenceSettings {
                api_url: inference.api_url.unwrap_or(defaults.inference.api_url),
                model_id: inference.model_id.unwrap_or(defaults.inference.model_id),
                api_key: inference.api_key,
                timeout: inference
                    .timeout_secs
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.inference.timeout),
            },
            overlay: OverlaySettings {
                style: OverlayStyle {
                    color: overlay.color.map(Rgb).unwrap_or(default_style.color),
                    line_width: overlay.line_width.unwrap_or(default_style.line_width),
                    label_offset: overlay.label_offset.unwrap_or(default_style.label_offset),
                    label_scale: overlay.label_scale.unwrap_or(default_style.label_scale),
                },
                font_path: overlay.font_path,
            },
            focus_radius: file
                .focus
                .and_then(|focus| focus.radius)
                .unwrap_or(defaults.focus_radius),
            records_path: file
                .records
                .and_then(|records| records.path)
                .unwrap_or(defaults.records_path),
            language,
            mail_sender: file.mail.and_then(|mail| mail.sender),
        })
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("CAVITY_API_URL") {
            if !url.trim().is_empty() {
                self.inference.api_url = url;
            }
        }
        if let Ok(model_id) = std::env::var("CAVITY_MODEL_ID") {
            if !model_id.trim().is_empty() {
                self.inference.model_id = model_id;
            }
        }
        if let Ok(key) = std::env::var("CAVITY_API_KEY") {
            if !key.trim().is_empty() {
                self.inference.api_key = Some(key);
            }
        }
        if let Ok(path) = std::env::var("CAVITY_RECORDS_PATH") {
            if !path.trim().is_empty() {
                self.records_path = PathBuf::from(path);
            }
        }
        if let Ok(radius) = std::env::var("CAVITY_FOCUS_RADIUS") {
            self.focus_radius = radius
                .trim()
                .parse()
                .map_err(|_| anyhow!("CAVITY_FOCUS_RADIUS must be a number of pixels"))?;
        }
        if let Ok(language) = std::env::var("CAVITY_LANGUAGE") {
            if !language.trim().is_empty() {
                self.language = language.parse().map_err(|e: String| anyhow!(e))?;
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !(self.focus_radius.is_finite() && self.focus_radius > 0.0) {
            return Err(anyhow!(
                "focus radius must be a positive number of pixels, got {}",
                self.focus_radius
            ));
        }
        if self.overlay.style.line_width == 0 {
            return Err(anyhow!("overlay line width must be greater than zero"));
        }
        if !(self.overlay.style.label_scale > 0.0) {
            return Err(anyhow!("overlay label scale must be greater than zero"));
        }
        if self.inference.timeout.is_zero() {
            return Err(anyhow!("inference timeout must be greater than zero"));
        }
        if self.inference.api_url.trim().is_empty() || self.inference.model_id.trim().is_empty() {
            return Err(anyhow!("inference api_url and model_id must not be empty"));
        }
        Ok(())
    }

    /// The hosted detector client. Fails when no API key has been configured.
    pub fn hosted_client(&self) -> Result<HostedModelClient> {
        let api_key = self.inference.api_key.as_deref().ok_or_else(|| {
            anyhow!("no inference API key configured; set [inference] api_key or CAVITY_API_KEY")
        })?;
        Ok(HostedModelClient::new(
            &self.inference.api_url,
            &self.inference.model_id,
            api_key,
            self.inference.timeout,
        ))
    }

    pub fn renderer(&self) -> OverlayRenderer {
        match &self.overlay.font_path {
            Some(path) => OverlayRenderer::with_font_file(self.overlay.style, path),
            None => OverlayRenderer::new(self.overlay.style),
        }
    }

    pub fn record_log(&self) -> RecordLog {
        RecordLog::new(&self.records_path)
    }
}

fn read_config_file(path: &Path) -> Result<AppConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = toml::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = AppConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.inference.api_url, "https://serverless.roboflow.com");
        assert_eq!(cfg.inference.model_id, "cavity-73rfa/3");
        assert_eq!(cfg.inference.api_key, None);
        assert_eq!(cfg.inference.timeout, Duration::from_secs(30));
        assert_eq!(cfg.focus_radius, 100.0);
        assert_eq!(cfg.records_path, PathBuf::from("patient_records.csv"));
        assert_eq!(cfg.language, Language::English);
        assert_eq!(cfg.overlay.style, OverlayStyle::default());
        assert!(cfg.hosted_client().is_err());
    }

    #[test]
    fn reads_every_section() {
        let cfg = AppConfig::from_toml_str(
            r#"
            [inference]
            api_url = "https://detect.example.test"
            model_id = "teeth/7"
            api_key = "abc"
            timeout_secs = 5

            [overlay]
            color = [0, 255, 0]
            line_width = 2
            label_offset = 14
            label_scale = 20.0

            [focus]
            radius = 75.5

            [records]
            path = "/var/lib/clinic/records.csv"

            [speech]
            language = "ta"

            [mail]
            sender = "clinic@example.com"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.inference.timeout, Duration::from_secs(5));
        assert_eq!(cfg.overlay.style.color, Rgb([0, 255, 0]));
        assert_eq!(cfg.overlay.style.line_width, 2);
        assert_eq!(cfg.overlay.style.label_offset, 14);
        assert_eq!(cfg.focus_radius, 75.5);
        assert_eq!(cfg.records_path, PathBuf::from("/var/lib/clinic/records.csv"));
        assert_eq!(cfg.language, Language::Tamil);
        assert_eq!(cfg.mail_sender.as_deref(), Some("clinic@example.com"));
        let client = cfg.hosted_client().unwrap();
        assert_eq!(client.endpoint(), "https://detect.example.test/teeth/7");
        assert!(!format!("{:?}", cfg.inference).contains("abc"));
    }

    #[test]
    fn rejects_non_positive_radius() {
        assert!(AppConfig::from_toml_str("[focus]\nradius = 0.0").is_err());
        assert!(AppConfig::from_toml_str("[focus]\nradius = -3.0").is_err());
    }

    #[test]
    fn rejects_bad_overlay_and_language() {
        assert!(AppConfig::from_toml_str("[overlay]\nline_width = 0").is_err());
        assert!(AppConfig::from_toml_str("[speech]\nlanguage = \"fr\"").is_err());
        assert!(AppConfig::from_toml_str("[inference]\ntimeout_secs = 0").is_err());
        assert!(AppConfig::from_toml_str("[unknown]\nx = 1").is_err());
    }
}
