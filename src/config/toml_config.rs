use crate::adapters::providers::{edx, mit_ocw, openstax};
use crate::utils::error::{LearnPathError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub providers: ProvidersConfig,
    pub llm: LlmConfig,
    pub ranking: RankingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            environment: "development".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub edx_endpoint: String,
    pub mit_ocw_endpoint: String,
    pub openstax_endpoint: String,
    pub enable_edx: bool,
    pub enable_mit_ocw: bool,
    pub enable_openstax: bool,
    pub enable_catalog: bool,
    pub page_size: u32,
    pub timeout_seconds: u64,
    pub max_results: usize,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            edx_endpoint: edx::DEFAULT_ENDPOINT.to_string(),
            mit_ocw_endpoint: mit_ocw::DEFAULT_ENDPOINT.to_string(),
            openstax_endpoint: openstax::DEFAULT_ENDPOINT.to_string(),
            enable_edx: true,
            enable_mit_ocw: true,
            enable_openstax: true,
            enable_catalog: true,
            page_size: 20,
            timeout_seconds: 10,
            max_results: 20,
        }
    }
}

impl ProvidersConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_seconds: u64,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            timeout_seconds: 30,
            max_tokens: 1024,
        }
    }
}

impl LlmConfig {
    /// 空字串或未被替換的 `${VAR}` 都視為沒有金鑰
    pub fn usable_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !key.starts_with("${"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub top_k: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex is valid"))
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| LearnPathError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 有指定檔案就載入，否則使用預設值並從環境變數補上 API 金鑰
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if config.llm.usable_api_key().is_none() {
            if let Ok(key) = std::env::var("OPENAI_API_KEY") {
                config.llm.api_key = Some(key);
            }
        }
        Ok(config)
    }

    /// 替換環境變數 (例如 ${OPENAI_API_KEY})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_range("server.port", self.server.port, 1, u16::MAX)?;

        validate_url("providers.edx_endpoint", &self.providers.edx_endpoint)?;
        validate_url("providers.mit_ocw_endpoint", &self.providers.mit_ocw_endpoint)?;
        validate_url("providers.openstax_endpoint", &self.providers.openstax_endpoint)?;
        validate_positive_number("providers.page_size", self.providers.page_size as u64, 1)?;
        validate_positive_number("providers.timeout_seconds", self.providers.timeout_seconds, 1)?;
        validate_positive_number("providers.max_results", self.providers.max_results as u64, 1)?;

        validate_url("llm.endpoint", &self.llm.endpoint)?;
        validate_non_empty_string("llm.model", &self.llm.model)?;
        validate_positive_number("llm.timeout_seconds", self.llm.timeout_seconds, 1)?;
        validate_positive_number("llm.max_tokens", self.llm.max_tokens as u64, 1)?;

        validate_positive_number("ranking.top_k", self.ranking.top_k as u64, 1)?;

        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.providers.page_size, 20);
        assert_eq!(config.providers.max_results, 20);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.ranking.top_k, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_content = r#"
[server]
port = 9100
environment = "production"

[providers]
enable_openstax = false
timeout_seconds = 3

[ranking]
top_k = 3
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.server.port, 9100);
        assert!(config.server.is_production());
        assert!(!config.providers.enable_openstax);
        assert!(config.providers.enable_edx);
        assert_eq!(config.providers.timeout(), Duration::from_secs(3));
        assert_eq!(config.ranking.top_k, 3);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("LEARNPATH_TEST_LLM_KEY", "sk-from-env");

        let toml_content = r#"
[llm]
api_key = "${LEARNPATH_TEST_LLM_KEY}"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.llm.usable_api_key(), Some("sk-from-env"));

        std::env::remove_var("LEARNPATH_TEST_LLM_KEY");
    }

    #[test]
    fn test_unresolved_env_var_is_not_a_key() {
        let toml_content = r#"
[llm]
api_key = "${LEARNPATH_TEST_SURELY_UNSET}"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.llm.usable_api_key(), None);
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[providers]
edx_endpoint = "invalid-url"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let config = AppConfig::from_toml_str("[ranking]\ntop_k = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let err = AppConfig::from_toml_str("[server\nport = 1").unwrap_err();
        assert!(matches!(err, LearnPathError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[llm]
model = "gpt-4o"
timeout_seconds = 12
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.timeout(), Duration::from_secs(12));
    }
}
