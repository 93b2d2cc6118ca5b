//! Configuração do jobtrail carregada a partir de `jobtrail.toml`.
//!
//! A struct [`TrackerConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `JOBTRAIL_API_URL` tem precedência sobre o arquivo,
//! e a flag `--api-url` tem precedência sobre ambos.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::api::DEFAULT_API_URL;
use crate::error::TrackerError;
use crate::poller::DEFAULT_POLL_INTERVAL;

pub const CONFIG_FILE: &str = "jobtrail.toml";
pub const API_URL_ENV: &str = "JOBTRAIL_API_URL";

/// Configuração de nível superior carregada de `jobtrail.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackerConfig {
    /// URL base do backend REST.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Intervalo entre consultas de progresso da busca, em milissegundos.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Tempo máximo de cada requisição HTTP, em segundos.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Linhas por página na tabela de vagas.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> usize {
    25
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            page_size: default_page_size(),
        }
    }
}

impl TrackerConfig {
    /// Carrega a configuração de `path`, ou de `jobtrail.toml` no diretório atual.
    ///
    /// Um caminho explícito que não existe é erro; o arquivo padrão ausente
    /// resulta nos valores padrão.
    /// `api_url` é o valor da flag `--api-url`.
    pub fn load(path: Option<&Path>, api_url: Option<String>) -> Result<Self, TrackerError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(CONFIG_FILE).exists() => Self::from_file(Path::new(CONFIG_FILE))?,
            None => Self::default(),
        };
        config.with_overrides(std::env::var(API_URL_ENV).ok(), api_url)
    }

    fn from_file(path: &Path) -> Result<Self, TrackerError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str::<TrackerConfig>(&contents)?)
    }

    fn validate(&self) -> Result<(), TrackerError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(TrackerError::Config(format!(
                "api_url must start with http:// or https://, got '{}'",
                self.api_url
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(TrackerError::Config("poll_interval_ms must be positive".into()));
        }
        Ok(())
    }

    /// Aplica ambiente e flag, nesta ordem, e só então valida.
    fn with_overrides(
        mut self,
        env_url: Option<String>,
        flag_url: Option<String>,
    ) -> Result<Self, TrackerError> {
        for url in [env_url, flag_url].into_iter().flatten() {
            if !url.is_empty() {
                self.api_url = url;
            }
        }
        self.validate()?;
        Ok(self)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
