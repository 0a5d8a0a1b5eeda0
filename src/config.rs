use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::table::HotelIdentity;

pub const DEFAULT_SETTLE_MS: u64 = 500;
pub const DEFAULT_REPLY_TIMEOUT_MS: u64 = 500;
pub const DEFAULT_REPLY_POLL_MS: u64 = 50;

const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";
const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
const DEFAULT_LOCAL_URL: &str = "http://localhost:8000";

/// Which sentiment backend a run should call.
#[derive(Clone, Copy)]
pub enum Backend {
    Llm,
    Local,
}

/// Bounded wait applied after a partner-reply toggle is clicked.
#[derive(Clone, Copy)]
pub struct ReplyWait {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for ReplyWait {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_REPLY_TIMEOUT_MS),
            interval: Duration::from_millis(DEFAULT_REPLY_POLL_MS),
        }
    }
}

/// Everything the page walker needs for one listing.
pub struct WalkPlan {
    pub listing_url: String,
    pub settle: Duration,
    pub reply_wait: ReplyWait,
    pub page_limit: Option<u32>,
}

/// Classifier backend settings, resolved from the environment.
pub enum ClassifierConfig {
    Llm {
        base_url: String,
        model: String,
        api_key: String,
    },
    Local {
        url: String,
    },
}

impl ClassifierConfig {
    pub fn from_env(backend: Backend) -> Result<Self> {
        match backend {
            Backend::Llm => {
                let api_key = std::env::var("LLM_API_KEY")
                    .context("LLM_API_KEY environment variable must be set for the llm backend")?;
                Ok(Self::Llm {
                    base_url: env_or("LLM_BASE_URL", DEFAULT_LLM_BASE_URL),
                    model: env_or("LLM_MODEL", DEFAULT_LLM_MODEL),
                    api_key,
                })
            }
            Backend::Local => Ok(Self::Local {
                url: env_or("CLASSIFIER_URL", DEFAULT_LOCAL_URL),
            }),
        }
    }
}

/// Full configuration for one `run` invocation.
pub struct RunConfig {
    pub hotel: HotelIdentity,
    pub walk: WalkPlan,
    pub classifier: ClassifierConfig,
    pub webdriver_url: String,
    pub csv_path: PathBuf,
    pub db_path: PathBuf,
}

impl RunConfig {
    pub fn resolve(
        listing_url: String,
        hotel: HotelIdentity,
        csv_path: PathBuf,
        db_path: PathBuf,
        backend: Backend,
        settle_ms: Option<u64>,
        page_limit: Option<u32>,
    ) -> Result<Self> {
        Ok(Self {
            hotel,
            walk: WalkPlan {
                listing_url,
                settle: Duration::from_millis(settle_ms.unwrap_or(DEFAULT_SETTLE_MS)),
                reply_wait: ReplyWait::default(),
                page_limit,
            },
            classifier: ClassifierConfig::from_env(backend)?,
            webdriver_url: env_or("WEBDRIVER_URL", DEFAULT_WEBDRIVER_URL),
            csv_path,
            db_path,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
