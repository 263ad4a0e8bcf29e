//! Twitch live status
//!
//! 使用 client-credentials 获取 app token（缓存到过期前 1 分钟），
//! 先按 login 查 user id，再查 stream。结果按 `live.cache_secs` 缓存。

use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use ureq::Agent;
use url::Url;

use crate::config::LiveConfig;
use crate::errors::{LinkhubError, Result};

const HTTP_TIMEOUT_SECS: u64 = 5;
/// token 提前失效的余量
const TOKEN_EXPIRY_MARGIN_SECS: u64 = 60;
const THUMBNAIL_WIDTH: &str = "320";
const THUMBNAIL_HEIGHT: &str = "180";

static HTTP_AGENT: OnceLock<Agent> = OnceLock::new();

fn get_agent() -> &'static Agent {
    HTTP_AGENT.get_or_init(|| {
        Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(HTTP_TIMEOUT_SECS)))
            .http_status_as_error(true)
            .build()
            .into()
    })
}

/// 直播状态（字段名与落地页脚本保持一致）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStatus {
    pub is_live: bool,
    pub viewers: u64,
    pub title: String,
    pub game: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub thumbnail: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub started_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fallback: bool,
}

impl LiveStatus {
    pub fn offline() -> Self {
        Self::default()
    }

    /// 未配置凭据时的占位结果
    pub fn unconfigured() -> Self {
        Self {
            error: Some("Twitch credentials not configured".to_string()),
            fallback: true,
            ..Self::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

/// 直播状态数据源
#[async_trait]
pub trait LiveStatusProvider: Send + Sync {
    async fn fetch_status(&self, channel: &str) -> Result<LiveStatus>;
}

// ============ Helix API ============

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct HelixList<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct HelixUser {
    id: String,
}

#[derive(Debug, Deserialize)]
struct HelixStream {
    #[serde(default)]
    viewer_count: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    game_name: String,
    #[serde(default)]
    thumbnail_url: String,
    #[serde(default)]
    started_at: String,
}

impl From<HelixStream> for LiveStatus {
    fn from(stream: HelixStream) -> Self {
        LiveStatus {
            is_live: true,
            viewers: stream.viewer_count,
            title: stream.title,
            game: stream.game_name,
            thumbnail: stream
                .thumbnail_url
                .replace("{width}", THUMBNAIL_WIDTH)
                .replace("{height}", THUMBNAIL_HEIGHT),
            started_at: stream.started_at,
            error: None,
            fallback: false,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    valid_until: Instant,
}

/// Twitch Helix 客户端（ureq 同步请求，放在 spawn_blocking 中执行）
pub struct TwitchClient {
    client_id: String,
    client_secret: String,
    api_base: String,
    auth_url: String,
    token: RwLock<Option<CachedToken>>,
}

impl TwitchClient {
    pub fn new(config: &LiveConfig) -> Option<Self> {
        if !config.has_credentials() {
            return None;
        }
        Some(Self {
            client_id: config.client_id.clone().unwrap_or_default(),
            client_secret: config.client_secret.clone().unwrap_or_default(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            auth_url: config.auth_url.clone(),
            token: RwLock::new(None),
        })
    }

    fn cached_token(&self) -> Option<String> {
        self.token
            .read()
            .as_ref()
            .filter(|t| Instant::now() < t.valid_until)
            .map(|t| t.value.clone())
    }

    fn request_token_sync(
        auth_url: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<TokenResponse> {
        get_agent()
            .post(auth_url)
            .send_form([
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("grant_type", "client_credentials"),
            ])
            .map_err(|e| {
                LinkhubError::external_service(format!("Twitch token request failed: {}", e))
            })?
            .into_body()
            .read_json::<TokenResponse>()
            .map_err(|e| {
                LinkhubError::external_service(format!("Twitch token response invalid: {}", e))
            })
    }

    async fn access_token(&self) -> Result<String> {
        if let Some(token) = self.cached_token() {
            return Ok(token);
        }

        let auth_url = self.auth_url.clone();
        let client_id = self.client_id.clone();
        let client_secret = self.client_secret.clone();
        let resp = tokio::task::spawn_blocking(move || {
            Self::request_token_sync(&auth_url, &client_id, &client_secret)
        })
        .await
        .map_err(|e| LinkhubError::external_service(format!("Token task failed: {}", e)))??;

        let lifetime = resp.expires_in.saturating_sub(TOKEN_EXPIRY_MARGIN_SECS);
        *self.token.write() = Some(CachedToken {
            value: resp.access_token.clone(),
            valid_until: Instant::now() + Duration::from_secs(lifetime),
        });
        debug!("Twitch app token refreshed, valid for {}s", lifetime);
        Ok(resp.access_token)
    }

    fn helix_url(&self, path: &str, query: &[(&str, &str)]) -> Result<String> {
        let mut url = Url::parse(&format!("{}/{}", self.api_base, path))
            .map_err(|e| LinkhubError::config(format!("Invalid live.api_base: {}", e)))?;
        url.query_pairs_mut().extend_pairs(query);
        Ok(url.to_string())
    }

    async fn helix_get<T>(&self, url: String, token: &str) -> Result<HelixList<T>>
    where
        T: for<'de> Deserialize<'de> + Send + 'static,
    {
        let client_id = self.client_id.clone();
        let bearer = format!("Bearer {}", token);

        tokio::task::spawn_blocking(move || {
            trace!("GET {}", url);
            get_agent()
                .get(&url)
                .header("Client-ID", &client_id)
                .header("Authorization", &bearer)
                .call()
                .map_err(|e| {
                    LinkhubError::external_service(format!("Twitch API request failed: {}", e))
                })?
                .into_body()
                .read_json::<HelixList<T>>()
                .map_err(|e| {
                    LinkhubError::external_service(format!("Twitch API response invalid: {}", e))
                })
        })
        .await
        .map_err(|e| LinkhubError::external_service(format!("Twitch API task failed: {}", e)))?
    }
}

#[async_trait]
impl LiveStatusProvider for TwitchClient {
    async fn fetch_status(&self, channel: &str) -> Result<LiveStatus> {
        let token = self.access_token().await?;

        let users: HelixList<HelixUser> = self
            .helix_get(self.helix_url("users", &[("login", channel)])?, &token)
            .await?;
        let Some(user) = users.data.into_iter().next() else {
            debug!("Twitch channel '{}' not found", channel);
            return Ok(LiveStatus::offline());
        };

        let streams: HelixList<HelixStream> = self
            .helix_get(self.helix_url("streams", &[("user_id", user.id.as_str())])?, &token)
            .await?;

        Ok(streams
            .data
            .into_iter()
            .next()
            .map(LiveStatus::from)
            .unwrap_or_else(LiveStatus::offline))
    }
}

// ============ LiveStatusService ============

pub struct LiveStatusService {
    provider: Option<Arc<dyn LiveStatusProvider>>,
    channel: String,
    cache: Cache<String, LiveStatus>,
}

impl LiveStatusService {
    pub fn new(config: &LiveConfig) -> Self {
        let provider =
            TwitchClient::new(config).map(|c| Arc::new(c) as Arc<dyn LiveStatusProvider>);
        if provider.is_none() {
            debug!("Twitch credentials not configured, live status will use fallback");
        }
        Self::with_provider(provider, &config.channel, config.cache_secs)
    }

    pub fn with_provider(
        provider: Option<Arc<dyn LiveStatusProvider>>,
        channel: &str,
        cache_secs: u64,
    ) -> Self {
        Self {
            provider,
            channel: channel.to_string(),
            cache: Cache::builder()
                .time_to_live(Duration::from_secs(cache_secs.max(1)))
                .max_capacity(16)
                .build(),
        }
    }

    /// 当前直播状态；上游失败时返回 ExternalService 错误，不写缓存
    pub async fn status(&self) -> Result<LiveStatus> {
        let Some(ref provider) = self.provider else {
            return Ok(LiveStatus::unconfigured());
        };

        if let Some(cached) = self.cache.get(&self.channel).await {
            trace!("Live status cache hit for {}", self.channel);
            return Ok(cached);
        }

        match provider.fetch_status(&self.channel).await {
            Ok(status) => {
                self.cache.insert(self.channel.clone(), status.clone()).await;
                Ok(status)
            }
            Err(e) => {
                warn!("Twitch API error: {}", e);
                Err(e)
            }
        }
    }
}
