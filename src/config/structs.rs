use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// Cookie SameSite 策略
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, AsRefStr, EnumString,
)]
#[serde(rename_all = "PascalCase")]
#[strum(serialize_all = "PascalCase", ascii_case_insensitive)]
pub enum SameSitePolicy {
    Strict,
    #[default]
    Lax,
    None,
}

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 监听地址、端口、CPU 数量
/// - database: analytics / users 两个库的连接配置
/// - logging: 日志配置
/// - auth: JWT 与 Cookie
/// - bootstrap: 用户表为空时创建的默认管理员
/// - analytics: 点击统计
/// - live: Twitch 直播状态
/// - profile: 落地页资料与外链
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub live: LiveConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：LH，分隔符：__
    /// 示例：LH__SERVER__PORT=9999
    pub fn load() -> Self {
        Self::load_from("config.toml")
    }

    pub fn load_from(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖，前缀 LH，分隔符 __
            .add_source(
                Environment::with_prefix("LH")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let mut sample_config = Self::default();
        sample_config.profile = ProfileConfig::sample();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 数据库连接配置
///
/// analytics 库存放 clicks / daily_stats / devotionals / payments，
/// users 库只存放 users。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_analytics_url")]
    pub analytics_url: String,
    #[serde(default = "default_users_url")]
    pub users_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// 认证配置（JWT + Cookie）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// 为空时启动时随机生成（重启后所有会话失效）
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_access_token_minutes")]
    pub access_token_minutes: u64,
    #[serde(default = "default_refresh_token_days")]
    pub refresh_token_days: u64,
    #[serde(default = "default_cookie_secure")]
    pub cookie_secure: bool,
    #[serde(default)]
    pub cookie_same_site: SameSitePolicy,
    #[serde(default)]
    pub cookie_domain: Option<String>,
    /// 可信反向代理（IP 或 CIDR），用于登录限流取真实 IP
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
}

/// 默认管理员（仅在 users 表为空时创建）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    #[serde(default = "default_bootstrap_enabled")]
    pub enabled: bool,
    #[serde(default = "default_admin_name")]
    pub admin_name: String,
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
}

/// 点击统计配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// IP 哈希盐值
    #[serde(default = "default_ip_hash_salt")]
    pub ip_hash_salt: String,
    #[serde(default = "default_trend_days")]
    pub trend_days: u32,
    #[serde(default = "default_top_links_limit")]
    pub top_links_limit: u64,
}

/// Twitch 直播状态配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveConfig {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_live_channel")]
    pub channel: String,
    #[serde(default = "default_live_cache_secs")]
    pub cache_secs: u64,
    #[serde(default = "default_live_api_base")]
    pub api_base: String,
    #[serde(default = "default_live_auth_url")]
    pub auth_url: String,
}

impl LiveConfig {
    pub fn has_credentials(&self) -> bool {
        matches!(
            (&self.client_id, &self.client_secret),
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty()
        )
    }
}

/// 落地页资料
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default = "default_profile_name")]
    pub name: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub links: Vec<ProfileLink>,
}

/// 落地页上的一个外链
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileLink {
    pub platform: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
}

impl ProfileConfig {
    fn sample() -> Self {
        let link = |platform: &str, title: &str, url: &str, username: &str| ProfileLink {
            platform: platform.to_string(),
            title: title.to_string(),
            url: url.to_string(),
            username: Some(username.to_string()),
        };

        Self {
            name: default_profile_name(),
            subtitle: "Streamer & creator".to_string(),
            bio: "Links to everything I do.".to_string(),
            avatar_url: None,
            links: vec![
                link("twitch", "Twitch", "https://twitch.tv/example", "@example"),
                link("youtube", "YouTube", "https://youtube.com/@example", "@example"),
                link("instagram", "Instagram", "https://instagram.com/example", "@example"),
            ],
        }
    }
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_analytics_url() -> String {
    "sqlite://data/analytics.db".to_string()
}

fn default_users_url() -> String {
    "sqlite://data/users.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_access_token_minutes() -> u64 {
    60 * 24
}

fn default_refresh_token_days() -> u64 {
    7
}

fn default_cookie_secure() -> bool {
    true
}

fn default_bootstrap_enabled() -> bool {
    true
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

fn default_admin_email() -> String {
    "admin@example.com".to_string()
}

fn default_admin_password() -> String {
    "admin123".to_string()
}

fn default_ip_hash_salt() -> String {
    "linkhub".to_string()
}

fn default_trend_days() -> u32 {
    7
}

fn default_top_links_limit() -> u64 {
    5
}

fn default_live_channel() -> String {
    "example".to_string()
}

fn default_live_cache_secs() -> u64 {
    30
}

fn default_live_api_base() -> String {
    "https://api.twitch.tv/helix".to_string()
}

fn default_live_auth_url() -> String {
    "https://id.twitch.tv/oauth2/token".to_string()
}

fn default_profile_name() -> String {
    "Linkhub".to_string()
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            analytics_url: default_analytics_url(),
            users_url: default_users_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_token_minutes: default_access_token_minutes(),
            refresh_token_days: default_refresh_token_days(),
            cookie_secure: default_cookie_secure(),
            cookie_same_site: SameSitePolicy::default(),
            cookie_domain: None,
            trusted_proxies: Vec::new(),
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            enabled: default_bootstrap_enabled(),
            admin_name: default_admin_name(),
            admin_email: default_admin_email(),
            admin_password: default_admin_password(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            ip_hash_salt: default_ip_hash_salt(),
            trend_days: default_trend_days(),
            top_links_limit: default_top_links_limit(),
        }
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            channel: default_live_channel(),
            cache_secs: default_live_cache_secs(),
            api_base: default_live_api_base(),
            auth_url: default_live_auth_url(),
        }
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            name: default_profile_name(),
            subtitle: String::new(),
            bio: String::new(),
            avatar_url: None,
            links: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_defaults() {
        let config = StaticConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.analytics.trend_days, 7);
        assert_eq!(config.analytics.top_links_limit, 5);
        assert_eq!(config.live.cache_secs, 30);
        assert!(!config.live.has_credentials());
        assert!(config.bootstrap.enabled);
    }

    #[test]
    fn test_same_site_from_str_case_insensitive() {
        assert_eq!(
            SameSitePolicy::from_str("strict").unwrap(),
            SameSitePolicy::Strict
        );
        assert_eq!(SameSitePolicy::from_str("NONE").unwrap(), SameSitePolicy::None);
        assert!(SameSitePolicy::from_str("sometimes").is_err());
    }

    #[test]
    fn test_sample_config_roundtrips_through_toml() {
        let sample = StaticConfig::generate_sample_config();
        let parsed: StaticConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.profile.links.len(), 3);
        assert_eq!(parsed.profile.links[0].platform, "twitch");
    }

    #[test]
    fn test_live_credentials_require_both_values() {
        let mut live = LiveConfig {
            client_id: Some("id".into()),
            ..Default::default()
        };
        assert!(!live.has_credentials());
        live.client_secret = Some(String::new());
        assert!(!live.has_credentials());
        live.client_secret = Some("secret".into());
        assert!(live.has_credentials());
    }

    #[test]
    fn test_save_and_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = StaticConfig::default();
        config.server.port = 9191;
        config.profile.name = "Tester".to_string();
        config.save_to_file(&path).unwrap();

        let loaded = StaticConfig::load_from(path.to_str().unwrap());
        assert_eq!(loaded.server.port, 9191);
        assert_eq!(loaded.profile.name, "Tester");
    }
}
