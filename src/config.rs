//! 程序配置
//!
//! 配置来源按优先级从低到高：内置默认值 → 可选的 `robot.toml` 配置文件 →
//! 环境变量。凭据校验在任何网络或页面操作之前进行。

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// 用户名环境变量
pub const USERNAME_VAR: &str = "ROBOT_USERNAME";
/// 密码环境变量
pub const PASSWORD_VAR: &str = "ROBOT_PASSWORD";
/// 默认配置文件
pub const CONFIG_FILE: &str = "robot.toml";

/// 登录凭据
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 密码不进日志
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 登录用户名
    pub username: String,
    /// 登录密码
    pub password: String,
    /// 目标应用地址
    pub target_url: String,
    /// 销售数据文件下载地址
    pub sales_data_url: String,
    /// 销售数据文件本地保存路径
    pub sales_data_file: String,
    /// 数据所在工作表名称
    pub worksheet: String,
    /// 产物输出目录
    pub output_dir: String,
    /// 输出日志文件（每次运行覆盖）
    pub log_file: String,
    /// 截图文件名
    pub screenshot_file: String,
    /// PDF 文件名
    pub document_file: String,
    /// 下载最大尝试次数
    pub fetch_max_attempts: u32,
    /// 下载重试间隔（秒，固定间隔）
    pub fetch_retry_delay_secs: u64,
    /// 单次页面操作超时（秒）
    pub op_timeout_secs: u64,
    /// 登录校验等待上限（秒）
    pub login_wait_secs: u64,
    /// 每次页面操作后的减速延迟（毫秒）
    pub slowmo_ms: u64,
    /// 是否以无头模式启动浏览器
    pub headless: bool,
    /// 浏览器调试端口（设置后连接现有浏览器，而非启动新实例）
    pub browser_debug_port: Option<u16>,
    /// 浏览器可执行文件路径（不设置则使用系统默认）
    pub chrome_executable: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            target_url: "https://robotsparebinindustries.com/".to_string(),
            sales_data_url: "https://robotsparebinindustries.com/SalesData.xlsx".to_string(),
            sales_data_file: "SalesData.xlsx".to_string(),
            worksheet: "data".to_string(),
            output_dir: "output".to_string(),
            log_file: "robot.log".to_string(),
            screenshot_file: "sales_summary.png".to_string(),
            document_file: "sales_results.pdf".to_string(),
            fetch_max_attempts: 3,
            fetch_retry_delay_secs: 2,
            op_timeout_secs: 30,
            login_wait_secs: 10,
            slowmo_ms: 100,
            headless: true,
            browser_debug_port: None,
            chrome_executable: None,
            verbose_logging: false,
        }
    }
}

/// `robot.toml` 中允许出现的键（全部可选，只覆盖给出的项）
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    username: Option<String>,
    password: Option<String>,
    target_url: Option<String>,
    sales_data_url: Option<String>,
    sales_data_file: Option<String>,
    worksheet: Option<String>,
    output_dir: Option<String>,
    log_file: Option<String>,
    screenshot_file: Option<String>,
    document_file: Option<String>,
    fetch_max_attempts: Option<u32>,
    fetch_retry_delay_secs: Option<u64>,
    op_timeout_secs: Option<u64>,
    login_wait_secs: Option<u64>,
    slowmo_ms: Option<u64>,
    headless: Option<bool>,
    browser_debug_port: Option<u16>,
    chrome_executable: Option<String>,
    verbose_logging: Option<bool>,
}

impl Config {
    /// 加载完整配置：默认值 → `robot.toml`（如存在）→ 环境变量
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if Path::new(CONFIG_FILE).exists() {
            config.apply_file(CONFIG_FILE)?;
        }
        config.apply_env();
        Ok(config)
    }

    /// 仅从环境变量加载（测试和集成场景使用）
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// 校验并提取凭据
    ///
    /// 任一凭据缺失或为空即返回 [`ConfigError::MissingCredential`]，
    /// 此时不允许发起任何网络或页面操作。
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        if self.username.trim().is_empty() {
            return Err(ConfigError::MissingCredential { name: USERNAME_VAR });
        }
        if self.password.trim().is_empty() {
            return Err(ConfigError::MissingCredential { name: PASSWORD_VAR });
        }
        Ok(Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }

    fn apply_file(&mut self, path: &str) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_string(),
            source,
        })?;
        let file: ConfigFile = toml::from_str(&content).map_err(|source| ConfigError::FileParse {
            path: path.to_string(),
            source,
        })?;
        self.apply_overlay(file);
        Ok(())
    }

    fn apply_overlay(&mut self, file: ConfigFile) {
        if let Some(v) = file.username {
            self.username = v;
        }
        if let Some(v) = file.password {
            self.password = v;
        }
        if let Some(v) = file.target_url {
            self.target_url = v;
        }
        if let Some(v) = file.sales_data_url {
            self.sales_data_url = v;
        }
        if let Some(v) = file.sales_data_file {
            self.sales_data_file = v;
        }
        if let Some(v) = file.worksheet {
            self.worksheet = v;
        }
        if let Some(v) = file.output_dir {
            self.output_dir = v;
        }
        if let Some(v) = file.log_file {
            self.log_file = v;
        }
        if let Some(v) = file.screenshot_file {
            self.screenshot_file = v;
        }
        if let Some(v) = file.document_file {
            self.document_file = v;
        }
        if let Some(v) = file.fetch_max_attempts {
            self.fetch_max_attempts = v;
        }
        if let Some(v) = file.fetch_retry_delay_secs {
            self.fetch_retry_delay_secs = v;
        }
        if let Some(v) = file.op_timeout_secs {
            self.op_timeout_secs = v;
        }
        if let Some(v) = file.login_wait_secs {
            self.login_wait_secs = v;
        }
        if let Some(v) = file.slowmo_ms {
            self.slowmo_ms = v;
        }
        if let Some(v) = file.headless {
            self.headless = v;
        }
        if let Some(v) = file.browser_debug_port {
            self.browser_debug_port = Some(v);
        }
        if let Some(v) = file.chrome_executable {
            self.chrome_executable = Some(v);
        }
        if let Some(v) = file.verbose_logging {
            self.verbose_logging = v;
        }
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var(USERNAME_VAR) {
            self.username = v;
        }
        if let Ok(v) = std::env::var(PASSWORD_VAR) {
            self.password = v;
        }
        if let Ok(v) = std::env::var("TARGET_URL") {
            self.target_url = v;
        }
        if let Ok(v) = std::env::var("SALES_DATA_URL") {
            self.sales_data_url = v;
        }
        if let Ok(v) = std::env::var("SALES_DATA_FILE") {
            self.sales_data_file = v;
        }
        if let Ok(v) = std::env::var("SALES_WORKSHEET") {
            self.worksheet = v;
        }
        if let Ok(v) = std::env::var("OUTPUT_DIR") {
            self.output_dir = v;
        }
        if let Ok(v) = std::env::var("LOG_FILE") {
            self.log_file = v;
        }
        if let Some(v) = env_parse("FETCH_MAX_ATTEMPTS") {
            self.fetch_max_attempts = v;
        }
        if let Some(v) = env_parse("FETCH_RETRY_DELAY_SECS") {
            self.fetch_retry_delay_secs = v;
        }
        if let Some(v) = env_parse("OP_TIMEOUT_SECS") {
            self.op_timeout_secs = v;
        }
        if let Some(v) = env_parse("LOGIN_WAIT_SECS") {
            self.login_wait_secs = v;
        }
        if let Some(v) = env_parse("SLOWMO_MS") {
            self.slowmo_ms = v;
        }
        if let Some(v) = env_parse("HEADLESS") {
            self.headless = v;
        }
        if let Some(v) = env_parse("BROWSER_DEBUG_PORT") {
            self.browser_debug_port = Some(v);
        }
        if let Ok(v) = std::env::var("CHROME_EXECUTABLE") {
            self.chrome_executable = Some(v);
        }
        if let Some(v) = env_parse("VERBOSE_LOGGING") {
            self.verbose_logging = v;
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(username: &str, password: &str) -> Config {
        Config {
            username: username.to_string(),
            password: password.to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn credentials_missing_username() {
        let err = config_with("", "secret").credentials().unwrap_err();
        match err {
            ConfigError::MissingCredential { name } => assert_eq!(name, USERNAME_VAR),
            other => panic!("意外的错误类型: {other}"),
        }
    }

    #[test]
    fn credentials_missing_password() {
        let err = config_with("robot", "  ").credentials().unwrap_err();
        match err {
            ConfigError::MissingCredential { name } => assert_eq!(name, PASSWORD_VAR),
            other => panic!("意外的错误类型: {other}"),
        }
    }

    #[test]
    fn credentials_complete() {
        let credentials = config_with("robot", "secret").credentials().unwrap();
        assert_eq!(credentials.username, "robot");
        assert_eq!(credentials.password, "secret");
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let credentials = config_with("robot", "secret").credentials().unwrap();
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("robot"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn file_overlay_overrides_only_given_keys() {
        let file: ConfigFile = toml::from_str(
            r#"
            username = "robot"
            fetch_max_attempts = 5
            headless = false
            "#,
        )
        .unwrap();

        let mut config = Config::default();
        config.apply_overlay(file);

        assert_eq!(config.username, "robot");
        assert_eq!(config.fetch_max_attempts, 5);
        assert!(!config.headless);
        // 未给出的键保持默认
        assert_eq!(config.worksheet, "data");
        assert_eq!(config.fetch_retry_delay_secs, 2);
    }
}
