//! 配置系统模块
//!
//! 统一处理 TOML 配置文件、环境变量、命令行参数

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use config::{Config as ConfigBuilder, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 应用名称，用于配置路径与环境变量前缀
pub const APP_NAME: &str = "vitals-triage";

/// 命令行参数
#[derive(Parser, Debug, Clone)]
#[command(name = "vitals-triage")]
#[command(about = "规则诊断服务 - 根据生命体征与症状给出诊断建议")]
#[command(version)]
pub struct Cli {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 日志级别
    #[arg(short, long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// 监听地址
    #[arg(long)]
    pub host: Option<String>,

    /// 监听端口
    #[arg(short, long)]
    pub port: Option<u16>,

    /// 子命令
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// 支持的命令
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// 启动 HTTP 服务
    Serve,
    /// 对单条观测数据评分并输出 JSON
    Score {
        /// 年龄（岁）
        #[arg(long, default_value_t = 50.0)]
        age: f64,
        /// 体温（华氏度）
        #[arg(long, default_value_t = 98.6)]
        temperature: f64,
        /// 心率（次/分）
        #[arg(long, default_value_t = 72.0)]
        heart_rate: f64,
        /// 血氧饱和度（%）
        #[arg(long, default_value_t = 98.0)]
        spo2: f64,
        /// 咳嗽
        #[arg(long)]
        cough: bool,
        /// 发热
        #[arg(long)]
        fever: bool,
        /// 呼吸困难
        #[arg(long)]
        breathing_issue: bool,
    },
    /// 生成合成病人数据集（CSV）
    GenerateDataset {
        /// 输出文件
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// 病人数量
        #[arg(short = 'n', long)]
        patients: Option<usize>,
        /// 随机种子
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// 用规则引擎评估数据集标签一致率
    Evaluate {
        /// CSV 数据集路径
        input: PathBuf,
    },
    /// 重置配置
    ResetConfig,
    /// 输出 shell 补全脚本
    Completions {
        /// 目标 shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// 日志级别
#[derive(clap::ValueEnum, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// 主配置结构
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// 服务配置
    pub server: ServerConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 数据集配置
    pub dataset: DatasetConfig,
}

/// 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
    /// 允许的跨域来源（为空表示允许任意来源）
    pub allowed_origins: Vec<String>,
    /// 优雅关闭超时（秒）
    pub shutdown_timeout_secs: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,
    /// 日志格式
    pub format: LogFormat,
    /// 日志输出目录
    pub directory: Option<PathBuf>,
    /// 日志文件轮转周期
    pub rotation: LogRotation,
}

/// 日志格式
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// 简洁格式
    Compact,
    /// 详细格式
    Full,
    /// JSON 格式
    Json,
}

/// 日志轮转周期
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Daily,
    Hourly,
    Never,
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Daily => Rotation::DAILY,
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Never => Rotation::NEVER,
        }
    }
}

/// 合成数据集配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// 病人数量
    pub patients: usize,
    /// 随机种子
    pub seed: u64,
    /// 输出文件
    pub output: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            allowed_origins: vec![],
            shutdown_timeout_secs: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            directory: None,
            rotation: LogRotation::Daily,
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            patients: 500,
            seed: 42,
            output: PathBuf::from("patient_data.csv"),
        }
    }
}

impl ServerConfig {
    /// 监听地址字符串，形如 `host:port`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// 使用指定的 CLI 参数加载配置
    pub fn load_with_cli(cli: Cli) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        // 1. 首先加载默认配置
        builder = builder.add_source(config::Config::try_from(&Config::default())?);

        // 2. 加载系统配置文件
        if let Some(system_config) = Self::get_system_config_path() {
            if system_config.exists() {
                builder = builder.add_source(File::from(system_config));
            }
        }

        // 3. 加载用户配置文件
        if let Some(user_config) = Self::get_user_config_path() {
            if user_config.exists() {
                builder = builder.add_source(File::from(user_config));
            }
        }

        // 4. 加载指定的配置文件
        if let Some(config_path) = cli.config {
            if config_path.exists() {
                builder = builder.add_source(File::from(config_path));
            } else {
                return Err(anyhow!("配置文件不存在: {}", config_path.display()));
            }
        }

        // 5. 加载环境变量（前缀 VITALS_TRIAGE_）
        builder = builder.add_source(
            Environment::with_prefix("VITALS_TRIAGE")
                .prefix_separator("_")
                .separator("__"),
        );

        // 6. 构建配置
        let mut config: Config = builder.build()?.try_deserialize()?;

        // 7. 兼容部署平台的 PORT 变量
        if let Ok(port) = std::env::var("PORT") {
            config.server.port = port
                .trim()
                .parse()
                .map_err(|e| anyhow!("PORT 环境变量无效 '{}': {}", port, e))?;
        }

        // 8. 应用命令行参数覆盖
        if let Some(log_level) = cli.log_level {
            config.logging.level = log_level;
        }

        if let Some(host) = cli.host {
            config.server.host = host;
        }

        if let Some(port) = cli.port {
            config.server.port = port;
        }

        // 9. 验证配置
        config.validate()?;

        Ok(config)
    }

    /// 获取系统配置文件路径
    pub fn get_system_config_path() -> Option<PathBuf> {
        Some(PathBuf::from("/etc/vitals-triage/config.toml"))
    }

    /// 获取用户配置文件路径
    pub fn get_user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// 生成默认配置文件
    pub fn generate_default_config() -> Result<String> {
        let config = Config::default();
        toml::to_string_pretty(&config).map_err(|e| anyhow!("生成默认配置失败: {}", e))
    }

    /// 保存配置到文件
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| anyhow!("序列化配置失败: {}", e))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// 验证配置
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(anyhow!("监听地址不能为空"));
        }

        if self.server.port == 0 {
            return Err(anyhow!("监听端口不能为 0"));
        }

        if self.dataset.patients == 0 {
            return Err(anyhow!("数据集病人数量必须大于 0"));
        }

        // 验证日志目录
        if let Some(log_dir) = &self.logging.directory {
            if !log_dir.exists() {
                std::fs::create_dir_all(log_dir)?;
            }
        }

        Ok(())
    }

    /// 初始化日志系统
    ///
    /// 返回的 guard 需要在进程生命周期内持有，否则文件日志会丢失
    pub fn init_logging(&self) -> Result<Option<WorkerGuard>> {
        let level_filter = EnvFilter::builder()
            .with_default_directive(Level::from(self.logging.level.clone()).into())
            .from_env_lossy();

        let (file_writer, guard) = match &self.logging.directory {
            Some(log_dir) => {
                std::fs::create_dir_all(log_dir)?;
                let appender = RollingFileAppender::new(
                    self.logging.rotation.into(),
                    log_dir,
                    "vitals-triage.log",
                );
                let (non_blocking, guard) = tracing_appender::non_blocking(appender);
                (Some(non_blocking), Some(guard))
            }
            None => (None, None),
        };

        // 根据格式选择不同的初始化方式
        let registry = tracing_subscriber::registry().with(level_filter);
        let result = match self.logging.format {
            LogFormat::Compact => registry
                .with(fmt::layer().compact())
                .with(file_writer.map(|w| fmt::layer().compact().with_ansi(false).with_writer(w)))
                .try_init(),
            LogFormat::Full => registry
                .with(fmt::layer())
                .with(file_writer.map(|w| fmt::layer().with_ansi(false).with_writer(w)))
                .try_init(),
            LogFormat::Json => registry
                .with(fmt::layer().json().with_target(true).with_level(true))
                .with(file_writer.map(|w| fmt::layer().json().with_ansi(false).with_writer(w)))
                .try_init(),
        };
        result.map_err(|e| anyhow!("日志系统初始化失败: {}", e))?;

        tracing::info!("日志系统已初始化，级别: {:?}", self.logging.level);
        Ok(guard)
    }
}
