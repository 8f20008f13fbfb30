//! HTTP 服务模块
//!
//! 负责路由装配、跨域配置和生命周期管理

pub mod payload;
pub mod routes;

use crate::config::{Config, ServerConfig};
use crate::diagnosis::{RiskScorer, TracingObserver};
use anyhow::{anyhow, Result};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// 路由共享状态
#[derive(Clone)]
pub struct AppState {
    /// 评分器（无状态，可并发调用）
    pub scorer: Arc<RiskScorer>,
}

pub struct Server {
    /// 服务配置
    config: ServerConfig,
    /// 共享状态
    state: AppState,
    /// 跨域层
    cors: CorsLayer,
}

impl Server {
    pub fn new(config: &Config) -> Result<Self> {
        tracing::info!("正在初始化诊断服务...");

        let cors = build_cors(&config.server.allowed_origins)?;
        let scorer = RiskScorer::with_observer(Arc::new(TracingObserver));

        tracing::info!("规则诊断引擎已就绪");
        Ok(Self {
            config: config.server.clone(),
            state: AppState {
                scorer: Arc::new(scorer),
            },
            cors,
        })
    }

    /// 使用默认配置创建服务
    pub fn new_with_defaults() -> Result<Self> {
        Self::new(&Config::default())
    }

    /// 构建路由
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(routes::home))
            .route("/health", get(routes::health))
            .route("/predict", post(routes::predict))
            .layer(self.cors.clone())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// 绑定端口并运行，直到收到关闭信号
    pub async fn run(self) -> Result<()> {
        let address = self.config.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|e| anyhow!("无法绑定地址 {}: {}", address, e))?;
        self.run_with_listener(listener).await
    }

    /// 在已绑定的监听器上运行
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<()> {
        let local_addr = listener.local_addr()?;
        tracing::info!("诊断服务监听于 http://{}", local_addr);

        let router = self.router();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let server_handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        // 等待关闭信号
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("收到 Ctrl+C 信号，正在关闭...");
            }
            _ = Self::wait_for_term_signal() => {
                tracing::info!("收到 TERM 信号，正在关闭...");
            }
        }

        if shutdown_tx.send(()).is_err() {
            tracing::warn!("发送关闭信号失败: 服务任务已退出");
        }

        let timeout = Duration::from_secs(self.config.shutdown_timeout_secs);
        match tokio::time::timeout(timeout, server_handle).await {
            Ok(Ok(Ok(()))) => tracing::info!("诊断服务已正常关闭"),
            Ok(Ok(Err(e))) => return Err(anyhow!("HTTP 服务异常退出: {}", e)),
            Ok(Err(e)) => tracing::error!("服务任务失败: {}", e),
            Err(_) => tracing::warn!("服务关闭超时（{}秒），强制终止", timeout.as_secs()),
        }

        Ok(())
    }

    /// 等待 TERM 信号
    async fn wait_for_term_signal() {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            if let Ok(mut term) = signal(SignalKind::terminate()) {
                term.recv().await;
            }
        }

        #[cfg(not(unix))]
        {
            // Windows 不支持 SIGTERM，使用 Ctrl+C 替代
            let _ = tokio::signal::ctrl_c().await;
        }
    }

    /// 获取服务配置
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// 根据配置构建跨域层，来源列表为空时允许任意来源
fn build_cors(allowed_origins: &[String]) -> Result<CorsLayer> {
    let origin = if allowed_origins.is_empty() {
        AllowOrigin::any()
    } else {
        let origins = allowed_origins
            .iter()
            .map(|o| {
                HeaderValue::from_str(o).map_err(|e| anyhow!("无效的跨域来源 '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any))
}
