//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。
//! 未安装 recorder 时，所有记录函数都是空操作。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::ObservabilityConfig;

/// 全局 Prometheus handle，用于渲染指标
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics 资源守卫
pub struct MetricsHandle {
    _server_handle: tokio::task::JoinHandle<()>,
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 端点。
pub async fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    let _ = PROMETHEUS_HANDLE.set(handle.clone());

    register_common_metrics(&config.service_name);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle {
        _server_handle: server_handle,
    })
}

/// 注册通用指标（预定义的业务指标）
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!("http_requests_total", "Total number of HTTP requests");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );

    metrics::describe_counter!(
        "ledger_entries_total",
        "Total number of audit entries appended to member ledgers"
    );
    metrics::describe_counter!("redemptions_total", "Total number of redemption attempts");
    metrics::describe_counter!("judgments_total", "Total number of member judgments");
    metrics::describe_counter!(
        "activity_reports_total",
        "Total number of processed sprint activity reports"
    );
    metrics::describe_gauge!("reward_stock", "Remaining stock per reward");
    metrics::describe_gauge!("program_phase", "Current program phase ordinal");

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

/// 启动指标 HTTP 服务器
async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(server_handle)
}

/// 获取全局 Prometheus handle（用于自定义渲染）
pub fn get_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

// ============================================================================
// 便捷的指标记录函数
// ============================================================================

/// 记录 HTTP 请求
#[inline]
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let status_str = status.to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str.clone()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str
    )
    .record(duration_secs);
}

/// 记录账本流水写入
#[inline]
pub fn record_ledger_entry(kind: &str) {
    metrics::counter!("ledger_entries_total", "kind" => kind.to_string()).increment(1);
}

/// 记录兑换结果（status 为 success 或错误码）
#[inline]
pub fn record_redemption(reward_id: &str, status: &str) {
    metrics::counter!(
        "redemptions_total",
        "reward_id" => reward_id.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// 记录单个会员的裁决结果（reset / downgrade / none）
#[inline]
pub fn record_judgment(outcome: &str) {
    metrics::counter!("judgments_total", "outcome" => outcome.to_string()).increment(1);
}

/// 记录冲刺活动上报（active / inactive / unknown）
#[inline]
pub fn record_activity_report(status: &str) {
    metrics::counter!("activity_reports_total", "status" => status.to_string()).increment(1);
}

/// 更新奖品库存
#[inline]
pub fn set_reward_stock(reward_id: &str, stock: f64) {
    metrics::gauge!("reward_stock", "reward_id" => reward_id.to_string()).set(stock);
}

/// 更新当前计划阶段
#[inline]
pub fn set_program_phase(ordinal: f64) {
    metrics::gauge!("program_phase").set(ordinal);
}
