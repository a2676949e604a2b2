//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::observability::ObservabilityConfig;

/// 服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// 忠诚度计划业务参数
///
/// 这些参数影响积分换算与库存预警，但不改变引擎的核心规则（惩罚阈值、阶段循环）。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProgramConfig {
    /// 每个冲刺（Sprint）换算的代币数量
    pub sprint_rate: i64,
    /// 低库存预警阈值（库存低于该值即预警）
    pub low_stock_threshold: u32,
    /// 进程启动时的计划阶段，如 "ACCUMULATION"、"REDEEM"
    pub initial_phase: String,
    /// 启动时是否载入演示数据
    pub seed_demo_data: bool,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            sprint_rate: 20,
            low_stock_threshold: 3,
            initial_phase: "ACCUMULATION".to_string(),
            seed_demo_data: false,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub program: ProgramConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. config/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（LOYALTY_ 前缀，如 LOYALTY_PROGRAM__SPRINT_RATE -> program.sprint_rate）
    /// 5. 服务特定端口环境变量（如 LOYALTY_ADMIN_PORT）
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("LOYALTY_ENV").unwrap_or_else(|_| "development".to_string());

        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env.clone())?
            .add_source(File::from(Path::new(&config_dir).join("default.toml")).required(false))
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", env))).required(false),
            )
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", service_name)))
                    .required(false),
            )
            // 字段名本身含下划线（sprint_rate），层级之间用双下划线分隔
            .add_source(
                Environment::with_prefix("LOYALTY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        if let Some(port) = Self::get_service_port_from_env(service_name) {
            config.server.port = port;
        }

        Ok(config)
    }

    /// 从环境变量获取服务特定端口
    ///
    /// - loyalty-admin-service -> LOYALTY_ADMIN_PORT
    /// - 其他服务 -> 服务名大写下划线格式 + _PORT
    fn get_service_port_from_env(service_name: &str) -> Option<u16> {
        let env_var_name = match service_name {
            "loyalty-admin-service" => "LOYALTY_ADMIN_PORT".to_string(),
            _ => Self::generic_port_var(service_name),
        };

        std::env::var(env_var_name)
            .ok()
            .and_then(|v| v.parse().ok())
    }

    /// 将 "my-service-name" 转换为 "MY_SERVICE_NAME_PORT"
    fn generic_port_var(service_name: &str) -> String {
        format!("{}_PORT", service_name.to_uppercase().replace('-', "_"))
    }

    /// 获取服务地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
