use thiserror::Error;

/// Failures observed while talking to the scene service. These never leave the
/// API client as `Err`; they are folded into a failure envelope instead.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("请求失败: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("服务器返回错误: {status} {reason}")]
    Status { status: u16, reason: String },

    #[error("服务器返回了无效的响应格式")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// Envelope code reported for this failure.
    pub fn code(&self) -> i64 {
        match self {
            ApiError::Status { status, .. } => i64::from(*status),
            ApiError::Transport(_) | ApiError::Parse(_) => 500,
        }
    }
}

/// Why a chat exchange stopped early. Carries the failure envelope message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    #[error("场景生成失败: {0}")]
    Generate(String),

    #[error("消息发送失败: {0}")]
    Chat(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL '{value}': {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("CORS mode 'proxy' requires --cors-proxy / SCENEFLOW_CORS_PROXY")]
    MissingProxy,

    #[error("unsupported CORS mode: {0}")]
    UnsupportedCorsMode(String),
}
