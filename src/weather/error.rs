// ==========================================
// 施工现场日报系统 - 气象接口错误类型
// ==========================================
// 说明: 这些错误不会传递给报表调用方，只用于日志
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("未配置气象接口服务密钥")]
    MissingServiceKey,

    #[error("网络请求失败: {0}")]
    Http(#[from] reqwest::Error),

    #[error("接口返回错误: code={code}, msg={message}")]
    Upstream { code: String, message: String },

    #[error("响应格式错误: {0}")]
    MalformedPayload(String),
}
