// 错误处理模块
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::response::R;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("数据库错误: {0}")]
    Database(String),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("验证错误: {0}")]
    Validation(String),

    #[error("未找到: {0}")]
    NotFound(String),

    #[error("业务错误: {0}")]
    Business(String),

    /// 贷款参数非法（本金/期数/利率），请求被拒绝且不产生任何状态变更
    #[error("贷款参数无效: {0}")]
    InvalidTerm(String),

    /// 出资会超过贷款本金上限，整笔拒绝
    #[error("出资超额: {0}")]
    Overfund(String),

    /// 平台托管账户余额不足以完成放款
    #[error("托管账户余额不足: {0}")]
    InsufficientBalance(String),

    /// 链上 RPC 暂时不可用，内部重试耗尽后才会抛出
    #[error("账本服务不可用: {0}")]
    LedgerUnavailable(String),

    /// 交易已提交但在轮询预算内未确认，记录保持 Pending 由后台任务收敛
    #[error("交易确认超时: {0}")]
    ConfirmationTimeout(String),

    /// 测试网专属操作（空投）在主网被调用
    #[error("主网不支持该操作: {0}")]
    UnsupportedOnMain(String),

    #[error("内部服务器错误: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn database(msg: impl Into<String>) -> Self {
        AppError::Database(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn business(msg: impl Into<String>) -> Self {
        AppError::Business(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// 对外暴露的稳定错误码（写进响应体，不暴露内部细节）
    pub fn code(&self) -> u16 {
        match self {
            AppError::Validation(_) => 400,
            AppError::NotFound(_) => 404,
            AppError::Business(_) => 4000,
            AppError::InvalidTerm(_) => 4001,
            AppError::Overfund(_) => 4002,
            AppError::InsufficientBalance(_) => 4003,
            AppError::UnsupportedOnMain(_) => 4004,
            AppError::LedgerUnavailable(_) => 5001,
            AppError::ConfirmationTimeout(_) => 5002,
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => 500,
        }
    }
}

// 从 rbatis 错误转换 (rbatis::Error 包含了 rbdc::Error)
impl From<rbatis::Error> for AppError {
    fn from(err: rbatis::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_)
            | AppError::Business(_)
            | AppError::InvalidTerm(_)
            | AppError::Overfund(_)
            | AppError::InsufficientBalance(_)
            | AppError::UnsupportedOnMain(_) => StatusCode::BAD_REQUEST,
            AppError::LedgerUnavailable(_) | AppError::ConfirmationTimeout(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body: R<()> = R::error(self.code(), self.to_string());
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(AppError::InvalidTerm("x".into()).code(), 4001);
        assert_eq!(AppError::Overfund("x".into()).code(), 4002);
        assert_eq!(AppError::InsufficientBalance("x".into()).code(), 4003);
        assert_eq!(AppError::UnsupportedOnMain("x".into()).code(), 4004);
        assert_eq!(AppError::LedgerUnavailable("x".into()).code(), 5001);
        assert_eq!(AppError::ConfirmationTimeout("x".into()).code(), 5002);
    }
}
