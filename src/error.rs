//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义应用级 `AppError`，覆盖评分链路、设置文件与 I/O 三类错误来源。
//! 宿主（CLI 或 UI）统一拿到 `Result<T, AppError>`。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `ImageError` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，便于以 JSON 交给宿主。

use serde::Serialize;

use crate::analyzer::ImageError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 评分流水线错误（加载 / 解码 / 归一化）
    #[error("{0}")]
    Image(#[from] ImageError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 设置文件无效
    #[error("设置错误: {0}")]
    Settings(String),
}

impl AppError {
    /// 单行诊断输出，评分链路错误附带错误码与阶段：`error[decode@decode]: ...`
    pub fn diagnostic(&self) -> String {
        match self {
            Self::Image(err) => format!("error[{}@{}]: {}", err.code(), err.stage(), err),
            Self::Io(_) => format!("error[io]: {}", self),
            Self::Settings(_) => format!("error[settings]: {}", self),
        }
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
