//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入类型”和“流水线中间结果”解耦：
//! - `ImageSource` 表示外部来源语义（摄像头帧 / 上传文件 / Base64）
//! - `RawImageData` 表示已加载但未解码的字节

use image::RgbaImage;

/// 图片输入来源。
pub enum ImageSource {
    /// 已解码的摄像头帧（RGBA）。
    Frame(RgbaImage),
    /// Base64（支持 Data URL 与纯 Base64 字符串）。
    Base64(String),
    /// 本地文件路径来源。
    FilePath(String),
}

impl ImageSource {
    /// 来源提示（用于日志与诊断）。
    pub(crate) fn hint(&self) -> &'static str {
        match self {
            Self::Frame(_) => "frame",
            Self::Base64(_) => "base64",
            Self::FilePath(_) => "file",
        }
    }
}

/// 加载阶段输出：原始字节与来源标识。
pub(crate) struct RawImageData {
    /// 原始图片字节。
    pub(crate) bytes: Vec<u8>,
    pub(crate) source_hint: &'static str,
}
