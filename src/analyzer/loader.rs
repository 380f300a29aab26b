//! # 上传加载模块
//!
//! ## 设计思路
//!
//! 上传的自拍有两种形态：浏览器 `FileReader` 产出的 `data:<mime>;base64,` 地址，
//! 以及宿主落盘后的本地路径。两者最终都要落到“确认是图片的原始字节”上。
//!
//! ## 实现思路
//!
//! - Data URL：拆出声明的 MIME 与载荷，解码前先按上限预估体积。
//! - 文件：metadata 体积限制后读取。
//! - 两个分支统一用 `infer` 识别真实 MIME；Data URL 声明的 MIME 必须与之一致。
//! - 识别出的 MIME 作为 `source_hint` 交给后续阶段写日志。

use base64::{Engine as _, engine::general_purpose};
use std::path::Path;

use super::source::RawImageData;
use super::{AnalysisConfig, ImageError, ImageHandler};

/// 拆分后的上传载荷。纯 Base64 没有声明 MIME。
struct UploadPayload<'a> {
    declared_mime: Option<&'a str>,
    encoded: &'a str,
}

impl<'a> UploadPayload<'a> {
    fn parse(data: &'a str) -> Result<Self, ImageError> {
        let data = data.trim();

        let Some(rest) = data.strip_prefix("data:") else {
            return Ok(Self {
                declared_mime: None,
                encoded: data,
            });
        };

        let (header, encoded) = rest
            .split_once(',')
            .ok_or_else(|| ImageError::InvalidFormat("Data URL 缺少数据段".to_string()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| ImageError::InvalidFormat("Data URL 不是 base64 编码".to_string()))?;
        let mime = mime.split(';').next().unwrap_or_default().trim();

        if !mime.starts_with("image/") {
            return Err(ImageError::InvalidFormat(format!(
                "Data URL 声明的类型不是图片：{}",
                mime
            )));
        }

        Ok(Self {
            declared_mime: Some(mime),
            encoded,
        })
    }

    /// 解码后体积上界（每 4 个字符至多 3 字节）。
    fn decoded_upper_bound(&self) -> u64 {
        (self.encoded.len() as u64).div_ceil(4).saturating_mul(3)
    }
}

impl ImageHandler {
    /// 加载 Data URL 或纯 Base64 上传。
    pub(super) fn load_from_base64(
        data: &str,
        config: &AnalysisConfig,
    ) -> Result<RawImageData, ImageError> {
        let payload = UploadPayload::parse(data)?;
        if payload.encoded.is_empty() {
            return Err(ImageError::InvalidFormat("Base64 内容为空".to_string()));
        }
        ensure_within_limit("Base64 预计解码", payload.decoded_upper_bound(), config)?;

        let bytes = general_purpose::STANDARD
            .decode(payload.encoded)
            .map_err(|e| ImageError::Decode(format!("Base64 解码失败：{}", e)))?;
        ensure_within_limit("Base64 解码后", bytes.len() as u64, config)?;

        let detected = detect_image_mime(&bytes)?;
        if let Some(declared) = payload.declared_mime {
            if canonical_mime(declared) != canonical_mime(detected) {
                return Err(ImageError::InvalidFormat(format!(
                    "Data URL 声明为 {}，实际内容为 {}",
                    declared, detected
                )));
            }
        }

        log::info!("📝 已读取上传图片 - 类型: {} 大小: {} 字节", detected, bytes.len());

        Ok(RawImageData {
            bytes,
            source_hint: detected,
        })
    }

    /// 加载本地文件上传。
    pub(super) fn load_from_file(
        path: &str,
        config: &AnalysisConfig,
    ) -> Result<RawImageData, ImageError> {
        let file_path = Path::new(path);
        let metadata = std::fs::metadata(file_path)
            .ok()
            .filter(|m| m.is_file())
            .ok_or_else(|| ImageError::FileSystem(format!("文件不存在：{}", path)))?;
        ensure_within_limit("文件", metadata.len(), config)?;

        let bytes = std::fs::read(file_path)
            .map_err(|e| ImageError::FileSystem(format!("无法读取图片文件：{}", e)))?;
        let detected = detect_image_mime(&bytes)?;

        log::info!("📁 已读取本地图片 - 路径: {} 类型: {}", path, detected);

        Ok(RawImageData {
            bytes,
            source_hint: detected,
        })
    }
}

fn ensure_within_limit(what: &str, len: u64, config: &AnalysisConfig) -> Result<(), ImageError> {
    if len <= config.max_file_size {
        return Ok(());
    }
    Err(ImageError::ResourceLimit(format!(
        "{}体积过大：{:.2} MB（限制：{:.2} MB）",
        what,
        len as f64 / 1024.0 / 1024.0,
        config.max_file_size as f64 / 1024.0 / 1024.0
    )))
}

/// 通过 magic bytes 识别图片 MIME，非图片一律拒绝。
fn detect_image_mime(bytes: &[u8]) -> Result<&'static str, ImageError> {
    match infer::get(bytes) {
        Some(kind) if kind.matcher_type() == infer::MatcherType::Image => Ok(kind.mime_type()),
        Some(kind) => Err(ImageError::InvalidFormat(format!(
            "文件签名不是图片类型：{}",
            kind.mime_type()
        ))),
        None => Err(ImageError::InvalidFormat("无法识别图片类型".to_string())),
    }
}

fn canonical_mime(mime: &str) -> String {
    match mime.trim().to_ascii_lowercase().as_str() {
        "image/jpg" | "image/pjpeg" => "image/jpeg".to_string(),
        "image/x-png" => "image/png".to_string(),
        other => other.to_string(),
    }
}
