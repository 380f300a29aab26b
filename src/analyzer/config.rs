//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `AnalysisConfig`：输入体积与像素上限、重采样滤镜、阈值表。
//! 性能档位（quality / balanced / speed）作为高层语义，映射到重采样滤镜。
//!
//! ## 实现思路
//!
//! - `Default` 提供平衡档位与默认阈值表。
//! - `PerformanceProfile` 负责档位字符串解析与反向输出。
//! - `apply_performance_profile` / `infer_performance_profile` 互为正反映射。

use image::imageops::FilterType;

use super::{ImageError, ThresholdTable};

/// 评分链路配置。
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// 读取原始字节时允许的最大体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 归一化时的重采样滤镜。
    pub resize_filter: FilterType,
    /// 分数到文案的阈值表。
    pub thresholds: ThresholdTable,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            resize_filter: FilterType::Triangle,
            thresholds: ThresholdTable::default(),
        }
    }
}

/// 性能档位。
///
/// - `Quality`：CatmullRom 重采样
/// - `Balanced`：双线性
/// - `Speed`：最近邻
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceProfile {
    Quality,
    Balanced,
    Speed,
}

impl PerformanceProfile {
    /// 从外部字符串解析档位。
    ///
    /// # 示例
    /// ```rust
    /// use visham_detector::analyzer::PerformanceProfile;
    ///
    /// let p = PerformanceProfile::from_str(" Balanced ")?;
    /// assert_eq!(p.as_str(), "balanced");
    /// # Ok::<(), visham_detector::analyzer::ImageError>(())
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(profile: &str) -> Result<Self, ImageError> {
        match profile.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(ImageError::InvalidFormat(format!(
                "未知性能档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }
}

impl AnalysisConfig {
    /// 基于当前滤镜反推档位。
    pub fn infer_performance_profile(&self) -> PerformanceProfile {
        match self.resize_filter {
            FilterType::CatmullRom | FilterType::Gaussian | FilterType::Lanczos3 => {
                PerformanceProfile::Quality
            }
            FilterType::Nearest => PerformanceProfile::Speed,
            FilterType::Triangle => PerformanceProfile::Balanced,
        }
    }

    pub fn apply_performance_profile(&mut self, profile: PerformanceProfile) {
        self.resize_filter = match profile {
            PerformanceProfile::Quality => FilterType::CatmullRom,
            PerformanceProfile::Balanced => FilterType::Triangle,
            PerformanceProfile::Speed => FilterType::Nearest,
        };
    }
}
