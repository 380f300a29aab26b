//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `ImageHandler` 只负责流程编排与配置管理，不关心宿主 UI。
//! 处理链路固定为：
//! 1. 读取配置快照
//! 2. 按来源加载并解码出 RGBA 帧（摄像头帧直接使用）
//! 3. cover 归一化到 256×256 画布
//! 4. 评分并解析文案
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<AnalysisConfig>>` 支持运行时动态切档。
//! - 单次请求内使用“同一配置快照”，避免处理中途配置漂移。
//! - 复用的分析画布放在 `Mutex` 中，同一时刻只允许一个分析调用持有。
//! - 记录 `load/normalize/score/total` 阶段耗时，便于性能诊断。

use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use super::normalizer::normalize_onto;
use super::score::{Score, compute_score};
use super::surface::AnalysisSurface;
use super::{AnalysisConfig, ImageError, ImageSource, PerformanceProfile, ThresholdTable};

/// 核心对外输出：分数与文案。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub score: Score,
    pub label: String,
}

impl AnalysisResult {
    /// 由已归一化的画布直接得到结果。
    pub fn from_surface(surface: &AnalysisSurface, thresholds: &ThresholdTable) -> Self {
        let score = compute_score(surface);
        Self {
            score,
            label: thresholds.resolve(score).to_string(),
        }
    }
}

/// 评分处理器。
pub struct ImageHandler {
    pub(super) config: Arc<RwLock<AnalysisConfig>>,
    surface: Mutex<AnalysisSurface>,
}

impl ImageHandler {
    /// 根据初始配置创建处理器。
    ///
    /// # 示例
    /// ```rust
    /// use visham_detector::analyzer::{AnalysisConfig, ImageHandler, ImageSource};
    /// use image::{Rgba, RgbaImage};
    ///
    /// let handler = ImageHandler::new(AnalysisConfig::default());
    /// let frame = RgbaImage::from_pixel(320, 240, Rgba([0, 0, 0, 255]));
    /// let result = handler.analyze(ImageSource::Frame(frame))?;
    /// assert_eq!(result.score.value(), 50);
    /// # Ok::<(), visham_detector::analyzer::ImageError>(())
    /// ```
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            surface: Mutex::new(AnalysisSurface::new()),
        }
    }

    /// 获取配置快照。
    pub(super) fn config_snapshot(&self) -> Result<AnalysisConfig, ImageError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| ImageError::ResourceLimit("配置读取锁已中毒".to_string()))
    }

    /// 设置性能档位。
    pub fn set_performance_profile(&self, profile: PerformanceProfile) -> Result<(), ImageError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| ImageError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        config.apply_performance_profile(profile);

        log::info!(
            "⚙️ 已切换性能档位：{:?}（filter={:?}）",
            profile,
            config.resize_filter
        );

        Ok(())
    }

    /// 获取当前生效档位。
    pub fn get_performance_profile(&self) -> Result<PerformanceProfile, ImageError> {
        let config = self
            .config
            .read()
            .map_err(|_| ImageError::ResourceLimit("配置读取锁已中毒".to_string()))?;
        Ok(config.infer_performance_profile())
    }

    /// 替换阈值表。
    pub fn set_thresholds(&self, thresholds: ThresholdTable) -> Result<(), ImageError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| ImageError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        config.thresholds = thresholds;
        Ok(())
    }

    /// 处理主入口：加载 → 归一化 → 评分。
    pub fn analyze(&self, source: ImageSource) -> Result<AnalysisResult, ImageError> {
        self.run(source, false).map(|(result, _)| result)
    }

    /// 与 `analyze` 相同，额外返回归一化画布的 PNG Data URL 预览。
    pub fn analyze_with_preview(
        &self,
        source: ImageSource,
    ) -> Result<(AnalysisResult, String), ImageError> {
        let (result, preview) = self.run(source, true)?;
        let preview =
            preview.ok_or_else(|| ImageError::Decode("预览图未生成".to_string()))?;
        Ok((result, preview))
    }

    fn run(
        &self,
        source: ImageSource,
        with_preview: bool,
    ) -> Result<(AnalysisResult, Option<String>), ImageError> {
        let config = self.config_snapshot()?;
        let source_hint = source.hint();
        let total_start = Instant::now();

        let load_start = Instant::now();
        let frame = Self::load_frame(source, &config)?;
        let load_elapsed = load_start.elapsed();

        let mut surface = self
            .surface
            .lock()
            .map_err(|_| ImageError::ResourceLimit("分析画布锁已中毒".to_string()))?;

        let normalize_start = Instant::now();
        normalize_onto(&frame, &mut surface, config.resize_filter)?;
        let normalize_elapsed = normalize_start.elapsed();

        let score_start = Instant::now();
        let result = AnalysisResult::from_surface(&surface, &config.thresholds);
        let score_elapsed = score_start.elapsed();

        let preview = if with_preview {
            Some(surface.to_png_data_url()?)
        } else {
            None
        };

        log::info!(
            "✅ 评分完成 - 来源: {} 分数: {} 文案: {} load={}ms normalize={}ms score={}ms total={}ms",
            source_hint,
            result.score,
            result.label,
            load_elapsed.as_millis(),
            normalize_elapsed.as_millis(),
            score_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok((result, preview))
    }

    fn load_frame(source: ImageSource, config: &AnalysisConfig) -> Result<RgbaImage, ImageError> {
        match source {
            ImageSource::Frame(frame) => Ok(frame),
            ImageSource::Base64(data) => {
                let raw = Self::load_from_base64(&data, config)?;
                Self::decode_frame(raw, config)
            }
            ImageSource::FilePath(path) => {
                let raw = Self::load_from_file(&path, config)?;
                Self::decode_frame(raw, config)
            }
        }
    }
}

impl Default for ImageHandler {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}
