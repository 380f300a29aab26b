//! # 评分模块（analyzer）
//!
//! ## 设计思路
//!
//! 该模块将“来源加载 → 解码 → cover 归一化 → 亮度评分 → 阈值文案”按职责拆分为多个子模块。
//! 真正有算法含义的只有 `normalizer` 与 `score`/`thresholds`，其余都是输入输出的薄封装。
//!
//! - `service`：宿主持有的状态，组装报告（提示语、分享文本、随机文案）
//! - `handler`：编排整条处理流水线
//! - `loader`：负责文件 / Base64 加载与安全校验
//! - `pipeline`：负责解码与像素 / 内存上限
//! - `normalizer`：cover 变换与重采样
//! - `score` / `thresholds`：分数与文案
//! - `config/error/source/surface/quotes`：配置、错误、中间数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! 宿主调用（CLI / UI 事件）
//!    ↓
//! service.rs（报告组装）
//!    ↓
//! handler.rs（统一编排 + 阶段耗时日志）
//!    ├─ loader.rs（来源加载 + 体积 / 签名校验）
//!    ├─ pipeline.rs（解码 + 像素限制）
//!    ├─ normalizer.rs（cover → 256×256 画布）
//!    └─ score.rs + thresholds.rs（分数 + 文案）
//!    ↓
//! 返回 AnalysisResult / ImageError
//! ```

mod config;
mod error;
mod handler;
mod loader;
mod normalizer;
mod pipeline;
mod quotes;
mod score;
mod service;
mod source;
mod surface;
mod thresholds;

pub use config::{AnalysisConfig, PerformanceProfile};
pub use error::ImageError;
pub use handler::{AnalysisResult, ImageHandler};
pub use normalizer::{CoverTransform, normalize_onto};
pub use quotes::QuotePicker;
pub use score::{LuminanceStats, MAX_SCORE, Score, compute_score, score_pixels};
pub use service::{AnalysisReport, AnalysisServiceState};
pub use source::ImageSource;
pub use surface::{ANALYSIS_SIZE, AnalysisSurface};
pub use thresholds::{Threshold, ThresholdTable};

/// 一次性入口：使用默认配置与新建画布完成归一化与评分。
///
/// # 示例
/// ```rust
/// use visham_detector::analyzer::{normalize_and_score, ImageSource};
/// use image::{Rgba, RgbaImage};
///
/// let frame = RgbaImage::from_pixel(640, 480, Rgba([255, 255, 255, 255]));
/// let result = normalize_and_score(ImageSource::Frame(frame))?;
/// assert_eq!(result.score.value(), 0);
/// assert_eq!(result.label, "Chill — snack optional");
/// # Ok::<(), visham_detector::analyzer::ImageError>(())
/// ```
pub fn normalize_and_score(source: ImageSource) -> Result<AnalysisResult, ImageError> {
    ImageHandler::default().analyze(source)
}
