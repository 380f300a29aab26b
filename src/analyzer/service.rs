//! # 服务层
//!
//! ## 设计思路
//!
//! `AnalysisServiceState` 是宿主（CLI 或 UI 事件回调）持有的状态对象，替代全局单例。
//! 当前分数 / 文案不存放在这里，而是作为每次调用的返回值交给宿主。
//!
//! ## 实现思路
//!
//! 对外仅暴露少量稳定 API：
//! - `analyze`：执行完整评分链路，并组装提示语、分享文本与随机文案
//! - `another_quote`：“再来一句”
//! - `set_performance_profile` / `get_performance_profile`：档位切换与查询

use rand::Rng;
use serde::Serialize;

use super::{
    AnalysisConfig, AnalysisResult, ImageError, ImageHandler, ImageSource, PerformanceProfile,
    QuotePicker,
};

/// 一次分析返回给宿主的完整报告。
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    #[serde(flatten)]
    pub result: AnalysisResult,
    pub quote: &'static str,
    pub toast: String,
    pub share_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

impl AnalysisReport {
    fn new(result: AnalysisResult, quote: &'static str, preview: Option<String>) -> Self {
        let toast = format!("Score: {}% — {}", result.score, result.label);
        let share_text = format!("{}% — {}", result.score, result.label);
        Self {
            result,
            quote,
            toast,
            share_text,
            preview,
        }
    }
}

/// 评分服务状态。
pub struct AnalysisServiceState {
    handler: ImageHandler,
    quotes: QuotePicker,
}

impl AnalysisServiceState {
    /// 使用默认配置创建服务状态。
    pub fn new() -> Self {
        Self::with_config(AnalysisConfig::default())
    }

    /// 使用自定义配置创建服务状态。
    ///
    /// # 示例
    /// ```rust
    /// use visham_detector::analyzer::{AnalysisConfig, AnalysisServiceState, PerformanceProfile};
    ///
    /// let mut config = AnalysisConfig::default();
    /// config.apply_performance_profile(PerformanceProfile::Speed);
    /// let service = AnalysisServiceState::with_config(config);
    /// assert_eq!(service.get_performance_profile()?, "speed");
    /// # Ok::<(), visham_detector::analyzer::ImageError>(())
    /// ```
    pub fn with_config(config: AnalysisConfig) -> Self {
        Self {
            handler: ImageHandler::new(config),
            quotes: QuotePicker,
        }
    }

    pub fn handler(&self) -> &ImageHandler {
        &self.handler
    }

    pub fn analyze(
        &self,
        source: ImageSource,
        with_preview: bool,
    ) -> Result<AnalysisReport, ImageError> {
        let (result, preview) = if with_preview {
            let (result, preview) = self.handler.analyze_with_preview(source)?;
            (result, Some(preview))
        } else {
            (self.handler.analyze(source)?, None)
        };

        Ok(AnalysisReport::new(result, self.quotes.pick(), preview))
    }

    /// “再来一句”：不重新评分，只换一条文案。
    pub fn another_quote(&self) -> &'static str {
        self.quotes.pick()
    }

    /// 使用调用方提供的随机源，便于复现。
    pub fn another_quote_with<R: Rng>(&self, rng: &mut R) -> &'static str {
        self.quotes.pick_with(rng)
    }

    pub fn set_performance_profile(&self, profile: &str) -> Result<(), ImageError> {
        let profile = PerformanceProfile::from_str(profile)?;
        self.handler.set_performance_profile(profile)
    }

    pub fn get_performance_profile(&self) -> Result<&'static str, ImageError> {
        Ok(self.handler.get_performance_profile()?.as_str())
    }
}

impl Default for AnalysisServiceState {
    fn default() -> Self {
        Self::new()
    }
}
