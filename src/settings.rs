//! 设置文件：以 JSON 形式覆盖默认的评分配置。
//!
//! 所有字段都是可选的，缺省即沿用 `AnalysisConfig::default()`。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analyzer::{AnalysisConfig, PerformanceProfile, Threshold, ThresholdTable};
use crate::error::AppError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_decoded_pixels: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_decoded_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Vec<Threshold>>,
}

impl AppSettings {
    /// 将设置叠加到配置上；任一字段无效则整体失败，`config` 保持不变。
    pub fn apply_to(&self, config: &mut AnalysisConfig) -> Result<(), AppError> {
        let mut next = config.clone();

        if let Some(profile) = &self.performance_profile {
            next.apply_performance_profile(PerformanceProfile::from_str(profile)?);
        }
        if let Some(limit) = self.max_file_size {
            next.max_file_size = Self::non_zero("max_file_size", limit)?;
        }
        if let Some(limit) = self.max_decoded_pixels {
            next.max_decoded_pixels = Self::non_zero("max_decoded_pixels", limit)?;
        }
        if let Some(limit) = self.max_decoded_bytes {
            next.max_decoded_bytes = Self::non_zero("max_decoded_bytes", limit)?;
        }
        if let Some(entries) = &self.thresholds {
            next.thresholds = ThresholdTable::new(entries.clone())?;
        }

        *config = next;
        Ok(())
    }

    fn non_zero(field: &str, value: u64) -> Result<u64, AppError> {
        if value == 0 {
            return Err(AppError::Settings(format!("{} 不能为 0", field)));
        }
        Ok(value)
    }
}

pub fn load_settings(path: &Path) -> Result<AppSettings, AppError> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str::<AppSettings>(&content)
        .map_err(|e| AppError::Settings(format!("解析设置文件失败: {}", e)))
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> Result<(), AppError> {
    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| AppError::Settings(format!("序列化设置失败: {}", e)))?;

    fs::write(path, content)?;
    Ok(())
}
