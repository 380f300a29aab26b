//! # 阈值表模块
//!
//! ## 设计思路
//!
//! 分数到文案的映射是一张按上界升序排列的表，最后一项上界固定为 100 作为兜底。
//! 默认表在进程启动时构建一次（`Lazy`），之后只读。
//!
//! ## 实现思路
//!
//! - `ThresholdTable::new` 负责校验：非空、上界严格递增、末项上界为 100。
//! - `resolve` 顺序查找第一个 `score <= upper_bound` 的项，找不到时回退到末项。

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::ImageError;
use super::score::{MAX_SCORE, Score};

/// 单条阈值：分数不超过 `upper_bound` 时使用 `label`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threshold {
    pub upper_bound: u8,
    pub label: String,
}

impl Threshold {
    pub fn new(upper_bound: u8, label: impl Into<String>) -> Self {
        Self {
            upper_bound,
            label: label.into(),
        }
    }
}

/// 有序阈值表。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdTable {
    entries: Vec<Threshold>,
}

static DEFAULT_THRESHOLDS: Lazy<ThresholdTable> = Lazy::new(|| ThresholdTable {
    entries: vec![
        Threshold::new(35, "Chill — snack optional"),
        Threshold::new(65, "Mild Visham — time for a bite"),
        Threshold::new(85, "Strong Visham — proceed with chocolate"),
        Threshold::new(100, "🔥 Visham Detected — Ningal Allandakum!"),
    ],
});

impl ThresholdTable {
    /// 构建自定义阈值表。
    ///
    /// # 示例
    /// ```rust
    /// use visham_detector::analyzer::{Threshold, ThresholdTable};
    ///
    /// let table = ThresholdTable::new(vec![
    ///     Threshold::new(50, "calm"),
    ///     Threshold::new(100, "hangry"),
    /// ])?;
    /// assert_eq!(table.len(), 2);
    /// # Ok::<(), visham_detector::analyzer::ImageError>(())
    /// ```
    pub fn new(entries: Vec<Threshold>) -> Result<Self, ImageError> {
        let Some(last) = entries.last() else {
            return Err(ImageError::InvalidFormat("阈值表不能为空".to_string()));
        };

        if last.upper_bound != MAX_SCORE {
            return Err(ImageError::InvalidFormat(format!(
                "阈值表末项上界必须为 {}（当前：{}）",
                MAX_SCORE, last.upper_bound
            )));
        }

        if let Some(pair) = entries
            .windows(2)
            .find(|pair| pair[0].upper_bound >= pair[1].upper_bound)
        {
            return Err(ImageError::InvalidFormat(format!(
                "阈值上界必须严格递增：{} 之后出现 {}",
                pair[0].upper_bound, pair[1].upper_bound
            )));
        }

        Ok(Self { entries })
    }

    /// 内置默认表。
    pub fn default_table() -> &'static ThresholdTable {
        &DEFAULT_THRESHOLDS
    }

    pub fn entries(&self) -> &[Threshold] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 将分数解析为文案。
    pub fn resolve(&self, score: Score) -> &str {
        self.entries
            .iter()
            .find(|threshold| score.value() <= threshold.upper_bound)
            .or_else(|| self.entries.last())
            .map(|threshold| threshold.label.as_str())
            .unwrap_or_default()
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        DEFAULT_THRESHOLDS.clone()
    }
}
