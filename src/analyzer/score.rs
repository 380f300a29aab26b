//! # 评分引擎模块
//!
//! ## 设计思路
//!
//! 分数只取决于归一化画布的像素内容，是纯函数；重复调用结果必须逐位一致。
//! 公式中的常量（BT.709 亮度权重、0.7/0.5 混合系数、255/128 归一化除数）属于对外契约，不做“修正”。
//!
//! ## 实现思路
//!
//! 1. 逐像素计算亮度 `l = 0.2126R + 0.7152G + 0.0722B`（忽略 alpha）
//! 2. 累加 `sum` 与 `sum_sq`，得到均值与方差（方差下限钳制为 0）
//! 3. `raw = (std/128 * 0.7 + (1 - mean/255) * 0.5) * 100`
//! 4. 四舍五入（.5 向上）后钳制到 `[0, 100]`

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ImageError;
use super::surface::AnalysisSurface;

pub const MAX_SCORE: u8 = 100;

const LUMA_R: f64 = 0.2126;
const LUMA_G: f64 = 0.7152;
const LUMA_B: f64 = 0.0722;
const MEAN_NORMALIZER: f64 = 255.0;
const STD_NORMALIZER: f64 = 128.0;
const CONTRAST_WEIGHT: f64 = 0.7;
const DARKNESS_WEIGHT: f64 = 0.5;

/// `[0, 100]` 区间内的整数分数。反序列化时越界值直接报错。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    /// 超过 100 的输入会被钳制。
    pub fn new(value: u8) -> Self {
        Self(value.min(MAX_SCORE))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// 由原始浮点分数得到最终分数。
    ///
    /// 舍入规则为 `.5` 向上取整；`NaN` 视为 0。
    fn from_raw(raw: f64) -> Self {
        let rounded = (raw + 0.5).floor();
        if rounded.is_nan() {
            return Self(0);
        }
        Self(rounded.clamp(0.0, MAX_SCORE as f64) as u8)
    }
}

impl TryFrom<u8> for Score {
    type Error = ImageError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > MAX_SCORE {
            return Err(ImageError::InvalidInput(format!(
                "分数超出范围：{}（上限：{}）",
                value, MAX_SCORE
            )));
        }
        Ok(Self(value))
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 亮度统计量，供日志诊断使用。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LuminanceStats {
    pub mean: f64,
    pub std: f64,
    pub pixels: usize,
}

impl LuminanceStats {
    /// 从 RGBA 字节流计算统计量；像素数为 0 时返回 `None`。
    pub fn from_rgba(rgba: &[u8]) -> Option<Self> {
        let mut sum = 0.0_f64;
        let mut sum_sq = 0.0_f64;
        let mut pixels = 0_usize;

        for px in rgba.chunks_exact(4) {
            let l = LUMA_R * px[0] as f64 + LUMA_G * px[1] as f64 + LUMA_B * px[2] as f64;
            sum += l;
            sum_sq += l * l;
            pixels += 1;
        }

        if pixels == 0 {
            return None;
        }

        let n = pixels as f64;
        let mean = sum / n;
        let variance = (sum_sq / n - mean * mean).max(0.0);

        Some(Self {
            mean,
            std: variance.sqrt(),
            pixels,
        })
    }

    /// 未取整的原始分数。
    pub fn raw_score(&self) -> f64 {
        let mean_norm = self.mean / MEAN_NORMALIZER;
        let std_norm = self.std / STD_NORMALIZER;
        (std_norm * CONTRAST_WEIGHT + (1.0 - mean_norm) * DARKNESS_WEIGHT) * 100.0
    }

    pub fn score(&self) -> Score {
        Score::from_raw(self.raw_score())
    }
}

/// 对任意 RGBA 字节流评分。空输入得 0 分。
pub fn score_pixels(rgba: &[u8]) -> Score {
    LuminanceStats::from_rgba(rgba)
        .map(|stats| stats.score())
        .unwrap_or(Score(0))
}

/// 对归一化画布评分。
pub fn compute_score(surface: &AnalysisSurface) -> Score {
    let Some(stats) = LuminanceStats::from_rgba(surface.as_raw()) else {
        return Score(0);
    };

    log::debug!(
        "📊 亮度统计 - mean={:.4} std={:.4} raw={:.4} pixels={}",
        stats.mean,
        stats.std,
        stats.raw_score(),
        stats.pixels
    );

    stats.score()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(c: u8, pixels: usize) -> Vec<u8> {
        [c, c, c, 255].repeat(pixels)
    }

    #[test]
    fn out_of_range_score_is_rejected_on_deserialize() {
        assert!(serde_json::from_str::<Score>("250").is_err());
        assert!(matches!(Score::try_from(101), Err(ImageError::InvalidInput(_))));

        let score: Score = serde_json::from_str("42").expect("in range");
        assert_eq!(score.value(), 42);
        assert_eq!(serde_json::to_string(&score).expect("serialize"), "42");
    }

    #[test]
    fn uniform_black_scores_fifty() {
        assert_eq!(score_pixels(&uniform(0, 256 * 256)).value(), 50);
    }

    #[test]
    fn uniform_white_scores_zero() {
        assert_eq!(score_pixels(&uniform(255, 256 * 256)).value(), 0);
    }

    #[test]
    fn uniform_grey_follows_closed_form() {
        for c in [1_u8, 17, 64, 100, 127, 128, 200, 254] {
            let expected = ((1.0 - c as f64 / 255.0) * 50.0 + 0.5).floor() as u8;
            assert_eq!(score_pixels(&uniform(c, 1024)).value(), expected, "c = {}", c);
        }
    }

    #[test]
    fn half_black_half_white_scores_ninety_five() {
        let mut rgba = uniform(0, 128 * 256);
        rgba.extend(uniform(255, 128 * 256));

        let stats = LuminanceStats::from_rgba(&rgba).expect("non-empty");
        assert!((stats.mean - 127.5).abs() < 1e-9);
        assert!((stats.std - 127.5).abs() < 1e-6);
        assert!((stats.raw_score() - 94.7265625).abs() < 1e-6);
        assert_eq!(stats.score().value(), 95);
    }

    #[test]
    fn alpha_channel_is_ignored() {
        let opaque = uniform(90, 64);
        let transparent = [90, 90, 90, 0].repeat(64);

        assert_eq!(score_pixels(&opaque), score_pixels(&transparent));
    }

    #[test]
    fn rounding_sends_half_up() {
        assert_eq!(Score::from_raw(49.5).value(), 50);
        assert_eq!(Score::from_raw(49.49).value(), 49);
        assert_eq!(Score::from_raw(-3.0).value(), 0);
        assert_eq!(Score::from_raw(140.0).value(), 100);
        assert_eq!(Score::from_raw(f64::NAN).value(), 0);
    }

    #[test]
    fn empty_buffer_scores_zero() {
        assert_eq!(score_pixels(&[]).value(), 0);
    }

    #[test]
    fn score_constructor_clamps() {
        assert_eq!(Score::new(250).value(), 100);
        assert_eq!(Score::new(42).to_string(), "42");
    }
}
