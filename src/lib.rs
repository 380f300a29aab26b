//! # Visham 情绪检测器 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │            宿主 (CLI `visham` / 浏览器 UI 回调)           │
//! │   摄像头帧 · 上传文件 · Data URL        结果 · 文案 · 分享 │
//! └───────┬──────────────────────────────────────────▲───────┘
//!         ↓ ImageSource                 AnalysisReport │
//! ┌───────┼──────────────────────────────────────────┼───────┐
//! │       ↓            analyzer                      │       │
//! │  loader ─→ pipeline ─→ normalizer ─→ score ─→ thresholds │
//! │  (字节)     (RGBA)      (256×256)     (0..=100)  (文案)   │
//! │                                                          │
//! │  ├─ error     AppError (统一错误类型)                     │
//! │  └─ settings  JSON 设置文件 → AnalysisConfig              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`analyzer`] | 加载、解码、cover 归一化、亮度评分、阈值文案 |
//! | [`settings`] | 设置文件读写与配置覆盖 |

pub mod analyzer;
pub mod error;
pub mod settings;

pub use analyzer::{AnalysisResult, ImageError, ImageSource, normalize_and_score};
pub use error::AppError;
