//! # 分析画布模块
//!
//! ## 设计思路
//!
//! `AnalysisSurface` 是固定 256×256 的 RGBA 缓冲区（行优先、自上而下）。
//! 它可以跨调用复用，因为每次绘制前都会被完整清空再覆盖。

use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, ImageFormat, RgbaImage};

use super::ImageError;

/// 分析画布边长（像素）。
pub const ANALYSIS_SIZE: u32 = 256;

/// 固定尺寸的分析画布。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSurface {
    pixels: RgbaImage,
}

impl AnalysisSurface {
    /// 创建全透明（全 0）画布。
    pub fn new() -> Self {
        Self {
            pixels: RgbaImage::new(ANALYSIS_SIZE, ANALYSIS_SIZE),
        }
    }

    /// 使用现成的 256×256 像素构建画布，尺寸不符时返回 `InvalidInput`。
    pub fn from_rgba(pixels: RgbaImage) -> Result<Self, ImageError> {
        if pixels.width() != ANALYSIS_SIZE || pixels.height() != ANALYSIS_SIZE {
            return Err(ImageError::InvalidInput(format!(
                "分析画布必须为 {}x{}（当前：{}x{}）",
                ANALYSIS_SIZE,
                ANALYSIS_SIZE,
                pixels.width(),
                pixels.height()
            )));
        }
        Ok(Self { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixel_count(&self) -> usize {
        (self.width() as usize) * (self.height() as usize)
    }

    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// 清空为全透明黑。
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// 将 `width × height` 的 RGBA 块写入 `(x, y)` 处。
    ///
    /// 超出画布的部分被裁掉。
    pub(crate) fn blit(&mut self, x: u32, y: u32, width: u32, height: u32, rgba: &[u8]) {
        let surface_width = self.width();
        let surface_height = self.height();
        if x >= surface_width || y >= surface_height {
            return;
        }

        let copy_width = width.min(surface_width - x) as usize;
        let copy_height = height.min(surface_height - y);
        let src_stride = width as usize * 4;
        let dst_stride = surface_width as usize * 4;
        let buffer: &mut [u8] = &mut self.pixels;

        for row in 0..copy_height {
            let src_start = row as usize * src_stride;
            let Some(src_row) = rgba.get(src_start..src_start + copy_width * 4) else {
                break;
            };
            let dst_start = (y + row) as usize * dst_stride + x as usize * 4;
            buffer[dst_start..dst_start + copy_width * 4].copy_from_slice(src_row);
        }
    }

    /// 将画布编码为 PNG Data URL，仅在内存中生成预览。
    pub fn to_png_data_url(&self) -> Result<String, ImageError> {
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(self.pixels.clone())
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| ImageError::Decode(format!("预览图编码失败：{}", e)))?;

        Ok(format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(cursor.into_inner())
        ))
    }
}

impl Default for AnalysisSurface {
    fn default() -> Self {
        Self::new()
    }
}
