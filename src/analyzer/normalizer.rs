//! # 画面归一化模块
//!
//! ## 设计思路
//!
//! 任意尺寸的来源图以 “cover” 方式（保持宽高比、铺满、裁掉长边溢出）绘制到 256×256 分析画布上，
//! 使评分与来源分辨率无关。
//!
//! ## 实现思路
//!
//! 1. `scale = max(256/w, 256/h)`，`dw = w*scale`，`dh = h*scale`
//! 2. `dx = (256-dw)/2`，`dy = (256-dh)/2`（居中，溢出部分被裁掉）
//! 3. 计算目标矩形与画布的交集，反推来源图中的可见窗口
//! 4. 清空画布，再把可见窗口重采样进目标矩形
//!
//! 可见窗口与目标矩形等大且对齐到整像素时直接逐行拷贝；否则走 `fast_image_resize`，
//! 失败时回退到 `image::imageops`。

use fast_image_resize as fr;
use image::RgbaImage;
use image::imageops::{self, FilterType};

use super::ImageError;
use super::surface::{ANALYSIS_SIZE, AnalysisSurface};

/// cover 变换参数（画布坐标系，单位：像素）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverTransform {
    pub scale: f64,
    pub dw: f64,
    pub dh: f64,
    pub dx: f64,
    pub dy: f64,
}

/// 一次绘制实际涉及的区域：来源窗口（浮点）映射到画布上的整像素矩形。
#[derive(Debug, Clone, Copy, PartialEq)]
struct DrawWindow {
    dst_x: u32,
    dst_y: u32,
    dst_width: u32,
    dst_height: u32,
    src_left: f64,
    src_top: f64,
    src_width: f64,
    src_height: f64,
}

impl DrawWindow {
    fn is_identity_copy(&self) -> bool {
        self.src_left.fract() == 0.0
            && self.src_top.fract() == 0.0
            && self.src_width == self.dst_width as f64
            && self.src_height == self.dst_height as f64
    }
}

impl CoverTransform {
    /// 计算来源尺寸对应的 cover 变换。宽或高为 0 时返回 `InvalidInput`。
    ///
    /// # 示例
    /// ```rust
    /// use visham_detector::analyzer::CoverTransform;
    ///
    /// let t = CoverTransform::compute(512, 256)?;
    /// assert_eq!((t.scale, t.dx, t.dy), (1.0, -128.0, 0.0));
    /// # Ok::<(), visham_detector::analyzer::ImageError>(())
    /// ```
    pub fn compute(width: u32, height: u32) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidInput(format!(
                "来源尺寸无效：{}x{}（宽高必须大于 0）",
                width, height
            )));
        }

        let size = ANALYSIS_SIZE as f64;
        let w = width as f64;
        let h = height as f64;
        let scale = (size / w).max(size / h);
        let dw = w * scale;
        let dh = h * scale;

        Ok(Self {
            scale,
            dw,
            dh,
            dx: (size - dw) / 2.0,
            dy: (size - dh) / 2.0,
        })
    }

    /// 目标矩形与画布求交，返回需要绘制的区域；完全不可见时返回 `None`。
    fn draw_window(&self, width: u32, height: u32) -> Option<DrawWindow> {
        let size = ANALYSIS_SIZE as f64;

        let left = self.dx.max(0.0).round();
        let right = (self.dx + self.dw).min(size).round();
        let top = self.dy.max(0.0).round();
        let bottom = (self.dy + self.dh).min(size).round();

        if right <= left || bottom <= top {
            return None;
        }

        let src_left = ((left - self.dx) / self.scale).clamp(0.0, width as f64);
        let src_top = ((top - self.dy) / self.scale).clamp(0.0, height as f64);
        let src_width = ((right - left) / self.scale).min(width as f64 - src_left);
        let src_height = ((bottom - top) / self.scale).min(height as f64 - src_top);

        if src_width <= 0.0 || src_height <= 0.0 {
            return None;
        }

        Some(DrawWindow {
            dst_x: left as u32,
            dst_y: top as u32,
            dst_width: (right - left) as u32,
            dst_height: (bottom - top) as u32,
            src_left,
            src_top,
            src_width,
            src_height,
        })
    }
}

/// 将来源帧以 cover 方式绘制到分析画布上。
///
/// 画布会先被清空；未被覆盖的像素保持全透明黑。
pub fn normalize_onto(
    frame: &RgbaImage,
    surface: &mut AnalysisSurface,
    filter: FilterType,
) -> Result<CoverTransform, ImageError> {
    let (width, height) = frame.dimensions();
    let transform = CoverTransform::compute(width, height)?;

    surface.clear();

    let Some(window) = transform.draw_window(width, height) else {
        log::warn!("⚠️ 来源图在画布上不可见：{}x{} -> {:?}", width, height, transform);
        return Ok(transform);
    };

    let pixels = if window.is_identity_copy() {
        copy_window(frame, &window)
    } else {
        match resample_with_fast_image_resize(frame, &window, filter) {
            Ok(pixels) => pixels,
            Err(err) => {
                log::warn!("⚠️ fast_image_resize 重采样失败，回退 imageops::resize：{}", err);
                resample_with_imageops(frame, &window, filter)
            }
        }
    };

    surface.blit(
        window.dst_x,
        window.dst_y,
        window.dst_width,
        window.dst_height,
        &pixels,
    );

    log::debug!(
        "🧩 cover 归一化：{}x{} scale={:.4} offset=({:.2}, {:.2}) filter={:?}",
        width,
        height,
        transform.scale,
        transform.dx,
        transform.dy,
        filter
    );

    Ok(transform)
}

/// 整像素对齐且无缩放：逐行拷贝来源窗口。
fn copy_window(frame: &RgbaImage, window: &DrawWindow) -> Vec<u8> {
    let stride = frame.width() as usize * 4;
    let row_len = window.dst_width as usize * 4;
    let left = window.src_left as usize * 4;
    let top = window.src_top as usize;
    let raw = frame.as_raw();

    let mut pixels = Vec::with_capacity(row_len * window.dst_height as usize);
    for row in 0..window.dst_height as usize {
        let start = (top + row) * stride + left;
        pixels.extend_from_slice(&raw[start..start + row_len]);
    }
    pixels
}

fn resample_with_fast_image_resize(
    frame: &RgbaImage,
    window: &DrawWindow,
    filter: FilterType,
) -> Result<Vec<u8>, ImageError> {
    let src_image = fr::images::ImageRef::new(
        frame.width(),
        frame.height(),
        frame.as_raw(),
        fr::PixelType::U8x4,
    )
    .map_err(|e| ImageError::Decode(format!("构建源图像视图失败：{}", e)))?;

    let mut dst_image =
        fr::images::Image::new(window.dst_width, window.dst_height, fr::PixelType::U8x4);

    let options = fr::ResizeOptions::new()
        .resize_alg(to_resize_alg(filter))
        .crop(
            window.src_left,
            window.src_top,
            window.src_width,
            window.src_height,
        );

    fr::Resizer::new()
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| ImageError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

    Ok(dst_image.into_vec())
}

fn resample_with_imageops(frame: &RgbaImage, window: &DrawWindow, filter: FilterType) -> Vec<u8> {
    let x = window.src_left.floor() as u32;
    let y = window.src_top.floor() as u32;
    let crop_width = (window.src_width.round() as u32).clamp(1, frame.width() - x);
    let crop_height = (window.src_height.round() as u32).clamp(1, frame.height() - y);

    let cropped = imageops::crop_imm(frame, x, y, crop_width, crop_height).to_image();
    imageops::resize(&cropped, window.dst_width, window.dst_height, filter).into_raw()
}

/// `Nearest` 只取样不混色，其余映射为卷积滤波。
fn to_resize_alg(filter: FilterType) -> fr::ResizeAlg {
    let convolution = match filter {
        FilterType::Nearest => return fr::ResizeAlg::Nearest,
        FilterType::Triangle => fr::FilterType::Bilinear,
        FilterType::CatmullRom => fr::FilterType::CatmullRom,
        FilterType::Gaussian => fr::FilterType::Mitchell,
        FilterType::Lanczos3 => fr::FilterType::Lanczos3,
    };
    fr::ResizeAlg::Convolution(convolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    #[test]
    fn square_source_is_identity_transform() {
        let t = CoverTransform::compute(256, 256).expect("valid size");

        assert_eq!(t.scale, 1.0);
        assert_eq!((t.dw, t.dh), (256.0, 256.0));
        assert_eq!((t.dx, t.dy), (0.0, 0.0));
    }

    #[test]
    fn wide_source_is_cropped_horizontally() {
        let t = CoverTransform::compute(512, 256).expect("valid size");

        assert_eq!(t.scale, 1.0);
        assert_eq!((t.dw, t.dh), (512.0, 256.0));
        assert_eq!((t.dx, t.dy), (-128.0, 0.0));
    }

    #[test]
    fn tall_source_is_cropped_vertically() {
        let t = CoverTransform::compute(100, 400).expect("valid size");

        assert!((t.scale - 2.56).abs() < 1e-12);
        assert!((t.dw - 256.0).abs() < 1e-9);
        assert!((t.dh - 1024.0).abs() < 1e-9);
        assert!(t.dx.abs() < 1e-9);
        assert!((t.dy + 384.0).abs() < 1e-9);
    }

    #[test]
    fn zero_dimensions_are_invalid_input() {
        assert!(matches!(
            CoverTransform::compute(0, 10),
            Err(ImageError::InvalidInput(_))
        ));
        assert!(matches!(
            CoverTransform::compute(10, 0),
            Err(ImageError::InvalidInput(_))
        ));
    }

    #[test]
    fn normalizing_square_frame_copies_pixels() {
        let frame = RgbaImage::from_fn(256, 256, |x, y| Rgba([x as u8, y as u8, 7, 255]));
        let mut surface = AnalysisSurface::new();

        normalize_onto(&frame, &mut surface, FilterType::Triangle).expect("normalize");

        assert_eq!(surface.as_image(), &frame);
    }

    #[test]
    fn wide_frame_keeps_center_band() {
        let frame = RgbaImage::from_fn(512, 256, |x, _| match x {
            0..128 => RED,
            128..384 => GREEN,
            _ => BLUE,
        });
        let mut surface = AnalysisSurface::new();

        normalize_onto(&frame, &mut surface, FilterType::Triangle).expect("normalize");

        assert!(surface.as_image().pixels().all(|px| *px == GREEN));
    }

    #[test]
    fn downscaled_frame_fills_whole_surface() {
        let frame = RgbaImage::from_fn(640, 480, |x, y| Rgba([(x % 256) as u8, (y % 256) as u8, 90, 255]));
        let mut surface = AnalysisSurface::new();

        let t = normalize_onto(&frame, &mut surface, FilterType::Triangle).expect("normalize");

        assert!(t.dx < 0.0);
        assert!(t.dy.abs() < 1e-9);
        assert!(surface.as_image().pixels().all(|px| px.0[3] == 255));
    }

    #[test]
    fn downscaled_frame_drops_cropped_sides() {
        let frame = RgbaImage::from_fn(1024, 512, |x, _| match x {
            0..256 => RED,
            256..768 => GREEN,
            _ => BLUE,
        });
        let mut surface = AnalysisSurface::new();

        normalize_onto(&frame, &mut surface, FilterType::Triangle).expect("normalize");

        for x in 4..252 {
            assert_eq!(*surface.as_image().get_pixel(x, 128), GREEN, "column {}", x);
        }
    }

    #[test]
    fn tiny_frame_is_upscaled_to_cover() {
        let frame = RgbaImage::from_pixel(2, 1, Rgba([40, 80, 120, 255]));
        let mut surface = AnalysisSurface::new();

        normalize_onto(&frame, &mut surface, FilterType::Nearest).expect("normalize");

        assert!(surface.as_image().pixels().all(|px| *px == Rgba([40, 80, 120, 255])));
    }

    #[test]
    fn surface_is_cleared_before_drawing() {
        let mut surface = AnalysisSurface::from_rgba(RgbaImage::from_pixel(256, 256, RED))
            .expect("valid surface");
        let frame = RgbaImage::from_pixel(300, 300, GREEN);

        normalize_onto(&frame, &mut surface, FilterType::Triangle).expect("normalize");

        assert!(surface.as_image().pixels().all(|px| *px == GREEN));
    }

    #[test]
    fn imageops_fallback_matches_window_size() {
        let frame = RgbaImage::from_pixel(640, 480, BLUE);
        let window = CoverTransform::compute(640, 480)
            .expect("valid size")
            .draw_window(640, 480)
            .expect("visible");

        let pixels = resample_with_imageops(&frame, &window, FilterType::Triangle);

        assert_eq!(pixels.len(), 256 * 256 * 4);
        assert!(pixels.chunks_exact(4).all(|px| px == BLUE.0));
    }

    fn checkerboard(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        })
    }

    fn is_pure_black_or_white(px: &[u8]) -> bool {
        px == [0, 0, 0, 255] || px == [255, 255, 255, 255]
    }

    #[test]
    fn nearest_filter_samples_without_blending() {
        let frame = checkerboard(1921, 1079);
        let mut surface = AnalysisSurface::new();

        normalize_onto(&frame, &mut surface, FilterType::Nearest).expect("normalize");

        assert!(surface.as_raw().chunks_exact(4).all(is_pure_black_or_white));
    }

    #[test]
    fn nearest_fallback_samples_without_blending() {
        let frame = checkerboard(1921, 1079);
        let window = CoverTransform::compute(1921, 1079)
            .expect("valid size")
            .draw_window(1921, 1079)
            .expect("visible");

        let pixels = resample_with_imageops(&frame, &window, FilterType::Nearest);

        assert!(pixels.chunks_exact(4).all(is_pure_black_or_white));
    }

    #[test]
    fn filters_map_to_resize_algorithms() {
        assert!(matches!(to_resize_alg(FilterType::Nearest), fr::ResizeAlg::Nearest));
        assert!(matches!(
            to_resize_alg(FilterType::Triangle),
            fr::ResizeAlg::Convolution(fr::FilterType::Bilinear)
        ));
        assert!(matches!(
            to_resize_alg(FilterType::CatmullRom),
            fr::ResizeAlg::Convolution(fr::FilterType::CatmullRom)
        ));
    }

    #[test]
    fn draw_window_maps_crop_back_to_source() {
        let window = CoverTransform::compute(640, 480)
            .expect("valid size")
            .draw_window(640, 480)
            .expect("visible");

        assert_eq!((window.dst_x, window.dst_y), (0, 0));
        assert_eq!((window.dst_width, window.dst_height), (256, 256));
        assert!((window.src_left - 80.0).abs() < 1e-6);
        assert!((window.src_width - 480.0).abs() < 1e-6);
        assert!((window.src_height - 480.0).abs() < 1e-6);
    }
}
