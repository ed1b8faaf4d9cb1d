//! 图像-掩码训练样本.

use std::path::Path;

use image::ImageResult;
use ndarray::Array2;

use super::MrImage;
use crate::Mask;

/// 单帧图像与其轮廓掩码组成的训练样本.
///
/// 两个子结构完全公开, 用户可以直接使用它们实现相关上层功能.
/// 数据一致性 (掩码形状等于图像形状) 由装配流程保证.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MrSample {
    /// 解码后的图像.
    pub image: MrImage,

    /// 轮廓栅格化掩码, 形状与 `image` 相同.
    pub mask: Mask,
}

impl MrSample {
    /// 组合图像与掩码. 两者形状不一致时程序 panic.
    #[inline]
    pub fn new(image: MrImage, mask: Mask) -> Self {
        assert_eq!(image.shape(), mask.dim(), "掩码与图像形状不一致");
        Self { image, mask }
    }
}

/// 内外轮廓合并后的三元训练样本.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MergedSample {
    /// 解码后的图像.
    pub image: MrImage,

    /// 内轮廓掩码.
    pub inner_mask: Mask,

    /// 外轮廓掩码.
    pub outer_mask: Mask,
}

impl MergedSample {
    /// 组合图像与两张掩码. 任一掩码形状与图像不一致时程序 panic.
    #[inline]
    pub fn new(image: MrImage, inner_mask: Mask, outer_mask: Mask) -> Self {
        assert_eq!(image.shape(), inner_mask.dim(), "内轮廓掩码与图像形状不一致");
        assert_eq!(image.shape(), outer_mask.dim(), "外轮廓掩码与图像形状不一致");
        Self {
            image,
            inner_mask,
            outer_mask,
        }
    }

    /// 心肌区域掩码: 外轮廓掩码与内轮廓掩码的对称差.
    pub fn myocardium_mask(&self) -> Mask {
        let mut mask = self.outer_mask.clone();
        mask.zip_mut_with(&self.inner_mask, |o, &i| *o ^= i);
        mask
    }
}

/// 表明一个可以通过 **可视化友好** 模式持久化存储的样本对象.
///
/// 图像以 min-max 规范化后的灰度保存, 掩码覆盖区域被提亮以便肉眼检查
/// 配对与栅格化是否正确. 该输出只是调试视图, 不能反向恢复掩码数据.
pub trait ImgWriteVis {
    /// 按照一定的可视化规则将样本保存到 `path` 路径.
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 将像素矩阵 min-max 规范化到 8-bit 灰度. 常数图像映射为全黑.
fn normalized_gray(img: &MrImage) -> Array2<u8> {
    let view = img.pixels();
    let min = view.iter().copied().fold(f32::INFINITY, f32::min);
    let max = view.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    if !(max > min) {
        return Array2::zeros(img.shape());
    }
    view.mapv(|p| ((p - min) / (max - min) * 255.0) as u8)
}

/// 将底色与掩码提亮量合成为最终灰度.
#[inline]
fn highlight(gray: u8, boost: u8) -> u8 {
    if boost == 0 {
        gray
    } else {
        gray / 2 + boost
    }
}

fn write_gray<P, F>(path: P, shape: crate::Idx2d, pixel: F) -> ImageResult<()>
where
    P: AsRef<Path>,
    F: Fn(crate::Idx2d) -> u8,
{
    let (height, width) = shape;
    let mut buf = image::GrayImage::new(width as u32, height as u32);
    for row in 0..height {
        for col in 0..width {
            buf.put_pixel(col as u32, row as u32, image::Luma([pixel((row, col))]));
        }
    }
    buf.save(path)
}

/// 掩码覆盖区域向白色提亮一半.
impl ImgWriteVis for MrSample {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let gray = normalized_gray(&self.image);
        write_gray(path, self.image.shape(), |pos| {
            highlight(gray[pos], if self.mask[pos] { 128 } else { 0 })
        })
    }
}

/// 血池 (内轮廓) 强提亮, 心肌环带 (外减内) 弱提亮.
impl ImgWriteVis for MergedSample {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let gray = normalized_gray(&self.image);
        write_gray(path, self.image.shape(), |pos| {
            let boost = if self.inner_mask[pos] {
                128
            } else if self.outer_mask[pos] {
                64
            } else {
                0
            };
            highlight(gray[pos], boost)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ImgWriteVis, MergedSample, MrSample};
    use crate::MrImage;
    use ndarray::Array2;

    fn sample_image(shape: crate::Idx2d) -> MrImage {
        let (h, w) = shape;
        MrImage::from_pixels(Array2::from_shape_fn((h, w), |(r, c)| (r * w + c) as f32))
    }

    #[test]
    fn test_myocardium_mask_is_xor() {
        let mut inner = Array2::from_elem((4, 4), false);
        let mut outer = Array2::from_elem((4, 4), false);
        for pos in [(1, 1), (1, 2), (2, 1), (2, 2)] {
            outer[pos] = true;
        }
        inner[(1, 1)] = true;

        let merged = MergedSample::new(sample_image((4, 4)), inner, outer);
        let myo = merged.myocardium_mask();
        assert!(!myo[(1, 1)]);
        assert!(myo[(1, 2)]);
        assert!(myo[(2, 1)]);
        assert!(myo[(2, 2)]);
        assert_eq!(myo.iter().filter(|p| **p).count(), 3);
    }

    #[test]
    #[should_panic]
    fn test_sample_shape_mismatch() {
        let _ = MrSample::new(sample_image((4, 4)), Array2::from_elem((4, 5), false));
    }

    #[test]
    fn test_save_overlay_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.png");

        let mut mask = Array2::from_elem((6, 6), false);
        mask[(2, 2)] = true;
        let sample = MrSample::new(sample_image((6, 6)), mask);
        sample.save(&path).unwrap();
        assert!(path.is_file());
    }
}
