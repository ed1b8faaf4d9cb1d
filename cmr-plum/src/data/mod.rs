//! 单帧 MR 图像, 轮廓多边形与训练样本的基础数据结构.

use std::ops::Index;
use std::path::Path;

use dicom::dictionary_std::tags;
use dicom::object::{open_file, DefaultDicomObject};
use ndarray::{Array2, ArrayView2};

use crate::{Idx2d, Mask};

mod contour;
mod sample;

pub use contour::{Contour, ContourParseError};
pub use sample::{ImgWriteVis, MergedSample, MrSample};

/// 单帧 MR 图像. 像素以 `f32` 保存, 形状为 `(height, width)`.
///
/// DICOM 元数据中的线性重标定 (slope, intercept) 在解码时一次性完成,
/// 之后该结构只读.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MrImage {
    data: Array2<f32>,
}

impl MrImage {
    /// 打开并解码单帧 DICOM 图像. `path` 为 dcm 文件的本地路径.
    ///
    /// 解码失败时返回 `None`. 目录枚举结果中混有非 DICOM
    /// 文件是常态, 因此解码失败不是错误, 调用方应直接跳过该文件.
    pub fn open<P: AsRef<Path>>(path: P) -> Option<Self> {
        let obj = open_file(path.as_ref()).ok()?;
        Self::decode(&obj)
    }

    /// 从已打开的 DICOM 对象中提取像素矩阵并实施线性重标定.
    ///
    /// 仅支持原生 (非封装) 的 8/16 位单通道像素布局, 其余情况返回 `None`.
    fn decode(obj: &DefaultDicomObject) -> Option<Self> {
        let rows = obj.element(tags::ROWS).ok()?.to_int::<u16>().ok()? as usize;
        let cols = obj.element(tags::COLUMNS).ok()?.to_int::<u16>().ok()? as usize;
        let bits = obj.element(tags::BITS_ALLOCATED).ok()?.to_int::<u16>().ok()?;
        let signed = obj
            .element(tags::PIXEL_REPRESENTATION)
            .ok()
            .and_then(|e| e.to_int::<u16>().ok())
            .unwrap_or(0)
            == 1;

        let raw = obj.element(tags::PIXEL_DATA).ok()?.to_bytes().ok()?;
        let len = rows.checked_mul(cols)?;

        let pixels: Vec<f32> = match bits {
            8 => {
                if raw.len() < len {
                    return None;
                }
                raw[..len].iter().map(|&p| p as f32).collect()
            }
            16 => {
                if raw.len() < len * 2 {
                    return None;
                }
                raw[..len * 2]
                    .chunks_exact(2)
                    .map(|b| {
                        let v = u16::from_le_bytes([b[0], b[1]]);
                        if signed {
                            v as i16 as f32
                        } else {
                            v as f32
                        }
                    })
                    .collect()
            }
            _ => return None,
        };

        let mut data = Array2::from_shape_vec((rows, cols), pixels).ok()?;

        let slope = rescale_attr(obj, tags::RESCALE_SLOPE);
        let intercept = rescale_attr(obj, tags::RESCALE_INTERCEPT);
        if slope != 0.0 && intercept != 0.0 {
            let (slope, intercept) = (slope as f32, intercept as f32);
            data.mapv_inplace(|p| p * slope + intercept);
        }

        Some(Self { data })
    }

    /// 根据裸像素矩阵直接创建 `MrImage` 实体, 不经过任何重标定.
    ///
    /// 该方法主要用于实验目的.
    #[inline]
    pub fn from_pixels(data: Array2<f32>) -> Self {
        Self { data }
    }

    /// 获取图像形状 `(height, width)`.
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 获取图像高度.
    #[inline]
    pub fn height(&self) -> usize {
        self.shape().0
    }

    /// 获取图像宽度.
    #[inline]
    pub fn width(&self) -> usize {
        self.shape().1
    }

    /// 获取图像像素个数.
    #[inline]
    pub fn size(&self) -> usize {
        let (h, w) = self.shape();
        h * w
    }

    /// 获得像素数据的一份不可变 shallow copy.
    #[inline]
    pub fn pixels(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    /// 取出底层像素矩阵.
    #[inline]
    pub fn into_pixels(self) -> Array2<f32> {
        self.data
    }

    /// 收集 `mask` 覆盖的所有像素值, 按行优先序返回.
    ///
    /// `mask` 形状必须与图像一致, 否则程序 panic.
    pub fn masked_pixels(&self, mask: &Mask) -> Vec<f32> {
        assert_eq!(self.shape(), mask.dim(), "掩码与图像形状不一致");
        self.data
            .iter()
            .zip(mask.iter())
            .filter_map(|(&p, &m)| m.then_some(p))
            .collect()
    }
}

impl Index<Idx2d> for MrImage {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

/// 读取重标定属性. 属性缺失或不是数值时按 0.0 处理 (即不触发重标定).
#[inline]
fn rescale_attr(obj: &DefaultDicomObject, tag: dicom::core::Tag) -> f64 {
    obj.element(tag)
        .ok()
        .and_then(|e| e.to_float64().ok())
        .unwrap_or(0.0)
}
