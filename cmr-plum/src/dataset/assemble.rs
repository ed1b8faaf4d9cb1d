//! 数据集装配.
//!
//! 一次性急切构建: 逐病人枚举文件、配对、解码、栅格化, 并把所有样本
//! 平铺为一个内存数据集. 在任何批被取出之前, 整个数据集已经物化完毕.
//! 除显式容忍的逐样本跳过情形外, 任一病人流水线的失败都会中止整个构建.

use std::path::Path;

use itertools::iproduct;

use super::link::{LinkError, LinkTable};
use super::pairing::{match_pairs, FrameIndexError};
use super::{contour_dir, dicom_dir, link_path, list_files, MergedDataset, MrDataset};
use crate::consts::{ContourVariant, CONTOUR_EXT, DICOM_EXT};
use crate::{Contour, ContourParseError, MergedSample, MrImage, MrSample};

/// 数据集构建错误. 所有变体都不可恢复, 直接传播给构建的调用者.
#[derive(Debug)]
pub enum BuildError {
    /// 链接表缺失或格式非法.
    Link(LinkError),

    /// 文件枚举时的底层 I/O 错误.
    Io(std::io::Error),

    /// 图像文件名中的帧号无法解析.
    FrameIndex(FrameIndexError),

    /// 轮廓标注文件内容非法.
    Contour(ContourParseError),
}

impl From<LinkError> for BuildError {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

impl From<std::io::Error> for BuildError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<FrameIndexError> for BuildError {
    fn from(e: FrameIndexError) -> Self {
        Self::FrameIndex(e)
    }
}

impl From<ContourParseError> for BuildError {
    fn from(e: ContourParseError) -> Self {
        Self::Contour(e)
    }
}

/// 装配单对 (图像, 标注) 样本.
///
/// 图像解码失败时返回 `Ok(None)`: 枚举结果中混有无法解码的文件是常态,
/// 该对被静默丢弃, 不记为错误. 标注解析失败则是致命错误.
pub fn assemble_pair(image_path: &Path, contour_path: &Path) -> Result<Option<MrSample>, BuildError> {
    let Some(image) = MrImage::open(image_path) else {
        return Ok(None);
    };

    let contour = Contour::open(contour_path)?;
    let mask = contour.to_mask(image.shape());
    Ok(Some(MrSample::new(image, mask)))
}

/// 装配单个病人在单一轮廓变体下的全部样本, 按帧文件枚举序排列.
pub fn patient_samples(
    root: &Path,
    patient_id: &str,
    original_id: &str,
    variant: ContourVariant,
) -> Result<Vec<MrSample>, BuildError> {
    let images = list_files(&dicom_dir(root, patient_id), DICOM_EXT)?;
    let cdir = contour_dir(root, original_id, variant);
    let contours = list_files(&cdir, CONTOUR_EXT)?;
    let pairs = match_pairs(&images, &contours, &cdir, variant)?;

    let mut samples = Vec::with_capacity(pairs.len());
    for (image, contour) in &pairs {
        if let Some(sample) = assemble_pair(image, contour)? {
            samples.push(sample);
        }
    }

    log::debug!(
        "病人 {patient_id} ({variant:?}): {} 帧配对, {} 个样本",
        pairs.len(),
        samples.len()
    );
    Ok(samples)
}

/// 按图像内容对齐内外轮廓两条独立装配的样本流.
///
/// 采用穷举笛卡尔积比较: 内样本与外样本的图像逐像素完全相等时产生一个
/// 三元样本. 同一图像在任一侧多次出现时可能产生多个三元样本, 不做去重.
pub fn merge_samples(inner: &[MrSample], outer: &[MrSample]) -> Vec<MergedSample> {
    iproduct!(inner, outer)
        .filter(|(i, o)| i.image == o.image)
        .map(|(i, o)| MergedSample::new(i.image.clone(), i.mask.clone(), o.mask.clone()))
        .collect()
}

/// 构建单一轮廓变体的平铺数据集.
///
/// `root` 为数据根目录, 其下须有 `link.csv` 链接表
/// (见 [`crate::dataset`] 模块文档的布局说明). 病人按链接表行序迭代.
pub fn build_dataset<P: AsRef<Path>>(
    root: P,
    variant: ContourVariant,
) -> Result<MrDataset, BuildError> {
    let root = root.as_ref();
    let link = LinkTable::open(link_path(root))?;

    let mut dataset = MrDataset::new();
    for (patient, original) in link.iter() {
        dataset.extend(patient_samples(root, patient, original, variant)?);
    }

    log::info!("数据集装配完成 ({variant:?}): {} 个样本", dataset.len());
    Ok(dataset)
}

/// 构建内外轮廓合并的平铺数据集.
///
/// 对每个病人分别装配内轮廓与外轮廓样本流, 再按图像内容合并为三元样本.
pub fn build_merged_dataset<P: AsRef<Path>>(root: P) -> Result<MergedDataset, BuildError> {
    let root = root.as_ref();
    let link = LinkTable::open(link_path(root))?;

    let mut dataset = MergedDataset::new();
    for (patient, original) in link.iter() {
        let inner = patient_samples(root, patient, original, ContourVariant::Inner)?;
        let outer = patient_samples(root, patient, original, ContourVariant::Outer)?;
        dataset.extend(merge_samples(&inner, &outer));
    }

    log::info!("合并数据集装配完成: {} 个三元样本", dataset.len());
    Ok(dataset)
}
