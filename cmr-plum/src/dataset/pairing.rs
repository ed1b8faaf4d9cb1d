//! 图像帧与轮廓标注文件的配对.
//!
//! 图像文件名只含帧号 (如 `48.dcm`), 标注文件名由帧号按固定模式推导
//! (如 `IM-0001-0048-icontour-manual.txt`). 对每帧图像, 推导出的标注路径
//! 存在则产生一对, 不存在则静默跳过 — 只有部分帧被标注是该数据的常态.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::consts::ContourVariant;

/// 从图像文件名中提取帧号失败.
///
/// 与标注缺失不同, 帧号无法解析说明目录内容不符合数据集约定,
/// 对该病人是致命错误.
#[derive(Debug)]
pub struct FrameIndexError {
    /// 无法解析的文件路径.
    pub path: PathBuf,
}

/// 从文件基本名 (去掉扩展名) 解析帧号. 如 `48.dcm` → 48.
pub fn frame_index(path: &Path) -> Result<u32, FrameIndexError> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.parse().ok())
        .ok_or_else(|| FrameIndexError {
            path: path.to_owned(),
        })
}

/// 将每帧图像与对应的轮廓标注文件配对.
///
/// 对 `images` 中的每个文件, 由帧号推导 `contour_dir` 下期望的标注路径;
/// 该路径出现在 `contours` 中则产生一对. 配对严格 1:1,
/// 每帧图像至多贡献一对.
///
/// # 注意
///
/// 1. 标注缺失的帧被静默跳过, 不是错误.
/// 2. 任一图像帧号解析失败则整体返回 `Err`, 不做部分恢复.
pub fn match_pairs(
    images: &[PathBuf],
    contours: &[PathBuf],
    contour_dir: &Path,
    variant: ContourVariant,
) -> Result<Vec<(PathBuf, PathBuf)>, FrameIndexError> {
    let present: HashSet<&Path> = contours.iter().map(PathBuf::as_path).collect();

    let mut pairs = Vec::new();
    for image in images {
        let frame = frame_index(image)?;
        let expected = contour_dir.join(variant.filename(frame));
        if present.contains(expected.as_path()) {
            pairs.push((image.clone(), expected));
        }
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::{frame_index, match_pairs};
    use crate::consts::ContourVariant;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_frame_index() {
        assert_eq!(frame_index(Path::new("/d/P1/48.dcm")).unwrap(), 48);
        assert_eq!(frame_index(Path::new("7.dcm")).unwrap(), 7);
        assert!(frame_index(Path::new("/d/P1/IM-48.dcm")).is_err());

        let err = frame_index(Path::new("frame-one.dcm")).unwrap_err();
        assert_eq!(err.path, Path::new("frame-one.dcm"));
    }

    /// 两帧图像, 仅第 1 帧有标注 → 恰好一对.
    #[test]
    fn test_match_single_annotated_frame() {
        let cdir = Path::new("/d/contourfiles/A1/i-contours");
        let images = [PathBuf::from("/d/dicoms/P1/1.dcm"), "/d/dicoms/P1/2.dcm".into()];
        let contours = [cdir.join("IM-0001-0001-icontour-manual.txt")];

        let pairs = match_pairs(&images, &contours, cdir, ContourVariant::Inner).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, images[0]);
        assert_eq!(pairs[0].1, contours[0]);
    }

    /// 配对数不超过两侧文件数的较小者.
    #[test]
    fn test_match_is_bounded() {
        let cdir = PathBuf::from("c");
        let images: Vec<PathBuf> = (1..=5).map(|i| format!("d/{i}.dcm").into()).collect();
        let contours: Vec<PathBuf> = [1u32, 3, 9]
            .iter()
            .map(|i| cdir.join(ContourVariant::Outer.filename(*i)))
            .collect();

        let pairs = match_pairs(&images, &contours, &cdir, ContourVariant::Outer).unwrap();
        assert_eq!(pairs.len(), 2); // 帧 1 和 3.
        assert!(pairs.len() <= images.len().min(contours.len()));
    }

    /// 变体不匹配的标注不产生配对.
    #[test]
    fn test_match_respects_variant() {
        let cdir = PathBuf::from("c");
        let images = [PathBuf::from("d/1.dcm")];
        let contours = [cdir.join(ContourVariant::Inner.filename(1))];

        let pairs = match_pairs(&images, &contours, &cdir, ContourVariant::Outer).unwrap();
        assert!(pairs.is_empty());
    }

    /// 帧号解析失败对整个病人是致命错误.
    #[test]
    fn test_bad_frame_index_is_fatal() {
        let cdir = PathBuf::from("c");
        let images = [PathBuf::from("d/1.dcm"), "d/oops.dcm".into()];
        assert!(match_pairs(&images, &[], &cdir, ContourVariant::Inner).is_err());
    }
}
