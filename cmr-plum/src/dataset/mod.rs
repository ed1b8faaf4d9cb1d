//! 数据集装配与批采样.
//!
//! 数据根目录 (read-only) 布局:
//!
//! ```text
//! <root>/link.csv
//! <root>/dicoms/<patient_id>/*.dcm
//! <root>/contourfiles/<original_id>/i-contours/*.txt
//! <root>/contourfiles/<original_id>/o-contours/*.txt
//! ```
//!
//! 隐藏文件 (以 `.` 开头) 在任何枚举中都被过滤.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::consts::{ContourVariant, CONTOUR_DIR, DICOM_DIR, LINK_FILENAME};
use crate::{MergedSample, MrSample};

pub mod assemble;
pub mod link;
pub mod pairing;
pub mod provider;

pub use assemble::{build_dataset, build_merged_dataset, merge_samples, BuildError};
pub use link::{LinkError, LinkTable};
pub use pairing::{frame_index, match_pairs, FrameIndexError};
pub use provider::{make_sampler, EpochSampler};

/// 单变体平铺数据集. 样本按病人枚举序、帧文件枚举序排列;
/// 顺序对下游没有语义, 采样器只把它当作索引空间.
pub type MrDataset = Vec<MrSample>;

/// 内外轮廓合并后的平铺数据集.
pub type MergedDataset = Vec<MergedSample>;

/// 获取 `{用户主目录}/dataset` 目录.
pub fn home_dataset_dir() -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    Some(ans)
}

/// 获取 `{用户主目录}/dataset` 目录下给定继续项组成的全路径.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = home_dataset_dir()?;
    ans.extend(it);
    Some(ans)
}

/// 获取病人 DICOM 图像目录 `<root>/dicoms/<patient_id>`.
#[inline]
pub fn dicom_dir(root: &Path, patient_id: &str) -> PathBuf {
    let mut ans = root.to_owned();
    ans.extend([DICOM_DIR, patient_id]);
    ans
}

/// 获取标注号某一轮廓变体的目录
/// `<root>/contourfiles/<original_id>/{i, o}-contours`.
#[inline]
pub fn contour_dir(root: &Path, original_id: &str, variant: ContourVariant) -> PathBuf {
    let mut ans = root.to_owned();
    ans.extend([CONTOUR_DIR, original_id, variant.dir_name()]);
    ans
}

/// 获取链接表路径 `<root>/link.csv`.
#[inline]
pub fn link_path(root: &Path) -> PathBuf {
    root.join(LINK_FILENAME)
}

/// 枚举 `dir` 下扩展名为 `ext` 的所有普通文件, 结果按文件名排序.
///
/// 隐藏文件被过滤. `dir` 不存在 (或不是目录) 时返回空列表,
/// 这不是错误: 病人可能没有任何某一变体的标注.
pub fn list_files(dir: &Path, ext: &str) -> io::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(ext) {
            continue;
        }
        if !path.is_file() {
            continue;
        }
        files.push(path);
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::{contour_dir, dicom_dir, link_path, list_files};
    use crate::consts::ContourVariant;
    use std::fs;
    use std::path::Path;

    #[test]
    fn test_layout_paths() {
        let root = Path::new("/data/cmr");
        assert_eq!(
            dicom_dir(root, "SCD0000101"),
            Path::new("/data/cmr/dicoms/SCD0000101")
        );
        assert_eq!(
            contour_dir(root, "SC-HF-I-1", ContourVariant::Inner),
            Path::new("/data/cmr/contourfiles/SC-HF-I-1/i-contours")
        );
        assert_eq!(
            contour_dir(root, "SC-HF-I-1", ContourVariant::Outer),
            Path::new("/data/cmr/contourfiles/SC-HF-I-1/o-contours")
        );
        assert_eq!(link_path(root), Path::new("/data/cmr/link.csv"));
    }

    #[test]
    fn test_list_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path();
        fs::write(p.join("2.dcm"), b"x").unwrap();
        fs::write(p.join("10.dcm"), b"x").unwrap();
        fs::write(p.join(".hidden.dcm"), b"x").unwrap();
        fs::write(p.join("notes.txt"), b"x").unwrap();
        fs::create_dir(p.join("sub.dcm")).unwrap();

        let files = list_files(p, "dcm").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_str().unwrap())
            .collect();
        // 字典序: "10" 先于 "2".
        assert_eq!(names, ["10.dcm", "2.dcm"]);
    }

    #[test]
    fn test_list_files_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let files = list_files(&dir.path().join("nope"), "dcm").unwrap();
        assert!(files.is_empty());
    }
}
