//! 数据集布局通用常量.

/// 数据根目录下存放 DICOM 图像的子目录名.
pub const DICOM_DIR: &str = "dicoms";

/// 数据根目录下存放轮廓标注的子目录名.
pub const CONTOUR_DIR: &str = "contourfiles";

/// 数据根目录下病人号-标注号链接表的文件名.
pub const LINK_FILENAME: &str = "link.csv";

/// DICOM 图像文件扩展名 (不含点).
pub const DICOM_EXT: &str = "dcm";

/// 轮廓标注文件扩展名 (不含点).
pub const CONTOUR_EXT: &str = "txt";

/// 轮廓变体. 每帧图像可独立标注内轮廓与外轮廓两条同心边界.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ContourVariant {
    /// 内轮廓 (血池边界).
    Inner,

    /// 外轮廓 (心外膜边界).
    Outer,
}

impl ContourVariant {
    /// 标注号目录下该变体的子目录名.
    #[inline]
    pub const fn dir_name(&self) -> &'static str {
        match self {
            Self::Inner => "i-contours",
            Self::Outer => "o-contours",
        }
    }

    /// 标注文件名中的变体标记字母.
    #[inline]
    pub const fn tag(&self) -> char {
        match self {
            Self::Inner => 'i',
            Self::Outer => 'o',
        }
    }

    /// 根据帧号构造标注文件名, 如 `IM-0001-0048-icontour-manual.txt`.
    /// 帧号补零到 4 位.
    #[inline]
    pub fn filename(&self, frame: u32) -> String {
        format!("IM-0001-{frame:04}-{}contour-manual.txt", self.tag())
    }

    /// 是否为内轮廓?
    #[inline]
    pub const fn is_inner(&self) -> bool {
        matches!(self, Self::Inner)
    }

    /// 是否为外轮廓?
    #[inline]
    pub const fn is_outer(&self) -> bool {
        !self.is_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::ContourVariant;

    #[test]
    fn test_variant_filename() {
        assert_eq!(
            ContourVariant::Inner.filename(48),
            "IM-0001-0048-icontour-manual.txt"
        );
        assert_eq!(
            ContourVariant::Outer.filename(7),
            "IM-0001-0007-ocontour-manual.txt"
        );

        // 超过 4 位的帧号不截断.
        assert_eq!(
            ContourVariant::Inner.filename(12345),
            "IM-0001-12345-icontour-manual.txt"
        );
    }

    #[test]
    fn test_variant_predicates() {
        assert!(ContourVariant::Inner.is_inner());
        assert!(!ContourVariant::Inner.is_outer());
        assert!(ContourVariant::Outer.is_outer());
        assert_eq!(ContourVariant::Inner.dir_name(), "i-contours");
        assert_eq!(ContourVariant::Outer.dir_name(), "o-contours");
    }
}
