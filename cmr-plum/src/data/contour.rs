//! 手绘轮廓多边形的解析与栅格化.

use std::fs;
use std::path::Path;

use ndarray::Array2;

use crate::{Idx2d, Mask, VertexF};

/// 轮廓标注解析错误.
#[derive(Debug)]
pub enum ContourParseError {
    /// 读取文件失败 (含文件缺失).
    Io(std::io::Error),

    /// 某一行不是两个浮点坐标. 参数为行号 (1 起).
    BadVertex(usize),
}

/// 单帧手绘轮廓多边形.
///
/// 顶点为亚像素 `(x, y)` 坐标, 多边形隐式闭合 (末顶点与首顶点之间有一条边,
/// 文件中不要求重复首顶点).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contour {
    vertices: Vec<VertexF>,
}

impl Contour {
    /// 解析轮廓标注文件. 文件中每行为空白分隔的 x, y 两个浮点数,
    /// 没有表头与显式闭合标记.
    ///
    /// 任何一行少于两个数或数字非法都是致命错误; 行内多余的字段被忽略.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ContourParseError> {
        let text = fs::read_to_string(path.as_ref()).map_err(ContourParseError::Io)?;

        let mut vertices = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let mut fields = line.split_whitespace();
            let (Some(x), Some(y)) = (fields.next(), fields.next()) else {
                return Err(ContourParseError::BadVertex(idx + 1));
            };
            let x: f64 = x.parse().map_err(|_| ContourParseError::BadVertex(idx + 1))?;
            let y: f64 = y.parse().map_err(|_| ContourParseError::BadVertex(idx + 1))?;
            vertices.push((x, y));
        }

        Ok(Self { vertices })
    }

    /// 从既有顶点序列直接创建轮廓.
    #[inline]
    pub fn new(vertices: Vec<VertexF>) -> Self {
        Self { vertices }
    }

    /// 顶点个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// 是否没有任何顶点?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// 获取顶点序列.
    #[inline]
    pub fn vertices(&self) -> &[VertexF] {
        &self.vertices
    }

    /// 将闭合多边形栅格化为形状 `(height, width)` 的布尔掩码.
    ///
    /// 内部像素按 even-odd 规则判定, 轮廓线自身经过的像素不计入内部.
    /// 自相交多边形按 even-odd 扫描线的自然结果处理, 不做特殊化.
    /// 顶点数少于 3 时返回全 `false` 掩码. 该操作是纯函数.
    ///
    /// `height` 和 `width` 必须大于 0, 否则程序 panic.
    pub fn to_mask(&self, (height, width): Idx2d) -> Mask {
        assert!(height > 0 && width > 0, "掩码尺寸必须为正");

        let mut mask = Array2::from_elem((height, width), false);
        if self.vertices.len() < 3 {
            return mask;
        }

        self.fill_even_odd(&mut mask);
        self.clear_outline(&mut mask);
        mask
    }

    /// 按 even-odd 规则逐扫描线填充严格内部的像素.
    fn fill_even_odd(&self, mask: &mut Mask) {
        let (height, width) = mask.dim();
        let n = self.vertices.len();

        // 每条扫描线与各边交点的 x 坐标.
        let mut xs: Vec<f64> = Vec::with_capacity(n);

        for row in 0..height {
            let y = row as f64;
            xs.clear();

            for i in 0..n {
                let (x0, y0) = self.vertices[i];
                let (x1, y1) = self.vertices[(i + 1) % n];
                if y0 == y1 {
                    // 水平边不产生交点.
                    continue;
                }
                // 半开区间 [ymin, ymax), 防止顶点处重复计数.
                let (ymin, ymax) = if y0 < y1 { (y0, y1) } else { (y1, y0) };
                if y < ymin || y >= ymax {
                    continue;
                }
                xs.push(x0 + (y - y0) * (x1 - x0) / (y1 - y0));
            }

            xs.sort_unstable_by(f64::total_cmp);

            for pair in xs.chunks_exact(2) {
                // 严格位于 (pair[0], pair[1]) 开区间内的整数列.
                let lo = (pair[0].floor() as i64 + 1).max(0);
                let hi = (pair[1].ceil() as i64 - 1).min(width as i64 - 1);
                for col in lo..=hi {
                    mask[(row, col as usize)] = true;
                }
            }
        }
    }

    /// 沿多边形各边 (含闭合边) 清除轮廓线经过的像素.
    fn clear_outline(&self, mask: &mut Mask) {
        let (height, width) = mask.dim();
        let n = self.vertices.len();

        for i in 0..n {
            let (x0, y0) = self.vertices[i];
            let (x1, y1) = self.vertices[(i + 1) % n];

            let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as usize;
            for s in 0..=steps {
                let t = s as f64 / steps as f64;
                let col = (x0 + (x1 - x0) * t).round();
                let row = (y0 + (y1 - y0) * t).round();
                if (0.0..width as f64).contains(&col) && (0.0..height as f64).contains(&row) {
                    mask[(row as usize, col as usize)] = false;
                }
            }
        }
    }
}
