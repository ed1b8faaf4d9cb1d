#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 提供心脏 cine MRI 数据集 (DICOM 图像 + 手绘轮廓标注)
//! 的结构化配对、多边形栅格化和训练批采样功能.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 该 crate 主要负责处理按 `dicoms/` + `contourfiles/` 模式组织的数据
//!   (但如果新数据按照相同模式进行组织, 也可以工作).
//! 2. 在非期望情况下, 程序会直接 panic, 而不会导致内存错误. As what Rust promises.
//!
//! # 功能总览
//!
//! ### 图像与标注解析 ✅
//!
//! DICOM 单帧图像解码 (含线性重标定), 轮廓标注文件解析.
//!
//! 实现位于 `cmr-plum/src/data`.
//!
//! ### 轮廓栅格化 ✅
//!
//! 将隐式闭合的亚像素多边形按 even-odd 规则栅格化为布尔掩码,
//! 轮廓线自身像素不计入内部.
//!
//! 实现位于 `cmr-plum/src/data/contour.rs`.
//!
//! ### 图像-标注配对 ✅
//!
//! 病人号经链接表映射到标注号, 图像帧号推导期望标注文件名,
//! 双侧都存在的帧才产生样本. 标注缺失是常态, 静默跳过.
//!
//! 实现位于 `cmr-plum/src/dataset/{link, pairing}.rs`.
//!
//! ### 数据集装配与内外轮廓合并 ✅
//!
//! 逐病人装配样本并平铺为内存数据集; 合并模式下按图像内容
//! 逐像素相等对齐内外轮廓样本流.
//!
//! 实现位于 `cmr-plum/src/dataset/assemble.rs`.
//!
//! ### epoch 批采样 ✅
//!
//! 固定批长的随机采样器, 保证每个 epoch 内每个样本至少被取到一次.
//!
//! 实现位于 `cmr-plum/src/dataset/provider.rs`.

/// 二维索引 `(height, width)`, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 亚像素精度的轮廓顶点, 按 `(x, y)` 存储.
pub type VertexF = (f64, f64);

/// 布尔掩码. 形状为 `(height, width)`, `true` 代表多边形内部像素.
pub type Mask = ndarray::Array2<bool>;

/// 图像/标注/样本基础数据结构.
mod data;

pub use data::{Contour, ContourParseError, ImgWriteVis, MergedSample, MrImage, MrSample};

pub mod consts;

pub mod dataset;
pub mod prelude;
