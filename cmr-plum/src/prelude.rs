//! 🍑欢迎光临🍇
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Contour, Idx2d, ImgWriteVis, Mask, MergedSample, MrImage, MrSample, VertexF};

pub use crate::consts::ContourVariant;

pub use crate::dataset::{
    build_dataset, build_merged_dataset, home_dataset_dir, home_dataset_dir_with, make_sampler,
    BuildError, EpochSampler, LinkTable, MergedDataset, MrDataset,
};

pub use crate::dataset::{self, assemble, pairing};
