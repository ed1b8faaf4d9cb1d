//! 带 epoch 语义的随机批采样器.

use itertools::Itertools;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Mask, MergedSample, MrSample};

/// 从装配好的平铺数据集创建批采样器. 随机源取自系统熵.
///
/// `samples` 必须非空且 `batch_size` 至少为 1, 否则程序 panic.
#[inline]
pub fn make_sampler<S: Clone>(samples: Vec<S>, batch_size: usize) -> EpochSampler<S> {
    EpochSampler::new(samples, batch_size)
}

/// epoch 感知的固定批长随机采样器.
///
/// 采样器持有整个平铺数据集和一个与之等长的 `seen` 向量,
/// 保证一个 epoch 内每个样本至少被取到一次. 当剩余未见样本不足一批时,
/// 以整个索引空间上的随机补齐填满该批, 因此批内可能出现重复样本,
/// epoch 边界附近存在过采样. 该行为是刻意保留的权衡, 下游不应依赖批内唯一性.
///
/// # 注意
///
/// 1. 采样器独占数据集与 `seen` 状态, 所有操作都要求 `&mut self`;
///   多消费者场景应各自持有独立的采样器实例.
/// 2. 样本插入序对采样没有语义, 采样器只把数据集当作索引空间.
#[derive(Debug)]
pub struct EpochSampler<S> {
    samples: Vec<S>,
    batch_size: usize,
    seen: Vec<bool>,
    rng: StdRng,
}

impl<S: Clone> EpochSampler<S> {
    /// 创建采样器, 随机源取自系统熵.
    ///
    /// `samples` 必须非空且 `batch_size` 至少为 1, 否则程序 panic.
    pub fn new(samples: Vec<S>, batch_size: usize) -> Self {
        Self::with_rng(samples, batch_size, StdRng::from_entropy())
    }

    /// 以固定种子创建采样器, 便于复现实验.
    pub fn with_seed(samples: Vec<S>, batch_size: usize, seed: u64) -> Self {
        Self::with_rng(samples, batch_size, StdRng::seed_from_u64(seed))
    }

    fn with_rng(samples: Vec<S>, batch_size: usize, rng: StdRng) -> Self {
        assert!(!samples.is_empty(), "数据集不能为空");
        assert!(batch_size >= 1, "batch_size 至少为 1");

        let seen = vec![false; samples.len()];
        Self {
            samples,
            batch_size,
            seen,
            rng,
        }
    }

    /// 数据集大小.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// 数据集是否为空? 构造约束下恒为 `false`, 提供该方法只为对齐惯例.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// 批长.
    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// 当前 epoch 是否还有未见样本.
    ///
    /// 全部样本都已见过时返回 `false`, **并同时将 `seen` 全部复位**:
    /// 返回 `false` 的那一次调用就是 epoch 边界, 下一个 epoch
    /// 从全未见状态重新开始.
    pub fn has_next_batch(&mut self) -> bool {
        if self.seen.iter().all(|&s| s) {
            self.seen.fill(false);
            false
        } else {
            true
        }
    }

    /// 取出一批样本. 批长恒等于 `batch_size`, 与剩余未见样本数无关.
    pub fn take_batch(&mut self) -> Vec<S> {
        let indexes = self.batch_indexes();
        for &i in &indexes {
            // 重复标记已见样本是 no-op.
            self.seen[i] = true;
        }
        indexes.into_iter().map(|i| self.samples[i].clone()).collect()
    }

    /// 选出一批样本索引.
    ///
    /// 未见样本多于一批时, 从未见集合中有放回均匀抽取 `batch_size` 个;
    /// 否则从 **整个** 索引空间有放回抽取 `batch_size - |未见|` 个补齐,
    /// 再接上全部未见样本. 补齐部分允许与未见部分重合, 不做去重.
    fn batch_indexes(&mut self) -> Vec<usize> {
        let available: Vec<usize> = (0..self.samples.len())
            .filter(|&i| !self.seen[i])
            .collect();

        if available.len() > self.batch_size {
            (0..self.batch_size)
                .map(|_| available[self.rng.gen_range(0..available.len())])
                .collect()
        } else {
            let fill = self.batch_size - available.len();
            let mut indexes: Vec<usize> = (0..fill)
                .map(|_| self.rng.gen_range(0..self.samples.len()))
                .collect();
            indexes.extend(available);
            indexes
        }
    }
}

impl EpochSampler<MrSample> {
    /// 取出一批样本并拆成 (图像, 掩码) 两列.
    pub fn get_batch(&mut self) -> (Vec<Array2<f32>>, Vec<Mask>) {
        self.take_batch()
            .into_iter()
            .map(|s| (s.image.into_pixels(), s.mask))
            .unzip()
    }
}

impl EpochSampler<MergedSample> {
    /// 取出一批三元样本并拆成 (图像, 内掩码, 外掩码) 三列.
    pub fn get_batch(&mut self) -> (Vec<Array2<f32>>, Vec<Mask>, Vec<Mask>) {
        self.take_batch()
            .into_iter()
            .map(|s| (s.image.into_pixels(), s.inner_mask, s.outer_mask))
            .multiunzip()
    }
}

#[cfg(test)]
mod tests {
    use super::EpochSampler;
    use std::collections::HashSet;

    fn sampler(len: usize, batch_size: usize, seed: u64) -> EpochSampler<usize> {
        EpochSampler::with_seed((0..len).collect(), batch_size, seed)
    }

    /// 跑完一个 epoch, 返回 (各批样本, 批次数).
    fn run_epoch(s: &mut EpochSampler<usize>) -> (Vec<usize>, usize) {
        let mut drawn = Vec::new();
        let mut batches = 0;
        while s.has_next_batch() {
            let batch = s.take_batch();
            assert_eq!(batch.len(), s.batch_size());
            drawn.extend(batch);
            batches += 1;
        }
        (drawn, batches)
    }

    /// 任意数据集大小与批长组合下, 批长都严格等于 `batch_size`.
    #[test]
    fn test_batch_len_is_exact() {
        for (len, batch_size) in [(1, 1), (1, 5), (3, 7), (10, 3), (10, 8), (32, 32)] {
            let mut s = sampler(len, batch_size, 7);
            for _ in 0..4 {
                if !s.has_next_batch() {
                    continue;
                }
                assert_eq!(s.take_batch().len(), batch_size);
            }
        }
    }

    /// 一个 epoch 内取出的样本并集覆盖整个数据集.
    #[test]
    fn test_epoch_covers_dataset() {
        for seed in 0..8 {
            let mut s = sampler(10, 3, seed);
            let (drawn, _) = run_epoch(&mut s);
            let union: HashSet<usize> = drawn.into_iter().collect();
            assert_eq!(union, (0..10).collect());
        }
    }

    /// 10 样本, 批长 8: 两批即见全; 第二批含全部剩余未见样本.
    #[test]
    fn test_two_batch_epoch() {
        let mut s = sampler(10, 8, 42);

        assert!(s.has_next_batch());
        let first = s.take_batch();
        assert_eq!(first.len(), 8);

        assert!(s.has_next_batch());
        let first_set: HashSet<usize> = first.iter().copied().collect();
        let second = s.take_batch();
        assert_eq!(second.len(), 8);

        // 第一批未覆盖的样本全部出现在第二批.
        for missing in (0..10).filter(|i| !first_set.contains(i)) {
            assert!(second.contains(&missing));
        }

        // epoch 结束并复位.
        assert!(!s.has_next_batch());
        assert!(s.has_next_batch());
    }

    /// epoch 边界: `has_next_batch` 恰好返回一次 `false`,
    /// 随后新 epoch 从全未见状态开始并再次覆盖全集.
    #[test]
    fn test_epoch_reset() {
        let mut s = sampler(6, 4, 3);

        let (_, first_batches) = run_epoch(&mut s);
        assert!(first_batches >= 2);

        let (drawn, _) = run_epoch(&mut s);
        let union: HashSet<usize> = drawn.into_iter().collect();
        assert_eq!(union, (0..6).collect());
    }

    /// 批长大于数据集: 单批即是完整 epoch, 且必然含重复样本.
    #[test]
    fn test_batch_larger_than_dataset() {
        let mut s = sampler(3, 8, 11);

        assert!(s.has_next_batch());
        let batch = s.take_batch();
        assert_eq!(batch.len(), 8);

        let union: HashSet<usize> = batch.iter().copied().collect();
        assert_eq!(union, (0..3).collect());
        assert!(!s.has_next_batch());
    }

    /// 固定种子下采样可复现.
    #[test]
    fn test_seeded_reproducibility() {
        let mut a = sampler(16, 5, 99);
        let mut b = sampler(16, 5, 99);
        for _ in 0..5 {
            assert_eq!(a.has_next_batch(), b.has_next_batch());
            assert_eq!(a.take_batch(), b.take_batch());
        }
    }

    #[test]
    #[should_panic]
    fn test_empty_dataset_rejected() {
        let _ = EpochSampler::<usize>::new(vec![], 4);
    }

    #[test]
    #[should_panic]
    fn test_zero_batch_rejected() {
        let _ = EpochSampler::new(vec![1usize], 0);
    }

    /// 列拆分保持批长与形状.
    #[test]
    fn test_get_batch_splits_columns() {
        use crate::{MrImage, MrSample};
        use ndarray::Array2;

        let samples: Vec<MrSample> = (0..4)
            .map(|i| {
                MrSample::new(
                    MrImage::from_pixels(Array2::from_elem((2, 3), i as f32)),
                    Array2::from_elem((2, 3), false),
                )
            })
            .collect();

        let mut s = EpochSampler::with_seed(samples, 2, 5);
        let (images, masks) = s.get_batch();
        assert_eq!(images.len(), 2);
        assert_eq!(masks.len(), 2);
        assert_eq!(images[0].dim(), (2, 3));
        assert_eq!(masks[0].dim(), (2, 3));
    }
}
