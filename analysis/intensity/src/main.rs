//! 血池/心肌像素强度分布统计.
//!
//! 从合并数据集出发, 分别汇集内轮廓覆盖的像素 (血池) 与内外轮廓之间的
//! 像素 (心肌), 打印两类强度的基本统计量、直方图与最优单阈值分割的错误率,
//! 用于评估 "仅靠阈值能否从外轮廓推出内轮廓" 这一问题.

use cmr_plum::prelude::*;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

const SEP: &str = "--------------------------------------------------------";
const BINS: usize = 16;

/// 简单分隔线.
#[inline]
fn sep() {
    println!("{SEP}");
}

/// 获取数据根目录.
///
/// 1. 若环境变量 `$CMR_DATA_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/cmr`.
fn data_root() -> PathBuf {
    if let Ok(d) = env::var("CMR_DATA_DIR") {
        PathBuf::from(d)
    } else {
        home_dataset_dir_with(["cmr"]).unwrap()
    }
}

/// 均值与标准差.
fn mean_std(values: &[f32]) -> (f64, f64) {
    assert!(!values.is_empty());
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    let var = values
        .iter()
        .map(|&v| (v as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    (mean, var.sqrt())
}

/// 将数值分配到 `[lo, hi]` 上的等宽直方图.
fn histogram(values: &[f32], lo: f64, hi: f64, bins: usize) -> Vec<usize> {
    assert!(bins >= 1 && hi > lo);
    let width = (hi - lo) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &v in values {
        let slot = (((v as f64 - lo) / width) as usize).min(bins - 1);
        counts[slot] += 1;
    }
    counts
}

/// 在候选阈值中选取单阈值分割错误率最低者.
///
/// 分割规则: 像素强度大于阈值判为血池, 否则判为心肌.
/// 返回 (最优阈值, 错误率).
fn best_threshold(blood: &[f32], myocardium: &[f32], candidates: &[f64]) -> (f64, f64) {
    assert!(!candidates.is_empty());
    let total = (blood.len() + myocardium.len()) as f64;

    let mut best = (candidates[0], f64::INFINITY);
    for &t in candidates {
        let missed_blood = blood.iter().filter(|&&p| p as f64 <= t).count();
        let missed_myo = myocardium.iter().filter(|&&p| p as f64 > t).count();
        let err = (missed_blood + missed_myo) as f64 / total;
        if err < best.1 {
            best = (t, err);
        }
    }
    best
}

fn print_class(name: &str, values: &[f32]) {
    let (mean, std) = mean_std(values);
    let min = values.iter().copied().fold(f32::INFINITY, f32::min);
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    println!("{name}: count={}, mean={mean:.2}, std={std:.2}, min={min:.1}, max={max:.1}", values.len());
}

fn print_histograms(blood: &[f32], myocardium: &[f32]) {
    let all_min = blood
        .iter()
        .chain(myocardium)
        .copied()
        .fold(f32::INFINITY, f32::min) as f64;
    let all_max = blood
        .iter()
        .chain(myocardium)
        .copied()
        .fold(f32::NEG_INFINITY, f32::max) as f64;
    if !(all_max > all_min) {
        println!("强度恒定, 无法绘制直方图");
        return;
    }

    let blood_hist = histogram(blood, all_min, all_max, BINS);
    let myo_hist = histogram(myocardium, all_min, all_max, BINS);
    let peak = blood_hist.iter().chain(&myo_hist).copied().max().unwrap().max(1);

    let width = (all_max - all_min) / BINS as f64;
    println!("{:>16}  {:24} {:24}", "强度区间", "血池", "心肌");
    for i in 0..BINS {
        let lo = all_min + width * i as f64;
        let bar = |count: usize| "#".repeat(count * 24 / peak);
        println!(
            "[{lo:7.1}, {:7.1})  {:24} {:24}",
            lo + width,
            bar(blood_hist[i]),
            bar(myo_hist[i]),
        );
    }

    let candidates: Vec<f64> = (1..=BINS).map(|i| all_min + width * i as f64).collect();
    let (threshold, err) = best_threshold(blood, myocardium, &candidates);
    println!("最优单阈值: {threshold:.1} (错误率 {:.1}%)", err * 100.0);
}

fn main() -> ExitCode {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .unwrap();

    let root = data_root();
    assert!(root.is_dir(), "数据根目录不存在: {}", root.display());

    let dataset = match build_merged_dataset(&root) {
        Ok(d) => d,
        Err(e) => {
            log::error!("合并数据集构建失败: {e:?}");
            return ExitCode::FAILURE;
        }
    };
    if dataset.is_empty() {
        log::warn!("合并数据集为空, 无可统计内容");
        return ExitCode::SUCCESS;
    }

    let mut blood: Vec<f32> = Vec::new();
    let mut myocardium: Vec<f32> = Vec::new();
    for sample in &dataset {
        blood.extend(sample.image.masked_pixels(&sample.inner_mask));
        myocardium.extend(sample.image.masked_pixels(&sample.myocardium_mask()));
    }
    if blood.is_empty() || myocardium.is_empty() {
        log::warn!("某一类像素为空, 无法比较分布");
        return ExitCode::SUCCESS;
    }

    if let Ok(dir) = env::var("CMR_OVERLAY_DIR") {
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir).unwrap();
        for (i, sample) in dataset.iter().take(8).enumerate() {
            sample.save(dir.join(format!("triplet-{i}.png"))).unwrap();
        }
        log::info!("叠加可视化已写入 {}", dir.display());
    }

    sep();
    println!("合并数据集: {} 个三元样本", dataset.len());
    print_class("血池", &blood);
    print_class("心肌", &myocardium);
    sep();
    print_histograms(&blood, &myocardium);
    sep();

    ExitCode::SUCCESS
}
