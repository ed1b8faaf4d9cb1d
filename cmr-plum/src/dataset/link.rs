//! 病人号与标注号的链接表.
//!
//! 两套文件树由不同流程独立产出, 病人号 (`patient_id`) 与标注号
//! (`original_id`) 互不相同, 二者的对应关系由一张带表头的逗号分隔表给出.

use std::fs;
use std::path::Path;

/// 链接表加载错误.
#[derive(Debug)]
pub enum LinkError {
    /// 打开或读取文件失败 (含文件缺失).
    Io(std::io::Error),

    /// 表头缺少必需列. 参数为缺失的列名.
    MissingColumn(&'static str),

    /// 某一行列数不足. 参数为行号 (1 起, 表头为第 1 行).
    BadRow(usize),
}

/// `patient_id` → `original_id` 链接表.
///
/// 条目保持文件中的行序, 该顺序决定数据集装配时的病人枚举序.
/// 重复的 `patient_id` 以最后出现的值为准, 条目位置保持首次出现处.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct LinkTable {
    entries: Vec<(String, String)>,
}

impl LinkTable {
    /// 从带表头的逗号分隔文件加载链接表.
    ///
    /// 表头必须包含 `patient_id` 与 `original_id` 两列 (顺序不限,
    /// 允许其他列). 空白行被跳过, 行尾的 `\r` 被容忍.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LinkError> {
        let text = fs::read_to_string(path.as_ref()).map_err(LinkError::Io)?;
        let mut lines = text.lines().map(|l| l.trim_end_matches('\r'));

        let header = lines.next().ok_or(LinkError::BadRow(1))?;
        let columns: Vec<&str> = header.split(',').collect();
        let patient_col = find_column(&columns, "patient_id")?;
        let original_col = find_column(&columns, "original_id")?;

        let mut table = Self::default();
        for (idx, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').collect();
            let (Some(patient), Some(original)) =
                (fields.get(patient_col), fields.get(original_col))
            else {
                return Err(LinkError::BadRow(idx + 2));
            };
            table.insert(patient, original);
        }

        Ok(table)
    }

    /// 插入一条链接. 已有相同 `patient_id` 时更新其值并保持原位置.
    pub fn insert(&mut self, patient_id: &str, original_id: &str) {
        match self.entries.iter_mut().find(|(p, _)| p == patient_id) {
            Some((_, o)) => *o = original_id.to_owned(),
            None => self
                .entries
                .push((patient_id.to_owned(), original_id.to_owned())),
        }
    }

    /// 查询病人对应的标注号.
    pub fn get(&self, patient_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == patient_id)
            .map(|(_, o)| o.as_str())
    }

    /// 按文件行序迭代 `(patient_id, original_id)`.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, o)| (p.as_str(), o.as_str()))
    }

    /// 链接条目个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否没有任何条目?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 在表头中定位列.
fn find_column(columns: &[&str], name: &'static str) -> Result<usize, LinkError> {
    columns
        .iter()
        .position(|c| c.trim() == name)
        .ok_or(LinkError::MissingColumn(name))
}
