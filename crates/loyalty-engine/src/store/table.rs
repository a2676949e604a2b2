//! 行级加锁的内存表
//!
//! 使用 DashMap 保存实体，每一行包裹在独立的 `Mutex` 中：
//! 不同实体的操作互不阻塞，同一实体的“检查-修改”在行锁内串行执行。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;

/// 可作为表主键的实体
pub trait Keyed {
    fn key(&self) -> &str;
}

/// 表中的一行
pub type Row<T> = Arc<Mutex<T>>;

struct Slot<T> {
    /// 插入序号，用于保持列表顺序稳定
    seq: u64,
    row: Row<T>,
}

/// 通用内存表
///
/// 读取方法返回数据的克隆快照，不会长时间持有锁。
/// 需要原子地“检查后修改”时，调用 [`Table::row`] 取得行并自行加锁。
pub struct Table<T> {
    rows: DashMap<String, Slot<T>>,
    next_seq: AtomicU64,
}

impl<T: Clone + Keyed> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Keyed> Table<T> {
    /// 创建空表
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    /// 插入新行
    ///
    /// 主键已存在时不覆盖，返回 false
    pub fn insert(&self, value: T) -> bool {
        let key = value.key().to_string();
        match self.rows.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                vacant.insert(Slot {
                    seq,
                    row: Arc::new(Mutex::new(value)),
                });
                true
            }
        }
    }

    /// 获取行句柄
    ///
    /// 返回前即释放分片锁，调用方对行加锁不会阻塞其他行的插入与读取
    pub fn row(&self, id: &str) -> Option<Row<T>> {
        self.rows.get(id).map(|slot| Arc::clone(&slot.row))
    }

    /// 获取单行快照
    pub fn get(&self, id: &str) -> Option<T> {
        self.row(id).map(|row| row.lock().clone())
    }

    /// 检查是否存在指定主键
    pub fn contains(&self, id: &str) -> bool {
        self.rows.contains_key(id)
    }

    /// 按插入顺序返回所有行句柄
    pub fn rows(&self) -> Vec<Row<T>> {
        let mut rows: Vec<(u64, Row<T>)> = self
            .rows
            .iter()
            .map(|entry| (entry.seq, Arc::clone(&entry.row)))
            .collect();
        rows.sort_by_key(|(seq, _)| *seq);
        rows.into_iter().map(|(_, row)| row).collect()
    }

    /// 按插入顺序列出所有数据快照
    pub fn list(&self) -> Vec<T> {
        self.rows().iter().map(|row| row.lock().clone()).collect()
    }

    /// 按条件筛选数据快照
    pub fn list_by<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        self.rows()
            .iter()
            .filter_map(|row| {
                let value = row.lock();
                predicate(&*value).then(|| value.clone())
            })
            .collect()
    }

    /// 获取数据总数
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
