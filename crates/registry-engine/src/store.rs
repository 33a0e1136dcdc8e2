//! 稀疏表存储
//!
//! 以单调递增的稠密计数器分配ID，读取未分配的ID返回默认值而非失败。

use registry_core::{ImageId, PatientId, PractitionerId};
use std::collections::HashMap;
use std::hash::Hash;

/// 稠密ID键
pub trait DenseKey: Copy + Eq + Hash + From<u64> {
    fn raw(self) -> u64;
}

impl DenseKey for PatientId {
    fn raw(self) -> u64 {
        self.0
    }
}

impl DenseKey for PractitionerId {
    fn raw(self) -> u64 {
        self.0
    }
}

impl DenseKey for ImageId {
    fn raw(self) -> u64 {
        self.0
    }
}

/// 以计数器为键的稀疏表
#[derive(Debug, Clone)]
pub struct SparseTable<K, V> {
    rows: HashMap<K, V>,
    counter: u64,
}

impl<K: DenseKey, V> SparseTable<K, V> {
    pub fn new() -> Self {
        Self {
            rows: HashMap::new(),
            counter: 0,
        }
    }

    /// 下一个将被分配的ID，不占用
    pub fn peek_next_id(&self) -> K {
        K::from(self.counter + 1)
    }

    /// 分配下一个ID并插入记录
    pub fn insert_next(&mut self, build: impl FnOnce(K) -> V) -> K {
        let id = self.peek_next_id();
        let row = build(id);
        self.rows.insert(id, row);
        self.counter = id.raw();
        id
    }

    pub fn get(&self, id: K) -> Option<&V> {
        self.rows.get(&id)
    }

    pub fn get_mut(&mut self, id: K) -> Option<&mut V> {
        self.rows.get_mut(&id)
    }

    /// 当前计数器，即最后分配的ID
    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 按 1..=counter 顺序列出所有ID
    pub fn ids(&self) -> Vec<K> {
        (1..=self.counter).map(K::from).collect()
    }

    /// 按ID升序遍历
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> + '_ {
        (1..=self.counter).filter_map(move |raw| {
            let id = K::from(raw);
            self.rows.get(&id).map(|row| (id, row))
        })
    }
}

impl<K: DenseKey, V: Clone + Default> SparseTable<K, V> {
    /// 原始读取：未分配的ID返回零值记录
    pub fn get_or_default(&self, id: K) -> V {
        self.rows.get(&id).cloned().unwrap_or_default()
    }
}

impl<K: DenseKey, V> Default for SparseTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
