//! 评分聚合
//!
//! 星级按增量方式维护：每次在已截断的旧平均值基础上计算，而非从全部评分重新求均值。
//! 因此结果会累积向下取整误差，例如 [4, 2, 5] 得到 4, 3, 3。

/// 计算加入新评分后的星级
///
/// `count` 为加入前的评价数量。
pub fn incremental_average(current: u8, count: usize, rating: u8) -> u8 {
    if count == 0 {
        return rating;
    }

    let count = count as u64;
    let total = u64::from(current) * count + u64::from(rating);
    // 旧平均值与新评分都在 0..=5 内，结果不会超过 5
    (total / (count + 1)) as u8
}
