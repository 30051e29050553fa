// ==========================================
// Trường Tồn 农场看板 - 基础统计
// ==========================================

/// 求和（空集为 0）
pub fn sum(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().sum()
}

/// 算术平均；空集返回 None
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// 中位数；偶数个取中间两数平均；空集返回 None
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// 实现率 = 实际 / 计划 × 100（1 位小数）
///
/// 计划为 0 时没有可比基准，返回 None
pub fn calc_pct(actual: f64, planned: f64) -> Option<f64> {
    if planned == 0.0 {
        return None;
    }
    Some(round1(actual / planned * 100.0))
}

/// 占比 = 部分 / 总计 × 100（不取整）；总计为 0 时为 0
pub fn share_pct(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        part / total * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_median() {
        assert_eq!(mean(&[]), None);
        assert_eq!(median(&[]), None);
        assert_eq!(mean(&[80.0, 100.0, 120.0]), Some(100.0));
        assert_eq!(median(&[120.0, 80.0, 90.0]), Some(90.0));
        assert_eq!(median(&[10.0, 40.0, 20.0, 30.0]), Some(25.0));
    }

    #[test]
    fn test_calc_pct() {
        assert_eq!(calc_pct(50.0, 0.0), None);
        assert_eq!(calc_pct(1.0, 3.0), Some(33.3));
        assert_eq!(calc_pct(120.0, 100.0), Some(120.0));
    }

    #[test]
    fn test_share_and_round() {
        assert_eq!(share_pct(1.0, 0.0), 0.0);
        assert_eq!(round2(share_pct(1.0, 3.0)), 33.33);
        assert_eq!(round1(66.66), 66.7);
        assert_eq!(min(&[3.0, 1.0, 2.0]), Some(1.0));
        assert_eq!(max(&[]), None);
    }
}
