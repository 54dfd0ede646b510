//! RTTI 数量分配 - 业务能力层
//!
//! 最大余数法（Hamilton）：把题目总数按权重拆成四个整数，和恰好等于总数。
//! 纯函数，不依赖任何外部服务。

use crate::error::InputError;
use crate::models::rtti::{Category, RttiCounts, RttiWeights};

/// 按权重分配题目数量
///
/// # 参数
/// - `total_questions`: 题目总数（N >= 0）
/// - `weights`: 四个分类的权重（均 >= 0，百分比或原始权重皆可）
///
/// # 返回
/// 四个非负整数，和恰好等于 `total_questions`；
/// 权重总和为 0 时返回全 0
///
/// # 示例
/// ```
/// # use exam_pipeline::models::{RttiCounts, RttiWeights};
/// # use exam_pipeline::services::rtti_calculator::calculate_rtti_counts;
/// let counts = calculate_rtti_counts(7, &RttiWeights::even()).unwrap();
/// assert_eq!(counts, RttiCounts::new(2, 2, 2, 1));
/// ```
pub fn calculate_rtti_counts(
    total_questions: i64,
    weights: &RttiWeights,
) -> Result<RttiCounts, InputError> {
    if total_questions < 0 {
        return Err(InputError::NegativeBudget(total_questions));
    }
    // 计数类型为 u32，超出时报错而不是截断
    if total_questions > i64::from(u32::MAX) {
        return Err(budget_out_of_range(total_questions));
    }
    for category in Category::ALL {
        let value = weights.get(category);
        if value < 0 {
            return Err(InputError::NegativeWeight {
                category: category.label(),
                value,
            });
        }
    }

    let total_weight: i128 = Category::ALL
        .iter()
        .map(|c| i128::from(weights.get(*c)))
        .sum();
    if total_weight == 0 {
        return Ok(RttiCounts::default());
    }

    // 份额 = w * N / W，用整数除法得到整数部分，余数分子共用分母 W，可直接比较
    let n = i128::from(total_questions);
    let mut shares: Vec<(Category, i128, i128)> = Category::ALL
        .iter()
        .map(|c| {
            let scaled = i128::from(weights.get(*c)) * n;
            (*c, scaled / total_weight, scaled % total_weight)
        })
        .collect();

    let assigned: i128 = shares.iter().map(|(_, base, _)| *base).sum();
    let deficit = usize::try_from(n - assigned).unwrap_or(0);

    // 稳定排序：余数相同保持 R > T1 > T2 > I 的声明顺序
    let mut order: Vec<usize> = (0..shares.len()).collect();
    order.sort_by(|a, b| shares[*b].2.cmp(&shares[*a].2));
    for idx in order.into_iter().take(deficit) {
        shares[idx].1 += 1;
    }

    let mut counts = RttiCounts::default();
    for (category, base, _) in shares {
        *counts.get_mut(category) =
            u32::try_from(base).map_err(|_| budget_out_of_range(total_questions))?;
    }
    Ok(counts)
}

fn budget_out_of_range(total_questions: i64) -> InputError {
    InputError::OutOfRange {
        field: "question_count",
        value: total_questions,
        min: 0,
        max: i64::from(u32::MAX),
    }
}
