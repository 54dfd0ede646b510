/// 流水线阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// 图片提取
    Extract,
    /// 输入规范化
    Normalize,
    /// 可行性预检
    Validate,
    /// 生成试卷
    Generate,
    /// 协同修订
    CoConstruct,
    /// 质量审计
    Audit,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Extract,
        Stage::Normalize,
        Stage::Validate,
        Stage::Generate,
        Stage::CoConstruct,
        Stage::Audit,
    ];

    /// 是否会替换试卷
    pub fn mutates_artifact(self) -> bool {
        matches!(self, Stage::Generate | Stage::CoConstruct)
    }

    /// 是否读取当前试卷
    pub fn reads_artifact(self) -> bool {
        matches!(self, Stage::CoConstruct | Stage::Audit)
    }

    /// 结果是否与某个试卷版本绑定（生成后会被丢弃或判定过期）
    pub fn bound_to_version(self) -> bool {
        matches!(self, Stage::Validate | Stage::Audit)
    }

    /// 两个阶段能否同时执行
    ///
    /// 同一阶段单飞；生成与修订互斥；预检和审计之间可以并行，但不与改写试卷的阶段重叠
    pub fn conflicts_with(self, other: Stage) -> bool {
        if self == other {
            return true;
        }
        let guarded = |s: Stage| s.mutates_artifact() || s.bound_to_version();
        (self.mutates_artifact() && guarded(other)) || (other.mutates_artifact() && guarded(self))
    }

    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Stage::Extract => "extract",
            Stage::Normalize => "normalize",
            Stage::Validate => "validate",
            Stage::Generate => "generate",
            Stage::CoConstruct => "co_construct",
            Stage::Audit => "audit",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
