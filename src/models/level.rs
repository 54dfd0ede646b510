use phf::phf_map;

/// 级别代码 → 展示名称（年级 + 学制）
static LEVEL_LABELS: phf::Map<&'static str, &'static str> = phf_map! {
    "MH_1" => "1 mavo havo",
    "MH_2" => "2 mavo havo",
    "HV_1" => "1 havo vwo",
    "HV_2" => "2 havo vwo",
    "M_3" => "3 mavo",
    "M_4" => "4 mavo",
    "H_3" => "3 havo",
    "H_4" => "4 havo",
    "H_5" => "5 havo",
};

/// 级别档案（年级 + 学制）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LevelProfile {
    #[serde(rename = "MH_1")]
    Mh1,
    #[serde(rename = "MH_2")]
    Mh2,
    #[serde(rename = "HV_1")]
    Hv1,
    #[serde(rename = "HV_2")]
    Hv2,
    #[serde(rename = "M_3")]
    M3,
    #[serde(rename = "M_4")]
    M4,
    #[serde(rename = "H_3")]
    H3,
    #[serde(rename = "H_4")]
    H4,
    #[serde(rename = "H_5")]
    H5,
}

impl LevelProfile {
    pub const ALL: [LevelProfile; 9] = [
        LevelProfile::Mh1,
        LevelProfile::Mh2,
        LevelProfile::Hv1,
        LevelProfile::Hv2,
        LevelProfile::M3,
        LevelProfile::M4,
        LevelProfile::H3,
        LevelProfile::H4,
        LevelProfile::H5,
    ];

    /// 获取级别代码
    pub fn code(self) -> &'static str {
        match self {
            LevelProfile::Mh1 => "MH_1",
            LevelProfile::Mh2 => "MH_2",
            LevelProfile::Hv1 => "HV_1",
            LevelProfile::Hv2 => "HV_2",
            LevelProfile::M3 => "M_3",
            LevelProfile::M4 => "M_4",
            LevelProfile::H3 => "H_3",
            LevelProfile::H4 => "H_4",
            LevelProfile::H5 => "H_5",
        }
    }

    /// 获取展示名称（如 "1 mavo havo"）
    pub fn label(self) -> &'static str {
        LEVEL_LABELS.get(self.code()).copied().unwrap_or("")
    }

    /// 从代码解析
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.code() == code.trim())
    }

    /// 从展示名称解析（忽略大小写）
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim().to_lowercase();
        Self::ALL.into_iter().find(|p| p.label() == wanted)
    }
}

impl Default for LevelProfile {
    fn default() -> Self {
        LevelProfile::Mh1
    }
}

impl std::fmt::Display for LevelProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
