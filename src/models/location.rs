use serde::{Deserialize, Serialize};

/// 登录用户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

/// 区域
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub id: i64,
    #[serde(rename = "area_name")]
    pub name: String,
}

/// 选区
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ward {
    pub id: i64,
    #[serde(rename = "ward_name")]
    pub name: String,
}
