use serde::{Deserialize, Serialize};

use crate::models::users::entities::UserRole;

// 公告受众
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    All,
    Teachers,
    Students,
    Parents,
}

impl Audience {
    /// 某角色可见的受众集合
    pub fn visible_to(role: &UserRole) -> Vec<Audience> {
        match role {
            UserRole::Teacher => vec![Audience::All, Audience::Teachers],
            UserRole::Student => vec![Audience::All, Audience::Students],
            UserRole::Parent => vec![Audience::All, Audience::Parents],
            UserRole::Admin | UserRole::SuperAdmin => vec![
                Audience::All,
                Audience::Teachers,
                Audience::Students,
                Audience::Parents,
            ],
        }
    }
}

impl std::fmt::Display for Audience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Audience::All => write!(f, "all"),
            Audience::Teachers => write!(f, "teachers"),
            Audience::Students => write!(f, "students"),
            Audience::Parents => write!(f, "parents"),
        }
    }
}

impl std::str::FromStr for Audience {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Audience::All),
            "teachers" => Ok(Audience::Teachers),
            "students" => Ok(Audience::Students),
            "parents" => Ok(Audience::Parents),
            _ => Err(format!("Invalid audience: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub id: i64,
    pub school_id: i64,
    // 发布者用户ID
    pub author_id: i64,
    pub title: String,
    pub body: String,
    pub audience: Audience,
    // 仅面向某个班级时设置
    pub class_id: Option<i64>,
    pub pinned: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_by_role() {
        let student = Audience::visible_to(&UserRole::Student);
        assert!(student.contains(&Audience::All));
        assert!(student.contains(&Audience::Students));
        assert!(!student.contains(&Audience::Teachers));
        assert_eq!(Audience::visible_to(&UserRole::Admin).len(), 4);
    }
}
