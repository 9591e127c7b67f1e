use serde::{Deserialize, Serialize};

use crate::models::users::entities::{User, UserRole};

/// 学校成员档案
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    pub school_id: i64,
    pub role: UserRole,
    /// 学号，管理员为空
    pub matricule: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    /// 学生所在班级
    pub class_id: Option<i64>,
    /// 学生的家长档案
    pub parent_id: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Profile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }
}

/// 账号 = 认证记录 + 档案
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub user: User,
    pub profile: Profile,
}

/// 创建档案所需的数据（存储层使用）
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub user_id: i64,
    pub school_id: i64,
    pub role: UserRole,
    pub matricule: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub class_id: Option<i64>,
    pub parent_id: Option<i64>,
}
