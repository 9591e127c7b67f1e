use serde::{Deserialize, Serialize};

// 用户角色
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    SuperAdmin, // 平台管理员
    Admin,      // 学校管理员
    Teacher,    // 教师
    Student,    // 学生
    Parent,     // 家长
}

impl UserRole {
    pub const SUPER_ADMIN: &'static str = "super_admin";
    pub const ADMIN: &'static str = "admin";
    pub const TEACHER: &'static str = "teacher";
    pub const STUDENT: &'static str = "student";
    pub const PARENT: &'static str = "parent";

    pub fn platform_roles() -> &'static [&'static UserRole] {
        &[&Self::SuperAdmin]
    }
    pub fn admin_roles() -> &'static [&'static UserRole] {
        &[&Self::Admin, &Self::SuperAdmin]
    }
    pub fn staff_roles() -> &'static [&'static UserRole] {
        &[&Self::Teacher, &Self::Admin, &Self::SuperAdmin]
    }
    pub fn all_roles() -> &'static [&'static UserRole] {
        &[
            &Self::Student,
            &Self::Parent,
            &Self::Teacher,
            &Self::Admin,
            &Self::SuperAdmin,
        ]
    }

    /// 需要分配学号的角色
    pub fn issuable_roles() -> &'static [UserRole] {
        &[UserRole::Student, UserRole::Teacher, UserRole::Parent]
    }

    /// 学号前缀，管理员没有学号
    pub fn matricule_prefix(&self) -> Option<&'static str> {
        match self {
            UserRole::Student => Some("STU"),
            UserRole::Teacher => Some("TCH"),
            UserRole::Parent => Some("PAR"),
            UserRole::Admin | UserRole::SuperAdmin => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::SuperAdmin)
    }

    pub fn is_staff(&self) -> bool {
        matches!(
            self,
            UserRole::Teacher | UserRole::Admin | UserRole::SuperAdmin
        )
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<UserRole>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的用户角色: '{s}'. 支持的角色: super_admin, admin, teacher, student, parent"
            ))
        })
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::SuperAdmin => write!(f, "{}", UserRole::SUPER_ADMIN),
            UserRole::Admin => write!(f, "{}", UserRole::ADMIN),
            UserRole::Teacher => write!(f, "{}", UserRole::TEACHER),
            UserRole::Student => write!(f, "{}", UserRole::STUDENT),
            UserRole::Parent => write!(f, "{}", UserRole::PARENT),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            UserRole::SUPER_ADMIN => Ok(UserRole::SuperAdmin),
            UserRole::ADMIN => Ok(UserRole::Admin),
            UserRole::TEACHER => Ok(UserRole::Teacher),
            UserRole::STUDENT => Ok(UserRole::Student),
            UserRole::PARENT => Ok(UserRole::Parent),
            _ => Err(format!("Invalid user role: {s}")),
        }
    }
}

// 用户状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,    // 活跃
    Inactive,  // 非活跃
    Suspended, // 暂停
}

impl<'de> Deserialize<'de> for UserStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<UserStatus>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的用户状态: '{s}'. 支持的状态: active, inactive, suspended"
            ))
        })
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserStatus::Active => write!(f, "active"),
            UserStatus::Inactive => write!(f, "inactive"),
            UserStatus::Suspended => write!(f, "suspended"),
        }
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            "suspended" => Ok(UserStatus::Suspended),
            _ => Err(format!("Invalid user status: {s}")),
        }
    }
}

// 认证用户实体（登录凭据记录）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    /// 登录标识：非管理员为学号，管理员为邮箱
    pub login: String,
    pub email: Option<String>,
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub school_id: Option<i64>,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    // 生成 token 对（access + refresh）
    pub fn generate_token_pair(
        &self,
        refresh_token_expiry: Option<chrono::TimeDelta>,
    ) -> Result<crate::utils::jwt::TokenPair, String> {
        let role = self.role.to_string();
        crate::utils::jwt::JwtUtils::generate_token_pair(
            crate::utils::jwt::TokenSubject {
                user_id: self.id,
                role: &role,
                school_id: self.school_id,
            },
            refresh_token_expiry,
        )
        .map_err(|e| format!("生成 token 对失败: {e}"))
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// 创建认证用户所需的数据（存储层使用，密码已哈希）
#[derive(Debug, Clone)]
pub struct NewUser {
    pub login: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub role: UserRole,
    pub school_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_through_str() {
        for role in UserRole::all_roles() {
            let parsed: UserRole = role.to_string().parse().expect("known role");
            assert_eq!(&parsed, *role);
        }
    }

    #[test]
    fn test_only_non_admin_roles_have_prefix() {
        assert_eq!(UserRole::Student.matricule_prefix(), Some("STU"));
        assert_eq!(UserRole::Teacher.matricule_prefix(), Some("TCH"));
        assert_eq!(UserRole::Parent.matricule_prefix(), Some("PAR"));
        assert_eq!(UserRole::Admin.matricule_prefix(), None);
        assert_eq!(UserRole::SuperAdmin.matricule_prefix(), None);
    }

    #[test]
    fn test_role_deserialize_rejects_unknown() {
        let result: Result<UserRole, _> = serde_json::from_str("\"janitor\"");
        assert!(result.is_err());
        let role: UserRole = serde_json::from_str("\"super_admin\"").expect("valid role");
        assert_eq!(role, UserRole::SuperAdmin);
    }
}
