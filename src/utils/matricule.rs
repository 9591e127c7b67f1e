//! 学号（登录标识）格式
//!
//! 形如 `STU007@lycee-moderne.sn`：角色前缀 + 至少三位补零的序号 + `@` + 学校后缀。

use crate::errors::{Result, SchoolHubError};
use crate::models::users::entities::UserRole;

/// 拆分后的学号
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matricule<'a> {
    /// `@` 之前的部分，例如 `STU007`
    pub local_part: &'a str,
    pub suffix: &'a str,
}

/// 生成学号，序号不足三位时补零，超过 999 时自然变宽
pub fn format_matricule(role: &UserRole, counter: i64, suffix: &str) -> Result<String> {
    let prefix = role.matricule_prefix().ok_or_else(|| {
        SchoolHubError::validation(format!("角色 {role} 不分配学号，管理员使用邮箱登录"))
    })?;
    if counter < 1 {
        return Err(SchoolHubError::validation(format!(
            "学号序号必须为正数: {counter}"
        )));
    }
    Ok(format!("{prefix}{counter:03}@{suffix}"))
}

/// 按最后一个 `@` 拆分
pub fn split_matricule(identifier: &str) -> Option<Matricule<'_>> {
    let (local_part, suffix) = identifier.rsplit_once('@')?;
    if local_part.is_empty() {
        return None;
    }
    Some(Matricule { local_part, suffix })
}

/// 替换后缀，保留前缀与序号
///
/// 返回 `Ok(None)` 表示标识已经在新后缀上。
pub fn rewrite_suffix(identifier: &str, new_suffix: &str) -> Result<Option<String>> {
    let parts = split_matricule(identifier).ok_or_else(|| {
        SchoolHubError::validation(format!("登录标识缺少 '@': {identifier}"))
    })?;
    if parts.suffix == new_suffix {
        return Ok(None);
    }
    Ok(Some(format!("{}@{new_suffix}", parts.local_part)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pads_to_three_digits() {
        assert_eq!(
            format_matricule(&UserRole::Student, 7, "lycee.sn").unwrap(),
            "STU007@lycee.sn"
        );
        assert_eq!(
            format_matricule(&UserRole::Teacher, 42, "lycee.sn").unwrap(),
            "TCH042@lycee.sn"
        );
        assert_eq!(
            format_matricule(&UserRole::Parent, 1, "a-b.org").unwrap(),
            "PAR001@a-b.org"
        );
    }

    #[test]
    fn test_format_grows_past_999() {
        assert_eq!(
            format_matricule(&UserRole::Student, 1000, "x.io").unwrap(),
            "STU1000@x.io"
        );
    }

    #[test]
    fn test_admin_roles_rejected() {
        assert!(format_matricule(&UserRole::Admin, 1, "x.io").is_err());
        assert!(format_matricule(&UserRole::SuperAdmin, 1, "x.io").is_err());
    }

    #[test]
    fn test_non_positive_counter_rejected() {
        assert!(format_matricule(&UserRole::Student, 0, "x.io").is_err());
    }

    #[test]
    fn test_rewrite_suffix_keeps_local_part() {
        assert_eq!(
            rewrite_suffix("STU007@old.sn", "new.sn").unwrap(),
            Some("STU007@new.sn".to_string())
        );
    }

    #[test]
    fn test_rewrite_suffix_unchanged() {
        assert_eq!(rewrite_suffix("TCH001@new.sn", "new.sn").unwrap(), None);
    }

    #[test]
    fn test_rewrite_suffix_uses_last_at() {
        assert_eq!(
            rewrite_suffix("weird@local@old.sn", "new.sn").unwrap(),
            Some("weird@local@new.sn".to_string())
        );
    }

    #[test]
    fn test_rewrite_without_at_is_error() {
        assert!(rewrite_suffix("STU007", "new.sn").is_err());
        assert!(rewrite_suffix("@old.sn", "new.sn").is_err());
    }
}
