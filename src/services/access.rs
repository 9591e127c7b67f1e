//! 校内行级权限
//!
//! 管理员可写全校数据；教师只能写自己任教科目的考试、成绩与教学日志；
//! 学生只能看到自己的数据，家长可以看到自己孩子的数据。

use actix_web::HttpResponse;

use crate::errors::{Result, SchoolHubError};
use crate::middlewares::SchoolContext;
use crate::models::{subjects::entities::Subject, users::entities::UserRole};
use crate::services::{error_response, forbidden};
use crate::storage::Storage;

pub(crate) fn require_admin(ctx: &SchoolContext, action: &str) -> std::result::Result<(), HttpResponse> {
    if ctx.is_admin() {
        Ok(())
    } else {
        Err(forbidden(format!("Only administrators can {action}")))
    }
}

pub(crate) fn require_staff(ctx: &SchoolContext, action: &str) -> std::result::Result<(), HttpResponse> {
    if ctx.role().is_staff() {
        Ok(())
    } else {
        Err(forbidden(format!("Only staff can {action}")))
    }
}

/// 管理员，或该科目的任课教师
pub(crate) fn can_teach(ctx: &SchoolContext, subject: &Subject) -> bool {
    if ctx.is_admin() {
        return true;
    }
    ctx.role() == UserRole::Teacher
        && subject.teacher_id.is_some()
        && subject.teacher_id == ctx.profile_id()
}

/// 调用者可见的学生范围，`None` 表示不限
pub(crate) async fn visible_student_ids(
    storage: &dyn Storage,
    ctx: &SchoolContext,
) -> std::result::Result<Option<Vec<i64>>, HttpResponse> {
    match ctx.role() {
        UserRole::SuperAdmin | UserRole::Admin | UserRole::Teacher => Ok(None),
        UserRole::Student => Ok(Some(ctx.profile_id().into_iter().collect())),
        UserRole::Parent => {
            let Some(parent_id) = ctx.profile_id() else {
                return Ok(Some(Vec::new()));
            };
            match storage.list_children(parent_id).await {
                Ok(children) => Ok(Some(children.into_iter().map(|c| c.id).collect())),
                Err(e) => Err(error_response("Failed to load children", &e)),
            }
        }
    }
}

/// 学生与家长关联的班级
pub(crate) async fn member_class_ids(storage: &dyn Storage, ctx: &SchoolContext) -> Result<Vec<i64>> {
    match ctx.role() {
        UserRole::Student => Ok(ctx
            .profile
            .as_ref()
            .and_then(|p| p.class_id)
            .into_iter()
            .collect()),
        UserRole::Parent => {
            let Some(parent_id) = ctx.profile_id() else {
                return Ok(Vec::new());
            };
            let mut ids: Vec<i64> = storage
                .list_children(parent_id)
                .await?
                .into_iter()
                .filter_map(|child| child.class_id)
                .collect();
            ids.sort_unstable();
            ids.dedup();
            Ok(ids)
        }
        _ => Ok(Vec::new()),
    }
}

/// 校验档案是本校教师
pub(crate) async fn ensure_teacher(storage: &dyn Storage, school_id: i64, teacher_id: i64) -> Result<()> {
    match storage.get_profile_by_id(teacher_id).await? {
        Some(profile) if profile.school_id == school_id && profile.role == UserRole::Teacher => {
            Ok(())
        }
        _ => Err(SchoolHubError::validation(format!(
            "Profile {teacher_id} is not a teacher of this school"
        ))),
    }
}

/// 校验班级属于本校
pub(crate) async fn ensure_class(storage: &dyn Storage, school_id: i64, class_id: i64) -> Result<()> {
    match storage.get_class_by_id(class_id).await? {
        Some(class) if class.school_id == school_id => Ok(()),
        _ => Err(SchoolHubError::validation(format!(
            "Class {class_id} does not belong to this school"
        ))),
    }
}

/// 校验科目属于本校的该班级
pub(crate) async fn ensure_subject_of_class(
    storage: &dyn Storage,
    school_id: i64,
    class_id: i64,
    subject_id: i64,
) -> Result<Subject> {
    match storage.get_subject_by_id(subject_id).await? {
        Some(subject) if subject.school_id == school_id && subject.class_id == class_id => {
            Ok(subject)
        }
        _ => Err(SchoolHubError::validation(format!(
            "Subject {subject_id} is not taught in class {class_id}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profiles::entities::Profile;
    use crate::models::users::entities::{User, UserStatus};

    fn context(role: UserRole, profile_id: Option<i64>) -> SchoolContext {
        let now = chrono::Utc::now();
        SchoolContext {
            school_id: 1,
            user: User {
                id: 10,
                login: "TCH001@lycee.sn".to_string(),
                email: None,
                password_hash: String::new(),
                role,
                status: UserStatus::Active,
                school_id: Some(1),
                last_login: None,
                created_at: now,
                updated_at: now,
            },
            profile: profile_id.map(|id| Profile {
                id,
                user_id: 10,
                school_id: 1,
                role,
                matricule: None,
                first_name: "Awa".to_string(),
                last_name: "Diop".to_string(),
                phone: None,
                class_id: None,
                parent_id: None,
                created_at: now,
                updated_at: now,
            }),
        }
    }

    fn subject(teacher_id: Option<i64>) -> Subject {
        let now = chrono::Utc::now();
        Subject {
            id: 1,
            school_id: 1,
            class_id: 1,
            name: "Maths".to_string(),
            coefficient: 2.0,
            teacher_id,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_teacher_writes_only_own_subjects() {
        let teacher = context(UserRole::Teacher, Some(5));
        assert!(can_teach(&teacher, &subject(Some(5))));
        assert!(!can_teach(&teacher, &subject(Some(6))));
        assert!(!can_teach(&teacher, &subject(None)));

        let admin = context(UserRole::Admin, Some(1));
        assert!(can_teach(&admin, &subject(None)));

        let student = context(UserRole::Student, Some(5));
        assert!(!can_teach(&student, &subject(Some(5))));
    }

    #[test]
    fn test_role_gates() {
        assert!(require_admin(&context(UserRole::Admin, Some(1)), "x").is_ok());
        assert!(require_admin(&context(UserRole::Teacher, Some(1)), "x").is_err());
        assert!(require_staff(&context(UserRole::Teacher, Some(1)), "x").is_ok());
        assert!(require_staff(&context(UserRole::Parent, Some(1)), "x").is_err());
    }
}
