//! 登录标识同步
//!
//! 先修改学校后缀，保证之后新分配的学号使用新后缀；再逐个成员改写
//! 认证记录的 login 与档案的 matricule。单个成员失败只记入报告，
//! 已处理的成员不回滚，重跑时按成员当前标识继续修复。
//!
//! 与后缀修改并发的开户可能在成员列表读出之后才写入档案，其学号仍带旧后缀；
//! 以相同后缀再跑一次同步即可修复。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::IdentifierService;
use crate::errors::{Result, SchoolHubError};
use crate::models::{
    ApiResponse, ErrorCode,
    identifiers::{requests::SyncIdentifiersRequest, responses::RenameReport},
    profiles::entities::Profile,
    schools::{entities::School, responses::SchoolResponse},
};
use crate::services::{error_response, forbidden, not_found, school_context, try_response};
use crate::storage::Storage;
use crate::utils::matricule::rewrite_suffix;
use crate::utils::validate::validate_suffix;

pub async fn handle_sync_identifiers(
    service: &IdentifierService,
    request: &HttpRequest,
    sync_request: SyncIdentifiersRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    if !ctx.is_admin() {
        return Ok(forbidden("Only administrators can sync identifiers"));
    }

    let school = match storage.get_school_by_id(ctx.school_id).await {
        Ok(Some(school)) => school,
        Ok(None) => return Ok(not_found(ErrorCode::SchoolNotFound, "School not found")),
        Err(e) => return Ok(error_response("Failed to load school", &e)),
    };

    match sync_school_identifiers(
        storage.as_ref(),
        &school,
        &sync_request.new_suffix,
        sync_request.old_suffix.as_deref(),
    )
    .await
    {
        Ok((school, report)) => {
            let message = if report.is_complete_success() {
                "Identifiers synchronized successfully".to_string()
            } else {
                format!("Identifiers synchronized with {} failures", report.failed)
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                SchoolResponse {
                    school,
                    identifier_sync: Some(report),
                },
                message,
            )))
        }
        Err(e @ SchoolHubError::Validation(_)) => Ok(HttpResponse::BadRequest().json(
            ApiResponse::<()>::error_empty(ErrorCode::SchoolSuffixInvalid, e.message()),
        )),
        Err(e) => Ok(error_response("Failed to sync identifiers", &e)),
    }
}

/// 修改学校后缀并同步全部非管理员成员的登录标识
///
/// 返回更新后的学校与同步报告。后缀非法或已被其他学校占用时不做任何修改。
/// 新后缀与当前后缀相同时只做成员同步，用于修复遗留的旧后缀标识。
pub async fn sync_school_identifiers(
    storage: &dyn Storage,
    school: &School,
    new_suffix: &str,
    old_suffix: Option<&str>,
) -> Result<(School, RenameReport)> {
    validate_suffix(new_suffix).map_err(SchoolHubError::validation)?;

    let updated_school = if school.suffix == new_suffix {
        school.clone()
    } else {
        let taken = storage.get_school_by_suffix(new_suffix).await?;
        if taken.is_some_and(|other| other.id != school.id) {
            return Err(SchoolHubError::conflict(format!(
                "Suffix '{new_suffix}' is already used by another school"
            )));
        }
        storage
            .set_school_suffix(school.id, new_suffix)
            .await?
            .ok_or_else(|| SchoolHubError::not_found(format!("School {} not found", school.id)))?
    };

    let old_suffix = old_suffix.unwrap_or(&school.suffix);
    let mut report = RenameReport::new(old_suffix, new_suffix);

    let profiles = storage.list_non_admin_profiles(school.id).await?;
    report.total = profiles.len();

    for profile in &profiles {
        match sync_member(storage, profile, new_suffix).await {
            Ok(true) => report.updated += 1,
            Ok(false) => report.unchanged += 1,
            Err((identifier, message)) => {
                warn!(
                    "Identifier sync failed for profile {} of school {}: {}",
                    profile.id, school.id, message
                );
                report.record_failure(profile.id, profile.user_id, identifier, message);
            }
        }
    }

    info!(
        "Identifier sync for school {} ({} -> {}): total {}, updated {}, unchanged {}, failed {}",
        school.id,
        report.old_suffix,
        report.new_suffix,
        report.total,
        report.updated,
        report.unchanged,
        report.failed
    );

    Ok((updated_school, report))
}

/// 同步单个成员，返回是否有写入
///
/// 先写认证记录再写档案；档案学号以最终的登录标识为准。
async fn sync_member(
    storage: &dyn Storage,
    profile: &Profile,
    new_suffix: &str,
) -> std::result::Result<bool, (Option<String>, String)> {
    let user = match storage.get_user_by_id(profile.user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Err((
                profile.matricule.clone(),
                "Authentication record not found".to_string(),
            ));
        }
        Err(e) => return Err((profile.matricule.clone(), e.message().to_string())),
    };

    let identifier = Some(user.login.clone());
    let new_login = rewrite_suffix(&user.login, new_suffix)
        .map_err(|e| (identifier.clone(), e.message().to_string()))?;

    let mut changed = false;
    if let Some(login) = &new_login {
        match storage.update_user_login(user.id, login).await {
            Ok(true) => changed = true,
            Ok(false) => {
                return Err((identifier, "Authentication record not updated".to_string()));
            }
            Err(e) => return Err((identifier, e.message().to_string())),
        }
    }

    let final_login = new_login.unwrap_or(user.login);
    if profile.matricule.as_deref() != Some(final_login.as_str()) {
        match storage
            .update_profile_matricule(profile.id, &final_login)
            .await
        {
            Ok(true) => changed = true,
            Ok(false) => return Err((identifier, "Profile record not updated".to_string())),
            Err(e) => return Err((identifier, e.message().to_string())),
        }
    }

    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::tests::{memory_storage, seed_member, seed_school};

    #[tokio::test]
    async fn test_rename_rewrites_suffix_only() {
        let storage = memory_storage().await;
        let school = seed_school(&storage, "old.sn").await;
        let student = seed_member(&storage, &school, UserRole::Student, None).await;
        let teacher = seed_member(&storage, &school, UserRole::Teacher, None).await;
        let parent = seed_member(&storage, &school, UserRole::Parent, None).await;
        let admin = seed_member(&storage, &school, UserRole::Admin, None).await;
        let admin_login = storage
            .get_user_by_id(admin.user_id)
            .await
            .unwrap()
            .unwrap()
            .login;

        let (updated, report) = sync_school_identifiers(&storage, &school, "new.sn", None)
            .await
            .unwrap();
        assert_eq!(updated.suffix, "new.sn");
        assert_eq!(report.old_suffix, "old.sn");
        assert_eq!(report.total, 3);
        assert_eq!(report.updated, 3);
        assert_eq!(report.unchanged, 0);
        assert!(report.is_complete_success());

        for (profile, expected) in [
            (&student, "STU001@new.sn"),
            (&teacher, "TCH001@new.sn"),
            (&parent, "PAR001@new.sn"),
        ] {
            let user = storage.get_user_by_id(profile.user_id).await.unwrap().unwrap();
            assert_eq!(user.login, expected);
            let profile = storage.get_profile_by_id(profile.id).await.unwrap().unwrap();
            assert_eq!(profile.matricule.as_deref(), Some(expected));
        }

        // 管理员不受影响
        let admin_user = storage.get_user_by_id(admin.user_id).await.unwrap().unwrap();
        assert_eq!(admin_user.login, admin_login);

        // 新分配的学号使用新后缀
        let next = storage
            .issue_matricule(school.id, UserRole::Student)
            .await
            .unwrap();
        assert_eq!(next, "STU002@new.sn");
    }

    #[tokio::test]
    async fn test_rerun_counts_unchanged() {
        let storage = memory_storage().await;
        let school = seed_school(&storage, "old.sn").await;
        seed_member(&storage, &school, UserRole::Student, None).await;
        seed_member(&storage, &school, UserRole::Teacher, None).await;

        let (updated, _) = sync_school_identifiers(&storage, &school, "new.sn", None)
            .await
            .unwrap();
        let (_, report) = sync_school_identifiers(&storage, &updated, "new.sn", Some("old.sn"))
            .await
            .unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.updated, 0);
        assert_eq!(report.unchanged, 2);
    }

    #[tokio::test]
    async fn test_rerun_repairs_member_created_during_rename() {
        let storage = memory_storage().await;
        let school = seed_school(&storage, "old.sn").await;
        seed_member(&storage, &school, UserRole::Student, None).await;

        let (updated, first) = sync_school_identifiers(&storage, &school, "new.sn", None)
            .await
            .unwrap();
        assert_eq!(first.updated, 1);

        // 开户在后缀修改前取号，在成员列表读出后才写入
        let late = seed_member(&storage, &updated, UserRole::Student, None).await;
        storage
            .update_user_login(late.user_id, "STU002@old.sn")
            .await
            .unwrap();
        storage
            .update_profile_matricule(late.id, "STU002@old.sn")
            .await
            .unwrap();

        let (_, second) = sync_school_identifiers(&storage, &updated, "new.sn", Some("old.sn"))
            .await
            .unwrap();
        assert_eq!(second.total, 2);
        assert_eq!(second.updated, 1);
        assert_eq!(second.unchanged, 1);

        let user = storage.get_user_by_id(late.user_id).await.unwrap().unwrap();
        assert_eq!(user.login, "STU002@new.sn");
        let profile = storage.get_profile_by_id(late.id).await.unwrap().unwrap();
        assert_eq!(profile.matricule.as_deref(), Some("STU002@new.sn"));
    }

    #[tokio::test]
    async fn test_member_failure_does_not_stop_others() {
        let storage = memory_storage().await;
        let school = seed_school(&storage, "old.sn").await;
        let broken = seed_member(&storage, &school, UserRole::Student, None).await;
        let healthy = seed_member(&storage, &school, UserRole::Student, None).await;
        storage
            .update_user_login(broken.user_id, "BROKEN")
            .await
            .unwrap();

        let (_, report) = sync_school_identifiers(&storage, &school, "new.sn", None)
            .await
            .unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.updated, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.errors[0].profile_id, broken.id);
        assert_eq!(report.errors[0].identifier.as_deref(), Some("BROKEN"));

        let user = storage.get_user_by_id(healthy.user_id).await.unwrap().unwrap();
        assert_eq!(user.login, "STU002@new.sn");
    }

    #[tokio::test]
    async fn test_rejects_taken_or_invalid_suffix() {
        let storage = memory_storage().await;
        let school = seed_school(&storage, "one.sn").await;
        seed_school(&storage, "two.sn").await;

        let err = sync_school_identifiers(&storage, &school, "two.sn", None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E013");

        let err = sync_school_identifiers(&storage, &school, "Bad Suffix", None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E007");

        // 失败时学校后缀保持不变
        let current = storage.get_school_by_id(school.id).await.unwrap().unwrap();
        assert_eq!(current.suffix, "one.sn");
    }
}
