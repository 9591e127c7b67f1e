//! 创建账号
//!
//! 先写认证记录再写档案，档案写入失败时删除已创建的认证记录。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::AccountService;
use crate::config::{AppConfig, Argon2Config};
use crate::errors::{Result, SchoolHubError};
use crate::models::{
    ApiResponse, ErrorCode,
    profiles::{
        entities::{Account, NewProfile},
        requests::CreateAccountRequest,
        responses::AccountResponse,
    },
    schools::entities::School,
    users::entities::{NewUser, UserRole},
};
use crate::services::{error_response, forbidden, not_found, school_context, try_response};
use crate::storage::Storage;
use crate::utils::password::hash_password_with;
use crate::utils::random_code::generate_initial_password;
use crate::utils::validate::{validate_email, validate_name, validate_password_simple};

/// 自动生成的初始密码长度
pub const INITIAL_PASSWORD_LENGTH: usize = 12;

pub async fn create_account(
    service: &AccountService,
    request: &HttpRequest,
    create_request: CreateAccountRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    if !ctx.is_admin() {
        return Ok(forbidden("Only administrators can create accounts"));
    }

    let school = match storage.get_school_by_id(ctx.school_id).await {
        Ok(Some(school)) => school,
        Ok(None) => return Ok(not_found(ErrorCode::SchoolNotFound, "School not found")),
        Err(e) => return Ok(error_response("Failed to load school", &e)),
    };

    match provision_account(
        storage.as_ref(),
        &school,
        create_request,
        &AppConfig::get().argon2,
    )
    .await
    {
        Ok((account, initial_password)) => Ok(HttpResponse::Created().json(
            ApiResponse::success(
                AccountResponse {
                    account,
                    initial_password,
                },
                "Account created successfully",
            ),
        )),
        Err(e) if e.http_status().is_server_error() => {
            error!("Account creation failed in school {}: {}", school.id, e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::<()>::error_empty(
                ErrorCode::AccountCreationFailed,
                format!("Failed to create account: {}", e.message()),
            )))
        }
        Err(e) => Ok(error_response("Failed to create account", &e)),
    }
}

/// 校验学生的班级与家长均属于本校
pub(super) async fn check_student_links(
    storage: &dyn Storage,
    school: &School,
    class_id: Option<i64>,
    parent_id: Option<i64>,
) -> Result<()> {
    if let Some(class_id) = class_id {
        let class = storage.get_class_by_id(class_id).await?;
        if !class.is_some_and(|c| c.school_id == school.id) {
            return Err(SchoolHubError::validation(format!(
                "Class {class_id} does not belong to this school"
            )));
        }
    }
    if let Some(parent_id) = parent_id {
        let parent = storage.get_profile_by_id(parent_id).await?;
        if !parent.is_some_and(|p| p.school_id == school.id && p.role == UserRole::Parent) {
            return Err(SchoolHubError::validation(format!(
                "Profile {parent_id} is not a parent of this school"
            )));
        }
    }
    Ok(())
}

/// 创建认证记录与档案
///
/// 返回账号与自动生成的初始密码（调用方提供密码时为空）。
pub async fn provision_account(
    storage: &dyn Storage,
    school: &School,
    req: CreateAccountRequest,
    argon2: &Argon2Config,
) -> Result<(Account, Option<String>)> {
    if req.role == UserRole::SuperAdmin {
        return Err(SchoolHubError::validation(
            "Platform administrators cannot belong to a school",
        ));
    }
    validate_name(&req.first_name).map_err(SchoolHubError::validation)?;
    validate_name(&req.last_name).map_err(SchoolHubError::validation)?;

    let email = req.email.as_deref().map(|e| e.trim().to_lowercase());
    if let Some(email) = &email {
        validate_email(email).map_err(SchoolHubError::validation)?;
    }

    // 只有学生关联班级与家长
    let (class_id, parent_id) = if req.role == UserRole::Student {
        (req.class_id, req.parent_id)
    } else {
        (None, None)
    };
    check_student_links(storage, school, class_id, parent_id).await?;

    let (password, initial_password) = match req.password {
        Some(password) => {
            validate_password_simple(&password).map_err(SchoolHubError::validation)?;
            (password, None)
        }
        None => {
            let generated = generate_initial_password(INITIAL_PASSWORD_LENGTH);
            (generated.clone(), Some(generated))
        }
    };
    let password_hash = hash_password_with(&password, argon2)?;

    // 管理员以邮箱登录，其他角色以学号登录
    let login = if req.role.is_admin() {
        match &email {
            Some(email) => email.clone(),
            None => {
                return Err(SchoolHubError::validation(
                    "Email is required for administrator accounts",
                ));
            }
        }
    } else {
        storage.issue_matricule(school.id, req.role).await?
    };

    let user = storage
        .create_user(NewUser {
            login: login.clone(),
            email,
            password_hash,
            role: req.role,
            school_id: Some(school.id),
        })
        .await?;

    let profile = match storage
        .create_profile(NewProfile {
            user_id: user.id,
            school_id: school.id,
            role: req.role,
            matricule: (!req.role.is_admin()).then(|| login.clone()),
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            phone: req.phone,
            class_id,
            parent_id,
        })
        .await
    {
        Ok(profile) => profile,
        Err(e) => {
            // 补偿：删除孤立的认证记录
            if let Err(cleanup) = storage.delete_user(user.id).await {
                error!(
                    "Failed to remove orphan user {} after profile error: {}",
                    user.id, cleanup
                );
            }
            return Err(e);
        }
    };

    info!(
        "Account {} ({}) created in school {}",
        login, req.role, school.id
    );

    Ok((Account { user, profile }, initial_password))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::tests::{memory_storage, seed_member, seed_school};
    use crate::utils::password::verify_password;
    use sea_orm::ConnectionTrait;

    fn cheap_argon2() -> Argon2Config {
        Argon2Config {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        }
    }

    fn request(role: UserRole) -> CreateAccountRequest {
        CreateAccountRequest {
            role,
            first_name: "Moussa".to_string(),
            last_name: "Ndiaye".to_string(),
            email: None,
            phone: None,
            password: None,
            class_id: None,
            parent_id: None,
        }
    }

    #[tokio::test]
    async fn test_student_gets_matricule_and_initial_password() {
        let storage = memory_storage().await;
        let school = seed_school(&storage, "lycee.sn").await;
        let parent = seed_member(&storage, &school, UserRole::Parent, None).await;

        let mut req = request(UserRole::Student);
        req.parent_id = Some(parent.id);
        let (account, password) = provision_account(&storage, &school, req, &cheap_argon2())
            .await
            .unwrap();

        assert_eq!(account.user.login, "STU001@lycee.sn");
        assert_eq!(account.profile.matricule.as_deref(), Some("STU001@lycee.sn"));
        assert_eq!(account.profile.parent_id, Some(parent.id));
        let password = password.expect("generated password");
        assert_eq!(password.len(), INITIAL_PASSWORD_LENGTH);

        let stored = storage
            .get_user_by_login("STU001@lycee.sn")
            .await
            .unwrap()
            .unwrap();
        assert!(verify_password(&password, &stored.password_hash));
    }

    #[tokio::test]
    async fn test_admin_logs_in_with_email() {
        let storage = memory_storage().await;
        let school = seed_school(&storage, "lycee.sn").await;

        let mut req = request(UserRole::Admin);
        req.email = Some("Directeur@Lycee.SN".to_string());
        req.password = Some("SecurePass123".to_string());
        let (account, password) = provision_account(&storage, &school, req, &cheap_argon2())
            .await
            .unwrap();
        assert_eq!(account.user.login, "directeur@lycee.sn");
        assert_eq!(account.profile.matricule, None);
        assert!(password.is_none());

        let err = provision_account(&storage, &school, request(UserRole::Admin), &cheap_argon2())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E007");
    }

    #[tokio::test]
    async fn test_rejects_links_outside_school() {
        let storage = memory_storage().await;
        let school = seed_school(&storage, "one.sn").await;
        let other = seed_school(&storage, "two.sn").await;
        let foreign_parent = seed_member(&storage, &other, UserRole::Parent, None).await;

        let mut req = request(UserRole::Student);
        req.parent_id = Some(foreign_parent.id);
        let err = provision_account(&storage, &school, req, &cheap_argon2())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E007");

        // 校验失败不消耗学号
        let next = storage
            .issue_matricule(school.id, UserRole::Student)
            .await
            .unwrap();
        assert_eq!(next, "STU001@one.sn");
    }

    #[tokio::test]
    async fn test_profile_failure_removes_user() {
        let storage = memory_storage().await;
        let school = seed_school(&storage, "lycee.sn").await;
        storage
            .db
            .execute_unprepared(
                "CREATE TRIGGER reject_profiles BEFORE INSERT ON profiles \
                 BEGIN SELECT RAISE(ABORT, 'profiles disabled'); END;",
            )
            .await
            .unwrap();

        let result =
            provision_account(&storage, &school, request(UserRole::Teacher), &cheap_argon2())
                .await;
        assert!(result.is_err());
        assert!(
            storage
                .get_user_by_login("TCH001@lycee.sn")
                .await
                .unwrap()
                .is_none()
        );
    }
}
