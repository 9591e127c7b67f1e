//! 认证用户存储操作

use super::{SeaOrmStorage, db_error};
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::Result;
use crate::models::users::entities::{NewUser, User, UserRole, UserStatus};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, Set,
};

impl SeaOrmStorage {
    /// 创建认证记录
    pub async fn create_user_impl(&self, user: NewUser) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            login: Set(user.login),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            role: Set(user.role.to_string()),
            status: Set(UserStatus::Active.to_string()),
            school_id: Set(user.school_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| db_error("创建用户失败", e))?;

        Ok(result.into_user())
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| db_error("查询用户失败", e))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过登录标识获取用户
    pub async fn get_user_by_login_impl(&self, login: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Login.eq(login))
            .one(&self.db)
            .await
            .map_err(|e| db_error("查询用户失败", e))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过登录标识或邮箱获取用户
    ///
    /// 邮箱不唯一（家长可能共用），命中多条时优先登录标识精确匹配。
    pub async fn get_user_by_identifier_impl(&self, identifier: &str) -> Result<Option<User>> {
        if let Some(user) = self.get_user_by_login_impl(identifier).await? {
            return Ok(Some(user));
        }

        let result = Users::find()
            .filter(
                Condition::all()
                    .add(Column::Email.eq(identifier))
                    .add(Column::Role.is_in([UserRole::ADMIN, UserRole::SUPER_ADMIN])),
            )
            .one(&self.db)
            .await
            .map_err(|e| db_error("查询用户失败", e))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 更新密码哈希
    pub async fn update_user_password_impl(&self, id: i64, password_hash: &str) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Users::update_many()
            .col_expr(Column::PasswordHash, Expr::value(password_hash))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| db_error("更新密码失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 更新账号状态
    pub async fn update_user_status_impl(&self, id: i64, status: UserStatus) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Users::update_many()
            .col_expr(Column::Status, Expr::value(status.to_string()))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| db_error("更新账号状态失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 更新登录标识
    pub async fn update_user_login_impl(&self, id: i64, login: &str) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Users::update_many()
            .col_expr(Column::Login, Expr::value(login))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| db_error("更新登录标识失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 更新用户最后登录时间
    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Users::update_many()
            .col_expr(Column::LastLogin, Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| db_error("更新最后登录时间失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 删除认证记录（档案随外键级联删除）
    pub async fn delete_user_impl(&self, id: i64) -> Result<bool> {
        let result = Users::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| db_error("删除用户失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 统计某角色的用户数
    pub async fn count_users_by_role_impl(&self, role: UserRole) -> Result<u64> {
        Users::find()
            .filter(Column::Role.eq(role.to_string()))
            .count(&self.db)
            .await
            .map_err(|e| db_error("统计用户失败", e))
    }
}
