//! 成员档案存储操作

use super::{SeaOrmStorage, db_error};
use crate::entity::profiles::{ActiveModel, Column, Entity as Profiles};
use crate::entity::users::Entity as Users;
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    common::pagination::normalize_page,
    profiles::{
        entities::{NewProfile, Profile},
        requests::{ProfileListQuery, UpdateProfile},
        responses::ProfileListResponse,
    },
    users::entities::UserRole,
};
use crate::utils::escape_like_pattern;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建档案
    pub async fn create_profile_impl(&self, profile: NewProfile) -> Result<Profile> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            user_id: Set(profile.user_id),
            school_id: Set(profile.school_id),
            role: Set(profile.role.to_string()),
            matricule: Set(profile.matricule),
            first_name: Set(profile.first_name),
            last_name: Set(profile.last_name),
            phone: Set(profile.phone),
            class_id: Set(profile.class_id),
            parent_id: Set(profile.parent_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| db_error("创建档案失败", e))?;

        Ok(result.into_profile())
    }

    pub async fn get_profile_by_id_impl(&self, id: i64) -> Result<Option<Profile>> {
        let result = Profiles::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| db_error("查询档案失败", e))?;

        Ok(result.map(|m| m.into_profile()))
    }

    pub async fn get_profile_by_user_id_impl(&self, user_id: i64) -> Result<Option<Profile>> {
        let result = Profiles::find()
            .filter(Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| db_error("查询档案失败", e))?;

        Ok(result.map(|m| m.into_profile()))
    }

    /// 分页列出学校成员
    pub async fn list_profiles_with_pagination_impl(
        &self,
        school_id: i64,
        query: ProfileListQuery,
    ) -> Result<ProfileListResponse> {
        let (page, size) = normalize_page(query.page, query.size, 20);

        let mut select = Profiles::find().filter(Column::SchoolId.eq(school_id));

        if let Some(role) = query.role {
            select = select.filter(Column::Role.eq(role.to_string()));
        }
        if let Some(class_id) = query.class_id {
            select = select.filter(Column::ClassId.eq(class_id));
        }
        if let Some(parent_id) = query.parent_id {
            select = select.filter(Column::ParentId.eq(parent_id));
        }

        // 搜索条件
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::FirstName.contains(&escaped))
                    .add(Column::LastName.contains(&escaped))
                    .add(Column::Matricule.contains(&escaped)),
            );
        }

        let paginator = select
            .order_by_asc(Column::LastName)
            .order_by_asc(Column::FirstName)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| db_error("查询成员总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| db_error("查询成员页数失败", e))?;
        let profiles = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| db_error("查询成员列表失败", e))?;

        Ok(ProfileListResponse {
            items: profiles.into_iter().map(|m| m.into_profile()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 学校内除管理员外的全部档案
    pub async fn list_non_admin_profiles_impl(&self, school_id: i64) -> Result<Vec<Profile>> {
        let profiles = Profiles::find()
            .filter(Column::SchoolId.eq(school_id))
            .filter(Column::Role.is_not_in([UserRole::ADMIN, UserRole::SUPER_ADMIN]))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| db_error("查询成员失败", e))?;

        Ok(profiles.into_iter().map(|m| m.into_profile()).collect())
    }

    /// 班级学生，按ID升序
    pub async fn list_class_students_impl(&self, class_id: i64) -> Result<Vec<Profile>> {
        let profiles = Profiles::find()
            .filter(Column::ClassId.eq(class_id))
            .filter(Column::Role.eq(UserRole::STUDENT))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| db_error("查询班级学生失败", e))?;

        Ok(profiles.into_iter().map(|m| m.into_profile()).collect())
    }

    /// 家长名下的学生
    pub async fn list_children_impl(&self, parent_profile_id: i64) -> Result<Vec<Profile>> {
        let profiles = Profiles::find()
            .filter(Column::ParentId.eq(parent_profile_id))
            .filter(Column::Role.eq(UserRole::STUDENT))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| db_error("查询子女档案失败", e))?;

        Ok(profiles.into_iter().map(|m| m.into_profile()).collect())
    }

    /// 更新档案字段
    pub async fn update_profile_impl(
        &self,
        id: i64,
        update: UpdateProfile,
    ) -> Result<Option<Profile>> {
        if self.get_profile_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(first_name) = update.first_name {
            model.first_name = Set(first_name);
        }
        if let Some(last_name) = update.last_name {
            model.last_name = Set(last_name);
        }
        if let Some(phone) = update.phone {
            model.phone = Set(Some(phone));
        }
        if let Some(class_id) = update.class_id {
            model.class_id = Set(Some(class_id));
        }
        if let Some(parent_id) = update.parent_id {
            model.parent_id = Set(Some(parent_id));
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| db_error("更新档案失败", e))?;

        Ok(Some(result.into_profile()))
    }

    /// 更新档案上的学号
    pub async fn update_profile_matricule_impl(&self, id: i64, matricule: &str) -> Result<bool> {
        let result = Profiles::update_many()
            .col_expr(Column::Matricule, Expr::value(matricule))
            .col_expr(Column::UpdatedAt, Expr::value(chrono::Utc::now().timestamp()))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| db_error("更新档案学号失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 删除档案及其认证记录
    pub async fn delete_account_impl(&self, profile_id: i64) -> Result<bool> {
        let Some(profile) = Profiles::find_by_id(profile_id)
            .one(&self.db)
            .await
            .map_err(|e| db_error("查询档案失败", e))?
        else {
            return Ok(false);
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| db_error("开启事务失败", e))?;

        // 子女档案解除与家长的关联
        Profiles::update_many()
            .col_expr(Column::ParentId, Expr::value(Option::<i64>::None))
            .filter(Column::ParentId.eq(profile_id))
            .exec(&txn)
            .await
            .map_err(|e| db_error("解除家长关联失败", e))?;

        Profiles::delete_by_id(profile_id)
            .exec(&txn)
            .await
            .map_err(|e| db_error("删除档案失败", e))?;

        Users::delete_by_id(profile.user_id)
            .exec(&txn)
            .await
            .map_err(|e| db_error("删除认证记录失败", e))?;

        txn.commit()
            .await
            .map_err(|e| db_error("提交事务失败", e))?;

        Ok(true)
    }
}
