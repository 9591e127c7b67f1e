//! 学校存储操作

use super::{SeaOrmStorage, db_error};
use crate::entity::matricule_counters::ActiveModel as CounterActiveModel;
use crate::entity::schools::{ActiveModel, Column, Entity as Schools};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    common::pagination::normalize_page,
    schools::{
        entities::School,
        requests::{CreateSchoolRequest, SchoolListQuery, UpdateSchoolRequest},
        responses::SchoolListResponse,
    },
    users::entities::UserRole,
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建学校，同一事务内为每个可分配学号的角色写入计数器（初值 0）
    pub async fn create_school_impl(&self, req: CreateSchoolRequest) -> Result<School> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| db_error("开启事务失败", e))?;

        let school = ActiveModel {
            name: Set(req.name),
            suffix: Set(req.suffix),
            address: Set(req.address),
            phone: Set(req.phone),
            email: Set(req.email),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| db_error("创建学校失败", e))?;

        for role in UserRole::issuable_roles() {
            CounterActiveModel {
                school_id: Set(school.id),
                role: Set(role.to_string()),
                counter: Set(0),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| db_error("初始化学号计数器失败", e))?;
        }

        txn.commit()
            .await
            .map_err(|e| db_error("提交事务失败", e))?;

        Ok(school.into_school())
    }

    /// 通过 ID 获取学校
    pub async fn get_school_by_id_impl(&self, id: i64) -> Result<Option<School>> {
        let result = Schools::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| db_error("查询学校失败", e))?;

        Ok(result.map(|m| m.into_school()))
    }

    /// 通过后缀获取学校
    pub async fn get_school_by_suffix_impl(&self, suffix: &str) -> Result<Option<School>> {
        let result = Schools::find()
            .filter(Column::Suffix.eq(suffix))
            .one(&self.db)
            .await
            .map_err(|e| db_error("查询学校失败", e))?;

        Ok(result.map(|m| m.into_school()))
    }

    /// 分页列出学校
    pub async fn list_schools_with_pagination_impl(
        &self,
        query: SchoolListQuery,
    ) -> Result<SchoolListResponse> {
        let (page, size) = normalize_page(query.page, query.size, 10);

        let mut select = Schools::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Name.contains(&escaped))
                    .add(Column::Suffix.contains(&escaped)),
            );
        }

        let paginator = select.order_by_asc(Column::Name).paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| db_error("查询学校总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| db_error("查询学校页数失败", e))?;
        let schools = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| db_error("查询学校列表失败", e))?;

        Ok(SchoolListResponse {
            items: schools.into_iter().map(|m| m.into_school()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 更新学校基本信息，后缀由 set_school_suffix 单独处理
    pub async fn update_school_impl(
        &self,
        id: i64,
        update: UpdateSchoolRequest,
    ) -> Result<Option<School>> {
        if self.get_school_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(address) = update.address {
            model.address = Set(Some(address));
        }
        if let Some(phone) = update.phone {
            model.phone = Set(Some(phone));
        }
        if let Some(email) = update.email {
            model.email = Set(Some(email));
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| db_error("更新学校失败", e))?;

        Ok(Some(result.into_school()))
    }

    /// 修改学校后缀
    pub async fn set_school_suffix_impl(&self, id: i64, suffix: &str) -> Result<Option<School>> {
        if self.get_school_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let result = ActiveModel {
            id: Set(id),
            suffix: Set(suffix.to_string()),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| db_error("更新学校后缀失败", e))?;

        Ok(Some(result.into_school()))
    }
}
