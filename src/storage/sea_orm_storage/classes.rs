//! 班级存储操作

use super::{SeaOrmStorage, db_error};
use crate::entity::classes::{ActiveModel, Column, Entity as Classes};
use crate::entity::{lesson_logs, schedules};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    classes::{
        entities::Class,
        requests::{ClassListQuery, CreateClassRequest, UpdateClassRequest},
        responses::ClassListResponse,
    },
    common::pagination::normalize_page,
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建班级
    pub async fn create_class_impl(&self, school_id: i64, req: CreateClassRequest) -> Result<Class> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            school_id: Set(school_id),
            name: Set(req.name),
            level: Set(req.level),
            academic_year: Set(req.academic_year),
            homeroom_teacher_id: Set(req.homeroom_teacher_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| db_error("创建班级失败", e))?;

        Ok(result.into_class())
    }

    /// 通过 ID 获取班级
    pub async fn get_class_by_id_impl(&self, id: i64) -> Result<Option<Class>> {
        let result = Classes::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| db_error("查询班级失败", e))?;

        Ok(result.map(|m| m.into_class()))
    }

    /// 分页列出班级
    pub async fn list_classes_with_pagination_impl(
        &self,
        school_id: i64,
        query: ClassListQuery,
    ) -> Result<ClassListResponse> {
        let (page, size) = normalize_page(query.page, query.size, 20);

        let mut select = Classes::find().filter(Column::SchoolId.eq(school_id));

        if let Some(ref year) = query.academic_year {
            select = select.filter(Column::AcademicYear.eq(year.as_str()));
        }

        // 搜索条件
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(Column::Name.contains(&escaped));
        }

        let paginator = select
            .order_by_desc(Column::AcademicYear)
            .order_by_asc(Column::Name)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| db_error("查询班级总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| db_error("查询班级页数失败", e))?;
        let classes = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| db_error("查询班级列表失败", e))?;

        Ok(ClassListResponse {
            items: classes.into_iter().map(|m| m.into_class()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 更新班级信息
    pub async fn update_class_impl(
        &self,
        id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>> {
        if self.get_class_by_id_impl(id).await?.is_none() {
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
        if let Some(level) = update.level {
            model.level = Set(Some(level));
        }
        if let Some(year) = update.academic_year {
            model.academic_year = Set(year);
        }
        if let Some(teacher_id) = update.homeroom_teacher_id {
            model.homeroom_teacher_id = Set(Some(teacher_id));
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| db_error("更新班级失败", e))?;

        Ok(Some(result.into_class()))
    }

    /// 删除班级
    ///
    /// 科目、考试、成绩随外键级联删除；课表与教学日志只挂在学校上，这里一并清理。
    pub async fn delete_class_impl(&self, id: i64) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| db_error("开启事务失败", e))?;

        schedules::Entity::delete_many()
            .filter(schedules::Column::ClassId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| db_error("删除班级课表失败", e))?;

        lesson_logs::Entity::delete_many()
            .filter(lesson_logs::Column::ClassId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| db_error("删除班级教学日志失败", e))?;

        let result = Classes::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| db_error("删除班级失败", e))?;

        txn.commit()
            .await
            .map_err(|e| db_error("提交事务失败", e))?;

        Ok(result.rows_affected > 0)
    }
}
