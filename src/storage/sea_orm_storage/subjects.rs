//! 科目存储操作

use super::{SeaOrmStorage, db_error};
use crate::entity::subjects::{ActiveModel, Column, Entity as Subjects};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    common::pagination::normalize_page,
    subjects::{
        entities::Subject,
        requests::{CreateSubjectRequest, SubjectListQuery, UpdateSubjectRequest},
        responses::SubjectListResponse,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    pub async fn create_subject_impl(
        &self,
        school_id: i64,
        req: CreateSubjectRequest,
    ) -> Result<Subject> {
        let now = chrono::Utc::now().timestamp();

        let result = ActiveModel {
            school_id: Set(school_id),
            class_id: Set(req.class_id),
            name: Set(req.name),
            coefficient: Set(req.coefficient),
            teacher_id: Set(req.teacher_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| db_error("创建科目失败", e))?;

        Ok(result.into_subject())
    }

    pub async fn get_subject_by_id_impl(&self, id: i64) -> Result<Option<Subject>> {
        let result = Subjects::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| db_error("查询科目失败", e))?;

        Ok(result.map(|m| m.into_subject()))
    }

    pub async fn list_subjects_with_pagination_impl(
        &self,
        school_id: i64,
        query: SubjectListQuery,
    ) -> Result<SubjectListResponse> {
        let (page, size) = normalize_page(query.page, query.size, 20);

        let mut select = Subjects::find().filter(Column::SchoolId.eq(school_id));
        if let Some(class_id) = query.class_id {
            select = select.filter(Column::ClassId.eq(class_id));
        }
        if let Some(teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }

        let paginator = select.order_by_asc(Column::Id).paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| db_error("查询科目总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| db_error("查询科目页数失败", e))?;
        let subjects = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| db_error("查询科目列表失败", e))?;

        Ok(SubjectListResponse {
            items: subjects.into_iter().map(|m| m.into_subject()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 班级的全部科目，按ID升序
    pub async fn list_class_subjects_impl(&self, class_id: i64) -> Result<Vec<Subject>> {
        let subjects = Subjects::find()
            .filter(Column::ClassId.eq(class_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| db_error("查询班级科目失败", e))?;

        Ok(subjects.into_iter().map(|m| m.into_subject()).collect())
    }

    pub async fn update_subject_impl(
        &self,
        id: i64,
        update: UpdateSubjectRequest,
    ) -> Result<Option<Subject>> {
        if self.get_subject_by_id_impl(id).await?.is_none() {
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
        if let Some(coefficient) = update.coefficient {
            model.coefficient = Set(coefficient);
        }
        if let Some(teacher_id) = update.teacher_id {
            model.teacher_id = Set(Some(teacher_id));
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| db_error("更新科目失败", e))?;

        Ok(Some(result.into_subject()))
    }

    pub async fn delete_subject_impl(&self, id: i64) -> Result<bool> {
        let result = Subjects::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| db_error("删除科目失败", e))?;

        Ok(result.rows_affected > 0)
    }
}
