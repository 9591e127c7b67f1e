//! 考试存储操作

use super::{SeaOrmStorage, db_error};
use crate::entity::exams::{ActiveModel, Column, Entity as Exams};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    common::pagination::normalize_page,
    exams::{
        entities::{DEFAULT_MAX_SCORE, Exam},
        requests::{CreateExamRequest, ExamListQuery, UpdateExamRequest},
        responses::ExamListResponse,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    pub async fn create_exam_impl(&self, school_id: i64, req: CreateExamRequest) -> Result<Exam> {
        let now = chrono::Utc::now().timestamp();

        let result = ActiveModel {
            school_id: Set(school_id),
            class_id: Set(req.class_id),
            subject_id: Set(req.subject_id),
            title: Set(req.title),
            term: Set(req.term),
            exam_date: Set(req.exam_date),
            max_score: Set(req.max_score.unwrap_or(DEFAULT_MAX_SCORE)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| db_error("创建考试失败", e))?;

        Ok(result.into_exam())
    }

    pub async fn get_exam_by_id_impl(&self, id: i64) -> Result<Option<Exam>> {
        let result = Exams::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| db_error("查询考试失败", e))?;

        Ok(result.map(|m| m.into_exam()))
    }

    pub async fn list_exams_with_pagination_impl(
        &self,
        school_id: i64,
        query: ExamListQuery,
    ) -> Result<ExamListResponse> {
        let (page, size) = normalize_page(query.page, query.size, 20);

        let mut select = Exams::find().filter(Column::SchoolId.eq(school_id));
        if let Some(class_id) = query.class_id {
            select = select.filter(Column::ClassId.eq(class_id));
        }
        if let Some(subject_id) = query.subject_id {
            select = select.filter(Column::SubjectId.eq(subject_id));
        }
        if let Some(term) = query.term {
            select = select.filter(Column::Term.eq(term));
        }

        let paginator = select
            .order_by_asc(Column::Term)
            .order_by_asc(Column::ExamDate)
            .order_by_asc(Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| db_error("查询考试总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| db_error("查询考试页数失败", e))?;
        let exams = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| db_error("查询考试列表失败", e))?;

        Ok(ExamListResponse {
            items: exams.into_iter().map(|m| m.into_exam()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 班级考试，可按学期筛选
    pub async fn list_class_exams_impl(&self, class_id: i64, term: Option<i32>) -> Result<Vec<Exam>> {
        let mut select = Exams::find().filter(Column::ClassId.eq(class_id));
        if let Some(term) = term {
            select = select.filter(Column::Term.eq(term));
        }

        let exams = select
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| db_error("查询班级考试失败", e))?;

        Ok(exams.into_iter().map(|m| m.into_exam()).collect())
    }

    pub async fn update_exam_impl(
        &self,
        id: i64,
        update: UpdateExamRequest,
    ) -> Result<Option<Exam>> {
        if self.get_exam_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };
        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(term) = update.term {
            model.term = Set(term);
        }
        if let Some(exam_date) = update.exam_date {
            model.exam_date = Set(Some(exam_date));
        }
        if let Some(max_score) = update.max_score {
            model.max_score = Set(max_score);
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| db_error("更新考试失败", e))?;

        Ok(Some(result.into_exam()))
    }

    pub async fn delete_exam_impl(&self, id: i64) -> Result<bool> {
        let result = Exams::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| db_error("删除考试失败", e))?;

        Ok(result.rows_affected > 0)
    }
}
