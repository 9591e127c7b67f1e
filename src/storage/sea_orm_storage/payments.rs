//! 缴费存储操作

use super::{SeaOrmStorage, db_error};
use crate::entity::payments::{ActiveModel, Column, Entity as Payments};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    common::pagination::normalize_page,
    payments::{
        entities::{CheckoutSession, NewPayment, Payment, PaymentStatus},
        requests::PaymentListQuery,
        responses::PaymentListResponse,
    },
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;

impl SeaOrmStorage {
    /// 创建待支付记录
    pub async fn create_payment_impl(&self, payment: NewPayment) -> Result<Payment> {
        let now = chrono::Utc::now().timestamp();

        let result = ActiveModel {
            school_id: Set(payment.school_id),
            student_id: Set(payment.student_id),
            amount_cents: Set(payment.amount_cents),
            currency: Set(payment.currency),
            description: Set(payment.description),
            status: Set(PaymentStatus::Pending.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| db_error("创建缴费记录失败", e))?;

        Ok(result.into_payment())
    }

    pub async fn get_payment_by_id_impl(&self, id: i64) -> Result<Option<Payment>> {
        let result = Payments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| db_error("查询缴费记录失败", e))?;

        Ok(result.map(|m| m.into_payment()))
    }

    pub async fn get_payment_by_session_id_impl(&self, session_id: &str) -> Result<Option<Payment>> {
        let result = Payments::find()
            .filter(Column::CheckoutSessionId.eq(session_id))
            .one(&self.db)
            .await
            .map_err(|e| db_error("查询缴费记录失败", e))?;

        Ok(result.map(|m| m.into_payment()))
    }

    pub async fn list_payments_with_pagination_impl(
        &self,
        school_id: i64,
        query: PaymentListQuery,
    ) -> Result<PaymentListResponse> {
        let (page, size) = normalize_page(query.page, query.size, 20);

        let mut select = Payments::find().filter(Column::SchoolId.eq(school_id));
        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }
        if let Some(student_ids) = query.student_ids {
            select = select.filter(Column::StudentId.is_in(student_ids));
        }

        let paginator = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| db_error("查询缴费总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| db_error("查询缴费页数失败", e))?;
        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| db_error("查询缴费列表失败", e))?;

        Ok(PaymentListResponse {
            items: items.into_iter().map(|m| m.into_payment()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 记录结账会话
    pub async fn attach_checkout_session_impl(
        &self,
        id: i64,
        session: &CheckoutSession,
    ) -> Result<Option<Payment>> {
        if self.get_payment_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let result = ActiveModel {
            id: Set(id),
            checkout_session_id: Set(Some(session.id.clone())),
            checkout_url: Set(Some(session.url.clone())),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| db_error("保存结账会话失败", e))?;

        Ok(Some(result.into_payment()))
    }

    /// 更新缴费状态
    ///
    /// 条件更新：已支付或已处于目标状态的记录不会被改写，
    /// 并发到达的回调也无法覆盖已支付状态。返回更新后的当前记录。
    pub async fn mark_payment_status_impl(
        &self,
        id: i64,
        status: PaymentStatus,
    ) -> Result<Option<Payment>> {
        let now = chrono::Utc::now().timestamp();

        let mut update = Payments::update_many()
            .col_expr(Column::Status, Expr::value(status.to_string()))
            .col_expr(Column::UpdatedAt, Expr::value(now));
        if status == PaymentStatus::Paid {
            update = update.col_expr(Column::PaidAt, Expr::value(Some(now)));
        }

        let result = update
            .filter(Column::Id.eq(id))
            .filter(Column::Status.ne(PaymentStatus::Paid.to_string()))
            .filter(Column::Status.ne(status.to_string()))
            .exec(&self.db)
            .await
            .map_err(|e| db_error("更新缴费状态失败", e))?;

        if result.rows_affected == 0 {
            debug!("Payment {} left unchanged by status {}", id, status);
        }

        self.get_payment_by_id_impl(id).await
    }
}
