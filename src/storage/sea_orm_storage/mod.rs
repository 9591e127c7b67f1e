//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod announcements;
mod classes;
mod exams;
mod grades;
mod lesson_logs;
mod matricules;
mod payments;
mod profiles;
mod schedules;
mod schools;
mod subjects;
mod tenants;
mod users;

#[cfg(test)]
pub(crate) mod tests;

use crate::config::{AppConfig, DatabaseConfig};
use crate::errors::{Result, SchoolHubError};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

/// 为数据库错误附加上下文，唯一约束冲突保留为 Conflict
pub(crate) fn db_error(context: &str, err: DbErr) -> SchoolHubError {
    match SchoolHubError::from(err) {
        SchoolHubError::Conflict(msg) => SchoolHubError::conflict(format!("{context}: {msg}")),
        other => SchoolHubError::database_operation(format!("{context}: {}", other.message())),
    }
}

impl SeaOrmStorage {
    /// 按全局配置创建存储实例
    pub async fn new_async() -> Result<Self> {
        Self::connect(&AppConfig::get().database).await
    }

    /// 按数据库配置连接并运行迁移
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let db_url = Self::build_database_url(&config.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| SchoolHubError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    ///
    /// 内存库只能使用单连接，否则每个连接各自是一个空库。
    async fn connect_sqlite(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let in_memory = url.contains(":memory:");

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| SchoolHubError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(if in_memory {
                SqliteJournalMode::Memory
            } else {
                SqliteJournalMode::Wal
            })
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(config.pool_size)
                .min_connections(1)
                .idle_timeout(Duration::from_secs(300))
        };

        let pool = pool_options
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.timeout))
            .connect_with(opt)
            .await
            .map_err(|e| SchoolHubError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.pool_size)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(config.timeout))
            .acquire_timeout(Duration::from_secs(config.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| SchoolHubError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(SchoolHubError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    announcements::{
        entities::Announcement,
        requests::{AnnouncementListQuery, CreateAnnouncementRequest, UpdateAnnouncementRequest},
        responses::AnnouncementListResponse,
    },
    classes::{
        entities::Class,
        requests::{ClassListQuery, CreateClassRequest, UpdateClassRequest},
        responses::ClassListResponse,
    },
    exams::{
        entities::Exam,
        requests::{CreateExamRequest, ExamListQuery, UpdateExamRequest},
        responses::ExamListResponse,
    },
    grades::{
        entities::Grade,
        requests::{BulkGradeEntry, GradeListQuery, UpdateGradeRequest},
        responses::GradeListResponse,
    },
    lesson_logs::{
        entities::LessonLog,
        requests::{CreateLessonLogRequest, LessonLogListQuery, UpdateLessonLogRequest},
        responses::LessonLogListResponse,
    },
    payments::{
        entities::{CheckoutSession, NewPayment, Payment, PaymentStatus},
        requests::PaymentListQuery,
        responses::PaymentListResponse,
    },
    profiles::{
        entities::{NewProfile, Profile},
        requests::{ProfileListQuery, UpdateProfile},
        responses::ProfileListResponse,
    },
    schedules::{
        entities::Schedule,
        requests::{CreateScheduleRequest, ScheduleListQuery, UpdateScheduleRequest},
        responses::ScheduleListResponse,
    },
    schools::{
        entities::School,
        requests::{CreateSchoolRequest, SchoolListQuery, UpdateSchoolRequest},
        responses::{SchoolListResponse, SchoolStats, TenantDeletionReport},
    },
    subjects::{
        entities::Subject,
        requests::{CreateSubjectRequest, SubjectListQuery, UpdateSubjectRequest},
        responses::SubjectListResponse,
    },
    users::entities::{NewUser, User, UserRole, UserStatus},
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 认证用户方法
    async fn create_user(&self, user: NewUser) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_login(&self, login: &str) -> Result<Option<User>> {
        self.get_user_by_login_impl(login).await
    }

    async fn get_user_by_identifier(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_identifier_impl(identifier).await
    }

    async fn update_user_password(&self, id: i64, password_hash: &str) -> Result<bool> {
        self.update_user_password_impl(id, password_hash).await
    }

    async fn update_user_status(&self, id: i64, status: UserStatus) -> Result<bool> {
        self.update_user_status_impl(id, status).await
    }

    async fn update_user_login(&self, id: i64, login: &str) -> Result<bool> {
        self.update_user_login_impl(id, login).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn count_users_by_role(&self, role: UserRole) -> Result<u64> {
        self.count_users_by_role_impl(role).await
    }

    // 学校方法
    async fn create_school(&self, school: CreateSchoolRequest) -> Result<School> {
        self.create_school_impl(school).await
    }

    async fn get_school_by_id(&self, id: i64) -> Result<Option<School>> {
        self.get_school_by_id_impl(id).await
    }

    async fn get_school_by_suffix(&self, suffix: &str) -> Result<Option<School>> {
        self.get_school_by_suffix_impl(suffix).await
    }

    async fn list_schools_with_pagination(
        &self,
        query: SchoolListQuery,
    ) -> Result<SchoolListResponse> {
        self.list_schools_with_pagination_impl(query).await
    }

    async fn update_school(&self, id: i64, update: UpdateSchoolRequest) -> Result<Option<School>> {
        self.update_school_impl(id, update).await
    }

    async fn set_school_suffix(&self, id: i64, suffix: &str) -> Result<Option<School>> {
        self.set_school_suffix_impl(id, suffix).await
    }

    async fn delete_school_cascade(&self, id: i64) -> Result<Option<TenantDeletionReport>> {
        self.delete_school_cascade_impl(id).await
    }

    async fn get_school_stats(&self, id: i64) -> Result<SchoolStats> {
        self.get_school_stats_impl(id).await
    }

    // 学号方法
    async fn issue_matricule(&self, school_id: i64, role: UserRole) -> Result<String> {
        self.issue_matricule_impl(school_id, role).await
    }

    // 档案方法
    async fn create_profile(&self, profile: NewProfile) -> Result<Profile> {
        self.create_profile_impl(profile).await
    }

    async fn get_profile_by_id(&self, id: i64) -> Result<Option<Profile>> {
        self.get_profile_by_id_impl(id).await
    }

    async fn get_profile_by_user_id(&self, user_id: i64) -> Result<Option<Profile>> {
        self.get_profile_by_user_id_impl(user_id).await
    }

    async fn list_profiles_with_pagination(
        &self,
        school_id: i64,
        query: ProfileListQuery,
    ) -> Result<ProfileListResponse> {
        self.list_profiles_with_pagination_impl(school_id, query).await
    }

    async fn list_non_admin_profiles(&self, school_id: i64) -> Result<Vec<Profile>> {
        self.list_non_admin_profiles_impl(school_id).await
    }

    async fn list_class_students(&self, class_id: i64) -> Result<Vec<Profile>> {
        self.list_class_students_impl(class_id).await
    }

    async fn list_children(&self, parent_profile_id: i64) -> Result<Vec<Profile>> {
        self.list_children_impl(parent_profile_id).await
    }

    async fn update_profile(&self, id: i64, update: UpdateProfile) -> Result<Option<Profile>> {
        self.update_profile_impl(id, update).await
    }

    async fn update_profile_matricule(&self, id: i64, matricule: &str) -> Result<bool> {
        self.update_profile_matricule_impl(id, matricule).await
    }

    async fn delete_account(&self, profile_id: i64) -> Result<bool> {
        self.delete_account_impl(profile_id).await
    }

    // 班级方法
    async fn create_class(&self, school_id: i64, class: CreateClassRequest) -> Result<Class> {
        self.create_class_impl(school_id, class).await
    }

    async fn get_class_by_id(&self, id: i64) -> Result<Option<Class>> {
        self.get_class_by_id_impl(id).await
    }

    async fn list_classes_with_pagination(
        &self,
        school_id: i64,
        query: ClassListQuery,
    ) -> Result<ClassListResponse> {
        self.list_classes_with_pagination_impl(school_id, query).await
    }

    async fn update_class(&self, id: i64, update: UpdateClassRequest) -> Result<Option<Class>> {
        self.update_class_impl(id, update).await
    }

    async fn delete_class(&self, id: i64) -> Result<bool> {
        self.delete_class_impl(id).await
    }

    // 科目方法
    async fn create_subject(
        &self,
        school_id: i64,
        subject: CreateSubjectRequest,
    ) -> Result<Subject> {
        self.create_subject_impl(school_id, subject).await
    }

    async fn get_subject_by_id(&self, id: i64) -> Result<Option<Subject>> {
        self.get_subject_by_id_impl(id).await
    }

    async fn list_subjects_with_pagination(
        &self,
        school_id: i64,
        query: SubjectListQuery,
    ) -> Result<SubjectListResponse> {
        self.list_subjects_with_pagination_impl(school_id, query).await
    }

    async fn list_class_subjects(&self, class_id: i64) -> Result<Vec<Subject>> {
        self.list_class_subjects_impl(class_id).await
    }

    async fn update_subject(
        &self,
        id: i64,
        update: UpdateSubjectRequest,
    ) -> Result<Option<Subject>> {
        self.update_subject_impl(id, update).await
    }

    async fn delete_subject(&self, id: i64) -> Result<bool> {
        self.delete_subject_impl(id).await
    }

    // 考试方法
    async fn create_exam(&self, school_id: i64, exam: CreateExamRequest) -> Result<Exam> {
        self.create_exam_impl(school_id, exam).await
    }

    async fn get_exam_by_id(&self, id: i64) -> Result<Option<Exam>> {
        self.get_exam_by_id_impl(id).await
    }

    async fn list_exams_with_pagination(
        &self,
        school_id: i64,
        query: ExamListQuery,
    ) -> Result<ExamListResponse> {
        self.list_exams_with_pagination_impl(school_id, query).await
    }

    async fn list_class_exams(&self, class_id: i64, term: Option<i32>) -> Result<Vec<Exam>> {
        self.list_class_exams_impl(class_id, term).await
    }

    async fn update_exam(&self, id: i64, update: UpdateExamRequest) -> Result<Option<Exam>> {
        self.update_exam_impl(id, update).await
    }

    async fn delete_exam(&self, id: i64) -> Result<bool> {
        self.delete_exam_impl(id).await
    }

    // 成绩方法
    async fn upsert_grade(
        &self,
        school_id: i64,
        exam_id: i64,
        student_id: i64,
        score: Option<f64>,
        comment: Option<String>,
    ) -> Result<Grade> {
        self.upsert_grade_impl(school_id, exam_id, student_id, score, comment).await
    }

    async fn upsert_grades(
        &self,
        school_id: i64,
        exam_id: i64,
        entries: Vec<BulkGradeEntry>,
    ) -> Result<Vec<Grade>> {
        self.upsert_grades_impl(school_id, exam_id, entries).await
    }

    async fn get_grade_by_id(&self, id: i64) -> Result<Option<Grade>> {
        self.get_grade_by_id_impl(id).await
    }

    async fn list_grades_with_pagination(
        &self,
        school_id: i64,
        query: GradeListQuery,
    ) -> Result<GradeListResponse> {
        self.list_grades_with_pagination_impl(school_id, query).await
    }

    async fn list_grades_for_exams(&self, exam_ids: &[i64]) -> Result<Vec<Grade>> {
        self.list_grades_for_exams_impl(exam_ids).await
    }

    async fn update_grade(&self, id: i64, update: UpdateGradeRequest) -> Result<Option<Grade>> {
        self.update_grade_impl(id, update).await
    }

    async fn delete_grade(&self, id: i64) -> Result<bool> {
        self.delete_grade_impl(id).await
    }

    // 公告方法
    async fn create_announcement(
        &self,
        school_id: i64,
        author_id: i64,
        announcement: CreateAnnouncementRequest,
    ) -> Result<Announcement> {
        self.create_announcement_impl(school_id, author_id, announcement).await
    }

    async fn get_announcement_by_id(&self, id: i64) -> Result<Option<Announcement>> {
        self.get_announcement_by_id_impl(id).await
    }

    async fn list_announcements_with_pagination(
        &self,
        school_id: i64,
        query: AnnouncementListQuery,
    ) -> Result<AnnouncementListResponse> {
        self.list_announcements_with_pagination_impl(school_id, query).await
    }

    async fn update_announcement(
        &self,
        id: i64,
        update: UpdateAnnouncementRequest,
    ) -> Result<Option<Announcement>> {
        self.update_announcement_impl(id, update).await
    }

    async fn delete_announcement(&self, id: i64) -> Result<bool> {
        self.delete_announcement_impl(id).await
    }

    // 缴费方法
    async fn create_payment(&self, payment: NewPayment) -> Result<Payment> {
        self.create_payment_impl(payment).await
    }

    async fn get_payment_by_id(&self, id: i64) -> Result<Option<Payment>> {
        self.get_payment_by_id_impl(id).await
    }

    async fn get_payment_by_session_id(&self, session_id: &str) -> Result<Option<Payment>> {
        self.get_payment_by_session_id_impl(session_id).await
    }

    async fn list_payments_with_pagination(
        &self,
        school_id: i64,
        query: PaymentListQuery,
    ) -> Result<PaymentListResponse> {
        self.list_payments_with_pagination_impl(school_id, query).await
    }

    async fn attach_checkout_session(
        &self,
        id: i64,
        session: &CheckoutSession,
    ) -> Result<Option<Payment>> {
        self.attach_checkout_session_impl(id, session).await
    }

    async fn mark_payment_status(&self, id: i64, status: PaymentStatus) -> Result<Option<Payment>> {
        self.mark_payment_status_impl(id, status).await
    }

    // 课表方法
    async fn create_schedule(
        &self,
        school_id: i64,
        schedule: CreateScheduleRequest,
    ) -> Result<Schedule> {
        self.create_schedule_impl(school_id, schedule).await
    }

    async fn get_schedule_by_id(&self, id: i64) -> Result<Option<Schedule>> {
        self.get_schedule_by_id_impl(id).await
    }

    async fn list_schedules_with_pagination(
        &self,
        school_id: i64,
        query: ScheduleListQuery,
    ) -> Result<ScheduleListResponse> {
        self.list_schedules_with_pagination_impl(school_id, query).await
    }

    async fn update_schedule(
        &self,
        id: i64,
        update: UpdateScheduleRequest,
    ) -> Result<Option<Schedule>> {
        self.update_schedule_impl(id, update).await
    }

    async fn delete_schedule(&self, id: i64) -> Result<bool> {
        self.delete_schedule_impl(id).await
    }

    // 教学日志方法
    async fn create_lesson_log(
        &self,
        school_id: i64,
        teacher_id: i64,
        log: CreateLessonLogRequest,
    ) -> Result<LessonLog> {
        self.create_lesson_log_impl(school_id, teacher_id, log).await
    }

    async fn get_lesson_log_by_id(&self, id: i64) -> Result<Option<LessonLog>> {
        self.get_lesson_log_by_id_impl(id).await
    }

    async fn list_lesson_logs_with_pagination(
        &self,
        school_id: i64,
        query: LessonLogListQuery,
    ) -> Result<LessonLogListResponse> {
        self.list_lesson_logs_with_pagination_impl(school_id, query).await
    }

    async fn update_lesson_log(
        &self,
        id: i64,
        update: UpdateLessonLogRequest,
    ) -> Result<Option<LessonLog>> {
        self.update_lesson_log_impl(id, update).await
    }

    async fn delete_lesson_log(&self, id: i64) -> Result<bool> {
        self.delete_lesson_log_impl(id).await
    }
}
