use std::sync::Arc;

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

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 认证用户方法
    // 创建认证记录（密码已哈希）
    async fn create_user(&self, user: NewUser) -> Result<User>;
    // 通过ID获取用户
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过登录标识获取用户
    async fn get_user_by_login(&self, login: &str) -> Result<Option<User>>;
    // 通过登录标识或邮箱获取用户
    async fn get_user_by_identifier(&self, identifier: &str) -> Result<Option<User>>;
    // 更新密码哈希
    async fn update_user_password(&self, id: i64, password_hash: &str) -> Result<bool>;
    // 更新账号状态
    async fn update_user_status(&self, id: i64, status: UserStatus) -> Result<bool>;
    // 更新登录标识
    async fn update_user_login(&self, id: i64, login: &str) -> Result<bool>;
    // 更新最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 删除认证记录
    async fn delete_user(&self, id: i64) -> Result<bool>;
    // 统计某角色的用户数
    async fn count_users_by_role(&self, role: UserRole) -> Result<u64>;

    /// 学校方法
    // 创建学校并初始化学号计数器
    async fn create_school(&self, school: CreateSchoolRequest) -> Result<School>;
    async fn get_school_by_id(&self, id: i64) -> Result<Option<School>>;
    async fn get_school_by_suffix(&self, suffix: &str) -> Result<Option<School>>;
    async fn list_schools_with_pagination(
        &self,
        query: SchoolListQuery,
    ) -> Result<SchoolListResponse>;
    // 更新学校基本信息（不含后缀）
    async fn update_school(&self, id: i64, update: UpdateSchoolRequest)
    -> Result<Option<School>>;
    // 修改学校后缀
    async fn set_school_suffix(&self, id: i64, suffix: &str) -> Result<Option<School>>;
    // 在一个事务内删除学校及其全部数据
    async fn delete_school_cascade(&self, id: i64) -> Result<Option<TenantDeletionReport>>;
    async fn get_school_stats(&self, id: i64) -> Result<SchoolStats>;

    /// 学号方法
    // 原子递增计数器并生成学号
    async fn issue_matricule(&self, school_id: i64, role: UserRole) -> Result<String>;

    /// 档案方法
    async fn create_profile(&self, profile: NewProfile) -> Result<Profile>;
    async fn get_profile_by_id(&self, id: i64) -> Result<Option<Profile>>;
    async fn get_profile_by_user_id(&self, user_id: i64) -> Result<Option<Profile>>;
    async fn list_profiles_with_pagination(
        &self,
        school_id: i64,
        query: ProfileListQuery,
    ) -> Result<ProfileListResponse>;
    // 学校内除管理员外的全部档案，按ID升序
    async fn list_non_admin_profiles(&self, school_id: i64) -> Result<Vec<Profile>>;
    // 班级学生，按ID升序
    async fn list_class_students(&self, class_id: i64) -> Result<Vec<Profile>>;
    // 家长名下的学生
    async fn list_children(&self, parent_profile_id: i64) -> Result<Vec<Profile>>;
    async fn update_profile(&self, id: i64, update: UpdateProfile) -> Result<Option<Profile>>;
    async fn update_profile_matricule(&self, id: i64, matricule: &str) -> Result<bool>;
    // 删除档案及其认证记录
    async fn delete_account(&self, profile_id: i64) -> Result<bool>;

    /// 班级方法
    async fn create_class(&self, school_id: i64, class: CreateClassRequest) -> Result<Class>;
    async fn get_class_by_id(&self, id: i64) -> Result<Option<Class>>;
    async fn list_classes_with_pagination(
        &self,
        school_id: i64,
        query: ClassListQuery,
    ) -> Result<ClassListResponse>;
    async fn update_class(&self, id: i64, update: UpdateClassRequest) -> Result<Option<Class>>;
    async fn delete_class(&self, id: i64) -> Result<bool>;

    /// 科目方法
    async fn create_subject(&self, school_id: i64, subject: CreateSubjectRequest)
    -> Result<Subject>;
    async fn get_subject_by_id(&self, id: i64) -> Result<Option<Subject>>;
    async fn list_subjects_with_pagination(
        &self,
        school_id: i64,
        query: SubjectListQuery,
    ) -> Result<SubjectListResponse>;
    async fn list_class_subjects(&self, class_id: i64) -> Result<Vec<Subject>>;
    async fn update_subject(
        &self,
        id: i64,
        update: UpdateSubjectRequest,
    ) -> Result<Option<Subject>>;
    async fn delete_subject(&self, id: i64) -> Result<bool>;

    /// 考试方法
    async fn create_exam(&self, school_id: i64, exam: CreateExamRequest) -> Result<Exam>;
    async fn get_exam_by_id(&self, id: i64) -> Result<Option<Exam>>;
    async fn list_exams_with_pagination(
        &self,
        school_id: i64,
        query: ExamListQuery,
    ) -> Result<ExamListResponse>;
    // 班级的考试，可按学期筛选
    async fn list_class_exams(&self, class_id: i64, term: Option<i32>) -> Result<Vec<Exam>>;
    async fn update_exam(&self, id: i64, update: UpdateExamRequest) -> Result<Option<Exam>>;
    async fn delete_exam(&self, id: i64) -> Result<bool>;

    /// 成绩方法
    // 按 (exam_id, student_id) 插入或覆盖
    async fn upsert_grade(
        &self,
        school_id: i64,
        exam_id: i64,
        student_id: i64,
        score: Option<f64>,
        comment: Option<String>,
    ) -> Result<Grade>;
    // 整场考试的成绩在一个事务中写入
    async fn upsert_grades(
        &self,
        school_id: i64,
        exam_id: i64,
        entries: Vec<BulkGradeEntry>,
    ) -> Result<Vec<Grade>>;
    async fn get_grade_by_id(&self, id: i64) -> Result<Option<Grade>>;
    async fn list_grades_with_pagination(
        &self,
        school_id: i64,
        query: GradeListQuery,
    ) -> Result<GradeListResponse>;
    async fn list_grades_for_exams(&self, exam_ids: &[i64]) -> Result<Vec<Grade>>;
    async fn update_grade(&self, id: i64, update: UpdateGradeRequest) -> Result<Option<Grade>>;
    async fn delete_grade(&self, id: i64) -> Result<bool>;

    /// 公告方法
    async fn create_announcement(
        &self,
        school_id: i64,
        author_id: i64,
        announcement: CreateAnnouncementRequest,
    ) -> Result<Announcement>;
    async fn get_announcement_by_id(&self, id: i64) -> Result<Option<Announcement>>;
    async fn list_announcements_with_pagination(
        &self,
        school_id: i64,
        query: AnnouncementListQuery,
    ) -> Result<AnnouncementListResponse>;
    async fn update_announcement(
        &self,
        id: i64,
        update: UpdateAnnouncementRequest,
    ) -> Result<Option<Announcement>>;
    async fn delete_announcement(&self, id: i64) -> Result<bool>;

    /// 缴费方法
    async fn create_payment(&self, payment: NewPayment) -> Result<Payment>;
    async fn get_payment_by_id(&self, id: i64) -> Result<Option<Payment>>;
    async fn get_payment_by_session_id(&self, session_id: &str) -> Result<Option<Payment>>;
    async fn list_payments_with_pagination(
        &self,
        school_id: i64,
        query: PaymentListQuery,
    ) -> Result<PaymentListResponse>;
    // 记录支付网关返回的结账会话
    async fn attach_checkout_session(
        &self,
        id: i64,
        session: &CheckoutSession,
    ) -> Result<Option<Payment>>;
    // 更新缴费状态，已支付的记录不再变更
    async fn mark_payment_status(&self, id: i64, status: PaymentStatus)
    -> Result<Option<Payment>>;

    /// 课表方法
    async fn create_schedule(
        &self,
        school_id: i64,
        schedule: CreateScheduleRequest,
    ) -> Result<Schedule>;
    async fn get_schedule_by_id(&self, id: i64) -> Result<Option<Schedule>>;
    async fn list_schedules_with_pagination(
        &self,
        school_id: i64,
        query: ScheduleListQuery,
    ) -> Result<ScheduleListResponse>;
    async fn update_schedule(
        &self,
        id: i64,
        update: UpdateScheduleRequest,
    ) -> Result<Option<Schedule>>;
    async fn delete_schedule(&self, id: i64) -> Result<bool>;

    /// 教学日志方法
    async fn create_lesson_log(
        &self,
        school_id: i64,
        teacher_id: i64,
        log: CreateLessonLogRequest,
    ) -> Result<LessonLog>;
    async fn get_lesson_log_by_id(&self, id: i64) -> Result<Option<LessonLog>>;
    async fn list_lesson_logs_with_pagination(
        &self,
        school_id: i64,
        query: LessonLogListQuery,
    ) -> Result<LessonLogListResponse>;
    async fn update_lesson_log(
        &self,
        id: i64,
        update: UpdateLessonLogRequest,
    ) -> Result<Option<LessonLog>>;
    async fn delete_lesson_log(&self, id: i64) -> Result<bool>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
