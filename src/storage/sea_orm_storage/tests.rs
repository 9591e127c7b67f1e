use std::collections::HashSet;
use std::sync::Arc;

use super::SeaOrmStorage;
use crate::config::DatabaseConfig;
use crate::entity::matricule_counters;
use crate::models::{
    classes::requests::CreateClassRequest,
    exams::{entities::Exam, requests::CreateExamRequest},
    grades::requests::BulkGradeEntry,
    payments::entities::{CheckoutSession, NewPayment, PaymentStatus},
    profiles::entities::NewProfile,
    schools::{entities::School, requests::CreateSchoolRequest},
    subjects::requests::CreateSubjectRequest,
    users::entities::{NewUser, UserRole},
};
use crate::storage::Storage;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

pub(crate) async fn memory_storage() -> SeaOrmStorage {
    SeaOrmStorage::connect(&DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        pool_size: 1,
        timeout: 10,
    })
    .await
    .expect("in-memory database")
}

/// 临时文件库，多连接池，用于并发测试
pub(crate) struct FileStorage {
    pub storage: Arc<SeaOrmStorage>,
    path: std::path::PathBuf,
}

impl Drop for FileStorage {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

pub(crate) async fn file_storage() -> FileStorage {
    let path = std::env::temp_dir().join(format!(
        "schoolhub-test-{}.db",
        uuid::Uuid::new_v4().simple()
    ));
    let storage = SeaOrmStorage::connect(&DatabaseConfig {
        url: path.to_string_lossy().into_owned(),
        pool_size: 10,
        timeout: 30,
    })
    .await
    .expect("file database");
    FileStorage {
        storage: Arc::new(storage),
        path,
    }
}

pub(crate) async fn seed_school(storage: &SeaOrmStorage, suffix: &str) -> School {
    storage
        .create_school(CreateSchoolRequest {
            name: format!("School {suffix}"),
            suffix: suffix.to_string(),
            address: None,
            phone: None,
            email: None,
        })
        .await
        .expect("school created")
}

pub(crate) async fn seed_member(
    storage: &SeaOrmStorage,
    school: &School,
    role: UserRole,
    class_id: Option<i64>,
) -> crate::models::profiles::entities::Profile {
    let login = if role.is_admin() {
        format!("admin{}@{}", uuid::Uuid::new_v4().simple(), school.suffix)
    } else {
        storage.issue_matricule(school.id, role).await.expect("matricule")
    };
    let user = storage
        .create_user(NewUser {
            login: login.clone(),
            email: None,
            password_hash: "x".to_string(),
            role,
            school_id: Some(school.id),
        })
        .await
        .expect("user created");
    storage
        .create_profile(NewProfile {
            user_id: user.id,
            school_id: school.id,
            role,
            matricule: (!role.is_admin()).then_some(login),
            first_name: "Awa".to_string(),
            last_name: "Diop".to_string(),
            phone: None,
            class_id,
            parent_id: None,
        })
        .await
        .expect("profile created")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_issuance_yields_distinct_sequential_values() {
    let db = file_storage().await;
    let school = seed_school(&db.storage, "lycee.sn").await;

    let mut handles = Vec::new();
    for _ in 0..40 {
        let storage = db.storage.clone();
        handles.push(tokio::spawn(async move {
            storage.issue_matricule(school.id, UserRole::Student).await
        }));
    }

    let mut issued = HashSet::new();
    for handle in handles {
        issued.insert(handle.await.unwrap().unwrap());
    }

    let expected: HashSet<String> = (1..=40).map(|n| format!("STU{n:03}@lycee.sn")).collect();
    assert_eq!(issued, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_issuance_on_legacy_school_without_counters() {
    let db = file_storage().await;
    let school = seed_school(&db.storage, "ancien.sn").await;
    matricule_counters::Entity::delete_many()
        .filter(matricule_counters::Column::SchoolId.eq(school.id))
        .exec(&db.storage.db)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let storage = db.storage.clone();
        handles.push(tokio::spawn(async move {
            storage.issue_matricule(school.id, UserRole::Teacher).await
        }));
    }

    let mut issued = HashSet::new();
    for handle in handles {
        issued.insert(handle.await.unwrap().unwrap());
    }
    let expected: HashSet<String> = (1..=10).map(|n| format!("TCH{n:03}@ancien.sn")).collect();
    assert_eq!(issued, expected);
}

#[tokio::test]
async fn test_counters_are_scoped_by_role_and_school() {
    let storage = memory_storage().await;
    let a = seed_school(&storage, "a.sn").await;
    let b = seed_school(&storage, "b.sn").await;

    assert_eq!(
        storage.issue_matricule(a.id, UserRole::Student).await.unwrap(),
        "STU001@a.sn"
    );
    assert_eq!(
        storage.issue_matricule(a.id, UserRole::Teacher).await.unwrap(),
        "TCH001@a.sn"
    );
    assert_eq!(
        storage.issue_matricule(b.id, UserRole::Student).await.unwrap(),
        "STU001@b.sn"
    );
    assert_eq!(
        storage.issue_matricule(a.id, UserRole::Student).await.unwrap(),
        "STU002@a.sn"
    );
}

#[tokio::test]
async fn test_admin_issuance_rejected() {
    let storage = memory_storage().await;
    let school = seed_school(&storage, "x.sn").await;
    let err = storage
        .issue_matricule(school.id, UserRole::Admin)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E007");
}

#[tokio::test]
async fn test_missing_counter_row_starts_at_one() {
    let storage = memory_storage().await;
    let school = seed_school(&storage, "legacy.sn").await;

    matricule_counters::Entity::delete_many()
        .filter(matricule_counters::Column::SchoolId.eq(school.id))
        .exec(&storage.db)
        .await
        .unwrap();

    assert_eq!(
        storage.issue_matricule(school.id, UserRole::Parent).await.unwrap(),
        "PAR001@legacy.sn"
    );
    assert_eq!(
        storage.issue_matricule(school.id, UserRole::Parent).await.unwrap(),
        "PAR002@legacy.sn"
    );
}

#[tokio::test]
async fn test_issue_for_unknown_school_is_not_found() {
    let storage = memory_storage().await;
    let err = storage
        .issue_matricule(999, UserRole::Student)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E008");
}

#[tokio::test]
async fn test_duplicate_suffix_is_conflict() {
    let storage = memory_storage().await;
    seed_school(&storage, "dup.sn").await;
    let err = storage
        .create_school(CreateSchoolRequest {
            name: "Other".to_string(),
            suffix: "dup.sn".to_string(),
            address: None,
            phone: None,
            email: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E013");
}

async fn seed_exam(storage: &SeaOrmStorage, school_id: i64) -> Exam {
    let class = storage
        .create_class(
            school_id,
            CreateClassRequest {
                name: "6e A".to_string(),
                level: None,
                academic_year: "2025-2026".to_string(),
                homeroom_teacher_id: None,
            },
        )
        .await
        .unwrap();
    let subject = storage
        .create_subject(
            school_id,
            CreateSubjectRequest {
                class_id: class.id,
                name: "Maths".to_string(),
                coefficient: 3.0,
                teacher_id: None,
            },
        )
        .await
        .unwrap();
    storage
        .create_exam(
            school_id,
            CreateExamRequest {
                class_id: class.id,
                subject_id: subject.id,
                title: "Devoir 1".to_string(),
                term: 1,
                exam_date: None,
                max_score: None,
            },
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_grade_upsert_overwrites_same_pair() {
    let storage = memory_storage().await;
    let school = seed_school(&storage, "g.sn").await;
    let exam = seed_exam(&storage, school.id).await;
    assert_eq!(exam.max_score, 20.0);

    let student = seed_member(&storage, &school, UserRole::Student, Some(exam.class_id)).await;

    let first = storage
        .upsert_grade(school.id, exam.id, student.id, Some(12.0), None)
        .await
        .unwrap();
    let second = storage
        .upsert_grade(
            school.id,
            exam.id,
            student.id,
            Some(15.5),
            Some("bien".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.score, Some(15.5));

    let absent = storage
        .upsert_grade(school.id, exam.id, student.id, None, None)
        .await
        .unwrap();
    assert_eq!(absent.score, None);

    let all = storage.list_grades_for_exams(&[exam.id]).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_grade_batch_rolls_back_on_write_failure() {
    let storage = memory_storage().await;
    let school = seed_school(&storage, "batch.sn").await;
    let exam = seed_exam(&storage, school.id).await;
    let a = seed_member(&storage, &school, UserRole::Student, Some(exam.class_id)).await;
    let b = seed_member(&storage, &school, UserRole::Student, Some(exam.class_id)).await;

    let entry = |student_id: i64, score: f64| BulkGradeEntry {
        student_id,
        score: Some(score),
        comment: None,
    };

    // 第三条引用不存在的档案，外键约束使写入失败
    let err = storage
        .upsert_grades(
            school.id,
            exam.id,
            vec![entry(a.id, 11.0), entry(b.id, 14.0), entry(b.id + 1000, 9.0)],
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E005");
    assert!(storage.list_grades_for_exams(&[exam.id]).await.unwrap().is_empty());

    let saved = storage
        .upsert_grades(school.id, exam.id, vec![entry(a.id, 11.0), entry(b.id, 14.0)])
        .await
        .unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(storage.list_grades_for_exams(&[exam.id]).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_tenant_cascade_removes_only_that_school() {
    let storage = memory_storage().await;
    let doomed = seed_school(&storage, "doomed.sn").await;
    let kept = seed_school(&storage, "kept.sn").await;

    for school in [&doomed, &kept] {
        let class = storage
            .create_class(
                school.id,
                CreateClassRequest {
                    name: "CM2".to_string(),
                    level: None,
                    academic_year: "2025-2026".to_string(),
                    homeroom_teacher_id: None,
                },
            )
            .await
            .unwrap();
        let subject = storage
            .create_subject(
                school.id,
                CreateSubjectRequest {
                    class_id: class.id,
                    name: "Français".to_string(),
                    coefficient: 2.0,
                    teacher_id: None,
                },
            )
            .await
            .unwrap();
        let exam = storage
            .create_exam(
                school.id,
                CreateExamRequest {
                    class_id: class.id,
                    subject_id: subject.id,
                    title: "Dictée".to_string(),
                    term: 1,
                    exam_date: None,
                    max_score: Some(10.0),
                },
            )
            .await
            .unwrap();
        let student = seed_member(&storage, school, UserRole::Student, Some(class.id)).await;
        seed_member(&storage, school, UserRole::Admin, None).await;
        storage
            .upsert_grade(school.id, exam.id, student.id, Some(8.0), None)
            .await
            .unwrap();
        storage
            .create_payment(NewPayment {
                school_id: school.id,
                student_id: student.id,
                amount_cents: 5000,
                currency: "xof".to_string(),
                description: "Scolarité".to_string(),
            })
            .await
            .unwrap();
    }

    let report = storage
        .delete_school_cascade(doomed.id)
        .await
        .unwrap()
        .expect("school existed");
    assert_eq!(report.grades, 1);
    assert_eq!(report.exams, 1);
    assert_eq!(report.subjects, 1);
    assert_eq!(report.payments, 1);
    assert_eq!(report.profiles, 2);
    assert_eq!(report.users, 2);
    assert_eq!(report.matricule_counters, 3);
    assert_eq!(report.classes, 1);

    assert!(storage.get_school_by_id(doomed.id).await.unwrap().is_none());
    assert!(storage.delete_school_cascade(doomed.id).await.unwrap().is_none());

    let stats = storage.get_school_stats(kept.id).await.unwrap();
    assert_eq!(stats.students, 1);
    assert_eq!(stats.classes, 1);
    assert_eq!(stats.pending_payments, 1);
}

#[tokio::test]
async fn test_payment_status_transitions_are_idempotent() {
    let storage = memory_storage().await;
    let school = seed_school(&storage, "pay.sn").await;
    let student = seed_member(&storage, &school, UserRole::Student, None).await;

    let payment = storage
        .create_payment(NewPayment {
            school_id: school.id,
            student_id: student.id,
            amount_cents: 12_500,
            currency: "eur".to_string(),
            description: "Cantine".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);

    storage
        .attach_checkout_session(
            payment.id,
            &CheckoutSession {
                id: "cs_test_1".to_string(),
                url: "https://pay.example/cs_test_1".to_string(),
            },
        )
        .await
        .unwrap();
    let found = storage
        .get_payment_by_session_id("cs_test_1")
        .await
        .unwrap()
        .expect("session attached");
    assert_eq!(found.id, payment.id);

    let paid = storage
        .mark_payment_status(payment.id, PaymentStatus::Paid)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(paid.status, PaymentStatus::Paid);
    let paid_at = paid.paid_at.expect("paid_at set");

    // 已支付后不再被过期事件改写
    let replay = storage
        .mark_payment_status(payment.id, PaymentStatus::Expired)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(replay.status, PaymentStatus::Paid);
    assert_eq!(replay.paid_at, Some(paid_at));

    let stats = storage.get_school_stats(school.id).await.unwrap();
    assert_eq!(stats.paid_amount_cents, 12_500);
    assert_eq!(stats.pending_payments, 0);
}

#[tokio::test]
async fn test_delete_account_removes_user_and_profile() {
    let storage = memory_storage().await;
    let school = seed_school(&storage, "del.sn").await;
    let teacher = seed_member(&storage, &school, UserRole::Teacher, None).await;

    assert!(storage.delete_account(teacher.id).await.unwrap());
    assert!(storage.get_profile_by_id(teacher.id).await.unwrap().is_none());
    assert!(storage.get_user_by_id(teacher.user_id).await.unwrap().is_none());
    assert!(!storage.delete_account(teacher.id).await.unwrap());
}

#[tokio::test]
async fn test_identifier_lookup_prefers_login_and_admin_email() {
    let storage = memory_storage().await;
    let school = seed_school(&storage, "login.sn").await;
    let student = seed_member(&storage, &school, UserRole::Student, None).await;
    let matricule = student.matricule.clone().unwrap();

    let found = storage
        .get_user_by_identifier(&matricule)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, student.user_id);

    storage
        .create_user(NewUser {
            login: "principal@login.sn".to_string(),
            email: Some("principal@login.sn".to_string()),
            password_hash: "x".to_string(),
            role: UserRole::Admin,
            school_id: Some(school.id),
        })
        .await
        .unwrap();
    assert!(
        storage
            .get_user_by_identifier("principal@login.sn")
            .await
            .unwrap()
            .is_some()
    );
    assert!(
        storage
            .get_user_by_identifier("nobody@login.sn")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_paid_and_expired_keep_paid() {
    let db = file_storage().await;
    let school = seed_school(&db.storage, "pay.sn").await;
    let student = seed_member(&db.storage, &school, UserRole::Student, None).await;

    let mut ids = Vec::new();
    for _ in 0..50 {
        let payment = db
            .storage
            .create_payment(NewPayment {
                school_id: school.id,
                student_id: student.id,
                amount_cents: 5_000,
                currency: "xof".to_string(),
                description: "Cantine".to_string(),
            })
            .await
            .unwrap();
        ids.push(payment.id);
    }

    let mut handles = Vec::new();
    for id in ids.iter().copied() {
        for status in [PaymentStatus::Paid, PaymentStatus::Expired] {
            let storage = db.storage.clone();
            handles.push(tokio::spawn(async move {
                storage.mark_payment_status(id, status).await
            }));
        }
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    for id in ids {
        let payment = db.storage.get_payment_by_id(id).await.unwrap().unwrap();
        assert_eq!(payment.status, PaymentStatus::Paid, "payment {id}");
        assert!(payment.paid_at.is_some());
    }
}
