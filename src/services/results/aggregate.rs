//! 成绩汇总计算
//!
//! 分数先换算为 20 分制，科目平均分为该科有效成绩的算术平均，
//! 总平均分按科目系数加权。排名使用未舍入的平均分，输出保留两位小数。

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::profiles::entities::Profile;
use crate::models::results::entities::{
    AnnualStudentResult, ClassStatistics, GradeRow, StudentResult, SubjectAverage, SubjectWeight,
};

/// 统一换算的满分
pub const NORMALIZED_SCALE: f64 = 20.0;

/// 学期数
pub const TERMS: usize = 3;

pub fn normalize_score(score: f64, max_score: f64) -> Option<f64> {
    if max_score <= 0.0 {
        return None;
    }
    Some(score / max_score * NORMALIZED_SCALE)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// 学生各科平均分（未舍入），键为 (student_id, subject_id)
///
/// 缺考或未评分的成绩不计入，而不是按 0 分处理
pub fn subject_means(rows: &[GradeRow]) -> HashMap<(i64, i64), f64> {
    let mut acc: HashMap<(i64, i64), (f64, usize)> = HashMap::new();
    for row in rows {
        let Some(normalized) = row
            .score
            .and_then(|score| normalize_score(score, row.max_score))
        else {
            continue;
        };
        let entry = acc.entry((row.student_id, row.subject_id)).or_insert((0.0, 0));
        entry.0 += normalized;
        entry.1 += 1;
    }

    acc.into_iter()
        .map(|(key, (sum, count))| (key, sum / count as f64))
        .collect()
}

/// 加权平均，输入为 (平均分, 系数)
pub fn weighted_average<I>(pairs: I) -> Option<f64>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut total = 0.0;
    let mut weights = 0.0;
    for (average, coefficient) in pairs {
        total += average * coefficient;
        weights += coefficient;
    }
    if weights > 0.0 {
        Some(total / weights)
    } else {
        None
    }
}

/// 每个学生的总平均分（未舍入），顺序与 student_ids 一致
pub fn overall_averages(
    student_ids: &[i64],
    subjects: &[SubjectWeight],
    means: &HashMap<(i64, i64), f64>,
) -> Vec<Option<f64>> {
    student_ids
        .iter()
        .map(|student_id| {
            weighted_average(subjects.iter().filter_map(|subject| {
                means
                    .get(&(*student_id, subject.subject_id))
                    .map(|avg| (*avg, subject.coefficient))
            }))
        })
        .collect()
}

/// 按平均分降序排名
///
/// 返回 (原下标, 名次)，按输出顺序排列。排序稳定，同分保持原顺序；
/// 名次即位置。没有平均分的学生排在最后且没有名次。
pub fn rank_descending(values: &[Option<f64>]) -> Vec<(usize, Option<usize>)> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| match (values[a], values[b]) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let mut position = 0;
    order
        .into_iter()
        .map(|index| {
            let rank = values[index].map(|_| {
                position += 1;
                position
            });
            (index, rank)
        })
        .collect()
}

pub fn class_statistics(values: &[Option<f64>]) -> ClassStatistics {
    let ranked: Vec<f64> = values.iter().flatten().copied().collect();
    ClassStatistics {
        ranked: ranked.len(),
        unranked: values.len() - ranked.len(),
        average: mean(&ranked).map(round2),
        min: ranked.iter().copied().reduce(f64::min).map(round2),
        max: ranked.iter().copied().reduce(f64::max).map(round2),
    }
}

/// 学期成绩：各科平均、总平均与排名
pub fn term_results(
    students: &[Profile],
    subjects: &[SubjectWeight],
    rows: &[GradeRow],
) -> (Vec<StudentResult>, ClassStatistics) {
    let means = subject_means(rows);
    let ids: Vec<i64> = students.iter().map(|s| s.id).collect();
    let averages = overall_averages(&ids, subjects, &means);
    let statistics = class_statistics(&averages);

    let results = rank_descending(&averages)
        .into_iter()
        .map(|(index, rank)| {
            let student = &students[index];
            StudentResult {
                student_id: student.id,
                matricule: student.matricule.clone(),
                full_name: student.full_name(),
                subjects: subjects
                    .iter()
                    .map(|subject| SubjectAverage {
                        subject_id: subject.subject_id,
                        subject_name: subject.name.clone(),
                        coefficient: subject.coefficient,
                        average: means
                            .get(&(student.id, subject.subject_id))
                            .copied()
                            .map(round2),
                    })
                    .collect(),
                average: averages[index].map(round2),
                rank,
            }
        })
        .collect();

    (results, statistics)
}

/// 学年成绩
///
/// term_averages 的每一项是某学期的总平均分（未舍入），与 students 对齐。
/// 学年平均分为已有学期平均分的算术平均。
pub fn annual_results(
    students: &[Profile],
    term_averages: &[Vec<Option<f64>>],
) -> (Vec<AnnualStudentResult>, ClassStatistics) {
    let per_student: Vec<Vec<Option<f64>>> = (0..students.len())
        .map(|index| {
            term_averages
                .iter()
                .map(|term| term.get(index).copied().flatten())
                .collect()
        })
        .collect();

    let annual: Vec<Option<f64>> = per_student
        .iter()
        .map(|terms| {
            let available: Vec<f64> = terms.iter().flatten().copied().collect();
            mean(&available)
        })
        .collect();
    let statistics = class_statistics(&annual);

    let results = rank_descending(&annual)
        .into_iter()
        .map(|(index, rank)| {
            let student = &students[index];
            AnnualStudentResult {
                student_id: student.id,
                matricule: student.matricule.clone(),
                full_name: student.full_name(),
                term_averages: per_student[index].iter().map(|v| v.map(round2)).collect(),
                annual_average: annual[index].map(round2),
                rank,
            }
        })
        .collect();

    (results, statistics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;

    fn student(id: i64, last_name: &str) -> Profile {
        let now = chrono::Utc::now();
        Profile {
            id,
            user_id: id,
            school_id: 1,
            role: UserRole::Student,
            matricule: Some(format!("STU{id:03}@demo.sn")),
            first_name: "Test".to_string(),
            last_name: last_name.to_string(),
            phone: None,
            class_id: Some(1),
            parent_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn weight(subject_id: i64, coefficient: f64) -> SubjectWeight {
        SubjectWeight {
            subject_id,
            name: format!("S{subject_id}"),
            coefficient,
        }
    }

    fn row(student_id: i64, subject_id: i64, score: Option<f64>, max_score: f64) -> GradeRow {
        GradeRow {
            student_id,
            subject_id,
            score,
            max_score,
        }
    }

    #[test]
    fn test_weighted_average_example() {
        let avg = weighted_average([(15.0, 3.0), (12.0, 2.0), (18.0, 1.0)]).unwrap();
        assert!((avg - 14.5).abs() < 1e-9);
        assert_eq!(weighted_average(std::iter::empty()), None);
    }

    #[test]
    fn test_scores_are_normalized_to_twenty() {
        assert_eq!(normalize_score(8.0, 10.0), Some(16.0));
        assert_eq!(normalize_score(50.0, 100.0), Some(10.0));
        assert_eq!(normalize_score(5.0, 0.0), None);
    }

    #[test]
    fn test_ungraded_rows_are_excluded_not_zero() {
        let means = subject_means(&[
            row(1, 10, Some(12.0), 20.0),
            row(1, 10, None, 20.0),
            row(1, 10, Some(16.0), 20.0),
        ]);
        assert_eq!(means.get(&(1, 10)), Some(&14.0));
    }

    #[test]
    fn test_ranking_descending_with_positions() {
        let ranked = rank_descending(&[Some(16.5), Some(14.2), Some(18.0)]);
        assert_eq!(ranked, vec![(2, Some(1)), (0, Some(2)), (1, Some(3))]);
    }

    #[test]
    fn test_ranking_ties_are_stable_and_unranked_last() {
        let ranked = rank_descending(&[None, Some(12.0), Some(15.0), Some(12.0)]);
        assert_eq!(
            ranked,
            vec![(2, Some(1)), (1, Some(2)), (3, Some(3)), (0, None)]
        );
    }

    #[test]
    fn test_term_results_end_to_end() {
        let students = vec![student(1, "Ba"), student(2, "Cisse"), student(3, "Diallo")];
        let subjects = vec![weight(10, 3.0), weight(11, 2.0), weight(12, 1.0)];
        let rows = vec![
            row(1, 10, Some(15.0), 20.0),
            row(1, 11, Some(6.0), 10.0),
            row(1, 12, Some(18.0), 20.0),
            row(2, 10, Some(18.0), 20.0),
            row(2, 11, None, 20.0),
            row(3, 10, None, 20.0),
        ];

        let (results, stats) = term_results(&students, &subjects, &rows);

        assert_eq!(results[0].student_id, 2);
        assert_eq!(results[0].average, Some(18.0));
        assert_eq!(results[0].rank, Some(1));
        assert_eq!(results[1].student_id, 1);
        assert_eq!(results[1].average, Some(14.5));
        assert_eq!(results[1].rank, Some(2));
        assert_eq!(results[2].student_id, 3);
        assert_eq!(results[2].average, None);
        assert_eq!(results[2].rank, None);

        assert_eq!(results[1].subjects[1].average, Some(12.0));
        assert_eq!(stats.ranked, 2);
        assert_eq!(stats.unranked, 1);
        assert_eq!(stats.average, Some(16.25));
        assert_eq!(stats.min, Some(14.5));
        assert_eq!(stats.max, Some(18.0));
    }

    #[test]
    fn test_output_is_rounded_but_ranking_is_not() {
        let students = vec![student(1, "A"), student(2, "B")];
        let subjects = vec![weight(10, 1.0)];
        let rows = vec![
            row(1, 10, Some(40.0), 60.0),
            row(2, 10, Some(13.335), 20.0),
        ];
        let (results, _) = term_results(&students, &subjects, &rows);
        assert_eq!(results[0].student_id, 2);
        assert_eq!(results[1].average, Some(13.33));
    }

    #[test]
    fn test_annual_average_uses_available_terms() {
        let students = vec![student(1, "A"), student(2, "B"), student(3, "C")];
        let terms = vec![
            vec![Some(10.0), Some(14.0), None],
            vec![Some(12.0), None, None],
            vec![Some(14.0), Some(16.0), None],
        ];
        let (results, stats) = annual_results(&students, &terms);

        assert_eq!(results[0].student_id, 2);
        assert_eq!(results[0].annual_average, Some(15.0));
        assert_eq!(results[0].term_averages, vec![Some(14.0), None, Some(16.0)]);
        assert_eq!(results[1].annual_average, Some(12.0));
        assert_eq!(results[2].rank, None);
        assert_eq!(stats.ranked, 2);
    }
}
