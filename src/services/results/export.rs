//! 成绩单导出（XLSX）
//!
//! 横向打印，表头在每一页重复，每 `export.rows_per_page` 名学生插入一次分页。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet};
use tracing::info;

use super::ResultService;
use super::aggregate::TERMS;
use super::load::{load_annual_results, load_term_results};
use super::view::authorize_class;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::results::entities::{AnnualResults, ClassResults, ClassStatistics};
use crate::models::results::requests::ResultsQuery;
use crate::services::{check, error_response, try_response};
use crate::utils::validate::validate_term;

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// A4
const PAPER_A4: u8 = 9;

/// 表头占用的行：标题、系数、列名
const HEADER_ROWS: u32 = 3;

pub async fn export_term_bulletin(
    service: &ResultService,
    request: &HttpRequest,
    class_id: i64,
    query: ResultsQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    try_response!(check(validate_term(query.term)));
    let class = try_response!(authorize_class(storage.as_ref(), request, class_id).await);

    let results = match load_term_results(storage.as_ref(), &class, query.term).await {
        Ok(results) => results,
        Err(e) => return Ok(error_response("Failed to compute term results", &e)),
    };

    let rows_per_page = AppConfig::get().export.rows_per_page;
    match term_workbook(&results, rows_per_page) {
        Ok(buffer) => {
            info!(
                "Exported term {} bulletin of class {} ({} students)",
                query.term,
                class_id,
                results.students.len()
            );
            Ok(xlsx_response(
                buffer,
                &format!("bulletin_class{class_id}_term{}", query.term),
            ))
        }
        Err(e) => Ok(error_response("Failed to export bulletin", &e)),
    }
}

pub async fn export_annual_bulletin(
    service: &ResultService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let class = try_response!(authorize_class(storage.as_ref(), request, class_id).await);

    let results = match load_annual_results(storage.as_ref(), &class).await {
        Ok(results) => results,
        Err(e) => return Ok(error_response("Failed to compute annual results", &e)),
    };

    let rows_per_page = AppConfig::get().export.rows_per_page;
    match annual_workbook(&results, rows_per_page) {
        Ok(buffer) => {
            info!(
                "Exported annual bulletin of class {} ({} students)",
                class_id,
                results.students.len()
            );
            Ok(xlsx_response(buffer, &format!("bulletin_class{class_id}_annual")))
        }
        Err(e) => Ok(error_response("Failed to export bulletin", &e)),
    }
}

fn xlsx_response(buffer: Vec<u8>, stem: &str) -> HttpResponse {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
    HttpResponse::Ok()
        .content_type(XLSX_CONTENT_TYPE)
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{stem}_{timestamp}.xlsx\""),
        ))
        .body(buffer)
}

/// 分页位置：在这些行之前插入水平分页符
pub fn page_breaks(first_data_row: u32, data_rows: usize, rows_per_page: u32) -> Vec<u32> {
    let rows_per_page = rows_per_page.max(1);
    let data_rows = data_rows as u32;
    (1..)
        .map(|page| first_data_row + page * rows_per_page)
        .take_while(|row| *row < first_data_row + data_rows)
        .collect()
}

struct Formats {
    title: Format,
    header: Format,
    number: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            title: Format::new().set_bold().set_font_size(14),
            header: Format::new().set_bold().set_align(FormatAlign::Center),
            number: Format::new().set_num_format("0.00"),
        }
    }
}

/// 打印设置：横向、A4、重复表头、分页
fn setup_page(sheet: &mut Worksheet, data_rows: usize, rows_per_page: u32) -> Result<()> {
    sheet.set_landscape();
    sheet.set_paper_size(PAPER_A4);
    sheet.set_print_fit_to_pages(1, 0);
    sheet.set_repeat_rows(1, HEADER_ROWS - 1)?;

    let breaks = page_breaks(HEADER_ROWS, data_rows, rows_per_page);
    if !breaks.is_empty() {
        sheet.set_page_breaks(&breaks)?;
    }
    Ok(())
}

fn write_optional_number(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: Option<f64>,
    format: &Format,
) -> Result<()> {
    match value {
        Some(value) => sheet.write_number_with_format(row, col, value, format)?,
        None => sheet.write_string(row, col, "-")?,
    };
    Ok(())
}

fn write_rank(sheet: &mut Worksheet, row: u32, rank: Option<usize>) -> Result<()> {
    match rank {
        Some(rank) => sheet.write_number(row, 0, rank as f64)?,
        None => sheet.write_string(row, 0, "-")?,
    };
    Ok(())
}

fn write_statistics(
    sheet: &mut Worksheet,
    first_row: u32,
    statistics: &ClassStatistics,
    formats: &Formats,
) -> Result<()> {
    sheet.write_string_with_format(first_row, 0, "Statistiques de la classe", &formats.header)?;
    let lines = [
        ("Moyenne de la classe", statistics.average),
        ("Plus faible moyenne", statistics.min),
        ("Plus forte moyenne", statistics.max),
    ];
    for (offset, (label, value)) in lines.into_iter().enumerate() {
        let row = first_row + 1 + offset as u32;
        sheet.write_string(row, 2, label)?;
        write_optional_number(sheet, row, 3, value, &formats.number)?;
    }
    let row = first_row + 1 + lines.len() as u32;
    sheet.write_string(row, 2, "Élèves classés")?;
    sheet.write_number(row, 3, statistics.ranked as f64)?;
    sheet.write_string(row + 1, 2, "Élèves non classés")?;
    sheet.write_number(row + 1, 3, statistics.unranked as f64)?;
    Ok(())
}

/// 学期成绩单
pub fn term_workbook(results: &ClassResults, rows_per_page: u32) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let formats = Formats::new();

    let sheet = workbook
        .add_worksheet()
        .set_name(format!("Trimestre {}", results.term))?;

    sheet.write_string_with_format(
        0,
        0,
        format!(
            "{} ({}) - Bulletin du trimestre {}",
            results.class_name, results.academic_year, results.term
        ),
        &formats.title,
    )?;

    // 系数行与列名行
    let subject_col = |index: usize| 3 + index as u16;
    sheet.write_string_with_format(1, 2, "Coefficient", &formats.header)?;
    for (index, header) in ["Rang", "Matricule", "Nom"].iter().enumerate() {
        sheet.write_string_with_format(2, index as u16, *header, &formats.header)?;
    }
    for (index, subject) in results.subjects.iter().enumerate() {
        sheet.write_number_with_format(1, subject_col(index), subject.coefficient, &formats.header)?;
        sheet.write_string_with_format(2, subject_col(index), &subject.name, &formats.header)?;
    }
    let average_col = subject_col(results.subjects.len());
    sheet.write_string_with_format(2, average_col, "Moyenne", &formats.header)?;

    for (offset, student) in results.students.iter().enumerate() {
        let row = HEADER_ROWS + offset as u32;
        write_rank(sheet, row, student.rank)?;
        sheet.write_string(row, 1, student.matricule.as_deref().unwrap_or("-"))?;
        sheet.write_string(row, 2, &student.full_name)?;
        for (index, subject) in student.subjects.iter().enumerate() {
            write_optional_number(sheet, row, subject_col(index), subject.average, &formats.number)?;
        }
        write_optional_number(sheet, row, average_col, student.average, &formats.number)?;
    }

    sheet.set_column_width(1, 22)?;
    sheet.set_column_width(2, 28)?;

    let stats_row = HEADER_ROWS + results.students.len() as u32 + 1;
    write_statistics(sheet, stats_row, &results.statistics, &formats)?;
    setup_page(sheet, results.students.len(), rows_per_page)?;

    Ok(workbook.save_to_buffer()?)
}

/// 学年成绩单
pub fn annual_workbook(results: &AnnualResults, rows_per_page: u32) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let formats = Formats::new();

    let sheet = workbook.add_worksheet().set_name("Annuel")?;

    sheet.write_string_with_format(
        0,
        0,
        format!(
            "{} ({}) - Bulletin annuel",
            results.class_name, results.academic_year
        ),
        &formats.title,
    )?;

    for (index, header) in ["Rang", "Matricule", "Nom"].iter().enumerate() {
        sheet.write_string_with_format(2, index as u16, *header, &formats.header)?;
    }
    for term in 1..=TERMS {
        sheet.write_string_with_format(
            2,
            2 + term as u16,
            format!("Trimestre {term}"),
            &formats.header,
        )?;
    }
    let annual_col = 3 + TERMS as u16;
    sheet.write_string_with_format(2, annual_col, "Moyenne annuelle", &formats.header)?;

    for (offset, student) in results.students.iter().enumerate() {
        let row = HEADER_ROWS + offset as u32;
        write_rank(sheet, row, student.rank)?;
        sheet.write_string(row, 1, student.matricule.as_deref().unwrap_or("-"))?;
        sheet.write_string(row, 2, &student.full_name)?;
        for term in 0..TERMS {
            let value = student.term_averages.get(term).copied().flatten();
            write_optional_number(sheet, row, 3 + term as u16, value, &formats.number)?;
        }
        write_optional_number(sheet, row, annual_col, student.annual_average, &formats.number)?;
    }

    sheet.set_column_width(1, 22)?;
    sheet.set_column_width(2, 28)?;

    let stats_row = HEADER_ROWS + results.students.len() as u32 + 1;
    write_statistics(sheet, stats_row, &results.statistics, &formats)?;
    setup_page(sheet, results.students.len(), rows_per_page)?;

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::results::entities::{
        AnnualStudentResult, StudentResult, SubjectAverage, SubjectWeight,
    };

    fn student(id: i64, average: Option<f64>, rank: Option<usize>) -> StudentResult {
        StudentResult {
            student_id: id,
            matricule: Some(format!("STU{id:03}@lycee.sn")),
            full_name: format!("Diop Awa {id}"),
            subjects: vec![SubjectAverage {
                subject_id: 1,
                subject_name: "Maths".to_string(),
                coefficient: 3.0,
                average,
            }],
            average,
            rank,
        }
    }

    #[test]
    fn test_page_breaks_every_n_rows() {
        assert_eq!(page_breaks(3, 10, 30), Vec::<u32>::new());
        assert_eq!(page_breaks(3, 30, 30), Vec::<u32>::new());
        assert_eq!(page_breaks(3, 31, 30), vec![33]);
        assert_eq!(page_breaks(3, 95, 30), vec![33, 63, 93]);
    }

    #[test]
    fn test_page_breaks_zero_rows_per_page() {
        assert_eq!(page_breaks(3, 3, 0), vec![4, 5]);
    }

    #[test]
    fn test_term_workbook_is_xlsx() {
        let results = ClassResults {
            class_id: 1,
            class_name: "3e B".to_string(),
            academic_year: "2025-2026".to_string(),
            term: 1,
            subjects: vec![SubjectWeight {
                subject_id: 1,
                name: "Maths".to_string(),
                coefficient: 3.0,
            }],
            students: (1..=45)
                .map(|id| student(id, Some(20.0 - id as f64 / 4.0), Some(id as usize)))
                .chain(std::iter::once(student(46, None, None)))
                .collect(),
            statistics: ClassStatistics::default(),
        };
        let buffer = term_workbook(&results, 20).unwrap();
        // XLSX 为 zip 容器
        assert_eq!(&buffer[..2], b"PK");
    }

    #[test]
    fn test_annual_workbook_is_xlsx() {
        let results = AnnualResults {
            class_id: 1,
            class_name: "3e B".to_string(),
            academic_year: "2025-2026".to_string(),
            students: vec![AnnualStudentResult {
                student_id: 1,
                matricule: None,
                full_name: "Diop Awa".to_string(),
                term_averages: vec![Some(12.0), None, Some(14.0)],
                annual_average: Some(13.0),
                rank: Some(1),
            }],
            statistics: ClassStatistics::default(),
        };
        let buffer = annual_workbook(&results, 30).unwrap();
        assert_eq!(&buffer[..2], b"PK");
    }
}
