use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}$").expect("Invalid email regex")
});

static SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9](?:[a-z0-9.-]*[a-z0-9])?$").expect("Invalid suffix regex")
});

static ACADEMIC_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{4})$").expect("Invalid academic year regex"));

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("Invalid time regex"));

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    // 邮箱格式校验：必须包含 @ 和 .
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 学校后缀：小写字母、数字、`.`、`-`，2..=63 个字符，首尾为字母或数字
pub fn validate_suffix(suffix: &str) -> Result<(), &'static str> {
    if suffix.len() < 2 || suffix.len() > 63 {
        return Err("Suffix length must be between 2 and 63 characters");
    }
    if !SUFFIX_RE.is_match(suffix) {
        return Err(
            "Suffix must contain only lowercase letters, digits, '.' or '-' and start and end with a letter or digit",
        );
    }
    Ok(())
}

/// 非空名称，最长 128 个字符
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name must not be empty");
    }
    if trimmed.chars().count() > 128 {
        return Err("Name must be at most 128 characters");
    }
    Ok(())
}

/// 学年 `YYYY-YYYY`，后一年等于前一年加一
pub fn validate_academic_year(year: &str) -> Result<(), &'static str> {
    let caps = ACADEMIC_YEAR_RE
        .captures(year)
        .ok_or("Academic year must look like YYYY-YYYY")?;
    let start: i32 = caps[1].parse().map_err(|_| "Invalid academic year")?;
    let end: i32 = caps[2].parse().map_err(|_| "Invalid academic year")?;
    if end != start + 1 {
        return Err("Academic year must span two consecutive years");
    }
    Ok(())
}

/// 时间 `HH:MM`（24 小时制）
pub fn validate_time(time: &str) -> Result<(), &'static str> {
    if !TIME_RE.is_match(time) {
        return Err("Time must be in HH:MM format");
    }
    Ok(())
}

/// 开始时间早于结束时间（`HH:MM` 可按字典序比较）
pub fn validate_time_range(start: &str, end: &str) -> Result<(), &'static str> {
    validate_time(start)?;
    validate_time(end)?;
    if start >= end {
        return Err("Start time must be before end time");
    }
    Ok(())
}

/// 日期 `YYYY-MM-DD`
pub fn validate_date(date: &str) -> Result<(), &'static str> {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| "Date must be a valid YYYY-MM-DD date")
}

/// 学期 1..=3
pub fn validate_term(term: i32) -> Result<(), &'static str> {
    if !(1..=3).contains(&term) {
        return Err("Term must be between 1 and 3");
    }
    Ok(())
}

/// 星期 1..=7
pub fn validate_weekday(weekday: i32) -> Result<(), &'static str> {
    if !(1..=7).contains(&weekday) {
        return Err("Weekday must be between 1 and 7");
    }
    Ok(())
}

/// 密码策略验证结果
#[derive(Debug, Clone)]
pub struct PasswordValidationResult {
    pub is_valid: bool,
    pub errors: Vec<&'static str>,
}

impl PasswordValidationResult {
    pub fn error_message(&self) -> String {
        self.errors.join("; ")
    }
}

/// 验证密码是否符合安全策略
///
/// 策略要求：
/// - 最小长度：8 字符
/// - 必须包含：大写字母 + 小写字母 + 数字
/// - 可选：特殊字符（增强安全性）
pub fn validate_password(password: &str) -> PasswordValidationResult {
    let mut errors = Vec::new();

    // 1. 长度检查：至少 8 个字符
    if password.len() < 8 {
        errors.push("Password must be at least 8 characters long");
    }

    // 2. 大写字母检查
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain at least one uppercase letter");
    }

    // 3. 小写字母检查
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain at least one lowercase letter");
    }

    // 4. 数字检查
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one digit");
    }

    // 5. 常见弱密码检查
    let weak_passwords = [
        "password",
        "12345678",
        "123456789",
        "qwerty123",
        "admin123",
        "password1",
        "Password1",
        "Qwerty123",
        "Abcd1234",
    ];
    if weak_passwords
        .iter()
        .any(|&weak| password.eq_ignore_ascii_case(weak))
    {
        errors.push("Password is too common, please choose a stronger password");
    }

    PasswordValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// 简化的密码验证（返回 Result）
pub fn validate_password_simple(password: &str) -> Result<(), String> {
    let result = validate_password(password);
    if result.is_valid {
        Ok(())
    } else {
        Err(result.error_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_password() {
        assert!(validate_password("SecureP@ss1").is_valid);
        assert!(validate_password("MyP@ssw0rd").is_valid);
        assert!(validate_password("SecurePass123").is_valid);
    }

    #[test]
    fn test_short_password() {
        let result = validate_password("Ab1");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password must be at least 8 characters long")
        );
    }

    #[test]
    fn test_no_uppercase() {
        let result = validate_password("abcd1234");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password must contain at least one uppercase letter")
        );
    }

    #[test]
    fn test_no_lowercase() {
        let result = validate_password("ABCD1234");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password must contain at least one lowercase letter")
        );
    }

    #[test]
    fn test_no_digit() {
        let result = validate_password("AbcdEfgh");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password must contain at least one digit")
        );
    }

    #[test]
    fn test_common_password() {
        let result = validate_password("Password1");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password is too common, please choose a stronger password")
        );
    }

    #[test]
    fn test_suffix_rules() {
        assert!(validate_suffix("lycee-moderne.sn").is_ok());
        assert!(validate_suffix("ab").is_ok());
        assert!(validate_suffix("a").is_err());
        assert!(validate_suffix("Lycee.sn").is_err());
        assert!(validate_suffix("-lycee.sn").is_err());
        assert!(validate_suffix("lycee.sn.").is_err());
        assert!(validate_suffix("lycee_sn").is_err());
        assert!(validate_suffix(&"a".repeat(64)).is_err());
    }

    #[test]
    fn test_academic_year() {
        assert!(validate_academic_year("2025-2026").is_ok());
        assert!(validate_academic_year("2025-2027").is_err());
        assert!(validate_academic_year("2025/2026").is_err());
    }

    #[test]
    fn test_time_range() {
        assert!(validate_time_range("08:00", "09:30").is_ok());
        assert!(validate_time_range("09:30", "09:30").is_err());
        assert!(validate_time_range("10:00", "09:00").is_err());
        assert!(validate_time("24:00").is_err());
        assert!(validate_time("8:00").is_err());
    }

    #[test]
    fn test_date_and_ranges() {
        assert!(validate_date("2026-02-28").is_ok());
        assert!(validate_date("2026-02-30").is_err());
        assert!(validate_term(3).is_ok());
        assert!(validate_term(4).is_err());
        assert!(validate_weekday(7).is_ok());
        assert!(validate_weekday(0).is_err());
        assert!(validate_name("  ").is_err());
        assert!(validate_email("admin@lycee.sn").is_ok());
        assert!(validate_email("admin").is_err());
    }
}
