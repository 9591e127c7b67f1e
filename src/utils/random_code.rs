use rand::Rng;
use rand::distr::Alphanumeric;

/// 生成指定长度的随机字母数字串
pub fn generate_random_code(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// 生成初始密码：保证大小写字母和数字各至少一个
pub fn generate_initial_password(length: usize) -> String {
    let length = length.max(8);
    loop {
        let candidate = generate_random_code(length);
        if candidate.chars().any(|c| c.is_ascii_uppercase())
            && candidate.chars().any(|c| c.is_ascii_lowercase())
            && candidate.chars().any(|c| c.is_ascii_digit())
        {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validate::validate_password;

    #[test]
    fn test_random_code_length() {
        assert_eq!(generate_random_code(12).len(), 12);
        assert!(generate_random_code(32).chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_initial_password_meets_policy() {
        for _ in 0..20 {
            let password = generate_initial_password(12);
            assert_eq!(password.len(), 12);
            assert!(validate_password(&password).is_valid);
        }
    }
}
