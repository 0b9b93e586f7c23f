use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

// 班级编号：字母、数字、连字符与空格
static SECTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 -]{0,31}$").expect("Invalid section regex"));

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if !EMAIL_RE.is_match(email.trim()) {
        return Err("Email format is invalid");
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), &'static str> {
    let len = name.trim().chars().count();
    if len == 0 {
        return Err("Name cannot be empty");
    }
    if len > 64 {
        return Err("Name must be at most 64 characters");
    }
    Ok(())
}

pub fn validate_section(section: &str) -> Result<(), &'static str> {
    if !SECTION_RE.is_match(section.trim()) {
        return Err("Section must be 1-32 letters, digits, spaces or hyphens");
    }
    Ok(())
}

pub fn validate_form_title(title: &str) -> Result<(), &'static str> {
    let len = title.trim().chars().count();
    if len == 0 {
        return Err("Form title cannot be empty");
    }
    if len > 128 {
        return Err("Form title must be at most 128 characters");
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
/// 至少 8 个字符，且同时包含字母与数字。
pub fn validate_password(password: &str) -> PasswordValidationResult {
    let mut errors = Vec::new();

    if password.chars().count() < 8 {
        errors.push("Password must be at least 8 characters long");
    }

    if !password.chars().any(|c| c.is_alphabetic()) {
        errors.push("Password must contain at least one letter");
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one digit");
    }

    let weak_passwords = ["password1", "12345678a", "qwerty123", "letmein1", "abcd1234"];
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
