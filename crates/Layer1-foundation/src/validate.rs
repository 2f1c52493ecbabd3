//! Validate - 인자 검증 헬퍼
//!
//! 레지스트리에 들어오는 문자열 인자(키, 타입 이름)를 mutation 이전에 검사합니다.
//! 실패 시 항상 [`Error::InvalidArgument`]를 반환합니다.
//!
//! ```ignore
//! use custodian_foundation::validate::TextRule;
//!
//! TextRule::new("key", key).not_blank().max_length(256).check()?;
//! ```

use crate::{Error, Result};

/// 문자열 검증 규칙 빌더
#[derive(Debug, Clone)]
pub struct TextRule<'a> {
    field: &'a str,
    value: &'a str,
    not_blank: bool,
    max_length: Option<usize>,
}

impl<'a> TextRule<'a> {
    /// 새 규칙 생성 (검사 항목 없음)
    pub fn new(field: &'a str, value: &'a str) -> Self {
        Self {
            field,
            value,
            not_blank: false,
            max_length: None,
        }
    }

    /// 공백 제거 후 비어있으면 실패
    pub fn not_blank(mut self) -> Self {
        self.not_blank = true;
        self
    }

    /// 문자 수가 `max`를 넘으면 실패
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// 규칙 검사
    pub fn check(&self) -> Result<()> {
        if self.not_blank && self.value.trim().is_empty() {
            return Err(Error::InvalidArgument(format!(
                "'{}' must not be empty or blank",
                self.field
            )));
        }

        if let Some(max) = self.max_length {
            let len = self.value.chars().count();
            if len > max {
                return Err(Error::InvalidArgument(format!(
                    "'{}' is {} characters long, the maximum is {}",
                    self.field, len, max
                )));
            }
        }

        Ok(())
    }
}

/// 비어있지 않고 길이 제한 안인 텍스트 요구 (가장 흔한 조합)
pub fn require_text(field: &str, value: &str, max_length: usize) -> Result<()> {
    TextRule::new(field, value)
        .not_blank()
        .max_length(max_length)
        .check()
}
