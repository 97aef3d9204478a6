pub mod device;
pub mod ip;
pub mod password;
pub mod source;
pub mod url_validator;

pub use device::parse_user_agent;
pub use ip::{extract_client_ip, is_private_or_local};
pub use password::{hash_password, verify_password};
pub use source::derive_source;
pub use url_validator::{UrlValidationError, validate_url};

use crate::errors::{LinkfolioError, Result};

/// 生成加密安全的随机 token（URL-safe base64）
pub fn generate_secure_token(num_bytes: usize) -> String {
    use base64::Engine;
    use rand::Rng;

    let mut bytes = vec![0u8; num_bytes];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// slug 合法性检查：小写字母、数字、连字符，1-64 字符
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= 64
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// 块配置里的 URL 校验：空值放行（编辑中的占位），非空必须是安全的 http(s) URL
pub fn validate_http_url(url: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Ok(());
    }

    validate_url(url).map_err(|e| LinkfolioError::validation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_secure_token_length_and_charset() {
        let token = generate_secure_token(32);
        // URL-safe base64 无填充
        assert!(!token.contains('='));
        assert!(!token.contains('+'));
        assert!(!token.contains('/'));
        assert!(token.len() >= 40);

        // 两次生成不应相同
        assert_ne!(token, generate_secure_token(32));
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("my-page"));
        assert!(is_valid_slug("abc123"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug("trailing-"));
        assert!(!is_valid_slug("UPPER"));
        assert!(!is_valid_slug("with space"));
        assert!(!is_valid_slug(&"a".repeat(65)));
    }

    #[test]
    fn test_validate_http_url_allows_empty() {
        assert!(validate_http_url("").is_ok());
        assert!(validate_http_url("   ").is_ok());
        assert!(validate_http_url("https://example.com").is_ok());
        assert!(validate_http_url("javascript:alert(1)").is_err());
    }
}
