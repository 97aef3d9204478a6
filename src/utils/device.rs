//! User-Agent 解析
//!
//! 使用 woothee 解析浏览器 / 操作系统 / 设备类别，
//! 解析不出的字段留空。

use woothee::parser::Parser;

/// 解析后的设备信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    pub browser: Option<String>,
    pub os: Option<String>,
    pub device_type: Option<String>,
}

/// 解析 User-Agent 字符串
pub fn parse_user_agent(ua_string: &str) -> DeviceInfo {
    if ua_string.trim().is_empty() {
        return DeviceInfo::default();
    }

    let parser = Parser::new();
    let result = parser.parse(ua_string).unwrap_or_default();

    DeviceInfo {
        browser: if result.name != "UNKNOWN" && !result.name.is_empty() {
            Some(result.name.to_string())
        } else {
            None
        },
        os: if result.os != "UNKNOWN" && !result.os.is_empty() {
            Some(result.os.to_string())
        } else {
            None
        },
        device_type: if result.category != "UNKNOWN" && !result.category.is_empty() {
            Some(result.category.to_string())
        } else {
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                             (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    #[test]
    fn test_parse_desktop_chrome() {
        let info = parse_user_agent(CHROME_UA);
        assert_eq!(info.browser.as_deref(), Some("Chrome"));
        assert!(info.os.is_some());
        assert_eq!(info.device_type.as_deref(), Some("pc"));
    }

    #[test]
    fn test_parse_empty_ua() {
        assert_eq!(parse_user_agent(""), DeviceInfo::default());
        assert_eq!(parse_user_agent("   "), DeviceInfo::default());
    }

    #[test]
    fn test_parse_garbage_ua() {
        let info = parse_user_agent("definitely-not-a-browser");
        assert!(info.browser.is_none());
    }
}
