//! 流量来源推导
//!
//! 从 query string 和 Referer header 推导事件来源标签：
//! 1. utm_source 参数优先
//! 2. 有 Referer → ref:{domain}
//! 3. 都没有 → direct

use std::borrow::Cow;

/// 从原始请求数据推导流量来源
pub fn derive_source(query: Option<&str>, referrer: Option<&str>) -> String {
    // 1. 检查 utm_source 参数
    if let Some(query) = query
        && let Some(utm_source) = extract_query_param(query, "utm_source")
        && !utm_source.is_empty()
    {
        return utm_source.into_owned();
    }

    // 2. 有 Referer header → ref:{domain}
    if let Some(referer_url) = referrer
        && let Some(domain) = extract_domain(referer_url)
        && !domain.is_empty()
    {
        return format!("ref:{}", domain);
    }

    // 3. 都没有 → direct
    "direct".to_string()
}

/// 从 query string 提取指定参数值
pub fn extract_query_param<'a>(query: &'a str, key: &str) -> Option<Cow<'a, str>> {
    for part in query.split('&') {
        if let Some(value) = part.strip_prefix(key).and_then(|s| s.strip_prefix('=')) {
            // urlencoding::decode 返回 Cow，未编码时零分配
            return urlencoding::decode(value).ok();
        }
    }
    None
}

/// 从 URL 提取域名
pub fn extract_domain(url: &str) -> Option<&str> {
    // 简单解析：找 :// 后的域名部分
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);

    // 取到第一个 / 或 : 或 ? 或 # 为止
    without_scheme
        .split(&['/', ':', '?', '#'][..])
        .next()
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utm_source_wins() {
        let source = derive_source(
            Some("utm_source=newsletter&utm_medium=email"),
            Some("https://t.co/abc"),
        );
        assert_eq!(source, "newsletter");
    }

    #[test]
    fn test_utm_source_url_decoded() {
        let source = derive_source(Some("utm_source=my%20campaign"), None);
        assert_eq!(source, "my campaign");
    }

    #[test]
    fn test_referrer_domain() {
        let source = derive_source(None, Some("https://instagram.com/some/profile"));
        assert_eq!(source, "ref:instagram.com");

        let source = derive_source(Some("foo=bar"), Some("http://t.co:443/x"));
        assert_eq!(source, "ref:t.co");
    }

    #[test]
    fn test_direct_fallback() {
        assert_eq!(derive_source(None, None), "direct");
        assert_eq!(derive_source(Some(""), Some("")), "direct");
    }
}
