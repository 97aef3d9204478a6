//! 核心领域模型
//!
//! Block 的配置用 sum type 表示：每种块类型一个强类型变体，
//! 未识别类型落入 Other 变体（空配置）。数据库中按
//! (block_type, config JSON) 两列存储，出入口统一走
//! `BlockConfig::from_parts` / `config_value`。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strum::{Display, EnumIter, EnumString};

use crate::errors::{LinkfolioError, Result};

/// 订阅等级
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PlanTier {
    #[default]
    Free,
    Pro,
}

/// 追踪事件类型（固定集合，集合外一律拒绝）
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventType {
    View,
    Click,
    Purchase,
    Submit,
    Download,
}

/// 块类型判别符
///
/// 未识别的类型保留原始字符串，渲染端按空配置处理。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Link,
    Button,
    Image,
    Text,
    SocialBlock,
    LinksBlock,
    ContactBlock,
    Other(String),
}

impl BlockKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Link => "link",
            Self::Button => "button",
            Self::Image => "image",
            Self::Text => "text",
            Self::SocialBlock => "social_block",
            Self::LinksBlock => "links_block",
            Self::ContactBlock => "contact_block",
            Self::Other(s) => s,
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BlockKind {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "link" => Self::Link,
            "button" => Self::Button,
            "image" => Self::Image,
            "text" => Self::Text,
            "social_block" => Self::SocialBlock,
            "links_block" => Self::LinksBlock,
            "contact_block" => Self::ContactBlock,
            other => Self::Other(other.to_string()),
        })
    }
}

// ============================================================
// 各块类型的配置载荷
// ============================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonConfig {
    pub label: String,
    pub url: String,
    pub style: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageConfig {
    pub src: String,
    pub alt: String,
    pub width: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextConfig {
    pub content: String,
    pub align: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialEntry {
    pub provider: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialBlockConfig {
    pub socials: Vec<SocialEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinksBlockConfig {
    pub links: Vec<LinkEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactBlockConfig {
    pub phone: String,
    pub whatsapp_prefilled: String,
}

/// 块配置 sum type
#[derive(Debug, Clone, PartialEq)]
pub enum BlockConfig {
    Link(LinkConfig),
    Button(ButtonConfig),
    Image(ImageConfig),
    Text(TextConfig),
    SocialBlock(SocialBlockConfig),
    LinksBlock(LinksBlockConfig),
    ContactBlock(ContactBlockConfig),
    /// 未识别的类型：保留类型名和原始 JSON
    Other { kind: String, config: Value },
}

impl BlockConfig {
    /// 各类型的默认配置
    pub fn default_for(kind: &BlockKind) -> Self {
        match kind {
            BlockKind::Link => Self::Link(LinkConfig {
                label: "New Link".to_string(),
                url: "https://example.com".to_string(),
            }),
            BlockKind::Button => Self::Button(ButtonConfig {
                label: "Click Me".to_string(),
                url: "https://example.com".to_string(),
                style: "primary".to_string(),
            }),
            BlockKind::Image => Self::Image(ImageConfig {
                src: String::new(),
                alt: "Image".to_string(),
                width: "100%".to_string(),
            }),
            BlockKind::Text => Self::Text(TextConfig {
                content: "Your text here".to_string(),
                align: "center".to_string(),
            }),
            BlockKind::SocialBlock => Self::SocialBlock(SocialBlockConfig {
                socials: vec![SocialEntry {
                    provider: "instagram".to_string(),
                    url: String::new(),
                }],
            }),
            BlockKind::LinksBlock => Self::LinksBlock(LinksBlockConfig {
                links: vec![LinkEntry {
                    label: "New Link".to_string(),
                    url: String::new(),
                }],
            }),
            BlockKind::ContactBlock => Self::ContactBlock(ContactBlockConfig {
                phone: String::new(),
                whatsapp_prefilled: String::new(),
            }),
            BlockKind::Other(name) => Self::Other {
                kind: name.clone(),
                config: json!({}),
            },
        }
    }

    /// 从 (类型判别符, JSON 载荷) 还原，载荷与类型不匹配时返回校验错误
    pub fn from_parts(kind_str: &str, config: Value) -> Result<Self> {
        let kind: BlockKind = kind_str.parse().unwrap_or(BlockKind::Other(String::new()));

        let mismatch = |e: serde_json::Error| {
            LinkfolioError::validation(format!(
                "Config does not match block type '{}': {}",
                kind_str, e
            ))
        };

        Ok(match kind {
            BlockKind::Link => Self::Link(serde_json::from_value(config).map_err(mismatch)?),
            BlockKind::Button => Self::Button(serde_json::from_value(config).map_err(mismatch)?),
            BlockKind::Image => Self::Image(serde_json::from_value(config).map_err(mismatch)?),
            BlockKind::Text => Self::Text(serde_json::from_value(config).map_err(mismatch)?),
            BlockKind::SocialBlock => {
                Self::SocialBlock(serde_json::from_value(config).map_err(mismatch)?)
            }
            BlockKind::LinksBlock => {
                Self::LinksBlock(serde_json::from_value(config).map_err(mismatch)?)
            }
            BlockKind::ContactBlock => {
                Self::ContactBlock(serde_json::from_value(config).map_err(mismatch)?)
            }
            BlockKind::Other(_) => Self::Other {
                kind: kind_str.to_string(),
                config,
            },
        })
    }

    /// 对应的类型判别符
    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Link(_) => BlockKind::Link,
            Self::Button(_) => BlockKind::Button,
            Self::Image(_) => BlockKind::Image,
            Self::Text(_) => BlockKind::Text,
            Self::SocialBlock(_) => BlockKind::SocialBlock,
            Self::LinksBlock(_) => BlockKind::LinksBlock,
            Self::ContactBlock(_) => BlockKind::ContactBlock,
            Self::Other { kind, .. } => BlockKind::Other(kind.clone()),
        }
    }

    /// 序列化为 JSON 载荷（不含类型判别符）
    pub fn config_value(&self) -> Result<Value> {
        let value = match self {
            Self::Link(c) => serde_json::to_value(c)?,
            Self::Button(c) => serde_json::to_value(c)?,
            Self::Image(c) => serde_json::to_value(c)?,
            Self::Text(c) => serde_json::to_value(c)?,
            Self::SocialBlock(c) => serde_json::to_value(c)?,
            Self::LinksBlock(c) => serde_json::to_value(c)?,
            Self::ContactBlock(c) => serde_json::to_value(c)?,
            Self::Other { config, .. } => config.clone(),
        };
        Ok(value)
    }

    /// 校验配置内容
    ///
    /// 带 URL 的字段允许为空（编辑中的占位），非空时必须是 http(s) URL。
    pub fn validate(&self) -> Result<()> {
        use crate::utils::validate_http_url;

        match self {
            Self::Link(c) => validate_http_url(&c.url),
            Self::Button(c) => validate_http_url(&c.url),
            Self::Image(_) | Self::Text(_) | Self::ContactBlock(_) | Self::Other { .. } => Ok(()),
            Self::SocialBlock(c) => c
                .socials
                .iter()
                .try_for_each(|entry| validate_http_url(&entry.url)),
            Self::LinksBlock(c) => c
                .links
                .iter()
                .try_for_each(|entry| validate_http_url(&entry.url)),
        }
    }
}

// ============================================================
// 实体模型
// ============================================================

#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub plan_tier: PlanTier,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Page {
    pub id: i64,
    pub account_id: i64,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_published: bool,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub id: i64,
    pub page_id: i64,
    /// 页内顺序，平局按 id（创建顺序）决出
    pub position: i32,
    pub config: BlockConfig,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Block {
    pub fn kind(&self) -> BlockKind {
        self.config.kind()
    }
}

/// 新建页面载荷
#[derive(Debug, Clone)]
pub struct PageDraft {
    pub account_id: i64,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
}

/// 页面部分更新载荷：None 表示该字段不变
#[derive(Debug, Clone, Default)]
pub struct PageUpdate {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
}

impl PageUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.slug.is_none() && self.description.is_none()
    }
}

/// 新建块载荷（position 由调用方按现有块计算）
#[derive(Debug, Clone)]
pub struct BlockDraft {
    pub page_id: i64,
    pub position: i32,
    pub config: BlockConfig,
    pub is_visible: bool,
}

/// 已存储的追踪事件
#[derive(Debug, Clone)]
pub struct AnalyticsEvent {
    pub id: i64,
    pub page_id: Option<i64>,
    pub block_id: Option<i64>,
    pub shortlink_id: Option<String>,
    pub event_type: EventType,
    pub ip_address: Option<String>,
    pub referrer: Option<String>,
    pub source: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub device_type: Option<String>,
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_kind_roundtrip() {
        for name in [
            "link",
            "button",
            "image",
            "text",
            "social_block",
            "links_block",
            "contact_block",
        ] {
            let kind: BlockKind = name.parse().unwrap();
            assert_eq!(kind.to_string(), name);
        }

        let kind: BlockKind = "countdown".parse().unwrap();
        assert_eq!(kind, BlockKind::Other("countdown".to_string()));
        assert_eq!(kind.to_string(), "countdown");
    }

    #[test]
    fn test_default_config_link() {
        let config = BlockConfig::default_for(&BlockKind::Link);
        assert_eq!(
            config,
            BlockConfig::Link(LinkConfig {
                label: "New Link".to_string(),
                url: "https://example.com".to_string(),
            })
        );
    }

    #[test]
    fn test_default_config_table() {
        // 每种类型的默认配置逐字段核对
        match BlockConfig::default_for(&BlockKind::Button) {
            BlockConfig::Button(c) => {
                assert_eq!(c.label, "Click Me");
                assert_eq!(c.url, "https://example.com");
                assert_eq!(c.style, "primary");
            }
            other => panic!("unexpected config: {:?}", other),
        }

        match BlockConfig::default_for(&BlockKind::Image) {
            BlockConfig::Image(c) => {
                assert_eq!(c.src, "");
                assert_eq!(c.alt, "Image");
                assert_eq!(c.width, "100%");
            }
            other => panic!("unexpected config: {:?}", other),
        }

        match BlockConfig::default_for(&BlockKind::Text) {
            BlockConfig::Text(c) => {
                assert_eq!(c.content, "Your text here");
                assert_eq!(c.align, "center");
            }
            other => panic!("unexpected config: {:?}", other),
        }

        match BlockConfig::default_for(&BlockKind::SocialBlock) {
            BlockConfig::SocialBlock(c) => {
                assert_eq!(c.socials.len(), 1);
                assert_eq!(c.socials[0].provider, "instagram");
                assert_eq!(c.socials[0].url, "");
            }
            other => panic!("unexpected config: {:?}", other),
        }

        match BlockConfig::default_for(&BlockKind::LinksBlock) {
            BlockConfig::LinksBlock(c) => {
                assert_eq!(c.links.len(), 1);
                assert_eq!(c.links[0].label, "New Link");
                assert_eq!(c.links[0].url, "");
            }
            other => panic!("unexpected config: {:?}", other),
        }

        match BlockConfig::default_for(&BlockKind::ContactBlock) {
            BlockConfig::ContactBlock(c) => {
                assert_eq!(c.phone, "");
                assert_eq!(c.whatsapp_prefilled, "");
            }
            other => panic!("unexpected config: {:?}", other),
        }
    }

    #[test]
    fn test_default_config_unrecognized_is_empty() {
        let config = BlockConfig::default_for(&BlockKind::Other("countdown".to_string()));
        match config {
            BlockConfig::Other { kind, config } => {
                assert_eq!(kind, "countdown");
                assert_eq!(config, json!({}));
            }
            other => panic!("unexpected config: {:?}", other),
        }
    }

    #[test]
    fn test_from_parts_roundtrip() {
        let original = BlockConfig::default_for(&BlockKind::SocialBlock);
        let value = original.config_value().unwrap();
        let restored = BlockConfig::from_parts("social_block", value).unwrap();
        assert_eq!(original, restored);
    }

    #[test]
    fn test_from_parts_mismatch_rejected() {
        // text 配置喂给 link 类型
        let result = BlockConfig::from_parts("link", json!({"content": "hi", "align": "left"}));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, LinkfolioError::Validation(_)));
    }

    #[test]
    fn test_event_type_parse() {
        assert_eq!("view".parse::<EventType>().unwrap(), EventType::View);
        assert_eq!("click".parse::<EventType>().unwrap(), EventType::Click);
        assert_eq!(
            "purchase".parse::<EventType>().unwrap(),
            EventType::Purchase
        );
        assert_eq!("submit".parse::<EventType>().unwrap(), EventType::Submit);
        assert_eq!(
            "download".parse::<EventType>().unwrap(),
            EventType::Download
        );
        assert!("hover".parse::<EventType>().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = BlockConfig::Link(LinkConfig {
            label: "x".to_string(),
            url: "javascript:alert(1)".to_string(),
        });
        assert!(config.validate().is_err());

        // 空 URL 是合法的编辑中状态
        let config = BlockConfig::LinksBlock(LinksBlockConfig {
            links: vec![LinkEntry {
                label: "x".to_string(),
                url: String::new(),
            }],
        });
        assert!(config.validate().is_ok());
    }
}
