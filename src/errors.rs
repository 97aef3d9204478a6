use actix_web::http::StatusCode;
use std::fmt;

#[derive(Debug, Clone)]
pub enum LinkfolioError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Validation(String),
    NotFound(String),
    SlugConflict(String),
    PlanRequired(String),
    Unauthorized(String),
    Serialization(String),
    Config(String),
}

impl LinkfolioError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinkfolioError::DatabaseConfig(_) => "E001",
            LinkfolioError::DatabaseConnection(_) => "E002",
            LinkfolioError::DatabaseOperation(_) => "E003",
            LinkfolioError::Validation(_) => "E004",
            LinkfolioError::NotFound(_) => "E005",
            LinkfolioError::SlugConflict(_) => "E006",
            LinkfolioError::PlanRequired(_) => "E007",
            LinkfolioError::Unauthorized(_) => "E008",
            LinkfolioError::Serialization(_) => "E009",
            LinkfolioError::Config(_) => "E010",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinkfolioError::DatabaseConfig(_) => "Database Configuration Error",
            LinkfolioError::DatabaseConnection(_) => "Database Connection Error",
            LinkfolioError::DatabaseOperation(_) => "Database Operation Error",
            LinkfolioError::Validation(_) => "Validation Error",
            LinkfolioError::NotFound(_) => "Resource Not Found",
            LinkfolioError::SlugConflict(_) => "Slug Already Taken",
            LinkfolioError::PlanRequired(_) => "Plan Upgrade Required",
            LinkfolioError::Unauthorized(_) => "Unauthorized",
            LinkfolioError::Serialization(_) => "Serialization Error",
            LinkfolioError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinkfolioError::DatabaseConfig(msg) => msg,
            LinkfolioError::DatabaseConnection(msg) => msg,
            LinkfolioError::DatabaseOperation(msg) => msg,
            LinkfolioError::Validation(msg) => msg,
            LinkfolioError::NotFound(msg) => msg,
            LinkfolioError::SlugConflict(msg) => msg,
            LinkfolioError::PlanRequired(msg) => msg,
            LinkfolioError::Unauthorized(msg) => msg,
            LinkfolioError::Serialization(msg) => msg,
            LinkfolioError::Config(msg) => msg,
        }
    }

    /// 映射到 HTTP 状态码
    ///
    /// 计划等级错误单独映射为 402，前端据此展示升级提示而非通用错误。
    pub fn http_status(&self) -> StatusCode {
        match self {
            LinkfolioError::Validation(_) => StatusCode::BAD_REQUEST,
            LinkfolioError::NotFound(_) => StatusCode::NOT_FOUND,
            LinkfolioError::SlugConflict(_) => StatusCode::CONFLICT,
            LinkfolioError::PlanRequired(_) => StatusCode::PAYMENT_REQUIRED,
            LinkfolioError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinkfolioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkfolioError {}

// 便捷的构造函数
impl LinkfolioError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        LinkfolioError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        LinkfolioError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        LinkfolioError::DatabaseOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinkfolioError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkfolioError::NotFound(msg.into())
    }

    pub fn slug_conflict<T: Into<String>>(msg: T) -> Self {
        LinkfolioError::SlugConflict(msg.into())
    }

    pub fn plan_required<T: Into<String>>(msg: T) -> Self {
        LinkfolioError::PlanRequired(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        LinkfolioError::Unauthorized(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinkfolioError::Serialization(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        LinkfolioError::Config(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for LinkfolioError {
    fn from(err: sea_orm::DbErr) -> Self {
        LinkfolioError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for LinkfolioError {
    fn from(err: std::io::Error) -> Self {
        LinkfolioError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for LinkfolioError {
    fn from(err: serde_json::Error) -> Self {
        LinkfolioError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinkfolioError>;
