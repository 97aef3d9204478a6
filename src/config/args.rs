//! 启动参数解析
//!
//! 命令行参数优先级高于配置文件和环境变量。

use clap::Parser;

use super::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "linkfolio", about = "Headless link-in-bio page service")]
pub struct Args {
    /// 配置文件路径
    #[arg(short, long, default_value = "linkfolio.toml")]
    pub config: String,

    /// 覆盖监听地址
    #[arg(long)]
    pub host: Option<String>,

    /// 覆盖监听端口
    #[arg(long)]
    pub port: Option<u16>,

    /// 覆盖数据库连接 URL
    #[arg(long)]
    pub database_url: Option<String>,

    /// 输出示例配置文件内容后退出
    #[arg(long)]
    pub print_sample_config: bool,
}

impl Args {
    /// 加载配置并应用命令行覆盖
    pub fn load_config(&self) -> AppConfig {
        let mut config = AppConfig::load(&self.config);

        if let Some(ref host) = self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(ref url) = self.database_url {
            config.database.database_url = url.clone();
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_overrides() {
        let args = Args::parse_from([
            "linkfolio",
            "--host",
            "0.0.0.0",
            "--port",
            "9090",
            "--database-url",
            "sqlite://test.db?mode=rwc",
        ]);
        let config = args.load_config();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.database_url, "sqlite://test.db?mode=rwc");
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["linkfolio"]);
        assert_eq!(args.config, "linkfolio.toml");
        assert!(!args.print_sample_config);
    }
}
