use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use clap::Parser;
use colored::Colorize;
use tracing::info;

use linkfolio::analytics::global::set_global_event_recorder;
use linkfolio::analytics::{EventRecorder, RetentionTask};
use linkfolio::api::middleware::OwnerAuth;
use linkfolio::api::services::admin::routes::admin_v1_routes;
use linkfolio::api::services::{
    AppStartTime, HealthService, PublicService, TrackService, track_rate_limiter,
};
use linkfolio::cache::PageCache;
use linkfolio::config::{Args, AppConfig, get_config, init_config_with};
use linkfolio::storage::StorageFactory;

/// 初始化 tracing 订阅器
///
/// 返回的 guard 必须持有到进程结束，否则文件日志会丢尾。
fn init_tracing(
    config: &linkfolio::config::LoggingConfig,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    match config.file {
        Some(ref path) => {
            let appender = tracing_appender::rolling::daily(".", path);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            if config.format == "json" {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(writer)
                    .with_ansi(false)
                    .json()
                    .init();
            } else {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(writer)
                    .with_ansi(false)
                    .init();
            }
            Some(guard)
        }
        None => {
            if config.format == "json" {
                tracing_subscriber::fmt().with_env_filter(filter).json().init();
            } else {
                tracing_subscriber::fmt().with_env_filter(filter).init();
            }
            None
        }
    }
}

/// 按配置构建 CORS 策略
fn build_cors(origins: &[String]) -> Cors {
    if origins.is_empty() {
        // 未配置来源时放开（本地开发场景）
        return Cors::permissive();
    }

    let mut cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600);
    for origin in origins {
        cors = cors.allowed_origin(origin);
    }
    cors
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    if args.print_sample_config {
        println!("{}", AppConfig::generate_sample_config());
        return Ok(());
    }

    init_config_with(args.load_config());
    let config = get_config();
    let _log_guard = init_tracing(&config.logging);

    // 记录程序启动时间
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    // 初始化存储后端
    let storage = match StorageFactory::create().await {
        Ok(storage) => storage,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            return Err(std::io::Error::other(e.to_string()));
        }
    };
    info!("Using storage backend: {}", storage.backend_name());

    // 事件记录器：缓冲 + 后台刷盘
    let recorder = Arc::new(EventRecorder::new(
        storage.as_event_sink(),
        storage.as_view_count_sink(),
        Duration::from_secs(config.analytics.flush_interval_secs),
        config.analytics.buffer_capacity,
    ));
    set_global_event_recorder(Arc::clone(&recorder));
    {
        let recorder = Arc::clone(&recorder);
        tokio::spawn(async move {
            recorder.start_background_task().await;
        });
    }

    // 事件保留策略清理任务
    Arc::new(RetentionTask::new(Arc::clone(&storage)))
        .spawn_background_task(config.analytics.cleanup_interval_hours);

    // 公开页缓存
    let cache = Arc::new(PageCache::new());

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    println!(
        "{} listening on {}",
        "linkfolio".green().bold(),
        bind_address.cyan()
    );
    info!("Starting server at http://{}", bind_address);

    let workers = config.server.cpu_count.max(1);

    HttpServer::new(move || {
        let cors = build_cors(&get_config().server.cors_origins);

        App::new()
            .app_data(web::Data::new(Arc::clone(&storage)))
            .app_data(web::Data::new(Arc::clone(&cache)))
            .app_data(web::Data::new(app_start_time.clone()))
            .service(
                web::scope("/api/admin")
                    .wrap(OwnerAuth)
                    .wrap(cors)
                    .service(admin_v1_routes()),
            )
            .service(
                web::scope("/api/track")
                    .wrap(track_rate_limiter())
                    .route("", web::post().to(TrackService::track_event)),
            )
            .route("/health", web::get().to(HealthService::health_check))
            .route("/p/{slug}", web::get().to(PublicService::get_public_page))
            .route("/p/{slug}", web::head().to(PublicService::get_public_page))
    })
    .workers(workers)
    .bind(bind_address)?
    .run()
    .await?;

    // 退出前把缓冲里的事件刷出去
    recorder.flush().await;

    Ok(())
}
