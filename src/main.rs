use actix_web::{self, middleware::Logger, web, App, HttpServer};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use crate::{
    configs::{connect_database, create_redis_pool},
    constants::Role,
    modules::{
        file_upload::{FilePgRepository, FileRepository, FileUploadService, UploadConfig},
        jobs::{JobQueue, RedisJobQueue, ReportScheduler, Worker, WorkerConfig},
        metadata::{MagicClassifier, MetadataExtractor},
        report::{mailer::parse_mailbox, MailConfig, ReportService, SmtpMailer},
    },
};

mod api;
mod configs;
mod constants;
mod modules;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/health")]
async fn health_check() -> &'static str {
    "Server is running"
}

fn upload_config() -> UploadConfig {
    UploadConfig { max_file_size: ENV.max_upload_size, upload_dir: ENV.upload_dir.clone().into() }
}

fn build_worker(
    file_repo: Arc<dyn FileRepository + Send + Sync>,
    queue: Arc<dyn JobQueue + Send + Sync>,
) -> std::io::Result<Worker> {
    parse_mailbox(&ENV.email_host_user).map_err(|e| {
        std::io::Error::other(format!("EMAIL_HOST_USER must be a valid report address: {e}"))
    })?;

    let mail_config = MailConfig {
        host: ENV.email_host.clone(),
        port: ENV.email_port,
        user: ENV.email_host_user.clone(),
        password: ENV.email_host_password.clone(),
        use_tls: ENV.email_use_tls,
    };
    let mailer = SmtpMailer::from_config(&mail_config)
        .map_err(|e| std::io::Error::other(format!("SMTP configuration error: {e}")))?;

    let extractor =
        MetadataExtractor::new(file_repo.clone(), Arc::new(MagicClassifier), ENV.upload_dir.clone());
    let reporter = ReportService::new(file_repo, Arc::new(mailer), ENV.email_host_user.clone());
    let config = WorkerConfig {
        concurrency: ENV.worker_concurrency,
        max_retries: ENV.job_max_retries,
        ..Default::default()
    };

    Ok(Worker::new(queue, Arc::new(extractor), Arc::new(reporter), config))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    LazyLock::force(&ENV);

    let role = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<Role>().map_err(std::io::Error::other)?,
        None => Role::All,
    };
    log::info!("Starting file_uploader as {:?}", role);

    let db_pool = connect_database(&ENV.database_url)
        .await
        .map_err(|e| std::io::Error::other(format!("Database connection error: {e}")))?;

    let redis_pool = create_redis_pool(&ENV.redis_url)
        .map_err(|e| std::io::Error::other(format!("Redis connection error: {e}")))?;

    let file_repo: Arc<dyn FileRepository + Send + Sync> = Arc::new(FilePgRepository::new(db_pool));
    let queue: Arc<dyn JobQueue + Send + Sync> =
        Arc::new(RedisJobQueue::new(redis_pool, ENV.queue_name.clone()));

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let mut background = Vec::new();

    if role.runs_worker() {
        let worker = build_worker(file_repo.clone(), queue.clone())?;
        background.push(tokio::spawn(worker.run(shutdown_rx.clone())));
    }

    if role.runs_beat() {
        let scheduler =
            ReportScheduler::new(queue.clone(), Duration::from_secs(ENV.report_interval_secs));
        background.push(tokio::spawn(scheduler.run(shutdown_rx.clone())));
    }

    if role.runs_web() {
        let upload_service = FileUploadService::new(file_repo, queue, upload_config());

        println!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::default())
                .app_data(web::Data::new(upload_service.clone()))
                .service(health_check)
                .configure(modules::file_upload::route::configure)
        })
        .bind((ENV.ip.as_str(), ENV.port))?
        .workers(2)
        .run()
        .await?;
    } else {
        tokio::signal::ctrl_c().await?;
    }

    log::info!("Shutting down background tasks");
    let _ = shutdown_tx.send(true);
    for handle in background {
        if let Err(e) = handle.await {
            log::error!("Background task failed: {}", e);
        }
    }
    Ok(())
}
