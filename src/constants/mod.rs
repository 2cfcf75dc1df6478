use std::str::FromStr;

pub struct Env {
    pub database_url: String,
    pub redis_url: String,
    pub ip: String,
    pub port: u16,
    pub upload_dir: String,
    pub max_upload_size: usize,
    pub email_host: String,
    pub email_port: u16,
    pub email_host_user: String,
    pub email_host_password: String,
    pub email_use_tls: bool,
    pub queue_name: String,
    pub worker_concurrency: usize,
    pub job_max_retries: u32,
    pub report_interval_secs: u64,
}

fn var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Env {
    fn new() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set in .env file or environment variable");
        let redis_url = std::env::var("REDIS_URL")
            .expect("REDIS_URL must be set in .env file or environment variable");

        let ip = var_or("IP", "127.0.0.1");
        let port = var_or("PORT", "8080").parse::<u16>().expect("PORT must be a valid u16 integer");

        let upload_dir = var_or("UPLOAD_DIR", "./media/uploads");
        let max_upload_size = var_or("MAX_UPLOAD_SIZE", "10485760")
            .parse::<usize>()
            .expect("MAX_UPLOAD_SIZE must be a valid usize integer");

        let email_host = var_or("EMAIL_HOST", "localhost");
        let email_port = var_or("EMAIL_PORT", "25")
            .parse::<u16>()
            .expect("EMAIL_PORT must be a valid u16 integer");
        let email_host_user = var_or("EMAIL_HOST_USER", "");
        let email_host_password = var_or("EMAIL_HOST_PASSWORD", "");
        let email_use_tls = var_or("EMAIL_USE_TLS", "false")
            .parse::<bool>()
            .expect("EMAIL_USE_TLS must be true or false");

        let queue_name = var_or("QUEUE_NAME", "file_uploader:jobs");
        let worker_concurrency = var_or("WORKER_CONCURRENCY", "4")
            .parse::<usize>()
            .expect("WORKER_CONCURRENCY must be a valid usize integer");
        let job_max_retries = var_or("JOB_MAX_RETRIES", "0")
            .parse::<u32>()
            .expect("JOB_MAX_RETRIES must be a valid u32 integer");
        let report_interval_secs = var_or("REPORT_INTERVAL_SECS", "86400")
            .parse::<u64>()
            .expect("REPORT_INTERVAL_SECS must be a valid u64 integer");

        Env {
            database_url,
            redis_url,
            ip,
            port,
            upload_dir,
            max_upload_size,
            email_host,
            email_port,
            email_host_user,
            email_host_password,
            email_use_tls,
            queue_name,
            worker_concurrency,
            job_max_retries,
            report_interval_secs,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

/// Which parts of the application this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Web,
    Worker,
    Beat,
    All,
}

impl Role {
    pub fn runs_web(self) -> bool {
        matches!(self, Role::Web | Role::All)
    }

    pub fn runs_worker(self) -> bool {
        matches!(self, Role::Worker | Role::All)
    }

    pub fn runs_beat(self) -> bool {
        matches!(self, Role::Beat | Role::All)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "web" => Ok(Role::Web),
            "worker" => Ok(Role::Worker),
            "beat" => Ok(Role::Beat),
            "all" => Ok(Role::All),
            other => Err(format!("unknown role '{other}', expected web, worker, beat or all")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_roles_case_insensitively() {
        assert_eq!("Worker".parse::<Role>(), Ok(Role::Worker));
        assert_eq!("beat".parse::<Role>(), Ok(Role::Beat));
        assert!("scheduler".parse::<Role>().is_err());
    }

    #[test]
    fn all_role_runs_everything() {
        assert!(Role::All.runs_web() && Role::All.runs_worker() && Role::All.runs_beat());
        assert!(!Role::Web.runs_worker());
        assert!(!Role::Worker.runs_beat());
    }
}
