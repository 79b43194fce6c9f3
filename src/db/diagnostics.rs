//! Connectivity check used when troubleshooting a deployment.
//!
//! Runs on a dedicated connection so a wedged pool does not hide the result.

use serde::Serialize;
use sqlx::{AnyConnection, Connection, Row};

use crate::config::DatabaseConfig;

/// Outcome of one sub-check.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<i64>,
    /// SQLSTATE or driver error category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl CheckResult {
    fn success(table: Option<&str>, total_rows: Option<i64>) -> Self {
        Self {
            status: CheckStatus::Success,
            table: table.map(str::to_string),
            total_rows,
            code: None,
        }
    }

    fn failure(table: Option<&str>, code: String) -> Self {
        Self {
            status: CheckStatus::Error,
            table: table.map(str::to_string),
            total_rows: None,
            code: Some(code),
        }
    }
}

/// Which settings were present; the password is masked.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSummary {
    pub host: Option<String>,
    pub user: Option<String>,
    pub password: Option<&'static str>,
    pub database: Option<String>,
    pub port: u16,
    pub url_override: bool,
}

impl From<&DatabaseConfig> for EnvironmentSummary {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            host: config.host.clone(),
            user: config.user.clone(),
            password: config.password.as_ref().map(|_| "***"),
            database: config.name.clone(),
            port: config.port,
            url_override: config.url.is_some(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsReport {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
    pub environment: EnvironmentSummary,
    pub connection_test: CheckResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goleiros_test: Option<CheckResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partidas_test: Option<CheckResult>,
    pub errors: Vec<String>,
}

/// Open a fresh connection, count both tables, and close it again.
///
/// `success` reflects only whether the connection could be opened; failed
/// table checks are listed in `errors`.
pub async fn run_diagnostics(config: &DatabaseConfig) -> DiagnosticsReport {
    let mut report = DiagnosticsReport {
        success: false,
        message: "Database connection failed".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        environment: EnvironmentSummary::from(config),
        connection_test: CheckResult::failure(None, "NOT_RUN".to_string()),
        goleiros_test: None,
        partidas_test: None,
        errors: Vec::new(),
    };

    let url = match config.connection_url() {
        Ok(url) => url,
        Err(e) => {
            tracing::error!("Diagnostics: {}", e);
            report.connection_test = CheckResult::failure(None, "CONFIGURATION".to_string());
            report.errors.push("connection: CONFIGURATION".to_string());
            return report;
        }
    };

    sqlx::any::install_default_drivers();
    let mut conn = match AnyConnection::connect(&url).await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!("Diagnostics: connection failed: {}", e);
            let code = driver_error_code(&e);
            report.errors.push(format!("connection: {}", code));
            report.connection_test = CheckResult::failure(None, code);
            return report;
        }
    };

    tracing::info!("Diagnostics: connection established");
    report.success = true;
    report.message = "Database connection test completed".to_string();
    report.connection_test = CheckResult::success(None, None);

    let goleiros = count_rows(&mut conn, "goleiros").await;
    let partidas = count_rows(&mut conn, "partidas").await;
    for check in [&goleiros, &partidas] {
        if let (Some(table), Some(code)) = (&check.table, &check.code) {
            report.errors.push(format!("{}: {}", table, code));
        }
    }
    report.goleiros_test = Some(goleiros);
    report.partidas_test = Some(partidas);

    if let Err(e) = conn.close().await {
        tracing::warn!("Diagnostics: failed to close connection: {}", e);
    }

    report
}

async fn count_rows(conn: &mut AnyConnection, table: &'static str) -> CheckResult {
    // table is one of two literals, never user input
    let statement = format!("SELECT COUNT(*) AS total FROM {}", table);
    let result = sqlx::query::<sqlx::Any>(&statement).fetch_one(&mut *conn).await;

    match result.and_then(|row| row.try_get::<i64, _>("total")) {
        Ok(total) => {
            tracing::info!(table, total, "Diagnostics: count succeeded");
            CheckResult::success(Some(table), Some(total))
        }
        Err(e) => {
            tracing::error!(table, "Diagnostics: count failed: {}", e);
            CheckResult::failure(Some(table), driver_error_code(&e))
        }
    }
}

/// Short, non-sensitive classification of a driver error.
pub fn driver_error_code(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db_err) => db_err
            .code()
            .map(|code| code.into_owned())
            .unwrap_or_else(|| "DATABASE".to_string()),
        sqlx::Error::Configuration(_) => "CONFIGURATION".to_string(),
        sqlx::Error::Io(_) => "IO".to_string(),
        sqlx::Error::Tls(_) => "TLS".to_string(),
        sqlx::Error::Protocol(_) => "PROTOCOL".to_string(),
        sqlx::Error::PoolTimedOut => "POOL_TIMED_OUT".to_string(),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => "DECODE".to_string(),
        _ => "DRIVER".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_summary_masks_password() {
        let config = DatabaseConfig {
            host: Some("db.example.com".to_string()),
            user: Some("anderson".to_string()),
            password: Some("secret".to_string()),
            name: Some("goleiros".to_string()),
            port: 3306,
            url: None,
        };

        let summary = EnvironmentSummary::from(&config);
        assert_eq!(summary.password, Some("***"));
        assert!(!summary.url_override);
        assert!(!serde_json::to_string(&summary).unwrap().contains("secret"));
    }

    #[test]
    fn test_driver_error_code_categories() {
        assert_eq!(driver_error_code(&sqlx::Error::PoolTimedOut), "POOL_TIMED_OUT");
        assert_eq!(driver_error_code(&sqlx::Error::RowNotFound), "DRIVER");
    }

    #[tokio::test]
    async fn test_unconfigured_database_reports_failure() {
        let report = run_diagnostics(&DatabaseConfig::default()).await;

        assert!(!report.success);
        assert_eq!(report.connection_test.status, CheckStatus::Error);
        assert_eq!(report.errors, vec!["connection: CONFIGURATION".to_string()]);
        assert!(report.goleiros_test.is_none());
        assert_eq!(report.environment.port, 3306);
    }
}
