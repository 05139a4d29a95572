//! ShiftSync - unattended schedule sync
//!
//! One invocation logs in to the scheduling portal, reads the rendered
//! schedule and publishes shifts missing from the calendar store. Runs are
//! expected to be triggered by an external scheduler.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use shiftsync_core::{BrowserSession, PipelineAdapters, StagingArea, SyncPipeline};
use shiftsync_domain::{Config, LogFormat, LoggingConfig, ShiftSyncError};
use shiftsync_infra::{
    config, connect_store, FsArtifactSink, FsStaging, TotpGenerator, WebDriverSession,
};
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Exit status for a run aborted by a fatal error.
const EXIT_FATAL: u8 = 1;

/// Exit status for unusable configuration.
const EXIT_CONFIG: u8 = 2;

/// Exit status for a run that stopped on an error classed as recoverable.
const EXIT_RECOVERABLE: u8 = 3;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Read before the config so SHIFTSYNC_* values from .env are visible.
    let dotenv = dotenvy::dotenv();

    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            report_startup_error(&err);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let _log_guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(err) => {
            report_startup_error(&err);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(err) if err.not_found() => debug!("No .env file found"),
        Err(err) => warn!(error = %err, "Could not load .env file"),
    }

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let chain = format!("{err:#}");
            let code = exit_code(&err);
            error!(error = %chain, exit_code = code, "Schedule sync failed");
            ExitCode::from(code)
        }
    }
}

/// Exit status for a failed run, from the innermost [`ShiftSyncError`].
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<ShiftSyncError>() {
        Some(ShiftSyncError::Config { .. }) => EXIT_CONFIG,
        Some(inner) if !inner.is_fatal() => EXIT_RECOVERABLE,
        _ => EXIT_FATAL,
    }
}

fn load_config() -> anyhow::Result<Config> {
    let config = config::load().context("loading configuration")?;
    config.validate().context("validating configuration")?;
    Ok(config)
}

/// Console output on stderr plus an optional plain-text log file.
///
/// The returned guard flushes the file writer when dropped.
fn init_logging(logging: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = logging.format == LogFormat::Json;
    let json_layer = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!json).then(|| fmt::layer().with_writer(std::io::stderr));

    let (file_layer, guard) = match &logging.file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("log file {} has no file name", path.display()))?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating log directory {}", dir.display()))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .with(file_layer)
        .try_init()
        .context("installing log subscriber")?;

    Ok(guard)
}

async fn run(config: &Config) -> anyhow::Result<()> {
    let codes = TotpGenerator::new(&config.portal.totp_secret, &config.portal.totp)
        .context("decoding one-time-code secret")?;
    let store = connect_store(&config.store).context("configuring calendar store")?;
    let staging = config.paths.staging_dir.as_ref().map(|dir| {
        info!(dir = %dir.display(), "Staging events on disk");
        Arc::new(FsStaging::new(dir)) as Arc<dyn StagingArea>
    });
    let artifacts = Arc::new(FsArtifactSink::from_config(&config.paths));

    let browser = Arc::new(
        WebDriverSession::connect(&config.webdriver)
            .await
            .context("starting browser session")?,
    );
    let adapters = PipelineAdapters {
        browser: browser.clone(),
        store,
        codes: Arc::new(codes),
        artifacts,
        staging,
    };

    let pipeline = match SyncPipeline::new(config, adapters) {
        Ok(pipeline) => pipeline,
        Err(err) => {
            if let Err(quit_err) = browser.quit().await {
                warn!(error = %quit_err, "Could not close browser session");
            }
            return Err(err).context("building sync pipeline");
        }
    };

    let report = pipeline.run().await.context("running sync pipeline")?;
    if report.failed > 0 {
        warn!(failed = report.failed, "Unpublished events will be retried on the next run");
    }
    Ok(())
}

#[allow(clippy::print_stderr)]
fn report_startup_error(err: &anyhow::Error) {
    eprintln!("shiftsync: {err:#}");
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    fn wrapped(err: ShiftSyncError) -> anyhow::Error {
        anyhow::Error::new(err).context("running sync pipeline")
    }

    #[test]
    fn fatal_run_errors_exit_with_failure() {
        let err = wrapped(ShiftSyncError::CalendarNotFound { name: "personal".into() });
        assert_eq!(exit_code(&err), EXIT_FATAL);
        assert_eq!(exit_code(&anyhow!("webdriver refused the session")), EXIT_FATAL);
    }

    #[test]
    fn late_config_errors_exit_as_config() {
        let err = wrapped(ShiftSyncError::config("unknown time zone Mars/Olympus"));
        assert_eq!(exit_code(&err), EXIT_CONFIG);
    }

    #[test]
    fn recoverable_errors_get_their_own_status() {
        let err = wrapped(ShiftSyncError::RedirectionTimeout {
            expected: "https://portal.test/schedule".into(),
            actual: "https://login.portal.test/".into(),
        });
        assert_eq!(exit_code(&err), EXIT_RECOVERABLE);
    }
}
