use clap::Parser;
use taskboard_cli::commands::{board, cli};
use taskboard_cli::http;
use taskboard_core::api::{AppConfig, CliError, LoggingConfig, TaskError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();
    let mut cfg =
        taskboard_core::api::load_default().map_err(|e| CliError::Config(format!("{e:#}")))?;
    init_tracing(&cfg.logging).map_err(CliError::Config)?;

    if let Some(url) = args.server_url.as_deref() {
        cfg.client.server_url = url.to_string();
    }

    dispatch(args.command, cfg).await
}

fn exit_code_for_error(e: &CliError) -> i32 {
    // 0: success
    // 11: config error
    // 20: transport / IO / server error
    // 30: task not found
    // 31: validation error
    // 50: internal/uncategorized
    match e {
        CliError::Config(_) => 11,
        CliError::Task(te) => match te {
            TaskError::Transport { .. } => 20,
            TaskError::NotFound(_) => 30,
            TaskError::Validation(_) => 31,
            TaskError::NotReady | TaskError::StoreClosed => 50,
        },
        CliError::Io(_) => 20,
        CliError::Server(_) => 20,
        CliError::Anyhow(_) => 50,
    }
}

async fn dispatch(cmd: cli::Commands, cfg: AppConfig) -> Result<i32, CliError> {
    let client = &cfg.client;
    let output = match cmd {
        cli::Commands::Serve(serve_args) => {
            http::handle_serve(serve_args, &cfg).await?;
            return Ok(0);
        }
        cli::Commands::List(list_args) => {
            board::handle_list(&board::connect(client).await?, &list_args)?
        }
        cli::Commands::Add(add_args) => {
            board::handle_add(&board::connect(client).await?, add_args).await?
        }
        cli::Commands::Edit(edit_args) => {
            board::handle_edit(&board::connect(client).await?, edit_args).await?
        }
        cli::Commands::Advance(id_args) => {
            board::handle_advance(&board::connect(client).await?, id_args.id).await?
        }
        cli::Commands::Delete(id_args) => {
            board::handle_delete(&board::connect(client).await?, id_args.id).await?
        }
    };

    println!("{output}");
    Ok(0)
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => std::env::temp_dir().join("taskboard"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("taskboard.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
