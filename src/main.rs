use catalog_stage::config::{self, BuildConfig};
use catalog_stage::pipeline::{self, RunError};
use catalog_stage::stage::StageOptions;
use catalog_stage::{compiler, output};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "catalog-stage")]
#[command(about = "Compile gettext catalogs and stage them for the runtime loader")]
#[command(long_about = "\
Compile gettext catalogs and stage them for the runtime loader

Every {locale}.po file in the source directory is compiled to a binary .mo
catalog and written into each enabled layout:

  po/
  ├── de.po
  └── nl.po
  data/locale/nl/LC_MESSAGES/
  ├── dev.example.app.mo           # local, release
  └── dev.example.app.develop.mo   # local, develop
  AppDir/share/locale/nl/LC_MESSAGES/
  └── dev.example.app.mo           # bundle, release

A broken catalog fails only its own outputs; every other locale is still
staged and the failures are listed at the end.

Ctrl-C stops scheduling new catalogs; those are reported as skipped.

Exit status: 0 when every catalog was staged, 1 when any failed or was
skipped, 2 for configuration errors.

Run 'catalog-stage gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Directory holding {locale}.po files
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Application identity, used as the catalog domain
    #[arg(long, global = true)]
    app_id: Option<String>,

    /// Root of the local-data layout
    #[arg(long, global = true)]
    local_root: Option<PathBuf>,

    /// Root of the bundle layout
    #[arg(long, global = true)]
    bundle_root: Option<PathBuf>,

    /// Compiler backend
    #[arg(long, value_enum, global = true)]
    compiler: Option<BackendArg>,

    /// Max parallel workers (capped at CPU cores)
    #[arg(short, long, global = true)]
    jobs: Option<usize>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Builtin,
    Msgfmt,
}

impl BackendArg {
    fn as_str(self) -> &'static str {
        match self {
            BackendArg::Builtin => "builtin",
            BackendArg::Msgfmt => "msgfmt",
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Compile and stage every catalog (default)
    Build {
        /// Write a JSON report of every unit to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Show discovered catalogs and their planned outputs
    List,
    /// Parse every catalog without writing anything
    Check,
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(mut cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let command = cli
        .command
        .take()
        .unwrap_or(Command::Build { report: None });

    if let Command::GenConfig = command {
        print!("{}", config::stock_config_toml());
        return Ok(ExitCode::SUCCESS);
    }

    let build_config = match config::load_config(&cli.config, Some(cli_overrides(&cli))) {
        Ok(c) => c,
        Err(e) => return Ok(fatal(&RunError::from(e))),
    };

    match command {
        Command::Build { report } => {
            init_thread_pool(&build_config, cli.jobs);
            let compiler = compiler::from_config(&build_config.compiler);
            let cancel = install_cancel_handler()?;

            println!("==> Staging catalogs from {}", build_config.source_dir.display());
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_stage_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let options = StageOptions {
                events: Some(tx),
                cancel: Some(cancel),
            };
            let result = pipeline::run(&build_config, compiler.as_ref(), options);
            // The sender is gone once `run` returns, so the printer drains and exits.
            printer.join().map_err(|_| "progress printer panicked")?;

            match &result {
                Ok(stage_report) => {
                    output::print_summary(stage_report);
                    if let Some(path) = report {
                        let json = serde_json::to_string_pretty(stage_report)?;
                        std::fs::write(path, json)?;
                    }
                }
                Err(e) => eprintln!("error: {e}"),
            }
            Ok(ExitCode::from(pipeline::exit_status(&result)))
        }
        Command::List => match pipeline::prepare(&build_config) {
            Ok(plan) => {
                output::print_plan(&plan);
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => Ok(fatal(&e)),
        },
        Command::Check => {
            init_thread_pool(&build_config, cli.jobs);
            println!("==> Checking {}", build_config.source_dir.display());
            let result = pipeline::check(&build_config);
            match &result {
                Ok(results) => {
                    output::print_check_results(results);
                    if results.iter().all(|r| r.result.is_ok()) {
                        println!("==> Catalogs are valid");
                    }
                }
                Err(e) => eprintln!("error: {e}"),
            }
            Ok(ExitCode::from(pipeline::check_exit_status(&result)))
        }
        Command::GenConfig => Ok(ExitCode::SUCCESS),
    }
}

/// Report a configuration or discovery error.
fn fatal(e: &RunError) -> ExitCode {
    eprintln!("error: {e}");
    ExitCode::from(pipeline::EXIT_CONFIG)
}

/// Set a shared flag on SIGINT/SIGTERM so staging skips units not yet started.
///
/// A second signal exits immediately.
#[cfg(unix)]
fn install_cancel_handler() -> std::io::Result<Arc<AtomicBool>> {
    use signal_hook::consts::signal::{SIGINT, SIGTERM};
    use signal_hook::flag;

    let cancel = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        flag::register_conditional_shutdown(signal, 128 + signal, Arc::clone(&cancel))?;
        flag::register(signal, Arc::clone(&cancel))?;
    }
    Ok(cancel)
}

#[cfg(not(unix))]
fn install_cancel_handler() -> std::io::Result<Arc<AtomicBool>> {
    Ok(Arc::new(AtomicBool::new(false)))
}

/// Translate CLI flags into a sparse TOML overlay applied after the file.
fn cli_overrides(cli: &Cli) -> toml::Value {
    let mut root = toml::Table::new();
    if let Some(source) = &cli.source {
        root.insert("source_dir".into(), path_value(source));
    }
    if let Some(app_id) = &cli.app_id {
        root.insert("app_id".into(), toml::Value::String(app_id.clone()));
    }

    let mut layouts = toml::Table::new();
    for (name, root_dir) in [("local", &cli.local_root), ("bundle", &cli.bundle_root)] {
        if let Some(dir) = root_dir {
            let mut layout = toml::Table::new();
            layout.insert("root".into(), path_value(dir));
            layouts.insert(name.into(), toml::Value::Table(layout));
        }
    }
    if !layouts.is_empty() {
        root.insert("layouts".into(), toml::Value::Table(layouts));
    }

    if let Some(backend) = cli.compiler {
        let mut compiler = toml::Table::new();
        compiler.insert(
            "backend".into(),
            toml::Value::String(backend.as_str().into()),
        );
        root.insert("compiler".into(), toml::Value::Table(compiler));
    }

    toml::Value::Table(root)
}

fn path_value(path: &Path) -> toml::Value {
    toml::Value::String(path.to_string_lossy().into_owned())
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool from `--jobs` or the processing config.
///
/// Caps at the number of available CPU cores: user can constrain down, not up.
fn init_thread_pool(build_config: &BuildConfig, jobs: Option<usize>) {
    let mut processing = build_config.processing.clone();
    if let Some(n) = jobs {
        processing.max_processes = Some(n.max(1));
    }
    let threads = config::effective_threads(&processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
