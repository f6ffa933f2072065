//! Bootvisor CLI - render configs, gate startup on health, exec services.
//!
//! Usage:
//!   bootvisor up -f stack.yaml           # Supervise a whole manifest
//!   bootvisor up -f stack.yaml --no-monitor
//!   bootvisor exec -r app.conf.tpl:app.conf -- api-server --config app.conf
//!
//! Exit codes:
//!   0  all services settled healthy
//!   1  runtime error (grace exceeded, exec failure)
//!   2  render failed: missing or empty bindings
//!   3  render produced an empty file
//!   4  render failed for another reason (bad template, I/O)
//!   5  bootstrap failed: some service unhealthy or skipped
//!   6  configuration error (manifest parse, duplicate/unknown/cyclic deps)

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use argh::FromArgs;

use bootvisor::{
    exec, render, Bindings, CommandLine, Config, LogWriter, Manifest, RenderError, Report,
    Subscribe, Supervisor,
};

/// Config renderer and dependency-gated bootstrap supervisor.
#[derive(FromArgs)]
struct Args {
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Up(UpArgs),
    Exec(ExecArgs),
}

/// Supervise the services declared in a manifest until shutdown
#[derive(FromArgs)]
#[argh(subcommand, name = "up")]
struct UpArgs {
    /// path to the YAML service manifest
    #[argh(option, short = 'f', default = "PathBuf::from(\"bootvisor.yaml\")")]
    manifest: PathBuf,

    /// shutdown grace period in seconds (default: 30)
    #[argh(option)]
    grace_secs: Option<u64>,

    /// exit once all services settle instead of monitoring until a signal
    #[argh(switch)]
    no_monitor: bool,
}

/// Render config templates, then replace this process with the command
#[derive(FromArgs)]
#[argh(subcommand, name = "exec")]
struct ExecArgs {
    /// template:target pair to render before exec (repeatable)
    #[argh(option, short = 'r')]
    render: Vec<String>,

    /// command to exec into, with its arguments
    #[argh(positional, greedy)]
    command: Vec<String>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match argh::from_env::<Args>().command {
        Command::Up(args) => run_up(args),
        Command::Exec(args) => run_exec(args),
    }
}

fn run_up(args: UpArgs) -> ExitCode {
    let mut cfg = Config::default();
    if let Some(secs) = args.grace_secs {
        cfg.grace = Duration::from_secs(secs);
    }
    cfg.monitor = !args.no_monitor;

    let manifest = match Manifest::from_path(&args.manifest) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("bootvisor: {e}");
            return ExitCode::from(6);
        }
    };
    let specs = match manifest.into_specs(&cfg) {
        Ok(specs) => specs,
        Err(e) => {
            eprintln!("bootvisor: {e}");
            return ExitCode::from(6);
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("bootvisor: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
    let supervisor = Supervisor::new(cfg, subs);

    match runtime.block_on(supervisor.run(specs)) {
        Ok(report) => report_exit(&report),
        Err(e) => {
            eprintln!("bootvisor: {e}");
            if e.is_configuration() {
                ExitCode::from(6)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn report_exit(report: &Report) -> ExitCode {
    print!("{report}");
    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(5)
    }
}

fn run_exec(args: ExecArgs) -> ExitCode {
    let bindings = Bindings::from_env();

    for pair in &args.render {
        let (template, target) = match pair.split_once(':') {
            Some((t, g)) if !t.is_empty() && !g.is_empty() => (t, g),
            _ => {
                eprintln!("bootvisor: invalid --render pair `{pair}` (want TEMPLATE:TARGET)");
                return ExitCode::from(6);
            }
        };
        match render(template, target, &bindings) {
            Ok(out) => {
                log::info!("rendered {} ({} bytes)", out.path.display(), out.bytes);
            }
            Err(e) => {
                eprintln!("bootvisor: {e}");
                return render_exit(&e);
            }
        }
    }

    let command = match CommandLine::from_argv(&args.command) {
        Some(c) => c,
        None => {
            eprintln!("bootvisor: exec requires a command");
            return ExitCode::from(6);
        }
    };

    // Only returns on failure; on success the target owns the process.
    match exec(&command) {
        Err(e) => {
            eprintln!("bootvisor: {e}");
            ExitCode::FAILURE
        }
        Ok(never) => match never {},
    }
}

fn render_exit(err: &RenderError) -> ExitCode {
    match err {
        RenderError::MissingBindings { .. } => ExitCode::from(2),
        RenderError::EmptyOutput { .. } => ExitCode::from(3),
        _ => ExitCode::from(4),
    }
}
