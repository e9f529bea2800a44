use backtrace::Backtrace;
use clap::Parser;
use metrics_agent::config::{LogLevel, Overrides};
use metrics_agent::{shutdown_channel, Agent, Config, CountingAllocator};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator::new(std::alloc::System);

static TERMINATING: AtomicBool = AtomicBool::new(false);

/// Samples runtime memory statistics and reports them to a metrics collector.
///
/// Settings are read from the optional config file, then the POLL_INTERVAL,
/// REPORT_INTERVAL, ADDRESS, BUFFER_CAPACITY and LOG_LEVEL environment
/// variables, then the flags below, each layer overriding the last.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Agent configuration file (TOML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Collector address, as host[:port] or a full URL
    #[arg(short, long)]
    address: Option<String>,

    /// Time between samples, e.g. 2s
    #[arg(short, long, value_name = "DURATION")]
    poll_interval: Option<String>,

    /// Time between reports to the collector, e.g. 10s
    #[arg(short, long, value_name = "DURATION")]
    report_interval: Option<String>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            poll_interval: self.poll_interval.clone(),
            report_interval: self.report_interval.clone(),
            address: self.address.clone(),
            ..Default::default()
        }
    }
}

fn main() {
    // custom panic hook to terminate whole process after unwinding
    std::panic::set_hook(Box::new(|s| {
        eprintln!("{s}");
        eprintln!("{:?}", Backtrace::new());
        std::process::exit(101);
    }));

    let args = Args::parse();

    let config: Arc<Config> = {
        match Config::load(args.config.as_deref(), &[Overrides::from_env(), args.overrides()]) {
            Ok(c) => c.into(),
            Err(error) => {
                eprintln!("error loading config: {error}");
                std::process::exit(1);
            }
        }
    };

    let log = logging(config.log_level());

    let result = run(config);

    // flush buffered log lines, exit() skips destructors
    drop(log);

    if let Err(error) = result {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

// the returned guard flushes buffered log lines when dropped
fn logging(level: LogLevel) -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::from(level))
        .with_writer(writer)
        .init();

    guard
}

fn run(config: Arc<Config>) -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(1)
        .thread_name("metrics-agent")
        .build()
        .context("failed to launch async runtime")?;

    let (trigger, shutdown) = shutdown_channel();

    ctrlc::set_handler(move || {
        if TERMINATING.swap(true, Ordering::SeqCst) {
            warn!("terminating immediately");
            std::process::exit(2);
        }

        info!("termination signal received, stopping after the current tick");
        trigger.trigger();
    })
    .context("failed to set signal handler")?;

    let agent = Agent::new(config).context("failed to initialize agent")?;

    rt.block_on(agent.run(shutdown));

    Ok(())
}
