mod config;
mod http;
mod interrupt;
mod reporting;

use crate::config::{Config, FileConfig};
use crate::http::RequestLoop;
use crate::reporting::{ConsoleReport, CHART_FILENAME};
use anyhow::Error;
use clap::{value_t, App, Arg};
use slog::{o, Drain, Level};
use std::path::Path;
use surge_metrics::SummaryStats;

/// Per-attempt lines must all reach the console, so the async channel is
/// sized for request bursts and blocks instead of dropping on overflow.
fn async_drain<D>(drain: D) -> slog_async::Async
where
    D: slog::Drain<Ok = (), Err = slog::Never> + Send + 'static,
{
    slog_async::Async::new(drain)
        .chan_size(8192)
        .overflow_strategy(slog_async::OverflowStrategy::Block)
        .build()
}

fn root_logger(level: Level) -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().stdout().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let level_filter = slog::LevelFilter(async_drain(drain).fuse(), level).fuse();
    slog::Logger::root(level_filter, o!())
}

fn run(logger: slog::Logger, config: Config) -> Result<(), Error> {
    let interrupted = interrupt::register()?;
    slog::info!(
        logger,
        "Starting load test for {} seconds...",
        config.duration_seconds
    );
    slog::info!(logger, "Testing URL: {}", config.target_url);
    let series = RequestLoop::new(config.clone(), logger).run(&interrupted)?;
    let stats = SummaryStats::from_series(&series, config.slow_threshold_ms)?;
    println!("{}", ConsoleReport::new(&stats, config.slow_threshold_ms));
    let out = Path::new(CHART_FILENAME);
    reporting::render_chart(&series, &stats, out)?;
    println!("\nGraph saved as '{}'", out.display());
    println!("\n{}\nANALYSIS COMPLETE\n{}", reporting::RULE, reporting::RULE);
    Ok(())
}

fn main() {
    let matches = App::new("Surge")
        .version("0.1.0")
        .about("Hammer a single endpoint with sequential GETs and chart the latencies")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("Path to config file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("url")
                .short("u")
                .long("url")
                .value_name("URL")
                .help("Target url (overrides the config file)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("duration")
                .short("d")
                .long("duration")
                .value_name("SECONDS")
                .help("Test duration in seconds (overrides the config file)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help("Sets verbosity level"),
        )
        .get_matches();
    let file = match matches.value_of("config") {
        Some(path) => match FileConfig::load(path) {
            Ok(conf) => conf,
            Err(e) => {
                eprintln!("Could not load config: {}", e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };
    let duration = if matches.is_present("duration") {
        Some(value_t!(matches, "duration", u64).unwrap_or_else(|e| e.exit()))
    } else {
        None
    };
    let config = match Config::resolve(file, matches.value_of("url").map(String::from), duration) {
        Ok(conf) => conf,
        Err(e) => {
            eprintln!("Invalid config: {}", e);
            std::process::exit(1);
        }
    };
    let level = match matches.occurrences_of("v") {
        0 => Level::Info,
        1 => Level::Debug,
        2 => Level::Trace,
        _ => {
            eprintln!("WARNING: more than -vv is ignored");
            Level::Trace
        }
    };
    let logger = root_logger(level);
    if let Err(e) = run(logger, config) {
        eprintln!("Error running load test: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use slog::Drain;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingDrain(Arc<AtomicUsize>);

    impl slog::Drain for CountingDrain {
        type Ok = ();
        type Err = slog::Never;

        fn log(
            &self,
            _record: &slog::Record,
            _values: &slog::OwnedKVList,
        ) -> Result<(), slog::Never> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn attempt_lines_survive_a_request_burst() {
        let delivered = Arc::new(AtomicUsize::new(0));
        let total = 20_000usize;
        {
            let drain = async_drain(CountingDrain(delivered.clone()).fuse()).fuse();
            let logger = slog::Logger::root(drain, o!());
            for i in 0..total {
                slog::info!(logger, "Request {}: 0.10ms - SUCCESS", i + 1);
            }
            // dropping the logger joins the worker thread and flushes the queue
        }
        assert_eq!(delivered.load(Ordering::SeqCst), total);
    }
}
