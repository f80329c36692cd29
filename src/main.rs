use std::io::{self, Write};
use std::net::Ipv4Addr;
use std::process::ExitCode;
use std::time::Duration;

use trace_fox::{HopSink, StreamingSink, TraceConfig, TraceError, TraceOutcome, TraceResult, TraceSession};

#[derive(argh::FromArgs)]
/// trace-fox - trace the route to a host with ICMP echo requests;
/// raw sockets require root (Linux/macOS: sudo, Windows: an Administrator shell)
struct Args {
    #[argh(option, short = 'm', default = "trace_fox::TraceConfig::default().max_hops")]
    /// maximum number of hops (default: 10)
    max_hops: u8,

    #[argh(option, short = 't', default = "2.0")]
    /// timeout in seconds for each probe (default: 2.0)
    timeout: f64,

    #[argh(option, short = 'i', default = "100")]
    /// pause in milliseconds between two probes (default: 100)
    interval: u64,

    #[argh(switch, short = 'a')]
    /// print the route once the trace has finished instead of hop by hop
    accumulate: bool,

    #[argh(switch, short = 'v')]
    /// log more on stderr, may be repeated
    verbose: u8,

    #[argh(positional)]
    /// hostname or IPv4 address to trace the route to
    destination: String,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::ERROR,
        1 => tracing::Level::WARN,
        2 => tracing::Level::INFO,
        3 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("setting default subscriber failed");
    }
}

fn trace_config(args: &Args) -> Result<TraceConfig, String> {
    let timeout = Duration::try_from_secs_f64(args.timeout)
        .map_err(|_| format!("invalid timeout '{}': expected a positive number of seconds", args.timeout))?;
    let config = TraceConfig {
        max_hops: args.max_hops,
        timeout,
        probe_interval: Duration::from_millis(args.interval),
        ..TraceConfig::default()
    };
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn write_header<W: Write>(out: &mut W, host: &str, destination: Ipv4Addr, max_hops: u8) -> TraceResult<()> {
    writeln!(out, "Tracing route to {host} ({destination})").map_err(TraceError::Sink)?;
    writeln!(out, "Maximum hops: {max_hops}\n").map_err(TraceError::Sink)
}

fn write_summary<W: Write>(out: &mut W, outcome: TraceOutcome, max_hops: u8, accumulate: bool) -> TraceResult<()> {
    if outcome == TraceOutcome::MaxHopsExceeded {
        writeln!(out, "\nReached maximum hops ({max_hops}) without reaching destination").map_err(TraceError::Sink)?;
    }
    if accumulate {
        writeln!(out).map_err(TraceError::Sink)?;
    }
    out.flush().map_err(TraceError::Sink)
}

fn trace(host: &str, destination: Ipv4Addr, config: TraceConfig, accumulate: bool) -> TraceResult<()> {
    let max_hops = config.max_hops;
    let session = TraceSession::new(destination, config)?;

    let mut stdout = io::stdout().lock();
    write_header(&mut stdout, host, destination, max_hops)?;

    let outcome = if accumulate {
        let mut hops = Vec::new();
        let outcome = session.run(&mut hops)?;
        let mut sink = StreamingSink::new(&mut stdout);
        for hop in hops {
            sink.accept(hop)?;
        }
        outcome
    } else {
        session.run(&mut StreamingSink::new(&mut stdout))?
    };

    write_summary(&mut stdout, outcome, max_hops, accumulate)
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();
    init_logging(args.verbose);

    let config = match trace_config(&args) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("Error: {message}");
            return ExitCode::from(1);
        }
    };

    let Ok(destination) = trace_fox::lookup_host_v4(&args.destination) else {
        eprintln!("Error: Cannot resolve hostname '{}'", args.destination);
        return ExitCode::from(1);
    };
    match trace(&args.destination, destination, config, args.accumulate) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}
