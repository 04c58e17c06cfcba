use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use transim_elements::prelude::IntegrationRule;
use transim_solver::config::SolverConfig;
use transim_solver::transient::TransientParams;

/// Transim runs a transient simulation on a netlist and writes the node/branch
/// trajectory to a text file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the netlist file to simulate.
    netlist: PathBuf,

    /// Total simulated time, in seconds.
    #[arg(short = 'T', long)]
    time: f64,

    /// Number of samples to emit.
    #[arg(short = 'P', long)]
    samples: usize,

    /// Internal substeps per emitted sample.
    #[arg(short = 'S', long, default_value_t = 1)]
    substeps: usize,

    /// Discretization rule used by reactive companion models.
    #[arg(short = 'r', long, value_enum, default_value_t = Rule::BackwardEuler)]
    rule: Rule,

    /// Symbol table capacity (max nodes + auxiliary currents).
    #[arg(long, default_value_t = 4096)]
    capacity: usize,

    /// Where to write the trajectory. Defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Omit the column-name header row.
    #[arg(long)]
    no_header: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Rule {
    BackwardEuler,
    ForwardEuler,
    Trapezoidal,
}

impl From<Rule> for IntegrationRule {
    fn from(rule: Rule) -> Self {
        match rule {
            Rule::BackwardEuler => IntegrationRule::BackwardEuler,
            Rule::ForwardEuler => IntegrationRule::ForwardEuler,
            Rule::Trapezoidal => IntegrationRule::Trapezoidal,
        }
    }
}

const EXIT_IO: u8 = 1;
const EXIT_SINGULAR: u8 = 2;
const EXIT_CAPACITY: u8 = 3;
const EXIT_MALFORMED: u8 = 4;
const EXIT_NONCONVERGENT: u8 = 5;
const EXIT_INVALID_PARAMS: u8 = 6;
const EXIT_FORWARD_EULER: u8 = 7;

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let netlist_text = match std::fs::read_to_string(&args.netlist) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("error reading netlist '{}': {e}", args.netlist.display());
            return ExitCode::from(EXIT_IO);
        }
    };

    let (symtab, elements) = match transim_elements::ingest::parse(&netlist_text, args.capacity) {
        Ok(parsed) => parsed,
        Err(e) => return report_elements_error(&e),
    };

    let rule: IntegrationRule = args.rule.into();
    let mut circuit = match transim_elements::circuit::Circuit::new(rule, &symtab, elements) {
        Ok(c) => c,
        Err(e) => return report_elements_error(&e),
    };

    let params = match TransientParams::new(args.time, args.samples, args.substeps) {
        Ok(p) => p,
        Err(e) => return report_solver_error(&e),
    };

    log::info!("simulating '{}': T={:e} P={} S={}", args.netlist.display(), args.time, args.samples, args.substeps);

    let config = SolverConfig::default();
    let report = match transim_solver::transient::run(&mut circuit, &params, &config) {
        Ok(r) => r,
        Err(e) => return report_solver_error(&e),
    };

    let write_result = match &args.output {
        Some(path) => File::create(path)
            .map_err(transim_result::Error::from)
            .and_then(|mut f| transim_result::write_trajectory(&mut f, &symtab, &report, !args.no_header)),
        None => transim_result::write_trajectory(&mut std::io::stdout().lock(), &symtab, &report, !args.no_header),
    };

    if let Err(e) = write_result {
        eprintln!("error writing trajectory: {e}");
        return ExitCode::from(EXIT_IO);
    }

    ExitCode::SUCCESS
}

fn report_elements_error(e: &transim_elements::error::Error) -> ExitCode {
    use transim_elements::error::Error;
    eprintln!("error: {e}");
    match e {
        Error::CapacityExceeded(_) => ExitCode::from(EXIT_CAPACITY),
        Error::MalformedElement { .. } | Error::InvalidFloatValue(_) => ExitCode::from(EXIT_MALFORMED),
        Error::InvalidParameters(_) => ExitCode::from(EXIT_INVALID_PARAMS),
        Error::ForwardEulerUnsupported(_) => ExitCode::from(EXIT_FORWARD_EULER),
    }
}

fn report_solver_error(e: &transim_solver::error::Error) -> ExitCode {
    use transim_solver::error::Error;
    eprintln!("error: {e}");
    match e {
        Error::SingularSystem { .. } => ExitCode::from(EXIT_SINGULAR),
        Error::Nonconvergent { .. } => ExitCode::from(EXIT_NONCONVERGENT),
        Error::Elements(inner) => report_elements_error(inner),
    }
}
