use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use structopt::StructOpt;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use opcost::errors::Error;
use opcost::{BackendConfig, BenchConfig, RandomSampler, ReportPrinter, SuiteRunner, plan};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "opcost",
    about = "Measure the mean cost of field, group, pairing and modular integer operations"
)]
struct Opt {
    #[structopt(long, help = "JSON configuration file; flags override its values")]
    config: Option<PathBuf>,
    #[structopt(long, help = "trials per operation on pairing curves")]
    trials: Option<u64>,
    #[structopt(long, help = "trials per operation on integer rings")]
    integer_trials: Option<u64>,
    #[structopt(
        long,
        use_delimiter = true,
        help = "integer ring modulus sizes in bits, comma separated"
    )]
    bits: Vec<usize>,
    #[structopt(
        long = "curve",
        help = "backend:curve to measure, e.g. arkworks:bn254 or blst:bls12-381 (repeatable)"
    )]
    curves: Vec<BackendConfig>,
    #[structopt(long, help = "skip all pairing curves")]
    no_curves: bool,
    #[structopt(long, help = "skip the integer ring sweep")]
    no_integers: bool,
    #[structopt(long, help = "wall-clock budget per backend, in milliseconds")]
    suite_budget_ms: Option<u64>,
    #[structopt(long, help = "wall-clock budget per operation, in milliseconds")]
    operation_budget_ms: Option<u64>,
    #[structopt(long, help = "run independent backends concurrently (skews timings)")]
    parallel: bool,
    #[structopt(long, help = "print the reports as JSON instead of text")]
    json: bool,
    #[structopt(short, long, parse(from_occurrences), help = "more logging (-v, -vv)")]
    verbose: u8,
}

impl Opt {
    fn bench_config(&self) -> Result<BenchConfig, Error> {
        let mut config = match &self.config {
            Some(path) => {
                let file = File::open(path).map_err(|e| {
                    Error::InvalidConfig(format!("cannot open {}: {e}", path.display()))
                })?;
                serde_json::from_reader(file).map_err(|e| {
                    Error::InvalidConfig(format!("cannot parse {}: {e}", path.display()))
                })?
            }
            None => BenchConfig::default(),
        };
        if let Some(trials) = self.trials {
            config.trials = trials;
        }
        if let Some(trials) = self.integer_trials {
            config.integer_trials = trials;
        }
        if !self.bits.is_empty() {
            config.integer_bit_lengths = self.bits.clone();
        }
        if !self.curves.is_empty() {
            config.curves = self.curves.clone();
        }
        if self.no_curves {
            config.curves.clear();
        }
        if self.no_integers {
            config.integer_bit_lengths.clear();
        }
        if let Some(ms) = self.suite_budget_ms {
            config.suite_budget = Some(Duration::from_millis(ms));
        }
        if let Some(ms) = self.operation_budget_ms {
            config.operation_budget = Some(Duration::from_millis(ms));
        }
        config.parallel |= self.parallel;
        config.validate()?;
        Ok(config)
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let opt = Opt::from_args();
    init_logging(opt.verbose);

    let config = match opt.bench_config() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "invalid configuration");
            return ExitCode::from(2);
        }
    };

    let sampler = RandomSampler::new();
    if let Err(err) = sampler.probe() {
        error!(error = %err, "no usable randomness source");
        return ExitCode::FAILURE;
    }

    let planned = match plan(&config) {
        Ok(planned) => planned,
        Err(err) => {
            error!(error = %err, "cannot plan benchmark run");
            return ExitCode::from(2);
        }
    };
    info!(
        backends = planned.len(),
        trials = config.trials,
        integer_trials = config.integer_trials,
        "starting"
    );
    let reports = SuiteRunner::new(sampler)
        .parallel(config.parallel)
        .run(planned);

    if opt.json {
        match serde_json::to_string_pretty(&reports) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                error!(error = %err, "cannot serialize reports");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{}", ReportPrinter.render(&reports));
    }
    ExitCode::SUCCESS
}
