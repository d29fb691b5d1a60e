use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// groundhog - geotechnical calculations
///
/// Evaluate PCPT correlations and calculate pile resistance from CPT data.
///
/// Settings are read from --config, the file named by GROUNDHOG_CONFIG or
/// <config dir>/groundhog/config.json.
///
/// Examples:
///   groundhog correlate "Su Rad and Lunne (1988)" --param qnet=1.2 --param Nk=15
///   groundhog process "Ic Robertson and Wride (1998)" --input cpt.json
///   groundhog debeer --input pile.json
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (JSON)
    #[arg(long = "config", short = 'c', value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Show package information
    Info(InfoArgs),

    /// List the available correlations
    Correlations,

    /// Evaluate one correlation
    Correlate(CorrelateArgs),

    /// Apply a correlation to every record of a PCPT data file
    Process(ProcessArgs),

    /// Calculate pile resistance with De Beer's method
    Debeer(DebeerArgs),
}

#[derive(clap::Args, Debug)]
pub struct InfoArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct CorrelateArgs {
    /// Correlation name, see `groundhog correlations`
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Parameter as key=value (can be specified multiple times)
    #[arg(long = "param", short = 'p', value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// JSON object with parameters; --param values take precedence
    #[arg(long = "params-file", value_name = "FILE")]
    pub params_file: Option<PathBuf>,

    /// Fail on out-of-range parameters instead of returning NaN results
    #[arg(long)]
    pub strict: bool,
}

#[derive(clap::Args, Debug)]
pub struct ProcessArgs {
    /// Correlation name, see `groundhog correlations`
    #[arg(value_name = "NAME")]
    pub name: String,

    /// JSON array of PCPT records
    #[arg(long, short = 'i', value_name = "FILE")]
    pub input: PathBuf,

    /// Parameter applied to every record as key=value
    #[arg(long = "param", short = 'p', value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Fail on the first record that cannot be evaluated
    #[arg(long)]
    pub strict: bool,

    /// Write the results to a file instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct DebeerArgs {
    /// JSON description of the CPT, soil layers and pile
    #[arg(long, short = 'i', value_name = "FILE")]
    pub input: PathBuf,

    /// Write the results to a file instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = groundhog::runtime::RealRuntime;

    match cli.command {
        Commands::Info(args) => groundhog::commands::info(args.json)?,
        Commands::Correlations => groundhog::commands::correlations()?,
        Commands::Correlate(args) => groundhog::commands::correlate(
            runtime,
            cli.config,
            &args.name,
            &args.params,
            args.params_file,
            args.strict,
        )?,
        Commands::Process(args) => groundhog::commands::process(
            runtime,
            cli.config,
            &args.name,
            &args.input,
            &args.params,
            args.strict,
            args.output,
        )?,
        Commands::Debeer(args) => {
            groundhog::commands::debeer(runtime, cli.config, &args.input, args.output)?
        }
    }
    Ok(())
}
