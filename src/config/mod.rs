pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "trip-stats")]
#[command(about = "Taxi trip ETL with a descriptive statistics report")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Directory all data files are read from and written to
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Seed for trip ID generation (reproducible runs)
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Keep the relevant columns and reduce timestamps to 24-hour clock times
    Extract {
        #[arg(long)]
        input: Option<String>,
        #[arg(long)]
        output: Option<String>,
    },
    /// Add unique trip IDs and elapsed trip times
    Format {
        #[arg(long)]
        input: Option<String>,
        #[arg(long)]
        output: Option<String>,
    },
    /// Compute descriptive statistics and write the Markdown report
    Report {
        #[arg(long)]
        input: Option<String>,
        #[arg(long)]
        output: Option<String>,
        /// Also write the statistics as JSON
        #[arg(long)]
        json: Option<String>,
    },
    /// Check a processed file against the raw data
    Verify {
        #[arg(long)]
        raw: Option<String>,
        #[arg(long)]
        processed: Option<String>,
    },
    /// Run extract, format and report in sequence
    Run {
        /// Verify the extract and format outputs afterwards
        #[arg(long)]
        verify: bool,
    },
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the TOML file (or defaults) and applies command-line overrides.
    pub fn settings(&self) -> crate::utils::error::Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(dir) = &self.data_dir {
            config.files.data_dir = dir.clone();
        }
        if self.seed.is_some() {
            config.format.seed = self.seed;
        }

        match &self.command {
            Command::Extract { input, output } => {
                override_file(&mut config.files.raw, input);
                override_file(&mut config.files.relevant, output);
            }
            Command::Format { input, output } => {
                override_file(&mut config.files.relevant, input);
                override_file(&mut config.files.formatted, output);
            }
            Command::Report {
                input,
                output,
                json,
            } => {
                override_file(&mut config.files.formatted, input);
                override_file(&mut config.files.report, output);
                if json.is_some() {
                    config.files.stats_json = json.clone();
                }
            }
            Command::Verify { raw, processed } => {
                override_file(&mut config.files.raw, raw);
                if processed.is_some() {
                    config.verify.processed = processed.clone();
                }
            }
            Command::Run { .. } => {}
        }

        Ok(config)
    }
}

#[cfg(feature = "cli")]
fn override_file(target: &mut String, value: &Option<String>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}
