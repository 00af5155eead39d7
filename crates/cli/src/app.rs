use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::{Path, PathBuf};

use crate::config::{SigscanConfig, CONFIG_FILE_NAMES};
use crate::exit_codes::ExitCode;
use output::{ExportFormat, Exporter};
use scanner::{ScanError, Scanner};

pub struct CliApp {
    config: SigscanConfig,
}

impl CliApp {
    pub fn new(config: SigscanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SigscanConfig {
        &self.config
    }

    pub fn run() -> Result<ExitCode> {
        Self::run_with_args(std::env::args().collect())
    }

    pub fn command() -> Command {
        Command::new("sigscan")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Extract function, event and error selectors from Solidity projects")
            .arg(
                Arg::new("path")
                    .help("Project root to scan")
                    .value_name("PATH")
                    .default_value("."),
            )
            .arg(
                Arg::new("format")
                    .short('f')
                    .long("format")
                    .help("Output formats, comma separated")
                    .value_parser(["json", "text", "csv"])
                    .value_delimiter(',')
                    .action(ArgAction::Append),
            )
            .arg(
                Arg::new("output")
                    .short('o')
                    .long("output")
                    .help("Directory for signatures.<ext> files (stdout if not specified)")
                    .value_name("DIR"),
            )
            .arg(
                Arg::new("include-internal")
                    .long("include-internal")
                    .help("Export internal functions")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("include-private")
                    .long("include-private")
                    .help("Export private functions")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("no-events")
                    .long("no-events")
                    .help("Leave events out of the export")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("no-errors")
                    .long("no-errors")
                    .help("Leave custom errors out of the export")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("single")
                    .long("single")
                    .help("Scan PATH as one project without sub-project discovery")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("sequential")
                    .long("sequential")
                    .help("Parse files on the current thread only")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("no-color")
                    .long("no-color")
                    .help("Disable colors in text output")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("no-exit-code")
                    .long("no-exit-code")
                    .help("Exit with code 0 even when selector collisions are found")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .help("Configuration file path (.sigscan.yml)")
                    .value_name("FILE"),
            )
            .arg(
                Arg::new("init-config")
                    .long("init-config")
                    .help("Write a default configuration file (to --config or .sigscan.yml)")
                    .action(ArgAction::SetTrue),
            )
    }

    pub fn run_with_args(args: Vec<String>) -> Result<ExitCode> {
        let matches = Self::command().try_get_matches_from(args)?;

        let config_file = matches.get_one::<String>("config").map(PathBuf::from);

        // Handle configuration initialization first (doesn't need config loading)
        if matches.get_flag("init-config") {
            return Self::handle_init_config(config_file.as_deref());
        }

        let config = match Self::load_config(config_file.as_deref(), &matches) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Configuration error: {:#}", e);
                return Ok(ExitCode::ConfigError);
            }
        };

        let root = matches
            .get_one::<String>("path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let fail_on_collision = !matches.get_flag("no-exit-code");

        let app = Self::new(config);
        match app.scan(&root) {
            Ok(has_collisions) => Ok(ExitCode::for_scan(has_collisions, fail_on_collision)),
            Err(e) => {
                eprintln!("Error: {:#}", e);
                Ok(ExitCode::ScanError)
            }
        }
    }

    /// Config file values with command-line flags applied on top
    fn load_config(config_file: Option<&Path>, matches: &ArgMatches) -> Result<SigscanConfig> {
        let mut config = SigscanConfig::load_from_defaults_and_file(config_file)?;

        if let Some(formats) = matches.get_many::<String>("format") {
            config.output.formats = formats
                .map(|f| f.parse::<ExportFormat>())
                .collect::<std::result::Result<_, _>>()
                .map_err(anyhow::Error::msg)?;
        }
        if let Some(dir) = matches.get_one::<String>("output") {
            config.output.output_dir = Some(PathBuf::from(dir));
        }
        if matches.get_flag("include-internal") {
            config.output.include_internal = true;
        }
        if matches.get_flag("include-private") {
            config.output.include_private = true;
        }
        if matches.get_flag("no-events") {
            config.output.include_events = false;
        }
        if matches.get_flag("no-errors") {
            config.output.include_errors = false;
        }
        if matches.get_flag("no-color") {
            config.output.colors = false;
        }
        if matches.get_flag("single") {
            config.scan.sub_projects = false;
        }
        if matches.get_flag("sequential") {
            config.scan.parallel = false;
        }

        config.validate()?;
        Ok(config)
    }

    /// Scan `root` and export the result. Returns whether any selector
    /// collision was found.
    pub fn scan(&self, root: &Path) -> Result<bool> {
        let scanner = Scanner::new(self.config.to_scan_options());
        let exporter = Exporter::new(self.config.to_export_options());

        let has_collisions = if self.config.scan.sub_projects {
            let result = scanner
                .scan_all_sub_projects(root)
                .map_err(|e| scan_error(e, root))?;
            exporter
                .export_sub_projects(&result)
                .context("Failed to export results")?;
            result.combined.has_collisions()
        } else {
            let result = scanner
                .scan_project(root)
                .map_err(|e| scan_error(e, root))?;
            exporter.export_scan(&result).context("Failed to export results")?;
            result.has_collisions()
        };

        Ok(has_collisions)
    }

    fn handle_init_config(target: Option<&Path>) -> Result<ExitCode> {
        let config_path = target
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAMES[0]));

        if config_path.exists() {
            eprintln!(
                "Configuration file already exists: {}",
                config_path.display()
            );
            return Ok(ExitCode::ConfigError);
        }

        SigscanConfig::create_default_config_file(&config_path)?;
        println!(
            "Created default configuration file: {}",
            config_path.display()
        );

        Ok(ExitCode::Success)
    }
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new(SigscanConfig::default())
    }
}

fn scan_error(error: ScanError, root: &Path) -> anyhow::Error {
    anyhow::Error::new(error).context(format!("Failed to scan {}", root.display()))
}
