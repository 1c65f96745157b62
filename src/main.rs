//! webconf-manifest CLI
//!
//! Entry point for the `webconf-manifest` command-line tool.

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process;
use webconf_manifest::config::DEFAULT_SETTINGS_PATH;
use webconf_manifest::manifest::{OptionEntry, SourceType};
use webconf_manifest::pipeline;
use webconf_manifest::{EffectiveSettings, Registry};
use webconf_registry::DefaultValue;
use webconf_tree::MatcherKind;

#[derive(Parser)]
#[command(name = "webconf-manifest")]
#[command(about = "Resolve web server configuration into an option manifest", version)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the manifest from a configuration tree and write it
    Build {
        /// Configuration tree (.toml or .json)
        #[arg(long, short = 'i')]
        input: PathBuf,

        /// Manifest output path (overrides settings)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Path to settings file (default: .webconf/manifest.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Print the build report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the resolved value hierarchy of one option
    Explain {
        /// Configuration tree (.toml or .json)
        #[arg(long, short = 'i')]
        input: PathBuf,

        /// Option name
        #[arg(long)]
        option: String,

        /// Application group name
        #[arg(long)]
        app: Option<String>,

        /// Location matcher value (requires --app)
        #[arg(long, requires = "app")]
        location: Option<String>,

        /// Location matcher type: exact, prefix or regex (default: any)
        #[arg(long, requires = "location")]
        kind: Option<MatcherKind>,

        /// Path to settings file (default: .webconf/manifest.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },

    /// List recognized options
    Options {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Build {
            input,
            output,
            config,
            json,
        } => {
            run_build(&input, output, config, json);
        }
        Commands::Explain {
            input,
            option,
            app,
            location,
            kind,
            config,
        } => {
            let query = ExplainQuery {
                option: &option,
                app: app.as_deref(),
                location: location.as_deref(),
                kind,
            };
            run_explain(&input, &query, config);
        }
        Commands::Options { json } => {
            run_options(json);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init()
        .ok();
}

fn load_settings(config_path: Option<PathBuf>, overrides: Option<Value>) -> EffectiveSettings {
    let path = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH));
    match EffectiveSettings::build(Some(&path), overrides) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            process::exit(1);
        }
    }
}

fn run_build(
    input: &Path,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
    json_output: bool,
) {
    let overrides = output.map(|path| json!({ "output_path": path }));
    let effective = load_settings(config_path, overrides);

    let (_, report) = match pipeline::run(input, &effective, &Registry::builtin()) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if json_output {
        match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("{}", report.to_human());
    }
}

/// Which option to explain, and where.
struct ExplainQuery<'q> {
    option: &'q str,
    app: Option<&'q str>,
    location: Option<&'q str>,
    kind: Option<MatcherKind>,
}

fn run_explain(input: &Path, query: &ExplainQuery<'_>, config_path: Option<PathBuf>) {
    let registry = Registry::builtin();
    if registry.get(query.option).is_none() {
        eprintln!(
            "Unknown option '{}'. Run `webconf-manifest options` for the list.",
            query.option
        );
        process::exit(1);
    }

    let effective = load_settings(config_path, None);
    let (manifest, _) = match pipeline::resolve(input, &effective, &registry) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if let (Some(app), Some(pattern)) = (query.app, query.location) {
        let locations: Vec<_> = manifest.matching_locations(app, pattern, query.kind).collect();
        if locations.is_empty() {
            eprintln!("No location '{}' recorded for application '{}'.", pattern, app);
            process::exit(1);
        }
        // One pattern can be recorded per virtual host and matcher type.
        for location in locations {
            println!(
                "location {} {} ({})",
                location.location_matcher.kind.as_str(),
                location.location_matcher.value,
                location.web_server_virtual_host.server_names.join(", ")
            );
            match location.options.get(query.option) {
                Some(entry) => print_hierarchy(query.option, entry),
                None => println!("{}: not set in this location", query.option),
            }
        }
        return;
    }

    match manifest.lookup(query.app, query.option) {
        Some(entry) => print_hierarchy(query.option, entry),
        None => {
            eprintln!("'{}' is not recorded at that scope.", query.option);
            if query.app.is_some() {
                let groups: Vec<_> = manifest.application_configuration.keys().cloned().collect();
                eprintln!("Known applications: {}", groups.join(", "));
            }
            process::exit(1);
        }
    }
}

fn print_hierarchy(option: &str, entry: &OptionEntry) {
    println!("{}:", option);
    for (i, member) in entry.value_hierarchy.iter().enumerate() {
        let value = member
            .value
            .as_ref()
            .map(Value::to_string)
            .unwrap_or_else(|| "(unset)".to_string());
        let source = match member.source.kind {
            SourceType::WebServerConfig => format!(
                "{}:{}",
                member.source.path.as_deref().unwrap_or_default(),
                member.source.line.unwrap_or_default()
            ),
            SourceType::Default => "default".to_string(),
            SourceType::DynamicDefaultDescription => "dynamic default".to_string(),
        };
        let marker = if i == 0 { "*" } else { " " };
        println!("  {} {:<40} {}", marker, value, source);
    }
}

fn run_options(json_output: bool) {
    let registry = Registry::builtin();

    if json_output {
        let options: Vec<_> = registry.iter().collect();
        match serde_json::to_string_pretty(&options) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    println!("Recognized options ({} total):\n", registry.len());
    for spec in registry.iter() {
        let default = match &spec.default {
            DefaultValue::Static(value) => value.to_string(),
            DefaultValue::Dynamic(description) => format!("<{}>", description),
        };
        println!(
            "  {:<36} {:<12} {:<18} {}",
            spec.name,
            format!("{:?}", spec.scope).to_lowercase(),
            format!("{:?}", spec.kind),
            default
        );
    }
}
