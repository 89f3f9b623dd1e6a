use clap::{Arg, ArgAction, Command};
use log::LevelFilter;
use phish_scorer::{validate_submission, EngineConfig, RuleEngine};
use std::io::BufRead;
use std::process;

fn main() {
    let matches = Command::new("phish-scorer")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Score URLs against weighted phishing heuristics")
        .arg(
            Arg::new("urls")
                .value_name("URL")
                .help("URLs to analyze (read from stdin, one per line, when omitted)")
                .num_args(0..)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file with rule weights and threshold"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Test configuration validity")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-rules")
                .long("list-rules")
                .help("List rules with their effective weights")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .help("Pretty-print JSON reports")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging with per-rule details")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config = match matches.get_one::<String>("config") {
        Some(path) => match EngineConfig::load_or_default(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading configuration: {e}");
                process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    let engine = match RuleEngine::from_config(&config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            process::exit(1);
        }
    };

    if matches.get_flag("test-config") {
        println!("Configuration is valid.");
        println!("Threshold: {}", engine.threshold());
        println!("Total weight: {}", engine.total_weight());
        return;
    }

    if matches.get_flag("list-rules") {
        list_rules(&engine);
        return;
    }

    let pretty = matches.get_flag("pretty");
    let urls: Vec<String> = match matches.get_many::<String>("urls") {
        Some(values) => values.cloned().collect(),
        None => read_stdin_urls(),
    };

    let mut rejected = 0;
    for url in &urls {
        if !analyze_one(&engine, url, pretty) {
            rejected += 1;
        }
    }

    if rejected > 0 {
        log::warn!("{} of {} URLs rejected", rejected, urls.len());
        process::exit(1);
    }
}

/// Print the report for one URL, or an error object if it fails validation.
/// Returns whether the URL was accepted.
fn analyze_one(engine: &RuleEngine, url: &str, pretty: bool) -> bool {
    if let Err(e) = validate_submission(url) {
        let error = serde_json::json!({ "url": url, "error": e.to_string() });
        println!("{error}");
        return false;
    }

    let report = engine.analyze(url).to_report();
    match report.to_json(pretty) {
        Ok(json) => {
            println!("{json}");
            true
        }
        Err(e) => {
            eprintln!("Error serializing report for {url}: {e}");
            false
        }
    }
}

fn read_stdin_urls() -> Vec<String> {
    let stdin = std::io::stdin();
    let mut urls = Vec::new();
    for line in stdin.lock().lines() {
        match line {
            Ok(line) => {
                let line = line.trim();
                if !line.is_empty() {
                    urls.push(line.to_string());
                }
            }
            Err(e) => {
                eprintln!("Error reading stdin: {e}");
                process::exit(1);
            }
        }
    }
    urls
}

fn list_rules(engine: &RuleEngine) {
    let total = engine.total_weight();
    println!("{:<24} {:>7} {:>7}  Description", "Rule", "Weight", "Share");
    for (rule, weight) in engine.weights() {
        println!(
            "{:<24} {:>7.3} {:>6.1}%  {}",
            rule.name,
            weight,
            weight / total * 100.0,
            rule.description
        );
    }
    println!("Phishing threshold: {}", engine.threshold());
}

fn generate_default_config(path: &str) {
    let config = EngineConfig::default();
    match config.to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Please edit the configuration file to suit your needs.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e}");
            process::exit(1);
        }
    }
}
