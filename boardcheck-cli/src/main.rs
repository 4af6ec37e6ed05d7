//! BoardCheck CLI - PCB design validation from the command line.

use clap::{Parser, Subcommand, ValueEnum};

use boardcheck::{
    validate_with_policy, Design, DrcPolicy, Issue, Severity, ValidationStats,
};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "boardcheck")]
#[command(about = "PCB design validation tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a design JSON file
    Check {
        /// Path to a design .json file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Exit with error code if issues found at this severity or higher
        #[arg(long, value_enum)]
        fail_on: Option<FailOnSeverity>,

        /// Minimum clearance between unconnected components, in board units
        #[arg(long)]
        min_clearance: Option<f64>,
    },

    /// List the built-in checks
    Checks {
        /// Show detailed check descriptions
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for CI/CD
    Json,
    /// GitHub Actions format
    Github,
    /// GitLab CI format
    Gitlab,
}

#[derive(Clone, ValueEnum)]
enum FailOnSeverity {
    Error,
    Warning,
    Info,
}

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Check {
            file,
            format,
            fail_on,
            min_clearance,
        } => handle_check(&file, format, fail_on, min_clearance),
        Commands::Checks { verbose } => {
            handle_checks(verbose);
            0
        }
    };

    process::exit(exit_code);
}

fn handle_check(
    file: &PathBuf,
    format: OutputFormat,
    fail_on: Option<FailOnSeverity>,
    min_clearance: Option<f64>,
) -> i32 {
    let json = match std::fs::read_to_string(file) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", file.display(), e);
            return 1;
        }
    };
    let design = match boardcheck::parse_design(&json) {
        Ok(design) => design,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let policy = match min_clearance {
        Some(min_clearance) => DrcPolicy { min_clearance },
        None => DrcPolicy::default(),
    };
    let issues = match validate_with_policy(&design, &policy) {
        Ok(issues) => issues,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    output_issues(file, &design, &issues, &format);

    if let Some(severity) = fail_on {
        let stats = ValidationStats::from_issues(&issues);
        if should_fail(&stats, &severity) {
            return 1;
        }
    }
    0
}

fn should_fail(stats: &ValidationStats, severity: &FailOnSeverity) -> bool {
    match severity {
        FailOnSeverity::Error => stats.errors > 0,
        FailOnSeverity::Warning => stats.errors + stats.warnings > 0,
        FailOnSeverity::Info => stats.total() > 0,
    }
}

fn output_issues(file: &PathBuf, design: &Design, issues: &[Issue], format: &OutputFormat) {
    match format {
        OutputFormat::Human => output_human(file, design, issues),
        OutputFormat::Json => output_json(file, design, issues),
        OutputFormat::Github => output_github(file, issues),
        OutputFormat::Gitlab => output_gitlab(file, issues),
    }
}

fn output_human(file: &PathBuf, design: &Design, issues: &[Issue]) {
    println!("\nDesign: {} ({})", design.name, file.display());
    println!("{}", "─".repeat(60));

    if issues.is_empty() {
        println!("  No issues found");
        return;
    }

    let errors: Vec<_> = issues
        .iter()
        .filter(|i| matches!(i.severity, Severity::Error))
        .collect();
    let warnings: Vec<_> = issues
        .iter()
        .filter(|i| matches!(i.severity, Severity::Warning))
        .collect();
    let infos: Vec<_> = issues
        .iter()
        .filter(|i| matches!(i.severity, Severity::Info))
        .collect();

    if !errors.is_empty() {
        println!("\n  ERRORS:");
        for issue in errors {
            println!("    - {}", issue.message);
            if !issue.related_ids.is_empty() {
                println!("      Related: {}", issue.related_ids.join(", "));
            }
        }
    }
    if !warnings.is_empty() {
        println!("\n  WARNINGS:");
        for issue in warnings {
            println!("    - {}", issue.message);
            if !issue.related_ids.is_empty() {
                println!("      Related: {}", issue.related_ids.join(", "));
            }
        }
    }
    if !infos.is_empty() {
        println!("\n  INFO:");
        for issue in infos {
            println!("    - {}", issue.message);
        }
    }

    let stats = ValidationStats::from_issues(issues);
    println!("\n  Summary:");
    println!("    Errors:   {}", stats.errors);
    println!("    Warnings: {}", stats.warnings);
    println!("    Info:     {}", stats.infos);
}

fn output_json(file: &PathBuf, design: &Design, issues: &[Issue]) {
    let stats = ValidationStats::from_issues(issues);
    let output = serde_json::json!({
        "file": file.display().to_string(),
        "design": design.id,
        "issues": issues,
        "stats": stats,
    });
    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}

fn severity_to_github(issue: &Issue) -> &'static str {
    match issue.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "notice",
    }
}

fn output_github(file: &PathBuf, issues: &[Issue]) {
    for issue in issues {
        println!(
            "::{} file={}::{}",
            severity_to_github(issue),
            file.display(),
            issue.message.replace('\n', " ")
        );
    }
}

fn severity_to_gitlab(issue: &Issue) -> &'static str {
    match issue.severity {
        Severity::Error => "blocker",
        Severity::Warning => "major",
        Severity::Info => "info",
    }
}

fn output_gitlab(file: &PathBuf, issues: &[Issue]) {
    let mut reports = Vec::new();
    for issue in issues {
        reports.push(serde_json::json!({
            "description": issue.message,
            "check_name": issue.kind.as_str(),
            "fingerprint": issue.id,
            "severity": severity_to_gitlab(issue),
            "location": {
                "path": file.display().to_string(),
            }
        }));
    }
    println!("{}", serde_json::to_string_pretty(&reports).unwrap());
}

fn handle_checks(verbose: bool) {
    println!("Available checks:\n");

    let checks = [
        (
            "unconnected_net",
            "Unconnected nets",
            "A net whose electrical node reaches fewer than 2 distinct components",
        ),
        (
            "short_circuit",
            "Short circuits",
            "Two nets that share a pin, or electrically distinct parts at zero clearance",
        ),
        (
            "clearance_violation",
            "Clearance violations",
            "Electrically distinct components closer than the minimum clearance",
        ),
        (
            "board_edge",
            "Board edge",
            "Components outside the outline, or a populated board with no outline",
        ),
        (
            "missing_component",
            "Missing components",
            "A net none of whose connections resolve to a real pin",
        ),
        (
            "invalid_connection",
            "Invalid connections",
            "A connection id naming an unknown component or pin",
        ),
    ];

    for (name, short, long) in &checks {
        println!("  {}", name);
        println!("    {}", short);
        if verbose {
            println!("    {}", long);
        }
        println!();
    }
}
