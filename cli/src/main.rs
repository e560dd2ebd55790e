//! docmerge CLI - merge Word documents into one
//!
//! Inputs saved in a legacy compatibility mode are normalized on temporary
//! working copies before merging; the originals are never touched.

use clap::{ArgAction, Parser};
use colored::*;
use docmerge::{
    detect_format, inspect_file, normalize, sample, CompatSettings, Error, MergeOptions,
    MergeRequest, NormalizeOptions, WordFormat,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const DEFAULT_TEST_DIR: &str = "test_documents";

/// Merge Word documents with compatibility-mode normalization
#[derive(Parser)]
#[command(
    name = "docmerge",
    author = "iyulab",
    version,
    about = "Merge Word documents into one",
    long_about = "docmerge - Merge DOCX documents in order into a single document.\n\n\
                  Documents saved in a legacy compatibility mode are normalized on a\n\
                  temporary copy first. The last path is the output document.",
    after_help = "Examples:\n  \
                  docmerge intro.docx body.docx merged.docx\n  \
                  docmerge --continue-on-error a.docx b.docx c.docx out.docx\n  \
                  docmerge --test-compat legacy.docx"
)]
struct Cli {
    /// Input documents followed by the output path
    #[arg(
        value_name = "FILES",
        required_unless_present_any = ["create_test", "test_compat"]
    )]
    files: Vec<PathBuf>,

    /// Skip inputs that cannot be processed instead of aborting
    #[arg(long)]
    continue_on_error: bool,

    /// Do not start appended documents in a new section
    #[arg(long)]
    no_keep_sections: bool,

    /// Directory for normalized working copies (default: system temp)
    #[arg(long, value_name = "DIR")]
    temp_dir: Option<PathBuf>,

    /// Print the merge report as JSON
    #[arg(long)]
    json: bool,

    /// Write a set of sample documents and exit
    #[arg(long, conflicts_with = "test_compat")]
    create_test: bool,

    /// Directory for --create-test
    #[arg(long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Check normalization of the given documents (default: a generated sample set)
    #[arg(long, value_name = "FILES", num_args = 0..)]
    test_compat: Option<Vec<PathBuf>>,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut normalize_options = NormalizeOptions::new();
    if let Some(dir) = &cli.temp_dir {
        normalize_options = normalize_options.with_temp_dir(dir);
    }

    if cli.create_test {
        let dir = cli.dir.as_deref().unwrap_or(Path::new(DEFAULT_TEST_DIR));
        return create_test(dir);
    }

    if let Some(files) = &cli.test_compat {
        return test_compat(files, &normalize_options);
    }

    let options = MergeOptions::new()
        .with_fail_fast(!cli.continue_on_error)
        .with_keep_sections(!cli.no_keep_sections)
        .with_normalize_options(normalize_options);
    merge_documents(&cli.files, options, cli.json)
}

fn merge_documents(
    files: &[PathBuf],
    options: MergeOptions,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (output, inputs) = match files.split_last() {
        Some((output, inputs)) if inputs.len() >= 2 => (output, inputs),
        _ => return Err("at least two input documents and an output path are required".into()),
    };

    let request = MergeRequest::new(inputs, output).with_options(options);

    let pb = create_spinner(&format!("Merging {} documents...", inputs.len()));
    let result = docmerge::merge(&request);
    pb.finish_and_clear();
    let report = result?;

    if json {
        println!("{}", report.to_json(true)?);
        return Ok(());
    }

    for skipped in &report.skipped {
        println!(
            "{} Skipped {}: {}",
            "!".yellow().bold(),
            skipped.path.display(),
            skipped.reason
        );
    }
    if !report.normalized.is_empty() {
        println!(
            "{} Normalized {} legacy document(s)",
            "✓".green().bold(),
            report.normalized.len()
        );
    }
    println!(
        "{} Merged {} documents into {}",
        "✓".green().bold(),
        report.merged.len(),
        report.output.display()
    );

    Ok(())
}

fn create_test(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let paths = sample::create_test_set(dir)?;

    println!(
        "{} Created {} test documents in {}",
        "✓".green().bold(),
        paths.len(),
        dir.display()
    );
    for path in &paths {
        println!("  {}", path.display());
    }

    let inputs: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
    println!();
    println!(
        "Try: docmerge {} {}",
        inputs.join(" "),
        dir.join("merged.docx").display()
    );
    Ok(())
}

/// Result of checking one document.
struct CompatCheck {
    format: WordFormat,
    before: CompatSettings,
    after: CompatSettings,
    modified: bool,
}

fn test_compat(
    files: &[PathBuf],
    options: &NormalizeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    // Holds the generated set, if any, until the checks are done.
    let scratch = tempfile::tempdir()?;
    let files = if files.is_empty() {
        sample::create_test_set(scratch.path())?
    } else {
        files.to_vec()
    };

    println!("{}", "Compatibility Check".cyan().bold());
    println!("{}", "─".repeat(40));

    let mut failures = 0;
    for path in &files {
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        match check_file(path, options) {
            Ok(check) => print_check(&name, &check),
            Err(e) => {
                failures += 1;
                println!("{} {}: {}", "✗".red().bold(), name.bold(), e);
            }
        }
    }

    println!("{}", "─".repeat(40));
    if failures > 0 {
        return Err(format!(
            "{} of {} documents failed the compatibility check",
            failures,
            files.len()
        )
        .into());
    }
    println!("{} All {} documents passed", "✓".green().bold(), files.len());
    Ok(())
}

fn check_file(path: &Path, options: &NormalizeOptions) -> docmerge::Result<CompatCheck> {
    let format = detect_format(path)?;
    let before = inspect_file(path, options.compat_version)?;

    let outcome = normalize(path, options);
    if let Some(detail) = &outcome.error_detail {
        return Err(Error::Normalization {
            path: path.to_path_buf(),
            detail: detail.clone(),
        });
    }

    let after = inspect_file(&outcome.resolved_location, options.compat_version)?;
    if after.has_legacy_mode() {
        return Err(Error::InvalidData(format!(
            "legacy settings survived normalization: {}",
            after.legacy_flags.join(", ")
        )));
    }

    let again = normalize(&outcome.resolved_location, options);
    if !again.succeeded() || again.was_modified {
        return Err(Error::InvalidData(
            "normalizing the normalized copy changed it again".to_string(),
        ));
    }

    Ok(CompatCheck {
        format,
        before,
        after,
        modified: outcome.was_modified,
    })
}

fn print_check(name: &str, check: &CompatCheck) {
    if !check.modified {
        println!(
            "{} {} ({}): no legacy compatibility mode",
            "✓".green().bold(),
            name.bold(),
            check.format
        );
        return;
    }

    println!(
        "{} {} ({}): normalized {} legacy setting(s)",
        "✓".green().bold(),
        name.bold(),
        check.format,
        check.before.legacy_flags.len()
    );
    println!("    {}: {}", "Removed".bold(), check.before.legacy_flags.join(", "));
    if check.before.forms_protection {
        println!("    {}: forms-only document protection", "Removed".bold());
    }
    println!(
        "    {}: {}",
        "Mode".bold(),
        describe_mode(check.after.compatibility_mode)
    );
}

fn describe_mode(mode: Option<u32>) -> String {
    match mode {
        Some(version) => format!("compatibilityMode {}", version),
        None => "none".to_string(),
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_merge_flags() {
        let cli = Cli::try_parse_from([
            "docmerge",
            "--continue-on-error",
            "-vv",
            "a.docx",
            "b.docx",
            "out.docx",
        ])
        .unwrap();
        assert!(cli.continue_on_error);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.files.len(), 3);
    }

    #[test]
    fn test_files_required_for_merge() {
        assert!(Cli::try_parse_from(["docmerge"]).is_err());
        assert!(Cli::try_parse_from(["docmerge", "--create-test"]).is_ok());
        assert!(Cli::try_parse_from(["docmerge", "--test-compat"]).is_ok());
    }

    #[test]
    fn test_too_few_inputs() {
        let result = merge_documents(
            &[PathBuf::from("a.docx"), PathBuf::from("out.docx")],
            MergeOptions::default(),
            false,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_check_file_reports_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.docx");
        sample::SampleDocument::new("Legacy")
            .with_legacy_compat(14)
            .write_to(&path)
            .unwrap();

        let check = check_file(&path, &NormalizeOptions::default()).unwrap();
        assert_eq!(check.format, WordFormat::Document);
        assert_eq!(check.format.name(), "Word Document");
        assert!(check.modified);
        assert!(check.before.has_legacy_mode());
        assert!(!check.after.has_legacy_mode());
    }

    #[test]
    fn test_describe_mode() {
        assert_eq!(describe_mode(Some(16)), "compatibilityMode 16");
        assert_eq!(describe_mode(None), "none");
    }
}
