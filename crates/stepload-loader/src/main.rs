use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use stepload_lexer::{Lexer, TokenKind};

use stepload_loader::paths::absolutize;
use stepload_loader::recording::{RecordingHost, RecordingRegistry};
use stepload_loader::rewriter::RewriteError;
use stepload_loader::{
    classify, find_package_root, LoaderConfig, PackageRoot, RemapTable, ResolutionPolicy, SupportCodeLoader,
};

#[derive(Parser)]
#[command(
    name = "stepload",
    version = "0.1.0",
    about = "Support-code loader for BDD step definitions",
    long_about = "Inspects how step definition and hook files would be loaded:\nspecifier classification, project root discovery, source rewriting\nand the full load plan for a config file."
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify dependency specifiers as absolute, relative or bare
    Classify {
        /// Specifiers to classify
        #[arg(required = true)]
        specifiers: Vec<String>,
    },

    /// Find the nearest directory containing node_modules
    Root {
        /// Directory or file to start from (defaults to the current directory)
        #[arg(long)]
        from: Option<PathBuf>,
    },

    /// Rewrite a support file and print the result
    Rewrite {
        /// Input JavaScript file
        input: PathBuf,

        /// What a resolved specifier replaces
        #[arg(long, default_value = "path")]
        mode: ModeArg,

        /// Project root for path mode (located from the input when absent)
        #[arg(long)]
        project_root: Option<PathBuf>,

        /// Extra remap entry for statement mode, as SPECIFIER=IDENTIFIER
        #[arg(long = "binding", value_name = "SPECIFIER=IDENTIFIER")]
        bindings: Vec<String>,
    },

    /// Run a load against a recording host and print every step
    Plan {
        /// JSON loader config
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Lex a JavaScript file and show tokens (debug)
    Tokens {
        /// Input JavaScript file
        input: PathBuf,

        /// Show token positions
        #[arg(short, long)]
        positions: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Replace the require argument with an installed package path
    Path,
    /// Replace the whole require call with a context identifier
    Statement,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env().filter_level(level).init();

    match cli.command {
        Commands::Classify { specifiers } => classify_command(&specifiers),
        Commands::Root { from } => root_command(from),
        Commands::Rewrite {
            input,
            mode,
            project_root,
            bindings,
        } => rewrite_command(input, mode, project_root, &bindings),
        Commands::Plan { config } => plan_command(config),
        Commands::Tokens { input, positions } => tokens_command(input, positions),
    }
}

fn classify_command(specifiers: &[String]) -> ExitCode {
    for specifier in specifiers {
        println!("{:10} {}", classify(specifier).to_string(), specifier);
    }
    ExitCode::SUCCESS
}

fn root_command(from: Option<PathBuf>) -> ExitCode {
    let start = match from.map(Ok).unwrap_or_else(std::env::current_dir) {
        Ok(start) => start,
        Err(e) => {
            eprintln!("Error determining current directory: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match find_package_root(&start) {
        Some(root) => {
            println!("{}", root.dir().display());
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("No node_modules directory found at or above {}", start.display());
            ExitCode::FAILURE
        }
    }
}

fn rewrite_command(input: PathBuf, mode: ModeArg, project_root: Option<PathBuf>, bindings: &[String]) -> ExitCode {
    if let Err(message) = check_rewrite_flags(mode, project_root.as_deref(), bindings) {
        eprintln!("Error: {}", message);
        return ExitCode::FAILURE;
    }

    let source = match fs::read_to_string(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let filename = input.to_string_lossy().to_string();

    let root;
    let mut remap = RemapTable::default();
    let policy = match mode {
        ModeArg::Path => {
            root = match locate_root(&input, project_root) {
                Some(root) => root,
                None => {
                    eprintln!("No node_modules directory found for {}; pass --project-root", filename);
                    return ExitCode::FAILURE;
                }
            };
            ResolutionPolicy::InstalledPackage(&root)
        }
        ModeArg::Statement => {
            for binding in bindings {
                match binding.split_once('=') {
                    Some((specifier, identifier)) if !specifier.is_empty() && !identifier.is_empty() => {
                        remap.insert(specifier, identifier);
                    }
                    _ => {
                        eprintln!("Invalid binding '{}': expected SPECIFIER=IDENTIFIER", binding);
                        return ExitCode::FAILURE;
                    }
                }
            }
            ResolutionPolicy::ContextBinding(&remap)
        }
    };

    match policy.rewrite(&source, &filename) {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            report_rewrite_error(&err, &filename, &source);
            ExitCode::FAILURE
        }
    }
}

fn plan_command(config_path: PathBuf) -> ExitCode {
    let config = match LoaderConfig::from_json_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            report_chain(&e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let host = RecordingHost::new();
    let mut registry = RecordingRegistry::new();
    let result = runtime.block_on(async {
        let mut loader = SupportCodeLoader::new(&mut registry, &host, &host, &host);
        loader.load(&config).await
    });

    println!("Load plan for {}:\n", config_path.display());
    println!("{}", "=".repeat(80));
    for (i, action) in host.actions().iter().enumerate() {
        println!("{:4} | {}", i, action);
    }
    println!("{}", "=".repeat(80));

    match result {
        Ok(snapshot) => {
            println!("\nFinalized library {} for {}", snapshot.library_id, snapshot.cwd.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            report_chain(&e);
            ExitCode::FAILURE
        }
    }
}

fn tokens_command(input: PathBuf, positions: bool) -> ExitCode {
    let source = match fs::read_to_string(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let filename = input.to_string_lossy().to_string();

    let mut lexer = Lexer::new(&source);
    let tokens = lexer.tokenize();

    println!("Tokens for {}:\n", filename);
    println!("{}", "=".repeat(80));

    for (i, token) in tokens.iter().enumerate() {
        if token.kind == TokenKind::Eof {
            println!("\n{:4} | {:?}", i, token.kind);
            break;
        }

        if positions {
            println!(
                "{:4} | {:20?} | {:?} | {}..{}",
                i, token.kind, token.value, token.span.start, token.span.end
            );
        } else {
            println!("{:4} | {:20?} | {:?}", i, token.kind, token.value);
        }
    }

    println!("{}", "=".repeat(80));
    println!("\nTotal tokens: {}", tokens.len());

    let mut failed = false;
    for token in tokens.iter().filter(|t| t.kind == TokenKind::Error) {
        failed = true;
        report_error(
            "E0001",
            "Lexical error",
            &token.value,
            token.span.start,
            token.span.end,
            &filename,
            &source,
        );
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

// Helper functions

/// Rejects flags the chosen rewrite mode would ignore.
fn check_rewrite_flags(mode: ModeArg, project_root: Option<&Path>, bindings: &[String]) -> Result<(), String> {
    match mode {
        ModeArg::Path if !bindings.is_empty() => Err("--binding only applies to --mode statement".to_string()),
        ModeArg::Statement if project_root.is_some() => {
            Err("--project-root only applies to --mode path".to_string())
        }
        _ => Ok(()),
    }
}

fn locate_root(input: &Path, project_root: Option<PathBuf>) -> Option<PackageRoot> {
    let cwd = std::env::current_dir().ok()?;
    match project_root {
        Some(dir) => Some(PackageRoot::new(absolutize(&dir, &cwd))),
        None => find_package_root(&absolutize(input, &cwd)),
    }
}

fn report_rewrite_error(err: &RewriteError, filename: &str, source: &str) {
    match err {
        RewriteError::Parse { errors, .. } => {
            for e in errors {
                report_error("E1000", "Parse error", &e.message, e.span.start, e.span.end, filename, source);
            }
        }
        RewriteError::InvalidReplacement {
            specifier,
            replacement,
            span,
            ..
        } => {
            let message = format!("'{}' would be replaced by '{}', which is not an expression", specifier, replacement);
            report_error("E2000", "Invalid replacement", &message, span.start, span.end, filename, source);
        }
        RewriteError::EmptyOutput { .. } => eprintln!("Error: {}", err),
    }
}

fn report_chain(err: &dyn Error) {
    eprintln!("Error: {}", err);
    let mut cause = err.source();
    while let Some(e) = cause {
        eprintln!("  caused by: {}", e);
        cause = e.source();
    }
}

fn report_error(code: &str, title: &str, message: &str, start: usize, end: usize, filename: &str, source: &str) {
    let span = (filename, start..end);
    let printed = Report::build(ReportKind::Error, span.clone())
        .with_code(code)
        .with_message(title)
        .with_label(
            Label::new(span)
                .with_message(message)
                .with_color(Color::Red),
        )
        .finish()
        .print((filename, Source::from(source)));
    if let Err(e) = printed {
        eprintln!("{}: {} ({})", filename, message, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite_flags(args: &[&str]) -> Result<(), String> {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Rewrite {
                mode,
                project_root,
                bindings,
                ..
            } => check_rewrite_flags(mode, project_root.as_deref(), &bindings),
            _ => panic!("expected the rewrite command"),
        }
    }

    #[test]
    fn test_rewrite_rejects_flags_of_the_other_mode() {
        let err = rewrite_flags(&["stepload", "rewrite", "a.js", "--binding", "x=X"]).unwrap_err();
        assert!(err.contains("--binding"));

        let err = rewrite_flags(&["stepload", "rewrite", "a.js", "--mode", "statement", "--project-root", "/p"]).unwrap_err();
        assert!(err.contains("--project-root"));
    }

    #[test]
    fn test_rewrite_accepts_flags_of_its_mode() {
        assert!(rewrite_flags(&["stepload", "rewrite", "a.js", "--project-root", "/p"]).is_ok());
        assert!(rewrite_flags(&["stepload", "rewrite", "a.js", "--mode", "statement", "--binding", "x=X"]).is_ok());
    }
}
