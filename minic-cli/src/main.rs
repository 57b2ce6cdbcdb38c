use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use minic_core::sources::{DEFAULT_EXTENSION, load_sources};
use minic_core::{Compilation, EmitFormat, Pipeline, render_listing};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// minic コンパイラのコマンドライン引数
#[derive(Parser, Debug)]
#[command(version, about = "Compile minic source to three-address code", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "PATH",
        help = "Source file or directory (reads stdin when omitted)"
    )]
    input: Option<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "PATH",
        help = "Output file, or directory when the input is a directory (stdout when omitted)"
    )]
    output: Option<PathBuf>,

    #[arg(
        long,
        value_name = "FORMAT",
        default_value = "ir",
        help = "Output format: ir, tokens, ast, symbols, diagnostics, json"
    )]
    emit: String,

    #[arg(
        long,
        value_name = "EXT",
        default_value = DEFAULT_EXTENSION,
        help = "Extension of source files collected from an input directory"
    )]
    extension: String,

    #[arg(long, help = "Exit with an error when any error diagnostic is reported")]
    check: bool,

    #[arg(long, help = "Treat unused-variable warnings as errors")]
    deny_warnings: bool,

    #[arg(short, long, action = ArgAction::Count, help = "Increase log verbosity")]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    execute(cli)
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn execute(cli: Cli) -> Result<()> {
    let format: EmitFormat = cli.emit.parse()?;
    let mut pipeline = Pipeline::new();

    // ディレクトリ入力では各ファイルを独立した翻訳単位として扱う
    let units = match &cli.input {
        Some(path) if path.is_dir() => {
            let files = load_sources(path, &cli.extension)?;
            if files.is_empty() {
                warn!(root = %path.display(), extension = %cli.extension, "no source files found");
            }
            files
                .into_iter()
                .map(|file| (Some(file.path), file.contents))
                .collect::<Vec<_>>()
        }
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read input file {}", path.display()))?;
            vec![(None, source)]
        }
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            vec![(None, buffer)]
        }
    };

    let mut errors = 0;
    let mut warnings = 0;
    let mut stdout_listing = String::new();

    for (relative, source) in &units {
        let label = relative
            .as_ref()
            .map(|p| p.display().to_string())
            .or_else(|| cli.input.as_ref().map(|p| p.display().to_string()))
            .unwrap_or_else(|| "<stdin>".to_string());
        info!(source = %label, bytes = source.len(), "compiling");

        let compilation = pipeline.compile(source);
        errors += compilation.analysis.errors().count();
        warnings += compilation.analysis.warnings().count();

        if !matches!(format, EmitFormat::Diagnostics | EmitFormat::Json) {
            for diagnostic in &compilation.analysis.diagnostics {
                eprintln!("{label}: {diagnostic}");
            }
        }

        let rendered = render(&compilation, format)?;
        match (&cli.output, relative) {
            (Some(out_dir), Some(relative)) => {
                let target = out_dir.join(relative).with_extension(output_extension(format));
                write_output(&target, rendered.as_bytes())?;
            }
            (Some(out_file), None) => write_output(out_file, rendered.as_bytes())?,
            (None, Some(_)) => {
                stdout_listing.push_str(&format!("== {label} ==\n"));
                stdout_listing.push_str(&rendered);
            }
            (None, None) => stdout_listing.push_str(&rendered),
        }
    }

    if !stdout_listing.is_empty() {
        print!("{stdout_listing}");
    }

    info!(units = units.len(), errors, warnings, "compilation finished");

    if cli.check && errors > 0 {
        bail!("compilation reported {errors} error(s)");
    }
    if cli.deny_warnings && warnings > 0 {
        bail!("compilation reported {warnings} warning(s) and warnings are denied");
    }
    Ok(())
}

fn render(compilation: &Compilation, format: EmitFormat) -> Result<String> {
    let rendered = match format {
        EmitFormat::Ast => {
            let mut json = serde_json::to_string_pretty(&compilation.ast)
                .context("failed to serialize AST")?;
            json.push('\n');
            json
        }
        EmitFormat::Json => {
            let mut json = serde_json::to_string_pretty(compilation)
                .context("failed to serialize compilation")?;
            json.push('\n');
            json
        }
        _ => render_listing(compilation, format),
    };
    Ok(rendered)
}

fn output_extension(format: EmitFormat) -> &'static str {
    match format {
        EmitFormat::Ir => "ir",
        EmitFormat::Tokens => "tokens",
        EmitFormat::Symbols => "symbols",
        EmitFormat::Diagnostics => "diagnostics",
        EmitFormat::Ast | EmitFormat::Json => "json",
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {parent:?}"))?;
        }
    }
    fs::write(path, bytes)
        .with_context(|| format!("failed to write output file {}", path.display()))?;
    Ok(())
}
