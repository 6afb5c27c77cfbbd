//! docxmath CLI - turn LaTeX text in Word documents into native equations

use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docxmath::render::to_preview_text;
use docxmath::{
    default_output_path, detect_format_from_path, fix_bytes, inspect_file, preview_text, Engine,
    FixOptions, FixReport,
};

#[derive(Parser)]
#[command(name = "docxmath")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Convert LaTeX formulas in Word documents into native equations", long_about = None)]
struct Cli {
    /// Input .docx file (prompted for when omitted)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output .docx file (default: <stem>_fixed.docx)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// MathML to OMML transform
    #[arg(long, value_enum, global = true, default_value = "xslt")]
    engine: EngineKind,

    /// Path to the MML2OMML.XSL style sheet
    #[arg(long, global = true, env = "DOCXMATH_STYLESHEET", value_name = "FILE")]
    stylesheet: Option<PathBuf>,

    /// XSLT processor used with the style sheet
    #[arg(long, global = true, env = "DOCXMATH_XSLTPROC", value_name = "PROGRAM")]
    xsltproc: Option<String>,

    /// Do not rewrite primes and integral bodies before conversion
    #[arg(long, global = true)]
    no_normalize: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fix formulas in a Word document
    Fix {
        /// Input .docx file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (default: <stem>_fixed.docx)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Preview conversion of ad-hoc text (reads stdin when TEXT is omitted)
    Preview {
        /// Text containing $...$ formulas
        #[arg(value_name = "TEXT")]
        text: Option<String>,

        /// Print the items as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show formula statistics without writing anything
    Info {
        /// Input .docx file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum EngineKind {
    /// MML2OMML style sheet through an XSLT processor
    Xslt,
    /// Built-in MathML to OMML mapping
    Native,
}

impl From<EngineKind> for Engine {
    fn from(kind: EngineKind) -> Self {
        match kind {
            EngineKind::Xslt => Engine::Xslt,
            EngineKind::Native => Engine::Native,
        }
    }
}

impl Cli {
    fn fix_options(&self) -> FixOptions {
        let mut options = FixOptions::new()
            .with_engine(self.engine.into())
            .with_normalize(!self.no_normalize);
        if let Some(ref path) = self.stylesheet {
            options = options.with_stylesheet(path);
        }
        if let Some(ref program) = self.xsltproc {
            options = options.with_xslt_processor(program);
        }
        options
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let options = cli.fix_options();

    let result = match cli.command {
        Some(Commands::Fix {
            input,
            output,
            json,
        }) => cmd_fix(&input, output.as_deref(), json, &options),
        Some(Commands::Preview { text, json }) => cmd_preview(text, json, &options),
        Some(Commands::Info { input }) => cmd_info(&input, &options),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => match cli.input {
            Some(input) => cmd_fix(&input, cli.output.as_deref(), false, &options),
            None => cmd_interactive(&options),
        },
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_fix(
    input: &Path,
    output: Option<&Path>,
    json: bool,
    options: &FixOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input));

    let warned = warn_if_unavailable(options);

    let pb = ProgressBar::new(3);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    pb.set_message("Reading document...");
    let data = fs::read(input)?;
    pb.inc(1);

    pb.set_message("Converting formulas...");
    let fixed = fix_bytes(&data, options)?;
    pb.inc(1);

    pb.set_message("Writing document...");
    fs::write(&output, &fixed.data)?;
    pb.inc(1);

    pb.finish_with_message("Done!");

    if json {
        println!("{}", serde_json::to_string_pretty(&fixed.report)?);
        return Ok(());
    }

    if !warned {
        for warning in &fixed.report.warnings {
            println!("{} {}", "Warning:".yellow().bold(), warning);
        }
    }

    println!();
    print_report(&fixed.report);
    println!();
    if fixed.is_modified() {
        println!("{} {}", "Saved to".green(), output.display());
    } else {
        println!(
            "{} {}",
            "No formulas converted; copied unchanged to".yellow(),
            output.display()
        );
    }

    Ok(())
}

fn cmd_interactive(options: &FixOptions) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "docxmath".cyan().bold());
    println!("Convert $...$ formulas in a Word document into equations.");
    println!();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    let input = prompt(&mut lines, "Input .docx file: ")?;
    if input.is_empty() {
        println!("{}", "Usage: docxmath <FILE> [OUTPUT]".yellow());
        println!("       docxmath --help for more information");
        return Ok(());
    }
    let input = PathBuf::from(input);

    let default = default_output_path(&input);
    let output = prompt(
        &mut lines,
        &format!("Output file [{}]: ", default.display()),
    )?;
    let output = if output.is_empty() {
        default
    } else {
        PathBuf::from(output)
    };

    cmd_fix(&input, Some(&output), false, options)
}

/// Read one answer, stripping surrounding whitespace and quotes.
fn prompt<B: BufRead>(
    lines: &mut io::Lines<B>,
    question: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    print!("{}", question);
    io::stdout().flush()?;
    let answer = lines.next().transpose()?.unwrap_or_default();
    Ok(answer.trim().trim_matches(['"', '\'']).trim().to_string())
}

fn cmd_preview(
    text: Option<String>,
    json: bool,
    options: &FixOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let items = preview_text(text.trim_end_matches(['\r', '\n']), options);
    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        print!("{}", to_preview_text(&items));
    }

    Ok(())
}

fn cmd_info(input: &Path, options: &FixOptions) -> Result<(), Box<dyn std::error::Error>> {
    let format = detect_format_from_path(input)?;
    let warned = warn_if_unavailable(options);
    let report = inspect_file(input, options)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), format);
    println!("{}: {}", "Engine".bold(), options.engine);
    println!();

    if !warned {
        for warning in &report.warnings {
            println!("{} {}", "Warning:".yellow().bold(), warning);
        }
    }
    print_report(&report);

    Ok(())
}

fn print_report(report: &FixReport) {
    println!("{}", "Formula Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Paragraphs".bold(), report.paragraphs_scanned);
    println!("{}: {}", "With $".bold(), report.candidates + report.skipped_protected);
    println!("{}: {}", "Skipped (protected)".bold(), report.skipped_protected);
    println!("{}: {}", "Formulas".bold(), report.formulas_found);
    println!("{}: {}", "Converted".bold(), report.converted.to_string().green());
    println!("{}: {}", "Kept as text".bold(), report.kept_as_text());
    println!(
        "{}: {} ({} in tables)",
        "Paragraphs rewritten".bold(),
        report.paragraphs_rewritten,
        report.table_paragraphs_rewritten
    );
}

/// Print the missing-transform warning once, before any work.
fn warn_if_unavailable(options: &FixOptions) -> bool {
    if options.transform_available() {
        return false;
    }
    println!(
        "{} MML2OMML style sheet not found at {}; formulas will be kept as text",
        "Warning:".yellow().bold(),
        options.stylesheet.display()
    );
    println!("         pass --stylesheet, set DOCXMATH_STYLESHEET, or use --engine native");
    true
}

fn cmd_version() {
    println!("{} {}", "docxmath".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("LaTeX to Word equation converter");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/docxmath".dimmed());
    println!("License: MIT");
}
