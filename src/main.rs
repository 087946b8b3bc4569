use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use grammar_table_helper::{FirstFollow, Grammar};
use serde::Serialize;
use std::{fs, io::Read, path::PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Eliminate immediate left recursion before any output.
    #[arg(short = 'e', long)]
    eliminate_left_recursion: bool,

    /// Left factor the grammar (after left recursion elimination).
    #[arg(short = 'f', long)]
    left_factor: bool,

    /// Use this nonterminal as the start symbol instead of the first one.
    #[arg(short, long)]
    start: Option<String>,

    /// What to print, comma separated.
    #[arg(short, long = "output", value_enum, value_delimiter = ',', required = true)]
    outputs: Vec<Output>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    format: OutputFormat,

    /// The grammar file. Read from stdin when omitted.
    input: Option<PathBuf>,
}

#[derive(Debug, Copy, Clone, PartialEq, ValueEnum)]
enum Output {
    /// Productions
    Prod,
    /// FIRST and FOLLOW sets
    Ff,
    /// LL(1) parsing table
    Ll1,
    /// LR(0) automaton
    Lr0,
    /// SLR(1) ACTION/GOTO table
    Slr,
}

#[derive(Debug, Copy, Clone, PartialEq, ValueEnum)]
enum OutputFormat {
    Plain,
    Json,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!("parsed CLI args = {:?}", args);

    let input = match &args.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read the grammar from stdin")?;
            buf
        }
    };

    // skipped lines and transformer diagnostics are logged at warn level
    let mut g = Grammar::parse(&input)
        .context("failed to parse the grammar")?
        .grammar;
    if let Some(start) = &args.start {
        g = g.with_start_symbol(start)?;
    }
    if args.eliminate_left_recursion {
        g = g.eliminate_left_recursion().grammar;
    }
    if args.left_factor {
        g = g.left_factor();
    }

    for output in &args.outputs {
        println!("{}", render(&g, *output, args.format)?);
    }

    Ok(())
}

fn render_as<T: Serialize>(
    value: &T,
    plain: impl FnOnce(&T) -> String,
    output_format: OutputFormat,
) -> anyhow::Result<String> {
    Ok(match output_format {
        OutputFormat::Plain => plain(value),
        OutputFormat::Json => serde_json::to_string(value)?,
    })
}

fn render(g: &Grammar, output: Output, output_format: OutputFormat) -> anyhow::Result<String> {
    match output {
        Output::Prod => {
            let t = g.to_production_output_vec();
            render_as(&t, |t| t.to_plaintext(), output_format)
        }
        Output::Ff => {
            let sets = FirstFollow::new(g);
            let t = g.to_non_terminal_output_vec(&sets);
            render_as(&t, |t| t.to_plaintext(), output_format)
        }
        Output::Ll1 => {
            let sets = FirstFollow::new(g);
            let table = g.generate_ll1_parsing_table(&sets);
            let t = table.to_output();
            render_as(&t, |t| t.to_plaintext(), output_format)
        }
        Output::Lr0 => {
            let t = g.to_lr0_automaton()?.to_output();
            render_as(&t, |t| t.to_plaintext(), output_format)
        }
        Output::Slr => {
            let automaton = g.to_lr0_automaton()?;
            let table = automaton.to_parsing_table();
            let t = table.to_output();
            render_as(&t, |t| t.to_plaintext(), output_format)
        }
    }
}
