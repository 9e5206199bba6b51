//! chatmark - Export chat conversations to Markdown and HTML

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::debug;

use chatmark::export::{ConversationExporter, ExportOptions, Format, MarkdownStyle, Scope};
use chatmark::extract::{SelectorConfig, StaticPage};
use chatmark::util::{decode_html, time_now_millis};
use chatmark::{Error, Node, dom, markdown};

#[derive(Parser)]
#[command(name = "chatmark")]
#[command(version, about = "Export chat conversations to Markdown and HTML", long_about = None)]
#[command(after_help = "EXAMPLES:
    chatmark export chat.html -o chat.md              Export every turn as Markdown
    chatmark export chat.html --scope current --format html --out-dir exports/
    chatmark list chat.html                           Show the turns on a page
    chatmark convert answer.html                      Convert any HTML fragment")]
struct Cli {
    /// Log pipeline progress
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export conversation turns from a saved page
    Export(ExportArgs),
    /// List conversation turns with their labels
    List(PageArgs),
    /// Convert an HTML document or fragment to Markdown
    Convert {
        /// Input HTML file ("-" for stdin)
        #[arg(value_name = "INPUT")]
        input: String,
    },
}

#[derive(Args)]
struct PageArgs {
    /// Saved page HTML ("-" for stdin)
    #[arg(value_name = "INPUT")]
    input: String,

    /// JSON file overriding page selectors
    #[arg(long, value_name = "FILE")]
    selectors: Option<PathBuf>,
}

#[derive(Args)]
struct ExportArgs {
    #[command(flatten)]
    page: PageArgs,

    /// Output document format
    #[arg(long, value_enum, default_value_t = FormatArg::Markdown)]
    format: FormatArg,

    /// Which turns to export
    #[arg(long, value_enum, default_value_t = ScopeArg::All)]
    scope: ScopeArg,

    /// Zero-based turn index for `--scope select`
    #[arg(long, value_name = "N", required_if_eq("scope", "select"))]
    turn: Option<usize>,

    /// Markdown heading layout
    #[arg(long, value_enum, default_value_t = StyleArg::Legacy)]
    style: StyleArg,

    /// Leave reasoning traces out
    #[arg(long)]
    no_thoughts: bool,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE", conflicts_with = "out_dir")]
    output: Option<PathBuf>,

    /// Directory to write a timestamped `gemini_<scope>_<millis>` file into
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Print the extracted turns and both documents as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Markdown,
    Html,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScopeArg {
    All,
    Current,
    Select,
}

#[derive(Clone, Copy, ValueEnum)]
enum StyleArg {
    Legacy,
    Gemini,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Command::Export(args) => export(&args),
        Command::List(args) => list(&args),
        Command::Convert { input } => convert(&input),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn export(args: &ExportArgs) -> Result<(), Error> {
    let exporter = load_exporter(&args.page)?;
    let mut page = load_page(&args.page.input)?;

    let scope = match (args.scope, args.turn) {
        (ScopeArg::All, _) => Scope::All,
        (ScopeArg::Current, _) => Scope::Current,
        (ScopeArg::Select, Some(turn)) => Scope::Select(turn),
        (ScopeArg::Select, None) => Scope::All,
    };
    let style = match args.style {
        StyleArg::Legacy => MarkdownStyle::Legacy,
        StyleArg::Gemini => MarkdownStyle::Gemini,
    };
    let format = match args.format {
        FormatArg::Markdown => Format::Markdown,
        FormatArg::Html => Format::Html,
    };
    let options = ExportOptions::new()
        .scope(scope)
        .markdown_style(style)
        .include_thoughts(!args.no_thoughts);

    let doc = exporter.export(&mut page, &options)?;
    let content = if args.json {
        serde_json::to_string_pretty(&doc)?
    } else {
        doc.content(format).to_string()
    };

    let destination = match (&args.output, &args.out_dir) {
        (Some(path), _) => Some(path.clone()),
        (None, Some(dir)) => Some(timestamped_path(dir, scope, format)),
        (None, None) => None,
    };
    match destination {
        Some(path) => {
            fs::write(&path, content)?;
            eprintln!("Wrote {} turns to {}", doc.turns.len(), path.display());
        }
        None => write_stdout(&content)?,
    }
    Ok(())
}

fn list(args: &PageArgs) -> Result<(), Error> {
    let exporter = load_exporter(args)?;
    let page = load_page(&args.input)?;
    let turns = exporter.list_turns(&page);
    if turns.is_empty() {
        eprintln!("No conversation turns found");
    }
    for turn in turns {
        println!("{}", turn.label);
    }
    Ok(())
}

fn convert(input: &str) -> Result<(), Error> {
    let bytes = read_input(input)?;
    let dom = dom::parse_html(&decode_html(&bytes));
    let markdown = Node::from_dom(&dom, dom.body())
        .map(|node| markdown::extract_markdown(&node))
        .unwrap_or_default();
    write_stdout(&markdown)
}

fn load_exporter(args: &PageArgs) -> Result<ConversationExporter, Error> {
    let config = match &args.selectors {
        Some(path) => {
            debug!("loading selectors from {}", path.display());
            SelectorConfig::from_json(&fs::read_to_string(path)?)?
        }
        None => SelectorConfig::default(),
    };
    ConversationExporter::with_selectors(&config)
}

fn load_page(input: &str) -> Result<StaticPage, Error> {
    Ok(StaticPage::from_bytes(&read_input(input)?))
}

fn read_input(input: &str) -> Result<Vec<u8>, Error> {
    if input == "-" {
        let mut bytes = Vec::new();
        io::stdin().read_to_end(&mut bytes)?;
        return Ok(bytes);
    }
    Ok(fs::read(input)?)
}

fn write_stdout(content: &str) -> Result<(), Error> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(content.as_bytes())?;
    if !content.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    Ok(())
}

/// `<dir>/gemini_<scope>_<unix millis>.<ext>`
fn timestamped_path(dir: &Path, scope: Scope, format: Format) -> PathBuf {
    dir.join(format!(
        "gemini_{}_{}.{}",
        scope.as_str(),
        time_now_millis(),
        format.extension()
    ))
}
