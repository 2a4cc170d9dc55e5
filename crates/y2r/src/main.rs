use anyhow::{Context as _, Result, anyhow};
use clap::{ArgAction, Parser};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use y2r::y2r_ruby::RubyWriter;
use y2r::y2r_ycp::{Reader, reader_for_extension, reader_for_format};
use y2r::{CONFIG_FILE, Options, translate};

/// Translate a YCP node tree to Ruby.
#[derive(Debug, Parser)]
#[command(name = "y2r", version, about = "Translate YCP node trees to Ruby")]
struct Cli {
    /// Node tree file (`.xml` or `.json`), or `-` for XML on stdin
    input: String,

    /// Input format, overriding the file extension
    #[arg(long, value_parser = ["xml", "json"])]
    format: Option<String>,

    /// Write Ruby to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Publish non-global module symbols, marked private
    #[arg(long)]
    export_private: bool,

    /// Configuration file (default: y2r.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the Ruby AST as JSON instead of source
    #[arg(long)]
    dump_ast: bool,

    /// Increase logging verbosity (-v: debug, -vv+: trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(cli.verbose))),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(&cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn directive_for_verbosity(v: u8) -> &'static str {
    match v {
        0 => "warn",
        1 => "y2r=debug,y2r_ycp=debug",
        _ => "y2r=trace,y2r_ycp=trace",
    }
}

fn run(cli: &Cli) -> Result<()> {
    let options = load_options(cli)?;
    let reader = select_reader(cli)?;

    let source = if cli.input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        text
    } else {
        std::fs::read_to_string(&cli.input)
            .with_context(|| format!("failed to read {}", cli.input))?
    };

    let node = reader
        .read(&source)
        .with_context(|| format!("failed to read node tree from {}", cli.input))?;
    let ruby = translate(&node, &options)
        .with_context(|| format!("failed to translate {}", cli.input))?;

    let text = if cli.dump_ast {
        let mut json = serde_json::to_string_pretty(&ruby)?;
        json.push('\n');
        json
    } else {
        RubyWriter::emit(&ruby)
    };

    match &cli.output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => std::io::stdout()
            .write_all(text.as_bytes())
            .context("failed to write stdout")?,
    }
    Ok(())
}

/// Configuration file first, then command-line flags on top.
fn load_options(cli: &Cli) -> Result<Options> {
    let mut options = match &cli.config {
        Some(path) => Options::load(path)?,
        None => Options::load_or_default(Path::new(CONFIG_FILE))?,
    };
    if cli.export_private {
        options.export_private = true;
    }
    tracing::debug!(?options, "loaded options");
    Ok(options)
}

fn select_reader(cli: &Cli) -> Result<&'static dyn Reader> {
    if let Some(format) = &cli.format {
        return reader_for_format(format).ok_or_else(|| anyhow!("unknown format `{format}`"));
    }
    if cli.input == "-" {
        return reader_for_format("xml").ok_or_else(|| anyhow!("no xml reader"));
    }
    let ext = Path::new(&cli.input)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    reader_for_extension(ext).ok_or_else(|| {
        anyhow!(
            "cannot tell the format of {} from its extension; use --format",
            cli.input
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("y2r").chain(args.iter().copied()))
    }

    #[test]
    fn test_reader_selection() {
        assert_eq!(select_reader(&cli(&["a.xml"])).unwrap().format(), "xml");
        assert_eq!(select_reader(&cli(&["a.json"])).unwrap().format(), "json");
        assert_eq!(select_reader(&cli(&["-"])).unwrap().format(), "xml");
        assert_eq!(
            select_reader(&cli(&["--format", "json", "tree.out"]))
                .unwrap()
                .format(),
            "json"
        );
        assert!(select_reader(&cli(&["a.ycp"])).is_err());
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let parsed = cli(&["--config", "/nonexistent/y2r.toml", "a.xml"]);
        assert!(load_options(&parsed).is_err());
    }

    #[test]
    fn test_flags() {
        let parsed = cli(&["-vv", "--export-private", "--dump-ast", "-o", "out.rb", "a.xml"]);
        assert_eq!(parsed.verbose, 2);
        assert!(parsed.export_private);
        assert!(parsed.dump_ast);
        assert_eq!(parsed.output, Some(PathBuf::from("out.rb")));
    }

    #[test]
    fn test_directive_defaults() {
        assert_eq!(directive_for_verbosity(0), "warn");
        assert_eq!(directive_for_verbosity(1), "y2r=debug,y2r_ycp=debug");
        assert_eq!(directive_for_verbosity(5), "y2r=trace,y2r_ycp=trace");
    }
}
