use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;

use asmlens::{AsmEdgeKind, Dialect, Disassembler, RenderOptions, SourceLineReader};

/// Multi-dialect assembly listing analyzer
#[derive(Parser)]
#[command(name = "asmlens", version, about)]
struct Cli {
    /// Input assembly listing file
    input: String,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Dialect of the listing
    #[arg(short, long, default_value = "intel")]
    dialect: String,

    /// Print the block graph instead of the rendered listing
    #[arg(long)]
    graph: bool,

    /// Disable color tags in the rendered output
    #[arg(long)]
    no_color: bool,

    /// Use the light color palette
    #[arg(long)]
    light: bool,

    /// Directory to resolve relative debug-info source paths against
    #[arg(long)]
    source_root: Option<PathBuf>,

    /// Show additional debug information
    #[arg(short, long)]
    verbose: bool,
}

/// Loads the source files named by `.file` directives from disk. Any read
/// failure means the location headers render without quoted source text.
struct FsSourceReader {
    source_root: Option<PathBuf>,
}

impl SourceLineReader for FsSourceReader {
    fn read_all_lines(&self, path: &str) -> Option<Vec<String>> {
        let mut resolved = PathBuf::from(path);
        if resolved.is_relative() {
            if let Some(root) = &self.source_root {
                resolved = root.join(resolved);
            }
        }
        let text = std::fs::read_to_string(&resolved).ok()?;
        Some(text.lines().map(str::to_owned).collect())
    }
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init();

    let listing = match std::fs::read_to_string(&cli.input) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading '{}': {}", cli.input, e);
            process::exit(1);
        }
    };

    let dialect = Dialect::from_name(&cli.dialect).unwrap_or_else(|| {
        eprintln!(
            "Unknown dialect '{}'. Use: intel, arm, wasm, llvm-ir",
            cli.dialect
        );
        process::exit(1);
    });

    let reader = FsSourceReader {
        source_root: cli
            .source_root
            .clone()
            .or_else(|| Path::new(&cli.input).parent().map(Path::to_path_buf)),
    };
    let options = RenderOptions {
        dark_theme: !cli.light,
        colored: !cli.no_color,
    };

    let mut disasm = Disassembler::new();
    if !disasm.initialize(&listing, dialect, &reader, options) {
        eprintln!("Error analyzing '{}': listing did not parse", cli.input);
        process::exit(1);
    }

    let output_text = if cli.graph {
        format_graph(&disasm)
    } else {
        disasm.render_full_text()
    };

    if let Some(path) = &cli.output {
        if let Err(e) = std::fs::write(path, &output_text) {
            eprintln!("Error writing '{}': {}", path, e);
            process::exit(1);
        }
    } else {
        print!("{output_text}");
    }
}

fn format_graph(disasm: &Disassembler) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Listing: {} tokens, {} lines, {} blocks",
        disasm.tokens().len(),
        disasm.lines().len(),
        disasm.blocks().len()
    );

    for (index, block) in disasm.blocks().iter().enumerate() {
        let _ = writeln!(
            out,
            "  Block {:3}: {:<10} lines {}..{}",
            index,
            format!("{:?}", block.kind),
            block.line_index,
            block.line_index + block.line_count
        );
        for edge in &block.edges {
            let arrow = match edge.kind {
                AsmEdgeKind::OutBound => "->",
                AsmEdgeKind::InBound => "<-",
            };
            let other = match edge.kind {
                AsmEdgeKind::OutBound => edge.target,
                AsmEdgeKind::InBound => edge.origin,
            };
            let _ = writeln!(
                out,
                "             {} block {} (line {})",
                arrow, other.block, other.line
            );
        }
    }
    out
}
