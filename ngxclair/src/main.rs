//! ngxclair - nginx configuration tooling
//!
//! This is the main entry point for the ngxclair CLI.

mod report;

use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand};
use ngxclair_config::{
    compile_output, minify, parser::tokenize_file, BuildOptions, Builder, JsonAdapter, LexOptions, ParseOptions,
    ParseOutput,
};
use ngxclair_core::Settings;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "ngxclair")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file (default: ./ngxclair.toml, then the user config directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a configuration into a JSON payload
    Parse {
        file: String,

        /// Indent the JSON by this many spaces
        #[arg(long)]
        indent: Option<usize>,

        /// Write the payload here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Directives to drop from the tree
        #[arg(long, value_delimiter = ',')]
        ignore: Vec<String>,

        /// Stop each file at its first error
        #[arg(long)]
        no_catch: bool,

        /// Do not follow includes
        #[arg(long)]
        single_file: bool,

        /// Keep comments in the payload
        #[arg(long)]
        include_comments: bool,

        /// Reject unknown directives
        #[arg(long)]
        strict: bool,

        /// Splice included files into one config
        #[arg(long)]
        combine: bool,
    },

    /// Write configuration files from a JSON payload
    Build {
        payload: PathBuf,

        #[command(flatten)]
        layout: Layout,

        /// Prefix each file with a banner
        #[arg(long)]
        header: bool,

        /// Base directory for relative file names
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,

        /// Print instead of writing files
        #[arg(long)]
        stdout: bool,
    },

    /// Print the token stream of a configuration file
    Lex {
        file: String,

        /// Pair each token with its line
        #[arg(short = 'n', long)]
        line_numbers: bool,

        #[arg(long)]
        indent: Option<usize>,
    },

    /// Rebuild a configuration file with consistent layout
    Format {
        file: String,

        #[command(flatten)]
        layout: Layout,

        /// Overwrite the file in place
        #[arg(short, long)]
        write: bool,
    },

    /// Print a configuration file on a single line
    Minify { file: String },

    /// Check a configuration and report every problem
    Validate {
        file: String,

        /// Reject unknown directives
        #[arg(long)]
        strict: bool,
    },

    /// Print the compiled proxy model as JSON
    Inspect { file: String },

    /// Show version information
    Version,
}

#[derive(clap::Args)]
struct Layout {
    /// Spaces per nesting level
    #[arg(long, conflicts_with = "tabs")]
    indent: Option<usize>,

    /// Indent with tabs
    #[arg(long)]
    tabs: bool,
}

impl Layout {
    fn apply(&self, options: &mut BuildOptions) {
        if let Some(indent) = self.indent {
            options.indent = indent;
        }
        if self.tabs {
            options.tabs = true;
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let settings = Settings::load(cli.settings.as_deref())?;
    let parse_defaults = ParseOptions::from_settings(&settings.parse);
    let build_defaults = BuildOptions::from_settings(&settings.format);

    match cli.command {
        Commands::Parse {
            file,
            indent,
            out,
            ignore,
            no_catch,
            single_file,
            include_comments,
            strict,
            combine,
        } => {
            let mut options = parse_defaults;
            options.ignore.extend(ignore);
            options.catch_errors &= !no_catch;
            options.single_file |= single_file;
            options.comments |= include_comments;
            options.strict |= strict;
            options.combine |= combine;

            let output = ngxclair_config::parse_file(&file, options);
            let payload = JsonAdapter::serialize(&output, indent)?;
            match out {
                Some(path) => std::fs::write(&path, payload + "\n")
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{}", payload),
            }
        }

        Commands::Build {
            payload,
            layout,
            header,
            dir,
            force,
            stdout,
        } => {
            let mut options = build_defaults;
            layout.apply(&mut options);
            options.header |= header;
            build_payload(&payload, options, dir, force, stdout)?;
        }

        Commands::Lex {
            file,
            line_numbers,
            indent,
        } => {
            let source = std::fs::read_to_string(&file).with_context(|| format!("failed to read {}", file))?;
            let tokens = tokenize_file(&source, &file, &LexOptions::default())?;
            let json = if line_numbers {
                let pairs: Vec<(String, usize)> = tokens.into_iter().map(|t| (t.text, t.line)).collect();
                JsonAdapter::to_string(&pairs, indent)?
            } else {
                let texts: Vec<String> = tokens.into_iter().map(|t| t.text).collect();
                JsonAdapter::to_string(&texts, indent)?
            };
            println!("{}", json);
        }

        Commands::Format { file, layout, write } => {
            let mut options = build_defaults;
            layout.apply(&mut options);
            // rewriting must keep every directive the file holds
            let parse_options = ParseOptions {
                comments: true,
                single_file: true,
                combine: false,
                ignore: HashSet::new(),
                ..parse_defaults
            };
            let output = ngxclair_config::parse_file(&file, parse_options);
            ensure_clean(&output)?;

            let text = Builder::new(options).build(&output.tree, output.roots()) + "\n";
            if write {
                write_preserving_permissions(Path::new(&file), &text)?;
                tracing::info!("Formatted {}", file);
            } else {
                print!("{}", text);
            }
        }

        Commands::Minify { file } => {
            let options = ParseOptions {
                single_file: true,
                catch_errors: false,
                check_ctx: false,
                check_args: false,
                comments: false,
                strict: false,
                ..parse_defaults
            };
            let output = ngxclair_config::parse_file(&file, options);
            ensure_clean(&output)?;
            println!("{}", minify(&output.tree, output.roots()));
        }

        Commands::Validate { file, strict } => {
            let mut options = parse_defaults;
            options.strict |= strict;
            let output = ngxclair_config::parse_file(&file, options);

            if !output.is_ok() {
                let mut cache = report::SourceCache::default();
                for error in &output.errors {
                    eprint!("{}", report::render(error, &mut cache));
                    if let Some(note) = report::stopped_note(error) {
                        eprintln!("{}", note);
                    }
                }
                eprintln!("configuration file {} test failed ({} errors)", file, output.errors.len());
                std::process::exit(1);
            }
            if let Err(e) = compile_output(&output) {
                eprintln!("error: {}", e);
                eprintln!("configuration file {} test failed", file);
                std::process::exit(1);
            }
            println!("configuration file {} syntax is ok", file);
        }

        Commands::Inspect { file } => {
            let config = ngxclair_config::compile_file(&file, parse_defaults)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }

        Commands::Version => {
            println!("ngxclair v{}", ngxclair_core::VERSION);
        }
    }

    Ok(())
}

/// Fail with every parse error when the parse was not clean
fn ensure_clean(output: &ParseOutput) -> anyhow::Result<()> {
    if output.is_ok() {
        return Ok(());
    }
    let lines: Vec<String> = output.errors.iter().map(ToString::to_string).collect();
    bail!("{}", lines.join("\n"))
}

fn build_payload(
    payload: &Path,
    options: BuildOptions,
    dir: Option<PathBuf>,
    force: bool,
    stdout: bool,
) -> anyhow::Result<()> {
    let input = std::fs::read_to_string(payload).with_context(|| format!("failed to read {}", payload.display()))?;
    let payload = JsonAdapter::parse(&input)?;
    let builder = Builder::new(options);
    let base = match dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let outputs: Vec<(PathBuf, String)> = payload
        .config
        .iter()
        .map(|config| {
            let (tree, roots) = config.to_tree();
            (base.join(&config.file), builder.build(&tree, &roots) + "\n")
        })
        .collect();

    if stdout {
        for (path, text) in &outputs {
            print!("# {}\n{}\n", path.display(), text);
        }
        return Ok(());
    }

    if !force {
        let existing: Vec<String> = outputs
            .iter()
            .filter(|(path, _)| path.exists())
            .map(|(path, _)| path.display().to_string())
            .collect();
        if !existing.is_empty() {
            bail!("refusing to overwrite {} (use --force)", existing.join(", "));
        }
    }

    for (path, text) in outputs {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!("Wrote {}", path.display());
    }
    Ok(())
}

fn write_preserving_permissions(path: &Path, text: &str) -> anyhow::Result<()> {
    let permissions = std::fs::metadata(path)?.permissions();
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    std::fs::set_permissions(path, permissions)?;
    Ok(())
}
