use clap::builder::styling::{AnsiColor, Color};
use clap::builder::styling::{Style, Styles};
use clap::{ColorChoice, Parser, Subcommand};

pub const BANNER: &str = "\x1b[0;92m█▀█ █▀█ █▀█ ▀█▀ █▀█ █ █▀█ █▀▀\x1b[0m\n\
                      \x1b[0;96m█▀▀ █▀▄ █▄█  █  █▀▀ █ █▀▀ ██▄\x1b[0m\n\
                      \x1b[0;95mProtein alignment to bootstrapped ML tree\x1b[0m\n";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "protpipe",
    version = env!("CARGO_PKG_VERSION"),
    about = BANNER,
    color = ColorChoice::Always,
    styles = get_styles(),
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run MUSCLE, Gblocks, ProtTest and RAxML on a protein FASTA file
    #[command(alias = "r")]
    Run(RunArgs),

    /// Rename an alignment or tree built from renamed sequences back to the original names
    Restore {
        /// Original FASTA file the run was started from
        #[arg(short, long)]
        input: String,

        /// Alignment (or tree with --tree) containing g_<n> labels
        #[arg(short, long)]
        target: String,

        /// Output file path
        #[arg(short, long)]
        output: String,

        /// Target is a Newick tree instead of a FASTA alignment
        #[arg(long, default_value_t = false)]
        tree: bool,
    },
}

/// Raw run arguments, validated by `RunOptions::from_args` before any file is touched.
#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    /// Input protein FASTA file (.gz accepted)
    #[arg(short, long)]
    pub input: String,

    /// Number of threads for ProtTest and RAxML
    #[arg(short, long, allow_negative_numbers = true)]
    pub threads: i64,

    /// Number of bootstraps for RAxML
    #[arg(short, long, allow_negative_numbers = true)]
    pub bootstraps: i64,

    /// Gblocks stringency: high, med, low or none (skip Gblocks)
    #[arg(short, long)]
    pub mode: String,

    /// Is the input file an aligned FASTA file, either T or F
    #[arg(short, long)]
    pub aligned: String,

    /// Skip ProtTest and pass this model to RAxML as is (e.g. PROTGAMMAWAG)
    #[arg(long)]
    pub model: Option<String>,

    /// Stop after the model selection step
    #[arg(long, default_value_t = false)]
    pub stop_after_model_selection: bool,

    /// JSON file with the locations of the external tools
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory all artifacts are written to
    #[arg(short, long, default_value_t = String::from("."))]
    pub work_dir: String,

    /// Remove intermediate files after the run
    #[arg(long, default_value_t = false)]
    pub clean: bool,
}

pub fn get_styles() -> Styles {
    Styles::styled()
        .usage(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        )
        .header(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        )
        .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
        .invalid(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .error(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .valid(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::White))))
}
