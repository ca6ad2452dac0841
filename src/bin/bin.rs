use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nftr_glyphs::{cyrillic_mapping, BatchDriver, Config, GlyphRasterizer, Placement};
use nftr_parser::{render_numbered, Container, GlyphMapping, Inspector, Transcoder};

#[derive(Parser)]
#[command(version, about = "Replaces glyph bitmaps in NFTR font containers.")]
struct Cli {
    #[arg(help = "TOML file with [layout] and [raster] settings.", long, global = true)]
    config: Option<PathBuf>,

    #[arg(help = "Log codec and file details.", short, long, global = true)]
    verbose: bool,

    #[arg(help = "Only log warnings and errors.", short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Rasterize and insert every glyph of a mapping table")]
    Batch {
        #[arg(help = "Container to patch in place.")]
        file: PathBuf,

        #[arg(help = "TrueType font to rasterize from.", long)]
        font: Option<PathBuf>,

        #[arg(help = "Mapping file with `INDEX CHAR` lines, defaults to Cyrillic.", long)]
        mapping: Option<PathBuf>,

        #[arg(help = "First slot to process.", long)]
        start: Option<usize>,

        #[arg(help = "Last slot to process.", long)]
        end: Option<usize>,

        #[arg(help = "Show every rasterized glyph.", long, default_value_t = false)]
        preview: bool,
    },

    #[command(about = "Rasterize and insert a single glyph")]
    Insert {
        file: PathBuf,
        index: usize,
        character: char,

        #[arg(help = "TrueType font to rasterize from.", long)]
        font: Option<PathBuf>,
    },

    #[command(about = "Show code, width and bitmap of a slot")]
    View { file: PathBuf, index: usize },

    #[command(about = "Show how characters rasterize without touching any file")]
    Preview {
        text: String,

        #[arg(help = "TrueType font to rasterize from.", long)]
        font: Option<PathBuf>,

        #[arg(help = "Pixel size.", long, default_value_t = 8.0)]
        size: f32,
    },

    #[command(about = "Print which data pixel feeds each display pixel")]
    Map,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else if cli.quiet {
        log::LevelFilter::Warn
    } else {
        log::LevelFilter::Info
    };
    let _ = env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .try_init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Batch {
            file,
            font,
            mapping,
            start,
            end,
            preview,
        } => {
            if let Some(font) = font {
                config.raster.font_path = font;
            }
            let mapping = match mapping {
                Some(path) => read_mapping(&path)?,
                None => cyrillic_mapping(),
            };
            insert(&config, &file, &mapping, start, end, preview)
        }
        Commands::Insert {
            file,
            index,
            character,
            font,
        } => {
            if let Some(font) = font {
                config.raster.font_path = font;
            }
            let mapping = GlyphMapping::from_entries(vec![(index, character)]);
            insert(&config, &file, &mapping, None, None, true)
        }
        Commands::View { file, index } => {
            let container = Container::open(&file)
                .with_context(|| format!("cannot open {}", file.display()))?;
            let info = Inspector::new(config.layout)?
                .inspect(container.bytes(), index)
                .with_context(|| format!("cannot inspect slot {index}"))?;
            print!("{info}");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Preview { text, font, size } => {
            if let Some(font) = font {
                config.raster.font_path = font;
            }
            let mut rasterizer = GlyphRasterizer::new(config.raster, &config.layout);
            for character in text.chars().filter(|c| !c.is_whitespace()) {
                let glyph = rasterizer.render(character, size, Placement::Centered)?;
                println!("--- '{character}' | ink width {} px ---", glyph.ink_width);
                println!("{}", render_numbered(&glyph.grid));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Map => {
            print_map(&Transcoder::new(&config.layout)?, &config);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_mapping(path: &Path) -> Result<GlyphMapping> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read mapping {}", path.display()))?;
    GlyphMapping::parse(&text).with_context(|| format!("bad mapping {}", path.display()))
}

fn insert(
    config: &Config,
    file: &Path,
    mapping: &GlyphMapping,
    start: Option<usize>,
    end: Option<usize>,
    preview: bool,
) -> Result<ExitCode> {
    let mut container =
        Container::open(file).with_context(|| format!("cannot open {}", file.display()))?;

    log::info!(
        "font {} ({} px capitals, {} px small letters)",
        config.raster.font_path.display(),
        config.raster.upper_size,
        config.raster.lower_size
    );

    let rasterizer = GlyphRasterizer::new(config.raster.clone(), &config.layout);
    let report = BatchDriver::new(rasterizer, config.layout)?
        .with_range(start, end)
        .with_preview(preview)
        .run(&mut container, mapping)?;

    println!("{report}");
    if !report.saved {
        return Ok(ExitCode::FAILURE);
    }

    println!("{} updated", file.display());
    println!("glyph widths are unchanged, adjust them with a width table editor");
    Ok(ExitCode::SUCCESS)
}

fn print_map(transcoder: &Transcoder, config: &Config) {
    for y in 0..config.layout.cell_height {
        println!("display row {y}:");
        for x in 0..config.layout.cell_width {
            match transcoder.display_to_data(x, y) {
                Some((data_x, data_y)) => {
                    println!("  display ({x}, {y}) <- data ({data_x}, {data_y})")
                }
                None => println!("  display ({x}, {y}) <- empty"),
            }
        }
    }
}
