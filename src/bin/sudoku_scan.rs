use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use sudoku_scan::tools::{format_quad, gray_stats, load_rgba, parse_quad};
use sudoku_scan::{CornerSelection, ImportConfig, ImportError, Quad, rectify_grid, segment_grid};

#[derive(Parser)]
#[command(name = "sudoku-scan", version, about = "Sudoku grid import tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Warp the grid inside the corners to a preprocessed square
    Rectify {
        #[arg(long)]
        image: PathBuf,
        /// Corners as `x,y x,y x,y x,y` (TL TR BR BL); defaults to a 10% inset
        #[arg(long)]
        corners: Option<String>,
        #[arg(long)]
        out: PathBuf,
    },
    /// Write the 81 padded cell images to a directory
    Cells {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        corners: Option<String>,
        #[arg(long)]
        out_dir: PathBuf,
    },
    /// Print the default corner quad for an image
    Quad {
        #[arg(long)]
        image: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let config = ImportConfig::from_env();

    let result = match cli.command {
        Command::Rectify {
            image,
            corners,
            out,
        } => rectify_cmd(&image, corners.as_deref(), &out, &config),
        Command::Cells {
            image,
            corners,
            out_dir,
        } => cells_cmd(&image, corners.as_deref(), &out_dir, &config),
        Command::Quad { image } => quad_cmd(&image),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            eprintln!("{}", err.user_message());
            ExitCode::FAILURE
        }
    }
}

/// Corners in loaded-raster coordinates; `scale` maps file pixels onto them.
fn select_quad(
    width: u32,
    height: u32,
    scale: f64,
    corners: Option<&str>,
) -> Result<Quad, ImportError> {
    let selection = match corners {
        Some(text) => {
            let quad = parse_quad(text).ok_or_else(|| ImportError::InvalidInput {
                message: format!("cannot parse corners {:?}", text),
            })?;
            CornerSelection::with_quad(width, height, quad.scaled(scale))
        }
        None => CornerSelection::new(width, height),
    };
    Ok(selection.confirm())
}

fn rectify_cmd(
    image: &Path,
    corners: Option<&str>,
    out: &Path,
    config: &ImportConfig,
) -> Result<(), ImportError> {
    let (source, scale) = load_rgba(image)?;
    let quad = select_quad(source.width(), source.height(), scale, corners)?;

    let start = Instant::now();
    let square = rectify_grid(&source, &quad, config)?;
    let elapsed = start.elapsed();

    square.save(out)?;
    let stats = gray_stats(&square);
    println!("Image: {} ({}x{})", image.display(), source.width(), source.height());
    println!("Corners: {}", format_quad(&quad.scaled(1.0 / scale)));
    println!(
        "Rectified {}x{} in {:.2}ms (luma min={} max={} avg={})",
        square.width(),
        square.height(),
        elapsed.as_secs_f64() * 1000.0,
        stats.min,
        stats.max,
        stats.avg
    );
    println!("Wrote {}", out.display());
    Ok(())
}

fn cells_cmd(
    image: &Path,
    corners: Option<&str>,
    out_dir: &Path,
    config: &ImportConfig,
) -> Result<(), ImportError> {
    let (source, scale) = load_rgba(image)?;
    let quad = select_quad(source.width(), source.height(), scale, corners)?;
    let square = rectify_grid(&source, &quad, config)?;
    let cells = segment_grid(&square, config);

    std::fs::create_dir_all(out_dir).map_err(|err| ImportError::InvalidInput {
        message: format!("cannot create {}: {}", out_dir.display(), err),
    })?;
    for cell in &cells {
        let path = out_dir.join(format!("cell_{}_{}.png", cell.row, cell.col));
        cell.image.save(&path)?;
    }
    println!("Wrote {} cells to {}", cells.len(), out_dir.display());
    Ok(())
}

fn quad_cmd(image: &Path) -> Result<(), ImportError> {
    let (source, scale) = load_rgba(image)?;
    let quad = CornerSelection::new(source.width(), source.height()).confirm();
    // File pixels, same space as --corners
    println!("{}", format_quad(&quad.scaled(1.0 / scale)));
    Ok(())
}
