use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use glam::DVec2;
use quadmesh::{
    build_mesh, Circle, Complement, Element, GridSpec, Intersection, LevelSet, MeshConfig,
    MeshStats, PolyMesh, QuadMesh, Rectangle,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quadtool")]
#[command(about = "Adaptive quadtree meshing tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mesh a shape and write elements and statistics as JSON
    Mesh {
        #[command(flatten)]
        input: MeshArgs,

        /// Leave out the element list and only write statistics
        #[arg(long)]
        stats_only: bool,

        /// Write an indexed mesh welded with the configured weld_tolerance
        /// instead of the element list
        #[arg(long, conflicts_with = "stats_only")]
        welded: bool,
    },
    /// Mesh a shape and write the fine-to-coarse index map as JSON
    IndexMap {
        #[command(flatten)]
        input: MeshArgs,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Shape {
    Circle,
    Square,
    /// Annulus with an inner radius of half the outer one
    Ring,
}

#[derive(Args)]
struct MeshArgs {
    /// Fine cells along x; cells are square with edge 1 / max(nx, ny)
    #[arg(long, default_value_t = 64)]
    nx: usize,

    /// Fine cells along y; cells are square with edge 1 / max(nx, ny)
    #[arg(long, default_value_t = 64)]
    ny: usize,

    /// Shape whose boundary is resolved
    #[arg(short, long, value_enum, default_value_t = Shape::Circle)]
    shape: Shape,

    /// Shape center x
    #[arg(long, default_value_t = 0.5)]
    cx: f64,

    /// Shape center y
    #[arg(long, default_value_t = 0.5)]
    cy: f64,

    /// Circle radius, or square half-width
    #[arg(short, long, default_value_t = 0.25)]
    radius: f64,

    /// TOML file with meshing options and an optional [grid] table
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override max_coarsening_factor
    #[arg(long)]
    factor: Option<u32>,

    /// Override buffer_width
    #[arg(long)]
    buffer: Option<f64>,

    /// Refine odd hanging-node masks for a quad-only mesh
    #[arg(long)]
    propagate: bool,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Config file layout: meshing options at the top level, grid in `[grid]`
#[derive(Debug, Default, Deserialize)]
struct ToolConfig {
    #[serde(flatten)]
    mesh: MeshConfig,
    grid: Option<GridSpec>,
}

#[derive(Serialize)]
struct MeshOutput<'a> {
    grid: &'a GridSpec,
    stats: &'a MeshStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    elements: Option<&'a [Element]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    poly_mesh: Option<PolyMesh>,
}

#[derive(Serialize)]
struct IndexMapOutput<'a> {
    nx: usize,
    ny: usize,
    stats: &'a MeshStats,
    /// Leaf id per fine cell, one row per `j`
    rows: Vec<Vec<u32>>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Mesh {
            input,
            stats_only,
            welded,
        } => {
            let mesh = run(&input)?;
            let poly_mesh = if welded {
                Some(mesh.to_poly_mesh()?)
            } else {
                None
            };
            let output = MeshOutput {
                grid: &mesh.grid,
                stats: &mesh.stats,
                elements: (!stats_only && !welded).then_some(mesh.elements.as_slice()),
                poly_mesh,
            };
            write_json(input.output.as_deref(), &output)?;
        }
        Commands::IndexMap { input } => {
            let mesh = run(&input)?;
            let map = mesh.fine_index_map();
            let output = IndexMapOutput {
                nx: map.nx,
                ny: map.ny,
                stats: &mesh.stats,
                rows: map.to_rows(),
            };
            write_json(input.output.as_deref(), &output)?;
        }
    }

    Ok(())
}

fn run(args: &MeshArgs) -> Result<QuadMesh> {
    let (grid, config) = resolve(args)?;
    let level_set = shape_level_set(args);
    tracing::info!(
        "Meshing {:?} on a {}x{} grid (factor {}, buffer {})",
        args.shape,
        grid.nx,
        grid.ny,
        config.max_coarsening_factor,
        config.buffer_width
    );

    let mesh = build_mesh(&grid, level_set.as_ref(), &config)?;
    if !mesh.stats.converged {
        tracing::warn!("Mesh did not converge; output may contain unbalanced leaves");
    }
    Ok(mesh)
}

/// Grid and options from the config file with command line overrides applied
fn resolve(args: &MeshArgs) -> Result<(GridSpec, MeshConfig)> {
    let file = match &args.config {
        Some(path) => load_config(path)?,
        None => ToolConfig::default(),
    };

    let mut config = file.mesh;
    if let Some(factor) = args.factor {
        config.max_coarsening_factor = factor;
    }
    if let Some(buffer) = args.buffer {
        config.buffer_width = buffer;
    }
    config.propagate_splits |= args.propagate;
    config.validate()?;

    let grid = file.grid.unwrap_or_else(|| square_grid(args.nx, args.ny));
    if args.radius <= 0.0 {
        bail!("radius must be positive, got {}", args.radius);
    }
    Ok((grid, config))
}

/// `nx` x `ny` square cells anchored at the origin, the longer side spanning 1
fn square_grid(nx: usize, ny: usize) -> GridSpec {
    let edge = 1.0 / nx.max(ny).max(1) as f64;
    GridSpec::new(DVec2::ZERO, DVec2::splat(edge), nx, ny)
}

fn load_config(path: &Path) -> Result<ToolConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: ToolConfig = toml::from_str(&text)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    config.mesh.validate()?;
    Ok(config)
}

fn shape_level_set(args: &MeshArgs) -> Box<dyn LevelSet> {
    let center = DVec2::new(args.cx, args.cy);
    match args.shape {
        Shape::Circle => Box::new(Circle::new(center, args.radius)),
        Shape::Square => Box::new(Rectangle::new(
            center - DVec2::splat(args.radius),
            center + DVec2::splat(args.radius),
        )),
        Shape::Ring => Box::new(Intersection(
            Circle::new(center, args.radius),
            Complement(Circle::new(center, args.radius * 0.5)),
        )),
    }
}

fn write_json<T: Serialize>(path: Option<&Path>, value: &T) -> Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
            tracing::info!("Wrote {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, value)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CONFIG: &str = r#"
max_coarsening_factor = 4
buffer_width = 0.05
weld_tolerance = 1e-8

[grid]
origin = [0.0, 0.0]
cell_size = [0.125, 0.125]
nx = 8
ny = 4
"#;

    fn config_file(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    fn mesh_args(extra: &[&str]) -> MeshArgs {
        let argv = ["quadtool", "mesh"].iter().chain(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Mesh { input, .. } => input,
            Commands::IndexMap { .. } => unreachable!(),
        }
    }

    #[test]
    fn test_load_config_with_grid_table() {
        let file = config_file(CONFIG);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.mesh.max_coarsening_factor, 4);
        assert_eq!(config.mesh.buffer_width, 0.05);
        assert_eq!(config.mesh.weld_tolerance, 1e-8);
        assert!(!config.mesh.propagate_splits);

        let grid = config.grid.unwrap();
        assert_eq!((grid.nx, grid.ny), (8, 4));
        assert_eq!(grid.cell_size, DVec2::splat(0.125));
    }

    #[test]
    fn test_load_config_errors() {
        let missing = load_config(Path::new("/nonexistent/quadtool.toml")).unwrap_err();
        assert!(missing.to_string().contains("Failed to read config"));

        let file = config_file("max_coarsening_factor = 6");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_command_line_overrides_config_file() {
        let file = config_file(CONFIG);
        let path = file.path().to_str().unwrap();
        let args = mesh_args(&["--config", path, "--factor", "16", "--buffer", "0.1", "--propagate"]);
        let (grid, config) = resolve(&args).unwrap();

        assert_eq!(config.max_coarsening_factor, 16);
        assert_eq!(config.buffer_width, 0.1);
        assert!(config.propagate_splits);
        assert_eq!(config.weld_tolerance, 1e-8);
        assert_eq!((grid.nx, grid.ny), (8, 4));
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        assert!(resolve(&mesh_args(&["--factor", "3"])).is_err());
        assert!(resolve(&mesh_args(&["--radius", "0"])).is_err());
    }

    #[test]
    fn test_uneven_cell_counts_keep_square_cells() {
        let (grid, _) = resolve(&mesh_args(&["--nx", "5", "--ny", "3"])).unwrap();
        assert!(grid.validate().is_ok());
        assert_eq!(grid.cell_size, DVec2::splat(0.2));
        assert!((grid.bounds().max - DVec2::new(1.0, 0.6)).abs().max_element() < 1e-12);

        let mesh = run(&mesh_args(&["--nx", "5", "--ny", "3", "--cy", "0.3", "--radius", "0.2"])).unwrap();
        assert_eq!(mesh.stats.fine_cells, 15);
    }

    #[test]
    fn test_weld_tolerance_from_config_file_reaches_welding() {
        let file = config_file("weld_tolerance = 0.3");
        let path = file.path().to_str().unwrap();
        let mesh = run(&mesh_args(&["--config", path, "--nx", "4", "--ny", "4"])).unwrap();
        assert_eq!(mesh.weld_tolerance, 0.3);
        assert!(mesh.to_poly_mesh().is_err());

        let mesh = run(&mesh_args(&["--nx", "4", "--ny", "4"])).unwrap();
        assert!(mesh.to_poly_mesh().is_ok());
    }

    #[test]
    fn test_welded_conflicts_with_stats_only() {
        assert!(Cli::try_parse_from(["quadtool", "mesh", "--welded", "--stats-only"]).is_err());
        assert!(Cli::try_parse_from(["quadtool", "mesh", "--welded"]).is_ok());
    }
}
