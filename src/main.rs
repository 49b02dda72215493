use clap::{Parser, Subcommand};
use lp_build::imaging::RustBackend;
use lp_build::pipeline::{self, Overrides, Project};
use lp_build::{config, output, scan, site};
use std::path::PathBuf;
use std::sync::mpsc;

#[derive(Parser)]
#[command(name = "lp-build")]
#[command(about = "Build pipeline for single-page static landing sites")]
#[command(long_about = "\
Build pipeline for single-page static landing sites

One HTML page, one stylesheet, one script and an image directory become a
deployable dist/ directory: head tags injected from the env file, images
rewritten into responsive <picture> blocks, everything minified.

Project structure:

  project/
  ├── lp.toml                # Build settings (optional)
  ├── .env                   # Campaign parameters (optional)
  └── src/
      ├── index.html
      ├── style.css
      ├── script.js
      └── images/
          ├── favicon.png    # Source for the favicon set (optional)
          ├── banner.jpg
          └── banner-sp.jpg  # Served below 768px instead of banner.jpg

Output:

  dist/
  ├── index.html
  ├── style.min.css
  ├── script.min.js
  ├── favicon-16x16.png ...
  └── images/                # originals + .avif/.webp siblings

Run 'lp-build gen-config' for a documented lp.toml and 'lp-build gen-env'
for a documented .env template.")]
#[command(version)]
struct Cli {
    /// Project root (holds lp.toml and .env)
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Source directory, overrides [paths] source
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Output directory, overrides [paths] output
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Env file with campaign parameters, overrides [paths] env_file
    #[arg(long = "env", global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: scan → html → css → js → images → favicon
    Build {
        /// Use a saved dimension table instead of measuring images
        #[arg(long)]
        dimensions: Option<PathBuf>,
    },
    /// Print the assembled, unminified page
    Html,
    /// Print image list, SP set and dimension table as JSON
    Scan {
        /// Also save the dimension table for later `build --dimensions`
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Print a stock lp.toml with all options documented
    GenConfig,
    /// Print a .env template with all campaign keys documented
    GenEnv,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let overrides = Overrides {
        source: cli.source,
        output: cli.output,
        env_file: cli.env_file,
    };

    match cli.command {
        Command::Build { dimensions } => {
            let project = Project::load(&cli.root, &overrides)?;
            init_thread_pool(&project.config.processing);
            let backend = RustBackend::new();

            let (tx, rx) = mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    output::print_build_event(&event);
                }
            });
            let result = pipeline::build(&project, &backend, dimensions.as_deref(), Some(&tx));
            drop(tx);
            printer
                .join()
                .map_err(|_| "progress printer panicked")?;

            let report = result?;
            output::print_build_summary(&report);
        }
        Command::Html => {
            let project = Project::load(&cli.root, &overrides)?;
            let assembled = pipeline::assemble_only(&project, &RustBackend::new(), None)?;
            output::print_warnings(&assembled.warnings);
            print!("{}", assembled.html);
        }
        Command::Scan { save } => {
            let project = Project::load(&cli.root, &overrides)?;
            let result = project.scan_images(&RustBackend::new(), None)?;
            output::print_warnings(&result.warnings);
            if let Some(path) = save {
                scan::save_dimensions(&path, &result.dimensions)?;
            }
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::GenEnv => {
            print!("{}", site::stock_env_template());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
