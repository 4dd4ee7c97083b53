use clap::{Parser, Subcommand};
use facecrop::config::{self, Config, Overrides};
use facecrop::detect::{CascadeDetector, HaarCascade};
use facecrop::imaging::RustBackend;
use facecrop::naming::OutputTargets;
use facecrop::output::{self, SingleImageLog};
use facecrop::{batch, naming, pipeline};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "facecrop")]
#[command(about = "Detect faces in photos, outline them and save padded crops")]
#[command(long_about = "\
Detect faces in photos, outline them and save padded crops

Every input is scaled to fit the target box (1024x1024 by default), faces are
found with an OpenCV Haar cascade, and for each face a padded region (half a
face to each side and above, a full face below for the chin and neck) is
outlined in red and cropped. All outputs are lossless WebP.

  input/                       output/
  ├── beach.jpg        →       ├── output_beach.jpg.webp  # red outlines
  └── team.png         →       ├── beach_face_1.webp      # padded crops
                               ├── output_team.png.webp
                               ├── team_face_1.webp
                               └── team_face_2.webp

Images without faces produce no output. Set RUST_LOG=debug for detection
details.

Run 'facecrop gen-config' to generate a documented facecrop.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./facecrop.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Input directory
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Haar cascade XML file
    #[arg(long, global = true)]
    classifier: Option<PathBuf>,

    /// Target box width for the working image
    #[arg(long, global = true)]
    width: Option<u32>,

    /// Target box height for the working image
    #[arg(long, global = true)]
    height: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process every image in the input directory
    Batch,
    /// Process one image and print a JSON log record
    Single {
        /// Image to process
        input: PathBuf,
        /// Annotated output file; crops are written next to it
        #[arg(long, default_value = "output.webp")]
        to: PathBuf,
    },
    /// Validate the configuration and classifier without processing
    Check,
    /// Print a stock facecrop.toml with all options documented
    GenConfig,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            input_dir: self.input.clone(),
            output_dir: self.output.clone(),
            classifier_path: self.classifier.clone(),
            target_width: self.width,
            target_height: self.height,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Batch => {
            let config = config::load_config(cli.config.as_deref(), &cli.overrides())?;
            let detector = load_detector(&config)?;
            let backend = RustBackend::new();
            let summary =
                batch::run_batch(&backend, &detector, &config, output::print_batch_event)?;
            output::print_summary(&summary);
        }
        Command::Single { input, to } => {
            let config = config::load_config(cli.config.as_deref(), &cli.overrides())?;
            let detector = load_detector(&config)?;
            let outputs = OutputTargets {
                annotated: to.clone(),
                crop_dir: parent_dir(to).to_path_buf(),
                crop_base: naming::base_name(input),
            };
            std::fs::create_dir_all(&outputs.crop_dir)?;
            let outcome = pipeline::process_image(
                &RustBackend::new(),
                &detector,
                input,
                &outputs,
                config.target(),
            )?;
            output::print_single_log(&SingleImageLog::new(input, to, outcome.has_face()))?;
        }
        Command::Check => {
            let config = config::load_config(cli.config.as_deref(), &cli.overrides())?;
            let cascade = HaarCascade::load(config.require_classifier()?)?;
            let (w, h) = cascade.window_size();
            println!(
                "Classifier: {} ({}x{} window, {} stages)",
                config.classifier_path.display(),
                w,
                h,
                cascade.stage_count()
            );
            let inputs = batch::enumerate_inputs(&config.input_dir)?;
            println!(
                "Input: {} ({} images)",
                config.input_dir.display(),
                inputs.len()
            );
            let plan = naming::plan_outputs(&config.output_dir, &inputs);
            for (input, outputs) in inputs.iter().zip(&plan) {
                println!(
                    "    {} → {}",
                    input.display(),
                    outputs.annotated.display()
                );
            }
            println!("==> Configuration is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the cascade once for the whole run.
fn load_detector(config: &Config) -> Result<CascadeDetector, Box<dyn std::error::Error>> {
    let cascade = HaarCascade::load(config.require_classifier()?)?;
    Ok(CascadeDetector::new(cascade, config.detection))
}

/// Directory holding `path`, `.` for a bare file name.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}
