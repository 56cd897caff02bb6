use clap::{Parser, Subcommand};
use fpfsmeas::stamp::io::{load_gray_image, save_gray_image};
use fpfsmeas::{register_fields, resize_stamp, EngineSchema, FpfsConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const CONFIG_EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));
const ENGINE_SCHEMA_EXAMPLE_JSON: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/engine_schema.example.json"
));

#[derive(Parser, Debug)]
#[command(author, version, about = "FPFS measurement adapter tools (JSON config driven)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    /// Print an example measurement config and exit.
    #[arg(long)]
    print_example: bool,
    /// Print an example engine column schema and exit.
    #[arg(long)]
    print_engine_example: bool,
    /// Enable tracing output.
    #[arg(long)]
    trace: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse and validate a measurement config.
    Validate {
        /// Path to the JSON configuration file.
        #[arg(short, long, value_name = "FILE", default_value = "config.json")]
        config: PathBuf,
    },
    /// Print the output columns a plugin would register, as JSON.
    Schema {
        /// Path to the JSON configuration file.
        #[arg(short, long, value_name = "FILE", default_value = "config.json")]
        config: PathBuf,
        /// Path to the engine column schema JSON file.
        #[arg(short, long, value_name = "FILE")]
        engine_schema: PathBuf,
        /// Plugin name used as the column prefix.
        #[arg(short, long, default_value = "fpfs")]
        name: String,
    },
    /// Crop or zero-pad a grayscale stamp to a target shape.
    Resize {
        /// Input image path.
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
        /// Output image path; the format follows the extension.
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
        /// Target height in pixels.
        #[arg(long, default_value_t = 64)]
        height: usize,
        /// Target width in pixels.
        #[arg(long, default_value_t = 64)]
        width: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("fpfsmeas=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{CONFIG_EXAMPLE_JSON}");
        return Ok(());
    }
    if cli.print_engine_example {
        println!("{ENGINE_SCHEMA_EXAMPLE_JSON}");
        return Ok(());
    }

    let Some(command) = cli.command else {
        return Err("no subcommand given; see --help".into());
    };

    match command {
        Command::Validate { config } => {
            let config = load_config(&config)?;
            config.validate()?;
            println!("ok: n_order={}, sigma_arcsec={}", config.n_order, config.sigma_arcsec);
        }
        Command::Schema {
            config,
            engine_schema,
            name,
        } => {
            let config = load_config(&config)?;
            let schema_text = fs::read_to_string(&engine_schema)?;
            let engine_schema: EngineSchema = serde_json::from_str(&schema_text)?;
            let fields = register_fields(&config, &name, &engine_schema)?;
            println!("{}", serde_json::to_string_pretty(&fields)?);
        }
        Command::Resize {
            input,
            output,
            height,
            width,
        } => {
            let stamp = load_gray_image(&input)?;
            let resized = resize_stamp(stamp.view(), (height, width))?;
            save_gray_image(&resized, &output)?;
            println!(
                "resized {}x{} -> {}x{}",
                stamp.width(),
                stamp.height(),
                resized.width(),
                resized.height()
            );
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<FpfsConfig, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
