use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use tracing::{debug, info, Level};
use tracing_subscriber::util::SubscriberInitExt;

use octocart_core::{cartridge, gif, standalone, Cartridge, Options, Recorder};

#[derive(Parser)]
#[command(name = "octocart")]
#[command(version, about = "Build, open and inspect Octo cartridge GIFs", long_about = None)]
struct Cli {
    /// More output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack a program into a cartridge GIF
    Pack {
        /// Octo source file
        #[arg(long)]
        program: PathBuf,

        /// Compiled rom to store alongside the source
        #[arg(long)]
        rom: Option<PathBuf>,

        /// JSON object of emulator options
        #[arg(long)]
        options: Option<PathBuf>,

        /// Text written on the cartridge (defaults to the program's file name)
        #[arg(long)]
        label: Option<String>,

        /// GIF to draw on the cartridge instead of a label
        #[arg(long)]
        screenshot: Option<PathBuf>,

        /// Output .gif path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Recover the program, options and rom from a cartridge or standalone page
    Unpack {
        /// Cartridge GIF or standalone HTML page
        cart: PathBuf,

        /// Write the cartridge JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the program source to this file
        #[arg(long)]
        program: Option<PathBuf>,

        /// Also write the rom bytes to this file
        #[arg(long)]
        rom: Option<PathBuf>,
    },

    /// Describe the frames of any GIF
    Inspect {
        gif: PathBuf,
    },

    /// Stitch a directory of single-frame GIFs into an animation, one tick per file
    Record {
        /// Directory of .gif files, played in name order
        frames: PathBuf,

        /// Output .gif path
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, default_value = "made with octo")]
        comment: String,
    },
}

fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .compact()
        .finish()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Pack { program, rom, options, label, screenshot, output } => {
            pack(&program, rom.as_deref(), options.as_deref(), label, screenshot.as_deref(), &output)
        }
        Commands::Unpack { cart, output, program, rom } => {
            unpack(&cart, output.as_deref(), program.as_deref(), rom.as_deref())
        }
        Commands::Inspect { gif } => inspect(&gif),
        Commands::Record { frames, output, comment } => record(&frames, &output, &comment),
    }
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}

fn pack(
    program: &Path,
    rom: Option<&Path>,
    options: Option<&Path>,
    label: Option<String>,
    screenshot: Option<&Path>,
    output: &Path,
) -> Result<()> {
    let source = fs::read_to_string(program)
        .with_context(|| format!("failed to read program {}", program.display()))?;

    let mut settings = Options::default();
    if let Some(path) = options {
        let map: Map<String, Value> = serde_json::from_slice(&read(path)?)
            .with_context(|| format!("{} is not a JSON object", path.display()))?;
        settings.unpack(&map).with_context(|| format!("bad option in {}", path.display()))?;
    }

    let cart = Cartridge {
        key: None,
        program: source,
        options: settings.pack(),
        rom: rom.map(read).transpose()?.unwrap_or_default(),
    };

    let label = label.unwrap_or_else(|| {
        program.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
    });
    let shot = screenshot.map(read).transpose()?;

    let bytes = cartridge::pack(&label, &cart, shot.as_deref()).context("failed to pack cartridge")?;
    write(output, &bytes)?;
    info!("wrote {} ({} bytes)", output.display(), bytes.len());
    Ok(())
}

fn unpack(cart: &Path, output: Option<&Path>, program: Option<&Path>, rom: Option<&Path>) -> Result<()> {
    let bytes = read(cart)?;
    let parsed = if standalone::is_standalone(&bytes) {
        debug!("{} is a standalone page", cart.display());
        standalone::parse(&String::from_utf8_lossy(&bytes))
    } else {
        cartridge::unpack(&bytes)
    };
    let mut contents: Cartridge =
        parsed.with_context(|| format!("{} is not a readable cartridge", cart.display()))?;

    let mut settings = Options::default();
    settings.unpack(&contents.options).context("cartridge carries malformed options")?;
    contents.options = settings.pack();

    let json = serde_json::to_string_pretty(&contents)?;
    match output {
        Some(path) => write(path, json.as_bytes())?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    if let Some(path) = program {
        write(path, contents.program.as_bytes())?;
    }
    if let Some(path) = rom {
        write(path, &contents.rom)?;
    }
    debug!("unpacked {} source bytes, {} rom bytes", contents.program.len(), contents.rom.len());
    Ok(())
}

fn inspect(path: &Path) -> Result<()> {
    let bytes = read(path)?;
    let image = gif::decode(&bytes).with_context(|| format!("failed to decode {}", path.display()))?;

    println!("{}x{}, {} frame(s)", image.width, image.height, image.frames.len());
    for (i, frame) in image.frames.iter().enumerate() {
        println!("  frame {i}: {} colors, {} pixels", frame.palette.len(), frame.pixels.len());
    }
    match cartridge::payload(&bytes) {
        Ok(json) if serde_json::from_slice::<Value>(&json).is_ok() => {
            println!("cartridge payload: {} bytes", json.len())
        }
        _ => debug!("no cartridge payload"),
    }
    Ok(())
}

fn record(dir: &Path, output: &Path, comment: &str) -> Result<()> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("failed to list {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()?;
    files.retain(|p| p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gif")));
    files.sort();

    let mut recorder: Option<Recorder> = None;
    let mut canvas = None;
    for file in &files {
        let image = gif::decode(&read(file)?).with_context(|| format!("failed to decode {}", file.display()))?;
        let Some(frame) = image.frames.first() else {
            bail!("{} has no frames", file.display());
        };
        let (w, h) = *canvas.get_or_insert((image.width, image.height));
        if (w, h) != (image.width, image.height) {
            bail!("{} is {}x{}, expected {w}x{h}", file.display(), image.width, image.height);
        }
        let r = match recorder.take() {
            Some(r) => r,
            None => Recorder::start(w, h, &frame.palette, comment)?,
        };
        recorder.insert(r).tick(&frame.pixels, &frame.palette)?;
    }

    let Some(recorder) = recorder else {
        bail!("no .gif files in {}", dir.display());
    };
    let bytes = recorder.finish()?;
    write(output, &bytes)?;
    info!("recorded {} files into {}", files.len(), output.display());
    Ok(())
}
