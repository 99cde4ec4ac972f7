use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use flexi_logger::Logger;

use img2logic::engine_thread::spawn_engine;
use img2logic::image_source::{load_grid, save_canvas_preview, save_rect_preview};
use img2logic::{encode, AppSettings, DisplayPreset};

/// Approximate an image with flat rectangles and print a logic-display program
/// that draws it within an instruction budget.
#[derive(Parser, Debug)]
#[command(name = "img2logic")]
#[command(about = "Convert an image into a rectangle draw program for a logic display")]
struct Args {
    /// Source image (any format the image crate decodes)
    input: PathBuf,

    /// Program output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Target the 176x176 large display instead of the 80x80 one
    #[arg(long, conflicts_with = "size")]
    large: bool,

    /// Custom display size, e.g. 120x80
    #[arg(long)]
    size: Option<String>,

    /// Instruction limit of the processor
    #[arg(short, long)]
    instructions: Option<usize>,

    /// Candidate placement density (1.0 or more)
    #[arg(long)]
    iterations: Option<f64>,

    /// Rectangles between flushes (0 = flush once at the end)
    #[arg(long)]
    flush_every: Option<usize>,

    /// Redraw period in seconds (0 = draw once)
    #[arg(long)]
    redraw_seconds: Option<f64>,

    /// Load settings from this JSON file before applying flags
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write the effective settings to this JSON file
    #[arg(long)]
    save_settings: Option<PathBuf>,

    /// Write the terminal canvas as an image
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Write the rectangle list rasterised with tiny-skia
    #[arg(long)]
    rect_preview: Option<PathBuf>,

    /// Upscale factor for both previews
    #[arg(long)]
    preview_scale: Option<u32>,

    /// Dump the rectangle list as JSON
    #[arg(long)]
    rects_json: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let _logger = Logger::try_with_env_or_str(&args.log_level)?
        .log_to_stderr()
        .start()
        .context("logger initialization failed")?;

    // configure Rayon's global thread pool once at startup so worker threads get nice names like "rayon-0".
    let _ = rayon::ThreadPoolBuilder::new()
        .thread_name(|i| format!("rayon-{i}"))
        .build_global();

    let settings = effective_settings(&args)?;
    if let Some(path) = &args.save_settings {
        settings
            .save(path)
            .with_context(|| format!("writing settings to {}", path.display()))?;
    }

    let (width, height) = settings.dimensions();
    log::info!("display {:?} ({}x{})", settings.display, width, height);

    let ground_truth =
        load_grid(&args.input, width, height).with_context(|| format!("loading {}", args.input.display()))?;

    let handle = spawn_engine(ground_truth, settings.approx_params()?)?;
    handle.start();
    let approximation = handle.wait(|report| {
        log::info!(
            "{}/{} rects, size {}, {:.1}% ({:.2} dB)",
            report.total_accepted,
            report.total_budget,
            report.size,
            report.fitness_percent,
            report.metrics.psnr
        );
    })?;

    let program = encode(&approximation.rects, &settings.encoder_params(height))?;
    log::info!("program: {} of {} instructions", program.len(), settings.instruction_limit);

    match &args.output {
        Some(path) => std::fs::write(path, program.to_text())
            .with_context(|| format!("writing program to {}", path.display()))?,
        None => std::io::stdout().lock().write_all(program.to_text().as_bytes())?,
    }

    if let Some(path) = &args.preview {
        save_canvas_preview(&approximation.canvas, path, settings.preview_scale)
            .with_context(|| format!("writing preview {}", path.display()))?;
    }
    if let Some(path) = &args.rect_preview {
        save_rect_preview(&approximation.rects, width, height, settings.preview_scale, path)
            .with_context(|| format!("writing rect preview {}", path.display()))?;
    }
    if let Some(path) = &args.rects_json {
        let json = serde_json::to_string_pretty(&approximation.rects)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    }

    Ok(())
}

/// settings file (or defaults) with command-line overrides applied
fn effective_settings(args: &Args) -> Result<AppSettings> {
    let mut settings = match &args.settings {
        Some(path) => AppSettings::load(path),
        None => AppSettings::default(),
    };

    if args.large {
        settings.display = DisplayPreset::Large;
    }
    if let Some(size) = &args.size {
        let (width, height) = parse_size(size)?;
        settings.display = DisplayPreset::Custom { width, height };
    }
    if let Some(v) = args.instructions {
        settings.instruction_limit = v;
    }
    if let Some(v) = args.iterations {
        settings.iterations = v;
    }
    if let Some(v) = args.flush_every {
        settings.draws_per_flush = v;
    }
    if let Some(v) = args.redraw_seconds {
        settings.redraw_timer_seconds = v;
    }
    if let Some(v) = args.preview_scale {
        settings.preview_scale = v;
    }
    Ok(settings)
}

/// Parse a display size like "120x80"
fn parse_size(size: &str) -> Result<(u32, u32)> {
    let (w, h) = size
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow::anyhow!("Invalid size (expected WxH): {}", size))?;
    let width: u32 = w.trim().parse().with_context(|| format!("Invalid width in size: {}", size))?;
    let height: u32 = h.trim().parse().with_context(|| format!("Invalid height in size: {}", size))?;
    if width == 0 || height == 0 {
        anyhow::bail!("Display size must be non-zero: {}", size);
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("120x80").unwrap(), (120, 80));
        assert_eq!(parse_size("7X3").unwrap(), (7, 3));
        assert!(parse_size("120").is_err());
        assert!(parse_size("0x5").is_err());
        assert!(parse_size("ax5").is_err());
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::parse_from(["img2logic", "in.png", "--large", "--instructions", "500", "--redraw-seconds", "0"]);
        let s = effective_settings(&args).unwrap();
        assert_eq!(s.dimensions(), (176, 176));
        assert_eq!(s.instruction_limit, 500);
        assert_eq!(s.redraw_timer_seconds, 0.0);
        assert_eq!(s.draws_per_flush, 10);
    }
}
