use anyhow::{Context, Result, anyhow};
use cavity_detector::annotations::focus_region::FocusRegion;
use cavity_detector::annotations::point::Point;
use cavity_detector::config::AppConfig;
use cavity_detector::diagnosis::annotator::Annotator;
use cavity_detector::diagnosis::message::{DiagnosisMessage, Language};
use cavity_detector::image_utils::image_io::{is_supported_image, save_image};
use cavity_detector::inference::recorded::RecordedPredictions;
use cavity_detector::pipeline::{DiagnosisPipeline, PatientContext};
use cavity_detector::records::summary::RecordSummary;
use clap::{Args as ClapArgs, Parser, Subcommand};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Mark cavities on dental X-rays using a hosted object detector"
)]
struct Args {
    /// TOML configuration file.
    #[arg(long, global = true, env = "CAVITY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send an X-ray to the detector, annotate it and record the diagnosis for a patient.
    Diagnose(DiagnoseArgs),
    /// Annotate an X-ray from a saved detector response, without recording anything.
    Annotate(AnnotateArgs),
    /// Inspect the patient log.
    #[command(subcommand)]
    Records(RecordsCommand),
}

#[derive(ClapArgs, Debug)]
struct FocusArgs {
    /// Only consider detections near this point, given as X,Y in image pixels.
    #[arg(long, value_parser = parse_point)]
    focus: Option<Point>,

    /// Radius around --focus in pixels. Defaults to the configured radius.
    #[arg(long, requires = "focus")]
    radius: Option<f32>,
}

#[derive(ClapArgs, Debug)]
struct DiagnoseArgs {
    /// Dental X-ray (JPG or PNG).
    #[arg(long)]
    image: PathBuf,

    #[arg(long)]
    name: String,

    #[arg(long)]
    contact: String,

    /// Language of the spoken announcement: en, ta or hi.
    #[arg(long)]
    language: Option<Language>,

    /// Prepare an email report for this address.
    #[arg(long)]
    email: Option<String>,

    #[command(flatten)]
    focus: FocusArgs,

    /// Where to write the annotated image. Defaults to <image>_annotated.png.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Where to write the email report. Defaults to <image>_report.eml when --email is set.
    #[arg(long, requires = "email")]
    report: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct AnnotateArgs {
    #[arg(long)]
    image: PathBuf,

    /// Saved detector response (JSON).
    #[arg(long)]
    predictions: PathBuf,

    #[arg(long)]
    language: Option<Language>,

    #[command(flatten)]
    focus: FocusArgs,

    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum RecordsCommand {
    /// Totals and per-day case counts.
    Summary,
    /// Print every record.
    List,
    /// Copy the log to another file.
    Export {
        #[arg(long)]
        to: PathBuf,
    },
}

fn parse_point(value: &str) -> Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{}'", value))?;
    let x: f32 = x.trim().parse().map_err(|_| format!("invalid x coordinate '{}'", x))?;
    let y: f32 = y.trim().parse().map_err(|_| format!("invalid y coordinate '{}'", y))?;
    Ok(Point::new(x, y))
}

fn focus_region(args: &FocusArgs, config: &AppConfig) -> Result<Option<FocusRegion>> {
    let Some(center) = args.focus else {
        return Ok(None);
    };
    let radius = args.radius.unwrap_or(config.focus_radius);
    if !(radius.is_finite() && radius > 0.0) {
        return Err(anyhow!("--radius must be a positive number of pixels, got {}", radius));
    }
    Ok(Some(FocusRegion::new(center).with_radius(radius)))
}

fn sibling_path(image: &Path, suffix: &str) -> PathBuf {
    let stem = image
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("xray");
    image.with_file_name(format!("{}_{}", stem, suffix))
}

fn read_upload(path: &Path) -> Result<Vec<u8>> {
    if !is_supported_image(path) {
        return Err(anyhow!(
            "{} is not a JPG or PNG file",
            path.display()
        ));
    }
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn print_message(message: &DiagnosisMessage) {
    println!("Diagnosis: {}", message.headline);
    println!("Announcement ({}): {}", message.language, message.announcement);
    for finding in &message.findings {
        println!("  - {}", finding);
    }
}

fn diagnose(args: DiagnoseArgs, config: &AppConfig) -> Result<()> {
    let context = PatientContext::new(&args.name, &args.contact)?
        .with_language(args.language.unwrap_or(config.language))
        .with_email(args.email.as_deref());
    let focus = focus_region(&args.focus, config)?;
    let bytes = read_upload(&args.image)?;

    let pipeline = DiagnosisPipeline::new(config.hosted_client()?, Annotator::new(config.renderer()))
        .with_records(config.record_log())
        .with_mail_sender(config.mail_sender.clone());
    let outcome = pipeline.run(&context, &bytes, focus.as_ref())?;

    let output = args
        .output
        .unwrap_or_else(|| sibling_path(&args.image, "annotated.png"));
    save_image(&outcome.upload.image, &output)
        .with_context(|| format!("failed to save {}", output.display()))?;
    info!("Annotated image written to {}", output.display());

    print_message(&outcome.upload.message);
    println!("Record saved for {} at {}", outcome.record.name, outcome.record.datetime);

    if let Some(report) = &outcome.report {
        let path = args
            .report
            .unwrap_or_else(|| sibling_path(&args.image, "report.eml"));
        report.write_to(&path)?;
        println!("Email report for {} written to {}", report.recipient, path.display());
    }
    Ok(())
}

fn annotate(args: AnnotateArgs, config: &AppConfig) -> Result<()> {
    let focus = focus_region(&args.focus, config)?;
    let bytes = read_upload(&args.image)?;
    let pipeline = DiagnosisPipeline::new(
        RecordedPredictions::new(&args.predictions),
        Annotator::new(config.renderer()),
    );
    let upload = pipeline.annotate_upload(
        &bytes,
        focus.as_ref(),
        args.language.unwrap_or(config.language),
    )?;
    let output = args
        .output
        .unwrap_or_else(|| sibling_path(&args.image, "annotated.png"));
    save_image(&upload.image, &output)
        .with_context(|| format!("failed to save {}", output.display()))?;
    info!("Annotated image written to {}", output.display());
    print_message(&upload.message);
    Ok(())
}

fn records(command: RecordsCommand, config: &AppConfig) -> Result<()> {
    let log = config.record_log();
    match command {
        RecordsCommand::Summary => {
            let records = log.load()?;
            if records.is_empty() {
                println!("No records found yet.");
            } else {
                print!("{}", RecordSummary::from_records(&records));
            }
        }
        RecordsCommand::List => {
            let records = log.load()?;
            if records.is_empty() {
                println!("No records found yet.");
            }
            for record in records {
                println!(
                    "{}\t{}\t{}\t{}",
                    record.datetime, record.name, record.contact, record.diagnosis
                );
            }
        }
        RecordsCommand::Export { to } => {
            let bytes = log.export_to(&to)?;
            println!("Exported {} bytes to {}", bytes, to.display());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref())?;
    if config.overlay.font_path.is_none() {
        warn!("No label font configured, using the built-in bitmap font");
    }
    match args.command {
        Command::Diagnose(diagnose_args) => diagnose(diagnose_args, &config),
        Command::Annotate(annotate_args) => annotate(annotate_args, &config),
        Command::Records(command) => records(command, &config),
    }
}
