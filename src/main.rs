use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::info;

use idcard::crop::CropRegion;
use idcard::{Error, Field, GeneratorConfig, Session, SubmissionStatus};

#[derive(Parser, Debug)]
#[command(name = "idcard")]
#[command(about = "Generate ID cards from form data and a cropped photo")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Background template image (400x600)
    #[arg(long, global = true, value_name = "PATH")]
    template: Option<PathBuf>,

    /// TrueType font replacing the bundled regular face
    #[arg(long, global = true, value_name = "PATH")]
    font: Option<PathBuf>,

    /// TrueType font replacing the bundled bold face
    #[arg(long, global = true, value_name = "PATH")]
    bold_font: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose a card, save it and submit the record
    Generate(GenerateArgs),
    /// Write the bare template canvas
    Preview {
        /// Output PNG
        #[arg(long, default_value = "template-preview.png")]
        out: PathBuf,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Full name
    #[arg(long, default_value = "")]
    name: String,
    /// Date of birth (YYYY-MM-DD)
    #[arg(long, default_value = "")]
    dob: String,
    /// Aadhar number
    #[arg(long, default_value = "")]
    aadhar: String,
    /// WhatsApp number
    #[arg(long, default_value = "")]
    whatsapp: String,
    #[arg(long, default_value = "")]
    city: String,
    #[arg(long, default_value = "")]
    state: String,
    #[arg(long, default_value = "")]
    pincode: String,

    /// Photo to crop
    #[arg(long, value_name = "PATH")]
    photo: Option<PathBuf>,

    /// Square crop `x,y,size` in editor pixels; defaults to the centered crop
    #[arg(long, value_parser = parse_crop, value_name = "X,Y,SIZE")]
    crop: Option<CropRegion>,

    /// Directory the card is written to
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Override the submission endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Do not submit the record
    #[arg(long)]
    no_submit: bool,
}

fn parse_crop(s: &str) -> std::result::Result<CropRegion, String> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("'{}': {}", p, e)))
        .collect::<std::result::Result<_, _>>()?;
    match parts.as_slice() {
        [x, y, size] if *size > 0.0 => Ok(CropRegion::pixels(*x, *y, *size, *size)),
        _ => Err("expected X,Y,SIZE with a positive size".to_string()),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<GeneratorConfig> {
    let mut config = match &cli.config {
        Some(path) => GeneratorConfig::from_json_file(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(t) = &cli.template {
        config.template_path = Some(t.clone());
    }
    if let Some(f) = &cli.font {
        config.font_path = Some(f.clone());
    }
    if let Some(f) = &cli.bold_font {
        config.bold_font_path = Some(f.clone());
    }
    Ok(config)
}

async fn generate(mut config: GeneratorConfig, args: GenerateArgs) -> anyhow::Result<()> {
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    if args.no_submit {
        config.submit = false;
    }

    let mut session = Session::from_config(config)?;
    session.mount().await?;

    for (field, value) in [
        (Field::Name, args.name),
        (Field::IdentifierSeed, args.aadhar),
        (Field::DateOfBirth, args.dob),
        (Field::ContactNumber, args.whatsapp),
        (Field::City, args.city),
        (Field::Region, args.state),
        (Field::PostalCode, args.pincode),
    ] {
        session.set_field(field, value);
    }

    if session
        .select_photo(args.photo.as_deref())
        .await
        .context("loading photo")?
    {
        let region = args.crop.or_else(|| session.editor().pending());
        if let Some(region) = region {
            session.editor_mut().on_crop_finalized(region);
        }
        if !session.apply_crop() {
            bail!("photo could not be cropped");
        }
    }

    let card = match session.generate().await {
        Ok(card) => card,
        Err(Error::MissingFields { fields, photo_missing }) => {
            let mut missing: Vec<&str> = fields.iter().map(|f| f.label()).collect();
            if photo_missing {
                missing.push("Photo");
            }
            bail!("{} (missing: {})", idcard::error::MISSING_FIELDS_MESSAGE, missing.join(", "));
        }
        Err(e) => return Err(e.into()),
    };
    let path = card.save(&args.out).await?;
    println!("{}", path.display());

    let state = session.wait_for_submission().await;
    match state.status {
        SubmissionStatus::Unset => info!("Submission skipped"),
        status => println!("{}", status),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Command::Generate(args) => generate(config, args).await,
        Command::Preview { out } => {
            let config = GeneratorConfig { submit: false, ..config };
            let mut session = Session::from_config(config)?;
            let canvas = session.mount().await?;
            tokio::fs::write(&out, &canvas.png_data)
                .await
                .with_context(|| format!("writing {}", out.display()))?;
            println!("{}", out.display());
            Ok(())
        }
    }
}
