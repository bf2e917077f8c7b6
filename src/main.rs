//! CLI: translate the body of an HTML file and emit the mutated document.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use html5ever::serialize::{serialize, SerializeOpts};
use markup5ever_rcdom::SerializableHandle;
use tracing_subscriber::EnvFilter;

use overlay_translate::dom::{get_body, html_to_dom};
use overlay_translate::{
    translate_selection, HttpBackend, OverlayRegistry, SelectionRange, Settings, TranslateError,
};

#[derive(Parser)]
#[command(
    name = "overlay-translate",
    about = "Translate the text of an HTML document into positioned overlays"
)]
struct Cli {
    /// HTML file to translate.
    input: PathBuf,

    /// TOML settings file with provider, model, and API key.
    #[arg(short, long, default_value = "overlay-translate.toml")]
    settings: PathBuf,

    /// Where to write the translated document (stdout when omitted).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Document charset to assume while parsing.
    #[arg(long, default_value = "utf-8")]
    encoding: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("overlay-translate: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings_raw = fs::read_to_string(&cli.settings).map_err(|e| {
        TranslateError::MissingConfiguration(format!(
            "could not read {}: {e}",
            cli.settings.display()
        ))
    })?;
    let settings = Settings::from_toml_str(&settings_raw)?;

    let html = fs::read(&cli.input)?;
    let dom = html_to_dom(&html, &cli.encoding);

    let body = get_body(&dom).ok_or(TranslateError::NoSelection)?;
    let selection = SelectionRange::select_node_contents(&body);
    let registry = OverlayRegistry::shared(body);

    let backend = HttpBackend::new(
        settings.provider,
        settings.api_key.clone(),
        settings.model.clone(),
    );

    let translation = translate_selection(&dom, &[selection], &settings, &backend, &registry).await?;
    translation.require_success()?;

    if let Some(usage) = translation.aggregate.usage {
        tracing::info!(
            total = usage.total,
            input = usage.input,
            output = usage.output,
            "token usage"
        );
    }

    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = dom.document.clone().into();
    serialize(&mut buf, &serializable, SerializeOpts::default())?;

    match cli.output {
        Some(path) => fs::write(path, buf)?,
        None => {
            use std::io::Write;
            std::io::stdout().write_all(&buf)?;
        }
    }

    Ok(())
}
