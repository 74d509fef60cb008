use std::{
    error::Error,
    path::PathBuf,
};

use clap::Parser;
use favs2anki::{
    anki::DeckBuilder,
    core::{
        http::http_client,
        Enricher,
    },
    dictionary::LeoDictionary,
    persistence::{
        CheckpointStore,
        RecordStore,
    },
    reverso::ReversoClient,
    speech::{
        AudioStore,
        AzureEndpoints,
        AzureSpeech,
        SpeechSynthesizer,
    },
    Settings,
    SyncEngine,
};

/// Syncs Reverso Context favourites into an Anki-ready CSV.
#[derive(Parser, Debug)]
#[command(name = "favs2anki", version, about)]
struct Args {
    /// Reverso username whose favourites are synced
    #[arg(short, long)]
    user: Option<String>,

    /// Skip audio generation
    #[arg(long)]
    no_audio: bool,

    /// Directory for the CSV, checkpoint and audio files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Skip writing the Anki package
    #[arg(long)]
    no_deck: bool,

    /// Favourites requested per page
    #[arg(long)]
    page_size: Option<usize>,

    /// Settings file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    save_settings: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let settings_path = args.config.clone().unwrap_or_else(Settings::default_path);
    let mut settings = Settings::load(&settings_path);

    if let Some(user) = args.user {
        settings.username = user;
    }
    if let Some(dir) = args.data_dir {
        settings.data_dir = Some(dir);
    }
    if let Some(page_size) = args.page_size {
        settings.page_size = page_size;
    }
    if args.no_audio {
        settings.audio = false;
    }
    if args.no_deck {
        settings.build_deck = false;
    }
    settings.validate()?;

    if args.save_settings {
        settings.save(&settings_path)?;
        log::info!("Settings saved to {}", settings_path.display());
    }

    let data_dir = settings.data_dir();
    log::info!("Using data directory {}", data_dir.display());

    let client = http_client()?;
    let reverso = ReversoClient::new(
        client.clone(),
        &settings.reverso_url,
        &settings.source_lang,
        &settings.target_lang,
    );
    let dictionary = LeoDictionary::new(client.clone(), &settings.dictionary_url);

    let speech: Option<Box<dyn SpeechSynthesizer>> = if settings.audio_enabled() {
        Some(Box::new(AzureSpeech::new(
            client,
            &settings.azure_api_key,
            AzureEndpoints::for_region(&settings.azure_region),
            settings.retry_policy(),
            AudioStore::new(settings.audio_dir()),
        )))
    } else {
        if settings.audio {
            log::warn!("AZURE_API_KEY or AZURE_REGION missing, audio generation disabled");
        }
        None
    };

    let mut enricher = Enricher::new(
        settings.languages(),
        &settings.inflected_language,
        Box::new(reverso.clone()),
        Box::new(dictionary),
        speech,
    );
    let mut checkpoints = CheckpointStore::in_dir(&data_dir);
    let mut records = RecordStore::in_dir(&data_dir, settings.languages());

    let report = SyncEngine::new(&reverso, &mut enricher, &mut checkpoints, &mut records)
        .with_page_size(settings.page_size)
        .sync(&settings.username)?;

    if report.is_empty() {
        println!("No new words");
        return Ok(());
    }
    println!("Added {} new words to {}", report.records.len(), records.path().display());

    if settings.build_deck {
        let languages = settings.languages();
        let package_path = settings.package_path();
        let notes = DeckBuilder::new(
            &languages,
            settings.deck_id,
            &settings.deck_name,
            settings.model_id,
            settings.audio_dir(),
        )
        .write_package(&report.records, &package_path)?;
        println!("Added {} notes to {}", notes, package_path.display());
    }
    Ok(())
}
