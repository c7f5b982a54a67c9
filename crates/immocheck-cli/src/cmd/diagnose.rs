use crate::output::print_json;
use anyhow::Context;
use base64::Engine as _;
use gemini_agent::{DiagnoseRequest, GeminiClient, GeminiConfig, InlineImage};
use immocheck_core::config::Config;
use immocheck_core::record::UnitKey;
use immocheck_core::store::DirectoryStore;
use immocheck_core::verdict::{diagnosis_prompt, parse_verdict};
use immocheck_core::{ledger, letter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub struct DiagnoseArgs {
    pub property: String,
    pub building: Option<String>,
    pub unit: String,
    pub note: String,
    pub photo: Option<PathBuf>,
    pub letter: Option<String>,
}

pub fn run(root: &Path, args: DiagnoseArgs, json: bool) -> anyhow::Result<()> {
    anyhow::ensure!(!args.note.trim().is_empty(), "--note must not be empty");

    let config = Config::load(root).context("failed to load config")?;
    let key = UnitKey::new(args.property, args.building, args.unit);
    config.validate_key(&key)?;

    let store = DirectoryStore::open(root, &config).context("failed to open directory")?;
    let occupant = store.find_occupant(&key).unwrap_or_default().to_string();

    // Attach the photo inline, if given.
    let image = args
        .photo
        .as_deref()
        .map(|path| -> anyhow::Result<InlineImage> {
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read photo {}", path.display()))?;
            let mime = mime_guess::from_path(path)
                .first_or_octet_stream()
                .to_string();
            Ok(InlineImage {
                mime_type: mime,
                data: base64::engine::general_purpose::STANDARD.encode(bytes),
            })
        })
        .transpose()?;

    let api_key = Config::secret(&config.model.api_key_env)?;
    let client = GeminiClient::new(GeminiConfig {
        api_base: config.model.api_base.clone(),
        api_key,
        name_hint: config.model.name_hint.clone(),
        fallback: config.model.fallback.clone(),
        timeout: Duration::from_secs(config.model.timeout_seconds),
    })?;

    let prompt = diagnosis_prompt(&args.note);
    let request = match image {
        Some(image) => DiagnoseRequest::with_image(prompt, image),
        None => DiagnoseRequest::text(prompt),
    };

    let diagnosis = client
        .diagnose(&request)
        .context("model request failed")?;
    let verdict = parse_verdict(&diagnosis.text);

    let entry = ledger::DiagnosticEntry::new(
        key.clone(),
        occupant.clone(),
        args.note.clone(),
        verdict.liability,
        diagnosis.model.clone(),
        verdict.body.clone(),
    );
    ledger::append(root, &entry).context("failed to record history entry")?;

    let draft = args
        .letter
        .as_deref()
        .map(|kind| -> anyhow::Result<String> {
            let kind: letter::LetterKind = kind.parse()?;
            Ok(letter::render(&letter::LetterInput {
                kind,
                occupant: occupant.clone(),
                key: key.clone(),
                issue: args.note.clone(),
                liability: verdict.liability,
                date: chrono::Utc::now(),
            }))
        })
        .transpose()?;

    if json {
        print_json(&serde_json::json!({
            "model": diagnosis.model,
            "liability": verdict.liability,
            "response": verdict.body,
            "occupant": occupant,
            "letter": draft,
        }))?;
        return Ok(());
    }

    println!("Model:    {}", diagnosis.model);
    println!("Unit:     {key}");
    println!(
        "Occupant: {}",
        if occupant.is_empty() { "unknown" } else { occupant.as_str() }
    );
    println!("Verdict:  {}", verdict.liability);
    println!("\n{}", verdict.body);
    if let Some(draft) = draft {
        println!("\n--- letter ---\n{draft}");
    }
    Ok(())
}
