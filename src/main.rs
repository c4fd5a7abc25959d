use anyhow::{anyhow, bail, Context};
use chrono::Local;
use signboard_translator::utils::LoggingConfig;
use signboard_translator::{
    format_date, format_day, format_size, AppConfig, AutoConfirm, Confirm, DeleteOutcome, EntryId,
    HistoryBackend, HistoryBrowser, HistoryEntry, HttpBackend, ImageFile, SessionPhase,
    TerminalPrompt, TranslationSession,
};
use std::env;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const USAGE: &str = "\
Usage: signboard-translator [--config PATH] <command>

Commands:
  translate <image> [--out PATH]   Translate the text on a sign
  history [PAGE]                   List past translations
  show <ID>                        Show one translation in full
  stats                            Show aggregate statistics
  delete <ID> [--yes]              Delete one translation
  clear [--yes]                    Delete all translations
  health                           Check the backend";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args: Vec<String> = env::args().skip(1).collect();

    let config_path = take_value(&mut args, "--config")?;
    let config = AppConfig::load(config_path.as_deref())?;
    init_logging(&config.logging)?;
    tracing::debug!(base_url = %config.server.base_url, "Loaded configuration");

    let backend = HttpBackend::new(&config.server)?;

    let Some(command) = (!args.is_empty()).then(|| args.remove(0)) else {
        println!("{}", USAGE);
        return Ok(());
    };

    match command.as_str() {
        "translate" => {
            let out = take_value(&mut args, "--out")?.map(PathBuf::from);
            let path = args.first().ok_or_else(|| anyhow!("translate needs an image path"))?;
            translate(&config, &backend, Path::new(path), out).await
        }
        "history" => {
            let page = match args.first() {
                Some(p) => p.parse::<u32>().context("PAGE must be a number")?,
                None => 1,
            };
            history(&config, &backend, page).await
        }
        "show" => {
            let id = args.first().ok_or_else(|| anyhow!("show needs an ID"))?;
            let entry = backend.fetch_entry(&EntryId::from(id.as_str())).await?;
            print_entry(&entry);
            Ok(())
        }
        "stats" => {
            let stats = backend.fetch_stats().await?;
            println!("Translations:        {}", stats.total_translations);
            println!("Average time:        {}s", stats.average_processing_time_seconds);
            println!("Total time:          {}s", stats.total_processing_time_seconds);
            println!("Texts translated:    {}", stats.total_texts_translated);
            if !stats.languages_detected.is_empty() {
                println!("Languages detected:  {}", stats.languages_detected.join(", "));
            }
            Ok(())
        }
        "delete" => {
            let yes = take_flag(&mut args, "--yes");
            let id = args.first().ok_or_else(|| anyhow!("delete needs an ID"))?;
            let id = EntryId::from(id.as_str());
            let mut browser = HistoryBrowser::new(config.history.per_page);
            browser.open(&backend).await;
            let outcome = browser.delete_one(&backend, &id, confirmer(yes)).await;
            report(outcome, &browser)
        }
        "clear" => {
            let yes = take_flag(&mut args, "--yes");
            let mut browser = HistoryBrowser::new(config.history.per_page);
            browser.open(&backend).await;
            let outcome = browser.delete_all(&backend, confirmer(yes)).await;
            report(outcome, &browser)
        }
        "health" => {
            println!("{}", backend.health().await?);
            Ok(())
        }
        other => bail!("unknown command {:?}\n\n{}", other, USAGE),
    }
}

fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(format!("signboard_translator={}", config.level))
    })?;

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

async fn translate(
    config: &AppConfig,
    backend: &HttpBackend,
    path: &Path,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let image = ImageFile::from_path(path).await?;

    let mut session = TranslationSession::new(&config.upload);
    if session.select_file(Some(image)) != SessionPhase::FileSelected {
        bail!(describe_error(session.error()));
    }

    if session.submit(backend).await != SessionPhase::Succeeded {
        bail!(describe_error(session.error()));
    }
    let Some(result) = session.result() else {
        bail!("translation finished without a result");
    };

    if result.is_empty() {
        println!("No text was detected in the image. Try with a clearer image containing text.");
    }
    for (i, pair) in result.pairs().enumerate() {
        println!("{:>3}. {}", i + 1, pair.original);
        println!("     -> {}", pair.translated);
        if pair.is_unchanged() {
            println!("     (already in the target language)");
        }
    }
    println!("Processing time: {}s", result.processing_time_seconds());

    if let Some(png) = result.processed_image() {
        let target = out.unwrap_or_else(|| processed_image_path(path));
        tokio::fs::write(&target, png)
            .await
            .with_context(|| format!("writing {}", target.display()))?;
        println!("Processed image: {}", target.display());
    }
    Ok(())
}

async fn history(config: &AppConfig, backend: &HttpBackend, page: u32) -> anyhow::Result<()> {
    let mut browser = HistoryBrowser::new(config.history.per_page);
    browser.open(backend).await;
    browser.change_page(backend, page).await;

    if let Some(err) = browser.error() {
        bail!(err.user_message());
    }

    if let Some(stats) = browser.stats() {
        println!(
            "{} translations, {}s avg",
            stats.total_translations, stats.average_processing_time_seconds
        );
    }
    if browser.entries().is_empty() {
        println!("No translation history yet");
    }
    for entry in browser.entries() {
        println!(
            "{:>8}  {:<32} {:>10}  {:>3} texts found  {}",
            entry.id,
            entry.original_filename,
            format_size(entry.image_size_bytes),
            entry.text_count(),
            format_day(&entry.created_at.with_timezone(&Local)),
        );
    }
    println!("Page {} of {}", browser.current_page(), browser.total_pages());
    Ok(())
}

fn print_entry(entry: &HistoryEntry) {
    println!("File name:        {}", entry.original_filename);
    println!("File size:        {}", format_size(entry.image_size_bytes));
    if let Some(dimensions) = &entry.image_dimensions {
        println!("Dimensions:       {}", dimensions);
    }
    println!("Processing time:  {}s", entry.processing_time_seconds);
    println!(
        "Created:          {}",
        format_date(&entry.created_at.with_timezone(&Local))
    );
    for pair in entry.pairs() {
        println!();
        println!("  Original: {}", pair.original);
        println!("  English:  {}", pair.translated);
    }
}

fn report(outcome: DeleteOutcome, browser: &HistoryBrowser) -> anyhow::Result<()> {
    match outcome {
        DeleteOutcome::Deleted => {
            if let Some(stats) = browser.stats() {
                println!("Done. {} translations remain.", stats.total_translations);
            } else {
                println!("Done.");
            }
            Ok(())
        }
        DeleteOutcome::Cancelled => {
            println!("Cancelled.");
            Ok(())
        }
        DeleteOutcome::Failed => bail!(describe_error(browser.action_error())),
    }
}

fn confirmer(yes: bool) -> &'static dyn Confirm {
    if yes {
        &AutoConfirm
    } else {
        &TerminalPrompt
    }
}

fn describe_error(err: Option<&signboard_translator::SignboardError>) -> String {
    err.map(|e| e.user_message())
        .unwrap_or_else(|| "unknown error".to_string())
}

fn processed_image_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    input.with_file_name(format!("{}.translated.png", stem))
}

fn take_flag(args: &mut Vec<String>, flag: &str) -> bool {
    match args.iter().position(|a| a == flag) {
        Some(i) => {
            args.remove(i);
            true
        }
        None => false,
    }
}

fn take_value(args: &mut Vec<String>, flag: &str) -> anyhow::Result<Option<String>> {
    let Some(i) = args.iter().position(|a| a == flag) else {
        return Ok(None);
    };
    args.remove(i);
    if i >= args.len() {
        bail!("{} needs a value", flag);
    }
    Ok(Some(args.remove(i)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn take_value_removes_flag_and_value() {
        let mut argv = args(&["--config", "alt.toml", "stats"]);
        let value = take_value(&mut argv, "--config").unwrap();
        assert_eq!(value.as_deref(), Some("alt.toml"));
        assert_eq!(argv, args(&["stats"]));
    }

    #[test]
    fn take_value_without_flag_is_none() {
        let mut argv = args(&["stats"]);
        assert!(take_value(&mut argv, "--config").unwrap().is_none());
        assert_eq!(argv, args(&["stats"]));
    }

    #[test]
    fn trailing_flag_without_value_is_an_error() {
        let mut argv = args(&["stats", "--config"]);
        let err = take_value(&mut argv, "--config").unwrap_err();
        assert!(err.to_string().contains("--config"));
    }
}
