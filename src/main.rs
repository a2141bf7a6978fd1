use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde_json::json;

use mention_editor::cli::{parse_category, CliArgs, Command};
use mention_editor::config_paths;
use mention_editor::cursor::{analyze, focused_lines};
use mention_editor::entity::normalize_with;
use mention_editor::markdown::{mention_links, render_html};
use mention_editor::provider::{EntityLookupProvider, FixtureProvider, SearchProvider};
use mention_editor::replay::{self, ReplayScript};
use mention_editor::trigger::TriggerResolver;
use mention_editor::view::RenderSnapshot;
use mention_editor::{MentionConfig, Runtime, TextBuffer};

type Providers = (Arc<dyn SearchProvider>, Arc<dyn EntityLookupProvider>);

fn providers(config: &MentionConfig, fixtures: Option<&Path>) -> Result<Providers> {
    // Without HTTP, fall back to the fixtures file in the config dir
    let default_fixtures = if cfg!(feature = "http") {
        None
    } else {
        config_paths::fixtures_file().filter(|path| path.is_file())
    };

    if let Some(path) = fixtures.or(default_fixtures.as_deref()) {
        let fixture = Arc::new(
            FixtureProvider::load(path)
                .with_context(|| format!("loading fixtures from {}", path.display()))?,
        );
        let search: Arc<dyn SearchProvider> = fixture.clone();
        let lookup: Arc<dyn EntityLookupProvider> = fixture;
        return Ok((search, lookup));
    }

    #[cfg(feature = "http")]
    {
        let client = Arc::new(mention_editor::http::ApiClient::new(
            &config.api_base,
            config.request_timeout(),
        ));
        let search: Arc<dyn SearchProvider> = client.clone();
        let lookup: Arc<dyn EntityLookupProvider> = client;
        Ok((search, lookup))
    }
    #[cfg(not(feature = "http"))]
    {
        let _ = config;
        Err(anyhow!(
            "built without the `http` feature; pass --fixtures or create {}",
            config_paths::fixtures_file()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "fixtures.json in the config dir".to_string())
        ))
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    mention_editor::tracing::init();

    let args = CliArgs::parse();
    let config = match &args.config {
        Some(path) => MentionConfig::load_from(path),
        None => MentionConfig::load(),
    };

    match args.command {
        Command::Analyze {
            text,
            caret,
            selection_start,
        } => {
            let end = caret.unwrap_or_else(|| text.chars().count());
            let buffer = TextBuffer::new(text, selection_start.unwrap_or(end), end);
            let resolver = TriggerResolver::new(config.triggers.clone(), config.quoted_mentions);
            let token = analyze(&buffer);
            let mention = resolver.resolve_at(&buffer, &token);
            print_json(&json!({
                "token": token,
                "mention": mention,
                "lines": focused_lines(&buffer),
            }))?;
        }

        Command::Search {
            category,
            query,
            fixtures,
        } => {
            let category = parse_category(&category, &config.triggers).map_err(|e| anyhow!(e))?;
            let (search, _) = providers(&config, fixtures.as_deref())?;
            let raw = search.search(category, &query)?;
            let insertion = config.insertion.for_category(category, &config.triggers);
            let entities: Vec<_> = raw
                .iter()
                .filter_map(|raw| normalize_with(raw, insertion).ok())
                .take(config.max_results)
                .collect();
            print_json(&entities)?;
        }

        Command::Lookup { path, fixtures } => {
            let (_, lookup) = providers(&config, fixtures.as_deref())?;
            let entity = lookup
                .lookup(&path)?
                .map(|raw| mention_editor::entity::normalize(&raw))
                .transpose()?;
            print_json(&entity)?;
        }

        Command::Replay { script, fixtures } => {
            let script = ReplayScript::load(&script)?;
            let (search, lookup) = providers(&config, fixtures.as_deref())?;
            let mut runtime = Runtime::new(config, search, lookup).with_surface(
                |snapshot: &RenderSnapshot| match serde_json::to_string(snapshot) {
                    Ok(line) => println!("{}", line),
                    Err(e) => tracing::warn!("Failed to encode snapshot: {}", e),
                },
            );
            replay::run(&script, &mut runtime)?;
            runtime.dispose();
        }

        Command::Preview { file, links } => {
            let source = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            if links {
                print_json(&mention_links(&source))?;
            } else {
                print!("{}", render_html(&source));
            }
        }
    }

    Ok(())
}
