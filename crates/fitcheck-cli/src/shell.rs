//! `fitcheck shell`: one studio kept open across commands.
//!
//! One-shot invocations restore the trimmed snapshot every time, so their
//! history never holds more than the current entry. The shell mounts once and
//! keeps the full history in memory, which is what makes `undo` useful.

use std::borrow::Cow::{self, Borrowed};

use anyhow::Result;
use clap::{CommandFactory, Parser};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use crate::args::{ShellCommand, ShellLine};
use crate::commands;
use crate::context::AppContext;

/// Completes and hints command names.
struct ShellHelper {
    commands: Vec<String>,
}

impl ShellHelper {
    fn new() -> Self {
        let commands = ShellLine::command()
            .get_subcommands()
            .map(|command| command.get_name().to_string())
            .collect();
        Self { commands }
    }

    fn matching<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a String> + 'a {
        self.commands
            .iter()
            .filter(move |command| command.starts_with(prefix))
    }
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if line.contains(' ') {
            return Ok((0, vec![]));
        }
        let candidates = self
            .matching(line)
            .map(|command| Pair {
                display: command.clone(),
                replacement: command.clone(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.is_empty() || line.contains(' ') {
            return None;
        }
        self.matching(line)
            .find(|command| command.len() > line.len())
            .map(|command| command[line.len()..].to_string())
    }
}

impl Highlighter for ShellHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Borrowed(line)
    }
}

impl Validator for ShellHelper {}

enum Flow {
    Continue,
    Quit,
}

pub async fn run(ctx: AppContext) -> Result<()> {
    commands::mount(&ctx).await;
    commands::print_view(&ctx.studio.view().await);

    let mut rl: Editor<ShellHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(ShellHelper::new()));

    println!("=== FitCheck shell ===");
    println!("Type 'help' for commands, 'quit' to exit.");

    loop {
        match rl.readline("fitcheck> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match dispatch(&ctx, trimmed).await {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break,
                    Err(e) => println!("❌ {:#}", e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C detected. Type 'quit' to exit.");
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    println!("Bye");
    Ok(())
}

async fn dispatch(ctx: &AppContext, line: &str) -> Result<Flow> {
    let words = split_words(line)?;
    let parsed = match ShellLine::try_parse_from(words) {
        Ok(parsed) => parsed,
        Err(e) => {
            // Help and usage errors are printed, not fatal
            e.print()?;
            return Ok(Flow::Continue);
        }
    };

    match parsed.command {
        ShellCommand::Quit => return Ok(Flow::Quit),
        ShellCommand::Undo => commands::session::undo(ctx).await?,
        ShellCommand::Studio(command) => commands::run(ctx, command).await?,
    }
    Ok(Flow::Continue)
}

/// Splits a line on whitespace, keeping single- or double-quoted runs together.
fn split_words(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match (quote, c) {
            (Some(open), c) if c == open => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(open) = quote {
        anyhow::bail!("Unclosed {open} quote");
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use fitcheck_application::FitCheckStudio;
    use fitcheck_core::error::{GenerationError, Result as CoreResult};
    use fitcheck_core::generation::{CompositeRequest, GenerationService, ImagePayload, ImageResolver};
    use fitcheck_core::wardrobe::WardrobeStore;
    use fitcheck_infrastructure::{
        KvPendingImportSource, KvSessionRepository, KvWardrobeRepository, MemoryKeyValueStore,
    };

    struct EchoGenerator;

    #[async_trait]
    impl GenerationService for EchoGenerator {
        async fn composite(&self, request: CompositeRequest) -> std::result::Result<String, GenerationError> {
            Ok(format!("gen://composite/{}", request.garment_count()))
        }

        async fn repose(&self, _base_image: &str, instruction: &str) -> std::result::Result<String, GenerationError> {
            Ok(format!("gen://pose/{instruction}"))
        }

        async fn generate_model(&self, _photo: &str) -> std::result::Result<String, GenerationError> {
            Ok("gen://model".to_string())
        }
    }

    struct BytesResolver;

    #[async_trait]
    impl ImageResolver for BytesResolver {
        async fn fetch(&self, url: &str) -> CoreResult<ImagePayload> {
            Ok(ImagePayload::new("image/png", url.as_bytes().to_vec()))
        }
    }

    fn memory_context() -> AppContext {
        let durable = Arc::new(MemoryKeyValueStore::new());
        let short_lived = Arc::new(MemoryKeyValueStore::new());
        let wardrobe = Arc::new(WardrobeStore::new(Arc::new(
            KvWardrobeRepository::new(durable.clone()).with_mirror(short_lived.clone()),
        )));
        let sessions = Arc::new(KvSessionRepository::new(durable.clone(), short_lived));
        let resolver: Arc<dyn ImageResolver> = Arc::new(BytesResolver);
        AppContext {
            studio: FitCheckStudio::new(wardrobe, sessions, Arc::new(EchoGenerator), resolver.clone()),
            imports: KvPendingImportSource::new(durable),
            resolver,
        }
    }

    #[test]
    fn test_split_words_keeps_quoted_runs() {
        assert_eq!(
            split_words(r#"try-on --file dress.png --name "Đầm Maxi Hoa""#).unwrap(),
            vec!["try-on", "--file", "dress.png", "--name", "Đầm Maxi Hoa"]
        );
        assert_eq!(split_words("  undo  ").unwrap(), vec!["undo"]);
        assert_eq!(split_words("classify ''").unwrap(), vec!["classify", ""]);
        assert!(split_words("classify 'Áo Thun").is_err());
    }

    #[tokio::test]
    async fn test_undo_walks_back_within_one_shell() {
        let ctx = memory_context();
        commands::mount(&ctx).await;

        for line in [
            "establish https://img.example/model.png",
            "try-on default-white-shirt",
            "try-on default-jeans",
        ] {
            assert!(matches!(dispatch(&ctx, line).await.unwrap(), Flow::Continue));
        }
        assert_eq!(ctx.studio.view().await.history_len, 3);

        dispatch(&ctx, "undo").await.unwrap();
        let view = ctx.studio.view().await;
        assert_eq!(view.cursor, Some(1));
        assert_eq!(view.active_garment_ids, vec!["default-white-shirt".to_string()]);

        dispatch(&ctx, "undo").await.unwrap();
        assert_eq!(ctx.studio.view().await.cursor, Some(0));
    }

    #[tokio::test]
    async fn test_bad_line_keeps_shell_open() {
        let ctx = memory_context();
        assert!(matches!(dispatch(&ctx, "dance").await.unwrap(), Flow::Continue));
        assert!(matches!(dispatch(&ctx, "quit").await.unwrap(), Flow::Quit));
        assert!(dispatch(&ctx, "try-on 'unterminated").await.is_err());
    }
}
