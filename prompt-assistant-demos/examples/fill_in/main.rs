mod canned;

use std::io::{stdin, stdout, BufRead, Write};

use anyhow::Result;
use prompt_assistant::filler::FieldMode;
use prompt_assistant::llm::client::HttpImprover;
use prompt_assistant::llm::ImprovePrompt;
use prompt_assistant::session::{CopyAction, FillDialog, PromptSession};
use prompt_assistant::settings::{JsonFileSettingsStore, Settings};
use prompt_assistant::utils::printing::PreviewPrinter;

use crate::canned::CannedImprover;

fn read_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    stdout().flush()?;
    let mut line = String::new();
    stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn ask(dialog: &mut FillDialog, id: &str) -> Result<()> {
    let Some(placeholder) = dialog.placeholders().iter().find(|p| p.id == id).cloned() else {
        return Ok(());
    };
    if !placeholder.has_options() {
        let value = read_line(&format!("{}: ", placeholder.label))?;
        dialog.set_text(id, value)?;
        return Ok(());
    }
    for (i, option) in placeholder.options().iter().enumerate() {
        println!("  {}) {}", i + 1, option);
    }
    println!("  c) Custom...");
    let answer = read_line(&format!("{}: ", placeholder.label))?;
    if answer.trim() == "c" {
        dialog.choose_custom(id)?;
        if let FieldMode::Custom(_) = dialog.field_mode(id)? {
            let text = read_line(&format!("{} (custom): ", placeholder.label))?;
            dialog.set_custom_text(id, text)?;
        }
    } else {
        let chosen = answer
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| placeholder.options().get(i).cloned())
            .unwrap_or_default();
        dialog.select_option(id, chosen)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings_path = std::env::args().nth(1).unwrap_or_else(|| "prompt-assistant-settings.json".to_string());
    let settings = Settings::load(&JsonFileSettingsStore::new(settings_path)).await?;
    let improver: Box<dyn ImprovePrompt> = if settings.needs_setup() {
        println!("No API key configured, using a canned reply.");
        Box::new(CannedImprover)
    } else {
        Box::new(HttpImprover::new()?)
    };

    let mut session = PromptSession::new();
    session.set_prompt(read_line("Prompt to improve: ")?);
    session.improve(improver.as_ref(), &settings.provider_config(), &[]).await?;

    println!("Improvements:");
    for point in session.improvement_points() {
        println!("  - {}", point);
    }

    if let Some(mut dialog) = session.open_fill_dialog() {
        let mut printer = PreviewPrinter::default();
        let ids: Vec<String> = dialog.placeholders().iter().map(|p| p.id.clone()).collect();
        for id in &ids {
            printer.print(&format!("{}\n\n", dialog.preview()))?;
            ask(&mut dialog, id)?;
        }
        printer.print(&format!("{}\n\n", dialog.preview()))?;
        printer.detach();
        session.apply_fill_dialog(dialog)?;
    }

    match session.copy_action() {
        CopyAction::Copy(text) => println!("Final prompt:\n{}", text),
        CopyAction::FillRequired => println!("Some placeholders are still empty, nothing to copy."),
        CopyAction::Nothing => println!("Nothing to copy."),
    }
    Ok(())
}
