//! `gigsync rules` - inspect or initialize classification rules.

use anyhow::Result;
use gigsync_core::rules::{default_rules, MatchScope, RuleKind};

use crate::store;
use crate::RulesAction;

pub fn run(action: RulesAction) -> Result<()> {
    match action {
        RulesAction::List => list(),
        RulesAction::Init { force } => init(force),
    }
}

fn list() -> Result<()> {
    let settings = store::load_settings()?;
    let source = if settings.rules.is_empty() {
        "built-in defaults"
    } else {
        "settings.toml"
    };

    println!("Classification rules ({}):", source);

    for rule in settings.effective_rules() {
        let kind = match rule.kind {
            RuleKind::Work => "work",
            RuleKind::Personal => "personal",
        };
        let scope = match rule.scope {
            MatchScope::Title => "title",
            MatchScope::CalendarSource => "calendar",
        };
        let state = if rule.enabled { "" } else { " (disabled)" };

        println!(
            "  [{}] {} on {}{}: {}",
            rule.id,
            kind,
            scope,
            state,
            rule.keywords.join(", ")
        );
    }

    Ok(())
}

fn init(force: bool) -> Result<()> {
    let mut settings = store::load_settings()?;

    if !settings.rules.is_empty() && !force {
        anyhow::bail!("settings.toml already has rules; pass --force to overwrite");
    }

    settings.rules = default_rules();
    store::save_settings(&settings)?;

    eprintln!("Wrote default rules to settings.toml");

    Ok(())
}
