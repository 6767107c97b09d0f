// ============================================
// src/plain.rs
// プロンプト形式のフロントエンド (dialoguer)
// ============================================

use console::{Term, style};
use dialoguer::{MultiSelect, Select, theme::ColorfulTheme};
use rand::Rng;

use crate::catalog::Catalog;
use crate::engine::{MIN_POOL_SIZE, QuizEngine};
use crate::session::{self, Event, Notice, State};

/// クイズ後のメニュー
const MENU: &[&str] = &["Next question", "Back to selection", "Quit"];

/// グループ一覧を表示する (`--list`)
pub fn print_groups(catalog: &Catalog) -> std::io::Result<()> {
    let term = Term::stdout();
    for group in catalog.groups() {
        term.write_line(&format!(
            "{} {} ({} kanji)",
            style(format!("{:<16}", group.id)).cyan(),
            group.label,
            group.items.len()
        ))?;
    }
    Ok(())
}

/// 選択画面での変更をイベント列に変換する
fn toggle_events(catalog: &Catalog, state: &State, picked: &[usize]) -> Vec<Event> {
    let State::Selecting { selected, .. } = state else {
        return Vec::new();
    };

    catalog
        .groups()
        .iter()
        .enumerate()
        .filter(|(i, group)| picked.contains(i) != selected.contains(&group.id))
        .map(|(_, group)| Event::ToggleGroup(group.id.clone()))
        .collect()
}

pub fn run<R: Rng>(catalog: &Catalog, engine: &mut QuizEngine<R>) -> anyhow::Result<()> {
    let term = Term::stdout();
    let theme = ColorfulTheme::default();
    let mut state = State::default();

    term.write_line(&style("Kanji Quiz").bold().to_string())?;

    loop {
        state = match &state {
            State::Selecting { selected, notice } => {
                if let Some(Notice::InsufficientPool { available }) = notice {
                    term.write_line(
                        &style(format!(
                            "Select groups with at least {MIN_POOL_SIZE} kanji in total to start ({available} selected)."
                        ))
                        .red()
                        .to_string(),
                    )?;
                }

                let labels: Vec<String> = catalog
                    .groups()
                    .iter()
                    .map(|g| format!("{} ({} kanji)", g.label, g.items.len()))
                    .collect();
                let defaults: Vec<bool> = catalog
                    .groups()
                    .iter()
                    .map(|g| selected.contains(&g.id))
                    .collect();

                let Some(picked) = MultiSelect::with_theme(&theme)
                    .with_prompt("Select groups (Space to toggle, Enter to start)")
                    .items(&labels)
                    .defaults(&defaults)
                    .interact_opt()?
                else {
                    return Ok(());
                };

                let mut next = state.clone();
                for event in toggle_events(catalog, &state, &picked) {
                    next = session::transition(catalog, engine, next, event);
                }
                session::transition(catalog, engine, next, Event::StartQuiz)
            }

            State::Playing(round) => match round.question.as_ref() {
                None => {
                    term.write_line("Loading question...")?;
                    session::transition(catalog, engine, state.clone(), Event::BackToSelection)
                }

                Some(question) if round.answer.is_none() => {
                    term.write_line("")?;
                    term.write_line(&format!(
                        "Question #{}   {}",
                        round.number,
                        style(&question.prompt).bold()
                    ))?;

                    let Some(idx) = Select::with_theme(&theme)
                        .with_prompt("Choose the reading")
                        .items(&question.options)
                        .default(0)
                        .interact_opt()?
                    else {
                        return Ok(());
                    };

                    let chosen = question.options[idx].clone();
                    let next = session::transition(
                        catalog,
                        engine,
                        state.clone(),
                        Event::SelectOption(chosen),
                    );
                    if let State::Playing(answered) = &next {
                        print_feedback(&term, answered)?;
                    }
                    next
                }

                Some(_) => {
                    let choice = Select::with_theme(&theme)
                        .items(MENU)
                        .default(0)
                        .interact_opt()?;
                    let event = match choice {
                        Some(0) => Event::NextQuestion,
                        Some(1) => Event::BackToSelection,
                        _ => return Ok(()),
                    };
                    session::transition(catalog, engine, state.clone(), event)
                }
            },
        };
    }
}

fn print_feedback(term: &Term, round: &session::Round) -> std::io::Result<()> {
    let (Some(answer), Some(question)) = (&round.answer, &round.question) else {
        return Ok(());
    };

    if answer.verdict.is_correct() {
        term.write_line(&style("Correct!").green().bold().to_string())?;
    } else {
        term.write_line(
            &style(format!("Wrong... the answer is {}", question.correct_reading))
                .red()
                .to_string(),
        )?;
    }
    term.write_line(&format!("Correct: {} / {}", round.correct, round.answered))
}
