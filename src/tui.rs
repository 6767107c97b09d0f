// ============================================
// src/tui.rs (ターミナル UI)
// ============================================

use std::io::{Result, stdout};
use std::time::Duration;

use crossterm::{
    ExecutableCommand,
    cursor::{Hide, Show},
    event::{self, Event as TermEvent, KeyCode},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};

use ratatui::{
    prelude::*,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use rand::Rng;

use crate::catalog::Catalog;
use crate::engine::{MIN_POOL_SIZE, QuizEngine, Verdict};
use crate::session::{self, Event, Notice, Round, State};

// --------------------------------------------------
// データ構造
// --------------------------------------------------

/// キー入力の処理結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// アプリ全体の状態を管理する
pub struct AppState<R> {
    catalog: Catalog,
    engine: QuizEngine<R>,
    state: State,

    /// 選択画面のカーソル位置
    group_cursor: usize,
    /// クイズ画面のカーソル位置
    option_cursor: usize,
}

impl<R: Rng> AppState<R> {
    pub fn new(catalog: Catalog, engine: QuizEngine<R>) -> Self {
        Self {
            catalog,
            engine,
            state: State::default(),
            group_cursor: 0,
            option_cursor: 0,
        }
    }

    /// イベントを状態機械に渡す
    fn dispatch(&mut self, event: Event) {
        let state = std::mem::take(&mut self.state);
        self.state = session::transition(&self.catalog, &mut self.engine, state, event);
    }

    /// キー入力の処理
    fn handle_key(&mut self, code: KeyCode) -> Flow {
        if code == KeyCode::Esc {
            return Flow::Quit;
        }

        match &self.state {
            State::Selecting { .. } => self.handle_selecting_key(code),
            State::Playing(round) => {
                let option_count = round.question.as_ref().map_or(0, |q| q.options.len());
                let answered = round.answer.is_some();
                self.handle_playing_key(code, option_count, answered);
                Flow::Continue
            }
        }
    }

    fn handle_selecting_key(&mut self, code: KeyCode) -> Flow {
        let group_count = self.catalog.len();

        match code {
            KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Up | KeyCode::Char('k') => {
                self.group_cursor = self.group_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.group_cursor + 1 < group_count {
                    self.group_cursor += 1;
                }
            }
            KeyCode::Char(' ') => {
                if let Some(group) = self.catalog.groups().get(self.group_cursor) {
                    let id = group.id.clone();
                    self.dispatch(Event::ToggleGroup(id));
                }
            }
            KeyCode::Enter => {
                self.dispatch(Event::StartQuiz);
                self.option_cursor = 0;
            }
            _ => {}
        }
        Flow::Continue
    }

    fn handle_playing_key(&mut self, code: KeyCode, option_count: usize, answered: bool) {
        match code {
            KeyCode::Backspace | KeyCode::Char('b') => {
                self.dispatch(Event::BackToSelection);
            }
            KeyCode::Up | KeyCode::Char('k') if !answered => {
                self.option_cursor = self.option_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') if !answered => {
                if self.option_cursor + 1 < option_count {
                    self.option_cursor += 1;
                }
            }
            // 数字キーで直接回答
            KeyCode::Char(c @ '1'..='9') if !answered => {
                let idx = c as usize - '1' as usize;
                if idx < option_count {
                    self.option_cursor = idx;
                    self.answer_at_cursor();
                }
            }
            KeyCode::Enter if !answered => self.answer_at_cursor(),
            KeyCode::Enter | KeyCode::Char('n') if answered => {
                self.dispatch(Event::NextQuestion);
                self.option_cursor = 0;
            }
            _ => {}
        }
    }

    fn answer_at_cursor(&mut self) {
        let chosen = match &self.state {
            State::Playing(round) => round
                .question
                .as_ref()
                .and_then(|q| q.options.get(self.option_cursor))
                .cloned(),
            State::Selecting { .. } => None,
        };
        if let Some(chosen) = chosen {
            self.dispatch(Event::SelectOption(chosen));
        }
    }
}

// --------------------------------------------------
// TUIセットアップと実行ループ
// --------------------------------------------------

pub fn run<R: Rng>(app_state: &mut AppState<R>) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, app_state);
    // ループがエラーでも端末は元に戻す
    restore_terminal()?;
    result
}

fn setup_terminal() -> Result<Terminal<impl Backend>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?; // 代替スクリーンを使用
    stdout().execute(Hide)?; // カーソルを非表示
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

fn restore_terminal() -> Result<()> {
    stdout().execute(Show)?; // カーソルを再表示
    stdout().execute(LeaveAlternateScreen)?; // 代替スクリーンを終了
    disable_raw_mode()?;
    Ok(())
}

fn run_app<R: Rng>(terminal: &mut Terminal<impl Backend>, app_state: &mut AppState<R>) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app_state))?;

        if event::poll(Duration::from_millis(50))? {
            if let TermEvent::Key(key) = event::read()? {
                if key.kind == event::KeyEventKind::Press
                    && app_state.handle_key(key.code) == Flow::Quit
                {
                    break;
                }
            }
        }
    }

    Ok(())
}

// --------------------------------------------------
// UI描画
// --------------------------------------------------

fn ui<R>(f: &mut Frame, app_state: &AppState<R>) {
    let size = f.area();
    // 枠線を描画
    let block = Block::default().borders(Borders::ALL).title("Kanji Quiz");
    let inner_area = block.inner(size);
    f.render_widget(block, size);

    match &app_state.state {
        State::Selecting { selected, notice } => {
            draw_selecting(f, inner_area, app_state, selected, notice.as_ref())
        }
        State::Playing(round) => draw_playing(f, inner_area, app_state.option_cursor, round),
    }
}

fn draw_selecting<R>(
    f: &mut Frame,
    area: Rect,
    app_state: &AppState<R>,
    selected: &std::collections::BTreeSet<String>,
    notice: Option<&Notice>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // [0] 説明
            Constraint::Min(1),    // [1] グループ一覧
            Constraint::Length(1), // [2] お知らせ
            Constraint::Length(1), // [3] 操作説明
        ])
        .split(area);

    f.render_widget(
        Paragraph::new("Select one or more groups, then press Enter to start.")
            .style(Style::default().fg(Color::Gray))
            .centered(),
        chunks[0],
    );

    let lines: Vec<Line> = app_state
        .catalog
        .groups()
        .iter()
        .enumerate()
        .map(|(i, group)| {
            let checked = if selected.contains(&group.id) { "[x]" } else { "[ ]" };
            let text = format!("{} {} ({} kanji)", checked, group.label, group.items.len());
            let style = if i == app_state.group_cursor {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else if selected.contains(&group.id) {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(Span::styled(text, style))
        })
        .collect();
    f.render_widget(Paragraph::new(lines), chunks[1]);

    if let Some(Notice::InsufficientPool { available }) = notice {
        let text = format!(
            "Select groups with at least {} kanji in total to start ({} selected).",
            MIN_POOL_SIZE, available
        );
        f.render_widget(
            Paragraph::new(text)
                .style(Style::default().fg(Color::White).bg(Color::Red))
                .centered(),
            chunks[2],
        );
    }

    f.render_widget(
        Paragraph::new("↑/↓ move  Space toggle  Enter start  Esc quit")
            .style(Style::default().fg(Color::DarkGray))
            .centered(),
        chunks[3],
    );
}

fn draw_playing(f: &mut Frame, area: Rect, option_cursor: usize, round: &Round) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // [0] 問題番号・正解数
            Constraint::Length(1), // [1] 空白
            Constraint::Length(1), // [2] 漢字
            Constraint::Length(1), // [3] 空白
            Constraint::Min(4),    // [4] 選択肢
            Constraint::Length(1), // [5] 判定
            Constraint::Length(1), // [6] 操作説明
        ])
        .split(area);

    let status = format!(
        "Question #{}   Correct: {} / {}",
        round.number, round.correct, round.answered
    );
    f.render_widget(
        Paragraph::new(status).style(Style::default().fg(Color::Yellow)),
        chunks[0],
    );

    let Some(question) = round.question.as_ref() else {
        f.render_widget(Paragraph::new("Loading question...").centered(), chunks[2]);
        return;
    };

    // 漢字
    f.render_widget(
        Paragraph::new(question.prompt.as_str())
            .style(Style::default().fg(Color::White).bold())
            .centered(),
        chunks[2],
    );

    // 選択肢
    let lines: Vec<Line> = question
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let text = format!("{}. {}", i + 1, option);
            let style = match &round.answer {
                Some(answer) if *option == answer.chosen => match answer.verdict {
                    Verdict::Correct => Style::default().fg(Color::Black).bg(Color::Green),
                    Verdict::Wrong => Style::default().fg(Color::White).bg(Color::Red),
                },
                // 間違えたときは正解も示す
                Some(_) if question.correct_index() == Some(i) => Style::default().fg(Color::Green),
                Some(_) => Style::default().fg(Color::DarkGray),
                None if i == option_cursor => Style::default().fg(Color::Black).bg(Color::White),
                None => Style::default().fg(Color::Gray),
            };
            Line::from(Span::styled(text, style)).centered()
        })
        .collect();
    f.render_widget(Paragraph::new(lines), chunks[4]);

    // 判定
    let feedback = match &round.answer {
        Some(answer) if answer.verdict.is_correct() => {
            Line::from("Correct!").style(Style::default().fg(Color::Green).bold())
        }
        Some(_) => Line::from(format!("Wrong... the answer is {}", question.correct_reading))
            .style(Style::default().fg(Color::Red)),
        None => Line::from(""),
    };
    f.render_widget(Paragraph::new(feedback).centered(), chunks[5]);

    let help = if round.answer.is_some() {
        "Enter/n next  b back  Esc quit"
    } else {
        "↑/↓ move  1-4 or Enter answer  b back  Esc quit"
    };
    f.render_widget(
        Paragraph::new(help)
            .style(Style::default().fg(Color::DarkGray))
            .centered(),
        chunks[6],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn app() -> AppState<StdRng> {
        AppState::new(Catalog::builtin(), QuizEngine::new(StdRng::seed_from_u64(3)))
    }

    fn screen_text<R>(app: &AppState<R>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn round<R>(app: &AppState<R>) -> &Round {
        match &app.state {
            State::Playing(round) => round,
            other => panic!("expected Playing, got {other:?}"),
        }
    }

    #[test]
    fn escape_quits() {
        let mut app = app();
        assert_eq!(app.handle_key(KeyCode::Esc), Flow::Quit);
        assert_eq!(app.handle_key(KeyCode::Char('q')), Flow::Quit);
    }

    #[test]
    fn space_toggles_group_under_cursor() {
        let mut app = app();

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Char(' '));

        let State::Selecting { selected, .. } = &app.state else {
            panic!("expected Selecting");
        };
        assert!(selected.contains("n5_days"));
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut app = app();
        for _ in 0..10 {
            app.handle_key(KeyCode::Down);
        }
        assert_eq!(app.group_cursor, 3);
        for _ in 0..10 {
            app.handle_key(KeyCode::Up);
        }
        assert_eq!(app.group_cursor, 0);
    }

    #[test]
    fn enter_without_selection_shows_notice() {
        let mut app = app();
        app.handle_key(KeyCode::Enter);

        assert!(matches!(app.state, State::Selecting { notice: Some(_), .. }));
        assert!(screen_text(&app).contains("at least 3 kanji"));
    }

    #[test]
    fn quiz_flow_by_keys() {
        let mut app = app();
        app.handle_key(KeyCode::Char(' ')); // n5_numbers
        app.handle_key(KeyCode::Enter);

        assert!(screen_text(&app).contains("Question #1"));
        // 回答前の n は無視
        app.handle_key(KeyCode::Char('n'));
        assert_eq!(round(&app).number, 1);

        app.handle_key(KeyCode::Char('2'));
        let answer = round(&app).answer.clone().unwrap();
        let question = round(&app).question.clone().unwrap();
        assert_eq!(answer.chosen, question.options[1]);

        let text = screen_text(&app);
        assert!(text.contains("Correct!") || text.contains("Wrong..."));

        app.handle_key(KeyCode::Enter);
        assert_eq!(round(&app).number, 2);
        assert!(round(&app).answer.is_none());

        app.handle_key(KeyCode::Char('b'));
        assert!(matches!(app.state, State::Selecting { .. }));
        assert!(screen_text(&app).contains("[x] Numbers"));
    }
}
