// ============================================
// src/ui.rs
// UI描画
// ============================================

use ratatui::{
    prelude::*,
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph, Wrap},
};

use crate::achievements::{ALL_ACHIEVEMENTS, IconKey};
use crate::app::{AppState, GRID_COLUMNS, RoundSummary, Screen, shortcut_label};
use crate::i18n::{Locale, Text};
use crate::matching::{Card, MatchingRound, Phase, Verdict};
use crate::mode::{MENU, StudyMode};
use crate::practice::OPTION_LABELS;

/// アイコンキー → 表示する記号と色
const ICONS: &[(IconKey, &str, Color)] = &[
    (IconKey::Trophy, "🏆", Color::Yellow),
    (IconKey::Star, "★", Color::Blue),
    (IconKey::Target, "◎", Color::Green),
    (IconKey::Award, "🎖", Color::Magenta),
    (IconKey::Zap, "⚡", Color::LightRed),
    (IconKey::Medal, "🏅", Color::Red),
];

pub fn icon_glyph(key: IconKey) -> (&'static str, Color) {
    ICONS
        .iter()
        .find(|(k, _, _)| *k == key)
        .map(|&(_, glyph, color)| (glyph, color))
        .unwrap_or(("•", Color::White))
}

/// カードの見た目 (揃った:緑 / 選択中:青 / 不正解:赤)
pub fn card_style(round: &MatchingRound, card: &Card, is_cursor: bool) -> Style {
    let base = if card.matched {
        Style::default().fg(Color::Green)
    } else if round.is_selected(&card.id) {
        match round.phase() {
            Phase::Evaluating(Verdict::Mismatch) => Style::default().fg(Color::White).bg(Color::Red),
            Phase::Evaluating(Verdict::Match) => Style::default().fg(Color::Black).bg(Color::Green),
            _ => Style::default().fg(Color::White).bg(Color::Blue),
        }
    } else {
        Style::default().fg(Color::Gray)
    };

    if is_cursor && !round.is_complete() {
        base.add_modifier(Modifier::REVERSED | Modifier::BOLD)
    } else {
        base
    }
}

pub fn render(f: &mut Frame, app: &AppState) {
    let locale = app.locale();
    let size = f.area();
    // 枠線を描画
    let title = format!(" {} · {} ", locale.text(Text::Title), app.topic().name);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title);
    let inner_area = block.inner(size);
    f.render_widget(block, size);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // [0] レベルとXP
            Constraint::Length(1), // [1] 見出し (ペア数・試行回数など)
            Constraint::Min(3),    // [2] 本体
            Constraint::Length(4), // [3] フィードバック / 結果
            Constraint::Length(1), // [4] 操作説明
        ])
        .split(inner_area);

    render_status_bar(f, app, locale, chunks[0]);

    let controls = match app.screen {
        Screen::ModeSelect => {
            render_heading(f, locale.text(Text::StudyModes).to_string(), chunks[1]);
            render_menu(f, app, locale, chunks[2]);
            Text::MenuControls
        }
        Screen::Study(StudyMode::Matching) => {
            render_counters(f, app, locale, chunks[1]);
            render_cards(f, app, chunks[2]);
            render_feedback(f, app, locale, chunks[3]);
            Text::Controls
        }
        Screen::Study(StudyMode::Quiz) => {
            render_quiz(f, app, locale, &chunks);
            Text::QuizControls
        }
        Screen::Study(StudyMode::Scramble) => {
            render_scramble(f, app, locale, &chunks);
            Text::ScrambleControls
        }
        Screen::Statistics => {
            render_heading(f, locale.text(Text::Statistics).to_string(), chunks[1]);
            render_statistics(f, app, locale, chunks[2]);
            Text::StatsControls
        }
    };

    f.render_widget(
        Paragraph::new(locale.text(controls))
            .style(Style::default().fg(Color::DarkGray))
            .centered(),
        chunks[4],
    );
}

fn render_heading(f: &mut Frame, text: String, area: Rect) {
    f.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(Color::Yellow))
            .centered(),
        area,
    );
}

fn render_status_bar(f: &mut Frame, app: &AppState, locale: Locale, area: Rect) {
    let pd = &app.player_data;
    let req_xp = pd.required_xp_for_next_level();
    let ratio = if req_xp > 0 {
        (pd.current_xp as f64 / req_xp as f64).min(1.0)
    } else {
        0.0
    };
    let who = app
        .session
        .user()
        .map(|u| u.username.as_str())
        .unwrap_or(locale.text(Text::Guest));

    let label = format!(
        "{who} · {} {} ({} / {})",
        locale.text(Text::Level),
        pd.level,
        pd.current_xp,
        req_xp
    );
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::NONE))
        .gauge_style(Style::default().fg(Color::Magenta).bg(Color::Black))
        .ratio(ratio)
        .label(label);
    f.render_widget(gauge, area);
}

fn render_counters(f: &mut Frame, app: &AppState, locale: Locale, area: Rect) {
    let state = app.round.state();
    let text = format!(
        "{}: {}/{}    {}: {}",
        locale.text(Text::Matching),
        state.match_count,
        app.round.pair_count(),
        locale.text(Text::Attempts),
        state.attempt_count
    );
    f.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(Color::Yellow))
            .centered(),
        area,
    );
}

fn render_cards(f: &mut Frame, app: &AppState, area: Rect) {
    let cards = app.round.cards();
    let rows = cards.len().div_ceil(GRID_COLUMNS);
    if rows == 0 {
        return;
    }

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
        .split(area);

    for (row, row_area) in row_areas.iter().enumerate() {
        let col_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, GRID_COLUMNS as u32); GRID_COLUMNS])
            .split(*row_area);

        for (col, cell) in col_areas.iter().enumerate() {
            let idx = row * GRID_COLUMNS + col;
            let Some(card) = cards.get(idx) else {
                continue;
            };
            let style = card_style(&app.round, card, idx == app.cursor);
            let key = shortcut_label(idx).map(|c| c.to_string()).unwrap_or_default();
            let mark = if card.matched { "✓ " } else { "" };

            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(key)
                .border_style(style);
            f.render_widget(
                Paragraph::new(format!("{mark}{}", card.text))
                    .style(style)
                    .wrap(Wrap { trim: true })
                    .centered()
                    .block(block),
                *cell,
            );
        }
    }
}

fn render_feedback(f: &mut Frame, app: &AppState, locale: Locale, area: Rect) {
    let mut lines = Vec::new();

    match (app.round.phase(), &app.last_summary) {
        (Phase::Evaluating(Verdict::Match), _) => {
            lines.push(Line::from(locale.text(Text::Correct)).style(Style::default().fg(Color::Green).bold()));
        }
        (Phase::Evaluating(Verdict::Mismatch), _) => {
            lines.push(Line::from(locale.text(Text::Incorrect)).style(Style::default().fg(Color::Red).bold()));
        }
        (Phase::Complete, Some(summary)) if app.celebrating => lines.extend(summary_lines(summary, locale, "[n]")),
        _ => {}
    }

    f.render_widget(Paragraph::new(lines).centered(), area);
}

fn summary_lines(summary: &RoundSummary, locale: Locale, next_key: &str) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(format!("🎉 {}", locale.text(Text::GameComplete)))
            .style(Style::default().fg(Color::Green).bold()),
        Line::from(format!(
            "{} {} {} {} {}! (+{} XP, {:.1}s)",
            locale.text(Text::YouMatched),
            summary.pairs,
            locale.text(Text::PairsIn),
            summary.attempts,
            locale.text(Text::Attempts).to_lowercase(),
            summary.xp_gained,
            summary.duration_sec,
        )),
    ];

    if summary.leveled_up {
        lines.push(Line::from(format!("⬆ {}", locale.text(Text::LevelUp))).style(Style::default().fg(Color::Magenta)));
    }
    if !summary.new_achievements.is_empty() {
        let mut spans = vec![Span::raw(format!("{}: ", locale.text(Text::NewAchievement)))];
        for achievement in &summary.new_achievements {
            let (glyph, color) = icon_glyph(achievement.icon());
            spans.push(Span::styled(
                format!("{glyph} {}  ", achievement.name(locale)),
                Style::default().fg(color),
            ));
        }
        lines.push(Line::from(spans));
    }

    lines.push(
        Line::from(format!("{next_key} {}", locale.text(Text::NextRandom))).style(Style::default().fg(Color::DarkGray)),
    );
    lines
}

// --------------------------------------------------
// モード選択
// --------------------------------------------------

fn render_menu(f: &mut Frame, app: &AppState, locale: Locale, area: Rect) {
    let lines: Vec<Line> = MENU
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let text = format!(" {}. {} ", i + 1, item.label(locale));
            if i == app.menu_cursor {
                Line::from(text).style(Style::default().fg(Color::Black).bg(Color::Cyan).bold())
            } else {
                Line::from(text)
            }
        })
        .collect();
    f.render_widget(Paragraph::new(lines).centered(), area);
}

// --------------------------------------------------
// クイズ
// --------------------------------------------------

fn render_quiz(f: &mut Frame, app: &AppState, locale: Locale, chunks: &[Rect]) {
    let Some(drill) = &app.quiz else {
        return;
    };
    let Some(question) = drill.current() else {
        return;
    };
    render_heading(
        f,
        format!(
            "{}: {}/{}    {}: {}",
            locale.text(Text::RandomQuiz),
            drill.position() + 1,
            drill.len(),
            locale.text(Text::Correct).trim_end_matches('!'),
            drill.correct()
        ),
        chunks[1],
    );

    let mut lines = vec![
        Line::from(question.word.clone()).style(Style::default().fg(Color::Cyan).bold()),
        Line::from(""),
    ];
    for (i, option) in question.options.iter().enumerate() {
        let label = OPTION_LABELS.get(i).copied().unwrap_or('?');
        let style = match (drill.outcome(), app.quiz_choice) {
            (Some(_), _) if i == question.answer => Style::default().fg(Color::Black).bg(Color::Green),
            (Some(false), Some(choice)) if i == choice => Style::default().fg(Color::White).bg(Color::Red),
            (None, _) if i == app.quiz_cursor => Style::default().add_modifier(Modifier::REVERSED),
            _ => Style::default(),
        };
        lines.push(Line::from(format!(" {label}: {option} ")).style(style));
    }
    f.render_widget(Paragraph::new(lines).centered().wrap(Wrap { trim: true }), chunks[2]);

    let mut feedback = Vec::new();
    match drill.outcome() {
        Some(true) => feedback.push(Line::from(locale.text(Text::Correct)).style(Style::default().fg(Color::Green).bold())),
        Some(false) => {
            feedback.push(Line::from(locale.text(Text::Incorrect)).style(Style::default().fg(Color::Red).bold()));
            feedback.push(Line::from(format!(
                "{}: {}",
                locale.text(Text::CorrectAnswer),
                question.correct_option()
            )));
        }
        None => {}
    }
    if drill.is_finished() {
        if let Some(summary) = app.last_summary.as_ref().filter(|s| s.mode == StudyMode::Quiz) {
            feedback = summary_lines(summary, locale, "[Enter]");
        }
    }
    f.render_widget(Paragraph::new(feedback).centered(), chunks[3]);
}

// --------------------------------------------------
// 並べ替え
// --------------------------------------------------

fn render_scramble(f: &mut Frame, app: &AppState, locale: Locale, chunks: &[Rect]) {
    let Some(drill) = &app.scramble else {
        return;
    };
    let Some(item) = drill.current() else {
        return;
    };
    render_heading(
        f,
        format!(
            "{}: {}/{}    {}: {}",
            locale.text(Text::WordScramble),
            drill.position() + 1,
            drill.len(),
            locale.text(Text::Correct).trim_end_matches('!'),
            drill.correct()
        ),
        chunks[1],
    );

    let letters: Vec<String> = item.scrambled.chars().map(|c| c.to_uppercase().to_string()).collect();
    let input_style = match drill.outcome() {
        Some(true) => Style::default().fg(Color::Green).bold(),
        Some(false) => Style::default().fg(Color::Red).bold(),
        None => Style::default().fg(Color::White),
    };
    let cursor = if drill.outcome().is_none() { "_" } else { "" };
    let lines = vec![
        Line::from(letters.join(" ")).style(Style::default().fg(Color::Cyan).bold()),
        Line::from(format!("{}: {}", locale.text(Text::Hint), item.meaning)).style(Style::default().fg(Color::DarkGray)),
        Line::from(""),
        Line::from(format!("> {}{cursor}", app.typed)).style(input_style),
    ];
    f.render_widget(Paragraph::new(lines).centered(), chunks[2]);

    let mut feedback = Vec::new();
    match drill.outcome() {
        Some(true) => feedback.push(Line::from(locale.text(Text::Correct)).style(Style::default().fg(Color::Green).bold())),
        Some(false) => {
            feedback.push(Line::from(locale.text(Text::Incorrect)).style(Style::default().fg(Color::Red).bold()));
            feedback.push(Line::from(format!("{}: {}", locale.text(Text::CorrectAnswer), item.word)));
        }
        None => {}
    }
    if drill.is_finished() {
        if let Some(summary) = app.last_summary.as_ref().filter(|s| s.mode == StudyMode::Scramble) {
            feedback = summary_lines(summary, locale, "[Enter]");
        }
    }
    f.render_widget(Paragraph::new(feedback).centered(), chunks[3]);
}

// --------------------------------------------------
// 統計
// --------------------------------------------------

fn render_statistics(f: &mut Frame, app: &AppState, locale: Locale, area: Rect) {
    let stats = app.statistics();
    let words = locale.text(Text::Words);
    let days = locale.text(Text::Days);
    let minutes = locale.text(Text::MinutesStudied);

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let stat = |label: Text, value: String, color: Color| {
        Line::from(vec![
            Span::raw(format!("{}: ", locale.text(label))),
            Span::styled(value, Style::default().fg(color).bold()),
        ])
    };
    let numbers = vec![
        stat(
            Text::TodayProgress,
            format!("{} {words} · {} {minutes}", stats.today_words, stats.today_minutes),
            Color::Blue,
        ),
        stat(
            Text::WeeklyProgress,
            format!("{} {words} · {} {minutes}", stats.weekly_words, stats.weekly_minutes),
            Color::Green,
        ),
        stat(
            Text::Streak,
            format!(
                "{} {days} ({}: {} {days})",
                stats.current_streak,
                locale.text(Text::Best),
                stats.best_streak
            ),
            Color::LightRed,
        ),
        stat(Text::Accuracy, format!("{:.0}%", stats.average_accuracy), Color::Magenta),
        stat(Text::WordsLearned, stats.learned_words.to_string(), Color::Yellow),
        stat(Text::RoundsPlayed, stats.rounds_played.to_string(), Color::Cyan),
        stat(Text::PracticeSessions, stats.practice_sessions.to_string(), Color::Cyan),
    ];
    f.render_widget(
        Paragraph::new(numbers).block(Block::default().borders(Borders::ALL).title(locale.text(Text::Statistics))),
        halves[0],
    );

    let badges: Vec<Line> = ALL_ACHIEVEMENTS
        .iter()
        .map(|a| {
            let (glyph, color) = icon_glyph(a.icon());
            let done = a.is_unlocked(&app.player_data);
            let style = if done {
                Style::default().fg(color).bold()
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Line::from(vec![
                Span::styled(format!("{glyph} {} ", a.name(locale)), style),
                Span::raw(format!("{}/{}", a.progress(&app.player_data), a.target())),
            ])
        })
        .collect();
    f.render_widget(
        Paragraph::new(badges).block(Block::default().borders(Borders::ALL).title(locale.text(Text::Achievements))),
        halves[1],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::RoundSettings;
    use crate::matching::{CardId, Face, Timing};
    use crate::pairs::builtin_topics;
    use crate::save_data::PlayerData;
    use crate::session::Session;
    use crossterm::event::KeyCode;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use ratatui::backend::TestBackend;
    use std::time::{Duration, Instant};

    fn app_in(dir: &std::path::Path, timing: Timing) -> AppState {
        let settings = RoundSettings {
            topic: builtin_topics().remove(0),
            size: 3,
            random: false,
            timing,
            mode: Some(StudyMode::Matching),
        };
        AppState::with_rng(
            settings,
            Session::default(),
            PlayerData::default(),
            dir.to_path_buf(),
            StdRng::seed_from_u64(1),
        )
        .unwrap()
    }

    fn screen(app: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn every_icon_has_a_glyph() {
        for achievement in ALL_ACHIEVEMENTS {
            let (glyph, _) = icon_glyph(achievement.icon());
            assert_ne!(glyph, "•");
        }
    }

    #[test]
    fn draws_cards_and_counters() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_in(dir.path(), Timing::instant());
        let text = screen(&app);
        assert!(text.contains("father"));
        assert!(text.contains("mẹ"));
        assert!(text.contains("Ghép từ: 0/3"));
    }

    #[test]
    fn mismatch_is_highlighted_red() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), Timing::default());
        let now = Instant::now();
        let first = app.round.cards().iter().position(|c| c.id == CardId::new(1, Face::Word)).unwrap();
        let second = app.round.cards().iter().position(|c| c.id == CardId::new(2, Face::Word)).unwrap();
        app.cursor = first;
        app.handle_key(KeyCode::Enter, now);
        app.cursor = second;
        app.handle_key(KeyCode::Enter, now);

        let card = app.round.cards()[first].clone();
        assert_eq!(card_style(&app.round, &card, false).bg, Some(Color::Red));
        assert!(screen(&app).contains("Chưa chính xác"));

        app.tick(now + Duration::from_secs(2));
        assert_eq!(card_style(&app.round, &card, false).bg, None);
    }

    #[test]
    fn menu_and_statistics_screens() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), Timing::instant());
        let now = Instant::now();

        app.handle_key(KeyCode::Char('m'), now);
        let text = screen(&app);
        assert!(text.contains("Chế độ học"));
        assert!(text.contains("Quiz ngẫu nhiên"));

        app.handle_key(KeyCode::Char('s'), now);
        let text = screen(&app);
        assert!(text.contains("Tiến độ hôm nay"));
        assert!(text.contains("Ván đầu tiên"));
    }

    #[test]
    fn quiz_screen_shows_options_and_answer() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), Timing::instant());
        let now = Instant::now();
        app.handle_key(KeyCode::Char('m'), now);
        app.handle_key(KeyCode::Char('2'), now);

        let question = app.quiz.as_ref().unwrap().current().unwrap().clone();
        let text = screen(&app);
        assert!(text.contains(&question.word));
        assert!(text.contains("A: "));

        let wrong = (question.answer + 1) % question.options.len();
        app.handle_key(KeyCode::Char(OPTION_LABELS[wrong]), now);
        let text = screen(&app);
        assert!(text.contains("Đáp án đúng"));
    }
}
