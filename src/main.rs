// ============================================
// src/main.rs (メインファイル)
// ============================================

use std::io::{Result as IoResult, stdout};
use std::time::{Duration, Instant};

mod achievements;
mod app;
mod config;
mod error;
mod i18n;
mod matching;
mod mode;
mod pairs;
mod practice;
mod save_data;
mod session;
mod stats;
mod ui;

use app::{AppState, RoundSettings};
use config::Args;
use error::AppError;
use i18n::{Locale, Text};
use pairs::{Topic, builtin_topics, find_topic, load_deck};
use save_data::{PlayerData, data_dir};
use session::{Session, User};

use clap::Parser;
use color_eyre::eyre::Result;
use console::style;
use dialoguer::Select;
use log::{info, warn};

use crossterm::{
    ExecutableCommand,
    cursor::{Hide, Show},
    event::{self, Event},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};

use ratatui::prelude::*;

// --------------------------------------------------
// メイン関数 (TUIセットアップと実行ループ)
// --------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    simple_logging::log_to_file(args.log_path(), args.log_level())?;
    info!("Starting vocabmatch {}", env!("CARGO_PKG_VERSION"));

    let session = prepare_session(&args);
    let topics = match &args.deck {
        Some(path) => load_deck(path)?,
        None => builtin_topics(),
    };
    let topic = choose_topic(&topics, args.topic.as_deref(), session.locale())?;

    let settings = RoundSettings {
        topic,
        size: args.round_size(),
        random: args.random,
        timing: args.timing(),
        mode: args.mode,
    };
    let app = AppState::new(settings, session, PlayerData::load(), data_dir())?;

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, app);
    restore_terminal(&mut terminal)?;
    let app = result?;

    print_summary(&app);
    info!("Bye");
    Ok(())
}

/// 起動時にセッションを読み込み、引数に応じてログイン/ログアウトする
fn prepare_session(args: &Args) -> Session {
    let mut session = Session::load();
    if args.logout {
        session.logout();
    }
    if let Some(name) = &args.login {
        session.login(User::local(name), None);
    }
    if let Some(lang) = args.lang {
        session.set_locale(lang);
    }
    if let Some(user) = session.user() {
        let kind = if session.token().is_some() { "server" } else { "local" };
        info!("Resuming {kind} session for {}", user.username);
    }
    if let Err(e) = session.save() {
        warn!("Failed to save session: {e}");
    }
    session
}

/// トピックを決める。指定がなく候補が複数なら選択肢を出す
fn choose_topic(topics: &[Topic], selector: Option<&str>, locale: Locale) -> Result<Topic> {
    if let Some(selector) = selector {
        let topic = find_topic(topics, selector)
            .cloned()
            .ok_or_else(|| AppError::TopicNotFound(selector.to_string()))?;
        return Ok(topic);
    }
    if topics.len() == 1 {
        return Ok(topics[0].clone());
    }

    let items: Vec<String> = topics.iter().map(|t| t.label(locale)).collect();
    let idx = Select::new()
        .with_prompt(locale.text(Text::ChooseTopic))
        .items(&items[..])
        .default(0)
        .interact()?;
    Ok(topics[idx].clone())
}

fn setup_terminal() -> IoResult<Terminal<impl Backend>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?; // 代替スクリーンを使用
    stdout().execute(Hide)?; // カーソルを非表示
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

fn restore_terminal(_terminal: &mut Terminal<impl Backend>) -> IoResult<()> {
    stdout().execute(Show)?; // カーソルを再表示
    stdout().execute(LeaveAlternateScreen)?; // 代替スクリーンを終了
    disable_raw_mode()?;
    Ok(())
}

fn run_app(terminal: &mut Terminal<impl Backend>, mut app_state: AppState) -> Result<AppState> {
    while app_state.running() {
        terminal.draw(|f| ui::render(f, &app_state))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == event::KeyEventKind::Press {
                    app_state.handle_key(key.code, Instant::now());
                }
            }
        }
        // フィードバックの待ち時間を進める
        app_state.tick(Instant::now());
    }

    Ok(app_state)
}

/// 終了時のまとめ
fn print_summary(app: &AppState) {
    let locale = app.locale();
    let stats = app.statistics();
    println!(
        "{} {} · {} {} · {}: {} · {}: {:.0}%",
        style(locale.text(Text::Title)).green().bold(),
        style(&app.topic().name).cyan(),
        locale.text(Text::Level),
        app.player_data.level,
        locale.text(Text::RoundsPlayed),
        style(format!("{}/{}", app.rounds_completed, stats.rounds_played)).yellow(),
        locale.text(Text::Accuracy),
        stats.average_accuracy,
    );
    println!(
        "{}: {} · {}: {} {}",
        locale.text(Text::WordsLearned),
        style(stats.learned_words).yellow(),
        locale.text(Text::Streak),
        style(stats.current_streak).yellow(),
        locale.text(Text::Days),
    );
}
