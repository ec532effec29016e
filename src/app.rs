// ============================================
// src/app.rs
// アプリ全体の状態とキー入力の処理
// ============================================

use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use crossterm::event::KeyCode;
use log::{debug, error, info};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::achievements::{self, Achievement};
use crate::error::AppError;
use crate::i18n::Locale;
use crate::matching::{Face, FeedbackQueue, MatchingRound, RoundObserver, RoundSnapshot, Timing};
use crate::mode::{MENU, MenuItem, StudyMode};
use crate::pairs::{Pair, Topic, first_n, random_n};
use crate::practice::{self, Drill, OPTION_LABELS, QuizQuestion, ScrambleItem};
use crate::save_data::{PlayerData, RoundRecord};
use crate::session::Session;
use crate::stats::Statistics;

/// カードを並べる列数
pub const GRID_COLUMNS: usize = 4;

/// ラウンドからの通知を受け取る
#[derive(Debug, Default)]
struct RoundEvents {
    /// 全ペアが揃った (記録する)
    finished: bool,
    /// 完了の待ち時間が過ぎた (結果を表示する)
    celebrate: bool,
}

impl RoundObserver for RoundEvents {
    fn on_change(&mut self, snapshot: &RoundSnapshot) {
        debug!(
            "matches {}/{} attempts {} selected {:?}",
            snapshot.match_count, snapshot.pair_count, snapshot.attempt_count, snapshot.selected_card_ids
        );
        if snapshot.is_complete {
            self.finished = true;
        }
    }

    fn on_complete(&mut self) {
        self.celebrate = true;
    }
}

/// 表示中の画面
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    ModeSelect,
    Study(StudyMode),
    Statistics,
}

/// 直前に完了したラウンド (またはクイズ・並べ替え) の結果
#[derive(Debug, Clone)]
pub struct RoundSummary {
    pub mode: StudyMode,
    pub pairs: u32,
    pub attempts: u32,
    pub duration_sec: f64,
    pub xp_gained: u32,
    pub leveled_up: bool,
    pub new_achievements: Vec<Achievement>,
}

/// ラウンドの作り方
#[derive(Debug, Clone)]
pub struct RoundSettings {
    pub topic: Topic,
    pub size: usize,
    pub random: bool,
    pub timing: Timing,
    /// 起動時のモード (None ならモード選択画面)
    pub mode: Option<StudyMode>,
}

/// アプリ全体の状態を管理する
pub struct AppState {
    settings: RoundSettings,
    rng: StdRng,
    pub screen: Screen,
    /// モード選択画面のカーソル
    pub menu_cursor: usize,

    pub round: MatchingRound,
    queue: FeedbackQueue,
    events: RoundEvents,
    started_at: Instant,
    round_recorded: bool,
    /// 完了の待ち時間が過ぎて結果を表示中
    pub celebrating: bool,

    /// カーソル位置 (カードの表示順のインデックス)
    pub cursor: usize,

    // --- クイズ・並べ替え ---
    pub quiz: Option<Drill<QuizQuestion>>,
    /// 今の問題で選んだ選択肢
    pub quiz_choice: Option<usize>,
    pub quiz_cursor: usize,
    pub scramble: Option<Drill<ScrambleItem>>,
    /// 並べ替えの入力中の文字列
    pub typed: String,
    practice_started_at: Instant,

    pub player_data: PlayerData,
    pub session: Session,
    /// セーブデータの保存先
    save_dir: PathBuf,

    pub last_summary: Option<RoundSummary>,
    /// この起動中に記録したラウンド数 (全モード)
    pub rounds_completed: u32,
    quitting: bool,
}

impl AppState {
    pub fn new(
        settings: RoundSettings,
        session: Session,
        player_data: PlayerData,
        save_dir: PathBuf,
    ) -> Result<Self, AppError> {
        Self::with_rng(settings, session, player_data, save_dir, StdRng::from_os_rng())
    }

    pub fn with_rng(
        settings: RoundSettings,
        session: Session,
        player_data: PlayerData,
        save_dir: PathBuf,
        mut rng: StdRng,
    ) -> Result<Self, AppError> {
        let pairs = Self::draw_pairs(&settings, &mut rng);
        let round = MatchingRound::start(&pairs, settings.timing, &mut rng)?;
        let start_mode = settings.mode;
        let now = Instant::now();
        let mut app = Self {
            settings,
            rng,
            screen: Screen::ModeSelect,
            menu_cursor: 0,
            round,
            queue: FeedbackQueue::new(),
            events: RoundEvents::default(),
            started_at: now,
            round_recorded: false,
            celebrating: false,
            cursor: 0,
            quiz: None,
            quiz_choice: None,
            quiz_cursor: 0,
            scramble: None,
            typed: String::new(),
            practice_started_at: now,
            player_data,
            session,
            save_dir,
            last_summary: None,
            rounds_completed: 0,
            quitting: false,
        };
        if let Some(mode) = start_mode {
            app.enter(MenuItem::Study(mode), now);
        }
        Ok(app)
    }

    fn draw_pairs(settings: &RoundSettings, rng: &mut StdRng) -> Vec<Pair> {
        if settings.random {
            random_n(&settings.topic.pairs, settings.size, rng)
        } else {
            first_n(&settings.topic.pairs, settings.size)
        }
    }

    pub fn topic(&self) -> &Topic {
        &self.settings.topic
    }

    pub fn locale(&self) -> Locale {
        self.session.locale()
    }

    pub fn running(&self) -> bool {
        !self.quitting
    }

    pub fn statistics(&self) -> Statistics {
        Statistics::collect(&self.player_data, Utc::now().date_naive())
    }

    /// 新しいラウンドを始める。前のラウンドの遅延処理は先に流しておく
    pub fn new_round(&mut self, now: Instant) -> Result<(), AppError> {
        self.settle(now);
        let pairs = Self::draw_pairs(&self.settings, &mut self.rng);
        self.round = MatchingRound::start(&pairs, self.settings.timing, &mut self.rng)?;
        self.events = RoundEvents::default();
        self.started_at = now;
        self.round_recorded = false;
        self.celebrating = false;
        self.cursor = 0;
        self.last_summary = None;
        Ok(())
    }

    // --------------------------------------------------
    // キー入力
    // --------------------------------------------------

    /// キー入力の処理
    pub fn handle_key(&mut self, code: KeyCode, now: Instant) {
        // 並べ替えの入力中は文字キーをそのまま受け取る
        if self.screen == Screen::Study(StudyMode::Scramble) && self.handle_scramble_key(code, now) {
            return;
        }

        match code {
            KeyCode::Esc | KeyCode::Char('q') => self.quit(now),
            KeyCode::Char('l') => self.toggle_locale(),
            KeyCode::Char('m') => self.open_menu(now),
            KeyCode::Char('s') => self.enter(MenuItem::Statistics, now),
            _ => match self.screen {
                Screen::ModeSelect => self.handle_menu_key(code, now),
                Screen::Study(StudyMode::Matching) => self.handle_matching_key(code, now),
                Screen::Study(StudyMode::Quiz) => self.handle_quiz_key(code, now),
                Screen::Study(StudyMode::Scramble) => {}
                Screen::Statistics => {
                    if code == KeyCode::Enter {
                        self.open_menu(now);
                    }
                }
            },
        }
    }

    fn handle_menu_key(&mut self, code: KeyCode, now: Instant) {
        match code {
            KeyCode::Up => self.menu_cursor = (self.menu_cursor + MENU.len() - 1) % MENU.len(),
            KeyCode::Down => self.menu_cursor = (self.menu_cursor + 1) % MENU.len(),
            KeyCode::Enter | KeyCode::Char(' ') => self.enter(MENU[self.menu_cursor], now),
            KeyCode::Char(c) => {
                let item = c
                    .to_digit(10)
                    .and_then(|d| (d as usize).checked_sub(1))
                    .and_then(|i| MENU.get(i).copied());
                if let Some(item) = item {
                    self.enter(item, now);
                }
            }
            _ => {}
        }
    }

    fn handle_matching_key(&mut self, code: KeyCode, now: Instant) {
        match code {
            KeyCode::Left => self.move_cursor(-1, 0),
            KeyCode::Right => self.move_cursor(1, 0),
            KeyCode::Up => self.move_cursor(0, -1),
            KeyCode::Down => self.move_cursor(0, 1),
            KeyCode::Enter | KeyCode::Char(' ') => self.select_at_cursor(now),
            KeyCode::Char('n') => {
                if let Err(e) = self.new_round(now) {
                    error!("Could not start a new round: {e}");
                }
            }
            KeyCode::Char(c) => {
                // 1-9, a-z (l m n q s を除く) で直接選択
                if let Some(idx) = shortcut_index(c) {
                    if idx < self.round.cards().len() {
                        self.cursor = idx;
                        self.select_at_cursor(now);
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_quiz_key(&mut self, code: KeyCode, now: Instant) {
        let options = self
            .quiz
            .as_ref()
            .and_then(|d| d.current())
            .map_or(0, |q| q.options.len());
        match code {
            KeyCode::Up if options > 0 => self.quiz_cursor = (self.quiz_cursor + options - 1) % options,
            KeyCode::Down if options > 0 => self.quiz_cursor = (self.quiz_cursor + 1) % options,
            KeyCode::Enter | KeyCode::Char(' ') => {
                match self.quiz.as_ref().map(|d| (d.outcome(), d.is_finished())) {
                    Some((None, _)) => self.answer_quiz(self.quiz_cursor, now),
                    Some((Some(_), true)) | None => self.start_quiz(now),
                    Some((Some(_), false)) => self.next_question(),
                }
            }
            KeyCode::Char('n') => self.start_quiz(now),
            KeyCode::Char(c) => {
                let c = c.to_ascii_uppercase();
                let choice = OPTION_LABELS
                    .iter()
                    .position(|&label| label == c)
                    .or_else(|| c.to_digit(10).and_then(|d| (d as usize).checked_sub(1)));
                if let Some(choice) = choice.filter(|&i| i < options) {
                    self.quiz_cursor = choice;
                    self.answer_quiz(choice, now);
                }
            }
            _ => {}
        }
    }

    /// 並べ替え画面のキー。処理したら true
    fn handle_scramble_key(&mut self, code: KeyCode, now: Instant) -> bool {
        let waiting = self.scramble.as_ref().is_some_and(|d| d.outcome().is_none());
        match code {
            KeyCode::Esc => self.open_menu(now),
            KeyCode::Enter => {
                match self.scramble.as_ref().map(|d| (d.outcome(), d.is_finished())) {
                    Some((None, _)) => self.submit_scramble(now),
                    Some((Some(_), true)) | None => self.start_scramble(now),
                    Some((Some(_), false)) => {
                        if let Some(drill) = self.scramble.as_mut() {
                            drill.advance();
                        }
                        self.typed.clear();
                    }
                }
            }
            KeyCode::Backspace if waiting => {
                self.typed.pop();
            }
            KeyCode::Char(c) if waiting => self.typed.push(c),
            _ => return false,
        }
        true
    }

    // --------------------------------------------------
    // 画面の切り替え
    // --------------------------------------------------

    fn open_menu(&mut self, now: Instant) {
        self.settle(now);
        self.screen = Screen::ModeSelect;
    }

    /// メニューの項目に入る。クイズ・並べ替えは終わっていれば新しく作る
    fn enter(&mut self, item: MenuItem, now: Instant) {
        self.settle(now);
        match item {
            MenuItem::Study(StudyMode::Quiz) if self.quiz.as_ref().is_none_or(|d| d.is_finished()) => {
                self.start_quiz(now)
            }
            MenuItem::Study(StudyMode::Scramble)
                if self.scramble.as_ref().is_none_or(|d| d.is_finished()) =>
            {
                self.start_scramble(now)
            }
            _ => {}
        }
        self.screen = match item {
            MenuItem::Study(mode) => Screen::Study(mode),
            MenuItem::Statistics => Screen::Statistics,
        };
        info!("Switched to {:?}", self.screen);
    }

    fn quit(&mut self, now: Instant) {
        self.settle(now);
        self.quitting = true;
    }

    fn toggle_locale(&mut self) {
        let locale = self.session.toggle_locale();
        info!("Language switched to {}", locale.code());
        if let Err(e) = self.session.save_to(&self.save_dir) {
            error!("Failed to save session: {e}");
        }
    }

    // --------------------------------------------------
    // ゲーム (ペア合わせ)
    // --------------------------------------------------

    /// 1行ごとの実際の枚数で折り返す
    fn move_cursor(&mut self, dx: isize, dy: isize) {
        let len = self.round.cards().len();
        if len == 0 {
            return;
        }
        let rows = len.div_ceil(GRID_COLUMNS) as isize;
        let row_len = |row: isize| (len - row as usize * GRID_COLUMNS).min(GRID_COLUMNS) as isize;

        let mut row = (self.cursor / GRID_COLUMNS) as isize;
        let mut col = (self.cursor % GRID_COLUMNS) as isize;
        if dy != 0 {
            row = (row + dy).rem_euclid(rows);
            col = col.min(row_len(row) - 1);
        }
        col = (col + dx).rem_euclid(row_len(row));
        self.cursor = row as usize * GRID_COLUMNS + col as usize;
    }

    fn select_at_cursor(&mut self, now: Instant) {
        let Some(card) = self.round.cards().get(self.cursor) else {
            return;
        };
        let id = card.id.clone();
        if let Some(scheduled) = self.round.select(&id, now, &mut self.events) {
            self.queue.push(scheduled);
        }
        // 待ち時間ゼロのときはすぐに反映する
        self.tick(now);
    }

    /// 遅延処理を進める
    pub fn tick(&mut self, now: Instant) {
        self.queue.run_due(now, &mut self.round, &mut self.events);
        self.process_round_events(now);
    }

    /// 画面を離れる前に、残っている遅延処理をすべて流す
    fn settle(&mut self, now: Instant) {
        if self.queue.flush(&mut self.round, &mut self.events) > 0 {
            debug!("Flushed pending feedback for round {:?}", self.round.id());
        }
        self.process_round_events(now);
    }

    fn process_round_events(&mut self, now: Instant) {
        // 全ペアが揃った時点で記録する (完了表示の待ち時間に左右されない)
        if std::mem::take(&mut self.events.finished) && !self.round_recorded {
            self.round_recorded = true;
            self.finish_round(now);
        }
        if std::mem::take(&mut self.events.celebrate) {
            self.celebrating = true;
        }
    }

    fn finish_round(&mut self, now: Instant) {
        let pairs = self.round.pair_count() as u32;
        let attempts = self.round.state().attempt_count;
        let duration_sec = now.saturating_duration_since(self.started_at).as_secs_f64();
        let words: Vec<String> = self
            .round
            .cards()
            .iter()
            .filter(|c| c.face == Face::Word)
            .map(|c| c.text.clone())
            .collect();
        self.record(StudyMode::Matching, pairs, attempts, &words, duration_sec);
    }

    // --------------------------------------------------
    // クイズ・並べ替え
    // --------------------------------------------------

    fn start_quiz(&mut self, now: Instant) {
        let pairs = Self::draw_pairs(&self.settings, &mut self.rng);
        match practice::quiz(&pairs, &self.settings.topic.pairs, &mut self.rng) {
            Ok(drill) => self.quiz = Some(drill),
            Err(e) => error!("Could not start a quiz: {e}"),
        }
        self.quiz_choice = None;
        self.quiz_cursor = 0;
        self.practice_started_at = now;
    }

    fn answer_quiz(&mut self, choice: usize, now: Instant) {
        let Some(drill) = self.quiz.as_mut() else {
            return;
        };
        if drill.answer(|q| q.is_correct(choice)).is_none() {
            return;
        }
        self.quiz_choice = Some(choice);
        if drill.is_finished() {
            let (correct, answered, words) = (drill.correct(), drill.answered(), drill.correct_words().to_vec());
            self.finish_practice(StudyMode::Quiz, correct, answered, &words, now);
        }
    }

    fn next_question(&mut self) {
        if let Some(drill) = self.quiz.as_mut() {
            if drill.advance() {
                self.quiz_choice = None;
                self.quiz_cursor = 0;
            }
        }
    }

    fn start_scramble(&mut self, now: Instant) {
        let pairs = Self::draw_pairs(&self.settings, &mut self.rng);
        match practice::scramble(&pairs, &mut self.rng) {
            Ok(drill) => self.scramble = Some(drill),
            Err(e) => error!("Could not start a scramble: {e}"),
        }
        self.typed.clear();
        self.practice_started_at = now;
    }

    fn submit_scramble(&mut self, now: Instant) {
        let Some(drill) = self.scramble.as_mut() else {
            return;
        };
        let guess = self.typed.as_str();
        if drill.answer(|item| item.is_correct(guess)).is_none() {
            return;
        }
        if drill.is_finished() {
            let (correct, answered, words) = (drill.correct(), drill.answered(), drill.correct_words().to_vec());
            self.finish_practice(StudyMode::Scramble, correct, answered, &words, now);
        }
    }

    fn finish_practice(&mut self, mode: StudyMode, correct: u32, answered: u32, words: &[String], now: Instant) {
        let duration_sec = now.saturating_duration_since(self.practice_started_at).as_secs_f64();
        self.record(mode, correct, answered, words, duration_sec);
    }

    // --------------------------------------------------
    // 記録
    // --------------------------------------------------

    fn record(&mut self, mode: StudyMode, pairs: u32, attempts: u32, words: &[String], duration_sec: f64) {
        let before = achievements::unlocked(&self.player_data);
        let record = RoundRecord::new(&self.settings.topic.name, pairs, attempts, duration_sec).with_mode(mode);
        let xp_gained = record.xp_gained;
        let words: Vec<&str> = words.iter().map(String::as_str).collect();
        let leveled_up = self.player_data.record_round(record, &words);
        let new_achievements = achievements::newly_unlocked(&before, &self.player_data);

        info!(
            "Recorded {}: {pairs}/{attempts}, {xp_gained} xp, {} new achievement(s)",
            mode.code(),
            new_achievements.len()
        );
        if let Err(e) = self.player_data.save_to(&self.save_dir) {
            error!("Failed to save player data: {e}");
        }

        self.rounds_completed += 1;
        self.last_summary = Some(RoundSummary {
            mode,
            pairs,
            attempts,
            duration_sec,
            xp_gained,
            leveled_up,
            new_achievements,
        });
    }
}

/// ショートカットキー → カードのインデックス
fn shortcut_index(c: char) -> Option<usize> {
    SHORTCUT_KEYS.chars().position(|k| k == c)
}

/// 画面に表示するショートカットキー
pub fn shortcut_label(idx: usize) -> Option<char> {
    SHORTCUT_KEYS.chars().nth(idx)
}

const SHORTCUT_KEYS: &str = "123456789abcdefghijkoprtuvwxyz";
