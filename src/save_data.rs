// ============================================
// src/save_data.rs
// セーブデータの構造と読み書きロジック
// ============================================

use bincode::config::standard;
use bincode::{Decode, Encode};
use chrono::{DateTime, TimeZone, Utc};
use directories::ProjectDirs;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::mode::StudyMode;

const SAVE_FILE_BIN: &str = "save_data.bin";
const SAVE_FILE_JSON: &str = "save_data.json"; // デバッグ用

// MARK:データディレクトリ
/// OSごとのデータ保存用ディレクトリ (なければ作成)
pub fn data_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("vn", "vocabmatch", "VocabMatch") {
        let dir = proj_dirs.data_dir().to_path_buf();
        match fs::create_dir_all(&dir) {
            Ok(()) => return dir,
            Err(e) => warn!("Could not create {}: {e}", dir.display()),
        }
    }
    // 取得できなかったらカレントディレクトリに
    PathBuf::from(".")
}

/// 1ラウンドごとの記録
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub mode: StudyMode,
    pub topic: String,
    pub pairs: u32,
    pub attempts: u32,
    pub duration_sec: f64,
    pub accuracy: f64,
    pub xp_gained: u32,
}

impl RoundRecord {
    pub fn new(topic: &str, pairs: u32, attempts: u32, duration_sec: f64) -> Self {
        Self::at(Utc::now(), topic, pairs, attempts, duration_sec)
    }

    pub fn at(
        timestamp: DateTime<Utc>,
        topic: &str,
        pairs: u32,
        attempts: u32,
        duration_sec: f64,
    ) -> Self {
        Self {
            timestamp,
            mode: StudyMode::Matching,
            topic: topic.to_string(),
            pairs,
            attempts,
            duration_sec,
            accuracy: accuracy(pairs, attempts),
            xp_gained: xp_for_round(pairs, attempts),
        }
    }

    pub fn with_mode(mut self, mode: StudyMode) -> Self {
        self.mode = mode;
        self
    }

    /// 一度もミスせずに揃えたか
    pub fn is_perfect(&self) -> bool {
        self.pairs > 0 && self.attempts == self.pairs
    }
}

/// 正解率 (%)
pub fn accuracy(pairs: u32, attempts: u32) -> f64 {
    if attempts == 0 {
        return 100.0;
    }
    (pairs as f64 / attempts as f64) * 100.0
}

/// ペア数が多いほど、ミスが少ないほど経験値が多い
pub fn xp_for_round(pairs: u32, attempts: u32) -> u32 {
    let base = pairs as f64;
    let precision = if attempts > 0 {
        pairs as f64 / attempts as f64
    } else {
        1.0
    };
    (base * (1.0 + precision) * 2.0).round() as u32
}

/// bincode用の内部表現（DateTimeをi64に変換）
#[derive(Encode, Decode)]
struct RoundRecordBin {
    timestamp_secs: i64,
    mode: StudyMode,
    topic: String,
    pairs: u32,
    attempts: u32,
    duration_sec: f64,
    accuracy: f64,
    xp_gained: u32,
}

impl From<&RoundRecord> for RoundRecordBin {
    fn from(record: &RoundRecord) -> Self {
        Self {
            timestamp_secs: record.timestamp.timestamp(),
            mode: record.mode,
            topic: record.topic.clone(),
            pairs: record.pairs,
            attempts: record.attempts,
            duration_sec: record.duration_sec,
            accuracy: record.accuracy,
            xp_gained: record.xp_gained,
        }
    }
}

impl From<RoundRecordBin> for RoundRecord {
    fn from(bin: RoundRecordBin) -> Self {
        Self {
            timestamp: Utc
                .timestamp_opt(bin.timestamp_secs, 0)
                .single()
                .unwrap_or_default(),
            mode: bin.mode,
            topic: bin.topic,
            pairs: bin.pairs,
            attempts: bin.attempts,
            duration_sec: bin.duration_sec,
            accuracy: bin.accuracy,
            xp_gained: bin.xp_gained,
        }
    }
}

/// 学習状況のまとめ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    pub learned_words: usize,
    pub average_score: f64,
    pub rounds_played: u32,
}

/// プレイヤーの進行状況データ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerData {
    pub level: u32,
    pub current_xp: u32,
    pub rounds_played: u32,
    pub total_pairs_matched: u32,
    pub total_attempts: u32,
    /// 一度でも正解した単語 (小文字に揃えた綴り)
    pub learned_words: BTreeSet<String>,
    /// 過去のラウンド記録
    pub history: Vec<RoundRecord>,
}

/// bincode用の内部表現
#[derive(Encode, Decode)]
struct PlayerDataBin {
    level: u32,
    current_xp: u32,
    rounds_played: u32,
    total_pairs_matched: u32,
    total_attempts: u32,
    learned_words: Vec<String>,
    history: Vec<RoundRecordBin>,
}

impl From<&PlayerData> for PlayerDataBin {
    fn from(data: &PlayerData) -> Self {
        Self {
            level: data.level,
            current_xp: data.current_xp,
            rounds_played: data.rounds_played,
            total_pairs_matched: data.total_pairs_matched,
            total_attempts: data.total_attempts,
            learned_words: data.learned_words.iter().cloned().collect(),
            history: data.history.iter().map(RoundRecordBin::from).collect(),
        }
    }
}

impl From<PlayerDataBin> for PlayerData {
    fn from(bin: PlayerDataBin) -> Self {
        Self {
            level: bin.level,
            current_xp: bin.current_xp,
            rounds_played: bin.rounds_played,
            total_pairs_matched: bin.total_pairs_matched,
            total_attempts: bin.total_attempts,
            learned_words: bin.learned_words.into_iter().collect(),
            history: bin.history.into_iter().map(RoundRecord::from).collect(),
        }
    }
}

impl Default for PlayerData {
    /// プレイヤーデータの初期値
    fn default() -> Self {
        Self {
            level: 1,
            current_xp: 0,
            rounds_played: 0,
            total_pairs_matched: 0,
            total_attempts: 0,
            learned_words: BTreeSet::new(),
            history: Vec::new(),
        }
    }
}

impl PlayerData {
    /// 次のレベルまでに必要な経験値を計算する
    pub fn required_xp_for_next_level(&self) -> u32 {
        ((self.level as f64).powf(1.1) * 10.0).round() as u32
    }

    /// 経験値を加算し、レベルアップ判定を行う
    pub fn add_xp(&mut self, xp_to_add: u32) -> bool {
        self.current_xp += xp_to_add;

        let mut leveled_up = false;
        // 必要経験値を超えている間、レベルを上げ続ける
        while self.current_xp >= self.required_xp_for_next_level() {
            self.current_xp -= self.required_xp_for_next_level();
            self.level += 1;
            leveled_up = true;
        }
        leveled_up
    }

    /// 完了したラウンドを記録する。レベルが上がったら true
    ///
    /// 単語は綴りで数えるので、別の単語帳で同じIDでも混ざらない
    pub fn record_round(&mut self, record: RoundRecord, words: &[&str]) -> bool {
        self.rounds_played += 1;
        self.total_pairs_matched += record.pairs;
        self.total_attempts += record.attempts;
        self.learned_words.extend(words.iter().map(|w| word_key(w)));

        let leveled_up = self.add_xp(record.xp_gained);
        self.history.push(record);
        leveled_up
    }

    pub fn progress(&self) -> Progress {
        let average_score = if self.history.is_empty() {
            0.0
        } else {
            self.history.iter().map(|r| r.accuracy).sum::<f64>() / self.history.len() as f64
        };
        Progress {
            learned_words: self.learned_words.len(),
            average_score,
            rounds_played: self.rounds_played,
        }
    }

    /// MARK:データをファイルに保存する (バイナリ + JSON)
    pub fn save(&self) -> Result<(), AppError> {
        self.save_to(&data_dir())
    }

    pub fn save_to(&self, dir: &Path) -> Result<(), AppError> {
        // --- 1. バイナリ形式で保存 (本番用) ---
        let file = File::create(dir.join(SAVE_FILE_BIN))?;
        let mut writer = BufWriter::new(file);
        let encoded = bincode::encode_to_vec(PlayerDataBin::from(self), standard())?;
        writer.write_all(&encoded)?;
        writer.flush()?;

        // --- 2. JSON形式で保存 (デバッグ用) ---
        let json = serde_json::to_string_pretty(self)?;
        fs::write(dir.join(SAVE_FILE_JSON), json)?;

        info!("Saved player data to {}", dir.display());
        Ok(())
    }

    /// MARK:ファイルからデータを読み込む (バイナリ優先、JSONフォールバック)
    pub fn load() -> Self {
        Self::load_from(&data_dir())
    }

    pub fn load_from(dir: &Path) -> Self {
        // 1. バイナリファイルから読み込みを試行
        let bin_path = dir.join(SAVE_FILE_BIN);
        if bin_path.exists() {
            match Self::read_bin(&bin_path) {
                Ok(data) => return data,
                Err(e) => warn!("Failed to read {}: {e}", bin_path.display()),
            }
        }

        // 2. バイナリ失敗時、JSONファイルから読み込みを試行
        let json_path = dir.join(SAVE_FILE_JSON);
        if json_path.exists() {
            match Self::read_json(&json_path) {
                Ok(data) => return data,
                Err(e) => warn!("Failed to read {}: {e}", json_path.display()),
            }
        }

        // どちらも失敗した場合はデフォルト
        Self::default()
    }

    fn read_bin(path: &Path) -> Result<Self, AppError> {
        let buffer = fs::read(path)?;
        let (bin, _) = bincode::decode_from_slice::<PlayerDataBin, _>(&buffer, standard())?;
        Ok(PlayerData::from(bin))
    }

    fn read_json(path: &Path) -> Result<Self, AppError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

fn word_key(word: &str) -> String {
    word.trim().to_lowercase()
}
