// ============================================
// src/config.rs
// コマンドライン引数
// ============================================

use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::i18n::Locale;
use crate::matching::Timing;
use crate::mode::StudyMode;
use crate::save_data::data_dir;

const LOG_FILE: &str = "vocabmatch.log";

#[derive(Debug, Parser)]
#[command(version, about = "Ghép từ vựng: word/meaning matching game in the terminal")]
pub struct Args {
    /// 単語帳の JSON ファイル (省略時は組み込みの単語帳)
    #[arg(long)]
    pub deck: Option<PathBuf>,

    /// トピックの ID または名前
    #[arg(long)]
    pub topic: Option<String>,

    /// 1ラウンドのペア数
    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u8).range(1..))]
    pub pairs: u8,

    /// 先頭からではなくランダムに選ぶ
    #[arg(long)]
    pub random: bool,

    /// 表示言語
    #[arg(long, value_enum)]
    pub lang: Option<Locale>,

    /// 学習モード (省略時はモード選択画面から)
    #[arg(long, value_enum)]
    pub mode: Option<StudyMode>,

    /// フィードバックの待ち時間をなくす
    #[arg(long)]
    pub instant: bool,

    /// ローカルユーザーとしてログイン
    #[arg(long, conflicts_with = "logout")]
    pub login: Option<String>,

    /// ログアウトしてから起動
    #[arg(long)]
    pub logout: bool,

    /// ログファイルの場所
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// デバッグログを出す
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn timing(&self) -> Timing {
        if self.instant {
            Timing::instant()
        } else {
            Timing::default()
        }
    }

    pub fn round_size(&self) -> usize {
        self.pairs as usize
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| data_dir().join(LOG_FILE))
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}
