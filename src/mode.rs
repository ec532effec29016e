// ============================================
// src/mode.rs
// 学習モードとモード選択メニュー
// ============================================

use bincode::{Decode, Encode};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::i18n::{Locale, Text};

/// 学習モード
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum StudyMode {
    #[default]
    Matching,
    Quiz,
    Scramble,
}

impl StudyMode {
    pub fn name(self, locale: Locale) -> &'static str {
        let key = match self {
            StudyMode::Matching => Text::Matching,
            StudyMode::Quiz => Text::RandomQuiz,
            StudyMode::Scramble => Text::WordScramble,
        };
        locale.text(key)
    }

    pub fn code(self) -> &'static str {
        match self {
            StudyMode::Matching => "matching",
            StudyMode::Quiz => "quiz",
            StudyMode::Scramble => "scramble",
        }
    }
}

/// モード選択画面の項目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Study(StudyMode),
    Statistics,
}

pub const MENU: [MenuItem; 4] = [
    MenuItem::Study(StudyMode::Matching),
    MenuItem::Study(StudyMode::Quiz),
    MenuItem::Study(StudyMode::Scramble),
    MenuItem::Statistics,
];

impl MenuItem {
    pub fn label(self, locale: Locale) -> &'static str {
        match self {
            MenuItem::Study(mode) => mode.name(locale),
            MenuItem::Statistics => locale.text(Text::Statistics),
        }
    }
}
