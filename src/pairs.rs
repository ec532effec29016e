/*
 * src/pairs.rs
 * 単語ペア (お題) のデータと読み込み
 */

use std::path::Path;

use log::{info, warn};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::i18n::{Locale, Text};

/// 1組の単語と意味
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub id: u32,
    pub word: String,
    pub meaning: String,
}

/// トピック (単語帳の1カテゴリ)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(alias = "vocabularies")]
    pub pairs: Vec<Pair>,
}

// --------------------------------------------------
// 組み込みの単語帳
// --------------------------------------------------

#[derive(Copy, Clone)]
pub struct BuiltinPair {
    pub id: u32,
    pub word: &'static str,
    pub meaning: &'static str,
}

#[derive(Copy, Clone)]
pub struct BuiltinTopic {
    pub id: u32,
    pub name: &'static str,
    pub level: &'static str,
    pub description: &'static str,
    pub pairs: &'static [BuiltinPair],
}

/// ファイル指定がないときに使うトピック一覧
pub const BUILTIN_TOPICS: &[BuiltinTopic] = &[
    BuiltinTopic {
        id: 1,
        name: "Gia đình",
        level: "A1",
        description: "Từ vựng cơ bản về gia đình",
        pairs: &[
            BuiltinPair { id: 1, word: "father", meaning: "bố, cha" },
            BuiltinPair { id: 2, word: "mother", meaning: "mẹ" },
            BuiltinPair { id: 3, word: "brother", meaning: "anh trai, em trai" },
            BuiltinPair { id: 4, word: "sister", meaning: "chị gái, em gái" },
            BuiltinPair { id: 5, word: "grandfather", meaning: "ông nội, ông ngoại" },
            BuiltinPair { id: 6, word: "grandmother", meaning: "bà nội, bà ngoại" },
            BuiltinPair { id: 7, word: "uncle", meaning: "chú, bác, cậu" },
            BuiltinPair { id: 8, word: "aunt", meaning: "cô, dì, thím" },
            BuiltinPair { id: 9, word: "cousin", meaning: "anh em họ" },
            BuiltinPair { id: 10, word: "parents", meaning: "bố mẹ" },
        ],
    },
    BuiltinTopic {
        id: 2,
        name: "Du lịch",
        level: "A2",
        description: "Từ vựng liên quan đến du lịch",
        pairs: &[
            BuiltinPair { id: 11, word: "airport", meaning: "sân bay" },
            BuiltinPair { id: 12, word: "hotel", meaning: "khách sạn" },
            BuiltinPair { id: 13, word: "passport", meaning: "hộ chiếu" },
            BuiltinPair { id: 14, word: "ticket", meaning: "vé" },
            BuiltinPair { id: 15, word: "luggage", meaning: "hành lý" },
            BuiltinPair { id: 16, word: "vacation", meaning: "kỳ nghỉ" },
            BuiltinPair { id: 17, word: "tourist", meaning: "khách du lịch" },
            BuiltinPair { id: 18, word: "guide", meaning: "hướng dẫn viên" },
            BuiltinPair { id: 19, word: "map", meaning: "bản đồ" },
            BuiltinPair { id: 20, word: "restaurant", meaning: "nhà hàng" },
        ],
    },
    BuiltinTopic {
        id: 5,
        name: "Đồ ăn",
        level: "A2",
        description: "Từ vựng về thức ăn và đồ uống",
        pairs: &[
            BuiltinPair { id: 41, word: "breakfast", meaning: "bữa sáng" },
            BuiltinPair { id: 42, word: "lunch", meaning: "bữa trưa" },
            BuiltinPair { id: 43, word: "dinner", meaning: "bữa tối" },
            BuiltinPair { id: 44, word: "rice", meaning: "cơm, gạo" },
            BuiltinPair { id: 45, word: "bread", meaning: "bánh mì" },
            BuiltinPair { id: 46, word: "fruit", meaning: "trái cây" },
            BuiltinPair { id: 47, word: "vegetable", meaning: "rau củ" },
            BuiltinPair { id: 48, word: "meat", meaning: "thịt" },
            BuiltinPair { id: 49, word: "fish", meaning: "cá" },
            BuiltinPair { id: 50, word: "water", meaning: "nước" },
        ],
    },
];

impl From<&BuiltinPair> for Pair {
    fn from(p: &BuiltinPair) -> Self {
        Self {
            id: p.id,
            word: p.word.to_string(),
            meaning: p.meaning.to_string(),
        }
    }
}

impl From<&BuiltinTopic> for Topic {
    fn from(t: &BuiltinTopic) -> Self {
        Self {
            id: t.id,
            name: t.name.to_string(),
            level: Some(t.level.to_string()),
            description: Some(t.description.to_string()),
            pairs: t.pairs.iter().map(Pair::from).collect(),
        }
    }
}

impl Topic {
    /// トピック選択の表示名 ("Gia đình (A1, 10 từ)")
    pub fn label(&self, locale: Locale) -> String {
        let words = locale.text(Text::Words);
        match &self.level {
            Some(level) => format!("{} ({level}, {} {words})", self.name, self.pairs.len()),
            None => format!("{} ({} {words})", self.name, self.pairs.len()),
        }
    }
}

pub fn builtin_topics() -> Vec<Topic> {
    BUILTIN_TOPICS.iter().map(Topic::from).collect()
}

// --------------------------------------------------
// 単語帳ファイル (JSON)
// --------------------------------------------------

/// 受け付ける JSON の形
#[derive(Deserialize)]
#[serde(untagged)]
enum DeckFile {
    /// `{"topics": [...]}`
    Topics { topics: Vec<Topic> },
    /// サーバーの `/api/random/matching` の応答。`words` と `meanings` は使わない
    Matching { correct_pairs: Vec<Pair> },
    /// `[{"id", "word", "meaning"}, ...]`
    Pairs(Vec<Pair>),
}

/// JSON 文字列からトピック一覧を作る
pub fn parse_deck(json: &str) -> Result<Vec<Topic>, AppError> {
    let topics = match serde_json::from_str::<DeckFile>(json)? {
        DeckFile::Topics { topics } => topics,
        DeckFile::Matching { correct_pairs } => vec![custom_topic("random", correct_pairs)],
        DeckFile::Pairs(pairs) => vec![custom_topic("custom", pairs)],
    };

    if topics.is_empty() {
        return Err(AppError::EmptyDeck("deck".to_string()));
    }
    if let Some(empty) = topics.iter().find(|t| t.pairs.is_empty()) {
        return Err(AppError::EmptyDeck(empty.name.clone()));
    }
    Ok(topics)
}

fn custom_topic(name: &str, pairs: Vec<Pair>) -> Topic {
    Topic {
        id: 0,
        name: name.to_string(),
        level: None,
        description: None,
        pairs,
    }
}

/// 単語帳ファイルを読み込む
pub fn load_deck(path: &Path) -> Result<Vec<Topic>, AppError> {
    let json = std::fs::read_to_string(path)?;
    let topics = parse_deck(&json)?;
    info!("Loaded {} topic(s) from {}", topics.len(), path.display());
    Ok(topics)
}

/// ID または名前 (大文字小文字を区別しない) でトピックを探す
pub fn find_topic<'a>(topics: &'a [Topic], selector: &str) -> Option<&'a Topic> {
    let selector = selector.trim();
    if let Ok(id) = selector.parse::<u32>() {
        if let Some(topic) = topics.iter().find(|t| t.id == id) {
            return Some(topic);
        }
    }
    topics
        .iter()
        .find(|t| t.name.to_lowercase() == selector.to_lowercase())
}

// --------------------------------------------------
// ラウンドの大きさ
// --------------------------------------------------

/// 先頭から `n` 組
pub fn first_n(pairs: &[Pair], n: usize) -> Vec<Pair> {
    pairs.iter().take(n).cloned().collect()
}

/// ランダムに `n` 組 (足りなければ全部)
pub fn random_n<R: Rng + ?Sized>(pairs: &[Pair], n: usize, rng: &mut R) -> Vec<Pair> {
    if pairs.len() < n {
        warn!("Only {} pairs available, wanted {}", pairs.len(), n);
    }
    pairs.choose_multiple(rng, n).cloned().collect()
}
