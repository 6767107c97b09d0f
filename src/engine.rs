/*
 * src/engine.rs
 * 出題プールの作成・問題生成・正誤判定
 */

use std::collections::{BTreeSet, HashSet};

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::catalog::{Catalog, KanjiItem};

/// クイズ開始に必要な最小プールサイズ
pub const MIN_POOL_SIZE: usize = 3;
/// 選択肢の最大数 (正解 + 不正解)
pub const MAX_OPTIONS: usize = 4;
/// 不正解の選択肢の最大数
pub const MAX_DISTRACTORS: usize = MAX_OPTIONS - 1;

/// 1問分のデータ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub prompt: String,          // 表示する漢字
    pub correct_reading: String, // 正解の読み
    pub options: Vec<String>,    // シャッフル済みの選択肢 (正解をちょうど1つ含む)
}

impl Question {
    /// 正解が `options` の何番目にあるか
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| *o == self.correct_reading)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Wrong,
}

impl Verdict {
    pub fn is_correct(self) -> bool {
        self == Verdict::Correct
    }
}

/// 選択中のグループからプールを作る (カタログの順序を維持)
///
/// 同じ漢字が複数グループにある場合も重複を残す。
pub fn build_pool(catalog: &Catalog, selected: &BTreeSet<String>) -> Vec<KanjiItem> {
    catalog
        .groups()
        .iter()
        .filter(|g| selected.contains(&g.id))
        .flat_map(|g| g.items.iter().cloned())
        .collect()
}

pub fn can_start_quiz(pool: &[KanjiItem]) -> bool {
    pool.len() >= MIN_POOL_SIZE
}

/// 正誤判定 (完全一致)
pub fn evaluate(question: &Question, chosen: &str) -> Verdict {
    if chosen == question.correct_reading {
        Verdict::Correct
    } else {
        Verdict::Wrong
    }
}

/// 問題生成器
///
/// 乱数源は外から渡す。テストでは `StdRng::seed_from_u64` を使う。
pub struct QuizEngine<R = StdRng> {
    rng: R,
}

impl<R: Rng> QuizEngine<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// プールから1問作る。プールが空なら `None`
    pub fn generate_question(&mut self, pool: &[KanjiItem]) -> Option<Question> {
        let correct = pool.choose(&mut self.rng)?;

        // 別の漢字の読みを集める (プール順で重複除去)
        // 正解と同じ読み (同音の別漢字) は選択肢に入れない
        let mut seen = HashSet::new();
        let mut wrong: Vec<&str> = pool
            .iter()
            .filter(|item| item.kanji != correct.kanji && item.reading != correct.reading)
            .map(|item| item.reading.as_str())
            .filter(|reading| seen.insert(*reading))
            .collect();

        wrong.shuffle(&mut self.rng);
        wrong.truncate(MAX_DISTRACTORS);

        let mut options: Vec<String> = Vec::with_capacity(wrong.len() + 1);
        options.push(correct.reading.clone());
        options.extend(wrong.into_iter().map(str::to_string));
        options.shuffle(&mut self.rng);
        options.truncate(MAX_OPTIONS);

        Some(Question {
            prompt: correct.kanji.clone(),
            correct_reading: correct.reading.clone(),
            options,
        })
    }
}
