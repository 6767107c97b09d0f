/*
 * src/catalog.rs
 * 漢字グループ (出題データ) を管理するモジュール
 */

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 漢字と読み (ひらがな) のペア
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KanjiItem {
    pub kanji: String,   // 表示用 (漢字)
    pub reading: String, // 正解の読み (ひらがな)
}

impl KanjiItem {
    pub fn new(kanji: impl Into<String>, reading: impl Into<String>) -> Self {
        Self {
            kanji: kanji.into(),
            reading: reading.into(),
        }
    }
}

/// 選択可能な出題グループ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub label: String,
    pub items: Vec<KanjiItem>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("group #{index} has an empty id")]
    EmptyId { index: usize },

    #[error("duplicate group id '{id}'")]
    DuplicateId { id: String },

    #[error("group '{id}' has no items")]
    EmptyGroup { id: String },

    #[error("group '{id}' item #{index} has an empty kanji or reading")]
    BlankItem { id: String, index: usize },

    #[error("failed to read catalog file")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog JSON")]
    Parse(#[from] serde_json::Error),
}

/// カタログファイル (JSON) の形式
#[derive(Deserialize)]
struct CatalogFile {
    groups: Vec<Group>,
}

/// 検証済み・読み取り専用のグループ一覧
#[derive(Debug, Clone)]
pub struct Catalog {
    groups: Vec<Group>,
}

impl Catalog {
    /// グループ一覧を検証してカタログを作る
    pub fn new(groups: Vec<Group>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();

        for (index, group) in groups.iter().enumerate() {
            if group.id.trim().is_empty() {
                return Err(CatalogError::EmptyId { index });
            }
            if !seen.insert(group.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    id: group.id.clone(),
                });
            }
            if group.items.is_empty() {
                return Err(CatalogError::EmptyGroup {
                    id: group.id.clone(),
                });
            }
            for (index, item) in group.items.iter().enumerate() {
                if item.kanji.trim().is_empty() || item.reading.trim().is_empty() {
                    return Err(CatalogError::BlankItem {
                        id: group.id.clone(),
                        index,
                    });
                }
            }
        }

        Ok(Self { groups })
    }

    /// 組み込みの N5 データ
    pub fn builtin() -> Self {
        let groups = KANJI_GROUPS
            .iter()
            .map(|def| Group {
                id: def.id.to_string(),
                label: def.label.to_string(),
                items: def
                    .items
                    .iter()
                    .map(|(kanji, reading)| KanjiItem::new(*kanji, *reading))
                    .collect(),
            })
            .collect();

        // 組み込みデータはテストで検証済み
        Self { groups }
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.groups)
    }

    /// MARK:ファイルからカタログを読み込む
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn get(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

// --------------------------------------------------
// 組み込みデータ
// --------------------------------------------------

struct GroupDef {
    id: &'static str,
    label: &'static str,
    items: &'static [(&'static str, &'static str)],
}

/// グループ一覧 (N5)
const KANJI_GROUPS: &[GroupDef] = &[
    GroupDef {
        id: "n5_numbers",
        label: "Numbers (一〜十)",
        items: &[
            ("一", "いち"),
            ("二", "に"),
            ("三", "さん"),
            ("四", "よん"),
            ("五", "ご"),
            ("六", "ろく"),
            ("七", "なな"),
            ("八", "はち"),
            ("九", "きゅう"),
            ("十", "じゅう"),
        ],
    },
    GroupDef {
        id: "n5_days",
        label: "Days / Time",
        items: &[
            ("日", "にち"),
            ("月", "つき"),
            ("年", "とし"),
            ("時", "じ"),
        ],
    },
    GroupDef {
        id: "n5_people",
        label: "People",
        items: &[
            ("人", "ひと"),
            ("口", "くち"),
            ("名", "な"),
        ],
    },
    GroupDef {
        id: "n5_school",
        label: "School / Study",
        items: &[
            ("学", "がく"),
            ("先", "せん"),
            ("生", "せい"),
            ("校", "こう"),
        ],
    },
];
