// ============================================
// src/cli.rs
// コマンドライン引数
// ============================================

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "kanjiquiz", version, about = "Offline kanji reading quiz.")]
pub struct Args {
    /// 組み込みデータの代わりに使うカタログ (JSON)
    #[arg(long, env = "KANJIQUIZ_CATALOG", value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// 乱数のシード (同じシードなら同じ出題順)
    #[arg(long)]
    pub seed: Option<u64>,

    /// TUI ではなくプロンプト形式で遊ぶ
    #[arg(long)]
    pub plain: bool,

    /// グループ一覧を表示して終了
    #[arg(long)]
    pub list: bool,

    /// ログの出力先
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["kanjiquiz"]).unwrap();

        assert!(args.seed.is_none());
        assert!(!args.plain);
        assert!(!args.list);
        assert!(args.log_file.is_none());
    }

    #[test]
    fn all_flags() {
        let args = Args::try_parse_from([
            "kanjiquiz",
            "--catalog",
            "data/catalog.example.json",
            "--seed",
            "42",
            "--plain",
            "--list",
            "--log-file",
            "quiz.log",
        ])
        .unwrap();

        assert_eq!(args.catalog, Some(PathBuf::from("data/catalog.example.json")));
        assert_eq!(args.seed, Some(42));
        assert!(args.plain && args.list);
        assert_eq!(args.log_file, Some(PathBuf::from("quiz.log")));
    }

    #[test]
    fn seed_must_be_a_number() {
        assert!(Args::try_parse_from(["kanjiquiz", "--seed", "abc"]).is_err());
    }

    #[test]
    fn command_is_well_formed() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
