use crate::config::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "strain-dex")]
#[command(about = "AI-powered cannabis catalog", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 解析エンドポイントのベースURL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// カタログの保存先ディレクトリ
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 解析エンドポイントを起動
    Serve {
        /// 待ち受けアドレス（例: 0.0.0.0:3000）
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// 対話式で図鑑を操作
    Dex,

    /// 写真とレビューを解析してエントリを追加
    Add {
        /// パッケージ写真
        #[arg(required = true)]
        image: PathBuf,

        /// レビュー
        #[arg(short, long)]
        review: String,

        /// 確認せずに保存
        #[arg(short, long)]
        yes: bool,
    },

    /// 保存済みエントリを一覧表示
    List,

    /// エントリの詳細を表示
    Show {
        /// エントリID
        #[arg(required = true)]
        id: String,

        /// 画像をファイルに書き出す
        #[arg(long)]
        export_image: Option<PathBuf>,
    },

    /// 設定を表示
    Config {
        /// 現在の設定を表示
        #[arg(long)]
        show: bool,
    },
}

impl Cli {
    /// CLIフラグで設定を上書き
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = Some(dir.clone());
        }
        if let Commands::Serve { bind: Some(bind) } = &self.command {
            config.bind_address = bind.clone();
        }
    }
}
