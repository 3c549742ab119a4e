//! `i18n-parity` コマンドの本体
//!
//! 参照ロケールと候補ロケールのカタログ構造を比較し、差分を 1 行ずつ書き出す。
//! 終了コード: 0 差分なし / 1 差分あり / 2 設定または読み込みの失敗

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::config::{
    ConfigError,
    ConfigManager,
};
use crate::input::{
    LoadError,
    LoadReport,
    LocaleSource,
    load_locales,
};
use crate::parity::{
    DiscrepancyKind,
    compare_catalogs,
    compare_placeholders,
};

/// 差分なし
pub const EXIT_CLEAN: u8 = 0;
/// 差分あり
pub const EXIT_DISCREPANCIES: u8 = 1;
/// 設定・読み込みの失敗
pub const EXIT_FAILURE: u8 = 2;

/// コマンドライン引数
#[derive(Parser, Debug, Clone)]
#[command(name = "i18n-parity")]
#[command(about = "Check that translation catalogs share the reference locale's key structure")]
pub struct Args {
    /// Project root containing the translation files
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Reference locale (overrides the configured one)
    #[arg(long, value_name = "LOCALE")]
    pub reference: Option<String>,

    /// Also compare placeholder names of shared keys
    #[arg(long)]
    pub placeholders: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Candidate locales (defaults to every loaded locale except the reference)
    #[arg(value_name = "CANDIDATE")]
    pub candidates: Vec<String>,
}

/// 比較を完了できなかった理由
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Locale '{0}' was not found")]
    LocaleNotFound(String),

    #[error("Locale '{0}' failed to load")]
    LocaleFailed(String),

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// 比較が完了したときの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Clean,
    /// 報告した差分の件数
    Discrepancies(usize),
}

/// 実行結果を終了コードに変換する
#[must_use]
pub const fn exit_code(result: &Result<CheckOutcome, CliError>) -> u8 {
    match result {
        Ok(CheckOutcome::Clean) => EXIT_CLEAN,
        Ok(CheckOutcome::Discrepancies(_)) => EXIT_DISCREPANCIES,
        Err(_) => EXIT_FAILURE,
    }
}

/// 設定と翻訳ファイルを読み込み、候補ロケールごとの差分を `out` に書き出す
pub async fn run<W: Write>(args: &Args, out: &mut W) -> Result<CheckOutcome, CliError> {
    let mut config_manager = ConfigManager::new();
    config_manager.load_settings(Some(args.root.clone()))?;
    if let Some(reference) = &args.reference {
        let mut settings = config_manager.get_settings().clone();
        settings.reference_locale = Some(reference.clone());
        config_manager.update_settings(settings)?;
    }
    let settings = config_manager.get_settings();
    let reference_locale = settings.reference_locale();

    let report = load_locales(&args.root, settings).await?;
    for failure in &report.failures {
        for error in &failure.errors {
            tracing::warn!(locale = %failure.locale, "{error}");
        }
    }

    let reference = source_of(&report, reference_locale)?;
    let candidates: Vec<&str> = if args.candidates.is_empty() {
        report
            .sources
            .iter()
            .map(LocaleSource::locale)
            .filter(|locale| *locale != reference_locale)
            .collect()
    } else {
        args.candidates.iter().map(String::as_str).collect()
    };

    let mut found = 0_usize;
    for locale in candidates {
        let candidate = source_of(&report, locale)?;
        for discrepancy in compare_catalogs(reference.catalog(), candidate.catalog()) {
            // 欠落キーは参照側、それ以外は候補側のファイル位置を示す
            let located = if discrepancy.kind == DiscrepancyKind::MissingInCandidate {
                reference.locate(&discrepancy.path)
            } else {
                candidate.locate(&discrepancy.path)
            };
            match located {
                Some((path, range)) => writeln!(
                    out,
                    "{locale}: {} {} ({}:{})",
                    discrepancy.kind,
                    discrepancy.path,
                    path.display(),
                    range.start
                )?,
                None => writeln!(out, "{locale}: {} {}", discrepancy.kind, discrepancy.path)?,
            }
            found += 1;
        }

        if args.placeholders {
            for mismatch in compare_placeholders(reference.catalog(), candidate.catalog()) {
                writeln!(
                    out,
                    "{locale}: placeholders {} (missing: [{}], extra: [{}])",
                    mismatch.path,
                    mismatch.missing.join(", "),
                    mismatch.extra.join(", ")
                )?;
                found += 1;
            }
        }
    }

    tracing::info!(reference = reference_locale, discrepancies = found, "Parity check finished");
    Ok(if found == 0 { CheckOutcome::Clean } else { CheckOutcome::Discrepancies(found) })
}

/// 読み込み結果からロケールのカタログを取り出す
fn source_of<'a>(report: &'a LoadReport, locale: &str) -> Result<&'a LocaleSource, CliError> {
    if let Some(source) = report.source(locale) {
        return Ok(source);
    }
    Err(if report.failure(locale).is_some() {
        CliError::LocaleFailed(locale.to_string())
    } else {
        CliError::LocaleNotFound(locale.to_string())
    })
}
