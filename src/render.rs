use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use lazy_format::lazy_format;
use log::info;
use num_format::{Locale, ToFormattedString};
use serde::{Deserialize, Serialize};

use crate::{
    chrono_util::friendly_timestamp,
    fs_json_util::write_json_pretty,
    report::{Report, ReportRow},
    schema::{User, UserId},
};

/// Who a report was calculated for, and when.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Details {
    pub user: String,
    pub user_id: UserId,
    pub rank: Option<u64>,
    pub pp: f64,
    pub play_count: u64,
    pub calculated_on: String,
}

impl Details {
    pub fn new(user: &User, calculated_on: &DateTime<Local>) -> Self {
        Self {
            user: user.username.clone(),
            user_id: user.id,
            rank: user.statistics.global_rank,
            pp: user.statistics.pp,
            play_count: user.statistics.play_count,
            calculated_on: friendly_timestamp(calculated_on),
        }
    }
}

/// Contents of one `<RANK>.json` file.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct RankFile<'a> {
    pub details: Cow<'a, Details>,
    pub scores: Cow<'a, [ReportRow]>,
}

#[derive(Debug, thiserror::Error)]
#[error("\"{}\" is not a valid path! Please ensure that it exists, and that you have inputted it correctly!", .0.display())]
pub struct OutputPathError(pub PathBuf);

pub fn validate_output_dir(dir: &Path) -> Result<(), OutputPathError> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(OutputPathError(dir.to_owned()))
    }
}

pub fn rank_table(rows: &[ReportRow]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header([
            "Beatmap",
            "Difficulty",
            "Mods",
            "Rebase",
            "Combo",
            "Accuracy",
            "Misses",
            "Score",
        ]);
    for row in rows {
        table.add_row([
            row.name().clone(),
            row.difficulty().clone(),
            row.mods().clone(),
            format!("{:.5}", row.rebase()),
            lazy_format!("{}/{}", row.combo(), row.max_combo()).to_string(),
            format!("{:.2}%", row.accuracy()),
            row.misses().to_string(),
            row.score_url().to_string(),
        ]);
    }
    table
}

pub fn print_report(user: &User, report: &Report) {
    let statistics = &user.statistics;
    println!(
        "{} (#{}, {:.2}pp, {} plays)",
        user.username,
        statistics
            .global_rank
            .map_or_else(|| "-".to_owned(), |rank| rank.to_formatted_string(&Locale::en)),
        statistics.pp,
        statistics.play_count.to_formatted_string(&Locale::en),
    );
    if report.is_empty() {
        println!("No chokes were found.");
        return;
    }
    for (rank, rows) in report.groups() {
        println!();
        println!("{rank}");
        println!("{}", rank_table(rows));
    }
}

/// Writes every group of `report` to `<dir>/<RANK>.json`, returning the paths written.
pub fn write_rank_files(
    dir: &Path,
    report: &Report,
    details: &Details,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = vec![];
    for (rank, rows) in report.groups() {
        let path = dir.join(format!("{}.json", rank.as_str().to_uppercase()));
        let file = RankFile {
            details: Cow::Borrowed(details),
            scores: Cow::Borrowed(rows),
        };
        write_json_pretty(&path, &file)?;
        info!("Wrote {} scores to {path:?}.", rows.len());
        paths.push(path);
    }
    Ok(paths)
}
