use std::{future::Future, sync::Arc};

use anyhow::{anyhow, Context};
use getset::{CopyGetters, Getters};
use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use tokio::{sync::Semaphore, task::JoinSet};
use typed_builder::TypedBuilder;
use url::Url;

use crate::{
    rebase::compute_rebase,
    schema::{Beatmap, BeatmapId, GameMode, Rank, Score, User},
};

/// Resolves the full beatmap record for a score.
pub trait BeatmapLookup: Send + Sync + 'static {
    fn beatmap(&self, id: BeatmapId) -> impl Future<Output = anyhow::Result<Beatmap>> + Send;
}

#[derive(Clone, Copy, Debug, TypedBuilder)]
pub struct ReportOptions {
    #[builder(default)]
    pub mode: GameMode,
    /// Maximum number of beatmap lookups in flight.
    #[builder(default = 10)]
    pub concurrency: usize,
}

#[derive(Clone, PartialEq, Debug, Getters, CopyGetters, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    #[getset(get_copy = "pub")]
    rebase: f64,
    #[getset(get = "pub")]
    beatmap_url: Url,
    #[getset(get = "pub")]
    score_url: Url,
    #[getset(get = "pub")]
    name: String,
    #[getset(get = "pub")]
    difficulty: String,
    /// In percent.
    #[getset(get_copy = "pub")]
    accuracy: f64,
    #[getset(get = "pub")]
    rank: Rank,
    #[getset(get_copy = "pub")]
    combo: u32,
    #[getset(get_copy = "pub")]
    max_combo: u32,
    #[getset(get = "pub")]
    mods: String,
    #[getset(get_copy = "pub")]
    misses: u32,
}

impl ReportRow {
    pub fn new(
        score: &Score,
        user: &User,
        beatmap: &Beatmap,
        mode: GameMode,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            rebase: compute_rebase(score, user, beatmap),
            beatmap_url: Url::parse(&format!("https://osu.ppy.sh/b/{}", score.beatmap().id))?,
            score_url: Url::parse(&format!("https://osu.ppy.sh/scores/{mode}/{}", score.id()))?,
            name: score.beatmapset().title.clone(),
            difficulty: score.beatmap().version.clone(),
            accuracy: score.accuracy() * 100.,
            rank: score.rank().clone(),
            combo: score.max_combo(),
            max_combo: beatmap.max_combo,
            mods: score.mods_string(),
            misses: score.statistics().count_miss,
        })
    }

    fn is_choke(&self) -> bool {
        if self.accuracy == 100. {
            debug!("Skipping {}: perfect accuracy", self.score_url);
            false
        } else if self.rebase <= 0. {
            debug!("Skipping {}: rebase {} is not positive", self.score_url, self.rebase);
            false
        } else if !self.rebase.is_finite() {
            debug!("Skipping {}: rebase {} is not finite", self.score_url, self.rebase);
            false
        } else {
            true
        }
    }
}

/// Chokes grouped by rank.
///
/// Groups appear in the order their rank is first met when walking every row
/// from the largest rebase down; rows in a group are sorted by descending rebase.
#[derive(Clone, PartialEq, Debug, Default, Serialize)]
pub struct Report {
    groups: IndexMap<Rank, Vec<ReportRow>>,
}

impl Report {
    /// Filters out rows carrying no choke signal, then sorts and groups the rest.
    pub fn from_rows(rows: impl IntoIterator<Item = ReportRow>) -> Self {
        let mut rows = rows.into_iter().filter(ReportRow::is_choke).collect_vec();
        rows.sort_by(|x, y| y.rebase.total_cmp(&x.rebase));
        let mut groups = IndexMap::<_, Vec<_>>::new();
        for row in rows {
            groups.entry(row.rank.clone()).or_default().push(row);
        }
        Self { groups }
    }

    pub fn groups(&self) -> impl Iterator<Item = (&Rank, &[ReportRow])> {
        self.groups.iter().map(|(rank, rows)| (rank, rows.as_slice()))
    }

    pub fn get(&self, rank: &Rank) -> Option<&[ReportRow]> {
        self.groups.get(rank).map(Vec::as_slice)
    }

    pub fn ranks(&self) -> impl Iterator<Item = &Rank> {
        self.groups.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// Looks up the beatmap of every score, rebases them, and builds the report.
///
/// Any failed lookup aborts the whole report.
pub async fn build_report<L: BeatmapLookup>(
    scores: Vec<Score>,
    user: &User,
    lookup: Arc<L>,
    options: ReportOptions,
) -> anyhow::Result<Report> {
    let beatmaps = fetch_beatmaps(&scores, lookup, options.concurrency).await?;
    info!("Rebasing {} scores.", scores.len());
    let rows = scores
        .iter()
        .zip(&beatmaps)
        .map(|(score, beatmap)| ReportRow::new(score, user, beatmap, options.mode))
        .collect::<Result<Vec<_>, _>>()?;
    let report = Report::from_rows(rows);
    info!(
        "{} of {} scores are chokes, across {} ranks.",
        report.row_count(),
        scores.len(),
        report.groups.len()
    );
    Ok(report)
}

/// Returns the beatmaps in the same order as `scores`, whatever order the lookups finish in.
async fn fetch_beatmaps<L: BeatmapLookup>(
    scores: &[Score],
    lookup: Arc<L>,
    concurrency: usize,
) -> anyhow::Result<Vec<Beatmap>> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();
    for (index, score) in scores.iter().enumerate() {
        let id = score.beatmap().id;
        let lookup = Arc::clone(&lookup);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            trace!("Looking up beatmap {id}...");
            let beatmap = lookup
                .beatmap(id)
                .await
                .with_context(|| format!("While looking up beatmap {id}"))?;
            anyhow::Ok((index, beatmap))
        });
    }

    let mut beatmaps = vec![None; scores.len()];
    while let Some(joined) = tasks.join_next().await {
        let (index, beatmap) = joined??;
        beatmaps[index] = Some(beatmap);
    }
    beatmaps
        .into_iter()
        .enumerate()
        .map(|(index, beatmap)| {
            beatmap.ok_or_else(|| anyhow!("Beatmap for score #{index} was never resolved"))
        })
        .collect()
}
