use crate::schema::{Beatmap, Score, User};

/// How much of a choke `score` was, relative to the player's overall accuracy
/// and how close they came to a full combo.
///
/// A zero beatmap max combo or a play without any misses, 50s or 100s yields a
/// non-finite value; callers are expected to drop those.
pub fn compute_rebase(score: &Score, user: &User, beatmap: &Beatmap) -> f64 {
    let beatmap_max_combo = f64::from(beatmap.max_combo);
    let statistics = score.statistics();

    let combo_percentage = f64::from(score.max_combo()) / beatmap_max_combo;
    // The 300 count is scaled by the beatmap's max combo, not by the object count.
    let bad_accuracy = f64::from(statistics.count_miss)
        + f64::from(statistics.count_50) * 8.
        + f64::from(statistics.count_100)
            * 2.
            * (f64::from(statistics.count_300) / beatmap_max_combo);
    let accuracy_deficit = user.statistics.hit_accuracy.floor() - score.accuracy() * 100.;

    accuracy_deficit * 1.2 * combo_percentage / bad_accuracy
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::schema::{
        Beatmap, BeatmapRef, BeatmapsetRef, Rank, Score, ScoreStatistics, User, UserStatistics,
    };

    use super::compute_rebase;

    pub fn user(hit_accuracy: f64) -> User {
        User {
            id: 2u64.into(),
            username: "peppy".to_owned(),
            statistics: UserStatistics {
                hit_accuracy,
                global_rank: Some(1234),
                pp: 8000.5,
                play_count: 4000,
            },
        }
    }

    pub fn beatmap(id: u64, max_combo: u32) -> Beatmap {
        Beatmap {
            id: id.into(),
            max_combo,
        }
    }

    pub fn score(
        id: u64,
        beatmap_id: u64,
        rank: Rank,
        accuracy: f64,
        combo: u32,
        [count_50, count_100, count_300, count_miss]: [u32; 4],
    ) -> Score {
        Score::builder()
            .id(id.into())
            .accuracy(accuracy)
            .max_combo(combo)
            .mods(vec!["HD".to_owned()])
            .rank(rank)
            .statistics(
                ScoreStatistics::builder()
                    .count_50(count_50)
                    .count_100(count_100)
                    .count_300(count_300)
                    .count_miss(count_miss)
                    .build(),
            )
            .beatmap(BeatmapRef {
                id: beatmap_id.into(),
                version: format!("Diff {beatmap_id}"),
            })
            .beatmapset(BeatmapsetRef {
                title: format!("Song {beatmap_id}"),
            })
            .build()
    }

    #[test]
    fn test_rebase_example() {
        let score = score(1, 1, Rank::S, 0.97, 480, [2, 3, 495, 0]);
        let rebase = compute_rebase(&score, &user(98.5), &beatmap(1, 500));
        // (98 - 97) * 1.2 * 0.96 / (16 + 6 * 0.99)
        let expected = 1. * 1.2 * 0.96 / 21.94;
        assert!((rebase - expected).abs() < 1e-9, "{rebase} != {expected}");
        assert!((rebase - 0.05250).abs() < 1e-5);
    }

    #[test]
    fn test_rebase_weights_misses() {
        let user = user(99.2);
        let beatmap = beatmap(1, 1000);
        let choke = score(1, 1, Rank::A, 0.95, 900, [0, 0, 990, 1]);
        let messy = score(2, 1, Rank::A, 0.95, 900, [2, 0, 990, 1]);
        let choke = compute_rebase(&choke, &user, &beatmap);
        let messy = compute_rebase(&messy, &user, &beatmap);
        assert!(choke > messy);
        assert!((choke - 4. * 1.2 * 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_rebase_negative_above_average() {
        let score = score(1, 1, Rank::S, 0.995, 400, [0, 2, 398, 0]);
        let rebase = compute_rebase(&score, &user(97.9), &beatmap(1, 400));
        assert!(rebase < 0.);
    }

    #[test]
    fn test_rebase_degenerate_inputs() {
        let flawless = score(1, 1, Rank::SilverSs, 1.0, 300, [0, 0, 300, 0]);
        assert!(!compute_rebase(&flawless, &user(98.5), &beatmap(1, 300)).is_finite());

        let no_100_weight = score(2, 1, Rank::S, 0.99, 300, [0, 3, 0, 0]);
        assert!(!compute_rebase(&no_100_weight, &user(99.5), &beatmap(1, 300)).is_finite());

        let zero_max_combo = score(3, 1, Rank::A, 0.9, 0, [1, 1, 10, 1]);
        assert!(!compute_rebase(&zero_max_combo, &user(98.5), &beatmap(1, 0)).is_finite());
    }
}
