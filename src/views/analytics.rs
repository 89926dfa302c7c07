// SPDX-License-Identifier: MPL-2.0

//! Simulated analytics. The numbers are random placeholders scaled by the
//! number of scheduled posts; nothing is measured.

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyticsSnapshot {
    pub posts_published: usize,
    pub total_reach: u64,
    /// Percent, one decimal place
    pub engagement_rate: f64,
    /// Percent change
    pub reach_trend: i32,
    /// Percentage points, one decimal place
    pub engagement_trend: f64,
    pub posts_trend: i32,
}

impl AnalyticsSnapshot {
    pub fn simulate<R: Rng>(posts_published: usize, rng: &mut R) -> Self {
        // Each post reaches 100-600 people
        let total_reach = posts_published as u64 * rng.random_range(100..600u64);
        let engagement_rate = if posts_published > 0 {
            round1(rng.random_range(1.0..6.0))
        } else {
            0.0
        };

        Self {
            posts_published,
            total_reach,
            engagement_rate,
            reach_trend: rng.random_range(-10..10),
            engagement_trend: round1(rng.random_range(-1.0..1.0)),
            posts_trend: rng.random_range(-2..3),
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Trend label as shown next to a metric, e.g. `+4%`, `-0.3%` or `~0%`
pub fn format_trend(value: f64, unit: &str) -> String {
    if value == 0.0 {
        format!("~0{unit}")
    } else if value > 0.0 {
        format!("+{value}{unit}")
    } else {
        format!("{value}{unit}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_no_posts_means_no_reach() {
        let mut rng = StdRng::seed_from_u64(7);
        let snapshot = AnalyticsSnapshot::simulate(0, &mut rng);
        assert_eq!(snapshot.total_reach, 0);
        assert_eq!(snapshot.engagement_rate, 0.0);
    }

    #[test]
    fn test_values_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for posts in 1..50 {
            let s = AnalyticsSnapshot::simulate(posts, &mut rng);
            let per_post = s.total_reach / posts as u64;
            assert!((100..600).contains(&per_post));
            assert!((1.0..=6.0).contains(&s.engagement_rate));
            assert!((-10..10).contains(&s.reach_trend));
            assert!((-1.0..=1.0).contains(&s.engagement_trend));
            assert!((-2..3).contains(&s.posts_trend));
        }
    }

    #[test]
    fn test_trend_labels() {
        assert_eq!(format_trend(4.0, "%"), "+4%");
        assert_eq!(format_trend(-0.3, "%"), "-0.3%");
        assert_eq!(format_trend(0.0, " posts"), "~0 posts");
        assert_eq!(format_trend(-0.0, "%"), "~0%");
    }
}
