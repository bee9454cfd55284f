//! Curated synthetic fallback — the strategy of last resort.
//!
//! When every live strategy of an adapter fails, the engine still returns a
//! plausible topic list instead of an error. Topics are sliced by IST hour
//! block and weekday/weekend so output varies across calls, shuffled through
//! the context RNG (seedable for reproducible tests), and every item is
//! flagged `is_fallback` so downstream consumers can tell synthetic from
//! real data.

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::scorer::headline_score;
use crate::types::{SourceKind, TrendItem};

const SOURCE_NAME: &str = "curated";
const MAX_ITEMS: usize = 8;

/// IST is UTC+05:30; the deployment region drives the hour slicing.
const IST_OFFSET_SECS: i32 = 5 * 3600 + 1800;

const MORNING_TOPICS: &[&str] = &[
    "Petrol and diesel prices revised across metros",
    "Weather department issues heavy rain alert for Mumbai",
    "Stock markets open higher on global cues",
    "Delhi air quality dips as stubble burning season begins",
    "Railway announces special trains for festival season",
    "School admission deadlines extended in three states",
];

const MIDDAY_TOPICS: &[&str] = &[
    "Parliament session sees heated debate on new bill",
    "Supreme Court hearing on electoral bonds continues",
    "Rupee recovers against dollar in afternoon trade",
    "Cabinet clears infrastructure package for border states",
    "State assembly passes resolution on river water sharing",
    "Union minister reviews highway construction progress",
];

const EVENING_TOPICS: &[&str] = &[
    "India wins thrilling last-over finish in T20 series",
    "Bollywood star announces new film at grand event",
    "Election commission releases updated voter rolls",
    "Primetime debate erupts over fuel price hike",
    "Metro expansion phase gets green signal in Bengaluru",
    "National award winners felicitated in Delhi ceremony",
];

const NIGHT_TOPICS: &[&str] = &[
    "ISRO confirms successful satellite orbit manoeuvre",
    "Late-night GST council meeting ends without consensus",
    "Team India squad announcement expected tomorrow",
    "Box office collections cross hundred crore mark",
    "Heavy overnight rain waterlogs Chennai suburbs",
    "Border talks conclude with joint statement",
];

const WEEKEND_TOPICS: &[&str] = &[
    "IPL playoff race heats up with double header",
    "Weekend box office sees record footfalls",
    "Farmers market initiative expands to tier-two cities",
];

const WEEKDAY_TOPICS: &[&str] = &[
    "Banking hours change takes effect this week",
    "Monsoon session agenda released by government",
    "Public sector hiring drive opens applications",
];

/// Build the curated fallback list for one source kind.
///
/// The topic subset is a pure function of the IST hour block and
/// weekday/weekend; only the ordering comes from `rng`.
pub(crate) fn curated_items(
    kind: SourceKind,
    now: DateTime<Utc>,
    rng: &mut StdRng,
) -> Vec<TrendItem> {
    let offset = FixedOffset::east_opt(IST_OFFSET_SECS).expect("valid IST offset");
    let ist = now.with_timezone(&offset);

    let block: &[&str] = match ist.hour() {
        5..=10 => MORNING_TOPICS,
        11..=16 => MIDDAY_TOPICS,
        17..=22 => EVENING_TOPICS,
        _ => NIGHT_TOPICS,
    };
    let day_extra: &[&str] = if ist.weekday().number_from_monday() >= 6 {
        WEEKEND_TOPICS
    } else {
        WEEKDAY_TOPICS
    };

    // Membership is fixed per bucket; only the ordering is randomized.
    let mut titles: Vec<&str> = block
        .iter()
        .chain(day_extra)
        .copied()
        .take(MAX_ITEMS)
        .collect();
    titles.shuffle(rng);

    titles
        .into_iter()
        .map(|title| {
            let mut item = TrendItem::new(title, SOURCE_NAME, kind);
            item.score = headline_score(title, SOURCE_NAME);
            item.published_at = Some(now);
            item.is_fallback = true;
            item
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;

    fn fixed_now() -> DateTime<Utc> {
        // 09:00 IST on a Wednesday
        Utc.with_ymd_and_hms(2026, 8, 5, 3, 30, 0).unwrap()
    }

    #[test]
    fn all_items_are_flagged_synthetic() {
        let mut rng = StdRng::seed_from_u64(7);
        let items = curated_items(SourceKind::News, fixed_now(), &mut rng);
        assert!(!items.is_empty());
        assert!(items.iter().all(|i| i.is_fallback));
        assert!(items.iter().all(|i| i.source_name == "curated"));
    }

    #[test]
    fn same_bucket_yields_same_topic_subset() {
        let mut rng_a = StdRng::seed_from_u64(1);
        let mut rng_b = StdRng::seed_from_u64(99);
        let a = curated_items(SourceKind::News, fixed_now(), &mut rng_a);
        let b = curated_items(SourceKind::News, fixed_now(), &mut rng_b);

        let mut titles_a: Vec<String> = a.into_iter().map(|i| i.title).collect();
        let mut titles_b: Vec<String> = b.into_iter().map(|i| i.title).collect();
        titles_a.sort();
        titles_b.sort();
        assert_eq!(titles_a, titles_b, "same hour/day bucket must yield the same subset");
    }

    #[test]
    fn seeded_rng_makes_ordering_reproducible() {
        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        let a = curated_items(SourceKind::Forum, fixed_now(), &mut rng_a);
        let b = curated_items(SourceKind::Forum, fixed_now(), &mut rng_b);
        let titles_a: Vec<&str> = a.iter().map(|i| i.title.as_str()).collect();
        let titles_b: Vec<&str> = b.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles_a, titles_b);
    }

    #[test]
    fn different_hour_blocks_differ() {
        let mut rng = StdRng::seed_from_u64(3);
        let morning = curated_items(SourceKind::News, fixed_now(), &mut rng);

        let mut rng = StdRng::seed_from_u64(3);
        // 19:00 IST same day
        let evening_now = Utc.with_ymd_and_hms(2026, 8, 5, 13, 30, 0).unwrap();
        let evening = curated_items(SourceKind::News, evening_now, &mut rng);

        let morning_titles: Vec<&str> = morning.iter().map(|i| i.title.as_str()).collect();
        assert!(evening.iter().any(|i| !morning_titles.contains(&i.title.as_str())));
    }
}
