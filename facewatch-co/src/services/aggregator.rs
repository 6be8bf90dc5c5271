//! Cross-modal detection aggregation with a short-lived memo cache
//!
//! The per-person history concatenates every detection source, sorts by
//! last-seen descending, and paginates. Results are memoized for a fixed
//! one-second window under a versioned per-person namespace: renaming a
//! person bumps its version and orphans every cached page at once, with no
//! key enumeration. Ingestion does not bump the version - new detections
//! become visible when the window lapses, and reads inside one window stay
//! identical by contract.

use facewatch_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use facewatch_common::db::Media;

use crate::pagination::calculate_pagination;
use crate::services::detection_source::{DetectionRecord, DetectionSource, MediaDetection};
use crate::services::photo_detections::PhotoDetectionSource;
use crate::services::video_detections::VideoDetectionSource;

/// How long a computed page stays served from memory
pub const CACHE_TTL: Duration = Duration::from_secs(1);

/// One page of a person's detection history
#[derive(Debug, Clone, Serialize)]
pub struct DetectionPage {
    pub current_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub last_page: i64,
    /// 1-based index of the first item on this page (0 when empty)
    pub from: i64,
    /// 1-based index of the last item on this page
    pub to: i64,
    pub data: Vec<MediaDetection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    person_id: i64,
    version: u64,
    page: i64,
    per_page: i64,
}

struct CachedPage {
    stored_at: Instant,
    page: DetectionPage,
}

/// Aggregates all detection sources into the unified per-person view
pub struct DetectionAggregator {
    sources: Vec<Box<dyn DetectionSource>>,
    entries: RwLock<HashMap<CacheKey, CachedPage>>,
    versions: RwLock<HashMap<i64, u64>>,
    ttl: Duration,
}

impl DetectionAggregator {
    /// Standard aggregator over the video fact table and photo meta scans
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_sources(
            vec![
                Box::new(VideoDetectionSource::new(pool.clone())),
                Box::new(PhotoDetectionSource::new(pool)),
            ],
            CACHE_TTL,
        )
    }

    pub fn with_sources(sources: Vec<Box<dyn DetectionSource>>, ttl: Duration) -> Self {
        Self {
            sources,
            entries: RwLock::new(HashMap::new()),
            versions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Paginated detection history for one person, newest first
    pub async fn list_detections(
        &self,
        person_id: i64,
        requested_page: i64,
        requested_per_page: i64,
    ) -> Result<DetectionPage> {
        let page = requested_page.max(1);
        let per_page = requested_per_page.clamp(1, crate::pagination::MAX_PER_PAGE);

        let key = CacheKey {
            person_id,
            version: self.version_of(person_id).await,
            page,
            per_page,
        };

        if let Some(cached) = self.entries.read().await.get(&key) {
            if cached.stored_at.elapsed() < self.ttl {
                return Ok(cached.page.clone());
            }
        }

        // Recomputation is pure: same inputs, same page.
        let result = self.compute(person_id, page, per_page).await?;

        let mut entries = self.entries.write().await;
        let ttl = self.ttl;
        entries.retain(|_, cached| cached.stored_at.elapsed() < ttl);
        entries.insert(
            key,
            CachedPage {
                stored_at: Instant::now(),
                page: result.clone(),
            },
        );

        Ok(result)
    }

    async fn compute(&self, person_id: i64, page: i64, per_page: i64) -> Result<DetectionPage> {
        let mut all: Vec<MediaDetection> = Vec::new();
        for source in &self.sources {
            all.extend(source.hits_for_person(person_id).await?);
        }

        all.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));

        let total = all.len() as i64;
        let p = calculate_pagination(total, page, per_page);
        let data: Vec<MediaDetection> = all
            .into_iter()
            .skip(p.offset as usize)
            .take(p.per_page as usize)
            .collect();

        let from = if data.is_empty() { 0 } else { p.offset + 1 };
        let to = p.offset + data.len() as i64;

        Ok(DetectionPage {
            current_page: p.page,
            per_page: p.per_page,
            total,
            last_page: p.last_page,
            from,
            to,
            data,
        })
    }

    /// Uncached total across all sources, used by the people listing.
    ///
    /// The photo side rescans processed photos for every call, so a listing
    /// of P people over N photos costs O(P x N). Known hazard of the
    /// embedded representation; not silently optimized here.
    pub async fn total_for_person(&self, person_id: i64) -> Result<i64> {
        let mut total = 0;
        for source in &self.sources {
            total += source.count_for_person(person_id).await?;
        }
        Ok(total)
    }

    /// All stored detections for one media item, across every source
    ///
    /// Uncached: a media item's detections are read at most once per
    /// request, unlike the per-person history.
    pub async fn detections_for_media(&self, media: &Media) -> Result<Vec<DetectionRecord>> {
        let mut records = Vec::new();
        for source in &self.sources {
            records.extend(source.detections_for_media(media).await?);
        }
        Ok(records)
    }

    /// Orphan every cached page for the person by bumping its namespace
    pub async fn invalidate_person(&self, person_id: i64) {
        let mut versions = self.versions.write().await;
        *versions.entry(person_id).or_insert(0) += 1;
    }

    async fn version_of(&self, person_id: i64) -> u64 {
        self.versions.read().await.get(&person_id).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::detection_source::DetectionKind;
    use async_trait::async_trait;
    use facewatch_common::db::{Media, MediaStatus, MediaType};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn media(id: i64) -> Media {
        Media {
            id,
            path: format!("media/{}.mp4", id),
            media_type: MediaType::Video,
            status: MediaStatus::Processed,
            meta: None,
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            updated_at: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }

    /// Source returning a fixed list, counting how often it is asked
    struct FixedSource {
        items: Vec<MediaDetection>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl DetectionSource for FixedSource {
        async fn hits_for_person(&self, _person_id: i64) -> Result<Vec<MediaDetection>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.items.clone())
        }

        async fn detections_for_media(&self, _media: &Media) -> Result<Vec<DetectionRecord>> {
            Ok(Vec::new())
        }

        async fn count_for_person(&self, _person_id: i64) -> Result<i64> {
            Ok(self.items.len() as i64)
        }
    }

    fn detection(id: i64, last_seen: &str) -> MediaDetection {
        MediaDetection {
            media: media(id),
            detection_type: DetectionKind::Video,
            total_frames: 1,
            first_seen: last_seen.to_string(),
            last_seen: last_seen.to_string(),
        }
    }

    fn aggregator_with(
        items: Vec<MediaDetection>,
        ttl: Duration,
    ) -> (DetectionAggregator, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = FixedSource {
            items,
            calls: calls.clone(),
        };
        (
            DetectionAggregator::with_sources(vec![Box::new(source)], ttl),
            calls,
        )
    }

    #[tokio::test]
    async fn sorts_newest_first_and_paginates() {
        let items = vec![
            detection(1, "2026-01-01T00:00:01.000Z"),
            detection(2, "2026-01-01T00:00:03.000Z"),
            detection(3, "2026-01-01T00:00:02.000Z"),
        ];
        let (agg, _) = aggregator_with(items, Duration::from_secs(1));

        let page = agg.list_detections(9, 1, 2).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.last_page, 2);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].media.id, 2);
        assert_eq!(page.data[1].media.id, 3);
        assert_eq!((page.from, page.to), (1, 2));

        let page2 = agg.list_detections(9, 2, 2).await.unwrap();
        assert_eq!(page2.data.len(), 1);
        assert_eq!(page2.data[0].media.id, 1);
        assert_eq!((page2.from, page2.to), (3, 3));
    }

    #[tokio::test]
    async fn memoizes_within_ttl() {
        let (agg, calls) = aggregator_with(
            vec![detection(1, "2026-01-01T00:00:01.000Z")],
            Duration::from_secs(60),
        );

        agg.list_detections(9, 1, 10).await.unwrap();
        agg.list_detections(9, 1, 10).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recomputes_after_ttl_lapses() {
        let (agg, calls) = aggregator_with(
            vec![detection(1, "2026-01-01T00:00:01.000Z")],
            Duration::from_millis(10),
        );

        agg.list_detections(9, 1, 10).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        agg.list_detections(9, 1, 10).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidation_orphans_cached_pages() {
        let (agg, calls) = aggregator_with(
            vec![detection(1, "2026-01-01T00:00:01.000Z")],
            Duration::from_secs(60),
        );

        agg.list_detections(9, 1, 10).await.unwrap();
        agg.invalidate_person(9).await;
        agg.list_detections(9, 1, 10).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidation_is_scoped_to_one_person() {
        let (agg, calls) = aggregator_with(
            vec![detection(1, "2026-01-01T00:00:01.000Z")],
            Duration::from_secs(60),
        );

        agg.list_detections(9, 1, 10).await.unwrap();
        agg.invalidate_person(8).await;
        agg.list_detections(9, 1, 10).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
