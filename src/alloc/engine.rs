use crate::alloc::committer::commit;
use crate::alloc::filter::select_available;
use crate::alloc::matcher::{CategoryMatcher, DEFAULT_SIMILARITY_THRESHOLD, distinct_categories};
use crate::alloc::projector::ContactCard;
use crate::error::AllocError;
use crate::inventory::{ContactRecord, InventoryStore, StoreError};
use chrono::NaiveDate;
use serde::Serialize;
use smol_str::SmolStr;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, error, info};

// ─── Clock ──────────────────────────────────────────────────────────────────

/// Source of the issuance date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

// ─── Config & results ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Minimum similarity score accepted by the fallback matching stage.
    pub similarity_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

/// Terminal state of an allocation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Allocated,
    NoCategoryMatch,
    NoAvailableRecords,
}

#[derive(Debug, Clone, Serialize)]
pub struct Allocation {
    pub outcome: Outcome,
    pub category: Option<SmolStr>,
    pub requested: u64,
    pub records: Vec<ContactCard>,
    /// Positions claimed by this request, parallel to `records`.
    #[serde(skip)]
    pub positions: Vec<u64>,
}

impl Allocation {
    fn empty(outcome: Outcome, category: Option<SmolStr>, requested: u64) -> Self {
        Self {
            outcome,
            category,
            requested,
            records: Vec::new(),
            positions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub category: SmolStr,
    pub total: u64,
    pub available: u64,
}

// ─── Engine ─────────────────────────────────────────────────────────────────

/// Topic → category → unissued records → claimed contact cards.
///
/// Exclusivity comes from the store's conditional write. Stores that cannot
/// re-check `issued` at write time get whole allocations serialized behind
/// `commit_gate` instead.
pub struct AllocationEngine<S> {
    store: S,
    matcher: CategoryMatcher,
    clock: Box<dyn Clock>,
    commit_gate: Mutex<()>,
}

impl<S: InventoryStore> AllocationEngine<S> {
    pub fn new(store: S, config: &EngineConfig) -> Self {
        Self {
            store,
            matcher: CategoryMatcher::new(config.similarity_threshold),
            clock: Box::new(SystemClock),
            commit_gate: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_matcher(mut self, matcher: CategoryMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve `topic` to a category and hand out up to `count` of its
    /// unissued records. Only records whose issuance commit succeeded are
    /// returned.
    pub fn allocate(&self, topic: &str, count: i64) -> Result<Allocation, AllocError> {
        if topic.trim().is_empty() {
            return Err(AllocError::InvalidInput("topic must not be blank".into()));
        }
        if count <= 0 {
            return Err(AllocError::InvalidInput(format!(
                "count must be a positive integer, got {count}"
            )));
        }
        let requested = count as u64;
        let limit = usize::try_from(count).unwrap_or(usize::MAX);

        let _gate = (!self.store.supports_conditional_write())
            .then(|| self.commit_gate.lock().unwrap_or_else(PoisonError::into_inner));

        debug!(state = "received", topic, count, "allocation request");
        let records = self.snapshot()?;
        let categories = distinct_categories(&records);

        let Some(category) = self.matcher.match_category(topic, &categories) else {
            debug!(state = "not_found", topic, categories = categories.len(), "no category matched");
            return Ok(Allocation::empty(Outcome::NoCategoryMatch, None, requested));
        };
        debug!(state = "category_resolved", topic, category = %category);

        let candidates = select_available(&records, &category, limit);
        if candidates.is_empty() {
            debug!(state = "empty", category = %category, "no unissued records left");
            return Ok(Allocation::empty(
                Outcome::NoAvailableRecords,
                Some(category),
                requested,
            ));
        }
        debug!(state = "candidates_selected", category = %category, candidates = candidates.len());

        let report = commit(&self.store, candidates, self.clock.today());
        debug!(
            state = "committed",
            claimed = report.claimed.len(),
            failed = report.failed.len()
        );

        info!(
            category = %category,
            requested,
            claimed = report.claimed.len(),
            "allocation complete"
        );
        Ok(Allocation {
            outcome: Outcome::Allocated,
            category: Some(category),
            requested,
            positions: report.claimed.iter().map(|r| r.position).collect(),
            records: report.claimed.iter().map(ContactCard::project).collect(),
        })
    }

    /// Issued records, optionally narrowed to an issuance year or year+month.
    pub fn issued_records(
        &self,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Result<Vec<ContactRecord>, AllocError> {
        if let Some(m) = month {
            if year.is_none() {
                return Err(AllocError::InvalidInput("month requires year".into()));
            }
            if !(1..=12).contains(&m) {
                return Err(AllocError::InvalidInput(format!(
                    "month must be within 1..=12, got {m}"
                )));
            }
        }

        let records = self.snapshot()?;
        Ok(records
            .into_iter()
            .filter(|r| match (r.issued_month(), year, month) {
                (None, _, _) => false,
                (Some(_), None, _) => true,
                (Some((y, _)), Some(want_y), None) => y == want_y,
                (Some((y, m)), Some(want_y), Some(want_m)) => y == want_y && m == want_m,
            })
            .collect())
    }

    /// Per-category totals in first-seen order.
    pub fn category_stats(&self) -> Result<Vec<CategoryStats>, AllocError> {
        let records = self.snapshot()?;
        let mut stats: Vec<CategoryStats> = distinct_categories(&records)
            .into_iter()
            .map(|category| CategoryStats {
                category,
                total: 0,
                available: 0,
            })
            .collect();
        for record in &records {
            let label = record.category.trim();
            if let Some(entry) = stats.iter_mut().find(|s| s.category == label) {
                entry.total += 1;
                if !record.issued {
                    entry.available += 1;
                }
            }
        }
        Ok(stats)
    }

    fn snapshot(&self) -> Result<Vec<ContactRecord>, AllocError> {
        self.store.read_all().map_err(|e: StoreError| {
            error!(error = %e, "inventory snapshot failed");
            AllocError::StoreUnavailable(e)
        })
    }
}
