use std::time::Instant;

use chrono::{
    DateTime,
    Utc,
};

use super::{
    enricher::Enricher,
    models::{
        RawFavoriteEntry,
        VocabularyRecord,
    },
    Favs2AnkiError,
};
use crate::{
    persistence::{
        Checkpoints,
        RecordSink,
    },
    reverso::FavoritesSource,
};

pub const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    /// New records in remote order (newest first).
    pub records: Vec<VocabularyRecord>,
    /// Whether the checkpoint moved during this run.
    pub advanced: bool,
    /// The checkpoint in effect after the run.
    pub checkpoint: Option<DateTime<Utc>>,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Incremental sync of a user's favourites.
///
/// A run fetches the whole collection, keeps the entries newer than the stored
/// checkpoint and enriches them one at a time. Records are written before the
/// checkpoint, so an interrupted run is simply repeated by the next one.
pub struct SyncEngine<'a> {
    source: &'a dyn FavoritesSource,
    enricher: &'a mut Enricher,
    checkpoints: &'a mut dyn Checkpoints,
    sink: &'a mut dyn RecordSink,
    page_size: usize,
}

impl<'a> SyncEngine<'a> {
    pub fn new(
        source: &'a dyn FavoritesSource,
        enricher: &'a mut Enricher,
        checkpoints: &'a mut dyn Checkpoints,
        sink: &'a mut dyn RecordSink,
    ) -> Self {
        Self { source, enricher, checkpoints, sink, page_size: DEFAULT_PAGE_SIZE }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn sync(&mut self, username: &str) -> Result<SyncReport, Favs2AnkiError> {
        let start = Instant::now();

        let entries = fetch_all(self.source, username, self.page_size)?;
        log::info!("Fetched {} favourites for {}", entries.len(), username);

        let checkpoint = self.checkpoints.load()?;
        let selected = select_new_entries(&entries, checkpoint);

        if selected.is_empty() {
            log::info!("No new words to add");
            return Ok(SyncReport { records: Vec::new(), advanced: false, checkpoint });
        }

        let source_lang = self.enricher.languages().source.clone();
        let mut records = Vec::with_capacity(selected.len());
        for (i, entry) in selected.iter().enumerate() {
            let Some(oriented) = entry.orient(&source_lang) else {
                log::warn!(
                    "Skipping {} ({} -> {}): neither side is {}",
                    entry.src_text,
                    entry.src_lang,
                    entry.trg_lang,
                    source_lang
                );
                continue;
            };
            log::debug!("Enriching {}/{}: {}", i + 1, selected.len(), oriented.source_word);
            records.push(self.enricher.enrich(&oriented));
        }

        // The first entry was selected, so it is strictly newer than the old checkpoint.
        let newest = entries[0].creation_date;

        self.sink.write_snapshot(&records)?;
        self.checkpoints.save(&newest)?;

        log::info!(
            "Added {} new words ({:.1}s)",
            records.len(),
            start.elapsed().as_secs_f32()
        );
        Ok(SyncReport { records, advanced: true, checkpoint: Some(newest) })
    }
}

/// Fetches the first page and, when the reported total is larger, everything
/// else in one more request.
pub fn fetch_all(
    source: &dyn FavoritesSource,
    username: &str,
    page_size: usize,
) -> Result<Vec<RawFavoriteEntry>, Favs2AnkiError> {
    let first = source.fetch_page(username, 0, page_size)?;
    let mut entries = first.results;

    if first.num_total_results > page_size {
        let rest = source.fetch_page(username, page_size, first.num_total_results - page_size)?;
        entries.extend(rest.results);
    }

    Ok(entries)
}

/// Returns the leading run of entries strictly newer than `checkpoint`.
///
/// Relies on the remote listing favourites newest first. Violations are logged
/// but not corrected: entries listed out of order may be skipped or repeated.
pub fn select_new_entries(
    entries: &[RawFavoriteEntry],
    checkpoint: Option<DateTime<Utc>>,
) -> Vec<&RawFavoriteEntry> {
    for pair in entries.windows(2) {
        if pair[1].creation_date > pair[0].creation_date {
            log::warn!(
                "Favourites out of order: {} listed after {}",
                pair[1].creation_date,
                pair[0].creation_date
            );
        }
    }

    let Some(checkpoint) = checkpoint else {
        return entries.iter().collect();
    };

    let cut = entries.iter().position(|e| e.creation_date <= checkpoint).unwrap_or(entries.len());

    let skipped = entries[cut..].iter().filter(|e| e.creation_date > checkpoint).count();
    if skipped > 0 {
        log::warn!("{} favourites newer than the checkpoint were listed after older ones", skipped);
    }

    entries[..cut].iter().collect()
}

#[cfg(test)]
mod tests {
    use std::{
        cell::RefCell,
        collections::HashMap,
    };

    use super::*;
    use crate::{
        core::{
            enricher::{
                tests::{
                    FakeArticles,
                    FakeSpeech,
                    FakeTagger,
                },
                LanguagePair,
            },
            utils::parse_timestamp,
            NounForms,
            WordTag,
        },
        persistence::CheckpointStore,
        reverso::FavoritesPage,
    };

    const T1: &str = "2021-03-01T10:00:00Z";
    const T2: &str = "2021-03-02T10:00:00Z";
    const T3: &str = "2021-03-03T10:00:00Z";
    const T4: &str = "2021-03-04T10:00:00Z";
    const T5: &str = "2021-03-05T10:00:00Z";

    fn ts(value: &str) -> DateTime<Utc> {
        parse_timestamp(value).unwrap()
    }

    fn raw(word: &str, created: &str) -> RawFavoriteEntry {
        RawFavoriteEntry {
            src_text: word.to_string(),
            trg_text: format!("{word}-es"),
            src_lang: "de".to_string(),
            trg_lang: "es".to_string(),
            src_context: format!("Ein <em>{word}</em>."),
            trg_context: format!("Un <em>{word}-es</em>."),
            creation_date: ts(created),
        }
    }

    /// Serves a fixed newest-first list, honouring start/length.
    struct FakeSource {
        entries: Vec<RawFavoriteEntry>,
        calls: RefCell<Vec<(usize, usize)>>,
        fail: bool,
    }

    impl FakeSource {
        fn new(entries: Vec<RawFavoriteEntry>) -> Self {
            Self { entries, calls: RefCell::new(Vec::new()), fail: false }
        }
    }

    impl FavoritesSource for FakeSource {
        fn fetch_page(
            &self,
            _: &str,
            start: usize,
            length: usize,
        ) -> Result<FavoritesPage, Favs2AnkiError> {
            self.calls.borrow_mut().push((start, length));
            if self.fail {
                return Err(Favs2AnkiError::Http { status: 502, url: "favourites".to_string() });
            }
            let results = self.entries.iter().skip(start).take(length).cloned().collect();
            Ok(FavoritesPage { results, num_total_results: self.entries.len() })
        }
    }

    #[derive(Default)]
    struct MemoryCheckpoints {
        value: Option<DateTime<Utc>>,
        saves: usize,
    }

    impl Checkpoints for MemoryCheckpoints {
        fn load(&self) -> Result<Option<DateTime<Utc>>, Favs2AnkiError> {
            Ok(self.value)
        }

        fn save(&mut self, checkpoint: &DateTime<Utc>) -> Result<(), Favs2AnkiError> {
            self.value = Some(*checkpoint);
            self.saves += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemorySink {
        snapshots: Vec<Vec<VocabularyRecord>>,
        fail: bool,
    }

    impl RecordSink for MemorySink {
        fn write_snapshot(&mut self, records: &[VocabularyRecord]) -> Result<(), Favs2AnkiError> {
            if self.fail {
                return Err(Favs2AnkiError::Custom("disk full".to_string()));
            }
            self.snapshots.push(records.to_vec());
            Ok(())
        }
    }

    fn enricher() -> Enricher {
        let tagger = FakeTagger {
            tags: HashMap::from([("Haus".to_string(), WordTag::Noun)]),
            fail: false,
        };
        let articles = FakeArticles {
            forms: HashMap::from([(
                "Haus".to_string(),
                NounForms { article: "das".to_string(), plural: "Häuser".to_string() },
            )]),
            fail: false,
        };
        Enricher::new(
            LanguagePair::new("de", "es"),
            "de",
            Box::new(tagger),
            Box::new(articles),
            Some(Box::new(FakeSpeech::default())),
        )
    }

    fn five_entries() -> Vec<RawFavoriteEntry> {
        vec![raw("Haus", T5), raw("Hund", T4), raw("Katze", T3), raw("Baum", T2), raw("Tisch", T1)]
    }

    #[test]
    fn test_select_stops_at_checkpoint() {
        let entries = five_entries();

        let selected = select_new_entries(&entries, Some(ts(T3)));
        let words: Vec<&str> = selected.iter().map(|e| e.src_text.as_str()).collect();
        assert_eq!(words, vec!["Haus", "Hund"]);

        assert_eq!(select_new_entries(&entries, None).len(), 5);
        assert!(select_new_entries(&entries, Some(ts(T5))).is_empty());
        assert!(select_new_entries(&[], Some(ts(T5))).is_empty());
    }

    #[test]
    fn test_select_trusts_order_when_violated() {
        // T4 listed after the cut-off entry is not picked up.
        let entries = vec![raw("Haus", T5), raw("Katze", T3), raw("Hund", T4)];
        let selected = select_new_entries(&entries, Some(ts(T3)));
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].src_text, "Haus");
    }

    #[test]
    fn test_sync_processes_only_new_entries() {
        let source = FakeSource::new(five_entries());
        let mut enricher = enricher();
        let mut checkpoints = MemoryCheckpoints { value: Some(ts(T3)), saves: 0 };
        let mut sink = MemorySink::default();

        let report = SyncEngine::new(&source, &mut enricher, &mut checkpoints, &mut sink)
            .sync("someone")
            .unwrap();

        assert!(report.advanced);
        assert_eq!(report.checkpoint, Some(ts(T5)));
        let words: Vec<&str> = report.records.iter().map(|r| r.source_word.as_str()).collect();
        assert_eq!(words, vec!["das Haus - Häuser", "Hund"]);
        assert_eq!(report.records[0].source_sentence, "Ein Haus.");
        assert_eq!(report.records[0].audio, "azure-1.mp3");
        assert_eq!(report.records[1].tag, None);

        assert_eq!(checkpoints.value, Some(ts(T5)));
        assert_eq!(sink.snapshots, vec![report.records.clone()]);
    }

    #[test]
    fn test_second_sync_without_new_entries_is_a_no_op() {
        let source = FakeSource::new(five_entries());
        let mut enricher = enricher();
        let mut checkpoints = MemoryCheckpoints::default();
        let mut sink = MemorySink::default();

        let first = SyncEngine::new(&source, &mut enricher, &mut checkpoints, &mut sink)
            .sync("someone")
            .unwrap();
        assert_eq!(first.records.len(), 5);
        assert_eq!(checkpoints.value, Some(ts(T5)));

        let second = SyncEngine::new(&source, &mut enricher, &mut checkpoints, &mut sink)
            .sync("someone")
            .unwrap();
        assert!(!second.advanced);
        assert!(second.is_empty());
        assert_eq!(second.checkpoint, Some(ts(T5)));
        assert_eq!(checkpoints.saves, 1);
        assert_eq!(sink.snapshots.len(), 1);
    }

    #[test]
    fn test_checkpoint_never_moves_backwards() {
        let source = FakeSource::new(five_entries());
        let mut enricher = enricher();
        let mut sink = MemorySink::default();

        for before in [None, Some(ts(T1)), Some(ts(T4)), Some(ts(T5))] {
            let mut checkpoints = MemoryCheckpoints { value: before, saves: 0 };
            let report = SyncEngine::new(&source, &mut enricher, &mut checkpoints, &mut sink)
                .sync("someone")
                .unwrap();
            if let Some(before) = before {
                assert!(report.checkpoint.unwrap() >= before);
                assert!(checkpoints.value.unwrap() >= before);
            }
        }
    }

    #[test]
    fn test_sync_fetches_remainder_in_second_call() {
        let entries: Vec<RawFavoriteEntry> = (0..7)
            .map(|i| raw(&format!("Wort{i}"), &format!("2021-03-0{}T10:00:00Z", 9 - i)))
            .collect();
        let source = FakeSource::new(entries);
        let mut enricher = enricher();
        let mut checkpoints = MemoryCheckpoints::default();
        let mut sink = MemorySink::default();

        let report = SyncEngine::new(&source, &mut enricher, &mut checkpoints, &mut sink)
            .with_page_size(5)
            .sync("someone")
            .unwrap();

        assert_eq!(*source.calls.borrow(), vec![(0, 5), (5, 2)]);
        assert_eq!(report.records.len(), 7);
        assert_eq!(report.records[6].source_word, "Wort6");
        assert_eq!(report.checkpoint, Some(ts("2021-03-09T10:00:00Z")));
    }

    #[test]
    fn test_single_page_needs_one_call() {
        let source = FakeSource::new(five_entries());
        let fetched = fetch_all(&source, "someone", 50).unwrap();
        assert_eq!(fetched.len(), 5);
        assert_eq!(*source.calls.borrow(), vec![(0, 50)]);
    }

    #[test]
    fn test_fetch_failure_leaves_state_untouched() {
        let mut source = FakeSource::new(five_entries());
        source.fail = true;
        let mut enricher = enricher();
        let mut checkpoints = MemoryCheckpoints { value: Some(ts(T1)), saves: 0 };
        let mut sink = MemorySink::default();

        let result = SyncEngine::new(&source, &mut enricher, &mut checkpoints, &mut sink)
            .sync("someone");

        assert!(matches!(result, Err(Favs2AnkiError::Http { status: 502, .. })));
        assert_eq!(checkpoints.value, Some(ts(T1)));
        assert_eq!(checkpoints.saves, 0);
        assert!(sink.snapshots.is_empty());
    }

    #[test]
    fn test_write_failure_keeps_checkpoint() {
        let source = FakeSource::new(five_entries());
        let mut enricher = enricher();
        let mut checkpoints = MemoryCheckpoints { value: Some(ts(T3)), saves: 0 };
        let mut sink = MemorySink { fail: true, ..Default::default() };

        let result = SyncEngine::new(&source, &mut enricher, &mut checkpoints, &mut sink)
            .sync("someone");

        assert!(result.is_err());
        assert_eq!(checkpoints.value, Some(ts(T3)));
        assert_eq!(checkpoints.saves, 0);
    }

    #[test]
    fn test_reversed_entries_are_oriented() {
        let mut reversed = raw("casa", T5);
        reversed.src_lang = "es".to_string();
        reversed.trg_lang = "de".to_string();
        reversed.trg_text = "Haus".to_string();
        reversed.trg_context = "Das <b>Haus</b>".to_string();
        let source = FakeSource::new(vec![reversed]);
        let mut enricher = enricher();
        let mut checkpoints = MemoryCheckpoints::default();
        let mut sink = MemorySink::default();

        let report = SyncEngine::new(&source, &mut enricher, &mut checkpoints, &mut sink)
            .sync("someone")
            .unwrap();

        let record = &report.records[0];
        assert_eq!(record.source_word, "das Haus - Häuser");
        assert_eq!(record.target_word, "casa");
        assert_eq!(record.source_sentence, "Das Haus");
    }

    #[test]
    fn test_unrelated_language_pair_is_skipped() {
        let mut french = raw("maison", T5);
        french.src_lang = "fr".to_string();
        french.trg_lang = "en".to_string();
        let source = FakeSource::new(vec![french, raw("Hund", T4)]);
        let mut enricher = enricher();
        let mut checkpoints = MemoryCheckpoints::default();
        let mut sink = MemorySink::default();

        let report = SyncEngine::new(&source, &mut enricher, &mut checkpoints, &mut sink)
            .sync("someone")
            .unwrap();

        let words: Vec<&str> = report.records.iter().map(|r| r.source_word.as_str()).collect();
        assert_eq!(words, vec!["Hund"]);
        assert_eq!(checkpoints.value, Some(ts(T5)));
    }

    #[test]
    fn test_fractional_timestamp_survives_checkpoint_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeSource::new(vec![raw("Haus", "2021-03-05T10:00:00.500Z")]);
        let mut enricher = enricher();
        let mut checkpoints = CheckpointStore::in_dir(dir.path());
        let mut sink = MemorySink::default();

        let first = SyncEngine::new(&source, &mut enricher, &mut checkpoints, &mut sink)
            .sync("someone")
            .unwrap();
        assert_eq!(first.records.len(), 1);

        let second = SyncEngine::new(&source, &mut enricher, &mut checkpoints, &mut sink)
            .sync("someone")
            .unwrap();
        assert!(second.is_empty());
        assert!(!second.advanced);
        assert_eq!(sink.snapshots.len(), 1);
        assert_eq!(
            std::fs::read_to_string(checkpoints.path()).unwrap(),
            "2021-03-05T10:00:00.500Z"
        );
    }
}
