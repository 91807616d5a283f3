use keyscope_core::AnalysisResult;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Bounded in-memory URL -> analysis cache (least-recently-used eviction).
///
/// Capacity 0 disables caching: `get` always misses and `insert` is a no-op.
#[derive(Debug)]
pub struct ResultCache {
    inner: Option<Mutex<LruCache<String, Arc<AnalysisResult>>>>,
}

impl ResultCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }

    pub fn disabled() -> Self {
        Self::new(0)
    }

    pub fn capacity(&self) -> usize {
        self.inner
            .as_ref()
            .map(|m| m.lock().cap().get())
            .unwrap_or(0)
    }

    pub fn get(&self, key: &str) -> Option<Arc<AnalysisResult>> {
        let inner = self.inner.as_ref()?;
        inner.lock().get(key).cloned()
    }

    pub fn insert(&self, key: String, value: Arc<AnalysisResult>) {
        if let Some(inner) = self.inner.as_ref() {
            inner.lock().put(key, value);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.as_ref().map(|m| m.lock().len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn result(text: &str) -> Arc<AnalysisResult> {
        Arc::new(AnalysisResult {
            text: text.to_string(),
            tfidf_terms: Vec::new(),
            bigrams: Vec::new(),
            trigrams: Vec::new(),
            competitor_keywords: Vec::new(),
            google_trends: BTreeMap::new(),
            ai_suggestions: Vec::new(),
        })
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = ResultCache::new(2);
        cache.insert("a".to_string(), result("A"));
        cache.insert("b".to_string(), result("B"));
        // Touch "a" so "b" becomes the eviction candidate.
        assert_eq!(cache.get("a").map(|r| r.text.clone()).as_deref(), Some("A"));
        cache.insert("c".to_string(), result("C"));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("b").is_none());
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn zero_capacity_disables_caching() {
        let cache = ResultCache::disabled();
        cache.insert("a".to_string(), result("A"));
        assert!(cache.get("a").is_none());
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 0);
    }

    #[test]
    fn concurrent_access_is_safe() {
        let cache = Arc::new(ResultCache::new(16));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let k = format!("k{}", (t * 100 + i) % 32);
                        cache.insert(k.clone(), result(&k));
                        let _ = cache.get(&k);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(cache.len() <= 16);
    }
}
