use super::*;
use crate::storage::MemoryStore;
use std::sync::Mutex;

#[derive(Default)]
struct FakeBadge {
    calls: Mutex<Vec<Option<u32>>>,
    fail: bool,
}

impl AppBadge for FakeBadge {
    fn set(&self, count: u32) -> Result<(), BadgeError> {
        self.calls.lock().unwrap().push(Some(count));
        Ok(())
    }

    fn clear(&self) -> Result<(), BadgeError> {
        self.calls.lock().unwrap().push(None);
        if self.fail { Err(BadgeError("denied".into())) } else { Ok(()) }
    }
}

fn tracker(badge: Option<Arc<FakeBadge>>) -> (BadgeTracker, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let badge = badge.map(|b| b as Arc<dyn AppBadge>);
    (BadgeTracker::new(store.clone(), badge), store)
}

#[test]
fn fresh_install_shows_current_version_count() {
    let badge = Arc::new(FakeBadge::default());
    let (tracker, _) = tracker(Some(badge.clone()));

    tracker.check_and_set();
    assert_eq!(*badge.calls.lock().unwrap(), vec![Some(CURRENT_VERSION)]);
}

#[test]
fn seen_version_sets_nothing() {
    let badge = Arc::new(FakeBadge::default());
    let (tracker, store) = tracker(Some(badge.clone()));
    store.set(LAST_SEEN_VERSION_KEY, &CURRENT_VERSION.to_string()).unwrap();

    tracker.check_and_set();
    assert!(badge.calls.lock().unwrap().is_empty());
    assert_eq!(tracker.unseen_updates(), 0);
}

#[test]
fn unparsable_last_seen_counts_as_zero() {
    let (tracker, store) = tracker(None);
    store.set(LAST_SEEN_VERSION_KEY, "v2").unwrap();
    assert_eq!(tracker.last_seen(), 0);
}

#[test]
fn clear_records_version_without_badge_support() {
    let (tracker, store) = tracker(None);
    tracker.check_and_set();
    tracker.init();
    assert_eq!(store.get(LAST_SEEN_VERSION_KEY).unwrap().as_deref(), Some("1"));
}

#[test]
fn rejected_clear_leaves_version_unrecorded() {
    let badge = Arc::new(FakeBadge { fail: true, ..FakeBadge::default() });
    let (tracker, store) = tracker(Some(badge));
    tracker.clear();
    assert_eq!(store.get(LAST_SEEN_VERSION_KEY).unwrap(), None);
}

#[test]
fn only_visible_clears() {
    let badge = Arc::new(FakeBadge::default());
    let (tracker, _) = tracker(Some(badge.clone()));

    tracker.on_visibility(Visibility::Hidden);
    assert!(badge.calls.lock().unwrap().is_empty());
    tracker.on_visibility(Visibility::Visible);
    assert_eq!(*badge.calls.lock().unwrap(), vec![None]);
}
