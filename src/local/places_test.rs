use super::*;
use crate::storage::MemoryStore;
use std::sync::Mutex;

#[derive(Default)]
struct RecordingAlerts(Mutex<Vec<String>>);

impl Alerts for RecordingAlerts {
    fn alert(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_owned());
    }
}

fn place(name: Option<&str>, formatted: Option<&str>) -> SavedPlace {
    SavedPlace {
        name: name.map(str::to_owned),
        formatted: formatted.map(str::to_owned),
        ..SavedPlace::new(48.858_37, 2.294_48)
    }
}

#[test]
fn load_fills_missing_memories_and_keeps_extras() {
    let store = Arc::new(MemoryStore::new());
    store
        .set(SAVED_PLACES_KEY, r#"[{"id":1700000000000,"lat":1.0,"lon":2.0,"pinned":true}]"#)
        .unwrap();
    let saved = SavedPlaces::load(store, Arc::new(RecordingAlerts::default()));

    let first = &saved.places()[0];
    assert_eq!(first.id, "1700000000000");
    assert!(first.memories.is_empty());
    assert_eq!(first.extra["pinned"], true);
}

#[test]
fn legacy_shapes_load_and_survive_the_next_save() {
    let store = Arc::new(MemoryStore::new());
    store
        .set(
            SAVED_PLACES_KEY,
            r#"[{"id":1,"name":"Old","lat":"10.5","lon":20,"memories":[{"id":5,"createdAt":"2024-01-01T00:00:00Z"},{"note":"no id"}]},
                {"id":2,"name":"Older","lat":1,"lon":2}]"#,
        )
        .unwrap();
    let mut saved = SavedPlaces::load(store.clone(), Arc::new(RecordingAlerts::default()));
    assert_eq!(saved.places().len(), 2);
    assert_eq!(saved.places()[0].lat, 10.5);
    assert_eq!(saved.places()[0].memories[0].created_at, Some(serde_json::json!("2024-01-01T00:00:00Z")));
    assert!(!saved.places()[0].memories[1].id.is_empty());

    assert!(saved.add(place(Some("New"), None)));
    let reloaded = SavedPlaces::load(store, Arc::new(RecordingAlerts::default()));
    let titles: Vec<_> = reloaded.places().iter().map(SavedPlace::title).collect();
    assert_eq!(titles, ["Old", "Older", "New"]);
}

#[test]
fn undecodable_entry_is_written_back_unchanged() {
    let store = Arc::new(MemoryStore::new());
    store.set(SAVED_PLACES_KEY, r#"[{"id":1,"name":"Lost coords"},{"id":2,"lat":1,"lon":2}]"#).unwrap();
    let mut saved = SavedPlaces::load(store.clone(), Arc::new(RecordingAlerts::default()));
    assert_eq!(saved.places().len(), 1);
    assert_eq!(saved.unreadable_count(), 1);

    assert_eq!(saved.remove("2"), PlaceChange::Saved);
    let raw = store.get(SAVED_PLACES_KEY).unwrap().unwrap();
    assert_eq!(raw, r#"[{"id":1,"name":"Lost coords"}]"#);
}

#[test]
fn corrupt_list_is_not_overwritten_until_unlocked() {
    let store = Arc::new(MemoryStore::new());
    let alerts = Arc::new(RecordingAlerts::default());
    store.set(SAVED_PLACES_KEY, "{not json").unwrap();
    let mut saved = SavedPlaces::load(store.clone(), alerts.clone());
    assert!(saved.places().is_empty());
    assert!(saved.is_locked());

    assert!(!saved.add(place(Some("New"), None)));
    assert_eq!(store.get(SAVED_PLACES_KEY).unwrap().as_deref(), Some("{not json"));
    assert_eq!(alerts.0.lock().unwrap().last().map(String::as_str), Some(LOCKED_ALERT));

    saved.unlock();
    assert!(saved.save());
    assert_eq!(SavedPlaces::load(store, alerts).places().len(), 1);
}

#[test]
fn changes_persist_across_loads() {
    let store = Arc::new(MemoryStore::new());
    let alerts = Arc::new(RecordingAlerts::default());
    let mut saved = SavedPlaces::load(store.clone(), alerts.clone());

    let tower = place(Some("Tower"), None);
    let id = tower.id.clone();
    assert!(saved.add(tower));
    assert_eq!(saved.add_memory(&id, Memory::new(Some("windy".into()), None)), PlaceChange::Saved);
    assert!(saved.add(place(None, Some("Paris"))));
    assert_eq!(saved.add_memory("missing", Memory::new(None, None)), PlaceChange::NoSuchPlace);

    let reloaded = SavedPlaces::load(store.clone(), alerts.clone());
    assert_eq!(reloaded.places().len(), 2);
    assert_eq!(reloaded.get(&id).unwrap().memories[0].note.as_deref(), Some("windy"));

    assert_eq!(saved.remove(&id), PlaceChange::Saved);
    assert_eq!(saved.remove(&id), PlaceChange::NoSuchPlace);
    assert_eq!(SavedPlaces::load(store, alerts.clone()).places().len(), 1);
    assert!(alerts.0.lock().unwrap().is_empty());
}

#[test]
fn quota_exceeded_alerts_and_keeps_memory_copy() {
    let store = Arc::new(MemoryStore::with_quota(1_000));
    let alerts = Arc::new(RecordingAlerts::default());
    let mut saved = SavedPlaces::load(store.clone(), alerts.clone());

    let image = format!("data:image/png;base64,{}", "A".repeat(400));
    for _ in 0..3 {
        let mut p = place(Some("Snap"), None);
        p.memories.push(Memory::new(None, Some(image.clone())));
        saved.add(p);
    }

    assert_eq!(saved.places().len(), 3);
    let last = saved.places()[2].id.clone();
    assert_eq!(saved.remove(&last), PlaceChange::Unsaved);
    let messages = alerts.0.lock().unwrap();
    assert_eq!(messages.last().map(String::as_str), Some(QUOTA_ALERT));
    drop(messages);

    let persisted = SavedPlaces::load(store, Arc::new(RecordingAlerts::default()));
    assert!(persisted.places().len() < 3);
}

#[test]
fn summary_lines() {
    let named = place(Some("Tower"), Some("Champ de Mars"));
    assert_eq!(named.title(), "Tower");
    assert_eq!(named.subtitle(), "Champ de Mars • 0 memories");

    let mut bare = place(None, None);
    bare.memories.push(Memory::new(Some("x".into()), None));
    assert_eq!(bare.title(), "Place");
    assert_eq!(bare.subtitle(), "48.8584, 2.2945 • 1 memories");

    assert_eq!(place(None, Some("Paris")).title(), "Paris");
}
