//! Tests for the hit counter persistence variants.

use board_keeper::{
    AppConfig, Backend, BinaryCounter, FileStreamCounter, HitCounter, HitCounts, Modifier,
    PrefsJsonCounter, PreferenceStore, StreamStyle, TextFileCounter, open_counter,
};
use strum::IntoEnumIterator;
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> AppConfig {
    AppConfig::default().with_data_dir(dir.path().join("data"))
}

fn loaded(backend: Backend, config: &AppConfig) -> Box<dyn HitCounter> {
    let mut counter = open_counter(backend, config).expect("Open failed");
    counter.load_on_startup().expect("Load failed");
    counter
}

fn tracks_modifiers(backend: Backend) -> bool {
    !matches!(backend, Backend::FileStream | Backend::Binary)
}

#[test]
fn test_every_backend_starts_at_zero() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = config_in(&dir);
    for backend in Backend::iter() {
        let counter = loaded(backend, &config);
        assert_eq!(counter.counts(), HitCounts::default(), "{}", backend);
        assert_eq!(counter.backend(), backend);
    }
}

#[test]
fn test_persistent_backends_survive_restart() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = config_in(&dir);
    for backend in Backend::iter().filter(|b| *b != Backend::Memory) {
        let mut counter = loaded(backend, &config);
        counter.on_interaction(Modifier::None).expect("Click failed");
        counter.on_interaction(Modifier::None).expect("Click failed");
        counter.on_interaction(Modifier::Shift).expect("Click failed");
        counter.on_interaction(Modifier::Control).expect("Click failed");
        let before = counter.counts();
        drop(counter);

        let restarted = loaded(backend, &config);
        assert_eq!(restarted.counts(), before, "{} lost its counts", backend);

        if tracks_modifiers(backend) {
            assert_eq!(
                before,
                HitCounts {
                    unmodified: 2,
                    shift: 1,
                    control: 1
                },
                "{}",
                backend
            );
        } else {
            assert_eq!(before.unmodified, 4, "{}", backend);
            assert_eq!(before.shift, 0, "{}", backend);
        }
    }
}

#[test]
fn test_memory_counter_forgets_on_restart() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = config_in(&dir);
    let mut counter = loaded(Backend::Memory, &config);
    counter.on_interaction(Modifier::Shift).expect("Click failed");
    assert_eq!(counter.counts().get(Modifier::Shift), 1);

    let restarted = loaded(Backend::Memory, &config);
    assert_eq!(restarted.counts(), HitCounts::default());
}

#[test]
fn test_text_file_with_wrong_line_count_is_ignored() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("counts.txt");
    std::fs::write(&path, "5\n6\n").expect("Write failed");

    let mut counter = TextFileCounter::new(path);
    counter.load_on_startup().expect("Load failed");
    assert_eq!(counter.counts(), HitCounts::default());
}

#[test]
fn test_text_file_with_bad_number_fails() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("counts.txt");
    std::fs::write(&path, "5\nsix\n7\n").expect("Write failed");

    let mut counter = TextFileCounter::new(path);
    assert!(counter.load_on_startup().is_err());
}

#[test]
fn test_text_file_layout() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("counts.txt");
    let mut counter = TextFileCounter::new(path.clone());
    counter.on_interaction(Modifier::Control).expect("Click failed");

    let content = std::fs::read_to_string(&path).expect("Read failed");
    assert_eq!(content.lines().collect::<Vec<_>>(), vec!["0", "0", "1"]);
}

#[test]
fn test_truncated_binary_file_fails() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("counter.bin");
    std::fs::write(&path, [1u8, 0]).expect("Write failed");

    let mut counter = BinaryCounter::new(path);
    assert!(counter.load_on_startup().is_err());
}

#[test]
fn test_binary_file_is_little_endian() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("counter.bin");
    std::fs::write(&path, 258i32.to_le_bytes()).expect("Write failed");

    let mut counter = BinaryCounter::new(path.clone());
    counter.load_on_startup().expect("Load failed");
    counter.on_interaction(Modifier::Shift).expect("Click failed");
    assert_eq!(counter.counts().unmodified, 259);
    assert_eq!(std::fs::read(&path).expect("Read failed"), 259i32.to_le_bytes());
}

#[test]
fn test_file_stream_writes_every_style() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut counter = FileStreamCounter::new(dir.path().to_path_buf());
    counter.on_interaction(Modifier::None).expect("Click failed");
    counter.on_interaction(Modifier::Control).expect("Click failed");

    let streams = counter.stream_counts().expect("Read failed");
    assert_eq!(streams.len(), StreamStyle::iter().count());
    for (style, value) in streams {
        assert_eq!(value, Some(2), "{}", style);
        assert!(counter.path_for(style).exists());
    }
}

#[test]
fn test_unparsable_prefs_json_is_ignored() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("prefs.toml");
    let mut prefs = PreferenceStore::open(&path).expect("Open failed");
    prefs.set_string("HitCountKeyJson", "{not json");
    prefs.save().expect("Save failed");

    let mut counter = PrefsJsonCounter::open(path.clone()).expect("Open failed");
    counter.load_on_startup().expect("Load failed");
    assert_eq!(counter.counts(), HitCounts::default());

    counter.on_interaction(Modifier::Shift).expect("Click failed");
    let prefs = PreferenceStore::open(&path).expect("Open failed");
    let stored: HitCounts =
        serde_json::from_str(prefs.get_string("HitCountKeyJson").expect("Key missing"))
            .expect("Stored value unparsable");
    assert_eq!(stored.shift, 1);
}

#[test]
fn test_prefs_counter_uses_named_keys() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = config_in(&dir);
    let mut counter = loaded(Backend::Prefs, &config);
    counter.on_interaction(Modifier::Control).expect("Click failed");

    let prefs = PreferenceStore::open(config.preferences_path()).expect("Open failed");
    assert_eq!(prefs.get_int("HitCountKeyControl"), Some(1));
    assert!(!prefs.has_key("HitCountKeyShift"));
}

#[test]
fn test_hit_counts_json_uses_pascal_case() {
    let counts = HitCounts {
        unmodified: 1,
        shift: 2,
        control: 3,
    };
    let json = serde_json::to_string(&counts).expect("Serialize failed");
    assert_eq!(json, r#"{"Unmodified":1,"Shift":2,"Control":3}"#);
}

#[test]
fn test_modifier_key_codes() {
    for modifier in Modifier::iter() {
        assert_eq!(Modifier::from_key_code(modifier.key_code()), modifier);
    }
    assert_eq!(Modifier::Shift.key_code(), 304);
    assert_eq!(Modifier::Control.key_code(), 306);
}

#[test]
fn test_backend_names_parse() {
    assert_eq!("prefs-json".parse::<Backend>().expect("Parse failed"), Backend::PrefsJson);
    assert_eq!(Backend::TextFile.to_string(), "text-file");
}

#[test]
fn test_prefs_variants_share_one_file_without_losing_clicks() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = config_in(&dir);
    let mut prefs = loaded(Backend::Prefs, &config);
    let mut prefs_json = loaded(Backend::PrefsJson, &config);

    prefs.on_interaction(Modifier::None).expect("Click failed");
    prefs_json.on_interaction(Modifier::Control).expect("Click failed");
    drop(prefs);
    drop(prefs_json);

    let prefs = loaded(Backend::Prefs, &config);
    assert_eq!(prefs.counts().unmodified, 1);
    let prefs_json = loaded(Backend::PrefsJson, &config);
    assert_eq!(prefs_json.counts().control, 1);
}

#[test]
fn test_file_stream_with_corrupt_file_fails() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut counter = FileStreamCounter::new(dir.path().to_path_buf());
    std::fs::write(counter.path_for(StreamStyle::WriteAllText), "garbage").expect("Write failed");

    assert!(counter.load_on_startup().is_err());
}

#[test]
fn test_file_stream_skips_missing_files() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut counter = FileStreamCounter::new(dir.path().to_path_buf());
    std::fs::write(counter.path_for(StreamStyle::StreamWriter), "9\n").expect("Write failed");

    counter.load_on_startup().expect("Load failed");
    assert_eq!(counter.counts().unmodified, 9);
}
