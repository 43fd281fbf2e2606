use linkr::FormatTemplate;
use linkr::settings::Settings;
use spectral::prelude::*;
use tempfile::TempDir;

#[test]
fn missing_file_yields_defaults() {
    let dir = TempDir::new().expect("Expected a temp dir.");

    let settings = Settings::load(&dir.path().join("absent.json")).expect("Expected defaults.");

    assert_that(&settings).is_equal_to(Settings::default());
    assert_that(&settings.format.render("Rust", "https://rust-lang.org"))
        .is_equal_to("- Rust: https://rust-lang.org".to_owned());
}

#[test]
fn saved_format_is_loaded_back() {
    let dir = TempDir::new().expect("Expected a temp dir.");
    let path = dir.path().join("settings.json");
    let settings = Settings {
        format: FormatTemplate::new("[{name}]({url})"),
    };

    settings.save(&path).expect("Expected the settings to save.");

    assert_that(&Settings::load(&path).expect("Expected the settings to load."))
        .is_equal_to(settings);
}

#[test]
fn empty_object_falls_back_to_default_format() {
    let dir = TempDir::new().expect("Expected a temp dir.");
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{}").expect("Expected a write.");

    let settings = Settings::load(&path).expect("Expected the settings to load.");

    assert_that(&settings.format).is_equal_to(FormatTemplate::default());
}

#[test]
fn malformed_file_is_an_error() {
    let dir = TempDir::new().expect("Expected a temp dir.");
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "not json").expect("Expected a write.");

    assert_that(&Settings::load(&path).is_err()).is_true();
}
