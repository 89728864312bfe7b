//! Integration tests for page activation against the in-memory page.

use std::task::Poll;

use futures::executor::block_on;
use nocturne::style::{INVERSION_STYLE_ID, VEIL_STYLE_ID};
use nocturne::{
    activate, Activation, ClockTime, Config, Decision, DomainRule, MemoryBackend, Outcome,
    Settings, SettingsStore, StyleApplicator, Stylesheet, TimeRange,
};
use nocturne_test::{init_test_logging, poll_once, FakePage, StyleEvent};

const WHITE: &str = "rgb(255, 255, 255)";
const BLACK: &str = "rgb(0, 0, 0)";
const DARK_GRAY: &str = "rgb(24, 24, 27)";
const LIGHT_GRAY: &str = "rgb(228, 228, 231)";

// ============================================================================
// Helpers
// ============================================================================

fn at(hour: u16, minute: u16) -> ClockTime {
    ClockTime::from_hm(hour, minute).unwrap()
}

fn settings_with(pattern: &str, rule: DomainRule) -> Settings {
    let mut settings = Settings::new();
    settings.upsert_domain_rule(pattern, rule).unwrap();
    settings
}

fn run_loaded(page: &FakePage, domain: &str, settings: &Settings) -> Outcome {
    block_on(activate(page, domain, at(21, 0), settings, Config::default()))
}

// ============================================================================
// Decision table, end to end
// ============================================================================

#[test]
fn no_rule_light_page_is_inverted() {
    init_test_logging();
    let page = FakePage::loaded().with_body(WHITE, BLACK);

    let outcome = run_loaded(&page, "example.com", &Settings::new());

    assert_eq!(outcome, Outcome::Inverted { deferred: false });
    assert_eq!(page.style_ids(), vec![INVERSION_STYLE_ID.to_string()]);
}

#[test]
fn no_rule_dark_page_is_left_alone() {
    let page = FakePage::loaded().with_body(DARK_GRAY, LIGHT_GRAY);

    let outcome = run_loaded(&page, "example.com", &Settings::new());

    assert_eq!(outcome, Outcome::AlreadyDark);
    assert!(page.style_ids().is_empty());
}

#[test]
fn no_rule_dark_background_with_dark_text_is_inverted() {
    let page = FakePage::loaded().with_body(DARK_GRAY, "rgb(60, 60, 60)");

    let outcome = run_loaded(&page, "example.com", &Settings::new());

    assert!(outcome.is_inverted());
}

#[test]
fn background_only_classifier_ignores_text_color() {
    let page = FakePage::loaded().with_body(DARK_GRAY, "rgb(60, 60, 60)");
    let config = Config::new().check_foreground(false);

    let outcome = block_on(activate(&page, "example.com", at(21, 0), &Settings::new(), config));

    assert_eq!(outcome, Outcome::AlreadyDark);
}

#[test]
fn transparent_body_counts_as_light() {
    let page = FakePage::loaded().with_body("rgba(0, 0, 0, 0)", BLACK);

    assert!(run_loaded(&page, "example.com", &Settings::new()).is_inverted());
}

#[test]
fn missing_body_colors_count_as_light() {
    let page = FakePage::loaded();

    assert!(run_loaded(&page, "example.com", &Settings::new()).is_inverted());
}

#[test]
fn forced_domain_inverts_even_a_dark_page() {
    let page = FakePage::loaded().with_body(DARK_GRAY, LIGHT_GRAY);
    let settings = settings_with("example.com", DomainRule::enabled());

    let outcome = run_loaded(&page, "example.com", &settings);

    assert_eq!(outcome, Outcome::Inverted { deferred: false });
    assert!(page.is_inverted());
}

#[test]
fn legacy_domain_inverts_after_load() {
    let page = FakePage::loaded().with_body(WHITE, BLACK);
    let settings = settings_with("*.example.com", DomainRule::legacy());

    let outcome = run_loaded(&page, "www.example.com", &settings);

    assert_eq!(outcome, Outcome::Inverted { deferred: true });
}

#[test]
fn legacy_domain_respects_dark_pages() {
    let page = FakePage::loaded().with_body(DARK_GRAY, LIGHT_GRAY);
    let settings = settings_with("example.com", DomainRule::legacy());

    assert_eq!(run_loaded(&page, "example.com", &settings), Outcome::AlreadyDark);
}

#[test]
fn disabled_domain_is_skipped() {
    let page = FakePage::loaded().with_body(WHITE, BLACK);
    let settings = settings_with("example.com", DomainRule::disabled());

    assert_eq!(run_loaded(&page, "example.com", &settings), Outcome::Skipped);
    assert!(page.events().is_empty());
}

#[test]
fn outside_time_range_is_skipped() {
    let page = FakePage::loaded().with_body(WHITE, BLACK);
    let mut settings = settings_with("example.com", DomainRule::enabled());
    settings.set_time_range(TimeRange::new("22:00", "06:00"));

    let outcome = block_on(activate(&page, "example.com", at(12, 0), &settings, Config::default()));

    assert_eq!(outcome, Outcome::Skipped);
    assert!(page.style_ids().is_empty());
}

// ============================================================================
// Lifecycle and veil ordering
// ============================================================================

#[test]
fn classify_path_veils_until_load_then_reveals() {
    let page = FakePage::new().with_body(WHITE, BLACK);
    let settings = Settings::new();
    let mut run = Box::pin(activate(&page, "example.com", at(21, 0), &settings, Config::default()));

    // no head yet: nothing can be injected
    assert!(poll_once(run.as_mut()).is_pending());
    assert!(page.style_ids().is_empty());

    page.attach_head();
    assert!(poll_once(run.as_mut()).is_pending());
    assert!(page.is_veiled());
    assert!(!page.is_inverted());

    page.finish_loading();
    assert_eq!(
        poll_once(run.as_mut()),
        Poll::Ready(Outcome::Inverted { deferred: false })
    );
    assert_eq!(
        page.events(),
        vec![
            StyleEvent::Inserted(VEIL_STYLE_ID.into()),
            StyleEvent::Removed(VEIL_STYLE_ID.into()),
            StyleEvent::Inserted(INVERSION_STYLE_ID.into()),
        ]
    );
}

#[test]
fn veil_is_lifted_on_the_already_dark_path() {
    let page = FakePage::new().with_body(DARK_GRAY, LIGHT_GRAY);
    let settings = Settings::new();
    let mut run = Box::pin(activate(&page, "example.com", at(21, 0), &settings, Config::default()));

    page.attach_head();
    assert!(poll_once(run.as_mut()).is_pending());
    assert!(page.is_veiled());

    page.finish_loading();
    assert_eq!(poll_once(run.as_mut()), Poll::Ready(Outcome::AlreadyDark));
    assert!(!page.is_veiled());
    assert!(page.style_ids().is_empty());
}

#[test]
fn veil_can_be_disabled() {
    let page = FakePage::new().with_body(WHITE, BLACK);
    let settings = Settings::new();
    let config = Config::new().veil_while_classifying(false);
    let mut run = Box::pin(activate(&page, "example.com", at(21, 0), &settings, config));

    page.attach_head();
    assert!(poll_once(run.as_mut()).is_pending());
    assert!(!page.is_veiled());

    page.finish_loading();
    assert!(poll_once(run.as_mut()).is_ready());
    assert!(page.is_inverted());
}

#[test]
fn forced_domain_waits_only_for_the_head() {
    let page = FakePage::new().with_body(WHITE, BLACK);
    let settings = settings_with("example.com", DomainRule::enabled());
    let mut run = Box::pin(activate(&page, "example.com", at(21, 0), &settings, Config::default()));

    assert!(poll_once(run.as_mut()).is_pending());

    page.attach_head();
    assert_eq!(
        poll_once(run.as_mut()),
        Poll::Ready(Outcome::Inverted { deferred: false })
    );
    assert!(page.is_inverted());
    assert!(!page.is_veiled());
}

#[test]
fn legacy_domain_waits_for_load_and_never_veils() {
    let page = FakePage::new().with_body(WHITE, BLACK);
    let settings = settings_with("example.com", DomainRule::legacy());
    let mut run = Box::pin(activate(&page, "example.com", at(21, 0), &settings, Config::default()));

    page.attach_head();
    assert!(poll_once(run.as_mut()).is_pending());
    assert!(page.style_ids().is_empty());

    page.finish_loading();
    assert_eq!(
        poll_once(run.as_mut()),
        Poll::Ready(Outcome::Inverted { deferred: true })
    );
    assert_eq!(page.events(), vec![StyleEvent::Inserted(INVERSION_STYLE_ID.into())]);
}

#[test]
fn skip_removes_a_leftover_veil() {
    let page = FakePage::loaded();
    let styles = StyleApplicator::new(&page, Stylesheet::default());
    assert!(styles.veil());

    let activation = Activation::new(&page, Config::default());
    assert_eq!(block_on(activation.execute(Decision::Skip)), Outcome::Skipped);
    assert!(!page.is_veiled());
}

#[test]
fn no_path_leaves_the_page_veiled() {
    let cases = [
        (None, WHITE),
        (None, DARK_GRAY),
        (Some(DomainRule::enabled()), DARK_GRAY),
        (Some(DomainRule::legacy()), WHITE),
        (Some(DomainRule::legacy()), DARK_GRAY),
        (Some(DomainRule::disabled()), WHITE),
    ];

    for (rule, background) in cases {
        let page = FakePage::loaded().with_body(background, LIGHT_GRAY);
        let mut settings = Settings::new();
        if let Some(rule) = rule {
            settings.upsert_domain_rule("example.com", rule).unwrap();
        }

        run_loaded(&page, "example.com", &settings);
        assert!(!page.is_veiled(), "veiled after {:?} on {}", rule, background);
    }
}

// ============================================================================
// Style applicator
// ============================================================================

#[test]
fn applying_twice_yields_one_inversion_node() {
    let page = FakePage::loaded();
    let styles = StyleApplicator::new(&page, Stylesheet::default());

    assert!(styles.apply_inversion());
    assert!(!styles.apply_inversion());

    assert_eq!(page.style_count(INVERSION_STYLE_ID), 1);
}

#[test]
fn running_twice_does_not_double_invert() {
    let page = FakePage::loaded().with_body(WHITE, BLACK);
    let settings = settings_with("example.com", DomainRule::enabled());

    run_loaded(&page, "example.com", &settings);
    run_loaded(&page, "example.com", &settings);

    assert_eq!(page.style_count(INVERSION_STYLE_ID), 1);
}

#[test]
fn remove_inversion_is_idempotent() {
    let page = FakePage::loaded();
    let styles = StyleApplicator::new(&page, Stylesheet::default());
    styles.apply_inversion();

    assert!(styles.remove_inversion());
    assert!(!styles.remove_inversion());
    assert!(!styles.is_inverted());
}

#[test]
fn inversion_css_guards_the_configured_panel() {
    let page = FakePage::loaded().with_body(WHITE, BLACK);
    let config = Config::new().panel_class("dark-mode-settings");

    block_on(activate(&page, "example.com", at(21, 0), &Settings::new(), config));

    let css = page.style_css(INVERSION_STYLE_ID).unwrap();
    assert!(css.contains(".dark-mode-settings { filter: invert(1) hue-rotate(180deg) !important; }"));
}

// ============================================================================
// Store-backed activation
// ============================================================================

#[test]
fn run_with_store_reads_persisted_rules() {
    let store = SettingsStore::new(MemoryBackend::new());
    store
        .upsert_domain_rule("example.com", DomainRule::disabled())
        .unwrap();

    let page = FakePage::loaded().with_body(WHITE, BLACK);
    let activation = Activation::new(&page, Config::default());

    assert_eq!(
        block_on(activation.run_with_store("example.com", &store)),
        Outcome::Skipped
    );
}

#[test]
fn run_with_corrupt_store_falls_back_to_classifying() {
    let store = SettingsStore::new(MemoryBackend::with_value(
        nocturne::store::DEFAULT_STORAGE_KEY,
        "{{{",
    ));

    let page = FakePage::loaded().with_body(WHITE, BLACK);
    let activation = Activation::new(&page, Config::default());

    assert!(block_on(activation.run_with_store("example.com", &store)).is_inverted());
}
