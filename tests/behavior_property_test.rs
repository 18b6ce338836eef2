use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::{FileFailurePersistence, TestCaseError, TestCaseResult};
use site_behaviors::controllers::CounterPhase;
use site_behaviors::validate::FieldValidator;
use site_behaviors::{Host, Page, PageConfig};

const BEHAVIOR_PROPTEST_REGRESSION_FILE: &str =
    "tests/proptest-regressions/behavior_property_test.txt";
const DEFAULT_BEHAVIOR_PROPTEST_CASES: u32 = 64;

const REVEAL_TOPS: [f64; 3] = [400.0, 1400.0, 2600.0];

const PAGE_HTML: &str = r#"
<body>
  <header id="header">NA</header>
  <section id="r0" class="reveal"></section>
  <section id="r1" class="reveal"></section>
  <section id="r2" class="reveal"></section>
  <section class="stats">
    <div class="stat-item" data-target="250"><span id="count" class="stat-number">0</span></div>
  </section>
</body>
"#;

fn behavior_proptest_cases() -> u32 {
    std::env::var("SITE_BEHAVIORS_PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_BEHAVIOR_PROPTEST_CASES)
}

fn fail(err: site_behaviors::Error) -> TestCaseError {
    TestCaseError::fail(format!("{err:?}"))
}

fn load_page() -> Result<Page, TestCaseError> {
    Page::from_html_with(PAGE_HTML, PageConfig::default(), |host| {
        for (idx, top) in REVEAL_TOPS.iter().enumerate() {
            host.set_layout(&format!("#r{idx}"), *top, 200.0)?;
        }
        host.set_layout(".stats", 3200.0, 300.0)
    })
    .map_err(fail)
}

fn scroll_sequence_strategy() -> BoxedStrategy<Vec<u32>> {
    vec(0u32..3500, 1..=16).boxed()
}

fn assert_scroll_sequence(positions: &[u32]) -> TestCaseResult {
    let mut page = load_page()?;
    let mut max_seen = 0.0f64;
    let mut revealed_before = [false; 3];

    for (step, raw) in positions.iter().enumerate() {
        let y = f64::from(*raw);
        page.scroll_to(y).map_err(fail)?;
        page.next_frame().map_err(fail)?;
        max_seen = max_seen.max(y);

        let compact = page.header().map(|header| header.is_compact());
        prop_assert_eq!(compact, Some(y > 50.0), "header at step {} (y={})", step, y);

        let reveal = page.reveal().ok_or_else(|| TestCaseError::fail("reveal missing"))?;
        for (idx, top) in REVEAL_TOPS.iter().enumerate() {
            let node = page
                .host()
                .document()
                .by_id(&format!("r{idx}"))
                .ok_or_else(|| TestCaseError::fail("reveal element missing"))?;
            let revealed = reveal.is_revealed(node);
            prop_assert!(
                revealed || !revealed_before[idx],
                "element r{} reverted at step {}",
                idx,
                step
            );
            prop_assert_eq!(revealed, top - max_seen < 700.0, "r{} at step {}", idx, step);
            revealed_before[idx] = revealed;
        }
    }

    page.flush().map_err(fail)?;
    let stats = page.stats().ok_or_else(|| TestCaseError::fail("stats missing"))?;
    if max_seen > 2500.0 {
        prop_assert_eq!(stats.phase(), CounterPhase::Done);
        prop_assert!(page.assert_text("#count", "250+").is_ok());
    } else {
        prop_assert_eq!(stats.phase(), CounterPhase::Idle);
        prop_assert!(page.assert_text("#count", "0").is_ok());
    }
    Ok(())
}

fn text_strategy() -> BoxedStrategy<String> {
    vec(
        prop_oneof![
            Just('a'),
            Just('Z'),
            Just('0'),
            Just('7'),
            Just(' '),
            Just('-'),
            Just('+'),
            Just('('),
            Just(')'),
            Just('@'),
            Just('.'),
            Just('\t'),
            Just('\u{a0}'),
            Just('é'),
        ],
        0..=14,
    )
    .prop_map(|chars| chars.into_iter().collect())
    .boxed()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: behavior_proptest_cases(),
        failure_persistence: Some(Box::new(
            FileFailurePersistence::Direct(BEHAVIOR_PROPTEST_REGRESSION_FILE),
        )),
        .. ProptestConfig::default()
    })]

    #[test]
    fn scroll_sequences_keep_behaviors_consistent(positions in scroll_sequence_strategy()) {
        assert_scroll_sequence(&positions)?;
    }

    #[test]
    fn length_rules_count_trimmed_chars(value in text_strategy()) {
        let validator = FieldValidator::new().map_err(fail)?;
        let trimmed = value.trim().chars().count();
        prop_assert_eq!(validator.is_valid_name(&value), trimmed >= 2);
        prop_assert_eq!(validator.is_valid_message(&value), trimmed >= 10);
    }

    #[test]
    fn phone_rule_matches_charset_and_length(value in text_strategy()) {
        let validator = FieldValidator::new().map_err(fail)?;
        let allowed = !value.is_empty()
            && value.chars().all(|ch| {
                ch.is_ascii_digit() || ch.is_whitespace() || matches!(ch, '-' | '+' | '(' | ')')
            });
        let expected = allowed && value.trim().chars().count() >= 8;
        prop_assert_eq!(validator.is_valid_phone(&value), expected);
    }
}
