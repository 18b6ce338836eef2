use site_behaviors::controllers::CounterPhase;
use site_behaviors::{ControllerKind, MemoryHost, Page, PageConfig, Result, ScrollBehavior};

fn page_with(html: &str, prepare: impl FnOnce(&mut MemoryHost) -> Result<()>) -> Result<Page> {
    Page::from_html_with(html, PageConfig::default(), prepare)
}

#[test]
fn header_compacts_strictly_past_fifty_pixels() -> Result<()> {
    let mut page = Page::from_html(r#"<body><header id="header">Logo</header></body>"#)?;

    page.scroll_to(50.0)?;
    page.next_frame()?;
    page.assert_class("#header", "scrolled", false)?;

    page.scroll_to(51.0)?;
    page.next_frame()?;
    page.assert_class("#header", "scrolled", true)?;

    page.scroll_to(0.0)?;
    page.next_frame()?;
    page.assert_class("#header", "scrolled", false)?;
    Ok(())
}

#[test]
fn header_scroll_burst_recomputes_once_per_frame() -> Result<()> {
    let mut page = Page::from_html(r#"<body><header id="header">Logo</header></body>"#)?;

    for y in [10.0, 20.0, 30.0, 120.0] {
        page.scroll_to(y)?;
    }
    assert_eq!(page.host().pending_tasks().len(), 1);
    page.next_frame()?;

    let header = page.header().expect("header installed");
    assert_eq!(header.recomputations(), 1);
    assert!(header.is_compact());
    page.assert_class("#header", "scrolled", true)?;
    Ok(())
}

#[test]
fn frame_boundaries_follow_the_virtual_clock() -> Result<()> {
    let mut page = Page::from_html(r#"<body><header id="header">Logo</header></body>"#)?;
    page.advance_time(20)?;
    page.scroll_to(200.0)?;
    assert_eq!(page.host().pending_tasks()[0].due_at, 32);
    page.advance_time(11)?;
    page.assert_class("#header", "scrolled", false)?;
    page.advance_time(1)?;
    page.assert_class("#header", "scrolled", true)?;
    assert_eq!(page.now_ms(), 32);
    Ok(())
}

const REVEAL_HTML: &str = r#"
<body>
  <section id="intro" class="reveal">Intro</section>
  <section id="projects" class="reveal">Projects</section>
  <section id="footer" class="reveal">Footer</section>
</body>
"#;

fn reveal_page() -> Result<Page> {
    page_with(REVEAL_HTML, |host| {
        host.set_layout("#intro", 300.0, 200.0)?;
        host.set_layout("#projects", 1500.0, 400.0)?;
        host.set_layout("#footer", 2600.0, 200.0)?;
        Ok(())
    })
}

#[test]
fn reveal_runs_on_load_and_on_scroll_frames() -> Result<()> {
    let mut page = reveal_page()?;
    page.assert_class("#intro", "active", true)?;
    page.assert_class("#projects", "active", false)?;

    // 1500 - 799 = 701 is still below the 700px reveal line.
    page.scroll_to(799.0)?;
    page.next_frame()?;
    page.assert_class("#projects", "active", false)?;

    page.scroll_to(801.0)?;
    page.next_frame()?;
    page.assert_class("#projects", "active", true)?;
    page.assert_class("#footer", "active", false)?;
    assert_eq!(page.reveal().expect("reveal installed").revealed_count(), 2);
    Ok(())
}

#[test]
fn revealed_elements_never_revert_and_idle_once_done() -> Result<()> {
    let mut page = reveal_page()?;
    page.scroll_to(2500.0)?;
    page.next_frame()?;
    assert!(page.reveal().expect("reveal installed").all_revealed());

    page.scroll_to(0.0)?;
    assert!(page.host().pending_tasks().is_empty());
    page.flush()?;
    for id in ["#intro", "#projects", "#footer"] {
        page.assert_class(id, "active", true)?;
    }
    Ok(())
}

const STATS_HTML: &str = r#"
<body>
  <section class="stats">
    <div class="stat-item" data-target="100"><span id="satisfaction" class="stat-number">0</span></div>
    <div class="stat-item" data-target="42"><span id="projects" class="stat-number">0</span></div>
    <div class="stat-item" data-target="many"><span id="broken" class="stat-number">?</span></div>
    <div class="stat-item" data-target="16+"><span id="unnumbered">16</span></div>
  </section>
</body>
"#;

fn stats_page() -> Result<Page> {
    page_with(STATS_HTML, |host| host.set_layout(".stats", 2000.0, 300.0))
}

#[test]
fn stats_stay_idle_until_section_nears_viewport() -> Result<()> {
    let mut page = stats_page()?;
    assert_eq!(page.stats().expect("stats installed").phase(), CounterPhase::Idle);

    page.scroll_to(1300.0)?;
    assert_eq!(page.stats().expect("stats installed").phase(), CounterPhase::Idle);
    page.assert_text("#satisfaction", "0")?;
    Ok(())
}

#[test]
fn stats_count_up_once_with_suffixes() -> Result<()> {
    let mut page = stats_page()?;

    page.scroll_to(1500.0)?;
    assert_eq!(page.stats().expect("stats installed").phase(), CounterPhase::Animating);
    page.assert_text("#satisfaction", "0%")?;
    page.assert_text("#projects", "0+")?;

    page.next_frame()?;
    page.assert_text("#satisfaction", "1%")?;

    page.flush()?;
    page.assert_text("#satisfaction", "100%")?;
    page.assert_text("#projects", "42+")?;
    page.assert_text("#broken", "?")?;
    page.assert_text("#unnumbered", "16")?;
    let frames = page.stats().expect("stats installed").frames();
    assert_eq!(page.stats().expect("stats installed").phase(), CounterPhase::Done);

    page.scroll_to(0.0)?;
    page.scroll_to(1600.0)?;
    assert!(page.host().pending_tasks().is_empty());
    page.flush()?;
    page.assert_text("#satisfaction", "100%")?;
    assert_eq!(page.stats().expect("stats installed").frames(), frames);
    Ok(())
}

#[test]
fn stats_already_in_view_start_on_load() -> Result<()> {
    let page = page_with(STATS_HTML, |host| host.set_layout(".stats", 200.0, 300.0))?;
    assert_eq!(page.stats().expect("stats installed").phase(), CounterPhase::Animating);
    page.assert_text("#satisfaction", "0%")?;
    Ok(())
}

#[test]
fn back_to_top_visibility_is_throttled() -> Result<()> {
    let mut page = Page::from_html(r#"<body><button id="backToTop">Top</button></body>"#)?;

    page.scroll_to(400.0)?;
    page.assert_class("#backToTop", "visible", true)?;

    page.scroll_to(100.0)?;
    page.assert_class("#backToTop", "visible", true)?;

    page.advance_time(150)?;
    page.scroll_to(100.0)?;
    page.assert_class("#backToTop", "visible", false)?;
    assert!(!page.back_to_top().expect("button installed").is_visible());
    Ok(())
}

#[test]
fn back_to_top_and_logo_scroll_home_smoothly() -> Result<()> {
    let mut page = Page::from_html(
        r#"<body><div id="logoHome">NA</div><button id="backToTop">Top</button></body>"#,
    )?;

    page.scroll_to(900.0)?;
    page.click("#backToTop")?;
    assert_eq!(page.host().scroll_log().len(), 1);
    assert_eq!(page.host().scroll_log()[0].top, 0.0);
    assert_eq!(page.host().scroll_log()[0].behavior, ScrollBehavior::Smooth);

    page.scroll_to(600.0)?;
    page.click("#logoHome")?;
    assert_eq!(page.host().scroll_log().len(), 2);
    assert_eq!(page.host().scroll_log()[1].top, 0.0);
    Ok(())
}

#[test]
fn programmatic_scroll_notifies_scroll_listeners() -> Result<()> {
    let mut page = Page::from_html(
        r#"<body><header id="header"></header><button id="backToTop">Top</button></body>"#,
    )?;
    page.scroll_to(400.0)?;
    page.next_frame()?;
    page.assert_class("#header", "scrolled", true)?;

    page.click("#backToTop")?;
    page.next_frame()?;
    page.assert_class("#header", "scrolled", false)?;
    Ok(())
}

const LAZY_HTML: &str = r#"
<body>
  <img id="hero" loading="lazy" data-src="/img/hero.jpg" alt="hero">
  <img id="gallery" loading="lazy" src="/img/blank.gif" data-src="/img/villa.jpg" alt="villa">
  <img id="plain" loading="lazy" src="/img/plain.jpg" alt="plain">
  <img id="eager" src="/img/logo.png" alt="logo">
</body>
"#;

#[test]
fn lazy_images_load_when_they_intersect() -> Result<()> {
    let mut page = page_with(LAZY_HTML, |host| {
        host.set_layout("#hero", 100.0, 400.0)?;
        host.set_layout("#gallery", 3000.0, 300.0)?;
        host.set_layout("#plain", 600.0, 100.0)?;
        Ok(())
    })?;

    // No data-src: the current src is kept.
    page.assert_attr("#plain", "src", Some("/img/plain.jpg"))?;
    page.assert_class("#plain", "loaded", true)?;

    page.assert_attr("#hero", "src", Some("/img/hero.jpg"))?;
    page.assert_class("#hero", "loaded", true)?;
    page.assert_attr("#gallery", "src", Some("/img/blank.gif"))?;

    page.scroll_to(2250.0)?;
    page.next_frame()?;
    page.assert_attr("#gallery", "src", Some("/img/villa.jpg"))?;
    page.assert_class("#gallery", "loaded", true)?;
    page.assert_class("#eager", "loaded", false)?;

    let lazy = page.lazy_images().expect("lazy images installed");
    assert_eq!(lazy.loaded_count(), 3);
    assert_eq!(lazy.pending_count(), 0);
    Ok(())
}

#[test]
fn teardown_detaches_a_behavior() -> Result<()> {
    let mut page = Page::from_html(
        r#"<body><header id="header"></header><button id="backToTop">Top</button></body>"#,
    )?;
    assert_eq!(page.subscriptions(ControllerKind::Header).len(), 1);

    assert_eq!(page.teardown(ControllerKind::Header), 1);
    assert!(page.subscriptions(ControllerKind::Header).is_empty());
    assert!(!page.is_active(ControllerKind::Header));

    page.scroll_to(500.0)?;
    page.flush()?;
    page.assert_class("#header", "scrolled", false)?;
    page.assert_class("#backToTop", "visible", true)?;
    Ok(())
}

#[test]
fn unsubscribe_removes_a_single_listener() -> Result<()> {
    let mut page = Page::from_html(r#"<body><button id="backToTop">Top</button></body>"#)?;
    let ids = page.subscriptions(ControllerKind::BackToTop);
    assert_eq!(ids.len(), 2);

    // Scroll listener goes first; clicking still works afterwards.
    assert!(page.unsubscribe(ids[0]));
    assert!(!page.unsubscribe(ids[0]));
    page.scroll_to(500.0)?;
    page.assert_class("#backToTop", "visible", false)?;
    page.click("#backToTop")?;
    assert_eq!(page.host().scroll_log().len(), 1);
    Ok(())
}

#[test]
fn runaway_tasks_hit_the_step_limit() -> Result<()> {
    let mut host = MemoryHost::from_html(STATS_HTML)?;
    host.set_layout(".stats", 0.0, 300.0)?;
    host.set_task_step_limit(5)?;
    let mut page = Page::new(host)?;
    assert!(matches!(
        page.flush(),
        Err(site_behaviors::Error::TaskLimit { limit: 5, .. })
    ));
    Ok(())
}
