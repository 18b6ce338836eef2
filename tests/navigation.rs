use site_behaviors::{Environment, Host, MemoryHost, Page, PageConfig, Result, ScrollBehavior};

const MENU_HTML: &str = r##"
<body>
  <header id="header">
    <button id="mobileMenuToggle">Menu</button>
    <nav id="mainNav">
      <a id="navServices" href="#services">Services</a>
      <span id="navLabel">Navigate</span>
    </nav>
  </header>
  <main>
    <p id="outside">Building since 2008</p>
    <section id="services">Services</section>
  </main>
</body>
"##;

#[test]
fn menu_install_sets_accessibility_attributes() -> Result<()> {
    let page = Page::from_html(MENU_HTML)?;
    page.assert_attr("#mainNav", "role", Some("navigation"))?;
    page.assert_attr("#mainNav", "aria-label", Some("Main menu"))?;
    page.assert_attr("#mainNav", "aria-hidden", Some("true"))?;
    page.assert_attr("#mobileMenuToggle", "aria-expanded", Some("false"))?;
    Ok(())
}

#[test]
fn toggle_opens_and_closes_menu() -> Result<()> {
    let mut page = Page::from_html(MENU_HTML)?;

    page.click("#mobileMenuToggle")?;
    assert!(page.menu().expect("menu installed").is_open());
    page.assert_class("#mobileMenuToggle", "active", true)?;
    page.assert_class("#mainNav", "active", true)?;
    page.assert_style("body", "overflow", "hidden")?;
    page.assert_attr("#mobileMenuToggle", "aria-expanded", Some("true"))?;
    page.assert_attr("#mainNav", "aria-hidden", Some("false"))?;

    page.click("#mobileMenuToggle")?;
    assert!(!page.menu().expect("menu installed").is_open());
    page.assert_class("#mainNav", "active", false)?;
    page.assert_style("body", "overflow", "")?;
    page.assert_attr("#mobileMenuToggle", "aria-expanded", Some("false"))?;
    page.assert_attr("#mainNav", "aria-hidden", Some("true"))?;
    Ok(())
}

#[test]
fn outside_click_closes_but_inside_click_does_not() -> Result<()> {
    let mut page = Page::from_html(MENU_HTML)?;
    page.click("#mobileMenuToggle")?;

    page.click("#navLabel")?;
    assert!(page.menu().expect("menu installed").is_open());

    page.click("#outside")?;
    assert!(!page.menu().expect("menu installed").is_open());
    page.assert_style("body", "overflow", "")?;
    Ok(())
}

#[test]
fn nav_link_click_closes_menu() -> Result<()> {
    let mut page = Page::from_html(MENU_HTML)?;
    page.click("#mobileMenuToggle")?;
    page.click("#navServices")?;
    assert!(!page.menu().expect("menu installed").is_open());
    assert!(page.host().navigations().is_empty());
    Ok(())
}

#[test]
fn escape_closes_open_menu_and_returns_focus() -> Result<()> {
    let mut page = Page::from_html(MENU_HTML)?;

    page.press_key("Escape")?;
    assert!(!page.menu().expect("menu installed").is_open());
    assert_eq!(page.host().active_element(), None);

    page.click("#mobileMenuToggle")?;
    page.press_key("Enter")?;
    assert!(page.menu().expect("menu installed").is_open());

    page.press_key("Escape")?;
    assert!(!page.menu().expect("menu installed").is_open());
    let toggle = page.host().element_by_id("mobileMenuToggle");
    assert_eq!(page.host().active_element(), toggle);
    Ok(())
}

const SCROLL_HTML: &str = r##"
<body>
  <nav>
    <a id="toServices" href="#services">Services</a>
    <a id="toTop" href="#">Top</a>
    <a id="toMissing" href="#nowhere">Nowhere</a>
    <a id="external" href="https://example.com/">External</a>
  </nav>
  <button id="cta" data-scroll-to="contact">Get a quote</button>
  <button id="ctaMissing" data-scroll-to="gone">Gone</button>
  <section id="services">Services</section>
  <section id="contact">Contact</section>
</body>
"##;

fn scroll_page() -> Result<Page> {
    Page::from_html_with(SCROLL_HTML, PageConfig::default(), |host: &mut MemoryHost| {
        host.set_layout("#services", 1200.0, 600.0)?;
        host.set_layout("#contact", 2400.0, 600.0)?;
        Ok(())
    })
}

#[test]
fn anchor_scrolls_below_fixed_header() -> Result<()> {
    let mut page = scroll_page()?;
    page.click("#toServices")?;

    let log = page.host().scroll_log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].top, 1120.0);
    assert_eq!(log[0].behavior, ScrollBehavior::Smooth);
    assert_eq!(page.host().scroll_y(), 1120.0);
    assert!(page.host().navigations().is_empty());
    Ok(())
}

#[test]
fn scroll_button_accounts_for_current_offset() -> Result<()> {
    let mut page = scroll_page()?;
    page.scroll_to(1120.0)?;
    page.click("#cta")?;
    assert_eq!(page.host().scroll_log()[0].top, 2320.0);
    Ok(())
}

#[test]
fn bare_hash_and_missing_targets_are_no_ops() -> Result<()> {
    let mut page = scroll_page()?;
    page.click("#toTop")?;
    page.click("#toMissing")?;
    page.click("#ctaMissing")?;
    assert!(page.host().scroll_log().is_empty());
    assert!(page.host().navigations().is_empty());
    Ok(())
}

#[test]
fn external_links_are_left_alone() -> Result<()> {
    let mut page = scroll_page()?;
    page.click("#external")?;
    assert!(page.host().scroll_log().is_empty());
    assert_eq!(page.host().navigations(), ["https://example.com/".to_string()]);
    Ok(())
}
