//! Markup injected into proxied pages.
//!
//! `HEAD_STYLE` hides platform top-bar controls that make no sense on a
//! custom domain and shows the theme toggle slot. Every rule is an
//! `!important` display declaration, so appending the block more than once
//! renders the same.
//!
//! `body_script` renders the navigation script from the response's
//! `NavigationPolicy`. Its behaviour mirrors `navigation::NavigationGate` and
//! `navigation::NavigationPolicy`.

use crate::rewrite::context::RewriteContext;
use crate::rewrite::navigation::{BYPASS_MARKER, PAGE_ID_LEN};

pub const HEAD_STYLE: &str = r#"<style>
div.notion-topbar > div > div:nth-child(3) { display: none !important; }
div.notion-topbar > div > div:nth-child(4) { display: none !important; }
div.notion-topbar > div > div:nth-child(5) { display: none !important; }
div.notion-topbar > div > div:nth-child(6) { display: none !important; }
div.notion-topbar-mobile > div:nth-child(3) { display: none !important; }
div.notion-topbar-mobile > div:nth-child(4) { display: none !important; }
div.notion-topbar > div > div:nth-child(1n).toggle-mode { display: block !important; }
div.notion-topbar-mobile > div:nth-child(1n).toggle-mode { display: block !important; }
</style>"#;

const SCRIPT_TEMPLATE: &str = r#"<script>
(function () {
  var DOMAIN = __DOMAIN__;
  var UPSTREAM_HOST = __UPSTREAM_HOST__;
  var BYPASS = __BYPASS__;
  var PAGE_ID_LEN = __PAGE_ID_LEN__;
  var SLUG_TO_PAGE = __SLUG_TABLE__;
  var PAGE_TO_SLUG = {};
  Object.keys(SLUG_TO_PAGE).forEach(function (slug) {
    PAGE_TO_SLUG[SLUG_TO_PAGE[slug]] = slug;
  });
  if (window.CONFIG) {
    window.CONFIG.domainBaseUrl = 'https://' + DOMAIN;
  }

  var has = Object.prototype.hasOwnProperty;
  function pageIdOf(path) { return path.slice(-PAGE_ID_LEN); }
  function currentSlug() { return location.pathname.slice(1); }
  function isKnownSlug(slug) { return has.call(SLUG_TO_PAGE, slug); }
  function isKnownPage(id) { return has.call(PAGE_TO_SLUG, id); }

  var hist = window.history;
  var nativeReplaceState = hist.replaceState;
  var nativePushState = hist.pushState;

  function showSlug() {
    var id = pageIdOf(location.pathname);
    if (isKnownPage(id)) {
      nativeReplaceState.call(hist, hist.state, BYPASS, '/' + PAGE_TO_SLUG[id]);
    }
  }

  var toggle = document.createElement('div');
  toggle.className = 'toggle-mode';
  function renderToggle(dark) {
    toggle.innerHTML =
      '<div title="' + (dark ? 'Change to Light Mode' : 'Change to Dark Mode') +
      '" style="margin-left: auto; margin-right: 14px; min-width: 0px;">' +
      '<div role="button" tabindex="0" style="user-select: none; cursor: pointer; border-radius: 44px;">' +
      '<div style="display: flex; flex-shrink: 0; height: 14px; width: 26px; border-radius: 44px; padding: 2px; box-sizing: content-box; background: ' +
      (dark ? 'rgb(46, 170, 220)' : 'rgba(135, 131, 120, 0.3)') +
      '; transition: background 200ms ease 0s;">' +
      '<div style="width: 14px; height: 14px; border-radius: 44px; background: white; transition: transform 200ms ease-out 0s; transform: translateX(' +
      (dark ? '12px' : '0px') + ') translateY(0px);"></div></div></div></div>';
  }
  function setMode(dark) {
    renderToggle(dark);
    document.body.classList.toggle('dark', dark);
    var env = window.__console && window.__console.environment;
    if (env && env.ThemeStore) {
      env.ThemeStore.setState({ mode: dark ? 'dark' : 'light' });
    }
  }
  toggle.addEventListener('click', function () {
    setMode(!document.body.classList.contains('dark'));
  });

  function navContainer() {
    var web = document.querySelector('.notion-topbar');
    if (web && web.firstChild && web.firstChild.firstChild) { return web.firstChild; }
    var mobile = document.querySelector('.notion-topbar-mobile');
    if (mobile && mobile.firstChild) { return mobile; }
    return null;
  }

  var initialized = false;
  function initialize(nav) {
    initialized = true;
    showSlug();
    nav.appendChild(toggle);
    setMode(false);
    var appPopState = window.onpopstate;
    window.onpopstate = function () {
      var slug = currentSlug();
      if (isKnownSlug(slug)) {
        hist.replaceState(hist.state, BYPASS, '/' + SLUG_TO_PAGE[slug]);
      }
      if (typeof appPopState === 'function') { appPopState.apply(this, arguments); }
      showSlug();
    };
  }

  var app = document.querySelector('#notion-app');
  if (app) {
    var observer = new MutationObserver(function () {
      if (initialized) { return; }
      var nav = navContainer();
      if (nav) {
        observer.disconnect();
        initialize(nav);
      }
    });
    observer.observe(app, { childList: true, subtree: true });
  }

  hist.replaceState = function (state, title) {
    if (title !== BYPASS && isKnownSlug(currentSlug())) { return; }
    return nativeReplaceState.apply(hist, arguments);
  };
  hist.pushState = function (state, title, url) {
    if (url != null) {
      var id = pageIdOf(new URL(String(url), location.href).pathname);
      if (isKnownPage(id)) { arguments[2] = '/' + PAGE_TO_SLUG[id]; }
    }
    return nativePushState.apply(hist, arguments);
  };
  var nativeOpen = window.XMLHttpRequest.prototype.open;
  window.XMLHttpRequest.prototype.open = function (method, url) {
    if (url != null) { arguments[1] = String(url).replace(DOMAIN, UPSTREAM_HOST); }
    return nativeOpen.apply(this, arguments);
  };
})();
</script>"#;

/// JSON literal safe to embed inside a `<script>` element.
fn script_literal<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
        .replace("<!--", "<\\!--")
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Markup appended to `<body>`: hidden branding footer plus navigation script.
pub fn body_script(ctx: &RewriteContext) -> String {
    let policy = ctx.navigation();
    let script = SCRIPT_TEMPLATE
        .replace("__DOMAIN__", &script_literal(policy.domain()))
        .replace("__UPSTREAM_HOST__", &script_literal(policy.upstream_host()))
        .replace("__BYPASS__", &script_literal(BYPASS_MARKER))
        .replace("__PAGE_ID_LEN__", &PAGE_ID_LEN.to_string())
        .replace("__SLUG_TABLE__", &script_literal(policy.slugs()));

    if ctx.branding.is_empty() {
        script
    } else {
        format!(
            "<div style=\"display: none;\">{}</div>\n{}",
            escape_text(&ctx.branding),
            script
        )
    }
}
