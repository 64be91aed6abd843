use std::time::Duration;

use crate::app::{Result, TrawlerError};
use crate::browser::BrowserSession;
use crate::engine::Pacer;

/// Attribute put on elements of a page that is about to be left.
const STALE_ATTR: &str = "data-trawler-seen";

/// Polls until `selector` is present, giving up after `timeout`.
///
/// A failed presence check counts as "not yet": while a navigation is in
/// flight the old document's execution context goes away under the driver.
pub async fn wait_for_content(
    session: &mut dyn BrowserSession,
    selector: &str,
    timeout: Duration,
    poll: Duration,
) -> Result<()> {
    let waited = tokio::time::timeout(timeout, async {
        loop {
            match session.is_present(selector).await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(e) => tracing::debug!("Presence check for {} failed: {}", selector, e),
            }
            tokio::time::sleep(poll).await;
        }
    })
    .await;

    match waited {
        Ok(result) => result,
        Err(_) => Err(TrawlerError::ContentTimeout {
            selector: selector.to_string(),
            timeout,
        }),
    }
}

/// Marks every element currently matching `selector`, so that
/// [`wait_for_fresh`] can tell the next page's elements from these.
pub async fn mark_stale(session: &mut dyn BrowserSession, selector: &str) -> Result<()> {
    session.evaluate(&stale_marker_script(selector)).await?;
    Ok(())
}

/// Waits for an element matching `selector` that was not marked by
/// [`mark_stale`]. Returns `false` if none shows up in time; the caller
/// carries on with whatever is rendered.
pub async fn wait_for_fresh(
    session: &mut dyn BrowserSession,
    selector: &str,
    timeout: Duration,
    poll: Duration,
) -> bool {
    match wait_for_content(session, &fresh_selector(selector), timeout, poll).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Page did not change: {}", e);
            false
        }
    }
}

pub(crate) fn stale_marker_script(selector: &str) -> String {
    let literal = serde_json::Value::String(selector.to_string()).to_string();
    format!(
        "document.querySelectorAll({}).forEach(e => e.setAttribute('{}', ''))",
        literal, STALE_ATTR
    )
}

/// `selector` restricted to unmarked elements. Expects a single compound
/// selector, not a comma-separated list.
pub(crate) fn fresh_selector(selector: &str) -> String {
    format!("{}:not([{}])", selector, STALE_ATTR)
}

/// Clicks away each overlay that is currently shown.
///
/// A missing overlay is the normal case, and a click that fails is only
/// logged: neither stops the task. Returns how many overlays were dismissed.
pub async fn dismiss_interstitials(
    session: &mut dyn BrowserSession,
    selectors: &[&str],
    pacer: &mut Pacer,
) -> usize {
    let mut dismissed = 0;
    for selector in selectors {
        match session.is_present(selector).await {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                tracing::debug!("Could not look for overlay {}: {}", selector, e);
                continue;
            }
        }

        pacer.before_interstitial().await;
        match session.click(selector).await {
            Ok(()) => {
                tracing::info!("Dismissed overlay {}", selector);
                dismissed += 1;
            }
            Err(e) => tracing::debug!("Overlay {} could not be dismissed: {}", selector, e),
        }
    }
    dismissed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{Call, Check, FakeLauncher, PageScript};
    use crate::browser::BrowserLauncher;
    use crate::config::PacingConfig;

    const POLL: Duration = Duration::from_millis(5);

    #[tokio::test]
    async fn test_present_content_returns_immediately() {
        let launcher = FakeLauncher::new().with_session(PageScript::new().with_present("main"));
        let mut session = launcher.launch().await.unwrap();
        wait_for_content(session.as_mut(), "main", Duration::from_secs(1), POLL)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_absent_content_times_out() {
        let launcher = FakeLauncher::new().with_session(PageScript::new());
        let mut session = launcher.launch().await.unwrap();
        let err = wait_for_content(session.as_mut(), "main", Duration::from_millis(30), POLL)
            .await
            .unwrap_err();
        assert!(matches!(err, TrawlerError::ContentTimeout { ref selector, .. } if selector == "main"));
    }

    #[tokio::test]
    async fn test_failed_check_keeps_polling() {
        let launcher = FakeLauncher::new()
            .with_session(PageScript::new().with_checks("main", &[Check::Fail, Check::Present]));
        let mut session = launcher.launch().await.unwrap();
        wait_for_content(session.as_mut(), "main", Duration::from_secs(2), POLL)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_failing_checks_end_in_timeout() {
        let launcher =
            FakeLauncher::new().with_session(PageScript::new().with_checks("main", &[Check::Fail]));
        let mut session = launcher.launch().await.unwrap();
        let err = wait_for_content(session.as_mut(), "main", Duration::from_millis(30), POLL)
            .await
            .unwrap_err();
        assert!(matches!(err, TrawlerError::ContentTimeout { .. }));
    }

    #[tokio::test]
    async fn test_wait_for_fresh_looks_for_unmarked_elements() {
        let launcher = FakeLauncher::new()
            .with_session(PageScript::new().with_present(&fresh_selector("div.card")));
        let mut session = launcher.launch().await.unwrap();
        mark_stale(session.as_mut(), "div.card").await.unwrap();
        assert!(wait_for_fresh(session.as_mut(), "div.card", Duration::from_secs(1), POLL).await);
        assert_eq!(
            launcher.count(&Call::Script(stale_marker_script("div.card"))),
            1
        );
    }

    #[tokio::test]
    async fn test_wait_for_fresh_gives_up_quietly() {
        let launcher = FakeLauncher::new().with_session(PageScript::new().with_present("div.card"));
        let mut session = launcher.launch().await.unwrap();
        assert!(!wait_for_fresh(session.as_mut(), "div.card", Duration::from_millis(20), POLL).await);
    }

    #[test]
    fn test_fresh_selector_excludes_marked() {
        assert_eq!(
            fresh_selector("div[class=new-item-box__container]"),
            "div[class=new-item-box__container]:not([data-trawler-seen])"
        );
        assert!(stale_marker_script("a[title='x']").contains(r#""a[title='x']""#));
    }

    #[tokio::test]
    async fn test_dismiss_only_present_overlays() {
        let launcher = FakeLauncher::new()
            .with_session(PageScript::new().with_present("button#cookies"));
        let mut session = launcher.launch().await.unwrap();
        let mut pacer = Pacer::new(PacingConfig::immediate());

        let dismissed = dismiss_interstitials(
            session.as_mut(),
            &["button#region", "button#cookies"],
            &mut pacer,
        )
        .await;

        assert_eq!(dismissed, 1);
        assert_eq!(launcher.count(&Call::Click("button#cookies".into())), 1);
        assert_eq!(launcher.count(&Call::Click("button#region".into())), 0);
    }

    #[tokio::test]
    async fn test_no_overlays_is_success() {
        let launcher = FakeLauncher::new().with_session(PageScript::new());
        let mut session = launcher.launch().await.unwrap();
        let mut pacer = Pacer::new(PacingConfig::immediate());
        assert_eq!(
            dismiss_interstitials(session.as_mut(), &["button#cookies"], &mut pacer).await,
            0
        );
    }
}
