//! [`Notifier`] implementation backed by the freedesktop notification
//! service, via `notify_rust`.
//!
//! Delivery is fire-and-forget: a missing or broken notification daemon is
//! logged as a warning and otherwise ignored.

use crate::config::NotificationConfig;
use crate::observation::Notification;
use crate::traits::Notifier;
use log::warn;

/// Sends notifications to the desktop notification daemon over D-Bus.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    app_name: String,
    timeout_ms: Option<u32>,
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new(&NotificationConfig::default())
    }
}

impl DesktopNotifier {
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            app_name: config.app_name.clone(),
            timeout_ms: config.timeout_ms,
        }
    }
}

/// Escape the characters that notification servers with body markup
/// support would otherwise interpret (`&`, `<`, `>`).
///
/// `&` must be replaced first so the entities introduced for `<` and `>`
/// are not escaped twice.
pub fn escape_markup(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl Notifier for DesktopNotifier {
    fn notify(&self, notification: &Notification) {
        let mut n = notify_rust::Notification::new();
        n.appname(&self.app_name)
            .summary(&notification.summary)
            .body(&escape_markup(&notification.message));
        if let Some(icon) = notification.icon.as_deref().filter(|i| !i.is_empty()) {
            n.icon(icon);
        }
        if let Some(ms) = self.timeout_ms {
            n.timeout(notify_rust::Timeout::Milliseconds(ms));
        }
        if let Err(e) = n.show() {
            warn!("failed to send desktop notification: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape_markup("Simon & Garfunkel"), "Simon &amp; Garfunkel");
        assert_eq!(escape_markup("<b>loud</b>"), "&lt;b&gt;loud&lt;/b&gt;");
    }

    #[test]
    fn existing_entities_are_escaped_once() {
        assert_eq!(escape_markup("&lt;"), "&amp;lt;");
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(escape_markup("Julie and Candy"), "Julie and Candy");
        assert_eq!(escape_markup(""), "");
    }

    #[test]
    fn takes_settings_from_config() {
        let cfg = NotificationConfig {
            app_name: "music".into(),
            stop_icon: None,
            timeout_ms: Some(1500),
        };
        let n = DesktopNotifier::new(&cfg);
        assert_eq!(n.app_name, "music");
        assert_eq!(n.timeout_ms, Some(1500));
    }
}
