// Status page scraping.
//
// The controller has no JSON API. Its root page renders the current LED level
// into a form input, e.g. `<input id="level" type="number" value="42">`.
// The page is not a stable contract, so parsing never fails: anything we
// cannot read degrades to a brightness of 0.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace, warn};

use crate::client::{Operation, VinorageClient};
use crate::error::Error;
use crate::models::{DeviceStatus, MAX_LED_BRIGHTNESS};

/// A single tag whose `id` attribute is `level`.
static LEVEL_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<[^<>]*\sid\s*=\s*["']level["'][^<>]*>"#).expect("valid level tag regex")
});

/// An unsigned integer `value` attribute inside a tag.
static VALUE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\svalue\s*=\s*["'](\d+)["']"#).expect("valid value attribute regex")
});

/// Extract the raw `value` digits of the `level` input, if present.
fn level_value(html: &str) -> Option<&str> {
    LEVEL_TAG
        .find_iter(html)
        .find_map(|tag| VALUE_ATTR.captures(tag.as_str()))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parse the status page into a [`DeviceStatus`].
///
/// Missing or unreadable values yield a brightness of 0 and values above 100
/// are clamped.
pub fn parse_status_page(html: &str) -> DeviceStatus {
    let Some(raw) = level_value(html) else {
        trace!("no level input on status page, assuming brightness 0");
        return DeviceStatus::default();
    };

    let led_brightness = match raw.parse::<u32>() {
        Ok(pct) if pct > u32::from(MAX_LED_BRIGHTNESS) => {
            warn!(value = pct, "LED level above 100, clamping");
            MAX_LED_BRIGHTNESS
        }
        Ok(pct) => u8::try_from(pct).unwrap_or(MAX_LED_BRIGHTNESS),
        Err(e) => {
            warn!(value = raw, error = %e, "unreadable LED level, assuming 0");
            0
        }
    };

    DeviceStatus { led_brightness }
}

impl VinorageClient {
    /// Fetch and parse the controller's status page.
    ///
    /// `GET /`
    pub async fn fetch_status(&self) -> Result<DeviceStatus, Error> {
        let html = self.get_text("", Operation::FetchStatus).await?;
        let status = parse_status_page(&html);
        debug!(host = %self.host(), led_brightness = status.led_brightness, "fetched status");
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn brightness(html: &str) -> u8 {
        parse_status_page(html).led_brightness
    }

    #[test]
    fn reads_level_input() {
        assert_eq!(brightness(r#"<input id="level" type="number" value="42">"#), 42);
    }

    #[test]
    fn reads_value_before_id() {
        assert_eq!(brightness(r#"<input value="17" id="level">"#), 17);
    }

    #[test]
    fn reads_single_quoted_attributes() {
        assert_eq!(brightness("<input id='level' value='5'/>"), 5);
    }

    #[test]
    fn reads_level_within_full_page() {
        let page = r#"<!DOCTYPE html>
<html><body>
  <form action="/act_control" method="post">
    <input id="act" type="hidden" value="1">
  </form>
  <form action="/led_set" method="post">
    <label for="level">LED</label>
    <input id="level" name="level" type="range" min="0" max="100" value="80">
  </form>
</body></html>"#;
        assert_eq!(brightness(page), 80);
    }

    #[test]
    fn ignores_value_of_other_tags() {
        let page = r#"<input id="act" value="2"><input id="level" type="number">"#;
        assert_eq!(brightness(page), 0);
    }

    #[test]
    fn does_not_match_prefixed_id_attributes() {
        assert_eq!(brightness(r#"<input data-id="level" value="9">"#), 0);
    }

    // Missing or malformed values default to 0 on purpose; the status page
    // is not a strict contract and a scrape must never abort a refresh.
    #[test]
    fn missing_level_defaults_to_zero() {
        assert_eq!(brightness("<html><body>Vinorage</body></html>"), 0);
        assert_eq!(brightness(""), 0);
    }

    #[test]
    fn non_numeric_value_defaults_to_zero() {
        assert_eq!(brightness(r#"<input id="level" value="high">"#), 0);
    }

    #[test]
    fn overflowing_value_defaults_to_zero() {
        assert_eq!(brightness(r#"<input id="level" value="99999999999">"#), 0);
    }

    #[test]
    fn out_of_range_value_is_clamped() {
        assert_eq!(brightness(r#"<input id="level" value="150">"#), 100);
    }
}
