//! Rendering of the human-facing form page.
//!
//! The page template is a plain HTML asset with `{{name}}` placeholders.
//! Values are HTML-escaped here; placeholders ending in `_section` receive
//! pre-built markup.

use crate::params::{
    BORDER_MAX, BORDER_MIN, IndexParams, Mode, QrParams, SCALE_MAX, SCALE_MIN,
};
use crate::wifi::AuthType;
use std::collections::HashMap;

/// What the form page shows for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexView {
    pub params: IndexParams,
    /// Set in WiFi mode only; `None` there means no SSID was given.
    pub wifi_payload: Option<String>,
    /// The text `/qr` would encode, if any.
    pub effective_data: Option<String>,
}

impl IndexView {
    pub fn new(params: IndexParams) -> Self {
        let wifi_payload = match params.mode {
            Mode::Wifi => params.wifi.payload(),
            Mode::Text => None,
        };
        let effective_data = params.effective_data();
        Self {
            params,
            wifi_payload,
            effective_data,
        }
    }

    /// Link to the PNG for the effective data.
    pub fn qr_href(&self) -> Option<String> {
        self.effective_data.as_ref().map(|data| {
            QrParams {
                data: data.clone(),
                render: self.params.render,
            }
            .to_href()
        })
    }

    fn placeholders(&self) -> HashMap<&'static str, String> {
        let p = &self.params;
        let flag = |on: bool, word: &str| if on { word.to_string() } else { String::new() };
        let auth = |a: AuthType| flag(p.wifi.auth == a, "selected");

        HashMap::from([
            ("mode", p.mode.as_str().to_string()),
            ("mode_text_checked", flag(p.mode == Mode::Text, "checked")),
            ("mode_wifi_checked", flag(p.mode == Mode::Wifi, "checked")),
            ("data", escape_html(p.data.as_deref().unwrap_or(""))),
            ("scale", p.render.scale.to_string()),
            ("scale_min", SCALE_MIN.to_string()),
            ("scale_max", SCALE_MAX.to_string()),
            ("border", p.render.border.to_string()),
            ("border_min", BORDER_MIN.to_string()),
            ("border_max", BORDER_MAX.to_string()),
            ("wifi_ssid", escape_html(p.wifi.ssid.as_deref().unwrap_or(""))),
            ("wifi_password", escape_html(p.wifi.password.as_deref().unwrap_or(""))),
            ("auth_wep_selected", auth(AuthType::Wep)),
            ("auth_wpa_selected", auth(AuthType::Wpa)),
            ("auth_nopass_selected", auth(AuthType::NoPass)),
            ("wifi_hidden_checked", flag(p.wifi.hidden, "checked")),
            (
                "effective_data",
                escape_html(self.effective_data.as_deref().unwrap_or("")),
            ),
            ("wifi_payload_section", self.wifi_payload_section()),
            ("result_section", self.result_section()),
        ])
    }

    fn wifi_payload_section(&self) -> String {
        match (self.params.mode, &self.wifi_payload) {
            (Mode::Text, _) => String::new(),
            (Mode::Wifi, Some(payload)) => format!(
                "<p>WiFi payload:</p>\n<pre class=\"payload\">{}</pre>",
                escape_html(payload)
            ),
            (Mode::Wifi, None) => {
                "<p class=\"notice\">No payload yet: enter an SSID to build the WiFi QR code.</p>"
                    .to_string()
            }
        }
    }

    fn result_section(&self) -> String {
        match self.qr_href() {
            Some(href) => {
                let href = escape_html(&href);
                format!(
                    "<img class=\"qr\" src=\"{href}\" alt=\"QR code\">\n\
                     <p><a href=\"{href}\" download=\"qr.png\">Download PNG</a></p>"
                )
            }
            None => "<p class=\"notice\">Nothing to encode yet.</p>".to_string(),
        }
    }

    /// Fills `template` with this view's values.
    pub fn render(&self, template: &str) -> String {
        let values = self.placeholders();
        render_template(template, |key| values.get(key).map(String::as_str))
    }
}

/// Replaces each `{{key}}` with `lookup(key)` in a single pass.
///
/// Unknown keys are left untouched. Substituted text is never rescanned.
fn render_template<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                match lookup(key) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
