//! Capability gate: decides which classification strategy a host can run.
//!
//! The host injects a [`CapabilitySnapshot`] (user agent, WebGL availability,
//! device memory estimate); nothing here probes the environment directly.

use crate::types::Strategy;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const DEFAULT_MIN_SAFARI_VERSION: u32 = 13;
const DEFAULT_MIN_ANDROID_CHROME_VERSION: u32 = 90;
const DEFAULT_MIN_DEVICE_MEMORY_GB: f32 = 2.0;

const MOBILE_TOKENS: [&str; 9] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
    "mobile",
];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CapabilityError {
    #[error("unsupported environment: {browser} cannot run face analysis")]
    UnsupportedEnvironment { browser: String },
}

/// Host-reported runtime capabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilitySnapshot {
    pub user_agent: String,
    /// Whether a WebGL context could be created.
    pub webgl_available: bool,
    /// Device memory estimate in GB, if the host reports one.
    pub device_memory_gb: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrowserName {
    Chrome,
    Edge,
    Firefox,
    InternetExplorer,
    Opera,
    Safari,
    Unknown,
}

impl fmt::Display for BrowserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BrowserName::Chrome => "Chrome",
            BrowserName::Edge => "Edge",
            BrowserName::Firefox => "Firefox",
            BrowserName::InternetExplorer => "Internet Explorer",
            BrowserName::Opera => "Opera",
            BrowserName::Safari => "Safari",
            BrowserName::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// A single reason the host failed the compatibility check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Incompatibility {
    InternetExplorer,
    FirefoxOnIos,
    OutdatedSafari { version: u32 },
    OutdatedAndroidChrome { version: u32 },
    WebGlUnavailable,
    InsufficientMemory { gb: f32 },
}

impl fmt::Display for Incompatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Incompatibility::InternetExplorer => write!(f, "Internet Explorer is not supported"),
            Incompatibility::FirefoxOnIos => write!(f, "Firefox on iOS lacks required APIs"),
            Incompatibility::OutdatedSafari { version } => {
                write!(f, "Safari {version} is below the supported minimum")
            }
            Incompatibility::OutdatedAndroidChrome { version } => {
                write!(f, "Chrome {version} on Android is below the supported minimum")
            }
            Incompatibility::WebGlUnavailable => write!(f, "WebGL context could not be created"),
            Incompatibility::InsufficientMemory { gb } => {
                write!(f, "device reports only {gb} GB of memory")
            }
        }
    }
}

/// Result of inspecting a snapshot. Computed fresh on every check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityProfile {
    pub webgl_supported: bool,
    /// Reported memory in GB; a non-finite report is treated as unknown.
    #[serde(rename = "deviceMemoryGB")]
    pub device_memory_gb: Option<f32>,
    pub is_mobile: bool,
    pub browser_name: BrowserName,
    /// Major version, when the user agent carries one.
    pub browser_version: Option<u32>,
    pub compatible: bool,
    pub issues: Vec<Incompatibility>,
}

impl CapabilityProfile {
    /// Inspect a snapshot with the default thresholds.
    pub fn inspect(snapshot: &CapabilitySnapshot) -> Self {
        CapabilityGate::default().inspect(snapshot)
    }
}

/// The routing decision handed back to the caller.
#[derive(Debug, Clone)]
pub struct GateDecision {
    pub strategy: Strategy,
    pub profile: CapabilityProfile,
}

impl GateDecision {
    pub fn use_fallback(&self) -> bool {
        self.strategy == Strategy::Fallback
    }
}

/// Compatibility thresholds.
#[derive(Debug, Clone)]
pub struct CapabilityGate {
    pub min_safari_version: u32,
    pub min_android_chrome_version: u32,
    pub min_device_memory_gb: f32,
}

impl Default for CapabilityGate {
    fn default() -> Self {
        Self {
            min_safari_version: DEFAULT_MIN_SAFARI_VERSION,
            min_android_chrome_version: DEFAULT_MIN_ANDROID_CHROME_VERSION,
            min_device_memory_gb: DEFAULT_MIN_DEVICE_MEMORY_GB,
        }
    }
}

impl CapabilityGate {
    /// Build a capability profile for `snapshot`.
    pub fn inspect(&self, snapshot: &CapabilitySnapshot) -> CapabilityProfile {
        let ua = snapshot.user_agent.as_str();
        let (browser_name, browser_version) = detect_browser(ua);
        let device_memory_gb = snapshot.device_memory_gb.filter(|gb| gb.is_finite());
        if device_memory_gb.is_none() && snapshot.device_memory_gb.is_some() {
            tracing::debug!(reported = ?snapshot.device_memory_gb, "ignoring non-finite device memory");
        }
        let mut issues = Vec::new();

        if browser_name == BrowserName::InternetExplorer {
            issues.push(Incompatibility::InternetExplorer);
        }
        if ua.contains("FxiOS") {
            issues.push(Incompatibility::FirefoxOnIos);
        }
        if let (BrowserName::Safari, Some(version)) = (browser_name, browser_version) {
            if version < self.min_safari_version {
                issues.push(Incompatibility::OutdatedSafari { version });
            }
        }
        if let (BrowserName::Chrome, Some(version)) = (browser_name, browser_version) {
            if ua.contains("Android") && version < self.min_android_chrome_version {
                issues.push(Incompatibility::OutdatedAndroidChrome { version });
            }
        }
        if !snapshot.webgl_available {
            issues.push(Incompatibility::WebGlUnavailable);
        }
        if let Some(gb) = device_memory_gb {
            if gb < self.min_device_memory_gb {
                issues.push(Incompatibility::InsufficientMemory { gb });
            }
        }

        CapabilityProfile {
            webgl_supported: snapshot.webgl_available,
            device_memory_gb,
            is_mobile: is_mobile(ua),
            browser_name,
            browser_version,
            compatible: issues.is_empty(),
            issues,
        }
    }

    /// Route to the primary or fallback strategy.
    ///
    /// Any incompatibility selects the fallback, except Internet Explorer,
    /// where neither strategy can run.
    pub fn evaluate(&self, snapshot: &CapabilitySnapshot) -> Result<GateDecision, CapabilityError> {
        let profile = self.inspect(snapshot);

        if profile.issues.contains(&Incompatibility::InternetExplorer) {
            tracing::warn!(user_agent = %snapshot.user_agent, "unsupported browser");
            return Err(CapabilityError::UnsupportedEnvironment {
                browser: profile.browser_name.to_string(),
            });
        }

        let strategy = if profile.compatible {
            Strategy::Primary
        } else {
            Strategy::Fallback
        };

        tracing::debug!(
            browser = %profile.browser_name,
            version = ?profile.browser_version,
            mobile = profile.is_mobile,
            issues = profile.issues.len(),
            ?strategy,
            "capability gate decision"
        );

        Ok(GateDecision { strategy, profile })
    }
}

/// Case-insensitive match against common mobile/tablet tokens.
pub fn is_mobile(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    MOBILE_TOKENS.iter().any(|token| ua.contains(token))
}

/// Identify the browser family and major version from a user agent.
///
/// Order matters: Edge and Opera also advertise `Chrome/`, and every
/// Chromium browser advertises `Safari/`.
fn detect_browser(ua: &str) -> (BrowserName, Option<u32>) {
    if ua.contains("MSIE ") {
        return (BrowserName::InternetExplorer, major_after(ua, "MSIE "));
    }
    if ua.contains("Trident/") {
        return (BrowserName::InternetExplorer, major_after(ua, "rv:"));
    }

    const FAMILIES: [(&[&str], BrowserName); 4] = [
        (&["Edg/", "EdgA/", "EdgiOS/", "Edge/"], BrowserName::Edge),
        (&["OPR/", "Opera/"], BrowserName::Opera),
        (&["Firefox/", "FxiOS/"], BrowserName::Firefox),
        (&["Chrome/", "CriOS/", "Chromium/"], BrowserName::Chrome),
    ];
    for (tokens, name) in FAMILIES {
        if let Some(token) = tokens.iter().find(|t| ua.contains(*t)) {
            return (name, major_after(ua, token));
        }
    }

    if ua.contains("Safari/") {
        return (BrowserName::Safari, major_after(ua, "Version/"));
    }

    (BrowserName::Unknown, None)
}

/// Parse the leading integer that follows `token`, e.g. `Version/12.1` → 12.
fn major_after(ua: &str, token: &str) -> Option<u32> {
    let start = ua.find(token)? + token.len();
    let digits: String = ua[start..].chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAFARI_12: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_14_6) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/12.1.2 Safari/605.1.15";
    const SAFARI_14: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1 Safari/605.1.15";
    const CHROME_DESKTOP: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const CHROME_ANDROID_OLD: &str = "Mozilla/5.0 (Linux; Android 10; SM-G973F) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/85.0.4183.101 Mobile Safari/537.36";
    const CHROME_ANDROID_NEW: &str = "Mozilla/5.0 (Linux; Android 13; Pixel 7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Mobile Safari/537.36";
    const FIREFOX_IOS: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 16_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) FxiOS/118.0 Mobile/15E148 Safari/605.1.15";
    const IE_11: &str = "Mozilla/5.0 (Windows NT 10.0; WOW64; Trident/7.0; rv:11.0) like Gecko";
    const IE_9: &str = "Mozilla/5.0 (compatible; MSIE 9.0; Windows NT 6.1; Trident/5.0)";
    const EDGE: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.2210.91";

    fn snapshot(ua: &str) -> CapabilitySnapshot {
        CapabilitySnapshot {
            user_agent: ua.to_string(),
            webgl_available: true,
            device_memory_gb: Some(8.0),
        }
    }

    #[test]
    fn test_safari_12_incompatible_14_compatible() {
        let old = CapabilityProfile::inspect(&snapshot(SAFARI_12));
        assert_eq!(old.browser_name, BrowserName::Safari);
        assert_eq!(old.browser_version, Some(12));
        assert!(!old.compatible);
        assert_eq!(old.issues, vec![Incompatibility::OutdatedSafari { version: 12 }]);

        let new = CapabilityProfile::inspect(&snapshot(SAFARI_14));
        assert_eq!(new.browser_version, Some(14));
        assert!(new.compatible);
    }

    #[test]
    fn test_old_safari_routes_to_fallback() {
        let decision = CapabilityGate::default().evaluate(&snapshot(SAFARI_12)).unwrap();
        assert!(decision.use_fallback());
        let decision = CapabilityGate::default().evaluate(&snapshot(SAFARI_14)).unwrap();
        assert!(!decision.use_fallback());
        assert_eq!(decision.strategy, Strategy::Primary);
    }

    #[test]
    fn test_internet_explorer_is_unsupported() {
        for ua in [IE_11, IE_9] {
            let profile = CapabilityProfile::inspect(&snapshot(ua));
            assert_eq!(profile.browser_name, BrowserName::InternetExplorer);
            assert!(!profile.compatible);
            let err = CapabilityGate::default().evaluate(&snapshot(ua)).unwrap_err();
            assert!(matches!(err, CapabilityError::UnsupportedEnvironment { .. }));
        }
        assert_eq!(CapabilityProfile::inspect(&snapshot(IE_11)).browser_version, Some(11));
        assert_eq!(CapabilityProfile::inspect(&snapshot(IE_9)).browser_version, Some(9));
    }

    #[test]
    fn test_firefox_ios_uses_fallback() {
        let decision = CapabilityGate::default().evaluate(&snapshot(FIREFOX_IOS)).unwrap();
        assert_eq!(decision.profile.browser_name, BrowserName::Firefox);
        assert!(decision.profile.is_mobile);
        assert_eq!(decision.profile.issues, vec![Incompatibility::FirefoxOnIos]);
        assert!(decision.use_fallback());
    }

    #[test]
    fn test_android_chrome_version_threshold() {
        let old = CapabilityProfile::inspect(&snapshot(CHROME_ANDROID_OLD));
        assert_eq!(old.browser_name, BrowserName::Chrome);
        assert_eq!(old.issues, vec![Incompatibility::OutdatedAndroidChrome { version: 85 }]);
        assert!(old.is_mobile);

        let new = CapabilityProfile::inspect(&snapshot(CHROME_ANDROID_NEW));
        assert!(new.compatible);
        assert!(new.is_mobile);
    }

    #[test]
    fn test_old_desktop_chrome_not_flagged() {
        let ua = CHROME_DESKTOP.replace("Chrome/120", "Chrome/80");
        let profile = CapabilityProfile::inspect(&snapshot(&ua));
        assert_eq!(profile.browser_version, Some(80));
        assert!(profile.compatible);
        assert!(!profile.is_mobile);
    }

    #[test]
    fn test_edge_detected_before_chrome() {
        let profile = CapabilityProfile::inspect(&snapshot(EDGE));
        assert_eq!(profile.browser_name, BrowserName::Edge);
        assert_eq!(profile.browser_version, Some(120));
    }

    #[test]
    fn test_webgl_unavailable_uses_fallback() {
        let mut snap = snapshot(CHROME_DESKTOP);
        snap.webgl_available = false;
        let decision = CapabilityGate::default().evaluate(&snap).unwrap();
        assert!(!decision.profile.webgl_supported);
        assert_eq!(decision.profile.issues, vec![Incompatibility::WebGlUnavailable]);
        assert!(decision.use_fallback());
    }

    #[test]
    fn test_low_memory_uses_fallback() {
        let mut snap = snapshot(CHROME_DESKTOP);
        snap.device_memory_gb = Some(1.0);
        let profile = CapabilityProfile::inspect(&snap);
        assert_eq!(profile.issues, vec![Incompatibility::InsufficientMemory { gb: 1.0 }]);

        snap.device_memory_gb = Some(2.0);
        assert!(CapabilityProfile::inspect(&snap).compatible);

        snap.device_memory_gb = None;
        assert!(CapabilityProfile::inspect(&snap).compatible);
    }

    #[test]
    fn test_non_finite_memory_is_unknown() {
        let mut snap = snapshot(CHROME_DESKTOP);
        for bogus in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            snap.device_memory_gb = Some(bogus);
            let profile = CapabilityProfile::inspect(&snap);
            assert_eq!(profile.device_memory_gb, None);
            assert!(profile.compatible, "{bogus} should not decide compatibility");
        }
    }

    #[test]
    fn test_profile_serializes_camel_case() {
        let mut snap = snapshot(SAFARI_12);
        snap.device_memory_gb = Some(4.0);
        let value = serde_json::to_value(CapabilityProfile::inspect(&snap)).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "webglSupported",
            "deviceMemoryGB",
            "isMobile",
            "browserName",
            "browserVersion",
            "compatible",
            "issues",
        ] {
            assert!(obj.contains_key(key), "missing {key} in {value}");
        }
        assert!(!obj.contains_key("webgl_supported"));
        assert_eq!(obj["deviceMemoryGB"], 4.0);
    }

    #[test]
    fn test_multiple_issues_accumulate() {
        let snap = CapabilitySnapshot {
            user_agent: SAFARI_12.to_string(),
            webgl_available: false,
            device_memory_gb: Some(0.5),
        };
        let profile = CapabilityProfile::inspect(&snap);
        assert_eq!(profile.issues.len(), 3);
    }

    #[test]
    fn test_unknown_user_agent() {
        let profile = CapabilityProfile::inspect(&snapshot("curl/8.4.0"));
        assert_eq!(profile.browser_name, BrowserName::Unknown);
        assert_eq!(profile.browser_version, None);
        assert!(profile.compatible);
    }

    #[test]
    fn test_mobile_detection() {
        assert!(is_mobile("Mozilla/5.0 (iPad; CPU OS 15_0 like Mac OS X)"));
        assert!(is_mobile("Opera/9.80 (J2ME/MIDP; Opera Mini/9.80)"));
        assert!(is_mobile("Mozilla/5.0 (BlackBerry; U; BlackBerry 9900)"));
        assert!(!is_mobile(SAFARI_14));
    }

    #[test]
    fn test_major_after() {
        assert_eq!(major_after("Version/12.1.2 Safari", "Version/"), Some(12));
        assert_eq!(major_after("Version/ Safari", "Version/"), None);
        assert_eq!(major_after("Safari", "Version/"), None);
    }
}
