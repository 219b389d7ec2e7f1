use serde::{Deserialize, Serialize};

/// A class of bypass test. Outcomes for each kind are simulated; the
/// technique names are labels and nothing runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BypassTestKind {
    RootDetection,
    SslPinning,
    AntiDebug,
    Tampering,
}

impl BypassTestKind {
    pub const ALL: [BypassTestKind; 4] = [
        BypassTestKind::RootDetection,
        BypassTestKind::SslPinning,
        BypassTestKind::AntiDebug,
        BypassTestKind::Tampering,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BypassTestKind::RootDetection => "root_detection",
            BypassTestKind::SslPinning => "ssl_pinning",
            BypassTestKind::AntiDebug => "anti_debug",
            BypassTestKind::Tampering => "tampering",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BypassTestKind::RootDetection => "Root Detection Bypass",
            BypassTestKind::SslPinning => "SSL Pinning Bypass",
            BypassTestKind::AntiDebug => "Anti-Debug Bypass",
            BypassTestKind::Tampering => "Tampering Detection Bypass",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BypassTestKind::RootDetection => "Tests common root detection bypass techniques",
            BypassTestKind::SslPinning => "Tests certificate pinning bypass methods",
            BypassTestKind::AntiDebug => "Tests anti-debugging bypass techniques",
            BypassTestKind::Tampering => "Tests app integrity bypass methods",
        }
    }

    pub fn techniques(&self) -> &'static [&'static str] {
        match self {
            BypassTestKind::RootDetection => &["Magisk Hide", "RootCloak", "Frida Scripts"],
            BypassTestKind::SslPinning => &["Frida SSL Kill Switch", "objection", "Manual patching"],
            BypassTestKind::AntiDebug => {
                &["ptrace patching", "Frida anti-anti-debug", "Native hooks"]
            }
            BypassTestKind::Tampering => {
                &["Signature bypass", "Hash modification", "Runtime patching"]
            }
        }
    }

    /// Scales the category base rate; lower means harder to get past.
    pub fn difficulty_modifier(&self) -> f64 {
        match self {
            BypassTestKind::RootDetection => 0.8,
            BypassTestKind::SslPinning => 0.6,
            BypassTestKind::AntiDebug => 0.4,
            BypassTestKind::Tampering => 0.3,
        }
    }

    pub fn notes(&self, successful: bool) -> &'static str {
        match (self, successful) {
            (BypassTestKind::RootDetection, true) => {
                "Root detection bypassed using Magisk Hide. App failed to detect rooted environment."
            }
            (BypassTestKind::RootDetection, false) => {
                "Strong root detection implementation. Multiple bypass attempts failed."
            }
            (BypassTestKind::SslPinning, true) => {
                "SSL pinning bypassed successfully. Certificate validation was circumvented."
            }
            (BypassTestKind::SslPinning, false) => {
                "Robust SSL pinning implementation detected and blocked bypass attempts."
            }
            (BypassTestKind::AntiDebug, true) => {
                "Anti-debugging measures bypassed. Debugger attachment successful."
            }
            (BypassTestKind::AntiDebug, false) => {
                "Advanced anti-debugging protection active. Debugger detection effective."
            }
            (BypassTestKind::Tampering, true) => {
                "App integrity checks bypassed. Runtime modifications successful."
            }
            (BypassTestKind::Tampering, false) => {
                "Strong tampering detection. App detected unauthorized modifications."
            }
        }
    }
}

impl std::fmt::Display for BypassTestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BypassOutcome {
    pub kind: BypassTestKind,
    pub name: String,
    pub description: String,
    pub bypass_successful: bool,
    pub success_rate: f64,
    pub techniques_tested: Vec<String>,
    pub successful_techniques: Vec<String>,
    pub execution_time_secs: f64,
    pub notes: String,
}
