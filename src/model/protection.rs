use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A protection mechanism or commercial hardening product.
///
/// Variant order is catalog order and is used to break ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Protection {
    #[serde(rename = "Promon SHIELD")]
    PromonShield,
    #[serde(rename = "Arxan")]
    Arxan,
    #[serde(rename = "Irdeto")]
    Irdeto,
    #[serde(rename = "Verimatrix")]
    Verimatrix,
    #[serde(rename = "Inside Secure")]
    InsideSecure,
    #[serde(rename = "Root Detection")]
    RootDetection,
    #[serde(rename = "SSL Pinning")]
    SslPinning,
    #[serde(rename = "Anti Debug")]
    AntiDebug,
    #[serde(rename = "Obfuscation")]
    Obfuscation,
}

impl Protection {
    pub const ALL: [Protection; 9] = [
        Protection::PromonShield,
        Protection::Arxan,
        Protection::Irdeto,
        Protection::Verimatrix,
        Protection::InsideSecure,
        Protection::RootDetection,
        Protection::SslPinning,
        Protection::AntiDebug,
        Protection::Obfuscation,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Protection::PromonShield => "Promon SHIELD",
            Protection::Arxan => "Arxan",
            Protection::Irdeto => "Irdeto",
            Protection::Verimatrix => "Verimatrix",
            Protection::InsideSecure => "Inside Secure",
            Protection::RootDetection => "Root Detection",
            Protection::SslPinning => "SSL Pinning",
            Protection::AntiDebug => "Anti Debug",
            Protection::Obfuscation => "Obfuscation",
        }
    }

    /// Lower-case substrings that identify this protection in an indicator.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Protection::PromonShield => &["promon", "shield", "com.promon"],
            Protection::Arxan => &["arxan", "guardit"],
            Protection::Irdeto => &["irdeto", "cloakware"],
            Protection::Verimatrix => &["verimatrix", "vcas"],
            Protection::InsideSecure => &["insidesecure", "teegris"],
            Protection::RootDetection => &["rootbeer", "rootdetection", "safetynet"],
            Protection::SslPinning => &["pinning", "certificate", "trustmanager"],
            Protection::AntiDebug => &["antidebug", "debugger", "ptrace"],
            Protection::Obfuscation => &["obfuscation", "proguard", "dexguard"],
        }
    }

    /// Whether this entry is a commercial hardening vendor rather than a
    /// single in-house control.
    pub fn is_commercial(&self) -> bool {
        matches!(
            self,
            Protection::PromonShield
                | Protection::Arxan
                | Protection::Irdeto
                | Protection::Verimatrix
                | Protection::InsideSecure
        )
    }

    pub fn commercial_vendors() -> impl Iterator<Item = Protection> {
        Self::ALL.into_iter().filter(|p| p.is_commercial())
    }

    pub fn implied_features(&self) -> &'static [&'static str] {
        match self {
            Protection::RootDetection => &["SafetyNet", "RootBeer checks"],
            Protection::SslPinning => &["Certificate pinning", "TrustManager override"],
            Protection::AntiDebug => &["Debugger detection", "Frida detection"],
            Protection::PromonShield => &["Runtime protection", "Advanced obfuscation"],
            _ => &[],
        }
    }
}

impl std::fmt::Display for Protection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for Protection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.display_name().to_lowercase() == wanted)
            .ok_or_else(|| format!("Unknown protection: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObfuscationLevel {
    None,
    Basic,
    Moderate,
    Advanced,
}

impl ObfuscationLevel {
    pub const ALL: [ObfuscationLevel; 4] = [
        ObfuscationLevel::None,
        ObfuscationLevel::Basic,
        ObfuscationLevel::Moderate,
        ObfuscationLevel::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObfuscationLevel::None => "None",
            ObfuscationLevel::Basic => "Basic",
            ObfuscationLevel::Moderate => "Moderate",
            ObfuscationLevel::Advanced => "Advanced",
        }
    }
}

/// How a [`ProtectionProfile`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    Simulated,
    Signature,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtectionProfile {
    pub detected: Vec<Protection>,
    pub confidence: BTreeMap<Protection, f64>,
    pub features: Vec<String>,
    pub obfuscation: ObfuscationLevel,
    pub method: DetectionMethod,
    pub notes: String,
}

impl ProtectionProfile {
    pub fn has(&self, protection: Protection) -> bool {
        self.detected.contains(&protection)
    }

    pub fn is_unprotected(&self) -> bool {
        self.detected.is_empty()
    }

    pub fn has_commercial_vendor(&self) -> bool {
        self.detected.iter().any(|p| p.is_commercial())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commercial_vendors() {
        let vendors: Vec<_> = Protection::commercial_vendors().collect();
        assert_eq!(vendors.len(), 5);
        assert_eq!(vendors[0], Protection::PromonShield);
        assert!(!Protection::RootDetection.is_commercial());
    }

    #[test]
    fn test_protection_from_str() {
        assert_eq!("promon shield".parse::<Protection>(), Ok(Protection::PromonShield));
        assert_eq!("SSL Pinning".parse::<Protection>(), Ok(Protection::SslPinning));
        assert!("Magic Shield".parse::<Protection>().is_err());
    }

    #[test]
    fn test_protection_serializes_as_display_name() {
        let json = serde_json::to_string(&Protection::PromonShield).unwrap();
        assert_eq!(json, "\"Promon SHIELD\"");
    }

    #[test]
    fn test_confidence_map_round_trips_as_json_object() {
        let mut confidence = BTreeMap::new();
        confidence.insert(Protection::RootDetection, 0.8);
        let json = serde_json::to_string(&confidence).unwrap();
        assert_eq!(json, r#"{"Root Detection":0.8}"#);
    }
}
