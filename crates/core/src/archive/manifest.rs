//! Manifest defaults and the `META-INF/MANIFEST.MF` text format.

use jarsmith_api::{ApiError, ApiResult, ManifestAttributes, attribute};

pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";
pub const MANIFEST_VERSION: &str = "1.0";

/// Version value build tools report for projects that never set one.
pub const UNSPECIFIED_VERSION: &str = "unspecified";

/// Manifest lines may not exceed this many bytes, line break excluded.
const MAX_LINE_BYTES: usize = 72;

/// Computed values used for attributes the caller left unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestDefaults {
    pub main_class: Option<String>,
    /// Falls back to this tool's own version when unset.
    pub tool_version: Option<String>,
    pub build_jdk: Option<String>,
    pub implementation_title: Option<String>,
    pub implementation_version: Option<String>,
}

/// Version reported under [`attribute::TOOL_VERSION`].
pub fn tool_version() -> String {
    option_env!("CARGO_PKG_VERSION")
        .unwrap_or("unknown")
        .to_string()
}

/// Seed attributes first, then defaults for whatever is still missing.
pub fn configure_manifest(
    seed: &ManifestAttributes,
    defaults: &ManifestDefaults,
) -> ManifestAttributes {
    let mut attributes = seed.clone();

    if let Some(main_class) = &defaults.main_class {
        attributes.put_if_absent(attribute::MAIN_CLASS, main_class.as_str());
    }
    attributes.compute_if_absent(attribute::TOOL_VERSION, || {
        defaults.tool_version.clone().unwrap_or_else(tool_version)
    });
    if let Some(jdk) = &defaults.build_jdk {
        attributes.put_if_absent(attribute::BUILD_JDK, jdk.as_str());
    }
    if let Some(title) = &defaults.implementation_title {
        attributes.put_if_absent(attribute::IMPLEMENTATION_TITLE, title.as_str());
    }
    if let Some(version) = &defaults.implementation_version {
        if version != UNSPECIFIED_VERSION {
            attributes.put_if_absent(attribute::IMPLEMENTATION_VERSION, version.as_str());
        }
    }

    attributes
}

/// Renders the main section. `Manifest-Version` always comes first.
pub fn write_manifest(attributes: &ManifestAttributes) -> ApiResult<Vec<u8>> {
    attributes.validate()?;

    let mut out = Vec::new();
    let version = attributes
        .get(attribute::MANIFEST_VERSION)
        .unwrap_or(MANIFEST_VERSION);
    write_header(&mut out, attribute::MANIFEST_VERSION, version);
    for (name, value) in attributes.iter() {
        if name.eq_ignore_ascii_case(attribute::MANIFEST_VERSION) {
            continue;
        }
        write_header(&mut out, name, value);
    }
    out.extend_from_slice(b"\r\n");
    Ok(out)
}

fn write_header(out: &mut Vec<u8>, name: &str, value: &str) {
    let line = format!("{}: {}", name, value);
    let mut rest = line.as_str();
    let mut budget = MAX_LINE_BYTES;
    loop {
        if rest.len() <= budget {
            out.extend_from_slice(rest.as_bytes());
            out.extend_from_slice(b"\r\n");
            return;
        }
        // Never split a multi-byte character across lines
        let mut cut = budget;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        out.extend_from_slice(rest[..cut].as_bytes());
        out.extend_from_slice(b"\r\n ");
        rest = &rest[cut..];
        budget = MAX_LINE_BYTES - 1;
    }
}

/// Parses the main section of a manifest.
pub fn parse_manifest(bytes: &[u8]) -> ApiResult<ManifestAttributes> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| ApiError::InvalidManifest(format!("not UTF-8: {}", e)))?;

    let mut logical: Vec<String> = Vec::new();
    for line in text.split("\r\n").flat_map(|l| l.split('\n')) {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            // End of the main section
            break;
        }
        if let Some(continuation) = line.strip_prefix(' ') {
            let last = logical.last_mut().ok_or_else(|| {
                ApiError::InvalidManifest("continuation line without a header".to_string())
            })?;
            last.push_str(continuation);
        } else {
            logical.push(line.to_string());
        }
    }

    let mut attributes = ManifestAttributes::new();
    for line in logical {
        let (name, value) = line.split_once(": ").ok_or_else(|| {
            ApiError::InvalidManifest(format!("malformed header line '{}'", line))
        })?;
        attributes.insert(name, value);
    }
    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> ManifestDefaults {
        ManifestDefaults {
            main_class: Some("com.example.Default".to_string()),
            tool_version: Some("9.9.9".to_string()),
            build_jdk: Some("17".to_string()),
            implementation_title: Some("demo".to_string()),
            implementation_version: Some("1.2.3".to_string()),
        }
    }

    #[test]
    fn test_seeded_main_class_wins() {
        let mut seed = ManifestAttributes::new();
        seed.insert(attribute::MAIN_CLASS, "com.example.Launcher");

        let manifest = configure_manifest(&seed, &defaults());
        assert_eq!(manifest.get(attribute::MAIN_CLASS), Some("com.example.Launcher"));
        assert_eq!(manifest.get(attribute::BUILD_JDK), Some("17"));
        assert_eq!(manifest.get(attribute::TOOL_VERSION), Some("9.9.9"));
    }

    #[test]
    fn test_defaults_fill_in_fixed_order() {
        let manifest = configure_manifest(&ManifestAttributes::new(), &defaults());
        let names: Vec<_> = manifest.iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec![
                attribute::MAIN_CLASS,
                attribute::TOOL_VERSION,
                attribute::BUILD_JDK,
                attribute::IMPLEMENTATION_TITLE,
                attribute::IMPLEMENTATION_VERSION,
            ]
        );
    }

    #[test]
    fn test_unspecified_version_is_not_written() {
        let mut d = defaults();
        d.implementation_version = Some(UNSPECIFIED_VERSION.to_string());
        let manifest = configure_manifest(&ManifestAttributes::new(), &d);
        assert!(!manifest.contains(attribute::IMPLEMENTATION_VERSION));

        d.implementation_version = Some("unspecified-1".to_string());
        let manifest = configure_manifest(&ManifestAttributes::new(), &d);
        assert_eq!(
            manifest.get(attribute::IMPLEMENTATION_VERSION),
            Some("unspecified-1")
        );
    }

    #[test]
    fn test_tool_version_falls_back_to_crate_version() {
        let manifest = configure_manifest(&ManifestAttributes::new(), &ManifestDefaults::default());
        assert_eq!(
            manifest.get(attribute::TOOL_VERSION),
            Some(env!("CARGO_PKG_VERSION"))
        );
        assert!(!manifest.contains(attribute::MAIN_CLASS));
    }

    #[test]
    fn test_manifest_version_leads() {
        let mut attrs = ManifestAttributes::new();
        attrs.insert(attribute::MAIN_CLASS, "a.B");
        let text = String::from_utf8(write_manifest(&attrs).unwrap()).unwrap();
        assert_eq!(text, "Manifest-Version: 1.0\r\nMain-Class: a.B\r\n\r\n");
    }

    #[test]
    fn test_long_lines_wrap_at_72_bytes() {
        let value = "x".repeat(150);
        let mut attrs = ManifestAttributes::new();
        attrs.insert("Class-Path", value.as_str());
        let bytes = write_manifest(&attrs).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();

        for line in text.split("\r\n") {
            assert!(line.len() <= 72, "line too long: {}", line.len());
        }
        let parsed = parse_manifest(&bytes).unwrap();
        assert_eq!(parsed.get("Class-Path"), Some(value.as_str()));
    }

    #[test]
    fn test_wrapping_respects_char_boundaries() {
        let value = "é".repeat(60);
        let mut attrs = ManifestAttributes::new();
        attrs.insert("Implementation-Title", value.as_str());
        let bytes = write_manifest(&attrs).unwrap();
        let parsed = parse_manifest(&bytes).unwrap();
        assert_eq!(parsed.get("Implementation-Title"), Some(value.as_str()));
    }

    #[test]
    fn test_parse_rejects_orphan_continuation() {
        assert!(parse_manifest(b" orphan\r\n").is_err());
    }
}
