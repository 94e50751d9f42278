use serde_json::Value;
use vigil_common::{Finding, FindingSource, Severity};

/// Inspect a browser-extension `manifest.json` (spec.md §4.3
/// "Extension-manifest inspection"). Only `manifest_version` 2 and 3 are
/// recognized; anything else yields no findings.
pub fn scan(content: &str, file: &str) -> Vec<Finding> {
    let Ok(manifest) = serde_json::from_str::<Value>(content) else {
        return Vec::new();
    };
    let version = manifest.get("manifest_version").and_then(Value::as_i64);
    if !matches!(version, Some(2) | Some(3)) {
        return Vec::new();
    }

    let mut findings = Vec::new();
    let permissions = string_array(&manifest, "permissions");
    let host_permissions = string_array(&manifest, "host_permissions");
    let all_permissions: Vec<&str> = permissions
        .iter()
        .chain(host_permissions.iter())
        .map(String::as_str)
        .collect();

    if all_permissions
        .iter()
        .any(|p| *p == "<all_urls>" || is_wildcard_host(p))
    {
        findings.push(finding(
            "EXT_MANIFEST_BROAD_HOST_PERMISSION",
            Severity::Medium,
            file,
            "manifest requests a broad or wildcard host permission".to_string(),
        ));
    }
    if all_permissions.iter().any(|p| *p == "nativeMessaging") {
        findings.push(finding(
            "EXT_MANIFEST_NATIVE_MESSAGING",
            Severity::Critical,
            file,
            "manifest requests nativeMessaging, allowing communication with a local native application".to_string(),
        ));
    }
    if all_permissions.iter().any(|p| *p == "debugger") {
        findings.push(finding(
            "EXT_MANIFEST_DEBUGGER",
            Severity::Critical,
            file,
            "manifest requests the debugger permission, granting full page inspection and control".to_string(),
        ));
    }
    if all_permissions.iter().any(|p| *p == "webRequestBlocking") {
        findings.push(finding(
            "EXT_MANIFEST_WEB_REQUEST_BLOCKING",
            Severity::High,
            file,
            "manifest requests webRequestBlocking, allowing interception and modification of network traffic".to_string(),
        ));
    }
    if all_permissions.iter().any(|p| *p == "proxy") {
        findings.push(finding(
            "EXT_MANIFEST_PROXY",
            Severity::High,
            file,
            "manifest requests the proxy permission, allowing control of the browser's proxy settings".to_string(),
        ));
    }
    if all_permissions.iter().any(|p| *p == "history" || *p == "cookies") {
        findings.push(finding(
            "EXT_MANIFEST_HISTORY_OR_COOKIES",
            Severity::High,
            file,
            "manifest requests access to browsing history or cookies".to_string(),
        ));
    }

    if manifest
        .get("externally_connectable")
        .map(|v| !v.is_null())
        .unwrap_or(false)
    {
        findings.push(finding(
            "EXT_MANIFEST_EXTERNALLY_CONNECTABLE",
            Severity::Medium,
            file,
            "manifest configures externally_connectable, allowing other extensions or sites to message this one".to_string(),
        ));
    }

    if has_broad_web_accessible_resources(&manifest) {
        findings.push(finding(
            "EXT_MANIFEST_BROAD_WEB_ACCESSIBLE_RESOURCES",
            Severity::Medium,
            file,
            "manifest exposes web_accessible_resources to a wildcard or overly broad match pattern".to_string(),
        ));
    }

    if has_unsafe_csp(&manifest) {
        findings.push(finding(
            "EXT_MANIFEST_UNSAFE_CSP",
            Severity::High,
            file,
            "manifest's content security policy allows unsafe-eval or unsafe-inline".to_string(),
        ));
    }

    if let Some(update_url) = manifest.get("update_url").and_then(Value::as_str) {
        if update_url.starts_with("http://") {
            findings.push(finding(
                "EXT_MANIFEST_INSECURE_UPDATE_URL",
                Severity::High,
                file,
                format!("manifest's update_url is served over plain HTTP: {update_url}"),
            ));
        }
    }

    findings
}

fn is_wildcard_host(pattern: &str) -> bool {
    pattern.contains("*://*/") || pattern == "*://*/*" || pattern.starts_with("http://*/")
}

fn string_array(manifest: &Value, key: &str) -> Vec<String> {
    manifest
        .get(key)
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn has_broad_web_accessible_resources(manifest: &Value) -> bool {
    let Some(resources) = manifest.get("web_accessible_resources") else {
        return false;
    };
    let Some(arr) = resources.as_array() else {
        return false;
    };
    arr.iter().any(|entry| match entry {
        // manifest v2: a bare resource-path string list, no match scoping at all.
        Value::String(_) => true,
        // manifest v3: {resources: [...], matches: [...]}
        Value::Object(obj) => obj
            .get("matches")
            .and_then(Value::as_array)
            .map(|matches| {
                matches
                    .iter()
                    .any(|m| m.as_str().map(is_wildcard_host).unwrap_or(false) || m.as_str() == Some("<all_urls>"))
            })
            .unwrap_or(false),
        _ => false,
    })
}

fn has_unsafe_csp(manifest: &Value) -> bool {
    let csp_text = match manifest.get("content_security_policy") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Object(obj)) => obj
            .get("extension_pages")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    };
    csp_text
        .map(|csp| csp.contains("unsafe-eval") || csp.contains("unsafe-inline"))
        .unwrap_or(false)
}

fn finding(rule_id: &str, severity: Severity, file: &str, message: String) -> Finding {
    Finding {
        rule_id: rule_id.to_string(),
        severity,
        message,
        file: file.to_string(),
        line: None,
        category: Some("extension_manifest".to_string()),
        remediation: Some("Confirm this permission is required and scope it as narrowly as possible.".to_string()),
        source: FindingSource::Heuristic,
        confidence: None,
        confidence_reason: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_manifest_version_yields_no_findings() {
        let m = r#"{"name": "x"}"#;
        assert!(scan(m, "/manifest.json").is_empty());
    }

    #[test]
    fn native_messaging_permission_is_critical() {
        let m = r#"{"manifest_version":2,"name":"x","version":"1.0","permissions":["nativeMessaging"]}"#;
        let findings = scan(m, "/manifest.json");
        assert!(findings
            .iter()
            .any(|f| f.rule_id == "EXT_MANIFEST_NATIVE_MESSAGING" && f.severity == Severity::Critical));
    }

    #[test]
    fn debugger_permission_is_critical() {
        let m = r#"{"manifest_version":3,"permissions":["debugger"]}"#;
        let findings = scan(m, "/manifest.json");
        assert!(findings.iter().any(|f| f.rule_id == "EXT_MANIFEST_DEBUGGER"));
    }

    #[test]
    fn all_urls_host_permission_is_flagged() {
        let m = r#"{"manifest_version":3,"host_permissions":["<all_urls>"]}"#;
        let findings = scan(m, "/manifest.json");
        assert!(findings.iter().any(|f| f.rule_id == "EXT_MANIFEST_BROAD_HOST_PERMISSION"));
    }

    #[test]
    fn insecure_update_url_is_flagged() {
        let m = r#"{"manifest_version":2,"update_url":"http://example.com/update.xml"}"#;
        let findings = scan(m, "/manifest.json");
        assert!(findings.iter().any(|f| f.rule_id == "EXT_MANIFEST_INSECURE_UPDATE_URL"));
    }

    #[test]
    fn unsafe_inline_csp_is_flagged() {
        let m = r#"{"manifest_version":2,"content_security_policy":"script-src 'self' 'unsafe-inline'"}"#;
        let findings = scan(m, "/manifest.json");
        assert!(findings.iter().any(|f| f.rule_id == "EXT_MANIFEST_UNSAFE_CSP"));
    }

    #[test]
    fn benign_manifest_has_no_findings() {
        let m = r#"{"manifest_version":3,"name":"ok","version":"1.0","permissions":["storage"]}"#;
        assert!(scan(m, "/manifest.json").is_empty());
    }
}
