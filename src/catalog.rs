// src/catalog.rs
//! Fixed reference data backing the simulated backend and the
//! enrichment engine: finding templates per severity, curated external
//! references keyed by topic, and the catalog of affected-system
//! archetypes.

use crate::models::Severity;

/// Template for a raw finding produced by the simulated backend.
pub struct FindingTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub location: &'static str,
    pub remediation: &'static str,
    pub detailed_remediation: Option<&'static str>,
}

pub const CRITICAL_TEMPLATES: &[FindingTemplate] = &[
    FindingTemplate {
        name: "SQL Injection in login form",
        description: "User-supplied input is concatenated into a SQL statement without sanitization, allowing authentication bypass and data extraction.",
        location: "/auth/login",
        remediation: "Use parameterized queries for all database access.",
        detailed_remediation: Some(
            "Replace string concatenation with prepared statements or an ORM, \
             validate input length and character classes, and apply least-privilege \
             database accounts so a successful injection cannot escalate.",
        ),
    },
    FindingTemplate {
        name: "Remote code execution in file upload handler",
        description: "Uploaded files are stored under the web root and can be requested as executable scripts.",
        location: "/api/upload",
        remediation: "Store uploads outside the web root and validate content types server-side.",
        detailed_remediation: Some(
            "Move the upload directory outside the served tree, rewrite file names, \
             verify magic bytes against the declared content type and serve downloads \
             through a handler that forces a safe disposition.",
        ),
    },
    FindingTemplate {
        name: "Default administrative credentials",
        description: "A management interface accepts the vendor's factory credentials.",
        location: "tcp/8443 management console",
        remediation: "Rotate all default credentials and enforce a password policy.",
        detailed_remediation: None,
    },
];

pub const HIGH_TEMPLATES: &[FindingTemplate] = &[
    FindingTemplate {
        name: "Stored XSS in comment field",
        description: "Persisted markup is rendered unescaped, letting an attacker run script in other users' sessions.",
        location: "/forum/comments",
        remediation: "Encode output and apply a restrictive Content-Security-Policy.",
        detailed_remediation: Some(
            "Escape HTML entities at render time, sanitize stored markup with an \
             allow-list and add a CSP that blocks inline script execution.",
        ),
    },
    FindingTemplate {
        name: "Outdated TLS configuration",
        description: "The server still negotiates TLS 1.0 with weak cipher suites.",
        location: "tcp/443",
        remediation: "Disable legacy protocol versions and weak ciphers.",
        detailed_remediation: None,
    },
    FindingTemplate {
        name: "Privilege escalation via unquoted service path",
        description: "A service executable path containing spaces is unquoted, allowing binary planting.",
        location: "host service configuration",
        remediation: "Quote service binary paths and restrict write access to their directories.",
        detailed_remediation: None,
    },
];

pub const MEDIUM_TEMPLATES: &[FindingTemplate] = &[
    FindingTemplate {
        name: "Missing security headers",
        description: "Responses lack X-Frame-Options and X-Content-Type-Options, easing clickjacking and MIME confusion.",
        location: "HTTP response headers",
        remediation: "Add the standard security headers at the edge or application layer.",
        detailed_remediation: None,
    },
    FindingTemplate {
        name: "Verbose error messages",
        description: "Stack traces with framework versions and file paths are returned to clients.",
        location: "/api/*",
        remediation: "Return generic error pages and log details server-side only.",
        detailed_remediation: None,
    },
    FindingTemplate {
        name: "Session cookie without Secure flag",
        description: "The session cookie may be transmitted over plaintext connections.",
        location: "Set-Cookie: session",
        remediation: "Set the Secure and HttpOnly flags on all session cookies.",
        detailed_remediation: None,
    },
];

pub const LOW_TEMPLATES: &[FindingTemplate] = &[
    FindingTemplate {
        name: "Server version disclosure",
        description: "The Server header reveals the exact software version.",
        location: "HTTP response headers",
        remediation: "Suppress or genericize the Server header.",
        detailed_remediation: None,
    },
    FindingTemplate {
        name: "Directory listing enabled",
        description: "A static assets directory lists its contents when requested directly.",
        location: "/static/",
        remediation: "Disable automatic directory indexes.",
        detailed_remediation: None,
    },
    FindingTemplate {
        name: "ICMP timestamp response",
        description: "The host answers ICMP timestamp requests, leaking its clock.",
        location: "icmp",
        remediation: "Filter ICMP timestamp requests at the perimeter.",
        detailed_remediation: None,
    },
];

pub fn templates_for(severity: Severity) -> &'static [FindingTemplate] {
    match severity {
        Severity::Critical => CRITICAL_TEMPLATES,
        Severity::High => HIGH_TEMPLATES,
        Severity::Medium => MEDIUM_TEMPLATES,
        Severity::Low => LOW_TEMPLATES,
    }
}

/// Curated reference picked when a finding name contains the keyword.
pub struct TopicReference {
    pub keyword: &'static str,
    pub url: &'static str,
    pub title: &'static str,
}

pub const TOPIC_REFERENCES: &[TopicReference] = &[
    TopicReference {
        keyword: "SQL",
        url: "https://owasp.org/www-community/attacks/SQL_Injection",
        title: "OWASP: SQL Injection",
    },
    TopicReference {
        keyword: "XSS",
        url: "https://owasp.org/www-community/attacks/xss/",
        title: "OWASP: Cross Site Scripting",
    },
    TopicReference {
        keyword: "TLS",
        url: "https://wiki.mozilla.org/Security/Server_Side_TLS",
        title: "Mozilla Server Side TLS Guidelines",
    },
    TopicReference {
        keyword: "upload",
        url: "https://owasp.org/www-community/vulnerabilities/Unrestricted_File_Upload",
        title: "OWASP: Unrestricted File Upload",
    },
];

/// Generic vulnerability-database references, each attached independently
/// at a fixed probability.
pub const GENERIC_REFERENCES: &[(&str, &str)] = &[
    ("https://nvd.nist.gov/", "National Vulnerability Database"),
    ("https://cve.mitre.org/", "MITRE CVE List"),
    ("https://www.exploit-db.com/", "Exploit Database"),
];

/// System archetypes a finding can affect.
pub const AFFECTED_SYSTEMS: &[&str] = &[
    "web-frontend",
    "api-gateway",
    "auth-service",
    "database-primary",
    "database-replica",
    "file-storage",
    "internal-admin",
    "load-balancer",
];
