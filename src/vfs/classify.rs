//! Security classification of requested paths.
//!
//! A pure decision over path shape — never over prior state — with an
//! explicit precedence. The ordering is a contract: traversal always
//! wins, and a passwd-named file under a disallowed prefix is still
//! `synthetic_sensitive` because the credential rule precedes the
//! prefix rule.

use crate::vfs::{ReadResult, VirtualFs, has_traversal, normalize};

/// Sentinel returned for traversal and disallowed-prefix requests.
pub const TRAVERSAL_SENTINEL: &str = "[snare: access blocked by policy]";

/// Sentinel returned for private-key-shaped paths.
pub const REDACTED_SENTINEL: &str = "[snare: key material redacted]";

/// Watermark embedded at both ends of synthetic sensitive payloads so
/// the content can never be mistaken for real data.
pub const WATERMARK: &str = "SNARE-SYNTHETIC-DATA";

/// Allowed path prefixes when no explicit policy is configured.
pub const DEFAULT_ALLOWED_PREFIXES: &[&str] = &["/docs", "/home/user", "/safe", "/tmp"];

/// Security class assigned to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Ordinary file; literal content is returned.
    Benign,
    /// Credential-shaped path; watermarked synthetic content is returned.
    SyntheticSensitive,
    /// Denied; a fixed sentinel is returned.
    Blocked,
}

impl Classification {
    /// Wire tag used in tool results and log events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Benign => "benign",
            Self::SyntheticSensitive => "synthetic_sensitive",
            Self::Blocked => "blocked",
        }
    }
}

/// Why a path was refused (or flagged), used to pick the log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// Literal `..` segment detected.
    Traversal,
    /// Private-key pattern matched.
    SensitiveKey,
    /// Path falls outside every allowed prefix.
    OutsidePrefix,
    /// Path names a directory marker, not a file.
    IsDirectory,
    /// Path is absent from the filesystem.
    NotFound,
}

impl BlockReason {
    /// Wire tag used in policy log events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Traversal => "traversal",
            Self::SensitiveKey => "sensitive_key",
            Self::OutsidePrefix => "outside_prefix",
            Self::IsDirectory => "is_directory",
            Self::NotFound => "not_found",
        }
    }
}

/// Outcome of classifying a single read request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Assigned security class.
    pub classification: Classification,
    /// Canonical content for the response.
    pub content: String,
    /// Refusal reason, `None` for benign reads.
    pub reason: Option<BlockReason>,
}

/// Classifies a requested path and produces its canonical content.
///
/// Precedence (first match wins):
/// 1. traversal → blocked, traversal sentinel
/// 2. credential pattern → synthetic sensitive, watermarked payload
/// 3. private-key pattern → blocked, redaction sentinel
/// 4. outside allowed prefixes → blocked, traversal sentinel
/// 5. VFS lookup: file → benign; directory/absent → blocked with a
///    distinct not-found / is-directory message
#[must_use]
pub fn classify(path: &str, fs: &VirtualFs, allowed_prefixes: &[&str]) -> Verdict {
    if has_traversal(path) {
        return Verdict {
            classification: Classification::Blocked,
            content: TRAVERSAL_SENTINEL.to_string(),
            reason: Some(BlockReason::Traversal),
        };
    }

    let normalized = normalize(path);

    if is_credential_path(&normalized) {
        return Verdict {
            classification: Classification::SyntheticSensitive,
            content: synthetic_passwd(),
            reason: None,
        };
    }

    if is_private_key_path(&normalized) {
        return Verdict {
            classification: Classification::Blocked,
            content: REDACTED_SENTINEL.to_string(),
            reason: Some(BlockReason::SensitiveKey),
        };
    }

    let allowed = allowed_prefixes
        .iter()
        .any(|p| normalized == *p || normalized.starts_with(&format!("{p}/")));
    if !allowed {
        return Verdict {
            classification: Classification::Blocked,
            content: TRAVERSAL_SENTINEL.to_string(),
            reason: Some(BlockReason::OutsidePrefix),
        };
    }

    match fs.read(&normalized) {
        ReadResult::File(content) => Verdict {
            classification: Classification::Benign,
            content,
            reason: None,
        },
        ReadResult::Directory => Verdict {
            classification: Classification::Blocked,
            content: format!("{normalized} is a directory"),
            reason: Some(BlockReason::IsDirectory),
        },
        ReadResult::Missing => Verdict {
            classification: Classification::Blocked,
            content: format!("{normalized} not found"),
            reason: Some(BlockReason::NotFound),
        },
    }
}

/// Matches `passwd`-suffixed paths and the exact shadow file.
fn is_credential_path(normalized: &str) -> bool {
    normalized.ends_with("passwd") || normalized == "/etc/shadow"
}

/// Matches private-key-shaped paths by substring.
fn is_private_key_path(normalized: &str) -> bool {
    normalized.contains("id_rsa")
        || normalized.contains(".ssh")
        || normalized.contains("private_key")
}

/// Builds the fixed watermarked passwd payload.
///
/// The watermark appears at both head and tail so truncated captures
/// are still recognizable as synthetic.
#[must_use]
pub fn synthetic_passwd() -> String {
    format!(
        "{WATERMARK}\n\
         root:x:0:0:root:/root:/bin/bash\n\
         daemon:x:1:1:daemon:/usr/sbin:/usr/sbin/nologin\n\
         canary:x:4242:4242:snare canary account:/home/canary:/bin/false\n\
         {WATERMARK}"
    )
}
