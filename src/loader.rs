use sha2::{Digest, Sha256};
use tracing::warn;

use crate::error::ParseError;
use crate::parser;
use crate::types::{Policy, SkippedPolicy};

/// Policies compiled from a batch of independent texts.
#[derive(Debug)]
pub(crate) struct CompiledBatch {
    pub policies: Vec<Policy>,
    pub skipped: Vec<SkippedPolicy>,
    pub hash: String,
}

/// Compile a document holding any number of policies.
///
/// Example:
/// ```rust
/// use sentinela_core::compile_policies;
/// let policy_text = r#"
///     permit (principal, action, resource);
///     forbid (principal == User::"evil", action, resource);
/// "#;
/// let policies = compile_policies(policy_text).unwrap();
/// assert_eq!(policies.len(), 2);
/// ```
pub fn compile_policies(text: &str) -> Result<Vec<Policy>, ParseError> {
    parser::parse_document(text)
}

/// Compile each text on its own. Texts that fail to parse are skipped and
/// reported; they never affect the others.
pub(crate) fn compile_batch<I, S>(texts: I) -> CompiledBatch
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut hasher = Sha256::new();
    let mut policies: Vec<Policy> = Vec::new();
    let mut skipped = Vec::new();

    for (i, text) in texts.into_iter().enumerate() {
        let text = text.as_ref();
        let index = i + 1;
        // Length-prefixed so that ["ab", "c"] and ["a", "bc"] hash differently.
        hasher.update((text.len() as u64).to_le_bytes());
        hasher.update(text.as_bytes());

        match parser::parse_nth(text, index) {
            Ok(policy) => {
                if policies.iter().any(|p| p.name() == policy.name()) {
                    warn!(
                        event = "Load",
                        phase = "Compile",
                        index,
                        policy = policy.name(),
                        "duplicate policy name"
                    );
                }
                policies.push(policy);
            }
            Err(error) => {
                warn!(
                    event = "Load",
                    phase = "Compile",
                    index,
                    line = error.line,
                    column = error.column,
                    error = error.message.as_str(),
                    "skipping policy that failed to parse"
                );
                skipped.push(SkippedPolicy { index, error });
            }
        }
    }

    CompiledBatch {
        policies,
        skipped,
        hash: format!("{:x}", hasher.finalize()),
    }
}

/// SHA-256 of a single policy document.
pub(crate) fn document_hash(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}
