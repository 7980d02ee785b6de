//! Type contract extraction: `interface X { … }` and `type X = { … }`
//! top-level field-name lists.

use std::sync::OnceLock;

use regex::Regex;

use vibecheck_core::types::truthpack::ContractType;
use vibecheck_core::FxHashMap;

use crate::drift::source::SourceFile;

fn type_head() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?m)^\s*(?:export\s+)?(?:interface\s+([A-Za-z_$][A-Za-z0-9_$]*)(?:\s+extends\s+[^{]+)?|type\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*=)\s*\{",
        )
        .unwrap()
    })
}

fn field_name() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^\s*(?:readonly\s+)?([A-Za-z_$][A-Za-z0-9_$]*)\??\s*[:(]").unwrap()
    })
}

/// Body text of the brace block starting at `open`, with nested blocks
/// blanked so only depth-1 fields survive the field regex.
fn depth_one_body(content: &str, open: usize) -> Option<String> {
    let bytes = content.as_bytes();
    let mut depth = 0usize;
    let mut body = String::new();
    for &byte in bytes.iter().skip(open) {
        match byte {
            b'{' => {
                depth += 1;
                if depth > 1 {
                    body.push(' ');
                }
            }
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(body);
                }
                body.push(' ');
            }
            _ => {
                if depth == 1 {
                    body.push(byte as char);
                } else {
                    // Blank nested content but keep line structure.
                    body.push(if byte == b'\n' { '\n' } else { ' ' });
                }
            }
        }
    }
    None
}

/// Extract every named type with its sorted top-level field names.
/// The first definition of a name wins across files.
pub fn extract_types(sources: &[SourceFile]) -> Vec<ContractType> {
    let mut types: FxHashMap<String, ContractType> = FxHashMap::default();

    for source in sources {
        let extension = source.rel_path.rsplit('.').next().unwrap_or("");
        if !matches!(extension, "ts" | "tsx") {
            continue;
        }
        for captures in type_head().captures_iter(&source.content) {
            let name = captures
                .get(1)
                .or_else(|| captures.get(2))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            if name.is_empty() || types.contains_key(&name) {
                continue;
            }
            let open = captures.get(0).map(|m| m.end() - 1).unwrap_or(0);
            let Some(body) = depth_one_body(&source.content, open) else {
                continue;
            };
            let mut fields: Vec<String> = field_name()
                .captures_iter(&body)
                .map(|c| c[1].to_string())
                .collect();
            fields.sort();
            fields.dedup();
            types.insert(
                name.clone(),
                ContractType {
                    name,
                    schema: fields,
                },
            );
        }
    }

    let mut result: Vec<ContractType> = types.into_values().collect();
    result.sort_by(|a, b| a.name.cmp(&b.name));
    result
}
