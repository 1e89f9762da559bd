//! Search program construction.
//!
//! The OpenCL template in `search_kernel.cl` is pattern-agnostic; the
//! builder prepends a generated header with the requested prefix/suffix
//! bytes and the case-folding mode, so the device compiler can constant-
//! fold the match test. Every worker in the pool compiles the same
//! source.

use crate::spec::SearchSpec;

static KERNEL_TEMPLATE: &str = include_str!("search_kernel.cl");

/// Build the full kernel source for one search request.
pub fn build_kernel_source(spec: &SearchSpec) -> String {
    let prefix = effective_pattern(spec.prefix(), spec.case_sensitive());
    let suffix = effective_pattern(spec.suffix(), spec.case_sensitive());

    let mut header = String::new();
    header.push_str(&format!("#define PREFIX_LEN {}\n", prefix.len()));
    header.push_str(&format!("#define SUFFIX_LEN {}\n", suffix.len()));
    header.push_str(&format!(
        "#define CASE_SENSITIVE {}\n",
        if spec.case_sensitive() { 1 } else { 0 }
    ));
    header.push_str(&constant_byte_array("PREFIX", &prefix));
    header.push_str(&constant_byte_array("SUFFIX", &suffix));

    format!("{header}\n{KERNEL_TEMPLATE}")
}

fn effective_pattern(pattern: &str, case_sensitive: bool) -> Vec<u8> {
    if case_sensitive {
        pattern.as_bytes().to_vec()
    } else {
        pattern.to_lowercase().into_bytes()
    }
}

// OpenCL C has no zero-length arrays, so a sentinel byte is always
// appended; the *_LEN macros bound every access.
fn constant_byte_array(name: &str, bytes: &[u8]) -> String {
    let mut literal: Vec<String> = bytes.iter().map(|b| b.to_string()).collect();
    literal.push("0".to_string());
    format!(
        "__constant uchar {}[{}] = {{{}}};\n",
        name,
        bytes.len() + 1,
        literal.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(prefix: &str, suffix: &str, case_sensitive: bool) -> SearchSpec {
        SearchSpec::new(prefix, suffix, case_sensitive, 1, 24).unwrap()
    }

    #[test]
    fn test_header_carries_pattern_bytes() {
        let source = build_kernel_source(&spec("AB", "z", true));
        assert!(source.contains("#define PREFIX_LEN 2"));
        assert!(source.contains("#define SUFFIX_LEN 1"));
        assert!(source.contains("#define CASE_SENSITIVE 1"));
        assert!(source.contains("__constant uchar PREFIX[3] = {65, 66, 0};"));
        assert!(source.contains("__constant uchar SUFFIX[2] = {122, 0};"));
    }

    #[test]
    fn test_case_insensitive_patterns_are_folded() {
        let source = build_kernel_source(&spec("AB", "", false));
        assert!(source.contains("#define CASE_SENSITIVE 0"));
        // 'a' = 97, 'b' = 98
        assert!(source.contains("__constant uchar PREFIX[3] = {97, 98, 0};"));
    }

    #[test]
    fn test_empty_side_still_declares_array() {
        let source = build_kernel_source(&spec("", "q", true));
        assert!(source.contains("#define PREFIX_LEN 0"));
        assert!(source.contains("__constant uchar PREFIX[1] = {0};"));
    }

    #[test]
    fn test_template_body_is_appended() {
        let source = build_kernel_source(&spec("a", "", true));
        assert!(source.contains("__kernel void grind"));
    }
}
