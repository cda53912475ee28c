//! A small RFC 4512 §4.1 descriptor string reader.
//!
//! This is deliberately minimal — field-at-a-time token scanning rather
//! than a full grammar — because descriptor parsing is an external
//! collaborator per the core's contract (see SPEC_FULL.md §3.1). It exists
//! so the crate is directly usable without requiring callers to hand-build
//! typed descriptors themselves.

use base64::Engine;

use crate::entity::{AttributeUsage, Implementation, ObjectClassKind};

/// A parsed `AttributeTypeDescription`, not yet resolved against any
/// registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAttributeType {
    pub oid: String,
    pub names: Vec<String>,
    pub description: Option<String>,
    pub obsolete: bool,
    pub superior_oid: Option<String>,
    pub equality_oid: Option<String>,
    pub ordering_oid: Option<String>,
    pub substring_oid: Option<String>,
    pub syntax_oid: Option<String>,
    pub single_valued: bool,
    pub collective: bool,
    pub no_user_modification: bool,
    pub usage: AttributeUsage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedObjectClass {
    pub oid: String,
    pub names: Vec<String>,
    pub description: Option<String>,
    pub obsolete: bool,
    pub superior_oids: Vec<String>,
    pub kind: ObjectClassKind,
    pub must: Vec<String>,
    pub may: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMatchingRule {
    pub oid: String,
    pub names: Vec<String>,
    pub description: Option<String>,
    pub obsolete: bool,
    pub syntax_oid: String,
    /// `X-NORMALIZER '...'` — not part of RFC 4512 proper, but every
    /// directory implementation needs some way to name the normalizer a
    /// matching rule uses; modeled the same way `M-FQCN` extends the
    /// extensible-object descriptors in §6.
    pub normalizer_oid: Option<String>,
    pub comparator_oid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSyntax {
    pub oid: String,
    pub description: Option<String>,
    pub syntax_checker_oid: Option<String>,
    pub human_readable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMatchingRuleUse {
    pub oid: String,
    pub names: Vec<String>,
    pub description: Option<String>,
    pub obsolete: bool,
    pub applies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDitContentRule {
    pub oid: String,
    pub names: Vec<String>,
    pub description: Option<String>,
    pub obsolete: bool,
    pub aux: Vec<String>,
    pub must: Vec<String>,
    pub may: Vec<String>,
    pub not: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDitStructureRule {
    pub rule_id: u32,
    pub names: Vec<String>,
    pub description: Option<String>,
    pub obsolete: bool,
    pub name_form: String,
    pub superiors: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNameForm {
    pub oid: String,
    pub names: Vec<String>,
    pub description: Option<String>,
    pub obsolete: bool,
    pub object_class: String,
    pub must: Vec<String>,
    pub may: Vec<String>,
}

/// A parsed extensible-object descriptor, shared by normalizers,
/// comparators and syntax checkers — all three carry the same
/// `M-FQCN` / `M-BYTECODE` extensions (spec §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedExtensible {
    pub oid: String,
    pub description: Option<String>,
    pub implementation: Implementation,
}

fn strip_parens(def: &str) -> Option<&str> {
    let def = def.trim();
    let def = def.strip_prefix('(')?.strip_suffix(')')?;
    Some(def.trim())
}

/// Parse NAME field — can be `'single'` or `( 'multiple' 'names' )`.
fn parse_names(s: &str) -> Vec<String> {
    if let Some(pos) = s.find("NAME") {
        let rest = s[pos + 4..].trim_start();
        if let Some(rest) = rest.strip_prefix('(') {
            if let Some(end) = rest.find(')') {
                return rest[..end]
                    .split('\'')
                    .filter(|s| !s.trim().is_empty())
                    .map(|s| s.to_string())
                    .collect();
            }
        } else if let Some(rest) = rest.strip_prefix('\'') {
            if let Some(end) = rest.find('\'') {
                return vec![rest[..end].to_string()];
            }
        }
    }
    Vec::new()
}

fn parse_quoted_field(s: &str, keyword: &str) -> Option<String> {
    let pattern = format!("{} '", keyword);
    let pos = s.find(&pattern)?;
    let rest = &s[pos + pattern.len()..];
    let end = rest.find('\'')?;
    Some(rest[..end].to_string())
}

/// Parse an unquoted field value: `KEYWORD value`, terminated by whitespace.
/// Strips a trailing `{n}` length constraint, e.g. `SYNTAX 1.2.3{64}`.
fn parse_unquoted_field(s: &str, keyword: &str) -> Option<String> {
    let pattern = format!("{} ", keyword);
    let pos = s.find(&pattern)?;
    let rest = s[pos + pattern.len()..].trim_start();
    let token = rest.split_whitespace().next()?;
    let val = token.split('{').next().unwrap_or(token);
    if val.is_empty() {
        None
    } else {
        Some(val.to_string())
    }
}

/// Parse an OID/name list: `KEYWORD ( a $ b )` or `KEYWORD a`.
fn parse_oid_list(s: &str, keyword: &str) -> Vec<String> {
    let pattern = format!("{} ", keyword);
    let Some(pos) = s.find(&pattern) else {
        return Vec::new();
    };
    let rest = s[pos + pattern.len()..].trim_start();
    if let Some(rest) = rest.strip_prefix('(') {
        if let Some(end) = rest.find(')') {
            return rest[..end]
                .split('$')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        Vec::new()
    } else {
        rest.split_whitespace()
            .next()
            .map(|v| vec![v.to_string()])
            .unwrap_or_default()
    }
}

fn has_keyword(s: &str, keyword: &str) -> bool {
    s.split_whitespace().any(|tok| tok == keyword)
}

pub fn parse_attribute_type(def: &str) -> Option<ParsedAttributeType> {
    let inner = strip_parens(def)?;
    let oid = inner.split_whitespace().next()?.to_string();

    let usage = parse_unquoted_field(inner, "USAGE")
        .and_then(|s| s.parse::<AttributeUsage>().ok())
        .unwrap_or(AttributeUsage::UserApplications);

    Some(ParsedAttributeType {
        oid,
        names: parse_names(inner),
        description: parse_quoted_field(inner, "DESC"),
        obsolete: has_keyword(inner, "OBSOLETE"),
        superior_oid: parse_unquoted_field(inner, "SUP"),
        equality_oid: parse_unquoted_field(inner, "EQUALITY"),
        ordering_oid: parse_unquoted_field(inner, "ORDERING"),
        substring_oid: parse_unquoted_field(inner, "SUBSTR"),
        syntax_oid: parse_unquoted_field(inner, "SYNTAX"),
        single_valued: has_keyword(inner, "SINGLE-VALUE"),
        collective: has_keyword(inner, "COLLECTIVE"),
        no_user_modification: has_keyword(inner, "NO-USER-MODIFICATION"),
        usage,
    })
}

pub fn parse_object_class(def: &str) -> Option<ParsedObjectClass> {
    let inner = strip_parens(def)?;
    let oid = inner.split_whitespace().next()?.to_string();

    let kind = if has_keyword(inner, "ABSTRACT") {
        ObjectClassKind::Abstract
    } else if has_keyword(inner, "AUXILIARY") {
        ObjectClassKind::Auxiliary
    } else {
        ObjectClassKind::Structural
    };

    Some(ParsedObjectClass {
        oid,
        names: parse_names(inner),
        description: parse_quoted_field(inner, "DESC"),
        obsolete: has_keyword(inner, "OBSOLETE"),
        superior_oids: parse_oid_list(inner, "SUP"),
        kind,
        must: parse_oid_list(inner, "MUST"),
        may: parse_oid_list(inner, "MAY"),
    })
}

pub fn parse_matching_rule(def: &str) -> Option<ParsedMatchingRule> {
    let inner = strip_parens(def)?;
    let oid = inner.split_whitespace().next()?.to_string();
    let syntax_oid = parse_unquoted_field(inner, "SYNTAX")?;

    Some(ParsedMatchingRule {
        oid,
        names: parse_names(inner),
        description: parse_quoted_field(inner, "DESC"),
        obsolete: has_keyword(inner, "OBSOLETE"),
        syntax_oid,
        normalizer_oid: parse_unquoted_field(inner, "X-NORMALIZER"),
        comparator_oid: parse_unquoted_field(inner, "X-COMPARATOR"),
    })
}

pub fn parse_syntax(def: &str) -> Option<ParsedSyntax> {
    let inner = strip_parens(def)?;
    let oid = inner.split_whitespace().next()?.to_string();
    let human_readable = parse_quoted_field(inner, "X-NOT-HUMAN-READABLE")
        .map(|v| !v.eq_ignore_ascii_case("true"))
        .unwrap_or(true);

    Some(ParsedSyntax {
        oid,
        description: parse_quoted_field(inner, "DESC"),
        syntax_checker_oid: parse_unquoted_field(inner, "X-SYNTAX-CHECKER"),
        human_readable,
    })
}

pub fn parse_matching_rule_use(def: &str) -> Option<ParsedMatchingRuleUse> {
    let inner = strip_parens(def)?;
    let oid = inner.split_whitespace().next()?.to_string();
    Some(ParsedMatchingRuleUse {
        oid,
        names: parse_names(inner),
        description: parse_quoted_field(inner, "DESC"),
        obsolete: has_keyword(inner, "OBSOLETE"),
        applies: parse_oid_list(inner, "APPLIES"),
    })
}

pub fn parse_dit_content_rule(def: &str) -> Option<ParsedDitContentRule> {
    let inner = strip_parens(def)?;
    let oid = inner.split_whitespace().next()?.to_string();
    Some(ParsedDitContentRule {
        oid,
        names: parse_names(inner),
        description: parse_quoted_field(inner, "DESC"),
        obsolete: has_keyword(inner, "OBSOLETE"),
        aux: parse_oid_list(inner, "AUX"),
        must: parse_oid_list(inner, "MUST"),
        may: parse_oid_list(inner, "MAY"),
        not: parse_oid_list(inner, "NOT"),
    })
}

pub fn parse_dit_structure_rule(def: &str) -> Option<ParsedDitStructureRule> {
    let inner = strip_parens(def)?;
    let rule_id: u32 = inner.split_whitespace().next()?.parse().ok()?;
    let name_form = parse_unquoted_field(inner, "FORM")?;
    let superiors = parse_oid_list(inner, "SUP")
        .iter()
        .filter_map(|s| s.parse::<u32>().ok())
        .collect();

    Some(ParsedDitStructureRule {
        rule_id,
        names: parse_names(inner),
        description: parse_quoted_field(inner, "DESC"),
        obsolete: has_keyword(inner, "OBSOLETE"),
        name_form,
        superiors,
    })
}

pub fn parse_name_form(def: &str) -> Option<ParsedNameForm> {
    let inner = strip_parens(def)?;
    let oid = inner.split_whitespace().next()?.to_string();
    let object_class = parse_unquoted_field(inner, "OC")?;
    Some(ParsedNameForm {
        oid,
        names: parse_names(inner),
        description: parse_quoted_field(inner, "DESC"),
        obsolete: has_keyword(inner, "OBSOLETE"),
        object_class,
        must: parse_oid_list(inner, "MUST"),
        may: parse_oid_list(inner, "MAY"),
    })
}

/// Parse a normalizer/comparator/syntax-checker descriptor, which carries
/// the `M-FQCN` extension (always) and an optional Base64 `M-BYTECODE`
/// extension (spec §6).
pub fn parse_extensible(def: &str) -> Option<ParsedExtensible> {
    let inner = strip_parens(def)?;
    let oid = inner.split_whitespace().next()?.to_string();
    let fqcn = parse_quoted_field(inner, "X-FQCN")
        .or_else(|| parse_quoted_field(inner, "M-FQCN"))?;
    let bytecode = parse_quoted_field(inner, "X-BYTECODE")
        .or_else(|| parse_quoted_field(inner, "M-BYTECODE"))
        .and_then(|b64| base64::engine::general_purpose::STANDARD.decode(b64).ok());

    Some(ParsedExtensible {
        oid,
        description: parse_quoted_field(inner, "DESC"),
        implementation: Implementation { fqcn, bytecode },
    })
}
