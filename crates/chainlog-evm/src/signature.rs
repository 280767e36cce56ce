//! Human-readable event declaration parser.
//!
//! Accepts the forms found in Solidity sources and human-readable ABIs:
//!
//! ```text
//! event Transfer(address indexed from, address indexed to, uint256 value);
//! Transfer(address indexed from, address indexed to, uint256 value)
//! Transfer(address,address,uint256)
//! Filled((uint256 amount, address maker)[] orders, bytes32 indexed id) anonymous
//! ```
//!
//! Parameter names and the `indexed` keyword are optional. Tuple components
//! may carry names; they are dropped because the canonical signature only
//! contains types.

use chainlog_core::{error::DescriptorError, types::split_top_level, AbiType};

use crate::descriptor::EventParam;

/// The pieces of a parsed event declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDeclaration {
    pub name: String,
    pub params: Vec<EventParam>,
    pub anonymous: bool,
}

/// Parse an event declaration.
pub fn parse_event(declaration: &str) -> Result<EventDeclaration, DescriptorError> {
    let invalid = |reason: String| DescriptorError::InvalidSignature {
        signature: declaration.to_string(),
        reason,
    };

    let mut s = declaration.trim();
    s = s.strip_suffix(';').unwrap_or(s).trim_end();
    if let Some(rest) = s.strip_prefix("event") {
        if rest.starts_with(char::is_whitespace) {
            s = rest.trim_start();
        }
    }

    let mut anonymous = false;
    if let Some(rest) = s.strip_suffix("anonymous") {
        let rest = rest.trim_end();
        if rest.ends_with(')') {
            anonymous = true;
            s = rest;
        }
    }

    let open = s.find('(').ok_or_else(|| invalid("missing '('".into()))?;
    if !s.ends_with(')') {
        return Err(invalid("parameter list must end with ')'".into()));
    }
    let name = s[..open].trim();
    if !is_identifier(name) {
        return Err(invalid(format!("'{name}' is not a valid event name")));
    }

    let list = &s[open + 1..s.len() - 1];
    let parts = split_top_level(list).ok_or_else(|| invalid("unbalanced parentheses".into()))?;
    let params = parts
        .into_iter()
        .enumerate()
        .map(|(i, part)| parse_param(part).map_err(|reason| invalid(format!("parameter {i}: {reason}"))))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(EventDeclaration {
        name: name.to_string(),
        params,
        anonymous,
    })
}

/// Solidity identifier rules: `[A-Za-z_$][A-Za-z0-9_$]*`.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn parse_param(text: &str) -> Result<EventParam, String> {
    let text = text.trim();
    if text.is_empty() {
        return Err("empty parameter".into());
    }

    let (ty, rest) = split_type(text)?;
    let mut indexed = false;
    let mut name: Option<&str> = None;
    for token in rest.split_whitespace() {
        match token {
            "indexed" if !indexed && name.is_none() => indexed = true,
            t if name.is_none() && is_identifier(t) => name = Some(t),
            t => return Err(format!("unexpected token '{t}'")),
        }
    }

    Ok(EventParam::new(name.unwrap_or_default(), ty, indexed))
}

/// Split a parameter into its type and the text after it.
fn split_type(text: &str) -> Result<(AbiType, &str), String> {
    let open = if text.starts_with("tuple(") { 5 } else { 0 };
    if !text[open..].starts_with('(') {
        let end = text.find(char::is_whitespace).unwrap_or(text.len());
        let ty = text[..end].parse::<AbiType>().map_err(|e| e.to_string())?;
        return Ok((ty, &text[end..]));
    }

    let close = matching_paren(text, open).ok_or("unbalanced parentheses")?;
    let members = split_top_level(&text[open + 1..close])
        .ok_or("unbalanced parentheses")?
        .into_iter()
        .map(|member| {
            let param = parse_param(member)?;
            if param.indexed {
                return Err("'indexed' is not allowed inside a tuple".to_string());
            }
            Ok(param.ty)
        })
        .collect::<Result<Vec<_>, String>>()?;

    let mut ty = AbiType::Tuple(members);
    let mut rest = &text[close + 1..];
    while let Some(suffix) = rest.strip_prefix('[') {
        let end = suffix.find(']').ok_or("unterminated array suffix")?;
        let len = suffix[..end].trim();
        ty = if len.is_empty() {
            AbiType::Array(Box::new(ty))
        } else {
            let len = len
                .parse::<usize>()
                .map_err(|_| format!("invalid array length '{len}'"))?;
            AbiType::FixedArray(Box::new(ty), len)
        };
        rest = &suffix[end + 1..];
    }

    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return Err(format!("unexpected text '{rest}' after tuple type"));
    }
    Ok((ty, rest))
}

fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}
