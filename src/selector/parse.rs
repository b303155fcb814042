//! Selector string parsing.

use super::{AttrOp, AttrSelector, Combinator, CompoundSelector, SelectorChain, SelectorError, SelectorList};

fn err(selector: &str, message: impl Into<String>) -> SelectorError {
    SelectorError {
        selector: selector.to_string(),
        message: message.into(),
    }
}

pub(crate) fn parse_selector_list(input: &str) -> Result<SelectorList, SelectorError> {
    let mut chains = Vec::new();
    for alternative in split_top_level(input, ',') {
        let alternative = alternative.trim();
        if alternative.is_empty() {
            return Err(err(input, "empty selector"));
        }
        chains.push(parse_chain(alternative, input)?);
    }
    if chains.is_empty() {
        return Err(err(input, "empty selector"));
    }
    Ok(SelectorList { chains })
}

/// Split on `separator` outside of brackets and quotes.
fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (index, ch) in input.char_indices() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                parts.push(&input[start..index]);
                start = index + separator.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn parse_chain(raw: &str, full: &str) -> Result<SelectorChain, SelectorError> {
    let mut parts: Vec<CompoundSelector> = Vec::new();
    let mut combinators: Vec<Combinator> = Vec::new();
    let mut pending: Option<Combinator> = None;
    let mut buf = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    let flush = |buf: &mut String,
                 parts: &mut Vec<CompoundSelector>,
                 combinators: &mut Vec<Combinator>,
                 pending: &mut Option<Combinator>|
     -> Result<(), SelectorError> {
        let trimmed = buf.trim();
        if trimmed.is_empty() {
            buf.clear();
            return Ok(());
        }
        if parts.is_empty() {
            if pending.is_some() {
                return Err(err(full, "combinator without a left-hand side"));
            }
        } else {
            combinators.push(pending.take().unwrap_or(Combinator::Descendant));
        }
        parts.push(parse_compound(trimmed, full)?);
        buf.clear();
        Ok(())
    };

    for ch in raw.chars() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            buf.push(ch);
            continue;
        }
        match ch {
            '"' | '\'' => {
                quote = Some(ch);
                buf.push(ch);
            }
            '[' => {
                depth += 1;
                buf.push(ch);
            }
            ']' => {
                depth = depth.saturating_sub(1);
                buf.push(ch);
            }
            '>' if depth == 0 => {
                flush(&mut buf, &mut parts, &mut combinators, &mut pending)?;
                // Whitespace before `>` leaves a pending descendant; only a
                // second `>` is actually doubled.
                if matches!(pending, Some(Combinator::Child)) {
                    return Err(err(full, "doubled combinator"));
                }
                pending = Some(Combinator::Child);
            }
            c if c.is_whitespace() && depth == 0 => {
                if !buf.trim().is_empty() {
                    flush(&mut buf, &mut parts, &mut combinators, &mut pending)?;
                    pending = Some(Combinator::Descendant);
                }
            }
            _ => buf.push(ch),
        }
    }
    // A dangling descendant combinator is just trailing whitespace.
    let trailing_child = matches!(pending, Some(Combinator::Child)) && buf.trim().is_empty();
    flush(&mut buf, &mut parts, &mut combinators, &mut pending)?;

    if trailing_child {
        return Err(err(full, "combinator without a right-hand side"));
    }
    if parts.is_empty() {
        return Err(err(full, "empty selector"));
    }
    Ok(SelectorChain { parts, combinators })
}

fn parse_compound(raw: &str, full: &str) -> Result<CompoundSelector, SelectorError> {
    let (base, attr_parts) = extract_attr_parts(raw);

    let mut attrs = Vec::new();
    for part in attr_parts {
        attrs.push(parse_attr(&part, full)?);
    }

    enum Mode {
        Tag,
        Id,
        Class,
    }

    let mut tag: Option<String> = None;
    let mut id: Option<String> = None;
    let mut classes: Vec<String> = Vec::new();
    let mut mode = Mode::Tag;
    let mut buf = String::new();

    let mut flush = |mode: &Mode, buf: &mut String| -> Result<(), SelectorError> {
        match mode {
            Mode::Tag => {
                if !buf.is_empty() {
                    tag = Some(std::mem::take(buf));
                }
            }
            Mode::Id => {
                if buf.is_empty() {
                    return Err(err(full, "empty id selector"));
                }
                id = Some(std::mem::take(buf));
            }
            Mode::Class => {
                if buf.is_empty() {
                    return Err(err(full, "empty class selector"));
                }
                classes.push(std::mem::take(buf));
            }
        }
        Ok(())
    };

    for ch in base.chars() {
        match ch {
            '#' => {
                flush(&mode, &mut buf)?;
                mode = Mode::Id;
            }
            '.' => {
                flush(&mode, &mut buf)?;
                mode = Mode::Class;
            }
            ':' => {
                return Err(err(full, "pseudo-classes are not supported"));
            }
            _ => buf.push(ch),
        }
    }
    flush(&mode, &mut buf)?;

    if tag.is_none() && id.is_none() && classes.is_empty() && attrs.is_empty() {
        return Err(err(full, format!("unrecognized selector part `{raw}`")));
    }

    Ok(CompoundSelector {
        tag,
        id,
        classes,
        attrs,
    })
}

/// Split `path.a[fill="x"][stroke]` into the bare part and the bracketed
/// attribute expressions.
fn extract_attr_parts(input: &str) -> (String, Vec<String>) {
    let mut base = String::new();
    let mut attrs = Vec::new();
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch != '[' {
            base.push(ch);
            continue;
        }
        let mut buf = String::new();
        let mut quote: Option<char> = None;
        for c in chars.by_ref() {
            if let Some(q) = quote {
                if c == q {
                    quote = None;
                }
                buf.push(c);
                continue;
            }
            match c {
                '"' | '\'' => {
                    quote = Some(c);
                    buf.push(c);
                }
                ']' => break,
                _ => buf.push(c),
            }
        }
        if !buf.trim().is_empty() {
            attrs.push(buf.trim().to_string());
        }
    }
    (base, attrs)
}

fn parse_attr(raw: &str, full: &str) -> Result<AttrSelector, SelectorError> {
    const OPS: [(&str, AttrOp); 6] = [
        ("~=", AttrOp::Includes),
        ("|=", AttrOp::DashMatch),
        ("^=", AttrOp::Prefix),
        ("$=", AttrOp::Suffix),
        ("*=", AttrOp::Substring),
        ("=", AttrOp::Equals),
    ];

    // Find the first operator occurrence outside quotes.
    let mut quote: Option<char> = None;
    for (index, ch) in raw.char_indices() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            continue;
        }
        if ch == '"' || ch == '\'' {
            quote = Some(ch);
            continue;
        }
        for (token, op) in OPS {
            if raw[index..].starts_with(token) {
                let name = raw[..index].trim();
                if name.is_empty() {
                    return Err(err(full, "attribute selector with empty name"));
                }
                let value = unquote(raw[index + token.len()..].trim());
                return Ok(AttrSelector {
                    name: name.to_string(),
                    op,
                    value: Some(value),
                });
            }
        }
    }

    Ok(AttrSelector {
        name: raw.to_string(),
        op: AttrOp::Exists,
        value: None,
    })
}

fn unquote(value: &str) -> String {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        value[1..value.len() - 1].to_string()
    } else {
        value.to_string()
    }
}
